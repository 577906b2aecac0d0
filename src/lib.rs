//! Annotation-driven binding of request data onto typed beans.
//!
//! A request bean describes its properties and marks each one with where
//! its value comes from (a query parameter, a header, a nested bean...).
//! This crate works out, once per bean type, which resolver supplies each
//! property, and then resolves the values for every request.
//!
//! # Core Types
//!
//! - [`RequestBean`]: A type whose properties are bound from request data
//! - [`PropertyResolver`]: Pluggable source of property values
//! - [`ResolverRegistry`]: Ordered resolver set; the first supporting resolver wins
//! - [`DefaultIntrospector`]: Recursive scanner with circular reference detection
//! - [`CachedIntrospector`]: Per-type memoization of scan results
//! - [`BindingEngine`]: Resolves values per request and drives a [`DataBinder`]
//! - [`BinderBuilder`]: Collects resolvers and candidates and pre-warms at start-up
//!
//! # Examples
//!
//! ```
//! use bean_binder::{
//!     BeanDescriptor, BeanParameter, BeanType, BinderBuilder, BindingProperty,
//!     PropertyDescriptor, PropertyResolver, RequestBean, RequestParameter, RequestScope,
//!     ResolveError, Value,
//! };
//!
//! struct Params;
//!
//! impl PropertyResolver<Vec<(String, String)>> for Params {
//!     fn supports(&self, p: &BindingProperty) -> bool {
//!         p.has_annotation::<RequestParameter>()
//!     }
//!
//!     fn resolve(
//!         &self,
//!         p: &BindingProperty,
//!         request: &Vec<(String, String)>,
//!     ) -> Result<Option<Value>, ResolveError> {
//!         let name = bean_binder::marker_name::<RequestParameter>(p)?;
//!         Ok(request.iter().find(|(k, _)| k == name).map(|(_, v)| Value::from(v.as_str())))
//!     }
//! }
//!
//! struct Paging;
//! struct Search;
//!
//! impl RequestBean for Paging {
//!     fn describe() -> BeanDescriptor {
//!         BeanDescriptor::new()
//!             .property(PropertyDescriptor::primitive::<u32>("page").marker(RequestParameter::new("p")))
//!     }
//! }
//!
//! impl RequestBean for Search {
//!     fn describe() -> BeanDescriptor {
//!         BeanDescriptor::new()
//!             .property(PropertyDescriptor::new::<String>("query").marker(RequestParameter::new("q")))
//!             .property(PropertyDescriptor::bean::<Paging>("paging").marker(BeanParameter))
//!     }
//! }
//!
//! let binder = BinderBuilder::new()
//!     .resolver(Params)
//!     .request_bean::<Search>()
//!     .build()
//!     .expect("beans introspect cleanly");
//!
//! let request = vec![("q".to_string(), "rust".to_string()), ("p".to_string(), "2".to_string())];
//! let mut scope = RequestScope::new(&request, "req-123");
//! let values = binder.resolve_all(&BeanType::of::<Search>(), &mut scope).unwrap();
//!
//! assert_eq!(values.paths().collect::<Vec<_>>(), vec!["query", "paging.page"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod annotation;
mod bean;
mod binder;
mod engine;
mod error;
mod introspect;
mod logging;
mod property;
mod registry;
mod resolver;
mod support;
mod value;

pub use annotation::{
    Annotation, Annotations, BeanParameter, CookieParameter, FormParameter, HeaderParameter,
    NamedMarker, PathParameter, RequestBody, RequestContext, RequestParameter, SessionParameter,
};
pub use bean::{registered_beans, BeanDescriptor, BeanType, RequestBean, RequestBeanRegistration};
pub use binder::{Binder, BinderBuilder};
pub use engine::{BindingEngine, DataBinder, RequestScope};
pub use error::{
    BindError, Error, IntrospectionError, IntrospectionInitError, PropertyResolutionError,
    ResolveError,
};
pub use introspect::{
    CachedIntrospector, DefaultIntrospector, Introspector, ResolvedProperties,
    ResolvedPropertyData, ResolverMap, ScanningIntrospector,
};
pub use logging::ScopeLog;
pub use property::{Accessor, AccessorKind, BindingProperty, PropertyDescriptor, TypeInfo};
pub use registry::{ResolverRegistry, SharedResolver};
pub use resolver::{marker_name, NamedValueResolver, NamedValueSource, PropertyResolver};
pub use support::MapValueResolver;
pub use value::{PropertyValues, Value};

#[doc(hidden)]
pub mod __private {
    pub use inventory;
}
