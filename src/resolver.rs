//! The resolver capability interface.
//!
//! A resolver claims properties through [`PropertyResolver::supports`] and
//! supplies their values per request through [`PropertyResolver::resolve`].
//! The core never looks inside a resolver: transport-specific resolvers
//! (query string, headers, cookies, sessions, ...) live with the framework
//! integration and are registered in a [`ResolverRegistry`](crate::ResolverRegistry).

use std::any::type_name;

use crate::annotation::NamedMarker;
use crate::error::ResolveError;
use crate::property::BindingProperty;
use crate::value::Value;

/// A pluggable source of property values for request type `R`.
///
/// Resolvers are stateless and registered once at start-up. `supports` is
/// a pure predicate called while scanning; `resolve` is called per request
/// and may consult external sources and fail.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use bean_binder::{BindingProperty, NamedMarker, PropertyResolver, RequestParameter, ResolveError, Value};
///
/// struct Query(HashMap<String, String>);
///
/// struct QueryParam;
///
/// impl PropertyResolver<Query> for QueryParam {
///     fn supports(&self, property: &BindingProperty) -> bool {
///         property
///             .annotation::<RequestParameter>()
///             .is_some_and(|m| !m.value().is_empty())
///     }
///
///     fn resolve(&self, property: &BindingProperty, request: &Query) -> Result<Option<Value>, ResolveError> {
///         let name = property.annotation::<RequestParameter>().map(|m| m.value()).unwrap_or_default();
///         Ok(request.0.get(name).cloned().map(Value::Text))
///     }
/// }
/// ```
pub trait PropertyResolver<R>: Send + Sync {
    /// Returns true if this resolver handles the property.
    fn supports(&self, property: &BindingProperty) -> bool;

    /// Resolves the property's value from the request.
    ///
    /// `Ok(None)` means the request does not provide a value.
    fn resolve(&self, property: &BindingProperty, request: &R)
        -> Result<Option<Value>, ResolveError>;

    /// Name used in logs and debug output.
    fn describe(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// A resolver that looks values up by a name taken from the property.
///
/// Wrap an implementation in [`NamedValueResolver`] to register it: the
/// name is computed once per call and handed to `resolve_with_name`.
pub trait NamedValueSource<R>: Send + Sync {
    /// Returns true if this source handles the property.
    fn supports(&self, property: &BindingProperty) -> bool;

    /// The request value name to look up for the property.
    fn name_for(&self, property: &BindingProperty) -> Result<String, ResolveError>;

    /// Resolves the named value from the request.
    fn resolve_with_name(
        &self,
        property: &BindingProperty,
        name: &str,
        request: &R,
    ) -> Result<Option<Value>, ResolveError>;
}

/// Adapts a [`NamedValueSource`] into a [`PropertyResolver`].
#[derive(Debug, Clone, Default)]
pub struct NamedValueResolver<S> {
    source: S,
}

impl<S> NamedValueResolver<S> {
    /// Wraps a named value source.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// The wrapped source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<R, S> PropertyResolver<R> for NamedValueResolver<S>
where
    S: NamedValueSource<R>,
{
    fn supports(&self, property: &BindingProperty) -> bool {
        self.source.supports(property)
    }

    fn resolve(
        &self,
        property: &BindingProperty,
        request: &R,
    ) -> Result<Option<Value>, ResolveError> {
        let name = self.source.name_for(property)?;
        self.source.resolve_with_name(property, &name, request)
    }

    fn describe(&self) -> &'static str {
        type_name::<S>()
    }
}

/// Returns the name carried by marker `M` on the property.
///
/// # Errors
///
/// Fails if the property does not carry `M`; a resolver that claimed the
/// property in `supports` should never hit this.
pub fn marker_name<M: NamedMarker>(property: &BindingProperty) -> Result<&str, ResolveError> {
    property
        .annotation::<M>()
        .map(NamedMarker::value)
        .ok_or_else(|| {
            format!(
                "no {} marker found on property `{}`",
                type_name::<M>(),
                property.name()
            )
            .into()
        })
}
