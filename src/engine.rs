//! Request-time resolution and the two-phase binding driver.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::bean::BeanType;
use crate::error::{BindError, Error, PropertyResolutionError};
use crate::introspect::Introspector;
use crate::logging::ScopeLog;
use crate::support::MapValueResolver;
use crate::value::PropertyValues;

/// State for one in-flight request.
///
/// Holds the request being bound and memoizes the resolved values per
/// target type, so the construction and bind phases of a consumer see the
/// same mapping and each resolver runs at most once per request and type.
/// Create one scope per request and drop it when the request ends.
pub struct RequestScope<'r, R> {
    request: &'r R,
    request_id: String,
    resolved: HashMap<TypeId, Arc<PropertyValues>>,
}

impl<'r, R> RequestScope<'r, R> {
    /// Creates an empty scope for `request`.
    pub fn new(request: &'r R, request_id: impl Into<String>) -> Self {
        Self {
            request,
            request_id: request_id.into(),
            resolved: HashMap::new(),
        }
    }

    /// The request being bound.
    pub fn request(&self) -> &'r R {
        self.request
    }

    /// Returns the request ID for this scope.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns a logger stamped with this scope's request ID.
    pub fn log(&self) -> ScopeLog<'_> {
        ScopeLog::new(&self.request_id)
    }

    /// Values already resolved for `bean` in this request, if any.
    pub fn resolved(&self, bean: &BeanType) -> Option<&Arc<PropertyValues>> {
        self.resolved.get(&bean.id())
    }
}

impl<R> fmt::Debug for RequestScope<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestScope")
            .field("request_id", &self.request_id)
            .field("resolved", &self.resolved.len())
            .finish()
    }
}

/// An external consumer that turns resolved values into a bound object.
///
/// The engine drives the consumer in two phases: an optional construction
/// phase, which receives a [`MapValueResolver`] for looking up constructor
/// arguments, followed by the bind phase, which receives the full mapping.
pub trait DataBinder {
    /// The bean type whose properties are resolved for this consumer.
    fn target_type(&self) -> BeanType;

    /// Whether the construction phase must run before binding.
    fn needs_construction(&self) -> bool {
        false
    }

    /// Builds the target from constructor arguments.
    fn construct(&mut self, _values: &MapValueResolver) -> Result<(), BindError> {
        Ok(())
    }

    /// Binds the resolved values onto the target.
    fn bind(&mut self, values: &PropertyValues) -> Result<(), BindError>;
}

/// Resolves the values of a bean's properties for a request.
pub struct BindingEngine<R> {
    introspector: Arc<dyn Introspector<R>>,
}

impl<R> BindingEngine<R> {
    /// Creates an engine that looks up resolvers through `introspector`.
    pub fn new(introspector: Arc<dyn Introspector<R>>) -> Self {
        Self { introspector }
    }

    /// The introspector used to look up resolvers.
    pub fn introspector(&self) -> &Arc<dyn Introspector<R>> {
        &self.introspector
    }

    /// Resolves every bindable property of `bean` against the scope's request.
    ///
    /// The result is keyed by qualified property path in introspection
    /// order. Properties whose resolver yields no value are left out. The
    /// mapping is memoized in the scope; later calls for the same type
    /// return it without consulting any resolver.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Introspection`] if the type cannot be scanned, or
    /// [`Error::Resolution`] for the first resolver that fails. No partial
    /// mapping is kept in either case.
    pub fn resolve_all(
        &self,
        bean: &BeanType,
        scope: &mut RequestScope<'_, R>,
    ) -> Result<Arc<PropertyValues>, Error> {
        if let Some(values) = scope.resolved.get(&bean.id()) {
            scope
                .log()
                .trace(format_args!("reusing resolved values for {}", bean.name()));
            return Ok(Arc::clone(values));
        }

        let entries = self.introspector.resolvers_for(bean)?;
        let log = scope.log();
        let mut values = PropertyValues::new();
        for entry in entries.iter() {
            match entry.resolver().resolve(entry.property(), scope.request) {
                Ok(Some(value)) => values.insert(entry.path(), value),
                Ok(None) => log.trace(format_args!("no value for `{}`", entry.path())),
                Err(source) => {
                    log.warn(format_args!(
                        "unable to resolve `{}` with {}: {}",
                        entry.path(),
                        entry.resolver().describe(),
                        source
                    ));
                    return Err(PropertyResolutionError {
                        path: entry.path().to_string(),
                        source,
                    }
                    .into());
                }
            }
        }
        log.debug(format_args!(
            "resolved {} of {} properties for {}",
            values.len(),
            entries.len(),
            bean.name()
        ));

        let values = Arc::new(values);
        scope.resolved.insert(bean.id(), Arc::clone(&values));
        Ok(values)
    }

    /// Drives `binder` through its construction and bind phases.
    ///
    /// Values are resolved once through the scope and shared by both phases.
    ///
    /// # Errors
    ///
    /// Propagates resolution failures from [`resolve_all`](Self::resolve_all)
    /// and [`Error::Bind`] failures reported by the consumer. The bind phase
    /// does not run if construction fails.
    pub fn bind<B>(&self, binder: &mut B, scope: &mut RequestScope<'_, R>) -> Result<(), Error>
    where
        B: DataBinder + ?Sized,
    {
        let target = binder.target_type();
        let values = self.resolve_all(&target, scope)?;

        if binder.needs_construction() {
            binder.construct(&MapValueResolver::new(Arc::clone(&values)))?;
        }
        binder.bind(&values)?;
        Ok(())
    }
}

impl<R> Clone for BindingEngine<R> {
    fn clone(&self) -> Self {
        Self {
            introspector: Arc::clone(&self.introspector),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::annotation::{BeanParameter, RequestParameter, SessionParameter};
    use crate::bean::{BeanDescriptor, RequestBean};
    use crate::error::ResolveError;
    use crate::introspect::{CachedIntrospector, DefaultIntrospector};
    use crate::property::{BindingProperty, PropertyDescriptor};
    use crate::registry::ResolverRegistry;
    use crate::resolver::{marker_name, NamedValueResolver, NamedValueSource};
    use crate::value::Value;

    #[derive(Default)]
    struct FakeRequest {
        params: HashMap<String, String>,
    }

    impl FakeRequest {
        fn with(pairs: &[(&str, &str)]) -> Self {
            Self {
                params: pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            }
        }
    }

    #[derive(Default)]
    struct Params {
        calls: AtomicUsize,
    }

    impl NamedValueSource<FakeRequest> for Params {
        fn supports(&self, property: &BindingProperty) -> bool {
            property.has_annotation::<RequestParameter>()
        }

        fn name_for(&self, property: &BindingProperty) -> Result<String, ResolveError> {
            marker_name::<RequestParameter>(property).map(str::to_string)
        }

        fn resolve_with_name(
            &self,
            _: &BindingProperty,
            name: &str,
            request: &FakeRequest,
        ) -> Result<Option<Value>, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(request.params.get(name).cloned().map(Value::Text))
        }
    }

    struct SessionOffline;

    impl NamedValueSource<FakeRequest> for SessionOffline {
        fn supports(&self, property: &BindingProperty) -> bool {
            property.has_annotation::<SessionParameter>()
        }

        fn name_for(&self, property: &BindingProperty) -> Result<String, ResolveError> {
            marker_name::<SessionParameter>(property).map(str::to_string)
        }

        fn resolve_with_name(
            &self,
            _: &BindingProperty,
            _: &str,
            _: &FakeRequest,
        ) -> Result<Option<Value>, ResolveError> {
            Err("session store offline".into())
        }
    }

    struct Paging;

    impl RequestBean for Paging {
        fn describe() -> BeanDescriptor {
            BeanDescriptor::new()
                .property(PropertyDescriptor::primitive::<u32>("page").marker(RequestParameter::new("p")))
        }
    }

    struct Search;

    impl RequestBean for Search {
        fn describe() -> BeanDescriptor {
            BeanDescriptor::new()
                .property(PropertyDescriptor::new::<String>("query").marker(RequestParameter::new("q")))
                .property(PropertyDescriptor::new::<String>("data").marker(RequestParameter::new("data")))
                .property(PropertyDescriptor::bean::<Paging>("paging").marker(BeanParameter))
        }
    }

    struct Account;

    impl RequestBean for Account {
        fn describe() -> BeanDescriptor {
            BeanDescriptor::new()
                .property(PropertyDescriptor::new::<String>("name").marker(RequestParameter::new("name")))
                .property(PropertyDescriptor::new::<String>("user").marker(SessionParameter::new("user")))
        }
    }

    fn engine(params: Arc<NamedValueResolver<Params>>) -> BindingEngine<FakeRequest> {
        let mut registry = ResolverRegistry::<FakeRequest>::new();
        registry.add_resolver(params);
        registry.register(NamedValueResolver::new(SessionOffline));
        let introspector = DefaultIntrospector::new(Arc::new(registry));
        let cached = CachedIntrospector::<FakeRequest>::new(Arc::new(introspector));
        BindingEngine::new(Arc::new(cached))
    }

    #[test]
    fn missing_values_are_absent() {
        let engine = engine(Arc::default());
        let request = FakeRequest::with(&[("q", "rust"), ("p", "3")]);
        let mut scope = RequestScope::new(&request, "req-1");

        let values = engine.resolve_all(&BeanType::of::<Search>(), &mut scope).unwrap();

        assert_eq!(values.paths().collect::<Vec<_>>(), vec!["query", "paging.page"]);
        assert_eq!(values.get("query"), Some(&Value::from("rust")));
        assert!(!values.contains("data"));
    }

    #[test]
    fn resolves_once_per_request_and_type() {
        let params: Arc<NamedValueResolver<Params>> = Arc::default();
        let engine = engine(Arc::clone(&params));
        let request = FakeRequest::with(&[("q", "rust")]);
        let mut scope = RequestScope::new(&request, "req-2");
        let bean = BeanType::of::<Search>();

        let first = engine.resolve_all(&bean, &mut scope).unwrap();
        let second = engine.resolve_all(&bean, &mut scope).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(params.source().calls.load(Ordering::SeqCst), 3);
        assert!(scope.resolved(&bean).is_some());
    }

    #[test]
    fn new_scope_resolves_again() {
        let params: Arc<NamedValueResolver<Params>> = Arc::default();
        let engine = engine(Arc::clone(&params));
        let request = FakeRequest::default();
        let bean = BeanType::of::<Paging>();

        engine
            .resolve_all(&bean, &mut RequestScope::new(&request, "a"))
            .unwrap();
        engine
            .resolve_all(&bean, &mut RequestScope::new(&request, "b"))
            .unwrap();

        assert_eq!(params.source().calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn resolver_failure_aborts_with_path() {
        let engine = engine(Arc::default());
        let request = FakeRequest::with(&[("name", "ada")]);
        let mut scope = RequestScope::new(&request, "req-3");
        let bean = BeanType::of::<Account>();

        let err = engine.resolve_all(&bean, &mut scope).unwrap_err();

        match err {
            Error::Resolution(err) => {
                assert_eq!(err.path, "user");
                assert_eq!(err.source.to_string(), "session store offline");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(scope.resolved(&bean).is_none());
    }

    /// Records what each phase saw.
    struct Recorder {
        construct: bool,
        fail_construct: bool,
        constructed_with: Option<String>,
        bound: Vec<String>,
    }

    impl Recorder {
        fn new(construct: bool) -> Self {
            Self {
                construct,
                fail_construct: false,
                constructed_with: None,
                bound: Vec::new(),
            }
        }
    }

    impl DataBinder for Recorder {
        fn target_type(&self) -> BeanType {
            BeanType::of::<Search>()
        }

        fn needs_construction(&self) -> bool {
            self.construct
        }

        fn construct(&mut self, values: &MapValueResolver) -> Result<(), BindError> {
            if self.fail_construct {
                return Err(BindError::new("Search", "no matching constructor"));
            }
            self.constructed_with = values
                .resolve_value("query")
                .and_then(Value::as_text)
                .map(str::to_string);
            Ok(())
        }

        fn bind(&mut self, values: &PropertyValues) -> Result<(), BindError> {
            self.bound = values.paths().map(str::to_string).collect();
            Ok(())
        }
    }

    #[test]
    fn bind_runs_both_phases_on_one_mapping() {
        let params: Arc<NamedValueResolver<Params>> = Arc::default();
        let engine = engine(Arc::clone(&params));
        let request = FakeRequest::with(&[("q", "rust"), ("p", "1")]);
        let mut scope = RequestScope::new(&request, "req-4");
        let mut recorder = Recorder::new(true);

        engine.bind(&mut recorder, &mut scope).unwrap();

        assert_eq!(recorder.constructed_with.as_deref(), Some("rust"));
        assert_eq!(recorder.bound, vec!["query", "paging.page"]);
        assert_eq!(params.source().calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn bind_skips_construction_when_not_needed() {
        let engine = engine(Arc::default());
        let request = FakeRequest::with(&[("q", "rust")]);
        let mut scope = RequestScope::new(&request, "req-5");
        let mut recorder = Recorder::new(false);

        engine.bind(&mut recorder, &mut scope).unwrap();

        assert!(recorder.constructed_with.is_none());
        assert_eq!(recorder.bound, vec!["query"]);
    }

    #[test]
    fn construction_failure_stops_binding() {
        let engine = engine(Arc::default());
        let request = FakeRequest::with(&[("q", "rust")]);
        let mut scope = RequestScope::new(&request, "req-6");
        let mut recorder = Recorder::new(true);
        recorder.fail_construct = true;

        let err = engine.bind(&mut recorder, &mut scope).unwrap_err();

        assert!(matches!(err, Error::Bind(_)));
        assert!(recorder.bound.is_empty());
    }

    #[test]
    fn scope_debug_hides_request() {
        let request = FakeRequest::default();
        let scope = RequestScope::new(&request, "req-7");
        assert_eq!(scope.log().request_id(), "req-7");
        assert!(format!("{scope:?}").contains("req-7"));
    }
}
