use std::sync::Arc;

use crate::bean::{BeanType, RequestBean};
use crate::engine::{BindingEngine, DataBinder, RequestScope};
use crate::error::{Error, IntrospectionError, IntrospectionInitError};
use crate::introspect::{DefaultIntrospector, Introspector, ResolvedProperties, ScanningIntrospector};
use crate::registry::{ResolverRegistry, SharedResolver};
use crate::resolver::PropertyResolver;
use crate::value::PropertyValues;

/// Builder for a ready-to-use [`Binder`].
///
/// `BinderBuilder` collects resolvers and the bean types to pre-warm, then
/// freezes the registry and scans every candidate in [`build`](Self::build),
/// so a malformed or cyclic bean fails start-up instead of a request.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use bean_binder::{
///     BeanDescriptor, BinderBuilder, BindingProperty, PropertyDescriptor, PropertyResolver,
///     RequestBean, RequestParameter, RequestScope, ResolveError, Value, BeanType,
/// };
///
/// struct Query(HashMap<String, String>);
///
/// struct Params;
///
/// impl PropertyResolver<Query> for Params {
///     fn supports(&self, p: &BindingProperty) -> bool {
///         p.has_annotation::<RequestParameter>()
///     }
///
///     fn resolve(&self, p: &BindingProperty, request: &Query) -> Result<Option<Value>, ResolveError> {
///         let name = bean_binder::marker_name::<RequestParameter>(p)?;
///         Ok(request.0.get(name).cloned().map(Value::Text))
///     }
/// }
///
/// struct Search;
///
/// impl RequestBean for Search {
///     fn describe() -> BeanDescriptor {
///         BeanDescriptor::new()
///             .property(PropertyDescriptor::new::<String>("query").marker(RequestParameter::new("q")))
///     }
/// }
///
/// let binder = BinderBuilder::new()
///     .resolver(Params)
///     .request_bean::<Search>()
///     .build()
///     .expect("beans introspect cleanly");
///
/// let request = Query(HashMap::from([("q".to_string(), "rust".to_string())]));
/// let mut scope = RequestScope::new(&request, "req-1");
/// let values = binder.resolve_all(&BeanType::of::<Search>(), &mut scope).unwrap();
/// assert_eq!(values.get("query"), Some(&Value::from("rust")));
/// ```
pub struct BinderBuilder<R> {
    registry: ResolverRegistry<R>,
    beans: Vec<BeanType>,
    modules: Vec<String>,
}

impl<R: 'static> BinderBuilder<R> {
    /// Creates a builder with no resolvers and no candidates.
    pub fn new() -> Self {
        Self {
            registry: ResolverRegistry::new(),
            beans: Vec::new(),
            modules: Vec::new(),
        }
    }

    /// Registers a resolver after those already added.
    pub fn resolver<P>(mut self, resolver: P) -> Self
    where
        P: PropertyResolver<R> + 'static,
    {
        self.registry.register(resolver);
        self
    }

    /// Registers an already shared resolver, skipping it if present.
    pub fn shared_resolver(mut self, resolver: SharedResolver<R>) -> Self {
        self.registry.add_resolver(resolver);
        self
    }

    /// Appends every resolver of `registry`, preserving its order.
    pub fn resolvers(mut self, registry: &ResolverRegistry<R>) -> Self {
        self.registry.merge(registry);
        self
    }

    /// Adds a bean type to pre-warm, deduplicating repeated types.
    pub fn request_bean<B: RequestBean>(mut self) -> Self {
        let bean = BeanType::of::<B>();
        if !self.beans.contains(&bean) {
            self.beans.push(bean);
        }
        self
    }

    /// Pre-warms every bean registered under `module` or its submodules.
    ///
    /// Beans opt in with [`register_request_bean!`](crate::register_request_bean).
    pub fn scan_module(mut self, module: impl Into<String>) -> Self {
        self.modules.push(module.into());
        self
    }

    /// Freezes the registry and pre-warms every candidate bean.
    ///
    /// # Errors
    ///
    /// Returns [`IntrospectionInitError`] naming the first candidate whose
    /// scan failed.
    pub fn build(self) -> Result<Binder<R>, IntrospectionInitError> {
        tracing::debug!(
            resolvers = self.registry.len(),
            beans = self.beans.len(),
            modules = self.modules.len(),
            "building binder"
        );

        let registry = Arc::new(self.registry);
        let default = DefaultIntrospector::new(Arc::clone(&registry));
        let introspector = Arc::new(ScanningIntrospector::new(Arc::new(default), self.modules));

        let scanned = introspector.initialize()?;
        let explicit = introspector.cache().prewarm(self.beans)?;
        tracing::debug!(scanned, explicit, "binder ready");

        let shared: Arc<dyn Introspector<R>> = introspector.clone();
        Ok(Binder {
            registry,
            introspector,
            engine: BindingEngine::new(shared),
        })
    }
}

impl<R: 'static> Default for BinderBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// A frozen resolver registry, its warm introspection cache and the engine
/// that resolves requests against them.
///
/// Share one `Binder` (behind an `Arc`) across all requests.
pub struct Binder<R> {
    registry: Arc<ResolverRegistry<R>>,
    introspector: Arc<ScanningIntrospector<R>>,
    engine: BindingEngine<R>,
}

impl<R> Binder<R> {
    /// The frozen resolver registry.
    pub fn registry(&self) -> &ResolverRegistry<R> {
        &self.registry
    }

    /// The caching introspector.
    pub fn introspector(&self) -> &ScanningIntrospector<R> {
        &self.introspector
    }

    /// The binding engine.
    pub fn engine(&self) -> &BindingEngine<R> {
        &self.engine
    }

    /// Cached resolved properties of `bean`, scanning it on first use.
    pub fn resolvers_for(&self, bean: &BeanType) -> Result<ResolvedProperties<R>, IntrospectionError> {
        self.introspector.resolvers_for(bean)
    }

    /// See [`BindingEngine::resolve_all`].
    pub fn resolve_all(
        &self,
        bean: &BeanType,
        scope: &mut RequestScope<'_, R>,
    ) -> Result<Arc<PropertyValues>, Error> {
        self.engine.resolve_all(bean, scope)
    }

    /// See [`BindingEngine::bind`].
    pub fn bind<B>(&self, binder: &mut B, scope: &mut RequestScope<'_, R>) -> Result<(), Error>
    where
        B: DataBinder + ?Sized,
    {
        self.engine.bind(binder, scope)
    }
}
