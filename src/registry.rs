use std::fmt;
use std::sync::Arc;

use crate::property::BindingProperty;
use crate::resolver::PropertyResolver;

/// A resolver shared between the registry and the entries it was matched to.
pub type SharedResolver<R> = Arc<dyn PropertyResolver<R>>;

/// Ordered, de-duplicated set of resolvers.
///
/// Registration order is match priority: lookup walks the resolvers in
/// insertion order and the first one whose `supports` returns true wins.
/// Register more specific resolvers before general ones.
///
/// De-duplication is by identity (the same `Arc`), never by behaviour: two
/// separately constructed resolvers of the same type are both kept.
///
/// # Examples
///
/// ```
/// use bean_binder::{BindingProperty, PropertyResolver, ResolveError, ResolverRegistry, Value};
///
/// struct Nothing;
/// struct Everything;
///
/// impl PropertyResolver<()> for Nothing {
///     fn supports(&self, _: &BindingProperty) -> bool { false }
///     fn resolve(&self, _: &BindingProperty, _: &()) -> Result<Option<Value>, ResolveError> { Ok(None) }
/// }
///
/// impl PropertyResolver<()> for Everything {
///     fn supports(&self, _: &BindingProperty) -> bool { true }
///     fn resolve(&self, _: &BindingProperty, _: &()) -> Result<Option<Value>, ResolveError> { Ok(None) }
/// }
///
/// let mut registry = ResolverRegistry::new();
/// registry.register(Nothing);
/// let everything = registry.register(Everything);
///
/// // Adding the same instance again is a no-op.
/// registry.add_resolver(everything.clone());
/// assert_eq!(registry.len(), 2);
/// ```
pub struct ResolverRegistry<R> {
    resolvers: Vec<SharedResolver<R>>,
}

impl<R> ResolverRegistry<R> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    /// Wraps a resolver in an `Arc`, registers it and returns the shared handle.
    pub fn register<P>(&mut self, resolver: P) -> SharedResolver<R>
    where
        P: PropertyResolver<R> + 'static,
    {
        let shared: SharedResolver<R> = Arc::new(resolver);
        self.add_resolver(Arc::clone(&shared));
        shared
    }

    /// Adds a resolver unless this exact instance is already registered.
    ///
    /// Returns true if the resolver was added.
    pub fn add_resolver(&mut self, resolver: SharedResolver<R>) -> bool {
        if self.contains(&resolver) {
            return false;
        }
        tracing::debug!(
            resolver = resolver.describe(),
            position = self.resolvers.len(),
            "registered property resolver"
        );
        self.resolvers.push(resolver);
        true
    }

    /// Adds every resolver in iteration order, skipping instances already present.
    pub fn add_resolvers<I>(&mut self, resolvers: I)
    where
        I: IntoIterator<Item = SharedResolver<R>>,
    {
        for resolver in resolvers {
            self.add_resolver(resolver);
        }
    }

    /// Appends the resolvers of another registry after this registry's own,
    /// preserving the other registry's order and skipping duplicates.
    pub fn merge(&mut self, other: &ResolverRegistry<R>) {
        self.add_resolvers(other.resolvers.iter().cloned());
    }

    /// Returns the first resolver supporting the property.
    ///
    /// `None` is a normal outcome: the property is not handled by this
    /// binding system.
    pub fn find_resolver_for(&self, property: &BindingProperty) -> Option<&SharedResolver<R>> {
        self.resolvers
            .iter()
            .find(|resolver| resolver.supports(property))
    }

    /// Read-only view of the resolvers in priority order.
    pub fn resolvers(&self) -> &[SharedResolver<R>] {
        &self.resolvers
    }

    /// Returns true if this exact resolver instance is registered.
    pub fn contains(&self, resolver: &SharedResolver<R>) -> bool {
        self.resolvers.iter().any(|r| Arc::ptr_eq(r, resolver))
    }

    /// Number of registered resolvers.
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Returns true if no resolvers are registered.
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl<R> Default for ResolverRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for ResolverRegistry<R> {
    fn clone(&self) -> Self {
        Self {
            resolvers: self.resolvers.clone(),
        }
    }
}

impl<R> fmt::Debug for ResolverRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.resolvers.iter().map(|r| r.describe()))
            .finish()
    }
}
