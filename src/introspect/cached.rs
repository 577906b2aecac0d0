use std::any::TypeId;
use std::sync::Arc;

use dashmap::DashMap;

use crate::bean::BeanType;
use crate::error::{IntrospectionError, IntrospectionInitError};

use super::{Introspector, ResolvedProperties};

/// Memoizes another introspector per bean type.
///
/// Each bean type is scanned on first lookup and the result kept for the
/// life of the process; entries are never invalidated. Concurrent first
/// lookups may each run the delegate, but only the first result is
/// published and every caller gets that published entry. This is sound
/// because scanning is a pure function of the bean type.
///
/// Failed scans are not cached; the next lookup scans again and fails the
/// same way.
pub struct CachedIntrospector<R> {
    delegate: Arc<dyn Introspector<R>>,
    cache: DashMap<TypeId, ResolvedProperties<R>>,
}

impl<R> CachedIntrospector<R> {
    /// Wraps `delegate` with a per-type cache.
    pub fn new(delegate: Arc<dyn Introspector<R>>) -> Self {
        Self {
            delegate,
            cache: DashMap::new(),
        }
    }

    /// Eagerly scans every candidate bean.
    ///
    /// Returns the number of candidates processed. Intended for start-up, so
    /// malformed or cyclic beans fail the application instead of the first
    /// request that touches them.
    ///
    /// # Errors
    ///
    /// Returns [`IntrospectionInitError`] naming the first candidate whose
    /// scan failed.
    pub fn prewarm<I>(&self, beans: I) -> Result<usize, IntrospectionInitError>
    where
        I: IntoIterator<Item = BeanType>,
    {
        let mut count = 0;
        for bean in beans {
            tracing::debug!(bean = bean.name(), "introspecting request bean");
            self.resolvers_for(&bean)
                .map_err(|source| IntrospectionInitError {
                    bean: bean.name(),
                    source,
                })?;
            count += 1;
        }
        Ok(count)
    }

    /// Returns true if `bean` has a published entry.
    pub fn contains(&self, bean: &BeanType) -> bool {
        self.cache.contains_key(&bean.id())
    }

    /// Number of cached bean types.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns true if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl<R> Introspector<R> for CachedIntrospector<R> {
    fn resolvers_for(&self, bean: &BeanType) -> Result<ResolvedProperties<R>, IntrospectionError> {
        if let Some(hit) = self.cache.get(&bean.id()) {
            tracing::trace!(bean = bean.name(), "introspection cache hit");
            return Ok(Arc::clone(hit.value()));
        }

        // Scan outside the map lock; the delegate may take a while and must
        // not block lookups of other types in the same shard.
        let scanned = self.delegate.resolvers_for(bean)?;
        let published = self.cache.entry(bean.id()).or_insert(scanned);
        tracing::debug!(
            bean = bean.name(),
            properties = published.len(),
            "published introspection cache entry"
        );
        Ok(Arc::clone(published.value()))
    }
}
