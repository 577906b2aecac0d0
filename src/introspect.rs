//! Bean introspection: turning a bean type into its resolved properties.
//!
//! This module provides:
//! - `Introspector`: The scan contract shared by every layer
//! - `DefaultIntrospector`: Recursive scanner with circular reference detection
//! - `CachedIntrospector`: Per-type memoization with start-up pre-warming
//! - `ScanningIntrospector`: Pre-warms beans registered under given modules
//! - `ResolvedPropertyData`: One bindable property and the resolver assigned to it
//!
//! Scanning is a pure function of the bean type and the (frozen) resolver
//! registry, which is what makes caching the result for the life of the
//! process safe.

mod cached;
mod default;
mod resolved;
mod scanning;

use std::sync::Arc;

use indexmap::IndexMap;

use crate::bean::BeanType;
use crate::error::IntrospectionError;

pub use cached::CachedIntrospector;
pub use default::DefaultIntrospector;
pub use resolved::ResolvedPropertyData;
pub use scanning::ScanningIntrospector;

/// Resolved properties of one bean type, in property order.
pub type ResolvedProperties<R> = Arc<[ResolvedPropertyData<R>]>;

/// Resolved properties keyed by qualified path, in property order.
pub type ResolverMap<R> = IndexMap<String, ResolvedPropertyData<R>>;

/// Produces the resolved property list for a bean type.
pub trait Introspector<R>: Send + Sync {
    /// Returns the resolved properties of `bean`, walking nested beans.
    ///
    /// # Errors
    ///
    /// Fails with [`IntrospectionError::CircularReference`] if a nested
    /// property reaches a type already being scanned, and with
    /// [`IntrospectionError::IllegalPropertyDefinition`] for malformed
    /// properties. Either aborts the whole scan.
    fn resolvers_for(&self, bean: &BeanType) -> Result<ResolvedProperties<R>, IntrospectionError>;

    /// Returns the resolved properties keyed by qualified path.
    fn resolver_map_for(&self, bean: &BeanType) -> Result<ResolverMap<R>, IntrospectionError> {
        let resolved = self.resolvers_for(bean)?;
        Ok(resolved
            .iter()
            .map(|data| (data.path().to_string(), data.clone()))
            .collect())
    }
}
