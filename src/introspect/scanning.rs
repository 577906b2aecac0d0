use std::sync::Arc;

use crate::bean::{registered_beans, BeanType};
use crate::error::{IntrospectionError, IntrospectionInitError};

use super::{CachedIntrospector, Introspector, ResolvedProperties};

/// Cached introspector that pre-warms every registered bean under a set of
/// base modules.
///
/// Beans register themselves with
/// [`register_request_bean!`](crate::register_request_bean). On
/// [`initialize`](Self::initialize) every registration whose module path is
/// one of the base modules, or nested below one, is scanned into the cache.
/// Lookups for beans outside the base modules still work; they are simply
/// scanned lazily on first use.
pub struct ScanningIntrospector<R> {
    cache: CachedIntrospector<R>,
    base_modules: Vec<String>,
}

impl<R> ScanningIntrospector<R> {
    /// Creates a scanning introspector over `delegate`.
    pub fn new<I, S>(delegate: Arc<dyn Introspector<R>>, base_modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut modules: Vec<String> = Vec::new();
        for module in base_modules {
            let module = module.into();
            if !modules.contains(&module) {
                modules.push(module);
            }
        }
        Self {
            cache: CachedIntrospector::new(delegate),
            base_modules: modules,
        }
    }

    /// The configured base modules.
    pub fn base_modules(&self) -> &[String] {
        &self.base_modules
    }

    /// Registered beans under the configured base modules.
    pub fn candidates(&self) -> Vec<BeanType> {
        let mut beans: Vec<BeanType> = Vec::new();
        for base in &self.base_modules {
            let found: Vec<BeanType> = registered_beans()
                .filter(|r| in_module(r.module_path(), base))
                .map(|r| r.bean())
                .collect();
            tracing::debug!(
                module = %base,
                found = found.len(),
                "found registered request beans"
            );
            for bean in found {
                if !beans.contains(&bean) {
                    beans.push(bean);
                }
            }
        }
        beans
    }

    /// Scans every candidate bean into the cache.
    ///
    /// # Errors
    ///
    /// Returns [`IntrospectionInitError`] for the first bean that fails to
    /// scan.
    pub fn initialize(&self) -> Result<usize, IntrospectionInitError> {
        self.cache.prewarm(self.candidates())
    }

    /// The underlying cache.
    pub fn cache(&self) -> &CachedIntrospector<R> {
        &self.cache
    }
}

impl<R> Introspector<R> for ScanningIntrospector<R> {
    fn resolvers_for(&self, bean: &BeanType) -> Result<ResolvedProperties<R>, IntrospectionError> {
        self.cache.resolvers_for(bean)
    }
}

/// Returns true if `module` is `base` or a descendant of it.
fn in_module(module: &str, base: &str) -> bool {
    match module.strip_prefix(base) {
        Some("") => true,
        Some(rest) => rest.starts_with("::"),
        None => false,
    }
}
