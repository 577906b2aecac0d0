use std::fmt;
use std::sync::Arc;

use crate::property::BindingProperty;
use crate::registry::SharedResolver;

/// One bindable property reached from a root bean, with its resolver.
///
/// The path is the property name, dot-qualified by every nested bean
/// property it was reached through (e.g. `paging.page`). Immutable once
/// built; clones share the property and the resolver.
pub struct ResolvedPropertyData<R> {
    path: String,
    property: Arc<BindingProperty>,
    resolver: SharedResolver<R>,
}

impl<R> ResolvedPropertyData<R> {
    /// Creates an entry for the property at `path`.
    pub fn new(
        path: impl Into<String>,
        property: Arc<BindingProperty>,
        resolver: SharedResolver<R>,
    ) -> Self {
        Self {
            path: path.into(),
            property,
            resolver,
        }
    }

    /// Qualified property path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The binding property.
    pub fn property(&self) -> &BindingProperty {
        &self.property
    }

    /// The resolver assigned to the property.
    pub fn resolver(&self) -> &SharedResolver<R> {
        &self.resolver
    }

    /// Copy of this entry with its path prefixed by `prefix.`.
    pub(crate) fn qualified(&self, prefix: &str) -> Self {
        Self {
            path: format!("{prefix}.{}", self.path),
            property: Arc::clone(&self.property),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<R> Clone for ResolvedPropertyData<R> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            property: Arc::clone(&self.property),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

// Resolvers have no value equality; entries match when they were assigned
// the same resolver instance.
impl<R> PartialEq for ResolvedPropertyData<R> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && self.property == other.property
            && Arc::ptr_eq(&self.resolver, &other.resolver)
    }
}

impl<R> fmt::Debug for ResolvedPropertyData<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedPropertyData")
            .field("path", &self.path)
            .field("type", &self.property.ty())
            .field("resolver", &self.resolver.describe())
            .finish()
    }
}
