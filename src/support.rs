//! Helpers handed to binding consumers.

use std::sync::Arc;

use crate::value::{PropertyValues, Value};

/// Read-only view over the values resolved for one request and target type.
///
/// Given to [`DataBinder::construct`](crate::DataBinder::construct) so a
/// consumer can look up constructor arguments by property path before the
/// bind phase runs. Cloning is cheap; the values are shared.
#[derive(Debug, Clone)]
pub struct MapValueResolver {
    values: Arc<PropertyValues>,
}

impl MapValueResolver {
    /// Wraps a resolved mapping.
    pub fn new(values: Arc<PropertyValues>) -> Self {
        Self { values }
    }

    /// Looks up the value resolved for `name`.
    ///
    /// `None` means the request did not provide the property.
    pub fn resolve_value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Paths that have a value, in property order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.paths()
    }

    /// The underlying mapping.
    pub fn values(&self) -> &PropertyValues {
        &self.values
    }
}
