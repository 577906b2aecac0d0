//! Values produced by resolvers and the per-request value mapping.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

/// A value resolved from a request.
///
/// The binding core does no coercion: resolvers hand back raw request data
/// and the binding consumer converts it to the property's declared type.
#[derive(Clone)]
pub enum Value {
    /// A single textual value
    Text(String),
    /// All values of a repeated key, in arrival order
    List(Vec<String>),
    /// First value per key (e.g. all query parameters)
    Map(IndexMap<String, String>),
    /// Every value per key
    MultiMap(IndexMap<String, Vec<String>>),
    /// Raw bytes (uploaded files, bodies)
    Bytes(Vec<u8>),
    /// A request-context object such as a locale or the request itself
    Object(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Wraps an arbitrary context object.
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Value::Object(Arc::new(value))
    }

    /// Returns the text if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the values if this is a `List` value.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }

    /// Downcasts an `Object` value to a concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Object(obj) => obj.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Value::List(values) => f.debug_tuple("List").field(values).finish(),
            Value::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Value::MultiMap(map) => f.debug_tuple("MultiMap").field(map).finish(),
            Value::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            Value::Object(_) => f.write_str("Object(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::MultiMap(a), Value::MultiMap(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            // Context objects have no value equality; same instance only.
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Vec<String>> for Value {
    fn from(values: Vec<String>) -> Self {
        Value::List(values)
    }
}

/// Resolved values for one target type, keyed by qualified property path.
///
/// Iteration follows the introspected property order. Absent values are
/// never stored, so "not provided" is always represented by a missing key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyValues {
    values: IndexMap<String, Value>,
}

impl PropertyValues {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a value for the given path.
    pub fn insert(&mut self, path: impl Into<String>, value: Value) {
        self.values.insert(path.into(), value);
    }

    /// Returns the value for the given path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.values.get(path)
    }

    /// Returns true if a value was resolved for the path.
    pub fn contains(&self, path: &str) -> bool {
        self.values.contains_key(path)
    }

    /// Iterates over `(path, value)` pairs in property order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over resolved paths in property order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of resolved values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing was resolved.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for PropertyValues {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
