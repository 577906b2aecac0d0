//! Typed property markers.
//!
//! A marker is any value type implementing [`Annotation`]. Markers are
//! attached to property descriptors and looked up by type, which stands in
//! for runtime annotation reflection: "does property P carry marker M, and
//! with what value?"

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A marker that can be attached to a bean property.
///
/// Implement this for any `'static` value type to use it as a custom marker:
///
/// Markers compare by value, so two properties described the same way carry
/// equal marker sets.
///
/// ```
/// use bean_binder::Annotation;
///
/// #[derive(Debug, PartialEq)]
/// struct Tenant(&'static str);
///
/// impl Annotation for Tenant {}
/// ```
pub trait Annotation: Any + Send + Sync + fmt::Debug + PartialEq {}

// Object-safe view used for storage; kept separate from `Annotation` so
// `Arc<dyn AnnotationObject>` never satisfies the blanket impl itself.
trait AnnotationObject: Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn marker_type(&self) -> TypeId;
    fn dyn_eq(&self, other: &dyn Any) -> bool;
}

impl<A: Annotation> AnnotationObject for A {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn marker_type(&self) -> TypeId {
        TypeId::of::<A>()
    }

    fn dyn_eq(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<A>().is_some_and(|other| self == other)
    }
}

/// The set of markers attached to one property.
///
/// At most one marker of each type is kept; adding a second marker of the
/// same type replaces the first.
#[derive(Clone, Default)]
pub struct Annotations {
    entries: Vec<Arc<dyn AnnotationObject>>,
}

impl Annotations {
    /// Creates an empty marker set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a marker, replacing any marker of the same type.
    pub fn insert<A: Annotation>(&mut self, marker: A) {
        let id = TypeId::of::<A>();
        self.entries.retain(|entry| entry.marker_type() != id);
        self.entries.push(Arc::new(marker));
    }

    /// Returns true if a marker of type `A` is present.
    pub fn has<A: Annotation>(&self) -> bool {
        let id = TypeId::of::<A>();
        self.entries.iter().any(|entry| entry.marker_type() == id)
    }

    /// Returns the marker of type `A`, if present.
    pub fn get<A: Annotation>(&self) -> Option<&A> {
        self.entries
            .iter()
            .find_map(|entry| entry.as_any().downcast_ref::<A>())
    }

    /// Number of markers in the set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no markers are attached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Annotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

// Order-insensitive: a set holds at most one marker per type.
impl PartialEq for Annotations {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().all(|entry| {
                other
                    .entries
                    .iter()
                    .any(|candidate| entry.dyn_eq(candidate.as_any()))
            })
    }
}

/// A marker carrying the name of the request value it binds.
pub trait NamedMarker: Annotation {
    /// The request value name; empty means "all values of this kind".
    fn value(&self) -> &str;
}

/// Marks a property whose type is itself a bean to be introspected
/// recursively rather than resolved directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BeanParameter;

impl Annotation for BeanParameter {}

/// Marks a property bound from request context objects (method, locale, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext;

impl Annotation for RequestContext {}

/// Marks a property bound from the deserialized request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestBody;

impl Annotation for RequestBody {}

macro_rules! named_markers {
    ($($(#[$meta:meta])* $name:ident;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Default, PartialEq, Eq)]
            pub struct $name {
                value: String,
            }

            impl $name {
                /// Creates the marker bound to the given request value name.
                pub fn new(value: impl Into<String>) -> Self {
                    Self { value: value.into() }
                }
            }

            impl Annotation for $name {}

            impl NamedMarker for $name {
                fn value(&self) -> &str {
                    &self.value
                }
            }
        )*
    };
}

named_markers! {
    /// Binds a query string or form parameter.
    RequestParameter;
    /// Binds a request header.
    HeaderParameter;
    /// Binds a cookie value.
    CookieParameter;
    /// Binds a form field from a url-encoded or multipart body.
    FormParameter;
    /// Binds a path variable extracted by the router.
    PathParameter;
    /// Binds a session attribute.
    SessionParameter;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Tenant(&'static str);

    impl Annotation for Tenant {}

    #[test]
    fn lookup_by_marker_type() {
        let mut markers = Annotations::new();
        markers.insert(RequestParameter::new("q"));
        markers.insert(Tenant("acme"));

        assert!(markers.has::<RequestParameter>());
        assert!(markers.has::<Tenant>());
        assert!(!markers.has::<HeaderParameter>());
        assert_eq!(markers.get::<RequestParameter>().map(|m| m.value()), Some("q"));
        assert_eq!(markers.get::<Tenant>(), Some(&Tenant("acme")));
    }

    #[test]
    fn insert_replaces_same_marker_type() {
        let mut markers = Annotations::new();
        markers.insert(HeaderParameter::new("X-First"));
        markers.insert(HeaderParameter::new("X-Second"));

        assert_eq!(markers.len(), 1);
        assert_eq!(
            markers.get::<HeaderParameter>().map(NamedMarker::value),
            Some("X-Second")
        );
    }

    #[test]
    fn empty_name_is_preserved() {
        let marker = RequestParameter::default();
        assert_eq!(marker.value(), "");
    }

    #[test]
    fn sets_compare_by_marker_value() {
        let mut markers = Annotations::new();
        markers.insert(BeanParameter);
        markers.insert(RequestParameter::new("q"));
        assert_eq!(markers, markers.clone());

        let mut rebuilt = Annotations::new();
        rebuilt.insert(RequestParameter::new("q"));
        rebuilt.insert(BeanParameter);
        assert_eq!(markers, rebuilt);

        let mut renamed = Annotations::new();
        renamed.insert(BeanParameter);
        renamed.insert(RequestParameter::new("query"));
        assert_ne!(markers, renamed);

        let mut fewer = Annotations::new();
        fewer.insert(BeanParameter);
        assert_ne!(markers, fewer);
    }

    #[test]
    fn different_marker_types_are_unequal() {
        let mut header = Annotations::new();
        header.insert(HeaderParameter::new("x"));
        let mut cookie = Annotations::new();
        cookie.insert(CookieParameter::new("x"));
        assert_ne!(header, cookie);
    }
}
