//! Property metadata: declared types, accessors and binding properties.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::annotation::{Annotation, Annotations};
use crate::bean::{BeanType, RequestBean};
use crate::error::IntrospectionError;

/// Runtime identity of a property's declared type.
///
/// Types declared with [`TypeInfo::primitive`] remember their nullable
/// wrapper so [`TypeInfo::object_type`] can widen `i32` to `Option<i32>`.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
    boxed: Option<(TypeId, &'static str)>,
}

impl TypeInfo {
    /// Type information for a reference (non-primitive) type.
    pub fn of<T: ?Sized + Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            boxed: None,
        }
    }

    /// Type information for a primitive whose object form is `Option<T>`.
    pub fn primitive<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            boxed: Some((TypeId::of::<Option<T>>(), type_name::<Option<T>>())),
        }
    }

    /// The type's `TypeId`.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The type's name as reported by the compiler.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if this was declared as a primitive.
    pub fn is_primitive(&self) -> bool {
        self.boxed.is_some()
    }

    /// Returns true if this describes `T`.
    pub fn is<T: ?Sized + Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// The nullable object form of this type.
    ///
    /// Primitives widen to their `Option` wrapper; every other type is its
    /// own object type.
    pub fn object_type(&self) -> TypeInfo {
        match self.boxed {
            Some((id, name)) => TypeInfo {
                id,
                name,
                boxed: None,
            },
            None => *self,
        }
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Whether an accessor reads or writes the property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    /// Reads the property value
    Getter,
    /// Writes the property value
    Setter,
}

/// Handle to one accessor method of a property.
///
/// The binding consumer uses this to locate the method on the declaring
/// type when it applies resolved values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    kind: AccessorKind,
    method: String,
    declaring: TypeInfo,
}

impl Accessor {
    /// Getter or setter.
    pub fn kind(&self) -> AccessorKind {
        self.kind
    }

    /// Accessor method name.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The type declaring the accessor.
    pub fn declaring_type(&self) -> TypeInfo {
        self.declaring
    }
}

/// Declarative description of one property, as returned by
/// [`RequestBean::describe`](crate::RequestBean::describe).
///
/// By default a property has a getter named after it and a setter named
/// `set_<name>`.
///
/// # Examples
///
/// ```
/// use bean_binder::{PropertyDescriptor, RequestParameter};
///
/// let page = PropertyDescriptor::primitive::<u32>("page")
///     .marker(RequestParameter::new("p"))
///     .without_setter();
/// assert_eq!(page.name(), "page");
/// ```
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    name: String,
    ty: TypeInfo,
    nested: Option<BeanType>,
    annotations: Annotations,
    getter: Option<String>,
    setter: Option<String>,
}

impl PropertyDescriptor {
    /// Describes a property of reference type `T`.
    pub fn new<T: Any>(name: impl Into<String>) -> Self {
        Self::with_type(name.into(), TypeInfo::of::<T>(), None)
    }

    /// Describes a property of primitive type `T`.
    pub fn primitive<T: Any>(name: impl Into<String>) -> Self {
        Self::with_type(name.into(), TypeInfo::primitive::<T>(), None)
    }

    /// Describes a property whose type is itself a request bean.
    ///
    /// Such a property is scanned recursively when it also carries
    /// [`BeanParameter`](crate::BeanParameter).
    pub fn bean<B: RequestBean>(name: impl Into<String>) -> Self {
        let bean = BeanType::of::<B>();
        Self::with_type(name.into(), bean.type_info(), Some(bean))
    }

    fn with_type(name: String, ty: TypeInfo, nested: Option<BeanType>) -> Self {
        Self {
            getter: Some(name.clone()),
            setter: Some(format!("set_{name}")),
            name,
            ty,
            nested,
            annotations: Annotations::new(),
        }
    }

    /// Attaches a marker to the property.
    pub fn marker<A: Annotation>(mut self, marker: A) -> Self {
        self.annotations.insert(marker);
        self
    }

    /// Renames the getter method.
    pub fn getter(mut self, method: impl Into<String>) -> Self {
        self.getter = Some(method.into());
        self
    }

    /// Renames the setter method.
    pub fn setter(mut self, method: impl Into<String>) -> Self {
        self.setter = Some(method.into());
        self
    }

    /// Removes the getter.
    pub fn without_getter(mut self) -> Self {
        self.getter = None;
        self
    }

    /// Removes the setter.
    pub fn without_setter(mut self) -> Self {
        self.setter = None;
        self
    }

    /// The property name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// One bindable property of a bean, built from its descriptor during a scan.
///
/// Identity is the declaring type plus the property name. Immutable once
/// built and shared read-only by every entry that refers to it.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingProperty {
    declaring: TypeInfo,
    name: String,
    ty: TypeInfo,
    nested: Option<BeanType>,
    annotations: Annotations,
    primary: Accessor,
    getter: Option<Accessor>,
    setter: Option<Accessor>,
}

impl BindingProperty {
    /// Builds a binding property for a descriptor declared on `declaring`.
    ///
    /// # Errors
    ///
    /// Returns [`IntrospectionError::IllegalPropertyDefinition`] if the
    /// descriptor has neither a getter nor a setter, or if its name is empty
    /// or contains the path separator `.`.
    pub fn for_descriptor(
        declaring: TypeInfo,
        descriptor: PropertyDescriptor,
    ) -> Result<Self, IntrospectionError> {
        if descriptor.name.is_empty() {
            return Err(IntrospectionError::illegal(
                declaring.name(),
                descriptor.name,
                "property name must not be empty",
            ));
        }
        // `.` is reserved as the nested path separator.
        if descriptor.name.contains('.') {
            return Err(IntrospectionError::illegal(
                declaring.name(),
                descriptor.name,
                "property name must not contain `.`",
            ));
        }
        let accessor = |kind, method| Accessor {
            kind,
            method,
            declaring,
        };
        let getter = descriptor.getter.map(|m| accessor(AccessorKind::Getter, m));
        let setter = descriptor.setter.map(|m| accessor(AccessorKind::Setter, m));
        let primary = match setter.as_ref().or(getter.as_ref()) {
            Some(primary) => primary.clone(),
            None => {
                return Err(IntrospectionError::illegal(
                    declaring.name(),
                    descriptor.name,
                    "property does not have a getter or setter method",
                ))
            }
        };

        Ok(Self {
            declaring,
            name: descriptor.name,
            ty: descriptor.ty,
            nested: descriptor.nested,
            annotations: descriptor.annotations,
            primary,
            getter,
            setter,
        })
    }

    /// The unqualified property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type declaring this property.
    pub fn declaring_type(&self) -> TypeInfo {
        self.declaring
    }

    /// The declared property type.
    pub fn ty(&self) -> TypeInfo {
        self.ty
    }

    /// The declared type widened to its nullable object form.
    pub fn object_type(&self) -> TypeInfo {
        self.ty.object_type()
    }

    /// The bean type to recurse into, if the declared type is a bean.
    pub fn bean_type(&self) -> Option<&BeanType> {
        self.nested.as_ref()
    }

    /// Returns true if the property carries marker `A`.
    pub fn has_annotation<A: Annotation>(&self) -> bool {
        self.annotations.has::<A>()
    }

    /// Returns marker `A` if the property carries it.
    pub fn annotation<A: Annotation>(&self) -> Option<&A> {
        self.annotations.get::<A>()
    }

    /// All markers on the property.
    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// The primary accessor handle: the setter when present, else the getter.
    pub fn accessor(&self) -> &Accessor {
        &self.primary
    }

    /// The getter handle, if any.
    pub fn getter(&self) -> Option<&Accessor> {
        self.getter.as_ref()
    }

    /// The setter handle, if any.
    pub fn setter(&self) -> Option<&Accessor> {
        self.setter.as_ref()
    }
}
