//! Request bean types and their property tables.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::property::{PropertyDescriptor, TypeInfo};

/// A type whose properties are bound from request data.
///
/// Rust has no runtime reflection, so a bean describes its own properties.
/// Properties are enumerated in the order they are added to the descriptor,
/// and that order is the order of the introspected entries.
///
/// # Examples
///
/// ```
/// use bean_binder::{BeanDescriptor, BeanParameter, PropertyDescriptor, RequestBean, RequestParameter};
///
/// struct Paging {
///     page: u32,
/// }
///
/// struct Search {
///     query: String,
///     paging: Paging,
/// }
///
/// impl RequestBean for Paging {
///     fn describe() -> BeanDescriptor {
///         BeanDescriptor::new()
///             .property(PropertyDescriptor::primitive::<u32>("page").marker(RequestParameter::new("p")))
///     }
/// }
///
/// impl RequestBean for Search {
///     fn describe() -> BeanDescriptor {
///         BeanDescriptor::new()
///             .property(PropertyDescriptor::new::<String>("query").marker(RequestParameter::new("q")))
///             .property(PropertyDescriptor::bean::<Paging>("paging").marker(BeanParameter))
///     }
/// }
/// ```
pub trait RequestBean: 'static {
    /// Returns the property table for this type.
    fn describe() -> BeanDescriptor;
}

/// Ordered property table of a bean type.
#[derive(Debug, Clone, Default)]
pub struct BeanDescriptor {
    properties: Vec<PropertyDescriptor>,
}

impl BeanDescriptor {
    /// Creates an empty property table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a property.
    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// The declared properties, in declaration order.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub(crate) fn into_properties(self) -> Vec<PropertyDescriptor> {
        self.properties
    }
}

/// Type-erased handle to a [`RequestBean`] type.
///
/// This is the cache key and the unit of introspection. Two handles are
/// equal when they name the same Rust type.
#[derive(Clone, Copy)]
pub struct BeanType {
    info: TypeInfo,
    describe: fn() -> BeanDescriptor,
}

impl BeanType {
    /// Returns the handle for bean type `B`.
    pub fn of<B: RequestBean>() -> Self {
        Self {
            info: TypeInfo::of::<B>(),
            describe: B::describe,
        }
    }

    /// Runtime type information of the bean.
    pub fn type_info(&self) -> TypeInfo {
        self.info
    }

    /// The bean's `TypeId`.
    pub fn id(&self) -> TypeId {
        self.info.id()
    }

    /// The bean's type name.
    pub fn name(&self) -> &'static str {
        self.info.name()
    }

    /// Builds the bean's property table.
    pub fn descriptor(&self) -> BeanDescriptor {
        (self.describe)()
    }
}

impl PartialEq for BeanType {
    fn eq(&self, other: &Self) -> bool {
        self.info == other.info
    }
}

impl Eq for BeanType {}

impl Hash for BeanType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.info.hash(state);
    }
}

impl fmt::Debug for BeanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BeanType({})", self.info.name())
    }
}

/// Link-time registration of a request bean, collected with `inventory`.
///
/// Created by [`register_request_bean!`](crate::register_request_bean); the
/// module path lets start-up scanning pick beans by module prefix.
pub struct RequestBeanRegistration {
    module_path: &'static str,
    bean: fn() -> BeanType,
}

impl RequestBeanRegistration {
    #[doc(hidden)]
    pub const fn new(module_path: &'static str, bean: fn() -> BeanType) -> Self {
        Self { module_path, bean }
    }

    /// Module the bean was registered from.
    pub fn module_path(&self) -> &'static str {
        self.module_path
    }

    /// The registered bean type.
    pub fn bean(&self) -> BeanType {
        (self.bean)()
    }
}

inventory::collect!(RequestBeanRegistration);

/// Iterates over every bean registered with
/// [`register_request_bean!`](crate::register_request_bean).
pub fn registered_beans() -> impl Iterator<Item = &'static RequestBeanRegistration> {
    inventory::iter::<RequestBeanRegistration>.into_iter()
}

/// Registers a [`RequestBean`] type for start-up scanning.
///
/// The registration records the invoking module's path.
///
/// ```ignore
/// struct Search { /* ... */ }
/// impl bean_binder::RequestBean for Search { /* ... */ }
///
/// bean_binder::register_request_bean!(Search);
/// ```
#[macro_export]
macro_rules! register_request_bean {
    ($ty:ty) => {
        $crate::__private::inventory::submit! {
            $crate::RequestBeanRegistration::new(
                ::core::module_path!(),
                $crate::BeanType::of::<$ty>,
            )
        }
    };
}
