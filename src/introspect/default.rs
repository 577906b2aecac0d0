use std::collections::HashSet;
use std::sync::Arc;

use crate::annotation::BeanParameter;
use crate::bean::BeanType;
use crate::error::IntrospectionError;
use crate::property::BindingProperty;
use crate::registry::ResolverRegistry;

use super::{Introspector, ResolvedProperties, ResolvedPropertyData};

/// The main introspector: decides which resolver is attached to which
/// bean property.
///
/// Walks a bean's properties in declaration order. A property marked with
/// [`BeanParameter`] whose type is itself a bean is scanned recursively and
/// its entries are spliced in place, with paths qualified by the property
/// name. Every other property is matched against the registry; properties no
/// resolver supports are skipped.
///
/// Nested beans are tracked on an ancestor chain (root to current), so the
/// same bean type may appear in unrelated branches but never inside itself.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use bean_binder::{
///     BeanDescriptor, BeanParameter, BeanType, BindingProperty, DefaultIntrospector, Introspector,
///     PropertyDescriptor, PropertyResolver, RequestBean, RequestParameter, ResolveError,
///     ResolverRegistry, Value,
/// };
///
/// struct Params;
///
/// impl PropertyResolver<()> for Params {
///     fn supports(&self, p: &BindingProperty) -> bool { p.has_annotation::<RequestParameter>() }
///     fn resolve(&self, _: &BindingProperty, _: &()) -> Result<Option<Value>, ResolveError> { Ok(None) }
/// }
///
/// struct Inner;
/// struct Outer;
///
/// impl RequestBean for Inner {
///     fn describe() -> BeanDescriptor {
///         BeanDescriptor::new()
///             .property(PropertyDescriptor::new::<String>("inner").marker(RequestParameter::new("inner_param")))
///     }
/// }
///
/// impl RequestBean for Outer {
///     fn describe() -> BeanDescriptor {
///         BeanDescriptor::new()
///             .property(PropertyDescriptor::bean::<Inner>("inner_bean").marker(BeanParameter))
///     }
/// }
///
/// let mut registry = ResolverRegistry::new();
/// registry.register(Params);
/// let introspector = DefaultIntrospector::new(Arc::new(registry));
///
/// let resolved = introspector.resolvers_for(&BeanType::of::<Outer>()).unwrap();
/// assert_eq!(resolved.len(), 1);
/// assert_eq!(resolved[0].path(), "inner_bean.inner");
/// ```
pub struct DefaultIntrospector<R> {
    registry: Arc<ResolverRegistry<R>>,
}

impl<R> DefaultIntrospector<R> {
    /// Creates an introspector matching properties against `registry`.
    pub fn new(registry: Arc<ResolverRegistry<R>>) -> Self {
        Self { registry }
    }

    /// The registry used for matching.
    pub fn registry(&self) -> &ResolverRegistry<R> {
        &self.registry
    }

    fn scan(
        &self,
        bean: &BeanType,
        ancestors: &mut Vec<BeanType>,
    ) -> Result<Vec<ResolvedPropertyData<R>>, IntrospectionError> {
        let declaring = bean.type_info();
        let mut names = HashSet::new();
        let mut resolved = Vec::new();

        for descriptor in bean.descriptor().into_properties() {
            if !names.insert(descriptor.name().to_string()) {
                return Err(IntrospectionError::illegal(
                    bean.name(),
                    descriptor.name(),
                    "property is declared more than once",
                ));
            }
            let property = BindingProperty::for_descriptor(declaring, descriptor)?;

            // A nested marker on a non-bean type binds the property directly.
            let nested = property
                .bean_type()
                .filter(|_| property.has_annotation::<BeanParameter>())
                .copied();

            match nested {
                Some(nested) => {
                    if ancestors.contains(&nested) {
                        let mut cycle: Vec<_> = ancestors.iter().map(BeanType::name).collect();
                        cycle.push(nested.name());
                        return Err(IntrospectionError::CircularReference {
                            bean: nested.name(),
                            cycle,
                        });
                    }
                    ancestors.push(nested);
                    let inner = self.scan(&nested, ancestors);
                    ancestors.pop();
                    resolved.extend(inner?.iter().map(|data| data.qualified(property.name())));
                }
                None => match self.registry.find_resolver_for(&property) {
                    Some(resolver) => {
                        let resolver = Arc::clone(resolver);
                        let path = property.name().to_string();
                        resolved.push(ResolvedPropertyData::new(path, Arc::new(property), resolver));
                    }
                    None => tracing::trace!(
                        bean = bean.name(),
                        property = property.name(),
                        "no resolver supports property, skipping"
                    ),
                },
            }
        }

        Ok(resolved)
    }
}

impl<R> Introspector<R> for DefaultIntrospector<R> {
    fn resolvers_for(&self, bean: &BeanType) -> Result<ResolvedProperties<R>, IntrospectionError> {
        let mut ancestors = vec![*bean];
        let resolved = self.scan(bean, &mut ancestors)?;
        tracing::debug!(
            bean = bean.name(),
            properties = resolved.len(),
            "introspected request bean"
        );
        Ok(resolved.into())
    }
}
