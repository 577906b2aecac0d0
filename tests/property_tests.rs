//! Integration property tests for bean-binder.
//!
//! These tests validate resolver ordering, cache idempotence and the
//! resolved mapping across arbitrary inputs.

use std::collections::HashMap;
use std::sync::Arc;

use bean_binder::{
    BeanDescriptor, BeanParameter, BeanType, BinderBuilder, BindingProperty, CachedIntrospector,
    DefaultIntrospector, Introspector, PropertyDescriptor, PropertyResolver, RequestBean,
    RequestParameter, RequestScope, ResolveError, ResolverRegistry, Value,
};
use proptest::prelude::*;

struct Fixed(bool);

impl PropertyResolver<()> for Fixed {
    fn supports(&self, _: &BindingProperty) -> bool {
        self.0
    }

    fn resolve(&self, _: &BindingProperty, _: &()) -> Result<Option<Value>, ResolveError> {
        Ok(None)
    }
}

struct Params;

impl PropertyResolver<HashMap<String, String>> for Params {
    fn supports(&self, property: &BindingProperty) -> bool {
        property.has_annotation::<RequestParameter>()
    }

    fn resolve(
        &self,
        property: &BindingProperty,
        request: &HashMap<String, String>,
    ) -> Result<Option<Value>, ResolveError> {
        let name = bean_binder::marker_name::<RequestParameter>(property)?;
        Ok(request.get(name).cloned().map(Value::Text))
    }
}

struct Paging;

impl RequestBean for Paging {
    fn describe() -> BeanDescriptor {
        BeanDescriptor::new()
            .property(PropertyDescriptor::primitive::<u32>("page").marker(RequestParameter::new("page")))
            .property(PropertyDescriptor::primitive::<u32>("size").marker(RequestParameter::new("size")))
    }
}

struct Search;

impl RequestBean for Search {
    fn describe() -> BeanDescriptor {
        BeanDescriptor::new()
            .property(PropertyDescriptor::new::<String>("query").marker(RequestParameter::new("query")))
            .property(PropertyDescriptor::bean::<Paging>("paging").marker(BeanParameter))
            .property(PropertyDescriptor::new::<String>("sort").marker(RequestParameter::new("sort")))
    }
}

/// Request parameter names and the paths they bind to, in property order.
const PARAMS: [(&str, &str); 4] = [
    ("query", "query"),
    ("page", "paging.page"),
    ("size", "paging.size"),
    ("sort", "sort"),
];

fn arb_value() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9]{0,8}").unwrap()
}

proptest! {
    /// Property: lookup returns the earliest registered supporting resolver.
    #[test]
    fn proptest_first_supporting_resolver_wins(supports in prop::collection::vec(any::<bool>(), 0..12)) {
        let mut registry = ResolverRegistry::<()>::new();
        let handles: Vec<_> = supports.iter().map(|s| registry.register(Fixed(*s))).collect();

        let property = BindingProperty::for_descriptor(
            BeanType::of::<Search>().type_info(),
            PropertyDescriptor::new::<String>("any"),
        )
        .unwrap();

        let expected = supports.iter().position(|s| *s);
        let found = registry.find_resolver_for(&property);
        match (expected, found) {
            (Some(index), Some(found)) => prop_assert!(Arc::ptr_eq(found, &handles[index])),
            (None, None) => {}
            (expected, found) => prop_assert!(false, "expected {:?}, found {:?}", expected, found.map(|r| r.describe())),
        }
    }

    /// Property: re-adding registered instances never changes the order.
    #[test]
    fn proptest_readding_is_idempotent(picks in prop::collection::vec(0usize..5, 0..20)) {
        let mut registry = ResolverRegistry::<()>::new();
        let handles: Vec<_> = (0..5).map(|i| registry.register(Fixed(i % 2 == 0))).collect();

        for pick in picks {
            prop_assert!(!registry.add_resolver(Arc::clone(&handles[pick])));
        }

        prop_assert_eq!(registry.len(), handles.len());
        for (registered, handle) in registry.resolvers().iter().zip(&handles) {
            prop_assert!(Arc::ptr_eq(registered, handle));
        }
    }

    /// Property: the mapping holds exactly the provided parameters, in property order.
    #[test]
    fn proptest_mapping_holds_provided_values(
        provided in prop::collection::vec(prop::option::of(arb_value()), 4)
    ) {
        let binder = BinderBuilder::new()
            .resolver(Params)
            .request_bean::<Search>()
            .build()
            .unwrap();

        let request: HashMap<String, String> = PARAMS
            .iter()
            .zip(&provided)
            .filter_map(|((name, _), value)| value.clone().map(|v| (name.to_string(), v)))
            .collect();
        let mut scope = RequestScope::new(&request, "req-prop");
        let values = binder.resolve_all(&BeanType::of::<Search>(), &mut scope).unwrap();

        let expected: Vec<_> = PARAMS
            .iter()
            .zip(&provided)
            .filter(|(_, value)| value.is_some())
            .map(|((_, path), _)| *path)
            .collect();
        prop_assert_eq!(values.paths().collect::<Vec<_>>(), expected);

        for ((name, path), _) in PARAMS.iter().zip(&provided) {
            prop_assert_eq!(values.get(path).and_then(Value::as_text), request.get(*name).map(String::as_str));
        }
    }

    /// Property: cached lookups return the same entry however often they run.
    #[test]
    fn proptest_cached_lookup_is_idempotent(lookups in 1usize..10) {
        let mut registry = ResolverRegistry::<HashMap<String, String>>::new();
        registry.register(Params);
        let delegate = DefaultIntrospector::new(Arc::new(registry));
        let cache = CachedIntrospector::<HashMap<String, String>>::new(Arc::new(delegate));
        let bean = BeanType::of::<Search>();

        let first = cache.resolvers_for(&bean).unwrap();
        for _ in 0..lookups {
            let again = cache.resolvers_for(&bean).unwrap();
            prop_assert!(Arc::ptr_eq(&first, &again));
        }

        let paths: Vec<_> = first.iter().map(|d| d.path()).collect();
        let expected: Vec<_> = PARAMS.iter().map(|(_, path)| *path).collect();
        prop_assert_eq!(paths, expected);
        prop_assert_eq!(cache.len(), 1);
    }
}
