use runtime::{ObjectRef, Property, Realm, RuntimeError, Symbol, Value};
use rstest::rstest;
use proptest::prelude::*;

#[rstest]
#[case::boolean(Value::Bool(true), "Boolean")]
#[case::number(Value::Number(1.5), "Number")]
#[case::symbol(Value::Symbol(Symbol::new(Some("s"))), "Symbol")]
fn test_to_object_wraps_primitives(#[case] value: Value, #[case] class_name: &str) {
    let realm = Realm::new();
    let wrapper = realm.to_object(&value).unwrap();
    assert_eq!(wrapper.class_name(), class_name);
    assert!(value.same_value(&wrapper.primitive_value().unwrap()));
}

#[rstest]
#[case(Value::Null)]
#[case(Value::Undefined)]
fn test_to_object_rejects_nullish(#[case] value: Value) {
    let realm = Realm::new();
    match realm.to_object(&value) {
        Err(RuntimeError::TypeError(message)) => assert!(message.contains(value.type_name()), "{message}"),
        other => panic!("expected TypeError, got {other:?}"),
    }
}

#[test]
fn test_to_object_returns_objects_unchanged() {
    let realm = Realm::new();
    let object = realm.new_map();
    let coerced = realm.to_object(&Value::Object(object.clone())).unwrap();
    assert!(coerced.ptr_eq(&object));
}

#[test]
fn test_wrapper_inherits_from_intrinsic_prototype() {
    let mut realm = Realm::new();
    let number_prototype = realm.intrinsics().number_prototype.clone();
    realm.define_property(&number_prototype, "unit", Property::data(Value::Bool(true)));

    let wrapper = realm.to_object(&Value::Number(2.0)).unwrap();
    let unit = realm.key("unit");
    assert_eq!(realm.get(&wrapper, &unit, &Value::Number(2.0)).unwrap(), Value::Bool(true));
}

#[test]
fn test_string_wrapper_length_counts_characters() {
    let mut realm = Realm::new();
    let text = realm.string("héllo");
    let wrapper = realm.to_object(&text).unwrap();
    let length = realm.key("length");
    assert_eq!(realm.get(&wrapper, &length, &text).unwrap(), Value::Number(5.0));
    assert!(!wrapper.delete_own_property(&length));
}

#[test]
fn test_intrinsic_prototypes_share_object_prototype() {
    let realm = Realm::new();
    let intrinsics = realm.intrinsics();
    for prototype in [
        &intrinsics.function_prototype,
        &intrinsics.map_prototype,
        &intrinsics.weak_map_prototype,
        &intrinsics.string_prototype,
    ] {
        assert!(prototype.prototype().unwrap().ptr_eq(&intrinsics.object_prototype));
    }
    assert!(intrinsics.object_prototype.prototype().is_none());
}

#[test]
fn test_setter_error_surfaces_from_set() {
    let mut realm = Realm::new();
    let setter = realm.new_function("fail", |_, _, _| Err(RuntimeError::Thrown(Value::Null)));
    let object = realm.new_object();
    realm.define_property(&object, "x", Property::accessor(None, Some(setter)));
    let key = realm.key("x");
    let receiver = Value::Object(object.clone());
    assert!(matches!(realm.set(&object, &key, Value::Bool(true), &receiver), Err(RuntimeError::Thrown(Value::Null))));
}

#[test]
fn test_scope_chain_through_realm_global() {
    let mut realm = Realm::new();
    let x = realm.intern("x");
    let inner = realm.global().enter_block();
    inner.declare_let(x);
    assert!(realm.global().find_binding_scope(x).is_none());
    assert!(inner.initialize_binding(x, Value::Number(1.0)));
    assert_eq!(inner.get_binding(x, true, realm.string_interner()).unwrap(), Value::Number(1.0));
    assert!(inner.parent().unwrap().is_global());
}

fn chain_of(depth: usize, realm: &Realm) -> Vec<ObjectRef> {
    let mut objects = vec![realm.new_object()];
    for _ in 1..depth {
        let parent = objects.last().cloned();
        objects.push(realm.new_object_with_prototype(parent));
    }
    objects
}

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        cases: 32,
        .. proptest::test_runner::Config::default()
    })]

    #[test]
    fn prop_inherited_data_is_visible_at_any_depth(depth in 1usize..12, n in any::<i32>()) {
        let mut realm = Realm::new();
        let objects = chain_of(depth, &realm);
        realm.define_property(&objects[0], "root", Property::data(Value::number(n)));
        let key = realm.key("root");
        let leaf = objects.last().unwrap();
        prop_assert_eq!(realm.get(leaf, &key, &Value::Object(leaf.clone())).unwrap(), Value::number(n));
    }

    #[test]
    fn prop_same_value_is_reflexive(n in any::<f64>()) {
        let value = Value::Number(n);
        prop_assert!(value.same_value(&value.clone()));
    }
}
