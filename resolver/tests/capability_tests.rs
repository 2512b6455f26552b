mod common;
use common::{abstract_ref, assert_missing_capability, counting_capability};

use std::cell::Cell;
use std::rc::Rc;
use resolver::runtime::{ObjectRef, Value};
use resolver::{Capability, EngineConfig, EvaluationContext, ResolveError};

#[test]
fn test_instance_capability_overrides_prototype() {
    let mut cx = EvaluationContext::new();
    let special = cx.realm.new_map();
    cx.capabilities.install(&special, Capability::new().on_read(|_, _, _| Ok(Value::Bool(true))));
    let plain = cx.realm.new_map();
    let base = Value::Object(cx.realm.new_object());

    let special_ref = abstract_ref(&cx, base.clone(), &special, false);
    let plain_ref = abstract_ref(&cx, base, &plain, false);
    assert_eq!(cx.get_value(&special_ref).unwrap(), Value::Bool(true));
    assert_eq!(cx.get_value(&plain_ref).unwrap(), Value::Undefined);
}

#[test]
fn test_partial_capability_falls_through_to_prototype() {
    let mut cx = EvaluationContext::new();
    let map = cx.realm.new_map();
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    cx.capabilities.install(
        &map,
        Capability::new().on_read(move |_, _, _| {
            counter.set(counter.get() + 1);
            Ok(Value::Number(-1.0))
        }),
    );
    let object = Value::Object(cx.realm.new_object());
    let reference = abstract_ref(&cx, object, &map, false);

    // Writes and deletes reach the map handler on the prototype.
    cx.put_value(&reference, Value::Number(5.0)).unwrap();
    assert_eq!(cx.get_value(&reference).unwrap(), Value::Number(-1.0));
    assert!(cx.delete_reference(&reference).unwrap());
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_user_prototype_capability_applies_to_descendants() {
    let mut cx = EvaluationContext::new();
    let proto = cx.realm.new_object();
    let calls = Rc::new(Cell::new(0));
    cx.capabilities.install(&proto, counting_capability(calls.clone()));
    let name = cx.realm.new_object_with_prototype(Some(proto));
    let grandchild = cx.realm.new_object_with_prototype(Some(name.clone()));
    let base = cx.realm.string("x");

    for name in [&name, &grandchild] {
        let reference = abstract_ref(&cx, base.clone(), name, true);
        cx.get_value(&reference).unwrap();
        cx.put_value(&reference, Value::Null).unwrap();
        cx.delete_reference(&reference).unwrap();
    }
    assert_eq!(calls.get(), 6);
}

#[test]
fn test_prototype_change_is_seen_by_existing_reference() {
    let mut cx = EvaluationContext::new();
    let name = cx.realm.new_object();
    let object = Value::Object(cx.realm.new_object());
    let reference = abstract_ref(&cx, object, &name, false);
    assert_missing_capability(cx.get_value(&reference));

    let map_prototype = cx.realm.intrinsics().map_prototype.clone();
    assert!(name.set_prototype(Some(map_prototype)));
    // Now dispatched to the map handler, which rejects a non-map name.
    assert!(matches!(cx.get_value(&reference), Err(ResolveError::TypeError(_))));
}

#[test]
fn test_uninstalled_capability_is_missing() {
    let mut cx = EvaluationContext::new();
    let map = cx.realm.new_map();
    let object = Value::Object(cx.realm.new_object());
    let reference = abstract_ref(&cx, object, &map, false);
    cx.put_value(&reference, Value::Number(1.0)).unwrap();

    let map_prototype = cx.realm.intrinsics().map_prototype.clone();
    assert!(cx.capabilities.uninstall(&map_prototype).is_some());
    assert_missing_capability(cx.get_value(&reference));
    assert_missing_capability(cx.put_value(&reference, Value::Number(2.0)));
}

#[test]
fn test_missing_capability_reports_operation() {
    let mut cx = EvaluationContext::new();
    let name = cx.realm.new_object();
    let reference = abstract_ref(&cx, Value::Number(1.0), &name, false);
    let error = cx.put_value(&reference, Value::Null).unwrap_err();
    assert_eq!(error.to_string(), "TypeError: Object does not implement reference write");
}

#[test]
fn test_handler_may_resolve_other_references() {
    let mut cx = EvaluationContext::new();
    let storage = cx.realm.new_map();
    let name = cx.realm.new_object();
    let inner = storage.clone();
    cx.capabilities.install(
        &name,
        Capability::new()
            .on_read(move |cx, _, receiver| {
                let reference = cx.make_abstract_reference(Value::Object(receiver.clone()), Value::Object(inner.clone()), false)?;
                cx.get_value(&reference)
            }),
    );
    let object = cx.realm.new_object();
    let direct = abstract_ref(&cx, Value::Object(object.clone()), &storage, false);
    cx.put_value(&direct, Value::Number(8.0)).unwrap();

    let forwarded = abstract_ref(&cx, Value::Object(object), &name, false);
    assert_eq!(cx.get_value(&forwarded).unwrap(), Value::Number(8.0));
}

fn self_recursive(cx: &mut EvaluationContext) -> ObjectRef {
    let name = cx.realm.new_object();
    cx.capabilities.install(
        &name,
        Capability::new().on_read(|cx, name, receiver| {
            let again = cx.make_abstract_reference(Value::Object(receiver.clone()), Value::Object(name.clone()), false)?;
            cx.get_value(&again)
        }),
    );
    name
}

#[test]
fn test_runaway_dispatch_is_bounded() {
    let mut cx = EvaluationContext::with_config(EngineConfig::default().with_max_dispatch_depth(8));
    let name = self_recursive(&mut cx);
    let base = Value::Object(cx.realm.new_object());
    let reference = abstract_ref(&cx, base.clone(), &name, false);

    assert!(matches!(cx.get_value(&reference), Err(ResolveError::DispatchDepthExceeded(8))));

    // The depth counter unwinds, so later dispatches are unaffected.
    let map = cx.realm.new_map();
    let map_ref = abstract_ref(&cx, base, &map, false);
    cx.put_value(&map_ref, Value::Number(1.0)).unwrap();
    assert_eq!(cx.get_value(&map_ref).unwrap(), Value::Number(1.0));
}

#[test]
fn test_builtins_can_be_disabled() {
    let mut cx = EvaluationContext::with_config(EngineConfig::default().with_builtins(false));
    let map = cx.realm.new_map();
    let f = cx.realm.new_function("f", |_, _, _| Ok(Value::Undefined));
    let object = Value::Object(cx.realm.new_object());

    let map_ref = abstract_ref(&cx, object.clone(), &map, false);
    let f_ref = abstract_ref(&cx, object, &f, false);
    assert_missing_capability(cx.get_value(&map_ref));
    assert_missing_capability(cx.get_value(&f_ref));

    resolver::builtins::install(&mut cx.capabilities, cx.realm.intrinsics());
    assert_eq!(cx.get_value(&f_ref).unwrap(), Value::Object(f));
}

#[test]
fn test_registries_are_per_context() {
    let mut first = EvaluationContext::new();
    let second = EvaluationContext::new();
    let function_prototype = first.realm.intrinsics().function_prototype.clone();
    assert!(first.capabilities.uninstall(&function_prototype).is_some());

    assert!(!first.capabilities.is_installed(&function_prototype));
    assert!(second.capabilities.is_installed(&second.realm.intrinsics().function_prototype));
    assert_eq!(second.capabilities.len(), 3);
}
