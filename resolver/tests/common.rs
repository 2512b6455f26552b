#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;
use resolver::runtime::{ObjectRef, Property, Value};
use resolver::{Capability, EvaluationContext, Operand, ResolveError};

/// Builds `base::name` from already evaluated values, panicking on failure.
pub fn abstract_ref(cx: &EvaluationContext, base: Value, name: &ObjectRef, strict: bool) -> Operand {
    cx.make_abstract_reference(base, Value::Object(name.clone()), strict)
        .expect("abstract reference should be constructible")
}

/// Defines `name` as a data property of `object` with the given attributes.
pub fn define_data(cx: &mut EvaluationContext, object: &ObjectRef, name: &str, value: Value, writable: bool, configurable: bool) {
    let property = Property::Data { value, writable, enumerable: true, configurable };
    assert!(cx.realm.define_property(object, name, property), "failed to define {name}");
}

/// A capability that counts every dispatch it receives.
pub fn counting_capability(calls: Rc<Cell<u32>>) -> Capability {
    let (r, w, d) = (calls.clone(), calls.clone(), calls);
    Capability::new()
        .on_read(move |_, _, _| {
            r.set(r.get() + 1);
            Ok(Value::Undefined)
        })
        .on_write(move |_, _, _, _| {
            w.set(w.get() + 1);
            Ok(())
        })
        .on_delete(move |_, _, _| {
            d.set(d.get() + 1);
            Ok(true)
        })
}

pub fn assert_missing_capability<T: std::fmt::Debug>(result: Result<T, ResolveError>) {
    match result {
        Err(ResolveError::MissingCapability { .. }) => {}
        other => panic!("expected MissingCapability, got {other:?}"),
    }
}
