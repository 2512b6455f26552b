//! Reference handlers installed on the intrinsic prototypes.
//!
//! Functions read as themselves, which lets `value::f` evaluate to `f` for
//! left-to-right call composition. Maps and weak maps act as private-state
//! tables keyed by the receiver: `obj::secret = v` stores `v` under `obj` in
//! the `secret` map, and reads fall back along the receiver's prototype chain.

use std::rc::Rc;
use runtime::{Intrinsics, ObjectKind, ObjectRef, Value};
use crate::capability::{CapabilityRegistry, ReferenceHandler};
use crate::error::{ResolveError, Result};
use crate::evaluation::EvaluationContext;

pub fn install(registry: &mut CapabilityRegistry, intrinsics: &Intrinsics) {
    registry.install(&intrinsics.function_prototype, FunctionReferenceHandler);
    let maps: Rc<dyn ReferenceHandler> = Rc::new(MapReferenceHandler);
    registry.install_rc(&intrinsics.map_prototype, maps.clone());
    registry.install_rc(&intrinsics.weak_map_prototype, maps);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionReferenceHandler;

impl ReferenceHandler for FunctionReferenceHandler {
    fn on_read(&self, _cx: &mut EvaluationContext, name: &ObjectRef, _receiver: &ObjectRef) -> Option<Result<Value>> {
        Some(Ok(Value::Object(name.clone())))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MapReferenceHandler;

impl ReferenceHandler for MapReferenceHandler {
    fn on_read(&self, _cx: &mut EvaluationContext, name: &ObjectRef, receiver: &ObjectRef) -> Option<Result<Value>> {
        Some(read_through_chain(name, receiver))
    }

    fn on_write(&self, _cx: &mut EvaluationContext, name: &ObjectRef, receiver: &ObjectRef, value: &Value) -> Option<Result<()>> {
        Some(store(name, receiver, value))
    }

    fn on_delete(&self, _cx: &mut EvaluationContext, name: &ObjectRef, receiver: &ObjectRef) -> Option<Result<bool>> {
        Some(remove(name, receiver))
    }
}

fn incompatible(name: &ObjectRef) -> ResolveError {
    ResolveError::TypeError(format!("map reference handler called on {}", name.class_name()))
}

fn lookup(name: &ObjectRef, key: &ObjectRef) -> Result<Option<Value>> {
    match name.borrow().kind() {
        ObjectKind::Map(map) => Ok(map.get(&Value::Object(key.clone()))),
        ObjectKind::WeakMap(map) => Ok(map.get(key)),
        _ => Err(incompatible(name)),
    }
}

/// First entry keyed by the receiver or one of its ancestors; `undefined` if none.
fn read_through_chain(name: &ObjectRef, receiver: &ObjectRef) -> Result<Value> {
    for ancestor in receiver.chain() {
        if let Some(value) = lookup(name, &ancestor)? {
            return Ok(value);
        }
    }
    Ok(Value::Undefined)
}

fn store(name: &ObjectRef, receiver: &ObjectRef, value: &Value) -> Result<()> {
    let stored = match name.borrow_mut().kind_mut() {
        ObjectKind::Map(map) => {
            map.set(Value::Object(receiver.clone()), value.clone());
            true
        }
        ObjectKind::WeakMap(map) => {
            map.set(receiver, value.clone());
            true
        }
        _ => false,
    };
    if stored { Ok(()) } else { Err(incompatible(name)) }
}

fn remove(name: &ObjectRef, receiver: &ObjectRef) -> Result<bool> {
    let removed = match name.borrow_mut().kind_mut() {
        ObjectKind::Map(map) => Some(map.delete(&Value::Object(receiver.clone()))),
        ObjectKind::WeakMap(map) => Some(map.delete(receiver)),
        _ => None,
    };
    removed.ok_or_else(|| incompatible(name))
}
