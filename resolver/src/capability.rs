//! Capability protocol for abstract references.
//!
//! A name object takes part in abstract reference resolution by having a
//! [`ReferenceHandler`] installed on itself or on one of its prototypes. The
//! handler methods are optional: returning `None` means "not implemented
//! here", and lookup continues up the name object's prototype chain.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use runtime::{ObjectRef, Value};
use tracing::debug;
use crate::error::Result;
use crate::evaluation::EvaluationContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceOp {
    Read,
    Write,
    Delete,
}

impl fmt::Display for ReferenceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceOp::Read => write!(f, "read"),
            ReferenceOp::Write => write!(f, "write"),
            ReferenceOp::Delete => write!(f, "delete"),
        }
    }
}

/// Handlers for reads, writes and deletes through an abstract reference.
/// `name` is the object the reference was named by; `receiver` is the base
/// after coercion to an object.
pub trait ReferenceHandler {
    fn on_read(&self, _cx: &mut EvaluationContext, _name: &ObjectRef, _receiver: &ObjectRef) -> Option<Result<Value>> {
        None
    }

    fn on_write(&self, _cx: &mut EvaluationContext, _name: &ObjectRef, _receiver: &ObjectRef, _value: &Value) -> Option<Result<()>> {
        None
    }

    fn on_delete(&self, _cx: &mut EvaluationContext, _name: &ObjectRef, _receiver: &ObjectRef) -> Option<Result<bool>> {
        None
    }
}

type ReadHook = Rc<dyn Fn(&mut EvaluationContext, &ObjectRef, &ObjectRef) -> Result<Value>>;
type WriteHook = Rc<dyn Fn(&mut EvaluationContext, &ObjectRef, &ObjectRef, &Value) -> Result<()>>;
type DeleteHook = Rc<dyn Fn(&mut EvaluationContext, &ObjectRef, &ObjectRef) -> Result<bool>>;

/// Closure-backed handler for extension code:
///
/// ```ignore
/// let capability = Capability::new()
///     .on_read(|_, _, _| Ok(Value::Bool(true)))
///     .on_delete(|_, _, _| Ok(true));
/// cx.capabilities.install(&target, capability);
/// ```
#[derive(Clone, Default)]
pub struct Capability {
    read: Option<ReadHook>,
    write: Option<WriteHook>,
    delete: Option<DeleteHook>,
}

impl Capability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_read<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut EvaluationContext, &ObjectRef, &ObjectRef) -> Result<Value> + 'static,
    {
        self.read = Some(Rc::new(f));
        self
    }

    pub fn on_write<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut EvaluationContext, &ObjectRef, &ObjectRef, &Value) -> Result<()> + 'static,
    {
        self.write = Some(Rc::new(f));
        self
    }

    pub fn on_delete<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut EvaluationContext, &ObjectRef, &ObjectRef) -> Result<bool> + 'static,
    {
        self.delete = Some(Rc::new(f));
        self
    }
}

impl ReferenceHandler for Capability {
    fn on_read(&self, cx: &mut EvaluationContext, name: &ObjectRef, receiver: &ObjectRef) -> Option<Result<Value>> {
        self.read.as_ref().map(|f| f(cx, name, receiver))
    }

    fn on_write(&self, cx: &mut EvaluationContext, name: &ObjectRef, receiver: &ObjectRef, value: &Value) -> Option<Result<()>> {
        self.write.as_ref().map(|f| f(cx, name, receiver, value))
    }

    fn on_delete(&self, cx: &mut EvaluationContext, name: &ObjectRef, receiver: &ObjectRef) -> Option<Result<bool>> {
        self.delete.as_ref().map(|f| f(cx, name, receiver))
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("read", &self.read.is_some())
            .field("write", &self.write.is_some())
            .field("delete", &self.delete.is_some())
            .finish()
    }
}

struct Entry {
    // Keeps the target alive so its address stays a valid key.
    _target: ObjectRef,
    handler: Rc<dyn ReferenceHandler>,
}

/// Handlers installed on prototypes or individual name objects, keyed by
/// object identity.
#[derive(Default)]
pub struct CapabilityRegistry {
    entries: HashMap<usize, Entry>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `handler` on `target`, replacing and returning any previous one.
    pub fn install(&mut self, target: &ObjectRef, handler: impl ReferenceHandler + 'static) -> Option<Rc<dyn ReferenceHandler>> {
        self.install_rc(target, Rc::new(handler))
    }

    pub fn install_rc(&mut self, target: &ObjectRef, handler: Rc<dyn ReferenceHandler>) -> Option<Rc<dyn ReferenceHandler>> {
        debug!(?target, "installing reference capability");
        self.entries
            .insert(target.id(), Entry { _target: target.clone(), handler })
            .map(|previous| previous.handler)
    }

    pub fn uninstall(&mut self, target: &ObjectRef) -> Option<Rc<dyn ReferenceHandler>> {
        self.entries.remove(&target.id()).map(|entry| entry.handler)
    }

    pub fn is_installed(&self, target: &ObjectRef) -> bool {
        self.entries.contains_key(&target.id())
    }

    pub fn get(&self, target: &ObjectRef) -> Option<Rc<dyn ReferenceHandler>> {
        self.entries.get(&target.id()).map(|entry| entry.handler.clone())
    }

    /// Handlers that apply to `name`, nearest first: the object's own entry,
    /// then entries on each prototype.
    pub fn handlers_for(&self, name: &ObjectRef) -> Vec<Rc<dyn ReferenceHandler>> {
        name.chain().filter_map(|obj| self.get(&obj)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRegistry").field("entries", &self.entries.len()).finish()
    }
}
