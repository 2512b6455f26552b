use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use string_interner::{DefaultStringInterner, DefaultSymbol};
use tracing::trace;
use crate::error::{Result, RuntimeError};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Var,
    Let,
    Const,
}

#[derive(Debug, Clone)]
pub struct VariableValue {
    pub value: Value,
    pub kind: BindingKind,
    pub initialized: bool,
    /// Only bindings created implicitly by a non-strict write can be deleted.
    pub deletable: bool,
}

#[derive(Debug, Default)]
pub struct Scope {
    var: HashMap<DefaultSymbol, VariableValue>,
    parent: Option<ScopeRef>,
}

/// Handle to an environment record. Equality is identity.
#[derive(Clone)]
pub struct ScopeRef(Rc<RefCell<Scope>>);

fn name_of(string_interner: &DefaultStringInterner, name: DefaultSymbol) -> String {
    string_interner.resolve(name).unwrap_or("<NOT_FOUND>").to_string()
}

impl ScopeRef {
    pub fn new_global() -> Self {
        ScopeRef(Rc::new(RefCell::new(Scope::default())))
    }

    /// Creates a nested scope whose parent is `self`.
    pub fn enter_block(&self) -> Self {
        ScopeRef(Rc::new(RefCell::new(Scope {
            var: HashMap::new(),
            parent: Some(self.clone()),
        })))
    }

    pub fn parent(&self) -> Option<ScopeRef> {
        self.0.borrow().parent.clone()
    }

    pub fn is_global(&self) -> bool {
        self.0.borrow().parent.is_none()
    }

    pub fn global(&self) -> ScopeRef {
        let mut scope = self.clone();
        while let Some(parent) = scope.parent() {
            scope = parent;
        }
        scope
    }

    pub fn ptr_eq(&self, other: &ScopeRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn declare_var(&self, name: DefaultSymbol, value: Value) {
        self.insert(name, VariableValue { value, kind: BindingKind::Var, initialized: true, deletable: false });
    }

    /// Declares a `let` binding in its temporal dead zone.
    pub fn declare_let(&self, name: DefaultSymbol) {
        self.insert(name, VariableValue { value: Value::Undefined, kind: BindingKind::Let, initialized: false, deletable: false });
    }

    pub fn declare_const(&self, name: DefaultSymbol) {
        self.insert(name, VariableValue { value: Value::Undefined, kind: BindingKind::Const, initialized: false, deletable: false });
    }

    /// Ends the dead zone of a `let`/`const` binding. Returns false if the
    /// binding is absent or already initialized.
    pub fn initialize_binding(&self, name: DefaultSymbol, value: Value) -> bool {
        let mut scope = self.0.borrow_mut();
        match scope.var.get_mut(&name) {
            Some(entry) if !entry.initialized => {
                entry.value = value;
                entry.initialized = true;
                true
            }
            _ => false,
        }
    }

    fn insert(&self, name: DefaultSymbol, value: VariableValue) {
        self.0.borrow_mut().var.insert(name, value);
    }

    pub fn has_binding(&self, name: DefaultSymbol) -> bool {
        self.0.borrow().var.contains_key(&name)
    }

    pub fn binding(&self, name: DefaultSymbol) -> Option<VariableValue> {
        self.0.borrow().var.get(&name).cloned()
    }

    /// Walks the scope chain outward and returns the record holding `name`.
    pub fn find_binding_scope(&self, name: DefaultSymbol) -> Option<ScopeRef> {
        let mut scope = Some(self.clone());
        while let Some(current) = scope {
            if current.has_binding(name) {
                return Some(current);
            }
            scope = current.parent();
        }
        None
    }

    /// Reads a binding of this record. A binding that vanished since the
    /// reference was resolved reads as `undefined` outside strict mode.
    pub fn get_binding(&self, name: DefaultSymbol, strict: bool, string_interner: &DefaultStringInterner) -> Result<Value> {
        match self.binding(name) {
            Some(entry) if !entry.initialized => {
                Err(RuntimeError::UninitializedBinding(name_of(string_interner, name)))
            }
            Some(entry) => Ok(entry.value),
            None if strict => Err(RuntimeError::ReferenceError(name_of(string_interner, name))),
            None => Ok(Value::Undefined),
        }
    }

    pub fn set_binding(&self, name: DefaultSymbol, value: Value, strict: bool, string_interner: &DefaultStringInterner) -> Result<()> {
        let mut scope = self.0.borrow_mut();
        match scope.var.get_mut(&name) {
            None if strict => Err(RuntimeError::ReferenceError(name_of(string_interner, name))),
            None => {
                scope.var.insert(name, VariableValue { value, kind: BindingKind::Var, initialized: true, deletable: true });
                Ok(())
            }
            Some(entry) if !entry.initialized => {
                Err(RuntimeError::UninitializedBinding(name_of(string_interner, name)))
            }
            Some(entry) if entry.kind == BindingKind::Const => {
                Err(RuntimeError::ImmutableAssignment(name_of(string_interner, name)))
            }
            Some(entry) => {
                entry.value = value;
                Ok(())
            }
        }
    }

    pub fn delete_binding(&self, name: DefaultSymbol) -> bool {
        let mut scope = self.0.borrow_mut();
        let deletable = scope.var.get(&name).map(|entry| entry.deletable);
        match deletable {
            None => true,
            Some(true) => {
                scope.var.remove(&name);
                true
            }
            Some(false) => false,
        }
    }

    /// Creates or overwrites a deletable binding in the outermost scope.
    pub fn create_global_binding(&self, name: DefaultSymbol, value: Value) {
        let global = self.global();
        let mut scope = global.0.borrow_mut();
        match scope.var.get_mut(&name) {
            Some(entry) => entry.value = value,
            None => {
                trace!(?name, "creating implicit global binding");
                scope.var.insert(name, VariableValue { value, kind: BindingKind::Var, initialized: true, deletable: true });
            }
        }
    }
}

impl PartialEq for ScopeRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ScopeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(scope) => write!(f, "Scope#{:x}({} bindings)", Rc::as_ptr(&self.0) as usize, scope.var.len()),
            Err(_) => write!(f, "Scope#{:x}", Rc::as_ptr(&self.0) as usize),
        }
    }
}
