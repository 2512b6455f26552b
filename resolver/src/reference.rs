//! References: the unresolved lvalues produced by identifier lookup and
//! member access, and the operand union the resolver accepts.
//!
//! All fields are private and fixed at construction. Only
//! [`EvaluationContext::make_abstract_reference`](crate::EvaluationContext::make_abstract_reference)
//! produces a reference whose name is an object.

use runtime::{ObjectRef, PropertyKey, ScopeRef, Value};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Either a plain value or a reference to be resolved. Callers may hand the
/// resolver either kind.
#[derive(Debug, Clone)]
pub enum Operand {
    Value(Value),
    Environment(EnvironmentReference),
    Property(PropertyReference),
}

impl Operand {
    pub fn is_reference(&self) -> bool {
        !matches!(self, Operand::Value(_))
    }

    pub fn is_property_reference(&self) -> bool {
        matches!(self, Operand::Property(_))
    }

    pub fn is_unresolvable(&self) -> bool {
        matches!(self, Operand::Environment(r) if r.scope().is_none())
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self, Operand::Property(r) if r.is_abstract())
    }

    pub fn is_strict(&self) -> bool {
        match self {
            Operand::Value(_) => false,
            Operand::Environment(r) => r.is_strict(),
            Operand::Property(r) => r.is_strict(),
        }
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Value(value)
    }
}

impl From<EnvironmentReference> for Operand {
    fn from(reference: EnvironmentReference) -> Self {
        Operand::Environment(reference)
    }
}

impl From<PropertyReference> for Operand {
    fn from(reference: PropertyReference) -> Self {
        Operand::Property(reference)
    }
}

/// A reference to a variable binding. A missing scope is the unresolved
/// marker: the identifier was not bound anywhere on the chain.
#[derive(Debug, Clone)]
pub struct EnvironmentReference {
    scope: Option<ScopeRef>,
    name: DefaultSymbol,
    strict: bool,
}

impl EnvironmentReference {
    /// Identifier resolution: searches `scope` and its parents for `name`.
    pub fn resolve(scope: &ScopeRef, name: DefaultSymbol, strict: bool) -> Self {
        Self { scope: scope.find_binding_scope(name), name, strict }
    }

    pub fn scope(&self) -> Option<&ScopeRef> {
        self.scope.as_ref()
    }

    pub fn name(&self) -> DefaultSymbol {
        self.name
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

#[derive(Debug, Clone)]
pub enum ReferenceName {
    Key(PropertyKey),
    /// An arbitrary object naming the location; resolved by capability dispatch.
    Abstract(ObjectRef),
}

impl ReferenceName {
    pub fn display(&self, string_interner: &DefaultStringInterner) -> String {
        match self {
            ReferenceName::Key(key) => key.display(string_interner),
            ReferenceName::Abstract(obj) => format!("{obj:?}"),
        }
    }
}

/// A reference to a property of a primitive or object base.
#[derive(Debug, Clone)]
pub struct PropertyReference {
    base: Value,
    name: ReferenceName,
    strict: bool,
    this_value: Option<Value>,
}

impl PropertyReference {
    pub fn new(base: Value, key: PropertyKey, strict: bool) -> Self {
        Self { base, name: ReferenceName::Key(key), strict, this_value: None }
    }

    /// A `super.key` style reference: the property is looked up on `base`
    /// but accessed with `this_value` as receiver.
    pub fn with_this(base: Value, key: PropertyKey, this_value: Value, strict: bool) -> Self {
        Self { base, name: ReferenceName::Key(key), strict, this_value: Some(this_value) }
    }

    pub(crate) fn abstract_name(base: Value, name: ObjectRef, strict: bool) -> Self {
        Self { base, name: ReferenceName::Abstract(name), strict, this_value: None }
    }

    pub fn base(&self) -> &Value {
        &self.base
    }

    pub fn name(&self) -> &ReferenceName {
        &self.name
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self.name, ReferenceName::Abstract(_))
    }

    /// Receiver for native access; the base unless overridden.
    pub fn this_value(&self) -> &Value {
        self.this_value.as_ref().unwrap_or(&self.base)
    }

    /// True when an explicit receiver distinct from the base was supplied.
    pub fn has_receiver_override(&self) -> bool {
        self.this_value.as_ref().is_some_and(|this| !this.same_value(&self.base))
    }
}
