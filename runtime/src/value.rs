use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use string_interner::{DefaultStringInterner, DefaultSymbol};
use crate::object::ObjectRef;

#[derive(Debug)]
struct SymbolData {
    description: Option<String>,
}

/// A unique symbol key. Two symbols are equal only if they are the same symbol.
#[derive(Clone)]
pub struct Symbol(Rc<SymbolData>);

impl Symbol {
    pub fn new(description: Option<&str>) -> Self {
        Symbol(Rc::new(SymbolData {
            description: description.map(str::to_string),
        }))
    }

    pub fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description().unwrap_or(""))
    }
}

/// Key of a native (non-abstract) property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    String(DefaultSymbol),
    Symbol(Symbol),
}

impl PropertyKey {
    pub fn display(&self, string_interner: &DefaultStringInterner) -> String {
        match self {
            PropertyKey::String(s) => string_interner.resolve(*s).unwrap_or("<NOT_FOUND>").to_string(),
            PropertyKey::Symbol(sym) => format!("{sym:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(DefaultSymbol),
    Symbol(Symbol),
    Object(ObjectRef),
}

impl Value {
    pub fn number(n: impl Into<f64>) -> Value {
        Value::Number(n.into())
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// `null` or `undefined`, the two values that cannot be coerced to an object.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn is_primitive(&self) -> bool {
        !self.is_object()
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Object(obj) if obj.is_callable() => "function",
            Value::Object(_) => "object",
        }
    }

    /// SameValue: like `==` on the variants, except NaN equals NaN and +0 differs from -0.
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(l), Value::Number(r)) => {
                if l.is_nan() && r.is_nan() {
                    true
                } else {
                    l == r && l.is_sign_negative() == r.is_sign_negative()
                }
            }
            _ => self == other,
        }
    }

    pub fn display(&self, string_interner: &DefaultStringInterner) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => string_interner.resolve(*s).unwrap_or("<NOT_FOUND>").to_string(),
            Value::Symbol(sym) => format!("{sym:?}"),
            Value::Object(obj) => format!("[object {}]", obj.class_name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}

impl From<Symbol> for Value {
    fn from(sym: Symbol) -> Self {
        Value::Symbol(sym)
    }
}
