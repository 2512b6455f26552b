use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use string_interner::DefaultSymbol;
use crate::error::Result;
use crate::realm::Realm;
use crate::value::{PropertyKey, Symbol, Value};

pub type NativeFn = Rc<dyn Fn(&mut Realm, &Value, &[Value]) -> Result<Value>>;

#[derive(Clone)]
pub struct NativeFunction {
    pub name: String,
    pub func: NativeFn,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({:?})", self.name)
    }
}

#[derive(Debug)]
pub enum ObjectKind {
    Ordinary,
    Function(NativeFunction),
    Map(MapStorage),
    WeakMap(WeakMapStorage),
    /// Wrapper produced by coercing a primitive to an object.
    Primitive(Value),
}

#[derive(Debug, Clone)]
pub enum Property {
    Data {
        value: Value,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    },
    Accessor {
        get: Option<ObjectRef>,
        set: Option<ObjectRef>,
        enumerable: bool,
        configurable: bool,
    },
}

impl Property {
    /// Writable, enumerable, configurable data property.
    pub fn data(value: Value) -> Self {
        Property::Data { value, writable: true, enumerable: true, configurable: true }
    }

    /// Non-writable, non-configurable data property.
    pub fn frozen(value: Value) -> Self {
        Property::Data { value, writable: false, enumerable: true, configurable: false }
    }

    pub fn accessor(get: Option<ObjectRef>, set: Option<ObjectRef>) -> Self {
        Property::Accessor { get, set, enumerable: true, configurable: true }
    }

    pub fn is_configurable(&self) -> bool {
        match self {
            Property::Data { configurable, .. } | Property::Accessor { configurable, .. } => *configurable,
        }
    }
}

#[derive(Debug)]
pub struct Object {
    kind: ObjectKind,
    prototype: Option<ObjectRef>,
    properties: HashMap<PropertyKey, Property>,
    extensible: bool,
}

impl Object {
    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ObjectKind {
        &mut self.kind
    }
}

/// Shared handle to a heap object. Equality is identity.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<Object>>);

impl ObjectRef {
    pub fn new(kind: ObjectKind, prototype: Option<ObjectRef>) -> Self {
        ObjectRef(Rc::new(RefCell::new(Object {
            kind,
            prototype,
            properties: HashMap::new(),
            extensible: true,
        })))
    }

    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn borrow(&self) -> Ref<'_, Object> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Object> {
        self.0.borrow_mut()
    }

    pub fn downgrade(&self) -> WeakObjectRef {
        WeakObjectRef(Rc::downgrade(&self.0))
    }

    pub fn prototype(&self) -> Option<ObjectRef> {
        self.0.borrow().prototype.clone()
    }

    /// Replaces the prototype. Fails if the object is not extensible or the
    /// new chain would contain the object itself.
    pub fn set_prototype(&self, prototype: Option<ObjectRef>) -> bool {
        if !self.0.borrow().extensible {
            return false;
        }
        let mut cursor = prototype.clone();
        while let Some(p) = cursor {
            if p.ptr_eq(self) {
                return false;
            }
            cursor = p.prototype();
        }
        self.0.borrow_mut().prototype = prototype;
        true
    }

    /// Iterates the object itself followed by every ancestor on its prototype chain.
    pub fn chain(&self) -> impl Iterator<Item = ObjectRef> + use<> {
        std::iter::successors(Some(self.clone()), |obj| obj.prototype())
    }

    pub fn is_extensible(&self) -> bool {
        self.0.borrow().extensible
    }

    pub fn prevent_extensions(&self) {
        self.0.borrow_mut().extensible = false;
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.0.borrow().kind, ObjectKind::Function(_))
    }

    pub fn class_name(&self) -> &'static str {
        match &self.0.borrow().kind {
            ObjectKind::Ordinary => "Object",
            ObjectKind::Function(_) => "Function",
            ObjectKind::Map(_) => "Map",
            ObjectKind::WeakMap(_) => "WeakMap",
            ObjectKind::Primitive(Value::Bool(_)) => "Boolean",
            ObjectKind::Primitive(Value::Number(_)) => "Number",
            ObjectKind::Primitive(Value::String(_)) => "String",
            ObjectKind::Primitive(Value::Symbol(_)) => "Symbol",
            // Nullish values are never wrapped.
            ObjectKind::Primitive(_) => "Object",
        }
    }

    /// The primitive held by a wrapper object, if this is one.
    pub fn primitive_value(&self) -> Option<Value> {
        match &self.0.borrow().kind {
            ObjectKind::Primitive(v) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn get_own_property(&self, key: &PropertyKey) -> Option<Property> {
        self.0.borrow().properties.get(key).cloned()
    }

    pub fn has_own_property(&self, key: &PropertyKey) -> bool {
        self.0.borrow().properties.contains_key(key)
    }

    pub fn own_keys(&self) -> Vec<PropertyKey> {
        self.0.borrow().properties.keys().cloned().collect()
    }

    /// Defines or redefines an own property. A non-configurable property only
    /// accepts a new data value while it is still writable.
    pub fn define_own_property(&self, key: PropertyKey, property: Property) -> bool {
        let mut obj = self.0.borrow_mut();
        let accepted = match obj.properties.get(&key) {
            None => obj.extensible,
            Some(existing) if existing.is_configurable() => true,
            Some(Property::Data { writable: true, enumerable, .. }) => matches!(
                &property,
                Property::Data { enumerable: e, configurable: false, .. } if e == enumerable
            ),
            Some(_) => false,
        };
        if accepted {
            obj.properties.insert(key, property);
        }
        accepted
    }

    /// Removes a configurable own property. Absent properties count as deleted.
    pub fn delete_own_property(&self, key: &PropertyKey) -> bool {
        let mut obj = self.0.borrow_mut();
        let configurable = obj.properties.get(key).map(Property::is_configurable);
        match configurable {
            None => true,
            Some(true) => {
                obj.properties.remove(key);
                true
            }
            Some(false) => false,
        }
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(obj) => match &obj.kind {
                ObjectKind::Function(func) => write!(f, "Function({:?})#{:x}", func.name, self.id()),
                _ => write!(f, "{}#{:x}", self.class_name(), self.id()),
            },
            Err(_) => write!(f, "Object#{:x}", self.id()),
        }
    }
}

#[derive(Clone)]
pub struct WeakObjectRef(Weak<RefCell<Object>>);

impl WeakObjectRef {
    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.0.upgrade().map(ObjectRef)
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    fn points_to(&self, obj: &ObjectRef) -> bool {
        self.is_alive() && std::ptr::eq(self.0.as_ptr(), Rc::as_ptr(&obj.0))
    }
}

impl fmt::Debug for WeakObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(obj) => write!(f, "Weak({obj:?})"),
            None => write!(f, "Weak(<dropped>)"),
        }
    }
}

/// SameValueZero key of a map entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MapKey {
    Undefined,
    Null,
    Bool(bool),
    Number(u64),
    String(DefaultSymbol),
    Symbol(Symbol),
    Object(usize),
}

impl MapKey {
    fn of(value: &Value) -> Self {
        match value {
            Value::Undefined => MapKey::Undefined,
            Value::Null => MapKey::Null,
            Value::Bool(b) => MapKey::Bool(*b),
            Value::Number(n) if n.is_nan() => MapKey::Number(f64::NAN.to_bits()),
            Value::Number(n) if *n == 0.0 => MapKey::Number(0f64.to_bits()),
            Value::Number(n) => MapKey::Number(n.to_bits()),
            Value::String(s) => MapKey::String(*s),
            Value::Symbol(sym) => MapKey::Symbol(sym.clone()),
            Value::Object(obj) => MapKey::Object(obj.id()),
        }
    }
}

/// Backing store of a Map. Entries hold their key strongly, so an object key
/// keeps its address for as long as the entry exists.
#[derive(Debug, Default)]
pub struct MapStorage {
    entries: HashMap<MapKey, (Value, Value)>,
}

impl MapStorage {
    pub fn get(&self, key: &Value) -> Option<Value> {
        self.entries.get(&MapKey::of(key)).map(|(_, v)| v.clone())
    }

    pub fn has(&self, key: &Value) -> bool {
        self.entries.contains_key(&MapKey::of(key))
    }

    pub fn set(&mut self, key: Value, value: Value) {
        self.entries.insert(MapKey::of(&key), (key, value));
    }

    pub fn delete(&mut self, key: &Value) -> bool {
        self.entries.remove(&MapKey::of(key)).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Backing store of a WeakMap. Keys are held weakly; an entry whose key was
/// dropped is invisible and is overwritten if its address is reused.
#[derive(Debug, Default)]
pub struct WeakMapStorage {
    entries: HashMap<usize, (WeakObjectRef, Value)>,
}

impl WeakMapStorage {
    pub fn get(&self, key: &ObjectRef) -> Option<Value> {
        self.entries
            .get(&key.id())
            .filter(|(weak, _)| weak.points_to(key))
            .map(|(_, v)| v.clone())
    }

    pub fn has(&self, key: &ObjectRef) -> bool {
        self.get(key).is_some()
    }

    /// Stores `value` under `key`, first releasing entries of dropped keys.
    pub fn set(&mut self, key: &ObjectRef, value: Value) {
        self.prune();
        self.entries.insert(key.id(), (key.downgrade(), value));
    }

    pub fn delete(&mut self, key: &ObjectRef) -> bool {
        if self.has(key) {
            self.entries.remove(&key.id());
            true
        } else {
            false
        }
    }

    /// Drops entries whose key object no longer exists.
    pub fn prune(&mut self) {
        self.entries.retain(|_, (weak, _)| weak.is_alive());
    }

    /// Stored entries, including any whose key was dropped since the last write.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn live_len(&self) -> usize {
        self.entries.values().filter(|(weak, _)| weak.is_alive()).count()
    }
}
