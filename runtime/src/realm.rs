use std::rc::Rc;
use string_interner::{DefaultStringInterner, DefaultSymbol};
use crate::environment::ScopeRef;
use crate::error::{Result, RuntimeError};
use crate::object::{MapStorage, NativeFunction, ObjectKind, ObjectRef, Property, WeakMapStorage};
use crate::value::{PropertyKey, Value};

/// Prototypes shared by every object the realm creates.
#[derive(Debug, Clone)]
pub struct Intrinsics {
    pub object_prototype: ObjectRef,
    pub function_prototype: ObjectRef,
    pub map_prototype: ObjectRef,
    pub weak_map_prototype: ObjectRef,
    pub boolean_prototype: ObjectRef,
    pub number_prototype: ObjectRef,
    pub string_prototype: ObjectRef,
    pub symbol_prototype: ObjectRef,
}

impl Intrinsics {
    fn new() -> Self {
        let object_prototype = ObjectRef::new(ObjectKind::Ordinary, None);
        let derived = || ObjectRef::new(ObjectKind::Ordinary, Some(object_prototype.clone()));
        Self {
            function_prototype: derived(),
            map_prototype: derived(),
            weak_map_prototype: derived(),
            boolean_prototype: derived(),
            number_prototype: derived(),
            string_prototype: derived(),
            symbol_prototype: derived(),
            object_prototype,
        }
    }
}

/// The object model: owns the string interner, the intrinsic prototypes and
/// the global scope, and implements property get/set/delete with receiver
/// semantics plus primitive-to-object coercion.
#[derive(Debug)]
pub struct Realm {
    string_interner: DefaultStringInterner,
    intrinsics: Intrinsics,
    global: ScopeRef,
    length_key: DefaultSymbol,
}

impl Default for Realm {
    fn default() -> Self {
        Self::new()
    }
}

impl Realm {
    pub fn new() -> Self {
        let mut string_interner = DefaultStringInterner::default();
        let length_key = string_interner.get_or_intern("length");
        Self {
            string_interner,
            intrinsics: Intrinsics::new(),
            global: ScopeRef::new_global(),
            length_key,
        }
    }

    pub fn string_interner(&self) -> &DefaultStringInterner {
        &self.string_interner
    }

    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    pub fn global(&self) -> &ScopeRef {
        &self.global
    }

    pub fn intern(&mut self, s: &str) -> DefaultSymbol {
        self.string_interner.get_or_intern(s)
    }

    pub fn resolve(&self, symbol: DefaultSymbol) -> &str {
        self.string_interner.resolve(symbol).unwrap_or("<NOT_FOUND>")
    }

    pub fn key(&mut self, s: &str) -> PropertyKey {
        PropertyKey::String(self.intern(s))
    }

    pub fn string(&mut self, s: &str) -> Value {
        Value::String(self.intern(s))
    }

    pub fn key_name(&self, key: &PropertyKey) -> String {
        key.display(&self.string_interner)
    }

    pub fn display(&self, value: &Value) -> String {
        value.display(&self.string_interner)
    }

    pub fn new_object(&self) -> ObjectRef {
        ObjectRef::new(ObjectKind::Ordinary, Some(self.intrinsics.object_prototype.clone()))
    }

    pub fn new_object_with_prototype(&self, prototype: Option<ObjectRef>) -> ObjectRef {
        ObjectRef::new(ObjectKind::Ordinary, prototype)
    }

    pub fn new_function<F>(&self, name: &str, func: F) -> ObjectRef
    where
        F: Fn(&mut Realm, &Value, &[Value]) -> Result<Value> + 'static,
    {
        let kind = ObjectKind::Function(NativeFunction { name: name.to_string(), func: Rc::new(func) });
        ObjectRef::new(kind, Some(self.intrinsics.function_prototype.clone()))
    }

    pub fn new_map(&self) -> ObjectRef {
        ObjectRef::new(ObjectKind::Map(MapStorage::default()), Some(self.intrinsics.map_prototype.clone()))
    }

    pub fn new_weak_map(&self) -> ObjectRef {
        ObjectRef::new(ObjectKind::WeakMap(WeakMapStorage::default()), Some(self.intrinsics.weak_map_prototype.clone()))
    }

    /// Coerces a value to an object. Objects are returned as-is; every call
    /// with a primitive allocates a fresh wrapper.
    pub fn to_object(&self, value: &Value) -> Result<ObjectRef> {
        let prototype = match value {
            Value::Object(obj) => return Ok(obj.clone()),
            Value::Undefined | Value::Null => {
                return Err(RuntimeError::TypeError(format!("cannot convert {} to object", value.type_name())));
            }
            Value::Bool(_) => &self.intrinsics.boolean_prototype,
            Value::Number(_) => &self.intrinsics.number_prototype,
            Value::String(_) => &self.intrinsics.string_prototype,
            Value::Symbol(_) => &self.intrinsics.symbol_prototype,
        };
        let wrapper = ObjectRef::new(ObjectKind::Primitive(value.clone()), Some(prototype.clone()));
        if let Value::String(s) = value {
            let length = self.resolve(*s).chars().count() as f64;
            wrapper.define_own_property(PropertyKey::String(self.length_key), Property::frozen(Value::Number(length)));
        }
        Ok(wrapper)
    }

    /// Ordinary `[[Get]]`: looks `key` up along the prototype chain of
    /// `object`; getters run with `receiver` as `this`.
    pub fn get(&mut self, object: &ObjectRef, key: &PropertyKey, receiver: &Value) -> Result<Value> {
        for holder in object.chain() {
            match holder.get_own_property(key) {
                Some(Property::Data { value, .. }) => return Ok(value),
                Some(Property::Accessor { get: Some(getter), .. }) => return self.call(&getter, receiver, &[]),
                Some(Property::Accessor { get: None, .. }) => return Ok(Value::Undefined),
                None => {}
            }
        }
        Ok(Value::Undefined)
    }

    /// Ordinary `[[Set]]`. Returns false when the assignment is rejected: a
    /// non-writable property on the chain, an accessor without setter, a
    /// primitive receiver, or a non-extensible receiver.
    pub fn set(&mut self, object: &ObjectRef, key: &PropertyKey, value: Value, receiver: &Value) -> Result<bool> {
        let inherited = object.chain().find_map(|holder| holder.get_own_property(key));
        match inherited {
            Some(Property::Data { writable: false, .. }) => Ok(false),
            Some(Property::Accessor { set: None, .. }) => Ok(false),
            Some(Property::Accessor { set: Some(setter), .. }) => {
                self.call(&setter, receiver, &[value])?;
                Ok(true)
            }
            Some(Property::Data { .. }) | None => {
                let Value::Object(target) = receiver else {
                    return Ok(false);
                };
                match target.get_own_property(key) {
                    Some(Property::Accessor { .. }) => Ok(false),
                    Some(Property::Data { writable: false, .. }) => Ok(false),
                    Some(Property::Data { enumerable, configurable, .. }) => Ok(target.define_own_property(
                        key.clone(),
                        Property::Data { value, writable: true, enumerable, configurable },
                    )),
                    None => Ok(target.define_own_property(key.clone(), Property::data(value))),
                }
            }
        }
    }

    /// Ordinary `[[Delete]]`.
    pub fn delete(&mut self, object: &ObjectRef, key: &PropertyKey) -> bool {
        object.delete_own_property(key)
    }

    pub fn define_property(&mut self, object: &ObjectRef, name: &str, property: Property) -> bool {
        let key = self.key(name);
        object.define_own_property(key, property)
    }

    pub fn call(&mut self, func: &ObjectRef, this: &Value, args: &[Value]) -> Result<Value> {
        let native = match func.borrow().kind() {
            ObjectKind::Function(native) => native.func.clone(),
            _ => return Err(RuntimeError::TypeError(format!("{func:?} is not a function"))),
        };
        native(self, this, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_to_object_allocates_fresh_wrappers() {
        let mut realm = Realm::new();
        let s = realm.string("abc");
        let a = realm.to_object(&s).unwrap();
        let b = realm.to_object(&s).unwrap();
        assert!(!a.ptr_eq(&b));
        assert_eq!(a.primitive_value(), Some(s.clone()));
        let length = realm.key("length");
        assert_eq!(realm.get(&a, &length, &s).unwrap(), Value::Number(3.0));
        assert!(matches!(realm.to_object(&Value::Null), Err(RuntimeError::TypeError(_))));
    }

    #[test]
    fn test_getter_sees_receiver() {
        let mut realm = Realm::new();
        let seen = Rc::new(RefCell::new(None));
        let seen_in_getter = seen.clone();
        let getter = realm.new_function("get_x", move |_, this, _| {
            *seen_in_getter.borrow_mut() = Some(this.clone());
            Ok(Value::Number(7.0))
        });
        let proto = realm.new_object();
        realm.define_property(&proto, "x", Property::accessor(Some(getter), None));
        let child = realm.new_object_with_prototype(Some(proto.clone()));

        let x = realm.key("x");
        let value = realm.get(&proto, &x, &Value::Object(child.clone())).unwrap();
        assert_eq!(value, Value::Number(7.0));
        assert_eq!(*seen.borrow(), Some(Value::Object(child)));
    }

    #[test]
    fn test_set_shadows_inherited_writable_property() {
        let mut realm = Realm::new();
        let proto = realm.new_object();
        realm.define_property(&proto, "x", Property::data(Value::Number(1.0)));
        realm.define_property(&proto, "ro", Property::frozen(Value::Number(2.0)));
        let child = realm.new_object_with_prototype(Some(proto.clone()));
        let receiver = Value::Object(child.clone());

        let x = realm.key("x");
        let ro = realm.key("ro");
        assert!(realm.set(&child, &x, Value::Number(5.0), &receiver).unwrap());
        assert_eq!(realm.get(&child, &x, &receiver).unwrap(), Value::Number(5.0));
        assert_eq!(realm.get(&proto, &x, &Value::Object(proto.clone())).unwrap(), Value::Number(1.0));
        assert!(!realm.set(&child, &ro, Value::Number(9.0), &receiver).unwrap());
        assert!(!child.has_own_property(&ro));
    }

    #[test]
    fn test_set_with_primitive_receiver_fails() {
        let mut realm = Realm::new();
        let n = Value::Number(4.0);
        let wrapper = realm.to_object(&n).unwrap();
        let key = realm.key("tag");
        assert!(!realm.set(&wrapper, &key, Value::Bool(true), &n).unwrap());
        assert!(!wrapper.has_own_property(&key));
    }

    #[test]
    fn test_call_non_function() {
        let mut realm = Realm::new();
        let obj = realm.new_object();
        assert!(matches!(realm.call(&obj, &Value::Undefined, &[]), Err(RuntimeError::TypeError(_))));
    }
}
