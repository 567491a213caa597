//! Dynamically typed values and identity-bearing objects.
//!
//! Collections are keyed by `Value`s: primitives compare by value
//! (SameValueZero), objects by identity. Every `Object` owns a private,
//! lazily created hidden slot (see `identity`) in addition to its
//! ordinary members; the slot is a field, not a member, so nothing that
//! lists or prints an object's members can see it.

use crate::handle_hash_map::HandleHashMap;
use crate::identity::Slot;
use crate::uid::Uid;
use core::cell::{OnceCell, RefCell};
use core::fmt;
use std::rc::{Rc, Weak};

/// Result of `Value::type_of`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ValueType {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Object,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Undefined => "undefined",
            ValueType::Null => "null",
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Object => "object",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Object(Object),
}

impl Value {
    pub fn type_of(&self) -> ValueType {
        match self {
            Value::Undefined => ValueType::Undefined,
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Boolean,
            Value::Number(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::Object(_) => ValueType::Object,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// String coercion used when a value becomes a member name.
    pub fn to_property_key(&self) -> Rc<str> {
        match self {
            Value::Undefined => "undefined".into(),
            Value::Null => "null".into(),
            Value::Bool(true) => "true".into(),
            Value::Bool(false) => "false".into(),
            Value::Number(n) => number_to_string(*n).into(),
            Value::String(s) => s.clone(),
            Value::Object(o) => o.to_string().into(),
        }
    }
}

/// Number formatting as a JavaScript engine prints it.
pub(crate) fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let mut buf = ryu_js::Buffer::new();
    buf.format(n).to_string()
}

/// SameValueZero: `NaN` equals itself, `+0` equals `-0`, objects compare
/// by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&number_to_string(*n)),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Object(o) => fmt::Debug::fmt(o, f),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Undefined
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
impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}
impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n.into())
    }
}
impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}
impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}
impl From<Rc<str>> for Value {
    fn from(s: Rc<str>) -> Self {
        Value::String(s)
    }
}
impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}
impl From<&Object> for Value {
    fn from(o: &Object) -> Self {
        Value::Object(o.clone())
    }
}

struct ObjectData {
    id: Uid,
    class: &'static str,
    members: RefCell<HandleHashMap<Rc<str>, Value>>,
    slot: OnceCell<Slot>,
}

/// Reference-counted object handle. Clones share identity.
#[derive(Clone)]
pub struct Object(Rc<ObjectData>);

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl Object {
    pub fn new() -> Self {
        Self::with_class("Object")
    }

    pub(crate) fn with_class(class: &'static str) -> Self {
        Object(Rc::new(ObjectData {
            id: Uid::next(),
            class,
            members: RefCell::new(HandleHashMap::new()),
            slot: OnceCell::new(),
        }))
    }

    pub fn id(&self) -> Uid {
        self.0.id
    }

    pub fn class_name(&self) -> &'static str {
        self.0.class
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakObject {
        WeakObject(Rc::downgrade(&self.0))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.members.borrow().get(name).cloned()
    }

    /// Set a visible member; returns the previous value.
    pub fn set(&self, name: impl Into<Rc<str>>, value: impl Into<Value>) -> Option<Value> {
        let (_, old) = self.0.members.borrow_mut().upsert(name.into(), value.into());
        old
    }

    pub fn delete(&self, name: &str) -> bool {
        let removed = self.0.members.borrow_mut().remove_key(name);
        removed.is_some()
    }

    pub fn has_own(&self, name: &str) -> bool {
        self.0.members.borrow().contains_key(name)
    }

    /// Names of the visible members, in insertion order.
    pub fn own_keys(&self) -> Vec<Rc<str>> {
        self.0
            .members
            .borrow()
            .iter()
            .map(|(_, k, _)| k.clone())
            .collect()
    }

    pub(crate) fn slot_cell(&self) -> &OnceCell<Slot> {
        &self.0.slot
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Object {}

impl core::hash::Hash for Object {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[object {}]", self.0.class)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Member names only: values may point back at this object.
        f.debug_struct(self.0.class)
            .field("id", &self.0.id)
            .field("members", &self.own_keys())
            .finish()
    }
}

/// Non-owning object reference.
#[derive(Clone)]
pub struct WeakObject(Weak<ObjectData>);

impl WeakObject {
    pub fn upgrade(&self) -> Option<Object> {
        self.0.upgrade().map(Object)
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl fmt::Debug for WeakObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(WeakObject)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_value_zero_equality() {
        assert_eq!(Value::from(f64::NAN), Value::from(f64::NAN));
        assert_eq!(Value::from(0.0), Value::from(-0.0));
        assert_ne!(Value::from(1), Value::from("1"));
        assert_ne!(Value::Null, Value::Undefined);
        assert_eq!(Value::from(()), Value::Undefined);

        let a = Object::new();
        let b = Object::new();
        assert_eq!(Value::from(&a), Value::from(a.clone()));
        assert_ne!(Value::from(&a), Value::from(&b));
    }

    #[test]
    fn type_of_names() {
        let names: Vec<&str> = [
            Value::Undefined,
            Value::Null,
            Value::from(true),
            Value::from(1.5),
            Value::from("s"),
            Value::from(Object::new()),
        ]
        .iter()
        .map(|v| v.type_of().as_str())
        .collect();
        assert_eq!(
            names,
            ["undefined", "null", "boolean", "number", "string", "object"]
        );
    }

    #[test]
    fn property_keys_format_like_js() {
        assert_eq!(&*Value::from(1).to_property_key(), "1");
        assert_eq!(&*Value::from(1.5).to_property_key(), "1.5");
        assert_eq!(&*Value::from(-0.0).to_property_key(), "0");
        assert_eq!(&*Value::from(f64::NAN).to_property_key(), "NaN");
        assert_eq!(&*Value::from(f64::NEG_INFINITY).to_property_key(), "-Infinity");
        assert_eq!(&*Value::from(false).to_property_key(), "false");
        assert_eq!(&*Value::Null.to_property_key(), "null");
        assert_eq!(&*Value::from(Object::new()).to_property_key(), "[object Object]");
    }

    #[test]
    fn members_keep_insertion_order() {
        let o = Object::new();
        assert!(o.set("b", 1).is_none());
        o.set("a", 2);
        assert_eq!(o.set("b", 3), Some(Value::from(1)));
        let keys: Vec<String> = o.own_keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["b", "a"]);
        assert!(o.delete("b"));
        assert!(!o.delete("b"));
        assert!(!o.has_own("b"));
        assert_eq!(o.get("a"), Some(Value::from(2)));
    }

    #[test]
    fn weak_reference_does_not_keep_object_alive() {
        let o = Object::new();
        let w = o.downgrade();
        assert!(w.upgrade().is_some_and(|u| u.ptr_eq(&o)));
        drop(o);
        assert!(w.upgrade().is_none());
    }

    #[test]
    fn identities_are_distinct() {
        let a = Object::new();
        let b = Object::new();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.id(), a.clone().id());
        assert_eq!(a.to_string(), "[object Object]");
    }
}
