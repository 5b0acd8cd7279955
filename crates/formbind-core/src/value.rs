//! # Dynamic Values and Ordered Records
//!
//! The binder consumes untyped input: a [`Record`] mapping string keys to
//! arbitrary [`Value`]s. Key order is significant, because unconsumed keys
//! are reported in input order.
//!
//! Host objects (instances of application classes that may satisfy a
//! class or interface type) enter the value model through the
//! [`HostObject`] trait and are shared by reference, never copied.
//!
//! ## JSON Conversion
//!
//! `Value` converts from `serde_json::Value` losslessly. Integral JSON
//! numbers become [`Value::Int`] when they fit `i64`; every other number
//! becomes [`Value::Float`]. The reverse conversion renders enum cases as
//! their backing value (or name, for pure enums) and host objects as their
//! string form, or their class name when they have none.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::enums::{Backing, EnumCase};

/// An application object that can be bound to class/interface-typed
/// properties.
pub trait HostObject: fmt::Debug + Send + Sync + 'static {
    /// Name of the object's concrete class.
    fn class_name(&self) -> &str;

    /// Whether the object is an instance of `type_name`: its own class, a
    /// parent class, or an implemented interface.
    fn is_instance_of(&self, type_name: &str) -> bool {
        self.class_name() == type_name
    }

    /// String conversion, for objects that have one. Objects returning
    /// `Some` are accepted wherever a string is.
    fn to_text(&self) -> Option<String> {
        None
    }

    /// Access to the concrete type for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a [`HostObject`].
///
/// Equality is identity: two handles are equal only if they point to the
/// same object.
#[derive(Clone)]
pub struct ObjectRef(Arc<dyn HostObject>);

impl ObjectRef {
    /// Wrap a host object.
    pub fn new(object: impl HostObject) -> Self {
        Self(Arc::new(object))
    }

    /// Wrap an already shared host object.
    pub fn from_arc(object: Arc<dyn HostObject>) -> Self {
        Self(object)
    }

    /// Name of the object's concrete class.
    pub fn class_name(&self) -> &str {
        self.0.class_name()
    }

    /// See [`HostObject::is_instance_of`].
    pub fn is_instance_of(&self, type_name: &str) -> bool {
        self.0.is_instance_of(type_name)
    }

    /// See [`HostObject::to_text`].
    pub fn to_text(&self) -> Option<String> {
        self.0.to_text()
    }

    /// Borrow the object as its concrete type.
    pub fn downcast_ref<T: HostObject>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Whether both handles point to the same object.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered list.
    List(Vec<Value>),
    /// Ordered keyed mapping.
    Map(Record),
    /// A case of a registered enum.
    Enum(EnumCase),
    /// An application object.
    Object(ObjectRef),
}

impl Value {
    /// Type name used in validation messages.
    ///
    /// Lists and maps both report `array`; enum cases and host objects
    /// both report `object`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) | Self::Map(_) => "array",
            Self::Enum(_) | Self::Object(_) => "object",
        }
    }

    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this is a container (list or map).
    pub fn is_container(&self) -> bool {
        matches!(self, Self::List(_) | Self::Map(_))
    }

    /// Borrow as a string slice, for [`Value::String`] only.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The integer, for [`Value::Int`] only.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The boolean, for [`Value::Bool`] only.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The enum case, for [`Value::Enum`] only.
    pub fn as_enum(&self) -> Option<&EnumCase> {
        match self {
            Self::Enum(case) => Some(case),
            _ => None,
        }
    }

    /// The host object, for [`Value::Object`] only.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// String conversion for "stringable" values: strings, integers,
    /// floats, and host objects with a string form. `None` for everything
    /// else.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(float_text(*f)),
            Self::Object(object) => object.to_text(),
            _ => None,
        }
    }

    /// Convert to a JSON value. See the module documentation for how enum
    /// cases and host objects are rendered.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(i) => Json::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Self::String(s) => Json::String(s.clone()),
            Self::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Self::Map(record) => Json::Object(
                record
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
            Self::Enum(case) => match case.backing() {
                Some(Backing::Int(i)) => Json::from(*i),
                Some(Backing::String(s)) => Json::String(s.clone()),
                None => Json::String(case.name().to_string()),
            },
            Self::Object(object) => Json::String(
                object
                    .to_text()
                    .unwrap_or_else(|| object.class_name().to_string()),
            ),
        }
    }
}

/// Text form of a float: plain decimal notation for magnitudes in
/// `[1e-4, 1e15)`, `1.5E+20` style exponent notation outside it, and
/// `NAN` / `INF` / `-INF` for non-finite values.
fn float_text(f: f64) -> String {
    if f.is_nan() {
        return "NAN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    let magnitude = f.abs();
    if magnitude == 0.0 || (1e-4..1e15).contains(&magnitude) {
        return f.to_string();
    }
    let scientific = format!("{f:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let point = if mantissa.contains('.') { "" } else { ".0" };
    let sign = if exponent.starts_with('-') { "" } else { "+" };
    format!("{mantissa}{point}E{sign}{exponent}")
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                // u64 above i64::MAX and non-integral numbers.
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Self::String(s),
            Json::Array(items) => Self::List(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Self::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Self::Map(record)
    }
}

impl From<EnumCase> for Value {
    fn from(case: EnumCase) -> Self {
        Self::Enum(case)
    }
}

impl From<ObjectRef> for Value {
    fn from(object: ObjectRef) -> Self {
        Self::Object(object)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(option: Option<T>) -> Self {
        option.map_or(Self::Null, Into::into)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::List(items) => serializer.collect_seq(items),
            Self::Map(record) => record.serialize(serializer),
            Self::Enum(_) | Self::Object(_) => self.to_json().serialize(serializer),
        }
    }
}

/// Ordered mapping of unique string keys to values.
///
/// Inserting an existing key replaces its value in place; removal keeps
/// the order of the remaining entries. Lookups are linear, which suits
/// the small records the binder handles.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the record has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` is present, regardless of its value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// The value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &Value) -> bool) {
        self.entries.retain(|(k, v)| keep(k, v));
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Convert to a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        Value::Map(self.clone()).to_json()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl TryFrom<serde_json::Value> for Record {
    type Error = serde_json::Value;

    /// Accepts JSON objects only; any other value is handed back.
    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        match json {
            serde_json::Value::Object(map) => {
                Ok(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
            other => Err(other),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Extraction of a Rust value from a bound [`Value`].
///
/// Implemented for the types a bound property can hold. Returning `None`
/// means the value has a different shape.
pub trait FromValue: Sized {
    /// Description of the expected shape, for mismatch reports.
    const EXPECTED: &'static str;

    /// Convert, or `None` if the value has a different shape.
    fn from_value(value: Value) -> Option<Self>;
}

impl FromValue for Value {
    const EXPECTED: &'static str = "any value";

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "bool";

    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "int";

    fn from_value(value: Value) -> Option<Self> {
        value.as_int()
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "string";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl FromValue for Vec<Value> {
    const EXPECTED: &'static str = "list";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl FromValue for Record {
    const EXPECTED: &'static str = "map";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Map(record) => Some(record),
            _ => None,
        }
    }
}

impl FromValue for EnumCase {
    const EXPECTED: &'static str = "enum case";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Enum(case) => Some(case),
            _ => None,
        }
    }
}

impl FromValue for ObjectRef {
    const EXPECTED: &'static str = "object";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}
