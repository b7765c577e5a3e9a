// Dynamic payload values
//
// Metadata, model parameters, inputs and outputs carry arbitrary JSON-like
// data. `Value` is a closed sum type over that domain. Unlike
// `serde_json::Value` it keeps the difference between an absent sequence or
// mapping and an empty one, and it can model an optional reference cell.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::copy;

/// String-keyed mapping of payload values
pub type Map = HashMap<String, Value>;

/// A schema-less payload value
#[derive(Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Ordered list. `None` is an absent list, distinct from an empty one.
    Sequence(Option<Vec<Value>>),
    /// String-keyed mapping. `None` is an absent mapping, distinct from an empty one.
    Mapping(Option<Map>),
    /// Optional reference cell around another value
    Ref(Option<Box<Value>>),
    Record(Record),
    /// Host handle that cannot be deep copied; copies share it
    Opaque(Opaque),
}

/// Integer or floating point number
///
/// Non-negative integers above `i64::MAX` are kept as `UInt`. Floats compare
/// by value, and a NaN equals a NaN with the same bit pattern.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(i) => *i as f64,
            Number::UInt(u) => *u as f64,
            Number::Float(f) => *f,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Int(i) => Some(*i),
            Number::UInt(u) => i64::try_from(*u).ok(),
            Number::Float(_) => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Number::Int(i) => u64::try_from(*i).ok(),
            Number::UInt(u) => Some(*u),
            Number::Float(_) => None,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::UInt(a), Number::UInt(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a == b || a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

/// Named composite with ordered fields
///
/// Every field is part of the record's explicit schema and is copied.
#[derive(Debug, PartialEq)]
pub struct Record {
    pub(crate) type_name: String,
    pub(crate) fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Add or replace a field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_field(name, value);
        self
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Clone for Record {
    fn clone(&self) -> Self {
        copy::deep_copy_record(self)
    }
}

/// Shared, type-erased handle to a host object
///
/// Cloning an `Opaque` clones the handle, not the object behind it.
#[derive(Clone)]
pub struct Opaque {
    type_name: &'static str,
    handle: Arc<dyn Any + Send + Sync>,
}

impl Opaque {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: Any + Send + Sync>(handle: Arc<T>) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            handle,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.handle.downcast_ref::<T>()
    }

    /// True if both handles point at the same host object
    pub fn ptr_eq(&self, other: &Opaque) -> bool {
        Arc::ptr_eq(&self.handle, &other.handle)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opaque")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        copy::deep_copy(self)
    }
}

impl Value {
    /// Empty, present sequence
    pub fn sequence() -> Self {
        Value::Sequence(Some(Vec::new()))
    }

    /// Empty, present mapping
    pub fn mapping() -> Self {
        Value::Mapping(Some(Map::new()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null, or a sequence/mapping/reference that is not present
    pub fn is_absent(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Sequence(None) | Value::Mapping(None) | Value::Ref(None)
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.deref_value() {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.deref_value() {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.deref_value() {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.deref_value() {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self.deref_value() {
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Vec<Value>> {
        match self.deref_value() {
            Value::Sequence(Some(items)) => Some(items),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self.deref_value_mut() {
            Value::Sequence(Some(items)) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Map> {
        match self.deref_value() {
            Value::Mapping(Some(map)) => Some(map),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Map> {
        match self.deref_value_mut() {
            Value::Mapping(Some(map)) => Some(map),
            _ => None,
        }
    }

    /// Look up a key in a mapping or a field in a record
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self.deref_value() {
            Value::Mapping(Some(map)) => map.get(key),
            Value::Record(record) => record.field(key),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        match self.deref_value_mut() {
            Value::Mapping(Some(map)) => map.get_mut(key),
            Value::Record(record) => record.field_mut(key),
            _ => None,
        }
    }

    /// Element of a sequence by position
    pub fn at(&self, index: usize) -> Option<&Value> {
        self.as_sequence().and_then(|items| items.get(index))
    }

    pub fn at_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.as_sequence_mut().and_then(|items| items.get_mut(index))
    }

    /// False if any node below (or at) this value is an `Opaque` handle
    pub fn is_fully_owned(&self) -> bool {
        match self {
            Value::Opaque(_) => false,
            Value::Sequence(Some(items)) => items.iter().all(Value::is_fully_owned),
            Value::Mapping(Some(map)) => map.values().all(Value::is_fully_owned),
            Value::Ref(Some(inner)) => inner.is_fully_owned(),
            Value::Record(record) => record.fields.iter().all(|(_, v)| v.is_fully_owned()),
            _ => true,
        }
    }

    /// Convert to a `serde_json::Value`
    ///
    /// Absent containers and references become `null`, records become objects
    /// and opaque handles become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null
            | Value::Opaque(_)
            | Value::Sequence(None)
            | Value::Mapping(None)
            | Value::Ref(None) => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(Number::Int(i)) => serde_json::Value::from(*i),
            Value::Number(Number::UInt(u)) => serde_json::Value::from(*u),
            Value::Number(Number::Float(f)) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Sequence(Some(items)) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Mapping(Some(map)) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Ref(Some(inner)) => inner.to_json(),
            Value::Record(record) => serde_json::Value::Object(
                record
                    .fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    fn deref_value(&self) -> &Value {
        match self {
            Value::Ref(Some(inner)) => inner.deref_value(),
            other => other,
        }
    }

    fn deref_value_mut(&mut self) -> &mut Value {
        match self {
            Value::Ref(Some(inner)) => inner.deref_value_mut(),
            other => other,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null
            | Value::Opaque(_)
            | Value::Sequence(None)
            | Value::Mapping(None)
            | Value::Ref(None) => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(Number::Int(i)) => serializer.serialize_i64(*i),
            Value::Number(Number::UInt(u)) => serializer.serialize_u64(*u),
            Value::Number(Number::Float(f)) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Sequence(Some(items)) => serializer.collect_seq(items),
            Value::Mapping(Some(map)) => serializer.collect_map(map),
            Value::Ref(Some(inner)) => inner.serialize(serializer),
            Value::Record(record) => {
                let mut map = serializer.serialize_map(Some(record.fields.len()))?;
                for (name, value) in &record.fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Number(Number::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Value::Number(Number::UInt(u))
                } else {
                    Value::Number(Number::Float(n.as_f64().unwrap_or_default()))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Sequence(Some(items.into_iter().map(Value::from).collect()))
            }
            serde_json::Value::Object(map) => Value::Mapping(Some(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            )),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Number(Number::Int(i64::from(i)))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Number(Number::Int(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Number(Number::Int(i64::from(i)))
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        match i64::try_from(u) {
            Ok(i) => Value::Number(Number::Int(i)),
            Err(_) => Value::Number(Number::UInt(u)),
        }
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Number(Number::Float(f))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Sequence(Some(items.into_iter().map(Into::into).collect()))
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Mapping(Some(map))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        Value::Ref(value.map(|v| Box::new(v.into())))
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl From<Opaque> for Value {
    fn from(handle: Opaque) -> Self {
        Value::Opaque(handle)
    }
}

/// Build a `Map` from a JSON object literal
///
/// Non-object JSON yields an empty map.
pub fn map_from_json(json: serde_json::Value) -> Map {
    match Value::from(json) {
        Value::Mapping(Some(map)) => map,
        _ => Map::new(),
    }
}
