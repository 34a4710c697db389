// src/recipe/value.rs

//! Typed option setting values
//!
//! Recipe documents are untyped JSON. Every value that flows through the
//! resolver is converted into a [`SettingValue`] according to the declared
//! [`ValueType`] of the setting, so comparisons and accessors never have to
//! guess at the underlying representation.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The type of value held by an option setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    String,
    Int,
    Double,
    Bool,
    KeyValue,
    Object,
    List,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::String => "String",
            ValueType::Int => "Int",
            ValueType::Double => "Double",
            ValueType::Bool => "Bool",
            ValueType::KeyValue => "KeyValue",
            ValueType::Object => "Object",
            ValueType::List => "List",
        };
        write!(f, "{}", name)
    }
}

/// A concrete option setting value
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    String(String),
    Int(i64),
    Double(f64),
    Bool(bool),
    /// Ordered, duplicate-free list of strings
    List(BTreeSet<String>),
    KeyValue(BTreeMap<String, String>),
    /// Materialized child values of an object setting, keyed by child id
    Object(BTreeMap<String, SettingValue>),
}

impl SettingValue {
    /// The value type this variant belongs to
    pub fn value_type(&self) -> ValueType {
        match self {
            SettingValue::String(_) => ValueType::String,
            SettingValue::Int(_) => ValueType::Int,
            SettingValue::Double(_) => ValueType::Double,
            SettingValue::Bool(_) => ValueType::Bool,
            SettingValue::List(_) => ValueType::List,
            SettingValue::KeyValue(_) => ValueType::KeyValue,
            SettingValue::Object(_) => ValueType::Object,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            SettingValue::Double(n) => Some(*n),
            SettingValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&BTreeSet<String>> {
        match self {
            SettingValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_key_value(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            SettingValue::KeyValue(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, SettingValue>> {
        match self {
            SettingValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Convert into the JSON shape used by settings documents
    pub fn to_json(&self) -> Value {
        match self {
            SettingValue::String(s) => Value::String(s.clone()),
            SettingValue::Int(n) => Value::from(*n),
            SettingValue::Double(n) => Value::from(*n),
            SettingValue::Bool(b) => Value::Bool(*b),
            SettingValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            SettingValue::KeyValue(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
            SettingValue::Object(map) => Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// Convert a JSON value into a setting value of the given type
    ///
    /// Scalars are coerced the way settings files write them: numbers and
    /// booleans may arrive as strings, lists and maps may arrive as
    /// JSON-encoded strings. `null` is handled by the caller.
    pub fn from_json(value_type: ValueType, value: &Value) -> Result<Self, String> {
        match value_type {
            ValueType::String => match value {
                Value::String(s) => Ok(SettingValue::String(s.clone())),
                Value::Number(n) => Ok(SettingValue::String(n.to_string())),
                Value::Bool(b) => Ok(SettingValue::String(b.to_string())),
                other => Err(format!("found {}", json_kind(other))),
            },
            ValueType::Int => match value {
                Value::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        Ok(SettingValue::Int(i))
                    } else {
                        match n.as_f64() {
                            Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                                Ok(SettingValue::Int(f as i64))
                            }
                            _ => Err(format!("{} is not an integer", n)),
                        }
                    }
                }
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(SettingValue::Int)
                    .map_err(|_| format!("'{}' is not an integer", s)),
                other => Err(format!("found {}", json_kind(other))),
            },
            ValueType::Double => match value {
                Value::Number(n) => n
                    .as_f64()
                    .map(SettingValue::Double)
                    .ok_or_else(|| format!("{} is not a number", n)),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(SettingValue::Double)
                    .map_err(|_| format!("'{}' is not a number", s)),
                other => Err(format!("found {}", json_kind(other))),
            },
            ValueType::Bool => match value {
                Value::Bool(b) => Ok(SettingValue::Bool(*b)),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" => Ok(SettingValue::Bool(true)),
                    "false" => Ok(SettingValue::Bool(false)),
                    _ => Err(format!("'{}' is not a boolean", s)),
                },
                other => Err(format!("found {}", json_kind(other))),
            },
            ValueType::List => match value {
                Value::Array(items) => items
                    .iter()
                    .map(scalar_to_string)
                    .collect::<Result<BTreeSet<_>, _>>()
                    .map(SettingValue::List),
                Value::String(s) if s.trim().is_empty() => Ok(SettingValue::List(BTreeSet::new())),
                Value::String(s) => match serde_json::from_str::<Value>(s) {
                    Ok(inner @ Value::Array(_)) => Self::from_json(ValueType::List, &inner),
                    _ => Err(format!("'{}' is not a list", s)),
                },
                other => Err(format!("found {}", json_kind(other))),
            },
            ValueType::KeyValue => match value {
                Value::Object(map) => map
                    .iter()
                    .map(|(k, v)| scalar_to_string(v).map(|v| (k.clone(), v)))
                    .collect::<Result<BTreeMap<_, _>, _>>()
                    .map(SettingValue::KeyValue),
                Value::String(s) if s.trim().is_empty() => {
                    Ok(SettingValue::KeyValue(BTreeMap::new()))
                }
                Value::String(s) => match serde_json::from_str::<Value>(s) {
                    Ok(inner @ Value::Object(_)) => Self::from_json(ValueType::KeyValue, &inner),
                    _ => Err(format!("'{}' is not a key-value map", s)),
                },
                other => Err(format!("found {}", json_kind(other))),
            },
            ValueType::Object => {
                Err("object settings are assigned through their child settings".to_string())
            }
        }
    }
}

fn scalar_to_string(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("found {} where a scalar was expected", json_kind(other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::String(s) => write!(f, "{}", s),
            SettingValue::Int(n) => write!(f, "{}", n),
            SettingValue::Double(n) => write!(f, "{}", n),
            SettingValue::Bool(b) => write!(f, "{}", b),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl Serialize for SettingValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<SettingValue> for Value {
    fn from(value: SettingValue) -> Self {
        value.to_json()
    }
}

/// Typed extraction from a [`SettingValue`]
pub trait FromSettingValue: Sized {
    fn from_setting_value(value: &SettingValue) -> Option<Self>;
}

impl FromSettingValue for SettingValue {
    fn from_setting_value(value: &SettingValue) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromSettingValue for String {
    fn from_setting_value(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::String(s) => Some(s.clone()),
            SettingValue::Int(_) | SettingValue::Double(_) | SettingValue::Bool(_) => {
                Some(value.to_string())
            }
            _ => None,
        }
    }
}

impl FromSettingValue for i64 {
    fn from_setting_value(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Int(n) => Some(*n),
            SettingValue::Double(n) if n.fract() == 0.0 => Some(*n as i64),
            SettingValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromSettingValue for f64 {
    fn from_setting_value(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Double(n) => Some(*n),
            SettingValue::Int(n) => Some(*n as f64),
            SettingValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromSettingValue for bool {
    fn from_setting_value(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Bool(b) => Some(*b),
            SettingValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl FromSettingValue for BTreeSet<String> {
    fn from_setting_value(value: &SettingValue) -> Option<Self> {
        value.as_list().cloned()
    }
}

impl FromSettingValue for Vec<String> {
    fn from_setting_value(value: &SettingValue) -> Option<Self> {
        value.as_list().map(|items| items.iter().cloned().collect())
    }
}

impl FromSettingValue for BTreeMap<String, String> {
    fn from_setting_value(value: &SettingValue) -> Option<Self> {
        value.as_key_value().cloned()
    }
}

impl FromSettingValue for Value {
    fn from_setting_value(value: &SettingValue) -> Option<Self> {
        Some(value.to_json())
    }
}
