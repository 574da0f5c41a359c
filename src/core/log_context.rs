//! Structured context for key-value fields
//!
//! This module provides:
//! - `FieldValue`: a single context value
//! - `LogContext`: the per-record mapping from key to value

use super::depth_limit::{json_depth, DepthLimited, MAX_CONTEXT_DEPTH};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Value type for structured logging fields
///
/// Scalars cover the common cases. `Json` carries any nested value that was
/// produced by serializing a caller type, and `Unserializable` records a value
/// whose serialization failed so the encoder can emit a placeholder for it.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Null,
    Json(serde_json::Value),
    Unserializable(&'static str),
}

impl FieldValue {
    /// Serialize any `Serialize` value into a field.
    ///
    /// Never fails: if serialization errors or nests deeper than
    /// [`MAX_CONTEXT_DEPTH`] (as a cyclic graph does), the result is
    /// `FieldValue::Unserializable` tagged with the type name.
    pub fn serialized<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(DepthLimited::new(value)) {
            Ok(json) => FieldValue::Json(json),
            Err(_) => FieldValue::Unserializable(std::any::type_name::<T>()),
        }
    }

    /// Placeholder text used in place of a value that cannot be encoded
    pub fn placeholder(type_name: &str) -> String {
        format!("<unserializable:{}>", type_name)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::UInt(u) => write!(f, "{}", u),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Null => write!(f, "null"),
            FieldValue::Json(v) => write!(f, "{}", v),
            FieldValue::Unserializable(t) => write!(f, "{}", FieldValue::placeholder(t)),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<u64> for FieldValue {
    fn from(u: u64) -> Self {
        FieldValue::UInt(u)
    }
}

impl From<u32> for FieldValue {
    fn from(u: u32) -> Self {
        FieldValue::UInt(u64::from(u))
    }
}

impl From<usize> for FieldValue {
    fn from(u: usize) -> Self {
        FieldValue::UInt(u as u64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(v: serde_json::Value) -> Self {
        if json_depth(&v) > MAX_CONTEXT_DEPTH {
            return FieldValue::Unserializable("serde_json::Value");
        }
        FieldValue::Json(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

/// Context for structured logging with key-value fields
///
/// Keys are kept sorted so encoded output is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogContext {
    fields: BTreeMap<String, FieldValue>,
}

impl LogContext {
    /// Create a new empty log context
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Add a field to the context
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Add a field to the context (mutable version)
    pub fn add_field<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.insert(key.into(), value.into());
    }

    /// Add an arbitrary serializable value.
    ///
    /// # Examples
    ///
    /// ```
    /// use log_emitter::LogContext;
    ///
    /// let ctx = LogContext::new().with_serialized("tags", &["a", "b"]);
    /// assert_eq!(ctx.len(), 1);
    /// ```
    pub fn with_serialized<K, T>(mut self, key: K, value: &T) -> Self
    where
        K: Into<String>,
        T: Serialize + ?Sized,
    {
        self.fields.insert(key.into(), FieldValue::serialized(value));
        self
    }

    /// Get all fields
    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Check if context has any fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Fill in fields from `defaults` that this context does not set.
    ///
    /// Fields already present take priority.
    pub fn merge_defaults(&mut self, defaults: &LogContext) {
        for (key, value) in &defaults.fields {
            self.fields
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    /// Format fields as key=value pairs
    pub fn format_fields(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_fields())
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for LogContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
