//! JSON line encoder
//!
//! Turns a [`Record`] into one line of JSON:
//!
//! ```text
//! {"timestamp":"2025-01-08T10:30:45.123456Z","level":"ERROR","message":"disk full","context":{"code":28}}
//! ```
//!
//! Encoding never fails. Context values that cannot be represented in JSON
//! are replaced by `"<unserializable:TypeName>"` and counted.

use super::depth_limit::{json_depth, MAX_CONTEXT_DEPTH};
use super::log_context::{FieldValue, LogContext};
use super::record::Record;
use super::timestamp::TimestampFormat;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Serialize)]
struct JsonLine<'a> {
    timestamp: Value,
    level: &'static str,
    message: &'a str,
    context: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel: Option<&'a str>,
}

/// Result of encoding a record along with how many values were substituted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRecord {
    pub bytes: Vec<u8>,
    pub degraded: usize,
}

#[derive(Debug, Clone, Default)]
pub struct JsonEncoder {
    timestamp_format: TimestampFormat,
    channel: Option<String>,
}

impl JsonEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Emit a `channel` key naming the logical logger
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn timestamp_format(&self) -> TimestampFormat {
        self.timestamp_format
    }

    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    /// Encode a record as a single JSON line (without trailing newline)
    pub fn encode(&self, record: &Record) -> Vec<u8> {
        self.encode_with_report(record).bytes
    }

    pub fn encode_with_report(&self, record: &Record) -> EncodedRecord {
        let mut degraded = 0;
        let context = context_to_json(record.context(), &mut degraded);

        let line = JsonLine {
            timestamp: self.timestamp_format.to_json(record.timestamp()),
            level: record.level().name(),
            message: record.message(),
            context,
            channel: self.channel.as_deref(),
        };

        // A line built from `Value`s with string keys always serializes, but
        // fall back to an empty context rather than lose the record.
        let bytes = match serde_json::to_vec(&line) {
            Ok(bytes) => bytes,
            Err(_) => {
                degraded += 1;
                let fallback = JsonLine {
                    context: Map::new(),
                    ..line
                };
                serde_json::to_vec(&fallback).unwrap_or_else(|_| {
                    format!(
                        "{{\"level\":\"{}\",\"message\":{}}}",
                        record.level().name(),
                        Value::String(FieldValue::placeholder("message"))
                    )
                    .into_bytes()
                })
            }
        };

        EncodedRecord { bytes, degraded }
    }
}

fn context_to_json(context: &LogContext, degraded: &mut usize) -> Map<String, Value> {
    context
        .fields()
        .iter()
        .map(|(key, value)| (key.clone(), field_to_json(value, degraded)))
        .collect()
}

fn field_to_json(value: &FieldValue, degraded: &mut usize) -> Value {
    match value {
        FieldValue::String(s) => Value::String(s.clone()),
        FieldValue::Int(i) => Value::from(*i),
        FieldValue::UInt(u) => Value::from(*u),
        FieldValue::Float(f) => match serde_json::Number::from_f64(*f) {
            Some(n) => Value::Number(n),
            None => {
                *degraded += 1;
                Value::String(FieldValue::placeholder("f64"))
            }
        },
        FieldValue::Bool(b) => Value::Bool(*b),
        FieldValue::Null => Value::Null,
        FieldValue::Json(v) if json_depth(v) > MAX_CONTEXT_DEPTH => {
            *degraded += 1;
            Value::String(FieldValue::placeholder("serde_json::Value"))
        }
        FieldValue::Json(v) => v.clone(),
        FieldValue::Unserializable(type_name) => {
            *degraded += 1;
            Value::String(FieldValue::placeholder(type_name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use chrono::TimeZone;
    use chrono::Utc;
    use std::collections::HashMap;

    fn fixed_record(context: LogContext) -> Record {
        let ts = Utc.timestamp_opt(1_736_332_245, 123_456_000).unwrap();
        Record::with_timestamp(ts, LogLevel::Error, "disk full", context)
    }

    #[test]
    fn test_encode_exact_line() {
        let record = fixed_record(LogContext::new().with_field("code", 28));
        let line = String::from_utf8(JsonEncoder::new().encode(&record)).unwrap();

        assert_eq!(
            line,
            r#"{"timestamp":"2025-01-08T10:30:45.123456Z","level":"ERROR","message":"disk full","context":{"code":28}}"#
        );
    }

    #[test]
    fn test_encode_escapes_and_stays_single_line() {
        let ts = Utc.timestamp_opt(0, 0).unwrap();
        let record = Record::with_timestamp(
            ts,
            LogLevel::Info,
            "line1\nline2\t\"quoted\" \\ \u{1}",
            LogContext::new().with_field("k\n", "v\r"),
        );
        let bytes = JsonEncoder::new().encode(&record);
        let line = String::from_utf8(bytes).unwrap();

        assert!(!line.contains('\n'));
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["message"], "line1\nline2\t\"quoted\" \\ \u{1}");
        assert_eq!(parsed["context"]["k\n"], "v\r");
    }

    #[test]
    fn test_non_finite_float_is_substituted() {
        let record = fixed_record(
            LogContext::new()
                .with_field("ratio", f64::NAN)
                .with_field("ok", 1.5),
        );
        let encoded = JsonEncoder::new().encode_with_report(&record);
        let parsed: Value = serde_json::from_slice(&encoded.bytes).unwrap();

        assert_eq!(encoded.degraded, 1);
        assert_eq!(parsed["context"]["ratio"], "<unserializable:f64>");
        assert_eq!(parsed["context"]["ok"], 1.5);
    }

    #[test]
    fn test_unserializable_map_key_is_substituted() {
        // serde_json rejects non-string map keys
        let mut bad: HashMap<(u8, u8), u8> = HashMap::new();
        bad.insert((1, 2), 3);

        let record = fixed_record(
            LogContext::new()
                .with_serialized("bad", &bad)
                .with_field("good", "yes"),
        );
        let encoded = JsonEncoder::new().encode_with_report(&record);
        let parsed: Value = serde_json::from_slice(&encoded.bytes).unwrap();

        assert_eq!(encoded.degraded, 1);
        let placeholder = parsed["context"]["bad"].as_str().unwrap();
        assert!(placeholder.starts_with("<unserializable:"));
        assert!(placeholder.contains("HashMap"));
        assert_eq!(parsed["context"]["good"], "yes");
    }

    #[test]
    fn test_nested_serialized_value() {
        #[derive(Serialize)]
        struct Request {
            path: String,
            status: u16,
        }

        let record = fixed_record(LogContext::new().with_serialized(
            "request",
            &Request {
                path: "/health".into(),
                status: 503,
            },
        ));
        let parsed: Value = serde_json::from_slice(&JsonEncoder::new().encode(&record)).unwrap();

        assert_eq!(parsed["context"]["request"]["path"], "/health");
        assert_eq!(parsed["context"]["request"]["status"], 503);
    }

    #[test]
    fn test_cyclic_value_is_substituted() {
        use serde::ser::{SerializeStruct, Serializer};
        use std::cell::RefCell;
        use std::rc::Rc;

        struct Node {
            id: u32,
            next: RefCell<Option<Rc<Node>>>,
        }

        impl Serialize for Node {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                let mut state = serializer.serialize_struct("Node", 2)?;
                state.serialize_field("id", &self.id)?;
                state.serialize_field("next", &self.next.borrow().as_deref())?;
                state.end()
            }
        }

        let node = Rc::new(Node {
            id: 1,
            next: RefCell::new(None),
        });
        *node.next.borrow_mut() = Some(Rc::clone(&node));

        let record = fixed_record(
            LogContext::new()
                .with_serialized("cycle", &*node)
                .with_field("code", 28),
        );
        let encoded = JsonEncoder::new().encode_with_report(&record);
        let parsed: Value = serde_json::from_slice(&encoded.bytes).unwrap();

        assert_eq!(encoded.degraded, 1);
        let placeholder = parsed["context"]["cycle"].as_str().unwrap();
        assert!(placeholder.starts_with("<unserializable:"));
        assert!(placeholder.ends_with("Node>"));
        assert_eq!(parsed["context"]["code"], 28);

        // Break the cycle so the node is freed
        node.next.borrow_mut().take();
    }

    #[test]
    fn test_overly_deep_json_field_is_substituted() {
        let mut deep = Value::from(0);
        for _ in 0..(MAX_CONTEXT_DEPTH + 5) {
            deep = Value::Array(vec![deep]);
        }

        let mut context = LogContext::new();
        context.add_field("deep", FieldValue::Json(deep));
        let encoded = JsonEncoder::new().encode_with_report(&fixed_record(context));
        let parsed: Value = serde_json::from_slice(&encoded.bytes).unwrap();

        assert_eq!(encoded.degraded, 1);
        assert_eq!(parsed["context"]["deep"], "<unserializable:serde_json::Value>");
    }

    #[test]
    fn test_channel_and_unix_timestamp() {
        let encoder = JsonEncoder::new()
            .with_channel("my_logger")
            .with_timestamp_format(TimestampFormat::UnixMicros);
        let parsed: Value =
            serde_json::from_slice(&encoder.encode(&fixed_record(LogContext::new()))).unwrap();

        assert_eq!(parsed["channel"], "my_logger");
        assert_eq!(parsed["timestamp"], 1_736_332_245_123_456i64);
        assert_eq!(parsed["context"], serde_json::json!({}));
    }
}
