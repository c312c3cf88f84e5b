//! Structured-log projection.
//!
//! [`LogValue`] is a nested attribute tree built from an error's *local*
//! state (merged views are what [`printable`](crate::printable) is for). Causes
//! are projected recursively, so a log sink still sees every layer.
//!
//! ```
//! use cerror::{CError, value};
//!
//! let err = CError::wrap(CError::new("fail", []), "handler error", [value("user", "alice")]);
//! let lv = err.log_value();
//! assert_eq!(lv.get("message").and_then(|v| v.as_str()), Some("handler error"));
//! assert_eq!(
//!     lv.get("cause").and_then(|c| c.get("message")).and_then(|v| v.as_str()),
//!     Some("fail"),
//! );
//! ```

use std::error::Error as StdError;
use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::error::CError;
use crate::errors::Errors;
use crate::value::Values;

/// Attribute tree handed to a log sink.
#[derive(Debug, Clone, PartialEq)]
pub enum LogValue {
    Null,
    Str(String),
    Int(i64),
    Json(serde_json::Value),
    List(Vec<LogValue>),
    Group(Vec<(String, LogValue)>),
}

impl LogValue {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, LogValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LogValue::Str(s) => Some(s),
            LogValue::Json(serde_json::Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Attribute of a group by key.
    pub fn get(&self, key: &str) -> Option<&LogValue> {
        match self {
            LogValue::Group(attrs) => attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl Serialize for LogValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LogValue::Null => serializer.serialize_unit(),
            LogValue::Str(s) => serializer.serialize_str(s),
            LogValue::Int(n) => serializer.serialize_i64(*n),
            LogValue::Json(v) => v.serialize(serializer),
            LogValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            LogValue::Group(attrs) => {
                let mut map = serializer.serialize_map(Some(attrs.len()))?;
                for (key, value) in attrs {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl fmt::Display for LogValue {
    /// Compact JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

fn group(values: &Values) -> LogValue {
    LogValue::Group(
        values
            .iter()
            .map(|(key, value)| (key.clone(), LogValue::Json(value.to_json())))
            .collect(),
    )
}

/// Projection of any error: `CError` and `Errors` in full, anything else as
/// its message.
pub fn error_log_value(err: &(dyn StdError + 'static)) -> LogValue {
    if let Some(own) = err.downcast_ref::<CError>() {
        own.log_value()
    } else if let Some(errs) = err.downcast_ref::<Errors>() {
        errs.log_value()
    } else {
        LogValue::Str(err.to_string())
    }
}

impl CError {
    /// Local message, values, typed values (if any), tags and stack, plus the
    /// projected cause.
    pub fn log_value(&self) -> LogValue {
        let mut attrs = vec![
            ("message".to_string(), LogValue::Str(self.message().to_string())),
            ("values".to_string(), group(self.local_values())),
        ];
        if !self.local_typed_values().is_empty() {
            attrs.push(("typed_values".to_string(), group(self.local_typed_values())));
        }
        attrs.push((
            "tags".to_string(),
            LogValue::List(self.local_tags().map(|t| LogValue::Str(t.to_string())).collect()),
        ));
        attrs.push((
            "stacktrace".to_string(),
            LogValue::List(self.stacks().iter().map(|f| LogValue::Str(f.to_string())).collect()),
        ));
        if let Some(cause) = self.cause() {
            attrs.push(("cause".to_string(), error_log_value(cause)));
        }
        LogValue::Group(attrs)
    }
}

impl Errors {
    /// Member count plus each member's projection keyed by its index.
    pub fn log_value(&self) -> LogValue {
        let members = self
            .iter()
            .enumerate()
            .map(|(i, err)| (i.to_string(), error_log_value(&**err)))
            .collect();
        LogValue::Group(vec![
            ("count".to_string(), LogValue::Int(self.len() as i64)),
            ("errors".to_string(), LogValue::Group(members)),
        ])
    }
}

/// Projection of a possibly absent error; `Null` for `None`.
pub fn log_value(err: Option<&CError>) -> LogValue {
    err.map_or(LogValue::Null, CError::log_value)
}

/// Emit one `tracing` error event carrying the projection of `err` in the
/// `error` field.
pub fn log_error(message: &str, err: &(dyn StdError + 'static)) {
    let value = error_log_value(err);
    tracing::error!(error = %value, "{}", message);
}
