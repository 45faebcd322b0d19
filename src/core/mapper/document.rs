//! Typed access to one mapping of a parsed `identify -verbose` document.

use crate::core::model::parse_timestamp;
use crate::error::ValidationError;
use chrono::{DateTime, FixedOffset};
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// A mapping inside the document, with the file it belongs to for errors
pub(super) struct Section<'a> {
    path: &'a Path,
    map: &'a Mapping,
}

impl<'a> Section<'a> {
    /// Look up a nested mapping by label
    pub fn root(path: &'a Path, value: &'a Value, label: &str) -> Result<Self, ValidationError> {
        match value.get(label) {
            Some(Value::Mapping(map)) => Ok(Self { path, map }),
            _ => Err(ValidationError::MissingSection {
                path: path.to_path_buf(),
                section: label.to_string(),
            }),
        }
    }

    /// Look up a mapping nested in this one
    pub fn section(&self, label: &str) -> Result<Section<'a>, ValidationError> {
        match self.map.get(label) {
            Some(Value::Mapping(map)) => Ok(Section {
                path: self.path,
                map,
            }),
            _ => Err(ValidationError::MissingSection {
                path: self.path.to_path_buf(),
                section: label.to_string(),
            }),
        }
    }

    fn required(&self, label: &str) -> Result<&'a Value, ValidationError> {
        self.map
            .get(label)
            .ok_or_else(|| ValidationError::MissingField {
                path: self.path.to_path_buf(),
                label: label.to_string(),
            })
    }

    fn invalid(&self, label: &str, expected: &'static str, value: &Value) -> ValidationError {
        ValidationError::InvalidField {
            path: self.path.to_path_buf(),
            label: label.to_string(),
            expected,
            value: describe(value),
        }
    }

    /// Any scalar, rendered as text
    pub fn text(&self, label: &str) -> Result<String, ValidationError> {
        let value = self.required(label)?;
        scalar_text(value).ok_or_else(|| self.invalid(label, "text", value))
    }

    /// Text that may be absent or empty
    pub fn optional_text(&self, label: &str) -> Result<Option<String>, ValidationError> {
        match self.map.get(label) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => scalar_text(value)
                .map(Some)
                .ok_or_else(|| self.invalid(label, "text", value)),
        }
    }

    /// Text whose key must be present but whose value may be empty
    pub fn nullable_text(&self, label: &str) -> Result<Option<String>, ValidationError> {
        match self.required(label)? {
            Value::Null => Ok(None),
            value => scalar_text(value)
                .map(Some)
                .ok_or_else(|| self.invalid(label, "text", value)),
        }
    }

    pub fn float(&self, label: &str) -> Result<f64, ValidationError> {
        let value = self.required(label)?;
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| self.invalid(label, "float", value))
    }

    pub fn integer(&self, label: &str) -> Result<i64, ValidationError> {
        let value = self.required(label)?;
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| self.invalid(label, "integer", value))
    }

    pub fn boolean(&self, label: &str) -> Result<bool, ValidationError> {
        let value = self.required(label)?;
        let parsed = match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Some(true),
            Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        };
        parsed.ok_or_else(|| self.invalid(label, "boolean", value))
    }

    pub fn timestamp(&self, label: &str) -> Result<DateTime<FixedOffset>, ValidationError> {
        let value = self.required(label)?;
        let parsed = match value {
            Value::String(s) => parse_timestamp(s),
            _ => None,
        };
        parsed.ok_or_else(|| self.invalid(label, "timestamp", value))
    }

    /// Seconds, either plain or sexagesimal (`0:02.242`)
    pub fn seconds(&self, label: &str) -> Result<f64, ValidationError> {
        let value = self.required(label)?;
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => parse_sexagesimal(s),
            _ => None,
        };
        parsed.ok_or_else(|| self.invalid(label, "duration", value))
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "<empty>".to_string(),
        Value::Mapping(_) => "<mapping>".to_string(),
        Value::Sequence(_) => "<sequence>".to_string(),
        other => scalar_text(other).unwrap_or_else(|| "<tagged value>".to_string()),
    }
}

/// `h:m:s`, `m:s` or `s`, each part base 60 of the next
fn parse_sexagesimal(value: &str) -> Option<f64> {
    value
        .trim()
        .split(':')
        .try_fold(0.0_f64, |total, part| {
            part.trim().parse::<f64>().ok().map(|v| total * 60.0 + v)
        })
}
