//! Scalar values stored in the settings maps.
//!
//! Every configurable key maps to one of three shapes: an integer (stage
//! numbers, counts, hazard bubbles), a boolean flag, or a choice string.
//! The untagged serde representation keeps the JSON handed to the
//! translator flat: `{"execute_stage": 2, "branch_pred": "two_bit"}`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::ParamKind;
use crate::settings::SettingsError;

/// Text accepted by choice parameters as the explicit "unset" value.
pub const UNSET_CHOICE: &str = "None";

/// A single setting value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Value {
    /// Whether an edit carrying this value clears the field.
    ///
    /// `false` and the empty string count as blank; the integer `0` does not.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Bool(b) => !b,
            Value::Int(_) => false,
            Value::Text(s) => s.is_empty(),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Name of the value's shape, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Text(_) => "string",
        }
    }

    /// Whether this value has the shape a parameter of `kind` stores.
    pub fn matches_kind(&self, kind: ParamKind) -> bool {
        matches!(
            (kind, self),
            (ParamKind::Integer, Value::Int(_))
                | (ParamKind::Boolean, Value::Bool(_))
                | (ParamKind::Choice, Value::Text(_))
        )
    }

    /// Parse raw form input for a parameter of the given kind.
    ///
    /// Returns `Ok(None)` when the input means "clear the field": empty
    /// input for any kind, or `None` for a choice.
    pub fn parse(key: &str, kind: ParamKind, raw: &str) -> Result<Option<Value>, SettingsError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        let invalid = |reason: &str| SettingsError::InvalidValue {
            key: key.to_string(),
            raw: raw.to_string(),
            reason: reason.to_string(),
        };
        match kind {
            ParamKind::Integer => raw
                .parse::<i64>()
                .map(|n| Some(Value::Int(n)))
                .map_err(|_| invalid("expected an integer")),
            ParamKind::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(Some(Value::Bool(true))),
                "false" | "no" | "off" | "0" => Ok(Some(Value::Bool(false))),
                _ => Err(invalid("expected true or false")),
            },
            ParamKind::Choice if raw == UNSET_CHOICE => Ok(None),
            ParamKind::Choice => Ok(Some(Value::Text(raw.to_string()))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "\"{s}\""),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_blank() {
        assert!(!Value::Int(0).is_blank());
        assert!(Value::Bool(false).is_blank());
        assert!(Value::Text(String::new()).is_blank());
        assert!(!Value::Bool(true).is_blank());
    }

    #[test]
    fn parse_by_kind() {
        assert_eq!(
            Value::parse("execute_stage", ParamKind::Integer, " 9 ").unwrap(),
            Some(Value::Int(9))
        );
        assert_eq!(
            Value::parse("flag", ParamKind::Boolean, "on").unwrap(),
            Some(Value::Bool(true))
        );
        assert_eq!(
            Value::parse("branch_pred", ParamKind::Choice, "two_bit").unwrap(),
            Some(Value::from("two_bit"))
        );
    }

    #[test]
    fn parse_clearing_inputs() {
        assert_eq!(Value::parse("cores", ParamKind::Integer, "").unwrap(), None);
        assert_eq!(Value::parse("branch_pred", ParamKind::Choice, "None").unwrap(), None);
    }

    #[test]
    fn parse_rejects_garbage_integer() {
        let err = Value::parse("cores", ParamKind::Integer, "four").unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { ref key, .. } if key == "cores"));
    }

    #[test]
    fn untagged_json_shape() {
        let json = serde_json::to_string(&vec![Value::Int(3), Value::Bool(true), Value::from("ideal")])
            .unwrap();
        assert_eq!(json, r#"[3,true,"ideal"]"#);
        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back[0], Value::Int(3));
        assert_eq!(back[2], Value::from("ideal"));
    }
}
