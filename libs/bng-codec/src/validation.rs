//! BNG Validator
//!
//! Turns any field payload into a list of user-facing errors. An empty list
//! means the value is a well-formed reference. Validation never fails itself:
//! every problem, including payloads that are not strings at all, becomes an
//! entry in the list.

use crate::error::{BngError, BngErrorKind};
use crate::grid::GridRefCodec;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

pub const VALIDATION_TITLE: &str = "Invalid BNG reference";

/// One validation failure as reported to the host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub kind: BngErrorKind,
    pub title: String,
    pub message: String,
}

impl ValidationError {
    fn unexpected(detail: impl std::fmt::Display) -> Self {
        Self {
            kind: BngErrorKind::Unexpected,
            title: VALIDATION_TITLE.to_string(),
            message: format!("Unexpected error during validation: {}", detail),
        }
    }
}

impl From<BngError> for ValidationError {
    fn from(err: BngError) -> Self {
        match err {
            BngError::Unexpected(detail) => Self::unexpected(detail),
            other => Self {
                kind: other.kind(),
                title: VALIDATION_TITLE.to_string(),
                message: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BngValidator {
    codec: GridRefCodec,
}

impl BngValidator {
    pub fn new(codec: GridRefCodec) -> Self {
        Self { codec }
    }

    /// Validate an arbitrary JSON payload; fail-fast, so at most one error
    pub fn validate(&self, value: &Value) -> Vec<ValidationError> {
        match value {
            Value::String(s) => self.validate_str(s),
            other => {
                debug!(shape = describe(other), "rejected non-string grid reference");
                vec![ValidationError::unexpected(format!(
                    "expected a string, found {}",
                    describe(other)
                ))]
            }
        }
    }

    pub fn validate_str(&self, input: &str) -> Vec<ValidationError> {
        match self.codec.decode(input) {
            Ok(_) => Vec::new(),
            Err(e) => {
                debug!(reference = input, error = %e, "grid reference failed validation");
                vec![e.into()]
            }
        }
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(_) => "string".to_string(),
        Value::Array(items) => format!("array of {} items", items.len()),
        Value::Object(map) => format!("object with {} keys", map.len()),
    }
}

/// Validate with the default 1 m codec
pub fn validate(value: &Value) -> Vec<ValidationError> {
    BngValidator::default().validate(value)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::grid::Resolution;
    use serde_json::json;

    fn messages(value: Value) -> Vec<String> {
        validate(&value).into_iter().map(|e| e.message).collect()
    }

    #[test]
    fn test_reference_vectors() {
        assert!(validate(&json!("NT1234567890")).is_empty());

        assert_eq!(
            messages(json!("NT12345")),
            vec!["Input data must be exactly 12 characters long."]
        );
        assert_eq!(
            messages(json!("ZZ1234567890")),
            vec!["Invalid grid square identifier in input data."]
        );
        assert_eq!(
            messages(json!("NT12345ABCD")),
            vec!["Numeric part of the input data is not a valid integer."]
        );

        let errors = messages(json!(1233445));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Unexpected error during validation"));
        assert!(errors[0].contains("1233445"));
    }

    #[test]
    fn test_non_string_shapes() {
        for value in [json!(null), json!(true), json!([1, 2]), json!({"ref": "NT1234567890"})] {
            let errors = validate(&value);
            assert_eq!(errors.len(), 1, "{}", value);
            assert_eq!(errors[0].kind, BngErrorKind::Unexpected);
        }
    }

    #[test]
    fn test_validator_does_not_normalize() {
        assert_eq!(validate(&json!("nt1234567890"))[0].kind, BngErrorKind::InvalidGridSquare);
        assert_eq!(validate(&json!("NT 12345 67890"))[0].kind, BngErrorKind::NumericFormat);
    }

    #[test]
    fn test_configured_resolution() {
        let validator = BngValidator::new(GridRefCodec::new(Resolution::Kilometre));
        assert!(validator.validate_str("TQ3080").is_empty());

        let errors = validator.validate_str("TQ3012380456");
        assert_eq!(errors[0].message, "Input data must be exactly 6 characters long.");
    }

    #[test]
    fn test_serialized_shape() {
        let errors = validate(&json!("ZZ1234567890"));
        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            value,
            json!([{
                "kind": "invalid_grid_square",
                "title": "Invalid BNG reference",
                "message": "Invalid grid square identifier in input data."
            }])
        );
    }
}
