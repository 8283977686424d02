//! Per-field request validation.
//!
//! Each request type carries a fixed list of `(field name, compiled regex)`
//! predicates and implements `validate()` explicitly — no runtime
//! reflection-based tag scanning.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::GatewayError;

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+7[0-9]{10}$").unwrap());
static FROM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]*$").unwrap());
static TEXT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.+$").unwrap());

/// A single `field = regex` predicate, evaluated in the order given.
pub struct ValidatedField<'a> {
    pub name: &'static str,
    pub value: &'a str,
    pub pattern: &'static Lazy<Regex>,
}

/// Runs a fixed predicate list, returning the first failure as a
/// [`GatewayError::Validation`]. Validation errors never alter the store,
/// they just map to an HTTP response.
pub fn validate_fields(fields: &[ValidatedField<'_>]) -> Result<(), GatewayError> {
    for field in fields {
        if !field.pattern.is_match(field.value) {
            return Err(GatewayError::Validation(format!(
                "field '{}': value '{}' does not match {}",
                field.name, field.value, field.pattern.as_str()
            )));
        }
    }
    Ok(())
}

/// Validates a `queueSend` request body: phone in E.164-ish form, an
/// alphanumeric-plus-underscore sender id, and non-empty text.
pub fn validate_queue_send(phone: &str, from: &str, text: &str) -> Result<(), GatewayError> {
    validate_fields(&[
        ValidatedField {
            name: "phone",
            value: phone,
            pattern: &PHONE_RE,
        },
        ValidatedField {
            name: "from",
            value: from,
            pattern: &FROM_RE,
        },
        ValidatedField {
            name: "text",
            value: text,
            pattern: &TEXT_RE,
        },
    ])
}
