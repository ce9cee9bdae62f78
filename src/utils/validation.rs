use crate::api::error::FieldError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use validator::{ValidationErrors, ValidationErrorsKind};

pub const MSG_REQUIRED: &str = "El campo * no puede estar vacío.";

/// Format rules for free-text customer fields. Matching ignores case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    CellPhoneNumber,
    DocumentNumber,
    Address,
    Email,
    Word,
}

static CELL_PHONE_NUMBER: Lazy<Regex> = Lazy::new(|| rule_regex(r"^3\d{9}$"));
// 6 to 10 digits, no leading zero
static DOCUMENT_NUMBER: Lazy<Regex> = Lazy::new(|| rule_regex(r"^[1-9]\d{5,9}$"));
static ADDRESS: Lazy<Regex> = Lazy::new(|| rule_regex(r"^[\da-záéíóúñ #.-]{5,}$"));
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    rule_regex(r"^[a-z0-9][a-z0-9._-]{3,}@[a-z0-9_-]{2,}(\.[a-z0-9_-]{2,})+$")
});
static WORD: Lazy<Regex> = Lazy::new(|| rule_regex(r"^[a-záéíóúñ ]{2,}$"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

fn rule_regex(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){}", pattern)).expect("static regex")
}

impl FieldRule {
    fn regex(&self) -> &'static Regex {
        match self {
            FieldRule::CellPhoneNumber => &CELL_PHONE_NUMBER,
            FieldRule::DocumentNumber => &DOCUMENT_NUMBER,
            FieldRule::Address => &ADDRESS,
            FieldRule::Email => &EMAIL,
            FieldRule::Word => &WORD,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FieldRule::CellPhoneNumber => {
                "El campo * debe tener 10 dígitos y cumplir con el formato: 3xxxxxxxxx."
            }
            FieldRule::DocumentNumber => "El campo * debe tener entre 6 y 10 dígitos.",
            FieldRule::Address => {
                "El campo * sólo admite letras, números, ., #, - y debe tener 5 o más caracteres."
            }
            FieldRule::Email => "El campo * debe cumplir con el formato: user@example.info.",
            FieldRule::Word => {
                "El campo * sólo admite letras, espacios y debe tener 2 o más caracteres."
            }
        }
    }

    /// Normalizes `value` (collapsed whitespace, title case) and checks it.
    /// Returns the normalized value on success.
    pub fn check(&self, value: &str) -> Result<String, &'static str> {
        let normalized = title_case(&collapse_whitespace(value));
        if self.regex().is_match(&normalized) {
            Ok(normalized)
        } else {
            Err(self.message())
        }
    }
}

pub fn collapse_whitespace(value: &str) -> String {
    WHITESPACE.replace_all(value, " ").trim().to_string()
}

/// Upper-cases the first letter of every word and lower-cases the rest.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_is_alpha = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if prev_is_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_alpha = true;
        } else {
            out.push(c);
            prev_is_alpha = false;
        }
    }
    out
}

/// Collects a field error if `result` failed, returning the normalized value otherwise.
pub fn collect(
    field: &str,
    result: Result<String, &'static str>,
    errors: &mut Vec<FieldError>,
) -> String {
    match result {
        Ok(value) => value,
        Err(msg) => {
            errors.push(FieldError::new(field, msg));
            String::new()
        }
    }
}

/// Flattens `validator` errors (including nested structs and lists) into
/// field-scoped messages, keyed by the innermost field name.
pub fn flatten_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    flatten_into(errors, &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn flatten_into(errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    let msg = err
                        .message
                        .clone()
                        .unwrap_or_else(|| Cow::Owned(err.code.to_string()));
                    out.push(FieldError::new(field.to_string(), msg.into_owned()));
                }
            }
            ValidationErrorsKind::Struct(nested) => flatten_into(nested, out),
            ValidationErrorsKind::List(items) => {
                for nested in items.values() {
                    flatten_into(nested, out);
                }
            }
        }
    }
}
