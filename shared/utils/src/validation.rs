use crate::error::{PartcodeError, PartcodeResult};
use validator::{Validate, ValidationError, ValidationErrors};

/// Validates `model` and reports the first violated rule.
///
/// `field_order` fixes which failure wins when several fields are invalid, so
/// the same input always produces the same error.
pub fn validate_model<T: Validate>(model: &T, field_order: &[&str]) -> PartcodeResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => Err(first_violation(&errors, field_order)),
    }
}

fn first_violation(errors: &ValidationErrors, field_order: &[&str]) -> PartcodeError {
    let field_errors = errors.field_errors();

    let ordered = field_order
        .iter()
        .find_map(|field| field_errors.get(field).map(|errs| (*field, *errs)));
    let fallback = || {
        let mut fields: Vec<_> = field_errors.iter().collect();
        fields.sort_by_key(|(field, _)| **field);
        fields.first().map(|(field, errs)| (**field, **errs))
    };

    match ordered.or_else(fallback).and_then(|(field, errs)| errs.first().map(|e| (field, e))) {
        Some((field, error)) => PartcodeError::invalid_component(
            field,
            error.code.to_string(),
            describe(field, error),
        ),
        None => PartcodeError::invalid_component("model", "invalid", format_validation_errors(errors)),
    }
}

fn describe(field: &str, error: &ValidationError) -> String {
    match &error.message {
        Some(message) => format!("Field '{}': {}", field, message),
        None => format!("Validation failed for field '{}': {}", field, error.code),
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            messages.push(describe(field, error));
        }
    }

    messages.sort();
    messages.join(", ")
}
