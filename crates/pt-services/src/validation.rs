//! Bridge from `validator` derive output to tracker validation errors

use pt_core::error::{TrackerError, ValidationErrors};
use pt_core::result::TrackerResult;
use validator::Validate;

pub(crate) fn validate<T: Validate>(input: &T) -> TrackerResult<()> {
    input
        .validate()
        .map_err(|errors| TrackerError::Validation(convert(&errors)))
}

fn convert(errors: &validator::ValidationErrors) -> ValidationErrors {
    let mut out = ValidationErrors::new();
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("is invalid ({})", error.code));
            out.add(field, message);
        }
    }
    out
}
