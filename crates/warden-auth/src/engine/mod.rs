//! Login orchestration: authentication flows, registration, and recovery.

pub mod orchestrator;
pub mod requests;

pub use orchestrator::{AuthEngine, LoginResult};
pub use requests::{RegisterRequest, ThirdPartyRequest, ThirdPartyRegisterRequest};

use validator::Validate;

use warden_core::error::AppError;

/// Runs derive-based validation, flattening every failure into one message.
pub(crate) fn validate_input<T: Validate>(input: &T) -> Result<(), AppError> {
    input.validate().map_err(|errors| {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{field} is invalid"),
                })
            })
            .collect();
        if messages.is_empty() {
            messages.push(errors.to_string());
        }
        messages.sort();
        AppError::validation(messages.join("; "))
    })
}
