//! Data models for the lending server

pub mod book;
pub mod borrow;
pub mod member;

use validator::ValidationError;

// Re-export commonly used types
pub use book::{Book, BookView};
pub use borrow::{Borrow, BorrowPolicy, BorrowSnapshot, ReturnResult};
pub use member::{Member, MemberView};

/// Shared check for the `name` fields of create requests.
///
/// Names are stored as `TEXT`, which cannot hold NUL, so it is rejected here.
pub(crate) fn require_non_empty_string(
    value: &serde_json::Value,
    type_message: &'static str,
    required_message: &'static str,
    nul_message: &'static str,
) -> Result<(), ValidationError> {
    match value {
        serde_json::Value::Null => Err(validation_error("required", required_message)),
        serde_json::Value::String(s) if s.trim().is_empty() => {
            Err(validation_error("required", required_message))
        }
        serde_json::Value::String(s) if s.contains('\0') => {
            Err(validation_error("characters", nul_message))
        }
        serde_json::Value::String(_) => Ok(()),
        _ => Err(validation_error("type", type_message)),
    }
}

pub(crate) fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}
