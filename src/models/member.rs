//! Library member model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::borrow::{CurrentBorrow, ReturnedBook};

/// Member record from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i32,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Member with their borrowing history
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub id: i32,
    pub full_name: String,
    /// Books borrowed and already returned
    pub borrowed_books: Vec<ReturnedBook>,
    /// Books currently on loan to this member
    pub current_borrowing_books: Vec<CurrentBorrow>,
}

/// Create member request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CreateMember {
    /// Full name of the member
    #[serde(default)]
    #[validate(custom(function = "validate_member_name"))]
    #[schema(value_type = String)]
    pub name: serde_json::Value,
}

impl CreateMember {
    /// The requested name, empty when the payload carried no string
    pub fn name(&self) -> &str {
        self.name.as_str().unwrap_or_default()
    }
}

/// Shared with the ledger, which re-checks names
pub(crate) const MEMBER_NAME_NUL: &str = "Member name must not contain NUL characters";

fn validate_member_name(value: &serde_json::Value) -> Result<(), ValidationError> {
    super::require_non_empty_string(
        value,
        "Member name must be a string",
        "Member name is required",
        MEMBER_NAME_NUL,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: serde_json::Value) -> CreateMember {
        serde_json::from_value(body).expect("request should deserialize")
    }

    #[test]
    fn test_valid_name() {
        let req = request(json!({ "name": "Alice" }));
        assert!(req.validate().is_ok());
        assert_eq!(req.name(), "Alice");
    }

    #[test]
    fn test_missing_name() {
        let req = request(json!({}));
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert_eq!(req.name(), "");
    }

    #[test]
    fn test_non_string_name() {
        let errors = request(json!({ "name": 42 })).validate().unwrap_err();
        let name_errors = errors.field_errors();
        let message = name_errors
            .values()
            .next()
            .and_then(|errs| errs[0].message.clone())
            .unwrap();
        assert_eq!(message, "Member name must be a string");
    }

    #[test]
    fn test_name_with_nul_is_rejected() {
        let errors = request(json!({ "name": "Al\u{0000}ice" })).validate().unwrap_err();
        let message = errors.field_errors()["name"][0].message.clone().unwrap();
        assert_eq!(message, MEMBER_NAME_NUL);
    }

    #[test]
    fn test_long_name_is_accepted() {
        assert!(request(json!({ "name": "a".repeat(300) })).validate().is_ok());
    }
}
