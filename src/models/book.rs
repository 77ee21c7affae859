//! Book model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Book record from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book with its reader rating
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookView {
    pub id: i32,
    pub name: String,
    /// Mean score of returned borrows, rounded to two decimals (0 when unrated)
    pub average_score: f64,
}

/// Create book request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    /// Title of the book
    #[serde(default)]
    #[validate(custom(function = "validate_book_name"))]
    #[schema(value_type = String)]
    pub name: serde_json::Value,
}

impl CreateBook {
    pub fn name(&self) -> &str {
        self.name.as_str().unwrap_or_default()
    }
}

pub(crate) const BOOK_NAME_NUL: &str = "Book name must not contain NUL characters";

fn validate_book_name(value: &serde_json::Value) -> Result<(), ValidationError> {
    super::require_non_empty_string(
        value,
        "Book name must be a string",
        "Book name is required",
        BOOK_NAME_NUL,
    )
}
