//! Borrow (loan) model and the lending rules applied when opening one

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};

/// Borrow record from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Borrow {
    pub id: i32,
    pub member_id: i32,
    pub book_id: i32,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub score: Option<i32>,
    pub is_returned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Borrow {
    pub fn is_open(&self) -> bool {
        !self.is_returned
    }
}

/// One line of a member's history, joined with the book title
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct BorrowHistoryEntry {
    pub book_id: i32,
    pub book_name: String,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub score: Option<i32>,
    pub is_returned: bool,
}

/// A returned book in a member view
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnedBook {
    pub book_id: i32,
    pub book_name: String,
    pub borrow_date: DateTime<Utc>,
    pub return_date: DateTime<Utc>,
    pub score: Option<i32>,
}

/// A book currently on loan in a member view
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentBorrow {
    pub book_id: i32,
    pub book_name: String,
    pub borrow_date: DateTime<Utc>,
}

/// Return book request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ReturnBookRequest {
    /// Optional rating given by the reader
    #[serde(default)]
    #[validate(custom(function = "validate_score"))]
    #[schema(value_type = Option<f64>)]
    pub score: serde_json::Value,
}

impl ReturnBookRequest {
    pub fn score(&self) -> Option<f64> {
        self.score.as_f64()
    }
}

fn validate_score(value: &serde_json::Value) -> Result<(), ValidationError> {
    match value {
        serde_json::Value::Null => Ok(()),
        serde_json::Value::Number(n) if n.as_f64().is_some_and(|s| s >= 0.0) => Ok(()),
        _ => Err(super::validation_error(
            "range",
            "Score must be a non-negative number",
        )),
    }
}

/// Outcome of a return
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnResult {
    pub members_id: i32,
    pub book_id: i32,
    pub return_date: DateTime<Utc>,
}

/// What the store observed, inside its atomic scope, before opening a borrow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BorrowSnapshot {
    pub member_exists: bool,
    pub book_exists: bool,
    /// Open borrows held by the member
    pub member_open: i64,
    /// Open borrows on the book, by anyone
    pub book_open: i64,
    /// Open borrows for this exact member/book pair
    pub pair_open: i64,
}

/// Lending rules checked before a borrow is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorrowPolicy {
    pub max_open_borrows: i64,
}

impl Default for BorrowPolicy {
    fn default() -> Self {
        Self { max_open_borrows: 3 }
    }
}

impl BorrowPolicy {
    pub fn new(max_open_borrows: i64) -> Self {
        Self { max_open_borrows }
    }

    /// Fails with the first violated rule, in order: member, book, member cap,
    /// book availability, duplicate pair.
    pub fn check(&self, snapshot: &BorrowSnapshot) -> AppResult<()> {
        if !snapshot.member_exists {
            return Err(AppError::NotFound("Member not found".to_string()));
        }
        if !snapshot.book_exists {
            return Err(AppError::NotFound("Book not found".to_string()));
        }
        if snapshot.member_open >= self.max_open_borrows {
            return Err(AppError::LimitExceeded(format!(
                "Member cannot borrow more than {} books at a time",
                self.max_open_borrows
            )));
        }
        if snapshot.book_open > 0 {
            return Err(AppError::Conflict(
                "This book is already borrowed by another member".to_string(),
            ));
        }
        if snapshot.pair_open > 0 {
            return Err(AppError::Conflict(
                "This book is already borrowed by this member".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> BorrowSnapshot {
        BorrowSnapshot {
            member_exists: true,
            book_exists: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_policy_allows_free_book() {
        assert!(BorrowPolicy::default().check(&snapshot()).is_ok());
    }

    #[test]
    fn test_policy_rule_order() {
        let policy = BorrowPolicy::default();

        // Missing member wins over everything else
        let all_bad = BorrowSnapshot {
            member_exists: false,
            book_exists: false,
            member_open: 3,
            book_open: 1,
            pair_open: 1,
        };
        assert!(matches!(policy.check(&all_bad), Err(AppError::NotFound(m)) if m.contains("Member")));

        let no_book = BorrowSnapshot { book_exists: false, member_open: 3, ..snapshot() };
        assert!(matches!(policy.check(&no_book), Err(AppError::NotFound(m)) if m.contains("Book")));

        let at_cap = BorrowSnapshot { member_open: 3, book_open: 1, ..snapshot() };
        assert!(matches!(policy.check(&at_cap), Err(AppError::LimitExceeded(_))));

        let on_loan = BorrowSnapshot { member_open: 2, book_open: 1, ..snapshot() };
        assert!(matches!(policy.check(&on_loan), Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_policy_duplicate_pair() {
        let pair = BorrowSnapshot { pair_open: 1, ..snapshot() };
        assert!(matches!(
            BorrowPolicy::default().check(&pair),
            Err(AppError::Conflict(m)) if m.contains("this member")
        ));
    }

    #[test]
    fn test_policy_custom_cap() {
        let policy = BorrowPolicy::new(1);
        let one_open = BorrowSnapshot { member_open: 1, ..snapshot() };
        assert!(matches!(policy.check(&one_open), Err(AppError::LimitExceeded(_))));
    }

    #[test]
    fn test_score_validation() {
        let ok: ReturnBookRequest = serde_json::from_value(json!({ "score": 4 })).unwrap();
        assert!(ok.validate().is_ok());
        assert_eq!(ok.score(), Some(4.0));

        let absent: ReturnBookRequest = serde_json::from_value(json!({})).unwrap();
        assert!(absent.validate().is_ok());
        assert_eq!(absent.score(), None);

        for bad in [json!({ "score": -1 }), json!({ "score": "five" }), json!({ "score": [] })] {
            let req: ReturnBookRequest = serde_json::from_value(bad).unwrap();
            assert!(req.validate().is_err());
        }
    }
}
