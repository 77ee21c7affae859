//! API handlers for the lending REST endpoints

pub mod books;
pub mod borrows;
pub mod health;
pub mod members;
pub mod openapi;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    routing::{get, post},
    Router,
};
use serde::de::DeserializeOwned;
use std::num::IntErrorKind;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use validator::Validate;

use crate::{
    error::{AppError, FieldError},
    AppState,
};

/// JSON body deserialized without running its `validator` rules.
///
/// An empty body reads as `{}` so missing fields are reported per field.
/// Handlers that also parse path ids use this to report every bad field at once.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            &b"{}"[..]
        } else {
            &bytes[..]
        };

        let value: T = serde_json::from_slice(body)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?;

        Ok(Self(value))
    }
}

/// JSON body that has passed its `validator` rules
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let JsonBody(value) = JsonBody::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Parse an integer path parameter.
///
/// A well-formed integer outside the id range parses to 0, which no row
/// carries, so lookups answer "not found" rather than rejecting the input.
pub(crate) fn parse_id(raw: &str, field: &str, message: &str) -> Result<i32, FieldError> {
    match raw.parse::<i32>() {
        Ok(id) => Ok(id),
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Ok(0)
        }
        Err(_) => Err(FieldError::new(field, message)),
    }
}

/// Parse the `membersId`/`bookId` pair, collecting an error for each bad id
pub(crate) fn parse_member_book_ids(
    members_id: &str,
    book_id: &str,
) -> Result<(i32, i32), Vec<FieldError>> {
    match (
        parse_id(members_id, "membersId", "Member ID must be an integer"),
        parse_id(book_id, "bookId", "Book ID must be an integer"),
    ) {
        (Ok(member_id), Ok(book_id)) => Ok((member_id, book_id)),
        (member, book) => Err([member.err(), book.err()].into_iter().flatten().collect()),
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Members
        .route("/users", get(members::list_members).post(members::create_member))
        .route("/users/:id", get(members::get_member))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/:id", get(books::get_book))
        // Borrows
        .route("/users/:membersId/borrow/:bookId", post(borrows::borrow_book))
        .route("/users/:membersId/return/:bookId", post(borrows::return_book))
        .with_state(state);

    Router::new()
        .merge(api)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
