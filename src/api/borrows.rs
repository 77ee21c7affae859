//! Borrow and return endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use validator::Validate;

use crate::{
    error::{field_errors, AppError, AppResult, ErrorResponse, ValidationErrorResponse},
    models::borrow::{Borrow, ReturnBookRequest, ReturnResult},
};

use super::{parse_member_book_ids, JsonBody};

/// Borrow a book
#[utoipa::path(
    post,
    path = "/users/{membersId}/borrow/{bookId}",
    tag = "borrows",
    params(
        ("membersId" = i32, Path, description = "Member ID"),
        ("bookId" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 201, description = "Book borrowed", body = Borrow),
        (status = 400, description = "Invalid IDs, borrow limit reached or book already on loan", body = ErrorResponse),
        (status = 404, description = "Member or book not found", body = ErrorResponse)
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    Path((members_id, book_id)): Path<(String, String)>,
) -> AppResult<(StatusCode, Json<Borrow>)> {
    let (member_id, book_id) =
        parse_member_book_ids(&members_id, &book_id).map_err(AppError::Validation)?;

    let borrow = state.services.ledger.borrow_book(member_id, book_id).await?;
    Ok((StatusCode::CREATED, Json(borrow)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/users/{membersId}/return/{bookId}",
    tag = "borrows",
    params(
        ("membersId" = i32, Path, description = "Member ID"),
        ("bookId" = i32, Path, description = "Book ID")
    ),
    request_body(content = ReturnBookRequest, description = "Optional score"),
    responses(
        (status = 200, description = "Book returned", body = ReturnResult),
        (status = 400, description = "Invalid IDs or score", body = ValidationErrorResponse),
        (status = 404, description = "No open borrow for this member and book", body = ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    Path((members_id, book_id)): Path<(String, String)>,
    JsonBody(request): JsonBody<ReturnBookRequest>,
) -> AppResult<Json<ReturnResult>> {
    // Path and body problems are reported together
    let ids = parse_member_book_ids(&members_id, &book_id);
    let body = request.validate().map_err(|e| field_errors(&e));

    let (member_id, book_id) = match (ids, body) {
        (Ok(ids), Ok(())) => ids,
        (ids, body) => {
            let mut errors = ids.err().unwrap_or_default();
            errors.extend(body.err().unwrap_or_default());
            return Err(AppError::Validation(errors));
        }
    };

    let result = state
        .services
        .ledger
        .return_book(member_id, book_id, request.score())
        .await?;
    Ok(Json(result))
}
