//! Member endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, AppResult, ErrorResponse, ValidationErrorResponse},
    models::member::{CreateMember, Member, MemberView},
};

use super::{parse_id, ValidatedJson};

/// List all members
#[utoipa::path(
    get,
    path = "/users",
    tag = "members",
    responses(
        (status = 200, description = "List of members", body = Vec<Member>)
    )
)]
pub async fn list_members(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Member>>> {
    let members = state.services.ledger.list_members().await?;
    Ok(Json(members))
}

/// Get member details with borrowing history
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "members",
    params(
        ("id" = i32, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Member details", body = MemberView),
        (status = 400, description = "Invalid member ID", body = ValidationErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse)
    )
)]
pub async fn get_member(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MemberView>> {
    let id = parse_id(&id, "id", "Member ID must be an integer")
        .map_err(|e| AppError::Validation(vec![e]))?;

    let member = state.services.ledger.get_member(id).await?;
    Ok(Json(member))
}

/// Create a new member
#[utoipa::path(
    post,
    path = "/users",
    tag = "members",
    request_body = CreateMember,
    responses(
        (status = 201, description = "Member created", body = Member),
        (status = 400, description = "Invalid input", body = ValidationErrorResponse)
    )
)]
pub async fn create_member(
    State(state): State<crate::AppState>,
    ValidatedJson(request): ValidatedJson<CreateMember>,
) -> AppResult<(StatusCode, Json<Member>)> {
    let member = state.services.ledger.create_member(request.name()).await?;
    Ok((StatusCode::CREATED, Json(member)))
}
