//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, borrows, health, members};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library Lending API",
        version = "1.0.0",
        description = "Members, books and the borrow/return ledger",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Members
        members::list_members,
        members::get_member,
        members::create_member,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        // Borrows
        borrows::borrow_book,
        borrows::return_book,
    ),
    components(
        schemas(
            // Members
            crate::models::member::Member,
            crate::models::member::MemberView,
            crate::models::member::CreateMember,
            // Books
            crate::models::book::Book,
            crate::models::book::BookView,
            crate::models::book::CreateBook,
            // Borrows
            crate::models::borrow::Borrow,
            crate::models::borrow::ReturnedBook,
            crate::models::borrow::CurrentBorrow,
            crate::models::borrow::ReturnBookRequest,
            crate::models::borrow::ReturnResult,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
            crate::error::ValidationErrorResponse,
            crate::error::FieldError,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "members", description = "Library members"),
        (name = "books", description = "Book catalog"),
        (name = "borrows", description = "Borrowing and returning books")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
