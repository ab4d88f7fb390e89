//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, borrows, health, users, SESSION_COOKIE};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookshelf API",
        version = "0.1.0",
        description = "Library Management System REST API"
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Users & sessions
        users::list_users,
        users::profile,
        users::register,
        users::login,
        users::logout,
        // Borrow workflow
        borrows::borrow_book,
        borrows::accept_borrow,
        borrows::return_book,
        borrows::borrowed_books,
        // Catalog
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
    ),
    components(
        schemas(
            // Users
            crate::models::user::User,
            crate::models::user::Role,
            crate::models::user::RegisterRequest,
            crate::models::user::LoginRequest,
            users::UsersResponse,
            users::UserResponse,
            users::SuccessResponse,
            // Catalog
            crate::models::book::Book,
            crate::models::book::BookView,
            crate::models::book::BookDetails,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            books::BooksResponse,
            books::BookResponse,
            books::BookDetailsResponse,
            // Borrows
            crate::models::borrow::BorrowRecord,
            crate::models::borrow::BorrowStatus,
            borrows::BorrowRequest,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User and session management"),
        (name = "borrows", description = "Borrow workflow"),
        (name = "books", description = "Book catalog")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
