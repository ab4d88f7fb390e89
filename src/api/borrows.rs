//! Borrow workflow endpoints

use axum::{extract::State, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::AppResult;

use super::{
    books::{BookResponse, BooksResponse},
    SessionUser,
};

/// Borrow workflow request body
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    /// ISBN of the book
    pub isbn: String,
    /// Borrowing user's id
    pub user_id: i32,
}

/// Request to borrow a book
#[utoipa::path(
    post,
    path = "/users/borrow",
    tag = "borrows",
    request_body = BorrowRequest,
    responses(
        (status = 200, description = "Borrow requested", body = BookResponse),
        (status = 400, description = "Book unavailable or already borrowed"),
        (status = 404, description = "Book or user not found")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    Json(request): Json<BorrowRequest>,
) -> AppResult<Json<BookResponse>> {
    let book = state
        .services
        .borrows
        .initiate_borrow(&request.isbn, request.user_id)
        .await?;
    Ok(Json(BookResponse { book }))
}

/// Accept a pending borrow request
#[utoipa::path(
    post,
    path = "/users/accept-borrow",
    tag = "borrows",
    request_body = BorrowRequest,
    responses(
        (status = 200, description = "Borrow accepted", body = BookResponse),
        (status = 400, description = "Book unavailable or already borrowed"),
        (status = 404, description = "Book, user or borrow request not found")
    )
)]
pub async fn accept_borrow(
    State(state): State<crate::AppState>,
    Json(request): Json<BorrowRequest>,
) -> AppResult<Json<BookResponse>> {
    let book = state
        .services
        .borrows
        .accept_borrow(&request.isbn, request.user_id)
        .await?;
    Ok(Json(BookResponse { book }))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/users/return",
    tag = "borrows",
    request_body = BorrowRequest,
    responses(
        (status = 200, description = "Book returned", body = BookResponse),
        (status = 400, description = "Book not currently borrowed by this user"),
        (status = 404, description = "Book or user not found")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    Json(request): Json<BorrowRequest>,
) -> AppResult<Json<BookResponse>> {
    let book = state
        .services
        .borrows
        .return_book(&request.isbn, request.user_id)
        .await?;
    Ok(Json(BookResponse { book }))
}

/// Books currently borrowed by the logged-in user
#[utoipa::path(
    get,
    path = "/users/borrowed-books",
    tag = "borrows",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Borrowed books", body = BooksResponse),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn borrowed_books(
    State(state): State<crate::AppState>,
    SessionUser(user_id): SessionUser,
) -> AppResult<Json<BooksResponse>> {
    let books = state.services.borrows.borrowed_books(user_id).await?;
    Ok(Json(BooksResponse { books }))
}
