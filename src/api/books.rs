//! Book catalog endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::book::{BookDetails, BookView, CreateBook, UpdateBook},
};

use super::users::SuccessResponse;

/// Response wrapping a list of books
#[derive(Serialize, ToSchema)]
pub struct BooksResponse {
    pub books: Vec<BookView>,
}

/// Response wrapping a single book
#[derive(Serialize, ToSchema)]
pub struct BookResponse {
    pub book: BookView,
}

/// Response wrapping a book with its borrow ledger
#[derive(Serialize, ToSchema)]
pub struct BookDetailsResponse {
    pub book: BookDetails,
}

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "List of books with availability", body = BooksResponse)
    )
)]
pub async fn list_books(State(state): State<crate::AppState>) -> AppResult<Json<BooksResponse>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(BooksResponse { books }))
}

/// Get a book by ISBN, including its borrow records
#[utoipa::path(
    get,
    path = "/books/{isbn}",
    tag = "books",
    params(
        ("isbn" = String, Path, description = "Book ISBN")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetailsResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(isbn): Path<String>,
) -> AppResult<Json<BookDetailsResponse>> {
    let book = state.services.catalog.get_book(&isbn).await?;
    Ok(Json(BookDetailsResponse { book }))
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 200, description = "Book created", body = BookResponse),
        (status = 400, description = "Duplicate ISBN or invalid input")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    Json(book): Json<CreateBook>,
) -> AppResult<Json<BookResponse>> {
    let book = state.services.catalog.create_book(book).await?;
    Ok(Json(BookResponse { book }))
}

/// Update a book
#[utoipa::path(
    patch,
    path = "/books/{isbn}",
    tag = "books",
    params(
        ("isbn" = String, Path, description = "Book ISBN")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(isbn): Path<String>,
    Json(update): Json<UpdateBook>,
) -> AppResult<Json<BookResponse>> {
    let book = state.services.catalog.update_book(&isbn, update).await?;
    Ok(Json(BookResponse { book }))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{isbn}",
    tag = "books",
    params(
        ("isbn" = String, Path, description = "Book ISBN")
    ),
    responses(
        (status = 200, description = "Book deleted", body = SuccessResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(isbn): Path<String>,
) -> AppResult<Json<SuccessResponse>> {
    state.services.catalog.delete_book(&isbn).await?;
    Ok(Json(SuccessResponse { success: true }))
}
