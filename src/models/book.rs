//! Book (catalog entry) model and related types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::borrow::{self, BorrowRecord};

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub isbn: String,
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
}

/// Book as rendered to clients, with availability derived from the ledger
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookView {
    pub id: i32,
    pub isbn: String,
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
    /// User ids currently holding an open borrow of this book
    pub borrowed_by: Vec<i32>,
    pub available_quantity: i32,
}

impl BookView {
    /// Build the client view of a book from its borrow ledger.
    pub fn from_ledger(book: Book, ledger: &[BorrowRecord]) -> Self {
        let borrowed_by = borrow::open_borrowers(ledger);
        let available_quantity = borrow::available_quantity(book.quantity, ledger);
        Self {
            id: book.id,
            isbn: book.isbn,
            name: book.name,
            quantity: book.quantity,
            price: book.price,
            borrowed_by,
            available_quantity,
        }
    }
}

/// Book plus its full borrow ledger (admin detail view)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: BookView,
    pub borrows: Vec<BorrowRecord>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    pub price: Option<Decimal>,
}

/// Update book request (partial)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    pub name: Option<String>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: Option<i32>,
    pub price: Option<Decimal>,
}
