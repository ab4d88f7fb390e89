//! Books repository for database operations

use rust_decimal::Decimal;
use sqlx::{FromRow, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookView, CreateBook, UpdateBook},
};

/// Row shape for list queries that aggregate open borrowers in SQL
#[derive(FromRow)]
struct BookWithBorrowersRow {
    id: i32,
    isbn: String,
    name: String,
    quantity: i32,
    price: Decimal,
    borrowed_by: Vec<i32>,
}

impl From<BookWithBorrowersRow> for BookView {
    fn from(row: BookWithBorrowersRow) -> Self {
        let available_quantity = row.quantity - row.borrowed_by.len() as i32;
        BookView {
            id: row.id,
            isbn: row.isbn,
            name: row.name,
            quantity: row.quantity,
            price: row.price,
            borrowed_by: row.borrowed_by,
            available_quantity,
        }
    }
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ISBN
    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<Book> {
        self.find_by_isbn(isbn)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// Find book by ISBN, if present
    pub async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    /// List all books with availability derived from the borrow ledger
    pub async fn list_views(&self) -> AppResult<Vec<BookView>> {
        let rows = sqlx::query_as::<_, BookWithBorrowersRow>(
            r#"
            SELECT b.id, b.isbn, b.name, b.quantity, b.price,
                   COALESCE(
                       ARRAY_AGG(br.user_id ORDER BY br.id)
                           FILTER (WHERE br.returned_on IS NULL),
                       ARRAY[]::integer[]
                   ) AS borrowed_by
            FROM books b
            LEFT JOIN borrows br ON br.book_id = b.id
            GROUP BY b.id
            ORDER BY b.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BookView::from).collect())
    }

    /// List books the given user currently holds an open borrow of
    pub async fn list_borrowed_by_user(&self, user_id: i32) -> AppResult<Vec<BookView>> {
        let rows = sqlx::query_as::<_, BookWithBorrowersRow>(
            r#"
            SELECT b.id, b.isbn, b.name, b.quantity, b.price,
                   COALESCE(
                       ARRAY_AGG(br.user_id ORDER BY br.id)
                           FILTER (WHERE br.returned_on IS NULL),
                       ARRAY[]::integer[]
                   ) AS borrowed_by
            FROM books b
            LEFT JOIN borrows br ON br.book_id = b.id
            WHERE EXISTS (
                SELECT 1 FROM borrows o
                WHERE o.book_id = b.id
                  AND o.user_id = $1
                  AND o.returned_on IS NULL
            )
            GROUP BY b.id
            ORDER BY b.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BookView::from).collect())
    }

    /// Create a new book
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (isbn, name, quantity, price)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.name)
        .bind(book.quantity)
        .bind(book.price.unwrap_or_default())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a book's mutable fields
    pub async fn update(&self, isbn: &str, update: &UpdateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET name = COALESCE($2, name),
                quantity = COALESCE($3, quantity),
                price = COALESCE($4, price)
            WHERE isbn = $1
            RETURNING *
            "#,
        )
        .bind(isbn)
        .bind(&update.name)
        .bind(update.quantity)
        .bind(update.price)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// Delete a book (its borrow ledger goes with it)
    pub async fn delete(&self, isbn: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = $1")
            .bind(isbn)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Book not found".to_string()));
        }

        Ok(())
    }
}
