//! Borrow workflow service
//!
//! Drives the `NONE -> REQUESTED -> ACCEPTED -> RETURNED` lifecycle of a
//! borrow episode. Preconditions are checked in a fixed order, each with its
//! own failure, and every check reads the same open-count derived from the
//! borrow ledger.

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookView},
        borrow::{self, BorrowStatus},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
}

impl BorrowsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Request to borrow a book.
    ///
    /// Checked in order: book exists, a copy is available, user exists, the
    /// user has no open borrow of this book. On success a new ledger record
    /// is opened in state `requested`.
    pub async fn initiate_borrow(&self, isbn: &str, user_id: i32) -> AppResult<BookView> {
        let book = self.repository.books.get_by_isbn(isbn).await?;

        let ledger = self.repository.borrows.for_book(book.id).await?;
        if borrow::open_count(&ledger) >= book.quantity as usize {
            return Err(AppError::Conflict("Book is not available".to_string()));
        }

        let user = self.repository.users.get_by_id(user_id).await?;
        if borrow::open_for_user(&ledger, user.id).is_some() {
            return Err(AppError::Conflict(
                "You've already borrowed this book".to_string(),
            ));
        }

        self.repository
            .borrows
            .insert_request(book.id, user.id, &user.username, Utc::now())
            .await?;

        tracing::info!(isbn = %book.isbn, user_id, "borrow requested");
        self.book_view(book).await
    }

    /// Accept a pending borrow request.
    ///
    /// Capacity is re-verified at acceptance time against the same
    /// open-count, independent of whether this user already has a request.
    /// Without a matching open `requested` record the operation fails with
    /// not-found rather than silently returning the current state.
    pub async fn accept_borrow(&self, isbn: &str, user_id: i32) -> AppResult<BookView> {
        let book = self.repository.books.get_by_isbn(isbn).await?;

        let ledger = self.repository.borrows.for_book(book.id).await?;
        if borrow::open_count(&ledger) >= book.quantity as usize {
            return Err(AppError::Conflict("Book is not available".to_string()));
        }

        let user = self.repository.users.get_by_id(user_id).await?;
        if matches!(
            borrow::open_for_user(&ledger, user.id),
            Some(r) if r.status == BorrowStatus::Accepted
        ) {
            return Err(AppError::Conflict(
                "This user already borrowed this book".to_string(),
            ));
        }

        let updated = self
            .repository
            .borrows
            .accept(book.id, user.id, Utc::now())
            .await?;
        if updated == 0 {
            return Err(AppError::NotFound("Borrow request not found".to_string()));
        }

        tracing::info!(isbn = %book.isbn, user_id, "borrow accepted");
        self.book_view(book).await
    }

    /// Return a borrowed book.
    ///
    /// Closes the user's open ledger record by stamping `returned_on`;
    /// the record's status is left as its last value.
    pub async fn return_book(&self, isbn: &str, user_id: i32) -> AppResult<BookView> {
        let book = self.repository.books.get_by_isbn(isbn).await?;
        let user = self.repository.users.get_by_id(user_id).await?;

        let ledger = self.repository.borrows.for_book(book.id).await?;
        if borrow::open_for_user(&ledger, user.id).is_none() {
            return Err(AppError::Conflict(
                "You need to borrow this book first!".to_string(),
            ));
        }

        let returned = self
            .repository
            .borrows
            .mark_returned(book.id, user.id, Utc::now())
            .await?;
        if returned == 0 {
            // Lost a race with a concurrent return of the same record.
            return Err(AppError::Conflict(
                "You need to borrow this book first!".to_string(),
            ));
        }

        tracing::info!(isbn = %book.isbn, user_id, "book returned");
        self.book_view(book).await
    }

    /// Books the user currently holds an open borrow of. Read-only.
    pub async fn borrowed_books(&self, user_id: i32) -> AppResult<Vec<BookView>> {
        self.repository.books.list_borrowed_by_user(user_id).await
    }

    /// Rebuild the client view of a book from its current ledger
    async fn book_view(&self, book: Book) -> AppResult<BookView> {
        let ledger = self.repository.borrows.for_book(book.id).await?;
        Ok(BookView::from_ledger(book, &ledger))
    }
}
