//! Book catalog service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{BookDetails, BookView, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all books with derived availability
    pub async fn list_books(&self) -> AppResult<Vec<BookView>> {
        self.repository.books.list_views().await
    }

    /// Get one book with its full borrow ledger
    pub async fn get_book(&self, isbn: &str) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_isbn(isbn).await?;
        let ledger = self.repository.borrows.for_book(book.id).await?;
        Ok(BookDetails {
            book: BookView::from_ledger(book, &ledger),
            borrows: ledger,
        })
    }

    /// Add a book to the catalog. ISBN must be unique.
    pub async fn create_book(&self, book: CreateBook) -> AppResult<BookView> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.books.find_by_isbn(&book.isbn).await?.is_some() {
            return Err(AppError::Conflict(
                "A book with this ISBN already exists".to_string(),
            ));
        }

        let created = self.repository.books.create(&book).await?;
        tracing::info!(isbn = %created.isbn, "book added to catalog");

        Ok(BookView::from_ledger(created, &[]))
    }

    /// Update a book's name, quantity or price
    pub async fn update_book(&self, isbn: &str, update: UpdateBook) -> AppResult<BookView> {
        update
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let updated = self.repository.books.update(isbn, &update).await?;
        let ledger = self.repository.borrows.for_book(updated.id).await?;
        Ok(BookView::from_ledger(updated, &ledger))
    }

    /// Remove a book from the catalog
    pub async fn delete_book(&self, isbn: &str) -> AppResult<()> {
        self.repository.books.delete(isbn).await?;
        tracing::info!(isbn, "book removed from catalog");
        Ok(())
    }
}
