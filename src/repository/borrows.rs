//! Borrow ledger repository for database operations
//!
//! Writes are single conditional statements keyed by the composite
//! (book, user, open/status) predicate, so two requests racing past the
//! service-level checks surface as a failed precondition here instead of a
//! corrupt ledger.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::borrow::BorrowRecord};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Full ledger for a book, oldest episode first
    pub async fn for_book(&self, book_id: i32) -> AppResult<Vec<BorrowRecord>> {
        let records = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrows WHERE book_id = $1 ORDER BY id",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Open a new borrow episode in state `requested`
    pub async fn insert_request(
        &self,
        book_id: i32,
        user_id: i32,
        borrower_name: &str,
        now: DateTime<Utc>,
    ) -> AppResult<BorrowRecord> {
        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            INSERT INTO borrows (book_id, user_id, borrower_name, status, borrowed_on)
            VALUES ($1, $2, $3, 'requested', $4)
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .bind(borrower_name)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Transition the user's open `requested` record to `accepted`,
    /// restamping `borrowed_on`. Returns the number of rows affected;
    /// zero means no matching open request exists.
    pub async fn accept(&self, book_id: i32, user_id: i32, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE borrows
            SET status = 'accepted', borrowed_on = $3
            WHERE book_id = $1
              AND user_id = $2
              AND status = 'requested'
              AND returned_on IS NULL
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Close the user's open record by stamping `returned_on`; status is
    /// left unchanged. Returns the number of rows affected; zero means the
    /// user holds no open borrow of this book.
    pub async fn mark_returned(
        &self,
        book_id: i32,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE borrows
            SET returned_on = $3
            WHERE book_id = $1
              AND user_id = $2
              AND returned_on IS NULL
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
