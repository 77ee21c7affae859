//! Borrows repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        borrow::BorrowHistoryEntry, Borrow, BorrowPolicy, BorrowSnapshot,
    },
};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get borrows of a member joined with book titles
    pub async fn history_for_member(&self, member_id: i32) -> AppResult<Vec<BorrowHistoryEntry>> {
        let rows = sqlx::query_as::<_, BorrowHistoryEntry>(
            r#"
            SELECT b.book_id, bk.name AS book_name, b.borrow_date,
                   b.return_date, b.score, b.is_returned
            FROM borrows b
            JOIN books bk ON bk.id = b.book_id
            WHERE b.member_id = $1
            ORDER BY b.borrow_date, b.id
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Scores left on returned borrows of a book
    pub async fn returned_scores(&self, book_id: i32) -> AppResult<Vec<i32>> {
        let scores = sqlx::query_scalar::<_, i32>(
            "SELECT score FROM borrows WHERE book_id = $1 AND is_returned AND score IS NOT NULL",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(scores)
    }

    /// Open a borrow after checking the lending policy in the same transaction.
    ///
    /// The member row and then the book row are locked, so concurrent borrows
    /// touching either of them queue up behind this one and see its insert.
    pub async fn open(
        &self,
        member_id: i32,
        book_id: i32,
        policy: &BorrowPolicy,
        now: DateTime<Utc>,
    ) -> AppResult<Borrow> {
        let mut tx = self.pool.begin().await?;

        let member_exists = sqlx::query_scalar::<_, i32>(
            "SELECT id FROM members WHERE id = $1 FOR UPDATE",
        )
        .bind(member_id)
        .fetch_optional(&mut *tx)
        .await?
        .is_some();

        let book_exists = sqlx::query_scalar::<_, i32>(
            "SELECT id FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .is_some();

        let (member_open, book_open, pair_open): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FILTER (WHERE member_id = $1),
                   COUNT(*) FILTER (WHERE book_id = $2),
                   COUNT(*) FILTER (WHERE member_id = $1 AND book_id = $2)
            FROM borrows
            WHERE NOT is_returned AND (member_id = $1 OR book_id = $2)
            "#,
        )
        .bind(member_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        // Dropping the transaction on error rolls it back
        policy.check(&BorrowSnapshot {
            member_exists,
            book_exists,
            member_open,
            book_open,
            pair_open,
        })?;

        let borrow = sqlx::query_as::<_, Borrow>(
            r#"
            INSERT INTO borrows (member_id, book_id, borrow_date, is_returned, created_at, updated_at)
            VALUES ($1, $2, $3, FALSE, $3, $3)
            RETURNING *
            "#,
        )
        .bind(member_id)
        .bind(book_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(conflict_on_unique_violation)?;

        tx.commit().await?;

        Ok(borrow)
    }

    /// Close the open borrow of a member/book pair
    pub async fn close(
        &self,
        member_id: i32,
        book_id: i32,
        score: Option<i32>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Borrow>> {
        let borrow = sqlx::query_as::<_, Borrow>(
            r#"
            UPDATE borrows
            SET return_date = $3, score = $4, is_returned = TRUE, updated_at = $3
            WHERE NOT is_returned AND id = (
                SELECT id FROM borrows
                WHERE member_id = $1 AND book_id = $2 AND NOT is_returned
                ORDER BY borrow_date
                LIMIT 1
                FOR UPDATE
            )
            RETURNING *
            "#,
        )
        .bind(member_id)
        .bind(book_id)
        .bind(now)
        .bind(score)
        .fetch_optional(&self.pool)
        .await?;

        Ok(borrow)
    }
}

/// The partial unique index on open borrows is the last line against a
/// second open borrow of the same book.
fn conflict_on_unique_violation(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("This book is already borrowed by another member".to_string())
        }
        _ => AppError::Database(err),
    }
}
