//! Persistence gateway for members, books and borrows

pub mod books;
pub mod borrows;
pub mod members;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        borrow::BorrowHistoryEntry, Book, Borrow, BorrowPolicy, Member,
    },
};

pub use memory::MemoryStore;

/// Storage operations the ledger relies on.
///
/// `open_borrow` must run the policy check and the insert as one atomic step:
/// two concurrent calls for the same book or member never both succeed when
/// the policy would reject the second.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// Cheap connectivity probe
    async fn ping(&self) -> AppResult<()>;

    async fn list_members(&self) -> AppResult<Vec<Member>>;
    async fn get_member(&self, id: i32) -> AppResult<Option<Member>>;
    async fn create_member(&self, full_name: &str, now: DateTime<Utc>) -> AppResult<Member>;
    /// Every borrow of a member, oldest first, with book titles
    async fn member_history(&self, member_id: i32) -> AppResult<Vec<BorrowHistoryEntry>>;

    async fn list_books(&self) -> AppResult<Vec<Book>>;
    async fn get_book(&self, id: i32) -> AppResult<Option<Book>>;
    async fn create_book(&self, name: &str, now: DateTime<Utc>) -> AppResult<Book>;
    /// Non-null scores of returned borrows of a book
    async fn returned_scores(&self, book_id: i32) -> AppResult<Vec<i32>>;

    async fn open_borrow(
        &self,
        member_id: i32,
        book_id: i32,
        policy: &BorrowPolicy,
        now: DateTime<Utc>,
    ) -> AppResult<Borrow>;

    /// Closes the open borrow of the pair; `None` when there is none
    async fn close_borrow(
        &self,
        member_id: i32,
        book_id: i32,
        score: Option<i32>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Borrow>>;
}

/// PostgreSQL-backed store holding the connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub members: members::MembersRepository,
    pub books: books::BooksRepository,
    pub borrows: borrows::BorrowsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            members: members::MembersRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            borrows: borrows::BorrowsRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl LibraryStore for Repository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_members(&self) -> AppResult<Vec<Member>> {
        self.members.list().await
    }

    async fn get_member(&self, id: i32) -> AppResult<Option<Member>> {
        self.members.get_by_id(id).await
    }

    async fn create_member(&self, full_name: &str, now: DateTime<Utc>) -> AppResult<Member> {
        self.members.create(full_name, now).await
    }

    async fn member_history(&self, member_id: i32) -> AppResult<Vec<BorrowHistoryEntry>> {
        self.borrows.history_for_member(member_id).await
    }

    async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.books.list().await
    }

    async fn get_book(&self, id: i32) -> AppResult<Option<Book>> {
        self.books.get_by_id(id).await
    }

    async fn create_book(&self, name: &str, now: DateTime<Utc>) -> AppResult<Book> {
        self.books.create(name, now).await
    }

    async fn returned_scores(&self, book_id: i32) -> AppResult<Vec<i32>> {
        self.borrows.returned_scores(book_id).await
    }

    async fn open_borrow(
        &self,
        member_id: i32,
        book_id: i32,
        policy: &BorrowPolicy,
        now: DateTime<Utc>,
    ) -> AppResult<Borrow> {
        self.borrows.open(member_id, book_id, policy, now).await
    }

    async fn close_borrow(
        &self,
        member_id: i32,
        book_id: i32,
        score: Option<i32>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Borrow>> {
        self.borrows.close(member_id, book_id, score, now).await
    }
}
