//! In-memory store, used for local runs without PostgreSQL and by the tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::{
    error::AppResult,
    models::{
        borrow::BorrowHistoryEntry, Book, Borrow, BorrowPolicy, BorrowSnapshot, Member,
    },
};

use super::LibraryStore;

#[derive(Default)]
struct Tables {
    members: Vec<Member>,
    books: Vec<Book>,
    borrows: Vec<Borrow>,
}

impl Tables {
    // Rows are never deleted, so ids are positions + 1
    fn next_id(len: usize) -> i32 {
        i32::try_from(len).map(|n| n + 1).unwrap_or(i32::MAX)
    }

    fn book_name(&self, book_id: i32) -> String {
        self.books
            .iter()
            .find(|b| b.id == book_id)
            .map(|b| b.name.clone())
            .unwrap_or_default()
    }
}

/// All tables behind one lock; every operation is atomic
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LibraryStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn list_members(&self) -> AppResult<Vec<Member>> {
        Ok(self.tables.lock().await.members.clone())
    }

    async fn get_member(&self, id: i32) -> AppResult<Option<Member>> {
        let tables = self.tables.lock().await;
        Ok(tables.members.iter().find(|m| m.id == id).cloned())
    }

    async fn create_member(&self, full_name: &str, now: DateTime<Utc>) -> AppResult<Member> {
        let mut tables = self.tables.lock().await;
        let member = Member {
            id: Tables::next_id(tables.members.len()),
            full_name: full_name.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.members.push(member.clone());
        Ok(member)
    }

    async fn member_history(&self, member_id: i32) -> AppResult<Vec<BorrowHistoryEntry>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .borrows
            .iter()
            .filter(|b| b.member_id == member_id)
            .map(|b| BorrowHistoryEntry {
                book_id: b.book_id,
                book_name: tables.book_name(b.book_id),
                borrow_date: b.borrow_date,
                return_date: b.return_date,
                score: b.score,
                is_returned: b.is_returned,
            })
            .collect())
    }

    async fn list_books(&self) -> AppResult<Vec<Book>> {
        Ok(self.tables.lock().await.books.clone())
    }

    async fn get_book(&self, id: i32) -> AppResult<Option<Book>> {
        let tables = self.tables.lock().await;
        Ok(tables.books.iter().find(|b| b.id == id).cloned())
    }

    async fn create_book(&self, name: &str, now: DateTime<Utc>) -> AppResult<Book> {
        let mut tables = self.tables.lock().await;
        let book = Book {
            id: Tables::next_id(tables.books.len()),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.books.push(book.clone());
        Ok(book)
    }

    async fn returned_scores(&self, book_id: i32) -> AppResult<Vec<i32>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .borrows
            .iter()
            .filter(|b| b.book_id == book_id && b.is_returned)
            .filter_map(|b| b.score)
            .collect())
    }

    async fn open_borrow(
        &self,
        member_id: i32,
        book_id: i32,
        policy: &BorrowPolicy,
        now: DateTime<Utc>,
    ) -> AppResult<Borrow> {
        let mut tables = self.tables.lock().await;

        let snapshot = {
            let open: Vec<&Borrow> = tables.borrows.iter().filter(|b| b.is_open()).collect();
            BorrowSnapshot {
                member_exists: tables.members.iter().any(|m| m.id == member_id),
                book_exists: tables.books.iter().any(|b| b.id == book_id),
                member_open: open.iter().filter(|b| b.member_id == member_id).count() as i64,
                book_open: open.iter().filter(|b| b.book_id == book_id).count() as i64,
                pair_open: open
                    .iter()
                    .filter(|b| b.member_id == member_id && b.book_id == book_id)
                    .count() as i64,
            }
        };
        policy.check(&snapshot)?;

        let borrow = Borrow {
            id: Tables::next_id(tables.borrows.len()),
            member_id,
            book_id,
            borrow_date: now,
            return_date: None,
            score: None,
            is_returned: false,
            created_at: now,
            updated_at: now,
        };
        tables.borrows.push(borrow.clone());
        Ok(borrow)
    }

    async fn close_borrow(
        &self,
        member_id: i32,
        book_id: i32,
        score: Option<i32>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Borrow>> {
        let mut tables = self.tables.lock().await;
        let Some(borrow) = tables
            .borrows
            .iter_mut()
            .find(|b| b.is_open() && b.member_id == member_id && b.book_id == book_id)
        else {
            return Ok(None);
        };

        borrow.return_date = Some(now);
        borrow.score = score;
        borrow.is_returned = true;
        borrow.updated_at = now;
        Ok(Some(borrow.clone()))
    }
}
