//! Borrow ledger: members, books and the lending rules between them

use std::sync::Arc;

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        book,
        borrow::{CurrentBorrow, ReturnedBook},
        member,
        Book, BookView, Borrow, BorrowPolicy, Member, MemberView, ReturnResult,
    },
    repository::LibraryStore,
};

#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn LibraryStore>,
    policy: BorrowPolicy,
}

impl LedgerService {
    pub fn new(store: Arc<dyn LibraryStore>, policy: BorrowPolicy) -> Self {
        Self { store, policy }
    }

    /// Whether the underlying store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }

    /// List all members
    pub async fn list_members(&self) -> AppResult<Vec<Member>> {
        self.store.list_members().await
    }

    /// Get a member with returned and current borrows
    pub async fn get_member(&self, id: i32) -> AppResult<MemberView> {
        let member = self
            .store
            .get_member(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

        let mut borrowed_books = Vec::new();
        let mut current_borrowing_books = Vec::new();

        for entry in self.store.member_history(id).await? {
            match (entry.is_returned, entry.return_date) {
                (true, Some(return_date)) => borrowed_books.push(ReturnedBook {
                    book_id: entry.book_id,
                    book_name: entry.book_name,
                    borrow_date: entry.borrow_date,
                    return_date,
                    score: entry.score,
                }),
                (true, None) => {
                    tracing::warn!(
                        member_id = id,
                        book_id = entry.book_id,
                        "Returned borrow without return date"
                    );
                }
                (false, _) => current_borrowing_books.push(CurrentBorrow {
                    book_id: entry.book_id,
                    book_name: entry.book_name,
                    borrow_date: entry.borrow_date,
                }),
            }
        }

        Ok(MemberView {
            id: member.id,
            full_name: member.full_name,
            borrowed_books,
            current_borrowing_books,
        })
    }

    pub async fn create_member(&self, full_name: &str) -> AppResult<Member> {
        if full_name.trim().is_empty() {
            return Err(AppError::field("name", "Member name is required"));
        }
        if full_name.contains('\0') {
            return Err(AppError::field("name", member::MEMBER_NAME_NUL));
        }

        let member = self.store.create_member(full_name, Utc::now()).await?;
        tracing::info!(member_id = member.id, "Member created");
        Ok(member)
    }

    /// List all books
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.store.list_books().await
    }

    /// Get a book with its average score
    pub async fn get_book(&self, id: i32) -> AppResult<BookView> {
        let book = self
            .store
            .get_book(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

        let scores = self.store.returned_scores(id).await?;

        Ok(BookView {
            id: book.id,
            name: book.name,
            average_score: average_score(&scores),
        })
    }

    pub async fn create_book(&self, name: &str) -> AppResult<Book> {
        if name.trim().is_empty() {
            return Err(AppError::field("name", "Book name is required"));
        }
        if name.contains('\0') {
            return Err(AppError::field("name", book::BOOK_NAME_NUL));
        }

        let book = self.store.create_book(name, Utc::now()).await?;
        tracing::info!(book_id = book.id, "Book created");
        Ok(book)
    }

    /// Lend a book to a member
    pub async fn borrow_book(&self, member_id: i32, book_id: i32) -> AppResult<Borrow> {
        let borrow = self
            .store
            .open_borrow(member_id, book_id, &self.policy, Utc::now())
            .await
            .inspect_err(|e| {
                tracing::debug!(member_id, book_id, error = %e, "Borrow rejected");
            })?;

        tracing::info!(borrow_id = borrow.id, member_id, book_id, "Book borrowed");
        Ok(borrow)
    }

    /// Take a book back, optionally with the reader's score
    pub async fn return_book(
        &self,
        member_id: i32,
        book_id: i32,
        score: Option<f64>,
    ) -> AppResult<ReturnResult> {
        let score = score.map(normalize_score).transpose()?;

        let borrow = self
            .store
            .close_borrow(member_id, book_id, score, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound("Borrow record not found".to_string()))?;

        let return_date = borrow.return_date.ok_or_else(|| {
            AppError::Internal(format!("Borrow {} closed without return date", borrow.id))
        })?;

        tracing::info!(borrow_id = borrow.id, member_id, book_id, ?score, "Book returned");

        Ok(ReturnResult {
            members_id: member_id,
            book_id,
            return_date,
        })
    }
}

/// Scores are stored as integers; fractional input is rounded
fn normalize_score(score: f64) -> AppResult<i32> {
    if !score.is_finite() || score < 0.0 || score.round() > f64::from(i32::MAX) {
        return Err(AppError::field("score", "Score must be a non-negative number"));
    }
    Ok(score.round() as i32)
}

/// Mean rounded to two decimals, 0 when there is nothing to average
fn average_score(scores: &[i32]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let total: i64 = scores.iter().map(|&s| i64::from(s)).sum();
    let mean = total as f64 / scores.len() as f64;
    (mean * 100.0).round() / 100.0
}
