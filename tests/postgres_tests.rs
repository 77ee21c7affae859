//! PostgreSQL store tests
//!
//! Each test gets a fresh database from `DATABASE_URL` with migrations applied.
//! Run with: cargo test -- --ignored

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;

use library_lending_server::{
    models::BorrowPolicy,
    repository::{LibraryStore, Repository},
    AppError,
};

async fn seed(store: &Repository, members: usize, books: usize) {
    let now = Utc::now();
    for i in 0..members {
        store
            .create_member(&format!("Member {i}"), now)
            .await
            .expect("Failed to create member");
    }
    for i in 0..books {
        store
            .create_book(&format!("Book {i}"), now)
            .await
            .expect("Failed to create book");
    }
}

#[sqlx::test]
#[ignore]
async fn test_borrow_and_return_roundtrip(pool: PgPool) {
    let store = Repository::new(pool);
    seed(&store, 1, 1).await;
    let policy = BorrowPolicy::default();

    let borrow = store
        .open_borrow(1, 1, &policy, Utc::now())
        .await
        .expect("Failed to open borrow");
    assert!(borrow.is_open());

    let history = store.member_history(1).await.expect("Failed to read history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].book_name, "Book 0");

    let closed = store
        .close_borrow(1, 1, Some(5), Utc::now())
        .await
        .expect("Failed to close borrow")
        .expect("Borrow should be open");
    assert!(closed.is_returned);
    assert!(closed.return_date.is_some());

    assert_eq!(store.returned_scores(1).await.expect("scores"), vec![5]);
    assert!(store
        .close_borrow(1, 1, None, Utc::now())
        .await
        .expect("Failed to close borrow")
        .is_none());
}

#[sqlx::test]
#[ignore]
async fn test_policy_rejections_leave_no_row(pool: PgPool) {
    let store = Repository::new(pool);
    seed(&store, 2, 4).await;
    let policy = BorrowPolicy::default();
    let now = Utc::now();

    for book in 1..=3 {
        store.open_borrow(1, book, &policy, now).await.expect("Failed to borrow");
    }

    let err = store.open_borrow(1, 4, &policy, now).await.unwrap_err();
    assert!(matches!(err, AppError::LimitExceeded(_)));

    let err = store.open_borrow(2, 1, &policy, now).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = store.open_borrow(99, 4, &policy, now).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    assert_eq!(store.member_history(1).await.expect("history").len(), 3);
    assert!(store.member_history(2).await.expect("history").is_empty());
}

#[sqlx::test]
#[ignore]
async fn test_concurrent_borrows_of_one_book(pool: PgPool) {
    let store = Arc::new(Repository::new(pool));
    seed(&store, 8, 1).await;

    let handles: Vec<_> = (1..=8)
        .map(|member_id| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .open_borrow(member_id, 1, &BorrowPolicy::default(), Utc::now())
                    .await
            })
        })
        .collect();

    let mut won = 0;
    for handle in handles {
        match handle.await.expect("Task panicked") {
            Ok(_) => won += 1,
            Err(AppError::Conflict(_)) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(won, 1);

    let open: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM borrows WHERE book_id = 1 AND NOT is_returned")
            .fetch_one(&store.pool)
            .await
            .expect("Failed to count borrows");
    assert_eq!(open, 1);
}

#[sqlx::test]
#[ignore]
async fn test_concurrent_borrows_respect_member_cap(pool: PgPool) {
    let store = Arc::new(Repository::new(pool));
    seed(&store, 1, 6).await;

    let handles: Vec<_> = (1..=6)
        .map(|book_id| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .open_borrow(1, book_id, &BorrowPolicy::default(), Utc::now())
                    .await
            })
        })
        .collect();

    let mut won = 0;
    for handle in handles {
        if handle.await.expect("Task panicked").is_ok() {
            won += 1;
        }
    }
    assert_eq!(won, 3);
}

#[sqlx::test]
#[ignore]
async fn test_names_are_not_length_capped(pool: PgPool) {
    let store = Repository::new(pool);
    let long = "x".repeat(300);

    let member = store
        .create_member(&long, Utc::now())
        .await
        .expect("Failed to create member");
    assert_eq!(member.full_name, long);

    let book = store
        .create_book(&long, Utc::now())
        .await
        .expect("Failed to create book");
    assert_eq!(book.name.len(), 300);
}
