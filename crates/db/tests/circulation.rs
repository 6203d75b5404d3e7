//! Circulation integration tests against PostgreSQL.
//!
//! These run against a real database because the properties under test
//! are about row locking and atomic updates. They are ignored by default;
//! run with `cargo test -- --ignored` and a reachable `DATABASE_URL`.

use chrono::Utc;
use sqlx::PgPool;

use lectern_core::circulation::{due_date, DEFAULT_LOAN_DAYS};
use lectern_db::models::author::CreateAuthor;
use lectern_db::models::book::{Book, CreateBook};
use lectern_db::models::loan::BorrowOutcome;
use lectern_db::repositories::{AuthorRepo, BookRepo, LoanRepo};

/// Insert an author and a book with the given stock.
async fn seed_book(pool: &PgPool, total_copies: i32) -> Book {
    let author = AuthorRepo::create(
        pool,
        &CreateAuthor {
            name: "Ursula K. Le Guin".into(),
        },
    )
    .await
    .unwrap();

    BookRepo::create(
        pool,
        &CreateBook {
            title: "A Wizard of Earthsea".into(),
            description: None,
            author_id: author.id,
            total_copies: Some(total_copies),
            genre_ids: None,
        },
    )
    .await
    .unwrap()
}

async fn available(pool: &PgPool, book_id: i64) -> i32 {
    BookRepo::find_by_id(pool, book_id)
        .await
        .unwrap()
        .unwrap()
        .available_copies
}

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Requires a PostgreSQL DATABASE_URL
async fn borrow_decrements_and_creates_open_loan(pool: PgPool) {
    let book = seed_book(&pool, 3).await;
    let due = due_date(Utc::now(), DEFAULT_LOAN_DAYS);

    let outcome = LoanRepo::borrow(&pool, book.id, "reader-1", due).await.unwrap();
    let loan = match outcome {
        BorrowOutcome::Created(loan) => loan,
        other => panic!("expected Created, got {other:?}"),
    };

    assert!(loan.is_open());
    assert_eq!(loan.book_id, book.id);
    // timestamptz keeps microseconds; compare at that precision.
    assert_eq!(loan.due_at.timestamp_micros(), due.timestamp_micros());
    assert_eq!(available(&pool, book.id).await, 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Requires a PostgreSQL DATABASE_URL
async fn borrow_fails_when_no_copies_left(pool: PgPool) {
    let book = seed_book(&pool, 1).await;
    let due = due_date(Utc::now(), DEFAULT_LOAN_DAYS);

    let first = LoanRepo::borrow(&pool, book.id, "reader-1", due).await.unwrap();
    assert!(matches!(first, BorrowOutcome::Created(_)));

    let second = LoanRepo::borrow(&pool, book.id, "reader-2", due).await.unwrap();
    assert!(matches!(second, BorrowOutcome::Unavailable));
    assert_eq!(available(&pool, book.id).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Requires a PostgreSQL DATABASE_URL
async fn borrow_unknown_book(pool: PgPool) {
    let due = due_date(Utc::now(), DEFAULT_LOAN_DAYS);
    let outcome = LoanRepo::borrow(&pool, 999_999, "reader-1", due).await.unwrap();
    assert!(matches!(outcome, BorrowOutcome::BookNotFound));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Requires a PostgreSQL DATABASE_URL
async fn concurrent_borrows_of_last_copy_serialize(pool: PgPool) {
    let book = seed_book(&pool, 1).await;
    let due = due_date(Utc::now(), DEFAULT_LOAN_DAYS);

    // Two simultaneous borrows race for the single copy. The row lock
    // serializes them: exactly one wins, the other sees Unavailable.
    let (a, b) = tokio::join!(
        LoanRepo::borrow(&pool, book.id, "reader-a", due),
        LoanRepo::borrow(&pool, book.id, "reader-b", due),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    let created = [&a, &b]
        .iter()
        .filter(|o| matches!(o, BorrowOutcome::Created(_)))
        .count();
    let unavailable = [&a, &b]
        .iter()
        .filter(|o| matches!(o, BorrowOutcome::Unavailable))
        .count();

    assert_eq!(created, 1, "exactly one borrow must win");
    assert_eq!(unavailable, 1, "the loser must see Unavailable");
    assert_eq!(available(&pool, book.id).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Requires a PostgreSQL DATABASE_URL
async fn return_increments_and_is_idempotent(pool: PgPool) {
    let book = seed_book(&pool, 2).await;
    let due = due_date(Utc::now(), DEFAULT_LOAN_DAYS);

    let loan = match LoanRepo::borrow(&pool, book.id, "reader-1", due).await.unwrap() {
        BorrowOutcome::Created(loan) => loan,
        other => panic!("expected Created, got {other:?}"),
    };
    assert_eq!(available(&pool, book.id).await, 1);

    let returned = LoanRepo::return_loan(&pool, loan.id).await.unwrap().unwrap();
    assert!(!returned.is_open());
    assert_eq!(available(&pool, book.id).await, 2);

    // Closing an already-closed loan is a no-op returning the existing
    // record: returned_at unchanged, count untouched.
    let again = LoanRepo::return_loan(&pool, loan.id).await.unwrap().unwrap();
    assert_eq!(again.returned_at, returned.returned_at);
    assert_eq!(available(&pool, book.id).await, 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Requires a PostgreSQL DATABASE_URL
async fn return_unknown_loan(pool: PgPool) {
    assert!(LoanRepo::return_loan(&pool, 999_999).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Requires a PostgreSQL DATABASE_URL
async fn available_copies_never_exceed_total(pool: PgPool) {
    let book = seed_book(&pool, 1).await;

    // A stray increment on a full book clamps instead of overflowing the
    // schema check.
    BookRepo::increment_available(&pool, book.id).await.unwrap();
    assert_eq!(available(&pool, book.id).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Requires a PostgreSQL DATABASE_URL
async fn open_loans_listing(pool: PgPool) {
    let book = seed_book(&pool, 2).await;
    let due = due_date(Utc::now(), 7);

    let first = match LoanRepo::borrow(&pool, book.id, "reader-1", due).await.unwrap() {
        BorrowOutcome::Created(loan) => loan,
        other => panic!("expected Created, got {other:?}"),
    };
    let _second = LoanRepo::borrow(&pool, book.id, "reader-2", due).await.unwrap();

    assert_eq!(LoanRepo::list_open(&pool).await.unwrap().len(), 2);

    LoanRepo::return_loan(&pool, first.id).await.unwrap();
    let open = LoanRepo::list_open(&pool).await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(LoanRepo::list_by_book(&pool, book.id).await.unwrap().len(), 2);
}
