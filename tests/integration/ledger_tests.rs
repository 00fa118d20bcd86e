//! Database-backed ledger scenarios.
//!
//! Each test gets a fresh, migrated database from `#[sqlx::test]`; set
//! DATABASE_URL and run with: cargo test -- --ignored

use bookdesk_server::{
    config::AuthConfig,
    error::AppError,
    models::{
        book::{CreateBook, UpdateBook},
        issue::{CreateIssue, IssueStatus},
        user::{CreateUser, Role, UpdateUser, User, UserClaims},
    },
    policy::{self, FinePolicy},
    repository::Repository,
    services::{seed, Services},
};
use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

fn services(pool: PgPool) -> Services {
    Services::new(Repository::new(pool), AuthConfig::default(), FinePolicy::default())
}

fn days_ago(days: u64) -> NaiveDate {
    policy::today().checked_sub_days(Days::new(days)).unwrap()
}

fn book(title: &str, isbn: &str, quantity: i32) -> CreateBook {
    CreateBook {
        title: title.to_string(),
        author: "Test Author".to_string(),
        isbn: isbn.to_string(),
        category: Some("Testing".to_string()),
        publisher: None,
        publication_year: None,
        quantity: Some(quantity),
        price: None,
        description: None,
    }
}

fn member(book_id: i64) -> CreateIssue {
    CreateIssue {
        book_id,
        member_name: "Rahul Sharma".to_string(),
        member_email: "rahul@example.com".to_string(),
        remarks: None,
    }
}

fn claims(email: &str) -> UserClaims {
    let now = Utc::now().timestamp();
    UserClaims {
        sub: email.to_string(),
        role: Role::Librarian,
        exp: now + 600,
        iat: now,
    }
}

async fn staff(repository: &Repository, email: &str) -> User {
    let profile = CreateUser {
        name: "Desk Staff".to_string(),
        email: email.to_string(),
        password: "unused".to_string(),
        role: None,
        phone: None,
        address: None,
    };
    repository
        .users
        .create(&profile, Role::Librarian, "$argon2id$placeholder")
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn three_copies_then_refuse(pool: PgPool) {
    let repo = Repository::new(pool);
    let policy = FinePolicy::default();
    let user = staff(&repo, "desk@library.com").await;
    let book = repo.books.create(&book("Clean Code", "9780132350884", 3)).await.unwrap();

    for _ in 0..3 {
        repo.issues
            .create(&member(book.id), user.id, policy::today(), &policy)
            .await
            .unwrap();
    }
    assert_eq!(repo.books.get_by_id(book.id).await.unwrap().available_copies, 0);

    let err = repo
        .issues
        .create(&member(book.id), user.id, policy::today(), &policy)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert_eq!(repo.books.get_by_id(book.id).await.unwrap().available_copies, 0);
    assert_eq!(repo.issues.count_active().await.unwrap(), 3);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn issue_stamps_due_date_and_details(pool: PgPool) {
    let repo = Repository::new(pool);
    let policy = FinePolicy::default();
    let user = staff(&repo, "desk@library.com").await;
    let book = repo.books.create(&book("Design Patterns", "9780201633610", 4)).await.unwrap();

    let issue = repo
        .issues
        .create(&member(book.id), user.id, policy::today(), &policy)
        .await
        .unwrap();

    assert_eq!(issue.status, IssueStatus::Issued);
    assert_eq!(issue.due_date, policy.due_date(policy::today()));
    assert_eq!(issue.fine, Decimal::ZERO);
    assert_eq!(issue.return_date, None);
    assert_eq!(issue.book_title, "Design Patterns");
    assert_eq!(issue.book_isbn, "9780201633610");
    assert_eq!(issue.user_name, "Desk Staff");
    assert!(!issue.overdue);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn issue_book_records_the_acting_staff(pool: PgPool) {
    let services = services(pool);
    let repo = &services.repository;
    staff(repo, "desk@library.com").await;
    let created = repo.books.create(&book("Clean Code", "9780132350884", 2)).await.unwrap();

    let issue = services
        .loans
        .issue_book(member(created.id), &claims("desk@library.com"))
        .await
        .unwrap();
    assert_eq!(issue.user_name, "Desk Staff");
    assert_eq!(issue.status, IssueStatus::Issued);
    assert_eq!(repo.books.get_by_id(created.id).await.unwrap().available_copies, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn issue_book_for_unknown_staff_changes_nothing(pool: PgPool) {
    let services = services(pool);
    let repo = &services.repository;
    let created = repo.books.create(&book("Clean Code", "9780132350884", 2)).await.unwrap();

    let err = services
        .loans
        .issue_book(member(created.id), &claims("ghost@library.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(repo.books.get_by_id(created.id).await.unwrap().available_copies, 2);
    assert_eq!(repo.issues.count_active().await.unwrap(), 0);

    // Out of stock is reported before the identity lookup
    let empty = repo.books.create(&book("Design Patterns", "9780201633610", 0)).await.unwrap();
    let err = services
        .loans
        .issue_book(member(empty.id), &claims("ghost@library.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn last_copy_goes_to_one_concurrent_caller(pool: PgPool) {
    let repo = Repository::new(pool);
    let policy = FinePolicy::default();
    let user = staff(&repo, "desk@library.com").await;
    let created = repo.books.create(&book("Clean Code", "9780132350884", 1)).await.unwrap();
    let (book_id, user_id) = (created.id, user.id);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let repo = repo.clone();
            let policy = policy.clone();
            tokio::spawn(async move {
                repo.issues
                    .create(&member(book_id), user_id, policy::today(), &policy)
                    .await
            })
        })
        .collect();

    let mut issued = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => issued += 1,
            Err(err) => assert!(matches!(err, AppError::Validation(_)), "{:?}", err),
        }
    }

    assert_eq!(issued, 1);
    assert_eq!(repo.books.get_by_id(created.id).await.unwrap().available_copies, 0);
    assert_eq!(repo.issues.count_active().await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn four_days_late_costs_twenty(pool: PgPool) {
    let repo = Repository::new(pool);
    let policy = FinePolicy::default();
    let user = staff(&repo, "desk@library.com").await;
    let book = repo.books.create(&book("Head First Java", "9780596009205", 5)).await.unwrap();

    // Due four days ago
    let issue = repo
        .issues
        .create(&member(book.id), user.id, days_ago(18), &policy)
        .await
        .unwrap();
    assert_eq!(issue.due_date, days_ago(4));

    let returned = repo
        .issues
        .return_issue(issue.id, policy::today(), &policy)
        .await
        .unwrap();
    assert_eq!(returned.status, IssueStatus::Returned);
    assert_eq!(returned.return_date, Some(policy::today()));
    assert_eq!(returned.fine, Decimal::new(2000, 2));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn very_late_fine_is_capped(pool: PgPool) {
    let repo = Repository::new(pool);
    let policy = FinePolicy::default();
    let user = staff(&repo, "desk@library.com").await;
    let book = repo.books.create(&book("Computer Networks", "9780132126953", 1)).await.unwrap();

    let issue = repo
        .issues
        .create(&member(book.id), user.id, days_ago(214), &policy)
        .await
        .unwrap();

    let returned = repo
        .issues
        .return_issue(issue.id, policy::today(), &policy)
        .await
        .unwrap();
    assert_eq!(returned.fine, Decimal::new(50000, 2));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn second_return_changes_nothing(pool: PgPool) {
    let repo = Repository::new(pool);
    let policy = FinePolicy::default();
    let user = staff(&repo, "desk@library.com").await;
    let book = repo.books.create(&book("Clean Code", "9780132350884", 2)).await.unwrap();

    let issue = repo
        .issues
        .create(&member(book.id), user.id, days_ago(18), &policy)
        .await
        .unwrap();
    let first = repo
        .issues
        .return_issue(issue.id, days_ago(1), &policy)
        .await
        .unwrap();

    let err = repo
        .issues
        .return_issue(issue.id, policy::today(), &policy)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let after = repo.issues.get_details(issue.id, policy::today()).await.unwrap();
    assert_eq!(after.return_date, first.return_date);
    assert_eq!(after.fine, first.fine);
    assert_eq!(repo.books.get_by_id(book.id).await.unwrap().available_copies, 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn two_cycles_restore_availability(pool: PgPool) {
    let repo = Repository::new(pool);
    let policy = FinePolicy::default();
    let user = staff(&repo, "desk@library.com").await;
    let book = repo.books.create(&book("Operating System Concepts", "9781119800361", 4)).await.unwrap();

    for _ in 0..2 {
        let issue = repo
            .issues
            .create(&member(book.id), user.id, policy::today(), &policy)
            .await
            .unwrap();
        assert_eq!(repo.books.get_by_id(book.id).await.unwrap().available_copies, 3);

        repo.issues
            .return_issue(issue.id, policy::today(), &policy)
            .await
            .unwrap();
        assert_eq!(repo.books.get_by_id(book.id).await.unwrap().available_copies, 4);
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn unknown_book_or_issue_is_not_found(pool: PgPool) {
    let repo = Repository::new(pool);
    let policy = FinePolicy::default();
    let user = staff(&repo, "desk@library.com").await;

    let err = repo
        .issues
        .create(&member(404), user.id, policy::today(), &policy)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = repo
        .issues
        .return_issue(404, policy::today(), &policy)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn duplicate_isbn_and_email_conflict(pool: PgPool) {
    let services = services(pool);

    services
        .catalog
        .create_book(book("Clean Code", "9780132350884", 3))
        .await
        .unwrap();
    let err = services
        .catalog
        .create_book(book("Clean Code (2nd printing)", "9780132350884", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // The unique index backs up the pre-check
    let err = services
        .repository
        .books
        .create(&book("Clean Code", "9780132350884", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let profile = CreateUser {
        name: "Librarian User".to_string(),
        email: "librarian@library.com".to_string(),
        password: "Librarian@123".to_string(),
        role: None,
        phone: None,
        address: None,
    };
    let user = services.auth.register(profile.clone()).await.unwrap();
    assert_eq!(user.role, Role::Librarian);

    let err = services
        .auth
        .register(CreateUser {
            email: "LIBRARIAN@library.com".to_string(),
            ..profile
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn isbn_change_onto_another_book_conflicts(pool: PgPool) {
    let services = services(pool);
    services
        .catalog
        .create_book(book("Clean Code", "9780132350884", 3))
        .await
        .unwrap();
    let other = services
        .catalog
        .create_book(book("Design Patterns", "9780201633610", 3))
        .await
        .unwrap();

    let err = services
        .catalog
        .update_book(
            other.id,
            UpdateBook {
                isbn: Some("9780132350884".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Keeping its own ISBN is fine
    let updated = services
        .catalog
        .update_book(
            other.id,
            UpdateBook {
                isbn: Some("9780201633610".to_string()),
                quantity: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.quantity, 5);
    assert_eq!(updated.available_copies, 5);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn quantity_edit_shifts_availability(pool: PgPool) {
    let repo = Repository::new(pool);
    let policy = FinePolicy::default();
    let user = staff(&repo, "desk@library.com").await;
    let created = repo.books.create(&book("Clean Code", "9780132350884", 3)).await.unwrap();
    repo.issues
        .create(&member(created.id), user.id, policy::today(), &policy)
        .await
        .unwrap();

    let updated = repo
        .books
        .update(
            created.id,
            UpdateBook {
                quantity: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.quantity, 1);
    assert_eq!(updated.available_copies, 0);
    assert_eq!(updated.title, "Clean Code");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn keyword_search_is_case_insensitive(pool: PgPool) {
    let services = services(pool);
    services
        .catalog
        .create_book(book("Introduction to Algorithms", "9780262033848", 5))
        .await
        .unwrap();
    services
        .catalog
        .create_book(book("Computer Networks", "9780132126953", 4))
        .await
        .unwrap();

    let found = services.catalog.search_books("ALGORITHMS").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].isbn, "9780262033848");

    let found = services.catalog.search_books("9780132").await.unwrap();
    assert_eq!(found.len(), 1);

    let found = services.catalog.search_books("testing").await.unwrap();
    assert_eq!(found.len(), 2);

    assert!(services.catalog.search_books("100%").await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn referenced_rows_cannot_be_deleted(pool: PgPool) {
    let services = services(pool);
    let repo = &services.repository;
    let policy = FinePolicy::default();
    let user = staff(repo, "desk@library.com").await;
    let created = repo.books.create(&book("Clean Code", "9780132350884", 1)).await.unwrap();
    let issue = repo
        .issues
        .create(&member(created.id), user.id, policy::today(), &policy)
        .await
        .unwrap();

    let err = services.catalog.delete_book(created.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = services.users.delete_user(user.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Once returned the book can go, taking its history with it
    repo.issues
        .return_issue(issue.id, policy::today(), &policy)
        .await
        .unwrap();
    services.catalog.delete_book(created.id).await.unwrap();
    assert!(matches!(
        repo.issues.get_details(issue.id, policy::today()).await,
        Err(AppError::NotFound(_))
    ));

    let err = services.catalog.delete_book(created.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn dashboard_counts(pool: PgPool) {
    let services = services(pool);
    let repo = &services.repository;
    let policy = FinePolicy::default();
    let user = staff(repo, "desk@library.com").await;
    staff(repo, "front@library.com").await;

    let lent_out = repo.books.create(&book("Clean Code", "9780132350884", 1)).await.unwrap();
    repo.books.create(&book("Design Patterns", "9780201633610", 2)).await.unwrap();

    // One issue, still out and past its due date
    repo.issues
        .create(&member(lent_out.id), user.id, days_ago(20), &policy)
        .await
        .unwrap();

    let stats = services.stats.dashboard().await.unwrap();
    assert_eq!(stats.total_books, 2);
    assert_eq!(stats.available_books, 1);
    assert_eq!(stats.issued_books, 1);
    assert_eq!(stats.overdue_books, 1);
    assert_eq!(stats.total_users, 2);

    let overdue = services.loans.overdue_issues().await.unwrap();
    assert_eq!(overdue.len(), 1);
    assert!(overdue[0].overdue);
    assert_eq!(services.loans.active_issues().await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn login_checks_password_and_active_flag(pool: PgPool) {
    let services = services(pool);
    let user = services
        .auth
        .register(CreateUser {
            name: "Admin User".to_string(),
            email: "Admin@Library.com".to_string(),
            password: "Admin@123".to_string(),
            role: Some("ADMIN".to_string()),
            phone: None,
            address: None,
        })
        .await
        .unwrap();
    assert_eq!(user.email, "admin@library.com");
    assert_eq!(user.role, Role::Admin);
    assert_ne!(user.password, "Admin@123");

    let (token, logged_in) = services.auth.login("admin@library.com", "Admin@123").await.unwrap();
    assert!(!token.is_empty());
    assert_eq!(logged_in.id, user.id);

    let err = services.auth.login("admin@library.com", "nope").await.unwrap_err();
    assert!(matches!(err, AppError::Authentication(_)));
    let err = services.auth.login("ghost@library.com", "Admin@123").await.unwrap_err();
    assert!(matches!(err, AppError::Authentication(_)));

    services
        .users
        .update_user(
            user.id,
            UpdateUser {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let err = services.auth.login("admin@library.com", "Admin@123").await.unwrap_err();
    assert!(matches!(err, AppError::Authentication(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn invalid_role_is_rejected_on_update(pool: PgPool) {
    let services = services(pool);
    let user = staff(&services.repository, "desk@library.com").await;

    let err = services
        .users
        .update_user(
            user.id,
            UpdateUser {
                role: Some("READER".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = services
        .users
        .update_user(404, Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn missing_user_wins_over_email_conflict(pool: PgPool) {
    let services = services(pool);
    staff(&services.repository, "desk@library.com").await;

    let err = services
        .users
        .update_user(
            404,
            UpdateUser {
                email: Some("desk@library.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn seeding_runs_once(pool: PgPool) {
    let repo = Repository::new(pool);
    let policy = FinePolicy::default();

    assert!(seed::seed_if_empty(&repo, &policy).await.unwrap());
    assert!(!seed::seed_if_empty(&repo, &policy).await.unwrap());

    assert_eq!(repo.users.count().await.unwrap(), 2);
    assert_eq!(repo.books.count().await.unwrap(), 10);
    assert_eq!(repo.issues.count_active().await.unwrap(), 3);
    assert_eq!(repo.issues.count_overdue(policy::today()).await.unwrap(), 1);
    assert_eq!(repo.issues.list_all(policy::today()).await.unwrap().len(), 5);

    let algorithms = repo.books.search("9780262033848").await.unwrap();
    assert_eq!(algorithms.len(), 1);
    assert_eq!(algorithms[0].available_copies, 4);
}
