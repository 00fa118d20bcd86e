//! Sample data for a fresh database

use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::{
    error::AppResult,
    models::{
        book::CreateBook,
        issue::{Issue, IssueStatus},
        user::{CreateUser, Role},
    },
    policy::{self, FinePolicy},
    repository::Repository,
};

use super::auth::hash_password;

struct SampleBook {
    title: &'static str,
    author: &'static str,
    isbn: &'static str,
    category: &'static str,
    publisher: &'static str,
    year: i32,
    quantity: i32,
    price_cents: i64,
    description: &'static str,
}

const BOOKS: &[SampleBook] = &[
    SampleBook {
        title: "Introduction to Algorithms",
        author: "Thomas H. Cormen",
        isbn: "9780262033848",
        category: "Computer Science",
        publisher: "MIT Press",
        year: 2009,
        quantity: 5,
        price_cents: 59900,
        description: "A comprehensive textbook on algorithms",
    },
    SampleBook {
        title: "Clean Code",
        author: "Robert C. Martin",
        isbn: "9780132350884",
        category: "Software Engineering",
        publisher: "Prentice Hall",
        year: 2008,
        quantity: 3,
        price_cents: 45000,
        description: "A handbook of agile software craftsmanship",
    },
    SampleBook {
        title: "Design Patterns",
        author: "Gang of Four",
        isbn: "9780201633610",
        category: "Software Engineering",
        publisher: "Addison-Wesley",
        year: 1994,
        quantity: 4,
        price_cents: 52000,
        description: "Elements of reusable object-oriented software",
    },
    SampleBook {
        title: "The Pragmatic Programmer",
        author: "David Thomas, Andrew Hunt",
        isbn: "9780135957059",
        category: "Software Engineering",
        publisher: "Addison-Wesley",
        year: 2019,
        quantity: 3,
        price_cents: 48000,
        description: "Your journey to mastery",
    },
    SampleBook {
        title: "Java: The Complete Reference",
        author: "Herbert Schildt",
        isbn: "9781260440232",
        category: "Programming",
        publisher: "McGraw-Hill",
        year: 2021,
        quantity: 6,
        price_cents: 65000,
        description: "Comprehensive guide to Java programming",
    },
    SampleBook {
        title: "Operating System Concepts",
        author: "Abraham Silberschatz",
        isbn: "9781119800361",
        category: "Computer Science",
        publisher: "Wiley",
        year: 2021,
        quantity: 4,
        price_cents: 55000,
        description: "Fundamental concepts of operating systems",
    },
    SampleBook {
        title: "Database System Concepts",
        author: "Abraham Silberschatz",
        isbn: "9780078022159",
        category: "Database",
        publisher: "McGraw-Hill",
        year: 2019,
        quantity: 3,
        price_cents: 50000,
        description: "Comprehensive database management textbook",
    },
    SampleBook {
        title: "Artificial Intelligence: A Modern Approach",
        author: "Stuart Russell, Peter Norvig",
        isbn: "9780134610993",
        category: "Artificial Intelligence",
        publisher: "Pearson",
        year: 2020,
        quantity: 3,
        price_cents: 70000,
        description: "The leading textbook in artificial intelligence",
    },
    SampleBook {
        title: "Computer Networks",
        author: "Andrew S. Tanenbaum",
        isbn: "9780132126953",
        category: "Networking",
        publisher: "Pearson",
        year: 2010,
        quantity: 4,
        price_cents: 47500,
        description: "Classic textbook on computer networking",
    },
    SampleBook {
        title: "Head First Java",
        author: "Kathy Sierra, Bert Bates",
        isbn: "9780596009205",
        category: "Programming",
        publisher: "O'Reilly Media",
        year: 2005,
        quantity: 5,
        price_cents: 39900,
        description: "A brain-friendly guide to Java programming",
    },
];

/// A sample loan, dated relative to the seeding day
struct SampleIssue {
    book: usize,
    member_name: &'static str,
    member_email: &'static str,
    issued_days_ago: u64,
    returned_days_ago: Option<u64>,
    remarks: &'static str,
}

const ISSUES: &[SampleIssue] = &[
    SampleIssue {
        book: 0,
        member_name: "Rahul Sharma",
        member_email: "rahul@example.com",
        issued_days_ago: 5,
        returned_days_ago: None,
        remarks: "Student - Computer Science",
    },
    SampleIssue {
        book: 1,
        member_name: "Priya Patel",
        member_email: "priya@example.com",
        issued_days_ago: 3,
        returned_days_ago: None,
        remarks: "Faculty member",
    },
    SampleIssue {
        book: 2,
        member_name: "Amit Kumar",
        member_email: "amit@example.com",
        issued_days_ago: 20,
        returned_days_ago: None,
        remarks: "Student - Software Engineering",
    },
    SampleIssue {
        book: 3,
        member_name: "Sneha Reddy",
        member_email: "sneha@example.com",
        issued_days_ago: 30,
        returned_days_ago: Some(17),
        remarks: "Returned on time",
    },
    SampleIssue {
        book: 4,
        member_name: "Deepak Singh",
        member_email: "deepak@example.com",
        issued_days_ago: 25,
        returned_days_ago: Some(7),
        remarks: "Late return - 4 days overdue",
    },
];

fn days_before(today: NaiveDate, days: u64) -> NaiveDate {
    today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
}

impl SampleIssue {
    fn to_issue(&self, book_id: i64, user_id: i64, today: NaiveDate, policy: &FinePolicy) -> Issue {
        let issue_date = days_before(today, self.issued_days_ago);
        let due_date = policy.due_date(issue_date);
        let return_date = self.returned_days_ago.map(|days| days_before(today, days));
        let now = Utc::now();

        Issue {
            id: 0,
            book_id,
            user_id,
            member_name: self.member_name.to_string(),
            member_email: self.member_email.to_string(),
            issue_date,
            due_date,
            return_date,
            fine: policy.fine(due_date, return_date),
            status: if return_date.is_some() {
                IssueStatus::Returned
            } else {
                IssueStatus::Issued
            },
            remarks: Some(self.remarks.to_string()),
            created_at: now,
            updated_at: now,
        }
    }
}

fn account(name: &str, email: &str, password: &str, phone: &str, address: &str) -> CreateUser {
    CreateUser {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role: None,
        phone: Some(phone.to_string()),
        address: Some(address.to_string()),
    }
}

/// Populate the database with sample data unless it already has accounts.
///
/// Returns whether anything was written.
pub async fn seed_if_empty(repository: &Repository, policy: &FinePolicy) -> AppResult<bool> {
    if repository.users.count().await? > 0 {
        tracing::debug!("Database already has users, skipping seed");
        return Ok(false);
    }

    let admin = account("Admin User", "admin@library.com", "Admin@123", "9876543210", "Library Admin Office");
    repository
        .users
        .create(&admin, Role::Admin, &hash_password(&admin.password)?)
        .await?;

    let librarian = account(
        "Librarian User",
        "librarian@library.com",
        "Librarian@123",
        "9876543211",
        "Library Front Desk",
    );
    let librarian = repository
        .users
        .create(&librarian, Role::Librarian, &hash_password(&librarian.password)?)
        .await?;

    let mut book_ids = Vec::with_capacity(BOOKS.len());
    for sample in BOOKS {
        let book = repository
            .books
            .create(&CreateBook {
                title: sample.title.to_string(),
                author: sample.author.to_string(),
                isbn: sample.isbn.to_string(),
                category: Some(sample.category.to_string()),
                publisher: Some(sample.publisher.to_string()),
                publication_year: Some(sample.year),
                quantity: Some(sample.quantity),
                price: Some(Decimal::new(sample.price_cents, 2)),
                description: Some(sample.description.to_string()),
            })
            .await?;
        book_ids.push(book.id);
    }

    let today = policy::today();
    for sample in ISSUES {
        let issue = sample.to_issue(book_ids[sample.book], librarian.id, today, policy);
        repository.issues.insert_record(&issue).await?;
    }

    tracing::info!(
        "Database seeded: 2 accounts, {} books, {} issues",
        BOOKS.len(),
        ISSUES.len()
    );
    Ok(true)
}
