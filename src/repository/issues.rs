//! Issues repository: the loan ledger's persistence

use chrono::NaiveDate;
use sqlx::{postgres::PgExecutor, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        issue::{CreateIssue, Issue, IssueDetails, IssueStatus},
    },
    policy::FinePolicy,
};

/// Issue rows joined with the book and processing user they reference
const DETAILS_SELECT: &str = r#"
    SELECT i.id, i.book_id, b.title AS book_title, b.isbn AS book_isbn,
           i.user_id, u.name AS user_name,
           i.member_name, i.member_email, i.issue_date, i.due_date, i.return_date,
           i.fine, i.status, i.remarks, i.created_at, i.updated_at
    FROM issues i
    JOIN books b ON b.id = i.book_id
    JOIN users u ON u.id = i.user_id
"#;

#[derive(Clone)]
pub struct IssuesRepository {
    pool: Pool<Postgres>,
}

impl IssuesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn fetch_details<'e, E>(executor: E, id: i64) -> AppResult<Option<IssueDetails>>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("{} WHERE i.id = $1", DETAILS_SELECT);
        let details = sqlx::query_as::<_, IssueDetails>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(details)
    }

    /// Get a single issue with display details
    pub async fn get_details(&self, id: i64, today: NaiveDate) -> AppResult<IssueDetails> {
        Self::fetch_details(&self.pool, id)
            .await?
            .map(|d| d.as_of(today))
            .ok_or_else(|| AppError::NotFound(format!("Issue with id {} not found", id)))
    }

    /// List every issue, newest first
    pub async fn list_all(&self, today: NaiveDate) -> AppResult<Vec<IssueDetails>> {
        let query = format!("{} ORDER BY i.issue_date DESC, i.id DESC", DETAILS_SELECT);
        let issues = sqlx::query_as::<_, IssueDetails>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(issues.into_iter().map(|d| d.as_of(today)).collect())
    }

    /// List issues still out, regardless of due date
    pub async fn list_active(&self, today: NaiveDate) -> AppResult<Vec<IssueDetails>> {
        let query = format!("{} WHERE i.status = $1 ORDER BY i.due_date, i.id", DETAILS_SELECT);
        let issues = sqlx::query_as::<_, IssueDetails>(&query)
            .bind(IssueStatus::Issued)
            .fetch_all(&self.pool)
            .await?;
        Ok(issues.into_iter().map(|d| d.as_of(today)).collect())
    }

    /// List issues still out whose due date is before `today`
    pub async fn list_overdue(&self, today: NaiveDate) -> AppResult<Vec<IssueDetails>> {
        let query = format!(
            "{} WHERE i.status = $1 AND i.due_date < $2 ORDER BY i.due_date, i.id",
            DETAILS_SELECT
        );
        let issues = sqlx::query_as::<_, IssueDetails>(&query)
            .bind(IssueStatus::Issued)
            .bind(today)
            .fetch_all(&self.pool)
            .await?;
        Ok(issues.into_iter().map(|d| d.as_of(today)).collect())
    }

    /// Record a new loan and take the copy off the shelf in one transaction.
    ///
    /// The book row stays locked until commit, so concurrent loans of the
    /// same title queue up behind each other.
    pub async fn create(
        &self,
        request: &CreateIssue,
        user_id: i64,
        issue_date: NaiveDate,
        policy: &FinePolicy,
    ) -> AppResult<IssueDetails> {
        let mut tx = self.pool.begin().await?;

        let mut book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(request.book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", request.book_id)))?;

        book.take_copy()?;

        sqlx::query("UPDATE books SET available_copies = $2, updated_at = NOW() WHERE id = $1")
            .bind(book.id)
            .bind(book.available_copies)
            .execute(&mut *tx)
            .await?;

        let issue_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO issues (
                book_id, user_id, member_name, member_email,
                issue_date, due_date, fine, status, remarks
            ) VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $8)
            RETURNING id
            "#,
        )
        .bind(book.id)
        .bind(user_id)
        .bind(&request.member_name)
        .bind(&request.member_email)
        .bind(issue_date)
        .bind(policy.due_date(issue_date))
        .bind(IssueStatus::Issued)
        .bind(&request.remarks)
        .fetch_one(&mut *tx)
        .await?;

        let details = Self::fetch_details(&mut *tx, issue_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Issue {} vanished after insert", issue_id)))?;

        tx.commit().await?;
        Ok(details.as_of(issue_date))
    }

    /// Close a loan and put the copy back on the shelf in one transaction.
    pub async fn return_issue(
        &self,
        id: i64,
        return_date: NaiveDate,
        policy: &FinePolicy,
    ) -> AppResult<IssueDetails> {
        let mut tx = self.pool.begin().await?;

        let mut issue = sqlx::query_as::<_, Issue>("SELECT * FROM issues WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Issue with id {} not found", id)))?;

        issue.mark_returned(return_date, policy)?;

        let mut book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(issue.book_id)
            .fetch_one(&mut *tx)
            .await?;

        book.put_back_copy();

        sqlx::query("UPDATE books SET available_copies = $2, updated_at = NOW() WHERE id = $1")
            .bind(book.id)
            .bind(book.available_copies)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE issues SET return_date = $2, fine = $3, status = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(issue.id)
        .bind(issue.return_date)
        .bind(issue.fine)
        .bind(issue.status)
        .execute(&mut *tx)
        .await?;

        let details = Self::fetch_details(&mut *tx, issue.id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Issue {} vanished during return", issue.id)))?;

        tx.commit().await?;
        Ok(details.as_of(return_date))
    }

    /// Insert a loan record as-is, adjusting the book's shelf count for open
    /// loans. Used to load sample data.
    pub async fn insert_record(&self, issue: &Issue) -> AppResult<i64> {
        let mut tx = self.pool.begin().await?;

        if issue.status == IssueStatus::Issued {
            let mut book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
                .bind(issue.book_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", issue.book_id)))?;
            book.take_copy()?;
            sqlx::query("UPDATE books SET available_copies = $2, updated_at = NOW() WHERE id = $1")
                .bind(book.id)
                .bind(book.available_copies)
                .execute(&mut *tx)
                .await?;
        }

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO issues (
                book_id, user_id, member_name, member_email, issue_date,
                due_date, return_date, fine, status, remarks
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(issue.book_id)
        .bind(issue.user_id)
        .bind(&issue.member_name)
        .bind(&issue.member_email)
        .bind(issue.issue_date)
        .bind(issue.due_date)
        .bind(issue.return_date)
        .bind(issue.fine)
        .bind(issue.status)
        .bind(&issue.remarks)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }

    /// Count issues still out
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM issues WHERE status = $1")
            .bind(IssueStatus::Issued)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count issues still out and past due
    pub async fn count_overdue(&self, today: NaiveDate) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM issues WHERE status = $1 AND due_date < $2")
                .bind(IssueStatus::Issued)
                .bind(today)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
