//! Loan ledger service: issuing and returning books

use crate::{
    error::{AppError, AppResult},
    models::{
        issue::{CreateIssue, IssueDetails},
        user::UserClaims,
    },
    policy::{self, FinePolicy},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    policy: FinePolicy,
}

impl LoansService {
    pub fn new(repository: Repository, policy: FinePolicy) -> Self {
        Self { repository, policy }
    }

    /// Lend a copy of a book on behalf of the acting staff member
    pub async fn issue_book(&self, request: CreateIssue, actor: &UserClaims) -> AppResult<IssueDetails> {
        // Fail fast before locking anything; the repository re-checks under the row lock
        let book = self.repository.books.get_by_id(request.book_id).await?;
        if book.available_copies <= 0 {
            return Err(AppError::Validation(format!(
                "No available copies for book: {}",
                book.title
            )));
        }

        let user = self
            .repository
            .users
            .get_by_email(&actor.sub)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found with email: {}", actor.sub)))?;

        let today = policy::today();
        let issue = self
            .repository
            .issues
            .create(&request, user.id, today, &self.policy)
            .await?;

        tracing::info!(
            "Issued book {} to {} (issue {}, due {})",
            issue.book_id,
            issue.member_email,
            issue.id,
            issue.due_date
        );
        Ok(issue)
    }

    /// Close a loan today, fixing its fine
    pub async fn return_book(&self, issue_id: i64) -> AppResult<IssueDetails> {
        let issue = self
            .repository
            .issues
            .return_issue(issue_id, policy::today(), &self.policy)
            .await?;

        tracing::info!(
            "Returned issue {} for book {} (fine {})",
            issue.id,
            issue.book_id,
            issue.fine
        );
        Ok(issue)
    }

    /// Get a single issue
    pub async fn get_issue(&self, id: i64) -> AppResult<IssueDetails> {
        self.repository.issues.get_details(id, policy::today()).await
    }

    /// All issues, newest first
    pub async fn list_issues(&self) -> AppResult<Vec<IssueDetails>> {
        self.repository.issues.list_all(policy::today()).await
    }

    /// Issues still out
    pub async fn active_issues(&self) -> AppResult<Vec<IssueDetails>> {
        self.repository.issues.list_active(policy::today()).await
    }

    /// Issues still out and past due
    pub async fn overdue_issues(&self) -> AppResult<Vec<IssueDetails>> {
        self.repository.issues.list_overdue(policy::today()).await
    }
}
