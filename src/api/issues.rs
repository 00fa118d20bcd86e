//! Issue (loan) endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        issue::{CreateIssue, IssueDetails},
        stats::DashboardStats,
    },
    AppState,
};

use super::{ApiPath, AuthenticatedUser, ValidatedJson};

/// Issue a book to a member
#[utoipa::path(
    post,
    path = "/issues",
    tag = "issues",
    security(("bearer_auth" = [])),
    request_body = CreateIssue,
    responses(
        (status = 201, description = "Book issued", body = IssueDetails),
        (status = 400, description = "Invalid input or no copies available", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn issue_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateIssue>,
) -> AppResult<(StatusCode, Json<IssueDetails>)> {
    let issue = state.services.loans.issue_book(request, &claims).await?;
    Ok((StatusCode::CREATED, Json(issue)))
}

/// Return an issued book
#[utoipa::path(
    put,
    path = "/issues/return/{id}",
    tag = "issues",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Issue ID")
    ),
    responses(
        (status = 200, description = "Book returned, fine fixed", body = IssueDetails),
        (status = 400, description = "Already returned", body = crate::error::ErrorResponse),
        (status = 404, description = "Issue not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<IssueDetails>> {
    let issue = state.services.loans.return_book(id).await?;
    Ok(Json(issue))
}

/// List all issues
#[utoipa::path(
    get,
    path = "/issues",
    tag = "issues",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All issues, newest first", body = Vec<IssueDetails>)
    )
)]
pub async fn list_issues(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<IssueDetails>>> {
    let issues = state.services.loans.list_issues().await?;
    Ok(Json(issues))
}

/// Get issue details by ID
#[utoipa::path(
    get,
    path = "/issues/{id}",
    tag = "issues",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Issue ID")
    ),
    responses(
        (status = 200, description = "Issue details", body = IssueDetails),
        (status = 404, description = "Issue not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_issue(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<IssueDetails>> {
    let issue = state.services.loans.get_issue(id).await?;
    Ok(Json(issue))
}

/// List issues past their due date
#[utoipa::path(
    get,
    path = "/issues/overdue",
    tag = "issues",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overdue issues", body = Vec<IssueDetails>)
    )
)]
pub async fn overdue_issues(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<IssueDetails>>> {
    let issues = state.services.loans.overdue_issues().await?;
    Ok(Json(issues))
}

/// List issues not yet returned
#[utoipa::path(
    get,
    path = "/issues/active",
    tag = "issues",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active issues", body = Vec<IssueDetails>)
    )
)]
pub async fn active_issues(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<IssueDetails>>> {
    let issues = state.services.loans.active_issues().await?;
    Ok(Json(issues))
}

/// Dashboard counters
#[utoipa::path(
    get,
    path = "/issues/dashboard/stats",
    tag = "issues",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats)
    )
)]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<DashboardStats>> {
    let stats = state.services.stats.dashboard().await?;
    Ok(Json(stats))
}
