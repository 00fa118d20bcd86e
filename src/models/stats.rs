//! Dashboard statistics

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Snapshot of library counts computed at request time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_books: i64,
    /// Books with at least one copy on the shelf
    pub available_books: i64,
    /// Issues currently out
    pub issued_books: i64,
    /// Issues currently out and past their due date
    pub overdue_books: i64,
    pub total_users: i64,
}
