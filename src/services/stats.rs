//! Statistics service

use crate::{
    error::AppResult,
    models::stats::DashboardStats,
    policy,
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Dashboard counters, computed at call time
    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        let today = policy::today();

        Ok(DashboardStats {
            total_books: self.repository.books.count().await?,
            available_books: self.repository.books.count_available().await?,
            issued_books: self.repository.issues.count_active().await?,
            overdue_books: self.repository.issues.count_overdue(today).await?,
            total_users: self.repository.users.count().await?,
        })
    }
}
