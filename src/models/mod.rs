//! Data models for Bookdesk

pub mod book;
pub mod issue;
pub mod stats;
pub mod user;

// Re-export commonly used types
pub use book::{Book, CreateBook, UpdateBook};
pub use issue::{CreateIssue, Issue, IssueDetails, IssueStatus};
pub use stats::DashboardStats;
pub use user::{CreateUser, Role, UpdateUser, User, UserClaims};
