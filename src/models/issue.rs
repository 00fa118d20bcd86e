//! Issue (loan) model and related types

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    policy::FinePolicy,
};

use super::book::not_blank;

/// Issue lifecycle status.
///
/// `Overdue` is part of the stored vocabulary but is never written; overdue
/// loans are `Issued` loans whose due date has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum IssueStatus {
    Issued,
    Returned,
    Overdue,
}

impl IssueStatus {
    /// Still out on `today` with the due date already behind it
    pub fn is_overdue(self, due_date: NaiveDate, today: NaiveDate) -> bool {
        self == IssueStatus::Issued && due_date < today
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Issued => "ISSUED",
            IssueStatus::Returned => "RETURNED",
            IssueStatus::Overdue => "OVERDUE",
        }
    }
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for IssueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ISSUED" => Ok(IssueStatus::Issued),
            "RETURNED" => Ok(IssueStatus::Returned),
            "OVERDUE" => Ok(IssueStatus::Overdue),
            _ => Err(format!("Invalid issue status: {}", s)),
        }
    }
}

// SQLx conversion for IssueStatus (stored as TEXT)
impl sqlx::Type<Postgres> for IssueStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for IssueStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for IssueStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Issue model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Issue {
    pub id: i64,
    pub book_id: i64,
    pub user_id: i64,
    pub member_name: String,
    pub member_email: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub fine: Decimal,
    pub status: IssueStatus,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    /// Close the loan on `return_date`, fixing its fine.
    ///
    /// A loan can only be closed once.
    pub fn mark_returned(&mut self, return_date: NaiveDate, policy: &FinePolicy) -> AppResult<()> {
        if self.status == IssueStatus::Returned {
            return Err(AppError::Validation(
                "Book has already been returned".to_string(),
            ));
        }
        self.fine = policy.fine(self.due_date, Some(return_date));
        self.return_date = Some(return_date);
        self.status = IssueStatus::Returned;
        Ok(())
    }
}

/// Issue with book and staff details for display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueDetails {
    pub id: i64,
    pub book_id: i64,
    pub book_title: String,
    pub book_isbn: String,
    pub user_id: i64,
    pub user_name: String,
    pub member_name: String,
    pub member_email: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    #[schema(value_type = String, example = "0.00")]
    pub fine: Decimal,
    pub status: IssueStatus,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Still out and past its due date
    #[sqlx(skip)]
    pub overdue: bool,
}

impl IssueDetails {
    /// Fill in the fields derived from the current date.
    pub fn as_of(mut self, today: NaiveDate) -> Self {
        self.overdue = self.status.is_overdue(self.due_date, today);
        self
    }
}

/// Issue book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssue {
    pub book_id: i64,
    #[validate(
        custom(function = "not_blank", message = "Member name is required"),
        length(max = 255, message = "Member name must not exceed 255 characters")
    )]
    pub member_name: String,
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Member email must not exceed 255 characters")
    )]
    pub member_email: String,
    pub remarks: Option<String>,
}
