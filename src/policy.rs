//! Loan period and overdue fine rules

use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Loan period and fine schedule applied by the loan ledger.
///
/// Loaded from the `[loans]` configuration section; requests never carry
/// these values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FinePolicy {
    /// Days between issue date and due date
    pub loan_days: u64,
    /// Fine charged per calendar day past the due date
    pub fine_per_day: Decimal,
    /// Upper bound for a single issue's fine
    pub max_fine: Decimal,
}

impl Default for FinePolicy {
    fn default() -> Self {
        Self {
            loan_days: 14,
            fine_per_day: Decimal::new(500, 2),
            max_fine: Decimal::new(50000, 2),
        }
    }
}

impl FinePolicy {
    /// Due date for a loan starting on `issue_date`.
    pub fn due_date(&self, issue_date: NaiveDate) -> NaiveDate {
        issue_date
            .checked_add_days(Days::new(self.loan_days))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Fine owed for a loan due on `due_date` and returned on `return_date`.
    ///
    /// Nothing is owed while the book is out or when it comes back on or
    /// before the due date.
    pub fn fine(&self, due_date: NaiveDate, return_date: Option<NaiveDate>) -> Decimal {
        let Some(returned) = return_date else {
            return Decimal::ZERO;
        };
        if returned <= due_date {
            return Decimal::ZERO;
        }

        let days_late = (returned - due_date).num_days();
        let fine = self.fine_per_day * Decimal::from(days_late);
        fine.min(self.max_fine).round_dp(2)
    }
}

/// Calendar date used for issue, due and return dates.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
