//! Book (catalog) model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub category: Option<String>,
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    /// Total copies owned
    pub quantity: i32,
    /// Copies currently on the shelf
    pub available_copies: i32,
    #[schema(value_type = Option<String>, example = "450.00")]
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Take one copy off the shelf for a new issue.
    pub fn take_copy(&mut self) -> AppResult<()> {
        if self.available_copies <= 0 {
            return Err(AppError::Validation(format!(
                "No available copies for book: {}",
                self.title
            )));
        }
        self.available_copies -= 1;
        Ok(())
    }

    /// Put a returned copy back on the shelf.
    pub fn put_back_copy(&mut self) {
        self.available_copies = (self.available_copies + 1).min(self.quantity.max(0));
    }

    /// Overwrite every field present in `update`, keeping the rest.
    ///
    /// A quantity change moves the available count by the same delta,
    /// never below zero.
    pub fn apply_update(&mut self, update: UpdateBook) {
        if let Some(quantity) = update.quantity {
            let delta = quantity - self.quantity;
            self.quantity = quantity;
            self.available_copies = (self.available_copies + delta).max(0);
        }
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(author) = update.author {
            self.author = author;
        }
        if let Some(isbn) = update.isbn {
            self.isbn = isbn;
        }
        if let Some(category) = update.category {
            self.category = Some(category);
        }
        if let Some(publisher) = update.publisher {
            self.publisher = Some(publisher);
        }
        if let Some(year) = update.publication_year {
            self.publication_year = Some(year);
        }
        if let Some(price) = update.price {
            self.price = Some(price);
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
    }
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Largest price a `NUMERIC(10, 2)` column holds
const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

fn price_in_range(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("range");
        err.message = Some("Price must be at least 0".into());
        return Err(err);
    }
    if *value > MAX_PRICE {
        let mut err = ValidationError::new("range");
        err.message = Some("Price must not exceed 99999999.99".into());
        return Err(err);
    }
    Ok(())
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(
        custom(function = "not_blank", message = "Title is required"),
        length(max = 255, message = "Title must not exceed 255 characters")
    )]
    pub title: String,
    #[validate(
        custom(function = "not_blank", message = "Author is required"),
        length(max = 255, message = "Author must not exceed 255 characters")
    )]
    pub author: String,
    #[validate(length(min = 10, max = 13, message = "ISBN must be between 10 and 13 characters"))]
    pub isbn: String,
    #[validate(length(max = 100, message = "Category must not exceed 100 characters"))]
    pub category: Option<String>,
    #[validate(length(max = 200, message = "Publisher must not exceed 200 characters"))]
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    #[validate(range(min = 0, message = "Quantity must be at least 0"))]
    pub quantity: Option<i32>,
    #[validate(custom(function = "price_in_range"))]
    #[schema(value_type = Option<String>, example = "450.00")]
    pub price: Option<Decimal>,
    pub description: Option<String>,
}

/// Update book request; absent fields keep their current value
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    #[validate(
        custom(function = "not_blank", message = "Title must not be blank"),
        length(max = 255, message = "Title must not exceed 255 characters")
    )]
    pub title: Option<String>,
    #[validate(
        custom(function = "not_blank", message = "Author must not be blank"),
        length(max = 255, message = "Author must not exceed 255 characters")
    )]
    pub author: Option<String>,
    #[validate(length(min = 10, max = 13, message = "ISBN must be between 10 and 13 characters"))]
    pub isbn: Option<String>,
    #[validate(length(max = 100, message = "Category must not exceed 100 characters"))]
    pub category: Option<String>,
    #[validate(length(max = 200, message = "Publisher must not exceed 200 characters"))]
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    #[validate(range(min = 0, message = "Quantity must be at least 0"))]
    pub quantity: Option<i32>,
    #[validate(custom(function = "price_in_range"))]
    #[schema(value_type = Option<String>, example = "450.00")]
    pub price: Option<Decimal>,
    pub description: Option<String>,
}

/// Keyword search parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookSearchQuery {
    /// Matched case-insensitively against title, author, ISBN and category
    pub keyword: String,
}
