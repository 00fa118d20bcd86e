//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

/// Build a case-insensitive `LIKE` pattern matching `keyword` anywhere.
pub(crate) fn contains_pattern(keyword: &str) -> String {
    let escaped = keyword
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all books
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Check if an ISBN is already catalogued
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND id != $2)")
                .bind(isbn)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Keyword search over title, author, ISBN and category
    pub async fn search(&self, keyword: &str) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT * FROM books
            WHERE LOWER(title) LIKE $1 ESCAPE '\'
               OR LOWER(author) LIKE $1 ESCAPE '\'
               OR LOWER(isbn) LIKE $1 ESCAPE '\'
               OR LOWER(COALESCE(category, '')) LIKE $1 ESCAPE '\'
            ORDER BY title, id
            "#,
        )
        .bind(contains_pattern(keyword))
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Create a new book with every copy on the shelf
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let quantity = book.quantity.unwrap_or(0);

        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (
                title, author, isbn, category, publisher, publication_year,
                quantity, available_copies, price, description
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.category)
        .bind(&book.publisher)
        .bind(book.publication_year)
        .bind(quantity)
        .bind(book.price)
        .bind(&book.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::conflict_on_constraint(e, format!("Book with ISBN {} already exists", book.isbn))
        })
    }

    /// Apply a partial update under a row lock
    pub async fn update(&self, id: i64, update: UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let mut book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        book.apply_update(update);

        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = $2, author = $3, isbn = $4, category = $5, publisher = $6,
                publication_year = $7, quantity = $8, available_copies = $9,
                price = $10, description = $11, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.category)
        .bind(&book.publisher)
        .bind(book.publication_year)
        .bind(book.quantity)
        .bind(book.available_copies)
        .bind(book.price)
        .bind(&book.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::conflict_on_constraint(e, format!("Book with ISBN {} already exists", book.isbn))
        })?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a book and its returned loan history.
    ///
    /// Refused while any copy is still out.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, i64>("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let open_issues: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM issues WHERE book_id = $1 AND status = 'ISSUED'",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if open_issues > 0 {
            return Err(AppError::Conflict(format!(
                "Book with id {} has {} copies on loan",
                id, open_issues
            )));
        }

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Count all books
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count books with at least one copy on the shelf
    pub async fn count_available(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE available_copies > 0")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
