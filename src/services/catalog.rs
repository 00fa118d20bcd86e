//! Catalog management service

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List every book in the catalog
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    /// Get book by ID
    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Case-insensitive keyword search
    pub async fn search_books(&self, keyword: &str) -> AppResult<Vec<Book>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return self.repository.books.list().await;
        }
        self.repository.books.search(keyword).await
    }

    /// Add a book; all copies start on the shelf
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        if self.repository.books.isbn_exists(&book.isbn, None).await? {
            return Err(AppError::Conflict(format!(
                "Book with ISBN {} already exists",
                book.isbn
            )));
        }

        let created = self.repository.books.create(&book).await?;
        tracing::info!("Catalogued book {} ({})", created.id, created.isbn);
        Ok(created)
    }

    /// Partially update a book
    pub async fn update_book(&self, id: i64, update: UpdateBook) -> AppResult<Book> {
        if let Some(ref isbn) = update.isbn {
            if self.repository.books.isbn_exists(isbn, Some(id)).await? {
                return Err(AppError::Conflict(format!(
                    "Book with ISBN {} already exists",
                    isbn
                )));
            }
        }

        self.repository.books.update(id, update).await
    }

    /// Remove a book and its closed loan history
    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!("Deleted book {}", id);
        Ok(())
    }
}
