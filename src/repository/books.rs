//! Book storage methods on Repository

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookFilter, BookSummary},
};

/// Attempts at drawing a free identifier before giving up
const MAX_ID_ATTEMPTS: usize = 8;

impl Repository {
    /// List summaries of books matching the filter, in insertion order
    pub async fn books_list(&self, filter: &BookFilter) -> Vec<BookSummary> {
        let books = self.books.read().await;
        books
            .iter()
            .filter(|book| filter.matches(book))
            .map(BookSummary::from)
            .collect()
    }

    /// Get a book by ID
    pub async fn books_get_by_id(&self, id: &str) -> Option<Book> {
        let books = self.books.read().await;
        books.iter().find(|book| book.id == id).cloned()
    }

    pub async fn books_exists(&self, id: &str) -> bool {
        let books = self.books.read().await;
        books.iter().any(|book| book.id == id)
    }

    /// Append a book built by `build` from an identifier produced by `next_id`.
    ///
    /// Identifiers already present in the collection are drawn again, up to
    /// `MAX_ID_ATTEMPTS` times, so the stored id is unique. Returns the id of
    /// the appended book.
    pub async fn books_insert<I, B>(&self, mut next_id: I, build: B) -> AppResult<String>
    where
        I: FnMut() -> String,
        B: FnOnce(String) -> Book,
    {
        let mut books = self.books.write().await;
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = next_id();
            if books.iter().any(|book| book.id == candidate) {
                tracing::debug!("Generated book id {} already taken, retrying", candidate);
                continue;
            }
            books.push(build(candidate.clone()));
            return Ok(candidate);
        }
        Err(AppError::Internal(
            "Failed to add book. No free identifier".to_string(),
        ))
    }

    /// Update a book in place.
    ///
    /// `update` runs under the write lock once the book is found; if it fails
    /// the record is left unchanged.
    pub async fn books_update<F>(&self, id: &str, not_found: &str, update: F) -> AppResult<Book>
    where
        F: FnOnce(&mut Book) -> AppResult<()>,
    {
        let mut books = self.books.write().await;
        let book = books
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or_else(|| AppError::NotFound(not_found.to_string()))?;

        let mut updated = book.clone();
        update(&mut updated)?;
        *book = updated.clone();
        Ok(updated)
    }

    /// Remove a book, keeping the order of the remaining ones.
    /// Returns false when no book has this id.
    pub async fn books_delete(&self, id: &str) -> bool {
        let mut books = self.books.write().await;
        match books.iter().position(|book| book.id == id) {
            Some(index) => {
                books.remove(index);
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub async fn books_count(&self) -> usize {
        self.books.read().await.len()
    }
}
