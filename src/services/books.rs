//! Book collection service
//!
//! Validation, identifier generation, timestamps and filter selection for
//! the book collection. Storage itself lives in the repository.

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{book::generate_book_id, Book, BookPayload, BookQuery, BookSummary},
    repository::Repository,
};

/// Write operation a failure message refers to
#[derive(Debug, Clone, Copy)]
enum Action {
    Add,
    Update,
}

impl Action {
    fn failure(self, reason: &str) -> String {
        let verb = match self {
            Action::Add => "add",
            Action::Update => "update",
        };
        format!("Failed to {} book. {}", verb, reason)
    }
}

#[derive(Clone)]
pub struct BookService {
    repository: Repository,
}

impl BookService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Add a book and return its generated id
    pub async fn create(&self, data: &BookPayload) -> AppResult<String> {
        validate(data, Action::Add)?;

        let now = Utc::now();
        let id = self
            .repository
            .books_insert(generate_book_id, |id| Book::new(id, data, now))
            .await?;

        if !self.repository.books_exists(&id).await {
            return Err(AppError::Internal("Failed to add book".to_string()));
        }

        tracing::info!("Book {} added", id);
        Ok(id)
    }

    /// List book summaries, applying at most one filter from the query
    pub async fn list_filtered(&self, query: &BookQuery) -> Vec<BookSummary> {
        let filter = query.filter();
        tracing::debug!("Listing books with filter {:?}", filter);
        self.repository.books_list(&filter).await
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<Book> {
        self.repository
            .books_get_by_id(id)
            .await
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// Overwrite all mutable fields of a book.
    /// Unknown ids are reported before the payload is validated.
    pub async fn update_by_id(&self, id: &str, data: &BookPayload) -> AppResult<Book> {
        let not_found = Action::Update.failure("Id not found");
        let book = self
            .repository
            .books_update(id, &not_found, |book| {
                validate(data, Action::Update)?;
                book.apply(data, Utc::now());
                Ok(())
            })
            .await?;

        tracing::info!("Book {} updated", id);
        Ok(book)
    }

    pub async fn delete_by_id(&self, id: &str) -> AppResult<()> {
        if !self.repository.books_delete(id).await {
            return Err(AppError::NotFound(
                "Failed to delete book. Id not found".to_string(),
            ));
        }
        tracing::info!("Book {} deleted", id);
        Ok(())
    }
}

fn validate(data: &BookPayload, action: Action) -> AppResult<()> {
    if data.name().is_none() {
        return Err(AppError::Validation(
            action.failure("Please provide the book name"),
        ));
    }
    if data.read_page() > data.page_count() {
        return Err(AppError::Validation(
            action.failure("readPage cannot be greater than pageCount"),
        ));
    }
    Ok(())
}
