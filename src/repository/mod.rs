//! Repository layer holding the in-memory book collection

pub mod books;

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::Book;

/// Main repository struct holding the shared collection.
///
/// Records are kept in insertion order. Clones share the same collection.
#[derive(Clone, Default)]
pub struct Repository {
    books: Arc<RwLock<Vec<Book>>>,
}

impl Repository {
    /// Create a new, empty repository
    pub fn new() -> Self {
        Self::default()
    }
}
