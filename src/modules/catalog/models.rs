use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Catalog entry for a single book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier for the book (ISBN-style key)
    pub id: String,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
}

/// Book as rendered in API responses, with its current reviews attached.
#[derive(Debug, Clone, Serialize)]
pub struct BookView {
    pub id: String,
    pub title: String,
    pub author: String,
    /// Username to review text
    pub reviews: BTreeMap<String, String>,
}

impl BookView {
    pub fn new(book: &Book, reviews: BTreeMap<String, String>) -> Self {
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            reviews,
        }
    }
}
