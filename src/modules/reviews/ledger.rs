//! Per-book, per-user review storage.
//!
//! Nested mapping from book id to (username → review text). Each (book,
//! user) cell is either Absent or Present; upsert moves it to Present
//! (overwriting any prior text) and delete moves it back to Absent. Deleting
//! an Absent cell is an error, not a no-op.
//!
//! A single `RwLock` over the whole mapping serializes writes; contention is
//! expected to be negligible at this catalog size.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use thiserror::Error;

use crate::modules::catalog::store::CatalogStore;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReviewError {
    #[error("Book not found")]
    BookNotFound,

    #[error("Review cannot be empty")]
    EmptyReview,

    #[error("No review found for this user on this book")]
    ReviewNotFound,
}

pub struct ReviewLedger {
    catalog: Arc<CatalogStore>,
    reviews: RwLock<HashMap<String, BTreeMap<String, String>>>,
}

impl ReviewLedger {
    pub fn new(catalog: Arc<CatalogStore>) -> Self {
        Self {
            catalog,
            reviews: RwLock::new(HashMap::new()),
        }
    }

    /// Add or replace the caller's review for a book, returning the book's
    /// full review map. The username is trusted; session verification has
    /// already happened upstream.
    pub fn upsert(
        &self,
        book_id: &str,
        username: &str,
        text: &str,
    ) -> Result<BTreeMap<String, String>, ReviewError> {
        if !self.catalog.contains(book_id) {
            return Err(ReviewError::BookNotFound);
        }
        if text.trim().is_empty() {
            return Err(ReviewError::EmptyReview);
        }

        let mut reviews = self.reviews.write().unwrap_or_else(|e| e.into_inner());
        let book_reviews = reviews.entry(book_id.to_string()).or_default();
        book_reviews.insert(username.to_string(), text.to_string());

        Ok(book_reviews.clone())
    }

    /// Remove the caller's review for a book, returning the remaining
    /// review map. Errors if the book is unknown or the caller has no
    /// review on it.
    pub fn delete(
        &self,
        book_id: &str,
        username: &str,
    ) -> Result<BTreeMap<String, String>, ReviewError> {
        if !self.catalog.contains(book_id) {
            return Err(ReviewError::BookNotFound);
        }

        let mut reviews = self.reviews.write().unwrap_or_else(|e| e.into_inner());
        let book_reviews = reviews
            .get_mut(book_id)
            .ok_or(ReviewError::ReviewNotFound)?;

        if book_reviews.remove(username).is_none() {
            return Err(ReviewError::ReviewNotFound);
        }

        Ok(book_reviews.clone())
    }

    /// Read the review map for a book. An existing book with no reviews
    /// yields an empty map; only an unknown book is an error.
    pub fn get_for_book(&self, book_id: &str) -> Result<BTreeMap<String, String>, ReviewError> {
        if !self.catalog.contains(book_id) {
            return Err(ReviewError::BookNotFound);
        }

        Ok(self.reviews_of(book_id))
    }

    /// Current review map for a book, empty when none exist.
    /// Used when composing book views; does not check catalog membership.
    pub fn reviews_of(&self, book_id: &str) -> BTreeMap<String, String> {
        self.reviews
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(book_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_ledger() -> ReviewLedger {
        ReviewLedger::new(Arc::new(CatalogStore::seeded()))
    }

    #[test]
    fn upsert_then_get_round_trip() {
        let ledger = test_ledger();

        ledger.upsert("1", "alice", "a classic").unwrap();

        let reviews = ledger.get_for_book("1").unwrap();
        assert_eq!(reviews.get("alice").map(String::as_str), Some("a classic"));
    }

    #[test]
    fn upsert_is_idempotent() {
        let ledger = test_ledger();

        let first = ledger.upsert("1", "alice", "a classic").unwrap();
        let second = ledger.upsert("1", "alice", "a classic").unwrap();

        assert_eq!(first, second);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn upsert_overwrites_rather_than_appends() {
        let ledger = test_ledger();

        ledger.upsert("1", "alice", "a classic").unwrap();
        let reviews = ledger.upsert("1", "alice", "changed my mind").unwrap();

        assert_eq!(reviews.len(), 1);
        assert_eq!(
            reviews.get("alice").map(String::as_str),
            Some("changed my mind")
        );
    }

    #[test]
    fn upsert_unknown_book_is_not_found() {
        let ledger = test_ledger();
        assert_eq!(
            ledger.upsert("999", "alice", "great"),
            Err(ReviewError::BookNotFound)
        );
    }

    #[test]
    fn blank_review_is_rejected_without_altering_state() {
        let ledger = test_ledger();
        ledger.upsert("1", "alice", "a classic").unwrap();

        assert_eq!(ledger.upsert("1", "alice", ""), Err(ReviewError::EmptyReview));
        assert_eq!(
            ledger.upsert("1", "alice", "   "),
            Err(ReviewError::EmptyReview)
        );

        let reviews = ledger.get_for_book("1").unwrap();
        assert_eq!(reviews.get("alice").map(String::as_str), Some("a classic"));
    }

    #[test]
    fn delete_removes_only_the_callers_review() {
        let ledger = test_ledger();
        ledger.upsert("1", "alice", "a classic").unwrap();
        ledger.upsert("1", "bob", "slow start").unwrap();

        let remaining = ledger.delete("1", "alice").unwrap();

        assert!(!remaining.contains_key("alice"));
        assert!(remaining.contains_key("bob"));
    }

    #[test]
    fn delete_from_absent_cell_is_not_found() {
        let ledger = test_ledger();

        // Book exists but has no reviews at all
        assert_eq!(ledger.delete("1", "alice"), Err(ReviewError::ReviewNotFound));

        // Book has reviews, but none by this user
        ledger.upsert("1", "bob", "slow start").unwrap();
        assert_eq!(ledger.delete("1", "alice"), Err(ReviewError::ReviewNotFound));

        // Unknown book
        assert_eq!(ledger.delete("999", "alice"), Err(ReviewError::BookNotFound));
    }

    #[test]
    fn recovers_after_a_panicked_writer() {
        let ledger = Arc::new(test_ledger());
        ledger.upsert("1", "alice", "a classic").unwrap();

        // Poison the lock by panicking while holding the write guard
        let poisoner = Arc::clone(&ledger);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.reviews.write().unwrap();
            panic!("writer died mid-update");
        })
        .join();

        let reviews = ledger.get_for_book("1").unwrap();
        assert_eq!(reviews.get("alice").map(String::as_str), Some("a classic"));
        ledger.upsert("1", "bob", "slow start").unwrap();
    }

    #[test]
    fn existing_book_with_no_reviews_is_empty_not_error() {
        let ledger = test_ledger();
        assert!(ledger.get_for_book("2").unwrap().is_empty());
        assert_eq!(ledger.get_for_book("999"), Err(ReviewError::BookNotFound));
    }
}
