//! In-memory book catalog.
//!
//! The catalog is seeded once at construction and never mutated by request
//! traffic, so it needs no interior locking. Search is a linear scan with
//! trimmed, lowercased substring matching on both sides.

use super::models::Book;

pub struct CatalogStore {
    books: Vec<Book>,
}

impl CatalogStore {
    /// Build a catalog from an explicit book list.
    pub fn new(books: Vec<Book>) -> Self {
        Self { books }
    }

    /// Build the standard seed catalog.
    pub fn seeded() -> Self {
        let seed = [
            ("1", "Things Fall Apart", "Chinua Achebe"),
            ("2", "Fairy tales", "Hans Christian Andersen"),
            ("3", "The Divine Comedy", "Dante Alighieri"),
            ("4", "The Epic Of Gilgamesh", "Unknown"),
            ("5", "The Book Of Job", "Unknown"),
            ("6", "One Thousand and One Nights", "Unknown"),
            ("7", "Njál's Saga", "Unknown"),
            ("8", "Pride and Prejudice", "Jane Austen"),
            ("9", "Le Père Goriot", "Honoré de Balzac"),
            ("10", "Eugénie Grandet", "Honoré de Balzac"),
        ];

        Self::new(
            seed.into_iter()
                .map(|(id, title, author)| Book {
                    id: id.to_string(),
                    title: title.to_string(),
                    author: author.to_string(),
                })
                .collect(),
        )
    }

    /// Full catalog in insertion order
    pub fn all(&self) -> &[Book] {
        &self.books
    }

    /// Exact key lookup
    pub fn get(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Case-insensitive substring search on the author field.
    /// An empty result is a valid outcome, not an error.
    pub fn find_by_author(&self, query: &str) -> Vec<&Book> {
        let query = normalized(query);
        self.books
            .iter()
            .filter(|book| normalized(&book.author).contains(&query))
            .collect()
    }

    /// Case-insensitive substring search on the title field
    pub fn find_by_title(&self, query: &str) -> Vec<&Book> {
        let query = normalized(query);
        self.books
            .iter()
            .filter(|book| normalized(&book.title).contains(&query))
            .collect()
    }
}

fn normalized(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_catalog_has_ten_books() {
        let catalog = CatalogStore::seeded();
        assert_eq!(catalog.all().len(), 10);
    }

    #[test]
    fn get_by_id_finds_exact_key() {
        let catalog = CatalogStore::seeded();

        let book = catalog.get("1").unwrap();
        assert_eq!(book.title, "Things Fall Apart");
        assert_eq!(book.author, "Chinua Achebe");

        assert!(catalog.get("999").is_none());
    }

    #[test]
    fn author_search_is_case_and_whitespace_insensitive() {
        let catalog = CatalogStore::seeded();

        let matches = catalog.find_by_author("achebe");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "1");

        let matches = catalog.find_by_author("  ACHEBE ");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "1");
    }

    #[test]
    fn author_search_with_no_matches_is_empty_not_error() {
        let catalog = CatalogStore::seeded();
        assert!(catalog.find_by_author("melville").is_empty());
    }

    #[test]
    fn author_search_matches_substrings() {
        let catalog = CatalogStore::seeded();
        let matches = catalog.find_by_author("balzac");
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn title_search_is_case_and_whitespace_insensitive() {
        let catalog = CatalogStore::seeded();

        let matches = catalog.find_by_title(" pride ");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "8");

        assert!(catalog.find_by_title("moby dick").is_empty());
    }

    #[test]
    fn search_preserves_insertion_order() {
        let catalog = CatalogStore::seeded();
        let matches = catalog.find_by_author("balzac");
        assert_eq!(matches[0].id, "9");
        assert_eq!(matches[1].id, "10");
    }
}
