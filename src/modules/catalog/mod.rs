pub mod models;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use bookshop_http::error::AppError;
use bookshop_kernel::{InitCtx, Module};
use serde_json::json;

use crate::modules::reviews::ledger::ReviewLedger;
use models::BookView;
use store::CatalogStore;

#[derive(Clone)]
struct CatalogState {
    catalog: Arc<CatalogStore>,
    reviews: Arc<ReviewLedger>,
    /// Artificial pause before catalog reads, for parity with upstream
    /// request timing. Zero in tests and by default.
    browse_delay: Duration,
}

/// Catalog module: public book listing and search routes
pub struct CatalogModule {
    state: CatalogState,
}

impl CatalogModule {
    pub fn new(
        catalog: Arc<CatalogStore>,
        reviews: Arc<ReviewLedger>,
        browse_delay_ms: u64,
    ) -> Self {
        Self {
            state: CatalogState {
                catalog,
                reviews,
                browse_delay: Duration::from_millis(browse_delay_ms),
            },
        }
    }
}

#[async_trait]
impl Module for CatalogModule {
    fn name(&self) -> &'static str {
        "catalog"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            books = self.state.catalog.all().len(),
            "catalog module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list_books))
            .route("/isbn/{isbn}", get(get_book))
            .route("/author/{author}", get(books_by_author))
            .route("/title/{title}", get(books_by_title))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List all books",
                        "tags": ["Catalog"],
                        "responses": {
                            "200": {
                                "description": "Full catalog with reviews",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
                "/isbn/{isbn}": {
                    "get": {
                        "summary": "Get one book by identifier",
                        "tags": ["Catalog"],
                        "parameters": [
                            { "name": "isbn", "in": "path", "required": true, "schema": { "type": "string" } }
                        ],
                        "responses": {
                            "200": {
                                "description": "The book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            },
                            "404": {
                                "description": "Book not found",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/author/{author}": {
                    "get": {
                        "summary": "Search books by author substring",
                        "tags": ["Catalog"],
                        "parameters": [
                            { "name": "author", "in": "path", "required": true, "schema": { "type": "string" } }
                        ],
                        "responses": {
                            "200": {
                                "description": "Matching books with a count",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "count": { "type": "integer" },
                                                "books": {
                                                    "type": "array",
                                                    "items": { "$ref": "#/components/schemas/Book" }
                                                }
                                            }
                                        }
                                    }
                                }
                            },
                            "404": {
                                "description": "No books found by this author",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/title/{title}": {
                    "get": {
                        "summary": "Search books by title substring",
                        "tags": ["Catalog"],
                        "parameters": [
                            { "name": "title", "in": "path", "required": true, "schema": { "type": "string" } }
                        ],
                        "responses": {
                            "200": {
                                "description": "Matching books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "404": {
                                "description": "No books found with this title",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "description": "Unique identifier for the book" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "reviews": {
                                "type": "object",
                                "description": "Username to review text",
                                "additionalProperties": { "type": "string" }
                            }
                        },
                        "required": ["id", "title", "author", "reviews"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "catalog module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "catalog module stopped");
        Ok(())
    }
}

/// Optional pause before touching the store; see `CatalogState::browse_delay`
async fn browse_pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// List the full catalog
async fn list_books(State(state): State<CatalogState>) -> Json<Vec<BookView>> {
    browse_pause(state.browse_delay).await;

    let books = state
        .catalog
        .all()
        .iter()
        .map(|book| BookView::new(book, state.reviews.reviews_of(&book.id)))
        .collect();

    Json(books)
}

/// Get one book by its identifier
async fn get_book(
    State(state): State<CatalogState>,
    Path(isbn): Path<String>,
) -> Result<Json<BookView>, AppError> {
    browse_pause(state.browse_delay).await;

    let book = state
        .catalog
        .get(&isbn)
        .ok_or_else(|| AppError::not_found("Book not found"))?;

    Ok(Json(BookView::new(book, state.reviews.reviews_of(&isbn))))
}

/// Search by author substring; no matches is a 404, not a server error
async fn books_by_author(
    State(state): State<CatalogState>,
    Path(author): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let matches = state.catalog.find_by_author(&author);
    if matches.is_empty() {
        return Err(AppError::not_found("No books found by this author"));
    }

    let books: Vec<BookView> = matches
        .into_iter()
        .map(|book| BookView::new(book, state.reviews.reviews_of(&book.id)))
        .collect();

    Ok(Json(json!({
        "count": books.len(),
        "books": books,
    })))
}

/// Search by title substring
async fn books_by_title(
    State(state): State<CatalogState>,
    Path(title): Path<String>,
) -> Result<Json<Vec<BookView>>, AppError> {
    let matches = state.catalog.find_by_title(&title);
    if matches.is_empty() {
        return Err(AppError::not_found("No books found with this title"));
    }

    let books = matches
        .into_iter()
        .map(|book| BookView::new(book, state.reviews.reviews_of(&book.id)))
        .collect();

    Ok(Json(books))
}

/// Create a new instance of the catalog module
pub fn create_module(
    catalog: Arc<CatalogStore>,
    reviews: Arc<ReviewLedger>,
    browse_delay_ms: u64,
) -> Arc<dyn Module> {
    Arc::new(CatalogModule::new(catalog, reviews, browse_delay_ms))
}
