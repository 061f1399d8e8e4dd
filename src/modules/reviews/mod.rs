pub mod ledger;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Path, Request, State},
    http::header,
    middleware::{self, Next},
    response::Response,
    routing::{get, put},
    Extension, Json, Router,
};
use bookshop_auth::{SessionIssuer, SessionUser};
use bookshop_http::error::AppError;
use bookshop_kernel::{InitCtx, Module};
use serde::Deserialize;
use serde_json::json;

use ledger::{ReviewError, ReviewLedger};

#[derive(Clone)]
struct ReviewsState {
    ledger: Arc<ReviewLedger>,
    sessions: Arc<SessionIssuer>,
}

/// Reviews module: public review reads plus authenticated review mutation
pub struct ReviewsModule {
    state: ReviewsState,
}

impl ReviewsModule {
    pub fn new(ledger: Arc<ReviewLedger>, sessions: Arc<SessionIssuer>) -> Self {
        Self {
            state: ReviewsState { ledger, sessions },
        }
    }
}

#[async_trait]
impl Module for ReviewsModule {
    fn name(&self) -> &'static str {
        "reviews"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "reviews module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        // Mutation routes sit behind the session check; handlers trust the
        // username the middleware resolved.
        let protected = Router::new()
            .route(
                "/auth/review/{isbn}",
                put(upsert_review).delete(delete_review),
            )
            .route_layer(middleware::from_fn_with_state(
                self.state.sessions.clone(),
                require_session,
            ));

        Router::new()
            .route("/review/{isbn}", get(book_reviews))
            .merge(protected)
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/review/{isbn}": {
                    "get": {
                        "summary": "Get reviews for a book",
                        "tags": ["Reviews"],
                        "parameters": [
                            { "name": "isbn", "in": "path", "required": true, "schema": { "type": "string" } }
                        ],
                        "responses": {
                            "200": {
                                "description": "Review map (with a sentinel message when empty)",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ReviewMap" }
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
                "/auth/review/{isbn}": {
                    "put": {
                        "summary": "Add or update the caller's review",
                        "tags": ["Reviews"],
                        "security": [{ "bearerAuth": [] }],
                        "parameters": [
                            { "name": "isbn", "in": "path", "required": true, "schema": { "type": "string" } }
                        ],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": { "review": { "type": "string" } },
                                        "required": ["review"]
                                    }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Full review map for the book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ReviewMap" }
                                    }
                                }
                            },
                            "400": {
                                "description": "Empty review",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            },
                            "401": {
                                "description": "Missing or invalid session token",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
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
                    },
                    "delete": {
                        "summary": "Delete the caller's review",
                        "tags": ["Reviews"],
                        "security": [{ "bearerAuth": [] }],
                        "parameters": [
                            { "name": "isbn", "in": "path", "required": true, "schema": { "type": "string" } }
                        ],
                        "responses": {
                            "200": {
                                "description": "Remaining review map for the book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ReviewMap" }
                                    }
                                }
                            },
                            "401": {
                                "description": "Missing or invalid session token",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            },
                            "404": {
                                "description": "Book or review not found",
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
                    "ReviewMap": {
                        "type": "object",
                        "properties": {
                            "message": { "type": "string" },
                            "reviews": {
                                "type": "object",
                                "additionalProperties": { "type": "string" }
                            }
                        }
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "reviews module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "reviews module stopped");
        Ok(())
    }
}

/// Resolve the bearer token into a `SessionUser` extension, or reject with
/// 401 before the handler runs
async fn require_session(
    State(sessions): State<Arc<SessionIssuer>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::unauthorized("Missing session token"))?;

    let username = sessions
        .verify(token)
        .map_err(|e| AppError::unauthorized(e.to_string()))?;

    req.extensions_mut().insert(SessionUser(username));
    Ok(next.run(req).await)
}

fn review_error(err: ReviewError) -> AppError {
    match err {
        ReviewError::EmptyReview => AppError::bad_request(err.to_string()),
        ReviewError::BookNotFound | ReviewError::ReviewNotFound => {
            AppError::not_found(err.to_string())
        }
    }
}

/// Get the review map for a book
async fn book_reviews(
    State(state): State<ReviewsState>,
    Path(isbn): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let reviews = state.ledger.get_for_book(&isbn).map_err(review_error)?;

    if reviews.is_empty() {
        return Ok(Json(json!({
            "message": "No reviews available for this book",
            "reviews": reviews,
        })));
    }

    Ok(Json(json!({ "reviews": reviews })))
}

#[derive(Debug, Deserialize)]
struct ReviewPayload {
    #[serde(default)]
    review: Option<String>,
}

/// Add or update the caller's review for a book
async fn upsert_review(
    State(state): State<ReviewsState>,
    Path(isbn): Path<String>,
    Extension(SessionUser(username)): Extension<SessionUser>,
    Json(payload): Json<ReviewPayload>,
) -> Result<Json<serde_json::Value>, AppError> {
    let text = payload.review.unwrap_or_default();

    let reviews = state
        .ledger
        .upsert(&isbn, &username, &text)
        .map_err(review_error)?;

    tracing::info!(username = %username, isbn = %isbn, "review upserted");

    Ok(Json(json!({
        "message": "Review added/updated successfully",
        "reviews": reviews,
    })))
}

/// Delete the caller's review for a book, returning the remaining reviews
async fn delete_review(
    State(state): State<ReviewsState>,
    Path(isbn): Path<String>,
    Extension(SessionUser(username)): Extension<SessionUser>,
) -> Result<Json<serde_json::Value>, AppError> {
    let reviews = state
        .ledger
        .delete(&isbn, &username)
        .map_err(review_error)?;

    tracing::info!(username = %username, isbn = %isbn, "review deleted");

    Ok(Json(json!({
        "message": "Review deleted successfully",
        "reviews": reviews,
    })))
}

/// Create a new instance of the reviews module
pub fn create_module(ledger: Arc<ReviewLedger>, sessions: Arc<SessionIssuer>) -> Arc<dyn Module> {
    Arc::new(ReviewsModule::new(ledger, sessions))
}
