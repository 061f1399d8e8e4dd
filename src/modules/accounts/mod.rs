pub mod registry;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use bookshop_auth::SessionIssuer;
use bookshop_http::error::AppError;
use bookshop_kernel::{InitCtx, Module};
use serde::Deserialize;
use serde_json::json;

use crate::utils;
use registry::{AccountRegistry, RegisterError};

#[derive(Clone)]
struct AccountsState {
    accounts: Arc<AccountRegistry>,
    sessions: Arc<SessionIssuer>,
}

/// Accounts module: registration and login routes
pub struct AccountsModule {
    state: AccountsState,
}

impl AccountsModule {
    pub fn new(accounts: Arc<AccountRegistry>, sessions: Arc<SessionIssuer>) -> Self {
        Self {
            state: AccountsState { accounts, sessions },
        }
    }
}

#[async_trait]
impl Module for AccountsModule {
    fn name(&self) -> &'static str {
        "accounts"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "accounts module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/register", post(register))
            .route("/login", post(login))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/register": {
                    "post": {
                        "summary": "Register a new user",
                        "tags": ["Accounts"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Credentials" }
                                }
                            }
                        },
                        "responses": {
                            "201": { "description": "User registered" },
                            "400": {
                                "description": "Missing username or password",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            },
                            "409": {
                                "description": "Username already exists",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/login": {
                    "post": {
                        "summary": "Authenticate and receive a session token",
                        "tags": ["Accounts"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Credentials" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Login successful",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "message": { "type": "string" },
                                                "token": { "type": "string" }
                                            }
                                        }
                                    }
                                }
                            },
                            "400": {
                                "description": "Missing username or password",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            },
                            "401": {
                                "description": "Invalid login credentials",
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
                    "Credentials": {
                        "type": "object",
                        "properties": {
                            "username": { "type": "string" },
                            "password": { "type": "string" }
                        },
                        "required": ["username", "password"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "accounts module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "accounts module stopped");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct Credentials {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

/// Register a new user
async fn register(
    State(state): State<AccountsState>,
    Json(payload): Json<Credentials>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let username = payload.username.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    match state.accounts.register(&username, &password) {
        Ok(()) => {
            tracing::info!(username = %username, "user registered");
            Ok((
                StatusCode::CREATED,
                Json(json!({ "message": "User registered successfully" })),
            ))
        }
        Err(RegisterError::InvalidInput) => {
            Err(AppError::bad_request("Username and password are required"))
        }
        Err(RegisterError::Conflict) => Err(AppError::conflict("Username already exists")),
        Err(RegisterError::Hashing) => {
            Err(AppError::Internal(anyhow::anyhow!("credential hashing failed")))
        }
    }
}

/// Authenticate a registered user and issue a session token
async fn login(
    State(state): State<AccountsState>,
    Json(payload): Json<Credentials>,
) -> Result<Json<serde_json::Value>, AppError> {
    if utils::is_blank(payload.username.as_deref()) || utils::is_blank(payload.password.as_deref())
    {
        return Err(AppError::bad_request("Username and password are required"));
    }

    let username = payload.username.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    if !state.accounts.authenticate(&username, &password) {
        return Err(AppError::unauthorized("Invalid login credentials"));
    }

    let token = state
        .sessions
        .issue(&username)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to issue session token: {e}")))?;

    tracing::info!(username = %username, "login successful");

    Ok(Json(json!({
        "message": "Login successful",
        "token": token,
    })))
}

/// Create a new instance of the accounts module
pub fn create_module(
    accounts: Arc<AccountRegistry>,
    sessions: Arc<SessionIssuer>,
) -> Arc<dyn Module> {
    Arc::new(AccountsModule::new(accounts, sessions))
}
