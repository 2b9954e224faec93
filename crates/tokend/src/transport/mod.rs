// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport for the token registry.

pub mod auth;
pub mod http;

use std::sync::Arc;

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::RegistryState;

/// Build the axum `Router` with all registry routes.
pub fn build_router(state: Arc<RegistryState>) -> Router {
    Router::new()
        // Health (no auth)
        .route("/api/v1/health", get(http::health))
        // Issuance ledger
        .route("/api/v1/tokens", post(http::issue_token).get(http::list_tokens))
        .route("/api/v1/tokens/expired", get(http::expired_tokens))
        .route("/api/v1/tokens/sweep", post(http::sweep_tokens))
        .route("/api/v1/tokens/{id}", delete(http::revoke_token))
        // Middleware
        .layer(middleware::from_fn_with_state(state.clone(), auth::auth_layer))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
