// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the token registry.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RegistryError;
use crate::events::RegistryEvent;
use crate::state::{epoch_secs, RegistryState};

// -- Request/Response types ---------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub token_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct IssueRequest {
    pub device_id: u64,
    /// Token lifetime in seconds from now. Exactly one of `ttl_secs`/`exp`.
    #[serde(default)]
    pub ttl_secs: Option<u64>,
    /// Absolute expiry as epoch seconds. Exactly one of `ttl_secs`/`exp`.
    #[serde(default)]
    pub exp: Option<u64>,
    #[serde(default)]
    pub claims: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct IssueResponse {
    pub id: Uuid,
    pub device_id: u64,
    /// Broker principal the credential was minted for. The eviction side
    /// derives the identical name.
    pub principal: String,
    pub exp: u64,
    pub issued_at: u64,
}

#[derive(Debug, Serialize)]
pub struct TokenInfo {
    pub id: Uuid,
    pub device_id: u64,
    pub principal: String,
    pub exp: u64,
    pub issued_at: u64,
}

#[derive(Debug, Serialize)]
pub struct RevokeResponse {
    pub id: Uuid,
    pub removed: bool,
}

#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub purged: usize,
}

// -- Handlers -----------------------------------------------------------------

/// `GET /api/v1/health`
pub async fn health(State(s): State<Arc<RegistryState>>) -> impl IntoResponse {
    Json(HealthResponse { status: "running".to_owned(), token_count: s.ledger.len().await })
}

/// `POST /api/v1/tokens` — record a credential issuance.
pub async fn issue_token(
    State(s): State<Arc<RegistryState>>,
    Json(req): Json<IssueRequest>,
) -> impl IntoResponse {
    let now = epoch_secs();
    let exp = match (req.exp, req.ttl_secs) {
        (Some(exp), None) => exp,
        // Saturate so an absurd lifetime means "never expires", not a
        // wrapped-around, already-expired token.
        (None, Some(ttl)) => now.saturating_add(ttl),
        _ => {
            return RegistryError::BadRequest
                .to_http_response("provide exactly one of exp or ttl_secs")
                .into_response();
        }
    };

    let claims = req.claims.unwrap_or(serde_json::Value::Null);
    let record = s.ledger.record(req.device_id, exp, now, claims).await;
    let principal = s.ledger.principal_for(record.device_id);
    let _ = s.event_tx.send(RegistryEvent::Issued {
        token_id: record.id,
        principal: principal.clone(),
        exp,
    });

    Json(IssueResponse {
        id: record.id,
        device_id: record.device_id,
        principal,
        exp: record.exp,
        issued_at: record.issued_at,
    })
    .into_response()
}

/// `GET /api/v1/tokens` — list all live issuance records.
pub async fn list_tokens(State(s): State<Arc<RegistryState>>) -> impl IntoResponse {
    let list: Vec<TokenInfo> = s
        .ledger
        .list()
        .await
        .into_iter()
        .map(|r| TokenInfo {
            id: r.id,
            device_id: r.device_id,
            principal: s.ledger.principal_for(r.device_id),
            exp: r.exp,
            issued_at: r.issued_at,
        })
        .collect();
    Json(list)
}

/// `GET /api/v1/tokens/expired` — records expired as of now.
pub async fn expired_tokens(State(s): State<Arc<RegistryState>>) -> impl IntoResponse {
    let now = epoch_secs();
    let list: Vec<TokenInfo> = s
        .ledger
        .expired(now)
        .await
        .into_iter()
        .map(|r| TokenInfo {
            id: r.id,
            device_id: r.device_id,
            principal: s.ledger.principal_for(r.device_id),
            exp: r.exp,
            issued_at: r.issued_at,
        })
        .collect();
    Json(list)
}

/// `DELETE /api/v1/tokens/{id}` — revoke a credential before expiry.
///
/// The record is always deleted; a rejected broker admin call surfaces as
/// 502 after the fact, an unreachable broker only shows up on the operator
/// channel.
pub async fn revoke_token(
    State(s): State<Arc<RegistryState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id: Uuid = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return RegistryError::BadRequest
                .to_http_response(format!("invalid token id: {id}"))
                .into_response();
        }
    };

    match s.ledger.revoke(id).await {
        Ok(removed) => Json(RevokeResponse { id, removed }).into_response(),
        Err(e) => RegistryError::BrokerRejected.to_http_response(e.to_string()).into_response(),
    }
}

/// `POST /api/v1/tokens/sweep` — run a purge pass now.
pub async fn sweep_tokens(State(s): State<Arc<RegistryState>>) -> impl IntoResponse {
    let now = epoch_secs();
    match s.ledger.purge_expired(now).await {
        Ok(purged) => {
            if purged > 0 {
                let _ = s.event_tx.send(RegistryEvent::SweepCompleted { purged });
            }
            Json(SweepResponse { purged }).into_response()
        }
        Err(e) => RegistryError::BrokerRejected.to_http_response(e.to_string()).into_response(),
    }
}
