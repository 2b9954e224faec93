// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin client for the messaging broker's management API.
//!
//! The only operation the registry needs is "close every connection
//! authenticated as principal X". The call is idempotent: closing
//! connections for a principal with none live is a success, not an error.

use std::fmt;
use std::time::Duration;

use futures_util::future::BoxFuture;

/// Failure classification for broker management calls.
///
/// Callers pattern-match on this: `Unreachable` is the only variant the
/// revocation path suppresses. `Rejected` means the broker answered and
/// refused — a misconfigured admin credential or a protocol problem that
/// needs operator attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerAdminError {
    /// Connection failure or timeout reaching the management API.
    Unreachable(String),
    /// The management API responded with a non-success status.
    Rejected { status: u16, message: String },
}

impl fmt::Display for BrokerAdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable(cause) => write!(f, "broker unreachable: {cause}"),
            Self::Rejected { status, message } => {
                write!(f, "broker rejected admin call (HTTP {status}): {message}")
            }
        }
    }
}

impl std::error::Error for BrokerAdminError {}

/// Administrative surface over the broker's control plane.
///
/// A trait so a precise per-session revocation backend can be substituted
/// later without touching the ledger or the sweeper.
pub trait BrokerAdmin: Send + Sync {
    /// Forcibly close all live connections authenticated as `principal`.
    fn close_connections_for_principal<'a>(
        &'a self,
        principal: &'a str,
    ) -> BoxFuture<'a, Result<(), BrokerAdminError>>;
}

/// HTTP implementation against a RabbitMQ-style management API.
///
/// Issues `DELETE {base}/api/connections/username/{principal}` with
/// optional basic auth and a bounded timeout. Stateless; safe to share.
pub struct HttpBrokerAdmin {
    base_url: String,
    username: Option<String>,
    password: Option<String>,
    client: reqwest::Client,
}

impl HttpBrokerAdmin {
    /// Fails if the underlying HTTP client cannot be built; a client
    /// without the bounded timeout is not an acceptable substitute.
    pub fn new(
        base_url: String,
        username: Option<String>,
        password: Option<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url: base_url.trim_end_matches('/').to_owned(), username, password, client })
    }
}

impl BrokerAdmin for HttpBrokerAdmin {
    fn close_connections_for_principal<'a>(
        &'a self,
        principal: &'a str,
    ) -> BoxFuture<'a, Result<(), BrokerAdminError>> {
        Box::pin(async move {
            let url = format!("{}/api/connections/username/{principal}", self.base_url);
            let mut req = self.client.delete(&url);
            if let Some(ref user) = self.username {
                req = req.basic_auth(user, self.password.as_deref());
            }

            // Transport-level failures (refused, timed out, broken transfer)
            // all classify as Unreachable; only an actual HTTP response can
            // produce a Rejected.
            let resp = req.send().await.map_err(|e| BrokerAdminError::Unreachable(e.to_string()))?;

            let status = resp.status();
            if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
                // 404: no connections (or no such user) — idempotent no-op.
                return Ok(());
            }

            let message = resp.text().await.unwrap_or_default();
            Err(BrokerAdminError::Rejected { status: status.as_u16(), message })
        })
    }
}

#[cfg(test)]
#[path = "broker_tests.rs"]
mod tests;
