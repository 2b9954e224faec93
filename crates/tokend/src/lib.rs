// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tokend: credential issuance registry with live-session eviction.
//!
//! Tracks every issued access token so that revoking one before its natural
//! expiry can forcibly disconnect any client still on the messaging broker
//! with it. Revocation is best-effort against the broker: the ledger is the
//! source of truth and its deletions always succeed, while an unreachable
//! broker management plane is reported on the operator channel.

pub mod broker;
pub mod config;
pub mod error;
pub mod events;
pub mod ledger;
pub mod revocation;
pub mod state;
pub mod sweeper;
pub mod test_support;
pub mod transport;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::broker::HttpBrokerAdmin;
use crate::config::RegistryConfig;
use crate::state::RegistryState;
use crate::sweeper::spawn_sweeper;
use crate::transport::build_router;

/// Run the registry until shutdown.
pub async fn run(config: RegistryConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let shutdown = CancellationToken::new();

    let admin = Arc::new(HttpBrokerAdmin::new(
        config.broker_mgmt_url.clone(),
        config.broker_mgmt_user.clone(),
        config.broker_mgmt_pass.clone(),
        config.broker_timeout(),
    )?);

    let state = Arc::new(RegistryState::new(config, shutdown.clone(), admin));
    state.ledger.load_persisted().await;

    spawn_sweeper(Arc::clone(&state));

    tracing::info!(
        sweep_interval_secs = state.config.sweep_interval_secs,
        broker_mgmt_url = %state.config.broker_mgmt_url,
        "tokend listening on {addr}"
    );

    let router = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    Ok(())
}
