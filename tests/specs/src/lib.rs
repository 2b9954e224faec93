// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end registry smoke tests.
//!
//! Runs the real registry server in-process on a free TCP port and pairs it
//! with a fake broker management API that records which principals it was
//! asked to disconnect.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::delete;
use axum::Router;

use tokend::config::RegistryConfig;

/// Find a free TCP port by binding to :0 then releasing.
pub fn free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// Fake broker management API. Answers every connection-close call with
/// 204 and remembers the principal it was for.
pub struct FakeBrokerMgmt {
    port: u16,
    principals: Arc<Mutex<Vec<String>>>,
}

impl FakeBrokerMgmt {
    pub async fn spawn() -> anyhow::Result<Self> {
        let principals: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        async fn close_connections(
            State(seen): State<Arc<Mutex<Vec<String>>>>,
            Path(username): Path<String>,
        ) -> StatusCode {
            seen.lock().unwrap_or_else(PoisonError::into_inner).push(username);
            StatusCode::NO_CONTENT
        }

        let router = Router::new()
            .route("/api/connections/username/{username}", delete(close_connections))
            .with_state(Arc::clone(&principals));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self { port, principals })
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Principals disconnected so far, in call order.
    pub fn principals(&self) -> Vec<String> {
        self.principals.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Wait until at least `n` eviction calls have landed.
    pub async fn wait_for_calls(&self, n: usize, timeout: Duration) -> anyhow::Result<Vec<String>> {
        let deadline = Instant::now() + timeout;
        loop {
            let seen = self.principals();
            if seen.len() >= n {
                return Ok(seen);
            }
            if Instant::now() > deadline {
                anyhow::bail!("expected {n} eviction calls, saw {}: {seen:?}", seen.len());
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    }
}

/// Registry config for tests: all defaults except what a test pins down.
pub fn registry_config(port: u16, broker_mgmt_url: String) -> RegistryConfig {
    RegistryConfig {
        host: "127.0.0.1".to_owned(),
        port,
        auth_token: None,
        broker_mgmt_url,
        broker_mgmt_user: None,
        broker_mgmt_pass: None,
        broker_timeout_ms: 500,
        sweep_interval_secs: 300,
        principal_prefix: "device_".to_owned(),
        persist_path: None,
    }
}

/// An in-process registry reachable over real TCP.
pub struct Registry {
    port: u16,
}

impl Registry {
    /// Start the server on a free port and wait for it to answer health.
    pub async fn spawn(mut config: RegistryConfig) -> anyhow::Result<Self> {
        let port = free_port()?;
        config.port = port;

        tokio::spawn(async move {
            if let Err(e) = tokend::run(config).await {
                eprintln!("registry exited: {e}");
            }
        });

        let registry = Self { port };
        registry.wait_healthy().await?;
        Ok(registry)
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }

    async fn wait_healthy(&self) -> anyhow::Result<()> {
        let client = reqwest::Client::new();
        let url = self.url("/api/v1/health");
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            if Instant::now() > deadline {
                anyhow::bail!("registry on port {} never became healthy", self.port);
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    }
}
