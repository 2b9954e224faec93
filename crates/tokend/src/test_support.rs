// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: broker admin doubles and state builders.

use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::broker::{BrokerAdmin, BrokerAdminError};
use crate::config::RegistryConfig;
use crate::state::RegistryState;

/// Broker admin double that records evicted principals and answers with a
/// preconfigured result.
pub struct MockBroker {
    calls: Mutex<Vec<String>>,
    failure: Option<BrokerAdminError>,
}

impl MockBroker {
    /// Every eviction call succeeds.
    pub fn ok() -> Arc<Self> {
        Arc::new(Self { calls: Mutex::new(Vec::new()), failure: None })
    }

    /// Every eviction call fails as if the management API were down.
    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(BrokerAdminError::Unreachable("connection refused".to_owned())),
        })
    }

    /// Every eviction call is rejected with the given HTTP status.
    pub fn rejected(status: u16) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(BrokerAdminError::Rejected {
                status,
                message: "admin call rejected".to_owned(),
            }),
        })
    }

    /// Principals this double was asked to evict, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl BrokerAdmin for MockBroker {
    fn close_connections_for_principal<'a>(
        &'a self,
        principal: &'a str,
    ) -> BoxFuture<'a, Result<(), BrokerAdminError>> {
        Box::pin(async move {
            self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(principal.to_owned());
            match &self.failure {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        })
    }
}

/// Registry config with test defaults: ephemeral port, no auth, no
/// persistence, broker URL pointing nowhere.
pub fn test_config() -> RegistryConfig {
    RegistryConfig {
        host: "127.0.0.1".to_owned(),
        port: 0,
        auth_token: None,
        broker_mgmt_url: "http://127.0.0.1:1".to_owned(),
        broker_mgmt_user: None,
        broker_mgmt_pass: None,
        broker_timeout_ms: 500,
        sweep_interval_secs: 300,
        principal_prefix: "device_".to_owned(),
        persist_path: None,
    }
}

/// Build shared state around the given broker double.
pub fn test_state(broker: Arc<dyn BrokerAdmin>) -> Arc<RegistryState> {
    test_state_with_config(test_config(), broker)
}

pub fn test_state_with_config(
    config: RegistryConfig,
    broker: Arc<dyn BrokerAdmin>,
) -> Arc<RegistryState> {
    Arc::new(RegistryState::new(config, CancellationToken::new(), broker))
}
