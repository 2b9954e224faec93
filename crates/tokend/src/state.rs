// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::broker::BrokerAdmin;
use crate::config::RegistryConfig;
use crate::events::RegistryEvent;
use crate::ledger::Ledger;
use crate::revocation::RevocationCoordinator;

/// Shared registry state.
pub struct RegistryState {
    pub ledger: Ledger,
    pub config: RegistryConfig,
    pub shutdown: CancellationToken,
    pub event_tx: broadcast::Sender<RegistryEvent>,
}

impl RegistryState {
    pub fn new(
        config: RegistryConfig,
        shutdown: CancellationToken,
        broker: Arc<dyn BrokerAdmin>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        let coordinator =
            RevocationCoordinator::new(broker, config.principal_prefix.clone(), event_tx.clone());
        let ledger = Ledger::new(coordinator, config.persist_path.clone());
        Self { ledger, config, shutdown, event_tx }
    }

    /// Subscribe to registry events.
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.event_tx.subscribe()
    }
}

/// Return current epoch seconds.
pub fn epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
