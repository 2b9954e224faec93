// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Revocation coordination: translate "this credential is no longer valid"
//! into "no live broker session may keep using it".
//!
//! The ledger does not track which session presented which token, so the
//! coordinator cannot evict surgically. It closes every connection for the
//! record's principal instead: holders of still-valid tokens reconnect,
//! holders of the revoked token cannot.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::broker::{BrokerAdmin, BrokerAdminError};
use crate::events::{RegistryEvent, COMPONENT};
use crate::ledger::IssuanceRecord;

/// Glue between ledger deletions and broker eviction.
pub struct RevocationCoordinator {
    broker: Arc<dyn BrokerAdmin>,
    principal_prefix: String,
    event_tx: broadcast::Sender<RegistryEvent>,
}

impl RevocationCoordinator {
    pub fn new(
        broker: Arc<dyn BrokerAdmin>,
        principal_prefix: String,
        event_tx: broadcast::Sender<RegistryEvent>,
    ) -> Self {
        Self { broker, principal_prefix, event_tx }
    }

    /// Broker-facing principal name for a device. The same convention is
    /// used when tokens are minted, so issuance and eviction always agree.
    pub fn principal_for(&self, device_id: u64) -> String {
        format!("{}{}", self.principal_prefix, device_id)
    }

    /// Run the eviction side effect for a just-deleted record.
    ///
    /// An unreachable management API is reported on the operator channel and
    /// swallowed; the deletion that triggered us must not fail. A refusal
    /// from a reachable broker propagates, because it means the admin client
    /// itself is misconfigured. No inline retry: a missed
    /// eviction during a transient outage is an accepted residual window.
    pub async fn on_revoked(&self, record: &IssuanceRecord) -> Result<(), BrokerAdminError> {
        let principal = self.principal_for(record.device_id);
        let _ = self
            .event_tx
            .send(RegistryEvent::Revoked { token_id: record.id, principal: principal.clone() });

        match self.broker.close_connections_for_principal(&principal).await {
            Ok(()) => {
                tracing::info!(
                    token_id = %record.id,
                    principal = %principal,
                    "closed live broker connections after revocation"
                );
                Ok(())
            }
            Err(BrokerAdminError::Unreachable(cause)) => {
                tracing::error!(
                    component = COMPONENT,
                    principal = %principal,
                    cause = %cause,
                    "failed to evict clients on token revocation"
                );
                let _ = self.event_tx.send(RegistryEvent::EvictionFailed {
                    component: COMPONENT.to_owned(),
                    principal,
                    cause,
                });
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[path = "revocation_tests.rs"]
mod tests;
