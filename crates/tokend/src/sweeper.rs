// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background sweep of expired ledger entries.

use std::sync::Arc;

use crate::events::RegistryEvent;
use crate::state::{epoch_secs, RegistryState};

/// Spawn a single background task that periodically purges expired records.
///
/// Each pass takes one timestamp snapshot, so a record cannot be expired and
/// not-expired within the same pass. Deleting a record that a concurrent
/// revocation already removed is a no-op, which keeps the sweep safe under
/// at-least-once scheduling.
pub fn spawn_sweeper(state: Arc<RegistryState>) {
    let interval = state.config.sweep_interval();

    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = state.shutdown.cancelled() => break,
                _ = timer.tick() => {}
            }

            let now = epoch_secs();
            if !state.ledger.any_expired(now).await {
                continue;
            }

            match state.ledger.purge_expired(now).await {
                Ok(0) => {}
                Ok(purged) => {
                    tracing::info!(purged, "swept expired issuance records");
                    let _ = state.event_tx.send(RegistryEvent::SweepCompleted { purged });
                }
                Err(e) => {
                    // Nothing above us to propagate to; a rejected admin call
                    // needs operator attention, not a retry loop.
                    tracing::error!(err = %e, "broker rejected eviction during sweep");
                }
            }
        }
    });
}

#[cfg(test)]
#[path = "sweeper_tests.rs"]
mod tests;
