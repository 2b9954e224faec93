// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential issuance ledger: one record per issued token.
//!
//! A record exists for the lifetime of its token's validity window. Once a
//! record is deleted — explicit revocation or the expiry sweep — the token
//! must be treated as invalid everywhere, even if it has not
//! cryptographically expired yet. Every deletion synchronously runs the
//! revocation coordinator before it is considered complete; eviction
//! failures never roll the deletion back.

pub mod persist;

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::broker::BrokerAdminError;
use crate::revocation::RevocationCoordinator;

/// A persisted entry representing one granted access credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuanceRecord {
    pub id: Uuid,
    /// The device the credential was minted for.
    pub device_id: u64,
    /// Expiry as epoch seconds.
    pub exp: u64,
    /// Issuance time as epoch seconds.
    pub issued_at: u64,
    /// Opaque issuance metadata (arbitrary claims). Note: no per-token
    /// session identifier is tracked, so eviction is per-principal.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub claims: serde_json::Value,
}

/// The issuance ledger: in-memory store with optional JSON persistence.
pub struct Ledger {
    records: RwLock<HashMap<Uuid, IssuanceRecord>>,
    persist_path: Option<PathBuf>,
    coordinator: RevocationCoordinator,
}

impl Ledger {
    pub fn new(coordinator: RevocationCoordinator, persist_path: Option<PathBuf>) -> Self {
        Self { records: RwLock::new(HashMap::new()), persist_path, coordinator }
    }

    /// Load previously persisted records. Called once at startup, before
    /// the sweeper or any API traffic can mutate the ledger.
    pub async fn load_persisted(&self) {
        let Some(ref path) = self.persist_path else {
            return;
        };
        let persisted = match persist::load(path) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(path = %path.display(), "no persisted ledger: {e}");
                return;
            }
        };

        let mut records = self.records.write().await;
        let count = persisted.records.len();
        for record in persisted.records {
            records.insert(record.id, record);
        }
        if count > 0 {
            tracing::info!(count, path = %path.display(), "loaded persisted ledger");
        }
    }

    /// Record a new issuance. No side effects beyond storage: creation
    /// never touches the broker.
    pub async fn record(
        &self,
        device_id: u64,
        exp: u64,
        issued_at: u64,
        claims: serde_json::Value,
    ) -> IssuanceRecord {
        let record = IssuanceRecord { id: Uuid::new_v4(), device_id, exp, issued_at, claims };
        self.records.write().await.insert(record.id, record.clone());
        self.persist_snapshot().await;

        let principal = self.coordinator.principal_for(device_id);
        tracing::info!(token_id = %record.id, principal = %principal, exp, "issuance recorded");
        record
    }

    /// Broker principal name for a device, using the same convention the
    /// eviction side uses.
    pub fn principal_for(&self, device_id: u64) -> String {
        self.coordinator.principal_for(device_id)
    }

    pub async fn get(&self, id: Uuid) -> Option<IssuanceRecord> {
        self.records.read().await.get(&id).cloned()
    }

    pub async fn list(&self) -> Vec<IssuanceRecord> {
        self.records.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// All records whose expiry is strictly before `now`.
    pub async fn expired(&self, now: u64) -> Vec<IssuanceRecord> {
        self.records.read().await.values().filter(|r| r.exp < now).cloned().collect()
    }

    /// Existence check, short-circuits on the first expired record.
    pub async fn any_expired(&self, now: u64) -> bool {
        self.records.read().await.values().any(|r| r.exp < now)
    }

    /// Explicitly revoke a single record.
    ///
    /// Returns `Ok(false)` when the record is already gone (a no-op, so
    /// revocation is safe under at-least-once scheduling). The record is
    /// deleted before the eviction attempt, and stays deleted whatever the
    /// coordinator returns; only a rejected broker call propagates.
    pub async fn revoke(&self, id: Uuid) -> Result<bool, BrokerAdminError> {
        let removed = self.records.write().await.remove(&id);
        let Some(record) = removed else {
            return Ok(false);
        };
        self.persist_snapshot().await;

        self.coordinator.on_revoked(&record).await?;
        Ok(true)
    }

    /// Delete every record expired as of `now`, evicting per record.
    ///
    /// Each record is deleted and evicted independently so one principal's
    /// failure never blocks another's. A rejected broker call is surfaced
    /// only after the whole pass; all deletions stand regardless.
    pub async fn purge_expired(&self, now: u64) -> Result<usize, BrokerAdminError> {
        let expired = self.expired(now).await;
        if expired.is_empty() {
            return Ok(0);
        }

        let mut purged = 0usize;
        let mut rejection: Option<BrokerAdminError> = None;
        for record in expired {
            // Re-check under the write lock: a concurrent revocation or an
            // overlapping sweep may have deleted this record already.
            let removed = self.records.write().await.remove(&record.id);
            let Some(record) = removed else {
                continue;
            };
            purged += 1;
            if let Err(e) = self.coordinator.on_revoked(&record).await {
                rejection.get_or_insert(e);
            }
        }
        self.persist_snapshot().await;

        match rejection {
            Some(e) => Err(e),
            None => Ok(purged),
        }
    }

    /// Write the current ledger to disk, if persistence is configured.
    /// A failed write is logged and never fails the mutation that caused it.
    async fn persist_snapshot(&self) {
        let Some(ref path) = self.persist_path else {
            return;
        };
        let snapshot = {
            let records = self.records.read().await;
            persist::PersistedLedger { records: records.values().cloned().collect() }
        };
        if let Err(e) = persist::save(path, &snapshot) {
            tracing::warn!(path = %path.display(), err = %e, "failed to persist ledger");
        }
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
