// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry event types, fanned out over a broadcast channel.
//!
//! `EvictionFailed` is the operator error channel: it is emitted whenever a
//! broker eviction was suppressed because the management API was unreachable.
//! External error-tracking collaborators subscribe to the channel; the same
//! information is also logged at error level.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Component tag carried on operator error reports.
pub const COMPONENT: &str = "token-revocation";

/// Events emitted by the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A credential issuance was recorded.
    Issued { token_id: Uuid, principal: String, exp: u64 },
    /// A ledger record was deleted (explicit revocation or sweep).
    Revoked { token_id: Uuid, principal: String },
    /// Eviction was attempted but the broker admin API was unreachable.
    /// The deletion itself still succeeded.
    #[serde(rename = "eviction:failed")]
    EvictionFailed { component: String, principal: String, cause: String },
    /// A sweep pass deleted one or more expired records.
    SweepCompleted { purged: usize },
}
