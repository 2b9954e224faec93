// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ledger persistence: load/save to JSON file with atomic writes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ledger::IssuanceRecord;

/// Persisted snapshot of the issuance ledger.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PersistedLedger {
    pub records: Vec<IssuanceRecord>,
}

/// Load a persisted ledger from a JSON file.
pub fn load(path: &Path) -> anyhow::Result<PersistedLedger> {
    let contents = std::fs::read_to_string(path)?;
    let ledger: PersistedLedger = serde_json::from_str(&contents)?;
    Ok(ledger)
}

/// Save the ledger to a JSON file atomically (write tmp + rename).
///
/// Uses a unique temp filename (PID + counter) to avoid corruption when
/// concurrent saves race on the same `.tmp` file; a shorter write can leave
/// trailing bytes from a longer previous write.
pub fn save(path: &Path, ledger: &PersistedLedger) -> anyhow::Result<()> {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let json = serde_json::to_string_pretty(ledger)?;
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_name = format!(
        "{}.{}.{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy(),
        std::process::id(),
        seq,
    );
    let tmp_path = path.with_file_name(tmp_name);
    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "persist_tests.rs"]
mod tests;
