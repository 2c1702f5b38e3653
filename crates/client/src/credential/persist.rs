// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session persistence: load/save to a JSON file with atomic writes.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted session layout.
///
/// Field names match the storage keys the web client used, so a session
/// file survives a client swap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(rename = "expiryTimeISO", default, skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<DateTime<Utc>>,
    #[serde(rename = "lastActivityISO")]
    pub last_activity: DateTime<Utc>,
}

impl PersistedSession {
    /// Whether the session sat unused longer than the inactivity ceiling.
    /// Independent of token expiry.
    pub fn stale_by_inactivity(&self, ceiling: chrono::Duration, now: DateTime<Utc>) -> bool {
        now - self.last_activity > ceiling
    }
}

/// Load a persisted session from a JSON file.
pub fn load(path: &Path) -> anyhow::Result<PersistedSession> {
    let contents = std::fs::read_to_string(path)?;
    let session: PersistedSession = serde_json::from_str(&contents)?;
    Ok(session)
}

/// Save a session to a JSON file atomically (write tmp + rename).
///
/// Uses a unique temp filename (PID + counter) to avoid corruption when
/// concurrent saves race on the same `.tmp` file — a shorter write can leave
/// trailing bytes from a longer previous write.
pub fn save(path: &Path, session: &PersistedSession) -> anyhow::Result<()> {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let json = serde_json::to_string_pretty(session)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_name = format!(
        "{}.{}.{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy(),
        std::process::id(),
        seq,
    );
    let tmp = path.with_file_name(tmp_name);
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Remove a persisted session. Missing file is fine.
pub fn remove(path: &Path) -> anyhow::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "persist_tests.rs"]
mod tests;
