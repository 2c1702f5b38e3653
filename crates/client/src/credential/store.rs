// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable holder of the current credential.
//!
//! The in-memory view is authoritative for the lifetime of the process.
//! Disk persistence is best-effort: a failed write is logged and swallowed,
//! never surfaced to callers.

use std::path::PathBuf;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::credential::persist::{self, PersistedSession};
use crate::credential::{jwt, Credential, SessionState};

/// Thread-safe credential store. All operations are synchronous; the whole
/// credential is swapped under one write lock, so a reader never observes a
/// new access token paired with an old refresh token.
pub struct CredentialStore {
    inner: RwLock<Option<Credential>>,
    persist_path: Option<PathBuf>,
    /// Serializes file writes and removals. What lands on disk is decided
    /// from a snapshot of `inner` taken under this gate, so a save racing a
    /// `clear` cannot resurrect the removed session file.
    persist_gate: Mutex<()>,
}

impl CredentialStore {
    /// Empty store with no persistence.
    pub fn new() -> Self {
        Self { inner: RwLock::new(None), persist_path: None, persist_gate: Mutex::new(()) }
    }

    /// Store backed by a session file. Restores a persisted session unless
    /// its last activity is older than `inactivity_ceiling`, in which case
    /// the stale session is discarded on the spot.
    pub fn open(persist_path: Option<PathBuf>, inactivity_ceiling: chrono::Duration) -> Self {
        let mut restored = None;
        if let Some(ref path) = persist_path {
            match persist::load(path) {
                Ok(session) => {
                    if session.stale_by_inactivity(inactivity_ceiling, Utc::now()) {
                        info!(path = %path.display(), "persisted session too old, discarding");
                        if let Err(e) = persist::remove(path) {
                            warn!(err = %e, "failed to remove stale session file");
                        }
                    } else {
                        restored = Some(Credential {
                            access_token: session.access_token,
                            refresh_token: session.refresh_token,
                            expires_at: session.expiry_time,
                        });
                        info!(path = %path.display(), "restored persisted session");
                    }
                }
                Err(e) => {
                    debug!(err = %e, "no persisted session");
                }
            }
        }
        Self { inner: RwLock::new(restored), persist_path, persist_gate: Mutex::new(()) }
    }

    /// Current credential, if any. Callers must not cache the result beyond
    /// a single request.
    pub fn get(&self) -> Option<Credential> {
        self.inner.read().clone()
    }

    /// Replace the credential. Access and refresh token always land together.
    pub fn set(&self, credential: Credential) {
        {
            let mut inner = self.inner.write();
            *inner = Some(credential);
        }
        self.persist_current();
    }

    /// Hot-swap the access token alone for a verified one-time-use token
    /// (post-OTP). The refresh token is kept and the expiry is recomputed
    /// from the new token's own `exp` claim. No-op without a session.
    pub fn swap_access_token(&self, access_token: String) {
        let swapped = {
            let mut inner = self.inner.write();
            match inner.as_mut() {
                Some(cred) => {
                    cred.expires_at = jwt::expiry(&access_token);
                    cred.access_token = access_token;
                    true
                }
                None => false,
            }
        };
        if swapped {
            self.persist_current();
        }
    }

    /// Drop the credential and the session file.
    pub fn clear(&self) {
        let _gate = self.persist_gate.lock();
        {
            let mut inner = self.inner.write();
            *inner = None;
        }
        if let Some(ref path) = self.persist_path {
            if let Err(e) = persist::remove(path) {
                warn!(err = %e, "failed to remove session file");
            }
        }
    }

    /// Whether the credential is within `grace` of expiry. An absent
    /// credential is not stale — there is nothing to refresh.
    pub fn is_stale(&self, grace: chrono::Duration) -> bool {
        match self.inner.read().as_ref() {
            Some(cred) => cred.is_stale(grace, Utc::now()),
            None => false,
        }
    }

    /// Session state derived from credential presence. Expiry does not
    /// demote a session to anonymous.
    pub fn state(&self) -> SessionState {
        if self.inner.read().is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    /// Record activity on the persisted session without changing tokens.
    pub fn touch(&self) {
        self.persist_current();
    }

    /// Write the current credential to the session file, if any. The
    /// snapshot is taken under the persist gate: a credential cleared by the
    /// time the gate is acquired is not written back out.
    fn persist_current(&self) {
        let Some(ref path) = self.persist_path else {
            return;
        };
        let _gate = self.persist_gate.lock();
        let Some(credential) = self.inner.read().clone() else {
            return;
        };
        let session = PersistedSession {
            access_token: credential.access_token,
            refresh_token: credential.refresh_token,
            expiry_time: credential.expires_at,
            last_activity: Utc::now(),
        };
        if let Err(e) = persist::save(path, &session) {
            warn!(path = %path.display(), err = %e, "failed to persist session");
        }
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
