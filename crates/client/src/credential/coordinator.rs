// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-flight refresh coordination.
//!
//! However many requests race against a stale credential, exactly one
//! refresh network call goes out; everyone else subscribes to its outcome.
//! The coordinator is either idle (`inflight` is `None`) or refreshing
//! (`inflight` holds the broadcast sender every waiter subscribes to). The
//! check-then-set of "am I the first to start a refresh" happens under the
//! one mutex, which keeps the invariant even off a single-threaded runtime.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::credential::refresh::do_refresh;
use crate::credential::store::CredentialStore;
use crate::credential::Credential;
use crate::credential::jwt;
use crate::error::RefreshError;
use crate::notifier::SessionNotifier;

/// Outcome of a refresh cycle, fanned out to every waiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new credential was written to the store.
    Refreshed,
    /// The credential was not stale; nothing happened.
    Skipped,
    /// The refresh failed. Terminal failures have already torn the
    /// session down by the time waiters see this.
    Failed(RefreshError),
}

/// Owns the in-flight refresh ticket and the waiter fan-out.
pub struct RefreshCoordinator {
    store: Arc<CredentialStore>,
    notifier: Arc<SessionNotifier>,
    http: reqwest::Client,
    refresh_url: String,
    grace: chrono::Duration,
    timeout: Duration,
    /// `Some` while a refresh call is in flight. Subscribing to the sender
    /// is how a caller becomes a waiter on that call.
    inflight: Mutex<Option<broadcast::Sender<RefreshOutcome>>>,
}

impl RefreshCoordinator {
    pub fn new(
        config: &ClientConfig,
        http: reqwest::Client,
        store: Arc<CredentialStore>,
        notifier: Arc<SessionNotifier>,
    ) -> Self {
        Self {
            store,
            notifier,
            http,
            refresh_url: config.refresh_url(),
            grace: config.grace(),
            timeout: config.refresh_timeout(),
            inflight: Mutex::new(None),
        }
    }

    /// Refresh the credential if it is stale (within the grace window).
    ///
    /// Joins an in-flight refresh when one exists — no second network call
    /// is issued. Resolves immediately with [`RefreshOutcome::Skipped`] when
    /// the credential is fresh.
    pub async fn ensure_fresh(&self) -> RefreshOutcome {
        let mut slot = self.inflight.lock().await;
        if let Some(tx) = slot.as_ref() {
            let rx = tx.subscribe();
            drop(slot);
            return wait_for_outcome(rx).await;
        }
        if !self.store.is_stale(self.grace) {
            return RefreshOutcome::Skipped;
        }
        let tx = take_ticket(&mut slot);
        drop(slot);
        self.drive(tx).await
    }

    /// Refresh unconditionally — a 401 means the token is invalid *now*,
    /// whatever the locally tracked expiry says. Same single-flight
    /// discipline as [`ensure_fresh`](Self::ensure_fresh).
    pub async fn force_refresh(&self) -> RefreshOutcome {
        let mut slot = self.inflight.lock().await;
        if let Some(tx) = slot.as_ref() {
            let rx = tx.subscribe();
            drop(slot);
            return wait_for_outcome(rx).await;
        }
        let tx = take_ticket(&mut slot);
        drop(slot);
        self.drive(tx).await
    }

    /// Whether a refresh call is currently in flight.
    pub async fn is_refreshing(&self) -> bool {
        self.inflight.lock().await.is_some()
    }

    /// Run the refresh as the leader, then release the ticket and fan the
    /// outcome out. The ticket is cleared unconditionally — success or
    /// failure — so the coordinator can never stick in the refreshing state.
    /// The store is updated *before* the ticket clears, so a caller that
    /// arrives after release re-checks staleness against the new credential
    /// and every waiter resumes observing it.
    async fn drive(&self, tx: broadcast::Sender<RefreshOutcome>) -> RefreshOutcome {
        let outcome = self.run_refresh().await;
        *self.inflight.lock().await = None;
        let _ = tx.send(outcome.clone());
        outcome
    }

    async fn run_refresh(&self) -> RefreshOutcome {
        let Some(credential) = self.store.get() else {
            return RefreshOutcome::Failed(RefreshError::Network(
                "no credential to refresh".to_owned(),
            ));
        };

        let call = do_refresh(&self.http, &self.refresh_url, &credential);
        let result = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(RefreshError::Network(format!(
                "refresh timed out after {:?}",
                self.timeout
            ))),
        };

        match result {
            Ok(resp) => {
                let expires_at = resp.expiry_time.or_else(|| jwt::expiry(&resp.access_token));
                self.store.set(Credential {
                    access_token: resp.access_token,
                    refresh_token: resp.refresh_token,
                    expires_at,
                });
                self.notifier.session_refreshed();
                debug!("credential refreshed");
                RefreshOutcome::Refreshed
            }
            Err(e) if e.is_terminal() => {
                // The refresh token itself is dead. Tear the session down
                // and signal expiry once, however many waiters reject.
                self.store.clear();
                self.notifier.session_expired();
                warn!(err = %e, "refresh rejected, session terminated");
                RefreshOutcome::Failed(e)
            }
            Err(e) => {
                // Connectivity, not credentials. The stored token survives.
                warn!(err = %e, "refresh failed transiently");
                RefreshOutcome::Failed(e)
            }
        }
    }
}

/// Install a fresh ticket in the (locked) slot and return the sender.
fn take_ticket(
    slot: &mut Option<broadcast::Sender<RefreshOutcome>>,
) -> broadcast::Sender<RefreshOutcome> {
    let (tx, _rx) = broadcast::channel(1);
    *slot = Some(tx.clone());
    tx
}

/// Wait on an in-flight refresh as a subscriber. A closed channel means the
/// leader was dropped before resolving; report that as a transient failure
/// rather than hanging.
async fn wait_for_outcome(
    mut rx: broadcast::Receiver<RefreshOutcome>,
) -> RefreshOutcome {
    match rx.recv().await {
        Ok(outcome) => outcome,
        Err(_) => RefreshOutcome::Failed(RefreshError::Network(
            "refresh abandoned before completion".to_owned(),
        )),
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
