// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session boundary signals.
//!
//! The access layer never renders or navigates. It emits [`SessionEvent`]s
//! over a broadcast channel and the embedding application decides what a
//! redirect or a toast looks like.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;

/// Externally visible session signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session was terminated because the refresh token was rejected.
    /// Emitted at most once per session, however many requests were waiting.
    Expired,
    /// A refresh (or re-login) produced a fresh credential.
    Refreshed,
    /// A protected request was rejected and no session existed to expire.
    LoginRequired,
}

/// Fans session signals out to subscribers, deduplicating the expiry signal.
pub struct SessionNotifier {
    tx: broadcast::Sender<SessionEvent>,
    expired_signaled: AtomicBool,
}

impl SessionNotifier {
    pub fn new() -> (Self, broadcast::Receiver<SessionEvent>) {
        let (tx, rx) = broadcast::channel(16);
        (Self { tx, expired_signaled: AtomicBool::new(false) }, rx)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Signal session expiry. Swallowed if already signaled since the last
    /// [`reset`](Self::reset) — five waiters rejecting together must not
    /// produce five toasts.
    pub fn session_expired(&self) {
        if self.expired_signaled.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.tx.send(SessionEvent::Expired);
    }

    /// Signal that a fresh credential is in place. Re-arms the expiry signal.
    pub fn session_refreshed(&self) {
        self.expired_signaled.store(false, Ordering::SeqCst);
        let _ = self.tx.send(SessionEvent::Refreshed);
    }

    /// Signal that an unauthenticated user hit a protected endpoint.
    pub fn login_required(&self) {
        let _ = self.tx.send(SessionEvent::LoginRequired);
    }

    /// Re-arm the expiry signal without emitting anything (new login).
    pub fn reset(&self) {
        self.expired_signaled.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "notifier_tests.rs"]
mod tests;
