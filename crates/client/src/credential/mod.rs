// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential ownership and freshness.
//!
//! [`store::CredentialStore`] is the only holder of the live credential;
//! everything else reads through it and never caches a token beyond one
//! request. [`coordinator::RefreshCoordinator`] owns the single-flight
//! refresh protocol.

pub mod coordinator;
pub mod jwt;
pub mod persist;
pub mod refresh;
pub mod store;

use chrono::{DateTime, Utc};

/// The bearer credential: access and refresh token plus tracked expiry.
///
/// Both tokens are always replaced together. The one exception is the
/// access-token hot-swap after an OTP validation, which recomputes the
/// expiry from the new token's own `exp` claim
/// (see [`store::CredentialStore::swap_access_token`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    /// Tracked expiry. `None` means the server gave no expiry and the token
    /// carried no `exp` claim; such a credential is never proactively stale.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Whether the credential is within `grace` of its expiry (or past it).
    pub fn is_stale(&self, grace: chrono::Duration, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at - grace,
            None => false,
        }
    }
}

/// Derived session state. Presence of a credential is what makes a session;
/// expiry is a refresh concern, not an authentication concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}
