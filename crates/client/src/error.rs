// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the access layer.

use std::fmt;

/// Failure of a token refresh call.
///
/// Clone because a single refresh outcome fans out to every waiter that
/// joined the in-flight call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    /// Transport failure or timeout: no HTTP status was received.
    Network(String),
    /// The refresh endpoint returned 401.
    AuthRejected,
    /// The refresh endpoint returned 400: the refresh token itself is
    /// invalid or expired.
    BadRequest,
    /// Any other non-success HTTP status.
    Unclassified(u16),
}

impl RefreshError {
    /// Terminal failures invalidate the session: the credential store is
    /// cleared and the session-expired signal fires. Transient failures
    /// (connectivity) leave the stored credential alone.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::AuthRejected | Self::BadRequest)
    }
}

impl fmt::Display for RefreshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network: {msg}"),
            Self::AuthRejected => f.write_str("refresh rejected (401)"),
            Self::BadRequest => f.write_str("refresh token invalid (400)"),
            Self::Unclassified(status) => write!(f, "refresh failed with status {status}"),
        }
    }
}

impl std::error::Error for RefreshError {}

/// Per-request failure surfaced by the pipeline and session operations.
#[derive(Debug)]
pub enum ApiError {
    /// Transport failure on the request itself.
    Transport(reqwest::Error),
    /// A proactive refresh failed terminally before the request was sent.
    Refresh(RefreshError),
    /// The server answered 2xx but marked the operation unsuccessful
    /// (login/OTP responses carry a `status` flag and a message).
    Rejected(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Refresh(e) => write!(f, "refresh: {e}"),
            Self::Rejected(msg) => write!(f, "rejected: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            Self::Refresh(e) => Some(e),
            Self::Rejected(_) => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
