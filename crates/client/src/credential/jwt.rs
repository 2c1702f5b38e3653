// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal JWT payload inspection.
//!
//! The refresh endpoint may omit `expiryTime`, in which case the expiry
//! comes from the `exp` claim embedded in the access token itself. No
//! signature verification happens here — the server already vouched for
//! the token, we only read the timestamp back out.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};

/// Extract the `exp` claim (seconds since epoch) from a JWT access token.
///
/// Returns `None` for anything that is not a decodable three-segment JWT
/// with a numeric `exp`.
pub fn expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?.as_i64()?;
    DateTime::from_timestamp(exp, 0)
}

#[cfg(test)]
#[path = "jwt_tests.rs"]
mod tests;
