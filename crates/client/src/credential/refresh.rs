// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The token refresh wire call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::credential::Credential;
use crate::error::RefreshError;

/// Request body for the refresh endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    access_token: &'a str,
    refresh_token: &'a str,
}

/// Success body from the refresh endpoint. `expiryTime` is optional; when
/// absent the caller falls back to the `exp` claim in the access token.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expiry_time: Option<DateTime<Utc>>,
}

/// Perform a single refresh request.
///
/// Status mapping: 400 means the refresh token itself is dead, 401 means the
/// server rejected the pair, anything else non-2xx is unclassified, and a
/// transport failure never saw a status at all.
pub async fn do_refresh(
    client: &reqwest::Client,
    url: &str,
    credential: &Credential,
) -> Result<RefreshResponse, RefreshError> {
    let body = RefreshRequest {
        access_token: &credential.access_token,
        refresh_token: &credential.refresh_token,
    };

    let resp = client
        .post(url)
        .json(&body)
        .send()
        .await
        .map_err(|e| RefreshError::Network(e.to_string()))?;

    let status = resp.status();
    match status.as_u16() {
        400 => Err(RefreshError::BadRequest),
        401 => Err(RefreshError::AuthRejected),
        s if !status.is_success() => Err(RefreshError::Unclassified(s)),
        _ => resp.json::<RefreshResponse>().await.map_err(|e| {
            RefreshError::Network(format!("malformed refresh response: {e}"))
        }),
    }
}
