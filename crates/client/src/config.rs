// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration with serde defaults.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::endpoint::EndpointRules;

/// Default grace window before expiry at which a token counts as stale
/// (2 minutes; some deployments raise this).
const DEFAULT_GRACE_SECS: u64 = 120;

/// Default timeout on the refresh network call.
const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 30;

/// Default per-request timeout for the underlying HTTP client.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// A persisted session older than this (by last activity) is discarded
/// on startup regardless of token expiry (7 days).
const DEFAULT_INACTIVITY_CEILING_SECS: u64 = 7 * 24 * 60 * 60;

/// Configuration for the storefront API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the API, e.g. `https://shop.example.com`.
    pub base_url: String,

    /// Path of the token refresh endpoint, joined onto `base_url`.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,

    /// Seconds before expiry at which a proactive refresh triggers.
    #[serde(default = "default_grace_secs")]
    pub grace_secs: u64,

    /// Timeout in seconds for the refresh call itself.
    #[serde(default = "default_refresh_timeout_secs")]
    pub refresh_timeout_secs: u64,

    /// Per-request timeout in seconds for the HTTP client.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum inactivity in seconds before a persisted session is discarded.
    #[serde(default = "default_inactivity_ceiling_secs")]
    pub inactivity_ceiling_secs: u64,

    /// Path to persist the session (JSON file). When set, the session is
    /// written after every credential change and restored on startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persist_path: Option<PathBuf>,

    /// Endpoint classification lists. Defaults cover the storefront API.
    #[serde(default)]
    pub endpoints: EndpointRules,
}

fn default_refresh_path() -> String {
    "/api/refresh-token".to_owned()
}

fn default_grace_secs() -> u64 {
    DEFAULT_GRACE_SECS
}

fn default_refresh_timeout_secs() -> u64 {
    DEFAULT_REFRESH_TIMEOUT_SECS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_inactivity_ceiling_secs() -> u64 {
    DEFAULT_INACTIVITY_CEILING_SECS
}

impl ClientConfig {
    /// Config with defaults for everything but the base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            refresh_path: default_refresh_path(),
            grace_secs: default_grace_secs(),
            refresh_timeout_secs: default_refresh_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            inactivity_ceiling_secs: default_inactivity_ceiling_secs(),
            persist_path: None,
            endpoints: EndpointRules::default(),
        }
    }

    /// Full URL of the refresh endpoint.
    pub fn refresh_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.refresh_path)
    }

    pub fn grace(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.grace_secs as i64)
    }

    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn inactivity_ceiling(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.inactivity_ceiling_secs as i64)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
