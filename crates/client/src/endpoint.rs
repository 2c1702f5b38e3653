// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Endpoint classification: which requests carry a bearer token and which
//! 401s mean "log in".
//!
//! Classification is a pure substring match against three static lists,
//! evaluated public-first: a target on the public list is public even if it
//! also matches a protected pattern. Unlisted targets get a token when a
//! session exists but also escalate a 401 like a protected endpoint.

use serde::{Deserialize, Serialize};

/// Classification of a request target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointClass {
    /// Never authorized, even with a valid session.
    Public,
    /// Guest-usable; authorized when a session exists.
    OptionalAuth,
    /// Requires auth; a 401 without a session means "log in".
    Protected,
    /// Not on any list. Treated like [`OptionalAuth`](Self::OptionalAuth)
    /// for token attachment and like [`Protected`](Self::Protected) for
    /// 401 escalation.
    Unlisted,
}

impl EndpointClass {
    /// Whether a bearer token is attached when a credential exists.
    pub fn attaches_bearer(self) -> bool {
        !matches!(self, Self::Public)
    }

    /// Whether an unauthenticated 401 should steer the user to login.
    pub fn escalates_unauthorized(self) -> bool {
        matches!(self, Self::Protected | Self::Unlisted)
    }
}

/// Endpoint pattern lists, matched by substring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointRules {
    #[serde(default = "default_public")]
    pub public: Vec<String>,
    #[serde(default = "default_optional_auth")]
    pub optional_auth: Vec<String>,
    #[serde(default = "default_protected")]
    pub protected: Vec<String>,
}

fn default_public() -> Vec<String> {
    to_owned(&[
        "/externalLogin",
        "/refresh-token",
        "/requestOtpNumber",
        "/ValidateOtpNumber",
        "/registerExternalUser",
        "/GetBranches",
        "/GetProducts",
        "/GetProductById",
        "/GetCategories",
        "/GetCategoryById",
    ])
}

fn default_optional_auth() -> Vec<String> {
    to_owned(&["/GetProducts", "/GetProductById", "/GetCategories"])
}

fn default_protected() -> Vec<String> {
    to_owned(&[
        "/AddItemCart",
        "/UpdateItemCart",
        "/DeleteItemCart",
        "/DeleteAllItemCart",
        "/GetItemsCart",
        "/Checkout",
        "/GetOrders",
        "/GetUserProfile",
    ])
}

fn to_owned(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| (*p).to_owned()).collect()
}

impl Default for EndpointRules {
    fn default() -> Self {
        Self {
            public: default_public(),
            optional_auth: default_optional_auth(),
            protected: default_protected(),
        }
    }
}

impl EndpointRules {
    /// Classify a request target. Precedence: public, then optional-auth,
    /// then protected; anything else is unlisted.
    pub fn classify(&self, target: &str) -> EndpointClass {
        if matches_any(&self.public, target) {
            EndpointClass::Public
        } else if matches_any(&self.optional_auth, target) {
            EndpointClass::OptionalAuth
        } else if matches_any(&self.protected, target) {
            EndpointClass::Protected
        } else {
            EndpointClass::Unlisted
        }
    }
}

fn matches_any(patterns: &[String], target: &str) -> bool {
    patterns.iter().any(|p| target.contains(p.as_str()))
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod tests;
