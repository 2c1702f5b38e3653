// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session lifecycle: login, registration, OTP, logout.
//!
//! These are the operations that create and destroy the credential. They go
//! through the same pipeline as everything else; their endpoints are on the
//! public list, so no token is ever attached to them.

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::credential::{jwt, Credential};
use crate::error::ApiError;

/// Login request body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub mobile: String,
    pub password: String,
}

/// Login / registration response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub status: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expiry_time: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

/// Registration request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub mobile_no: String,
    pub email: String,
    pub full_name: String,
    pub gender: Gender,
    pub branch_id: u32,
    pub password: String,
    pub confirm_password: String,
}

/// OTP validation response.
#[derive(Debug, Clone, Deserialize)]
pub struct OtpValidation {
    pub status: bool,
    /// Verified one-time-use access token, when the server issues one.
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default, rename = "msgEN")]
    pub msg_en: Option<String>,
    #[serde(default, rename = "msgAR")]
    pub msg_ar: Option<String>,
}

impl ApiClient {
    /// Log in with mobile number and password. On success the credential is
    /// stored (expiry from `expiryTime`, falling back to the token's `exp`
    /// claim) and the session-expired guard re-arms.
    pub async fn login(&self, mobile: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body =
            LoginRequest { mobile: mobile.to_owned(), password: password.to_owned() };
        let resp = self.send(self.post("/api/externalLogin").json(&body)).await?;
        if !resp.status().is_success() {
            return Err(ApiError::Rejected(format!("login failed ({})", resp.status())));
        }
        let login: LoginResponse = resp.json().await?;
        self.adopt_tokens(&login, "login")?;
        Ok(login)
    }

    /// Register a new user. A token-bearing response logs the user straight
    /// in, same as [`login`](Self::login).
    pub async fn register(&self, body: &RegisterRequest) -> Result<LoginResponse, ApiError> {
        let resp = self.send(self.post("/api/registerExternalUser").json(body)).await?;
        if !resp.status().is_success() {
            return Err(ApiError::Rejected(format!("registration failed ({})", resp.status())));
        }
        let login: LoginResponse = resp.json().await?;
        if login.status && login.token.is_some() {
            self.adopt_tokens(&login, "registration")?;
        }
        Ok(login)
    }

    /// Request an OTP for a mobile number.
    pub async fn request_otp(&self, mobile_no: &str) -> Result<(), ApiError> {
        let builder =
            self.post("/api/requestOtpNumber").query(&[("MobileNo", mobile_no)]);
        let resp = self.send(builder).await?;
        if !resp.status().is_success() {
            return Err(ApiError::Rejected(format!("OTP request failed ({})", resp.status())));
        }
        Ok(())
    }

    /// Validate an OTP. When the server answers with a verified one-time-use
    /// token and a session exists, the access token alone is hot-swapped for
    /// it — the refresh token stays, the expiry is recomputed from the new
    /// token's claims.
    pub async fn validate_otp(
        &self,
        mobile_no: &str,
        otp: &str,
        reset_password: bool,
    ) -> Result<OtpValidation, ApiError> {
        let builder = self.post("/api/ValidateOtpNumber").query(&[
            ("MobileNo", mobile_no),
            ("OtpNumber", otp),
            ("ResetPassword", if reset_password { "true" } else { "false" }),
        ]);
        let resp = self.send(builder).await?;
        if !resp.status().is_success() {
            return Err(ApiError::Rejected(format!(
                "OTP validation failed ({})",
                resp.status()
            )));
        }
        let validation: OtpValidation = resp.json().await?;
        if validation.status {
            if let Some(ref token) = validation.data {
                self.store().swap_access_token(token.clone());
            }
        }
        Ok(validation)
    }

    /// Drop the session. Silent: no boundary event fires.
    pub fn logout(&self) {
        self.store().clear();
        self.notifier().reset();
        tracing::info!("logged out");
    }

    /// Record user activity on the persisted session, pushing out the
    /// inactivity ceiling.
    pub fn record_activity(&self) {
        self.store().touch();
    }

    fn adopt_tokens(&self, login: &LoginResponse, what: &str) -> Result<(), ApiError> {
        let (Some(token), Some(refresh_token)) = (&login.token, &login.refresh_token) else {
            let msg = login.message.clone().unwrap_or_else(|| format!("{what} rejected"));
            return Err(ApiError::Rejected(msg));
        };
        if !login.status {
            let msg = login.message.clone().unwrap_or_else(|| format!("{what} rejected"));
            return Err(ApiError::Rejected(msg));
        }
        let expires_at = login.expiry_time.or_else(|| jwt::expiry(token));
        self.store().set(Credential {
            access_token: token.clone(),
            refresh_token: refresh_token.clone(),
            expires_at,
        });
        self.notifier().reset();
        tracing::info!("session established via {what}");
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
