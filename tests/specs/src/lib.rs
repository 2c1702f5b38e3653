// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end access-layer flows.
//!
//! Runs an in-process mock of the storefront API: login issues a JWT, the
//! refresh endpoint rotates it, and the cart endpoints only honor the
//! current one. Flow tests drive a real [`souk::ApiClient`] against it.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Router;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use tokio::net::TcpListener;

/// The credentials the mock accepts on login.
pub const TEST_MOBILE: &str = "0500000000";
pub const TEST_PASSWORD: &str = "secret";

/// Build an unsigned JWT whose `exp` claim is `ttl` from now. The sequence
/// number keeps successive tokens distinct.
pub fn issue_jwt(seq: u32, ttl: Duration) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let exp = (Utc::now() + ttl).timestamp();
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"seq":{seq},"exp":{exp}}}"#));
    format!("{header}.{payload}.sig")
}

/// In-process storefront API.
pub struct MockStorefront {
    pub addr: SocketAddr,
    /// Number of calls the refresh endpoint has served.
    pub refresh_calls: Arc<AtomicU32>,
    /// The access token the protected endpoints currently accept.
    pub valid_token: Arc<Mutex<String>>,
    refresh_enabled: Arc<AtomicBool>,
}

impl MockStorefront {
    pub async fn start() -> Self {
        let refresh_calls = Arc::new(AtomicU32::new(0));
        let valid_token = Arc::new(Mutex::new(String::new()));
        let refresh_enabled = Arc::new(AtomicBool::new(true));
        let token_seq = Arc::new(AtomicU32::new(0));

        let login = {
            let valid = Arc::clone(&valid_token);
            let seq = Arc::clone(&token_seq);
            move |body: String| {
                let valid = Arc::clone(&valid);
                let seq = Arc::clone(&seq);
                async move {
                    let parsed: serde_json::Value =
                        serde_json::from_str(&body).unwrap_or_default();
                    let mobile = parsed.get("mobile").and_then(|v| v.as_str());
                    let password = parsed.get("password").and_then(|v| v.as_str());
                    if mobile != Some(TEST_MOBILE) || password != Some(TEST_PASSWORD) {
                        return serde_json::json!({
                            "status": false,
                            "message": "invalid credentials",
                        })
                        .to_string();
                    }
                    let n = seq.fetch_add(1, Ordering::Relaxed) + 1;
                    let token = issue_jwt(n, Duration::hours(1));
                    *valid.lock() = token.clone();
                    serde_json::json!({
                        "status": true,
                        "token": token,
                        "refreshToken": format!("refresh-{n}"),
                    })
                    .to_string()
                }
            }
        };

        let refresh = {
            let valid = Arc::clone(&valid_token);
            let calls = Arc::clone(&refresh_calls);
            let enabled = Arc::clone(&refresh_enabled);
            let seq = Arc::clone(&token_seq);
            move |_body: String| {
                let valid = Arc::clone(&valid);
                let calls = Arc::clone(&calls);
                let enabled = Arc::clone(&enabled);
                let seq = Arc::clone(&seq);
                async move {
                    calls.fetch_add(1, Ordering::Relaxed);
                    if !enabled.load(Ordering::Relaxed) {
                        return (axum::http::StatusCode::BAD_REQUEST, "{}".to_owned());
                    }
                    let n = seq.fetch_add(1, Ordering::Relaxed) + 1;
                    let token = issue_jwt(n, Duration::hours(1));
                    *valid.lock() = token.clone();
                    let body = serde_json::json!({
                        "accessToken": token,
                        "refreshToken": format!("refresh-{n}"),
                        "expiryTime": (Utc::now() + Duration::hours(1)).to_rfc3339(),
                    })
                    .to_string();
                    (axum::http::StatusCode::OK, body)
                }
            }
        };

        let protected = {
            let valid = Arc::clone(&valid_token);
            move |headers: HeaderMap| {
                let valid = Arc::clone(&valid);
                async move {
                    let expected = format!("Bearer {}", valid.lock());
                    let presented = headers
                        .get(axum::http::header::AUTHORIZATION)
                        .and_then(|v| v.to_str().ok());
                    let authorized =
                        !valid.lock().is_empty() && presented == Some(expected.as_str());
                    if authorized {
                        (axum::http::StatusCode::OK, "[]".to_owned())
                    } else {
                        (axum::http::StatusCode::UNAUTHORIZED, "{}".to_owned())
                    }
                }
            }
        };

        let app = Router::new()
            .route("/api/externalLogin", post(login))
            .route("/api/refresh-token", post(refresh))
            .route("/api/GetItemsCart", get(protected.clone()))
            .route("/api/AddItemCart", post(protected))
            .route("/api/GetCategories", get(|| async { "[]".to_owned() }));

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { addr, refresh_calls, valid_token, refresh_enabled }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Simulate server-side revocation: every refresh from now on gets 400.
    pub fn revoke_refresh(&self) {
        self.refresh_enabled.store(false, Ordering::Relaxed);
    }
}
