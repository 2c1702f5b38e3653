// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-request orchestration.
//!
//! Classify the target, keep the credential fresh, attach the bearer token,
//! dispatch, and on a 401 refresh reactively and retry exactly once. Every
//! other status passes through untouched — business errors are not this
//! layer's concern.

use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Request, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use crate::credential::coordinator::{RefreshCoordinator, RefreshOutcome};
use crate::credential::store::CredentialStore;
use crate::endpoint::{EndpointClass, EndpointRules};
use crate::error::ApiError;
use crate::notifier::SessionNotifier;

/// Authorizing request pipeline over a shared HTTP client.
pub struct RequestPipeline {
    http: reqwest::Client,
    rules: EndpointRules,
    store: Arc<CredentialStore>,
    coordinator: Arc<RefreshCoordinator>,
    notifier: Arc<SessionNotifier>,
}

impl RequestPipeline {
    pub fn new(
        http: reqwest::Client,
        rules: EndpointRules,
        store: Arc<CredentialStore>,
        coordinator: Arc<RefreshCoordinator>,
        notifier: Arc<SessionNotifier>,
    ) -> Self {
        Self { http, rules, store, coordinator, notifier }
    }

    /// Build and execute a request through the pipeline.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let request = builder.build()?;
        self.execute(request).await
    }

    /// Execute a request: authorize, dispatch, and handle token expiry.
    ///
    /// Only transport failures and terminal proactive-refresh failures come
    /// back as `Err`; any HTTP response — including a 401 that survived the
    /// one retry — is `Ok` and left for the caller to interpret.
    pub async fn execute(&self, request: Request) -> Result<Response, ApiError> {
        let class = self.rules.classify(request.url().path());

        // Public targets bypass the credential machinery entirely.
        if !class.attaches_bearer() {
            return Ok(self.http.execute(request).await?);
        }

        if self.store.get().is_none() {
            return self.dispatch_unauthenticated(request, class).await;
        }

        // Proactive refresh. A terminal failure has already torn the session
        // down; fail the request with it. A transient failure proceeds with
        // whatever token is stored — connectivity, not credentials, is the
        // likely problem.
        match self.coordinator.ensure_fresh().await {
            RefreshOutcome::Failed(e) if e.is_terminal() => {
                return Err(ApiError::Refresh(e));
            }
            RefreshOutcome::Failed(e) => {
                debug!(err = %e, "proactive refresh failed, proceeding with stored token");
            }
            RefreshOutcome::Refreshed | RefreshOutcome::Skipped => {}
        }

        // Capture a retry clone before the body is consumed. Streaming
        // bodies are not cloneable; those requests simply cannot be retried.
        let retry = request.try_clone();
        let request = self.with_bearer(request);
        let response = self.http.execute(request).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        // Reactive refresh. Joins an in-flight refresh if one raced in from
        // another request. On any failure the *original* 401 propagates, not
        // the refresh error.
        match self.coordinator.force_refresh().await {
            RefreshOutcome::Refreshed => {
                let Some(retry) = retry else {
                    warn!("401 on non-cloneable request, cannot retry");
                    return Ok(response);
                };
                debug!(url = %retry.url(), "retrying once with refreshed token");
                let retry = self.with_bearer(retry);
                Ok(self.http.execute(retry).await?)
            }
            _ => Ok(response),
        }
    }

    /// Dispatch with no session. No refresh is attempted — there is nothing
    /// to refresh. A 401 on an escalating target signals "please log in"
    /// (never session expiry: no session existed to expire).
    async fn dispatch_unauthenticated(
        &self,
        request: Request,
        class: EndpointClass,
    ) -> Result<Response, ApiError> {
        let response = self.http.execute(request).await?;
        if response.status() == StatusCode::UNAUTHORIZED && class.escalates_unauthorized() {
            self.notifier.login_required();
        }
        Ok(response)
    }

    /// Attach the current access token, read from the store at attach time.
    fn with_bearer(&self, mut request: Request) -> Request {
        if let Some(cred) = self.store.get() {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", cred.access_token)) {
                request.headers_mut().insert(AUTHORIZATION, value);
            }
        }
        request
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
