// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wiring: config in, fully assembled access layer out.

use std::sync::Arc;

use reqwest::{RequestBuilder, Response};
use tokio::sync::broadcast;

use crate::config::ClientConfig;
use crate::credential::coordinator::RefreshCoordinator;
use crate::credential::store::CredentialStore;
use crate::credential::SessionState;
use crate::error::ApiError;
use crate::notifier::{SessionEvent, SessionNotifier};
use crate::pipeline::RequestPipeline;

/// The storefront API client: a request pipeline plus session lifecycle.
///
/// Cheap to share behind an `Arc`. Every dependency is injected explicitly;
/// tests substitute an in-memory store and a mock server by construction.
pub struct ApiClient {
    config: ClientConfig,
    http: reqwest::Client,
    store: Arc<CredentialStore>,
    notifier: Arc<SessionNotifier>,
    coordinator: Arc<RefreshCoordinator>,
    pipeline: RequestPipeline,
}

impl ApiClient {
    /// Build a client from config. Restores a persisted session when a
    /// persist path is configured. The returned receiver carries session
    /// boundary events (expiry, refresh, login-required).
    pub fn new(config: ClientConfig) -> anyhow::Result<(Self, broadcast::Receiver<SessionEvent>)> {
        let http = reqwest::Client::builder().timeout(config.request_timeout()).build()?;

        let store = Arc::new(CredentialStore::open(
            config.persist_path.clone(),
            config.inactivity_ceiling(),
        ));
        let (notifier, event_rx) = SessionNotifier::new();
        let notifier = Arc::new(notifier);

        let coordinator = Arc::new(RefreshCoordinator::new(
            &config,
            http.clone(),
            Arc::clone(&store),
            Arc::clone(&notifier),
        ));
        let pipeline = RequestPipeline::new(
            http.clone(),
            config.endpoints.clone(),
            Arc::clone(&store),
            Arc::clone(&coordinator),
            Arc::clone(&notifier),
        );

        Ok((Self { config, http, store, notifier, coordinator, pipeline }, event_rx))
    }

    /// Subscribe to session boundary events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.notifier.subscribe()
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    pub fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }

    pub(crate) fn notifier(&self) -> &Arc<SessionNotifier> {
        &self.notifier
    }

    /// Whether a session exists. Expiry does not affect this.
    pub fn session_state(&self) -> SessionState {
        self.store.state()
    }

    /// Current access token, if a session exists. Do not cache beyond a
    /// single request.
    pub fn access_token(&self) -> Option<String> {
        self.store.get().map(|c| c.access_token)
    }

    /// GET builder for an API path, routed through the pipeline on
    /// [`send`](Self::send).
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.url(path))
    }

    /// POST builder for an API path.
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(self.url(path))
    }

    /// Execute a request through the authorizing pipeline.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        self.pipeline.send(builder).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}
