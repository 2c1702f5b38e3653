// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Souk: authorized HTTP access layer for the storefront API.
//!
//! Attaches bearer credentials to outgoing requests, keeps them fresh with a
//! single-flight refresh protocol, and retries rejected requests exactly once
//! after a reactive refresh. Consumers interact through [`ApiClient`] and the
//! [`SessionEvent`] broadcast channel; rendering and navigation stay outside.

pub mod client;
pub mod config;
pub mod credential;
pub mod endpoint;
pub mod error;
pub mod notifier;
pub mod pipeline;
pub mod session;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use credential::store::CredentialStore;
pub use credential::{Credential, SessionState};
pub use endpoint::{EndpointClass, EndpointRules};
pub use error::{ApiError, RefreshError};
pub use notifier::{SessionEvent, SessionNotifier};
pub use pipeline::RequestPipeline;
