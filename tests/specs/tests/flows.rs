// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end flows against the in-process mock storefront.

use std::sync::atomic::Ordering;

use chrono::{Duration, Utc};
use souk::{ApiClient, ClientConfig, SessionEvent, SessionState};
use souk_specs::{MockStorefront, TEST_MOBILE, TEST_PASSWORD};

fn client_for(api: &MockStorefront) -> (ApiClient, tokio::sync::broadcast::Receiver<SessionEvent>) {
    ApiClient::new(ClientConfig::new(api.base_url())).expect("client")
}

/// Rewind the stored credential's expiry so the next request sees it stale.
fn expire_locally(client: &ApiClient) {
    let mut cred = client.store().get().expect("credential");
    cred.expires_at = Some(Utc::now() - Duration::seconds(1));
    client.store().set(cred);
}

#[tokio::test]
async fn login_then_shop() {
    let api = MockStorefront::start().await;
    let (client, _rx) = client_for(&api);

    client.login(TEST_MOBILE, TEST_PASSWORD).await.expect("login");
    assert_eq!(client.session_state(), SessionState::Authenticated);

    let resp = client.send(client.post("/api/AddItemCart")).await.expect("add item");
    assert_eq!(resp.status(), 200);
    assert_eq!(api.refresh_calls.load(Ordering::Relaxed), 0, "fresh token, no refresh");
}

#[tokio::test]
async fn expired_token_refreshes_transparently() {
    let api = MockStorefront::start().await;
    let (client, mut rx) = client_for(&api);

    client.login(TEST_MOBILE, TEST_PASSWORD).await.expect("login");
    expire_locally(&client);

    let resp = client.send(client.get("/api/GetItemsCart")).await.expect("get cart");
    assert_eq!(resp.status(), 200);
    assert_eq!(api.refresh_calls.load(Ordering::Relaxed), 1);

    // The store now holds the rotated token the server accepts.
    let stored = client.store().get().expect("credential").access_token;
    assert_eq!(stored, *api.valid_token.lock());
    assert_eq!(rx.try_recv().ok(), Some(SessionEvent::Refreshed));
}

#[tokio::test]
async fn guest_browsing_needs_no_session() {
    let api = MockStorefront::start().await;
    let (client, mut rx) = client_for(&api);

    let resp = client.send(client.get("/api/GetCategories")).await.expect("categories");
    assert_eq!(resp.status(), 200);
    assert_eq!(api.refresh_calls.load(Ordering::Relaxed), 0);
    assert!(rx.try_recv().is_err(), "no boundary events while browsing");
}

#[tokio::test]
async fn revoked_refresh_token_ends_the_session_once() {
    let api = MockStorefront::start().await;
    let (client, mut rx) = client_for(&api);

    client.login(TEST_MOBILE, TEST_PASSWORD).await.expect("login");
    let _ = rx.try_recv(); // ignore anything from login

    api.revoke_refresh();
    expire_locally(&client);

    let result = client.send(client.get("/api/GetItemsCart")).await;
    assert!(result.is_err(), "terminal refresh failure fails the request");
    assert_eq!(client.session_state(), SessionState::Anonymous);

    let mut expired = 0;
    while let Ok(event) = rx.try_recv() {
        if event == SessionEvent::Expired {
            expired += 1;
        }
    }
    assert_eq!(expired, 1);

    // The next protected call goes out unauthenticated and asks for login.
    let resp = client.send(client.get("/api/GetItemsCart")).await.expect("cart");
    assert_eq!(resp.status(), 401);
    assert_eq!(rx.try_recv().ok(), Some(SessionEvent::LoginRequired));
}

#[tokio::test]
async fn session_survives_a_client_restart() {
    let api = MockStorefront::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let persist = dir.path().join("session.json");

    let mut config = ClientConfig::new(api.base_url());
    config.persist_path = Some(persist.clone());
    let (client, _rx) = ApiClient::new(config.clone()).expect("client");
    client.login(TEST_MOBILE, TEST_PASSWORD).await.expect("login");
    drop(client);

    let (restarted, _rx) = ApiClient::new(config).expect("client");
    assert_eq!(restarted.session_state(), SessionState::Authenticated);

    let resp = restarted.send(restarted.post("/api/AddItemCart")).await.expect("add item");
    assert_eq!(resp.status(), 200, "restored token still accepted");
    assert_eq!(api.refresh_calls.load(Ordering::Relaxed), 0);
}
