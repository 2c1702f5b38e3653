// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{SessionEvent, SessionNotifier};

#[tokio::test]
async fn expiry_signals_once_until_rearmed() {
    let (notifier, mut rx) = SessionNotifier::new();

    notifier.session_expired();
    notifier.session_expired();
    notifier.session_expired();

    assert_eq!(rx.try_recv().ok(), Some(SessionEvent::Expired));
    assert!(rx.try_recv().is_err(), "expiry must not be signaled twice");
}

#[tokio::test]
async fn refresh_rearms_the_expiry_signal() {
    let (notifier, mut rx) = SessionNotifier::new();

    notifier.session_expired();
    notifier.session_refreshed();
    notifier.session_expired();

    assert_eq!(rx.try_recv().ok(), Some(SessionEvent::Expired));
    assert_eq!(rx.try_recv().ok(), Some(SessionEvent::Refreshed));
    assert_eq!(rx.try_recv().ok(), Some(SessionEvent::Expired));
}

#[tokio::test]
async fn reset_rearms_without_emitting() {
    let (notifier, mut rx) = SessionNotifier::new();

    notifier.session_expired();
    notifier.reset();
    notifier.session_expired();

    assert_eq!(rx.try_recv().ok(), Some(SessionEvent::Expired));
    assert_eq!(rx.try_recv().ok(), Some(SessionEvent::Expired));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn login_required_is_not_deduplicated() {
    let (notifier, mut rx) = SessionNotifier::new();

    notifier.login_required();
    notifier.login_required();

    assert_eq!(rx.try_recv().ok(), Some(SessionEvent::LoginRequired));
    assert_eq!(rx.try_recv().ok(), Some(SessionEvent::LoginRequired));
}
