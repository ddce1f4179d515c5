//! Guard chain decision tests.

mod common;

use std::sync::atomic::Ordering;

use client_core::common::{NavigationDecision, Route, StoreError};
use client_core::domains::auth::guards::{
    decide_for_route, require_admin, require_completed_registration, require_session,
};
use common::{profile_admin, profile_complete, profile_incomplete, Failure, MockStore};

#[tokio::test]
async fn test_require_session_redirects_to_login_without_session() {
    let store = MockStore::new();
    // Profile state is irrelevant when there is no session
    *store.profile.lock().unwrap() = Ok(Some(profile_complete()));

    let decision = require_session(&store).await.unwrap();
    assert_eq!(decision, NavigationDecision::RedirectTo(Route::Login));
}

#[tokio::test]
async fn test_require_session_allows_with_session() {
    let store = MockStore::signed_in(None);
    let decision = require_session(&store).await.unwrap();
    assert_eq!(decision, NavigationDecision::Allow);
}

#[tokio::test]
async fn test_require_session_surfaces_transport_errors() {
    let store = MockStore::new();
    *store.session.lock().unwrap() = Err(Failure::Transport("connection refused".to_string()));

    let err = require_session(&store).await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));
}

#[tokio::test]
async fn test_registration_guard_redirects_to_login_without_session() {
    let store = MockStore::new();
    let decision = require_completed_registration(&store).await.unwrap();
    assert_eq!(decision, NavigationDecision::RedirectTo(Route::Login));
    // The session check short-circuits; no profile fetch happens
    assert_eq!(store.profile_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_registration_guard_redirects_to_register_without_profile() {
    let store = MockStore::signed_in(None);
    let decision = require_completed_registration(&store).await.unwrap();
    assert_eq!(decision, NavigationDecision::RedirectTo(Route::Register));
}

#[tokio::test]
async fn test_registration_guard_redirects_to_register_when_incomplete() {
    let store = MockStore::signed_in(Some(profile_incomplete()));
    let decision = require_completed_registration(&store).await.unwrap();
    assert_eq!(decision, NavigationDecision::RedirectTo(Route::Register));
}

#[tokio::test]
async fn test_registration_guard_allows_when_complete() {
    let store = MockStore::signed_in(Some(profile_complete()));
    let decision = require_completed_registration(&store).await.unwrap();
    assert_eq!(decision, NavigationDecision::Allow);
}

#[tokio::test]
async fn test_admin_guard_redirects_to_login_without_session() {
    let store = MockStore::new();
    let decision = require_admin(&store).await.unwrap();
    assert_eq!(decision, NavigationDecision::RedirectTo(Route::Login));
}

#[tokio::test]
async fn test_admin_guard_sends_non_admin_to_dashboard() {
    // A signed-in, fully registered non-admin goes to the dashboard, not
    // back through login or registration
    let store = MockStore::signed_in(Some(profile_complete()));
    let decision = require_admin(&store).await.unwrap();
    assert_eq!(decision, NavigationDecision::RedirectTo(Route::Dashboard));
}

#[tokio::test]
async fn test_admin_guard_treats_absent_profile_as_non_admin() {
    let store = MockStore::signed_in(None);
    let decision = require_admin(&store).await.unwrap();
    assert_eq!(decision, NavigationDecision::RedirectTo(Route::Dashboard));
}

#[tokio::test]
async fn test_admin_guard_allows_admin() {
    let store = MockStore::signed_in(Some(profile_admin()));
    let decision = require_admin(&store).await.unwrap();
    assert_eq!(decision, NavigationDecision::Allow);
}

#[tokio::test]
async fn test_route_attachment() {
    let store = MockStore::signed_in(Some(profile_complete()));

    // Dashboard requires completed registration; this profile passes
    let decision = decide_for_route(&store, Route::Dashboard).await.unwrap();
    assert_eq!(decision, NavigationDecision::Allow);

    // Admin subtree requires the admin flag; a plain member bounces
    let decision = decide_for_route(&store, Route::AdminProfiles).await.unwrap();
    assert_eq!(decision, NavigationDecision::RedirectTo(Route::Dashboard));

    // Login and the callback screens are unguarded
    let decision = decide_for_route(&store, Route::Login).await.unwrap();
    assert_eq!(decision, NavigationDecision::Allow);
    let decision = decide_for_route(&store, Route::AuthCallback).await.unwrap();
    assert_eq!(decision, NavigationDecision::Allow);
}

#[tokio::test]
async fn test_guards_fetch_fresh_per_evaluation() {
    let store = MockStore::signed_in(Some(profile_complete()));

    require_session(&store).await.unwrap();
    require_completed_registration(&store).await.unwrap();
    require_admin(&store).await.unwrap();

    // One session read per guard; nothing is cached across guards
    assert_eq!(store.session_calls.load(Ordering::SeqCst), 3);
    // Registration and admin guards each read the profile themselves
    assert_eq!(store.profile_calls.load(Ordering::SeqCst), 2);
}
