//! Redirect Policy Tests
//!
//! RFC 9110 Section 15.4 redirect semantics plus verifier gating.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use artifact_transport::redirect::{AllowAllRedirects, SameHostVerifier};
use artifact_transport::{Error, RedirectDecision, RedirectMode, RedirectPolicy, RedirectStrategy};
use http::{Method, StatusCode};
use url::Url;

const REDIRECTS: [StatusCode; 5] = [
    StatusCode::MOVED_PERMANENTLY,
    StatusCode::FOUND,
    StatusCode::SEE_OTHER,
    StatusCode::TEMPORARY_REDIRECT,
    StatusCode::PERMANENT_REDIRECT,
];

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn same_host_policy(mode: RedirectMode, max: u32) -> RedirectPolicy {
    RedirectPolicy::new(mode, max, Arc::new(SameHostVerifier::new("repo.example")))
}

#[test]
fn test_disabled_follows_nothing() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let verifier = move |_: &Url| {
        counter.fetch_add(1, Ordering::SeqCst);
        true
    };
    let policy = RedirectPolicy::new(RedirectMode::AlwaysFollowPreserveMethod, 0, Arc::new(verifier));
    assert_eq!(policy.strategy(), RedirectStrategy::Disabled);

    for status in REDIRECTS {
        for method in [Method::GET, Method::PUT] {
            let decision = policy
                .decide(&method, status, &url("https://repo.example/next"), 0)
                .unwrap();
            assert!(!decision.follow);
        }
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0, "verifier must not be consulted");
}

#[test]
fn test_safe_get_to_approved_target_is_followed() {
    let policy = same_host_policy(RedirectMode::FollowOnlyForSafeMethods, 5);
    for status in REDIRECTS {
        let decision = policy
            .decide(&Method::GET, status, &url("https://repo.example/moved"), 0)
            .unwrap();
        assert!(decision.follow);
        assert!(decision.preserve_method_and_body);
        assert_eq!(decision.next_method(&Method::GET), Method::GET);
    }
}

#[test]
fn test_safe_get_to_denied_target_fails() {
    let policy = same_host_policy(RedirectMode::FollowOnlyForSafeMethods, 5);
    let err = policy
        .decide(&Method::GET, StatusCode::FOUND, &url("https://evil.example/steal"), 0)
        .unwrap_err();
    match err {
        Error::RedirectDenied(target) => assert_eq!(target, "https://evil.example/steal"),
        other => panic!("expected RedirectDenied, got {:?}", other),
    }
}

#[test]
fn test_denial_applies_in_every_following_mode() {
    let policy = same_host_policy(RedirectMode::AlwaysFollowPreserveMethod, 5);
    let err = policy
        .decide(&Method::PUT, StatusCode::TEMPORARY_REDIRECT, &url("https://cdn.example/"), 0)
        .unwrap_err();
    assert!(matches!(err, Error::RedirectDenied(_)));
}

#[test]
fn test_safe_mode_mutating_requests() {
    let policy = same_host_policy(RedirectMode::FollowOnlyForSafeMethods, 5);
    let target = url("https://repo.example/other");

    let see_other = policy
        .decide(&Method::POST, StatusCode::SEE_OTHER, &target, 0)
        .unwrap();
    assert!(see_other.follow);
    assert!(!see_other.preserve_method_and_body);
    assert_eq!(see_other.next_method(&Method::POST), Method::GET);

    for status in [
        StatusCode::MOVED_PERMANENTLY,
        StatusCode::FOUND,
        StatusCode::TEMPORARY_REDIRECT,
        StatusCode::PERMANENT_REDIRECT,
    ] {
        let decision = policy.decide(&Method::PUT, status, &target, 0).unwrap();
        assert!(!decision.follow, "PUT must not follow {}", status);
    }
}

#[test]
fn test_always_preserve_keeps_method_and_body() {
    let policy = same_host_policy(RedirectMode::AlwaysFollowPreserveMethod, 5);
    for status in REDIRECTS {
        let decision = policy
            .decide(&Method::PUT, status, &url("https://repo.example/upload"), 0)
            .unwrap();
        assert!(decision.follow);
        assert!(decision.preserve_method_and_body);
        assert_eq!(decision.next_method(&Method::PUT), Method::PUT);
    }
}

#[test]
fn test_limit_exceeded_is_fatal() {
    let policy = RedirectPolicy::new(RedirectMode::FollowOnlyForSafeMethods, 2, Arc::new(AllowAllRedirects));
    let target = url("https://repo.example/loop");

    assert!(policy.decide(&Method::GET, StatusCode::FOUND, &target, 0).unwrap().follow);
    assert!(policy.decide(&Method::GET, StatusCode::FOUND, &target, 1).unwrap().follow);

    let err = policy
        .decide(&Method::GET, StatusCode::FOUND, &target, 2)
        .unwrap_err();
    assert!(matches!(err, Error::RedirectLimitExceeded { count: 3, max: 2 }));
    assert!(!err.is_configuration());
}

#[test]
fn test_non_redirect_status_is_not_followed() {
    let policy = RedirectPolicy::new(RedirectMode::AlwaysFollowPreserveMethod, 5, Arc::new(AllowAllRedirects));
    for status in [StatusCode::OK, StatusCode::NOT_MODIFIED, StatusCode::USE_PROXY] {
        let decision = policy
            .decide(&Method::GET, status, &url("https://repo.example/"), 0)
            .unwrap();
        assert!(!decision.follow);
    }
}

#[test]
fn test_disabled_policy_never_follows() {
    let policy = RedirectPolicy::disabled();
    assert_eq!(policy.strategy(), RedirectStrategy::Disabled);
    assert_eq!(policy.max_redirects(), 0);
    for status in REDIRECTS {
        let decision = policy
            .decide(&Method::GET, status, &url("https://repo.example/next"), 0)
            .unwrap();
        assert_eq!(decision, RedirectDecision::STOP);
    }
}
