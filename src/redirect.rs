//! Redirect policy.
//!
//! Decides per redirect response whether to follow and with which method and
//! body. Every redirect that would be followed is first counted against the
//! configured maximum and then offered to a [`RedirectVerifier`].

use std::fmt;
use std::sync::Arc;

use http::header::{HeaderMap, HeaderName, AUTHORIZATION, COOKIE, PROXY_AUTHORIZATION};
use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// How redirects to mutating requests are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RedirectMode {
    /// Standard semantics: safe methods follow, uploads only follow a 303 as GET.
    #[default]
    FollowOnlyForSafeMethods,
    /// Follow every redirect with the original method and body.
    AlwaysFollowPreserveMethod,
}

/// External hook approving redirect targets.
pub trait RedirectVerifier: Send + Sync {
    /// Return `true` to allow following a redirect to `target`.
    fn verify(&self, target: &Url) -> bool;
}

impl<F> RedirectVerifier for F
where
    F: Fn(&Url) -> bool + Send + Sync,
{
    fn verify(&self, target: &Url) -> bool {
        self(target)
    }
}

/// Allows every target.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllRedirects;

impl RedirectVerifier for AllowAllRedirects {
    fn verify(&self, _target: &Url) -> bool {
        true
    }
}

/// Rejects targets reached over plain `http`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureRedirectVerifier;

impl RedirectVerifier for SecureRedirectVerifier {
    fn verify(&self, target: &Url) -> bool {
        target.scheme() == "https"
    }
}

/// Only allows redirects staying on one host.
#[derive(Debug, Clone)]
pub struct SameHostVerifier {
    host: String,
}

impl SameHostVerifier {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into().to_ascii_lowercase(),
        }
    }

    /// Verifier pinned to the host of `url`. `None` when it has no host.
    pub fn for_url(url: &Url) -> Option<Self> {
        url.host_str().map(Self::new)
    }
}

impl RedirectVerifier for SameHostVerifier {
    fn verify(&self, target: &Url) -> bool {
        target
            .host_str()
            .is_some_and(|host| host.eq_ignore_ascii_case(&self.host))
    }
}

/// Outcome for one redirect response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedirectDecision {
    pub follow: bool,
    pub preserve_method_and_body: bool,
}

impl RedirectDecision {
    /// Do not follow; hand the redirect response to the caller.
    pub const STOP: Self = Self {
        follow: false,
        preserve_method_and_body: false,
    };

    const PRESERVE: Self = Self {
        follow: true,
        preserve_method_and_body: true,
    };

    const DOWNGRADE: Self = Self {
        follow: true,
        preserve_method_and_body: false,
    };

    /// Method for the follow-up request. Downgrades become bodiless `GET`,
    /// except `HEAD` which stays `HEAD`.
    pub fn next_method(&self, original: &Method) -> Method {
        if self.preserve_method_and_body || *original == Method::HEAD {
            original.clone()
        } else {
            Method::GET
        }
    }
}

/// Which redirect handling is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectStrategy {
    /// Redirects are never followed (max redirects is zero).
    Disabled,
    SafeMethodsOnly,
    AlwaysPreserve,
}

impl RedirectStrategy {
    pub fn from_settings(mode: RedirectMode, max_redirects: u32) -> Self {
        if max_redirects == 0 {
            return Self::Disabled;
        }
        match mode {
            RedirectMode::FollowOnlyForSafeMethods => Self::SafeMethodsOnly,
            RedirectMode::AlwaysFollowPreserveMethod => Self::AlwaysPreserve,
        }
    }

    /// Decision before limit and verifier checks.
    fn candidate(&self, method: &Method, status: StatusCode) -> RedirectDecision {
        if !is_redirect_status(status) {
            return RedirectDecision::STOP;
        }
        match self {
            Self::Disabled => RedirectDecision::STOP,
            Self::AlwaysPreserve => RedirectDecision::PRESERVE,
            Self::SafeMethodsOnly => {
                if is_safe_method(method) {
                    RedirectDecision::PRESERVE
                } else if status == StatusCode::SEE_OTHER {
                    RedirectDecision::DOWNGRADE
                } else {
                    RedirectDecision::STOP
                }
            }
        }
    }
}

/// Statuses treated as redirects.
pub fn is_redirect_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

fn is_safe_method(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD
}

/// Redirect policy installed on a configured client.
#[derive(Clone)]
pub struct RedirectPolicy {
    strategy: RedirectStrategy,
    max_redirects: u32,
    verifier: Arc<dyn RedirectVerifier>,
}

impl RedirectPolicy {
    pub fn new(mode: RedirectMode, max_redirects: u32, verifier: Arc<dyn RedirectVerifier>) -> Self {
        Self {
            strategy: RedirectStrategy::from_settings(mode, max_redirects),
            max_redirects,
            verifier,
        }
    }

    /// Policy that never follows.
    pub fn disabled() -> Self {
        Self::new(RedirectMode::default(), 0, Arc::new(AllowAllRedirects))
    }

    pub fn strategy(&self) -> RedirectStrategy {
        self.strategy
    }

    pub fn max_redirects(&self) -> u32 {
        self.max_redirects
    }

    /// Decide on a redirect to `target` for a `method` request that got `status`.
    ///
    /// `followed` is the number of redirects already followed for this request.
    /// Fails with `RedirectLimitExceeded` when following would pass the
    /// maximum, and with `RedirectDenied` when the verifier rejects `target`.
    pub fn decide(
        &self,
        method: &Method,
        status: StatusCode,
        target: &Url,
        followed: u32,
    ) -> Result<RedirectDecision> {
        let decision = self.strategy.candidate(method, status);
        if !decision.follow {
            tracing::debug!(
                "Not following {} redirect for {} to '{}' ({:?})",
                status.as_u16(),
                method,
                target,
                self.strategy
            );
            return Ok(decision);
        }

        if followed >= self.max_redirects {
            return Err(Error::RedirectLimitExceeded {
                count: followed + 1,
                max: self.max_redirects,
            });
        }

        if !self.verifier.verify(target) {
            tracing::warn!("Redirect verifier denied redirect to '{}'", target);
            return Err(Error::redirect_denied(target.as_str()));
        }

        tracing::debug!(
            "Following {} redirect to {} '{}'",
            status.as_u16(),
            decision.next_method(method),
            target
        );
        Ok(decision)
    }
}

impl fmt::Debug for RedirectPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedirectPolicy")
            .field("strategy", &self.strategy)
            .field("max_redirects", &self.max_redirects)
            .finish_non_exhaustive()
    }
}

/// Resolve a `Location` header value against the URL that produced it.
pub fn resolve_location(current: &Url, location: &str) -> Result<Url> {
    current
        .join(location.trim())
        .map_err(|e| Error::InvalidRedirectUrl(format!("{}: {}", location, e)))
}

/// Drop credential-bearing headers when a redirect leaves the original origin.
///
/// `extra` names additional headers to strip, typically configured header
/// credentials. Same-origin redirects keep every header.
pub fn strip_sensitive_headers(
    headers: &mut HeaderMap,
    previous: &Url,
    next: &Url,
    extra: &[HeaderName],
) {
    let same_origin = previous.scheme() == next.scheme()
        && previous.host_str() == next.host_str()
        && previous.port_or_known_default() == next.port_or_known_default();
    if same_origin {
        return;
    }
    for name in [AUTHORIZATION, PROXY_AUTHORIZATION, COOKIE].iter().chain(extra) {
        headers.remove(name);
    }
}
