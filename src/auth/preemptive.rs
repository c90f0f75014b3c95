//! Preemptive authentication.
//!
//! Attaches a credential to an outgoing request before the server has a
//! chance to challenge, saving a round trip on uploads. Never touches a
//! request whose target already has a negotiated scheme.

use std::sync::Arc;

use http::{Method, Request};

use crate::auth::registry::CredentialScopeRegistry;
use crate::auth::scheme::SchemeId;

/// Methods that always get preemptive credentials.
pub const MUTATING_METHODS: [Method; 2] = [Method::PUT, Method::POST];

/// Per-request view of the target's authentication negotiation.
///
/// Owned by the request context, never shared across requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthNegotiationState {
    scheme: Option<SchemeId>,
    auth_options: Vec<SchemeId>,
}

impl AuthNegotiationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State where `scheme` was already agreed with the target.
    pub fn negotiated(scheme: SchemeId) -> Self {
        Self {
            scheme: Some(scheme),
            auth_options: Vec::new(),
        }
    }

    pub fn scheme(&self) -> Option<SchemeId> {
        self.scheme
    }

    /// Schemes offered by a challenge and not yet resolved.
    pub fn auth_options(&self) -> &[SchemeId] {
        &self.auth_options
    }

    pub fn has_auth_options(&self) -> bool {
        !self.auth_options.is_empty()
    }

    /// Whether a scheme is agreed or a challenge is pending.
    pub fn is_established(&self) -> bool {
        self.scheme.is_some() || self.has_auth_options()
    }

    /// Record the schemes offered by a server challenge.
    pub fn set_auth_options(&mut self, options: Vec<SchemeId>) {
        self.auth_options = options;
    }

    /// Record an agreed scheme, clearing pending options.
    pub fn update(&mut self, scheme: SchemeId) {
        self.scheme = Some(scheme);
        self.auth_options.clear();
    }

    pub fn reset(&mut self) {
        self.scheme = None;
        self.auth_options.clear();
    }
}

/// Outcome of running the interceptor on one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preemption {
    /// Credential attached under this scheme.
    Attached(SchemeId),
    /// Target already negotiated; request untouched.
    AlreadyNegotiated,
    /// Method not eligible and `always_send` off.
    NotEligible,
    /// No credential configured for the target.
    NoCredentials,
}

impl Preemption {
    pub fn is_attached(&self) -> bool {
        matches!(self, Self::Attached(_))
    }
}

/// Before-send hook for preemptive authentication.
#[derive(Debug, Clone)]
pub struct PreemptiveAuthInterceptor {
    scheme: SchemeId,
    always_send: bool,
    credentials: Arc<CredentialScopeRegistry>,
}

impl PreemptiveAuthInterceptor {
    pub fn new(scheme: SchemeId, always_send: bool, credentials: Arc<CredentialScopeRegistry>) -> Self {
        Self {
            scheme,
            always_send,
            credentials,
        }
    }

    pub fn scheme(&self) -> SchemeId {
        self.scheme
    }

    pub fn always_send(&self) -> bool {
        self.always_send
    }

    /// Attach a credential to `request` when policy allows.
    ///
    /// Eligible when `state` has no scheme or pending options, and either
    /// `always_send` is set or the method is `PUT`/`POST`. A missing
    /// credential for the target is a no-op.
    pub fn process<B>(&self, request: &mut Request<B>, state: &mut AuthNegotiationState) -> Preemption {
        if state.is_established() {
            return Preemption::AlreadyNegotiated;
        }
        if !self.always_send && !MUTATING_METHODS.contains(request.method()) {
            return Preemption::NotEligible;
        }

        let Some((host, port)) = target_of(request) else {
            tracing::debug!("Preemptive auth: no target host in '{}'", request.uri());
            return Preemption::NoCredentials;
        };

        let header = self
            .credentials
            .lookup(&host, port, self.scheme)
            .and_then(|credential| credential.preemptive_header(self.scheme));
        let Some((name, value)) = header else {
            tracing::debug!(
                "Preemptive auth: no {} credentials for '{}:{}'",
                self.scheme,
                host,
                port
            );
            return Preemption::NoCredentials;
        };

        request.headers_mut().insert(name, value);
        state.update(self.scheme);
        tracing::debug!(
            "Preemptive auth: attached {} credentials to {} '{}:{}'",
            self.scheme,
            request.method(),
            host,
            port
        );
        Preemption::Attached(self.scheme)
    }
}

/// Host and effective port of the request target.
fn target_of<B>(request: &Request<B>) -> Option<(String, u16)> {
    let uri = request.uri();
    let host = uri.host()?;
    let port = match uri.port_u16() {
        Some(port) => port,
        None => match uri.scheme_str() {
            Some("http") => 80,
            _ => 443,
        },
    };
    Some((host.to_ascii_lowercase(), port))
}
