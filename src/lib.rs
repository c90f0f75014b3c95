//! # artifact-transport
//!
//! Secure HTTP(S) transport configuration for clients fetching artifacts from
//! remote repositories.
//!
//! Given an [`HttpSettings`] bundle, [`TransportConfigurer`] produces a
//! [`ConfiguredClient`] carrying credential scoping across competing auth
//! schemes, preemptive authentication for uploads, proxy credentials kept apart
//! from target credentials, negotiated TLS protocol versions and a redirect
//! policy gated by a caller-supplied verifier. Wire I/O stays with the HTTP
//! engine that consumes the configured client.

pub mod auth;
pub mod client;
pub mod error;
pub mod proxy;
pub mod redirect;
pub mod settings;
pub mod timeouts;
pub mod tls;

// Re-exports
pub use auth::{
    AuthKind, AuthNegotiationState, AuthenticationDescriptor, CredentialMaterial,
    CredentialScopeRegistry, HostScope, Preemption, PreemptiveAuthInterceptor, SchemeId,
    ScopedCredential,
};
pub use client::{ConfiguredClient, RedirectStep, TransportConfigurer};
pub use error::{Error, Result};
pub use proxy::{ProxyConfigurator, ProxyDescriptor};
pub use redirect::{
    RedirectDecision, RedirectMode, RedirectPolicy, RedirectStrategy, RedirectVerifier,
};
pub use settings::HttpSettings;
pub use timeouts::TimeoutSettings;
pub use tls::{TlsProtocolNegotiator, TlsProtocols};
