//! Scheme ids and the rules choosing between them.

use std::fmt;

use crate::auth::descriptor::{AuthKind, AuthenticationDescriptor};

/// Identifier of an authentication protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemeId {
    Basic,
    Digest,
    Ntlm,
    /// SPNEGO, announced as `Negotiate`.
    Spnego,
    Kerberos,
    /// Token carried in a caller-named header.
    HttpHeader,
    /// Wildcard matching whatever scheme the server challenges with.
    Any,
}

/// Schemes registered for reactive challenge/response negotiation.
pub const REACTIVE_SCHEMES: [SchemeId; 6] = [
    SchemeId::Basic,
    SchemeId::Digest,
    SchemeId::Ntlm,
    SchemeId::Spnego,
    SchemeId::Kerberos,
    SchemeId::HttpHeader,
];

impl SchemeId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Digest => "Digest",
            Self::Ntlm => "NTLM",
            Self::Spnego => "Negotiate",
            Self::Kerberos => "Kerberos",
            Self::HttpHeader => "header",
            Self::Any => "<any scheme>",
        }
    }

    /// Scheme a descriptor of this kind is registered under.
    pub fn for_kind(kind: AuthKind) -> Self {
        match kind {
            AuthKind::Basic => Self::Basic,
            AuthKind::Digest => Self::Digest,
            AuthKind::HeaderToken => Self::HttpHeader,
            AuthKind::AllSchemes => Self::Any,
        }
    }
}

impl fmt::Display for SchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheme id credentials of `descriptor` are registered under.
pub fn scheme_id_for(descriptor: &AuthenticationDescriptor) -> SchemeId {
    SchemeId::for_kind(descriptor.kind)
}

/// Scheme used for preemptive submission.
///
/// Only a lone header descriptor selects the header scheme; every other
/// combination, empty included, falls back to Basic.
pub fn select_preemptive_scheme(descriptors: &[AuthenticationDescriptor]) -> SchemeId {
    match descriptors {
        [only] if only.kind == AuthKind::HeaderToken => SchemeId::HttpHeader,
        _ => SchemeId::Basic,
    }
}

/// True iff some descriptor is Basic or a header token.
///
/// Digest needs a server nonce and AllSchemes has no single scheme to send,
/// so neither enables preemptive submission.
pub fn is_preemptive_enabled(descriptors: &[AuthenticationDescriptor]) -> bool {
    descriptors
        .iter()
        .any(|d| matches!(d.kind, AuthKind::Basic | AuthKind::HeaderToken))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::descriptor::CredentialMaterial;

    fn header() -> AuthenticationDescriptor {
        AuthenticationDescriptor::header("Private-Token", "t").with_host("repo.example", 443)
    }

    fn basic() -> AuthenticationDescriptor {
        AuthenticationDescriptor::basic("u", "p").with_host("repo.example", 443)
    }

    fn digest() -> AuthenticationDescriptor {
        AuthenticationDescriptor::digest("u", "p").with_host("repo.example", 443)
    }

    fn all() -> AuthenticationDescriptor {
        AuthenticationDescriptor::all_schemes(CredentialMaterial::password("u", "p"))
            .with_host("proxy.local", 3128)
    }

    #[test]
    fn test_lone_header_selects_header_scheme() {
        assert_eq!(select_preemptive_scheme(&[header()]), SchemeId::HttpHeader);
    }

    #[test]
    fn test_everything_else_selects_basic() {
        assert_eq!(select_preemptive_scheme(&[]), SchemeId::Basic);
        assert_eq!(select_preemptive_scheme(&[basic()]), SchemeId::Basic);
        assert_eq!(select_preemptive_scheme(&[digest()]), SchemeId::Basic);
        assert_eq!(select_preemptive_scheme(&[all()]), SchemeId::Basic);
        assert_eq!(select_preemptive_scheme(&[header(), header()]), SchemeId::Basic);
        assert_eq!(select_preemptive_scheme(&[header(), basic()]), SchemeId::Basic);
        assert_eq!(select_preemptive_scheme(&[digest(), header()]), SchemeId::Basic);
    }

    #[test]
    fn test_scheme_id_for_each_kind() {
        assert_eq!(scheme_id_for(&basic()), SchemeId::Basic);
        assert_eq!(scheme_id_for(&digest()), SchemeId::Digest);
        assert_eq!(scheme_id_for(&header()), SchemeId::HttpHeader);
        assert_eq!(scheme_id_for(&all()), SchemeId::Any);
    }

    #[test]
    fn test_preemptive_enabled() {
        assert!(is_preemptive_enabled(&[basic()]));
        assert!(is_preemptive_enabled(&[header()]));
        assert!(is_preemptive_enabled(&[digest(), basic()]));
        assert!(!is_preemptive_enabled(&[digest()]));
        assert!(!is_preemptive_enabled(&[all()]));
        assert!(!is_preemptive_enabled(&[digest(), all()]));
        assert!(!is_preemptive_enabled(&[]));
    }

    #[test]
    fn test_reactive_schemes_exclude_wildcard() {
        assert!(!REACTIVE_SCHEMES.contains(&SchemeId::Any));
        assert!(REACTIVE_SCHEMES.contains(&SchemeId::Ntlm));
    }
}
