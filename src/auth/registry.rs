//! Credential lookup keyed by `(host, port, realm, scheme)`.
//!
//! Built once per client configuration and never mutated afterwards; share it
//! behind an `Arc` for lock-free concurrent lookups.

use std::collections::HashMap;
use std::fmt;

use http::header::{HeaderName, HeaderValue, AUTHORIZATION};

use crate::auth::basic_auth;
use crate::auth::descriptor::{AuthenticationDescriptor, CredentialMaterial};
use crate::auth::ntlm::{NtlmCredentials, NtlmDefaults};
use crate::auth::scheme::{scheme_id_for, SchemeId};
use crate::error::{Error, Result};

/// Registry key. `realm: None` is the wildcard realm, the only one registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthScope {
    pub host: String,
    pub port: u16,
    pub realm: Option<String>,
    pub scheme: SchemeId,
}

impl AuthScope {
    /// Key with the wildcard realm.
    pub fn any_realm(host: &str, port: u16, scheme: SchemeId) -> Self {
        Self {
            host: host.to_ascii_lowercase(),
            port,
            realm: None,
            scheme,
        }
    }
}

impl fmt::Display for AuthScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}>@{}:{} ({})",
            self.realm.as_deref().unwrap_or("any realm"),
            self.host,
            self.port,
            self.scheme
        )
    }
}

/// Registered credential in the shape the HTTP engine consumes.
#[derive(Clone)]
pub enum ScopedCredential {
    Password {
        username: String,
        secret: String,
        /// Precomputed `Basic …` value.
        basic: HeaderValue,
    },
    Header {
        name: HeaderName,
        value: HeaderValue,
    },
    Ntlm(NtlmCredentials),
}

impl ScopedCredential {
    fn password(username: &str, secret: &str) -> Result<Self> {
        let mut basic = HeaderValue::from_str(&basic_auth(username, secret))
            .map_err(|e| Error::invalid_credential(format!("basic credentials: {}", e)))?;
        basic.set_sensitive(true);
        Ok(Self::Password {
            username: username.to_string(),
            secret: secret.to_string(),
            basic,
        })
    }

    /// Header to send when submitting this credential preemptively under `scheme`.
    ///
    /// Only Basic passwords and header tokens can be sent without a challenge.
    pub fn preemptive_header(&self, scheme: SchemeId) -> Option<(HeaderName, HeaderValue)> {
        match (scheme, self) {
            (SchemeId::Basic, Self::Password { basic, .. }) => {
                Some((AUTHORIZATION, basic.clone()))
            }
            (SchemeId::HttpHeader, Self::Header { name, value }) => {
                Some((name.clone(), value.clone()))
            }
            _ => None,
        }
    }
}

impl fmt::Debug for ScopedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("secret", &"****")
                .finish(),
            Self::Header { name, .. } => f
                .debug_struct("Header")
                .field("name", name)
                .field("value", &"****")
                .finish(),
            Self::Ntlm(ntlm) => f.debug_tuple("Ntlm").field(ntlm).finish(),
        }
    }
}

/// Maps auth scopes to credentials.
#[derive(Debug, Default)]
pub struct CredentialScopeRegistry {
    entries: HashMap<AuthScope, ScopedCredential>,
    ntlm_defaults: NtlmDefaults,
}

impl CredentialScopeRegistry {
    /// Create an empty registry using `ntlm_defaults` for NTLM derivation.
    pub fn new(ntlm_defaults: NtlmDefaults) -> Self {
        Self {
            entries: HashMap::new(),
            ntlm_defaults,
        }
    }

    /// Register `descriptor` for each of its host scopes.
    ///
    /// The descriptor is validated before anything is inserted, so a failure
    /// leaves the registry untouched. Later registrations for the same key
    /// replace earlier ones.
    pub fn register(&mut self, descriptor: &AuthenticationDescriptor) -> Result<()> {
        descriptor.validate()?;

        let scheme = scheme_id_for(descriptor);
        let credential = match &descriptor.credential {
            CredentialMaterial::Password { username, secret } => {
                ScopedCredential::password(username, secret)?
            }
            header @ CredentialMaterial::Header { .. } => {
                let (name, value) = header
                    .to_header()?
                    .ok_or_else(|| Error::invalid_credential("header credential without header"))?;
                ScopedCredential::Header { name, value }
            }
        };

        // NTLM is only reachable through the all-schemes path.
        let ntlm = match (&descriptor.credential, scheme) {
            (CredentialMaterial::Password { username, secret }, SchemeId::Any) => Some(
                NtlmCredentials::derive(username, secret, &self.ntlm_defaults),
            ),
            _ => None,
        };

        for scope in &descriptor.hosts {
            if let Some(ntlm) = &ntlm {
                tracing::debug!(
                    "Using {} and {} for authenticating against '{}' using {}",
                    descriptor.credential,
                    ntlm,
                    scope,
                    SchemeId::Ntlm
                );
                self.entries.insert(
                    AuthScope::any_realm(&scope.host, scope.port, SchemeId::Ntlm),
                    ScopedCredential::Ntlm(ntlm.clone()),
                );
            }

            tracing::debug!(
                "Using {} for authenticating against '{}' using {}",
                descriptor.credential,
                scope,
                scheme
            );
            self.entries.insert(
                AuthScope::any_realm(&scope.host, scope.port, scheme),
                credential.clone(),
            );
        }
        Ok(())
    }

    /// Register every descriptor, stopping at the first invalid one.
    pub fn register_all<'a, I>(&mut self, descriptors: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a AuthenticationDescriptor>,
    {
        for descriptor in descriptors {
            self.register(descriptor)?;
        }
        Ok(())
    }

    /// Credential for `scheme` at `host:port`.
    ///
    /// An exact scheme entry wins; otherwise an all-schemes entry for the same
    /// host and port answers for any scheme.
    pub fn lookup(&self, host: &str, port: u16, scheme: SchemeId) -> Option<&ScopedCredential> {
        let mut key = AuthScope::any_realm(host, port, scheme);
        if let Some(found) = self.entries.get(&key) {
            return Some(found);
        }
        if scheme == SchemeId::Any {
            return None;
        }
        key.scheme = SchemeId::Any;
        self.entries.get(&key)
    }

    /// Names of all header credentials, for stripping on cross-host redirects.
    pub fn header_names(&self) -> Vec<HeaderName> {
        let mut names: Vec<HeaderName> = self
            .entries
            .values()
            .filter_map(|credential| match credential {
                ScopedCredential::Header { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect();
        names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        names.dedup();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::parse_basic_auth;

    fn registry() -> CredentialScopeRegistry {
        CredentialScopeRegistry::new(NtlmDefaults::new("", "WS"))
    }

    #[test]
    fn test_basic_registration_and_lookup() {
        let mut reg = registry();
        reg.register(&AuthenticationDescriptor::basic("alice", "pw").with_host("Repo.Example", 443))
            .unwrap();

        let cred = reg.lookup("repo.example", 443, SchemeId::Basic).unwrap();
        let (_, value) = cred.preemptive_header(SchemeId::Basic).unwrap();
        let (user, pass) = parse_basic_auth(value.to_str().unwrap()).unwrap();
        assert_eq!((user.as_str(), pass.as_str()), ("alice", "pw"));

        assert!(reg.lookup("repo.example", 80, SchemeId::Basic).is_none());
        assert!(reg.lookup("repo.example", 443, SchemeId::Digest).is_none());
        assert!(reg.lookup("repo.example", 443, SchemeId::Ntlm).is_none());
    }

    #[test]
    fn test_empty_scope_registers_nothing() {
        let mut reg = registry();
        let err = reg
            .register(&AuthenticationDescriptor::basic("alice", "pw"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidScope { .. }));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_all_schemes_password_adds_ntlm() {
        let mut reg = registry();
        let descriptor =
            AuthenticationDescriptor::all_schemes(CredentialMaterial::password("corp\\bob", "pw"))
                .with_host("proxy.local", 3128);
        reg.register(&descriptor).unwrap();

        assert_eq!(reg.len(), 2);
        assert!(matches!(
            reg.lookup("proxy.local", 3128, SchemeId::Any),
            Some(ScopedCredential::Password { .. })
        ));
        match reg.lookup("proxy.local", 3128, SchemeId::Ntlm) {
            Some(ScopedCredential::Ntlm(ntlm)) => {
                assert_eq!(ntlm.domain, "CORP");
                assert_eq!(ntlm.username, "bob");
                assert_eq!(ntlm.workstation, "WS");
            }
            other => panic!("expected NTLM credential, got {:?}", other),
        }
        // Wildcard entry answers for other schemes.
        assert!(reg.lookup("proxy.local", 3128, SchemeId::Digest).is_some());
    }

    #[test]
    fn test_basic_password_never_adds_ntlm() {
        let mut reg = registry();
        reg.register(&AuthenticationDescriptor::basic("corp\\bob", "pw").with_host("h", 1))
            .unwrap();
        assert_eq!(reg.len(), 1);
        assert!(reg.lookup("h", 1, SchemeId::Ntlm).is_none());
    }

    #[test]
    fn test_later_registration_overwrites() {
        let mut reg = registry();
        reg.register(&AuthenticationDescriptor::basic("first", "pw").with_host("h", 1))
            .unwrap();
        reg.register(&AuthenticationDescriptor::basic("second", "pw").with_host("h", 1))
            .unwrap();
        assert_eq!(reg.len(), 1);
        match reg.lookup("h", 1, SchemeId::Basic) {
            Some(ScopedCredential::Password { username, .. }) => assert_eq!(username, "second"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_header_credential() {
        let mut reg = registry();
        reg.register(
            &AuthenticationDescriptor::header("Private-Token", "abc").with_host("gitlab.example", 443),
        )
        .unwrap();

        let cred = reg.lookup("gitlab.example", 443, SchemeId::HttpHeader).unwrap();
        assert!(cred.preemptive_header(SchemeId::Basic).is_none());
        let (name, value) = cred.preemptive_header(SchemeId::HttpHeader).unwrap();
        assert_eq!(name.as_str(), "private-token");
        assert_eq!(value, "abc");
        assert!(value.is_sensitive());
        assert_eq!(reg.header_names(), vec![name]);
    }

    #[test]
    fn test_multiple_hosts() {
        let mut reg = registry();
        reg.register(
            &AuthenticationDescriptor::digest("u", "p")
                .with_host("a.example", 443)
                .with_host("b.example", 8443),
        )
        .unwrap();
        assert!(reg.lookup("a.example", 443, SchemeId::Digest).is_some());
        assert!(reg.lookup("B.EXAMPLE", 8443, SchemeId::Digest).is_some());
    }
}
