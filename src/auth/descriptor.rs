//! Caller-facing authentication configuration.

use std::fmt;
use std::str::FromStr;

use http::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Kind of authentication a descriptor requests.
///
/// Closed set: adding a kind forces every match on it to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum AuthKind {
    /// RFC 7617 Basic.
    Basic,
    /// RFC 7616 Digest. Needs a server nonce, so never preemptive.
    Digest,
    /// Arbitrary header carrying a token.
    HeaderToken,
    /// Whatever scheme the server challenges with, NTLM included.
    AllSchemes,
}

impl AuthKind {
    /// Configuration name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Digest => "digest",
            Self::HeaderToken => "header",
            Self::AllSchemes => "all",
        }
    }

    /// Whether `credential` is a legal payload for this kind.
    pub fn accepts(&self, credential: &CredentialMaterial) -> bool {
        match (self, credential) {
            (Self::Basic | Self::Digest, CredentialMaterial::Password { .. }) => true,
            (Self::HeaderToken, CredentialMaterial::Header { .. }) => true,
            (Self::AllSchemes, _) => true,
            _ => false,
        }
    }
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "digest" => Ok(Self::Digest),
            "header" | "http-header" => Ok(Self::HeaderToken),
            "all" | "all-schemes" => Ok(Self::AllSchemes),
            _ => Err(Error::unsupported_scheme(s)),
        }
    }
}

impl TryFrom<String> for AuthKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<AuthKind> for &'static str {
    fn from(kind: AuthKind) -> Self {
        kind.as_str()
    }
}

/// A `(host, port)` target an authentication applies to.
///
/// Hosts are stored lower-cased; matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostScope {
    pub host: String,
    pub port: u16,
}

impl HostScope {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into().to_ascii_lowercase(),
            port,
        }
    }

    /// Scope covering the host and effective port of `url`.
    pub fn from_url(url: &Url) -> Result<Self> {
        let host = url.host_str().ok_or(url::ParseError::EmptyHost)?;
        let port = url
            .port_or_known_default()
            .ok_or(url::ParseError::InvalidPort)?;
        Ok(Self::new(host, port))
    }
}

impl fmt::Display for HostScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Already-resolved secret material. Secrets never appear in `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CredentialMaterial {
    Password { username: String, secret: String },
    Header { name: String, value: String },
}

impl CredentialMaterial {
    pub fn password(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self::Password {
            username: username.into(),
            secret: secret.into(),
        }
    }

    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Header {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Header name for header credentials.
    pub fn header_name(&self) -> Option<&str> {
        match self {
            Self::Header { name, .. } => Some(name),
            Self::Password { .. } => None,
        }
    }

    /// Parse a header credential into wire types, marking the value sensitive.
    pub(crate) fn to_header(&self) -> Result<Option<(HeaderName, HeaderValue)>> {
        let Self::Header { name, value } = self else {
            return Ok(None);
        };
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::invalid_credential(format!("header name '{}': {}", name, e)))?;
        let mut value = HeaderValue::from_str(value)
            .map_err(|e| Error::invalid_credential(format!("value for header '{}': {}", name, e)))?;
        value.set_sensitive(true);
        Ok(Some((name, value)))
    }
}

impl fmt::Debug for CredentialMaterial {
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
        }
    }
}

impl fmt::Display for CredentialMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password { username, .. } => write!(f, "Credentials [username: {}]", username),
            Self::Header { name, .. } => write!(f, "HttpHeaderCredentials [header: {}]", name),
        }
    }
}

/// One configured authentication: a kind, the hosts it covers, and the secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationDescriptor {
    pub kind: AuthKind,
    #[serde(default)]
    pub hosts: Vec<HostScope>,
    pub credential: CredentialMaterial,
}

impl AuthenticationDescriptor {
    pub fn new(kind: AuthKind, credential: CredentialMaterial) -> Self {
        Self {
            kind,
            hosts: Vec::new(),
            credential,
        }
    }

    /// Basic authentication with a username and password.
    pub fn basic(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self::new(AuthKind::Basic, CredentialMaterial::password(username, secret))
    }

    /// Digest authentication with a username and password.
    pub fn digest(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self::new(AuthKind::Digest, CredentialMaterial::password(username, secret))
    }

    /// Token carried in a named header.
    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(AuthKind::HeaderToken, CredentialMaterial::header(name, value))
    }

    /// Credential offered to whichever scheme the server challenges with.
    pub fn all_schemes(credential: CredentialMaterial) -> Self {
        Self::new(AuthKind::AllSchemes, credential)
    }

    /// Add a `(host, port)` scope.
    pub fn with_host(mut self, host: impl Into<String>, port: u16) -> Self {
        self.hosts.push(HostScope::new(host, port));
        self
    }

    /// Add a scope derived from a repository URL.
    pub fn with_url(mut self, url: &Url) -> Result<Self> {
        self.hosts.push(HostScope::from_url(url)?);
        Ok(self)
    }

    /// Check the descriptor is usable for requests.
    ///
    /// Fails with `InvalidScope` when no hosts are defined and with
    /// `InvalidCredential` when the credential does not fit the kind or a
    /// header credential is not a legal HTTP header.
    pub fn validate(&self) -> Result<()> {
        if self.hosts.is_empty() {
            return Err(Error::invalid_scope(self.kind.as_str()));
        }
        if let Some(scope) = self.hosts.iter().find(|scope| scope.host.is_empty()) {
            return Err(Error::invalid_scope(format!("{} ({})", self.kind, scope)));
        }
        if !self.kind.accepts(&self.credential) {
            return Err(Error::invalid_credential(format!(
                "{} authentication cannot use {}",
                self.kind, self.credential
            )));
        }
        self.credential.to_header()?;
        Ok(())
    }
}
