//! NTLM credential derivation.
//!
//! NTLM wants a domain and workstation alongside the user. Both come from the
//! username (`DOMAIN\user` or `DOMAIN/user`) and the local machine.

use std::env;
use std::fmt;

/// Domain override used when the username carries no domain.
pub const NTLM_DOMAIN_ENV: &str = "NTLM_DOMAIN";

/// Fallback domain and workstation for NTLM derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NtlmDefaults {
    pub domain: String,
    pub workstation: String,
}

impl NtlmDefaults {
    pub fn new(domain: impl Into<String>, workstation: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            workstation: workstation.into(),
        }
    }

    /// Read `NTLM_DOMAIN` and the local host name.
    pub fn from_env() -> Self {
        let domain = env::var(NTLM_DOMAIN_ENV).unwrap_or_default();
        let workstation = match hostname::get() {
            Ok(host) => workstation_name(&host.to_string_lossy()),
            Err(e) => {
                tracing::debug!("Could not read local host name for NTLM: {}", e);
                String::new()
            }
        };
        Self {
            domain,
            workstation,
        }
    }
}

/// `build-01.corp.example` becomes `BUILD-01`.
fn workstation_name(host: &str) -> String {
    let short = host.split('.').next().unwrap_or(host);
    short.to_uppercase()
}

/// Password credential in NTLM shape.
#[derive(Clone, PartialEq, Eq)]
pub struct NtlmCredentials {
    pub username: String,
    pub secret: String,
    pub workstation: String,
    pub domain: String,
}

impl NtlmCredentials {
    /// Split `username` on the first `\` (or `/`), upper-casing the domain.
    pub fn derive(username: &str, secret: &str, defaults: &NtlmDefaults) -> Self {
        let split = username.find('\\').or_else(|| username.find('/'));
        let (domain, user) = match split {
            Some(pos) => (&username[..pos], &username[pos + 1..]),
            None => (defaults.domain.as_str(), username),
        };
        Self {
            username: user.to_string(),
            secret: secret.to_string(),
            workstation: defaults.workstation.clone(),
            domain: domain.to_uppercase(),
        }
    }
}

impl fmt::Debug for NtlmCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NtlmCredentials")
            .field("username", &self.username)
            .field("secret", &"****")
            .field("workstation", &self.workstation)
            .field("domain", &self.domain)
            .finish()
    }
}

impl fmt::Display for NtlmCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NTLM Credentials [user: {}, domain: {}, workstation: {}]",
            self.username, self.domain, self.workstation
        )
    }
}
