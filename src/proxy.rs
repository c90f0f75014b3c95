//! Proxy credential seeding.
//!
//! Proxies are already resolved by the caller. This module only makes their
//! credentials available to whatever scheme the proxy challenges with; route
//! selection stays with the system route planner.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::auth::{AuthenticationDescriptor, CredentialMaterial, CredentialScopeRegistry};
use crate::error::Result;

/// A resolved proxy, optionally with its own credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyDescriptor {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub credential: Option<CredentialMaterial>,
}

impl ProxyDescriptor {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            credential: None,
        }
    }

    pub fn with_credential(mut self, credential: CredentialMaterial) -> Self {
        self.credential = Some(credential);
        self
    }

    /// All-schemes authentication scoped to exactly this proxy.
    pub fn to_authentication(&self) -> Option<AuthenticationDescriptor> {
        self.credential.as_ref().map(|credential| {
            AuthenticationDescriptor::all_schemes(credential.clone()).with_host(&self.host, self.port)
        })
    }
}

impl fmt::Display for ProxyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// How requests are routed through proxies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutePlanner {
    /// Platform default proxy selection.
    #[default]
    SystemDefault,
}

/// Seeds proxy credentials into a credential registry.
pub struct ProxyConfigurator;

impl ProxyConfigurator {
    /// Register credentials of the HTTP and HTTPS proxies, whichever are present.
    pub fn apply(
        http_proxy: Option<&ProxyDescriptor>,
        https_proxy: Option<&ProxyDescriptor>,
        registry: &mut CredentialScopeRegistry,
    ) -> Result<RoutePlanner> {
        for proxy in [http_proxy, https_proxy].into_iter().flatten() {
            match proxy.to_authentication() {
                Some(authentication) => {
                    tracing::debug!("Seeding credentials for proxy '{}'", proxy);
                    registry.register(&authentication)?;
                }
                None => tracing::debug!("Proxy '{}' has no credentials", proxy),
            }
        }
        Ok(RoutePlanner::SystemDefault)
    }
}
