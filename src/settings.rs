//! Settings bundle consumed by [`TransportConfigurer`](crate::TransportConfigurer).
//!
//! ```rust
//! use artifact_transport::{AuthenticationDescriptor, HttpSettings, RedirectMode};
//!
//! let settings = HttpSettings::new()
//!     .authentication(AuthenticationDescriptor::basic("deployer", "s3cret").with_host("repo.example", 443))
//!     .redirect_mode(RedirectMode::AlwaysFollowPreserveMethod)
//!     .max_redirects(5);
//! assert_eq!(settings.authentications().len(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::auth::{AuthenticationDescriptor, NtlmDefaults};
use crate::proxy::ProxyDescriptor;
use crate::redirect::{RedirectMode, RedirectVerifier, SecureRedirectVerifier};
use crate::timeouts::TimeoutSettings;

/// Default redirect limit.
pub const DEFAULT_MAX_REDIRECTS: u32 = 10;

/// Everything needed to configure one client.
///
/// Deserializable from configuration files; the redirect verifier and NTLM
/// defaults cannot be expressed there and default to
/// [`SecureRedirectVerifier`] and [`NtlmDefaults::from_env`].
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    authentications: Vec<AuthenticationDescriptor>,
    proxy: Option<ProxyDescriptor>,
    secure_proxy: Option<ProxyDescriptor>,
    redirect_mode: RedirectMode,
    max_redirects: u32,
    timeouts: TimeoutSettings,
    #[serde(skip, default = "default_verifier")]
    redirect_verifier: Arc<dyn RedirectVerifier>,
    #[serde(skip, default = "NtlmDefaults::from_env")]
    ntlm: NtlmDefaults,
}

fn default_verifier() -> Arc<dyn RedirectVerifier> {
    Arc::new(SecureRedirectVerifier)
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            authentications: Vec::new(),
            proxy: None,
            secure_proxy: None,
            redirect_mode: RedirectMode::default(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            timeouts: TimeoutSettings::default(),
            redirect_verifier: default_verifier(),
            ntlm: NtlmDefaults::from_env(),
        }
    }
}

impl HttpSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a target authentication.
    pub fn authentication(mut self, descriptor: AuthenticationDescriptor) -> Self {
        self.authentications.push(descriptor);
        self
    }

    /// Configured target authentications.
    pub fn authentications(&self) -> &[AuthenticationDescriptor] {
        &self.authentications
    }

    /// Replace all target authentications.
    pub fn with_authentications(mut self, descriptors: Vec<AuthenticationDescriptor>) -> Self {
        self.authentications = descriptors;
        self
    }

    /// Proxy for `http` targets.
    pub fn proxy(mut self, proxy: ProxyDescriptor) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Proxy for `https` targets.
    pub fn secure_proxy(mut self, proxy: ProxyDescriptor) -> Self {
        self.secure_proxy = Some(proxy);
        self
    }

    pub fn redirect_mode(mut self, mode: RedirectMode) -> Self {
        self.redirect_mode = mode;
        self
    }

    /// Maximum redirects per request; `0` disables redirect handling.
    pub fn max_redirects(mut self, max: u32) -> Self {
        self.max_redirects = max;
        self
    }

    pub fn redirect_verifier(mut self, verifier: impl RedirectVerifier + 'static) -> Self {
        self.redirect_verifier = Arc::new(verifier);
        self
    }

    pub fn timeouts(mut self, timeouts: TimeoutSettings) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn ntlm_defaults(mut self, defaults: NtlmDefaults) -> Self {
        self.ntlm = defaults;
        self
    }

    pub fn http_proxy(&self) -> Option<&ProxyDescriptor> {
        self.proxy.as_ref()
    }

    pub fn https_proxy(&self) -> Option<&ProxyDescriptor> {
        self.secure_proxy.as_ref()
    }

    pub fn mode(&self) -> RedirectMode {
        self.redirect_mode
    }

    pub fn redirect_limit(&self) -> u32 {
        self.max_redirects
    }

    pub fn verifier(&self) -> Arc<dyn RedirectVerifier> {
        Arc::clone(&self.redirect_verifier)
    }

    pub fn timeout_settings(&self) -> TimeoutSettings {
        self.timeouts
    }

    pub fn ntlm(&self) -> &NtlmDefaults {
        &self.ntlm
    }
}

impl fmt::Debug for HttpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSettings")
            .field("authentications", &self.authentications)
            .field("proxy", &self.proxy)
            .field("secure_proxy", &self.secure_proxy)
            .field("redirect_mode", &self.redirect_mode)
            .field("max_redirects", &self.max_redirects)
            .field("timeouts", &self.timeouts)
            .field("ntlm", &self.ntlm)
            .finish_non_exhaustive()
    }
}
