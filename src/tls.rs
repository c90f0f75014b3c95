//! TLS protocol version negotiation.
//!
//! Computes the protocol versions offered by the client. Always recomputed per
//! client build: the override variable is re-read every time, so a test
//! harness changing it sees the effect without a restart.

use std::env;
use std::fmt;
use std::sync::Arc;

use rustls::crypto::CryptoProvider;
use rustls::ProtocolVersion;

/// Comma-separated override of the offered protocol list.
pub const HTTPS_PROTOCOLS_ENV: &str = "HTTPS_PROTOCOLS";

pub const TLS_1_2: &str = "TLSv1.2";
pub const TLS_1_3: &str = "TLSv1.3";

/// What the platform's default secure context can do.
pub trait TlsCapabilities: Send + Sync {
    /// Protocol names the default context supports.
    fn supported_protocols(&self) -> Vec<String>;

    /// Runtimes whose TLS 1.3 support is unreliable; pinned to TLS 1.2.
    fn is_legacy_runtime(&self) -> bool {
        false
    }
}

/// Capabilities of the bundled `rustls` client.
///
/// Reports the protocol versions `rustls` enables by default. When a process
/// crypto provider is installed, a version only counts if the provider ships
/// at least one cipher suite for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustlsCapabilities;

impl TlsCapabilities for RustlsCapabilities {
    fn supported_protocols(&self) -> Vec<String> {
        let provider = CryptoProvider::get_default();
        rustls::DEFAULT_VERSIONS
            .iter()
            .filter(|supported| {
                provider.map_or(true, |provider| {
                    provider
                        .cipher_suites
                        .iter()
                        .any(|suite| suite.version().version == supported.version)
                })
            })
            .filter_map(|supported| protocol_name(supported.version))
            .map(str::to_string)
            .collect()
    }
}

fn protocol_name(version: ProtocolVersion) -> Option<&'static str> {
    match version {
        ProtocolVersion::TLSv1_2 => Some(TLS_1_2),
        ProtocolVersion::TLSv1_3 => Some(TLS_1_3),
        _ => None,
    }
}

/// Fixed capabilities, for hosts embedding another TLS engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformTls {
    supported: Vec<String>,
    legacy: bool,
}

impl PlatformTls {
    pub fn new(supported: &[&str]) -> Self {
        Self {
            supported: supported.iter().map(|p| p.to_string()).collect(),
            legacy: false,
        }
    }

    pub fn legacy(mut self, legacy: bool) -> Self {
        self.legacy = legacy;
        self
    }
}

impl TlsCapabilities for PlatformTls {
    fn supported_protocols(&self) -> Vec<String> {
        self.supported.clone()
    }

    fn is_legacy_runtime(&self) -> bool {
        self.legacy
    }
}

/// TLS version bound for engines configured by min/max rather than a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TlsVersion {
    Tls1_0,
    Tls1_1,
    Tls1_2,
    Tls1_3,
}

impl TlsVersion {
    /// Parse `TLSv1.2`, `TLS1.2` or `tlsv1.2` style names.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let version = lower.strip_prefix("tlsv").or_else(|| lower.strip_prefix("tls"))?;
        match version {
            "1" | "1.0" => Some(Self::Tls1_0),
            "1.1" => Some(Self::Tls1_1),
            "1.2" => Some(Self::Tls1_2),
            "1.3" => Some(Self::Tls1_3),
            _ => None,
        }
    }
}

/// Ordered, non-empty list of protocol names to offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsProtocols(Vec<String>);

impl TlsProtocols {
    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|p| p == name)
    }

    /// Lowest recognised version in the list.
    pub fn min_version(&self) -> Option<TlsVersion> {
        self.0.iter().filter_map(|p| TlsVersion::from_name(p)).min()
    }

    /// Highest recognised version in the list.
    pub fn max_version(&self) -> Option<TlsVersion> {
        self.0.iter().filter_map(|p| TlsVersion::from_name(p)).max()
    }
}

impl fmt::Display for TlsProtocols {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

/// Chooses protocol versions from the override variable or platform probing.
#[derive(Clone)]
pub struct TlsProtocolNegotiator {
    capabilities: Arc<dyn TlsCapabilities>,
}

impl TlsProtocolNegotiator {
    pub fn new(capabilities: Arc<dyn TlsCapabilities>) -> Self {
        Self { capabilities }
    }

    /// Negotiate using the current value of `HTTPS_PROTOCOLS`.
    pub fn negotiate(&self) -> TlsProtocols {
        let override_value = env::var(HTTPS_PROTOCOLS_ENV).ok();
        self.negotiate_with_override(override_value.as_deref())
    }

    /// Negotiate with an explicit override value.
    ///
    /// A non-empty override is split on commas and trusted verbatim. Without
    /// one, legacy runtimes get TLS 1.2 only; otherwise TLS 1.3 is appended
    /// when the platform supports it.
    pub fn negotiate_with_override(&self, override_value: Option<&str>) -> TlsProtocols {
        if let Some(value) = override_value.filter(|v| !v.trim().is_empty()) {
            let protocols: Vec<String> = value.split(',').map(str::to_string).collect();
            tracing::debug!("Using TLS protocols from {}: {:?}", HTTPS_PROTOCOLS_ENV, protocols);
            return TlsProtocols(protocols);
        }

        if self.capabilities.is_legacy_runtime() {
            return TlsProtocols(vec![TLS_1_2.to_string()]);
        }

        let supports_tls13 = self
            .capabilities
            .supported_protocols()
            .iter()
            .any(|p| p == TLS_1_3);
        if supports_tls13 {
            TlsProtocols(vec![TLS_1_2.to_string(), TLS_1_3.to_string()])
        } else {
            TlsProtocols(vec![TLS_1_2.to_string()])
        }
    }
}

impl Default for TlsProtocolNegotiator {
    fn default() -> Self {
        Self::new(Arc::new(RustlsCapabilities))
    }
}

impl fmt::Debug for TlsProtocolNegotiator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsProtocolNegotiator").finish_non_exhaustive()
    }
}
