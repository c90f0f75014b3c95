//! Error types for artifact-transport crate.

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring the transport or deciding on redirects.
///
/// Configuration errors (`InvalidScope`, `InvalidCredential`,
/// `UnsupportedScheme`) surface from `TransportConfigurer::configure` before any
/// request is sent. Redirect errors are per request and never retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Authentication descriptor without any host scope.
    #[error("Invalid scope: {scheme} authentication has no hosts defined")]
    InvalidScope { scheme: String },

    /// Credential kind does not fit the authentication kind.
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// Authentication kind with no known scheme id.
    #[error("Authentication scheme of '{0}' is not supported")]
    UnsupportedScheme(String),

    /// Redirect limit exceeded.
    #[error("Redirect limit exceeded ({count} redirects, max {max})")]
    RedirectLimitExceeded { count: u32, max: u32 },

    /// Redirect target rejected by the redirect verifier.
    #[error("Redirect to '{0}' denied by verifier")]
    RedirectDenied(String),

    /// Invalid redirect URL.
    #[error("Invalid redirect URL: {0}")]
    InvalidRedirectUrl(String),

    /// URL parsing error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Create an invalid scope error for the given scheme label.
    pub fn invalid_scope(scheme: impl Into<String>) -> Self {
        Self::InvalidScope {
            scheme: scheme.into(),
        }
    }

    /// Create an invalid credential error.
    pub fn invalid_credential(message: impl Into<String>) -> Self {
        Self::InvalidCredential(message.into())
    }

    /// Create an unsupported scheme error.
    pub fn unsupported_scheme(kind: impl Into<String>) -> Self {
        Self::UnsupportedScheme(kind.into())
    }

    /// Create a redirect denied error.
    pub fn redirect_denied(url: impl Into<String>) -> Self {
        Self::RedirectDenied(url.into())
    }

    /// Whether this error is raised while building a client rather than per request.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidScope { .. } | Self::InvalidCredential(_) | Self::UnsupportedScheme(_)
        )
    }
}
