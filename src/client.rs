//! Client configuration entry point.
//!
//! [`TransportConfigurer::configure`] turns an [`HttpSettings`] bundle into a
//! [`ConfiguredClient`]: negotiated TLS protocols, the credential registry, the
//! preemptive-auth hook, proxy credentials and the redirect policy. All
//! configuration errors surface here, before any request is sent.

use std::sync::Arc;
use std::time::Duration;

use http::header::{HeaderMap, HeaderName, HeaderValue, LOCATION, USER_AGENT};
use http::{Method, Request, StatusCode};
use url::Url;

use crate::auth::scheme::{is_preemptive_enabled, select_preemptive_scheme, REACTIVE_SCHEMES};
use crate::auth::{
    AuthNegotiationState, CredentialScopeRegistry, Preemption, PreemptiveAuthInterceptor,
    SchemeId, ScopedCredential,
};
use crate::error::{Error, Result};
use crate::proxy::{ProxyConfigurator, RoutePlanner};
use crate::redirect::{
    is_redirect_status, resolve_location, strip_sensitive_headers, RedirectPolicy, RedirectStrategy,
};
use crate::settings::HttpSettings;
use crate::tls::{TlsProtocolNegotiator, TlsProtocols};

/// Connection pool ceiling, applied both per route and in total.
pub const MAX_HTTP_CONNECTIONS: usize = 20;

/// Connection pool limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionLimits {
    pub per_route: usize,
    pub total: usize,
}

impl Default for ConnectionLimits {
    fn default() -> Self {
        Self {
            per_route: MAX_HTTP_CONNECTIONS,
            total: MAX_HTTP_CONNECTIONS,
        }
    }
}

/// Per-request settings forwarded to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestConfig {
    pub connect_timeout: Option<Duration>,
    pub socket_timeout: Option<Duration>,
    pub max_redirects: u32,
}

/// Socket settings forwarded to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocketConfig {
    pub so_timeout: Option<Duration>,
    pub keep_alive: bool,
}

/// One redirect hop the engine should perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectStep {
    pub target: Url,
    pub method: Method,
    /// Whether the original body is re-sent.
    pub preserve_body: bool,
}

/// `artifact-transport/<version> (<os>;<arch>)`.
pub fn user_agent() -> String {
    format!(
        "artifact-transport/{} ({};{})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// A client ready for request execution by the HTTP engine.
///
/// Immutable once built; clone freely and share across concurrent requests.
#[derive(Debug, Clone)]
pub struct ConfiguredClient {
    tls_protocols: TlsProtocols,
    auth_schemes: Vec<SchemeId>,
    credentials: Arc<CredentialScopeRegistry>,
    preemptive: Option<PreemptiveAuthInterceptor>,
    route_planner: RoutePlanner,
    redirect: RedirectPolicy,
    request_config: RequestConfig,
    socket_config: SocketConfig,
    connection_limits: ConnectionLimits,
    user_agent: HeaderValue,
    credential_headers: Vec<HeaderName>,
}

impl ConfiguredClient {
    pub fn tls_protocols(&self) -> &TlsProtocols {
        &self.tls_protocols
    }

    /// Schemes available for challenge/response negotiation.
    pub fn auth_schemes(&self) -> &[SchemeId] {
        &self.auth_schemes
    }

    /// Credential provider for reactive negotiation with targets and proxies.
    pub fn credentials_for(&self, host: &str, port: u16, scheme: SchemeId) -> Option<&ScopedCredential> {
        self.credentials.lookup(host, port, scheme)
    }

    pub fn credentials(&self) -> &Arc<CredentialScopeRegistry> {
        &self.credentials
    }

    /// Installed preemptive hook; `None` without target authentications.
    pub fn preemptive_auth(&self) -> Option<&PreemptiveAuthInterceptor> {
        self.preemptive.as_ref()
    }

    pub fn route_planner(&self) -> RoutePlanner {
        self.route_planner
    }

    pub fn redirect_policy(&self) -> &RedirectPolicy {
        &self.redirect
    }

    pub fn request_config(&self) -> RequestConfig {
        self.request_config
    }

    pub fn socket_config(&self) -> SocketConfig {
        self.socket_config
    }

    pub fn connection_limits(&self) -> ConnectionLimits {
        self.connection_limits
    }

    pub fn user_agent(&self) -> &HeaderValue {
        &self.user_agent
    }

    /// Run the before-send pipeline on `request`.
    ///
    /// Sets the user agent when missing, then runs preemptive authentication
    /// against the request's own negotiation state.
    pub fn before_send<B>(&self, request: &mut Request<B>, state: &mut AuthNegotiationState) -> Preemption {
        if !request.headers().contains_key(USER_AGENT) {
            request
                .headers_mut()
                .insert(USER_AGENT, self.user_agent.clone());
        }
        match &self.preemptive {
            Some(interceptor) => interceptor.process(request, state),
            None => Preemption::NoCredentials,
        }
    }

    /// Work out the next hop for a redirect response.
    ///
    /// Returns `Ok(None)` when the response should be handed to the caller
    /// as-is: not a redirect, redirects disabled, no `Location`, or not
    /// followed under the active strategy. `Location` is only parsed once the
    /// response is a redirect candidate. `followed` counts redirects already
    /// followed for the request.
    pub fn next_redirect(
        &self,
        method: &Method,
        status: StatusCode,
        current: &Url,
        response_headers: &HeaderMap,
        followed: u32,
    ) -> Result<Option<RedirectStep>> {
        if !is_redirect_status(status) || self.redirect.strategy() == RedirectStrategy::Disabled {
            return Ok(None);
        }
        let Some(location) = response_headers.get(LOCATION) else {
            return Ok(None);
        };
        let location = location
            .to_str()
            .map_err(|e| Error::InvalidRedirectUrl(e.to_string()))?;
        let target = resolve_location(current, location)?;

        let decision = self.redirect.decide(method, status, &target, followed)?;
        if !decision.follow {
            return Ok(None);
        }
        Ok(Some(RedirectStep {
            method: decision.next_method(method),
            preserve_body: decision.preserve_method_and_body,
            target,
        }))
    }

    /// Strip credentials from follow-up request headers when leaving the origin.
    pub fn prepare_redirect_headers(&self, headers: &mut HeaderMap, previous: &Url, next: &Url) {
        strip_sensitive_headers(headers, previous, next, &self.credential_headers);
    }
}

/// Builds configured clients from settings.
#[derive(Debug, Clone, Default)]
pub struct TransportConfigurer {
    tls: TlsProtocolNegotiator,
}

impl TransportConfigurer {
    /// Configurer probing the bundled TLS provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configurer using a specific TLS negotiator.
    pub fn with_tls_negotiator(tls: TlsProtocolNegotiator) -> Self {
        Self { tls }
    }

    /// Compose a client from `settings`.
    ///
    /// Fails with `InvalidScope`, `InvalidCredential` or `UnsupportedScheme`
    /// on the first misconfigured target or proxy authentication.
    pub fn configure(&self, settings: &HttpSettings) -> Result<ConfiguredClient> {
        let tls_protocols = self.tls.negotiate();

        let mut registry = CredentialScopeRegistry::new(settings.ntlm().clone());
        let authentications = settings.authentications();
        registry.register_all(authentications)?;

        let route_planner = ProxyConfigurator::apply(
            settings.http_proxy(),
            settings.https_proxy(),
            &mut registry,
        )?;

        let credential_headers = registry.header_names();
        let credentials = Arc::new(registry);

        let preemptive = (!authentications.is_empty()).then(|| {
            PreemptiveAuthInterceptor::new(
                select_preemptive_scheme(authentications),
                is_preemptive_enabled(authentications),
                Arc::clone(&credentials),
            )
        });

        let redirect = RedirectPolicy::new(
            settings.mode(),
            settings.redirect_limit(),
            settings.verifier(),
        );

        let timeouts = settings.timeout_settings();
        let client = ConfiguredClient {
            tls_protocols,
            auth_schemes: REACTIVE_SCHEMES.to_vec(),
            credentials,
            preemptive,
            route_planner,
            redirect,
            request_config: RequestConfig {
                connect_timeout: timeouts.connect_timeout(),
                socket_timeout: timeouts.socket_timeout(),
                max_redirects: settings.redirect_limit(),
            },
            socket_config: SocketConfig {
                so_timeout: timeouts.socket_timeout(),
                keep_alive: true,
            },
            connection_limits: ConnectionLimits::default(),
            user_agent: HeaderValue::from_str(&user_agent())
                .unwrap_or_else(|_| HeaderValue::from_static("artifact-transport")),
            credential_headers,
        };

        tracing::debug!(
            "Configured client: tls={}, credentials={}, preemptive={:?}, redirects={:?}",
            client.tls_protocols,
            client.credentials.len(),
            client.preemptive.as_ref().map(|p| (p.scheme(), p.always_send())),
            client.redirect.strategy()
        );
        Ok(client)
    }
}
