//! Authentication descriptors, credential scoping and preemptive submission.
//!
//! - [`descriptor`]: what the caller configures (kind, host scopes, credential).
//! - [`scheme`]: scheme ids and the selection rules built on them.
//! - [`registry`]: `(host, port, realm, scheme)` to credential mapping.
//! - [`preemptive`]: before-send hook attaching credentials ahead of a challenge.
//! - [`ntlm`]: NTLM credential derivation from `domain\user` names.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

pub mod descriptor;
pub mod ntlm;
pub mod preemptive;
pub mod registry;
pub mod scheme;

pub use descriptor::{AuthKind, AuthenticationDescriptor, CredentialMaterial, HostScope};
pub use ntlm::{NtlmCredentials, NtlmDefaults};
pub use preemptive::{AuthNegotiationState, Preemption, PreemptiveAuthInterceptor};
pub use registry::{AuthScope, CredentialScopeRegistry, ScopedCredential};
pub use scheme::SchemeId;

/// Generate Basic Auth header value (RFC 7617).
///
/// # Arguments
/// * `username` - The user ID.
/// * `password` - The password.
///
/// # Returns
/// "Basic " followed by base64-encoded credentials.
pub fn basic_auth(username: &str, password: &str) -> String {
    let plain = format!("{}:{}", username, password);
    let encoded = BASE64.encode(plain);
    format!("Basic {}", encoded)
}

/// Parse a Basic Auth header value.
///
/// Returns (username, password) or None if invalid.
pub fn parse_basic_auth(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix("Basic ")?.trim();
    let decoded_vec = BASE64.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded_vec).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}
