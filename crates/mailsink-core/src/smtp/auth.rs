//! SMTP Authentication module
//!
//! SASL PLAIN and LOGIN payload decoding, and credential resolution against
//! the project store. Decoding never fails loudly: a malformed payload
//! yields empty credentials, which no project matches.

use super::backend::ProjectResolver;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use mailsink_storage::models::Project;
use std::sync::Arc;
use tracing::{debug, warn};

/// Username and password extracted from a SASL exchange
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// SMTP Authentication result
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub success: bool,
    pub project: Option<Project>,
    pub error: Option<String>,
}

impl AuthResult {
    pub fn success(project: Project) -> Self {
        Self {
            success: true,
            project: Some(project),
            error: None,
        }
    }

    pub fn failure(error: &str) -> Self {
        Self {
            success: false,
            project: None,
            error: Some(error.to_string()),
        }
    }
}

/// Decode standard base64, logging and returning `None` on failure
fn decode_base64(encoded: &str) -> Option<Vec<u8>> {
    match BASE64.decode(encoded.trim()) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!("AUTH: Invalid base64 payload: {}", e);
            None
        }
    }
}

/// Decode an AUTH PLAIN payload
///
/// PLAIN format: base64(authzid\0authcid\0password). The payload is split
/// into at most three fields; anything other than exactly three yields
/// empty credentials.
pub fn decode_plain(payload: &str) -> Credentials {
    let Some(decoded) = decode_base64(payload) else {
        return Credentials::default();
    };

    let parts: Vec<&[u8]> = decoded.splitn(3, |&b| b == 0).collect();
    if parts.len() != 3 {
        warn!("AUTH PLAIN: Invalid credential format, got {} parts", parts.len());
        return Credentials::default();
    }

    Credentials::new(
        String::from_utf8_lossy(parts[1]),
        String::from_utf8_lossy(parts[2]),
    )
}

/// Decode one AUTH LOGIN response (username or password)
pub fn decode_login(fragment: &str) -> String {
    decode_base64(fragment)
        .map(|decoded| String::from_utf8_lossy(&decoded).trim().to_string())
        .unwrap_or_default()
}

/// Generate base64 encoded challenge for AUTH LOGIN
pub fn login_challenge_username() -> String {
    BASE64.encode(b"Username:")
}

/// Generate base64 encoded challenge for AUTH LOGIN
pub fn login_challenge_password() -> String {
    BASE64.encode(b"Password:")
}

/// SMTP Authenticator
#[derive(Clone)]
pub struct SmtpAuthenticator {
    resolver: Arc<dyn ProjectResolver>,
}

impl SmtpAuthenticator {
    pub fn new(resolver: Arc<dyn ProjectResolver>) -> Self {
        Self { resolver }
    }

    /// Resolve credentials to a project
    ///
    /// Unknown user, wrong password and lookup errors all produce the same
    /// failure so the client cannot tell them apart.
    pub async fn authenticate(&self, credentials: &Credentials) -> AuthResult {
        if credentials.username.is_empty() {
            debug!("AUTH: Empty username");
            return AuthResult::failure("Authentication failed");
        }

        match self
            .resolver
            .resolve_project(&credentials.username, &credentials.password)
            .await
        {
            Ok(Some(project)) => {
                debug!(
                    "AUTH: Authentication successful for {} (project {})",
                    credentials.username, project.id
                );
                AuthResult::success(project)
            }
            Ok(None) => {
                debug!("AUTH: No project matches user {}", credentials.username);
                AuthResult::failure("Authentication failed")
            }
            Err(e) => {
                warn!("AUTH: Project lookup error: {}", e);
                AuthResult::failure("Authentication failed")
            }
        }
    }
}
