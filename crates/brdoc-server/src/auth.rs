//! Pluggable authentication for the HTTP surfaces.
//!
//! Supported shapes: shared-key header (`X-API-Key`), HTTP Basic,
//! bearer token, and an ambient SSH-key fingerprint header for CLI
//! clients. Routes enforce scopes through `AuthContext::has_scope`.

use std::collections::HashMap;

use axum::{
    body::Body,
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::Engine;
use serde::Serialize;

/// How a request authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    ApiKey,
    Basic,
    Bearer,
    SshKey,
    Anonymous,
}

/// Authentication context attached to every request.
#[derive(Debug, Clone, Serialize)]
pub struct AuthContext {
    pub method: AuthMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub scopes: Vec<String>,
}

impl AuthContext {
    pub fn anonymous(scopes: &[&str]) -> Self {
        Self {
            method: AuthMethod::Anonymous,
            user: None,
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope || s == "admin")
    }
}

/// A configured principal.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: String,
    pub scopes: Vec<String>,
}

/// Authentication configuration.
///
/// Disabled by default: anonymous requests then carry read and write
/// scope, matching a trusted-network deployment.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub enabled: bool,
    /// Shared keys accepted via `X-API-Key` or `Authorization: Bearer`.
    pub api_keys: HashMap<String, Principal>,
    /// Basic-auth users: username → (password, principal).
    pub basic_users: HashMap<String, (String, Principal)>,
    /// SSH key fingerprints accepted via `X-SSH-Fingerprint`.
    pub ssh_fingerprints: HashMap<String, Principal>,
}

impl AuthConfig {
    pub fn with_api_key(mut self, key: impl Into<String>, user: &str, scopes: &[&str]) -> Self {
        self.enabled = true;
        self.api_keys.insert(
            key.into(),
            Principal {
                user: user.to_string(),
                scopes: scopes.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    pub fn with_basic_user(
        mut self,
        user: &str,
        password: impl Into<String>,
        scopes: &[&str],
    ) -> Self {
        self.enabled = true;
        self.basic_users.insert(
            user.to_string(),
            (
                password.into(),
                Principal {
                    user: user.to_string(),
                    scopes: scopes.iter().map(|s| s.to_string()).collect(),
                },
            ),
        );
        self
    }

    pub fn with_ssh_fingerprint(
        mut self,
        fingerprint: impl Into<String>,
        user: &str,
        scopes: &[&str],
    ) -> Self {
        self.enabled = true;
        self.ssh_fingerprints.insert(
            fingerprint.into(),
            Principal {
                user: user.to_string(),
                scopes: scopes.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    fn authenticate(&self, request: &Request<Body>) -> Option<AuthContext> {
        // Shared key header.
        if let Some(key) = header_str(request, "x-api-key") {
            if let Some(principal) = self.api_keys.get(key) {
                return Some(context(AuthMethod::ApiKey, principal));
            }
        }
        // Authorization: Bearer / Basic.
        if let Some(auth) = header_str(request, header::AUTHORIZATION.as_str()) {
            if let Some(token) = auth.strip_prefix("Bearer ") {
                if let Some(principal) = self.api_keys.get(token) {
                    return Some(context(AuthMethod::Bearer, principal));
                }
            }
            if let Some(encoded) = auth.strip_prefix("Basic ") {
                if let Some((user, password)) = decode_basic(encoded) {
                    if let Some((expected, principal)) = self.basic_users.get(&user) {
                        if expected == &password {
                            return Some(context(AuthMethod::Basic, principal));
                        }
                    }
                }
            }
        }
        // Ambient SSH fingerprint.
        if let Some(fingerprint) = header_str(request, "x-ssh-fingerprint") {
            if let Some(principal) = self.ssh_fingerprints.get(fingerprint) {
                return Some(context(AuthMethod::SshKey, principal));
            }
        }
        None
    }
}

fn header_str<'r>(request: &'r Request<Body>, name: &str) -> Option<&'r str> {
    request.headers().get(name).and_then(|v| v.to_str().ok())
}

fn context(method: AuthMethod, principal: &Principal) -> AuthContext {
    AuthContext {
        method,
        user: Some(principal.user.clone()),
        scopes: principal.scopes.clone(),
    }
}

/// Middleware resolving the request's `AuthContext`.
///
/// With auth disabled every request is anonymous with read and write
/// scope; with auth enabled an unauthenticated request is rejected.
pub async fn auth_middleware(
    axum::Extension(config): axum::Extension<AuthConfig>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let context = if config.enabled {
        match config.authenticate(&request) {
            Some(ctx) => ctx,
            None => {
                return (
                    StatusCode::UNAUTHORIZED,
                    [(header::WWW_AUTHENTICATE, "Bearer")],
                    "Wymagane uwierzytelnienie",
                )
                    .into_response();
            }
        }
    } else {
        AuthContext::anonymous(&["read", "write"])
    };

    request.extensions_mut().insert(context);
    next.run(request).await
}

/// Decode a `user:password` Basic credential.
fn decode_basic(encoded: &str) -> Option<(String, String)> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let text = String::from_utf8(bytes).ok()?;
    let (user, password) = text.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scopes_gate_access() {
        let ctx = AuthContext::anonymous(&["read"]);
        assert!(ctx.has_scope("read"));
        assert!(!ctx.has_scope("write"));

        let admin = AuthContext {
            method: AuthMethod::ApiKey,
            user: Some("root".to_string()),
            scopes: vec!["admin".to_string()],
        };
        assert!(admin.has_scope("read"));
        assert!(admin.has_scope("write"));
    }

    #[test]
    fn basic_credentials_decode() {
        // "user:pass" in base64.
        assert_eq!(
            decode_basic("dXNlcjpwYXNz"),
            Some(("user".to_string(), "pass".to_string()))
        );
        assert_eq!(decode_basic("!!!"), None);
    }

    #[test]
    fn api_key_lookup() {
        let config = AuthConfig::default().with_api_key("sekret", "system", &["read", "write"]);
        let request = Request::builder()
            .uri("/api/variables")
            .header("X-API-Key", "sekret")
            .body(Body::empty())
            .unwrap();
        let ctx = config.authenticate(&request).unwrap();
        assert_eq!(ctx.method, AuthMethod::ApiKey);
        assert!(ctx.has_scope("write"));

        let bad = Request::builder()
            .uri("/api/variables")
            .header("X-API-Key", "zly")
            .body(Body::empty())
            .unwrap();
        assert!(config.authenticate(&bad).is_none());
    }

    #[test]
    fn ssh_fingerprint_lookup() {
        let config = AuthConfig::default().with_ssh_fingerprint(
            "SHA256:abcdef",
            "cli",
            &["read"],
        );
        let request = Request::builder()
            .uri("/api/variables")
            .header("X-SSH-Fingerprint", "SHA256:abcdef")
            .body(Body::empty())
            .unwrap();
        let ctx = config.authenticate(&request).unwrap();
        assert_eq!(ctx.method, AuthMethod::SshKey);
    }
}
