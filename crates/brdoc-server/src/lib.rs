//! # brdoc-server
//!
//! HTTP surfaces of the documentation engine:
//! - the variable API exposing data-source values and the invoice
//!   read model as URL-addressable variables
//! - the documentation-generation API (templates, demos, previews,
//!   generation, HTML rendering)
//! - pluggable authentication (shared key, Basic, bearer, SSH
//!   fingerprint) with per-route scope checks

pub mod auth;
pub mod docgen;
pub mod state;
pub mod variables;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

pub use auth::{AuthConfig, AuthContext, AuthMethod};
pub use state::AppState;

async fn health() -> &'static str {
    "ok"
}

/// Assemble the full application router.
pub fn app(state: AppState, auth_config: AuthConfig) -> Router {
    Router::new()
        .merge(variables::router())
        .merge(docgen::router())
        .route("/health", get(health))
        .layer(middleware::from_fn(auth::auth_middleware))
        .layer(axum::Extension(auth_config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use brdoc_runtime::BrConfig;
    use tower::ServiceExt;

    fn test_app(auth_config: AuthConfig) -> Router {
        let state = AppState::new(&BrConfig::default(), None);
        app(state, auth_config)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn variables_listing_returns_all_sources() {
        let app = test_app(AuthConfig::default());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/variables")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["total"], 7);
    }

    #[tokio::test]
    async fn auth_enabled_rejects_anonymous_and_accepts_key() {
        let config = AuthConfig::default().with_api_key("sekret", "system", &["read"]);
        let app = test_app(config.clone());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/variables")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/variables")
                    .header("X-API-Key", "sekret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn read_scope_cannot_generate() {
        let config = AuthConfig::default().with_api_key("ro", "viewer", &["read"]);
        let app = test_app(config);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/doc-generator/generate")
                    .header("X-API-Key", "ro")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"template_id": "project_card", "params": {}}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn template_endpoints_serve_descriptors_and_demos() {
        let app = test_app(AuthConfig::default());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/doc-generator/templates")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["total"], 8);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/doc-generator/templates/project_card")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["id"], "project_card");
        assert!(json["body"].as_str().unwrap().contains("KARTA PROJEKTOWA"));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/doc-generator/demo/project_card")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert!(json["content"].as_str().unwrap().contains("KARTA"));
    }

    #[tokio::test]
    async fn missing_invoice_is_a_polish_404() {
        let app = test_app(AuthConfig::default());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/invoice/inv-404")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("Faktura nie znaleziona"));
    }

    #[tokio::test]
    async fn render_html_wraps_markdown() {
        let app = test_app(AuthConfig::default());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/doc-generator/render-html")
                    .header("content-type", "application/json")
                    .body(Body::from(r##"{"markdown": "# Tytuł dokumentu"}"##))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["html"].as_str().unwrap().contains("<h1"));
    }
}
