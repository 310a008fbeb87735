//! Documentation-generation API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use brdoc_sources::FetchParams;
use brdoc_templates::TemplateSummary;

use crate::auth::AuthContext;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateSummary>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct PreviewDataRequest {
    pub template_id: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub template_id: String,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub use_llm: bool,
}

#[derive(Debug, Deserialize)]
pub struct RenderHtmlRequest {
    pub markdown: String,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
}

fn forbidden(scope: &str) -> Response {
    let detail = match scope {
        "write" => "Brak uprawnień do zapisu",
        _ => "Brak uprawnień do odczytu",
    };
    (StatusCode::FORBIDDEN, detail.to_string()).into_response()
}

fn template_not_found(id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        format!("Nieznany szablon: {id}"),
    )
        .into_response()
}

fn to_fetch_params(params: &Map<String, Value>) -> FetchParams {
    params
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// GET /doc-generator/templates
async fn list_templates(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Response {
    if !auth.has_scope("read") {
        return forbidden("read");
    }
    let templates = state.templates.list();
    Json(TemplateListResponse {
        total: templates.len(),
        templates,
    })
    .into_response()
}

/// GET /doc-generator/templates/{id}
async fn template_descriptor(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Response {
    if !auth.has_scope("read") {
        return forbidden("read");
    }
    match state.templates.get(&id) {
        Some(template) => Json(template.clone()).into_response(),
        None => template_not_found(&id),
    }
}

/// GET /doc-generator/demo/{id}
async fn template_demo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Response {
    if !auth.has_scope("read") {
        return forbidden("read");
    }
    match state.templates.get(&id) {
        Some(template) => {
            let demo = template
                .demo_body
                .clone()
                .unwrap_or_else(|| template.body.clone());
            Json(serde_json::json!({ "template_id": id, "content": demo })).into_response()
        }
        None => template_not_found(&id),
    }
}

/// POST /doc-generator/preview-data
async fn preview_data(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<PreviewDataRequest>,
) -> Response {
    if !auth.has_scope("read") {
        return forbidden("read");
    }
    let params = to_fetch_params(&request.params);
    match state
        .generator
        .preview_context(&request.template_id, &params, &Map::new())
        .await
    {
        Ok(context) => Json(Value::Object(context)).into_response(),
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}

/// POST /doc-generator/generate
async fn generate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    if !auth.has_scope("write") {
        return forbidden("write");
    }
    let params = to_fetch_params(&request.params);
    match state
        .generator
        .generate(&request.template_id, &params, &Map::new(), request.use_llm)
        .await
    {
        Ok(document) => Json(serde_json::json!({
            "template_id": request.template_id,
            "content": document.markdown,
            "model_generated": document.model_generated,
        }))
        .into_response(),
        Err(e) => Json(serde_json::json!({
            "template_id": request.template_id,
            "content": Value::Null,
            "errors": [e.to_string()],
        }))
        .into_response(),
    }
}

/// POST /doc-generator/render-html
async fn render_html(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<RenderHtmlRequest>,
) -> Response {
    if !auth.has_scope("read") {
        return forbidden("read");
    }
    let title = request
        .template_id
        .as_deref()
        .and_then(|id| state.templates.get(id))
        .map(|t| t.name.clone())
        .unwrap_or_else(|| "Dokument".to_string());
    let style = request.style.as_deref().unwrap_or("default");
    let html = state.renderer.to_html(&request.markdown, &title, style);
    Json(serde_json::json!({ "html": html })).into_response()
}

/// Routes of the documentation-generation API.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/doc-generator/templates", get(list_templates))
        .route("/doc-generator/templates/:id", get(template_descriptor))
        .route("/doc-generator/demo/:id", get(template_demo))
        .route("/doc-generator/preview-data", post(preview_data))
        .route("/doc-generator/generate", post(generate))
        .route("/doc-generator/render-html", post(render_html))
}
