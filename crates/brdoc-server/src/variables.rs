//! Variable API: URL-addressable access to data-source values and the
//! invoice read model.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use brdoc_sources::{DataSourceDescriptor, FetchParams};

use crate::auth::AuthContext;
use crate::state::AppState;

/// One variable with its provenance.
#[derive(Debug, Serialize)]
pub struct VariableResponse {
    pub name: String,
    pub value: Value,
    pub source: String,
    pub path: String,
}

/// Envelope of a project-scoped variable.
#[derive(Debug, Serialize)]
pub struct ProjectVariableResponse {
    pub project_id: String,
    pub variable: VariableResponse,
    pub verification_url: String,
}

#[derive(Debug, Serialize)]
pub struct VariableListResponse {
    pub variables: Vec<DataSourceDescriptor>,
    pub total: usize,
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FormatQuery {
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "json".to_string()
}

fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, "Brak uprawnień do odczytu").into_response()
}

fn project_params(project_id: &str) -> FetchParams {
    let mut params = FetchParams::new();
    params.insert("project_id".to_string(), Value::from(project_id));
    params
}

/// GET /api/variables
async fn list_variables(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Response {
    if !auth.has_scope("read") {
        return forbidden();
    }
    let variables = state.sources.list();
    Json(VariableListResponse {
        total: variables.len(),
        variables,
        base_url: state.base_url.clone(),
    })
    .into_response()
}

/// GET /api/project/{pid}/variable/{source}?path=field
async fn project_variable(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, source)): Path<(String, String)>,
    Query(query): Query<PathQuery>,
) -> Response {
    if !auth.has_scope("read") {
        return forbidden();
    }
    let result = state
        .sources
        .fetch(&source, &project_params(&project_id))
        .await;
    if let Some(error) = result.error {
        return (StatusCode::INTERNAL_SERVER_ERROR, error).into_response();
    }

    // Missing variables are null with HTTP 200.
    let (value, path) = match &query.path {
        Some(path) => (
            result.payload.get_path(path).cloned().unwrap_or(Value::Null),
            path.clone(),
        ),
        None => (serde_json::to_value(&result.payload).unwrap_or(Value::Null), String::new()),
    };

    let mut verification_url = format!(
        "{}/api/project/{project_id}/variable/{source}",
        state.base_url
    );
    if !path.is_empty() {
        verification_url.push_str(&format!("?path={path}"));
    }

    Json(ProjectVariableResponse {
        project_id,
        variable: VariableResponse {
            name: if path.is_empty() { source.clone() } else { path.clone() },
            value,
            source,
            path,
        },
        verification_url,
    })
    .into_response()
}

/// GET /api/project/{pid}/variable/{source}/{field_path}
async fn project_variable_with_path(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, source, path)): Path<(String, String, String)>,
) -> Response {
    if !auth.has_scope("read") {
        return forbidden();
    }
    let result = state
        .sources
        .fetch(&source, &project_params(&project_id))
        .await;
    if let Some(error) = result.error {
        return (StatusCode::INTERNAL_SERVER_ERROR, error).into_response();
    }

    let value = result.payload.get_path(&path).cloned().unwrap_or(Value::Null);
    let name = path.rsplit('/').next().unwrap_or(&path).to_string();
    let verification_url = format!(
        "{}/api/project/{project_id}/variable/{source}/{path}",
        state.base_url
    );

    Json(ProjectVariableResponse {
        project_id,
        variable: VariableResponse {
            name,
            value,
            source,
            path,
        },
        verification_url,
    })
    .into_response()
}

/// GET /api/project/{pid}/nexus
async fn project_nexus(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<String>,
) -> Response {
    if !auth.has_scope("read") {
        return forbidden();
    }
    let result = state
        .sources
        .fetch("nexus_calculation", &project_params(&project_id))
        .await;
    if let Some(error) = result.error {
        return (StatusCode::INTERNAL_SERVER_ERROR, error).into_response();
    }

    let component = |name: &str| -> f64 {
        result
            .payload
            .get_path(name)
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    };
    let nexus = result
        .payload
        .get_path("nexus")
        .and_then(|v| v.as_f64())
        .unwrap_or(1.0);

    let url = |field: &str| {
        format!(
            "{}/api/project/{project_id}/variable/nexus_calculation/{field}",
            state.base_url
        )
    };

    Json(json!({
        "project_id": project_id,
        "a_direct": component("a_direct"),
        "b_unrelated": component("b_unrelated"),
        "c_related": component("c_related"),
        "d_ip": component("d_ip"),
        "nexus": nexus,
        "formula": "((a + b) × 1.3) / (a + b + c + d)",
        "verification_urls": {
            "a_direct": url("a_direct"),
            "b_unrelated": url("b_unrelated"),
            "c_related": url("c_related"),
            "d_ip": url("d_ip"),
            "nexus": url("nexus"),
        },
    }))
    .into_response()
}

async fn fetch_invoice_row(
    state: &AppState,
    invoice_id: &str,
) -> Result<serde_json::Map<String, Value>, Response> {
    let Some(pool) = &state.pool else {
        return Err(invoice_not_found(invoice_id));
    };
    let query = r#"
        SELECT e.*, d.ocr_text, d.ocr_confidence, d.id AS document_id
        FROM read_models.expenses e
        LEFT JOIN read_models.documents d ON e.document_id = d.id
        WHERE e.id::text = $1 OR e.invoice_number = $1
        LIMIT 1
    "#;
    let row: Option<serde_json::Value> = sqlx::query_scalar(&format!(
        "SELECT row_to_json(t) FROM ({}) t",
        query.trim_end_matches(|c: char| c.is_whitespace())
    ))
    .bind(invoice_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response())?;

    match row.and_then(|v| v.as_object().cloned()) {
        Some(map) => Ok(map),
        None => Err(invoice_not_found(invoice_id)),
    }
}

fn invoice_not_found(invoice_id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        format!("Faktura nie znaleziona: {invoice_id}"),
    )
        .into_response()
}

fn invoice_plain_text(row: &serde_json::Map<String, Value>) -> String {
    let text = |key: &str| {
        row.get(key)
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| "N/A".to_string())
    };
    format!(
        "FAKTURA: {}\nData: {}\nSprzedawca: {}\nNIP: {}\nKwota brutto: {} PLN\n\
         Kwota netto: {} PLN\nKategoria B+R: {}\nKwalifikowany: {}",
        text("invoice_number"),
        text("invoice_date"),
        text("vendor_name"),
        text("vendor_nip"),
        text("gross_amount"),
        text("net_amount"),
        text("br_category"),
        if row.get("br_qualified").and_then(|v| v.as_bool()).unwrap_or(false) {
            "Tak"
        } else {
            "Nie"
        },
    )
}

/// GET /api/invoice/{id}/variable/{field}
async fn invoice_variable(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((invoice_id, field)): Path<(String, String)>,
) -> Response {
    if !auth.has_scope("read") {
        return forbidden();
    }
    let row = match fetch_invoice_row(&state, &invoice_id).await {
        Ok(row) => row,
        Err(response) => return response,
    };
    let value = row.get(&field).cloned().unwrap_or(Value::Null);
    Json(json!({
        "invoice_id": invoice_id,
        "variable": {
            "name": field,
            "value": value,
            "source": "invoice",
            "path": field,
        },
        "document_id": row.get("document_id").cloned().unwrap_or(Value::Null),
    }))
    .into_response()
}

/// GET /api/invoice/{id}?format=json|plain_text|ocr
async fn invoice_data(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(invoice_id): Path<String>,
    Query(query): Query<FormatQuery>,
) -> Response {
    if !auth.has_scope("read") {
        return forbidden();
    }
    let row = match fetch_invoice_row(&state, &invoice_id).await {
        Ok(row) => row,
        Err(response) => return response,
    };

    let data = match query.format.as_str() {
        "ocr" => row
            .get("ocr_text")
            .cloned()
            .unwrap_or(Value::String(String::new())),
        "plain_text" => Value::String(invoice_plain_text(&row)),
        _ => {
            // JSON shape excludes the large OCR text.
            let mut trimmed = row.clone();
            trimmed.remove("ocr_text");
            Value::Object(trimmed)
        }
    };

    Json(json!({
        "invoice_id": invoice_id,
        "format": query.format,
        "data": data,
        "document_id": row.get("document_id").cloned().unwrap_or(Value::Null),
        "ocr_confidence": row.get("ocr_confidence").cloned().unwrap_or(Value::Null),
    }))
    .into_response()
}

/// Routes of the variable API, mounted under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/variables", get(list_variables))
        .route("/api/project/:pid/variable/:source", get(project_variable))
        .route(
            "/api/project/:pid/variable/:source/*path",
            get(project_variable_with_path),
        )
        .route("/api/project/:pid/nexus", get(project_nexus))
        .route("/api/invoice/:id/variable/:field", get(invoice_variable))
        .route("/api/invoice/:id", get(invoice_data))
}
