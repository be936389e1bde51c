//! JSON-RPC request handlers.

use crate::server::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use docsearch_core::config::SearchConfig;
use docsearch_core::{
    validate, DocSearchError, IndexStats, SearchQuery, ValidationOptions,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// JSON-RPC 2.0 request structure.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 error structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data: None,
            }),
            id,
        }
    }
}

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Main JSON-RPC handler.
pub async fn handle_rpc(
    State(state): State<Arc<AppState>>,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    let method = &request.method;
    let params = request.params.unwrap_or(Value::Object(Default::default()));
    let id = request.id.clone();

    debug!("RPC call: {}({:?})", method, params);

    match dispatch_method(&state, method, &params) {
        Ok(value) => (StatusCode::OK, Json(JsonRpcResponse::success(id, value))),
        Err(e) => {
            error!("RPC error for {}: {}", method, e);
            let code = e.to_rpc_error_code();
            (
                StatusCode::OK,
                Json(JsonRpcResponse::error(id, code, e.to_string())),
            )
        }
    }
}

// ============================================================================
// Helper macros for extracting parameters
// ============================================================================

/// Extract an optional string parameter.
macro_rules! get_str_param {
    ($params:expr, $key:literal) => {
        $params.get($key).and_then(|v| v.as_str())
    };
}

/// Extract a required string parameter or return an error.
macro_rules! require_str_param {
    ($params:expr, $key:literal) => {
        match get_str_param!($params, $key) {
            Some(s) => s.to_string(),
            None => {
                return Err(DocSearchError::InvalidParams {
                    message: format!("Missing required parameter: {}", $key),
                });
            }
        }
    };
}

/// Extract an optional bool parameter, optionally under a camelCase alias.
macro_rules! get_bool_param {
    ($params:expr, $key:literal) => {
        $params.get($key).and_then(|v| v.as_bool())
    };
    ($params:expr, $snake:literal, $camel:literal) => {
        $params
            .get($snake)
            .or_else(|| $params.get($camel))
            .and_then(|v| v.as_bool())
    };
}

/// Extract an optional non-negative integer parameter.
macro_rules! get_usize_param {
    ($params:expr, $key:literal) => {
        $params
            .get($key)
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
    };
}

/// A parameter that may be given as one string or as an array of strings.
fn get_str_list(params: &Value, keys: &[&str]) -> docsearch_core::Result<Vec<String>> {
    let Some(value) = keys.iter().find_map(|key| params.get(*key)) else {
        return Ok(Vec::new());
    };

    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| DocSearchError::InvalidParams {
                        message: format!("Expected a list of strings for {}", keys[0]),
                    })
            })
            .collect(),
        _ => Err(DocSearchError::InvalidParams {
            message: format!("Expected a string or list of strings for {}", keys[0]),
        }),
    }
}

// ============================================================================
// Method dispatcher
// ============================================================================

/// Dispatch a method call to the appropriate handler.
fn dispatch_method(
    state: &AppState,
    method: &str,
    params: &Value,
) -> docsearch_core::Result<Value> {
    match method {
        "health_check" => Ok(json!({
            "status": "ok",
            "entries": state.source.len(),
        })),

        "search" => {
            // `text` is accepted as an alias of `query`.
            let text = get_str_param!(params, "query")
                .or_else(|| get_str_param!(params, "text"))
                .unwrap_or_default()
                .to_string();

            let query = SearchQuery {
                text,
                categories: get_str_list(params, &["categories", "category"])?,
                pages: get_str_list(params, &["pages", "page"])?,
                limit: get_usize_param!(params, "limit")
                    .unwrap_or(SearchConfig::DEFAULT_LIMIT),
                offset: get_usize_param!(params, "offset").unwrap_or(0),
            };

            let result = state.index.search(&query)?;
            Ok(serde_json::to_value(result)?)
        }

        "get_entry" => {
            if let Some(ordinal) = get_usize_param!(params, "ordinal") {
                let entry = state.index.get(ordinal)?.ok_or_else(|| {
                    DocSearchError::EntryNotFound {
                        location: format!("#{}", ordinal),
                    }
                })?;
                return Ok(json!({ "ordinal": ordinal, "entry": entry }));
            }

            let location = require_str_param!(params, "location");
            let entries = state.index.by_location(&location)?;
            if entries.is_empty() {
                return Err(DocSearchError::EntryNotFound { location });
            }
            Ok(json!({ "location": location, "entries": entries }))
        }

        "list_pages" => {
            let pages = state.index.pages()?;
            Ok(json!({ "pages": pages }))
        }

        "get_stats" => {
            let stats = IndexStats::compute(&state.source);
            let fts5 = state.index.fts5_stats()?;
            Ok(json!({
                "path": state.path,
                "stats": stats,
                "fts5": fts5,
            }))
        }

        "validate" => {
            let options = ValidationOptions {
                strict: get_bool_param!(params, "strict").unwrap_or(false),
                allow_unknown_categories: get_bool_param!(
                    params,
                    "allow_unknown_categories",
                    "allowUnknownCategories"
                )
                .unwrap_or(false),
            };
            let report = validate(&state.source, &options);
            Ok(json!({
                "passed": report.passes(options.strict),
                "errors": report.error_count(),
                "warnings": report.warning_count(),
                "report": report,
            }))
        }

        _ => {
            warn!("Method not found: {}", method);
            Err(DocSearchError::MethodNotFound(method.to_string()))
        }
    }
}
