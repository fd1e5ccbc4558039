use super::types::{JsonRpcRequest, JsonRpcResponse};
use super::{INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND};
use crate::error::AppError;
use crate::state::AppState;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Newest first; the first entry is offered when the client asks for something else.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

pub const SERVER_NAME: &str = "nvc";

pub const INSTRUCTIONS: &str = "Welcome to the NVC (Nonviolent Communication) server!
Nonviolent Communication is a way of connecting with ourselves and others that lets our natural compassion flourish, by focusing on what we observe, feel, need, and request rather than on judgments or demands.
This server helps you understand and apply NVC, surfacing the feelings and needs behind everyday thoughts and messages.

Tools:
- thought_clarifier: paste any raw thought, rant, or unsent message and get a structured NVC analysis (observations, feelings, needs, request)
- transform_message: rewrite any message (email, chat, feedback) using NVC principles, with one-shot or guided step-by-step mode
- nvc_trainer: practice NVC with interactive exercises on observations, feelings, needs, or requests (3 difficulty levels)
- political_discourse: analyze political citations through the NVC lens, identifying life-alienating patterns and surfacing the human needs behind political rhetoric
- political_debate: simulate a political debate between two parties on chosen topics using NVC, surfacing human needs behind positions
- submit_feedback: send feedback about the NVC tools (stored locally)

Resources (browsable knowledge base):
- nvc://intro: getting started guide
- nvc://catalogs/feelings: ~120 feelings organized by met/unmet needs
- nvc://catalogs/needs: universal human needs in 9 categories
- nvc://knowledge/overview: what NVC is and why it matters
- nvc://knowledge/four-components: observation, feeling, need, request explained
- nvc://knowledge/principles: core principles and common pitfalls
- nvc://knowledge/examples: worked NVC analyses

Try it: tell me what's bugging you and I'll use thought_clarifier to find the feelings and needs underneath. Or say \"show me the feelings catalog\" to browse the knowledge base.";

#[derive(Debug, Deserialize)]
struct InitializeParams {
    #[serde(default, rename = "protocolVersion")]
    protocol_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ReadResourceParams {
    uri: String,
}

/// Run one request on the blocking pool. `None` for notifications.
///
/// Tool handlers may touch the filesystem, so the whole call leaves the async workers.
pub async fn dispatch(state: Arc<AppState>, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
    let id = request.id.clone().unwrap_or(Value::Null);
    let notification = request.is_notification();

    match tokio::task::spawn_blocking(move || handle(&state, request)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Request task failed");
            (!notification).then(|| {
                JsonRpcResponse::failure(id, INTERNAL_ERROR, format!("Internal error: {}", e), None)
            })
        }
    }
}

/// Handle one request synchronously. `None` for notifications.
pub fn handle(state: &AppState, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
    let Some(id) = request.id.clone() else {
        tracing::debug!(method = %request.method, "Notification received");
        return None;
    };

    tracing::debug!(method = %request.method, id = %id, "Request received");
    let params = request.params.unwrap_or(Value::Null);

    let outcome = match request.method.as_str() {
        "initialize" => initialize(params),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(list_tools(state)),
        "tools/call" => call_tool(state, params),
        "resources/list" => Ok(list_resources(state)),
        "resources/templates/list" => Ok(json!({ "resourceTemplates": [] })),
        "resources/read" => read_resource(state, params),
        other => Err(JsonRpcResponse::failure(
            Value::Null,
            METHOD_NOT_FOUND,
            format!("Method not found: {}", other),
            None,
        )),
    };

    Some(match outcome {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(mut response) => {
            response.id = id;
            response
        }
    })
}

type Outcome = Result<Value, JsonRpcResponse>;

fn invalid_params(message: impl Into<String>) -> JsonRpcResponse {
    JsonRpcResponse::failure(Value::Null, INVALID_PARAMS, message, None)
}

fn parse_params<T: for<'de> Deserialize<'de>>(params: Value) -> Result<T, JsonRpcResponse> {
    serde_json::from_value(params).map_err(|e| invalid_params(format!("Invalid params: {}", e)))
}

fn error_response(err: &AppError) -> JsonRpcResponse {
    let data = match err {
        AppError::ValidationError { field, reason } => Some(json!({ "field": field, "reason": reason })),
        _ => None,
    };
    JsonRpcResponse::failure(Value::Null, err.rpc_code(), err.to_string(), data)
}

fn initialize(params: Value) -> Outcome {
    let params: InitializeParams = parse_params(params)?;
    let requested = params.protocol_version.unwrap_or_default();
    let version = SUPPORTED_PROTOCOL_VERSIONS
        .iter()
        .find(|v| **v == requested)
        .copied()
        .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0]);

    tracing::info!(requested = %requested, negotiated = version, "Client initialized");

    Ok(json!({
        "protocolVersion": version,
        "capabilities": {
            "tools": { "listChanged": false },
            "resources": { "subscribe": false, "listChanged": false },
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
        "instructions": INSTRUCTIONS,
    }))
}

fn list_tools(state: &AppState) -> Value {
    let tools: Vec<Value> = state
        .registry
        .tools()
        .iter()
        .map(|t| {
            json!({
                "name": t.name,
                "description": t.description,
                "inputSchema": t.input_schema.to_json_schema(),
            })
        })
        .collect();
    json!({ "tools": tools })
}

fn call_tool(state: &AppState, params: Value) -> Outcome {
    let params: CallToolParams = parse_params(params)?;
    if state.registry.tool(&params.name).is_none() {
        return Err(invalid_params(format!("Unknown tool: {}", params.name)));
    }

    let arguments = params.arguments.unwrap_or(Value::Null);
    match state.registry.invoke_tool(&params.name, &arguments) {
        Ok(output) => {
            let mut result = json!({
                "content": [{ "type": "text", "text": output.text }],
            });
            if let Some(structured) = output.structured {
                result["structuredContent"] = structured;
            }
            Ok(result)
        }
        // Storage failures are tool-level results so the model can tell the user.
        Err(err @ AppError::StorageError(_)) => Ok(json!({
            "content": [{ "type": "text", "text": err.to_string() }],
            "isError": true,
        })),
        Err(err) => Err(error_response(&err)),
    }
}

fn list_resources(state: &AppState) -> Value {
    let resources: Vec<Value> = state
        .registry
        .resources()
        .iter()
        .map(|r| {
            json!({
                "name": r.name,
                "uri": r.uri,
                "description": r.description,
                "mimeType": r.mime_kind.mime_type(),
            })
        })
        .collect();
    json!({ "resources": resources })
}

fn read_resource(state: &AppState, params: Value) -> Outcome {
    let params: ReadResourceParams = parse_params(params)?;
    let entry = state.registry.resolve_resource(&params.uri).map_err(|err| {
        let mut response = error_response(&err);
        if let Some(error) = response.error.as_mut() {
            error.data = Some(json!({ "uri": params.uri }));
        }
        response
    })?;

    Ok(json!({
        "contents": [{
            "uri": params.uri,
            "mimeType": entry.mime_kind.mime_type(),
            "text": entry.body,
        }],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::protocol::{RESOURCE_NOT_FOUND, INVALID_PARAMS};
    use tempfile::tempdir;

    fn state() -> (tempfile::TempDir, AppState) {
        let dir = tempdir().unwrap();
        let state = AppState::new(Config::embedded(dir.path().join("feedback.json"))).unwrap();
        (dir, state)
    }

    fn request(id: i64, method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".into(),
            id: Some(json!(id)),
            method: method.into(),
            params: Some(params),
        }
    }

    #[test]
    fn test_initialize_negotiates_version() {
        let (_dir, state) = state();
        let resp = handle(&state, request(1, "initialize", json!({"protocolVersion": "2024-11-05"}))).unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "nvc");
        assert!(result["instructions"].as_str().unwrap().contains("political_debate"));

        let resp = handle(&state, request(2, "initialize", json!({"protocolVersion": "1999-01-01"}))).unwrap();
        assert_eq!(resp.result.unwrap()["protocolVersion"], SUPPORTED_PROTOCOL_VERSIONS[0]);
    }

    #[test]
    fn test_notifications_get_no_reply() {
        let (_dir, state) = state();
        let note = JsonRpcRequest {
            jsonrpc: "2.0".into(),
            id: None,
            method: "notifications/initialized".into(),
            params: None,
        };
        assert!(handle(&state, note).is_none());
    }

    #[test]
    fn test_null_id_gets_a_reply() {
        let (_dir, state) = state();
        let mut req = request(0, "ping", json!({}));
        req.id = Some(Value::Null);

        let resp = handle(&state, req).unwrap();
        assert_eq!(resp.id, Value::Null);
        assert_eq!(resp.result, Some(json!({})));
    }

    #[test]
    fn test_unknown_method() {
        let (_dir, state) = state();
        let resp = handle(&state, request(5, "prompts/list", json!({}))).unwrap();
        assert_eq!(resp.id, json!(5));
        assert_eq!(resp.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[test]
    fn test_validation_error_is_invalid_params_with_field() {
        let (_dir, state) = state();
        let resp = handle(
            &state,
            request(3, "tools/call", json!({"name": "nvc_trainer", "arguments": {"topic": "colors"}})),
        )
        .unwrap();
        let error = resp.error.unwrap();
        assert_eq!(error.code, INVALID_PARAMS);
        assert_eq!(error.data.unwrap()["field"], "topic");
    }

    #[test]
    fn test_unknown_tool_is_invalid_params() {
        let (_dir, state) = state();
        let resp = handle(&state, request(4, "tools/call", json!({"name": "nope"}))).unwrap();
        let error = resp.error.unwrap();
        assert_eq!(error.code, INVALID_PARAMS);
        assert!(error.message.contains("nope"));
    }

    #[test]
    fn test_read_unknown_resource() {
        let (_dir, state) = state();
        let resp = handle(&state, request(6, "resources/read", json!({"uri": "nvc://missing"}))).unwrap();
        let error = resp.error.unwrap();
        assert_eq!(error.code, RESOURCE_NOT_FOUND);
        assert_eq!(error.data.unwrap()["uri"], "nvc://missing");
    }

    #[test]
    fn test_storage_failure_is_tool_error_result() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feedback.json");
        std::fs::write(&path, "not json").unwrap();
        let state = AppState::new(Config::embedded(&path)).unwrap();

        let resp = handle(
            &state,
            request(7, "tools/call", json!({"name": "submit_feedback", "arguments": {"text": "hi"}})),
        )
        .unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Feedback was not recorded"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json");
    }
}
