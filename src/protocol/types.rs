use super::{INVALID_REQUEST, PARSE_ERROR};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    /// Absent for notifications. An explicit `null` is `Some(Value::Null)`.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Only runs when the member exists, so `null` stays distinct from a missing id.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
                data,
            }),
        }
    }
}

/// Decode one JSON-RPC message. On failure, the error response to send back.
pub fn parse_message(raw: &[u8]) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_slice(raw).map_err(|e| {
        JsonRpcResponse::failure(Value::Null, PARSE_ERROR, format!("Parse error: {}", e), None)
    })?;

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    if !value.is_object() {
        return Err(JsonRpcResponse::failure(
            id,
            INVALID_REQUEST,
            "Invalid request: expected a single JSON-RPC object",
            None,
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| JsonRpcResponse::failure(id, INVALID_REQUEST, format!("Invalid request: {}", e), None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_request_and_notification() {
        let req = parse_message(br#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#).unwrap();
        assert_eq!(req.id, Some(json!(7)));
        assert!(!req.is_notification());

        let note = parse_message(br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).unwrap();
        assert!(note.is_notification());
    }

    #[test]
    fn test_null_id_is_a_request() {
        let req = parse_message(br#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#).unwrap();
        assert_eq!(req.id, Some(Value::Null));
        assert!(!req.is_notification());

        let encoded = serde_json::to_value(&req).unwrap();
        assert_eq!(encoded.get("id"), Some(&Value::Null));
    }

    #[test]
    fn test_parse_errors() {
        let err = parse_message(b"{ nope").unwrap_err();
        assert_eq!(err.error.unwrap().code, PARSE_ERROR);

        let err = parse_message(br#"[{"jsonrpc":"2.0","id":1,"method":"ping"}]"#).unwrap_err();
        assert_eq!(err.error.unwrap().code, INVALID_REQUEST);

        let err = parse_message(br#"{"jsonrpc":"2.0","id":3}"#).unwrap_err();
        assert_eq!(err.id, json!(3));
        assert_eq!(err.error.unwrap().code, INVALID_REQUEST);
    }

    #[test]
    fn test_response_omits_empty_members() {
        let ok = serde_json::to_value(JsonRpcResponse::success(json!(1), json!({}))).unwrap();
        assert!(ok.get("error").is_none());
        let err = serde_json::to_value(JsonRpcResponse::failure(json!(1), -1, "x", None)).unwrap();
        assert!(err.get("result").is_none());
        assert!(err["error"].get("data").is_none());
    }
}
