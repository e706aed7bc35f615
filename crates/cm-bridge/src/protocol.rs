//! Agent bridge wire records.
//!
//! One JSON object per line in both directions. Requests carry an id,
//! a command name, and an args object; responses echo the id with
//! either `ok:true` + data or `ok:false` + error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct BridgeRequest {
    #[serde(default)]
    pub id: i64,
    pub cmd: String,
    #[serde(default)]
    pub args: Value,
}

impl BridgeRequest {
    /// String argument lookup; absent or non-string yields "".
    pub fn str_arg(&self, name: &str) -> String {
        self.args
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string()
    }

    /// Integer argument lookup with a default.
    pub fn int_arg(&self, name: &str, default: i64) -> i64 {
        self.args.get(name).and_then(Value::as_i64).unwrap_or(default)
    }

    pub fn bool_arg(&self, name: &str) -> bool {
        self.args
            .get(name)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BridgeResponse {
    pub id: i64,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BridgeResponse {
    pub fn success(id: i64, data: Value) -> Self {
        Self {
            id,
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(id: i64, error: impl Into<String>) -> Self {
        Self {
            id,
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// The wire form, newline-terminated.
    pub fn to_line(&self) -> String {
        // A response struct always serializes; the fallback covers the
        // impossible path without panicking in the worker.
        let mut line = serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"id":0,"ok":false,"error":"serialize"}"#.to_string());
        line.push('\n');
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_round_trip() {
        let line = r#"{"id":7,"cmd":"insert_lines","args":{"buffer_id":"main.c","before_line":3,"text":"// hello\n"}}"#;
        let req: BridgeRequest = serde_json::from_str(line).unwrap();
        assert_eq!(req.id, 7);
        assert_eq!(req.cmd, "insert_lines");
        assert_eq!(req.str_arg("buffer_id"), "main.c");
        assert_eq!(req.int_arg("before_line", 1), 3);
        assert_eq!(req.str_arg("text"), "// hello\n");
        assert!(!req.bool_arg("is_regex"));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let req: BridgeRequest = serde_json::from_str(r#"{"cmd":"list_buffers"}"#).unwrap();
        assert_eq!(req.id, 0);
        assert!(req.args.is_null());
        assert_eq!(req.str_arg("anything"), "");
        assert_eq!(req.int_arg("n", 5), 5);
    }

    #[test]
    fn success_response_omits_error() {
        let line = BridgeResponse::success(3, json!({"x": 1})).to_line();
        assert_eq!(line, "{\"id\":3,\"ok\":true,\"data\":{\"x\":1}}\n");
    }

    #[test]
    fn failure_response_omits_data() {
        let line = BridgeResponse::failure(4, "buffer not found: x").to_line();
        assert_eq!(
            line,
            "{\"id\":4,\"ok\":false,\"error\":\"buffer not found: x\"}\n"
        );
    }
}
