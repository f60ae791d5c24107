// Wire protocol for store clients connected over the WebSocket.
// Both directions derive Serialize and Deserialize so client crates can reuse the types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages a client sends to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    // Overwrite the value at a path (null removes).
    Set { path: String, value: Value },
    // Append under a generated key; answered with `Pushed` carrying the same request id.
    Push {
        request_id: u64,
        path: String,
        value: Value,
    },
    // Delete the value at a path; deleting a missing path is a no-op.
    Remove { path: String },
    // Start receiving `Value` messages for a path, beginning with its current value.
    Subscribe { path: String },
}

/// Messages the store sends to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Full value at a subscribed path, echoing the path string the client subscribed with.
    Value { path: String, value: Value },
    // Generated key for a push request.
    Pushed { request_id: u64, key: String },
    // Rejected request; `request_id` is set when the failed request was a push.
    Error {
        #[serde(default)]
        request_id: Option<u64>,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn when_push_is_parsed_then_tagged_layout_is_used() {
        let raw = r#"{"type":"Push","data":{"request_id":7,"path":"bullets","value":{"x":1}}}"#;
        let msg: ClientMessage = serde_json::from_str(raw).expect("valid push message");
        assert_eq!(
            msg,
            ClientMessage::Push {
                request_id: 7,
                path: "bullets".to_string(),
                value: json!({"x": 1}),
            }
        );
    }

    #[test]
    fn when_error_omits_request_id_then_it_defaults_to_none() {
        let raw = r#"{"type":"Error","data":{"message":"invalid path"}}"#;
        let msg: ServerMessage = serde_json::from_str(raw).expect("valid error message");
        assert_eq!(
            msg,
            ServerMessage::Error {
                request_id: None,
                message: "invalid path".to_string(),
            }
        );
    }
}
