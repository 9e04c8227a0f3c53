//! services/api/src/web/protocol.rs
//!
//! Defines the chat wire format between the browser client and the API server:
//! the JSON request body and the line-framed streamed response.

use bytes::Bytes;
use medilog_core::ChatMessage;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// The full conversation so far; only the last message is answered.
#[derive(Deserialize, Debug, ToSchema)]
pub struct ChatRequest {
    #[serde(default)]
    #[schema(value_type = Vec<Object>, example = json!([{"role": "user", "content": "hello"}]))]
    pub messages: Vec<ChatMessage>,
}

//=========================================================================================
// Frames Sent FROM the Server TO the Client (Browser)
//=========================================================================================
// Each frame is `<code>:<json>\n`. Text is code `0`, errors `3`, and the
// closing frame `d` carries the finish reason.
//=========================================================================================

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FinishReason {
    Stop,
    Error,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FinishPayload {
    finish_reason: FinishReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    Text(String),
    Error(String),
    Finish(FinishReason),
}

impl StreamFrame {
    pub fn encode(&self) -> Bytes {
        let (code, payload) = match self {
            StreamFrame::Text(text) => ('0', serde_json::to_string(text)),
            StreamFrame::Error(message) => ('3', serde_json::to_string(message)),
            StreamFrame::Finish(reason) => (
                'd',
                serde_json::to_string(&FinishPayload {
                    finish_reason: *reason,
                }),
            ),
        };
        // Serializing strings and a fixed struct cannot fail.
        let payload = payload.unwrap_or_else(|_| "null".to_string());
        Bytes::from(format!("{}:{}\n", code, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_json_encoded_lines() {
        assert_eq!(
            StreamFrame::Text("say \"hi\"".to_string()).encode(),
            Bytes::from_static(b"0:\"say \\\"hi\\\"\"\n")
        );
        assert_eq!(
            StreamFrame::Finish(FinishReason::Stop).encode(),
            Bytes::from_static(b"d:{\"finishReason\":\"stop\"}\n")
        );
    }

    #[test]
    fn request_messages_may_omit_ids() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"messages":[{"role":"user","content":"hi"}]}"#).unwrap();
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.messages[0].content, "hi");
    }
}
