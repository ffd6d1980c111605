use cinebot_protocol::{ChatResponse, HistoryResponse};
use serde::{Deserialize, Serialize};

/// How the backend answers one request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Preset<T> {
    /// A successful response with this body.
    #[serde(rename = "ok")]
    Ok(T),
    /// A non-success status, optionally with `{ "message": ... }`.
    #[serde(rename = "status")]
    Status {
        /// The HTTP status code.
        code: u16,
        /// The error payload's message.
        message: Option<String>,
    },
    /// The request never reaches the server.
    #[serde(rename = "network")]
    Network,
}

/// A preset answer to `POST /chat`.
pub type PresetReply = Preset<ChatResponse>;

/// A preset answer to `GET /chat/history`.
pub type PresetHistory = Preset<HistoryResponse>;

impl PresetReply {
    /// A plain reply without a conversation identifier.
    #[inline]
    pub fn text<S: Into<String>>(reply: S) -> Self {
        Preset::Ok(ChatResponse {
            reply: reply.into(),
            conversation_id: None,
        })
    }

    /// A reply that also assigns a conversation identifier.
    #[inline]
    pub fn text_in<S1: Into<String>, S2: Into<String>>(
        reply: S1,
        conversation_id: S2,
    ) -> Self {
        Preset::Ok(ChatResponse {
            reply: reply.into(),
            conversation_id: Some(conversation_id.into()),
        })
    }
}

impl<T> Preset<T> {
    /// A non-success status with an error message.
    #[inline]
    pub fn status<S: Into<String>>(code: u16, message: S) -> Self {
        Preset::Status {
            code,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_serialize_deserialize() {
        let presets = vec![
            PresetReply::text_in("Hello!", "c-1"),
            PresetReply::status(429, "Slow down"),
            PresetReply::Network,
        ];

        let serialized = serde_json::to_value(&presets).unwrap();
        assert_eq!(
            serialized[0],
            json!({
                "type": "ok",
                "data": { "reply": "Hello!", "conversation_id": "c-1" }
            })
        );
        let deserialized: Vec<PresetReply> =
            serde_json::from_value(serialized).unwrap();

        assert_eq!(presets, deserialized);
    }
}
