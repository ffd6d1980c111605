use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::request::Sender;

/// The body of a successful `POST /chat`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The assistant's reply.
    ///
    /// It may embed a single JSON array or object describing a suggested
    /// showtime, or an object overriding the displayed message.
    pub reply: String,
    /// The server-side conversation this reply belongs to.
    #[serde(default, deserialize_with = "lenient_id")]
    pub conversation_id: Option<String>,
}

/// The body of a successful `GET /chat/history`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// The conversation the messages belong to.
    #[serde(default, deserialize_with = "lenient_id")]
    pub conversation_id: Option<String>,
    /// Stored messages, oldest first. Absent when the user has none.
    #[serde(default)]
    pub messages: Option<Vec<HistoryRecord>>,
}

/// A message as stored by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Row identifier on the server, a number or a string.
    pub id: Value,
    /// The displayed text. A missing or `null` text decodes as empty.
    #[serde(default, deserialize_with = "lenient_text")]
    pub text: String,
    /// The author.
    pub sender: Sender,
    /// Creation time as the server formats it: usually an RFC 3339 or
    /// naive date-time string, sometimes epoch milliseconds.
    #[serde(default)]
    pub timestamp: Option<Value>,
    /// Any other fields the server attaches.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The body of a non-success response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason.
    #[serde(default)]
    pub message: Option<String>,
}

// Conversation identifiers are opaque. Some deployments emit them as
// integers, so both forms are accepted and kept as strings.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// One odd record must not make the whole history undecodable.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_history() {
        let resp: HistoryResponse = serde_json::from_value(json!({
            "conversation_id": 17,
            "messages": [
                {
                    "id": 3,
                    "text": "Hello",
                    "sender": "user",
                    "timestamp": "2024-01-01T19:00:00Z",
                    "conversation_id": 17
                },
                { "id": "4", "text": "Hi there!", "sender": "bot" }
            ]
        }))
        .unwrap();
        assert_eq!(resp.conversation_id.as_deref(), Some("17"));
        let messages = resp.messages.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[0].extra.get("conversation_id"), Some(&json!(17)));
        assert_eq!(messages[1].timestamp, None);
    }

    #[test]
    fn test_decode_loose_records() {
        let resp: HistoryResponse = serde_json::from_value(json!({
            "messages": [
                {
                    "id": 1,
                    "text": "Hello",
                    "sender": "user",
                    "timestamp": "2024-01-01T19:00:00Z"
                },
                {
                    "id": 2,
                    "text": null,
                    "sender": "bot",
                    "timestamp": 1704135600000u64
                }
            ]
        }))
        .unwrap();
        let messages = resp.messages.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].timestamp, Some(json!("2024-01-01T19:00:00Z")));
        assert_eq!(messages[1].text, "");
        assert_eq!(messages[1].timestamp, Some(json!(1704135600000u64)));
    }

    #[test]
    fn test_decode_empty_history() {
        let resp: HistoryResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(resp, HistoryResponse::default());

        let resp: HistoryResponse = serde_json::from_value(
            json!({ "messages": null, "conversation_id": "" }),
        )
        .unwrap();
        assert_eq!(resp, HistoryResponse::default());
    }

    #[test]
    fn test_decode_chat_response() {
        let resp: ChatResponse =
            serde_json::from_value(json!({ "reply": "Sure." })).unwrap();
        assert_eq!(resp.reply, "Sure.");
        assert_eq!(resp.conversation_id, None);

        let resp: ChatResponse = serde_json::from_value(
            json!({ "reply": "Sure.", "conversation_id": "c-1" }),
        )
        .unwrap();
        assert_eq!(resp.conversation_id.as_deref(), Some("c-1"));
    }
}
