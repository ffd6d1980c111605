use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sender {
    /// The person using the widget.
    #[serde(rename = "user")]
    User,
    /// The cinema assistant.
    #[serde(rename = "bot")]
    Assistant,
}

/// One prior turn sent along with an anonymous request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryTurn {
    /// The displayed text of the turn.
    pub text: String,
    /// The author of the turn.
    pub sender: Sender,
}

/// The body of `POST /chat`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ChatRequest {
    /// A signed-in user. The server keeps the conversation, so only its
    /// identifier is sent (`null` on the first turn).
    Authenticated {
        /// The user's text.
        message: String,
        /// The server-side conversation, if one was started already.
        conversation_id: Option<String>,
    },
    /// A guest. The server is stateless for guests, so recent turns
    /// travel with every request.
    Anonymous {
        /// The user's text.
        message: String,
        /// A trailing window of the local log.
        history: Vec<HistoryTurn>,
    },
}

impl ChatRequest {
    /// Returns the user's text of this request.
    #[inline]
    pub fn message(&self) -> &str {
        match self {
            ChatRequest::Authenticated { message, .. } => message,
            ChatRequest::Anonymous { message, .. } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_authenticated_body() {
        let req = ChatRequest::Authenticated {
            message: "Hi".to_owned(),
            conversation_id: Some("abc".to_owned()),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "message": "Hi", "conversation_id": "abc" })
        );

        // The first turn still carries the key, with a null value.
        let req = ChatRequest::Authenticated {
            message: "Hi".to_owned(),
            conversation_id: None,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "message": "Hi", "conversation_id": null })
        );
    }

    #[test]
    fn test_anonymous_body() {
        let req = ChatRequest::Anonymous {
            message: "Any seats left?".to_owned(),
            history: vec![
                HistoryTurn {
                    text: "What's on tonight?".to_owned(),
                    sender: Sender::User,
                },
                HistoryTurn {
                    text: "Dune, at 20:00.".to_owned(),
                    sender: Sender::Assistant,
                },
            ],
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "message": "Any seats left?",
                "history": [
                    { "text": "What's on tonight?", "sender": "user" },
                    { "text": "Dune, at 20:00.", "sender": "bot" }
                ]
            })
        );
        assert!(
            serde_json::to_value(&req)
                .unwrap()
                .get("conversation_id")
                .is_none()
        );
    }
}
