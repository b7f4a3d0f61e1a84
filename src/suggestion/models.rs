use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Body of a chat-completion request
#[derive(Debug, Serialize, Clone)]
pub struct ChatRequest {
    /// Hosted model identifier
    pub model: String,

    /// Conversation; always a single user message here
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: Vec<ContentPart>,
}

/// One part of a multimodal message
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ImageUrl {
    pub url: String,
}

impl ChatRequest {
    /// Builds a single user message carrying the instruction and the inline image
    pub fn with_image(model: &str, prompt: &str, image_url: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text { text: prompt.to_string() },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: image_url.to_string() },
                    },
                ],
            }],
        }
    }
}

/// Raw chat-completion reply.
///
/// Every field is optional so that error bodies and half-formed replies still
/// deserialize; deciding what is usable is left to the parser.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,

    /// Present on provider errors, either an object with a `message` or a bare string
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Best-effort conversion of a decoded body. A shape that does not fit (content
    /// parts instead of a string, a top-level array, ...) gives an empty reply.
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value(value) {
            Ok(reply) => reply,
            Err(e) => {
                debug!("Reply does not have the expected shape: {}", e);
                Self::default()
            }
        }
    }

    /// Text of the first choice, if the reply has one
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .as_ref()?
            .first()?
            .message
            .as_ref()?
            .content
            .as_deref()
    }

    /// Provider error message, if the reply carries one
    pub fn error_message(&self) -> Option<&str> {
        match self.error.as_ref()? {
            Value::String(message) => Some(message.as_str()),
            error => error.get("message")?.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let request = ChatRequest::with_image("some/model", "name this", "data:image/png;base64,AAAA");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "some/model",
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "text", "text": "name this"},
                        {"type": "image_url", "image_url": {"url": "data:image/png;base64,AAAA"}}
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_response_first_content() {
        let response: ChatResponse = serde_json::from_value(json!({
            "id": "gen-1",
            "choices": [{"message": {"role": "assistant", "content": "hello"}}]
        }))
        .unwrap();
        assert_eq!(response.first_content(), Some("hello"));
    }

    #[test]
    fn test_error_body_deserializes() {
        let response: ChatResponse = serde_json::from_value(json!({
            "error": {"message": "No auth credentials found", "code": 401}
        }))
        .unwrap();
        assert!(response.choices.is_none());
        assert_eq!(response.first_content(), None);
        assert_eq!(response.error_message(), Some("No auth credentials found"));
    }

    #[test]
    fn test_unexpected_shapes_are_tolerated() {
        let reply = ChatResponse::from_value(json!({"error": "Rate limit exceeded"}));
        assert_eq!(reply.error_message(), Some("Rate limit exceeded"));
        assert_eq!(reply.first_content(), None);

        let reply = ChatResponse::from_value(json!({
            "choices": [{"message": {"content": [{"type": "text", "text": "{}"}]}}]
        }));
        assert_eq!(reply.first_content(), None);

        // fields nobody reads never get in the way
        let reply = ChatResponse::from_value(json!({
            "id": 12345,
            "model": 7,
            "choices": [{"message": {"role": 1, "content": "hi"}}]
        }));
        assert_eq!(reply.first_content(), Some("hi"));

        let reply = ChatResponse::from_value(json!(["not", "an", "object"]));
        assert!(reply.choices.is_none());
        let reply = ChatResponse::from_value(json!("just text"));
        assert!(reply.error.is_none());
    }

    #[test]
    fn test_content_null_or_empty_choices() {
        let response: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert_eq!(response.first_content(), None);

        let response: ChatResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": null}}]})).unwrap();
        assert_eq!(response.first_content(), None);
    }
}
