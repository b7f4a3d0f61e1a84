use serde::Deserialize;
use tracing::{debug, warn};

use crate::suggestion::ChatResponse;

/// JSON document the model is asked to produce
#[derive(Debug, Deserialize)]
struct FilenameSuggestions {
    filenames: Vec<String>,
}

/// Extracts candidate filenames from a model reply.
///
/// Best effort: a missing reply, missing content, broken fencing or invalid JSON all
/// yield `None`. Order is preserved as returned. An empty list is returned as-is.
pub fn extract_candidates(response: Option<&ChatResponse>) -> Option<Vec<String>> {
    let Some(content) = response.and_then(ChatResponse::first_content) else {
        debug!("Reply has no message content");
        return None;
    };

    let payload = strip_code_fence(content)?;
    match serde_json::from_str::<FilenameSuggestions>(payload.trim()) {
        Ok(parsed) => {
            debug!("Parsed {} filename candidates", parsed.filenames.len());
            Some(parsed.filenames)
        }
        Err(e) => {
            warn!("Model reply is not a filename list: {}", e);
            None
        }
    }
}

/// Returns the text between the first pair of markdown fences, preferring a
/// ```` ```json ```` opener over a bare one. Text without fences comes back unchanged,
/// an unterminated fence keeps everything after the opener.
pub fn strip_code_fence(content: &str) -> Option<&str> {
    let opener = if content.contains("```json") {
        "```json"
    } else if content.contains("```") {
        "```"
    } else {
        return Some(content);
    };

    let (_, rest) = content.split_once(opener)?;
    let inner = rest.split("```").next()?;
    Some(inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply_with(content: &str) -> ChatResponse {
        serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        }))
        .unwrap()
    }

    #[test]
    fn test_fenced_json() {
        let reply = reply_with("```json\n{\"filenames\":[\"a\",\"b\"]}\n```");
        assert_eq!(extract_candidates(Some(&reply)), Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_bare_fence_and_surrounding_text() {
        let reply = reply_with("Here you go:\n```\n{\"filenames\": [\"login-page\", \"login-new-user\"]}\n```\nEnjoy");
        assert_eq!(
            extract_candidates(Some(&reply)),
            Some(vec!["login-page".to_string(), "login-new-user".to_string()])
        );
    }

    #[test]
    fn test_plain_json() {
        let reply = reply_with("  {\"filenames\": [\"x\", \"y\", \"z\"]}  ");
        assert_eq!(extract_candidates(Some(&reply)).map(|c| c.len()), Some(3));
    }

    #[test]
    fn test_no_choices() {
        let reply: ChatResponse = serde_json::from_value(json!({"error": {"message": "nope"}})).unwrap();
        assert_eq!(extract_candidates(Some(&reply)), None);
        assert_eq!(extract_candidates(None), None);
    }

    #[test]
    fn test_malformed_content() {
        assert_eq!(extract_candidates(Some(&reply_with("not json at all"))), None);
        assert_eq!(extract_candidates(Some(&reply_with("```json\n{\"filenames\": [1, 2]}\n```"))), None);
        assert_eq!(extract_candidates(Some(&reply_with("{\"names\": [\"a\"]}"))), None);
        assert_eq!(extract_candidates(Some(&reply_with("```json"))), None);
    }

    #[test]
    fn test_empty_list_is_kept() {
        let reply = reply_with("{\"filenames\": []}");
        assert_eq!(extract_candidates(Some(&reply)), Some(vec![]));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{}\n```"), Some("\n{}\n"));
        assert_eq!(strip_code_fence("```\n{}\n```"), Some("\n{}\n"));
        assert_eq!(strip_code_fence("{}"), Some("{}"));
        // unterminated fence keeps the rest
        assert_eq!(strip_code_fence("```json {}"), Some(" {}"));
    }
}
