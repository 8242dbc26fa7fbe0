//! Chat message log types and the reader background sent with every query.

use serde::{Deserialize, Serialize};

/// Who authored a message in the chat log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single entry in the chat log
///
/// Only the last assistant message is ever mutated in place, and only while
/// `is_streaming` is true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub is_streaming: bool,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            is_streaming: false,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            is_streaming: false,
        }
    }

    /// Empty assistant message that receives streamed tokens
    pub fn streaming_assistant() -> Self {
        Self {
            role: Role::Assistant,
            content: String::new(),
            is_streaming: true,
        }
    }
}

/// Answer language preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ur,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ur => "ur",
        }
    }

    /// Parse a language code ("en" / "ur"), case-insensitive
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "en" => Some(Language::En),
            "ur" => Some(Language::Ur),
            _ => None,
        }
    }
}

/// Reader background used by the backend to tailor answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBackground {
    pub software_experience: String,
    pub hardware_experience: String,
    pub robotics_knowledge: String,
    pub preferred_language: Language,
}

impl Default for UserBackground {
    fn default() -> Self {
        Self {
            software_experience: "beginner".to_string(),
            hardware_experience: "beginner".to_string(),
            robotics_knowledge: "basic".to_string(),
            preferred_language: Language::En,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_background_wire_format() {
        let json = serde_json::to_value(UserBackground::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "software_experience": "beginner",
                "hardware_experience": "beginner",
                "robotics_knowledge": "basic",
                "preferred_language": "en"
            })
        );
    }

    #[test]
    fn test_language_from_code() {
        assert_eq!(Language::from_code("UR"), Some(Language::Ur));
        assert_eq!(Language::from_code(" en "), Some(Language::En));
        assert_eq!(Language::from_code("fr"), None);
    }

    #[test]
    fn test_streaming_assistant_starts_empty() {
        let msg = Message::streaming_assistant();
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.content.is_empty());
        assert!(msg.is_streaming);
    }
}
