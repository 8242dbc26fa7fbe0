//! Chapter personalization and translation
//!
//! Both operations send at most `CONTENT_LIMIT` characters of chapter text.

use serde::{Deserialize, Serialize};

use crate::chat::message::Language;
use crate::gateway::{BackendClient, GatewayError};

pub const PERSONALIZE_PATH: &str = "/personalization/personalize-chapter";
pub const TRANSLATE_PATH: &str = "/translate";

/// Characters of chapter text sent to the backend
pub const CONTENT_LIMIT: usize = 5000;

/// Reader profile used to tailor a chapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReaderProfile {
    pub expertise_level: String,
    pub hardware_access: String,
    pub robotics_experience: String,
}

/// Accepted `expertise_level` values
pub const EXPERTISE_LEVELS: [&str; 3] = ["beginner", "intermediate", "advanced"];

/// Accepted `hardware_access` values
pub const HARDWARE_ACCESS_LEVELS: [&str; 4] = ["none", "simulation_only", "basic_kit", "full_lab"];

impl Default for ReaderProfile {
    fn default() -> Self {
        Self {
            expertise_level: "intermediate".to_string(),
            hardware_access: "simulation_only".to_string(),
            robotics_experience: "beginner".to_string(),
        }
    }
}

#[derive(Serialize)]
struct PersonalizeBody<'a> {
    chapter_id: &'a str,
    content: String,
    user_profile: &'a ReaderProfile,
}

#[derive(Serialize)]
struct TranslateBody<'a> {
    text: String,
    target_language: Language,
    chapter_id: &'a str,
}

#[derive(Deserialize)]
struct PersonalizeReply {
    #[serde(default)]
    personalized_content: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct TranslateReply {
    #[serde(default)]
    translated_text: Option<String>,
    #[serde(default)]
    translation: Option<String>,
}

/// First `CONTENT_LIMIT` characters of `text`
pub fn clip_content(text: &str) -> String {
    text.chars().take(CONTENT_LIMIT).collect()
}

fn first_non_empty(candidates: [Option<String>; 2], field: &str) -> Result<String, GatewayError> {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .ok_or_else(|| GatewayError::Parse {
            message: format!("response has no {field}"),
        })
}

impl BackendClient {
    /// Rewrite a chapter for the given reader profile
    pub async fn personalize_chapter(
        &self,
        chapter_id: &str,
        content: &str,
        profile: &ReaderProfile,
    ) -> Result<String, GatewayError> {
        let body = PersonalizeBody {
            chapter_id,
            content: clip_content(content),
            user_profile: profile,
        };
        let reply: PersonalizeReply = self.post_json(PERSONALIZE_PATH, &body).await?;
        first_non_empty(
            [reply.personalized_content, reply.content],
            "personalized content",
        )
    }

    /// Translate chapter text into `target_language`
    pub async fn translate_chapter(
        &self,
        text: &str,
        target_language: Language,
        chapter_id: &str,
    ) -> Result<String, GatewayError> {
        let body = TranslateBody {
            text: clip_content(text),
            target_language,
            chapter_id,
        };
        let reply: TranslateReply = self.post_json(TRANSLATE_PATH, &body).await?;
        first_non_empty([reply.translated_text, reply.translation], "translation")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_helpers::{
        CannedResponse, CannedServer, request_body, request_line, run_async,
    };

    #[test]
    fn test_clip_content_counts_chars() {
        let text = "ب".repeat(CONTENT_LIMIT + 10);
        let clipped = clip_content(&text);
        assert_eq!(clipped.chars().count(), CONTENT_LIMIT);
        assert_eq!(clip_content("short"), "short");
    }

    #[test]
    fn test_personalize_sends_profile_and_clipped_content() {
        let server = CannedServer::start(vec![CannedResponse::json(
            200,
            r#"{"personalized_content":"Tailored chapter"}"#,
        )]);
        let client = BackendClient::new(&server.base_url).unwrap();
        let content = "x".repeat(CONTENT_LIMIT * 2);

        let result = run_async(client.personalize_chapter(
            "/docs/module-1/intro",
            &content,
            &ReaderProfile::default(),
        ))
        .unwrap();

        assert_eq!(result, "Tailored chapter");
        let requests = server.finish();
        assert_eq!(
            request_line(&requests[0]),
            "POST /api/personalization/personalize-chapter HTTP/1.1"
        );
        let body = request_body(&requests[0]);
        assert_eq!(body["chapter_id"], "/docs/module-1/intro");
        assert_eq!(body["content"].as_str().unwrap().len(), CONTENT_LIMIT);
        assert_eq!(body["user_profile"]["hardware_access"], "simulation_only");
    }

    #[test]
    fn test_personalize_sends_custom_profile() {
        let server = CannedServer::start(vec![CannedResponse::json(
            200,
            r#"{"personalized_content":"Lab edition"}"#,
        )]);
        let client = BackendClient::new(&server.base_url).unwrap();
        let profile = ReaderProfile {
            expertise_level: "advanced".to_string(),
            hardware_access: "full_lab".to_string(),
            robotics_experience: "expert".to_string(),
        };

        run_async(client.personalize_chapter("intro", "ROS 2 nodes", &profile)).unwrap();

        let body = request_body(&server.finish()[0]);
        assert_eq!(body["user_profile"]["expertise_level"], "advanced");
        assert_eq!(body["user_profile"]["hardware_access"], "full_lab");
        assert_eq!(body["user_profile"]["robotics_experience"], "expert");
    }

    #[test]
    fn test_personalize_falls_back_to_content_field() {
        let server =
            CannedServer::start(vec![CannedResponse::json(200, r#"{"content":"Fallback"}"#)]);
        let client = BackendClient::new(&server.base_url).unwrap();

        let result = run_async(client.personalize_chapter("c", "text", &ReaderProfile::default()))
            .unwrap();

        assert_eq!(result, "Fallback");
        server.finish();
    }

    #[test]
    fn test_personalize_http_error() {
        let server = CannedServer::start(vec![CannedResponse::json(503, "{}")]);
        let client = BackendClient::new(&server.base_url).unwrap();

        let err = run_async(client.personalize_chapter("c", "text", &ReaderProfile::default()))
            .unwrap_err();

        assert!(matches!(err, GatewayError::Api { code: 503, .. }));
        server.finish();
    }

    #[test]
    fn test_translate_to_urdu() {
        let server = CannedServer::start(vec![CannedResponse::json(
            200,
            r#"{"translation":"روبوٹکس"}"#,
        )]);
        let client = BackendClient::new(&server.base_url).unwrap();

        let result =
            run_async(client.translate_chapter("Robotics", Language::Ur, "/docs/intro")).unwrap();

        assert_eq!(result, "روبوٹکس");
        let requests = server.finish();
        assert_eq!(request_line(&requests[0]), "POST /api/translate HTTP/1.1");
        let body = request_body(&requests[0]);
        assert_eq!(body["target_language"], "ur");
        assert_eq!(body["text"], "Robotics");
    }

    #[test]
    fn test_translate_without_text_is_parse_error() {
        let server = CannedServer::start(vec![CannedResponse::json(200, r#"{"status":"ok"}"#)]);
        let client = BackendClient::new(&server.base_url).unwrap();

        let err = run_async(client.translate_chapter("t", Language::En, "c")).unwrap_err();

        assert!(matches!(err, GatewayError::Parse { .. }));
        server.finish();
    }
}
