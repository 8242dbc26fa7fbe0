// Chat and reader-profile configuration type definitions

use serde::Deserialize;

use crate::chat::message::{Language, UserBackground};

fn default_streaming() -> bool {
    true
}

fn default_top_k() -> u32 {
    3
}

/// Delay before a selection prompt is submitted, so the chat opens first
fn default_ask_delay_ms() -> u64 {
    150
}

fn default_software_experience() -> String {
    "beginner".to_string()
}

fn default_hardware_experience() -> String {
    "beginner".to_string()
}

fn default_robotics_knowledge() -> String {
    "basic".to_string()
}

/// Chat behaviour section
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Stream answers token by token
    #[serde(default = "default_streaming")]
    pub streaming: bool,
    /// Number of retrieved passages per answer
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    /// Start with strict selection mode on
    #[serde(default)]
    pub strict_mode: bool,
    #[serde(default = "default_ask_delay_ms")]
    pub ask_delay_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        ChatConfig {
            streaming: default_streaming(),
            top_k: default_top_k(),
            strict_mode: false,
            ask_delay_ms: default_ask_delay_ms(),
        }
    }
}

/// Reader profile section, sent as `user_background`
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    #[serde(default = "default_software_experience")]
    pub software_experience: String,
    #[serde(default = "default_hardware_experience")]
    pub hardware_experience: String,
    #[serde(default = "default_robotics_knowledge")]
    pub robotics_knowledge: String,
    #[serde(default)]
    pub preferred_language: Language,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        ProfileConfig {
            software_experience: default_software_experience(),
            hardware_experience: default_hardware_experience(),
            robotics_knowledge: default_robotics_knowledge(),
            preferred_language: Language::default(),
        }
    }
}

impl From<&ProfileConfig> for UserBackground {
    fn from(profile: &ProfileConfig) -> Self {
        UserBackground {
            software_experience: profile.software_experience.clone(),
            hardware_experience: profile.hardware_experience.clone(),
            robotics_knowledge: profile.robotics_knowledge.clone(),
            preferred_language: profile.preferred_language,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use proptest::prelude::*;

    #[test]
    fn test_default_profile_matches_default_background() {
        let background = UserBackground::from(&ProfileConfig::default());
        assert_eq!(background, UserBackground::default());
    }

    #[test]
    fn test_parse_profile_section() {
        let toml = r#"
[profile]
software_experience = "advanced"
robotics_knowledge = "intermediate"
preferred_language = "ur"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.profile.software_experience, "advanced");
        assert_eq!(config.profile.hardware_experience, "beginner");
        assert_eq!(config.profile.robotics_knowledge, "intermediate");
        assert_eq!(config.profile.preferred_language, Language::Ur);
    }

    #[test]
    fn test_invalid_language_fails_to_parse() {
        let toml = "[profile]\npreferred_language = \"fr\"";
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    // *For any* valid `[chat]` section, parsing yields exactly those values.
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_valid_chat_config_parsing(
            streaming in prop::bool::ANY,
            strict_mode in prop::bool::ANY,
            top_k in 1u32..50,
            ask_delay_ms in 0u64..2000,
        ) {
            let toml_content = format!(r#"
[chat]
streaming = {}
strict_mode = {}
top_k = {}
ask_delay_ms = {}
"#, streaming, strict_mode, top_k, ask_delay_ms);

            let config: Result<Config, _> = toml::from_str(&toml_content);
            prop_assert!(config.is_ok(), "Failed to parse valid chat config");

            let config = config.unwrap();
            prop_assert_eq!(config.chat.streaming, streaming);
            prop_assert_eq!(config.chat.strict_mode, strict_mode);
            prop_assert_eq!(config.chat.top_k, top_k);
            prop_assert_eq!(config.chat.ask_delay_ms, ask_delay_ms);
        }
    }
}
