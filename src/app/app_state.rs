use crate::chat::ChatState;
use crate::config::Config;

use super::app_render::Transcript;

/// Terminal chat session
pub struct App {
    pub chat: ChatState,
    pub transcript: Transcript,
    pub should_quit: bool,
    /// Stdin reached EOF; quit once the chat has nothing left to do
    pub input_closed: bool,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let mut chat = ChatState::new_with_config(config);
        // The terminal is the chat surface
        chat.open = true;

        Self {
            chat,
            transcript: Transcript::new(),
            should_quit: false,
            input_closed: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
            || (self.input_closed
                && !self.chat.is_busy()
                && self.chat.queue.is_empty()
                && !self.chat.selection.has_pending_prompt())
    }

    /// One-line status shown after mode changes
    pub fn status_line(&self) -> String {
        format!(
            "[streaming: {} | strict: {} | lang: {}{}]",
            if self.chat.use_streaming { "on" } else { "off" },
            if self.chat.selection.strict_mode() {
                "on"
            } else {
                "off"
            },
            self.chat.user_background.preferred_language.code(),
            if self.chat.selection.has_text() {
                " | passage selected"
            } else {
                ""
            }
        )
    }
}
