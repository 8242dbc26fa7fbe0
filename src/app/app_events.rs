use std::io::{self, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use super::app_state::App;
use super::command::{Command, HELP_TEXT};
use crate::chat::chat_events::poll_response_channel;
use crate::chat::selection::{PointerTarget, SelectionRect, TextSelection};
use crate::chat::SubmitOutcome;

const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(50);

impl App {
    /// One pass of the main loop
    ///
    /// Waits briefly for an input line, applies worker responses, fires due
    /// timers, then prints what changed.
    pub fn handle_events<W: Write>(
        &mut self,
        input_rx: &Receiver<String>,
        out: &mut W,
    ) -> io::Result<()> {
        match input_rx.recv_timeout(EVENT_POLL_TIMEOUT) {
            Ok(line) => {
                if let Some(notice) = self.handle_line(&line) {
                    writeln!(out, "{}", notice)?;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                if !self.input_closed {
                    log::debug!("Input closed");
                    self.input_closed = true;
                }
            }
        }

        poll_response_channel(&mut self.chat);
        self.chat.tick();

        self.transcript.render(&self.chat.messages, out)?;
        Ok(())
    }

    /// Apply one input line; returns a notice to print, if any
    pub fn handle_line(&mut self, line: &str) -> Option<String> {
        match Command::parse(line) {
            Command::Empty => None,
            Command::Ask(query) => {
                self.chat.input = query.clone();
                let is_selection_query = self.chat.selection.has_text();
                match self.chat.submit(&query, is_selection_query) {
                    SubmitOutcome::Queued => {
                        Some(format!("(queued, {} waiting)", self.chat.queue.len()))
                    }
                    _ => None,
                }
            }
            Command::Select(text) => {
                self.chat.selection.pointer_up(
                    Some(TextSelection {
                        text,
                        rect: SelectionRect::default(),
                    }),
                    PointerTarget::Elsewhere,
                );
                if self.chat.ask_about_selection() {
                    None
                } else {
                    Some("Nothing selected".to_string())
                }
            }
            Command::ToggleStrict => {
                let strict_mode = !self.chat.selection.strict_mode();
                self.chat.set_strict_mode(strict_mode);
                Some(self.status_line())
            }
            Command::ClearSelection => {
                self.chat.clear_selection();
                Some("Selection cleared".to_string())
            }
            Command::Language(language) => {
                self.chat.set_language(language);
                Some(self.status_line())
            }
            Command::ToggleStreaming => {
                self.chat.toggle_streaming();
                Some(self.status_line())
            }
            Command::Stop => {
                if self.chat.stop_streaming() {
                    Some("(stopped)".to_string())
                } else {
                    Some("Nothing to stop".to_string())
                }
            }
            Command::Help => Some(HELP_TEXT.to_string()),
            Command::Quit => {
                self.chat.cancel_in_flight_request();
                self.should_quit = true;
                None
            }
            Command::Invalid(message) => Some(message),
        }
    }
}

#[cfg(test)]
#[path = "app_events_tests.rs"]
mod app_events_tests;
