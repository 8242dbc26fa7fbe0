//! Incremental transcript output
//!
//! The message log only grows at the end and only its last message is ever
//! rewritten, so the transcript prints each message once and, for a
//! streaming answer, only the text added since the previous render.

use std::io::{self, Write};

use crate::chat::{Message, Role};

const USER_PREFIX: &str = "you> ";
const ASSISTANT_PREFIX: &str = "bookbot> ";

pub struct Transcript {
    /// Messages before this index are fully printed
    next: usize,
    /// Text already printed for the message at `next`, if it is open
    partial: Option<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            next: 0,
            partial: None,
        }
    }

    /// Print whatever changed since the last call; returns true if anything was written
    pub fn render<W: Write>(&mut self, messages: &[Message], out: &mut W) -> io::Result<bool> {
        let mut wrote = false;

        while let Some(message) = messages.get(self.next) {
            let printed = self.partial.take();

            match &printed {
                None => {
                    write!(out, "{}{}", prefix(message.role), message.content)?;
                    wrote = true;
                }
                Some(printed) if message.content.starts_with(printed.as_str()) => {
                    let delta = &message.content[printed.len()..];
                    if !delta.is_empty() {
                        write!(out, "{}", delta)?;
                        wrote = true;
                    }
                }
                Some(_) => {
                    // Replaced wholesale; print the final text on its own line
                    write!(out, "\n{}{}", prefix(message.role), message.content)?;
                    wrote = true;
                }
            }

            if message.is_streaming {
                self.partial = Some(message.content.clone());
                break;
            }

            writeln!(out)?;
            wrote = true;
            self.next += 1;
        }

        out.flush()?;
        Ok(wrote)
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

fn prefix(role: Role) -> &'static str {
    match role {
        Role::User => USER_PREFIX,
        Role::Assistant => ASSISTANT_PREFIX,
    }
}

#[cfg(test)]
#[path = "app_render_tests.rs"]
mod app_render_tests;
