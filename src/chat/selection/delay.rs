//! Delayed submission of a selection prompt
//!
//! Asking about a selection opens the chat first and submits the prompt a
//! moment later. The delay is polled from the main loop rather than slept.

use std::time::{Duration, Instant};

/// One pending prompt and the time it was scheduled
#[derive(Debug)]
pub struct DelayedSubmit {
    delay: Duration,
    scheduled_at: Option<Instant>,
    prompt: Option<String>,
}

impl DelayedSubmit {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            scheduled_at: None,
            prompt: None,
        }
    }

    /// Schedule a prompt, replacing any prompt not yet submitted
    pub fn schedule(&mut self, prompt: String) {
        self.scheduled_at = Some(Instant::now());
        self.prompt = Some(prompt);
    }

    /// Drop the pending prompt
    pub fn cancel(&mut self) {
        self.scheduled_at = None;
        self.prompt = None;
    }

    /// True once a prompt is pending and the delay has elapsed
    pub fn is_ready(&self) -> bool {
        match (self.scheduled_at, &self.prompt) {
            (Some(at), Some(_)) => at.elapsed() >= self.delay,
            _ => false,
        }
    }

    /// Take the prompt if it is due
    pub fn take_ready(&mut self) -> Option<String> {
        if !self.is_ready() {
            return None;
        }
        self.scheduled_at = None;
        self.prompt.take()
    }

    pub fn has_pending(&self) -> bool {
        self.prompt.is_some()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for DelayedSubmit {
    fn default() -> Self {
        Self::new(Duration::from_millis(150))
    }
}
