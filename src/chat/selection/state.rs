//! Selection-to-query bridge state
//!
//! Tracks the floating "Ask AI" affordance shown over a text selection, the
//! selection context sent with selection queries, and strict mode.

use std::time::Duration;

use super::delay::DelayedSubmit;

/// Characters of the selection quoted in the synthetic prompt
pub const PROMPT_SELECTION_LIMIT: usize = 200;

/// Screen rectangle of a selection
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Text selected in the surrounding document
#[derive(Debug, Clone, PartialEq)]
pub struct TextSelection {
    pub text: String,
    pub rect: SelectionRect,
}

/// Where a pointer-up landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// On the affordance itself
    Affordance,
    /// Anywhere else in the document
    Elsewhere,
}

/// Floating "Ask AI" affordance
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AskAffordance {
    pub visible: bool,
    pub x: f64,
    pub y: f64,
    pub text: String,
}

impl AskAffordance {
    fn hidden() -> Self {
        Self::default()
    }
}

/// Selection bridge state
#[derive(Debug)]
pub struct SelectionBridge {
    affordance: AskAffordance,
    /// Passage selection queries are asked about (empty = none)
    context_text: String,
    /// Answer only from the selected passage
    strict_mode: bool,
    delayed: DelayedSubmit,
}

impl SelectionBridge {
    pub fn new(ask_delay: Duration) -> Self {
        Self {
            affordance: AskAffordance::hidden(),
            context_text: String::new(),
            strict_mode: false,
            delayed: DelayedSubmit::new(ask_delay),
        }
    }

    /// Handle a pointer-up in the document
    ///
    /// A non-empty selection shows the affordance centred above it. An empty
    /// selection hides it unless the pointer landed on the affordance.
    pub fn pointer_up(&mut self, selection: Option<TextSelection>, target: PointerTarget) {
        let selection = selection
            .map(|s| TextSelection {
                text: s.text.trim().to_string(),
                rect: s.rect,
            })
            .filter(|s| !s.text.is_empty());

        match selection {
            Some(selection) => {
                self.affordance = AskAffordance {
                    visible: true,
                    x: selection.rect.left + selection.rect.width / 2.0,
                    y: selection.rect.top - 10.0,
                    text: selection.text,
                };
            }
            None if target == PointerTarget::Elsewhere => {
                self.affordance = AskAffordance::hidden();
            }
            None => {}
        }
    }

    /// Scrolling makes the affordance position stale
    pub fn scroll(&mut self) {
        self.affordance = AskAffordance::hidden();
    }

    pub fn affordance(&self) -> &AskAffordance {
        &self.affordance
    }

    /// Trigger the affordance
    ///
    /// Sets the selection context, hides the affordance and schedules the
    /// synthetic prompt. Returns false when there is no selected text.
    pub fn ask(&mut self) -> bool {
        if self.affordance.text.is_empty() {
            return false;
        }

        let text = std::mem::take(&mut self.affordance.text);
        let prompt = build_prompt(&text);
        self.context_text = text;
        self.affordance = AskAffordance::hidden();
        self.delayed.schedule(prompt);
        true
    }

    /// Scheduled prompt, once its delay has passed
    pub fn take_due_prompt(&mut self) -> Option<String> {
        self.delayed.take_ready()
    }

    pub fn has_pending_prompt(&self) -> bool {
        self.delayed.has_pending()
    }

    pub fn strict_mode(&self) -> bool {
        self.strict_mode
    }

    pub fn set_strict_mode(&mut self, strict_mode: bool) {
        self.strict_mode = strict_mode;
    }

    pub fn toggle_strict_mode(&mut self) {
        self.strict_mode = !self.strict_mode;
    }

    /// Current selection context text (empty when none)
    pub fn text(&self) -> &str {
        &self.context_text
    }

    pub fn has_text(&self) -> bool {
        !self.context_text.is_empty()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.context_text = text.into();
    }

    /// Consume the selection context
    pub fn take_text(&mut self) -> Option<String> {
        if self.context_text.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.context_text))
    }

    /// Clear the selection context (the user dismissed it)
    pub fn clear_text(&mut self) {
        self.context_text.clear();
    }
}

impl Default for SelectionBridge {
    fn default() -> Self {
        Self::new(Duration::from_millis(150))
    }
}

/// First `PROMPT_SELECTION_LIMIT` characters, with `...` when cut
pub fn truncate_selection(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PROMPT_SELECTION_LIMIT).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Synthetic prompt asking about a selected passage
pub fn build_prompt(text: &str) -> String {
    format!("Explain this: \"{}\"", truncate_selection(text))
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod state_tests;
