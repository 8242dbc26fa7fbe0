//! Chat state lifecycle management
//!
//! Handles initialization, query submission, queue draining and the
//! transitions back to idle.

use std::time::Duration;

use super::super::message::{Language, Message, UserBackground};
use super::super::selection::SelectionBridge;
use super::{ChatRequest, ChatState, DispatchMode, RequestQueue, SubmitOutcome};
use crate::config::Config;
use crate::gateway::{ChatBody, SelectionAnswerBody, SelectionQueryBody, SendRoute};

/// Default number of retrieved passages
pub const DEFAULT_TOP_K: u32 = 3;

/// Delay between opening the chat and submitting a selection prompt
pub const DEFAULT_ASK_DELAY: Duration = Duration::from_millis(150);

impl ChatState {
    /// Create a new ChatState with default settings and no worker attached
    pub fn new() -> Self {
        Self {
            open: false,
            messages: Vec::new(),
            input: String::new(),
            session_id: None,
            loading: false,
            streaming: false,
            use_streaming: true,
            top_k: DEFAULT_TOP_K,
            user_background: UserBackground::default(),
            queue: RequestQueue::new(),
            selection: SelectionBridge::new(DEFAULT_ASK_DELAY),
            request_tx: None,
            response_rx: None,
            request_id: 0,
            in_flight_request_id: None,
            current_cancel_token: None,
            dispatch_mode: None,
            streaming_index: None,
        }
    }

    /// Create a new ChatState from the `[chat]` and `[profile]` config sections
    pub fn new_with_config(config: &Config) -> Self {
        let mut state = Self::new();
        state.use_streaming = config.chat.streaming;
        state.top_k = config.chat.top_k;
        state.user_background = UserBackground::from(&config.profile);
        state.selection = SelectionBridge::new(Duration::from_millis(config.chat.ask_delay_ms));
        state.selection.set_strict_mode(config.chat.strict_mode);
        state
    }

    /// Toggle the chat surface
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// True while a request is in flight or an answer is streaming
    pub fn is_busy(&self) -> bool {
        self.loading || self.streaming
    }

    /// Switch the answer language sent in the user background
    pub fn set_language(&mut self, language: Language) {
        self.user_background.preferred_language = language;
    }

    /// Flip between streaming and single-response answers
    pub fn toggle_streaming(&mut self) {
        self.use_streaming = !self.use_streaming;
    }

    /// Submit a query
    ///
    /// Blank input is ignored. While busy the query is queued and control
    /// returns immediately; it is dispatched as a plain chat query once the
    /// controller is idle again. Any dispatch clears the selection context.
    pub fn submit(&mut self, query: &str, is_selection_query: bool) -> SubmitOutcome {
        if query.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }

        if self.is_busy() {
            log::debug!("Busy, queueing query ({} pending)", self.queue.len() + 1);
            self.queue.enqueue(query);
            self.input.clear();
            return SubmitOutcome::Queued;
        }

        self.messages.push(Message::user(query));
        self.input.clear();
        self.loading = true;

        let sent = if self.use_streaming && !is_selection_query {
            let body = self.chat_body(query);
            self.send_request(DispatchMode::Streaming, |request_id, cancel_token| {
                ChatRequest::Stream {
                    body,
                    request_id,
                    cancel_token,
                }
            })
        } else {
            let route = self.route_for(query, is_selection_query);
            self.send_request(DispatchMode::Single, |request_id, cancel_token| {
                ChatRequest::Send {
                    route,
                    request_id,
                    cancel_token,
                }
            })
        };

        if sent {
            self.selection.clear_text();
            SubmitOutcome::Dispatched
        } else {
            self.messages
                .push(Message::assistant("Error: Chat worker is not running"));
            self.finish_request();
            SubmitOutcome::Rejected
        }
    }

    fn chat_body(&self, query: &str) -> ChatBody {
        ChatBody {
            message: query.to_string(),
            session_id: self.session_id.clone(),
            user_background: self.user_background.clone(),
            top_k: self.top_k,
        }
    }

    /// Pick the non-streaming operation for a query
    ///
    /// Selection routes need selected text; without it the query goes to
    /// the general chat route. The selection text is consumed here.
    fn route_for(&mut self, query: &str, is_selection_query: bool) -> SendRoute {
        if is_selection_query && let Some(selected_text) = self.selection.take_text() {
            let user_background = self.user_background.clone();
            let question = query.to_string();

            return if self.selection.strict_mode() {
                SendRoute::AnswerFromSelection(SelectionAnswerBody {
                    selected_text,
                    question,
                    user_background,
                })
            } else {
                SendRoute::SelectionQuery(SelectionQueryBody {
                    selected_text,
                    question,
                    user_background,
                    top_k: self.top_k,
                })
            };
        }

        SendRoute::Chat(self.chat_body(query))
    }

    /// Dispatch queued queries while the controller is idle
    ///
    /// Level-triggered: safe to call after every state transition.
    /// Returns the number of queries taken off the queue.
    pub fn drain_queue(&mut self) -> usize {
        let mut drained = 0;
        while !self.is_busy() {
            let Some(next) = self.queue.pop_front() else {
                break;
            };
            log::debug!("Dispatching queued query ({} left)", self.queue.len());
            self.submit(&next, false);
            drained += 1;
        }
        drained
    }

    /// Turn the selection affordance into a delayed chat query
    ///
    /// Opens the chat surface first; the prompt is submitted by `tick`
    /// once the ask delay has passed.
    pub fn ask_about_selection(&mut self) -> bool {
        if !self.open {
            self.open = true;
        }
        self.selection.ask()
    }

    /// Restrict selection answers to the selected passage
    ///
    /// Only affects the route of the next selection query; queued queries
    /// are untouched.
    pub fn set_strict_mode(&mut self, strict_mode: bool) {
        self.selection.set_strict_mode(strict_mode);
    }

    /// Drop the selection context the user no longer wants to ask about
    pub fn clear_selection(&mut self) {
        self.selection.clear_text();
    }

    /// Advance timers: submit a due selection prompt, then drain the queue
    pub fn tick(&mut self) {
        if let Some(prompt) = self.selection.take_due_prompt() {
            self.submit(&prompt, true);
        }
        self.drain_queue();
    }

    /// Stop the in-flight answer
    ///
    /// The partial answer is kept as-is. No error message is added; the
    /// worker's `Cancelled` response clears the loading flag.
    pub fn stop_streaming(&mut self) -> bool {
        if !self.cancel_in_flight_request() {
            return false;
        }
        self.close_streaming_message();
        self.streaming = false;
        true
    }

    /// Close the streaming assistant message, if any
    pub(crate) fn close_streaming_message(&mut self) {
        if let Some(index) = self.streaming_index.take()
            && let Some(message) = self.messages.get_mut(index)
        {
            message.is_streaming = false;
        }
    }

    /// Return to idle after a request ends (success, failure or cancel)
    pub(crate) fn finish_request(&mut self) {
        self.close_streaming_message();
        self.loading = false;
        self.streaming = false;
        self.in_flight_request_id = None;
        self.current_cancel_token = None;
        self.dispatch_mode = None;
    }

    /// Append the failure message matching how the request was dispatched
    pub(crate) fn fail_request(&mut self, reason: &str) {
        let text = match self.dispatch_mode {
            Some(DispatchMode::Streaming) => {
                format!("Error: {reason}. Falling back to non-streaming mode.")
            }
            _ => format!("I'm having trouble connecting to the backend. Error: {reason}"),
        };
        self.close_streaming_message();
        self.messages.push(Message::assistant(text));
        self.finish_request();
    }
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new()
    }
}
