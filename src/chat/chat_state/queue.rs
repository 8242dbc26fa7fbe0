//! FIFO of queries submitted while a request was in flight

use std::collections::VecDeque;

/// Pending queries, dispatched strictly in submission order
///
/// Unbounded, no deduplication. Entries leave only through `pop_front`.
#[derive(Debug, Clone, Default)]
pub struct RequestQueue {
    pending: VecDeque<String>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a query to the back of the queue
    pub fn enqueue(&mut self, query: impl Into<String>) {
        self.pending.push_back(query.into());
    }

    /// Take the oldest query
    pub fn pop_front(&mut self) -> Option<String> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }
}
