//! Selection-to-query bridge
//!
//! Turns a text selection in the surrounding document into a chat query,
//! optionally restricted to the selected passage (strict mode).

pub mod delay;
pub mod state;

// Re-export main types
pub use state::{
    AskAffordance, PointerTarget, SelectionBridge, SelectionRect, TextSelection, build_prompt,
    truncate_selection,
};
