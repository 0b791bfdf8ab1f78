//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`input`]: The program being edited, highlighted by token kind
//! - [`tokens`]: Token list of the current submission
//! - [`tree`]: Syntax tree dump, or the error that stopped the analysis
//! - [`status`]: Status bar with keybindings and history position
//!
//! Each pane module exports a primary `render_*_pane()` function that draws
//! from borrowed state and keeps no state of its own beyond a scroll offset
//! owned by the caller.

pub mod input;
pub mod status;
pub mod tokens;
pub mod tree;

// Re-export render functions for convenience
pub use input::render_input_pane;
pub use status::{render_status_bar, StatusRenderData};
pub use tokens::{render_tokens_pane, TokensRenderData};
pub use tree::render_tree_pane;
