//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`source`]: Source code display with syntax highlighting and the lookahead marked
//! - [`stack`]: The engine's symbol stack at the selected step
//! - [`input`]: The step's action and the token stream with the cursor
//! - [`diagnostics`]: Syntax errors found by the parse
//! - [`status`]: Status bar with keybindings and parse state
//!
//! Each pane module exports a primary `render_*` function taking the frame,
//! its area, the data to show, whether it has focus and its scroll state.

pub mod diagnostics;
pub mod input;
pub mod source;
pub mod stack;
pub mod status;

pub use diagnostics::render_diagnostics_pane;
pub use input::render_input_pane;
pub use source::{render_source_pane, SourceRenderData, SourceScrollState};
pub use stack::render_stack_pane;
pub use status::{render_status_bar, StatusRenderData};

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders},
};

/// Bordered pane block; the focused pane gets a bold highlighted border.
fn pane_block<'a, T: Into<Line<'a>>>(title: T, is_focused: bool) -> Block<'a> {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    Block::default()
        .title(title.into())
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// Clamps a scroll offset so the last page stays full.
fn clamp_scroll(offset: &mut usize, total_items: usize, visible_height: usize) {
    if total_items > visible_height {
        *offset = (*offset).min(total_items - visible_height);
    } else {
        *offset = 0;
    }
}
