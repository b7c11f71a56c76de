//! Parse stack pane rendering
//!
//! Shows the engine's symbol stack at the selected step, top first.
//! Nonterminals and terminals are colored differently and the top entry is
//! marked with an arrow.

use super::{clamp_scroll, pane_block};
use crate::trace::TraceStep;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};
use rustc_hash::FxHashSet;

/// Render the parse stack pane
pub fn render_stack_pane(
    frame: &mut Frame,
    area: Rect,
    step: Option<&TraceStep>,
    nonterminals: &FxHashSet<String>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let title = match step {
        Some(step) => format!(" Parse Stack ({}) ", step.stack.len()),
        None => " Parse Stack ".to_string(),
    };
    let block = pane_block(title, is_focused);

    let Some(step) = step else {
        let paragraph = Paragraph::new("(no trace recorded)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    };

    let depth = step.stack.len();
    let all_items: Vec<ListItem> = step
        .stack
        .iter()
        .rev()
        .enumerate()
        .map(|(i, symbol)| {
            let marker = if i == 0 { "▸ " } else { "  " };
            let symbol_style = if nonterminals.contains(symbol) {
                Style::default().fg(DEFAULT_THEME.nonterminal)
            } else {
                Style::default().fg(DEFAULT_THEME.terminal)
            };
            let symbol_style = if i == 0 {
                symbol_style.add_modifier(Modifier::BOLD)
            } else {
                symbol_style
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(DEFAULT_THEME.lookahead)),
                Span::styled(
                    format!("{:>3} ", depth - i - 1),
                    Style::default().fg(DEFAULT_THEME.comment),
                ),
                Span::styled(symbol.clone(), symbol_style),
            ]))
        })
        .collect();

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    clamp_scroll(scroll_offset, all_items.len(), visible_height);

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}
