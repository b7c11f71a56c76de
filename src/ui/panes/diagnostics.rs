//! Diagnostics pane rendering

use super::{clamp_scroll, pane_block};
use crate::parser::diagnostics::Diagnostic;
use crate::parser::token::SourceLocation;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

/// Render the diagnostics pane.
///
/// Diagnostics at or before `reached` (the lookahead of the selected step)
/// are shown in full color; later ones are dimmed.
pub fn render_diagnostics_pane(
    frame: &mut Frame,
    area: Rect,
    diagnostics: &[Diagnostic],
    reached: Option<SourceLocation>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let title = format!(" Diagnostics ({}) ", diagnostics.len());
    let block = pane_block(title, is_focused);

    if diagnostics.is_empty() {
        let paragraph = Paragraph::new("(no syntax errors)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.accepted));
        frame.render_widget(paragraph, area);
        return;
    }

    let all_items: Vec<ListItem> = diagnostics
        .iter()
        .map(|diagnostic| {
            let seen = reached.map_or(true, |loc| diagnostic.location <= loc);
            let (loc_style, text_style) = if seen {
                (
                    Style::default()
                        .fg(DEFAULT_THEME.error)
                        .add_modifier(Modifier::BOLD),
                    Style::default().fg(DEFAULT_THEME.fg),
                )
            } else {
                (
                    Style::default().fg(DEFAULT_THEME.comment),
                    Style::default().fg(DEFAULT_THEME.comment),
                )
            };
            let message = diagnostic.to_string();
            let message = message
                .strip_prefix(&format!("[{}] ", diagnostic.location))
                .unwrap_or(&message)
                .to_string();
            ListItem::new(Line::from(vec![
                Span::styled(format!("[{}] ", diagnostic.location), loc_style),
                Span::styled(message, text_style),
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
