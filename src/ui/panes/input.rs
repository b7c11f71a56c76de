//! Input and action pane rendering
//!
//! The top line names the action the engine takes at the selected step; below
//! it the token stream is listed with consumed tokens dimmed and the
//! lookahead highlighted.

use super::{clamp_scroll, pane_block};
use crate::parser::token::Token;
use crate::trace::{TraceAction, TraceStep};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

fn action_style(action: &TraceAction) -> Style {
    match action {
        TraceAction::Expand { .. } | TraceAction::Epsilon { .. } => {
            Style::default().fg(DEFAULT_THEME.nonterminal)
        }
        TraceAction::Match { .. } | TraceAction::Accept => {
            Style::default().fg(DEFAULT_THEME.terminal)
        }
        TraceAction::Error { .. } | TraceAction::Stop => Style::default()
            .fg(DEFAULT_THEME.error)
            .add_modifier(Modifier::BOLD),
        TraceAction::Skip { .. } | TraceAction::Pop { .. } => {
            Style::default().fg(DEFAULT_THEME.lookahead)
        }
    }
}

/// Render the input/action pane.
///
/// With `follow` set the list scrolls so the lookahead stays in view.
pub fn render_input_pane(
    frame: &mut Frame,
    area: Rect,
    tokens: &[Token],
    step: Option<&TraceStep>,
    is_focused: bool,
    scroll_offset: &mut usize,
    follow: bool,
) {
    let block = pane_block(" Input ", is_focused);
    let cursor = step.map(|s| s.cursor);

    let mut header = vec![Span::styled(
        " action: ",
        Style::default().fg(DEFAULT_THEME.comment),
    )];
    match step {
        Some(step) => header.push(Span::styled(
            step.action.to_string(),
            action_style(&step.action),
        )),
        None => header.push(Span::styled(
            "(no trace recorded)",
            Style::default().fg(DEFAULT_THEME.comment),
        )),
    }

    let mut all_items = vec![ListItem::new(Line::from(header))];
    all_items.extend(tokens.iter().enumerate().map(|(i, token)| {
        let (marker, style) = match cursor {
            Some(c) if i == c => (
                "▸ ",
                Style::default()
                    .fg(DEFAULT_THEME.lookahead)
                    .bg(DEFAULT_THEME.current_line_bg)
                    .add_modifier(Modifier::BOLD),
            ),
            Some(c) if i < c => ("  ", Style::default().fg(DEFAULT_THEME.comment)),
            _ => ("  ", Style::default().fg(DEFAULT_THEME.fg)),
        };
        ListItem::new(Line::from(vec![
            Span::styled(marker, Style::default().fg(DEFAULT_THEME.lookahead)),
            Span::styled(
                format!("{:>7} ", token.location.to_string()),
                Style::default().fg(DEFAULT_THEME.comment),
            ),
            Span::styled(format!("{:<13} ", token.kind), style),
            Span::styled(token.text.clone(), style),
        ]))
    }));
    if cursor.is_some_and(|c| c >= tokens.len()) {
        all_items.push(ListItem::new(Line::from(vec![
            Span::styled("▸ ", Style::default().fg(DEFAULT_THEME.lookahead)),
            Span::styled(
                "end of input",
                Style::default()
                    .fg(DEFAULT_THEME.lookahead)
                    .bg(DEFAULT_THEME.current_line_bg)
                    .add_modifier(Modifier::BOLD),
            ),
        ])));
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    if follow {
        if let Some(c) = cursor {
            // Item 0 is the action header
            *scroll_offset = (c + 1).saturating_sub(visible_height / 2);
        }
    }
    clamp_scroll(scroll_offset, all_items.len(), visible_height);

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}
