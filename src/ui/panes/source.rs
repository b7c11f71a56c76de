//! Source code pane rendering with syntax highlighting
//!
//! Displays the C source under analysis with basic syntax highlighting. The
//! line holding the current lookahead token is highlighted and the token
//! itself is underlined; if the current step reports a syntax error the line
//! is painted in the error color instead.
//!
//! The pane uses a simple character-by-character tokenizer to apply syntax
//! highlighting styles without requiring the full lexer.

use super::pane_block;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Simple syntax highlighting for the C subset
fn highlight_source_code(line: &str) -> Line<'_> {
    let mut spans = Vec::new();
    let mut current_word = String::new();

    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '/' && chars.get(i + 1) == Some(&'/') {
            if !current_word.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_word)));
            }
            spans.push(Span::styled(
                chars[i..].iter().collect::<String>(),
                Style::default().fg(DEFAULT_THEME.comment),
            ));
            break;
        }

        if c == '"' || c == '\'' {
            if !current_word.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_word)));
            }
            let mut end = i + 1;
            while end < chars.len() && chars[end] != c {
                end += if chars[end] == '\\' { 2 } else { 1 };
            }
            let end = (end + 1).min(chars.len());
            spans.push(Span::styled(
                chars[i..end].iter().collect::<String>(),
                Style::default().fg(DEFAULT_THEME.string),
            ));
            i = end;
            continue;
        }

        if !c.is_alphanumeric() && c != '_' {
            if !current_word.is_empty() {
                let style = get_keyword_style(&current_word, c == '(');
                spans.push(Span::styled(std::mem::take(&mut current_word), style));
            }

            let style = match c {
                '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.primary),
                '#' => Style::default().fg(DEFAULT_THEME.keyword),
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };

            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    if !current_word.is_empty() {
        let style = get_keyword_style(&current_word, false);
        spans.push(Span::styled(current_word, style));
    }

    Line::from(spans)
}

fn get_keyword_style(word: &str, is_function: bool) -> Style {
    match word {
        "int" | "char" | "void" | "float" | "double" | "struct" | "union" => {
            Style::default().fg(DEFAULT_THEME.type_name)
        }
        "return" | "if" | "else" | "while" | "for" | "break" | "continue" | "include" => {
            Style::default()
                .fg(DEFAULT_THEME.keyword)
                .add_modifier(Modifier::BOLD)
        }
        _ if word.starts_with(|c: char| c.is_ascii_digit()) => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        _ if is_function => Style::default().fg(DEFAULT_THEME.function),
        _ => Style::default().fg(DEFAULT_THEME.fg),
    }
}

/// Underlines the characters `[start, start + len)` of a highlighted line.
fn underline_range(line: Line<'static>, start: usize, len: usize) -> Line<'static> {
    let end = start + len.max(1);
    let mut out = Vec::new();
    let mut pos = 0;

    for span in line.spans {
        let text: Vec<char> = span.content.chars().collect();
        let span_end = pos + text.len();
        if span_end <= start || pos >= end {
            out.push(span);
        } else {
            let a = start.saturating_sub(pos).min(text.len());
            let b = (end - pos).min(text.len());
            let emphasized = span
                .style
                .add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
            for (piece, style) in [
                (&text[..a], span.style),
                (&text[a..b], emphasized),
                (&text[b..], span.style),
            ] {
                if !piece.is_empty() {
                    out.push(Span::styled(piece.iter().collect::<String>(), style));
                }
            }
        }
        pos = span_end;
    }
    Line::from(out)
}

/// Scroll state for the source pane
pub struct SourceScrollState {
    pub offset: usize,
    pub target_line_row: Option<usize>,
}

/// What to mark in the source pane
pub struct SourceRenderData<'a> {
    pub source_code: &'a str,
    /// 1-based line of the lookahead; 0 when unknown
    pub current_line: usize,
    /// 1-based column of the lookahead
    pub current_column: usize,
    /// Length of the lookahead lexeme
    pub token_len: usize,
    /// The current step reports a syntax error
    pub is_error: bool,
}

/// Render the source code pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    data: SourceRenderData,
    is_focused: bool,
    scroll_state: &mut SourceScrollState,
) {
    let block = pane_block(" Source Code ", is_focused);

    let lines: Vec<&str> = data.source_code.lines().collect();
    let total_lines = lines.len();

    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders (2), min 1

    // Keep the current line at a fixed visual row while stepping
    let target_row = scroll_state
        .target_line_row
        .unwrap_or(visible_height / 2)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    if data.current_line > 0 && data.current_line <= total_lines {
        let target_line_idx = data.current_line - 1;
        scroll_state.offset = target_line_idx.saturating_sub(target_row);

        if total_lines > visible_height {
            let max_scroll = total_lines - visible_height;
            scroll_state.offset = scroll_state.offset.min(max_scroll);
        } else {
            scroll_state.offset = 0;
        }
    }

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_current = line_num == data.current_line;
            let line_num_str = format!("{:4} ", line_num);

            let num_style = if is_current && data.is_error {
                Style::default()
                    .fg(DEFAULT_THEME.error)
                    .add_modifier(Modifier::BOLD)
            } else if is_current {
                Style::default()
                    .fg(DEFAULT_THEME.lookahead)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };

            let mut content_line = highlight_source_code(line);
            let content_line: Line<'static> = Line::from(
                content_line
                    .spans
                    .drain(..)
                    .map(|s| Span::styled(s.content.into_owned(), s.style))
                    .collect::<Vec<_>>(),
            );

            let content_line = if is_current {
                let background = if data.is_error {
                    Style::default().bg(DEFAULT_THEME.error).fg(ratatui::style::Color::Black)
                } else {
                    Style::default().bg(DEFAULT_THEME.current_line_bg)
                };
                let patched = Line::from(
                    content_line
                        .spans
                        .into_iter()
                        .map(|s| {
                            let style = s.style.patch(background);
                            Span::styled(s.content, style)
                        })
                        .collect::<Vec<_>>(),
                );
                underline_range(patched, data.current_column.saturating_sub(1), data.token_len)
            } else {
                content_line
            };

            let mut final_spans = vec![Span::styled(line_num_str, num_style)];
            final_spans.extend(content_line.spans);

            Line::from(final_spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_highlight_preserves_text() {
        let source = "int main() { printf(\"a\\\"b\"); return 'x'; } // done";
        assert_eq!(text(&highlight_source_code(source)), source);
    }

    #[test]
    fn test_underline_range_splits_span() {
        let line = Line::from(vec![Span::raw("int"), Span::raw(" xyz;")]);
        let out = underline_range(line, 4, 3);
        assert_eq!(text(&out), "int xyz;");
        let marked: Vec<&str> = out
            .spans
            .iter()
            .filter(|s| s.style.add_modifier.contains(Modifier::UNDERLINED))
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(marked, vec!["xyz"]);
    }
}
