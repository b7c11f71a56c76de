//! Color palette shared by every pane.

use ratatui::style::Color;

pub struct Theme {
    pub fg: Color,
    pub primary: Color,
    pub comment: Color,
    pub error: Color,
    pub border_focused: Color,
    pub border_normal: Color,
    pub current_line_bg: Color,

    // C source highlighting
    pub keyword: Color,
    pub string: Color,
    pub number: Color,
    pub function: Color,
    pub type_name: Color,

    // Parse trace
    /// The lookahead token and the top-of-stack marker.
    pub lookahead: Color,
    pub terminal: Color,
    pub nonterminal: Color,
    pub accepted: Color,
    /// Parses that finished only after error recovery.
    pub recovered: Color,
}

pub const DEFAULT_THEME: Theme = Theme {
    fg: Color::Rgb(205, 214, 244),
    primary: Color::Rgb(137, 180, 250), // Blue
    comment: Color::Rgb(108, 112, 134), // Grey
    error: Color::Rgb(243, 139, 168),   // Red
    border_focused: Color::Rgb(249, 226, 175),
    border_normal: Color::Rgb(108, 112, 134),
    current_line_bg: Color::Rgb(50, 50, 70),

    keyword: Color::Rgb(137, 180, 250),
    string: Color::Rgb(250, 179, 135),
    number: Color::Rgb(250, 179, 135),
    function: Color::Rgb(249, 226, 175),
    type_name: Color::Rgb(148, 226, 213),

    lookahead: Color::Rgb(250, 179, 135),   // Orange
    terminal: Color::Rgb(166, 227, 161),    // Green
    nonterminal: Color::Rgb(203, 166, 247), // Mauve
    accepted: Color::Rgb(166, 227, 161),
    recovered: Color::Rgb(249, 226, 175), // Yellow
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_roles_are_distinguishable() {
        assert_ne!(DEFAULT_THEME.nonterminal, DEFAULT_THEME.terminal);
        assert_ne!(DEFAULT_THEME.nonterminal, DEFAULT_THEME.lookahead);
        assert_ne!(DEFAULT_THEME.terminal, DEFAULT_THEME.lookahead);
        assert_ne!(DEFAULT_THEME.accepted, DEFAULT_THEME.recovered);
    }
}
