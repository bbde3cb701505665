//! HTML fragments emitted by the highlighter.
//!
//! The class vocabulary is closed: one class per kind of terminal, plus the
//! tooltip, clickable and unrecognized wrappers. All text goes through
//! [`escape`] exactly once on its way out.

use std::borrow::Cow;

use cql_highlight_syntax::Terminal;

pub const CLOSE_SPAN: &str = "</span>";

/// Marker inserted between groups of positions in long queries.
pub const LINE_BREAK: &str = "<br />";

const UNRECOGNIZED_STYLE: &str = "text-decoration: underline dotted red";

/// Visual category of a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightClass {
    Operator,
    Bracket,
    Keyword,
    Attr,
    RegExp,
    Struct,
}

impl HighlightClass {
    pub fn css(self) -> &'static str {
        match self {
            HighlightClass::Operator => "sh-operator",
            HighlightClass::Bracket => "sh-bracket",
            HighlightClass::Keyword => "sh-keyword",
            HighlightClass::Attr => "sh-attr",
            HighlightClass::RegExp => "sh-regexp",
            HighlightClass::Struct => "sh-struct",
        }
    }
}

/// Class for a terminal, `None` for separators that pass through as text.
pub fn class_of(terminal: Terminal) -> Option<HighlightClass> {
    match terminal {
        Terminal::Whitespace | Terminal::Semicolon | Terminal::Unknown => None,
        Terminal::LBracket
        | Terminal::RBracket
        | Terminal::LParen
        | Terminal::RParen
        | Terminal::LBrace
        | Terminal::RBrace => Some(HighlightClass::Bracket),
        Terminal::Lt | Terminal::Gt | Terminal::Slash => Some(HighlightClass::Struct),
        Terminal::Eq
        | Terminal::NotEq
        | Terminal::Not
        | Terminal::Amp
        | Terminal::Pipe
        | Terminal::Star
        | Terminal::Plus
        | Terminal::Question
        | Terminal::Comma
        | Terminal::Number => Some(HighlightClass::Operator),
        Terminal::KwWithin | Terminal::KwContaining | Terminal::KwMeet | Terminal::KwUnion => {
            Some(HighlightClass::Keyword)
        }
        Terminal::Ident | Terminal::AttrChars => Some(HighlightClass::Attr),
        Terminal::Quote
        | Terminal::Backslash
        | Terminal::Text
        | Terminal::RegExpChars
        | Terminal::RegExpEscape => Some(HighlightClass::RegExp),
    }
}

/// Escape text for element content and double-quoted attribute values.
///
/// Escapes `&` as well as `<`, `>` and `"`, so the `&` operator renders as
/// `&amp;`.
pub fn escape(text: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(text)
}

/// Markup for one terminal's text.
pub fn styled(terminal: Terminal, text: &str) -> String {
    match class_of(terminal) {
        Some(class) => format!("<span class=\"{}\">{}</span>", class.css(), escape(text)),
        None => escape(text).into_owned(),
    }
}

pub fn tooltip_open(title: &str) -> String {
    format!("<span class=\"sh-tooltip\" title=\"{}\">", escape(title))
}

/// Opening tag of a span the editor can click to edit `[left, right)`.
///
/// Offsets count characters, not bytes.
pub fn clickable_open(data_type: &str, left: usize, right: usize) -> String {
    format!(
        "<span class=\"sh-clickable\" data-type=\"{}\" data-left-idx=\"{left}\" data-right-idx=\"{right}\">",
        escape(data_type)
    )
}

/// Text the parser could not use, underlined with an explanation.
pub fn unrecognized(text: &str, title: &str) -> String {
    format!(
        "<span class=\"sh-unrecognized\" title=\"{}\" style=\"{UNRECOGNIZED_STYLE}\">{}</span>",
        escape(title),
        escape(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(Terminal::LBracket, Some("sh-bracket"))]
    #[case(Terminal::Gt, Some("sh-struct"))]
    #[case(Terminal::NotEq, Some("sh-operator"))]
    #[case(Terminal::KwWithin, Some("sh-keyword"))]
    #[case(Terminal::AttrChars, Some("sh-attr"))]
    #[case(Terminal::RegExpEscape, Some("sh-regexp"))]
    #[case(Terminal::Whitespace, None)]
    #[case(Terminal::Semicolon, None)]
    fn terminal_classes(#[case] terminal: Terminal, #[case] expected: Option<&str>) {
        assert_eq!(class_of(terminal).map(HighlightClass::css), expected);
    }

    #[test]
    fn escape_markup_characters() {
        assert_eq!(escape(r#"<a href="x">"#), "&lt;a href=&quot;x&quot;&gt;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn ampersand_operator_is_escaped() {
        assert_eq!(styled(Terminal::Amp, "&"), r#"<span class="sh-operator">&amp;</span>"#);
    }

    #[test]
    fn passthrough_text_is_escaped() {
        assert_eq!(styled(Terminal::Whitespace, " "), " ");
        assert_eq!(styled(Terminal::Unknown, "<"), "&lt;");
    }

    #[test]
    fn styled_terminal() {
        insta::assert_snapshot!(styled(Terminal::Quote, "\""), @r#"<span class="sh-regexp">&quot;</span>"#);
    }

    #[test]
    fn clickable_carries_offsets() {
        assert_eq!(
            clickable_open("tag", 5, 9),
            r#"<span class="sh-clickable" data-type="tag" data-left-idx="5" data-right-idx="9">"#
        );
    }

    #[test]
    fn unrecognized_escapes_title_and_text() {
        assert_eq!(
            unrecognized("<x", "bad \"<\""),
            r#"<span class="sh-unrecognized" title="bad &quot;&lt;&quot;" style="text-decoration: underline dotted red">&lt;x</span>"#
        );
    }
}
