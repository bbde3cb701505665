//! # Lexer - Tokenizing Query Source
//!
//! This module provides the first stage of parsing: breaking query text into
//! tokens using the [Logos] lexer generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Lossless Guarantee
//!
//! Every byte in the input appears in exactly one token. Unknown characters
//! are not dropped, they become single-character [`Terminal::Unknown`] tokens.
//! This is what lets the highlighter reproduce the query exactly:
//!
//! ```
//! use cql_highlight_syntax::lexer::lex;
//!
//! let input = r#"[word="dog"] within <s/>"#;
//! let tokens = lex(input);
//!
//! let reconstructed: String = tokens.iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! ## Why Two Token Enums?
//!
//! Logos derives on its own [`TokenKind`] enum, while the rest of the crate
//! speaks [`Terminal`]. The grammar also produces terminals the lexer never
//! sees (attribute-name and regular-expression characters are re-tagged by
//! context), so the two sets are not the same.
//! [`TokenKind::to_terminal`] converts between them.
//!
//! ## Token Design
//!
//! Tokens are context-free. The lexer does not know whether `[` opens a
//! position or sits inside a regular expression; the grammar decides that.

use logos::Logos;

use crate::rule::Terminal;

/// Token kinds produced by the Logos lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Spaces, tabs and line breaks
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    /// `<` opening a structure tag
    #[token("<")]
    Lt,

    /// `>` closing a structure tag
    #[token(">")]
    Gt,

    #[token("/")]
    Slash,

    #[token("\"")]
    Quote,

    #[token("\\")]
    Backslash,

    #[token("=")]
    Eq,

    #[token("!=")]
    NotEq,

    #[token("!")]
    Not,

    #[token("&")]
    Amp,

    #[token("|")]
    Pipe,

    #[token("*")]
    Star,

    #[token("+")]
    Plus,

    #[token("?")]
    Question,

    #[token(",")]
    Comma,

    /// Statement terminator
    #[token(";")]
    Semicolon,

    #[token("within")]
    Within,

    #[token("containing")]
    Containing,

    #[token("meet")]
    Meet,

    #[token("union")]
    Union,

    /// Integer, optionally signed (meet windows take negative bounds)
    #[regex(r"-?[0-9]+")]
    Number,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    /// Runs of non-ASCII characters (accented words, other scripts)
    #[regex(r"[^\x00-\x7F]+")]
    Text,
}

impl TokenKind {
    /// Convert to the terminal the grammar sees by default.
    pub fn to_terminal(self) -> Terminal {
        match self {
            TokenKind::Whitespace => Terminal::Whitespace,
            TokenKind::LBracket => Terminal::LBracket,
            TokenKind::RBracket => Terminal::RBracket,
            TokenKind::LParen => Terminal::LParen,
            TokenKind::RParen => Terminal::RParen,
            TokenKind::LBrace => Terminal::LBrace,
            TokenKind::RBrace => Terminal::RBrace,
            TokenKind::Lt => Terminal::Lt,
            TokenKind::Gt => Terminal::Gt,
            TokenKind::Slash => Terminal::Slash,
            TokenKind::Quote => Terminal::Quote,
            TokenKind::Backslash => Terminal::Backslash,
            TokenKind::Eq => Terminal::Eq,
            TokenKind::NotEq => Terminal::NotEq,
            TokenKind::Not => Terminal::Not,
            TokenKind::Amp => Terminal::Amp,
            TokenKind::Pipe => Terminal::Pipe,
            TokenKind::Star => Terminal::Star,
            TokenKind::Plus => Terminal::Plus,
            TokenKind::Question => Terminal::Question,
            TokenKind::Comma => Terminal::Comma,
            TokenKind::Semicolon => Terminal::Semicolon,
            TokenKind::Within => Terminal::KwWithin,
            TokenKind::Containing => Terminal::KwContaining,
            TokenKind::Meet => Terminal::KwMeet,
            TokenKind::Union => Terminal::KwUnion,
            TokenKind::Number => Terminal::Number,
            TokenKind::Ident => Terminal::Ident,
            TokenKind::Text => Terminal::Text,
        }
    }
}

/// A lexed token with its kind, text slice and byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: Terminal,
    pub text: &'a str,
    /// Byte offset of the first character in the source.
    pub start: usize,
}

impl Token<'_> {
    /// Byte offset just past the token.
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// Lex the input into a sequence of tokens.
///
/// Guarantees that all bytes from the input appear in the output tokens.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let kind = match result {
            Ok(token_kind) => token_kind.to_terminal(),
            // Logos error means an unrecognized character
            Err(()) => Terminal::Unknown,
        };
        tokens.push(Token {
            kind,
            text: lexer.slice(),
            start: lexer.span().start,
        });
    }

    tokens
}
