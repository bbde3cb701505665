//! Grammar rule tables for the query language.
//!
//! Terminals and non-terminals are two closed enums, joined by [`Rule`].
//! Consumers never have to guess from a rule's name whether it produces
//! characters or structure.

use std::fmt;

/// Rules that produce literal characters with no further structure.
///
/// The first block mirrors the lexer's token kinds. The second block is
/// assigned by the grammar when a token's meaning depends on where it sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Terminal {
    // === Lexical terminals ===
    Whitespace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Lt,
    Gt,
    Slash,
    Quote,
    Backslash,
    Eq,
    NotEq,
    Not,
    Amp,
    Pipe,
    Star,
    Plus,
    Question,
    Comma,
    Semicolon,
    KwWithin,
    KwContaining,
    KwMeet,
    KwUnion,
    Number,
    Ident,
    Text,
    Unknown,

    // === Contextual terminals ===
    /// Identifier in attribute or structure name position
    AttrChars,
    /// A run of characters inside a regular expression
    RegExpChars,
    /// A backslash and the character it escapes
    RegExpEscape,
}

impl Terminal {
    /// Human readable form used in syntax error messages.
    pub fn describe(self) -> &'static str {
        match self {
            Terminal::Whitespace => "whitespace",
            Terminal::LBracket => "`[`",
            Terminal::RBracket => "`]`",
            Terminal::LParen => "`(`",
            Terminal::RParen => "`)`",
            Terminal::LBrace => "`{`",
            Terminal::RBrace => "`}`",
            Terminal::Lt => "`<`",
            Terminal::Gt => "`>`",
            Terminal::Slash => "`/`",
            Terminal::Quote => "`\"`",
            Terminal::Backslash => "`\\`",
            Terminal::Eq => "`=`",
            Terminal::NotEq => "`!=`",
            Terminal::Not => "`!`",
            Terminal::Amp => "`&`",
            Terminal::Pipe => "`|`",
            Terminal::Star => "`*`",
            Terminal::Plus => "`+`",
            Terminal::Question => "`?`",
            Terminal::Comma => "`,`",
            Terminal::Semicolon => "`;`",
            Terminal::KwWithin => "`within`",
            Terminal::KwContaining => "`containing`",
            Terminal::KwMeet => "`meet`",
            Terminal::KwUnion => "`union`",
            Terminal::Number => "number",
            Terminal::Ident | Terminal::AttrChars => "name",
            Terminal::Text => "text",
            Terminal::Unknown => "character",
            Terminal::RegExpChars | Terminal::RegExpEscape => "regular expression",
        }
    }
}

/// Rules composed of other rules.
///
/// They carry no text of their own; the highlighter uses them to wrap and
/// validate the characters they span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NonTerminal {
    Query,
    WithinOrContaining,
    WithinContainingPart,
    Sequence,
    Seq,
    Repetition,
    AtomQuery,
    MeetOp,
    UnionOp,
    RepOpt,
    /// Bracketed attribute-value position: `[word="dog"]`
    Position,
    AttValList,
    AttValAnd,
    /// One attribute-value pair: `word="dog"`
    AttVal,
    AttName,
    /// Quoted regular expression including the quotes
    RegExp,
    /// Regular expression body
    RegExpRaw,
    /// Structure tag: `<s>`, `</s>`, `<doc id="x"/>`
    Structure,
    PhraseQuery,
    PhraseWord,
}

/// Any grammar rule reported in a parse trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rule {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
}

impl Rule {
    pub fn is_terminal(self) -> bool {
        matches!(self, Rule::Terminal(_))
    }
}

impl From<Terminal> for Rule {
    fn from(terminal: Terminal) -> Self {
        Rule::Terminal(terminal)
    }
}

impl From<NonTerminal> for Rule {
    fn from(non_terminal: NonTerminal) -> Self {
        Rule::NonTerminal(non_terminal)
    }
}

/// Grammar entry points a caller may start parsing from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StartRule {
    /// A complete query, terminated by `;`
    Query,
    /// The operand of `within`/`containing`
    WithinContainingPart,
    Sequence,
    /// Whitespace separated words
    PhraseQuery,
    /// Attribute-value pairs without the enclosing brackets
    AttValList,
    /// A bare regular expression
    RegExpRaw,
}

/// Text appended to the source when a start rule needs a whole-expression
/// match.
pub const STATEMENT_TERMINATOR: &str = ";";

impl StartRule {
    /// The non-terminal this entry point is reported as in the trace.
    pub fn non_terminal(self) -> NonTerminal {
        match self {
            StartRule::Query => NonTerminal::Query,
            StartRule::WithinContainingPart => NonTerminal::WithinContainingPart,
            StartRule::Sequence => NonTerminal::Sequence,
            StartRule::PhraseQuery => NonTerminal::PhraseQuery,
            StartRule::AttValList => NonTerminal::AttValList,
            StartRule::RegExpRaw => NonTerminal::RegExpRaw,
        }
    }

    /// Whether the source must be followed by [`STATEMENT_TERMINATOR`].
    pub fn requires_terminator(self) -> bool {
        matches!(self, StartRule::Query)
    }
}

impl fmt::Display for StartRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.non_terminal())
    }
}
