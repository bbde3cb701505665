//! # Parser - Traced Backtracking Descent
//!
//! This module drives the grammar over the token stream and reports every
//! rule activation to a [`Tracer`].
//!
//! ## Why a Trace Instead of a Tree?
//!
//! The highlighter needs to know which rule governed each character range,
//! including ranges that were recognized before the parse failed. A tree
//! only exists for input that parses; a trace exists for any prefix.
//!
//! ## Backtracking
//!
//! Grammar functions return `bool`. [`Parser::rule`] wraps a function in
//! Enter/Match/Fail events and rewinds the token position when it fails;
//! [`Parser::attempt`] rewinds without reporting anything, for optional
//! groups like `(_ '|' _ Seq)*`.
//!
//! ```ignore
//! fn position(p: &mut Parser) -> bool {
//!     p.rule(NonTerminal::Position, |p| {
//!         if !p.expect(Terminal::LBracket) {
//!             return false;
//!         }
//!         p.eat_trivia();
//!         attr::att_val_list(p);
//!         p.eat_trivia();
//!         p.expect(Terminal::RBracket)
//!     })
//! }
//! ```
//!
//! ## Errors
//!
//! The parser remembers the farthest offset at which a terminal was expected
//! and not found. When the start rule fails, or leaves input behind, that
//! offset becomes the [`SyntaxError`].
//!
//! ## Module Structure
//!
//! - [`trace`] - The Tracer trait and recorded events
//! - [`grammar`] - Grammar rules (query structure, attributes, phrases)

pub mod trace;

mod grammar;

use thiserror::Error;

use crate::lexer::{Token, lex};
use crate::rule::{NonTerminal, Rule, StartRule, Terminal};
use trace::Tracer;

/// Something the parser was looking for at the failure offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Terminal(Terminal),
    EndOfInput,
}

/// The input does not match the grammar from the given offset on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected {} at offset {offset}, expected {}", describe_found(.found), describe_expected(.expected))]
pub struct SyntaxError {
    /// Byte offset of the farthest failure.
    pub offset: usize,
    /// Character at `offset`, `None` at end of input.
    pub found: Option<char>,
    pub expected: Vec<Expected>,
}

fn describe_found(found: &Option<char>) -> String {
    match found {
        Some(c) => format!("{c:?}"),
        None => "end of input".to_string(),
    }
}

fn describe_expected(expected: &[Expected]) -> String {
    let mut names: Vec<&str> = expected
        .iter()
        .map(|e| match e {
            Expected::Terminal(t) => t.describe(),
            Expected::EndOfInput => "end of input",
        })
        .collect();
    names.dedup();
    match names.len() {
        0 => "nothing".to_string(),
        1 => names[0].to_string(),
        _ => format!("one of {}", names.join(", ")),
    }
}

/// The parser state machine.
///
/// Grammar functions receive `&mut Parser` and use its methods to:
///
/// - Inspect tokens: `current()`, `nth()`, `at()`, `at_end()`
/// - Consume tokens: `expect()`, `expect_as()`, `bump_as()`, `eat_trivia()`
/// - Report structure: `rule()`, `attempt()`
pub struct Parser<'t, 'input> {
    source: &'input str,
    tokens: &'t [Token<'input>],
    pos: usize,
    tracer: &'t mut dyn Tracer,
    farthest: usize,
    expected: Vec<Expected>,
}

impl<'t, 'input> Parser<'t, 'input> {
    pub fn new(
        source: &'input str,
        tokens: &'t [Token<'input>],
        tracer: &'t mut dyn Tracer,
    ) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            tracer,
            farthest: 0,
            expected: Vec::new(),
        }
    }

    /// Byte offset of the current token, or the source length at the end.
    pub fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|t| t.start)
            .unwrap_or(self.source.len())
    }

    /// Current token kind, or `None` past the end.
    pub fn current(&self) -> Option<Terminal> {
        self.nth(0)
    }

    /// Look ahead n tokens.
    pub fn nth(&self, n: usize) -> Option<Terminal> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    pub fn at(&self, kind: Terminal) -> bool {
        self.current() == Some(kind)
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Consume the current token as `kind` if it is one.
    pub fn expect(&mut self, kind: Terminal) -> bool {
        self.expect_as(kind, kind)
    }

    /// Consume a `lexical` token, reporting it as the `tagged` terminal.
    pub fn expect_as(&mut self, lexical: Terminal, tagged: Terminal) -> bool {
        let offset = self.offset();
        self.tracer.enter(tagged.into(), offset);
        if self.at(lexical) {
            self.pos += 1;
            self.tracer.matched(self.offset());
            true
        } else {
            self.note_expected(&[lexical]);
            self.tracer.failed(tagged.into());
            false
        }
    }

    /// Consume `n` tokens as one `tagged` terminal.
    pub fn bump_as(&mut self, tagged: Terminal, n: usize) {
        if n == 0 || self.pos + n > self.tokens.len() {
            return;
        }
        self.tracer.enter(tagged.into(), self.offset());
        self.pos += n;
        self.tracer.matched(self.offset());
    }

    /// Consume optional whitespace.
    pub fn eat_trivia(&mut self) {
        if self.at(Terminal::Whitespace) {
            self.expect(Terminal::Whitespace);
        }
    }

    /// Run a grammar rule, reporting it to the tracer.
    ///
    /// The token position is restored when the rule fails.
    pub fn rule(&mut self, rule: NonTerminal, f: impl FnOnce(&mut Self) -> bool) -> bool {
        let saved = self.pos;
        self.tracer.enter(Rule::NonTerminal(rule), self.offset());
        if f(self) {
            self.tracer.matched(self.offset());
            true
        } else {
            self.pos = saved;
            self.tracer.failed(Rule::NonTerminal(rule));
            false
        }
    }

    /// Run an anonymous group, restoring the position when it fails.
    pub fn attempt(&mut self, f: impl FnOnce(&mut Self) -> bool) -> bool {
        let saved = self.pos;
        if f(self) {
            true
        } else {
            self.pos = saved;
            false
        }
    }

    /// Record what the grammar wanted at the current offset.
    pub fn note_expected(&mut self, kinds: &[Terminal]) {
        let offset = self.offset();
        for kind in kinds {
            self.note_failure(offset, Expected::Terminal(*kind));
        }
    }

    fn note_failure(&mut self, offset: usize, expected: Expected) {
        if offset > self.farthest {
            self.farthest = offset;
            self.expected.clear();
        }
        if offset == self.farthest && !self.expected.contains(&expected) {
            self.expected.push(expected);
        }
    }

    /// Turn the start rule's outcome into the parse result.
    fn finish(mut self, matched: bool) -> Result<(), SyntaxError> {
        if matched && self.at_end() {
            return Ok(());
        }
        if matched {
            self.note_failure(self.offset(), Expected::EndOfInput);
        }
        Err(SyntaxError {
            offset: self.farthest,
            found: self
                .source
                .get(self.farthest..)
                .and_then(|rest| rest.chars().next()),
            expected: self.expected,
        })
    }
}

/// Parse `source` from the given start rule, reporting the trace to `tracer`.
///
/// Leading and trailing whitespace around the start rule is accepted. Input
/// left over after the start rule is an error.
pub fn parse(source: &str, start: StartRule, tracer: &mut dyn Tracer) -> Result<(), SyntaxError> {
    let tokens = lex(source);
    let mut parser = Parser::new(source, &tokens, tracer);
    let matched = grammar::start(&mut parser, start);
    parser.finish(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use trace::TraceEvent;

    fn trace_of(source: &str, start: StartRule) -> (Vec<TraceEvent>, Result<(), SyntaxError>) {
        let mut events: Vec<TraceEvent> = Vec::new();
        let result = parse(source, start, &mut events);
        (events, result)
    }

    #[test]
    fn trace_is_balanced() {
        for source in [r#"[word="dog"];"#, r#"[word="dog";"#, "~~~", ""] {
            let (events, _) = trace_of(source, StartRule::Query);
            let mut depth = 0i32;
            for event in events {
                match event {
                    TraceEvent::Enter { .. } => depth += 1,
                    TraceEvent::Match { .. } | TraceEvent::Fail { .. } => depth -= 1,
                }
                assert!(depth >= 0, "unbalanced trace for {source:?}");
            }
            assert_eq!(depth, 0, "unclosed rules for {source:?}");
        }
    }

    #[test]
    fn regexp_raw_parses_bare_word() {
        let (events, result) = trace_of("dog", StartRule::RegExpRaw);
        assert_eq!(result, Ok(()));
        assert_eq!(
            events,
            vec![
                TraceEvent::Enter {
                    rule: Rule::NonTerminal(NonTerminal::RegExpRaw),
                    offset: 0
                },
                TraceEvent::Enter {
                    rule: Rule::Terminal(Terminal::RegExpChars),
                    offset: 0
                },
                TraceEvent::Match { end: 3 },
                TraceEvent::Match { end: 3 },
            ]
        );
    }

    #[test]
    fn leftover_input_is_an_error() {
        let (_, result) = trace_of(r#"dog"cat"#, StartRule::RegExpRaw);
        let err = result.unwrap_err();
        assert_eq!(err.offset, 3);
        assert_eq!(err.found, Some('"'));
        assert_eq!(err.expected, vec![Expected::EndOfInput]);
    }

    #[test]
    fn unterminated_position_fails_at_end() {
        let (_, result) = trace_of(r#"[word="dog""#, StartRule::Sequence);
        let err = result.unwrap_err();
        assert_eq!(err.offset, 11);
        assert_eq!(err.found, None);
        assert!(
            err.expected
                .contains(&Expected::Terminal(Terminal::RBracket))
        );
    }

    #[test]
    fn error_message_names_found_and_expected() {
        let (_, result) = trace_of("[word=", StartRule::Sequence);
        let message = result.unwrap_err().to_string();
        assert!(message.starts_with("unexpected end of input at offset 6"));
        assert!(message.contains("`\"`"));
    }

    #[test]
    fn attempt_restores_position() {
        let tokens = lex("a b");
        let mut events: Vec<TraceEvent> = Vec::new();
        let mut parser = Parser::new("a b", &tokens, &mut events);
        let consumed = parser.attempt(|p| p.expect(Terminal::Ident) && p.expect(Terminal::Ident));
        assert!(!consumed);
        assert_eq!(parser.offset(), 0);
    }
}
