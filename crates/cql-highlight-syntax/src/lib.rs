//! # cql-highlight-syntax
//!
//! Lexer and tracing parser for the corpus query language (CQL), the
//! bracketed attribute-value language used to search annotated corpora:
//!
//! ```text
//! [lemma="dog"] []{0,2} [tag="V.*"] within <s/>
//! ```
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Text → Lexer → Tokens → Parser → Trace events → Tracer
//!               (Logos)          (Grammar)  Enter/Match/Fail
//! ```
//!
//! ### 1. Lexer ([`lexer`] module)
//!
//! Logos splits the query into context-free tokens. Every byte ends up in
//! exactly one token.
//!
//! ### 2. Rules ([`rule`] module)
//!
//! [`Terminal`] and [`NonTerminal`] are closed enums. A [`Rule`] is one or
//! the other, so consumers of the trace never infer "terminal-ness" from a
//! rule's name.
//!
//! ### 3. Parser ([`parser`] module)
//!
//! A backtracking descent parser over the tokens. Instead of building a
//! tree it reports each rule activation to a [`Tracer`]:
//!
//! ```text
//! Enter(Position, 0) Enter(LBracket, 0) Match(1) ... Match(12)
//! ```
//!
//! Rules that fail still leave their matched children in the trace, so a
//! consumer can see how far a half-typed query got.
//!
//! ## Module Structure
//!
//! ```text
//! cql-highlight-syntax/
//! ├── lib.rs           # This file - public API
//! ├── rule.rs          # Terminal / NonTerminal / StartRule tables
//! ├── lexer.rs         # Logos-based tokenizer
//! └── parser/
//!     ├── mod.rs       # Parser struct, SyntaxError, public parse() function
//!     ├── trace.rs     # Tracer trait and TraceEvent
//!     └── grammar/
//!         ├── mod.rs   # Start rule dispatch
//!         ├── query.rs # Sequences, repetition, within/containing, meet/union
//!         └── attr.rs  # Positions, attribute pairs, regexps, structures, phrases
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use cql_highlight_syntax::{StartRule, TraceEvent, parse};
//!
//! let mut trace: Vec<TraceEvent> = Vec::new();
//! parse(r#"[word="dog"];"#, StartRule::Query, &mut trace).unwrap();
//! assert!(!trace.is_empty());
//!
//! // Broken input still produces a trace, plus an error
//! let mut trace: Vec<TraceEvent> = Vec::new();
//! let err = parse(r#"[word="dog""#, StartRule::Sequence, &mut trace).unwrap_err();
//! assert_eq!(err.offset, 11);
//! ```

pub mod lexer;
pub mod parser;
pub mod rule;

pub use parser::trace::{TraceEvent, Tracer};
pub use parser::{Expected, SyntaxError, parse};
pub use rule::{NonTerminal, Rule, STATEMENT_TERMINATOR, StartRule, Terminal};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_start_rule_accepts_its_own_kind_of_input() {
        let cases = [
            (StartRule::Query, r#"[word="a"] within <s/>;"#),
            (StartRule::WithinContainingPart, "<s/>"),
            (StartRule::Sequence, r#"[word="a"] "b""#),
            (StartRule::PhraseQuery, "a b c"),
            (StartRule::AttValList, r#"word="a""#),
            (StartRule::RegExpRaw, "d.g|c[ao]t"),
        ];
        for (start, source) in cases {
            let mut trace: Vec<TraceEvent> = Vec::new();
            assert_eq!(parse(source, start, &mut trace), Ok(()), "{start}: {source}");
        }
    }

    #[test]
    fn start_rule_is_outermost_match() {
        let mut trace: Vec<TraceEvent> = Vec::new();
        parse("<s/>", StartRule::WithinContainingPart, &mut trace).unwrap();
        assert_eq!(
            trace.first(),
            Some(&TraceEvent::Enter {
                rule: Rule::NonTerminal(StartRule::WithinContainingPart.non_terminal()),
                offset: 0
            })
        );
        assert_eq!(trace.last(), Some(&TraceEvent::Match { end: 4 }));
    }
}
