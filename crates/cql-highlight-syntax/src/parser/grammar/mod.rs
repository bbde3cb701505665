//! # Grammar Rules
//!
//! Each function takes a `&mut Parser`, reports itself through
//! [`Parser::rule`] and returns whether it matched.
//!
//! ## Module Structure
//!
//! - [`query`] - Query structure: sequences, repetition, `within`, `meet`
//! - [`attr`] - Positions, attribute-value pairs, regular expressions,
//!   structure tags and plain phrases
//!
//! ## Writing Grammar Rules
//!
//! ```ignore
//! fn regexp(p: &mut Parser) -> bool {
//!     p.rule(NonTerminal::RegExp, |p| {
//!         if !p.expect(Terminal::Quote) {
//!             return false;
//!         }
//!         if !p.at(Terminal::Quote) {
//!             regexp_raw(p);
//!         }
//!         p.expect(Terminal::Quote)
//!     })
//! }
//! ```
//!
//! Rules never consume input when they fail; `rule()` rewinds for them.
//! Optional whitespace is eaten with `eat_trivia()` wherever the query
//! language allows it.

mod attr;
mod query;

use crate::parser::Parser;
use crate::rule::StartRule;

/// Parse from the given entry point, allowing surrounding whitespace.
pub fn start(p: &mut Parser<'_, '_>, rule: StartRule) -> bool {
    p.eat_trivia();
    let matched = match rule {
        StartRule::Query => query::query(p),
        StartRule::WithinContainingPart => query::within_containing_part(p),
        StartRule::Sequence => query::sequence(p),
        StartRule::PhraseQuery => attr::phrase_query(p),
        StartRule::AttValList => attr::att_val_list(p),
        StartRule::RegExpRaw => attr::regexp_raw(p),
    };
    if matched {
        p.eat_trivia();
    }
    matched
}
