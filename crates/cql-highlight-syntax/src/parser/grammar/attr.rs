//! # Attribute-Level Grammar
//!
//! Positions, attribute-value pairs, regular expressions, structure tags
//! and plain phrases.
//!
//! ```text
//! Position    := '[' _ AttValList? _ ']'
//! AttValList  := AttValAnd (_ '|' _ AttValAnd)*
//! AttValAnd   := AttVal (_ '&' _ AttVal)*
//! AttVal      := '!' _ AttVal | '(' _ AttValList _ ')' | AttName _ ('!=' | '=') _ RegExp
//! AttName     := Ident
//! RegExp      := '"' RegExpRaw? '"'
//! RegExpRaw   := ('\' any | any-but-quote)+
//! Structure   := '<' _ '/'? _ AttName (_ AttVal)* _ '/'? _ '>'
//! PhraseQuery := PhraseWord (_ PhraseWord)*
//! PhraseWord  := ('\' any | any-but-whitespace)+
//! ```
//!
//! Inside a regular expression every token loses its query meaning: `[`,
//! `*` or `within` are just regexp characters there. The grammar re-tags
//! them as [`Terminal::RegExpChars`] so the highlighter never sees a bracket
//! terminal inside a quoted value.

use crate::parser::Parser;
use crate::rule::{NonTerminal, Terminal};

pub(super) fn position(p: &mut Parser<'_, '_>) -> bool {
    p.rule(NonTerminal::Position, |p| {
        if !p.expect(Terminal::LBracket) {
            return false;
        }
        p.eat_trivia();
        if !p.at(Terminal::RBracket) {
            att_val_list(p);
        }
        p.eat_trivia();
        p.expect(Terminal::RBracket)
    })
}

pub(super) fn att_val_list(p: &mut Parser<'_, '_>) -> bool {
    p.rule(NonTerminal::AttValList, |p| {
        if !att_val_and(p) {
            return false;
        }
        while p.attempt(|p| {
            p.eat_trivia();
            if !p.expect(Terminal::Pipe) {
                return false;
            }
            p.eat_trivia();
            att_val_and(p)
        }) {}
        true
    })
}

fn att_val_and(p: &mut Parser<'_, '_>) -> bool {
    p.rule(NonTerminal::AttValAnd, |p| {
        if !att_val(p) {
            return false;
        }
        while p.attempt(|p| {
            p.eat_trivia();
            if !p.expect(Terminal::Amp) {
                return false;
            }
            p.eat_trivia();
            att_val(p)
        }) {}
        true
    })
}

fn att_val(p: &mut Parser<'_, '_>) -> bool {
    p.rule(NonTerminal::AttVal, |p| match p.current() {
        Some(Terminal::Not) => {
            p.expect(Terminal::Not);
            p.eat_trivia();
            att_val(p)
        }
        Some(Terminal::LParen) => {
            p.expect(Terminal::LParen);
            p.eat_trivia();
            if !att_val_list(p) {
                return false;
            }
            p.eat_trivia();
            p.expect(Terminal::RParen)
        }
        _ => {
            if !att_name(p) {
                return false;
            }
            p.eat_trivia();
            if !(p.expect(Terminal::NotEq) || p.expect(Terminal::Eq)) {
                return false;
            }
            p.eat_trivia();
            regexp(p)
        }
    })
}

fn att_name(p: &mut Parser<'_, '_>) -> bool {
    p.rule(NonTerminal::AttName, |p| {
        p.expect_as(Terminal::Ident, Terminal::AttrChars)
    })
}

pub(super) fn regexp(p: &mut Parser<'_, '_>) -> bool {
    p.rule(NonTerminal::RegExp, |p| {
        if !p.expect(Terminal::Quote) {
            return false;
        }
        if !p.at(Terminal::Quote) {
            regexp_raw(p);
        }
        p.expect(Terminal::Quote)
    })
}

pub(super) fn regexp_raw(p: &mut Parser<'_, '_>) -> bool {
    p.rule(NonTerminal::RegExpRaw, |p| {
        regexp_chars(p, |kind| kind != Terminal::Quote)
    })
}

/// Consume escapes and runs of tokens accepted by `accept`, re-tagged as
/// regexp terminals. Returns whether anything was consumed.
fn regexp_chars(p: &mut Parser<'_, '_>, accept: impl Fn(Terminal) -> bool) -> bool {
    let mut consumed = false;
    loop {
        match p.current() {
            Some(Terminal::Backslash) => {
                let n = if p.nth(1).is_some() { 2 } else { 1 };
                p.bump_as(Terminal::RegExpEscape, n);
            }
            Some(kind) if accept(kind) => {
                let mut n = 1;
                while p
                    .nth(n)
                    .is_some_and(|next| next != Terminal::Backslash && accept(next))
                {
                    n += 1;
                }
                p.bump_as(Terminal::RegExpChars, n);
            }
            _ => break,
        }
        consumed = true;
    }
    if !consumed {
        p.note_expected(&[Terminal::RegExpChars]);
    }
    consumed
}

pub(super) fn structure(p: &mut Parser<'_, '_>) -> bool {
    p.rule(NonTerminal::Structure, |p| {
        if !p.expect(Terminal::Lt) {
            return false;
        }
        p.eat_trivia();
        if p.at(Terminal::Slash) {
            p.expect(Terminal::Slash);
            p.eat_trivia();
        }
        if !att_name(p) {
            return false;
        }
        while p.attempt(|p| {
            p.eat_trivia();
            att_val(p)
        }) {}
        p.eat_trivia();
        if p.at(Terminal::Slash) {
            p.expect(Terminal::Slash);
            p.eat_trivia();
        }
        p.expect(Terminal::Gt)
    })
}

pub(super) fn phrase_query(p: &mut Parser<'_, '_>) -> bool {
    p.rule(NonTerminal::PhraseQuery, |p| {
        if !phrase_word(p) {
            return false;
        }
        while p.attempt(|p| p.expect(Terminal::Whitespace) && phrase_word(p)) {}
        true
    })
}

fn phrase_word(p: &mut Parser<'_, '_>) -> bool {
    p.rule(NonTerminal::PhraseWord, |p| {
        regexp_chars(p, |kind| kind != Terminal::Whitespace)
    })
}

#[cfg(test)]
mod tests {
    use crate::parser::trace::TraceEvent;
    use crate::parser::{Expected, parse};
    use crate::rule::{Rule, StartRule, Terminal};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    /// Terminal spans that matched, in match order.
    fn terminals(source: &str, start: StartRule) -> Vec<(Terminal, &str)> {
        let mut events: Vec<TraceEvent> = Vec::new();
        let _ = parse(source, start, &mut events);
        let mut stack = Vec::new();
        let mut out = Vec::new();
        for event in events {
            match event {
                TraceEvent::Enter { rule, offset } => stack.push((rule, offset)),
                TraceEvent::Match { end } => {
                    if let Some((Rule::Terminal(t), start)) = stack.pop() {
                        out.push((t, &source[start..end]));
                    }
                }
                TraceEvent::Fail { .. } => {
                    stack.pop();
                }
            }
        }
        out
    }

    #[test]
    fn regexp_contents_are_retagged() {
        let found = terminals(r#"[tag="N[^V]*"]"#, StartRule::Sequence);
        assert!(found.contains(&(Terminal::RegExpChars, "N[^V]*")));
        assert!(found.contains(&(Terminal::AttrChars, "tag")));
        // only the position's own bracket
        assert_eq!(
            found
                .iter()
                .filter(|(t, _)| *t == Terminal::LBracket)
                .count(),
            1
        );
    }

    #[test]
    fn escaped_quote_stays_inside_regexp() {
        let found = terminals(r#"[word="a\"b"]"#, StartRule::Sequence);
        assert!(found.contains(&(Terminal::RegExpEscape, "\\\"")));
        assert!(found.contains(&(Terminal::RegExpChars, "b")));
    }

    #[rstest]
    #[case(r#"word="dog""#)]
    #[case(r#"word="dog" & tag!="N.*""#)]
    #[case(r#"(word="a" | lemma="b") & !tag="V""#)]
    fn attribute_lists(#[case] source: &str) {
        assert_eq!(parse(source, StartRule::AttValList, &mut Vec::<TraceEvent>::new()), Ok(()));
    }

    #[rstest]
    #[case("dog")]
    #[case("black dog barks")]
    #[case("  padded  ")]
    #[case("a\\ b")]
    fn phrases(#[case] source: &str) {
        assert_eq!(parse(source, StartRule::PhraseQuery, &mut Vec::<TraceEvent>::new()), Ok(()));
    }

    #[test]
    fn structure_with_attributes() {
        let found = terminals(r#"<doc id="1" year="2001"/>"#, StartRule::Sequence);
        let names: Vec<_> = found
            .iter()
            .filter(|(t, _)| *t == Terminal::AttrChars)
            .map(|(_, text)| *text)
            .collect();
        assert_eq!(names, vec!["doc", "id", "year"]);
    }

    #[test]
    fn empty_regexp_raw_reports_expectation() {
        let err = parse("\"x", StartRule::RegExpRaw, &mut Vec::<TraceEvent>::new()).unwrap_err();
        assert_eq!(err.offset, 0);
        assert_eq!(err.found, Some('"'));
        assert!(err.expected.contains(&Expected::Terminal(Terminal::RegExpChars)));
    }
}
