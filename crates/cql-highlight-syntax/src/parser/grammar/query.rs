//! # Query-Level Grammar
//!
//! ```text
//! Query               := _ Sequence (_ WithinOrContaining)* _ ';'
//! WithinOrContaining  := '!'? ('within' | 'containing') _ WithinContainingPart
//! WithinContainingPart:= Sequence
//! Sequence            := Seq (_ '|' _ Seq)*
//! Seq                 := Repetition (_ Repetition)*
//! Repetition          := AtomQuery RepOpt?
//! AtomQuery           := Position | RegExp | Structure
//!                      | '(' _ (MeetOp | UnionOp | Sequence) _ ')'
//! MeetOp              := 'meet' _ Position _ Position (_ Number _ Number)?
//! UnionOp             := 'union' _ Position _ Position
//! RepOpt              := '*' | '+' | '?' | '{' _ Number _ (',' _ Number?)? _ '}'
//! ```

use super::attr;
use crate::parser::Parser;
use crate::rule::{NonTerminal, Terminal};

pub(super) fn query(p: &mut Parser<'_, '_>) -> bool {
    p.rule(NonTerminal::Query, |p| {
        p.eat_trivia();
        if !sequence(p) {
            return false;
        }
        while p.attempt(|p| {
            p.eat_trivia();
            within_or_containing(p)
        }) {}
        p.eat_trivia();
        p.expect(Terminal::Semicolon)
    })
}

fn within_or_containing(p: &mut Parser<'_, '_>) -> bool {
    p.rule(NonTerminal::WithinOrContaining, |p| {
        if p.at(Terminal::Not) {
            p.expect(Terminal::Not);
            p.eat_trivia();
        }
        if !(p.expect(Terminal::KwWithin) || p.expect(Terminal::KwContaining)) {
            return false;
        }
        p.eat_trivia();
        within_containing_part(p)
    })
}

pub(super) fn within_containing_part(p: &mut Parser<'_, '_>) -> bool {
    p.rule(NonTerminal::WithinContainingPart, sequence)
}

pub(super) fn sequence(p: &mut Parser<'_, '_>) -> bool {
    p.rule(NonTerminal::Sequence, |p| {
        if !seq(p) {
            return false;
        }
        while p.attempt(|p| {
            p.eat_trivia();
            if !p.expect(Terminal::Pipe) {
                return false;
            }
            p.eat_trivia();
            seq(p)
        }) {}
        true
    })
}

fn seq(p: &mut Parser<'_, '_>) -> bool {
    p.rule(NonTerminal::Seq, |p| {
        if !repetition(p) {
            return false;
        }
        while p.attempt(|p| {
            p.eat_trivia();
            repetition(p)
        }) {}
        true
    })
}

fn repetition(p: &mut Parser<'_, '_>) -> bool {
    p.rule(NonTerminal::Repetition, |p| {
        if !atom_query(p) {
            return false;
        }
        if matches!(
            p.current(),
            Some(Terminal::Star | Terminal::Plus | Terminal::Question | Terminal::LBrace)
        ) {
            rep_opt(p);
        }
        true
    })
}

fn atom_query(p: &mut Parser<'_, '_>) -> bool {
    p.rule(NonTerminal::AtomQuery, |p| match p.current() {
        Some(Terminal::LBracket) => attr::position(p),
        Some(Terminal::Quote) => attr::regexp(p),
        Some(Terminal::Lt) => attr::structure(p),
        Some(Terminal::LParen) => grouped(p),
        _ => {
            p.note_expected(&[
                Terminal::LBracket,
                Terminal::Quote,
                Terminal::Lt,
                Terminal::LParen,
            ]);
            false
        }
    })
}

fn grouped(p: &mut Parser<'_, '_>) -> bool {
    if !p.expect(Terminal::LParen) {
        return false;
    }
    p.eat_trivia();
    let inner = match p.current() {
        Some(Terminal::KwMeet) => meet_op(p),
        Some(Terminal::KwUnion) => union_op(p),
        _ => sequence(p),
    };
    if !inner {
        return false;
    }
    p.eat_trivia();
    p.expect(Terminal::RParen)
}

fn meet_op(p: &mut Parser<'_, '_>) -> bool {
    p.rule(NonTerminal::MeetOp, |p| {
        if !(p.expect(Terminal::KwMeet) && position_pair(p)) {
            return false;
        }
        // context window, e.g. `-2 2`
        p.attempt(|p| {
            p.eat_trivia();
            if !p.expect(Terminal::Number) {
                return false;
            }
            p.eat_trivia();
            p.expect(Terminal::Number)
        });
        true
    })
}

fn union_op(p: &mut Parser<'_, '_>) -> bool {
    p.rule(NonTerminal::UnionOp, |p| {
        p.expect(Terminal::KwUnion) && position_pair(p)
    })
}

fn position_pair(p: &mut Parser<'_, '_>) -> bool {
    p.eat_trivia();
    if !attr::position(p) {
        return false;
    }
    p.eat_trivia();
    attr::position(p)
}

fn rep_opt(p: &mut Parser<'_, '_>) -> bool {
    p.rule(NonTerminal::RepOpt, |p| match p.current() {
        Some(Terminal::Star) => p.expect(Terminal::Star),
        Some(Terminal::Plus) => p.expect(Terminal::Plus),
        Some(Terminal::Question) => p.expect(Terminal::Question),
        _ => {
            if !p.expect(Terminal::LBrace) {
                return false;
            }
            p.eat_trivia();
            if !p.expect(Terminal::Number) {
                return false;
            }
            p.eat_trivia();
            if p.at(Terminal::Comma) {
                p.expect(Terminal::Comma);
                p.eat_trivia();
                if p.at(Terminal::Number) {
                    p.expect(Terminal::Number);
                    p.eat_trivia();
                }
            }
            p.expect(Terminal::RBrace)
        }
    })
}
