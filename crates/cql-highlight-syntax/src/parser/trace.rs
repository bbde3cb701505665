//! # Parse Trace
//!
//! The parser does not build a tree. It reports every rule activation to a
//! [`Tracer`] as it happens, and the consumer decides what to keep.
//!
//! ## Event Protocol
//!
//! Each activation produces exactly two events:
//!
//! ```text
//! Enter(Position, 0)          ← rule starts at byte 0
//!   Enter(LBracket, 0)
//!   Match(1)                  ← terminal consumed bytes 0..1
//!   Enter(AttVal, 1)
//!     ...
//!   Match(11)
//!   Enter(RBracket, 11)
//!   Match(12)
//! Match(12)                   ← Position spans 0..12
//! ```
//!
//! A rule that does not apply reports `Fail` instead of `Match`. Its
//! children may already have matched; those events stay in the trace, which
//! is what lets a highlighter show how far a broken query got.
//!
//! Enter/Match/Fail nest like brackets, so a consumer can keep a stack of
//! open rules and pop one on every `Match` or `Fail`.

use crate::rule::Rule;

/// Receiver of parser trace events.
pub trait Tracer {
    /// A rule starts at byte `offset`.
    fn enter(&mut self, rule: Rule, offset: usize);

    /// The innermost open rule matched, ending at byte `end`.
    fn matched(&mut self, end: usize);

    /// The innermost open rule did not match.
    fn failed(&mut self, rule: Rule);
}

/// A recorded trace event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    Enter { rule: Rule, offset: usize },
    Match { end: usize },
    Fail { rule: Rule },
}

/// Recording tracer, mostly useful in tests and debugging.
impl Tracer for Vec<TraceEvent> {
    fn enter(&mut self, rule: Rule, offset: usize) {
        self.push(TraceEvent::Enter { rule, offset });
    }

    fn matched(&mut self, end: usize) {
        self.push(TraceEvent::Match { end });
    }

    fn failed(&mut self, rule: Rule) {
        self.push(TraceEvent::Fail { rule });
    }
}
