//! # Parse Trace Adapter
//!
//! A stack machine that turns the parser's Enter/Match/Fail events into
//! [`RuleSpanIndex`] registrations.
//!
//! ```text
//! Enter(Position, 0)      push {Position, 0}
//!   Enter(LBracket, 0)    push {LBracket, 0}
//!   Match(1)              pop  -> terminal 0..1, high-water mark 1
//!   ...
//! Match(12)               pop  -> non-terminal Position 0..12
//! ```
//!
//! Failed rules are dropped, but what their children matched stays in the
//! index. That is how a half-typed `[word="dog"` keeps its highlighting.

use cql_highlight_syntax::{Rule, Tracer};

use crate::index::RuleSpanIndex;

/// A rule activation waiting for its Match or Fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ParseFrame {
    rule: Rule,
    start: usize,
}

#[derive(Debug)]
pub struct TraceAdapter<'s> {
    index: RuleSpanIndex<'s>,
    frames: Vec<ParseFrame>,
    high_water_mark: usize,
}

impl<'s> TraceAdapter<'s> {
    /// Adapter filling a fresh index over `source`.
    pub fn new(source: &'s str) -> Self {
        Self {
            index: RuleSpanIndex::new(source),
            frames: Vec::new(),
            high_water_mark: 0,
        }
    }

    /// End of the rightmost terminal matched so far.
    pub fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }

    /// Rules entered but not yet matched or failed.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn into_index(self) -> RuleSpanIndex<'s> {
        if !self.frames.is_empty() {
            log::warn!(
                "trace ended with {} open rule(s), innermost {:?}",
                self.frames.len(),
                self.frames.last().map(|f| f.rule)
            );
        }
        self.index
    }
}

impl Tracer for TraceAdapter<'_> {
    fn enter(&mut self, rule: Rule, offset: usize) {
        self.frames.push(ParseFrame {
            rule,
            start: offset,
        });
    }

    fn matched(&mut self, end: usize) {
        let Some(frame) = self.frames.pop() else {
            log::warn!("match at {end} with no open rule");
            return;
        };
        match frame.rule {
            Rule::Terminal(terminal) => {
                if frame.start < end {
                    self.index.set_terminal(frame.start, end, terminal);
                    self.high_water_mark = self.high_water_mark.max(end);
                }
            }
            Rule::NonTerminal(non_terminal) => {
                self.index.add_non_terminal(frame.start, end, non_terminal);
            }
        }
    }

    fn failed(&mut self, rule: Rule) {
        match self.frames.pop() {
            Some(frame) if frame.rule != rule => {
                log::warn!("{rule:?} failed while {:?} was open", frame.rule);
            }
            Some(_) => {}
            None => log::warn!("{rule:?} failed with no open rule"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cql_highlight_syntax::{NonTerminal, StartRule, Terminal, parse};
    use pretty_assertions::assert_eq;

    fn traced(source: &str, start: StartRule) -> TraceAdapter<'_> {
        let mut adapter = TraceAdapter::new(source);
        let _ = parse(source, start, &mut adapter);
        adapter
    }

    #[test]
    fn terminal_match_advances_high_water_mark() {
        let mut adapter = TraceAdapter::new("dog");
        adapter.enter(Terminal::RegExpChars.into(), 0);
        adapter.matched(3);
        assert_eq!(adapter.high_water_mark(), 3);
        assert_eq!(
            adapter.into_index().terminal_at(0, 3),
            Some(Terminal::RegExpChars)
        );
    }

    #[test]
    fn empty_terminal_is_not_registered() {
        let mut adapter = TraceAdapter::new("dog");
        adapter.enter(Terminal::RegExpChars.into(), 1);
        adapter.matched(1);
        assert_eq!(adapter.high_water_mark(), 0);
        assert_eq!(adapter.into_index().terminal_at(1, 1), None);
    }

    #[test]
    fn zero_width_non_terminal_is_registered() {
        let mut adapter = TraceAdapter::new("");
        adapter.enter(NonTerminal::Seq.into(), 0);
        adapter.matched(0);
        let index = adapter.into_index();
        assert_eq!(index.non_terminals().len(), 1);
    }

    #[test]
    fn failed_rule_is_discarded_but_children_stay() {
        let mut adapter = TraceAdapter::new("[a");
        adapter.enter(NonTerminal::Position.into(), 0);
        adapter.enter(Terminal::LBracket.into(), 0);
        adapter.matched(1);
        adapter.failed(NonTerminal::Position.into());
        assert_eq!(adapter.depth(), 0);
        assert_eq!(adapter.high_water_mark(), 1);
        let index = adapter.into_index();
        assert!(index.non_terminals().is_empty());
        assert_eq!(index.terminal_at(0, 1), Some(Terminal::LBracket));
    }

    #[test]
    fn unbalanced_events_are_ignored() {
        let mut adapter = TraceAdapter::new("x");
        adapter.matched(1);
        adapter.failed(NonTerminal::Query.into());
        assert_eq!(adapter.depth(), 0);
        assert_eq!(adapter.high_water_mark(), 0);
    }

    #[test]
    fn parser_trace_leaves_stack_empty() {
        for source in [r#"[word="dog"];"#, r#"[word="dog""#, "~"] {
            let adapter = traced(source, StartRule::Query);
            assert_eq!(adapter.depth(), 0, "{source:?}");
        }
    }

    #[test]
    fn unterminated_position_keeps_consumed_prefix() {
        let adapter = traced(r#"[bogus="x" ~"#, StartRule::Sequence);
        assert_eq!(adapter.high_water_mark(), 11);
        let index = adapter.into_index();
        assert!(
            index
                .non_terminals()
                .iter()
                .any(|span| span.rule == NonTerminal::AttVal)
        );
        assert!(
            !index
                .non_terminals()
                .iter()
                .any(|span| span.rule == NonTerminal::Position)
        );
    }
}
