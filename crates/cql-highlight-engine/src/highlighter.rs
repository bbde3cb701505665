//! # Highlight Driver
//!
//! Runs passes of the parser over a query until every character is
//! accounted for.
//!
//! ```text
//! "[word="dog"] ~ [lemma="cat"]"
//!  └─ pass 0: Query ──────┘ │ └─ pass 1: WithinContainingPart ─┘
//!                           └─ skipped, shown as unrecognized
//! ```
//!
//! Each pass parses with one candidate start rule and renders what it
//! consumed. If input remains, the next whitespace-delimited run is skipped
//! and the rest is retried with the next candidate. Only the first pass
//! validates names against the schema and wraps long queries; later passes
//! are guesses and only style their text.

use std::borrow::Cow;

use cql_highlight_syntax::{STATEMENT_TERMINATOR, StartRule, SyntaxError, parse};

use crate::adapter::TraceAdapter;
use crate::dialect::QueryDialect;
use crate::error::HighlightError;
use crate::index::{RenderOptions, Rendered};
use crate::labels::Labels;
use crate::markup;
use crate::schema::{NullValidator, SchemaValidator};

/// Markup for a whole query and the validation hint of its first pass.
pub type Highlighted = Rendered;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighter {
    start_rules: Vec<StartRule>,
    labels: Labels,
    long_wrap: bool,
}

/// Outcome of parsing one segment with one start rule.
struct Pass {
    rendered: Rendered,
    consumed: usize,
    error: Option<SyntaxError>,
}

impl Highlighter {
    pub fn new(dialect: QueryDialect) -> Self {
        Self {
            start_rules: dialect.start_rules().to_vec(),
            labels: Labels::default(),
            long_wrap: false,
        }
    }

    /// Highlighter trying `start_rules` in order.
    pub fn with_start_rules(start_rules: Vec<StartRule>) -> Result<Self, HighlightError> {
        if start_rules.is_empty() {
            return Err(HighlightError::NoStartRules);
        }
        Ok(Self {
            start_rules,
            labels: Labels::default(),
            long_wrap: false,
        })
    }

    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_long_wrap(mut self, long_wrap: bool) -> Self {
        self.long_wrap = long_wrap;
        self
    }

    pub fn start_rules(&self) -> &[StartRule] {
        &self.start_rules
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Highlight `query`, reporting the validation hint through `on_hint`.
    ///
    /// `on_hint` is called exactly once, with `None` when there is nothing
    /// to report. Without a validator every name is accepted.
    pub fn highlight(
        &self,
        query: &str,
        validator: Option<&dyn SchemaValidator>,
        mut on_hint: impl FnMut(Option<&str>),
    ) -> String {
        let highlighted = self.render(query, validator);
        on_hint(highlighted.hint.as_deref());
        highlighted.markup
    }

    /// Like [`Highlighter::highlight`], returning the hint instead of
    /// reporting it.
    pub fn render(&self, query: &str, validator: Option<&dyn SchemaValidator>) -> Highlighted {
        if query.is_empty() {
            return Highlighted::default();
        }
        let validator = validator.unwrap_or(&NullValidator);

        let mut markup = String::new();
        let mut hint = None;
        let mut rest = query;
        let mut candidate = 0;
        let mut depth = 0;

        while let Some(&start) = self.start_rules.get(candidate) {
            let first = depth == 0;
            let pass = self.pass(
                rest,
                start,
                first.then_some(validator),
                first && self.long_wrap,
            );
            log::debug!(
                "pass {depth} with {start}: consumed {} of {} bytes",
                pass.consumed,
                rest.len()
            );
            markup.push_str(&pass.rendered.markup);
            if first {
                hint = pass.rendered.hint;
            }
            if pass.consumed >= rest.len() {
                break;
            }

            let remainder = &rest[pass.consumed..];
            if candidate + 1 == self.start_rules.len() {
                log::trace!("no candidates left, {} bytes unrecognized", remainder.len());
                markup.push_str(&self.skipped(
                    remainder,
                    depth,
                    rest,
                    pass.consumed,
                    pass.error.as_ref(),
                ));
                break;
            }

            let (lead, space, next) = split_remainder(remainder);
            let skipped = &remainder[..lead.len() + space.len()];
            markup.push_str(&self.skipped(
                skipped,
                depth,
                rest,
                pass.consumed,
                pass.error.as_ref(),
            ));
            // Only whitespace was in the way: the same rule gets another go
            if !lead.is_empty() {
                candidate += 1;
            }
            log::trace!("skipped {skipped:?}, retrying {} bytes", next.len());
            rest = next;
            depth += 1;
            if rest.is_empty() {
                break;
            }
        }

        Highlighted { markup, hint }
    }

    fn pass(
        &self,
        text: &str,
        start: StartRule,
        validator: Option<&dyn SchemaValidator>,
        long_wrap: bool,
    ) -> Pass {
        let source: Cow<'_, str> = if start.requires_terminator() {
            Cow::Owned(format!("{text}{STATEMENT_TERMINATOR}"))
        } else {
            Cow::Borrowed(text)
        };
        let mut adapter = TraceAdapter::new(text);
        let error = parse(&source, start, &mut adapter).err();
        if let Some(error) = &error {
            log::trace!("{start}: {error}");
        }
        let consumed = adapter.high_water_mark().min(text.len());
        let rendered = adapter.into_index().generate(&RenderOptions {
            validator,
            labels: &self.labels,
            long_wrap,
        });
        Pass {
            rendered,
            consumed,
            error,
        }
    }

    /// Render text no pass could use.
    ///
    /// The first pass marks it as unrecognized, pointing at the character
    /// the parser stopped at. Later passes emit it as plain text so the
    /// diagnostics do not nest.
    fn skipped(
        &self,
        skipped: &str,
        depth: usize,
        text: &str,
        consumed: usize,
        error: Option<&SyntaxError>,
    ) -> String {
        if depth > 0 {
            return markup::escape(skipped).into_owned();
        }
        // the error may point at the appended terminator
        let offset = error.map_or(consumed, |e| e.offset).min(text.len());
        let found = text[offset..].chars().next();
        let column = text[..offset].chars().count() + 1;
        markup::unrecognized(skipped, &self.labels.unrecognized(found, column))
    }
}

/// Split unconsumed text into its first non-whitespace run, the whitespace
/// after it, and everything else.
fn split_remainder(remainder: &str) -> (&str, &str, &str) {
    let lead_end = remainder
        .find(char::is_whitespace)
        .unwrap_or(remainder.len());
    let (lead, after) = remainder.split_at(lead_end);
    let space_end = after
        .find(|c: char| !c.is_whitespace())
        .unwrap_or(after.len());
    let (space, rest) = after.split_at(space_end);
    (lead, space, rest)
}

/// Highlight `query` in `dialect` with default labels and no line wrapping.
pub fn highlight(
    query: &str,
    dialect: QueryDialect,
    validator: Option<&dyn SchemaValidator>,
    on_hint: impl FnMut(Option<&str>),
) -> String {
    Highlighter::new(dialect).highlight(query, validator, on_hint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CorpusSchema;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn empty_query_renders_nothing() {
        let mut hints = Vec::new();
        let out = highlight("", QueryDialect::BasicExpression, None, |hint| {
            hints.push(hint.map(str::to_string))
        });
        assert_eq!(out, "");
        assert_eq!(hints, vec![None]);
    }

    #[test]
    fn lemma_is_one_regexp() {
        let out = highlight("dog", QueryDialect::LemmaEquivalent, None, |_| {});
        insta::assert_snapshot!(out, @r#"<span class="sh-regexp">dog</span>"#);
    }

    #[test]
    fn no_start_rules_is_an_error() {
        assert_eq!(
            Highlighter::with_start_rules(Vec::new()),
            Err(HighlightError::NoStartRules)
        );
    }

    #[test]
    fn custom_start_rules_are_kept_in_order() {
        let highlighter =
            Highlighter::with_start_rules(vec![StartRule::Sequence, StartRule::PhraseQuery])
                .unwrap();
        assert_eq!(
            highlighter.start_rules(),
            &[StartRule::Sequence, StartRule::PhraseQuery]
        );
    }

    #[rstest]
    #[case("abc", ("abc", "", ""))]
    #[case("abc  def", ("abc", "  ", "def"))]
    #[case("  def", ("", "  ", "def"))]
    #[case("a\tb c", ("a", "\t", "b c"))]
    fn split_remainder_cases(#[case] input: &str, #[case] expected: (&str, &str, &str)) {
        assert_eq!(split_remainder(input), expected);
    }

    #[test]
    fn garbage_between_positions_is_marked_once() {
        let out = highlight(
            r#"[word="dog"] ~ [word="cat"]"#,
            QueryDialect::BasicExpression,
            None,
            |_| {},
        );
        assert_eq!(out.matches("sh-unrecognized").count(), 1);
        assert!(out.contains(r#"title="unrecognized input: '~', column 14""#));
        // the recovered tail is styled but not validated
        assert!(out.ends_with(concat!(
            r#"<span class="sh-bracket">[</span>"#,
            r#"<span class="sh-attr">word</span>"#,
            r#"<span class="sh-operator">=</span>"#,
            r#"<span class="sh-regexp">&quot;</span>"#,
            r#"<span class="sh-regexp">cat</span>"#,
            r#"<span class="sh-regexp">&quot;</span>"#,
            r#"<span class="sh-bracket">]</span>"#,
        )));
    }

    #[test]
    fn only_the_first_pass_reports_problems() {
        let schema = CorpusSchema::new(["word"]);
        let highlighted = Highlighter::new(QueryDialect::BasicExpression).render(
            r#"[word="dog"] ~ [bogus="cat"]"#,
            Some(&schema),
        );
        assert_eq!(highlighted.hint, None);
    }

    #[test]
    fn single_candidate_wraps_whole_remainder() {
        let out = highlight(r#"a"b c"#, QueryDialect::LemmaEquivalent, None, |_| {});
        assert_eq!(
            out,
            concat!(
                r#"<span class="sh-regexp">a</span>"#,
                r#"<span class="sh-unrecognized" title="unrecognized input: '&quot;', column 2" "#,
                r#"style="text-decoration: underline dotted red">&quot;b c</span>"#,
            )
        );
    }

    #[test]
    fn unterminated_value_keeps_its_text() {
        let out = highlight(r#"[word="dog"#, QueryDialect::BasicExpression, None, |_| {});
        assert_eq!(
            out,
            concat!(
                r#"<span class="sh-bracket">[</span>"#,
                r#"<span class="sh-attr">word</span>"#,
                r#"<span class="sh-operator">=</span>"#,
                r#"<span class="sh-regexp">&quot;</span>"#,
                r#"<span class="sh-regexp">dog</span>"#,
            )
        );
    }

    #[test]
    fn highlighter_is_shareable_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Highlighter>();
    }
}
