//! # Rule Span Index
//!
//! Collects, for one highlighting pass, which grammar rule governs each
//! byte range of the source and turns that into markup.
//!
//! ## Two Tables
//!
//! - **Terminal spans** are keyed by `(start, end)`. Registering a second
//!   terminal for the same key replaces the first, which is how a token
//!   re-read by a later parse branch ends up with its final meaning.
//! - **Non-terminal spans** are kept in registration order, each distinct
//!   `(start, end, rule)` once. They carry no text; they decide where wrapper
//!   spans and line breaks go.
//!
//! ## Generating Markup
//!
//! ```text
//! terminals ──► chunks (sorted, non-overlapping) ──► styled text
//!                 │
//! non-terminals ──┴─► slots between chunks ──► tooltip / clickable / <br />
//! ```
//!
//! Every wrapper is an opening fragment in the slot before its first chunk
//! and a closing fragment in the slot after its last one. Within a slot,
//! closings come first (narrowest span first), then openings (widest span
//! first), so wrappers nest no matter in which order they were added.
//!
//! Ranges the parser never consumed are not chunks. The caller renders them.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};

use cql_highlight_syntax::{NonTerminal, Terminal};

use crate::labels::Labels;
use crate::markup::{self, CLOSE_SPAN, LINE_BREAK};
use crate::schema::SchemaValidator;

/// Positions between two line breaks in a long query.
const POSITIONS_PER_LINE: usize = 3;

/// Byte range in the pass's source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpanKey {
    pub start: usize,
    pub end: usize,
}

impl SpanKey {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Whether `other` lies within this span (or is equal to it).
    pub fn contains(self, other: SpanKey) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonTerminalSpan {
    pub key: SpanKey,
    pub rule: NonTerminal,
}

/// One terminal's text and its rendered form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledChunk<'s> {
    pub start: usize,
    pub end: usize,
    pub text: &'s str,
    pub markup: String,
}

/// What [`RuleSpanIndex::generate`] should do besides styling terminals.
#[derive(Clone, Copy)]
pub struct RenderOptions<'a> {
    /// Validate names and add semantic wrappers. `None` skips both.
    pub validator: Option<&'a dyn SchemaValidator>,
    pub labels: &'a Labels,
    /// Break long queries into lines of a few positions each.
    pub long_wrap: bool,
}

/// Markup for the consumed prefix plus the aggregated validation hint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub markup: String,
    pub hint: Option<String>,
}

#[derive(Debug)]
pub struct RuleSpanIndex<'s> {
    source: &'s str,
    terminals: BTreeMap<SpanKey, Terminal>,
    non_terminals: Vec<NonTerminalSpan>,
}

impl<'s> RuleSpanIndex<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            terminals: BTreeMap::new(),
            non_terminals: Vec::new(),
        }
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    /// Record the terminal for `start..end`, replacing any earlier one.
    pub fn set_terminal(&mut self, start: usize, end: usize, rule: Terminal) {
        self.terminals.insert(SpanKey::new(start, end), rule);
    }

    /// Record a non-terminal span. Registering the same span twice is a no-op.
    pub fn add_non_terminal(&mut self, start: usize, end: usize, rule: NonTerminal) {
        let span = NonTerminalSpan {
            key: SpanKey::new(start, end),
            rule,
        };
        if !self.non_terminals.contains(&span) {
            self.non_terminals.push(span);
        }
    }

    pub fn terminal_at(&self, start: usize, end: usize) -> Option<Terminal> {
        self.terminals.get(&SpanKey::new(start, end)).copied()
    }

    pub fn non_terminals(&self) -> &[NonTerminalSpan] {
        &self.non_terminals
    }

    /// Terminal spans inside the source, sorted by start.
    ///
    /// A span running past the end of the source, such as an unterminated
    /// value that swallowed the appended statement terminator, is cut at the
    /// end. Spans left empty are skipped. A span overlapping an earlier chunk
    /// is dropped.
    pub fn chunks(&self) -> Vec<StyledChunk<'s>> {
        let mut chunks = Vec::new();
        let mut covered = 0;
        for (key, terminal) in &self.terminals {
            let end = key.end.min(self.source.len());
            if key.start >= end || key.start < covered {
                continue;
            }
            let Some(text) = self.source.get(key.start..end) else {
                continue;
            };
            chunks.push(StyledChunk {
                start: key.start,
                end,
                text,
                markup: markup::styled(*terminal, text),
            });
            covered = end;
        }
        chunks
    }

    /// Render the registered spans.
    ///
    /// Validation problems end up in [`Rendered::hint`]; they never make
    /// rendering fail.
    pub fn generate(&self, options: &RenderOptions<'_>) -> Rendered {
        let mut annotator = Annotator {
            index: self,
            labels: options.labels,
            layout: Layout::new(self.chunks()),
            problems: Vec::new(),
            handled: HashSet::new(),
            open_structures: HashSet::new(),
        };

        // Parents are registered after their children, so this visits
        // Position and Structure before the pairs inside them.
        for span in self.non_terminals.iter().rev() {
            match (span.rule, options.validator) {
                (NonTerminal::Position, Some(validator)) => {
                    for pair in self.nested(span.key, NonTerminal::AttVal) {
                        annotator.attribute_pair(pair, validator);
                    }
                }
                (NonTerminal::Structure, Some(validator)) => {
                    annotator.structure(span.key, validator);
                }
                // A pair outside any position or structure: an attribute
                // list, or a position or structure not closed yet.
                (NonTerminal::AttVal, Some(validator)) => {
                    match self.open_structure_name(span.key) {
                        Some(name) => annotator.open_structure_pair(name, span.key, validator),
                        None => annotator.attribute_pair(span.key, validator),
                    }
                }
                (NonTerminal::Sequence, _) if options.long_wrap => {
                    annotator.wrap_long_sequence(span.key);
                }
                _ => {}
            }
        }

        annotator.finish()
    }

    /// Spans of `rule` strictly inside `outer`, sorted by start.
    fn nested(&self, outer: SpanKey, rule: NonTerminal) -> Vec<SpanKey> {
        let mut keys: Vec<SpanKey> = self
            .non_terminals
            .iter()
            .filter(|span| span.rule == rule && span.key != outer && outer.contains(span.key))
            .map(|span| span.key)
            .collect();
        keys.sort();
        keys
    }

    /// Name of the structure `pair` sits in when that structure's `<` has
    /// no matching `>` before the pair.
    fn open_structure_name(&self, pair: SpanKey) -> Option<SpanKey> {
        let (lt, _) = self
            .terminals
            .range(..SpanKey::new(pair.start, 0))
            .rev()
            .find(|&(_, terminal)| matches!(terminal, Terminal::Lt | Terminal::Gt))
            .filter(|&(_, terminal)| *terminal == Terminal::Lt)?;
        self.non_terminals
            .iter()
            .filter(|span| {
                span.rule == NonTerminal::AttName
                    && span.key.start >= lt.end
                    && span.key.end <= pair.start
            })
            .map(|span| span.key)
            .min()
    }

    fn text(&self, key: SpanKey) -> Option<&'s str> {
        self.source.get(key.start..key.end)
    }

    /// Character offset of a byte offset.
    fn char_offset(&self, byte: usize) -> usize {
        self.source
            .get(..byte.min(self.source.len()))
            .map_or(0, |prefix| prefix.chars().count())
    }
}

/// Per-pass state of [`RuleSpanIndex::generate`].
struct Annotator<'a, 's> {
    index: &'a RuleSpanIndex<'s>,
    labels: &'a Labels,
    layout: Layout<'s>,
    problems: Vec<String>,
    /// Attribute pairs already checked or claimed by a structure
    handled: HashSet<SpanKey>,
    /// Names of unclosed structures already checked
    open_structures: HashSet<SpanKey>,
}

impl<'s> Annotator<'_, 's> {
    /// `name = "value"`: check the name, and mark a tag value as editable.
    fn attribute_pair(&mut self, pair: SpanKey, validator: &dyn SchemaValidator) {
        if !self.handled.insert(pair) {
            return;
        }
        // `!pair` and `(list)` contain pairs of their own
        if !self.index.nested(pair, NonTerminal::AttVal).is_empty() {
            return;
        }
        let Some(&name_key) = self.index.nested(pair, NonTerminal::AttName).first() else {
            return;
        };
        let Some(name) = self.index.text(name_key) else {
            return;
        };
        if validator.attr_exists(name) {
            self.layout
                .wrap(name_key, markup::tooltip_open(&self.labels.attribute));
        } else {
            push_unique(
                &mut self.problems,
                Labels::problem(&self.labels.attribute_missing, name),
            );
        }
        if !validator.is_tag_attr(name) {
            return;
        }
        if let Some(&value) = self.index.nested(pair, NonTerminal::RegExp).first() {
            let open = markup::clickable_open(
                "tag",
                self.index.char_offset(value.start),
                self.index.char_offset(value.end),
            );
            self.layout.wrap(value, open);
        }
    }

    /// `<name attr="v">`: the first name is the structure, the rest its
    /// attributes.
    fn structure(&mut self, structure: SpanKey, validator: &dyn SchemaValidator) {
        self.handled
            .extend(self.index.nested(structure, NonTerminal::AttVal));
        let names = self.index.nested(structure, NonTerminal::AttName);
        let Some((&struct_key, attrs)) = names.split_first() else {
            return;
        };
        let Some(struct_name) = self.structure_name(struct_key, validator) else {
            return;
        };
        for &attr_key in attrs {
            self.structure_attribute(struct_name, attr_key, validator);
        }
    }

    /// A pair typed inside a structure whose `>` is still missing.
    fn open_structure_pair(
        &mut self,
        struct_key: SpanKey,
        pair: SpanKey,
        validator: &dyn SchemaValidator,
    ) {
        if !self.handled.insert(pair) {
            return;
        }
        let struct_name = if self.open_structures.insert(struct_key) {
            self.structure_name(struct_key, validator)
        } else {
            self.index.text(struct_key)
        };
        let Some(struct_name) = struct_name else {
            return;
        };
        if let Some(&attr_key) = self.index.nested(pair, NonTerminal::AttName).first() {
            self.structure_attribute(struct_name, attr_key, validator);
        }
    }

    fn structure_name(
        &mut self,
        struct_key: SpanKey,
        validator: &dyn SchemaValidator,
    ) -> Option<&'s str> {
        let struct_name = self.index.text(struct_key)?;
        if validator.struct_exists(struct_name) {
            self.layout
                .wrap(struct_key, markup::tooltip_open(&self.labels.structure));
        } else {
            push_unique(
                &mut self.problems,
                Labels::problem(&self.labels.structure_missing, struct_name),
            );
        }
        Some(struct_name)
    }

    fn structure_attribute(
        &mut self,
        struct_name: &str,
        attr_key: SpanKey,
        validator: &dyn SchemaValidator,
    ) {
        let Some(attr) = self.index.text(attr_key) else {
            return;
        };
        if validator.struct_attr_exists(struct_name, attr) {
            self.layout.wrap(
                attr_key,
                markup::tooltip_open(&self.labels.structure_attribute),
            );
        } else {
            push_unique(
                &mut self.problems,
                Labels::problem(&self.labels.structure_attribute_missing, attr),
            );
        }
    }

    /// Break a top-level sequence before every third position and after
    /// the sequence itself.
    fn wrap_long_sequence(&mut self, key: SpanKey) {
        let nested_in_sequence = self.index.non_terminals.iter().any(|other| {
            other.rule == NonTerminal::Sequence && other.key != key && other.key.contains(key)
        });
        if nested_in_sequence {
            return;
        }
        let positions = self.index.nested(key, NonTerminal::Position);
        for (i, position) in positions.iter().enumerate() {
            if i > 0 && i % POSITIONS_PER_LINE == 0 {
                self.layout.line_break(position.start);
            }
        }
        if key.end < self.index.source.len() {
            self.layout.line_break(key.end);
        }
    }

    fn finish(self) -> Rendered {
        let hint = (!self.problems.is_empty()).then(|| {
            self.problems
                .iter()
                .map(|p| format!("• {p}"))
                .collect::<Vec<_>>()
                .join("\n")
        });
        Rendered {
            markup: self.layout.into_markup(),
            hint,
        }
    }
}

fn push_unique(problems: &mut Vec<String>, problem: String) {
    if !problems.contains(&problem) {
        problems.push(problem);
    }
}

/// Fragments inserted at one chunk boundary, each with the width of the
/// span it belongs to.
#[derive(Debug, Default)]
struct Slot {
    closing: Vec<(usize, String)>,
    opening: Vec<(usize, String)>,
}

/// Chunks plus the `chunks + 1` slots around them.
struct Layout<'s> {
    chunks: Vec<StyledChunk<'s>>,
    slots: Vec<Slot>,
}

impl<'s> Layout<'s> {
    fn new(chunks: Vec<StyledChunk<'s>>) -> Self {
        let slots = (0..=chunks.len()).map(|_| Slot::default()).collect();
        Self { chunks, slots }
    }

    /// Slot just before the first chunk starting at or after `offset`.
    fn slot_at(&self, offset: usize) -> usize {
        self.chunks.partition_point(|chunk| chunk.start < offset)
    }

    fn wrap(&mut self, key: SpanKey, open: String) {
        if key.is_empty() {
            return;
        }
        let width = key.len();
        let first = self.slot_at(key.start);
        let last = self.slot_at(key.end);
        self.slots[first].opening.push((width, open));
        self.slots[last].closing.push((width, CLOSE_SPAN.to_string()));
    }

    fn line_break(&mut self, offset: usize) {
        let slot = self.slot_at(offset);
        // before any wrapper opening here
        self.slots[slot]
            .opening
            .push((usize::MAX, LINE_BREAK.to_string()));
    }

    fn into_markup(self) -> String {
        let mut out = String::new();
        let mut slots = self.slots.into_iter();
        for chunk in &self.chunks {
            if let Some(slot) = slots.next() {
                slot.write_to(&mut out);
            }
            out.push_str(&chunk.markup);
        }
        for slot in slots {
            slot.write_to(&mut out);
        }
        out
    }
}

impl Slot {
    fn write_to(mut self, out: &mut String) {
        self.closing.sort_by_key(|(width, _)| *width);
        self.opening.sort_by_key(|(width, _)| Reverse(*width));
        for (_, fragment) in self.closing.iter().chain(&self.opening) {
            out.push_str(fragment);
        }
    }
}
