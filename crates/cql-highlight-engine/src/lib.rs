//! Live syntax highlighting for corpus queries.
//!
//! ```
//! use cql_highlight_engine::{CorpusSchema, Highlighter, QueryDialect};
//!
//! let schema = CorpusSchema::new(["word", "lemma"]);
//! let highlighter = Highlighter::new(QueryDialect::BasicExpression);
//!
//! let mut hint = None;
//! let markup = highlighter.highlight(r#"[lema="dog"]"#, Some(&schema), |h| {
//!     hint = h.map(str::to_string)
//! });
//! assert!(markup.contains("sh-bracket"));
//! assert_eq!(hint.as_deref(), Some("• attribute does not exist: lema"));
//! ```

pub mod adapter;
pub mod dialect;
pub mod error;
pub mod highlighter;
pub mod index;
pub mod labels;
pub mod markup;
pub mod schema;

pub use cql_highlight_syntax::StartRule;

pub use adapter::TraceAdapter;
pub use dialect::QueryDialect;
pub use error::HighlightError;
pub use highlighter::{Highlighted, Highlighter, highlight};
pub use index::{RenderOptions, Rendered, RuleSpanIndex, SpanKey};
pub use labels::Labels;
pub use schema::{CorpusSchema, NullValidator, SchemaValidator};
