//! Query dialects and the grammar entry points each one tries.

use std::fmt;
use std::str::FromStr;

use cql_highlight_syntax::StartRule;
use serde::{Deserialize, Serialize};

use crate::error::HighlightError;

/// A restricted sub-language the query editor may be showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryDialect {
    /// Full bracketed CQL
    #[default]
    BasicExpression,
    /// `word="a" & tag="N.*"` without brackets
    AttributeList,
    /// Plain words
    WordForm,
    /// A single regular expression matched against lemmas
    LemmaEquivalent,
}

impl QueryDialect {
    pub const ALL: [QueryDialect; 4] = [
        QueryDialect::BasicExpression,
        QueryDialect::AttributeList,
        QueryDialect::WordForm,
        QueryDialect::LemmaEquivalent,
    ];

    /// Candidate start rules, most specific first. Never empty.
    pub fn start_rules(self) -> &'static [StartRule] {
        match self {
            QueryDialect::BasicExpression => &[
                StartRule::Query,
                StartRule::WithinContainingPart,
                StartRule::Sequence,
                StartRule::RegExpRaw,
            ],
            QueryDialect::AttributeList => &[StartRule::AttValList, StartRule::RegExpRaw],
            QueryDialect::WordForm => &[StartRule::PhraseQuery, StartRule::RegExpRaw],
            QueryDialect::LemmaEquivalent => &[StartRule::RegExpRaw],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            QueryDialect::BasicExpression => "basic-expression",
            QueryDialect::AttributeList => "attribute-list",
            QueryDialect::WordForm => "word-form",
            QueryDialect::LemmaEquivalent => "lemma-equivalent",
        }
    }
}

impl fmt::Display for QueryDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QueryDialect {
    type Err = HighlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|dialect| dialect.name() == s)
            .ok_or_else(|| HighlightError::UnknownDialect(s.to_string()))
    }
}
