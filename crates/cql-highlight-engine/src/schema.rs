//! Schema questions the highlighter asks about attribute and structure names.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Existence and role checks against the active corpus.
pub trait SchemaValidator {
    fn struct_exists(&self, name: &str) -> bool;
    fn struct_attr_exists(&self, structure: &str, attr: &str) -> bool;
    fn attr_exists(&self, attr: &str) -> bool;
    /// Whether `attr` is the designated tag attribute.
    fn is_tag_attr(&self, attr: &str) -> bool;
}

/// Accepts every name and knows no tag attribute.
///
/// Used when no corpus is bound, so nothing is reported as missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullValidator;

impl SchemaValidator for NullValidator {
    fn struct_exists(&self, _name: &str) -> bool {
        true
    }

    fn struct_attr_exists(&self, _structure: &str, _attr: &str) -> bool {
        true
    }

    fn attr_exists(&self, _attr: &str) -> bool {
        true
    }

    fn is_tag_attr(&self, _attr: &str) -> bool {
        false
    }
}

/// Attributes and structures of one corpus.
///
/// ```toml
/// attributes = ["word", "lemma", "tag"]
/// tag_attribute = "tag"
///
/// [structures]
/// s = ["type", "id"]
/// doc = []
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusSchema {
    /// Positional attributes
    pub attributes: BTreeSet<String>,
    pub tag_attribute: Option<String>,
    /// Structure name to its attributes
    pub structures: BTreeMap<String, BTreeSet<String>>,
}

impl CorpusSchema {
    pub fn new<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_tag_attribute(mut self, attr: impl Into<String>) -> Self {
        self.tag_attribute = Some(attr.into());
        self
    }

    pub fn with_structure<I, S>(mut self, name: impl Into<String>, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.structures
            .insert(name.into(), attrs.into_iter().map(Into::into).collect());
        self
    }
}

impl SchemaValidator for CorpusSchema {
    fn struct_exists(&self, name: &str) -> bool {
        self.structures.contains_key(name)
    }

    fn struct_attr_exists(&self, structure: &str, attr: &str) -> bool {
        self.structures
            .get(structure)
            .is_some_and(|attrs| attrs.contains(attr))
    }

    fn attr_exists(&self, attr: &str) -> bool {
        self.attributes.contains(attr)
    }

    fn is_tag_attr(&self, attr: &str) -> bool {
        self.tag_attribute.as_deref() == Some(attr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> CorpusSchema {
        CorpusSchema::new(["word", "lemma", "tag"])
            .with_tag_attribute("tag")
            .with_structure("s", ["type"])
            .with_structure("doc", Vec::<String>::new())
    }

    #[test]
    fn null_validator_accepts_everything_but_tags() {
        let v = NullValidator;
        assert!(v.struct_exists("anything"));
        assert!(v.struct_attr_exists("s", "anything"));
        assert!(v.attr_exists("anything"));
        assert!(!v.is_tag_attr("tag"));
    }

    #[test]
    fn corpus_schema_answers_from_its_tables() {
        let s = schema();
        assert!(s.attr_exists("lemma"));
        assert!(!s.attr_exists("bogus"));
        assert!(s.struct_exists("doc"));
        assert!(!s.struct_exists("p"));
        assert!(s.struct_attr_exists("s", "type"));
        assert!(!s.struct_attr_exists("doc", "type"));
        assert!(!s.struct_attr_exists("p", "type"));
        assert!(s.is_tag_attr("tag"));
        assert!(!s.is_tag_attr("word"));
    }

    #[test]
    fn default_schema_knows_nothing() {
        let s = CorpusSchema::default();
        assert!(!s.attr_exists("word"));
        assert!(!s.struct_exists("s"));
        assert!(!s.is_tag_attr("tag"));
    }
}
