use serde::{Deserialize, Serialize};

/// User-facing strings placed in tooltips and hints.
///
/// Every field has an English default, so a partial `[labels]` table only
/// overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    /// Tooltip on a known positional attribute
    pub attribute: String,
    /// Tooltip on a known structure
    pub structure: String,
    /// Tooltip on a known structure attribute
    pub structure_attribute: String,
    pub attribute_missing: String,
    pub structure_missing: String,
    pub structure_attribute_missing: String,
    /// Title of the span around text the parser could not use
    pub unrecognized_input: String,
    pub end_of_input: String,
    pub column: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            attribute: "attribute".to_string(),
            structure: "structure".to_string(),
            structure_attribute: "structure attribute".to_string(),
            attribute_missing: "attribute does not exist".to_string(),
            structure_missing: "struct does not exist".to_string(),
            structure_attribute_missing: "structattr does not exist".to_string(),
            unrecognized_input: "unrecognized input".to_string(),
            end_of_input: "end of input".to_string(),
            column: "column".to_string(),
        }
    }
}

impl Labels {
    /// `"<label>: <name>"`, the form of every validation problem.
    pub fn problem(label: &str, name: &str) -> String {
        format!("{label}: {name}")
    }

    /// Title for the unrecognized-input span.
    ///
    /// `found` is the offending character, `None` when the parser ran out of
    /// input. `column` is 1-based and counts characters.
    pub fn unrecognized(&self, found: Option<char>, column: usize) -> String {
        let found = match found {
            Some(c) => format!("'{c}'"),
            None => self.end_of_input.clone(),
        };
        format!(
            "{}: {found}, {} {column}",
            self.unrecognized_input, self.column
        )
    }
}
