/// Caller mistakes. User input never produces one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HighlightError {
    #[error("highlighter needs at least one start rule")]
    NoStartRules,
    #[error("unknown query dialect: {0}")]
    UnknownDialect(String),
}
