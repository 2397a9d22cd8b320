use thiserror::Error;

/// Assembly failure. `line` is 1-based.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {msg}")]
pub struct AsmError {
    pub line: usize,
    pub msg: String,
}

impl AsmError {
    pub(super) fn new(line: usize, msg: impl Into<String>) -> Self {
        Self { line, msg: msg.into() }
    }
}
