use std::path::PathBuf;
use thiserror::Error;

/// Outcome of a single warehouse write that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Inserted,
    /// The natural key already existed and the policy is insert-or-ignore.
    Ignored,
    /// The natural key already existed and the mutable fields were overwritten.
    Updated,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WriteError {
    /// The row could not be written; the store is still usable.
    #[error("{0}")]
    Recoverable(String),

    /// The store itself is unusable, the run must stop.
    #[error("{0}")]
    Fatal(String),
}

impl WriteError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, WriteError::Fatal(_))
    }
}

pub type WriteResult = Result<WriteOutcome, WriteError>;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("no records found")]
    Empty,
}

#[derive(Debug, Error)]
pub enum EtlError {
    #[error("Cannot discover data files under {root:?}: {reason}")]
    Discovery { root: PathBuf, reason: String },

    #[error("Malformed data file {path:?}: {source}")]
    MalformedFile {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Store failure: {0}")]
    Store(String),
}

impl From<WriteError> for EtlError {
    fn from(err: WriteError) -> Self {
        EtlError::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_write_errors() {
        assert!(WriteError::Fatal("disk full".to_string()).is_fatal());
        assert!(!WriteError::Recoverable("constraint".to_string()).is_fatal());
    }

    #[test]
    fn test_formats_malformed_file_with_line() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = EtlError::MalformedFile {
            path: PathBuf::from("/data/log.json"),
            source: ParseError::Json { line: 3, source },
        };
        let message = err.to_string();
        assert!(message.contains("/data/log.json"));
        assert!(message.contains("line 3"));
    }
}
