//! Error types for corpus loading, indexing, configuration and remote lookups.

use std::path::PathBuf;
use thiserror::Error;

/// The corpus resource could not be read or parsed.
#[derive(Debug, Error)]
pub enum CorpusLoadError {
    /// The corpus file could not be read.
    #[error("failed to read corpus {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The corpus is not a JSON array of `{question, answer}` records.
    #[error("malformed corpus: {source}")]
    Malformed {
        #[source]
        source: serde_json::Error,
    },

    /// A JSONL corpus line is not a `{question, answer}` record.
    #[error("malformed corpus record on line {line}: {source}")]
    MalformedLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Building an index failed; no index was produced.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    CorpusLoad(#[from] CorpusLoadError),

    /// IDF and cosine similarity are undefined over zero documents.
    #[error("corpus contains no question/answer records")]
    EmptyCorpus,
}

/// The remote answer provider did not produce an answer.
#[derive(Debug, Error)]
pub enum RemoteProviderError {
    /// No remote provider is configured for this assistant.
    #[error("remote answer provider is not configured")]
    NotConfigured,

    /// Connection, TLS or transport failure.
    #[error("remote answer provider request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider did not answer within the caller's timeout.
    #[error("remote answer provider timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// The caller cancelled the lookup.
    #[error("remote lookup cancelled")]
    Cancelled,

    /// The provider answered with a non-success status.
    #[error("remote answer provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider answered 2xx but the body carried no usable answer.
    #[error("malformed response from remote answer provider: {reason}")]
    MalformedResponse { reason: String },
}

impl RemoteProviderError {
    pub fn is_timeout(&self) -> bool {
        match self {
            RemoteProviderError::Timeout { .. } => true,
            RemoteProviderError::Network(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Failure of the query API.
#[derive(Debug, Error)]
pub enum AnswerError {
    #[error(transparent)]
    Remote(#[from] RemoteProviderError),
}

/// Invalid engine configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("confidence threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("remote timeout must be greater than zero")]
    InvalidTimeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_detected() {
        assert!(RemoteProviderError::Timeout { timeout_ms: 10 }.is_timeout());
        assert!(!RemoteProviderError::Cancelled.is_timeout());
        assert!(!RemoteProviderError::NotConfigured.is_timeout());
    }

    #[test]
    fn empty_corpus_message() {
        assert_eq!(IndexError::EmptyCorpus.to_string(), "corpus contains no question/answer records");
    }
}
