use thiserror::Error;

/// Classifies blocklist fetch errors for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Connection to the remote host failed
    ConnectionFailed,
    /// Operation timed out
    Timeout,
    /// Server answered with a non-success HTTP status
    HttpStatus,
    /// I/O error while reading the response body
    Io,
}

/// Rule generator error types
#[derive(Error, Debug)]
pub enum RulegenError {
    #[error("Parse error at line {line}: {message}")]
    ParseErrorAtLine { line: usize, message: String },

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid source format: {0}")]
    InvalidSourceFormat(String),

    #[error("Fetch error: {message}")]
    FetchError {
        kind: FetchErrorKind,
        message: String,
    },

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Output error: {0}")]
    OutputError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, RulegenError>;
