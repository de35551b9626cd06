use thiserror::Error;

/// Error for ShortCode validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShortCodeError {
    #[error("Short code must not be empty")]
    Empty,

    #[error("Short code too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error(
        "Short code contains invalid characters (only alphanumeric, underscore, and hyphen allowed)"
    )]
    InvalidCharacters,
}

/// Error for TargetUrl validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TargetUrlError {
    #[error("URL must not be empty")]
    Empty,

    #[error("URL must start with http:// or https://")]
    UnsupportedScheme,

    #[error("URL has no host")]
    MissingHost,

    #[error("URL must not contain whitespace")]
    ContainsWhitespace,

    #[error("URL too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Top-level error for URL record operations
#[derive(Debug, Clone, Error)]
pub enum UrlError {
    #[error("Invalid short code: {0}")]
    InvalidShortCode(#[from] ShortCodeError),

    #[error("Invalid URL: {0}")]
    InvalidTargetUrl(#[from] TargetUrlError),

    #[error("Short code already exists: {0}")]
    ShortCodeExists(String),

    #[error("Could not generate a unique short code after {0} attempts")]
    CodeGenerationExhausted(usize),

    /// Token subject with no user behind it, e.g. a deleted account
    #[error("Owner does not exist: {0}")]
    OwnerNotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
