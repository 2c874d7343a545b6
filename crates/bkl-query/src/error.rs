use bkl_store::StoreError;

/// Errors from listing queries.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The name pattern is not a valid regular expression.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The name pattern must capture exactly one group: the date.
    #[error("pattern {pattern:?} has {groups} capture groups, expected exactly 1")]
    PatternGroups { pattern: String, groups: usize },

    /// A date string did not match `YYYYMMDD`.
    #[error("invalid date {value:?} in {name:?}: {source}")]
    InvalidDate {
        /// The object name (or argument) the value came from.
        name: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Listing the store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result alias for listing queries.
pub type QueryResult<T> = Result<T, QueryError>;
