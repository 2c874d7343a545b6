use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid locator {locator:?}: {reason}")]
    InvalidLocator { locator: String, reason: String },
}

impl TypeError {
    pub(crate) fn invalid_locator(locator: &str, reason: impl Into<String>) -> Self {
        Self::InvalidLocator {
            locator: locator.to_string(),
            reason: reason.into(),
        }
    }
}
