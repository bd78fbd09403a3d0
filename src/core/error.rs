use thiserror::Error;

/// Errors that end a run and are reported to the user as a single line.
///
/// Anything else bubbling up through `anyhow` is treated as an unexpected
/// failure and printed with its full context chain.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MsblError {
    /// The command line was malformed or named something that does not exist.
    #[error("bad argument: {0}")]
    BadArgument(String),
    /// The configuration file is missing, unreadable or semantically invalid.
    #[error("bad config: {0}")]
    BadConfig(String),
}

impl MsblError {
    pub fn bad_argument(message: impl Into<String>) -> Self {
        Self::BadArgument(message.into())
    }

    pub fn bad_config(message: impl Into<String>) -> Self {
        Self::BadConfig(message.into())
    }
}
