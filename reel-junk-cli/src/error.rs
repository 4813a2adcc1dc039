use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Settings could not be loaded
    #[error(transparent)]
    Settings(#[from] reel_junk_lib::LibError),

    /// Resolver or cache error
    #[error(transparent)]
    Scrape(#[from] reel_junk_scraper::ScrapeError),

    /// Malformed input file or arguments
    #[error("Invalid input: {0}")]
    Input(String),

    /// Runtime creation or async error
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Output serialization failed
    #[error("Output error: {0}")]
    Output(String),
}

impl CliError {
    pub(crate) fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub(crate) fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    pub(crate) fn output(msg: impl Into<String>) -> Self {
        Self::Output(msg.into())
    }
}
