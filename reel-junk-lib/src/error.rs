use thiserror::Error;

/// Errors raised while loading shared settings.
#[derive(Debug, Error)]
pub enum LibError {
    /// I/O error while reading or writing the settings file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A setting had a value that could not be used
    #[error("Invalid setting {name}: {message}")]
    InvalidSetting { name: &'static str, message: String },

    /// The settings file could not be parsed
    #[error("Config error: {0}")]
    Config(String),
}

impl LibError {
    pub fn invalid_setting(name: &'static str, msg: impl Into<String>) -> Self {
        Self::InvalidSetting {
            name,
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
