use derive_more::Display;

/// Error type shared by the tracker components.
#[derive(Debug, Display)]
pub enum TrackerError {
    /// Configuration is invalid or inconsistent.
    #[display("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },
}

impl core::error::Error for TrackerError {}

impl TrackerError {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}
