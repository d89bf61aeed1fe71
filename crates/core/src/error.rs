/// Result alias that carries the custom [`SlideshowError`] type.
pub type Result<T> = std::result::Result<T, SlideshowError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum SlideshowError {
    /// Free-form message surfaced to the host or the command line.
    #[error("{0}")]
    Message(String),
    /// A configuration value that cannot drive a carousel.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration files that are not valid JSON for the expected schema.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl SlideshowError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}
