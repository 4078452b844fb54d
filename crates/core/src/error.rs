/// Result alias that carries the custom [`WaveDiffError`] type.
pub type Result<T> = std::result::Result<T, WaveDiffError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum WaveDiffError {
    /// Free-form failure that does not belong to a more specific subsystem.
    #[error("{0}")]
    Message(String),
    /// The decoder rejected the audio bytes (corrupt or unsupported input).
    #[error("failed to decode audio: {reason}")]
    Decode {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    /// A renderer could not paint onto its surface.
    #[error("render failed: {0}")]
    Render(String),
    /// Invalid configuration values.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// A background decode task panicked or was cancelled.
    #[error("decode task failed: {0}")]
    Task(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Wrapper around JSON (de)serialisation errors.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl WaveDiffError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    /// Creates a decode error without an underlying cause.
    pub fn decode<T: Into<String>>(reason: T) -> Self {
        Self::Decode {
            reason: reason.into(),
            source: None,
        }
    }

    /// Returns true when the error came from decoding the input audio.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

impl From<&str> for WaveDiffError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for WaveDiffError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

impl From<hound::Error> for WaveDiffError {
    fn from(value: hound::Error) -> Self {
        Self::Decode {
            reason: value.to_string(),
            source: Some(Box::new(value)),
        }
    }
}
