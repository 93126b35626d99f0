use thiserror::Error;

/// Errors raised by the text-to-speech backends.
#[derive(Debug, Error)]
pub enum TtsError {
    /// Missing or invalid configuration, e.g. no API key
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The provider rejected the credential, or an earlier attempt already failed
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Remote or local synthesis call failed
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("no voices available")]
    NoVoicesAvailable,

    #[error("unable to determine voice name from catalog entry: {0}")]
    UnrecognizedVoiceShape(String),

    #[error("text is {len} characters, {backend} accepts at most {max}")]
    TextTooLong {
        backend: &'static str,
        len: usize,
        max: usize,
    },

    #[error("text is empty")]
    EmptyText,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for TtsError {
    fn from(e: reqwest::Error) -> Self {
        TtsError::Synthesis(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TtsError>;
