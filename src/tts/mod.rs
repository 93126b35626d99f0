// TTS backend trait and types

pub mod elevenlabs;
pub mod gtts;
pub mod piper;
pub mod voices;

use crate::error::{Result, TtsError};
use crate::settings::Settings;
use std::path::Path;

/// Which voice a request should be spoken with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceSelection {
    Named(String),
    Random,
}

/// A single synthesis call
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    pub text: String,
    /// Locale code; backends fall back to their configured language when unset
    pub target_language: Option<String>,
    pub voice: VoiceSelection,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>, voice: VoiceSelection) -> Self {
        Self {
            text: text.into(),
            target_language: None,
            voice,
        }
    }

    pub fn with_language(mut self, lang: impl Into<String>) -> Self {
        self.target_language = Some(lang.into());
        self
    }

    /// Check the text against a backend's character budget.
    pub fn validate(&self, backend: &'static str, max_chars: usize) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(TtsError::EmptyText);
        }
        let len = self.text.chars().count();
        if len > max_chars {
            return Err(TtsError::TextTooLong {
                backend,
                len,
                max: max_chars,
            });
        }
        Ok(())
    }
}

/// TTS backend trait - every speech engine implements this.
///
/// Methods take `&mut self` because cloud backends build their client lazily
/// on first use; share an instance across threads only behind a lock.
pub trait TtsBackend: Send {
    /// Configuration key, e.g. "elevenlabs"
    fn name(&self) -> &'static str;

    /// Maximum characters accepted per request
    fn max_chars(&self) -> usize;

    /// Voice used when random mode is off
    fn default_voice(&self) -> String;

    /// Extension of the audio container this backend writes
    fn file_extension(&self) -> &'static str;

    /// Synthesize `request` into an audio file at `filepath`.
    fn speak(&mut self, request: &SpeechRequest, filepath: &Path) -> Result<()>;

    /// Pick a voice uniformly at random from the backend's catalog.
    fn random_voice(&mut self) -> Result<String>;

    /// Synthesize `text` with either the configured voice or a random one.
    fn synthesize(&mut self, text: &str, filepath: &Path, use_random_voice: bool) -> Result<()> {
        let voice = if use_random_voice {
            VoiceSelection::Random
        } else {
            VoiceSelection::Named(self.default_voice())
        };
        self.speak(&SpeechRequest::new(text, voice), filepath)
    }
}

pub const BACKENDS: &[&str] = &["googletranslate", "elevenlabs", "piper"];

/// Create a TTS backend by configuration key. No network access happens here.
pub fn create_backend(name: &str, settings: &Settings) -> Result<Box<dyn TtsBackend>> {
    match name.trim().to_lowercase().as_str() {
        "googletranslate" | "gtts" => Ok(Box::new(gtts::GttsBackend::new(settings))),
        "elevenlabs" => Ok(Box::new(elevenlabs::ElevenLabsBackend::new(settings))),
        "piper" => Ok(Box::new(piper::PiperBackend::new(settings))),
        other => Err(TtsError::Configuration(format!(
            "Unknown TTS backend: {}. Available: {}",
            other,
            BACKENDS.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_and_long_text() {
        let req = SpeechRequest::new("   ", VoiceSelection::Random);
        assert!(matches!(req.validate("x", 10), Err(TtsError::EmptyText)));

        let req = SpeechRequest::new("ééééé", VoiceSelection::Random);
        assert!(req.validate("x", 5).is_ok());
        match req.validate("x", 4) {
            Err(TtsError::TextTooLong { len, max, .. }) => {
                assert_eq!(len, 5);
                assert_eq!(max, 4);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_create_backend_by_name() {
        let settings = Settings::default();
        let gtts = create_backend("GoogleTranslate", &settings).unwrap();
        assert_eq!(gtts.name(), "googletranslate");
        assert_eq!(gtts.max_chars(), 5000);

        let eleven = create_backend("elevenlabs", &settings).unwrap();
        assert_eq!(eleven.name(), "elevenlabs");
        assert_eq!(eleven.max_chars(), 2500);

        assert!(matches!(
            create_backend("tiktok", &settings),
            Err(TtsError::Configuration(_))
        ));
    }

    #[test]
    fn test_elevenlabs_without_key_constructs() {
        // Missing credentials only surface on first use
        let settings = Settings::default();
        assert!(create_backend("elevenlabs", &settings).is_ok());
    }
}
