// Google Translate TTS backend

use super::{SpeechRequest, TtsBackend};
use crate::error::{Result, TtsError};
use crate::settings::Settings;
use crate::utils::chunk_text;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

const BASE_URL: &str = "https://translate.google.com";
const MAX_CHARS: usize = 5000;
/// The translate endpoint rejects longer pieces
const PIECE_CHARS: usize = 100;
const DEFAULT_LANG: &str = "en";

/// Keyless backend speaking through the Google Translate voice.
pub struct GttsBackend {
    base_url: String,
    lang: Option<String>,
    client: Client,
}

impl GttsBackend {
    pub fn new(settings: &Settings) -> Self {
        Self::with_base_url(settings, BASE_URL)
    }

    pub fn with_base_url(settings: &Settings, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            lang: settings.post_lang().map(str::to_string),
            client: Client::new(),
        }
    }

    fn fetch_piece(&self, piece: &str, lang: &str, idx: usize, total: usize) -> Result<Vec<u8>> {
        let url = format!("{}/translate_tts", self.base_url);
        let total = total.to_string();
        let idx = idx.to_string();
        let textlen = piece.chars().count().to_string();
        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, "Mozilla/5.0 (reddit-narrator)")
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", lang),
                ("q", piece),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(TtsError::Synthesis(format!(
                "translate_tts returned {} for piece {}",
                status, idx
            )));
        }
        let bytes = response.bytes()?;
        if bytes.is_empty() {
            return Err(TtsError::Synthesis(format!("empty audio for piece {}", idx)));
        }
        Ok(bytes.to_vec())
    }

    fn run(&self, request: &SpeechRequest, filepath: &Path) -> Result<()> {
        request.validate(self.name(), self.max_chars())?;
        let lang = request
            .target_language
            .as_deref()
            .or(self.lang.as_deref())
            .unwrap_or(DEFAULT_LANG);

        let pieces = chunk_text(&request.text, PIECE_CHARS);
        debug!("Requesting {} pieces in '{}'", pieces.len(), lang);

        let mut audio = Vec::new();
        for (idx, piece) in pieces.iter().enumerate() {
            audio.extend(self.fetch_piece(piece, lang, idx, pieces.len())?);
        }
        fs::write(filepath, &audio)?;
        info!("Google Translate TTS wrote {} bytes to {}", audio.len(), filepath.display());
        Ok(())
    }
}

impl TtsBackend for GttsBackend {
    fn name(&self) -> &'static str {
        "googletranslate"
    }

    fn max_chars(&self) -> usize {
        MAX_CHARS
    }

    fn default_voice(&self) -> String {
        "default".to_string()
    }

    fn file_extension(&self) -> &'static str {
        "mp3"
    }

    /// The voice selection is ignored: there is only one voice per language.
    fn speak(&mut self, request: &SpeechRequest, filepath: &Path) -> Result<()> {
        self.run(request, filepath).inspect_err(|e| {
            error!("Error generating audio with Google Translate: {}", e);
        })
    }

    fn random_voice(&mut self) -> Result<String> {
        Ok(self.default_voice())
    }
}
