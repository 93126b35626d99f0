// ElevenLabs TTS backend

use super::voices::{VoiceEntry, VoiceListing, capitalize, choose_voice, find_voice};
use super::{SpeechRequest, TtsBackend, VoiceSelection};
use crate::error::{Result, TtsError};
use crate::settings::{API_KEY_ENV, Settings};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::json;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

const BASE_URL: &str = "https://api.elevenlabs.io";
const MAX_CHARS: usize = 2500;
const MODEL_ID: &str = "eleven_multilingual_v1";

/// Lifecycle of the API client. There is no way back to `Uninitialized`.
enum ClientState {
    Uninitialized,
    Ready(Client),
    Failed(String),
}

/// Cloud backend with a catalog of named voices.
pub struct ElevenLabsBackend {
    base_url: String,
    api_key: Option<String>,
    voice_name: String,
    state: ClientState,
}

impl ElevenLabsBackend {
    pub fn new(settings: &Settings) -> Self {
        Self::with_base_url(settings, BASE_URL)
    }

    pub fn with_base_url(settings: &Settings, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: settings.elevenlabs_api_key().map(str::to_string),
            voice_name: capitalize(&settings.general.tts.elevenlabs_voice_name),
            state: ClientState::Uninitialized,
        }
    }

    #[cfg(test)]
    fn is_ready(&self) -> bool {
        matches!(self.state, ClientState::Ready(_))
    }

    /// Build the client on first use and hand back the retained one afterwards.
    fn initialize(&mut self) -> Result<&Client> {
        if let ClientState::Uninitialized = self.state {
            debug!("Initializing ElevenLabs client");
            match self.build_client() {
                Ok(client) => self.state = ClientState::Ready(client),
                Err(e) => {
                    self.state = ClientState::Failed(e.to_string());
                    return Err(e);
                }
            }
        }
        match &self.state {
            ClientState::Ready(client) => Ok(client),
            ClientState::Failed(reason) => Err(TtsError::Authentication(format!(
                "backend is unusable after an earlier failure: {}",
                reason
            ))),
            ClientState::Uninitialized => unreachable!("initialized above"),
        }
    }

    fn build_client(&self) -> Result<Client> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            TtsError::Configuration(format!(
                "You didn't set an ElevenLabs API key! Set elevenlabs_api_key or {} to a valid key.",
                API_KEY_ENV
            ))
        })?;
        let mut value = HeaderValue::from_str(key)
            .map_err(|_| TtsError::Configuration("API key contains invalid characters".to_string()))?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("xi-api-key", value);
        Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| TtsError::Configuration(format!("failed to build HTTP client: {}", e)))
    }

    /// Check a response, moving to `Failed` when the credential was rejected.
    fn check(&mut self, response: Response, what: &str) -> Result<Response> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let reason = format!("{} was rejected with {}", what, status);
            self.state = ClientState::Failed(reason.clone());
            return Err(TtsError::Authentication(reason));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TtsError::Synthesis(format!("{} failed with {}: {}", what, status, body)));
        }
        Ok(response)
    }

    /// Fetch the full voice catalog. Never cached.
    pub fn fetch_voices(&mut self) -> Result<Vec<VoiceEntry>> {
        let url = format!("{}/v1/voices", self.base_url);
        let response = self.initialize()?.get(&url).send()?;
        let listing: VoiceListing = self.check(response, "voice listing")?.json()?;
        let voices = listing.into_entries();
        debug!("Fetched {} voices", voices.len());
        Ok(voices)
    }

    fn pick_random_entry(&mut self) -> Result<VoiceEntry> {
        let catalog = self.fetch_voices()?;
        let chosen = choose_voice(&catalog, &mut rand::thread_rng())?.clone();
        debug!("Chosen voice entry: {:?}", chosen);
        Ok(chosen)
    }

    fn resolve_voice(&mut self, voice: &VoiceSelection) -> Result<(String, String)> {
        let entry = match voice {
            VoiceSelection::Random => self.pick_random_entry()?,
            VoiceSelection::Named(name) => {
                let name = capitalize(name);
                let catalog = self.fetch_voices()?;
                find_voice(&catalog, &name)
                    .cloned()
                    .ok_or_else(|| TtsError::Synthesis(format!("voice '{}' not found", name)))?
            }
        };
        Ok((entry.name()?, entry.voice_id()?))
    }

    fn run(&mut self, request: &SpeechRequest, filepath: &Path) -> Result<()> {
        request.validate(self.name(), self.max_chars())?;
        self.initialize()?;
        let (voice_name, voice_id) = self.resolve_voice(&request.voice)?;
        info!("Synthesizing {} chars with voice {}", request.text.chars().count(), voice_name);

        let url = format!("{}/v1/text-to-speech/{}", self.base_url, voice_id);
        let response = self
            .initialize()?
            .post(&url)
            .header(ACCEPT, "audio/mpeg")
            .json(&json!({ "text": request.text, "model_id": MODEL_ID }))
            .send()?;
        let audio = self.check(response, "text-to-speech")?.bytes()?;
        if audio.is_empty() {
            return Err(TtsError::Synthesis("provider returned no audio".to_string()));
        }
        fs::write(filepath, &audio)?;
        info!("ElevenLabs wrote {} bytes to {}", audio.len(), filepath.display());
        Ok(())
    }
}

impl TtsBackend for ElevenLabsBackend {
    fn name(&self) -> &'static str {
        "elevenlabs"
    }

    fn max_chars(&self) -> usize {
        MAX_CHARS
    }

    fn default_voice(&self) -> String {
        self.voice_name.clone()
    }

    fn file_extension(&self) -> &'static str {
        "mp3"
    }

    fn speak(&mut self, request: &SpeechRequest, filepath: &Path) -> Result<()> {
        self.run(request, filepath).inspect_err(|e| {
            error!("Error generating audio with ElevenLabs: {}", e);
        })
    }

    fn random_voice(&mut self) -> Result<String> {
        self.pick_random_entry()
            .and_then(|entry| entry.name())
            .inspect_err(|e| {
                error!("Error picking a random ElevenLabs voice: {}", e);
            })
    }
}
