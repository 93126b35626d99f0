use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub const API_KEY_ENV: &str = "ELEVENLABS_API_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub reddit: RedditSettings,
    #[serde(rename = "settings")]
    pub general: GeneralSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedditSettings {
    pub subreddit: String,
    pub try_posts: usize,
    pub used_posts_path: String,
    pub forbidden_words_path: String,
    pub max_words: usize,
    pub thread: ThreadSettings,
}

impl Default for RedditSettings {
    fn default() -> Self {
        Self {
            subreddit: "AITAH".to_string(),
            try_posts: 100,
            used_posts_path: "./config/used_posts.json".to_string(),
            forbidden_words_path: "./config/forbidden_words.txt".to_string(),
            max_words: 300,
            thread: ThreadSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ThreadSettings {
    /// Language code of the post, blank means unset
    pub post_lang: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    pub tts: TtsSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TtsSettings {
    pub voice_choice: String,
    pub random_voice: bool,
    pub elevenlabs_voice_name: String,
    pub elevenlabs_api_key: String,
    pub piper_model: String,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            voice_choice: "googletranslate".to_string(),
            random_voice: false,
            elevenlabs_voice_name: "Bella".to_string(),
            elevenlabs_api_key: String::new(),
            piper_model: "./tts/en_US-hfc_male-medium.onnx".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file, falling back to defaults when it doesn't exist.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let mut settings = if Path::new(path).exists() {
            info!("Loading settings from {}", path);
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings file {}", path))?;
            Self::from_toml(&content)
                .with_context(|| format!("Failed to parse settings file {}", path))?
        } else {
            info!("Settings file {} not found, using defaults", path);
            Self::default()
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Fill a blank API key from the environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.general.tts.elevenlabs_api_key.trim().is_empty() {
            if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
                debug!("Using API key from {}", API_KEY_ENV);
                self.general.tts.elevenlabs_api_key = key;
            }
        }
    }

    pub fn post_lang(&self) -> Option<&str> {
        non_blank(&self.reddit.thread.post_lang)
    }

    pub fn elevenlabs_api_key(&self) -> Option<&str> {
        non_blank(&self.general.tts.elevenlabs_api_key)
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let s = s.trim();
    if s.is_empty() { None } else { Some(s) }
}
