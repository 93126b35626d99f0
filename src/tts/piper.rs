// Piper local TTS backend

use super::{SpeechRequest, TtsBackend};
use crate::error::{Result, TtsError};
use crate::settings::Settings;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{error, info};

const MAX_CHARS: usize = 5000;

/// Runs the `piper` binary with a single ONNX voice model.
pub struct PiperBackend {
    binary: String,
    model: String,
}

impl PiperBackend {
    pub fn new(settings: &Settings) -> Self {
        Self::with_binary(settings, "piper")
    }

    pub fn with_binary(settings: &Settings, binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
            model: settings.general.tts.piper_model.clone(),
        }
    }

    fn run(&self, request: &SpeechRequest, filepath: &Path) -> Result<()> {
        request.validate(self.name(), self.max_chars())?;

        let mut child = Command::new(&self.binary)
            .arg("--model")
            .arg(&self.model)
            .arg("--output_file")
            .arg(filepath)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| TtsError::Synthesis(format!("failed to spawn {}: {}", self.binary, e)))?;

        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(request.text.as_bytes()),
            None => Ok(()),
        };
        if let Err(e) = written {
            let _ = child.kill();
            child.wait()?;
            return Err(TtsError::Synthesis(format!("failed to write text to piper: {}", e)));
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(TtsError::Synthesis(format!("piper exited with {}", status)));
        }
        match std::fs::metadata(filepath) {
            Ok(meta) if meta.len() > 0 => {}
            _ => return Err(TtsError::Synthesis("piper produced no audio".to_string())),
        }
        info!("Piper TTS wrote {}", filepath.display());
        Ok(())
    }
}

impl TtsBackend for PiperBackend {
    fn name(&self) -> &'static str {
        "piper"
    }

    fn max_chars(&self) -> usize {
        MAX_CHARS
    }

    /// Model file stem, e.g. `en_US-hfc_male-medium`
    fn default_voice(&self) -> String {
        Path::new(&self.model)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("default")
            .to_string()
    }

    fn file_extension(&self) -> &'static str {
        "wav"
    }

    fn speak(&mut self, request: &SpeechRequest, filepath: &Path) -> Result<()> {
        self.run(request, filepath).inspect_err(|e| {
            error!("Piper TTS failed for {}: {}", filepath.display(), e);
        })
    }

    /// A model has exactly one voice.
    fn random_voice(&mut self) -> Result<String> {
        Ok(self.default_voice())
    }
}
