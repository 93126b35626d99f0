use crate::tts::{SpeechRequest, TtsBackend, VoiceSelection};
use crate::utils::chunk_text;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info};

/// Synthesize `text` chunk by chunk into `tmp_dir`, returning the part files in order.
///
/// In random mode one voice is drawn up front so the whole story keeps it.
pub fn narrate(
    backend: &mut dyn TtsBackend,
    text: &str,
    tmp_dir: &Path,
    chunk_chars: usize,
    random_voice: bool,
    lang: Option<&str>,
    pause: Duration,
) -> anyhow::Result<Vec<PathBuf>> {
    let voice = if random_voice {
        let voice = backend.random_voice()?;
        info!("Randomly selected voice: {}", voice);
        voice
    } else {
        backend.default_voice()
    };

    let chunks = chunk_text(text, chunk_chars.min(backend.max_chars()));
    info!("Split story into {} chunks for {}", chunks.len(), backend.name());
    if chunks.is_empty() {
        anyhow::bail!("Nothing to narrate");
    }

    let mut parts = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let path = tmp_dir.join(format!("part_{:03}.{}", i, backend.file_extension()));
        info!("Generating TTS chunk {}/{} ({} chars)", i + 1, chunks.len(), chunk.chars().count());
        debug!("Chunk text: {}", chunk);

        let mut request = SpeechRequest::new(chunk.as_str(), VoiceSelection::Named(voice.clone()));
        if let Some(lang) = lang {
            request = request.with_language(lang);
        }
        if let Err(e) = backend.speak(&request, &path) {
            error!("Failed to generate TTS chunk {}: {}", i, e);
            return Err(e.into());
        }
        parts.push(path);
        if !pause.is_zero() {
            std::thread::sleep(pause);
        }
    }
    Ok(parts)
}
