mod args;
mod audio;
mod error;
mod narrate;
mod reddit;
mod settings;
mod tts;
mod utils;

use anyhow::Context;
use args::Args;
use clap::Parser;
use settings::Settings;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let settings = Settings::load(&args.config)?;
    let backend_name = args
        .backend
        .clone()
        .unwrap_or_else(|| settings.general.tts.voice_choice.clone());

    // Backends use blocking HTTP clients and subprocesses, keep them off the async workers
    if args.pick_voice {
        let voice = tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
            let mut backend = tts::create_backend(&backend_name, &settings)?;
            Ok(backend.random_voice()?)
        })
        .await
        .context("Voice picking task panicked")??;
        println!("{}", voice);
        return Ok(());
    }

    info!("Starting reddit story narration pipeline");

    let subreddit = args.subreddit.as_deref().unwrap_or(&settings.reddit.subreddit);
    let limit = args.try_posts.unwrap_or(settings.reddit.try_posts);
    info!("Fetching reddit story from r/{} (up to {} posts)", subreddit, limit);
    let story = reddit::fetch_reddit_story(subreddit, limit, &settings.reddit).await?;
    info!("Using story (short preview): {:.200}", story.text.replace('\n', " "));

    let tmp_dir = PathBuf::from(&args.tmp_dir);
    if tmp_dir.exists() {
        info!("Removing existing tmp dir '{}'", tmp_dir.display());
        fs::remove_dir_all(&tmp_dir)?;
    }
    fs::create_dir_all(&tmp_dir)?;
    info!("Created tmp directory '{}'", tmp_dir.display());

    let random_voice = args.random_voice || settings.general.tts.random_voice;
    let chunk_chars = args.chunk_chars;
    let pause = Duration::from_millis(args.pause_ms);
    let out = PathBuf::from(&args.out);

    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let mut backend = tts::create_backend(&backend_name, &settings)?;
        info!("Using TTS backend {}", backend.name());
        let parts = narrate::narrate(
            backend.as_mut(),
            &story.text,
            &tmp_dir,
            chunk_chars,
            random_voice,
            settings.post_lang(),
            pause,
        )?;
        audio::concat_parts(&tmp_dir, &parts, &out)?;
        info!("Narration written to {}", out.display());
        Ok(())
    })
    .await
    .context("Narration task panicked")??;

    info!("Process complete.");
    Ok(())
}
