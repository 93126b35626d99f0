use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "reddit-narrator")]
#[command(about = "Narrate a Reddit story with a pluggable text-to-speech backend", long_about = None)]
pub struct Args {
    /// Settings file (TOML)
    #[clap(long, default_value = "./config/config.toml")]
    pub config: String,

    /// Subreddit to read from (overrides settings)
    #[clap(long)]
    pub subreddit: Option<String>,

    /// TTS backend: googletranslate, elevenlabs or piper (overrides settings)
    #[clap(long)]
    pub backend: Option<String>,

    /// Pick a random voice from the backend's catalog
    #[clap(long, default_value_t = false)]
    pub random_voice: bool,

    #[clap(long, default_value = "narration.mp3")]
    pub out: String,

    #[clap(long, default_value = "rs_tmp")]
    pub tmp_dir: String,

    /// How many hot posts to consider (overrides settings)
    #[clap(long)]
    pub try_posts: Option<usize>,

    #[clap(long, default_value_t = 250)]
    pub chunk_chars: usize,

    /// Pause between TTS requests in milliseconds
    #[clap(long, default_value_t = 150)]
    pub pause_ms: u64,

    /// Print a randomly picked voice of the backend and exit
    #[clap(long)]
    pub pick_voice: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["reddit-narrator"]);
        assert_eq!(args.config, "./config/config.toml");
        assert_eq!(args.chunk_chars, 250);
        assert!(args.backend.is_none());
        assert!(!args.random_voice);
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "reddit-narrator",
            "--backend",
            "elevenlabs",
            "--random-voice",
            "--subreddit",
            "tifu",
        ]);
        assert_eq!(args.backend.as_deref(), Some("elevenlabs"));
        assert!(args.random_voice);
        assert_eq!(args.subreddit.as_deref(), Some("tifu"));
    }
}
