use anyhow::Context;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{error, info, warn};

/// Write the ffmpeg concat demuxer list for `parts`, relative to `dir`.
pub fn write_concat_list(dir: &Path, parts: &[PathBuf]) -> anyhow::Result<PathBuf> {
    let list = dir.join("files.txt");
    let mut f = File::create(&list)?;
    for p in parts {
        let fname = p
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid filename: {}", p.display()))?;
        writeln!(f, "file '{}'", fname.replace('\'', r"'\''"))?;
    }
    Ok(list)
}

/// Join the synthesized parts into one narration file with ffmpeg.
pub fn concat_parts(dir: &Path, parts: &[PathBuf], out: &Path) -> anyhow::Result<()> {
    if parts.is_empty() {
        anyhow::bail!("No audio parts to concatenate");
    }
    let list = write_concat_list(dir, parts)?;
    info!("Created concat list file {}", list.display());

    let out = std::path::absolute(out).context("Failed to resolve output path")?;
    let status = Command::new("ffmpeg")
        .current_dir(dir)
        .args(["-y", "-loglevel", "error", "-f", "concat", "-safe", "0", "-i", "files.txt", "-c", "copy"])
        .arg(&out)
        .status()
        .context("Failed to run ffmpeg")?;

    if !status.success() {
        warn!("ffmpeg concat with copy failed; retrying with re-encode");
        let status2 = Command::new("ffmpeg")
            .current_dir(dir)
            .args(["-y", "-loglevel", "error", "-f", "concat", "-safe", "0", "-i", "files.txt"])
            .arg(&out)
            .status()
            .context("Failed to run ffmpeg")?;
        if !status2.success() {
            error!("ffmpeg failed to concatenate audio parts");
            anyhow::bail!("ffmpeg failed to concatenate audio parts");
        }
    }
    info!("Combined audio written to {}", out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_list_uses_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let parts = vec![dir.path().join("part_000.mp3"), dir.path().join("it's.mp3")];
        let list = write_concat_list(dir.path(), &parts).unwrap();
        let content = std::fs::read_to_string(list).unwrap();
        assert_eq!(content, "file 'part_000.mp3'\nfile 'it'\\''s.mp3'\n");
    }

    #[test]
    fn test_concat_without_parts_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(concat_parts(dir.path(), &[], &dir.path().join("out.mp3")).is_err());
    }
}
