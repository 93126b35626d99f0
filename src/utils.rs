use regex::Regex;
use std::fs;
use std::sync::LazyLock;
use tracing::{debug, warn};

static SENTENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)([^.!?]+[.!?]+)|([^.!?]+$)").expect("valid regex"));
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+|www\.\S+").expect("valid regex"));
static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w[\w'-]*").expect("valid regex"));

/// Pack sentences into chunks of at most `max_chars` characters.
///
/// Sentences longer than the limit are split on whitespace, and single words
/// longer than the limit are cut on character boundaries.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut sentences = Vec::new();
    for m in SENTENCE_RE.find_iter(text) {
        let s = m.as_str().trim();
        if !s.is_empty() {
            sentences.extend(split_long(s, max_chars));
        }
    }
    if sentences.is_empty() {
        if text.trim().is_empty() {
            return Vec::new();
        }
        warn!("No sentence breaks found; splitting on words");
        return split_long(text.trim(), max_chars);
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    for s in sentences {
        if current.is_empty() {
            current = s;
        } else if char_len(&current) + 1 + char_len(&s) <= max_chars {
            current.push(' ');
            current.push_str(&s);
        } else {
            chunks.push(current);
            current = s;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn split_long(sentence: &str, max_chars: usize) -> Vec<String> {
    if char_len(sentence) <= max_chars {
        return vec![sentence.to_string()];
    }
    let mut parts = Vec::new();
    let mut current = String::new();
    for word in sentence.split_whitespace() {
        let pieces: Vec<String> = if char_len(word) > max_chars {
            let chars: Vec<char> = word.chars().collect();
            chars.chunks(max_chars).map(|c| c.iter().collect()).collect()
        } else {
            vec![word.to_string()]
        };
        for piece in pieces {
            if current.is_empty() {
                current = piece;
            } else if char_len(&current) + 1 + char_len(&piece) <= max_chars {
                current.push(' ');
                current.push_str(&piece);
            } else {
                parts.push(std::mem::take(&mut current));
                current = piece;
            }
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Read one forbidden word per line. A missing file means no filter.
pub fn load_forbidden_words(path: &str) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect(),
        Err(e) => {
            debug!("No forbidden words loaded from {}: {}", path, e);
            Vec::new()
        }
    }
}

/// Clean a post for narration. Returns `None` when the post should be skipped.
pub fn sanitize_post(text: &str, forbidden: &[String], max_words: usize) -> Option<String> {
    let without_urls = URL_RE.replace_all(text, "");
    let words: Vec<String> = WORD_RE
        .find_iter(&without_urls)
        .map(|m| m.as_str().to_lowercase())
        .collect();

    if words.len() > max_words {
        debug!("Post too long: {} words (max {})", words.len(), max_words);
        return None;
    }
    if let Some(word) = words.iter().find(|w| forbidden.contains(w)) {
        debug!("Post contains forbidden word '{}'", word);
        return None;
    }

    let paragraphs: Vec<String> = without_urls
        .split("\n\n")
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .collect();
    Some(paragraphs.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_packs_sentences() {
        let chunks = chunk_text("One. Two! Three? Four.", 10);
        assert_eq!(chunks, vec!["One. Two!", "Three?", "Four."]);
    }

    #[test]
    fn test_chunk_never_exceeds_limit() {
        let text = "This sentence is definitely much longer than twenty characters and has no break \
                    and then a supercalifragilisticexpialidocious word.";
        let chunks = chunk_text(text, 20);
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.chars().count() <= 20, "chunk too long: {:?}", c);
        }
    }

    #[test]
    fn test_chunk_counts_characters_not_bytes() {
        let chunks = chunk_text("äöü äöü.", 8);
        assert_eq!(chunks, vec!["äöü äöü."]);
    }

    #[test]
    fn test_chunk_empty_text() {
        assert!(chunk_text("   ", 100).is_empty());
    }

    #[test]
    fn test_sanitize_strips_urls_and_whitespace() {
        let out = sanitize_post("Title\n\nSee   https://example.com/x  for\nmore.", &[], 100).unwrap();
        assert_eq!(out, "Title\n\nSee for more.");
    }

    #[test]
    fn test_sanitize_rejects_forbidden_and_long() {
        let forbidden = vec!["darn".to_string()];
        assert!(sanitize_post("Well DARN it", &forbidden, 100).is_none());
        assert!(sanitize_post("one two three", &[], 2).is_none());
        assert!(sanitize_post("darning is fine", &forbidden, 100).is_some());
    }

    #[test]
    fn test_load_forbidden_words() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        fs::write(&path, "# comment\nFoo\n\n bar \n").unwrap();
        let words = load_forbidden_words(path.to_str().unwrap());
        assert_eq!(words, vec!["foo", "bar"]);
        assert!(load_forbidden_words("/definitely/missing.txt").is_empty());
    }
}
