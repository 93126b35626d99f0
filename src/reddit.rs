use crate::settings::RedditSettings;
use crate::utils::{load_forbidden_words, sanitize_post};
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

/// Reddit wraps every object as `{"kind": .., "data": ..}`
#[derive(Debug, Deserialize)]
pub struct Thing<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct Listing {
    pub children: Vec<Thing<Post>>,
}

#[derive(Debug, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    /// Link posts carry no body worth reading
    #[serde(default = "default_is_self")]
    pub is_self: bool,
    #[serde(default, rename = "over_18")]
    pub nsfw: bool,
}

fn default_is_self() -> bool {
    true
}

impl Post {
    /// Title, followed by the body for self posts.
    fn narration_text(&self) -> String {
        let title = self.title.trim();
        let body = self.selftext.trim();
        if self.is_self && !body.is_empty() {
            format!("{}\n\n{}", title, body)
        } else {
            title.to_string()
        }
    }
}

/// A post picked for narration
#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    pub id: String,
    pub title: String,
    pub text: String,
}

pub async fn fetch_reddit_story(subreddit: &str, limit: usize, cfg: &RedditSettings) -> anyhow::Result<Story> {
    let url = format!("https://www.reddit.com/r/{}/hot.json?limit={}", subreddit, limit);
    let client = reqwest::Client::new();
    let res = client
        .get(&url)
        .header(USER_AGENT, "reddit-narrator/0.1")
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let parsed: Thing<Listing> = serde_json::from_str(&res)?;

    let mut used_ids = load_used_ids(&cfg.used_posts_path)?;
    let forbidden = load_forbidden_words(&cfg.forbidden_words_path);

    match select_story(parsed.data, &used_ids, &forbidden, cfg.max_words) {
        Some(story) => {
            info!("Selected post: {}", story.title);
            used_ids.insert(story.id.clone());
            save_used_ids(&cfg.used_posts_path, &used_ids)?;
            Ok(story)
        }
        None => anyhow::bail!("No suitable posts found in subreddit {}", subreddit),
    }
}

/// First post that is not NSFW, not used yet, and survives sanitizing.
pub fn select_story(
    listing: Listing,
    used_ids: &HashSet<String>,
    forbidden: &[String],
    max_words: usize,
) -> Option<Story> {
    listing
        .children
        .into_iter()
        .map(|child| child.data)
        .filter(|post| {
            let skip = post.nsfw || used_ids.contains(&post.id);
            if skip {
                debug!("Skipping post (NSFW or already used): {}", post.title);
            }
            !skip
        })
        .find_map(|post| {
            let clean = sanitize_post(&post.narration_text(), forbidden, max_words)?;
            (!clean.trim().is_empty()).then(|| Story {
                id: post.id,
                title: post.title,
                text: clean,
            })
        })
}

fn load_used_ids(path: &str) -> anyhow::Result<HashSet<String>> {
    match fs::read_to_string(path) {
        Ok(data) => Ok(serde_json::from_str(&data)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashSet::new()),
        Err(e) => Err(e.into()),
    }
}

fn save_used_ids(path: &str, ids: &HashSet<String>) -> anyhow::Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent)?;
    }
    let mut sorted: Vec<&String> = ids.iter().collect();
    sorted.sort();
    let data = serde_json::to_string_pretty(&sorted)?;
    fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Listing {
        serde_json::from_str::<Thing<Listing>>(
            r#"{"data":{"children":[
                {"data":{"id":"a","title":"Spicy","selftext":"nsfw body","is_self":true,"over_18":true}},
                {"data":{"id":"b","title":"Old one","selftext":"seen before","is_self":true,"over_18":false}},
                {"data":{"id":"c","title":"Rude","selftext":"what the heck","is_self":true}},
                {"data":{"id":"d","title":"AITA for   this?","selftext":"Long  story\n\nshort.","is_self":true}},
                {"data":{"id":"e","title":"Link post","is_self":false}}
            ]}}"#,
        )
        .unwrap()
        .data
    }

    #[test]
    fn test_select_story_skips_unsuitable_posts() {
        let used: HashSet<String> = ["b".to_string()].into_iter().collect();
        let forbidden = vec!["heck".to_string()];
        let story = select_story(listing(), &used, &forbidden, 300).unwrap();
        assert_eq!(story.id, "d");
        assert_eq!(story.text, "AITA for this?\n\nLong story\n\nshort.");
    }

    #[test]
    fn test_select_story_title_only_for_link_posts() {
        let used: HashSet<String> = ["b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let story = select_story(listing(), &used, &[], 300).unwrap();
        assert_eq!(story.id, "e");
        assert_eq!(story.text, "Link post");
    }

    #[test]
    fn test_select_story_none_left() {
        let used: HashSet<String> = ["b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
        assert!(select_story(listing(), &used, &[], 300).is_none());
    }

    #[test]
    fn test_post_defaults_when_fields_are_missing() {
        let post: Post = serde_json::from_str(r#"{"id":"z","title":" Title ","selftext":" Body "}"#).unwrap();
        assert!(post.is_self);
        assert!(!post.nsfw);
        assert_eq!(post.narration_text(), "Title\n\nBody");
    }

    #[test]
    fn test_used_ids_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("used.json");
        let path = path.to_str().unwrap();
        assert!(load_used_ids(path).unwrap().is_empty());

        let ids: HashSet<String> = ["x".to_string(), "y".to_string()].into_iter().collect();
        save_used_ids(path, &ids).unwrap();
        assert_eq!(load_used_ids(path).unwrap(), ids);
    }
}
