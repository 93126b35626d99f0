//! Voice catalog entries as returned by cloud providers.
//!
//! Providers are not consistent about the shape of a catalog entry: some list
//! bare names, some full voice records, some loose objects. Everything is
//! normalized into a plain name at the fetch boundary.

use crate::error::{Result, TtsError};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum VoiceEntry {
    PlainName(String),
    NamedObject { voice_id: String, name: String },
    NamedMapping(Map<String, Value>),
    Unrecognized(Value),
}

impl VoiceEntry {
    /// Canonical voice name of this entry.
    pub fn name(&self) -> Result<String> {
        match self {
            VoiceEntry::PlainName(name) => Ok(name.clone()),
            VoiceEntry::NamedObject { name, .. } => Ok(name.clone()),
            VoiceEntry::NamedMapping(map) => match map.get("name") {
                Some(Value::String(name)) => Ok(name.clone()),
                _ => Err(TtsError::UnrecognizedVoiceShape(Value::Object(map.clone()).to_string())),
            },
            VoiceEntry::Unrecognized(value) => Err(TtsError::UnrecognizedVoiceShape(value.to_string())),
        }
    }

    /// Identifier used in synthesis URLs. Entries without an explicit id use their name.
    pub fn voice_id(&self) -> Result<String> {
        match self {
            VoiceEntry::NamedObject { voice_id, .. } => Ok(voice_id.clone()),
            VoiceEntry::NamedMapping(map) => match map.get("voice_id") {
                Some(Value::String(id)) => Ok(id.clone()),
                _ => self.name(),
            },
            _ => self.name(),
        }
    }
}

/// Catalog response, either wrapped in `{"voices": [...]}` or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum VoiceListing {
    Wrapped { voices: Vec<VoiceEntry> },
    Bare(Vec<VoiceEntry>),
}

impl VoiceListing {
    pub fn into_entries(self) -> Vec<VoiceEntry> {
        match self {
            VoiceListing::Wrapped { voices } => voices,
            VoiceListing::Bare(voices) => voices,
        }
    }
}

/// Uniformly pick one entry from the catalog.
pub fn choose_voice<'a, R: Rng + ?Sized>(catalog: &'a [VoiceEntry], rng: &mut R) -> Result<&'a VoiceEntry> {
    catalog.choose(rng).ok_or(TtsError::NoVoicesAvailable)
}

/// Find an entry by name, ignoring case. Entries with an unusable shape are skipped.
pub fn find_voice<'a>(catalog: &'a [VoiceEntry], name: &str) -> Option<&'a VoiceEntry> {
    let wanted = name.trim().to_lowercase();
    catalog
        .iter()
        .find(|entry| entry.name().is_ok_and(|n| n.to_lowercase() == wanted))
}

/// Upper-case the first character and lower-case the rest, e.g. `bELLA` -> `Bella`.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;
    use std::collections::HashSet;

    fn entries(value: Value) -> Vec<VoiceEntry> {
        serde_json::from_value::<VoiceListing>(value).unwrap().into_entries()
    }

    #[test]
    fn test_normalizes_all_supported_shapes() {
        let catalog = entries(json!([
            "Alice",
            { "voice_id": "b-1", "name": "Bob", "category": "premade" },
            { "name": "Carol", "labels": {} },
        ]));
        assert!(matches!(catalog[0], VoiceEntry::PlainName(_)));
        assert!(matches!(catalog[1], VoiceEntry::NamedObject { .. }));
        assert!(matches!(catalog[2], VoiceEntry::NamedMapping(_)));

        let names: Vec<String> = catalog.iter().map(|e| e.name().unwrap()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
        assert_eq!(catalog[1].voice_id().unwrap(), "b-1");
        assert_eq!(catalog[0].voice_id().unwrap(), "Alice");
    }

    #[test]
    fn test_unrecognized_shapes() {
        let catalog = entries(json!([42, { "label": "nameless" }, { "name": 7 }]));
        for entry in &catalog {
            assert!(matches!(entry.name(), Err(TtsError::UnrecognizedVoiceShape(_))));
        }
    }

    #[test]
    fn test_wrapped_listing() {
        let catalog = entries(json!({ "voices": [{ "voice_id": "x", "name": "Xena" }] }));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].name().unwrap(), "Xena");
    }

    #[test]
    fn test_empty_catalog() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(choose_voice(&[], &mut rng), Err(TtsError::NoVoicesAvailable)));
    }

    #[test]
    fn test_every_voice_can_be_chosen() {
        let catalog = entries(json!(["Alice", "Bob", "Carol"]));
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            seen.insert(choose_voice(&catalog, &mut rng).unwrap().name().unwrap());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_find_voice_ignores_case() {
        let catalog = entries(json!(["Alice", { "voice_id": "b-1", "name": "Bob" }]));
        assert_eq!(find_voice(&catalog, "bob").unwrap().voice_id().unwrap(), "b-1");
        assert!(find_voice(&catalog, "Dave").is_none());
    }

    #[test]
    fn test_find_voice_ignores_non_ascii_case() {
        let catalog = entries(json!([{ "voice_id": "j-id", "name": "JÜRGEN" }]));
        let found = find_voice(&catalog, &capitalize("JÜRGEN")).unwrap();
        assert_eq!(found.voice_id().unwrap(), "j-id");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("bELLA"), "Bella");
        assert_eq!(capitalize(" rachel "), "Rachel");
        assert_eq!(capitalize(""), "");
    }
}
