use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::progress::ConsoleProgress;

/// Durable mapping from source text (plus optional disambiguating context) to
/// its translation. One file per target language; keys are either `text`
/// (legacy, written by older cache files) or `text|context`.
///
/// A context-aware entry and its text-only counterpart are independent: the
/// same English string can carry different translations under different
/// Chinese originals across game patches.
pub struct TranslationCache {
    path: PathBuf,
    entries: HashMap<String, String>,
}

pub fn cache_path(cache_dir: &Path, lang: &str) -> PathBuf {
    cache_dir.join(format!("translation_cache.{lang}.json"))
}

impl TranslationCache {
    /// Load the cache at `path`, or start empty when the file is missing. A
    /// file that exists but does not parse also yields an empty cache, with a
    /// warning; the next `save()` overwrites it.
    pub fn open(path: PathBuf, progress: &ConsoleProgress) -> Self {
        let entries = match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(map) => map,
                Err(err) => {
                    progress.warn(format!(
                        "cache {} is not valid JSON ({err}); starting with an empty cache",
                        path.display()
                    ));
                    HashMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                progress.warn(format!(
                    "cannot read cache {} ({err}); starting with an empty cache",
                    path.display()
                ));
                HashMap::new()
            }
        };
        Self { path, entries }
    }

    /// Context-aware lookup first, then the legacy text-only key.
    #[must_use]
    pub fn get(&self, text: &str, context: Option<&str>) -> Option<&str> {
        if let Some(ctx) = context.filter(|c| !c.is_empty()) {
            if let Some(hit) = self.entries.get(&composite_key(text, ctx)) {
                return Some(hit.as_str());
            }
        }
        self.entries.get(text).map(String::as_str)
    }

    /// Last write wins. Identical (text, context) pairs translated by two
    /// in-flight batches overwrite each other, which is fine: both results
    /// stand for the same input.
    pub fn set(&mut self, text: &str, translation: &str, context: Option<&str>) {
        let key = match context.filter(|c| !c.is_empty()) {
            Some(ctx) => composite_key(text, ctx),
            None => text.to_string(),
        };
        self.entries.insert(key, translation.to_string());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the whole mapping, overwriting any prior snapshot. Safe to
    /// call repeatedly; called every few completed batches and at the end of
    /// each file.
    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create cache dir: {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.entries).context("serialize cache")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write cache: {}", self.path.display()))?;
        Ok(())
    }
}

fn composite_key(text: &str, context: &str) -> String {
    format!("{text}|{context}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> ConsoleProgress {
        ConsoleProgress::new(false)
    }

    fn temp_cache(dir: &tempfile::TempDir) -> TranslationCache {
        TranslationCache::open(cache_path(dir.path(), "it"), &quiet())
    }

    #[test]
    fn set_then_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = temp_cache(&dir);
        cache.set("Hello", "Ciao", None);
        assert_eq!(cache.get("Hello", None), Some("Ciao"));
        assert_eq!(cache.get("World", None), None);
    }

    #[test]
    fn context_disambiguates_homonyms() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = temp_cache(&dir);
        // Same English surface, different meaning across game patches.
        cache.set("Light", "Luce", Some("光"));
        cache.set("Light", "Leggero", Some("轻"));
        assert_eq!(cache.get("Light", Some("光")), Some("Luce"));
        assert_eq!(cache.get("Light", Some("轻")), Some("Leggero"));
    }

    #[test]
    fn legacy_key_serves_any_context() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = temp_cache(&dir);
        cache.set("LegacyKey", "TraduzioneVecchia", None);
        assert_eq!(
            cache.get("LegacyKey", Some("AnyContext")),
            Some("TraduzioneVecchia")
        );
        assert_eq!(cache.get("LegacyKey", None), Some("TraduzioneVecchia"));
    }

    #[test]
    fn miss_with_context_and_legacy_absent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = temp_cache(&dir);
        assert_eq!(cache.get("Brand New String", Some("NewContext")), None);
    }

    #[test]
    fn persistence_reloads_all_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(dir.path(), "it");

        let mut cache = TranslationCache::open(path.clone(), &quiet());
        cache.set("Cat", "Gatto", None);
        cache.set("Apple", "Mela", Some("苹果"));
        cache.save().unwrap();

        let reloaded = TranslationCache::open(path, &quiet());
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("Cat", None), Some("Gatto"));
        assert_eq!(reloaded.get("Apple", Some("苹果")), Some("Mela"));
    }

    #[test]
    fn malformed_file_resets_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(dir.path(), "it");
        std::fs::write(&path, "{not json").unwrap();

        let cache = TranslationCache::open(path, &quiet());
        assert!(cache.is_empty());
    }

    #[test]
    fn save_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = temp_cache(&dir);
        cache.set("Iron", "Ferro", Some("铁"));
        cache.save().unwrap();
        cache.save().unwrap();
    }
}
