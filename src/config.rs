use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::Deserialize;

pub const CONFIG_FILE: &str = "dyson-translator.toml";
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

pub const DEFAULT_MODEL: &str = "gpt-5-nano";
pub const DEFAULT_BATCH_SIZE: usize = 50;
/// In-flight translation batches per file.
pub const CONCURRENT_BATCHES: usize = 5;
/// Cache flush cadence, in completed batches.
pub const CACHE_FLUSH_EVERY: usize = 5;

/// Optional TOML file config. Every field has a CLI or built-in counterpart;
/// CLI flags win over the file, the file wins over defaults.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub input_dir: Option<PathBuf>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub glossary: Option<PathBuf>,
    #[serde(default)]
    pub files: Option<Vec<String>>,
}

/// The game's known localization asset filenames.
pub fn default_files() -> Vec<String> {
    [
        "[outsource].txt",
        "[user].txt",
        "base.txt",
        "combat.txt",
        "creation.txt",
        "dictionary.txt",
        "keys.txt",
        "parameters.txt",
        "prototype.txt",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn find_default_config() -> Option<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(p) = find_file_upwards(&cwd, CONFIG_FILE, 8) {
            return Some(p);
        }
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            if let Some(p) = find_file_upwards(dir, CONFIG_FILE, 8) {
                return Some(p);
            }
        }
    }
    None
}

pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: AppConfig = toml::from_str(&text).context("parse config toml")?;
    Ok(cfg)
}

fn find_file_upwards(start: &Path, filename: &str, max_depth: usize) -> Option<PathBuf> {
    let mut dir = Some(start.to_path_buf());
    for _ in 0..max_depth {
        let d = dir?;
        let cand = d.join(filename);
        if cand.is_file() {
            return Some(cand);
        }
        dir = d.parent().map(|p| p.to_path_buf());
    }
    None
}

/// Fully resolved settings for one run.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub lang: String,
    pub model: String,
    pub batch_size: usize,
    pub concurrency: usize,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub glossary_path: PathBuf,
    pub files: Vec<String>,
}

impl RunConfig {
    pub fn resolve(
        lang: String,
        file: Option<String>,
        model: Option<String>,
        batch_size: Option<usize>,
        file_cfg: AppConfig,
    ) -> anyhow::Result<Self> {
        let batch_size = batch_size
            .or(file_cfg.batch_size)
            .unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            return Err(anyhow!("batch size must be a positive integer"));
        }

        let files = match file {
            Some(f) => vec![f],
            None => file_cfg.files.clone().unwrap_or_else(default_files),
        };

        Ok(Self {
            lang,
            model: model
                .or(file_cfg.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            batch_size,
            concurrency: CONCURRENT_BATCHES,
            input_dir: file_cfg.input_dir.unwrap_or_else(|| PathBuf::from("original")),
            output_dir: file_cfg
                .output_dir
                .unwrap_or_else(|| PathBuf::from("translated")),
            cache_dir: file_cfg.cache_dir.unwrap_or_else(|| PathBuf::from(".")),
            glossary_path: file_cfg
                .glossary
                .unwrap_or_else(|| PathBuf::from("glossary.txt")),
            files,
        })
    }
}
