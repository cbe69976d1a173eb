use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use dyson_translator::backend::OpenAiBackend;
use dyson_translator::cache::{cache_path, TranslationCache};
use dyson_translator::config::{find_default_config, load_config, AppConfig, RunConfig, API_KEY_VAR};
use dyson_translator::pipeline::TranslationPipeline;
use dyson_translator::progress::ConsoleProgress;
use dyson_translator::prompts::{load_glossary, system_instruction};

#[derive(Parser, Debug)]
#[command(name = "dyson-translator")]
#[command(about = "Dyson Sphere Program localization translator (LLM batches + persistent cache)", long_about = None)]
struct Args {
    /// Target language code (e.g. it, fr, es)
    #[arg(long)]
    lang: String,

    /// Specific file to translate (default: the known game asset files)
    #[arg(long)]
    file: Option<String>,

    /// Model identifier sent to the backend
    #[arg(long)]
    model: Option<String>,

    /// Lines per translation batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Config file path (default: search for dyson-translator.toml upwards)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    let progress = ConsoleProgress::new(true);

    let api_key = std::env::var(API_KEY_VAR)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .with_context(|| {
            format!("{API_KEY_VAR} not set; export it or put it in a .env file")
        })?;

    let cfg_file = args.config.clone().or_else(find_default_config);
    let mut file_cfg = AppConfig::default();
    if let Some(path) = cfg_file.as_ref() {
        file_cfg = load_config(path)?;
        progress.info(format!("config: {}", path.display()));
    }
    let cfg = RunConfig::resolve(args.lang, args.file, args.model, args.batch_size, file_cfg)?;

    progress.info(format!(
        "language={} model={} batch_size={}",
        cfg.lang, cfg.model, cfg.batch_size
    ));

    let glossary = load_glossary(&cfg.glossary_path);
    if !glossary.is_empty() {
        progress.info(format!("glossary: {} rules", glossary.len()));
    }
    let backend = OpenAiBackend::new(
        api_key,
        cfg.model.clone(),
        system_instruction(&cfg.lang, &glossary),
    )?;

    let mut cache = TranslationCache::open(cache_path(&cfg.cache_dir, &cfg.lang), &progress);
    progress.info(format!("cache: {} entries", cache.len()));

    let pipeline = TranslationPipeline::new(&cfg, &backend, &progress);
    for filename in &cfg.files {
        progress.info(format!("processing {filename}"));
        if let Err(err) = pipeline.process_file(&mut cache, filename).await {
            progress.error(format!("{filename}: {err:#}"));
        }
    }

    progress.info("all files processed");
    Ok(())
}
