use anyhow::Context;
use futures::stream::{self, StreamExt};

use crate::backend::{BatchRequest, BatchResult, RequestItem, TranslationBackend};
use crate::batch::{plan_batches, PendingLine};
use crate::cache::TranslationCache;
use crate::config::{RunConfig, CACHE_FLUSH_EVERY};
use crate::progress::ConsoleProgress;
use crate::quality::validate_translation;
use crate::record::LineRecord;
use crate::textutil::{decode_utf16le, encode_utf16le, split_lines_keep_ends};

/// Drives one localization file end to end: read, resolve cache hits, dispatch
/// the remainder in concurrent batches, write the reconstructed file.
///
/// Worker tasks only perform the backend call; all cache writes and output
/// merging happen in the single coordinating task draining the stream, so the
/// only cross-batch race left is last-write-wins on identical cache keys.
pub struct TranslationPipeline<'a, B> {
    cfg: &'a RunConfig,
    backend: &'a B,
    progress: &'a ConsoleProgress,
}

impl<'a, B: TranslationBackend + Sync> TranslationPipeline<'a, B> {
    pub fn new(cfg: &'a RunConfig, backend: &'a B, progress: &'a ConsoleProgress) -> Self {
        Self {
            cfg,
            backend,
            progress,
        }
    }

    /// Translate a single file. A missing input is a skip, not an error; read
    /// and write failures are per-file errors the caller logs before moving on
    /// to the next file.
    pub async fn process_file(
        &self,
        cache: &mut TranslationCache,
        filename: &str,
    ) -> anyhow::Result<()> {
        let input_path = self.cfg.input_dir.join(filename);
        if !input_path.exists() {
            self.progress
                .warn(format!("file {} not found, skipping", input_path.display()));
            return Ok(());
        }

        let bytes = std::fs::read(&input_path)
            .with_context(|| format!("read {}", input_path.display()))?;
        let text = decode_utf16le(&bytes);
        let records: Vec<LineRecord> = split_lines_keep_ends(&text)
            .into_iter()
            .enumerate()
            .map(|(idx, raw)| LineRecord::parse(idx, raw))
            .collect();

        // Pre-populate every slot with pass-through content; cache hits
        // overwrite now, fresh translations overwrite as batches complete.
        let mut output: Vec<String> = records.iter().map(|r| r.raw().to_string()).collect();
        let mut pending: Vec<PendingLine> = Vec::new();
        for rec in &records {
            if !rec.is_translatable() {
                continue;
            }
            let ctx = rec.context();
            let ctx_opt = (!ctx.is_empty()).then_some(ctx);
            if let Some(hit) = cache.get(rec.text(), ctx_opt) {
                output[rec.index] = rec.with_translation(hit);
            } else {
                pending.push(PendingLine {
                    index: rec.index,
                    text: rec.text().to_string(),
                    context: ctx.to_string(),
                });
            }
        }

        if pending.is_empty() {
            self.progress
                .info("no new lines to translate (all cached or pass-through)");
        } else {
            self.progress
                .info(format!("{} lines need translation", pending.len()));
            self.dispatch(cache, &records, &mut output, pending).await;
        }

        let output_dir = self.cfg.output_dir.join(&self.cfg.lang);
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("create {}", output_dir.display()))?;
        let output_path = output_dir.join(filename);
        std::fs::write(&output_path, encode_utf16le(&output.concat()))
            .with_context(|| format!("write {}", output_path.display()))?;
        self.progress.info(format!("saved {}", output_path.display()));
        Ok(())
    }

    /// Run batches under the concurrency limit and merge results as they
    /// complete, in completion order. A failed batch contributes nothing and
    /// never aborts its siblings.
    async fn dispatch(
        &self,
        cache: &mut TranslationCache,
        records: &[LineRecord],
        output: &mut [String],
        pending: Vec<PendingLine>,
    ) {
        let total_lines = pending.len();
        let batches = plan_batches(pending, self.cfg.batch_size);

        let mut results = stream::iter(batches.into_iter().map(|batch| {
            let backend = self.backend;
            let lang = self.cfg.lang.as_str();
            async move {
                let request: BatchRequest = batch
                    .iter()
                    .map(|p| {
                        (
                            p.index.to_string(),
                            RequestItem {
                                text: p.text.clone(),
                                context: p.context.clone(),
                                len: p.text.chars().count(),
                            },
                        )
                    })
                    .collect();
                let result = backend.translate_batch(&request, lang).await;
                (batch, result)
            }
        }))
        .buffer_unordered(self.cfg.concurrency);

        let mut done_lines = 0usize;
        let mut done_batches = 0usize;
        while let Some((batch, result)) = results.next().await {
            let translations: BatchResult = match result {
                Ok(map) => map,
                Err(err) => {
                    self.progress
                        .warn(format!("batch of {} lines failed: {err:#}", batch.len()));
                    BatchResult::new()
                }
            };
            self.merge_batch(cache, records, output, &batch, &translations);

            done_lines += batch.len();
            done_batches += 1;
            self.progress.progress("translated", done_lines, total_lines);
            if done_batches % CACHE_FLUSH_EVERY == 0 {
                if let Err(err) = cache.save() {
                    self.progress.warn(format!("cache save failed: {err:#}"));
                }
            }
        }

        if let Err(err) = cache.save() {
            self.progress.warn(format!("cache save failed: {err:#}"));
        }
    }

    fn merge_batch(
        &self,
        cache: &mut TranslationCache,
        records: &[LineRecord],
        output: &mut [String],
        batch: &[PendingLine],
        translations: &BatchResult,
    ) {
        for line in batch {
            // Ids the backend dropped keep their pass-through original.
            let Some(translated) = translations.get(&line.index.to_string()) else {
                continue;
            };
            let accepted = match validate_translation(&line.text, translated) {
                Ok(()) => translated.as_str(),
                Err(reason) => {
                    self.progress.warn(format!(
                        "line {}: {reason}; keeping original text",
                        line.index
                    ));
                    line.text.as_str()
                }
            };
            let ctx_opt = (!line.context.is_empty()).then_some(line.context.as_str());
            cache.set(&line.text, accepted, ctx_opt);
            output[line.index] = records[line.index].with_translation(accepted);
        }
    }
}
