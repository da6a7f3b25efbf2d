use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, info_span, warn};

use crate::processor::TextExtractor;
use crate::sanitize;
use crate::synthesis::SpeechSynthesizer;
use crate::worker::job::JobResult;

use super::config::PipelineConfig;
use super::context::PipelineContext;
use super::error::PipelineError;
use super::progress::{
    extraction_progress, ProgressEvent, ProgressReporter, PROGRESS_EXTRACTED, PROGRESS_STARTED,
};

pub struct Pipeline {
    config: Arc<PipelineConfig>,
    extractor: Arc<dyn TextExtractor>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl Pipeline {
    pub fn new(
        config: Arc<PipelineConfig>,
        extractor: Arc<dyn TextExtractor>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            config,
            extractor,
            synthesizer,
        }
    }

    /// Run the full conversion for a single job.
    ///
    /// Every outcome, a panic inside a collaborator included, ends in exactly
    /// one `Completed` or `Failed` event.
    pub fn run(
        &self,
        mut ctx: PipelineContext,
        progress: &dyn ProgressReporter,
    ) -> (JobResult, PipelineContext) {
        let filename = sanitize::redact_path(&ctx.job.source_path);
        let _pipeline_span = info_span!("pipeline",
            job_id = %ctx.job.id,
            filename = %filename,
        )
        .entered();

        progress.report(ProgressEvent::Processing);
        progress.report(ProgressEvent::Progress(PROGRESS_STARTED));

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.execute(&mut ctx, progress)))
            .unwrap_or_else(|payload| Err(PipelineError::Panicked(panic_message(&*payload))));

        match outcome {
            Ok(audio_path) => {
                info!("Conversion finished: {}", sanitize::redact_path(&audio_path));
                progress.report(ProgressEvent::Completed {
                    audio_path: audio_path.clone(),
                });
                (JobResult::success(&ctx.job, audio_path), ctx)
            }
            Err(e) => {
                let err_msg = e.to_string();
                warn!("Conversion failed: {}", err_msg);
                progress.report(ProgressEvent::Failed {
                    error: err_msg.clone(),
                });
                (JobResult::failure(&ctx.job, err_msg), ctx)
            }
        }
    }

    fn execute(
        &self,
        ctx: &mut PipelineContext,
        progress: &dyn ProgressReporter,
    ) -> Result<PathBuf, PipelineError> {
        // Step 1: Extract text page by page
        {
            let _step = info_span!("extract_text").entered();
            self.step_extract_text(ctx, progress)?;
        }

        // Step 2: Reject documents without a text layer
        self.step_check_text(ctx)?;
        progress.report(ProgressEvent::Progress(PROGRESS_EXTRACTED));

        // Step 3: Truncate to the synthesis limit
        self.step_truncate(ctx);

        // Step 4: Synthesize
        {
            let _step = info_span!("synthesize").entered();
            self.step_synthesize(ctx)?;
        }

        ctx.audio_path
            .clone()
            .ok_or_else(|| PipelineError::Panicked("audio path was not recorded".to_string()))
    }

    fn step_extract_text(
        &self,
        ctx: &mut PipelineContext,
        progress: &dyn ProgressReporter,
    ) -> Result<(), PipelineError> {
        let mut pages = 0;
        let mut on_page = |done: usize, total: usize| {
            pages = total;
            progress.report(ProgressEvent::Progress(extraction_progress(done, total)));
        };

        let text = self.extractor.extract(&ctx.job.source_path, &mut on_page)?;

        if pages == 0 {
            // No page callbacks: nothing to interpolate
            progress.report(ProgressEvent::Progress(PROGRESS_EXTRACTED));
        }

        debug!("Extracted {} characters from {} pages", text.chars().count(), pages);
        ctx.pages = pages;
        ctx.text = Some(text);
        Ok(())
    }

    fn step_check_text(&self, ctx: &PipelineContext) -> Result<(), PipelineError> {
        match ctx.text.as_deref() {
            Some(text) if !text.trim().is_empty() => Ok(()),
            _ => Err(PipelineError::NoText),
        }
    }

    fn step_truncate(&self, ctx: &mut PipelineContext) {
        let text = ctx.text.as_deref().unwrap_or_default();
        let truncated = truncate_chars(text, self.config.max_synthesis_chars);
        if truncated.len() < text.len() {
            debug!(
                "Truncated text to {} characters",
                self.config.max_synthesis_chars
            );
        }
        ctx.synthesis_text = Some(truncated.to_string());
    }

    fn step_synthesize(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        let text = ctx.synthesis_text.as_deref().unwrap_or_default();
        let audio_path = self
            .config
            .storage
            .audio_path_for(&ctx.job.filename_stem(), &ctx.job.id);

        self.synthesizer
            .synthesize(text, &self.config.language, &audio_path)?;

        ctx.audio_path = Some(audio_path);
        Ok(())
    }
}

/// Returns the prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
