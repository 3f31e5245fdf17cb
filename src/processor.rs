//! Request orchestration
//!
//! One request: resolve the location, download into a private working
//! directory, run the pipeline, upload the result next to the original.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tracing::Instrument;

use crate::config::ProcessingConfig;
use crate::error::{AppError, Result};
use crate::pipeline::{DocumentPipeline, PipelineError};
use crate::storage::{ObjectLocation, ObjectStore};

/// Body of `POST /pdf/process`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessRequest {
    pub file_path: Option<String>,
}

impl ProcessRequest {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: Some(file_path.into()),
        }
    }
}

/// Result of a processed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResponse {
    /// 1 when at least one page was OCR'd, else 0
    pub ocr_needed: u8,
    /// Location the caller should use from now on
    pub output_file: String,
}

/// Drives fetch, pipeline and upload for each request
pub struct Processor {
    store: Arc<dyn ObjectStore>,
    pipeline: Arc<dyn DocumentPipeline>,
    default_bucket: Option<String>,
    config: ProcessingConfig,
}

impl Processor {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        pipeline: Arc<dyn DocumentPipeline>,
        default_bucket: Option<String>,
        config: ProcessingConfig,
    ) -> Self {
        Self {
            store,
            pipeline,
            default_bucket,
            config,
        }
    }

    /// Process one request end to end
    pub async fn handle(&self, request: ProcessRequest) -> Result<ProcessResponse> {
        let file_path = request
            .file_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::Validation("Missing file_path".to_string()))?;

        let location = ObjectLocation::parse(file_path, self.default_bucket.as_deref())?;

        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("process", %request_id, file = %location);
        self.run(location).instrument(span).await
    }

    async fn run(&self, location: ObjectLocation) -> Result<ProcessResponse> {
        let work = self.work_dir()?;
        let input = work.path().join(location.file_name());
        let output = work.path().join(location.ocr_file_name());

        tracing::info!("Downloading {} to {}", location, input.display());
        self.store
            .fetch(&location, &input)
            .await
            .map_err(|source| AppError::SourceUnavailable {
                location: location.clone(),
                source,
            })?;

        let timeout = self.config.request_timeout();
        let outcome = tokio::time::timeout(timeout, self.pipeline.process(&input, &output))
            .await
            .map_err(|_| PipelineError::Timeout(timeout.as_secs()))??;

        let ocr_needed = u8::from(outcome.ocr_performed());
        let Some(processed) = outcome.output_path() else {
            tracing::info!("Keeping original {}", location);
            return Ok(ProcessResponse {
                ocr_needed,
                output_file: location.uri(),
            });
        };

        let target = location.ocr_output();
        tracing::info!("Uploading {} to {}", processed.display(), target);
        if let Err(source) = self.store.store(processed, &target).await {
            let kept = work.keep();
            tracing::warn!("Upload failed; keeping working directory {}", kept.display());
            return Err(AppError::SinkUnavailable {
                location: target,
                source,
            });
        }

        Ok(ProcessResponse {
            ocr_needed,
            output_file: target.uri(),
        })
    }

    fn work_dir(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("pdf-ocr-");
        let dir = match &self.config.work_dir {
            Some(parent) => {
                std::fs::create_dir_all(parent).map_err(PipelineError::Io)?;
                builder.tempdir_in(parent)
            }
            None => builder.tempdir(),
        }
        .map_err(PipelineError::Io)?;
        tracing::debug!("Working directory {}", dir.path().display());
        Ok(dir)
    }
}
