//! ocrmypdf-backed OCR engine
//!
//! Runs `ocrmypdf` as a child process on a PDF file and writes a PDF with an
//! embedded text layer. Rasterization is done by the tools ocrmypdf drives
//! (Ghostscript/Poppler); their directory can be prepended to the child's
//! `PATH` through [`OcrConfig::rasterizer_dir`].
//!
//! ## Requirements
//!
//! - `ocrmypdf` must be installed and available in PATH (or configured)
//! - Tesseract must be installed (used by ocrmypdf)

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::engine::OcrEngine;
use super::types::OcrError;
use crate::config::OcrConfig;

/// OCR engine wrapping the `ocrmypdf` CLI
pub struct OcrMyPdf {
    config: OcrConfig,
}

impl OcrMyPdf {
    /// Create a new engine, rejecting unusable language codes up front
    pub fn new(config: OcrConfig) -> Result<Self, OcrError> {
        Self::validate_language(&config.language)?;
        Ok(Self { config })
    }

    /// Validate language code to prevent argument injection
    fn validate_language(lang: &str) -> Result<(), OcrError> {
        // Language codes should be alphanumeric with optional underscore/plus (e.g., "eng", "eng+deu", "chi_sim")
        if lang.is_empty() || lang.len() > 20 {
            return Err(OcrError::InvalidLanguage(
                "Invalid language code length".to_string(),
            ));
        }
        for c in lang.chars() {
            if !c.is_ascii_alphanumeric() && c != '+' && c != '_' {
                return Err(OcrError::InvalidLanguage(format!(
                    "Invalid character in language code: {}",
                    c
                )));
            }
        }
        Ok(())
    }

    /// `PATH` for the child process, with the rasterizer directory first
    fn child_path(&self) -> Option<OsString> {
        let dir = self.config.rasterizer_dir.as_ref()?;
        let mut paths = vec![dir.clone()];
        if let Some(existing) = std::env::var_os("PATH") {
            paths.extend(std::env::split_paths(&existing));
        }
        std::env::join_paths(paths).ok()
    }

    fn build_command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.config.ocrmypdf_path);

        // Language
        cmd.arg("-l").arg(&self.config.language);

        // Skip text - don't OCR pages that already have text
        if self.config.skip_text {
            cmd.arg("--skip-text");
        } else {
            cmd.arg("--force-ocr");
        }

        // Optimization level
        cmd.arg("--optimize").arg(self.config.optimize.to_string());

        // Parallel jobs
        if let Some(jobs) = self.config.jobs {
            cmd.arg("-j").arg(jobs.to_string());
        }

        // Quiet mode for cleaner output
        cmd.arg("-q");

        cmd.arg(input).arg(output);

        if let Some(path) = self.child_path() {
            cmd.env("PATH", path);
        }

        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl OcrEngine for OcrMyPdf {
    fn name(&self) -> &str {
        "ocrmypdf"
    }

    async fn is_available(&self) -> bool {
        let mut cmd = Command::new(&self.config.ocrmypdf_path);
        cmd.arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(path) = self.child_path() {
            cmd.env("PATH", path);
        }

        matches!(cmd.status().await, Ok(status) if status.success())
    }

    async fn recognize(&self, input: &Path, output: &Path) -> Result<(), OcrError> {
        let start_time = std::time::Instant::now();
        tracing::debug!("Running ocrmypdf on {}", input.display());

        let result = self
            .build_command(input, output)
            .output()
            .await
            .map_err(|e| {
                OcrError::EngineNotAvailable(format!(
                    "Failed to run {}: {}",
                    self.config.ocrmypdf_path, e
                ))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);

            // Clean up output file if it exists
            let _ = tokio::fs::remove_file(output).await;

            return Err(OcrError::ProcessingError(format!(
                "ocrmypdf exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        if !tokio::fs::try_exists(output).await? {
            return Err(OcrError::ProcessingError(
                "ocrmypdf reported success but wrote no output".to_string(),
            ));
        }

        tracing::debug!(
            "ocrmypdf finished {} in {:.2}s",
            input.display(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(())
    }
}
