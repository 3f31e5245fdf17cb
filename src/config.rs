//! Configuration management for the PDF OCR server
//!
//! Everything is read once from the environment (after `.env` is loaded)
//! and handed to each collaborator at construction.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::pipeline::SCANNED_TEXT_THRESHOLD;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub ocr: OcrConfig,
    pub pipeline: PipelineConfig,
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Custom endpoint for S3-compatible services (MinIO, R2, ...)
    pub endpoint: Option<String>,
    /// Bucket used when a request carries a bare key
    pub default_bucket: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// Path to ocrmypdf executable (default: "ocrmypdf" - uses PATH)
    pub ocrmypdf_path: String,
    /// OCR language (default: "eng")
    pub language: String,
    /// Leave pages that already carry text alone instead of re-recognizing them
    pub skip_text: bool,
    /// Optimization level: 0 (fastest, largest), 1, 2, 3 (slowest, smallest)
    pub optimize: u8,
    /// Number of parallel jobs inside the engine
    pub jobs: Option<usize>,
    /// Directory holding the rasterizer tools, prepended to the engine's PATH
    pub rasterizer_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Pages with fewer stripped text characters than this are scanned
    pub scanned_text_threshold: usize,
    /// Maximum number of pages being OCR'd at once
    pub ocr_concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessingConfig {
    /// Parent directory for per-request working directories
    pub work_dir: Option<PathBuf>,
    /// Upper bound on reassembly time for one request
    pub request_timeout_secs: u64,
}

impl ProcessingConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        OcrConfig {
            ocrmypdf_path: "ocrmypdf".to_string(),
            language: "eng".to_string(),
            skip_text: true,
            optimize: 1,
            jobs: None,
            rasterizer_dir: None,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            scanned_text_threshold: SCANNED_TEXT_THRESHOLD,
            ocr_concurrency: 1,
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        ProcessingConfig {
            work_dir: None,
            request_timeout_secs: 900,
        }
    }
}

/// Invalid configuration value
#[derive(Debug, thiserror::Error)]
#[error("Invalid value for {name}: {value:?}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT")?.unwrap_or(defaults.server.port),
            },
            storage: StorageConfig {
                endpoint: non_empty_var("S3_ENDPOINT"),
                default_bucket: non_empty_var("S3_BUCKET"),
                access_key: non_empty_var("AWS_ACCESS_KEY_ID"),
                secret_key: non_empty_var("AWS_SECRET_ACCESS_KEY"),
                region: non_empty_var("AWS_REGION").or_else(|| non_empty_var("AWS_DEFAULT_REGION")),
            },
            ocr: OcrConfig {
                ocrmypdf_path: non_empty_var("OCRMYPDF_PATH").unwrap_or(defaults.ocr.ocrmypdf_path),
                language: non_empty_var("OCR_LANGUAGE").unwrap_or(defaults.ocr.language),
                skip_text: parse_bool_var("OCR_SKIP_TEXT")?.unwrap_or(defaults.ocr.skip_text),
                optimize: parse_var("OCR_OPTIMIZE")?.unwrap_or(defaults.ocr.optimize),
                jobs: parse_var("OCR_JOBS")?,
                rasterizer_dir: non_empty_var("POPPLER_PATH").map(PathBuf::from),
            },
            pipeline: PipelineConfig {
                scanned_text_threshold: parse_var("SCANNED_TEXT_THRESHOLD")?
                    .unwrap_or(defaults.pipeline.scanned_text_threshold),
                ocr_concurrency: parse_var::<usize>("OCR_CONCURRENCY")?
                    .unwrap_or(defaults.pipeline.ocr_concurrency)
                    .max(1),
            },
            processing: ProcessingConfig {
                work_dir: non_empty_var("WORK_DIR").map(PathBuf::from),
                request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS")?
                    .unwrap_or(defaults.processing.request_timeout_secs),
            },
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match non_empty_var(name) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError { name, value }),
        None => Ok(None),
    }
}

fn parse_bool_var(name: &'static str) -> Result<Option<bool>, ConfigError> {
    match non_empty_var(name) {
        Some(value) => parse_bool(&value)
            .map(Some)
            .ok_or(ConfigError { name, value }),
        None => Ok(None),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
