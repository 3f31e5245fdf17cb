//! Remote object locations
//!
//! Requests name their input either as `s3://bucket/path/to/file.pdf` or as a
//! bare key inside the configured default bucket.

use std::fmt;

use thiserror::Error;

/// Suffix added to the file stem of OCR'd output
pub const OCR_SUFFIX: &str = "_OCR";

const S3_SCHEME: &str = "s3://";

/// Why a request path could not be turned into a location
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("file_path is empty")]
    Empty,

    #[error("Missing bucket name in {0}")]
    MissingBucket(String),

    #[error("No bucket given in {0} and no default bucket is configured")]
    NoDefaultBucket(String),

    #[error("{0} does not name a file")]
    NotAFile(String),
}

/// A bucket plus an object key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Normalize a request path into bucket and key
    pub fn parse(input: &str, default_bucket: Option<&str>) -> Result<Self, LocationError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(LocationError::Empty);
        }

        let (bucket, key) = match input.strip_prefix(S3_SCHEME) {
            Some(rest) => {
                let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
                if bucket.is_empty() {
                    return Err(LocationError::MissingBucket(input.to_string()));
                }
                (bucket.to_string(), key.to_string())
            }
            None => {
                let bucket = default_bucket
                    .filter(|b| !b.is_empty())
                    .ok_or_else(|| LocationError::NoDefaultBucket(input.to_string()))?;
                (bucket.to_string(), input.trim_start_matches('/').to_string())
            }
        };

        // The key's last segment becomes a local file name
        let dot_segment = key.split('/').any(|segment| segment == "." || segment == "..");
        if key.is_empty() || key.ends_with('/') || dot_segment {
            return Err(LocationError::NotAFile(input.to_string()));
        }

        Ok(Self { bucket, key })
    }

    /// Fully qualified `s3://bucket/key` form
    pub fn uri(&self) -> String {
        format!("{}{}/{}", S3_SCHEME, self.bucket, self.key)
    }

    /// Last path segment of the key
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }

    /// `<stem>_OCR<ext>` for this object's file name
    pub fn ocr_file_name(&self) -> String {
        let (stem, ext) = split_extension(self.file_name());
        format!("{}{}{}", stem, OCR_SUFFIX, ext)
    }

    /// Sibling location the OCR'd output is stored at
    pub fn ocr_output(&self) -> Self {
        let key = match self.key.rsplit_once('/') {
            Some((dir, _)) => format!("{}/{}", dir, self.ocr_file_name()),
            None => self.ocr_file_name(),
        };
        Self {
            bucket: self.bucket.clone(),
            key,
        }
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri())
    }
}

/// Split a file name into stem and extension (with its dot)
///
/// Leading dots belong to the stem, so `.profile` has no extension.
fn split_extension(name: &str) -> (&str, &str) {
    let leading = name.len() - name.trim_start_matches('.').len();
    match name[leading..].rfind('.') {
        Some(i) => name.split_at(leading + i),
        None => (name, ""),
    }
}
