//! Storage module for S3-compatible backends
//!
//! Supports AWS S3 and S3-compatible services (MinIO, R2, ...) through a
//! custom endpoint.

mod location;
mod s3_client;
mod store;
mod types;

pub use location::{LocationError, ObjectLocation, OCR_SUFFIX};
pub use s3_client::S3Client;
pub use store::ObjectStore;
pub use types::*;
