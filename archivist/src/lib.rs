//! Walks an unsorted DICOM tree, classifies each series with
//! [`rad_archivist_seriesclass`], archives it under the canonical layout,
//! converts it to NIfTI via an external decoder, and normalizes the decoder
//! output with [`rad_archivist_niftinorm`].
//!
//! Grounded on `dcm_file_sort_service`'s binary/config/service-state shape:
//! this crate is straightforward plumbing whose design is dictated by the
//! platform rather than the problem. The classification and normalization
//! logic it calls into lives entirely in `seriesclass` and `niftinorm`.

pub mod cli;
pub mod config;
pub mod decoder;
pub mod meta;
pub mod orchestrate;
pub mod reverse;
mod tagmap;

pub use cli::Cli;
pub use config::Config;
pub use tagmap::DicomObjectLookup;

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read config file {path}: {source}")]
    Config { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    ConfigParse { path: PathBuf, source: toml::de::Error },
    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
    #[error("IO error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("failed to walk directory tree at {path}: {source}")]
    WalkDir { path: PathBuf, source: walkdir::Error },
    #[error("failed to build the worker thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error(transparent)]
    Decoder(#[from] decoder::Error),
    #[error(transparent)]
    Normalize(#[from] rad_archivist_niftinorm::Error),
    #[error("series produced no header entries to dump")]
    EmptyHeaderDump,
    #[error("failed to serialize header dump: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to reconstruct a DICOM instance: {0}")]
    Reconstruct(String),
}

pub type Result<T> = std::result::Result<T, Error>;
