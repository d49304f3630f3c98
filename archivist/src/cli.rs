//! Command-line surface: subcommands `convert`, `nifti2dicom`, `upload`,
//! `report`, and the flags `--input_dicom`, `--output_dicom`,
//! `--output_nifti`, `--work N`.
//!
//! Grounded on `dcm_file_sort_service::cli::Cli`'s manual-args-vs-config
//! shape; generalized to `clap`'s `Subcommand` derive since this binary has
//! four distinct operations rather than one.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about,
    long_about = "Classifies a DICOM archive by acquisition type, converts it to NIfTI, and \
                   can convert normalized NIfTI volumes back to DICOM using preserved headers."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the archivist configuration file.
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// Overrides `processing.workers` from the config file (clamped to [1, 8]).
    #[arg(long, global = true)]
    pub work: Option<usize>,

    /// Enable logging at INFO level.
    #[arg(long, global = true, default_value_t = false)]
    pub verbose: bool,
    /// Enable logging at DEBUG level.
    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,
    /// Enable logging at TRACE level.
    #[arg(long, global = true, default_value_t = false)]
    pub trace: bool,
}

/// Flags use literal underscore-separated names (`--input_dicom`, not
/// clap's default kebab-case `--input-dicom`), so every multi-word flag
/// names its long form explicitly.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Classify a DICOM archive, convert each series to NIfTI, and normalize
    /// the decoder output.
    Convert {
        /// Root of the incoming, unsorted DICOM tree.
        #[arg(long = "input_dicom")]
        input_dicom: PathBuf,
        /// Root the classified DICOM instances are archived under.
        #[arg(long = "output_dicom")]
        output_dicom: Option<PathBuf>,
        /// Root the normalized NIfTI output is written under.
        #[arg(long = "output_nifti")]
        output_nifti: Option<PathBuf>,
    },
    /// Converts a normalized NIfTI study back to DICOM using the header
    /// dumps preserved in its `.meta/*.jsonlines` files.
    Nifti2Dicom {
        /// Directory containing the normalized `.nii.gz` volumes to convert.
        #[arg(long = "input_nifti")]
        input_nifti: PathBuf,
        /// Directory containing the `.meta/*.jsonlines` header dumps
        /// produced by the matching `convert` run.
        #[arg(long)]
        meta: PathBuf,
        /// Directory the reconstructed DICOM instances are written to.
        #[arg(long = "output_dicom")]
        output_dicom: PathBuf,
    },
    /// Uploads a converted study to the configured collection endpoint.
    Upload {
        /// Study directory to upload, named by its study identifier.
        #[arg(long)]
        study: PathBuf,
    },
    /// Emits a summary report of classification results over an archived
    /// tree.
    Report {
        /// Root of a previously classified archive.
        #[arg(long = "archive_dir")]
        archive_dir: PathBuf,
        /// Path the report is written to.
        #[arg(long)]
        output: PathBuf,
    },
}
