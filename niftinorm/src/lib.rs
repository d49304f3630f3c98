//! Post-conversion normalization of NIfTI output produced by the external
//! DICOM-to-NIfTI decoder: pruning undersized derived volumes, collapsing
//! the decoder's disambiguating filename suffixes into the canonical
//! naming scheme, and repairing ADC headers against their DWI sibling.
//!
//! Grounded on `convert/convert_nifti_postprocess.py`'s `ProcessingStrategy`
//! hierarchy and `PostProcessManager`.

pub mod orchestrate;
pub mod rebind;
pub mod smallfile;
pub mod suffix;

pub use orchestrate::PostProcessManager;

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("NIfTI error at {path}: {source}")]
    Nifti { path: PathBuf, source: nifti::error::NiftiError },
}

pub type Result<T> = std::result::Result<T, Error>;

/// The five post-conversion families, processed in this fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Dwi,
    Adc,
    Swan,
    T1,
    T2,
}

impl Family {
    pub const ORDER: [Family; 5] = [Family::Dwi, Family::Adc, Family::Swan, Family::T1, Family::T2];
}

/// Strips a `.nii.gz`/`.nii` extension and returns the bare stem, since
/// `Path::file_stem` only strips one extension component.
pub(crate) fn nifti_stem(name: &str) -> &str {
    name.strip_suffix(".nii.gz").or_else(|| name.strip_suffix(".nii")).unwrap_or(name)
}

/// The JSON sidecar BIDS produces alongside a NIfTI file shares its stem.
pub(crate) fn sidecar_path(nifti_path: &std::path::Path, extension: &str) -> PathBuf {
    let file_name = nifti_path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let stem = nifti_stem(file_name);
    nifti_path.with_file_name(format!("{stem}.{extension}"))
}
