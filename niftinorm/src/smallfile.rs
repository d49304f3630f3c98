//! Deletes derived NIfTI volumes too small to carry usable signal.
//!
//! Grounded on `ProcessingStrategy.del_file` in
//! `convert/convert_nifti_postprocess.py`: a family-specific byte threshold
//! (DWI 550KiB, ADC 100KiB, SWAN/T1/T2 800KiB) below which a volume is
//! assumed to be a near-empty derived/localizer series and is discarded
//! along with its JSON sidecar.

use std::fs;
use std::path::Path;

use crate::{sidecar_path, Error, Family, Result};

/// Byte threshold below which a family's NIfTI output is deleted.
pub fn threshold_bytes(family: Family) -> u64 {
    match family {
        Family::Dwi => 550 * 1024,
        Family::Adc => 100 * 1024,
        Family::Swan | Family::T1 | Family::T2 => 800 * 1024,
    }
}

/// Deletes `nifti_path` and its `.json` sidecar if its size is strictly
/// below the family's threshold. Returns whether the file was deleted.
pub fn delete_if_small(nifti_path: &Path, family: Family) -> Result<bool> {
    let metadata = fs::metadata(nifti_path).map_err(|source| Error::Io { path: nifti_path.to_path_buf(), source })?;
    if metadata.len() >= threshold_bytes(family) {
        return Ok(false);
    }

    fs::remove_file(nifti_path).map_err(|source| Error::Io { path: nifti_path.to_path_buf(), source })?;
    let sidecar = sidecar_path(nifti_path, "json");
    if sidecar.exists() {
        fs::remove_file(&sidecar).map_err(|source| Error::Io { path: sidecar, source })?;
    }
    tracing::debug!(path = %nifti_path.display(), bytes = metadata.len(), "deleted undersized series");
    Ok(true)
}

/// Removes every stray `.json` sidecar in `dir` that has no matching
/// `.nii.gz` companion, a pre-pass the orchestrator runs before any
/// family-specific processing (a NIfTI file can be deleted by one pass
/// while its sidecar is picked up by a later one; running this first avoids
/// that ordering dependency).
pub fn delete_orphan_json_sidecars(dir: &Path) -> Result<usize> {
    let mut removed = 0;
    let entries = fs::read_dir(dir).map_err(|source| Error::Io { path: dir.to_path_buf(), source })?;
    for entry in entries {
        let entry = entry.map_err(|source| Error::Io { path: dir.to_path_buf(), source })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let stem = crate::nifti_stem(path.file_stem().and_then(|s| s.to_str()).unwrap_or_default());
        let companion = path.with_file_name(format!("{stem}.nii.gz"));
        if !companion.exists() {
            fs::remove_file(&path).map_err(|source| Error::Io { path: path.clone(), source })?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn deletes_files_below_threshold_and_their_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let nii = dir.path().join("sub-01_ADC.nii.gz");
        let json = dir.path().join("sub-01_ADC.json");
        std::fs::File::create(&nii).unwrap().write_all(&[0u8; 1024]).unwrap();
        std::fs::File::create(&json).unwrap().write_all(b"{}").unwrap();

        let deleted = delete_if_small(&nii, Family::Adc).unwrap();
        assert!(deleted);
        assert!(!nii.exists());
        assert!(!json.exists());
    }

    #[test]
    fn keeps_files_at_or_above_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let nii = dir.path().join("sub-01_ADC.nii.gz");
        std::fs::File::create(&nii).unwrap().write_all(&vec![0u8; 200 * 1024]).unwrap();

        let deleted = delete_if_small(&nii, Family::Adc).unwrap();
        assert!(!deleted);
        assert!(nii.exists());
    }
}
