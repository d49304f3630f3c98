//! Ties the normalization passes together into the fixed per-study order.
//!
//! Grounded on `PostProcessManager` in
//! `convert/convert_nifti_postprocess.py`: orphan sidecar cleanup, then
//! small-file pruning and suffix normalization for DWI, ADC, SWAN, T1, T2 in
//! that order, with ADC/DWI rebinding running after ADC's own pass.

use std::path::Path;

use crate::rebind;
use crate::smallfile;
use crate::suffix::{AdcSuffixNormalizer, DwiSuffixNormalizer, OrientedSuffixNormalizer, SuffixNormalizer, SwanSuffixNormalizer};
use crate::{Error, Family, Result};

/// Runs the full normalization pipeline over one study's NIfTI output
/// directory, or over every immediate subdirectory if `root` contains
/// multiple studies.
pub struct PostProcessManager;

impl PostProcessManager {
    pub fn new() -> Self {
        PostProcessManager
    }

    /// Processes `root` as a single study folder.
    pub fn process_study(&self, study_dir: &Path) -> Result<()> {
        smallfile::delete_orphan_json_sidecars(study_dir)?;

        self.prune_and_normalize(study_dir, Family::Dwi, &DwiSuffixNormalizer)?;
        self.prune_adc_and_rebind(study_dir)?;
        self.prune_and_normalize(study_dir, Family::Swan, &SwanSuffixNormalizer)?;
        self.prune_and_normalize(study_dir, Family::T1, &OrientedSuffixNormalizer::t1())?;
        self.prune_and_normalize(study_dir, Family::T2, &OrientedSuffixNormalizer::t2())?;
        Ok(())
    }

    /// Processes every immediate subdirectory of `root` as its own study, or
    /// `root` itself if it directly contains NIfTI files.
    pub fn run(&self, root: &Path) -> Result<()> {
        let has_nifti_files = std::fs::read_dir(root)
            .map_err(|source| Error::Io { path: root.to_path_buf(), source })?
            .filter_map(std::result::Result::ok)
            .any(|entry| entry.path().extension().and_then(|e| e.to_str()) == Some("gz"));

        if has_nifti_files {
            return self.process_study(root);
        }

        for entry in std::fs::read_dir(root).map_err(|source| Error::Io { path: root.to_path_buf(), source })? {
            let entry = entry.map_err(|source| Error::Io { path: root.to_path_buf(), source })?;
            if entry.path().is_dir() {
                self.process_study(&entry.path())?;
            }
        }
        Ok(())
    }

    /// ADC gets its small-file pruning like every other family, but its
    /// suffix handling branches on how many ADC candidates survive pruning:
    /// a single survivor is plain-suffix-normalized; two or more skip
    /// suffix normalization entirely and are rebound onto their DWI0
    /// siblings' filenames instead (the rebind step assigns the final
    /// name, so running the ordinal suffix scheme first would just be
    /// overwritten). Either way, `rebind_adc_to_dwi_siblings` repairs every
    /// shape-matched ADC's header against its DWI sibling unconditionally
    /// before it looks at the count.
    fn prune_adc_and_rebind(&self, dir: &Path) -> Result<()> {
        let normalizer = AdcSuffixNormalizer;
        for entry in std::fs::read_dir(dir).map_err(|source| Error::Io { path: dir.to_path_buf(), source })? {
            let entry = entry.map_err(|source| Error::Io { path: dir.to_path_buf(), source })?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else { continue };
            if name.ends_with(".nii.gz") && normalizer.matches(crate::nifti_stem(name)) {
                smallfile::delete_if_small(&path, Family::Adc)?;
            }
        }

        let surviving = std::fs::read_dir(dir)
            .map_err(|source| Error::Io { path: dir.to_path_buf(), source })?
            .filter_map(std::result::Result::ok)
            .filter(|entry| {
                let path = entry.path();
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| name.ends_with(".nii.gz") && normalizer.matches(crate::nifti_stem(name)))
            })
            .count();

        if surviving <= 1 {
            normalizer.normalize(dir)?;
        }
        rebind::rebind_adc_to_dwi_siblings(dir)?;
        Ok(())
    }

    fn prune_and_normalize(&self, dir: &Path, family: Family, normalizer: &dyn SuffixNormalizer) -> Result<()> {
        for entry in std::fs::read_dir(dir).map_err(|source| Error::Io { path: dir.to_path_buf(), source })? {
            let entry = entry.map_err(|source| Error::Io { path: dir.to_path_buf(), source })?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else { continue };
            if !name.ends_with(".nii.gz") {
                continue;
            }
            if normalizer.matches(crate::nifti_stem(name)) {
                smallfile::delete_if_small(&path, family)?;
            }
        }
        normalizer.normalize(dir)?;
        Ok(())
    }
}

impl Default for PostProcessManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn process_study_prunes_then_normalizes_dwi() {
        let dir = tempfile::tempdir().unwrap();
        let small = dir.path().join("DWI1000a.nii.gz");
        File::create(&small).unwrap().write_all(&[0u8; 10]).unwrap();
        let big = dir.path().join("DWI1000.nii.gz");
        File::create(&big).unwrap().write_all(&vec![0u8; 600 * 1024]).unwrap();

        PostProcessManager::new().process_study(dir.path()).unwrap();

        assert!(!small.exists());
        assert!(big.exists());
    }
}
