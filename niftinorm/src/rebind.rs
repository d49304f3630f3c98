//! ADC/DWI header repair and rebinding.
//!
//! Grounded on `ADCProcessingStrategy.update_header`/`rename_file` in
//! `convert/convert_nifti_postprocess.py`: the decoder sometimes emits an
//! ADC volume with a header that doesn't match its DWI b=0 sibling even
//! though both come from the same acquisition.
//!
//! Header repair runs first and unconditionally: every ADC file whose
//! voxel-grid shape matches a DWI0 sibling gets that sibling's pixdim and
//! affine copied into its header in place. Only after that does the ADC
//! count decide what happens next:
//! - single ADC: the filename is left to plain suffix normalization.
//! - multiple ADCs: each is paired to its DWI0 sibling by exact affine
//!   equality (meaningful now that repair has made matching pairs' affines
//!   agree), its voxel data rounded to the nearest integer and cast to
//!   i32, and the result saved under the DWI's filename with `DWI0`
//!   substituted for `ADC`.

use std::fs;
use std::path::{Path, PathBuf};

use ndarray::ArrayD;
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, NiftiVolume, ReaderOptions};

use crate::suffix::SuffixNormalizer;
use crate::{sidecar_path, Error, Result};

fn read(path: &Path) -> Result<nifti::InMemNiftiObject> {
    ReaderOptions::new()
        .read_file(path)
        .map_err(|source| Error::Nifti { path: path.to_path_buf(), source })
}

fn affine(header: &NiftiHeader) -> [[f32; 4]; 4] {
    [header.srow_x, header.srow_y, header.srow_z, [0.0, 0.0, 0.0, 1.0]]
}

/// Whether two NIfTI volumes share the same voxel grid shape, with no
/// opinion on their affine. This is the test header repair (spec.md §4.3
/// step 2) uses to decide which DWI sibling an ADC file's spatial fields
/// should be copied from -- before that copy happens the two affines have
/// no reason to agree yet.
fn same_shape(a: &Path, b: &Path) -> Result<bool> {
    let obj_a = read(a)?;
    let obj_b = read(b)?;
    Ok(obj_a.volume().dim() == obj_b.volume().dim())
}

/// Whether two NIfTI files describe the same voxel grid in the same world
/// space: equal dimensions and an exactly equal affine. This is a stricter
/// test than approximate-equality on purpose -- the original only rebinds
/// siblings the decoder produced from the literal same source volume, where
/// the affine is bit-identical, not merely close. Affine equality here is
/// meaningful because header repair (`repair_adc_header`) already copied
/// the DWI's affine into any shape-matched ADC sibling before this runs.
pub fn same_grid(a: &Path, b: &Path) -> Result<bool> {
    let obj_a = read(a)?;
    let obj_b = read(b)?;
    if obj_a.volume().dim() != obj_b.volume().dim() {
        return Ok(false);
    }
    Ok(affine(obj_a.header()) == affine(obj_b.header()))
}

/// Builds a header carrying `dwi`'s voxel spacing and affine but otherwise
/// `adc`'s own fields (intent, description, datatype left as the ADC's).
fn header_with_dwi_spatial_fields(adc_header: &NiftiHeader, dwi_header: &NiftiHeader) -> NiftiHeader {
    let mut header = adc_header.clone();
    header.pixdim = dwi_header.pixdim;
    header.srow_x = dwi_header.srow_x;
    header.srow_y = dwi_header.srow_y;
    header.srow_z = dwi_header.srow_z;
    header.sform_code = dwi_header.sform_code;
    header.qform_code = dwi_header.qform_code;
    header
}

/// Copies `dwi_path`'s pixel dimensions and affine into `adc_path`'s header
/// in place, leaving the ADC voxel data untouched. Used for the single-ADC
/// case, where no filename rebinding happens (spec step 2/3).
pub fn repair_adc_header(adc_path: &Path, dwi_path: &Path) -> Result<()> {
    let dwi = read(dwi_path)?;
    let adc = read(adc_path)?;
    if adc.volume().dim() != dwi.volume().dim() {
        tracing::warn!(
            adc = %adc_path.display(),
            dwi = %dwi_path.display(),
            "skipping header repair: volume dimensions differ"
        );
        return Ok(());
    }

    let header = header_with_dwi_spatial_fields(adc.header(), dwi.header());
    let data: ArrayD<f32> = adc
        .into_volume()
        .into_ndarray()
        .map_err(|source| Error::Nifti { path: adc_path.to_path_buf(), source })?;

    WriterOptions::new(adc_path)
        .reference_header(&header)
        .write_nifti(&data)
        .map_err(|source| Error::Nifti { path: adc_path.to_path_buf(), source })
}

/// Rounds `adc_path`'s voxel data to the nearest integer, casts to signed
/// 32-bit, and saves it under `new_path` using `dwi_header`'s pixdim/affine
/// and `adc_header`'s other fields. `adc_path` itself is left on disk for
/// the caller to delete once the new file is in place.
fn write_rounded_rebind(adc_path: &Path, new_path: &Path, adc_header: &NiftiHeader, dwi_header: &NiftiHeader) -> Result<()> {
    let adc = read(adc_path)?;
    let data: ArrayD<f32> = adc
        .into_volume()
        .into_ndarray()
        .map_err(|source| Error::Nifti { path: adc_path.to_path_buf(), source })?;
    let rounded: ArrayD<i32> = data.mapv(|v| v.round() as i32);

    let header = header_with_dwi_spatial_fields(adc_header, dwi_header);
    WriterOptions::new(new_path)
        .reference_header(&header)
        .write_nifti(&rounded)
        .map_err(|source| Error::Nifti { path: new_path.to_path_buf(), source })
}

/// Finds every `DWI0` volume in `dir` and repairs every shape-matched ADC
/// sibling's header unconditionally (spec.md §4.3 step 2, `update_header`
/// in the original: this always runs, regardless of ADC count, and it is
/// what makes a decoder-emitted ADC's affine agree with its DWI sibling's
/// in the first place). Only then does the ADC count decide what happens
/// next: a single survivor is left for plain suffix normalization (step 3);
/// two or more are paired to their now-affine-matched DWI sibling and
/// rebound onto its filename (step 4). ADC files with no shape- or
/// affine-matched sibling are left untouched at whichever step they fail.
pub fn rebind_adc_to_dwi_siblings(dir: &Path) -> Result<usize> {
    let dwi_candidates = candidates(dir, |stem| stem.to_ascii_uppercase().contains("DWI0"))?;
    let mut adc_candidates = candidates(dir, |stem| crate::suffix::AdcSuffixNormalizer.matches(stem))?;
    adc_candidates.sort();

    for adc_path in &adc_candidates {
        for dwi_path in &dwi_candidates {
            if same_shape(adc_path, dwi_path)? {
                repair_adc_header(adc_path, dwi_path)?;
            }
        }
    }

    if adc_candidates.len() <= 1 {
        return Ok(adc_candidates.len());
    }

    let mut rebound = 0;
    for adc_path in &adc_candidates {
        for dwi_path in &dwi_candidates {
            if !same_grid(adc_path, dwi_path)? {
                continue;
            }
            rebind_one(adc_path, dwi_path)?;
            rebound += 1;
            break;
        }
    }
    Ok(rebound)
}

fn candidates(dir: &Path, predicate: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    let entries = fs::read_dir(dir).map_err(|source| Error::Io { path: dir.to_path_buf(), source })?;
    for entry in entries {
        let entry = entry.map_err(|source| Error::Io { path: dir.to_path_buf(), source })?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else { continue };
        if name.ends_with(".nii.gz") && predicate(crate::nifti_stem(name)) {
            out.push(path);
        }
    }
    Ok(out)
}

/// Rebinds one ADC candidate to its matched DWI sibling: rounds the ADC
/// voxel data to i32, saves it under the DWI's filename with `DWI0`
/// substituted for `ADC`, deletes the original ADC file, and carries its
/// `.bval`/`.bvec` sidecars (renamed, not copied -- the ADC owns no
/// gradient table of its own, it inherits the DWI's).
fn rebind_one(adc_path: &Path, dwi_path: &Path) -> Result<()> {
    let adc_header = read(adc_path)?.header().clone();
    let dwi_header = read(dwi_path)?.header().clone();

    let dwi_name = dwi_path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let new_name = dwi_name.replacen("DWI0", "ADC", 1);
    let new_path = adc_path.with_file_name(new_name);

    write_rounded_rebind(adc_path, &new_path, &adc_header, &dwi_header)?;
    if new_path != adc_path {
        fs::remove_file(adc_path).map_err(|source| Error::Io { path: adc_path.to_path_buf(), source })?;
    }

    for ext in ["bval", "bvec"] {
        let old_sidecar = sidecar_path(adc_path, ext);
        if old_sidecar.exists() {
            let new_sidecar = sidecar_path(&new_path, ext);
            fs::rename(&old_sidecar, &new_sidecar).map_err(|source| Error::Io { path: old_sidecar, source })?;
        } else {
            let dwi_sidecar = sidecar_path(dwi_path, ext);
            if dwi_sidecar.exists() {
                let new_sidecar = sidecar_path(&new_path, ext);
                fs::copy(&dwi_sidecar, &new_sidecar).map_err(|source| Error::Io { path: dwi_sidecar, source })?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn dwi0_to_adc_filename_substitution_keeps_the_rest_of_the_name() {
        let new_name = "sub-01_DWI0.nii.gz".replacen("DWI0", "ADC", 1);
        assert_eq!(new_name, "sub-01_ADC.nii.gz");
    }

    #[test]
    fn dwi0_to_adc_preserves_a_trailing_numeric_suffix() {
        let new_name = "DWI0_2.nii.gz".replacen("DWI0", "ADC", 1);
        assert_eq!(new_name, "ADC_2.nii.gz");
    }
}
