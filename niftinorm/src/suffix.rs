//! Suffix normalization for decoder-produced NIfTI filenames.
//!
//! Grounded on `ProcessingStrategy.rename_file`/`rename_file_suffix`/
//! `rename_file_only` in `convert/convert_nifti_postprocess.py`. The
//! original matches disambiguating suffix letters with lookaround regexes
//! (`(?<!e)ADC`, `(?<![a-z])([a-z]{0,2}?)`); the `regex` crate has no
//! lookaround support, so matching and suffix-splitting are done with plain
//! string inspection instead of a second regex.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{sidecar_path, Error, Family, Result};

/// Maps a disambiguating suffix letter to its ordinal position. `'a'` is 2,
/// not 1 -- the bare, unlettered file is implicitly "_1" and keeps no
/// numeric suffix at all (see the suffix-numbering decision in DESIGN.md).
fn suffix_ordinal(letter: char) -> u32 {
    letter as u32 - 95
}

/// Splits a stem like `"DWI1000b"` into its base token and trailing
/// lowercase-letter suffix (0-2 ASCII letters), mirroring the greedy-but-
/// minimal `[a-z]{0,2}?` group in the original pattern.
fn split_trailing_suffix(stem: &str) -> (&str, &str) {
    let letters_start = stem.char_indices().rev().take_while(|(_, c)| c.is_ascii_lowercase()).last().map(|(i, _)| i);
    match letters_start {
        Some(i) if stem.len() - i <= 2 => (&stem[..i], &stem[i..]),
        _ => (stem, ""),
    }
}

/// T1/T2 variant of [`split_trailing_suffix`]: the orientation token
/// (`AXI`/`COR`/`SAG`, optionally followed by a single `r` for a
/// reformatted slice) sits between the base stem and the disambiguator, so
/// it must be preserved rather than swallowed as part of the suffix.
fn split_oriented_suffix(stem: &str) -> Option<(&str, &str)> {
    let upper = stem.to_ascii_uppercase();
    let mut best: Option<(usize, usize)> = None;
    for token in ["AXI", "COR", "SAG"] {
        if let Some(pos) = upper.rfind(token) {
            let mut token_len = token.len();
            if stem.as_bytes().get(pos + token_len) == Some(&b'r') {
                token_len += 1;
            }
            if best.is_none_or(|(best_pos, _)| pos > best_pos) {
                best = Some((pos, token_len));
            }
        }
    }
    let (pos, token_len) = best?;
    let split_at = pos + token_len;
    let trailing = &stem[split_at..];
    (trailing.len() <= 1 && trailing.chars().all(|c| c.is_ascii_lowercase())).then_some((&stem[..split_at], trailing))
}

/// Normalizes the set of NIfTI files belonging to one family within a
/// study's output directory.
pub trait SuffixNormalizer {
    fn family(&self) -> Family;

    /// Whether `stem` (the filename without its `.nii.gz` extension)
    /// belongs to this family.
    fn matches(&self, stem: &str) -> bool;

    /// Renames a file given more than one sibling matched: an unlettered
    /// file is left as the canonical name (the implicit "_1"), lettered
    /// ones are renumbered via [`suffix_ordinal`]. Returns whether a rename
    /// happened. T1/T2 override this to keep the orientation token ahead of
    /// the numeric suffix.
    fn rename_with_suffix(&self, path: &Path) -> Result<bool> {
        let stem = stem_of(path);
        let (base, letters) = split_trailing_suffix(&stem);
        if letters.is_empty() {
            return Ok(false);
        }
        let ordinal = suffix_ordinal(letters.chars().next().unwrap());
        rename_stem(path, &format!("{base}_{ordinal}"))
    }

    /// Renames every matching file in `dir` to its normalized name. Returns
    /// the number of files renamed.
    fn normalize(&self, dir: &Path) -> Result<usize> {
        let mut matches = collect_matches(dir, |s| self.matches(s))?;
        matches.sort();
        let mut count = 0;
        if matches.len() <= 1 {
            for path in &matches {
                if rename_to_bare_stem(path)? {
                    count += 1;
                }
            }
            return Ok(count);
        }
        for path in &matches {
            if self.rename_with_suffix(path)? {
                count += 1;
            }
        }
        Ok(count)
    }
}

fn stem_of(path: &Path) -> String {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    crate::nifti_stem(file_name).to_owned()
}

fn collect_matches(dir: &Path, predicate: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    let entries = fs::read_dir(dir).map_err(|source| Error::Io { path: dir.to_path_buf(), source })?;
    for entry in entries {
        let entry = entry.map_err(|source| Error::Io { path: dir.to_path_buf(), source })?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else { continue };
        if !name.ends_with(".nii.gz") {
            continue;
        }
        if predicate(crate::nifti_stem(name)) {
            out.push(path);
        }
    }
    Ok(out)
}

/// Renames `path` (and any sidecar sharing its stem) to `{new_stem}.nii.gz`.
fn rename_stem(path: &Path, new_stem: &str) -> Result<bool> {
    let new_path = path.with_file_name(format!("{new_stem}.nii.gz"));
    if new_path == path {
        return Ok(false);
    }
    fs::rename(path, &new_path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
    for ext in ["json", "bval", "bvec"] {
        let old_sidecar = sidecar_path(path, ext);
        if old_sidecar.exists() {
            let new_sidecar = sidecar_path(&new_path, ext);
            fs::rename(&old_sidecar, &new_sidecar).map_err(|source| Error::Io { path: old_sidecar, source })?;
        }
    }
    Ok(true)
}

fn rename_to_bare_stem(path: &Path) -> Result<bool> {
    let stem = stem_of(path);
    let (base, letters) = split_trailing_suffix(&stem);
    if letters.is_empty() {
        return Ok(false);
    }
    rename_stem(path, base)
}

/// DWI: matches any stem containing `DWI`.
pub struct DwiSuffixNormalizer;

impl SuffixNormalizer for DwiSuffixNormalizer {
    fn family(&self) -> Family {
        Family::Dwi
    }

    fn matches(&self, stem: &str) -> bool {
        stem.to_ascii_uppercase().contains("DWI")
    }
}

/// ADC: matches `ADC` but excludes `eADC`, mirroring the original's
/// negative lookbehind.
pub struct AdcSuffixNormalizer;

impl SuffixNormalizer for AdcSuffixNormalizer {
    fn family(&self) -> Family {
        Family::Adc
    }

    fn matches(&self, stem: &str) -> bool {
        contains_not_preceded_by(stem, "ADC", b'e')
    }
}

/// SWAN: matches `SWAN`, excludes `eSWAN`.
pub struct SwanSuffixNormalizer;

impl SuffixNormalizer for SwanSuffixNormalizer {
    fn family(&self) -> Family {
        Family::Swan
    }

    fn matches(&self, stem: &str) -> bool {
        contains_not_preceded_by(stem, "SWAN", b'e')
    }
}

fn contains_not_preceded_by(stem: &str, needle: &str, excluded_prefix: u8) -> bool {
    let upper = stem.to_ascii_uppercase();
    let Some(idx) = upper.find(needle) else { return false };
    !(idx > 0 && stem.as_bytes()[idx - 1] == excluded_prefix)
}

/// T1/T2 share a renaming scheme that preserves the orientation token
/// (`AXI`/`COR`/`SAG`, with an optional trailing `r` for reformatted
/// slices) ahead of the numeric disambiguator.
pub struct OrientedSuffixNormalizer {
    family: Family,
    token: &'static str,
}

impl OrientedSuffixNormalizer {
    pub fn t1() -> Self {
        OrientedSuffixNormalizer { family: Family::T1, token: "T1" }
    }

    pub fn t2() -> Self {
        OrientedSuffixNormalizer { family: Family::T2, token: "T2" }
    }
}

impl SuffixNormalizer for OrientedSuffixNormalizer {
    fn family(&self) -> Family {
        self.family
    }

    fn matches(&self, stem: &str) -> bool {
        stem.to_ascii_uppercase().contains(self.token)
    }

    fn rename_with_suffix(&self, path: &Path) -> Result<bool> {
        let stem = stem_of(path);
        let Some((base, letters)) = split_oriented_suffix(&stem) else {
            return Ok(false);
        };
        if letters.is_empty() {
            return Ok(false);
        }
        let ordinal = suffix_ordinal(letters.chars().next().unwrap());
        rename_stem(path, &format!("{base}_{ordinal}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn single_dwi_match_loses_its_letter_suffix() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "DWI1000a.nii.gz");
        DwiSuffixNormalizer.normalize(dir.path()).unwrap();
        assert!(dir.path().join("DWI1000.nii.gz").exists());
    }

    #[test]
    fn multiple_dwi_matches_renumber_from_two() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "DWI1000.nii.gz");
        touch(dir.path(), "DWI1000a.nii.gz");
        DwiSuffixNormalizer.normalize(dir.path()).unwrap();
        assert!(dir.path().join("DWI1000.nii.gz").exists());
        assert!(dir.path().join("DWI1000_2.nii.gz").exists());
    }

    #[test]
    fn adc_matcher_excludes_eadc() {
        assert!(AdcSuffixNormalizer.matches("ADC"));
        assert!(!AdcSuffixNormalizer.matches("eADC"));
    }

    #[test]
    fn oriented_normalizer_preserves_token_ahead_of_suffix() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "T1CUBECE_SAGr.nii.gz");
        touch(dir.path(), "T1CUBECE_SAGra.nii.gz");
        OrientedSuffixNormalizer::t1().normalize(dir.path()).unwrap();
        assert!(dir.path().join("T1CUBECE_SAGr.nii.gz").exists());
        assert!(dir.path().join("T1CUBECE_SAGr_2.nii.gz").exists());
    }
}
