//! Ties classification, archiving, decoding and normalization into the
//! `convert` subcommand's pipeline.
//!
//! Grounded on `dcm_file_sort_service::run_service`'s walk/classify/copy
//! shape and its `ServiceState` cooperative-stop pattern: a stop signal is
//! implemented by refusing to submit further work units to the pool and
//! waiting for in-flight units to drain. Classification runs in parallel
//! over instances, normalization runs in parallel over study folders but
//! strictly sequential within one, matching `rayon`'s data-parallel
//! iterators rather than a custom thread pool.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use dicom_object::InMemDicomObject;
use rad_archivist_niftinorm::PostProcessManager;
use rad_archivist_seriesclass::{classify_and_plan, Dispatcher, RenamePlan};
use rad_tools_common::fs::{DefaultUniquePathGenerator, UniquePathGenerator};
use rayon::prelude::*;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::decoder::Decoder;
use crate::tagmap::DicomObjectLookup;
use crate::{Config, Error, Result};

/// Cooperative stop signal shared between the `convert` entry point and the
/// in-flight worker pool.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum ServiceState {
    Running,
    RequestToStop,
    Stopped,
}

/// Installs a `Ctrl-C` handler that flips `state` to `RequestToStop`,
/// letting in-flight classification and normalization work finish instead of
/// being killed mid-write.
pub fn install_stop_handler(state: Arc<RwLock<ServiceState>>) -> std::result::Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        info!("stop requested; draining in-flight work");
        if let Ok(mut inner) = state.write() {
            *inner = ServiceState::RequestToStop;
        }
    })
}

fn should_stop(state: &RwLock<ServiceState>) -> bool {
    state.try_read().map(|inner| *inner != ServiceState::Running).unwrap_or(false)
}

type SeriesGroup = Vec<(RenamePlan, InMemDicomObject)>;
type StudyGroup = HashMap<&'static str, SeriesGroup>;

/// Runs the full `convert` pipeline against `config`, stopping early (but
/// letting in-flight studies finish) if `state` is flipped away from
/// `Running`.
pub fn run_convert(config: &Config, state: Arc<RwLock<ServiceState>>) -> Result<()> {
    config.create_dirs().map_err(|source| Error::Io { path: config.paths.input_dir.clone(), source })?;

    let pool = rayon::ThreadPoolBuilder::new().num_threads(config.processing.clamped_workers()).build()?;
    let dispatcher = Dispatcher::new();
    let decoder = Decoder::new(config.decoder.executable.clone(), config.decoder.timeout);

    pool.install(|| {
        let studies = classify_tree(config, &dispatcher, &state);
        info!(studies = studies.len(), "classification complete; starting per-study archiving and decoding");

        studies.into_par_iter().for_each(|(study, series)| {
            if should_stop(&state) {
                debug!(study, "skipping study: stop requested");
                return;
            }
            if let Err(e) = process_study(config, &decoder, &study, series) {
                error!(study, error = %e, "study failed; remaining studies proceed");
            }
        });
    });

    if should_stop(&state) {
        if let Ok(mut inner) = state.write() {
            *inner = ServiceState::Stopped;
        }
    }
    Ok(())
}

/// Walks `config.paths.input_dir`, classifies every DICOM instance in
/// parallel, and groups the resulting rename plans by study and series.
/// Files that can't be opened as DICOM are copied to `unknown_dir`
/// untouched; files that open but can't be classified or identified with a
/// study are skipped in place rather than aborting the whole run.
fn classify_tree(config: &Config, dispatcher: &Dispatcher, state: &RwLock<ServiceState>) -> HashMap<String, StudyGroup> {
    let entries: Vec<PathBuf> = WalkDir::new(&config.paths.input_dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() => Some(entry.into_path()),
            Ok(_) => None,
            Err(e) => {
                error!(error = %e, "failed to traverse directory entry");
                None
            }
        })
        .collect();

    let classified: Vec<(RenamePlan, InMemDicomObject)> = entries
        .into_par_iter()
        .filter_map(|path| {
            if should_stop(state) {
                return None;
            }
            classify_instance(config, dispatcher, &path)
        })
        .collect();

    let mut studies: HashMap<String, StudyGroup> = HashMap::new();
    for (plan, ds) in classified {
        studies.entry(plan.study_folder.clone()).or_default().entry(plan.series_folder).or_default().push((plan, ds));
    }
    studies
}

/// Opens one DICOM file and classifies it, copying it to `unknown_dir` if it
/// can't be opened at all.
fn classify_instance(config: &Config, dispatcher: &Dispatcher, path: &Path) -> Option<(RenamePlan, InMemDicomObject)> {
    let object = match rad_tools_common::dicom::open_file(path) {
        Ok(object) => object,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "not a readable DICOM file; copying to unknown_dir");
            copy_to_unknown(config, path);
            return None;
        }
    };
    let dataset: &InMemDicomObject = &object;
    let lookup = DicomObjectLookup(dataset);

    match classify_and_plan(&lookup, path, dispatcher) {
        Some(plan) => Some((plan, object.into_inner())),
        None => {
            warn!(path = %path.display(), "incomplete study identity or filename; instance skipped");
            None
        }
    }
}

fn copy_to_unknown(config: &Config, path: &Path) {
    let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
        error!(path = %path.display(), "unknown file has no usable filename; leaving in place");
        return;
    };
    let extension = path.extension().and_then(|e| e.to_str());
    let generator = DefaultUniquePathGenerator {
        dir: config.paths.unknown_dir.clone(),
        name: std::ffi::OsStr::new(name),
        extension: extension.map(std::ffi::OsStr::new),
        limit: 1000,
    };
    match generator.get_unique_path() {
        Ok(dest) => {
            if let Err(e) = std::fs::copy(path, &dest) {
                error!(path = %path.display(), error = %e, "failed to copy unrecognized file to unknown_dir");
            }
        }
        Err(e) => error!(path = %path.display(), error = %e, "failed to find a unique path under unknown_dir"),
    }
}

/// Archives one study's classified instances under `archive_dir`, writes
/// its `.meta/*.jsonlines` header dumps, decodes each series to NIfTI, and
/// normalizes the decoded output before moving it under `nifti_dir`.
fn process_study(config: &Config, decoder: &Decoder, study: &str, series: StudyGroup) -> Result<()> {
    let work_study_dir = config.paths.work_dir.join(study);
    let meta_dir = work_study_dir.join(".meta");

    for (series_folder, instances) in &series {
        let series_dir = config.paths.archive_dir.join(study).join(series_folder);
        std::fs::create_dir_all(&series_dir).map_err(|source| Error::Io { path: series_dir.clone(), source })?;

        let mut datasets = Vec::with_capacity(instances.len());
        for (plan, dataset) in instances {
            let dest = config.paths.archive_dir.join(plan.destination());
            if let Err(e) = std::fs::copy(&plan.source_path, &dest) {
                error!(source = %plan.source_path.display(), dest = %dest.display(), error = %e, "failed to archive instance; sibling instances proceed");
                continue;
            }
            datasets.push(dataset.clone());
        }
        if datasets.is_empty() {
            warn!(study, series_folder, "no instance survived archiving; series skipped");
            continue;
        }
        crate::meta::write_series_dump(&meta_dir, series_folder, &datasets)?;

        if let Err(e) = decoder.convert_series(&series_dir, &work_study_dir, series_folder) {
            error!(study, series_folder, error = %e, "decoder failed for series; study proceeds");
        }
    }

    PostProcessManager::new().process_study(&work_study_dir)?;

    let final_dir = config.paths.nifti_dir.join(study);
    move_dir(&work_study_dir, &final_dir)?;
    Ok(())
}

/// Moves every entry of `src` into `dst`, falling back to copy-then-remove
/// when the two roots live on different filesystems (`rename` can't cross
/// them).
fn move_dir(src: &Path, dst: &Path) -> Result<()> {
    if !src.exists() {
        return Ok(());
    }
    std::fs::create_dir_all(dst).map_err(|source| Error::Io { path: dst.to_path_buf(), source })?;

    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|source| Error::WalkDir { path: src.to_path_buf(), source })?;
        let relative = entry.path().strip_prefix(src).expect("walked entry is under src");
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|source| Error::Io { path: target, source })?;
        } else {
            if let Err(e) = std::fs::rename(entry.path(), &target) {
                debug!(error = %e, "rename failed, falling back to copy");
                std::fs::copy(entry.path(), &target).map_err(|source| Error::Io { path: target.clone(), source })?;
            }
        }
    }
    std::fs::remove_dir_all(src).map_err(|source| Error::Io { path: src.to_path_buf(), source })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_stop_is_false_while_running() {
        let state = RwLock::new(ServiceState::Running);
        assert!(!should_stop(&state));
    }

    #[test]
    fn should_stop_is_true_once_requested() {
        let state = RwLock::new(ServiceState::RequestToStop);
        assert!(should_stop(&state));
    }

    #[test]
    fn move_dir_relocates_files_and_removes_the_source() {
        let root = tempfile::tempdir().unwrap();
        let src = root.path().join("work").join("study1");
        std::fs::create_dir_all(src.join("sub")).unwrap();
        std::fs::write(src.join("DWI1000.nii.gz"), b"data").unwrap();
        std::fs::write(src.join("sub").join("nested.txt"), b"nested").unwrap();

        let dst = root.path().join("nifti").join("study1");
        move_dir(&src, &dst).unwrap();

        assert!(!src.exists());
        assert!(dst.join("DWI1000.nii.gz").exists());
        assert!(dst.join("sub").join("nested.txt").exists());
    }
}
