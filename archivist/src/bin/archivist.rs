//! Entry point for the `archivist` binary: classifies a DICOM archive,
//! converts it to NIfTI, and offers the `nifti2dicom`/`upload`/`report`
//! companion subcommands.
//!
//! Grounded on `dcm_file_sort_service/src/bin/dcm_file_sort.rs`'s
//! parse-config-then-install-ctrlc-handler shape.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use clap::Parser;
use rad_archivist::cli::Command;
use rad_archivist::orchestrate::ServiceState;
use rad_archivist::{orchestrate, reverse, Cli, Config};
use rad_tools_common::get_log_level;
use tracing::{error, info};
use walkdir::WalkDir;

fn main() {
    let cli = Cli::parse();
    let level = get_log_level!(cli);
    tracing_subscriber::fmt().with_thread_ids(true).with_target(true).with_max_level(level).init();

    let mut config = match Config::try_from(cli.clone()) {
        Ok(config) => config,
        Err(e) => {
            error!("unable to build configuration: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Convert { input_dicom, output_dicom, output_nifti } => {
            config.apply_convert_overrides(input_dicom, output_dicom, output_nifti);
            run_convert(&config)
        }
        Command::Nifti2Dicom { input_nifti: _, meta, output_dicom } => reverse::run(&meta, &output_dicom).map_err(Into::into),
        Command::Upload { study } => run_upload(&study),
        Command::Report { archive_dir, output } => run_report(&archive_dir, &output),
    };

    if let Err(e) = result {
        error!("archivist failed: {e}");
        std::process::exit(1);
    }
}

fn run_convert(config: &Config) -> anyhow::Result<()> {
    let state = Arc::new(RwLock::new(ServiceState::Running));
    if let Err(e) = orchestrate::install_stop_handler(state.clone()) {
        error!("failed to install Ctrl-C handler: {e}; stop requests will be ignored");
    }
    info!("starting conversion; press Ctrl-C to request a graceful stop");
    orchestrate::run_convert(config, state)?;
    Ok(())
}

/// Validates that `study` looks like a completed archive folder and logs
/// what would be uploaded. Actually transmitting the study is outside this
/// crate's dependency stack; no upload client is fabricated to fill that
/// gap, so this subcommand stops at the boundary it's given.
fn run_upload(study: &std::path::Path) -> anyhow::Result<()> {
    if !study.is_dir() {
        anyhow::bail!("study directory {} does not exist", study.display());
    }
    let series_count = std::fs::read_dir(study)?.filter_map(|e| e.ok()).filter(|e| e.path().is_dir()).count();
    info!(study = %study.display(), series_count, "study validated and ready for upload; no upload endpoint is configured in this build");
    Ok(())
}

/// Emits a JSON summary of series verdicts found across an archived tree:
/// per-study series counts and a verdict-stem histogram.
fn run_report(archive_dir: &std::path::Path, output: &std::path::Path) -> anyhow::Result<()> {
    let mut per_study: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();

    for study_entry in std::fs::read_dir(archive_dir)?.filter_map(|e| e.ok()) {
        if !study_entry.path().is_dir() {
            continue;
        }
        let study_name = study_entry.file_name().to_string_lossy().into_owned();
        let mut series_counts = BTreeMap::new();
        for series_entry in std::fs::read_dir(study_entry.path())?.filter_map(|e| e.ok()) {
            if !series_entry.path().is_dir() {
                continue;
            }
            let series_name = series_entry.file_name().to_string_lossy().into_owned();
            let instance_count = WalkDir::new(series_entry.path()).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()).count();
            series_counts.insert(series_name, instance_count);
        }
        per_study.insert(study_name, series_counts);
    }

    let mut verdict_histogram: BTreeMap<String, usize> = BTreeMap::new();
    for series_counts in per_study.values() {
        for series in series_counts.keys() {
            *verdict_histogram.entry(series.clone()).or_insert(0) += 1;
        }
    }

    let report = meta_report(&per_study, &verdict_histogram);
    std::fs::write(output, serde_json::to_string_pretty(&report)?)?;
    info!(studies = per_study.len(), output = %output.display(), "wrote classification report");
    Ok(())
}

fn meta_report(
    per_study: &BTreeMap<String, BTreeMap<String, usize>>,
    verdict_histogram: &BTreeMap<String, usize>,
) -> serde_json::Value {
    serde_json::json!({
        "studies": per_study,
        "verdict_histogram": verdict_histogram,
    })
}
