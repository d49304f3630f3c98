//! Configuration for the `archivist` binary.
//!
//! Grounded on `dcm_file_sort_service::config`'s `Paths`/`Other`/`Config`
//! shape and `TryFrom<Cli>` conversion. `tracing::Level` has no `Serialize`/
//! `Deserialize` impl of its own, so `Log::level` goes through
//! `serde_with`'s `DisplayFromStr`, the same way the teacher's config
//! generator round-trips it through `Level::from_str`/`Display`.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::cli::Cli;
use crate::Error;

/// Directories the archivist reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Paths {
    /// Root of the incoming DICOM tree.
    pub input_dir: PathBuf,
    /// Root under which classified DICOM instances are archived, one
    /// `<study>/<series>/` folder per series.
    pub archive_dir: PathBuf,
    /// Root under which decoded, normalized NIfTI volumes and their
    /// `.meta/*.jsonlines` header dumps are written, one `<study>/` folder
    /// per study.
    pub nifti_dir: PathBuf,
    /// Instances that fail to open as DICOM are copied here untouched.
    pub unknown_dir: PathBuf,
    /// Scratch directory the external decoder writes into and the
    /// normalizer runs against before the finished study folder is moved
    /// under `nifti_dir`.
    pub work_dir: PathBuf,
}

/// Reserved for future archive-layout variants; this system has one
/// canonical layout today, but the field mirrors the teacher's
/// `PathGenerators` so a second layout can be added without a config
/// migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PathGenerators {
    pub archive: ArchiveLayout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArchiveLayout {
    #[default]
    Canonical,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    #[serde_as(as = "DisplayFromStr")]
    pub level: tracing::Level,
}

impl Default for Log {
    fn default() -> Self {
        Log { level: tracing::Level::INFO }
    }
}

/// Worker-pool and timeout knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Processing {
    /// Number of parallel workers used for classification and per-study
    /// normalization. Bounded to [1, 8]; out-of-range values are clamped
    /// rather than rejected, since a config written for an 8-core box
    /// should still run sanely on a laptop.
    pub workers: usize,
}

impl Processing {
    pub const MIN_WORKERS: usize = 1;
    pub const MAX_WORKERS: usize = 8;

    pub fn clamped_workers(&self) -> usize {
        self.workers.clamp(Self::MIN_WORKERS, Self::MAX_WORKERS)
    }
}

impl Default for Processing {
    fn default() -> Self {
        Processing { workers: 4 }
    }
}

/// Location and timeout for the external DICOM-to-NIfTI decoder executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoder {
    /// Executable name or path, resolved via `PATH` if bare.
    pub executable: String,
    /// Maximum time allowed for a single series' conversion before it's
    /// killed and logged as failed.
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder { executable: "dcm2niix".to_string(), timeout: Duration::from_secs(300) }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    pub paths: Paths,
    #[serde(rename = "path_generators", default)]
    pub path_gens: PathGenerators,
    #[serde(default)]
    pub processing: Processing,
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub decoder: Decoder,
}

impl Config {
    /// Creates every configured directory if it doesn't already exist.
    pub fn create_dirs(&self) -> std::io::Result<()> {
        for dir in
            [&self.paths.input_dir, &self.paths.archive_dir, &self.paths.nifti_dir, &self.paths.unknown_dir, &self.paths.work_dir]
        {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }
        Ok(())
    }

    /// Applies the `convert` subcommand's path overrides on top of the
    /// loaded config, the same precedence `--work` gets in
    /// [`TryFrom<Cli>`](Config::try_from).
    pub fn apply_convert_overrides(&mut self, input_dicom: PathBuf, output_dicom: Option<PathBuf>, output_nifti: Option<PathBuf>) {
        self.paths.input_dir = input_dicom;
        if let Some(output_dicom) = output_dicom {
            self.paths.archive_dir = output_dicom;
        }
        if let Some(output_nifti) = output_nifti {
            self.paths.nifti_dir = output_nifti;
        }
    }
}

impl TryFrom<Cli> for Config {
    type Error = Error;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let config_content =
            std::fs::read_to_string(&cli.config).map_err(|source| Error::Config { path: cli.config.clone(), source })?;
        let mut config: Config =
            toml::from_str(&config_content).map_err(|source| Error::ConfigParse { path: cli.config.clone(), source })?;
        if let Some(workers) = cli.work {
            config.processing.workers = workers;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_clamps_worker_count_to_the_supported_range() {
        let processing = Processing { workers: 64 };
        assert_eq!(processing.clamped_workers(), Processing::MAX_WORKERS);
        let processing = Processing { workers: 0 };
        assert_eq!(processing.clamped_workers(), Processing::MIN_WORKERS);
    }

    #[test]
    fn log_level_round_trips_through_toml() {
        let log = Log { level: tracing::Level::DEBUG };
        let toml = toml::to_string(&log).unwrap();
        assert_eq!(toml.trim(), r#"level = "DEBUG""#);
        let parsed: Log = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, log);
    }
}
