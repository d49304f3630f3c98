//! Wraps the external DICOM-to-NIfTI decoder executable: a synchronous
//! process spawn that releases the worker thread for the duration of the
//! subprocess.
//!
//! Grounded on `rad_tools_common::system::which` for executable discovery.
//! The decoder itself (e.g. `dcm2niix`) is an external collaborator this
//! crate never parses output from beyond its exit status.

use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use rad_tools_common::system;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("decoder executable not found in PATH: {0}")]
    NotFound(#[from] system::Error),
    #[error("failed to spawn decoder process: {0}")]
    Spawn(std::io::Error),
    #[error("decoder exited with a non-zero status: {0}")]
    NonZeroExit(std::process::ExitStatus),
    #[error("decoder timed out after {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, Error>;

/// The poll interval used while waiting on the decoder subprocess.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Invokes an external DICOM-to-NIfTI decoder over a single series
/// directory, with a per-series timeout after which the worker kills the
/// subprocess and records a failure.
pub struct Decoder {
    executable: String,
    timeout: Duration,
}

impl Decoder {
    pub fn new(executable: impl Into<String>, timeout: Duration) -> Self {
        Decoder { executable: executable.into(), timeout }
    }

    /// Converts every DICOM instance under `series_dir` into NIfTI output
    /// written to `output_dir`, named after `output_stem`.
    pub fn convert_series(&self, series_dir: &Path, output_dir: &Path, output_stem: &str) -> Result<()> {
        system::which(&self.executable)?;
        std::fs::create_dir_all(output_dir).map_err(Error::Spawn)?;

        let mut child = Command::new(&self.executable)
            .arg("-o")
            .arg(output_dir)
            .arg("-f")
            .arg(output_stem)
            .arg("-z")
            .arg("y")
            .arg("-b")
            .arg("y")
            .arg(series_dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(Error::Spawn)?;

        self.wait_with_timeout(&mut child)
    }

    fn wait_with_timeout(&self, child: &mut Child) -> Result<()> {
        let start = Instant::now();
        loop {
            if let Some(status) = child.try_wait().map_err(Error::Spawn)? {
                return if status.success() { Ok(()) } else { Err(Error::NonZeroExit(status)) };
            }
            if start.elapsed() >= self.timeout {
                warn!(timeout = ?self.timeout, "decoder exceeded its per-series timeout; killing");
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::Timeout(self.timeout));
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_executable_is_reported_before_spawning() {
        let decoder = Decoder::new("definitely-not-a-real-decoder-binary", Duration::from_secs(1));
        let dir = tempfile::tempdir().unwrap();
        let result = decoder.convert_series(dir.path(), dir.path(), "out");
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
