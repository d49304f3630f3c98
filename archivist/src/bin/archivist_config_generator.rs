//! Interactive generator for `archivist`'s `config.toml`.
//!
//! Grounded on `dcm_file_sort_service/src/bin/dcm_file_sort_config_generator.rs`,
//! generalized to the archivist's five configured directories and decoder
//! settings; prompts reuse `rad_tools_core::cli::ask_question`/
//! `ask_question_with_default` instead of duplicating them locally.

use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use rad_archivist::Config;
use rad_tools_core::cli::{ask_question, ask_question_with_default};
use tracing::Level;

/// A command line interface (CLI) application to generate a configuration
/// file used by `archivist`.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = "Generates a configuration file used by the archivist binary.")]
struct Cli {
    /// Path where the config file is written.
    #[arg(short, long, default_value = "config.toml")]
    pub output: String,
    /// Interactive mode: prompt for every setting instead of writing defaults.
    #[arg(short, long, default_value_t = false)]
    interactive: bool,
}

fn main() {
    let cli = Cli::parse();

    let mut config = Config::default();
    if cli.interactive {
        config.paths.input_dir = PathBuf::from(ask_question("Input directory (unsorted DICOM tree)"));
        config.paths.archive_dir = PathBuf::from(ask_question("Archive directory (classified DICOM output)"));
        config.paths.nifti_dir = PathBuf::from(ask_question("NIfTI output directory"));
        config.paths.unknown_dir = PathBuf::from(ask_question("Directory for data that couldn't be processed"));
        config.paths.work_dir = PathBuf::from(ask_question("Scratch directory for decoder output"));

        config.processing.workers = ask_question_with_default("Worker count", "4").parse::<usize>().unwrap_or(4);

        config.log.level =
            Level::from_str(ask_question_with_default("Log level", "info").as_str()).expect("failed to parse log level");

        config.decoder.executable = ask_question_with_default("Decoder executable", "dcm2niix");
        let timeout_secs = ask_question_with_default("Decoder timeout in seconds", "300").parse::<u64>().unwrap_or(300);
        config.decoder.timeout = Duration::from_secs(timeout_secs);
    }

    let s = toml::to_string_pretty(&config).expect("failed to serialize config");
    let mut file = std::fs::File::create(&cli.output).expect("failed to create output file");
    file.write_all(s.as_bytes()).expect("failed to write to output file");
}
