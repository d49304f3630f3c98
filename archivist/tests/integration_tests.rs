//! End-to-end coverage for the subcommands that don't depend on an external
//! decoder executable (`upload`, `report`), run against the real binary via
//! `assert_cmd`. `convert`/`nifti2dicom` are exercised at the unit level
//! inside their owning modules since they need either `dcm2niix` on PATH or
//! hand-built `.meta/*.jsonlines` fixtures.

use std::fs;

use assert_cmd::Command;

fn archivist_config(dir: &std::path::Path) -> std::path::PathBuf {
    let config_path = dir.join("config.toml");
    let config = format!(
        r#"
[paths]
input_dir = {input:?}
archive_dir = {archive:?}
nifti_dir = {nifti:?}
unknown_dir = {unknown:?}
work_dir = {work:?}
"#,
        input = dir.join("input"),
        archive = dir.join("archive"),
        nifti = dir.join("nifti"),
        unknown = dir.join("unknown"),
        work = dir.join("work"),
    );
    fs::write(&config_path, config).unwrap();
    config_path
}

#[test]
fn upload_rejects_a_missing_study_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = archivist_config(dir.path());

    Command::cargo_bin("archivist")
        .unwrap()
        .arg("--config")
        .arg(&config_path)
        .arg("upload")
        .arg("--study")
        .arg(dir.path().join("does-not-exist"))
        .assert()
        .failure();
}

#[test]
fn upload_accepts_an_existing_study_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = archivist_config(dir.path());
    let study = dir.path().join("study-001");
    fs::create_dir_all(study.join("DWI1000")).unwrap();
    fs::create_dir_all(study.join("ADC")).unwrap();

    Command::cargo_bin("archivist")
        .unwrap()
        .arg("--config")
        .arg(&config_path)
        .arg("upload")
        .arg("--study")
        .arg(&study)
        .assert()
        .success();
}

#[test]
fn report_summarizes_series_counts_across_an_archived_tree() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = archivist_config(dir.path());

    let archive_dir = dir.path().join("archive");
    let series_dir = archive_dir.join("study-001").join("DWI1000");
    fs::create_dir_all(&series_dir).unwrap();
    fs::write(series_dir.join("instance1.dcm"), b"fake").unwrap();
    fs::write(series_dir.join("instance2.dcm"), b"fake").unwrap();

    let output = dir.path().join("report.json");

    Command::cargo_bin("archivist")
        .unwrap()
        .arg("--config")
        .arg(&config_path)
        .arg("report")
        .arg("--archive_dir")
        .arg(&archive_dir)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(report["studies"]["study-001"]["DWI1000"], 2);
}
