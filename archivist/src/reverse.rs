//! The `nifti2dicom` subcommand: replays a `.meta/*.jsonlines` header dump
//! back into DICOM instances.
//!
//! This is deliberately plumbing-only: it does not invert classification,
//! and it cannot recover PixelData from a normalized NIfTI volume, since
//! the orientation and windowing decisions made by the original scanner
//! aren't part of the preserved header. What it rebuilds is every other
//! preserved element, written back with a generic long-string VR since the
//! dump itself is untyped JSON — round-tripping the exact original VR
//! isn't part of the contract.
//!
//! Grounded on `dcm_file_sort_service::lib`'s test fixture for building a
//! minimal `FileDicomObject` (`FileMetaTableBuilder` + `with_meta` +
//! `write_to_file`).

use std::collections::BTreeMap;
use std::path::Path;

use dicom_core::{DataElement, Tag, VR};
use dicom_dictionary_std::uids::MR_IMAGE_STORAGE;
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};
use serde_json::Value;
use tracing::info;

use crate::{Error, Result};

/// Parses a `"GGGG,EEEE"` header-dump key back into a [`Tag`].
fn parse_tag(key: &str) -> Option<Tag> {
    let (group, element) = key.split_once(',')?;
    let group = u16::from_str_radix(group, 16).ok()?;
    let element = u16::from_str_radix(element, 16).ok()?;
    Some(Tag(group, element))
}

/// Rebuilds one DICOM instance's data-set from its preserved tag/value map.
/// Every surviving value is written back as VR `LO`; the dump has already
/// discarded the original VR, so this is the closest honest approximation.
fn build_instance(entry: &BTreeMap<String, Value>) -> InMemDicomObject {
    let mut obj = InMemDicomObject::new_empty();
    for (key, value) in entry {
        let Some(tag) = parse_tag(key) else {
            continue;
        };
        match value {
            Value::String(s) => obj.put(DataElement::new(tag, VR::LO, dicom_core::PrimitiveValue::from(s.as_str()))),
            Value::Array(values) => {
                let strings: Vec<String> = values.iter().filter_map(|v| v.as_str().map(str::to_owned)).collect();
                if !strings.is_empty() {
                    obj.put(DataElement::new(tag, VR::LO, dicom_core::PrimitiveValue::from(strings)));
                }
            }
            _ => {}
        }
    }
    obj
}

/// Replays every `.jsonlines` dump under `meta_dir` into a DICOM instance
/// tree under `output_dicom`, one subdirectory per series stem.
pub fn run(meta_dir: &Path, output_dicom: &Path) -> Result<()> {
    let entries = std::fs::read_dir(meta_dir).map_err(|source| Error::Io { path: meta_dir.to_path_buf(), source })?;

    for entry in entries {
        let entry = entry.map_err(|source| Error::Io { path: meta_dir.to_path_buf(), source })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("jsonlines") {
            continue;
        }
        let series_stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("series").to_string();
        let instances = crate::meta::read_series_dump(&path)?;
        let series_dir = output_dicom.join(&series_stem);
        std::fs::create_dir_all(&series_dir).map_err(|source| Error::Io { path: series_dir.clone(), source })?;

        for (index, instance) in instances.iter().enumerate() {
            let dataset = build_instance(instance);
            let sop_class_uid = instance.get("0008,0016").and_then(|v| v.as_str()).unwrap_or(MR_IMAGE_STORAGE).to_string();

            let file_object = dataset
                .with_meta(
                    FileMetaTableBuilder::new()
                        .transfer_syntax(dicom_transfer_syntax_registry::default().erased().uid())
                        .media_storage_sop_class_uid(sop_class_uid),
                )
                .map_err(|e| Error::Reconstruct(e.to_string()))?;

            let dest = series_dir.join(format!("{index:04}.dcm"));
            file_object.write_to_file(&dest).map_err(|e| Error::Reconstruct(e.to_string()))?;
        }
        info!(series = series_stem, instances = instances.len(), "reconstructed series from header dump");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_tag_key() {
        assert_eq!(parse_tag("0008,0060"), Some(Tag(0x0008, 0x0060)));
        assert_eq!(parse_tag("not-a-tag"), None);
    }

    #[test]
    fn builds_an_instance_with_only_recognized_keys() {
        let mut entry = BTreeMap::new();
        entry.insert("0008,0060".to_string(), Value::String("MR".to_string()));
        entry.insert("garbage".to_string(), Value::String("ignored".to_string()));
        let obj = build_instance(&entry);
        assert_eq!(obj.element(Tag(0x0008, 0x0060)).unwrap().to_str().unwrap(), "MR");
    }

    #[test]
    fn round_trips_a_minimal_series_dump() {
        let dir = tempfile::tempdir().unwrap();
        let meta_dir = dir.path().join(".meta");
        std::fs::create_dir_all(&meta_dir).unwrap();

        let mut entry = serde_json::Map::new();
        entry.insert("0008,0060".to_string(), Value::String("MR".to_string()));
        std::fs::write(meta_dir.join("DWI1000.jsonlines"), format!("{}\n", Value::Object(entry))).unwrap();

        let output_dicom = dir.path().join("out");
        run(&meta_dir, &output_dicom).unwrap();

        assert!(output_dicom.join("DWI1000").join("0000.dcm").exists());
    }
}
