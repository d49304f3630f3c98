//! Writes `.meta/*.jsonlines` header dumps: one JSON object per DICOM
//! instance, with PHI, instance-specific identifiers, and implementation-
//! class UIDs removed. These dumps are the contract the `nifti2dicom`
//! reverse path consumes; they are not themselves core output.
//!
//! Grounded on `dcm_data::io::rtstruct`/`rtdose`'s element-to-JSON-ish
//! extraction pattern, generalized here to a blanket tag-keyed dump instead
//! of a fixed struct, since header preservation needs every tag the decoder
//! didn't already consume rather than a known schema.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use dicom_core::Tag;
use dicom_object::InMemDicomObject;
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Tags stripped from every header dump. PHI (name, birth date, sex),
/// instance-specific identifiers (the three UID tags that must be
/// regenerated on reverse conversion, not replayed) and implementation-class
/// identifiers that only describe the writer that produced the original
/// file, not the acquisition itself.
pub const EXCLUDED_TAGS: &[Tag] = &[
    Tag(0x0010, 0x0010), // PatientName
    Tag(0x0010, 0x0020), // PatientID
    Tag(0x0010, 0x0030), // PatientBirthDate
    Tag(0x0010, 0x0040), // PatientSex
    Tag(0x0008, 0x0050), // AccessionNumber
    Tag(0x0008, 0x0080), // InstitutionName
    Tag(0x0008, 0x0090), // ReferringPhysicianName
    Tag(0x0008, 0x1070), // OperatorsName
    Tag(0x0020, 0x000D), // StudyInstanceUID
    Tag(0x0020, 0x000E), // SeriesInstanceUID
    Tag(0x0008, 0x0018), // SOPInstanceUID
    Tag(0x0002, 0x0012), // ImplementationClassUID
    Tag(0x0002, 0x0013), // ImplementationVersionName
];

/// Flattens one DICOM instance's data-set into a tag-keyed JSON object,
/// skipping [`EXCLUDED_TAGS`] and any element whose value can't be
/// represented as text (pixel data, sequences).
pub fn dump_instance(ds: &InMemDicomObject) -> Map<String, Value> {
    let mut entry = Map::new();
    for element in ds {
        let tag = element.header().tag;
        if EXCLUDED_TAGS.contains(&tag) {
            continue;
        }
        let key = format!("{:04X},{:04X}", tag.group(), tag.element());
        if let Ok(values) = element.to_multi_str() {
            let value = if values.len() == 1 {
                Value::String(values[0].trim_matches('\0').trim().to_owned())
            } else {
                Value::Array(values.iter().map(|s| Value::String(s.trim_matches('\0').trim().to_owned())).collect())
            };
            entry.insert(key, value);
        }
    }
    entry
}

/// Appends one series' worth of per-instance header dumps to
/// `<meta_dir>/<series_stem>.jsonlines`, one JSON object per line.
pub fn write_series_dump(meta_dir: &Path, series_stem: &str, instances: &[InMemDicomObject]) -> Result<()> {
    if instances.is_empty() {
        return Err(Error::EmptyHeaderDump);
    }
    std::fs::create_dir_all(meta_dir).map_err(|source| Error::Io { path: meta_dir.to_path_buf(), source })?;
    let path = meta_dir.join(format!("{series_stem}.jsonlines"));
    let mut file =
        OpenOptions::new().create(true).append(true).open(&path).map_err(|source| Error::Io { path: path.clone(), source })?;

    for ds in instances {
        let entry = dump_instance(ds);
        let line = serde_json::to_string(&Value::Object(entry))?;
        writeln!(file, "{line}").map_err(|source| Error::Io { path: path.clone(), source })?;
    }
    Ok(())
}

/// Reads a previously written `.jsonlines` dump back into per-instance
/// tag/value maps, the input the `nifti2dicom` reverse path replays against
/// a decoded NIfTI volume.
pub fn read_series_dump(path: &Path) -> Result<Vec<BTreeMap<String, Value>>> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::{DataElement, PrimitiveValue, VR};
    use dicom_dictionary_std::tags;

    fn sample_instance(patient_id: &str, modality: &str) -> InMemDicomObject {
        let mut obj = InMemDicomObject::new_empty();
        obj.put(DataElement::new(tags::PATIENT_ID, VR::LO, PrimitiveValue::from(patient_id)));
        obj.put(DataElement::new(tags::MODALITY, VR::CS, PrimitiveValue::from(modality)));
        obj
    }

    #[test]
    fn dump_excludes_phi_tags() {
        let ds = sample_instance("PAT001", "MR");
        let entry = dump_instance(&ds);
        assert!(!entry.contains_key("0010,0020"));
        assert_eq!(entry.get("0008,0060"), Some(&Value::String("MR".to_string())));
    }

    #[test]
    fn write_then_read_round_trips_surviving_tags() {
        let dir = tempfile::tempdir().unwrap();
        let instances = vec![sample_instance("PAT001", "MR"), sample_instance("PAT001", "MR")];
        write_series_dump(&dir.path().join(".meta"), "DWI1000", &instances).unwrap();

        let entries = read_series_dump(&dir.path().join(".meta").join("DWI1000.jsonlines")).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].get("0008,0060"), Some(&Value::String("MR".to_string())));
    }

    #[test]
    fn empty_series_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_series_dump(&dir.path().join(".meta"), "DWI1000", &[]);
        assert!(matches!(result, Err(Error::EmptyHeaderDump)));
    }
}
