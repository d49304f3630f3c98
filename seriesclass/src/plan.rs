//! Study identification and the final archival rename plan.
//!
//! Grounded on `convert/dicom_tags.py`'s study-folder naming and
//! `convert/dicom_to_nifti.py`'s per-series output layout: a study is
//! identified by patient, date, modality and accession number, and each
//! series is archived under `<study>/<verdict stem>/`.

use std::path::{Path, PathBuf};

use dicom_core::Tag;

use crate::lookup::TagLookup;
use crate::verdict::SeriesVerdict;

pub const PATIENT_ID: Tag = Tag(0x0010, 0x0020);
pub const STUDY_DATE: Tag = Tag(0x0008, 0x0020);
pub const ACCESSION_NUMBER: Tag = Tag(0x0008, 0x0050);

/// A stable identifier for the study a series belongs to, built from
/// PatientID, StudyDate, Modality and AccessionNumber. Any missing part
/// makes the identifier indeterminate, since the remaining three fields do
/// not reliably disambiguate studies on their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StudyId(String);

impl StudyId {
    /// Builds a study identifier from a dataset, or `None` if any of the
    /// four required fields is absent.
    pub fn from_dataset(ds: &dyn TagLookup) -> Option<StudyId> {
        let patient_id = ds.get_str(PATIENT_ID).filter(|s| !s.trim().is_empty());
        let study_date = ds.get_str(STUDY_DATE).filter(|s| !s.trim().is_empty());
        let modality = ds.get_str(crate::extract::MODALITY).filter(|s| !s.trim().is_empty());
        let accession = ds.get_str(ACCESSION_NUMBER).filter(|s| !s.trim().is_empty());

        match (patient_id, study_date, modality, accession) {
            (Some(patient_id), Some(study_date), Some(modality), Some(accession)) => {
                Some(StudyId(format!("{patient_id}_{study_date}_{modality}_{accession}")))
            }
            _ => {
                tracing::warn!("incomplete study identity; series cannot be grouped by study");
                None
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StudyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a single DICOM instance lands after classification: the study
/// folder named by [`StudyId`], a series sub-folder named by the verdict's
/// stem, and the original instance filename (never invented).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub source_path: PathBuf,
    pub study_folder: String,
    pub series_folder: &'static str,
    pub instance_filename: String,
}

impl RenamePlan {
    pub fn new(source_path: impl Into<PathBuf>, study: &StudyId, verdict: SeriesVerdict) -> Option<RenamePlan> {
        let source_path = source_path.into();
        let instance_filename = source_path.file_name()?.to_str()?.to_owned();
        Some(RenamePlan {
            source_path,
            study_folder: study.as_str().to_owned(),
            series_folder: verdict.stem(),
            instance_filename,
        })
    }

    /// The destination path relative to the archive root.
    pub fn destination(&self) -> PathBuf {
        Path::new(&self.study_folder).join(self.series_folder).join(&self.instance_filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::MODALITY;
    use crate::lookup::fixture::FakeDataset;
    use crate::lookup::TagValue;

    #[test]
    fn study_id_combines_the_four_fields() {
        let ds = FakeDataset::default()
            .with(PATIENT_ID, TagValue::Str("PAT001".into()))
            .with(STUDY_DATE, TagValue::Str("20240102".into()))
            .with(MODALITY, TagValue::Str("MR".into()))
            .with(ACCESSION_NUMBER, TagValue::Str("ACC42".into()));
        let id = StudyId::from_dataset(&ds).expect("complete study identity");
        assert_eq!(id.as_str(), "PAT001_20240102_MR_ACC42");
    }

    #[test]
    fn study_id_is_none_when_accession_missing() {
        let ds = FakeDataset::default()
            .with(PATIENT_ID, TagValue::Str("PAT001".into()))
            .with(STUDY_DATE, TagValue::Str("20240102".into()))
            .with(MODALITY, TagValue::Str("MR".into()));
        assert!(StudyId::from_dataset(&ds).is_none());
    }

    #[test]
    fn rename_plan_keeps_the_original_instance_filename() {
        let study = StudyId("PAT001_20240102_MR_ACC42".into());
        let plan = RenamePlan::new("/incoming/IM0001.dcm", &study, SeriesVerdict::Dwi1000).unwrap();
        assert_eq!(plan.instance_filename, "IM0001.dcm");
        assert_eq!(
            plan.destination(),
            PathBuf::from("PAT001_20240102_MR_ACC42/DWI1000/IM0001.dcm")
        );
    }
}
