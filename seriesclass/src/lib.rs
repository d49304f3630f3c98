//! Classifies DICOM series into a canonical rename token by combining
//! attribute extraction, pattern-matching strategies and a fixed-order
//! dispatcher, then builds the archival [`plan::RenamePlan`] for each
//! instance.
//!
//! This crate is intentionally decoupled from DICOM file I/O: it operates
//! over the [`lookup::TagLookup`] trait, which `archivist` implements for
//! `dicom_object::InMemDicomObject`.

pub mod attrs;
pub mod dispatch;
pub mod extract;
pub mod lookup;
pub mod plan;
pub mod strategy;
pub mod verdict;

pub use dispatch::Dispatcher;
pub use lookup::{TagLookup, TagValue};
pub use plan::{RenamePlan, StudyId};
pub use verdict::SeriesVerdict;

/// Classifies a dataset and builds its rename plan in one call, the
/// composition `archivist`'s orchestrator uses for every instance it walks.
pub fn classify_and_plan(
    ds: &dyn TagLookup,
    source_path: impl Into<std::path::PathBuf>,
    dispatcher: &Dispatcher,
) -> Option<RenamePlan> {
    let study = StudyId::from_dataset(ds)?;
    let verdict = dispatcher.classify(ds);
    RenamePlan::new(source_path, &study, verdict)
}
