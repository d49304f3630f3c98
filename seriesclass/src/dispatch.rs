//! Fixed-order dispatcher over the registered [`Strategy`] implementations.
//!
//! Grounded on `processing/dicom/dicom_processing_engine.py`'s strategy list:
//! strategies run in a fixed order and the first one to return a verdict
//! wins. Order matters because some families overlap in their description
//! regex (e.g. a SWAN series also happens to contain neither "T1" nor "T2",
//! but DWI and ADC are checked before the broader T1/T2 patterns so a stray
//! "T1"-shaped description on a diffusion series can never shadow it).

use crate::lookup::TagLookup;
use crate::strategy::{
    AdcStrategy, AslStrategy, CvrStrategy, DscStrategy, DtiStrategy, DwiStrategy, EAdcStrategy, ESwanStrategy,
    MraBrainStrategy, MraNeckStrategy, MraVrBrainStrategy, MraVrNeckStrategy, RestingStrategy, Strategy, SwanStrategy,
    T1Strategy, T2Strategy,
};
use crate::verdict::SeriesVerdict;

/// Runs every registered strategy, in registration order, against a
/// dataset and returns the first verdict produced.
pub struct Dispatcher {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Dispatcher {
    /// The canonical registration order: DWI, ADC, eADC, SWAN, eSWAN,
    /// MRA-Brain, MRA-Neck, MRA-VR-Brain, MRA-VR-Neck, T1, T2, ASL, DSC,
    /// Resting, CVR, DTI.
    pub fn new() -> Self {
        Dispatcher {
            strategies: vec![
                Box::new(DwiStrategy),
                Box::new(AdcStrategy),
                Box::new(EAdcStrategy),
                Box::new(SwanStrategy),
                Box::new(ESwanStrategy),
                Box::new(MraBrainStrategy),
                Box::new(MraNeckStrategy),
                Box::new(MraVrBrainStrategy),
                Box::new(MraVrNeckStrategy),
                Box::new(T1Strategy),
                Box::new(T2Strategy),
                Box::new(AslStrategy),
                Box::new(DscStrategy),
                Box::new(RestingStrategy),
                Box::new(CvrStrategy),
                Box::new(DtiStrategy),
            ],
        }
    }

    /// Classifies a dataset, returning [`SeriesVerdict::Unclassified`] if no
    /// strategy matches.
    pub fn classify(&self, ds: &dyn TagLookup) -> SeriesVerdict {
        for strategy in &self.strategies {
            if let Some(verdict) = strategy.classify(ds) {
                tracing::debug!(strategy = strategy.name(), %verdict, "series classified");
                return verdict;
            }
        }
        tracing::debug!("no strategy matched; series left unclassified");
        SeriesVerdict::Unclassified
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{MODALITY, MR_ACQUISITION_TYPE, SERIES_DESCRIPTION};
    use crate::lookup::fixture::FakeDataset;
    use crate::lookup::TagValue;
    use dicom_core::Tag;

    #[test]
    fn dwi_wins_over_a_broader_t1_like_description() {
        let ds = FakeDataset::default()
            .with(MODALITY, TagValue::Str("MR".into()))
            .with(MR_ACQUISITION_TYPE, TagValue::Str("2D".into()))
            .with(SERIES_DESCRIPTION, TagValue::Str("Ax DWI".into()))
            .with(
                Tag(0x0020, 0x0037),
                TagValue::Strs(vec!["1".into(), "0".into(), "0".into(), "0".into(), "1".into(), "0".into()]),
            )
            .with(Tag(0x0043, 0x1039), TagValue::Int(1000));
        let dispatcher = Dispatcher::new();
        assert_eq!(dispatcher.classify(&ds), SeriesVerdict::Dwi1000);
    }

    #[test]
    fn unrecognized_series_is_unclassified() {
        let ds = FakeDataset::default()
            .with(MODALITY, TagValue::Str("MR".into()))
            .with(SERIES_DESCRIPTION, TagValue::Str("Scout".into()));
        let dispatcher = Dispatcher::new();
        assert_eq!(dispatcher.classify(&ds), SeriesVerdict::Unclassified);
    }
}
