//! Classification strategies, one per series family.
//!
//! Grounded on `processing/dicom/strategies.py` and
//! `processing/dicom/additional_strategies.py`. Regexes are compiled once
//! via `LazyLock`, not per call.
//!
//! The T1/T2 strategies here use the same direct attribute-bag matching the
//! other strategies use; the `functional_helpers` RORO abstraction
//! (`ProcessingRequest`/`create_attribute_extractor_list`/
//! `process_series_with_type_mapping`) wrapped this exact logic in an extra
//! layer of indirection that added no behavior, so it is not carried over.

use std::sync::LazyLock;

use regex::Regex;

use crate::attrs::{AcquisitionType, BodyPart, Contrast, Modality, Orientation, Repetition, SeriesMarker};
use crate::extract;
use crate::lookup::TagLookup;
use crate::verdict::SeriesVerdict;

/// A classification strategy for one series family.
pub trait Strategy: Send + Sync {
    /// Short identifier used in logs and the dispatcher's trace output.
    fn name(&self) -> &'static str;

    /// Returns a verdict if this dataset belongs to the strategy's family.
    fn classify(&self, ds: &dyn TagLookup) -> Option<SeriesVerdict>;
}

fn description(ds: &dyn TagLookup) -> Option<String> {
    ds.get_str(extract::SERIES_DESCRIPTION)
}

fn guard_modality(ds: &dyn TagLookup, expect: Modality) -> bool {
    extract::modality(ds) == expect
}

fn guard_acquisition(ds: &dyn TagLookup, allowed: &[AcquisitionType]) -> bool {
    allowed.contains(&extract::acquisition_type(ds))
}

// ---------------------------------------------------------------------
// DWI
// ---------------------------------------------------------------------

static DWI_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i).*(DWI|AUTODIFF).*").unwrap());

pub struct DwiStrategy;

impl Strategy for DwiStrategy {
    fn name(&self) -> &'static str {
        "dwi"
    }

    fn classify(&self, ds: &dyn TagLookup) -> Option<SeriesVerdict> {
        if !guard_modality(ds, Modality::Mr) {
            return None;
        }
        if !guard_acquisition(ds, &[AcquisitionType::D2]) {
            return None;
        }
        let desc = description(ds)?;
        if !DWI_PATTERN.is_match(&desc) {
            return None;
        }
        let orientation = extract::orientation(ds);
        let b_value = extract::b_value(ds);
        if orientation != Orientation::Axi {
            return None;
        }
        match b_value {
            crate::attrs::BValue::B0 => Some(SeriesVerdict::Dwi0),
            crate::attrs::BValue::B1000 => Some(SeriesVerdict::Dwi1000),
            crate::attrs::BValue::Null => None,
        }
    }
}

// ---------------------------------------------------------------------
// ADC
// ---------------------------------------------------------------------

static ADC_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i).*(ADC).*").unwrap());

pub struct AdcStrategy;

impl Strategy for AdcStrategy {
    fn name(&self) -> &'static str {
        "adc"
    }

    fn classify(&self, ds: &dyn TagLookup) -> Option<SeriesVerdict> {
        if !guard_modality(ds, Modality::Mr) || !guard_acquisition(ds, &[AcquisitionType::D2]) {
            return None;
        }
        let desc = description(ds)?;
        if !ADC_PATTERN.is_match(&desc) {
            return None;
        }
        if extract::orientation(ds) != Orientation::Axi {
            return None;
        }
        Some(SeriesVerdict::Adc)
    }
}

// ---------------------------------------------------------------------
// eADC
// ---------------------------------------------------------------------

static EADC_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^.*(eADC).*").unwrap());

pub struct EAdcStrategy;

impl Strategy for EAdcStrategy {
    fn name(&self) -> &'static str {
        "eadc"
    }

    fn classify(&self, ds: &dyn TagLookup) -> Option<SeriesVerdict> {
        if !guard_modality(ds, Modality::Mr) {
            return None;
        }
        // accepts 3D or an absent acquisition type, per the original's tuple
        let acq = extract::acquisition_type(ds);
        if !(acq == AcquisitionType::D3 || acq == AcquisitionType::Null) {
            return None;
        }
        let desc = description(ds)?;
        if EADC_PATTERN.is_match(&desc) {
            Some(SeriesVerdict::EAdc)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------
// SWAN
// ---------------------------------------------------------------------

static SWAN_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i).*(SWAN).*").unwrap());

pub struct SwanStrategy;

impl Strategy for SwanStrategy {
    fn name(&self) -> &'static str {
        "swan"
    }

    fn classify(&self, ds: &dyn TagLookup) -> Option<SeriesVerdict> {
        if !guard_modality(ds, Modality::Mr) {
            return None;
        }
        if !guard_acquisition(ds, &[AcquisitionType::D2, AcquisitionType::D3]) {
            return None;
        }
        let desc = description(ds)?;
        if !SWAN_PATTERN.is_match(&desc) {
            return None;
        }
        let kind = extract::swan_kind(ds);
        let orientation = extract::orientation(ds);
        if orientation != Orientation::Axi {
            return None;
        }
        match kind {
            SeriesMarker::Original => Some(SeriesVerdict::Swan),
            SeriesMarker::Mip => Some(SeriesVerdict::SwanMip),
            SeriesMarker::Phase => Some(SeriesVerdict::SwanPhase),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------
// eSWAN
// ---------------------------------------------------------------------

pub struct ESwanStrategy;

impl Strategy for ESwanStrategy {
    fn name(&self) -> &'static str {
        "eswan"
    }

    fn classify(&self, ds: &dyn TagLookup) -> Option<SeriesVerdict> {
        if !guard_modality(ds, Modality::Mr) || !guard_acquisition(ds, &[AcquisitionType::D3]) {
            return None;
        }
        let desc = description(ds)?;
        if !SWAN_PATTERN.is_match(&desc) {
            return None;
        }
        let mip = extract::eswan_mip(ds);
        let original = extract::eswan_original(ds);
        // open question 2: the stricter reading is adopted -- bare eSWAN
        // requires both eSWAN and ORIGINAL, not ORIGINAL alone.
        if mip == SeriesMarker::Mip {
            Some(SeriesVerdict::ESwanMip)
        } else if original == SeriesMarker::Original {
            Some(SeriesVerdict::ESwan)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------
// MRA Brain / Neck / VR Brain / VR Neck
// ---------------------------------------------------------------------

static MRA_BRAIN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^.+(TOF)(((?!Neck).)*)$").unwrap());
static MRA_NECK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^.+(TOF).*(Neck).*$").unwrap());
static MRAVR_BRAIN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^((?!TOF|Neck).)*(MRA)((?!Neck).)*$").unwrap());
static MRAVR_NECK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^((?!TOF).)*(Neck.*MRA)|(MRA.*Neck).*$").unwrap());

pub struct MraBrainStrategy;

impl Strategy for MraBrainStrategy {
    fn name(&self) -> &'static str {
        "mra_brain"
    }

    fn classify(&self, ds: &dyn TagLookup) -> Option<SeriesVerdict> {
        if !guard_modality(ds, Modality::Mr) || !guard_acquisition(ds, &[AcquisitionType::D3]) {
            return None;
        }
        let desc = description(ds)?;
        if MRA_BRAIN_PATTERN.is_match(&desc) && extract::is_original_first(ds) {
            Some(SeriesVerdict::MraBrain)
        } else {
            None
        }
    }
}

pub struct MraNeckStrategy;

impl Strategy for MraNeckStrategy {
    fn name(&self) -> &'static str {
        "mra_neck"
    }

    fn classify(&self, ds: &dyn TagLookup) -> Option<SeriesVerdict> {
        if !guard_modality(ds, Modality::Mr) || !guard_acquisition(ds, &[AcquisitionType::D3]) {
            return None;
        }
        let desc = description(ds)?;
        if MRA_NECK_PATTERN.is_match(&desc) && extract::is_original_first(ds) {
            Some(SeriesVerdict::MraNeck)
        } else {
            None
        }
    }
}

pub struct MraVrBrainStrategy;

impl Strategy for MraVrBrainStrategy {
    fn name(&self) -> &'static str {
        "mra_vr_brain"
    }

    fn classify(&self, ds: &dyn TagLookup) -> Option<SeriesVerdict> {
        if !guard_modality(ds, Modality::Mr) || !guard_acquisition(ds, &[AcquisitionType::D3]) {
            return None;
        }
        let desc = description(ds)?;
        if MRAVR_BRAIN_PATTERN.is_match(&desc) {
            Some(SeriesVerdict::MraVrBrain)
        } else {
            None
        }
    }
}

pub struct MraVrNeckStrategy;

impl Strategy for MraVrNeckStrategy {
    fn name(&self) -> &'static str {
        "mra_vr_neck"
    }

    fn classify(&self, ds: &dyn TagLookup) -> Option<SeriesVerdict> {
        if !guard_modality(ds, Modality::Mr) || !guard_acquisition(ds, &[AcquisitionType::D3]) {
            return None;
        }
        let desc = description(ds)?;
        if MRAVR_NECK_PATTERN.is_match(&desc) {
            Some(SeriesVerdict::MraVrNeck)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------
// T1
// ---------------------------------------------------------------------

static T1_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i).*T1.*").unwrap());

pub struct T1Strategy;

impl Strategy for T1Strategy {
    fn name(&self) -> &'static str {
        "t1"
    }

    fn classify(&self, ds: &dyn TagLookup) -> Option<SeriesVerdict> {
        if !guard_modality(ds, Modality::Mr) {
            return None;
        }
        if !guard_acquisition(ds, &[AcquisitionType::D2, AcquisitionType::D3]) {
            return None;
        }
        let desc = description(ds)?;
        if !T1_PATTERN.is_match(&desc) {
            return None;
        }

        let orientation = extract::orientation(ds);
        let contrast = extract::contrast(ds);
        let flair = extract::flair(ds, extract::FlairFamily::T1) == SeriesMarker::Flair;
        let cube = extract::cube(ds) == SeriesMarker::Cube;
        let bravo = extract::bravo(ds) == SeriesMarker::Bravo;

        t1_t2_verdict(true, orientation, contrast, flair, cube, bravo)
    }
}

// ---------------------------------------------------------------------
// T2
// ---------------------------------------------------------------------

static T2_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i).*T2.*").unwrap());

pub struct T2Strategy;

impl Strategy for T2Strategy {
    fn name(&self) -> &'static str {
        "t2"
    }

    fn classify(&self, ds: &dyn TagLookup) -> Option<SeriesVerdict> {
        if !guard_modality(ds, Modality::Mr) {
            return None;
        }
        if !guard_acquisition(ds, &[AcquisitionType::D2, AcquisitionType::D3]) {
            return None;
        }
        let desc = description(ds)?;
        if !T2_PATTERN.is_match(&desc) {
            return None;
        }

        let orientation = extract::orientation(ds);
        let contrast = extract::contrast(ds);
        let flair = extract::flair(ds, extract::FlairFamily::T2) == SeriesMarker::Flair;
        let cube = extract::cube(ds) == SeriesMarker::Cube;

        t1_t2_verdict(false, orientation, contrast, flair, cube, false)
    }
}

/// Shared T1/T2 rename-table lookup. `is_t1` selects between the T1 and T2
/// verdict families; `bravo` is always `false` for T2 (T2 has no BRAVO
/// family in the original enumeration).
fn t1_t2_verdict(
    is_t1: bool,
    orientation: Orientation,
    contrast: Contrast,
    flair: bool,
    cube: bool,
    bravo: bool,
) -> Option<SeriesVerdict> {
    use Orientation::*;
    let ce = contrast == Contrast::Ce;

    if is_t1 {
        if bravo {
            return match (orientation, ce) {
                (Axi, false) => Some(SeriesVerdict::T1BravoAxi),
                (Sag, false) => Some(SeriesVerdict::T1BravoSag),
                (Cor, false) => Some(SeriesVerdict::T1BravoCor),
                (AxiR, false) => Some(SeriesVerdict::T1BravoAxiR),
                (SagR, false) => Some(SeriesVerdict::T1BravoSagR),
                (CorR, false) => Some(SeriesVerdict::T1BravoCorR),
                (AxiR, true) => Some(SeriesVerdict::T1BravoCeAxiR),
                (SagR, true) => Some(SeriesVerdict::T1BravoCeSagR),
                (CorR, true) => Some(SeriesVerdict::T1BravoCeCorR),
                (Axi, true) => Some(SeriesVerdict::T1BravoCeAxi),
                (Sag, true) => Some(SeriesVerdict::T1BravoCeSag),
                (Cor, true) => Some(SeriesVerdict::T1BravoCeCor),
                _ => None,
            };
        }
        if cube && flair {
            return match (orientation, ce) {
                (Axi, false) => Some(SeriesVerdict::T1FlairCubeAxi),
                (Sag, false) => Some(SeriesVerdict::T1FlairCubeSag),
                (Cor, false) => Some(SeriesVerdict::T1FlairCubeCor),
                (AxiR, false) => Some(SeriesVerdict::T1FlairCubeAxiR),
                (SagR, false) => Some(SeriesVerdict::T1FlairCubeSagR),
                (CorR, false) => Some(SeriesVerdict::T1FlairCubeCorR),
                (Axi, true) => Some(SeriesVerdict::T1FlairCubeCeAxi),
                (Sag, true) => Some(SeriesVerdict::T1FlairCubeCeSag),
                (Cor, true) => Some(SeriesVerdict::T1FlairCubeCeCor),
                (AxiR, true) => Some(SeriesVerdict::T1FlairCubeCeAxiR),
                (SagR, true) => Some(SeriesVerdict::T1FlairCubeCeSagR),
                (CorR, true) => Some(SeriesVerdict::T1FlairCubeCeCorR),
                _ => None,
            };
        }
        if cube {
            return match (orientation, ce) {
                (Axi, false) => Some(SeriesVerdict::T1CubeAxi),
                (Sag, false) => Some(SeriesVerdict::T1CubeSag),
                (Cor, false) => Some(SeriesVerdict::T1CubeCor),
                (AxiR, false) => Some(SeriesVerdict::T1CubeAxiR),
                (SagR, false) => Some(SeriesVerdict::T1CubeSagR),
                (CorR, false) => Some(SeriesVerdict::T1CubeCorR),
                (Axi, true) => Some(SeriesVerdict::T1CubeCeAxi),
                (Sag, true) => Some(SeriesVerdict::T1CubeCeSag),
                (Cor, true) => Some(SeriesVerdict::T1CubeCeCor),
                (AxiR, true) => Some(SeriesVerdict::T1CubeCeAxiR),
                (SagR, true) => Some(SeriesVerdict::T1CubeCeSagR),
                (CorR, true) => Some(SeriesVerdict::T1CubeCeCorR),
                _ => None,
            };
        }
        if flair {
            return match (orientation, ce) {
                (Axi, false) => Some(SeriesVerdict::T1FlairAxi),
                (Sag, false) => Some(SeriesVerdict::T1FlairSag),
                (Cor, false) => Some(SeriesVerdict::T1FlairCor),
                (Axi, true) => Some(SeriesVerdict::T1FlairCeAxi),
                (Sag, true) => Some(SeriesVerdict::T1FlairCeSag),
                (Cor, true) => Some(SeriesVerdict::T1FlairCeCor),
                _ => None,
            };
        }
        match (orientation, ce) {
            (Axi, false) => Some(SeriesVerdict::T1Axi),
            (Sag, false) => Some(SeriesVerdict::T1Sag),
            (Cor, false) => Some(SeriesVerdict::T1Cor),
            (Axi, true) => Some(SeriesVerdict::T1CeAxi),
            (Sag, true) => Some(SeriesVerdict::T1CeSag),
            (Cor, true) => Some(SeriesVerdict::T1CeCor),
            _ => None,
        }
    } else {
        if cube && flair {
            return match (orientation, ce) {
                (Axi, false) => Some(SeriesVerdict::T2FlairCubeAxi),
                (Sag, false) => Some(SeriesVerdict::T2FlairCubeSag),
                (Cor, false) => Some(SeriesVerdict::T2FlairCubeCor),
                (AxiR, false) => Some(SeriesVerdict::T2FlairCubeAxiR),
                (SagR, false) => Some(SeriesVerdict::T2FlairCubeSagR),
                (CorR, false) => Some(SeriesVerdict::T2FlairCubeCorR),
                (Axi, true) => Some(SeriesVerdict::T2FlairCubeCeAxi),
                (Sag, true) => Some(SeriesVerdict::T2FlairCubeCeSag),
                (Cor, true) => Some(SeriesVerdict::T2FlairCubeCeCor),
                (AxiR, true) => Some(SeriesVerdict::T2FlairCubeCeAxiR),
                (SagR, true) => Some(SeriesVerdict::T2FlairCubeCeSagR),
                (CorR, true) => Some(SeriesVerdict::T2FlairCubeCeCorR),
                _ => None,
            };
        }
        if cube {
            return match (orientation, ce) {
                (Axi, false) => Some(SeriesVerdict::T2CubeAxi),
                (Sag, false) => Some(SeriesVerdict::T2CubeSag),
                (Cor, false) => Some(SeriesVerdict::T2CubeCor),
                (AxiR, false) => Some(SeriesVerdict::T2CubeAxiR),
                (SagR, false) => Some(SeriesVerdict::T2CubeSagR),
                (CorR, false) => Some(SeriesVerdict::T2CubeCorR),
                (Axi, true) => Some(SeriesVerdict::T2CubeCeAxi),
                (Sag, true) => Some(SeriesVerdict::T2CubeCeSag),
                (Cor, true) => Some(SeriesVerdict::T2CubeCeCor),
                (AxiR, true) => Some(SeriesVerdict::T2CubeCeAxiR),
                (SagR, true) => Some(SeriesVerdict::T2CubeCeSagR),
                (CorR, true) => Some(SeriesVerdict::T2CubeCeCorR),
                _ => None,
            };
        }
        if flair {
            return match (orientation, ce) {
                (Axi, false) => Some(SeriesVerdict::T2FlairAxi),
                (Sag, false) => Some(SeriesVerdict::T2FlairSag),
                (Cor, false) => Some(SeriesVerdict::T2FlairCor),
                (Axi, true) => Some(SeriesVerdict::T2FlairCeAxi),
                (Sag, true) => Some(SeriesVerdict::T2FlairCeSag),
                (Cor, true) => Some(SeriesVerdict::T2FlairCeCor),
                _ => None,
            };
        }
        match (orientation, ce) {
            (Axi, false) => Some(SeriesVerdict::T2Axi),
            (Sag, false) => Some(SeriesVerdict::T2Sag),
            (Cor, false) => Some(SeriesVerdict::T2Cor),
            (Axi, true) => Some(SeriesVerdict::T2CeAxi),
            (Sag, true) => Some(SeriesVerdict::T2CeSag),
            (Cor, true) => Some(SeriesVerdict::T2CeCor),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------
// ASL
// ---------------------------------------------------------------------

static ASL_PATTERNS: LazyLock<[(SeriesVerdict, Regex); 7]> = LazyLock::new(|| {
    [
        (SeriesVerdict::AslSeq, Regex::new(r"(?i)(multi-Delay ASL SEQ)").unwrap()),
        (
            SeriesVerdict::AslProd,
            Regex::new(r"(?i)(3D ASL \(non-contrast\))").unwrap(),
        ),
        (
            SeriesVerdict::AslSeqAtt,
            Regex::new(r"(?i)(\(Transit delay\) multi-Delay ASL SEQ)").unwrap(),
        ),
        (
            SeriesVerdict::AslSeqAttColor,
            Regex::new(r"(?i)(\(Color Transit delay\) multi-Delay ASL SEQ)").unwrap(),
        ),
        (
            SeriesVerdict::AslSeqCbf,
            Regex::new(r"(?i)(\(Transit corrected CBF\) multi-Delay ASL SEQ)").unwrap(),
        ),
        (
            SeriesVerdict::AslSeqCbfColor,
            Regex::new(r"(?i)(\(Color Transit corrected CBF\) multi-Delay ASL SEQ)").unwrap(),
        ),
        (
            SeriesVerdict::AslSeqPw,
            Regex::new(r"(?i)(\(per del, mean PW, REF\) multi-Delay ASL SEQ)").unwrap(),
        ),
    ]
});

pub struct AslStrategy;

impl Strategy for AslStrategy {
    fn name(&self) -> &'static str {
        "asl"
    }

    fn classify(&self, ds: &dyn TagLookup) -> Option<SeriesVerdict> {
        if !guard_modality(ds, Modality::Mr) || !guard_acquisition(ds, &[AcquisitionType::D3]) {
            return None;
        }
        let desc = description(ds)?;
        ASL_PATTERNS
            .iter()
            .find(|(_, re)| re.is_match(&desc))
            .map(|(verdict, _)| *verdict)
    }
}

// ---------------------------------------------------------------------
// DSC
// ---------------------------------------------------------------------

static DSC_BASE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i).*(AUTOPWI|Perfusion).*").unwrap());
static DSC_DERIVED_PATTERNS: LazyLock<[(SeriesVerdict, Regex); 3]> = LazyLock::new(|| {
    [
        (SeriesVerdict::DscRCbf, Regex::new(r"(?i).*(CBF).*").unwrap()),
        (SeriesVerdict::DscRCbv, Regex::new(r"(?i).*(CBV).*").unwrap()),
        (SeriesVerdict::DscMtt, Regex::new(r"(?i).*(MTT).*").unwrap()),
    ]
});

pub struct DscStrategy;

impl Strategy for DscStrategy {
    fn name(&self) -> &'static str {
        "dsc"
    }

    fn classify(&self, ds: &dyn TagLookup) -> Option<SeriesVerdict> {
        if !guard_modality(ds, Modality::Mr) {
            return None;
        }
        let acq = extract::acquisition_type(ds);
        if !(acq == AcquisitionType::D2 || acq == AcquisitionType::Null) {
            return None;
        }
        let desc = description(ds)?;
        if acq == AcquisitionType::D2 {
            return if DSC_BASE_PATTERN.is_match(&desc) {
                Some(SeriesVerdict::Dsc)
            } else {
                None
            };
        }
        DSC_DERIVED_PATTERNS
            .iter()
            .find(|(_, re)| re.is_match(&desc))
            .map(|(verdict, _)| *verdict)
    }
}

// ---------------------------------------------------------------------
// Resting
// ---------------------------------------------------------------------

static RESTING_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^.*(Resting|REST).*$").unwrap());

pub struct RestingStrategy;

impl Strategy for RestingStrategy {
    fn name(&self) -> &'static str {
        "resting"
    }

    fn classify(&self, ds: &dyn TagLookup) -> Option<SeriesVerdict> {
        if !guard_modality(ds, Modality::Mr) || !guard_acquisition(ds, &[AcquisitionType::D2]) {
            return None;
        }
        let desc = description(ds)?;
        if !RESTING_PATTERN.is_match(&desc) {
            return None;
        }
        if extract::repetition(ds) == Repetition::Tr2000 {
            Some(SeriesVerdict::Resting2000)
        } else {
            Some(SeriesVerdict::Resting)
        }
    }
}

// ---------------------------------------------------------------------
// CVR
// ---------------------------------------------------------------------

static CVR_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^.*(CVR).*$").unwrap());

pub struct CvrStrategy;

impl Strategy for CvrStrategy {
    fn name(&self) -> &'static str {
        "cvr"
    }

    fn classify(&self, ds: &dyn TagLookup) -> Option<SeriesVerdict> {
        if !guard_modality(ds, Modality::Mr) || !guard_acquisition(ds, &[AcquisitionType::D2]) {
            return None;
        }
        let desc = description(ds)?;
        if !CVR_PATTERN.is_match(&desc) {
            return None;
        }
        let repetition = extract::repetition(ds);
        let body_part = extract::body_part(ds);
        // Ranked from most to least specific.
        match (repetition, body_part) {
            (Repetition::Tr2000, BodyPart::Ear) => Some(SeriesVerdict::Cvr2000Ear),
            (Repetition::Tr2000, BodyPart::Eye) => Some(SeriesVerdict::Cvr2000Eye),
            (Repetition::Tr2000, _) => Some(SeriesVerdict::Cvr2000),
            (Repetition::Tr1000, _) => Some(SeriesVerdict::Cvr1000),
            _ => Some(SeriesVerdict::Cvr),
        }
    }
}

// ---------------------------------------------------------------------
// DTI
// ---------------------------------------------------------------------

static DTI_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i).*DTI.*").unwrap());

pub struct DtiStrategy;

impl Strategy for DtiStrategy {
    fn name(&self) -> &'static str {
        "dti"
    }

    fn classify(&self, ds: &dyn TagLookup) -> Option<SeriesVerdict> {
        if !guard_modality(ds, Modality::Mr) {
            return None;
        }
        if !guard_acquisition(ds, &[AcquisitionType::D2, AcquisitionType::D3]) {
            return None;
        }
        let desc = description(ds)?;
        if !DTI_PATTERN.is_match(&desc) {
            return None;
        }
        match extract::dti_directions(ds) {
            crate::attrs::DtiDirections::B32 => Some(SeriesVerdict::Dti32d),
            crate::attrs::DtiDirections::B64 => Some(SeriesVerdict::Dti64d),
            crate::attrs::DtiDirections::Null => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{DIFFUSION_BVALUE_GE, IMAGE_TYPE, MODALITY, MR_ACQUISITION_TYPE, REPETITION_TIME, SERIES_DESCRIPTION};
    use crate::lookup::fixture::FakeDataset;
    use crate::lookup::TagValue;
    use dicom_core::Tag;

    fn mr_2d_axi(description_text: &str) -> FakeDataset {
        FakeDataset::default()
            .with(MODALITY, TagValue::Str("MR".into()))
            .with(MR_ACQUISITION_TYPE, TagValue::Str("2D".into()))
            .with(SERIES_DESCRIPTION, TagValue::Str(description_text.into()))
            .with(
                Tag(0x0020, 0x0037),
                TagValue::Strs(vec!["1".into(), "0".into(), "0".into(), "0".into(), "1".into(), "0".into()]),
            )
    }

    #[test]
    fn dwi_classifies_b0_axial() {
        let ds = mr_2d_axi("Ax DWI").with(DIFFUSION_BVALUE_GE, TagValue::Int(0));
        assert_eq!(DwiStrategy.classify(&ds), Some(SeriesVerdict::Dwi0));
    }

    #[test]
    fn t1_cube_contrast_enhanced_sag_reformatted() {
        let ds = FakeDataset::default()
            .with(MODALITY, TagValue::Str("MR".into()))
            .with(MR_ACQUISITION_TYPE, TagValue::Str("3D".into()))
            .with(SERIES_DESCRIPTION, TagValue::Str("Sag T1 CUBE +C".into()))
            .with(
                Tag(0x0020, 0x0037),
                TagValue::Strs(vec!["0".into(), "1".into(), "0".into(), "0".into(), "0".into(), "1".into()]),
            )
            .with(
                IMAGE_TYPE,
                TagValue::Strs(vec!["DERIVED".into(), "SECONDARY".into(), "REFORMATTED".into()]),
            )
            .with(Tag(0x0018, 0x0010), TagValue::Str("Gadovist".into()));
        assert_eq!(T1Strategy.classify(&ds), Some(SeriesVerdict::T1CubeCeSagR));
    }

    #[test]
    fn t1_flair_is_detected_from_tr_te_not_the_description() {
        // No "FLAIR" substring anywhere in the description, matching the
        // historical datasets spec.md §4.2 calls out; TR/TE alone must
        // carry the classification.
        let ds = mr_2d_axi("Ax T1 CUBE")
            .with(REPETITION_TIME, TagValue::Float(1500.0))
            .with(crate::extract::ECHO_TIME, TagValue::Float(20.0));
        assert_eq!(T1Strategy.classify(&ds), Some(SeriesVerdict::T1FlairCubeAxi));
    }

    #[test]
    fn t2_flair_is_detected_from_te_and_inversion_time() {
        let ds = mr_2d_axi("Ax T2")
            .with(crate::extract::ECHO_TIME, TagValue::Float(100.0))
            .with(crate::extract::INVERSION_TIME, TagValue::Float(2500.0));
        assert_eq!(T2Strategy.classify(&ds), Some(SeriesVerdict::T2FlairAxi));
    }

    #[test]
    fn cvr_picks_most_specific_rule() {
        let ds = mr_2d_axi("CVR 2000 EAR")
            .with(REPETITION_TIME, TagValue::Float(2000.0));
        assert_eq!(CvrStrategy.classify(&ds), Some(SeriesVerdict::Cvr2000Ear));
    }

    #[test]
    fn mra_brain_requires_image_type_original_first() {
        let ds = FakeDataset::default()
            .with(MODALITY, TagValue::Str("MR".into()))
            .with(MR_ACQUISITION_TYPE, TagValue::Str("3D".into()))
            .with(SERIES_DESCRIPTION, TagValue::Str("3D TOF Brain".into()))
            .with(IMAGE_TYPE, TagValue::Strs(vec!["ORIGINAL".into(), "PRIMARY".into()]));
        assert_eq!(MraBrainStrategy.classify(&ds), Some(SeriesVerdict::MraBrain));
    }
}
