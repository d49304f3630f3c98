//! Pure attribute extractors: `TagLookup -> Attribute`.
//!
//! Grounded on `processing/base.py`'s per-attribute strategy classes and the
//! `get_*` classmethods duplicated across `processing/dicom/strategies.py`.
//! Where the original repeats the same REFORMATTED-aware orientation logic
//! in four strategy classes, this port keeps a single [`orientation`]
//! function and every strategy calls it.

use std::sync::LazyLock;

use dicom_core::Tag;
use regex::Regex;

use crate::attrs::{
    AcquisitionType, BValue, BodyPart, Contrast, DtiDirections, Modality, Orientation, Repetition,
    SeriesMarker,
};
use crate::lookup::TagLookup;

pub const MODALITY: Tag = Tag(0x0008, 0x0060);
pub const MR_ACQUISITION_TYPE: Tag = Tag(0x0018, 0x0023);
pub const IMAGE_TYPE: Tag = Tag(0x0008, 0x0008);
pub const SERIES_DESCRIPTION: Tag = Tag(0x0008, 0x103E);
pub const CONTRAST_BOLUS_AGENT: Tag = Tag(0x0018, 0x0010);
pub const REPETITION_TIME: Tag = Tag(0x0018, 0x0080);
pub const ECHO_TIME: Tag = Tag(0x0018, 0x0081);
pub const INVERSION_TIME: Tag = Tag(0x0018, 0x0082);
pub const INSTANCE_CREATION_TIME: Tag = Tag(0x0008, 0x0013);
/// GE private b-value tag, vendor-specific, first element only (open
/// question: multi-frame b-value sequences are out of scope).
pub const DIFFUSION_BVALUE_GE: Tag = Tag(0x0043, 0x1039);
/// GE private pulse sequence name, used by the ASL extractor.
pub const PULSE_SEQUENCE_NAME_GE: Tag = Tag(0x0019, 0x109C);
/// GE private ASL technique tag.
pub const ASL_TECHNIQUE_GE: Tag = Tag(0x0043, 0x10A4);

pub fn modality(ds: &dyn TagLookup) -> Modality {
    match ds.get_str(MODALITY).as_deref() {
        Some(s) if s.eq_ignore_ascii_case("MR") => Modality::Mr,
        Some(s) if s.eq_ignore_ascii_case("CT") => Modality::Ct,
        _ => Modality::Null,
    }
}

pub fn acquisition_type(ds: &dyn TagLookup) -> AcquisitionType {
    match ds.get_str(MR_ACQUISITION_TYPE).as_deref() {
        Some(s) if s.eq_ignore_ascii_case("2D") => AcquisitionType::D2,
        Some(s) if s.eq_ignore_ascii_case("3D") => AcquisitionType::D3,
        _ => AcquisitionType::Null,
    }
}

/// Plain acquisition-plane orientation, without REFORMATTED promotion.
///
/// Rounds each of the six direction cosines to the nearest integer, takes
/// absolute values, and picks the two dominant (rounded-to-1) axes: `{0,4}`
/// row-X/col-Y is AXI, `{0,5}` row-X/col-Z is COR, `{1,5}` row-Y/col-Z is
/// SAG. Any other pairing is an orientation this system does not canonicalize.
fn base_orientation(ds: &dyn TagLookup) -> Orientation {
    let tag = Tag(0x0020, 0x0037);
    let Some(values) = ds.get(tag).and_then(|v| v.as_strs().map(<[String]>::to_vec)) else {
        return Orientation::Null;
    };
    let cosines: Vec<f64> = values.iter().filter_map(|s| s.trim().parse().ok()).collect();
    if cosines.len() != 6 {
        return Orientation::Null;
    }
    let magnitude: Vec<i64> = cosines.iter().map(|c| c.round() as i64).map(i64::abs).collect();
    let mut indices: Vec<usize> = (0..6).collect();
    indices.sort_by(|&a, &b| magnitude[b].cmp(&magnitude[a]));
    let mut dominant = [indices[0], indices[1]];
    dominant.sort_unstable();
    match dominant {
        [0, 4] => Orientation::Axi,
        [0, 5] => Orientation::Cor,
        [1, 5] => Orientation::Sag,
        _ => Orientation::Null,
    }
}

/// Orientation extractor with REFORMATTED promotion: if ImageType's third
/// value is `REFORMATTED`, the plain orientation is mapped to its `*r`
/// variant.
pub fn orientation(ds: &dyn TagLookup) -> Orientation {
    let plain = base_orientation(ds);
    let Some(image_type) = ds.get(IMAGE_TYPE).and_then(|v| v.as_strs().map(<[String]>::to_vec))
    else {
        return plain;
    };
    if image_type.len() >= 3 && image_type[2].eq_ignore_ascii_case("REFORMATTED") {
        plain.reformatted()
    } else {
        plain
    }
}

static CONTRAST_DESCRIPTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\+C|C\+").unwrap());

fn agent_present(ds: &dyn TagLookup) -> bool {
    ds.get_str(CONTRAST_BOLUS_AGENT).is_some_and(|s| !s.trim().is_empty())
}

/// Contrast-enhancement detection, branched by modality per
/// `ContrastProcessingStrategy.process`: MR additionally falls back to a
/// `+C`/`C+` series-description match when the agent tag is empty; CT
/// never does, since CT contrast series aren't named with that convention.
pub fn contrast(ds: &dyn TagLookup) -> Contrast {
    match modality(ds) {
        Modality::Mr => {
            let description_matches =
                ds.get_str(SERIES_DESCRIPTION).is_some_and(|desc| CONTRAST_DESCRIPTION_PATTERN.is_match(&desc));
            if agent_present(ds) || description_matches {
                Contrast::Ce
            } else {
                Contrast::Ne
            }
        }
        Modality::Ct => {
            if agent_present(ds) {
                Contrast::Ce
            } else {
                Contrast::Ne
            }
        }
        Modality::Null => Contrast::Null,
    }
}

/// Diffusion b-value. Reads only the first element of the vendor tag, a
/// faithful port of `get_b_values`'s single-value assumption (DWI series
/// store one nominal b-value per instance in this acquisition protocol).
pub fn b_value(ds: &dyn TagLookup) -> BValue {
    match ds.get(DIFFUSION_BVALUE_GE).and_then(|v| v.as_int()) {
        Some(0) => BValue::B0,
        Some(1000) => BValue::B1000,
        _ => BValue::Null,
    }
}

pub fn repetition(ds: &dyn TagLookup) -> Repetition {
    match ds.get(REPETITION_TIME).and_then(|v| v.as_float()) {
        Some(tr) if (tr - 1000.0).abs() < 0.5 => Repetition::Tr1000,
        Some(tr) if (tr - 2000.0).abs() < 0.5 => Repetition::Tr2000,
        _ => Repetition::Null,
    }
}

/// Body part, read from the series description rather than BodyPartExamined
/// (the vendor protocols in this system name EYE/EAR sub-studies in the
/// description, not the structured tag).
pub fn body_part(ds: &dyn TagLookup) -> BodyPart {
    let Some(desc) = ds.get_str(SERIES_DESCRIPTION) else {
        return BodyPart::Null;
    };
    let lower = desc.to_ascii_lowercase();
    if lower.contains("eye") {
        BodyPart::Eye
    } else if lower.contains("ear") {
        BodyPart::Ear
    } else {
        BodyPart::Null
    }
}

/// T1/T2 family selector for FLAIR detection. The two families use
/// unrelated tests, so the caller must say which rename table it's
/// building for rather than this function guessing from other attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlairFamily {
    T1,
    T2,
}

/// FLAIR detection, per spec.md §4.1 `FlairDetector` / §4.2 "T1/T2 FLAIR
/// disambiguation": this deliberately does NOT match on the series
/// description, because historical datasets lacked the "FLAIR" substring.
/// T1's test is a TR/TE window (`get_flair` in `dicom_rename_mr.py`'s T1
/// strategy); T2's is an echo-time threshold gated on inversion time being
/// present at all (the same file's T2 strategy).
pub fn flair(ds: &dyn TagLookup, family: FlairFamily) -> SeriesMarker {
    match family {
        FlairFamily::T1 => {
            let tr = ds.get(REPETITION_TIME).and_then(|v| v.as_float());
            let te = ds.get(ECHO_TIME).and_then(|v| v.as_float());
            match (tr, te) {
                (Some(tr), Some(te)) if (800.0..=3000.0).contains(&tr) && te <= 30.0 => SeriesMarker::Flair,
                _ => SeriesMarker::Null,
            }
        }
        FlairFamily::T2 => {
            let te = ds.get(ECHO_TIME).and_then(|v| v.as_float());
            let ti_present = ds.get(INVERSION_TIME).is_some();
            match te {
                Some(te) if te >= 80.0 && ti_present => SeriesMarker::Flair,
                _ => SeriesMarker::Null,
            }
        }
    }
}

pub fn cube(ds: &dyn TagLookup) -> SeriesMarker {
    marker_from_description(ds, "CUBE", SeriesMarker::Cube)
}

/// BRAVO detector: matches `BRAVO` or the FSPGR vendor sequence name
/// `efgre3d` carried under `SeriesEnum.FSPGR` in the original enumeration.
pub fn bravo(ds: &dyn TagLookup) -> SeriesMarker {
    let Some(desc) = ds.get_str(SERIES_DESCRIPTION) else {
        return SeriesMarker::Null;
    };
    let upper = desc.to_ascii_uppercase();
    if upper.contains("BRAVO") || upper.contains("FSPGR") || upper.contains("EFGRE3D") {
        SeriesMarker::Bravo
    } else {
        SeriesMarker::Null
    }
}

fn marker_from_description(ds: &dyn TagLookup, needle: &str, marker: SeriesMarker) -> SeriesMarker {
    match ds.get_str(SERIES_DESCRIPTION) {
        Some(desc) if desc.to_ascii_uppercase().contains(needle) => marker,
        _ => SeriesMarker::Null,
    }
}

/// Whether ImageType's first two values are `ORIGINAL\PRIMARY`.
pub fn is_original(ds: &dyn TagLookup) -> bool {
    let Some(image_type) = ds.get(IMAGE_TYPE).and_then(|v| v.as_strs().map(<[String]>::to_vec))
    else {
        return false;
    };
    image_type.iter().any(|s| s.eq_ignore_ascii_case("ORIGINAL"))
}

/// Whether ImageType's first value is exactly `ORIGINAL` (the stricter
/// check the MRA strategies require).
pub fn is_original_first(ds: &dyn TagLookup) -> bool {
    let Some(image_type) = ds.get(IMAGE_TYPE).and_then(|v| v.as_strs().map(<[String]>::to_vec))
    else {
        return false;
    };
    image_type
        .first()
        .is_some_and(|s| s.eq_ignore_ascii_case("ORIGINAL"))
}

/// SWAN/eSWAN derived-series marker: MIP or PHASE, read from ImageType's
/// last value and the series description.
pub fn swan_kind(ds: &dyn TagLookup) -> SeriesMarker {
    let image_type = ds.get(IMAGE_TYPE).and_then(|v| v.as_strs().map(<[String]>::to_vec));
    if let Some(image_type) = &image_type {
        if image_type.len() >= 3 {
            if image_type.iter().any(|s| s.eq_ignore_ascii_case("ORIGINAL"))
                && image_type.iter().any(|s| s.eq_ignore_ascii_case("PRIMARY"))
            {
                return SeriesMarker::Original;
            }
            if image_type.iter().any(|s| s.eq_ignore_ascii_case("DERIVED")) {
                if let Some(desc) = ds.get_str(SERIES_DESCRIPTION) {
                    let upper = desc.to_ascii_uppercase();
                    if upper.contains("MIP") {
                        return SeriesMarker::Mip;
                    }
                    if upper.contains("PHASE") {
                        return SeriesMarker::Phase;
                    }
                }
            }
        }
    }
    SeriesMarker::Null
}

/// eSWAN-specific mIP detector: last ImageType value is `MIN IP` or
/// `REFORMATTED`, keyed off InstanceCreationTime's presence like the
/// original (a proxy for "this is a derived instance, not raw k-space").
pub fn eswan_mip(ds: &dyn TagLookup) -> SeriesMarker {
    let image_type = ds.get(IMAGE_TYPE).and_then(|v| v.as_strs().map(<[String]>::to_vec));
    let has_creation_time = ds.get(INSTANCE_CREATION_TIME).is_some();
    match (image_type, has_creation_time) {
        (Some(values), true) => match values.last() {
            Some(last) if last.eq_ignore_ascii_case("MIN IP") || last.eq_ignore_ascii_case("REFORMATTED") => {
                SeriesMarker::Mip
            }
            _ => SeriesMarker::Null,
        },
        _ => SeriesMarker::Null,
    }
}

pub fn eswan_original(ds: &dyn TagLookup) -> SeriesMarker {
    if is_original(ds) {
        SeriesMarker::Original
    } else {
        SeriesMarker::Null
    }
}

/// DTI direction count, read from the series description. Defaults to 32
/// when "DTI" matches but neither "64" nor "32" appears, preserving the
/// original's default-to-32 behavior rather than silently reclassifying
/// ambiguous historical series.
pub fn dti_directions(ds: &dyn TagLookup) -> DtiDirections {
    let Some(desc) = ds.get_str(SERIES_DESCRIPTION) else {
        return DtiDirections::Null;
    };
    let upper = desc.to_ascii_uppercase();
    if upper.contains("64") {
        DtiDirections::B64
    } else if upper.contains("32") {
        DtiDirections::B32
    } else if upper.contains("DTI") {
        DtiDirections::B32
    } else {
        DtiDirections::Null
    }
}

/// True when the ASL pulse-sequence-name or ASL-technique private tags
/// name this series as an ASL acquisition.
pub fn is_asl(ds: &dyn TagLookup) -> bool {
    if let Some(name) = ds.get_str(PULSE_SEQUENCE_NAME_GE) {
        if name.eq_ignore_ascii_case("asl") {
            return true;
        }
    }
    if let Some(technique) = ds.get_str(ASL_TECHNIQUE_GE) {
        if technique.to_ascii_lowercase().contains("asl") {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::fixture::FakeDataset;
    use crate::lookup::TagValue;

    #[test]
    fn modality_mr() {
        let ds = FakeDataset::default().with(MODALITY, TagValue::Str("MR".into()));
        assert_eq!(modality(&ds), Modality::Mr);
    }

    #[test]
    fn modality_absent_is_null() {
        let ds = FakeDataset::default();
        assert_eq!(modality(&ds), Modality::Null);
    }

    #[test]
    fn orientation_promotes_reformatted_axial() {
        let ds = FakeDataset::default()
            .with(
                Tag(0x0020, 0x0037),
                TagValue::Strs(vec!["1".into(), "0".into(), "0".into(), "0".into(), "1".into(), "0".into()]),
            )
            .with(
                IMAGE_TYPE,
                TagValue::Strs(vec!["DERIVED".into(), "SECONDARY".into(), "REFORMATTED".into()]),
            );
        assert_eq!(orientation(&ds), Orientation::AxiR);
    }

    #[test]
    fn b_value_reads_first_element_only() {
        let ds = FakeDataset::default().with(DIFFUSION_BVALUE_GE, TagValue::Int(1000));
        assert_eq!(b_value(&ds), BValue::B1000);
    }

    #[test]
    fn body_part_matches_ear_case_insensitively() {
        let ds = FakeDataset::default().with(SERIES_DESCRIPTION, TagValue::Str("CVR 2000 Ear".into()));
        assert_eq!(body_part(&ds), BodyPart::Ear);
    }

    #[test]
    fn dti_defaults_to_32_when_unspecified() {
        let ds = FakeDataset::default().with(SERIES_DESCRIPTION, TagValue::Str("Ax DTI".into()));
        assert_eq!(dti_directions(&ds), DtiDirections::B32);
    }

    #[test]
    fn bravo_matches_fspgr_alias() {
        let ds = FakeDataset::default().with(SERIES_DESCRIPTION, TagValue::Str("Ax FSPGR BRAVO".into()));
        assert_eq!(bravo(&ds), SeriesMarker::Bravo);
    }

    #[test]
    fn t1_flair_requires_tr_te_window_not_description() {
        let ds = FakeDataset::default()
            .with(SERIES_DESCRIPTION, TagValue::Str("Ax T1 FLAIR".into()))
            .with(REPETITION_TIME, TagValue::Float(2000.0))
            .with(ECHO_TIME, TagValue::Float(40.0));
        assert_eq!(flair(&ds, FlairFamily::T1), SeriesMarker::Null);

        let ds = FakeDataset::default()
            .with(SERIES_DESCRIPTION, TagValue::Str("Ax T1".into()))
            .with(REPETITION_TIME, TagValue::Float(2000.0))
            .with(ECHO_TIME, TagValue::Float(20.0));
        assert_eq!(flair(&ds, FlairFamily::T1), SeriesMarker::Flair);
    }

    #[test]
    fn t2_flair_requires_high_te_and_inversion_time_present() {
        let ds = FakeDataset::default()
            .with(ECHO_TIME, TagValue::Float(100.0))
            .with(INVERSION_TIME, TagValue::Float(2500.0));
        assert_eq!(flair(&ds, FlairFamily::T2), SeriesMarker::Flair);

        let ds = FakeDataset::default().with(ECHO_TIME, TagValue::Float(100.0));
        assert_eq!(flair(&ds, FlairFamily::T2), SeriesMarker::Null, "no FLAIR without inversion time");

        let ds = FakeDataset::default()
            .with(ECHO_TIME, TagValue::Float(40.0))
            .with(INVERSION_TIME, TagValue::Float(2500.0));
        assert_eq!(flair(&ds, FlairFamily::T2), SeriesMarker::Null, "no FLAIR below the TE threshold");
    }

    #[test]
    fn contrast_mr_falls_back_to_description_regex_without_an_agent_tag() {
        let ds = FakeDataset::default()
            .with(MODALITY, TagValue::Str("MR".into()))
            .with(SERIES_DESCRIPTION, TagValue::Str("Sag T1 +C".into()));
        assert_eq!(contrast(&ds), Contrast::Ce);
    }

    #[test]
    fn contrast_mr_without_agent_or_description_match_is_ne() {
        let ds = FakeDataset::default()
            .with(MODALITY, TagValue::Str("MR".into()))
            .with(SERIES_DESCRIPTION, TagValue::Str("Sag T1".into()));
        assert_eq!(contrast(&ds), Contrast::Ne);
    }

    #[test]
    fn contrast_ct_ignores_description_and_needs_an_agent() {
        let ds = FakeDataset::default()
            .with(MODALITY, TagValue::Str("CT".into()))
            .with(SERIES_DESCRIPTION, TagValue::Str("Chest +C".into()));
        assert_eq!(contrast(&ds), Contrast::Ne);

        let ds = FakeDataset::default()
            .with(MODALITY, TagValue::Str("CT".into()))
            .with(CONTRAST_BOLUS_AGENT, TagValue::Str("Omnipaque".into()));
        assert_eq!(contrast(&ds), Contrast::Ce);
    }
}
