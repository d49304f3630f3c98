//! Attribute enumerations produced by the extractors in [`crate::extract`].
//!
//! Every enumeration carries a `Null` variant and implements `Default` to
//! return it, so a strategy can always build an attribute bag without
//! special-casing "not present".

/// Imaging modality, narrowed to the two this crate classifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Modality {
    Mr,
    Ct,
    #[default]
    Null,
}

/// MR acquisition dimensionality (DICOM tag (0018,0023)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AcquisitionType {
    D2,
    D3,
    #[default]
    Null,
}

/// Slice plane, split into the as-acquired and REFORMATTED variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    Sag,
    Axi,
    Cor,
    SagR,
    AxiR,
    CorR,
    #[default]
    Null,
}

impl Orientation {
    /// Promotes a plain orientation to its reformatted counterpart.
    pub fn reformatted(self) -> Orientation {
        match self {
            Orientation::Sag => Orientation::SagR,
            Orientation::Axi => Orientation::AxiR,
            Orientation::Cor => Orientation::CorR,
            other => other,
        }
    }
}

/// Contrast agent administration, derived from the ContrastBolusAgent tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Contrast {
    Ce,
    Ne,
    #[default]
    Null,
}

/// Diffusion b-value, read from the first element of the vendor b-value tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BValue {
    B0,
    B1000,
    #[default]
    Null,
}

/// Repetition time, rounded to the nearest whole millisecond family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Repetition {
    Tr1000,
    Tr2000,
    #[default]
    Null,
}

/// Body part named in the series description for functional MR families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BodyPart {
    Eye,
    Ear,
    #[default]
    Null,
}

/// Free-standing series markers that show up as members of an attribute bag
/// alongside the enums above (mirrors the original's flat `SeriesEnum`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SeriesMarker {
    Flair,
    Cube,
    Bravo,
    Swan,
    ESwan,
    Mip,
    Original,
    Phase,
    /// SWAN magnitude companion to `Phase`; part of the closed enumeration,
    /// never produced because no strategy currently requires it.
    Mag,
    #[default]
    Null,
}

/// Direction count for diffusion tensor imaging series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DtiDirections {
    B32,
    B64,
    #[default]
    Null,
}

/// A single attribute produced by an extractor, wrapped so strategies can
/// build a homogeneous `HashSet<Attribute>` bag regardless of which
/// enumeration it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Modality(Modality),
    Acquisition(AcquisitionType),
    Orientation(Orientation),
    Contrast(Contrast),
    BValue(BValue),
    Repetition(Repetition),
    BodyPart(BodyPart),
    Marker(SeriesMarker),
    Dti(DtiDirections),
}

impl Attribute {
    /// Whether this attribute is the "absent" variant of its enumeration.
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Attribute::Modality(Modality::Null)
                | Attribute::Acquisition(AcquisitionType::Null)
                | Attribute::Orientation(Orientation::Null)
                | Attribute::Contrast(Contrast::Null)
                | Attribute::BValue(BValue::Null)
                | Attribute::Repetition(Repetition::Null)
                | Attribute::BodyPart(BodyPart::Null)
                | Attribute::Marker(SeriesMarker::Null)
                | Attribute::Dti(DtiDirections::Null)
        )
    }
}
