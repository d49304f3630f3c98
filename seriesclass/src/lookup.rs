//! Read-only view over a DICOM dataset, generalized from the direct
//! `InMemDicomObject` tag access in `dcm_grep`'s pattern matcher so this
//! crate never needs to depend on `dicom-object` file I/O.

use dicom_core::Tag;

/// A single extracted value, narrowed to the shapes the extractors need.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Str(String),
    Strs(Vec<String>),
    Int(i64),
    Float(f64),
}

impl TagValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_strs(&self) -> Option<&[String]> {
        match self {
            TagValue::Strs(v) => Some(v.as_slice()),
            TagValue::Str(s) => Some(std::slice::from_ref(s)),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            TagValue::Int(i) => Some(*i),
            TagValue::Float(f) => Some(*f as i64),
            TagValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            TagValue::Float(f) => Some(*f),
            TagValue::Int(i) => Some(*i as f64),
            TagValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Read-only tag lookup. Implemented in `archivist` over
/// `dicom_object::InMemDicomObject`, and by `tests` fixtures in this crate
/// directly over a `HashMap`.
pub trait TagLookup {
    fn get(&self, tag: Tag) -> Option<TagValue>;

    fn get_str(&self, tag: Tag) -> Option<String> {
        self.get(tag).and_then(|v| v.as_str().map(str::to_owned))
    }
}

#[cfg(test)]
pub(crate) mod fixture {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    pub struct FakeDataset(pub HashMap<Tag, TagValue>);

    impl FakeDataset {
        pub fn with(mut self, tag: Tag, value: TagValue) -> Self {
            self.0.insert(tag, value);
            self
        }
    }

    impl TagLookup for FakeDataset {
        fn get(&self, tag: Tag) -> Option<TagValue> {
            self.0.get(&tag).cloned()
        }
    }
}
