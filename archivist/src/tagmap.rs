//! Adapts `dicom_object::InMemDicomObject` to `seriesclass::TagLookup`,
//! generalizing the direct `element`/`element_opt` access patterns used
//! throughout `dcm_data::io::utils` (`to_string_opt`, `to_strings_opt`,
//! `to_int_opt`) into the single trait method the classification engine
//! expects.

use dicom_core::Tag;
use dicom_object::InMemDicomObject;
use rad_archivist_seriesclass::{TagLookup, TagValue};

/// Borrowed read-only view over a parsed DICOM instance.
pub struct DicomObjectLookup<'a>(pub &'a InMemDicomObject);

impl TagLookup for DicomObjectLookup<'_> {
    fn get(&self, tag: Tag) -> Option<TagValue> {
        let element = self.0.element_opt(tag).ok().flatten()?;

        if let Ok(values) = element.to_multi_str() {
            if values.len() > 1 {
                return Some(TagValue::Strs(values.iter().map(|s| clean(s)).collect()));
            }
        }
        if let Ok(i) = element.to_int::<i64>() {
            return Some(TagValue::Int(i));
        }
        if let Ok(f) = element.to_float64() {
            return Some(TagValue::Float(f));
        }
        if let Ok(s) = element.to_str() {
            let cleaned = clean(&s);
            return (!cleaned.is_empty()).then_some(TagValue::Str(cleaned));
        }
        None
    }
}

/// DICOM string values are padded with trailing spaces or a NUL byte to an
/// even length; strip both before handing the value to an extractor.
fn clean(s: &str) -> String {
    s.trim_matches('\0').trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::{DataElement, PrimitiveValue, VR};
    use dicom_dictionary_std::tags;

    #[test]
    fn reads_a_padded_string_element() {
        let mut obj = InMemDicomObject::new_empty();
        obj.put(DataElement::new(tags::MODALITY, VR::CS, PrimitiveValue::from("MR ")));
        let lookup = DicomObjectLookup(&obj);
        assert_eq!(lookup.get_str(tags::MODALITY).as_deref(), Some("MR"));
    }

    #[test]
    fn reads_a_multivalued_element() {
        let mut obj = InMemDicomObject::new_empty();
        obj.put(DataElement::new(
            tags::IMAGE_ORIENTATION_PATIENT,
            VR::DS,
            PrimitiveValue::from(vec!["1".to_string(), "0".to_string(), "0".to_string(), "0".to_string(), "1".to_string(), "0".to_string()]),
        ));
        let lookup = DicomObjectLookup(&obj);
        let values = lookup.get(tags::IMAGE_ORIENTATION_PATIENT).and_then(|v| v.as_strs().map(<[String]>::to_vec));
        assert_eq!(values, Some(vec!["1".into(), "0".into(), "0".into(), "0".into(), "1".into(), "0".into()]));
    }

    #[test]
    fn missing_tag_is_none() {
        let obj = InMemDicomObject::new_empty();
        let lookup = DicomObjectLookup(&obj);
        assert!(lookup.get(tags::MODALITY).is_none());
    }
}
