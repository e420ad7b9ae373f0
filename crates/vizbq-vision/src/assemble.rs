//! Builds one [`NormalizedRecord`] from one annotation response.

use vizbq_core::NormalizedRecord;

use crate::error::VisionError;
use crate::normalize::{
    normalize_dominant_colors, normalize_faces, normalize_labels, normalize_localized_objects,
    normalize_logos, normalize_safe_search, normalize_text, normalize_web_detection,
};
use crate::types::AnnotateImageResponse;

/// Runs every category normalizer over `response` and assembles the row.
///
/// Pure: the same inputs always produce an identical record.
///
/// # Errors
///
/// Returns [`VisionError::MalformedPolygon`] if any polygon in the response
/// does not have exactly four vertices.
pub fn assemble_record(
    response: &AnnotateImageResponse,
    creative_id: &str,
    creative_uri: &str,
) -> Result<NormalizedRecord, VisionError> {
    Ok(NormalizedRecord {
        creative_id: creative_id.to_owned(),
        creative_uri: creative_uri.to_owned(),
        localized_object_annotations: normalize_localized_objects(
            &response.localized_object_annotations,
        )?,
        face_annotations: normalize_faces(&response.face_annotations)?,
        logo_annotations: normalize_logos(&response.logo_annotations)?,
        label_annotations: normalize_labels(&response.label_annotations),
        text_annotations: normalize_text(&response.text_annotations)?,
        search_safe_annotations: normalize_safe_search(response.safe_search_annotation.as_ref()),
        dominant_color_annotations: normalize_dominant_colors(
            response.image_properties_annotation.as_ref(),
        ),
        web_detection_annotations: normalize_web_detection(response.web_detection.as_ref()),
    })
}

#[cfg(test)]
mod tests {
    use vizbq_core::{
        BestGuessLabelRecord, FaceRecord, LogoRecord, SimilarImageRecord, WebEntityRecord,
    };

    use super::*;

    const URI: &str = "gs://creatives/banner.png";

    fn parse(json: serde_json::Value) -> AnnotateImageResponse {
        serde_json::from_value(json).expect("fixture should deserialize")
    }

    fn mixed_response() -> AnnotateImageResponse {
        parse(serde_json::json!({
            "labelAnnotations": [
                { "mid": "/m/01", "description": "Poster", "score": 0.91, "topicality": 0.91 },
                { "mid": "/m/02", "description": "Font", "score": 0.85, "topicality": 0.8 }
            ],
            "textAnnotations": [
                {
                    "locale": "en",
                    "description": "SALE",
                    "boundingPoly": { "vertices": [ {}, { "x": 10 }, { "x": 10, "y": 5 }, { "y": 5 } ] }
                }
            ],
            "safeSearchAnnotation": { "adult": "VERY_UNLIKELY", "racy": "POSSIBLE" },
            "webDetection": {}
        }))
    }

    #[test]
    fn scenario_labels_text_and_placeholders() {
        let record = assemble_record(&mixed_response(), URI, URI).unwrap();

        assert_eq!(record.creative_id, URI);
        assert_eq!(record.creative_uri, URI);
        assert_eq!(record.label_annotations.len(), 2);
        assert_eq!(record.label_annotations[1].description, "Font");
        assert_eq!(record.face_annotations, vec![FaceRecord::placeholder()]);
        assert_eq!(record.logo_annotations, vec![LogoRecord::placeholder()]);

        let text = serde_json::to_value(&record.text_annotations).unwrap();
        assert_eq!(
            text,
            serde_json::json!([{
                "description": "SALE",
                "x0": 0.0, "y0": 0.0,
                "x1": 10.0, "y1": 0.0,
                "x2": 10.0, "y2": 5.0,
                "x3": 0.0, "y3": 5.0
            }])
        );

        let web = &record.web_detection_annotations;
        assert_eq!(
            web.best_guess_label_annotations,
            vec![BestGuessLabelRecord::placeholder()]
        );
        assert_eq!(
            web.visually_similar_images_annotations,
            vec![SimilarImageRecord::placeholder()]
        );
        assert_eq!(
            web.web_entities_annotations,
            vec![WebEntityRecord::placeholder()]
        );

        assert!((record.search_safe_annotations[0].adult - 1.0).abs() < f64::EPSILON);
        assert!((record.search_safe_annotations[0].racy - 3.0).abs() < f64::EPSILON);
        assert!(record.dominant_color_annotations.is_empty());
        assert_eq!(record.face_count(), 0);
    }

    #[test]
    fn empty_response_has_every_column_in_order() {
        let record = assemble_record(&AnnotateImageResponse::default(), URI, URI).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();

        let mut expected = vec!["creative_id", "creative_uri"];
        expected.extend(NormalizedRecord::CATEGORY_KEYS);
        let mut sorted_keys = keys.clone();
        sorted_keys.sort_unstable();
        let mut sorted_expected = expected.clone();
        sorted_expected.sort_unstable();
        assert_eq!(sorted_keys, sorted_expected);

        let text = serde_json::to_string(&record).unwrap();
        let positions: Vec<usize> = expected
            .iter()
            .map(|k| text.find(&format!("\"{k}\"")).expect("key present"))
            .collect();
        assert!(
            positions.windows(2).all(|w| w[0] < w[1]),
            "columns out of order: {text}"
        );
    }

    #[test]
    fn assembling_twice_is_byte_identical() {
        let response = mixed_response();
        let first = serde_json::to_string(&assemble_record(&response, URI, URI).unwrap()).unwrap();
        let second = serde_json::to_string(&assemble_record(&response, URI, URI).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn malformed_logo_polygon_aborts_assembly() {
        let response = parse(serde_json::json!({
            "logoAnnotations": [
                { "description": "Acme", "boundingPoly": { "vertices": [ {}, {}, {} ] } }
            ]
        }));
        let err = assemble_record(&response, URI, URI).unwrap_err();
        assert!(matches!(
            err,
            VisionError::MalformedPolygon {
                category: "logo",
                found: 3
            }
        ));
    }
}
