//! Per-category normalization from Vision response types to the flat
//! records in [`vizbq_core::records`].
//!
//! Each function preserves source order and coerces every field to `String`
//! or `f64`. Categories that may be empty fall back to a single placeholder
//! record so the row shape never depends on which detectors fired; safe
//! search and dominant colors are the exceptions.

use vizbq_core::{
    BestGuessLabelRecord, DominantColorRecord, FaceRecord, LabelRecord, LandmarkRecord,
    LocalizedObjectRecord, LogoRecord, Quad, SafeSearchRecord, SimilarImageRecord, TextRecord,
    WebDetectionRecord, WebEntityRecord,
};

use crate::error::VisionError;
use crate::types::{
    EntityAnnotation, FaceAnnotation, ImageProperties, LocalizedObjectAnnotation,
    SafeSearchAnnotation, Vertex, WebDetection,
};

/// Substitutes the placeholder when `records` is empty.
fn or_placeholder<T>(records: Vec<T>, placeholder: fn() -> T) -> Vec<T> {
    if records.is_empty() {
        vec![placeholder()]
    } else {
        records
    }
}

/// Converts a vertex list to four corners, failing unless there are exactly
/// four.
///
/// # Errors
///
/// Returns [`VisionError::MalformedPolygon`] for any other vertex count.
pub fn quad(category: &'static str, vertices: &[Vertex]) -> Result<Quad, VisionError> {
    match vertices {
        [a, b, c, d] => Ok([(a.x, a.y), (b.x, b.y), (c.x, c.y), (d.x, d.y)]),
        _ => Err(VisionError::MalformedPolygon {
            category,
            found: vertices.len(),
        }),
    }
}

/// # Errors
///
/// Returns [`VisionError::MalformedPolygon`] if an object's normalized
/// polygon does not have four vertices.
pub fn normalize_localized_objects(
    objects: &[LocalizedObjectAnnotation],
) -> Result<Vec<LocalizedObjectRecord>, VisionError> {
    let records = objects
        .iter()
        .map(|o| {
            Ok(LocalizedObjectRecord {
                name: o.name.clone(),
                score: o.score,
                bounds: quad(
                    "localized_object",
                    &o.bounding_poly.normalized_vertices,
                )?
                .into(),
            })
        })
        .collect::<Result<Vec<_>, VisionError>>()?;

    Ok(or_placeholder(records, LocalizedObjectRecord::placeholder))
}

/// Names faces `face1`, `face2`, … in response order.
///
/// # Errors
///
/// Returns [`VisionError::MalformedPolygon`] if either face polygon does not
/// have four vertices.
pub fn normalize_faces(faces: &[FaceAnnotation]) -> Result<Vec<FaceRecord>, VisionError> {
    let records = faces
        .iter()
        .enumerate()
        .map(|(idx, face)| {
            Ok(FaceRecord {
                name: format!("face{}", idx + 1),
                bounding_poly: quad("face", &face.bounding_poly.vertices)?.into(),
                fd_bounding_poly: quad("face_fd", &face.fd_bounding_poly.vertices)?.into(),
                landmarks: face
                    .landmarks
                    .iter()
                    .map(|l| LandmarkRecord {
                        kind: l.kind.clone(),
                        x: l.position.x,
                        y: l.position.y,
                        z: l.position.z,
                    })
                    .collect(),
                roll_angle: face.roll_angle,
                pan_angle: face.pan_angle,
                tilt_angle: face.tilt_angle,
                detection_confidence: face.detection_confidence,
                landmarking_confidence: face.landmarking_confidence,
                joy_likelihood: f64::from(face.joy_likelihood.code()),
                sorrow_likelihood: f64::from(face.sorrow_likelihood.code()),
                anger_likelihood: f64::from(face.anger_likelihood.code()),
                surprise_likelihood: f64::from(face.surprise_likelihood.code()),
                under_exposed_likelihood: f64::from(face.under_exposed_likelihood.code()),
                blurred_likelihood: f64::from(face.blurred_likelihood.code()),
                headwear_likelihood: f64::from(face.headwear_likelihood.code()),
            })
        })
        .collect::<Result<Vec<_>, VisionError>>()?;

    Ok(or_placeholder(records, FaceRecord::placeholder))
}

/// # Errors
///
/// Returns [`VisionError::MalformedPolygon`] if a logo polygon does not have
/// four vertices.
pub fn normalize_logos(logos: &[EntityAnnotation]) -> Result<Vec<LogoRecord>, VisionError> {
    let records = logos
        .iter()
        .map(|l| {
            Ok(LogoRecord {
                description: l.description.clone(),
                score: l.score,
                mid: l.mid.clone(),
                bounds: quad("logo", &l.bounding_poly.vertices)?.into(),
            })
        })
        .collect::<Result<Vec<_>, VisionError>>()?;

    Ok(or_placeholder(records, LogoRecord::placeholder))
}

#[must_use]
pub fn normalize_labels(labels: &[EntityAnnotation]) -> Vec<LabelRecord> {
    let records = labels
        .iter()
        .map(|l| LabelRecord {
            description: l.description.clone(),
            score: l.score,
            mid: l.mid.clone(),
            topicality: l.topicality,
        })
        .collect();

    or_placeholder(records, LabelRecord::placeholder)
}

/// The first entry is usually the full text block; later entries are
/// individual words. Both are kept.
///
/// # Errors
///
/// Returns [`VisionError::MalformedPolygon`] if a text polygon does not have
/// four vertices.
pub fn normalize_text(texts: &[EntityAnnotation]) -> Result<Vec<TextRecord>, VisionError> {
    let records = texts
        .iter()
        .map(|t| {
            Ok(TextRecord {
                description: t.description.clone(),
                bounds: quad("text", &t.bounding_poly.vertices)?.into(),
            })
        })
        .collect::<Result<Vec<_>, VisionError>>()?;

    Ok(or_placeholder(records, TextRecord::placeholder))
}

/// Always a single record; a missing annotation scores every field `0`.
#[must_use]
pub fn normalize_safe_search(annotation: Option<&SafeSearchAnnotation>) -> Vec<SafeSearchRecord> {
    let unknown = SafeSearchAnnotation::default();
    let s = annotation.unwrap_or(&unknown);
    vec![SafeSearchRecord {
        adult: f64::from(s.adult.code()),
        spoof: f64::from(s.spoof.code()),
        medical: f64::from(s.medical.code()),
        violence: f64::from(s.violence.code()),
        racy: f64::from(s.racy.code()),
    }]
}

/// No placeholder: an image without color data yields an empty list.
#[must_use]
pub fn normalize_dominant_colors(
    properties: Option<&ImageProperties>,
) -> Vec<DominantColorRecord> {
    properties
        .map(|p| p.dominant_colors.colors.as_slice())
        .unwrap_or_default()
        .iter()
        .map(|c| DominantColorRecord {
            red: c.color.red,
            green: c.color.green,
            blue: c.color.blue,
            score: c.score,
            pixel_fraction: c.pixel_fraction,
        })
        .collect()
}

#[must_use]
pub fn normalize_web_detection(web: Option<&WebDetection>) -> WebDetectionRecord {
    let empty = WebDetection::default();
    let web = web.unwrap_or(&empty);

    let best_guess = web
        .best_guess_labels
        .iter()
        .map(|l| BestGuessLabelRecord {
            label: l.label.clone(),
            language_code: l.language_code.clone(),
        })
        .collect();

    let similar = web
        .visually_similar_images
        .iter()
        .map(|i| SimilarImageRecord { url: i.url.clone() })
        .collect();

    let entities = web
        .web_entities
        .iter()
        .map(|e| WebEntityRecord {
            entity_id: e.entity_id.clone(),
            score: e.score,
            description: e.description.clone(),
        })
        .collect();

    WebDetectionRecord {
        best_guess_label_annotations: or_placeholder(best_guess, BestGuessLabelRecord::placeholder),
        visually_similar_images_annotations: or_placeholder(
            similar,
            SimilarImageRecord::placeholder,
        ),
        web_entities_annotations: or_placeholder(entities, WebEntityRecord::placeholder),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
