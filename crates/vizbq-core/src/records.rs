//! Flat, warehouse-ready records produced from one image's annotations.
//!
//! Field names and declaration order are the column names and order of the
//! `gcp_vision_api_annotations` table, so they must not be renamed casually.
//! Every category that can come back empty has a `placeholder()` record that
//! keeps the row shape stable: strings become [`NOT_FOUND`] (or `""` for
//! `mid`) and numbers become `0.0`.

use serde::{Deserialize, Serialize};

/// Sentinel written into string columns of placeholder records.
pub const NOT_FOUND: &str = "Not Found";

/// Four `(x, y)` corners in the order the annotation service supplied them.
pub type Quad = [(f64, f64); 4];

const ZERO_QUAD: Quad = [(0.0, 0.0); 4];

/// Pixel-space polygon flattened as `x0, y0 … x3, y3`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub x3: f64,
    pub y3: f64,
}

impl From<Quad> for BoundingBox {
    fn from(q: Quad) -> Self {
        Self {
            x0: q[0].0,
            y0: q[0].1,
            x1: q[1].0,
            y1: q[1].1,
            x2: q[2].0,
            y2: q[2].1,
            x3: q[3].0,
            y3: q[3].1,
        }
    }
}

/// Polygon in `[0, 1]` image coordinates, flattened as `normalized_x0 …`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBox {
    #[serde(rename = "normalized_x0")]
    pub x0: f64,
    #[serde(rename = "normalized_y0")]
    pub y0: f64,
    #[serde(rename = "normalized_x1")]
    pub x1: f64,
    #[serde(rename = "normalized_y1")]
    pub y1: f64,
    #[serde(rename = "normalized_x2")]
    pub x2: f64,
    #[serde(rename = "normalized_y2")]
    pub y2: f64,
    #[serde(rename = "normalized_x3")]
    pub x3: f64,
    #[serde(rename = "normalized_y3")]
    pub y3: f64,
}

impl From<Quad> for NormalizedBox {
    fn from(q: Quad) -> Self {
        Self {
            x0: q[0].0,
            y0: q[0].1,
            x1: q[1].0,
            y1: q[1].1,
            x2: q[2].0,
            y2: q[2].1,
            x3: q[3].0,
            y3: q[3].1,
        }
    }
}

/// Face polygon, nested under its own key and flattened as `x_0 … y_3`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    #[serde(rename = "x_0")]
    pub x0: f64,
    #[serde(rename = "y_0")]
    pub y0: f64,
    #[serde(rename = "x_1")]
    pub x1: f64,
    #[serde(rename = "y_1")]
    pub y1: f64,
    #[serde(rename = "x_2")]
    pub x2: f64,
    #[serde(rename = "y_2")]
    pub y2: f64,
    #[serde(rename = "x_3")]
    pub x3: f64,
    #[serde(rename = "y_3")]
    pub y3: f64,
}

impl From<Quad> for FaceBox {
    fn from(q: Quad) -> Self {
        Self {
            x0: q[0].0,
            y0: q[0].1,
            x1: q[1].0,
            y1: q[1].1,
            x2: q[2].0,
            y2: q[2].1,
            x3: q[3].0,
            y3: q[3].1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedObjectRecord {
    pub name: String,
    pub score: f64,
    #[serde(flatten)]
    pub bounds: NormalizedBox,
}

impl LocalizedObjectRecord {
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            name: NOT_FOUND.to_string(),
            score: 0.0,
            bounds: ZERO_QUAD.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkRecord {
    /// Landmark kind as the service names it, e.g. `"LEFT_EYE"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl LandmarkRecord {
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            kind: NOT_FOUND.to_string(),
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }
}

/// One detected face.
///
/// Likelihood columns hold the numeric enum code (`0` unknown through `5`
/// very likely), not the label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRecord {
    /// Positional name, `face1` for the first face in the response. Not
    /// stable across runs.
    pub name: String,
    pub bounding_poly: FaceBox,
    pub fd_bounding_poly: FaceBox,
    pub landmarks: Vec<LandmarkRecord>,
    pub roll_angle: f64,
    pub pan_angle: f64,
    pub tilt_angle: f64,
    pub detection_confidence: f64,
    pub landmarking_confidence: f64,
    pub joy_likelihood: f64,
    pub sorrow_likelihood: f64,
    pub anger_likelihood: f64,
    pub surprise_likelihood: f64,
    pub under_exposed_likelihood: f64,
    pub blurred_likelihood: f64,
    pub headwear_likelihood: f64,
}

impl FaceRecord {
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            name: NOT_FOUND.to_string(),
            bounding_poly: ZERO_QUAD.into(),
            fd_bounding_poly: ZERO_QUAD.into(),
            landmarks: vec![LandmarkRecord::placeholder()],
            roll_angle: 0.0,
            pan_angle: 0.0,
            tilt_angle: 0.0,
            detection_confidence: 0.0,
            landmarking_confidence: 0.0,
            joy_likelihood: 0.0,
            sorrow_likelihood: 0.0,
            anger_likelihood: 0.0,
            surprise_likelihood: 0.0,
            under_exposed_likelihood: 0.0,
            blurred_likelihood: 0.0,
            headwear_likelihood: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoRecord {
    pub description: String,
    pub score: f64,
    /// Knowledge Graph machine id; empty when unknown.
    pub mid: String,
    #[serde(flatten)]
    pub bounds: BoundingBox,
}

impl LogoRecord {
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            description: NOT_FOUND.to_string(),
            score: 0.0,
            mid: String::new(),
            bounds: ZERO_QUAD.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRecord {
    pub description: String,
    pub score: f64,
    pub mid: String,
    pub topicality: f64,
}

impl LabelRecord {
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            description: NOT_FOUND.to_string(),
            score: 0.0,
            mid: String::new(),
            topicality: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRecord {
    pub description: String,
    #[serde(flatten)]
    pub bounds: BoundingBox,
}

impl TextRecord {
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            description: NOT_FOUND.to_string(),
            bounds: ZERO_QUAD.into(),
        }
    }
}

/// Safe-search likelihood codes. Always exactly one per image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeSearchRecord {
    pub adult: f64,
    pub spoof: f64,
    pub medical: f64,
    pub violence: f64,
    pub racy: f64,
}

/// One dominant color. Channels are `0..=255` as floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominantColorRecord {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub score: f64,
    pub pixel_fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestGuessLabelRecord {
    pub label: String,
    pub language_code: String,
}

impl BestGuessLabelRecord {
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            label: NOT_FOUND.to_string(),
            language_code: NOT_FOUND.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarImageRecord {
    pub url: String,
}

impl SimilarImageRecord {
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            url: NOT_FOUND.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebEntityRecord {
    pub entity_id: String,
    pub score: f64,
    pub description: String,
}

impl WebEntityRecord {
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            entity_id: NOT_FOUND.to_string(),
            score: 0.0,
            description: NOT_FOUND.to_string(),
        }
    }
}

/// Web-detection results; each list falls back to its own placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebDetectionRecord {
    pub best_guess_label_annotations: Vec<BestGuessLabelRecord>,
    pub visually_similar_images_annotations: Vec<SimilarImageRecord>,
    pub web_entities_annotations: Vec<WebEntityRecord>,
}

/// One row of the annotations table: everything learned about one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Currently the same value as `creative_uri`.
    pub creative_id: String,
    /// Object-store locator, e.g. `"gs://creatives/banner.png"`.
    pub creative_uri: String,
    pub localized_object_annotations: Vec<LocalizedObjectRecord>,
    pub face_annotations: Vec<FaceRecord>,
    pub logo_annotations: Vec<LogoRecord>,
    pub label_annotations: Vec<LabelRecord>,
    pub text_annotations: Vec<TextRecord>,
    /// Always exactly one entry.
    pub search_safe_annotations: Vec<SafeSearchRecord>,
    /// Left empty when the service reports no colors.
    pub dominant_color_annotations: Vec<DominantColorRecord>,
    pub web_detection_annotations: WebDetectionRecord,
}

impl NormalizedRecord {
    /// Category keys in column order, excluding the two identity columns.
    pub const CATEGORY_KEYS: [&'static str; 8] = [
        "localized_object_annotations",
        "face_annotations",
        "logo_annotations",
        "label_annotations",
        "text_annotations",
        "search_safe_annotations",
        "dominant_color_annotations",
        "web_detection_annotations",
    ];

    /// Number of faces actually detected (placeholder excluded).
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.face_annotations
            .iter()
            .filter(|f| f.name != NOT_FOUND)
            .count()
    }
}
