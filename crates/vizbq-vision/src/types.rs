//! Cloud Vision `images:annotate` request and response types.
//!
//! ## Wire notes
//!
//! Responses are proto3 JSON: fields at their zero value are omitted. A
//! vertex at the origin arrives as `{}`, an unset likelihood is simply
//! missing, and a category with no hits has no key at all. Every field here
//! therefore carries `#[serde(default)]`.
//!
//! Pixel vertices are integers on the wire and normalized vertices are
//! floats; both deserialize into [`Vertex`] with `f64` coordinates.
//!
//! `safeSearchAnnotation` is absent when nothing was scored; the default
//! value (all [`Likelihood::Unknown`]) stands in for it.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Detection features the service can run. Only the ones this system asks
/// for are modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureType {
    ObjectLocalization,
    FaceDetection,
    LogoDetection,
    LabelDetection,
    TextDetection,
    SafeSearchDetection,
    ImageProperties,
    CropHints,
    WebDetection,
    ProductSearch,
}

#[derive(Debug, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: FeatureType,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSource {
    pub image_uri: String,
}

#[derive(Debug, Serialize)]
pub struct Image {
    pub source: ImageSource,
}

#[derive(Debug, Serialize)]
pub struct AnnotateImageRequest {
    pub image: Image,
    pub features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
pub struct BatchAnnotateImagesRequest {
    pub requests: Vec<AnnotateImageRequest>,
}

impl BatchAnnotateImagesRequest {
    /// A one-image batch asking for `features` in the given order.
    #[must_use]
    pub fn single(image_uri: &str, features: &[FeatureType]) -> Self {
        Self {
            requests: vec![AnnotateImageRequest {
                image: Image {
                    source: ImageSource {
                        image_uri: image_uri.to_owned(),
                    },
                },
                features: features.iter().map(|&kind| Feature { kind }).collect(),
            }],
        }
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct BatchAnnotateImagesResponse {
    #[serde(default)]
    pub responses: Vec<AnnotateImageResponse>,
}

/// Everything the service returned for one image.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateImageResponse {
    #[serde(default)]
    pub localized_object_annotations: Vec<LocalizedObjectAnnotation>,
    #[serde(default)]
    pub face_annotations: Vec<FaceAnnotation>,
    #[serde(default)]
    pub logo_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    pub label_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    pub text_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    pub safe_search_annotation: Option<SafeSearchAnnotation>,
    #[serde(default)]
    pub image_properties_annotation: Option<ImageProperties>,
    #[serde(default)]
    pub crop_hints_annotation: Option<CropHintsAnnotation>,
    #[serde(default)]
    pub web_detection: Option<WebDetection>,
    /// Requested but not normalized; kept opaque.
    #[serde(default)]
    pub product_search_results: Option<serde_json::Value>,
    /// Set when this image failed while the batch call as a whole succeeded.
    #[serde(default)]
    pub error: Option<Status>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

/// A point; `x`/`y` are pixels or `[0, 1]` fractions depending on the
/// polygon list it came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingPoly {
    #[serde(default)]
    pub vertices: Vec<Vertex>,
    #[serde(default)]
    pub normalized_vertices: Vec<Vertex>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedObjectAnnotation {
    #[serde(default)]
    pub mid: String,
    #[serde(default)]
    pub language_code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub bounding_poly: BoundingPoly,
}

/// Shared shape of logo, label and text annotations.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityAnnotation {
    #[serde(default)]
    pub mid: String,
    #[serde(default)]
    pub locale: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub topicality: f64,
    #[serde(default)]
    pub bounding_poly: BoundingPoly,
}

/// Qualitative confidence bucket used by faces and safe search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Likelihood {
    VeryUnlikely,
    Unlikely,
    Possible,
    Likely,
    VeryLikely,
    /// `UNKNOWN` and any value this client does not recognize.
    #[default]
    #[serde(other)]
    Unknown,
}

impl Likelihood {
    /// The enum's numeric value in the Vision API (`UNKNOWN = 0` …
    /// `VERY_LIKELY = 5`).
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Likelihood::Unknown => 0,
            Likelihood::VeryUnlikely => 1,
            Likelihood::Unlikely => 2,
            Likelihood::Possible => 3,
            Likelihood::Likely => 4,
            Likelihood::VeryLikely => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Landmark {
    /// e.g. `"LEFT_EYE"`; omitted on the wire for `UNKNOWN_LANDMARK`.
    #[serde(rename = "type", default = "unknown_landmark")]
    pub kind: String,
    #[serde(default)]
    pub position: Position,
}

fn unknown_landmark() -> String {
    "UNKNOWN_LANDMARK".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceAnnotation {
    #[serde(default)]
    pub bounding_poly: BoundingPoly,
    /// Tighter box around the skin area, as opposed to the whole head.
    #[serde(default)]
    pub fd_bounding_poly: BoundingPoly,
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
    #[serde(default)]
    pub roll_angle: f64,
    #[serde(default)]
    pub pan_angle: f64,
    #[serde(default)]
    pub tilt_angle: f64,
    #[serde(default)]
    pub detection_confidence: f64,
    #[serde(default)]
    pub landmarking_confidence: f64,
    #[serde(default)]
    pub joy_likelihood: Likelihood,
    #[serde(default)]
    pub sorrow_likelihood: Likelihood,
    #[serde(default)]
    pub anger_likelihood: Likelihood,
    #[serde(default)]
    pub surprise_likelihood: Likelihood,
    #[serde(default)]
    pub under_exposed_likelihood: Likelihood,
    #[serde(default)]
    pub blurred_likelihood: Likelihood,
    #[serde(default)]
    pub headwear_likelihood: Likelihood,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SafeSearchAnnotation {
    #[serde(default)]
    pub adult: Likelihood,
    #[serde(default)]
    pub spoof: Likelihood,
    #[serde(default)]
    pub medical: Likelihood,
    #[serde(default)]
    pub violence: Likelihood,
    #[serde(default)]
    pub racy: Likelihood,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Color {
    #[serde(default)]
    pub red: f64,
    #[serde(default)]
    pub green: f64,
    #[serde(default)]
    pub blue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorInfo {
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub pixel_fraction: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DominantColorsAnnotation {
    #[serde(default)]
    pub colors: Vec<ColorInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProperties {
    #[serde(default)]
    pub dominant_colors: DominantColorsAnnotation,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropHint {
    #[serde(default)]
    pub bounding_poly: BoundingPoly,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub importance_fraction: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropHintsAnnotation {
    #[serde(default)]
    pub crop_hints: Vec<CropHint>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebEntity {
    #[serde(default)]
    pub entity_id: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WebImage {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebLabel {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub language_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebDetection {
    #[serde(default)]
    pub web_entities: Vec<WebEntity>,
    #[serde(default)]
    pub visually_similar_images: Vec<WebImage>,
    #[serde(default)]
    pub best_guess_labels: Vec<WebLabel>,
}
