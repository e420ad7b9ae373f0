//! The fixed BigQuery schema for the annotations table.
//!
//! Mirrors the serialized shape of [`vizbq_core::NormalizedRecord`]: every
//! category list is a `REPEATED RECORD`, web detection is a single `RECORD`
//! holding three repeated records, and every leaf is a `NULLABLE` `STRING` or
//! `FLOAT`, the same modes an autodetect load would create.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    String,
    Float,
    Record,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldMode {
    Nullable,
    Required,
    Repeated,
}

/// One column, in the shape of the BigQuery REST `TableFieldSchema`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableFieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub mode: FieldMode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<TableFieldSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub fields: Vec<TableFieldSchema>,
}

fn leaf(name: &str, field_type: FieldType) -> TableFieldSchema {
    TableFieldSchema {
        name: name.to_string(),
        field_type,
        mode: FieldMode::Nullable,
        fields: Vec::new(),
    }
}

fn string(name: &str) -> TableFieldSchema {
    leaf(name, FieldType::String)
}

fn floats<'a>(names: &'a [&'a str]) -> impl Iterator<Item = TableFieldSchema> + 'a {
    names.iter().map(|n| leaf(n, FieldType::Float))
}

fn record(name: &str, mode: FieldMode, fields: Vec<TableFieldSchema>) -> TableFieldSchema {
    TableFieldSchema {
        name: name.to_string(),
        field_type: FieldType::Record,
        mode,
        fields,
    }
}

fn repeated(name: &str, fields: Vec<TableFieldSchema>) -> TableFieldSchema {
    record(name, FieldMode::Repeated, fields)
}

const PIXEL_CORNERS: [&str; 8] = ["x0", "y0", "x1", "y1", "x2", "y2", "x3", "y3"];
const NORMALIZED_CORNERS: [&str; 8] = [
    "normalized_x0",
    "normalized_y0",
    "normalized_x1",
    "normalized_y1",
    "normalized_x2",
    "normalized_y2",
    "normalized_x3",
    "normalized_y3",
];
const FACE_CORNERS: [&str; 8] = ["x_0", "y_0", "x_1", "y_1", "x_2", "y_2", "x_3", "y_3"];

fn face_fields() -> Vec<TableFieldSchema> {
    let mut fields = vec![
        string("name"),
        record(
            "bounding_poly",
            FieldMode::Nullable,
            floats(&FACE_CORNERS).collect(),
        ),
        record(
            "fd_bounding_poly",
            FieldMode::Nullable,
            floats(&FACE_CORNERS).collect(),
        ),
        repeated(
            "landmarks",
            std::iter::once(string("type"))
                .chain(floats(&["x", "y", "z"]))
                .collect(),
        ),
    ];
    fields.extend(floats(&[
        "roll_angle",
        "pan_angle",
        "tilt_angle",
        "detection_confidence",
        "landmarking_confidence",
        "joy_likelihood",
        "sorrow_likelihood",
        "anger_likelihood",
        "surprise_likelihood",
        "under_exposed_likelihood",
        "blurred_likelihood",
        "headwear_likelihood",
    ]));
    fields
}

/// Builds the schema of the `gcp_vision_api_annotations` table.
#[must_use]
pub fn annotation_table_schema() -> TableSchema {
    let fields = vec![
        string("creative_id"),
        string("creative_uri"),
        repeated(
            "localized_object_annotations",
            [string("name")]
                .into_iter()
                .chain(floats(&["score"]))
                .chain(floats(&NORMALIZED_CORNERS))
                .collect(),
        ),
        repeated("face_annotations", face_fields()),
        repeated(
            "logo_annotations",
            [string("description")]
                .into_iter()
                .chain(floats(&["score"]))
                .chain([string("mid")])
                .chain(floats(&PIXEL_CORNERS))
                .collect(),
        ),
        repeated(
            "label_annotations",
            vec![
                string("description"),
                leaf("score", FieldType::Float),
                string("mid"),
                leaf("topicality", FieldType::Float),
            ],
        ),
        repeated(
            "text_annotations",
            [string("description")]
                .into_iter()
                .chain(floats(&PIXEL_CORNERS))
                .collect(),
        ),
        repeated(
            "search_safe_annotations",
            floats(&["adult", "spoof", "medical", "violence", "racy"]).collect(),
        ),
        repeated(
            "dominant_color_annotations",
            floats(&["red", "green", "blue", "score", "pixel_fraction"]).collect(),
        ),
        record(
            "web_detection_annotations",
            FieldMode::Nullable,
            vec![
                repeated(
                    "best_guess_label_annotations",
                    vec![string("label"), string("language_code")],
                ),
                repeated("visually_similar_images_annotations", vec![string("url")]),
                repeated(
                    "web_entities_annotations",
                    vec![
                        string("entity_id"),
                        leaf("score", FieldType::Float),
                        string("description"),
                    ],
                ),
            ],
        ),
    ];

    TableSchema { fields }
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;
