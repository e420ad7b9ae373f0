//! Cloud Storage JSON API listing types.
//!
//! `items` is omitted entirely for an empty bucket or an empty final page, and
//! `nextPageToken` is omitted on the last page.

use serde::Deserialize;

/// One page of `GET /storage/v1/b/{bucket}/o`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectsPage {
    #[serde(default)]
    pub items: Vec<ObjectItem>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ObjectItem {
    pub name: String,
}
