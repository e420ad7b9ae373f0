pub mod app_config;
pub mod config;
pub mod records;
pub mod run_config;

pub use app_config::AppConfig;
pub use config::load_app_config;
pub use records::{
    BestGuessLabelRecord, BoundingBox, DominantColorRecord, FaceBox, FaceRecord, LabelRecord,
    LandmarkRecord, LocalizedObjectRecord, LogoRecord, NormalizedBox, NormalizedRecord,
    SafeSearchRecord, SimilarImageRecord, TextRecord, WebDetectionRecord, WebEntityRecord,
    Quad, NOT_FOUND,
};
pub use run_config::{RunConfig, WriteDisposition, ANNOTATIONS_TABLE};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("invalid write disposition \"{0}\": expected WRITE_TRUNCATE, WRITE_APPEND or WRITE_EMPTY")]
    InvalidWriteDisposition(String),

    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
}
