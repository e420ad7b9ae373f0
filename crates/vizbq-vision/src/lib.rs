pub mod assemble;
pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use assemble::assemble_record;
pub use client::{VisionClient, REQUESTED_FEATURES};
pub use error::VisionError;
pub use types::{AnnotateImageResponse, FeatureType, Likelihood};
