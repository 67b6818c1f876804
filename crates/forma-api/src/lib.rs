//! REST client for the Forma backend.
//!
//! Thin wrappers over the formation/module/lesson endpoints plus the pure
//! data-shape transforms the front ends apply to formations:
//! - id normalization (`module_10` → `10`)
//! - quiz lesson injection and filtering

pub mod client;
pub mod ids;
pub mod quiz;
pub mod types;

pub use client::FormationClient;
pub use ids::to_numeric_id;
pub use quiz::{filter_quiz_lessons, inject_quiz_lessons, is_quiz_lesson};
pub use types::{FormationSummary, LessonUpdate, ModuleUpdate};

use forma_common::FormaError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("invalid id: {0:?}")]
    InvalidId(String),
}

impl From<ApiError> for FormaError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Network(msg) => FormaError::Network(msg),
            other => FormaError::Api(other.to_string()),
        }
    }
}
