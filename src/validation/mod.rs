//! Validation functionality
//!
//! Provides schema normalization: default filling, target type resolution
//! and duplicate column detection.

pub mod normalize;

pub use normalize::{
    DEFAULT_TABLE_NAME, NormalizationReport, NormalizeError, Normalized, SchemaNormalizer,
    normalize_schema,
};
