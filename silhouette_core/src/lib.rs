#![forbid(unsafe_code)]

//! Measurement inference, adjustment and confidence scoring for outfit sizing.
//!
//! This crate provides:
//! - Domain types (measurement sets, body types, measurement systems)
//! - Reference tables (plausible ranges, defaults, adjustment factors)
//! - Estimation pipeline (defaults, classification, seasonal/special/cultural adjustments)
//! - Unit conversion, range validation and confidence scoring
//! - Read-only loading of historical observations

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod clock;
pub mod classifier;
pub mod adjustments;
pub mod converter;
pub mod validation;
pub mod confidence;
pub mod history;
pub mod estimator;
pub mod guide;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{measurement_ranges, TRACKED_FIELDS};
pub use config::Config;
pub use clock::{Clock, FixedClock, SystemClock};
pub use classifier::{calculate_cup_size, classify_ratios, determine_body_type};
pub use adjustments::adjust_by_age;
pub use converter::UnitConverter;
pub use validation::{RangeValidator, ValidationReport, Violation};
pub use confidence::ConfidenceScorer;
pub use history::load_history;
pub use estimator::{AssessOptions, Assessment, EstimateOptions, MeasurementEstimator};
pub use guide::{get_guide, Guide};
