//! Static reference tables for the measurement engine.
//!
//! Plausible ranges, default values, and the multiplicative factor tables
//! used by the adjustment pipeline. Everything here is immutable.

use crate::types::{fields, Band, BodyType, MeasurementRange, MeasurementSet, MeasurementSystem, Season, SpecialRequirement};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Field name paired with a multiplicative factor
pub type FactorTable = &'static [(&'static str, f64)];

/// Body measurements tracked by validation and confidence scoring
pub const TRACKED_FIELDS: [&str; 8] = [
    fields::HEIGHT,
    fields::WEIGHT,
    fields::BUST,
    fields::UNDERBUST,
    fields::WAIST,
    fields::HIPS,
    fields::SHOULDER_WIDTH,
    fields::ARM_LENGTH,
];

/// Fields that always exist after estimation, with their built-in defaults
pub const REQUIRED_DEFAULTS: [(&str, f64); 8] = [
    (fields::HEIGHT, 165.0),
    (fields::WEIGHT, 60.0),
    (fields::BUST, 85.0),
    (fields::WAIST, 70.0),
    (fields::HIPS, 90.0),
    (fields::INSEAM, 75.0),
    (fields::SHOULDER_WIDTH, 38.0),
    (fields::ARM_LENGTH, 58.0),
];

/// Length fields converted between centimetres and inches
pub const LENGTH_FIELDS: [&str; 8] = [
    fields::HEIGHT,
    fields::BUST,
    fields::UNDERBUST,
    fields::WAIST,
    fields::HIPS,
    fields::INSEAM,
    fields::SHOULDER_WIDTH,
    fields::ARM_LENGTH,
];

/// Weight fields converted between kilograms and pounds
pub const WEIGHT_FIELDS: [&str; 1] = [fields::WEIGHT];

/// Fields scaled by the seasonal adjustment
pub const SEASONAL_FIELDS: [&str; 4] = [fields::BUST, fields::WAIST, fields::HIPS, fields::WEIGHT];

/// A tracked field only counts towards completeness when its dependency is present
pub const DEPENDENCIES: [(&str, &str); 3] = [
    (fields::BUST, fields::UNDERBUST),
    (fields::WAIST, fields::HIPS),
    (fields::SHOULDER_WIDTH, fields::HEIGHT),
];

static MEASUREMENT_RANGES: Lazy<BTreeMap<&'static str, MeasurementRange>> = Lazy::new(|| {
    let range = |min, max, unit, description| MeasurementRange {
        min,
        max,
        unit,
        description,
    };

    BTreeMap::from([
        (fields::HEIGHT, range(140.0, 200.0, "cm", "Height from top of head to feet")),
        (fields::WEIGHT, range(40.0, 120.0, "kg", "Body weight")),
        (fields::BUST, range(70.0, 120.0, "cm", "Chest measurement at fullest point")),
        (fields::UNDERBUST, range(65.0, 110.0, "cm", "Chest measurement under bust")),
        (fields::WAIST, range(50.0, 100.0, "cm", "Natural waist measurement")),
        (fields::HIPS, range(70.0, 130.0, "cm", "Hip measurement at fullest point")),
        (fields::SHOULDER_WIDTH, range(30.0, 50.0, "cm", "Shoulder width across back")),
        (fields::ARM_LENGTH, range(50.0, 70.0, "cm", "Arm length from shoulder to wrist")),
        (fields::AGE, range(16.0, 80.0, "years", "Age in years")),
    ])
});

/// Get the cached range table (tracked fields plus age)
pub fn measurement_ranges() -> &'static BTreeMap<&'static str, MeasurementRange> {
    &MEASUREMENT_RANGES
}

/// Range for a single field, if it has one
pub fn range_for(field: &str) -> Option<&'static MeasurementRange> {
    MEASUREMENT_RANGES.get(field)
}

/// The complete default profile published to documentation collaborators
pub fn default_profile() -> MeasurementSet {
    let mut profile: MeasurementSet = REQUIRED_DEFAULTS
        .iter()
        .filter(|(field, _)| *field != fields::INSEAM)
        .map(|&(field, value)| (field, value))
        .collect();

    profile.insert(fields::UNDERBUST, 75.0);
    profile.insert(fields::CUP_SIZE, "B");
    profile.insert(fields::AGE, 30.0);
    profile.insert(fields::BODY_TYPE, BodyType::Hourglass.as_str());
    profile.insert(fields::SPECIAL_REQUIREMENT, SpecialRequirement::None.as_str());
    profile.insert(fields::MEASUREMENT_SYSTEM, MeasurementSystem::Metric.as_str());
    profile.insert(fields::SEASONAL_ADJUSTMENT, 0.0);
    profile
}

// ============================================================================
// Factor tables
// ============================================================================

impl Season {
    /// Multiplier applied to bust, waist, hips and weight
    pub fn factor(&self) -> f64 {
        match self {
            Season::Winter => 1.05,
            Season::Spring => 1.02,
            Season::Summer => 0.98,
            Season::Fall => 1.0,
        }
    }
}

impl SpecialRequirement {
    /// Fields and factors shifted by this physical state
    pub fn adjustments(&self) -> FactorTable {
        match self {
            SpecialRequirement::Pregnant => &[
                (fields::BUST, 1.1),
                (fields::WAIST, 1.3),
                (fields::HIPS, 1.15),
                (fields::WEIGHT, 1.2),
            ],
            SpecialRequirement::PostPregnant => &[
                (fields::BUST, 1.05),
                (fields::WAIST, 1.1),
                (fields::HIPS, 1.1),
                (fields::WEIGHT, 1.1),
            ],
            SpecialRequirement::Athlete => &[
                (fields::SHOULDER_WIDTH, 1.1),
                (fields::ARM_LENGTH, 1.05),
                (fields::WEIGHT, 0.95),
            ],
            SpecialRequirement::None | SpecialRequirement::MedicalCondition => &[],
        }
    }
}

impl MeasurementSystem {
    /// Regional proportion factors; empty for metric and imperial
    pub fn cultural_adjustments(&self) -> FactorTable {
        match self {
            MeasurementSystem::Asian => &[
                (fields::HEIGHT, 0.95),
                (fields::SHOULDER_WIDTH, 0.9),
                (fields::BUST, 0.95),
                (fields::HIPS, 0.95),
            ],
            MeasurementSystem::European => &[
                (fields::HEIGHT, 1.05),
                (fields::SHOULDER_WIDTH, 1.1),
                (fields::BUST, 1.05),
                (fields::HIPS, 1.05),
            ],
            MeasurementSystem::Metric | MeasurementSystem::Imperial => &[],
        }
    }
}

/// Typical ratio bands per body type, used for ratio back-fill
#[derive(Clone, Copy, Debug, serde::Serialize, PartialEq)]
pub struct BodyTypeCharacteristics {
    pub waist_to_hip_ratio: Band,
    pub bust_to_hip_ratio: Band,
    pub shoulder_to_hip_ratio: Band,
}

impl BodyType {
    pub fn characteristics(&self) -> BodyTypeCharacteristics {
        let (wh, bh, sh) = match self {
            BodyType::Hourglass => ((0.7, 0.8), (0.9, 1.1), (0.9, 1.1)),
            BodyType::Pear => ((0.7, 0.8), (0.7, 0.9), (0.7, 0.9)),
            BodyType::Apple => ((0.9, 1.1), (0.9, 1.1), (0.9, 1.1)),
            BodyType::Rectangle => ((0.8, 0.9), (0.9, 1.1), (0.9, 1.1)),
            BodyType::InvertedTriangle => ((0.7, 0.8), (1.1, 1.3), (1.1, 1.3)),
        };

        BodyTypeCharacteristics {
            waist_to_hip_ratio: Band::new(wh.0, wh.1),
            bust_to_hip_ratio: Band::new(bh.0, bh.1),
            shoulder_to_hip_ratio: Band::new(sh.0, sh.1),
        }
    }
}
