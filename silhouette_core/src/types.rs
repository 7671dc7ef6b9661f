//! Core domain types for the Silhouette measurement engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Measurement values and the measurement set they live in
//! - Body types, special requirements, measurement systems
//! - Seasons and cup sizes
//! - Reference ranges

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Well-known measurement field names
pub mod fields {
    pub const HEIGHT: &str = "height";
    pub const WEIGHT: &str = "weight";
    pub const BUST: &str = "bust";
    pub const UNDERBUST: &str = "underbust";
    pub const CUP_SIZE: &str = "cup_size";
    pub const WAIST: &str = "waist";
    pub const HIPS: &str = "hips";
    pub const INSEAM: &str = "inseam";
    pub const SHOULDER_WIDTH: &str = "shoulder_width";
    pub const ARM_LENGTH: &str = "arm_length";
    pub const AGE: &str = "age";
    pub const BODY_TYPE: &str = "body_type";
    pub const SPECIAL_REQUIREMENT: &str = "special_requirement";
    pub const MEASUREMENT_SYSTEM: &str = "measurement_system";
    pub const SEASONAL_ADJUSTMENT: &str = "seasonal_adjustment";
}

// ============================================================================
// Measurement Set
// ============================================================================

/// A single measurement value: either numeric or symbolic
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasurementValue {
    Number(f64),
    Text(String),
}

impl MeasurementValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MeasurementValue::Number(n) => Some(*n),
            MeasurementValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MeasurementValue::Number(_) => None,
            MeasurementValue::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for MeasurementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementValue::Number(n) => write!(f, "{}", n),
            MeasurementValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for MeasurementValue {
    fn from(value: f64) -> Self {
        MeasurementValue::Number(value)
    }
}

impl From<&str> for MeasurementValue {
    fn from(value: &str) -> Self {
        MeasurementValue::Text(value.to_string())
    }
}

impl From<String> for MeasurementValue {
    fn from(value: String) -> Self {
        MeasurementValue::Text(value)
    }
}

/// Mapping from measurement name to value.
///
/// Keys are optional; unrecognised keys are carried through every operation
/// untouched. Serializes as a plain JSON object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementSet(BTreeMap<String, MeasurementValue>);

impl MeasurementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<MeasurementValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&MeasurementValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<MeasurementValue>,
    ) -> Option<MeasurementValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<MeasurementValue> {
        self.0.remove(key)
    }

    /// Numeric value of a field, or None if absent or symbolic
    pub fn number(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(MeasurementValue::as_number)
    }

    /// Symbolic value of a field, or None if absent or numeric
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(MeasurementValue::as_text)
    }

    /// Numeric value of a field that must be numeric when present
    pub fn numeric(&self, key: &str) -> Result<Option<f64>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(MeasurementValue::Number(n)) => Ok(Some(*n)),
            Some(MeasurementValue::Text(s)) => Err(Error::invalid(key, s)),
        }
    }

    /// Parse a symbolic field into its enum, failing on unknown symbols
    pub fn symbol<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr<Err = Error>,
    {
        match self.0.get(key) {
            None => Ok(None),
            Some(MeasurementValue::Text(s)) => s.parse().map(Some),
            Some(MeasurementValue::Number(n)) => Err(Error::invalid(key, n)),
        }
    }

    /// Multiply a numeric field in place. Returns false if the field is
    /// absent or symbolic.
    pub fn scale(&mut self, key: &str, factor: f64) -> bool {
        match self.0.get_mut(key) {
            Some(MeasurementValue::Number(n)) => {
                *n *= factor;
                true
            }
            _ => false,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MeasurementValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for MeasurementSet
where
    K: Into<String>,
    V: Into<MeasurementValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// ============================================================================
// Symbolic Types
// ============================================================================

/// Qualitative torso-proportion classification
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BodyType {
    Hourglass,
    Pear,
    Apple,
    Rectangle,
    InvertedTriangle,
}

impl BodyType {
    pub const ALL: [BodyType; 5] = [
        BodyType::Hourglass,
        BodyType::Pear,
        BodyType::Apple,
        BodyType::Rectangle,
        BodyType::InvertedTriangle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyType::Hourglass => "hourglass",
            BodyType::Pear => "pear",
            BodyType::Apple => "apple",
            BodyType::Rectangle => "rectangle",
            BodyType::InvertedTriangle => "inverted_triangle",
        }
    }
}

impl FromStr for BodyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hourglass" => Ok(BodyType::Hourglass),
            "pear" => Ok(BodyType::Pear),
            "apple" => Ok(BodyType::Apple),
            "rectangle" => Ok(BodyType::Rectangle),
            "inverted_triangle" => Ok(BodyType::InvertedTriangle),
            _ => Err(Error::invalid(fields::BODY_TYPE, s)),
        }
    }
}

/// Physical state shifting expected proportions away from the baseline
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SpecialRequirement {
    #[default]
    None,
    Pregnant,
    PostPregnant,
    MedicalCondition,
    Athlete,
}

impl SpecialRequirement {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialRequirement::None => "none",
            SpecialRequirement::Pregnant => "pregnant",
            SpecialRequirement::PostPregnant => "post_pregnant",
            SpecialRequirement::MedicalCondition => "medical_condition",
            SpecialRequirement::Athlete => "athlete",
        }
    }
}

impl FromStr for SpecialRequirement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(SpecialRequirement::None),
            "pregnant" => Ok(SpecialRequirement::Pregnant),
            "post_pregnant" => Ok(SpecialRequirement::PostPregnant),
            "medical_condition" => Ok(SpecialRequirement::MedicalCondition),
            "athlete" => Ok(SpecialRequirement::Athlete),
            _ => Err(Error::invalid(fields::SPECIAL_REQUIREMENT, s)),
        }
    }
}

/// Unit system or regional proportion variant. Metric is canonical.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementSystem {
    #[default]
    Metric,
    Imperial,
    Asian,
    European,
}

impl MeasurementSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementSystem::Metric => "metric",
            MeasurementSystem::Imperial => "imperial",
            MeasurementSystem::Asian => "asian",
            MeasurementSystem::European => "european",
        }
    }
}

impl FromStr for MeasurementSystem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "metric" => Ok(MeasurementSystem::Metric),
            "imperial" => Ok(MeasurementSystem::Imperial),
            "asian" => Ok(MeasurementSystem::Asian),
            "european" => Ok(MeasurementSystem::European),
            _ => Err(Error::invalid(fields::MEASUREMENT_SYSTEM, s)),
        }
    }
}

/// Season used by the seasonal adjustment step
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Dec-Feb winter, Mar-May spring, Jun-Aug summer, Sep-Nov fall
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Fall,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
        }
    }
}

impl FromStr for Season {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "fall" => Ok(Season::Fall),
            _ => Err(Error::invalid("season", s)),
        }
    }
}

/// Brassiere cup size label
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum CupSize {
    Aa,
    A,
    B,
    C,
    D,
    Dd,
    E,
    F,
}

impl CupSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            CupSize::Aa => "AA",
            CupSize::A => "A",
            CupSize::B => "B",
            CupSize::C => "C",
            CupSize::D => "D",
            CupSize::Dd => "DD",
            CupSize::E => "E",
            CupSize::F => "F",
        }
    }
}

impl FromStr for CupSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "AA" => Ok(CupSize::Aa),
            "A" => Ok(CupSize::A),
            "B" => Ok(CupSize::B),
            "C" => Ok(CupSize::C),
            "D" => Ok(CupSize::D),
            "DD" => Ok(CupSize::Dd),
            "E" => Ok(CupSize::E),
            "F" => Ok(CupSize::F),
            _ => Err(Error::invalid(fields::CUP_SIZE, s)),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(BodyType, SpecialRequirement, MeasurementSystem, Season, CupSize);

// ============================================================================
// Reference Types
// ============================================================================

/// Plausible range for a single measurement
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct MeasurementRange {
    pub min: f64,
    pub max: f64,
    pub unit: &'static str,
    pub description: &'static str,
}

impl MeasurementRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Inclusive ratio band used by body-type rules and characteristics
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Per-measurement confidence in [0, 1]
pub type ConfidenceReport = BTreeMap<String, f64>;
