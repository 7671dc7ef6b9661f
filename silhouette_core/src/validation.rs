//! Plausibility checks for measurement sets.
//!
//! Validation never fails with an error: every problem found is collected as
//! a [`Violation`] and returned in a [`ValidationReport`].

use crate::catalog::{range_for, TRACKED_FIELDS};
use crate::types::{fields, BodyType, CupSize, MeasurementSet, MeasurementSystem, MeasurementValue, SpecialRequirement};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A single validation finding
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// The set contains no entries at all
    Empty,
    /// A tracked field lies outside its plausible range
    OutOfRange { field: String, value: f64, min: f64, max: f64 },
    /// A tracked field holds a symbolic value
    NotNumeric { field: String, value: String },
    /// A symbolic field holds an unknown symbol
    UnknownSymbol { field: String, value: String },
    /// A cross-field relationship does not hold
    Relationship { rule: &'static str },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Empty => write!(f, "No measurements provided"),
            Violation::OutOfRange { field, value, min, max } => {
                write!(f, "Invalid {} value: {} (expected {} to {})", field, value, min, max)
            }
            Violation::NotNumeric { field, value } => {
                write!(f, "Invalid {} value: {} (expected a number)", field, value)
            }
            Violation::UnknownSymbol { field, value } => {
                write!(f, "Invalid {} value: {}", field, value)
            }
            Violation::Relationship { rule } => {
                write!(f, "Invalid relationship between measurements: {}", rule)
            }
        }
    }
}

/// Outcome of [`RangeValidator::validate`]
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            is_valid: violations.is_empty(),
            violations,
        }
    }

    /// Human-readable violation messages
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

struct RelationshipRule {
    description: &'static str,
    holds: fn(&MeasurementSet) -> Option<bool>,
}

/// Each rule returns None when one of its fields is missing, which skips it.
const RELATIONSHIP_RULES: [RelationshipRule; 4] = [
    RelationshipRule {
        description: "bust must be greater than underbust",
        holds: |m| Some(m.number(fields::BUST)? > m.number(fields::UNDERBUST)?),
    },
    RelationshipRule {
        description: "hips must be greater than waist",
        holds: |m| Some(m.number(fields::HIPS)? > m.number(fields::WAIST)?),
    },
    RelationshipRule {
        description: "height must be greater than arm_length",
        holds: |m| Some(m.number(fields::HEIGHT)? > m.number(fields::ARM_LENGTH)?),
    },
    RelationshipRule {
        description: "shoulder_width must be less than 30% of height",
        holds: |m| Some(m.number(fields::SHOULDER_WIDTH)? < m.number(fields::HEIGHT)? * 0.3),
    },
];

/// Stateless range and relationship validator
#[derive(Clone, Copy, Debug, Default)]
pub struct RangeValidator;

impl RangeValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a measurement set, collecting every violation found
    pub fn validate(&self, measurements: &MeasurementSet) -> ValidationReport {
        if measurements.is_empty() {
            return ValidationReport::from_violations(vec![Violation::Empty]);
        }

        let mut violations = Vec::new();

        for field in TRACKED_FIELDS {
            let Some(range) = range_for(field) else {
                continue;
            };

            match measurements.get(field) {
                Some(MeasurementValue::Number(value)) if !range.contains(*value) => {
                    violations.push(Violation::OutOfRange {
                        field: field.to_string(),
                        value: *value,
                        min: range.min,
                        max: range.max,
                    });
                }
                Some(MeasurementValue::Text(value)) => {
                    violations.push(Violation::NotNumeric {
                        field: field.to_string(),
                        value: value.clone(),
                    });
                }
                _ => {}
            }
        }

        check_symbol::<BodyType>(measurements, fields::BODY_TYPE, &mut violations);
        check_symbol::<CupSize>(measurements, fields::CUP_SIZE, &mut violations);
        check_symbol::<SpecialRequirement>(measurements, fields::SPECIAL_REQUIREMENT, &mut violations);
        check_symbol::<MeasurementSystem>(measurements, fields::MEASUREMENT_SYSTEM, &mut violations);

        for rule in &RELATIONSHIP_RULES {
            if (rule.holds)(measurements) == Some(false) {
                violations.push(Violation::Relationship {
                    rule: rule.description,
                });
            }
        }

        if !violations.is_empty() {
            tracing::info!("Validation found {} violation(s)", violations.len());
        }

        ValidationReport::from_violations(violations)
    }

    /// Human-readable description of each range rule
    pub fn rule_descriptions(&self) -> Vec<(&'static str, String)> {
        TRACKED_FIELDS
            .iter()
            .filter_map(|&field| {
                let range = range_for(field)?;
                Some((
                    field,
                    format!(
                        "{} must be between {}{} and {}{}",
                        display_name(field),
                        range.min,
                        range.unit,
                        range.max,
                        range.unit
                    ),
                ))
            })
            .collect()
    }
}

/// "shoulder_width" -> "Shoulder width"
fn display_name(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn check_symbol<T>(measurements: &MeasurementSet, field: &str, violations: &mut Vec<Violation>)
where
    T: FromStr,
{
    let Some(value) = measurements.get(field) else {
        return;
    };

    let known = match value {
        MeasurementValue::Text(s) => s.parse::<T>().is_ok(),
        MeasurementValue::Number(_) => false,
    };

    if !known {
        violations.push(Violation::UnknownSymbol {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}
