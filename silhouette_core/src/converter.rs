//! Conversion between measurement systems.
//!
//! Metric is the canonical internal representation. Converting to `asian` or
//! `european` applies the regional proportion factors (compounding if called
//! repeatedly, so always convert from a metric baseline). Converting to
//! `imperial` scales lengths to inches and weights to pounds; converting to
//! `metric` applies the inverse factors to an imperial baseline.

use crate::catalog::{LENGTH_FIELDS, WEIGHT_FIELDS};
use crate::types::{MeasurementSet, MeasurementSystem};
use std::collections::BTreeMap;

pub const CM_TO_IN: f64 = 0.393701;
pub const KG_TO_LB: f64 = 2.20462;
pub const IN_TO_CM: f64 = 2.54;
pub const LB_TO_KG: f64 = 0.453592;

/// Stateless unit converter
#[derive(Clone, Copy, Debug, Default)]
pub struct UnitConverter;

impl UnitConverter {
    pub fn new() -> Self {
        Self
    }

    /// Convert a measurement set to the target system
    pub fn convert(&self, measurements: &MeasurementSet, target: MeasurementSystem) -> MeasurementSet {
        let mut converted = measurements.clone();

        crate::adjustments::apply_cultural(&mut converted, target);

        let factors = match target {
            MeasurementSystem::Imperial => Some((CM_TO_IN, KG_TO_LB)),
            MeasurementSystem::Metric => Some((IN_TO_CM, LB_TO_KG)),
            MeasurementSystem::Asian | MeasurementSystem::European => None,
        };

        if let Some((length, weight)) = factors {
            for field in LENGTH_FIELDS {
                converted.scale(field, length);
            }
            for field in WEIGHT_FIELDS {
                converted.scale(field, weight);
            }
        }

        tracing::debug!("Converted {} fields to {}", converted.len(), target);
        converted
    }

    /// Display unit per measurement name
    pub fn unit_labels(&self, system: MeasurementSystem) -> BTreeMap<&'static str, &'static str> {
        let (length, weight) = match system {
            MeasurementSystem::Imperial => ("in", "lb"),
            _ => ("cm", "kg"),
        };

        LENGTH_FIELDS
            .iter()
            .map(|&field| (field, length))
            .chain(WEIGHT_FIELDS.iter().map(|&field| (field, weight)))
            .collect()
    }

    /// Render a value to one decimal place with its unit suffix
    pub fn format_measurement(&self, value: f64, unit: &str) -> String {
        if unit.is_empty() {
            format!("{:.1}", value)
        } else {
            format!("{:.1} {}", value, unit)
        }
    }
}
