//! Reference data for documentation collaborators.

use crate::catalog::{default_profile, measurement_ranges, BodyTypeCharacteristics};
use crate::config::DefaultsConfig;
use crate::types::{BodyType, MeasurementRange, MeasurementSet, MeasurementSystem};
use crate::{RangeValidator, UnitConverter};
use serde::Serialize;
use std::collections::BTreeMap;

/// Ranges, defaults, rule texts, unit labels and body-type ratio bands
#[derive(Clone, Debug, Serialize)]
pub struct Guide {
    pub ranges: BTreeMap<&'static str, MeasurementRange>,
    pub defaults: MeasurementSet,
    pub validation_rules: BTreeMap<&'static str, String>,
    pub unit_labels: BTreeMap<&'static str, &'static str>,
    pub body_types: BTreeMap<BodyType, BodyTypeCharacteristics>,
}

/// Guide built from the built-in defaults
pub fn get_guide() -> Guide {
    build_guide(&DefaultsConfig::default())
}

pub(crate) fn build_guide(defaults: &DefaultsConfig) -> Guide {
    let mut profile = default_profile();
    for (field, value) in defaults.entries() {
        profile.insert(field, value);
    }

    Guide {
        ranges: measurement_ranges().clone(),
        defaults: profile,
        validation_rules: RangeValidator::new().rule_descriptions().into_iter().collect(),
        unit_labels: UnitConverter::new().unit_labels(MeasurementSystem::Metric),
        body_types: BodyType::ALL
            .iter()
            .map(|body_type| (*body_type, body_type.characteristics()))
            .collect(),
    }
}
