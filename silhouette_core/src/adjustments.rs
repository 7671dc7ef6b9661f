//! Multiplicative adjustment rules.
//!
//! The estimation pipeline applies these in a fixed order:
//! 1. Seasonal (bust, waist, hips, weight)
//! 2. Special requirement (pregnancy, recovery, athletic build)
//! 3. Cultural proportions (asian, european)
//!
//! Each later factor multiplies onto the earlier ones. The age adjustment is
//! a separate utility and never runs as part of the pipeline.

use crate::catalog::{FactorTable, SEASONAL_FIELDS};
use crate::types::{fields, MeasurementSet, MeasurementSystem, Season, SpecialRequirement};
use crate::Result;

/// Multiply every listed field that is present; unlisted fields are untouched
pub fn apply_factors(measurements: &mut MeasurementSet, table: FactorTable) {
    for &(field, factor) in table {
        if measurements.scale(field, factor) {
            tracing::trace!("Scaled {} by {}", field, factor);
        }
    }
}

/// Apply the seasonal factor and record the applied percentage
pub fn apply_seasonal(measurements: &mut MeasurementSet, season: Season) {
    let factor = season.factor();
    for field in SEASONAL_FIELDS {
        measurements.scale(field, factor);
    }

    measurements.insert(fields::SEASONAL_ADJUSTMENT, (factor - 1.0) * 100.0);
    tracing::debug!("Seasonal adjustment: {} (x{})", season, factor);
}

pub fn apply_special_requirement(measurements: &mut MeasurementSet, requirement: SpecialRequirement) {
    if requirement == SpecialRequirement::None {
        return;
    }

    apply_factors(measurements, requirement.adjustments());
    tracing::debug!("Special requirement adjustment: {}", requirement);
}

pub fn apply_cultural(measurements: &mut MeasurementSet, system: MeasurementSystem) {
    let table = system.cultural_adjustments();
    if table.is_empty() {
        return;
    }

    apply_factors(measurements, table);
    tracing::debug!("Cultural adjustment: {}", system);
}

/// Adjust weight, bust and hips for age.
///
/// Under 20 scales them down (0.95 / 0.98 / 0.98), over 50 scales them up
/// (1.05 / 1.02 / 1.02). Ages 20 to 50 and sets without an age are unchanged.
pub fn adjust_by_age(measurements: &mut MeasurementSet) -> Result<()> {
    let Some(age) = measurements.numeric(fields::AGE)? else {
        return Ok(());
    };

    let table: FactorTable = if age < 20.0 {
        &[(fields::WEIGHT, 0.95), (fields::BUST, 0.98), (fields::HIPS, 0.98)]
    } else if age > 50.0 {
        &[(fields::WEIGHT, 1.05), (fields::BUST, 1.02), (fields::HIPS, 1.02)]
    } else {
        return Ok(());
    };

    apply_factors(measurements, table);
    tracing::debug!("Age adjustment applied for age {}", age);
    Ok(())
}
