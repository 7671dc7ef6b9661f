//! Estimation engine for filling and adjusting measurement sets.
//!
//! The `estimate` pipeline:
//! 1. Fill absent required measurements with configured defaults
//! 2. Classify body type if the caller didn't supply one
//! 3. Default `special_requirement` to none and `measurement_system` to metric
//! 4. Seasonal adjustment
//! 5. Special-requirement adjustment
//! 6. Cultural adjustment
//!
//! Steps 4-6 always run in that order. Unit conversion, validation, confidence
//! scoring, ratio back-fill and age adjustment are separate operations; only
//! `assess` chains them together.

use crate::adjustments::{apply_cultural, apply_seasonal, apply_special_requirement};
use crate::clock::{Clock, SystemClock};
use crate::config::{Config, DefaultsConfig};
use crate::guide::{build_guide, Guide};
use crate::types::{
    fields, BodyType, ConfidenceReport, CupSize, MeasurementSet, MeasurementSystem, Season,
    SpecialRequirement,
};
use crate::{ConfidenceScorer, Error, RangeValidator, Result, UnitConverter, ValidationReport};
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Numeric fields that must hold finite, non-negative numbers when present
const NUMERIC_FIELDS: [&str; 10] = [
    fields::HEIGHT,
    fields::WEIGHT,
    fields::BUST,
    fields::UNDERBUST,
    fields::WAIST,
    fields::HIPS,
    fields::INSEAM,
    fields::SHOULDER_WIDTH,
    fields::ARM_LENGTH,
    fields::AGE,
];

/// Per-call estimation options
#[derive(Clone, Copy, Debug, Default)]
pub struct EstimateOptions {
    /// Use this season instead of deriving one
    pub season: Option<Season>,
    /// Derive the season from this instant instead of the clock
    pub now: Option<DateTime<Utc>>,
}

/// Options for a full assessment
#[derive(Clone, Copy, Debug, Default)]
pub struct AssessOptions<'a> {
    pub estimate: EstimateOptions,
    /// Convert the output to this system (metric leaves it canonical)
    pub target: Option<MeasurementSystem>,
    pub history: Option<&'a [MeasurementSet]>,
    pub observed_at: Option<DateTime<Utc>>,
}

/// Result of a full assessment
#[derive(Clone, Debug, Serialize)]
pub struct Assessment {
    pub measurements: MeasurementSet,
    pub body_type: BodyType,
    pub cup_size: Option<CupSize>,
    pub validation: ValidationReport,
    pub confidence: ConfidenceReport,
    /// Fields the engine filled in rather than the caller
    pub estimated: Vec<String>,
}

/// Measurement estimator owning its default table and clock
#[derive(Clone)]
pub struct MeasurementEstimator {
    defaults: DefaultsConfig,
    season: Option<Season>,
    clock: Arc<dyn Clock>,
    converter: UnitConverter,
    validator: RangeValidator,
    scorer: ConfidenceScorer,
}

impl Default for MeasurementEstimator {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl std::fmt::Debug for MeasurementEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasurementEstimator")
            .field("defaults", &self.defaults)
            .field("season", &self.season)
            .finish_non_exhaustive()
    }
}

impl MeasurementEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            defaults: config.defaults.clone(),
            season: config.estimation.season,
            clock: clock.clone(),
            converter: UnitConverter::new(),
            validator: RangeValidator::new(),
            scorer: ConfidenceScorer::new(clock),
        }
    }

    /// Replace the time source for season derivation and recency scoring
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.scorer = ConfidenceScorer::new(clock.clone());
        self.clock = clock;
        self
    }

    /// Season used for a call: explicit option, then configured, then calendar
    pub fn season_for(&self, options: &EstimateOptions) -> Season {
        options.season.or(self.season).unwrap_or_else(|| {
            let now = options.now.unwrap_or_else(|| self.clock.now());
            Season::from_month(now.month())
        })
    }

    /// Produce a complete, adjusted measurement set from a partial one
    pub fn estimate(
        &self,
        partial: &MeasurementSet,
        options: &EstimateOptions,
    ) -> Result<MeasurementSet> {
        check_numeric_fields(partial)?;
        let supplied_body_type: Option<BodyType> = partial.symbol(fields::BODY_TYPE)?;
        let requirement: SpecialRequirement = partial
            .symbol(fields::SPECIAL_REQUIREMENT)?
            .unwrap_or_default();
        let system: MeasurementSystem = partial
            .symbol(fields::MEASUREMENT_SYSTEM)?
            .unwrap_or_default();

        let mut estimated = partial.clone();

        for (field, value) in self.defaults.entries() {
            if !estimated.contains(field) {
                estimated.insert(field, value);
            }
        }

        if supplied_body_type.is_none() {
            let body_type = crate::classifier::determine_body_type(&estimated);
            estimated.insert(fields::BODY_TYPE, body_type.as_str());
        }

        if !estimated.contains(fields::SPECIAL_REQUIREMENT) {
            estimated.insert(fields::SPECIAL_REQUIREMENT, requirement.as_str());
        }
        if !estimated.contains(fields::MEASUREMENT_SYSTEM) {
            estimated.insert(fields::MEASUREMENT_SYSTEM, system.as_str());
        }

        let season = self.season_for(options);
        apply_seasonal(&mut estimated, season);
        apply_special_requirement(&mut estimated, requirement);
        apply_cultural(&mut estimated, system);

        tracing::info!(
            "Estimated {} measurements ({} supplied), season {}",
            estimated.len(),
            partial.len(),
            season
        );

        Ok(estimated)
    }

    pub fn determine_body_type(&self, measurements: &MeasurementSet) -> BodyType {
        crate::classifier::determine_body_type(measurements)
    }

    pub fn calculate_cup_size(&self, bust: f64, underbust: f64) -> CupSize {
        crate::classifier::calculate_cup_size(bust, underbust)
    }

    pub fn convert(&self, measurements: &MeasurementSet, target: MeasurementSystem) -> MeasurementSet {
        self.converter.convert(measurements, target)
    }

    pub fn validate(&self, measurements: &MeasurementSet) -> ValidationReport {
        self.validator.validate(measurements)
    }

    pub fn score_confidence(
        &self,
        measurements: &MeasurementSet,
        history: Option<&[MeasurementSet]>,
        observed_at: Option<DateTime<Utc>>,
    ) -> ConfidenceReport {
        self.scorer.score(measurements, history, observed_at)
    }

    /// Copy of `measurements` with the age adjustment applied
    pub fn adjust_by_age(&self, measurements: &MeasurementSet) -> Result<MeasurementSet> {
        let mut adjusted = measurements.clone();
        crate::adjustments::adjust_by_age(&mut adjusted)?;
        Ok(adjusted)
    }

    /// Back-fill hips, waist, bust and shoulder width from body-type ratios.
    ///
    /// Uses the supplied body type, or classifies one. Missing hips are derived
    /// by dividing by the lower bound of the matching ratio band; missing
    /// waist, bust or shoulder width by multiplying hips by it. Afterwards the
    /// cup size is set when bust and underbust are known, and the age
    /// adjustment runs when age is known.
    pub fn estimate_by_body_type(&self, measurements: &MeasurementSet) -> Result<MeasurementSet> {
        check_numeric_fields(measurements)?;
        let mut filled = measurements.clone();

        let body_type = match filled.symbol::<BodyType>(fields::BODY_TYPE)? {
            Some(body_type) => body_type,
            None => {
                let body_type = self.determine_body_type(&filled);
                filled.insert(fields::BODY_TYPE, body_type.as_str());
                body_type
            }
        };

        let characteristics = body_type.characteristics();
        let ratio_fields = [
            (fields::WAIST, characteristics.waist_to_hip_ratio.min),
            (fields::BUST, characteristics.bust_to_hip_ratio.min),
            (fields::SHOULDER_WIDTH, characteristics.shoulder_to_hip_ratio.min),
        ];

        for (field, ratio) in ratio_fields {
            match (filled.number(field), filled.number(fields::HIPS)) {
                (Some(value), None) => {
                    filled.insert(fields::HIPS, value / ratio);
                    tracing::debug!("Derived hips from {} for {}", field, body_type);
                }
                (None, Some(hips)) => {
                    filled.insert(field, hips * ratio);
                    tracing::debug!("Derived {} from hips for {}", field, body_type);
                }
                _ => {}
            }
        }

        if let (Some(bust), Some(underbust)) = (
            filled.number(fields::BUST),
            filled.number(fields::UNDERBUST),
        ) {
            let cup_size = self.calculate_cup_size(bust, underbust);
            filled.insert(fields::CUP_SIZE, cup_size.as_str());
        }

        crate::adjustments::adjust_by_age(&mut filled)?;
        Ok(filled)
    }

    /// Run the whole flow: estimate, validate, score, then optionally convert
    pub fn assess(&self, partial: &MeasurementSet, options: &AssessOptions<'_>) -> Result<Assessment> {
        let estimated = self.estimate(partial, &options.estimate)?;

        let body_type = estimated
            .symbol(fields::BODY_TYPE)?
            .unwrap_or(crate::classifier::DEFAULT_BODY_TYPE);
        let cup_size = match (
            estimated.number(fields::BUST),
            estimated.number(fields::UNDERBUST),
        ) {
            (Some(bust), Some(underbust)) => Some(self.calculate_cup_size(bust, underbust)),
            _ => None,
        };

        let validation = self.validate(&estimated);
        let confidence = self.score_confidence(&estimated, options.history, options.observed_at);
        let filled = estimated
            .keys()
            .filter(|field| !partial.contains(field))
            .map(str::to_string)
            .collect();

        let measurements = match options.target {
            None | Some(MeasurementSystem::Metric) => estimated,
            Some(target) => self.convert(&estimated, target),
        };

        Ok(Assessment {
            measurements,
            body_type,
            cup_size,
            validation,
            confidence,
            estimated: filled,
        })
    }

    /// Reference data using this estimator's defaults
    pub fn guide(&self) -> Guide {
        build_guide(&self.defaults)
    }
}

/// Length and weight fields, once present, are finite non-negative numbers
fn check_numeric_fields(measurements: &MeasurementSet) -> Result<()> {
    for field in NUMERIC_FIELDS {
        if let Some(value) = measurements.numeric(field)? {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::TimeZone;

    fn fall() -> EstimateOptions {
        EstimateOptions {
            season: Some(Season::Fall),
            now: None,
        }
    }

    fn approx(actual: Option<f64>, expected: f64) {
        let actual = actual.unwrap();
        assert!(
            (actual - expected).abs() < 1e-9,
            "{} != {}",
            actual,
            expected
        );
    }

    fn estimator_at(year: i32, month: u32, day: u32) -> MeasurementEstimator {
        let now = Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap();
        MeasurementEstimator::new().with_clock(Arc::new(FixedClock(now)))
    }

    #[test]
    fn test_estimate_empty_uses_defaults() {
        crate::logging::init_test();
        let estimator = MeasurementEstimator::new();
        let estimated = estimator.estimate(&MeasurementSet::new(), &fall()).unwrap();

        for (field, value) in crate::catalog::REQUIRED_DEFAULTS {
            assert_eq!(estimated.number(field), Some(value), "{}", field);
        }
        assert_eq!(estimated.text("body_type"), Some("hourglass"));
        assert_eq!(estimated.text("special_requirement"), Some("none"));
        assert_eq!(estimated.text("measurement_system"), Some("metric"));
        assert_eq!(estimated.number("seasonal_adjustment"), Some(0.0));
    }

    #[test]
    fn test_estimate_keeps_supplied_values() {
        let partial = MeasurementSet::new()
            .with("height", 170.0)
            .with("bust", 90.0)
            .with("waist", 70.0)
            .with("favourite_colour", "teal");
        let estimated = MeasurementEstimator::new().estimate(&partial, &fall()).unwrap();

        assert_eq!(estimated.number("height"), Some(170.0));
        assert_eq!(estimated.number("bust"), Some(90.0));
        assert_eq!(estimated.number("waist"), Some(70.0));
        assert_eq!(estimated.text("favourite_colour"), Some("teal"));
        assert_eq!(estimated.number("hips"), Some(90.0));
    }

    #[test]
    fn test_season_from_clock() {
        let partial = MeasurementSet::new().with("bust", 100.0);

        let winter = estimator_at(2024, 1, 10).estimate(&partial, &EstimateOptions::default()).unwrap();
        approx(winter.number("bust"), 105.0);

        let summer = estimator_at(2024, 7, 10).estimate(&partial, &EstimateOptions::default()).unwrap();
        approx(summer.number("bust"), 98.0);
        approx(summer.number("seasonal_adjustment"), -2.0);
    }

    #[test]
    fn test_season_precedence() {
        let config = Config {
            estimation: crate::config::EstimationConfig {
                season: Some(Season::Spring),
            },
            ..Config::default()
        };
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let estimator = MeasurementEstimator::from_config(&config).with_clock(Arc::new(FixedClock(now)));

        assert_eq!(estimator.season_for(&EstimateOptions::default()), Season::Spring);
        assert_eq!(
            estimator.season_for(&EstimateOptions {
                season: Some(Season::Summer),
                now: None
            }),
            Season::Summer
        );

        let unpinned = estimator_at(2024, 1, 10);
        let july = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        assert_eq!(unpinned.season_for(&EstimateOptions::default()), Season::Winter);
        assert_eq!(
            unpinned.season_for(&EstimateOptions {
                season: None,
                now: Some(july)
            }),
            Season::Summer
        );
    }

    #[test]
    fn test_adjustments_compound_in_order() {
        let partial = MeasurementSet::new()
            .with("special_requirement", "pregnant")
            .with("measurement_system", "european");
        let options = EstimateOptions {
            season: Some(Season::Winter),
            now: None,
        };
        let estimated = MeasurementEstimator::new().estimate(&partial, &options).unwrap();

        approx(estimated.number("bust"), 85.0 * 1.05 * 1.1 * 1.05);
        approx(estimated.number("waist"), 70.0 * 1.05 * 1.3);
        approx(estimated.number("height"), 165.0 * 1.05);
        approx(estimated.number("weight"), 60.0 * 1.05 * 1.2);
        approx(estimated.number("inseam"), 75.0);
    }

    #[test]
    fn test_body_type_classified_before_adjustments() {
        // Pregnancy widens the waist, but classification sees the raw values
        let partial = MeasurementSet::new()
            .with("bust", 85.0)
            .with("waist", 70.0)
            .with("hips", 100.0)
            .with("shoulder_width", 35.0)
            .with("special_requirement", "pregnant");
        let estimated = MeasurementEstimator::new().estimate(&partial, &fall()).unwrap();
        assert_eq!(estimated.text("body_type"), Some("pear"));
    }

    #[test]
    fn test_supplied_body_type_is_kept() {
        let partial = MeasurementSet::new().with("body_type", "apple");
        let estimated = MeasurementEstimator::new().estimate(&partial, &fall()).unwrap();
        assert_eq!(estimated.text("body_type"), Some("apple"));
    }

    #[test]
    fn test_unknown_symbols_fail_fast() {
        let estimator = MeasurementEstimator::new();

        for (field, value) in [
            ("measurement_system", "martian"),
            ("special_requirement", "tired"),
            ("body_type", "teapot"),
        ] {
            let partial = MeasurementSet::new().with(field, value);
            match estimator.estimate(&partial, &fall()) {
                Err(Error::InvalidValue { field: f, value: v }) => {
                    assert_eq!(f, field);
                    assert_eq!(v, value);
                }
                other => panic!("expected InvalidValue for {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_non_canonical_symbols_rejected() {
        let estimator = MeasurementEstimator::new();

        let partial = MeasurementSet::new().with("special_requirement", "PREGNANT");
        assert!(matches!(
            estimator.estimate(&partial, &fall()),
            Err(Error::InvalidValue { ref field, ref value })
                if field == "special_requirement" && value == "PREGNANT"
        ));

        let partial = MeasurementSet::new().with("measurement_system", " european ");
        assert!(matches!(
            estimator.estimate(&partial, &fall()),
            Err(Error::InvalidValue { ref field, .. }) if field == "measurement_system"
        ));
    }

    #[test]
    fn test_non_numeric_and_negative_rejected() {
        let estimator = MeasurementEstimator::new();
        assert!(estimator
            .estimate(&MeasurementSet::new().with("hips", "wide"), &fall())
            .is_err());
        assert!(estimator
            .estimate(&MeasurementSet::new().with("weight", -5.0), &fall())
            .is_err());
        assert!(estimator
            .estimate(&MeasurementSet::new().with("height", f64::NAN), &fall())
            .is_err());
    }

    #[test]
    fn test_out_of_range_still_estimates() {
        let partial = MeasurementSet::new().with("height", 250.0);
        let estimated = MeasurementEstimator::new().estimate(&partial, &fall()).unwrap();
        assert_eq!(estimated.number("height"), Some(250.0));
        assert!(!MeasurementEstimator::new().validate(&estimated).is_valid);
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let estimator = estimator_at(2024, 4, 1);
        let partial = MeasurementSet::new().with("waist", 72.0).with("age", 41.0);
        let first = estimator.estimate(&partial, &EstimateOptions::default()).unwrap();
        let second = estimator.estimate(&partial, &EstimateOptions::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_configured_defaults() {
        let mut config = Config::default();
        config.defaults.height = 158.0;
        let estimated = MeasurementEstimator::from_config(&config)
            .estimate(&MeasurementSet::new(), &fall())
            .unwrap();
        assert_eq!(estimated.number("height"), Some(158.0));
    }

    #[test]
    fn test_estimate_by_body_type_from_hips() {
        let partial = MeasurementSet::new().with("hips", 100.0).with("body_type", "pear");
        let filled = MeasurementEstimator::new().estimate_by_body_type(&partial).unwrap();

        approx(filled.number("waist"), 70.0);
        approx(filled.number("bust"), 70.0);
        approx(filled.number("shoulder_width"), 70.0);
        assert!(!filled.contains("cup_size"));
    }

    #[test]
    fn test_estimate_by_body_type_from_waist() {
        let partial = MeasurementSet::new()
            .with("waist", 70.0)
            .with("underbust", 78.0)
            .with("body_type", "hourglass");
        let filled = MeasurementEstimator::new().estimate_by_body_type(&partial).unwrap();

        approx(filled.number("hips"), 100.0);
        approx(filled.number("bust"), 90.0);
        assert_eq!(filled.text("cup_size"), Some("C"));
    }

    #[test]
    fn test_estimate_by_body_type_applies_age() {
        let partial = MeasurementSet::new()
            .with("hips", 90.0)
            .with("bust", 85.0)
            .with("weight", 60.0)
            .with("shoulder_width", 38.0)
            .with("waist", 70.0)
            .with("age", 18.0);
        let filled = MeasurementEstimator::new().estimate_by_body_type(&partial).unwrap();

        assert_eq!(filled.text("body_type"), Some("hourglass"));
        approx(filled.number("weight"), 57.0);
        approx(filled.number("hips"), 88.2);
    }

    #[test]
    fn test_adjust_by_age_leaves_input_untouched() {
        let partial = MeasurementSet::new().with("weight", 60.0).with("age", 55.0);
        let adjusted = MeasurementEstimator::new().adjust_by_age(&partial).unwrap();
        approx(adjusted.number("weight"), 63.0);
        assert_eq!(partial.number("weight"), Some(60.0));
    }

    #[test]
    fn test_assess() {
        let partial = MeasurementSet::new()
            .with("bust", 90.0)
            .with("underbust", 80.0)
            .with("waist", 70.0)
            .with("hips", 95.0)
            .with("shoulder_width", 40.0);
        let options = AssessOptions {
            estimate: fall(),
            ..AssessOptions::default()
        };
        let assessment = MeasurementEstimator::new().assess(&partial, &options).unwrap();

        assert_eq!(assessment.body_type, BodyType::Hourglass);
        assert_eq!(assessment.cup_size, Some(CupSize::C));
        assert!(assessment.validation.is_valid);
        assert_eq!(assessment.confidence.len(), 8);
        assert!(assessment.estimated.contains(&"height".to_string()));
        assert!(assessment.estimated.contains(&"body_type".to_string()));
        assert!(!assessment.estimated.contains(&"bust".to_string()));
    }

    #[test]
    fn test_assess_converts_after_scoring() {
        let partial = MeasurementSet::new().with("height", 170.0);
        let options = AssessOptions {
            estimate: fall(),
            target: Some(MeasurementSystem::Imperial),
            ..AssessOptions::default()
        };
        let assessment = MeasurementEstimator::new().assess(&partial, &options).unwrap();

        approx(assessment.measurements.number("height"), 170.0 * 0.393701);
        // scored on the metric value, which is in range
        let metric_only = 0.3 * 0.5 + 0.3 * 0.5 + 0.2 * 1.0;
        assert!(assessment.confidence["height"] >= metric_only);
    }

    #[test]
    fn test_estimator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MeasurementEstimator>();
    }
}
