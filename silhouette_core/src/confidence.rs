//! Per-measurement confidence scoring.
//!
//! Each tracked measurement gets a score in [0, 1] combining four factors:
//! - Recency of the observation (weight 0.3)
//! - Consistency with historical observations (weight 0.3)
//! - Plausibility against the reference range (weight 0.2)
//! - Completeness of the whole set (weight 0.2)

use crate::catalog::{range_for, DEPENDENCIES, TRACKED_FIELDS};
use crate::clock::{Clock, SystemClock};
use crate::types::{ConfidenceReport, MeasurementSet};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;

const RECENCY_WEIGHT: f64 = 0.3;
const CONSISTENCY_WEIGHT: f64 = 0.3;
const RANGE_WEIGHT: f64 = 0.2;
const COMPLETENESS_WEIGHT: f64 = 0.2;

/// Score used for recency or consistency when there is nothing to compare against
const NEUTRAL_SCORE: f64 = 0.5;

/// Confidence scorer; reads "now" from its clock for recency
#[derive(Clone)]
pub struct ConfidenceScorer {
    clock: Arc<dyn Clock>,
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for ConfidenceScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfidenceScorer").finish_non_exhaustive()
    }
}

impl ConfidenceScorer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Score every tracked numeric field present in `measurements`
    pub fn score(
        &self,
        measurements: &MeasurementSet,
        history: Option<&[MeasurementSet]>,
        observed_at: Option<DateTime<Utc>>,
    ) -> ConfidenceReport {
        let recency = self.recency_score(observed_at);
        let completeness = completeness_score(measurements);

        let mut report = ConfidenceReport::new();
        for field in TRACKED_FIELDS {
            let Some(value) = measurements.number(field) else {
                continue;
            };

            let consistency = consistency_score(field, value, history);
            let range = range_score(field, value);

            let score = recency * RECENCY_WEIGHT
                + consistency * CONSISTENCY_WEIGHT
                + range * RANGE_WEIGHT
                + completeness * COMPLETENESS_WEIGHT;

            tracing::trace!(
                "{}: recency={} consistency={} range={} completeness={:.3} -> {:.3}",
                field,
                recency,
                consistency,
                range,
                completeness,
                score
            );
            report.insert(field.to_string(), score);
        }

        tracing::debug!("Scored confidence for {} measurements", report.len());
        report
    }

    /// 1.0 within a week, stepping down to 0.2 beyond 180 days
    pub fn recency_score(&self, observed_at: Option<DateTime<Utc>>) -> f64 {
        let Some(observed_at) = observed_at else {
            return NEUTRAL_SCORE;
        };

        let days_old = (self.clock.now() - observed_at).num_days();
        match days_old {
            d if d <= 7 => 1.0,
            d if d <= 30 => 0.8,
            d if d <= 90 => 0.6,
            d if d <= 180 => 0.4,
            _ => 0.2,
        }
    }
}

/// Mean and population standard deviation
pub fn mean_and_std_dev(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

/// Z-score banding against the field's historical values
pub fn consistency_score(field: &str, value: f64, history: Option<&[MeasurementSet]>) -> f64 {
    let values: Vec<f64> = history
        .unwrap_or_default()
        .iter()
        .filter_map(|observation| observation.number(field))
        .collect();

    let Some((mean, std_dev)) = mean_and_std_dev(&values) else {
        return NEUTRAL_SCORE;
    };

    if std_dev <= f64::EPSILON {
        return if (value - mean).abs() < 0.1 { 1.0 } else { 0.0 };
    }

    z_score_band((value - mean).abs() / std_dev)
}

fn z_score_band(z: f64) -> f64 {
    if z <= 1.0 {
        1.0
    } else if z <= 2.0 {
        0.8
    } else if z <= 3.0 {
        0.6
    } else {
        0.4
    }
}

/// 1.0 inside the range, 0.8 within 10% beyond it, 0.6 within 20%, else 0.4
pub fn range_score(field: &str, value: f64) -> f64 {
    let Some(range) = range_for(field) else {
        return NEUTRAL_SCORE;
    };

    if range.contains(value) {
        1.0
    } else if range.min * 0.9 <= value && value <= range.max * 1.1 {
        0.8
    } else if range.min * 0.8 <= value && value <= range.max * 1.2 {
        0.6
    } else {
        0.4
    }
}

/// Share of tracked fields present, not counting fields whose dependency is missing
pub fn completeness_score(measurements: &MeasurementSet) -> f64 {
    let mut available: BTreeSet<&str> = TRACKED_FIELDS
        .iter()
        .copied()
        .filter(|field| measurements.contains(field))
        .collect();

    for (field, dependency) in DEPENDENCIES {
        if !measurements.contains(dependency) {
            available.remove(field);
        }
    }

    available.len() as f64 / TRACKED_FIELDS.len() as f64
}
