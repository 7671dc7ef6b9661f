//! Body-type classification and cup-size calculation.
//!
//! Body types are decided by an ordered rule table evaluated top to bottom;
//! the first matching rule wins. Apple and rectangle share their waist/hip
//! and bust/hip bands, so apple (which additionally requires a waist of at
//! least 90 cm) must stay ahead of rectangle.

use crate::types::{fields, Band, BodyType, CupSize, MeasurementSet};

/// Proportions derived from the four classification inputs
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyRatios {
    pub waist: f64,
    pub waist_to_hip: f64,
    pub bust_to_hip: f64,
    pub shoulder_to_hip: f64,
}

impl BodyRatios {
    pub fn new(waist: f64, hips: f64, bust: f64, shoulder_width: f64) -> Self {
        Self {
            waist,
            waist_to_hip: waist / hips,
            bust_to_hip: bust / hips,
            shoulder_to_hip: shoulder_width / hips,
        }
    }
}

/// Third condition of a rule, after the waist/hip and bust/hip bands
#[derive(Clone, Copy, Debug)]
enum Guard {
    MinWaist(f64),
    ShoulderToHip(Band),
}

#[derive(Clone, Copy, Debug)]
struct BodyTypeRule {
    body_type: BodyType,
    waist_to_hip: Band,
    bust_to_hip: Band,
    guard: Guard,
}

impl BodyTypeRule {
    fn matches(&self, ratios: &BodyRatios) -> bool {
        let guard = match self.guard {
            Guard::MinWaist(min) => ratios.waist >= min,
            Guard::ShoulderToHip(band) => band.contains(ratios.shoulder_to_hip),
        };

        self.waist_to_hip.contains(ratios.waist_to_hip)
            && self.bust_to_hip.contains(ratios.bust_to_hip)
            && guard
    }
}

/// Evaluation order is significant.
const BODY_TYPE_RULES: [BodyTypeRule; 5] = [
    BodyTypeRule {
        body_type: BodyType::Apple,
        waist_to_hip: Band::new(0.94, 0.95),
        bust_to_hip: Band::new(0.95, 1.05),
        guard: Guard::MinWaist(90.0),
    },
    BodyTypeRule {
        body_type: BodyType::Rectangle,
        waist_to_hip: Band::new(0.94, 0.95),
        bust_to_hip: Band::new(0.95, 1.05),
        guard: Guard::ShoulderToHip(Band::new(0.4, 0.45)),
    },
    BodyTypeRule {
        body_type: BodyType::Pear,
        waist_to_hip: Band::new(0.65, 0.75),
        bust_to_hip: Band::new(0.8, 0.9),
        guard: Guard::ShoulderToHip(Band::new(0.3, 0.4)),
    },
    BodyTypeRule {
        body_type: BodyType::Hourglass,
        waist_to_hip: Band::new(0.7, 0.8),
        bust_to_hip: Band::new(0.9, 1.1),
        guard: Guard::ShoulderToHip(Band::new(0.4, 0.45)),
    },
    BodyTypeRule {
        body_type: BodyType::InvertedTriangle,
        waist_to_hip: Band::new(0.7, 0.8),
        bust_to_hip: Band::new(1.1, 1.2),
        guard: Guard::ShoulderToHip(Band::new(0.45, 0.5)),
    },
];

/// Fallback when no rule matches or inputs are missing
pub const DEFAULT_BODY_TYPE: BodyType = BodyType::Hourglass;

/// Classify from raw measurements
pub fn classify_ratios(waist: f64, hips: f64, bust: f64, shoulder_width: f64) -> BodyType {
    let ratios = BodyRatios::new(waist, hips, bust, shoulder_width);

    let body_type = BODY_TYPE_RULES
        .iter()
        .find(|rule| rule.matches(&ratios))
        .map(|rule| rule.body_type)
        .unwrap_or(DEFAULT_BODY_TYPE);

    tracing::debug!(
        "Body ratios w/h={:.3} b/h={:.3} s/h={:.3} -> {}",
        ratios.waist_to_hip,
        ratios.bust_to_hip,
        ratios.shoulder_to_hip,
        body_type
    );

    body_type
}

/// Determine body type from a measurement set.
///
/// Requires numeric waist, hips, bust and shoulder_width; otherwise falls back
/// to hourglass.
pub fn determine_body_type(measurements: &MeasurementSet) -> BodyType {
    let inputs = (
        measurements.number(fields::WAIST),
        measurements.number(fields::HIPS),
        measurements.number(fields::BUST),
        measurements.number(fields::SHOULDER_WIDTH),
    );

    match inputs {
        (Some(waist), Some(hips), Some(bust), Some(shoulder_width)) => {
            classify_ratios(waist, hips, bust, shoulder_width)
        }
        _ => {
            tracing::debug!("Insufficient measurements to classify, using {}", DEFAULT_BODY_TYPE);
            DEFAULT_BODY_TYPE
        }
    }
}

/// Calculate cup size from bust and underbust (cm)
///
/// A difference of exactly 10 cm is banded by bust size in 5 cm steps;
/// every other difference is banded on the difference itself.
pub fn calculate_cup_size(bust: f64, underbust: f64) -> CupSize {
    let difference = bust - underbust;

    if (difference - 10.0).abs() < 0.01 {
        return if bust <= 85.0 {
            CupSize::B
        } else if bust <= 90.0 {
            CupSize::C
        } else if bust <= 95.0 {
            CupSize::D
        } else if bust <= 100.0 {
            CupSize::Dd
        } else if bust <= 105.0 {
            CupSize::E
        } else {
            CupSize::F
        };
    }

    if difference <= 7.5 {
        CupSize::A
    } else if difference <= 10.0 {
        CupSize::B
    } else if difference <= 12.5 {
        CupSize::C
    } else if difference <= 15.0 {
        CupSize::D
    } else if difference <= 17.5 {
        CupSize::Dd
    } else if difference <= 20.0 {
        CupSize::E
    } else {
        CupSize::F
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(bust: f64, waist: f64, hips: f64, shoulder_width: f64) -> MeasurementSet {
        MeasurementSet::new()
            .with("bust", bust)
            .with("waist", waist)
            .with("hips", hips)
            .with("shoulder_width", shoulder_width)
    }

    #[test]
    fn test_each_body_type() {
        let cases = [
            (body(90.0, 70.0, 95.0, 40.0), BodyType::Hourglass),
            (body(85.0, 70.0, 100.0, 35.0), BodyType::Pear),
            (body(95.0, 90.0, 95.0, 40.0), BodyType::Apple),
            (body(90.0, 85.0, 90.0, 40.0), BodyType::Rectangle),
            (body(100.0, 70.0, 90.0, 45.0), BodyType::InvertedTriangle),
        ];

        for (measurements, expected) in cases {
            assert_eq!(determine_body_type(&measurements), expected);
        }
    }

    #[test]
    fn test_apple_wins_over_rectangle() {
        // Shoulder/hip of 0.42 also satisfies the rectangle rule
        let measurements = body(95.0, 90.0, 95.0, 40.0);
        let ratios = BodyRatios::new(90.0, 95.0, 95.0, 40.0);
        assert!(BODY_TYPE_RULES[1].matches(&ratios));
        assert_eq!(determine_body_type(&measurements), BodyType::Apple);
    }

    #[test]
    fn test_bust_below_apple_band_falls_back() {
        // bust/hip = 0.947 sits just under the 0.95 lower bound of apple and rectangle
        let measurements = body(90.0, 90.0, 95.0, 40.0);
        assert_eq!(determine_body_type(&measurements), BodyType::Hourglass);
    }

    #[test]
    fn test_missing_inputs_default_to_hourglass() {
        let measurements = MeasurementSet::new().with("waist", 90.0).with("hips", 95.0);
        assert_eq!(determine_body_type(&measurements), BodyType::Hourglass);
        assert_eq!(determine_body_type(&MeasurementSet::new()), BodyType::Hourglass);
    }

    #[test]
    fn test_zero_hips_falls_back() {
        assert_eq!(classify_ratios(70.0, 0.0, 90.0, 40.0), BodyType::Hourglass);
    }

    #[test]
    fn test_cup_size_exact_ten_cm_band() {
        let cases = [
            (85.0, 75.0, CupSize::B),
            (90.0, 80.0, CupSize::C),
            (95.0, 85.0, CupSize::D),
            (100.0, 90.0, CupSize::Dd),
            (105.0, 95.0, CupSize::E),
            (110.0, 100.0, CupSize::F),
        ];

        for (bust, underbust, expected) in cases {
            assert_eq!(calculate_cup_size(bust, underbust), expected, "{}/{}", bust, underbust);
        }
    }

    #[test]
    fn test_cup_size_boundaries() {
        assert_eq!(calculate_cup_size(82.5, 75.0), CupSize::A);
        assert_eq!(calculate_cup_size(82.6, 75.0), CupSize::B);
        assert_eq!(calculate_cup_size(87.5, 75.0), CupSize::C);
        assert_eq!(calculate_cup_size(90.0, 75.0), CupSize::D);
        assert_eq!(calculate_cup_size(92.5, 75.0), CupSize::Dd);
        assert_eq!(calculate_cup_size(95.0, 75.0), CupSize::E);
        assert_eq!(calculate_cup_size(95.1, 75.0), CupSize::F);
    }

    #[test]
    fn test_cup_size_near_ten_uses_difference_band() {
        // 10.02 cm is outside the 0.01 tolerance, so it bands as C
        assert_eq!(calculate_cup_size(110.02, 100.0), CupSize::C);
    }
}
