//! Performance score, grade and growth classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered thresholds for one score component, highest first.
///
/// The first rung the value clears wins; a value that clears none (including
/// NaN) gets the floor.
struct Buckets {
    rungs: &'static [(f64, u32)],
    inclusive: bool,
    floor: u32,
}

impl Buckets {
    fn award(&self, value: f64) -> u32 {
        self.rungs
            .iter()
            .find(|(threshold, _)| {
                if self.inclusive {
                    value >= *threshold
                } else {
                    value > *threshold
                }
            })
            .map(|(_, points)| *points)
            .unwrap_or(self.floor)
    }
}

/// GMV year-over-year percent, 0–30.
const GROWTH: Buckets = Buckets {
    rungs: &[(50.0, 30), (20.0, 25), (10.0, 20), (0.0, 15), (-10.0, 8)],
    inclusive: false,
    floor: 0,
};

/// Conversion rate percent, 5–25.
const CONVERSION: Buckets = Buckets {
    rungs: &[(4.0, 25), (3.0, 20), (2.0, 15), (1.0, 10)],
    inclusive: true,
    floor: 5,
};

/// Repeat customer rate percent, 5–20.
const REPEAT: Buckets = Buckets {
    rungs: &[(40.0, 20), (30.0, 15), (20.0, 10)],
    inclusive: true,
    floor: 5,
};

/// Average order value, 3–15.
const AOV: Buckets = Buckets {
    rungs: &[(150.0, 15), (100.0, 12), (75.0, 9), (50.0, 6)],
    inclusive: true,
    floor: 3,
};

/// GMV scale, 2–10.
const SCALE: Buckets = Buckets {
    rungs: &[
        (1_000_000.0, 10),
        (500_000.0, 8),
        (100_000.0, 6),
        (10_000.0, 4),
    ],
    inclusive: true,
    floor: 2,
};

/// Points awarded per component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub growth: u32,
    pub conversion: u32,
    pub repeat: u32,
    pub aov: u32,
    pub scale: u32,
}

impl ScoreBreakdown {
    pub fn new(
        gmv_yoy_percent: f64,
        conversion_rate: f64,
        repeat_rate: f64,
        aov: f64,
        gmv: f64,
    ) -> Self {
        Self {
            growth: GROWTH.award(gmv_yoy_percent),
            conversion: CONVERSION.award(conversion_rate),
            repeat: REPEAT.award(repeat_rate),
            aov: AOV.award(aov),
            scale: SCALE.award(gmv),
        }
    }

    pub fn total(&self) -> u32 {
        self.growth + self.conversion + self.repeat + self.aov + self.scale
    }
}

/// Sum of the components, clamped to 100.
pub fn performance_score(breakdown: &ScoreBreakdown) -> u32 {
    breakdown.total().min(100)
}

/// Letter grade for a performance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        write!(f, "{}", letter)
    }
}

pub fn grade_for(score: u32) -> Grade {
    if score >= 90 {
        Grade::A
    } else if score >= 80 {
        Grade::B
    } else if score >= 70 {
        Grade::C
    } else if score >= 60 {
        Grade::D
    } else {
        Grade::F
    }
}

/// Coarse label for GMV year-over-year growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthClass {
    Exceptional,
    Strong,
    Moderate,
    Flat,
    Declining,
}

impl GrowthClass {
    pub fn classify(gmv_yoy_percent: f64) -> Self {
        if gmv_yoy_percent > 30.0 {
            GrowthClass::Exceptional
        } else if gmv_yoy_percent > 15.0 {
            GrowthClass::Strong
        } else if gmv_yoy_percent > 0.0 {
            GrowthClass::Moderate
        } else if gmv_yoy_percent > -10.0 {
            GrowthClass::Flat
        } else {
            GrowthClass::Declining
        }
    }
}

impl fmt::Display for GrowthClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GrowthClass::Exceptional => "exceptional",
            GrowthClass::Strong => "strong",
            GrowthClass::Moderate => "moderate",
            GrowthClass::Flat => "flat",
            GrowthClass::Declining => "declining",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_buckets() {
        assert_eq!(GROWTH.award(120.0), 30);
        assert_eq!(GROWTH.award(50.0), 25);
        assert_eq!(GROWTH.award(15.0), 20);
        assert_eq!(GROWTH.award(0.5), 15);
        assert_eq!(GROWTH.award(0.0), 8);
        assert_eq!(GROWTH.award(-10.0), 0);
        assert_eq!(GROWTH.award(f64::NAN), 0);
    }

    #[test]
    fn test_component_floors() {
        let floor = ScoreBreakdown::new(-50.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(
            floor,
            ScoreBreakdown {
                growth: 0,
                conversion: 5,
                repeat: 5,
                aov: 3,
                scale: 2,
            }
        );
        assert_eq!(performance_score(&floor), 15);
    }

    #[test]
    fn test_inclusive_thresholds() {
        assert_eq!(CONVERSION.award(4.0), 25);
        assert_eq!(CONVERSION.award(3.99), 20);
        assert_eq!(REPEAT.award(40.0), 20);
        assert_eq!(AOV.award(100.0), 12);
        assert_eq!(SCALE.award(1_000_000.0), 10);
        assert_eq!(SCALE.award(9_999.0), 2);
    }

    #[test]
    fn test_maximum_score_is_100() {
        let best = ScoreBreakdown::new(200.0, 10.0, 80.0, 500.0, 5_000_000.0);
        assert_eq!(best.total(), 100);
        assert_eq!(performance_score(&best), 100);
        assert_eq!(grade_for(performance_score(&best)), Grade::A);
    }

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(grade_for(90), Grade::A);
        assert_eq!(grade_for(89), Grade::B);
        assert_eq!(grade_for(80), Grade::B);
        assert_eq!(grade_for(70), Grade::C);
        assert_eq!(grade_for(60), Grade::D);
        assert_eq!(grade_for(59), Grade::F);
        assert_eq!(grade_for(0), Grade::F);
    }

    #[test]
    fn test_growth_classification() {
        assert_eq!(GrowthClass::classify(30.1), GrowthClass::Exceptional);
        assert_eq!(GrowthClass::classify(30.0), GrowthClass::Strong);
        assert_eq!(GrowthClass::classify(15.0), GrowthClass::Moderate);
        assert_eq!(GrowthClass::classify(0.0), GrowthClass::Flat);
        assert_eq!(GrowthClass::classify(-10.0), GrowthClass::Declining);
        assert_eq!(GrowthClass::classify(f64::NAN), GrowthClass::Declining);
    }
}
