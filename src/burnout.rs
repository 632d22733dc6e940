use crate::models::{BurnoutLevel, BurnoutMetrics, BurnoutResult};

/// Contribution of each averaged metric to the raw score. Positive weights push
/// toward burnout, negative weights pull away from it.
#[derive(Debug, Clone, Copy)]
pub struct Weights {
    pub work_hours: f64,
    pub stress: f64,
    pub mood: f64,
    pub sleep: f64,
}

pub const WEIGHTS: Weights = Weights {
    work_hours: 5.0,
    stress: 8.0,
    mood: -6.0,
    sleep: -4.0,
};

#[derive(Debug, Clone, Copy)]
pub struct LevelBand {
    pub min_score: u8,
    pub level: BurnoutLevel,
    pub color: &'static str,
    pub description: &'static str,
}

/// Ordered by `min_score`; a score belongs to the last band whose floor it reaches.
pub const LEVEL_BANDS: [LevelBand; 4] = [
    LevelBand {
        min_score: 0,
        level: BurnoutLevel::Low,
        color: "#22C55E",
        description: "You're balanced and managing work well.",
    },
    LevelBand {
        min_score: 25,
        level: BurnoutLevel::Moderate,
        color: "#F59E0B",
        description: "Some stress detected. Monitor workload.",
    },
    LevelBand {
        min_score: 50,
        level: BurnoutLevel::High,
        color: "#F97316",
        description: "Burnout risk rising. Take recovery breaks.",
    },
    LevelBand {
        min_score: 75,
        level: BurnoutLevel::Severe,
        color: "#EF4444",
        description: "Critical burnout risk. Immediate rest advised.",
    },
];

pub const NO_DATA_COLOR: &str = "#9CA3AF";
pub const NO_DATA_DESCRIPTION: &str = "Not enough data yet. Start logging to see insights.";

pub fn raw_score(metrics: &BurnoutMetrics) -> f64 {
    metrics.avg_work_hours * WEIGHTS.work_hours
        + metrics.avg_stress * WEIGHTS.stress
        + metrics.avg_mood * WEIGHTS.mood
        + metrics.avg_sleep * WEIGHTS.sleep
}

pub fn score(metrics: &BurnoutMetrics) -> BurnoutResult {
    let raw = raw_score(metrics);
    let clamped = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 100.0) };
    let score = clamped.round() as u8;
    let band = band_for(score);

    BurnoutResult {
        score,
        level: band.level,
        color: band.color,
        description: band.description,
    }
}

pub fn band_for(score: u8) -> &'static LevelBand {
    LEVEL_BANDS
        .iter()
        .rev()
        .find(|band| score >= band.min_score)
        .unwrap_or(&LEVEL_BANDS[0])
}

/// Sentinel shown when a user has nothing logged yet. Never produced by [`score`].
pub fn no_data() -> BurnoutResult {
    BurnoutResult {
        score: 0,
        level: BurnoutLevel::NoData,
        color: NO_DATA_COLOR,
        description: NO_DATA_DESCRIPTION,
    }
}
