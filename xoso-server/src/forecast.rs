use chrono::NaiveDate;
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::dto::{QuickForecast, Recommendation};

pub const MIN_RANGE_SIZE: u32 = 10;
pub const MAX_RANGE_SIZE: u32 = 60;
pub const DEFAULT_RANGE_SIZE: u32 = 20;

const CANDIDATE_SIZES: [u32; 11] = [10, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Frequency,
    Lstm,
    Markov,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Frequency, Algorithm::Lstm, Algorithm::Markov];

    pub fn label(&self) -> &'static str {
        match self {
            Algorithm::Frequency => "Frequency Analysis",
            Algorithm::Lstm => "Long Short-Term Memory",
            Algorithm::Markov => "Markov Chains",
        }
    }

    /// Accepts the full label or its short alias. Unknown names are `None`.
    pub fn parse(name: &str) -> Option<Algorithm> {
        match name.trim() {
            "Frequency Analysis" | "Frequency" => Some(Algorithm::Frequency),
            "Long Short-Term Memory" | "LSTM" => Some(Algorithm::Lstm),
            "Markov Chains" | "Markov" => Some(Algorithm::Markov),
            _ => None,
        }
    }

    fn base_confidence(&self) -> f64 {
        match self {
            Algorithm::Frequency => 0.60,
            Algorithm::Lstm => 0.70,
            Algorithm::Markov => 0.65,
        }
    }

    /// Inclusive bounds for the first number of the predicted range.
    fn start_bounds(&self) -> (u32, u32) {
        match self {
            Algorithm::Frequency => (60, 80),
            Algorithm::Lstm => (55, 80),
            Algorithm::Markov => (50, 80),
        }
    }

    pub fn confidence(&self, range_size: u32) -> f64 {
        self.base_confidence() + (range_size as f64 - 10.0) * (0.20 / 50.0)
    }
}

pub fn valid_range_size(size: Option<i64>) -> Option<u32> {
    size.filter(|s| (MIN_RANGE_SIZE as i64..=MAX_RANGE_SIZE as i64).contains(s))
        .map(|s| s as u32)
}

/// 31-multiplier string hash. Stable across builds, unlike `DefaultHasher`.
fn label_hash(label: &str) -> i32 {
    label
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32))
}

fn seed_for(algorithm: Algorithm, range_size: u32, today: NaiveDate) -> u64 {
    let epoch_day = today.signed_duration_since(NaiveDate::default()).num_days();
    epoch_day
        .wrapping_add(label_hash(algorithm.label()) as i64)
        .wrapping_add(range_size as i64) as u64
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeForecast {
    pub algorithm: Algorithm,
    pub range_size: u32,
    pub start: u32,
    pub end: u32,
    pub confidence: f64,
}

impl RangeForecast {
    fn to_quick(self) -> QuickForecast {
        QuickForecast {
            range_start: self.start,
            range_end: self.end,
            confidence_score: self.confidence,
            algorithm_used: self.algorithm.label().to_string(),
        }
    }
}

/// Same inputs on the same day always give the same range.
pub fn forecast(algorithm: Algorithm, range_size: u32, today: NaiveDate) -> RangeForecast {
    let mut rng = StdRng::seed_from_u64(seed_for(algorithm, range_size, today));
    let (low, high) = algorithm.start_bounds();
    let mut start = rng.random_range(low..=high);
    let mut end = start + range_size - 1;
    if end > 99 {
        end = 99;
        start = (100u32).saturating_sub(range_size);
    }
    RangeForecast {
        algorithm,
        range_size,
        start,
        end,
        confidence: algorithm.confidence(range_size),
    }
}

/// Picks the best algorithm (and range size when the caller did not fix one).
pub fn recommend(user_size: Option<u32>, today: NaiveDate) -> (RangeForecast, String) {
    let sizes: Vec<u32> = match user_size {
        Some(size) => vec![size],
        None => CANDIDATE_SIZES.to_vec(),
    };

    let mut best: Option<(f64, RangeForecast)> = None;
    for algorithm in Algorithm::ALL {
        for &size in &sizes {
            let candidate = forecast(algorithm, size, today);
            let score = match user_size {
                Some(_) => candidate.confidence,
                None => candidate.confidence - (size as f64 / 100.0) * 0.1,
            };
            if best.map_or(true, |(top, _)| score > top) {
                best = Some((score, candidate));
            }
        }
    }

    let chosen = match best {
        Some((_, forecast)) => forecast,
        None => forecast(Algorithm::Frequency, DEFAULT_RANGE_SIZE, today),
    };
    let percent = chosen.confidence * 100.0;
    let reason = match user_size {
        Some(size) => format!(
            "Với khoảng {} số, {} cho độ tin cậy cao nhất ({:.0}%)",
            size,
            chosen.algorithm.label(),
            percent
        ),
        None => format!(
            "Dựa trên phân tích tổng hợp, {} với khoảng {} số cho độ tin cậy cao nhất ({:.0}%)",
            chosen.algorithm.label(),
            chosen.range_size,
            percent
        ),
    };
    (chosen, reason)
}

pub fn recommendation_dto(chosen: &RangeForecast, reason: String) -> Recommendation {
    Recommendation {
        recommended_algorithm: chosen.algorithm.label().to_string(),
        recommended_range_size: chosen.range_size,
        recommended_range_start: chosen.start,
        recommended_range_end: chosen.end,
        recommended_confidence_score: chosen.confidence,
        reason,
    }
}

/// Forecast for the caller's choice. Missing or unknown algorithms are
/// computed as frequency analysis, an out-of-bounds size as the default of 20.
/// `algorithmUsed` echoes the name the caller asked for.
pub fn quick_forecast(
    algorithm: Option<&str>,
    range_size: Option<i64>,
    recommended: &RangeForecast,
    today: NaiveDate,
) -> QuickForecast {
    let requested = algorithm.map(str::trim).filter(|a| !a.is_empty());
    let kind = requested
        .and_then(Algorithm::parse)
        .unwrap_or(Algorithm::Frequency);
    let size = valid_range_size(range_size).unwrap_or(DEFAULT_RANGE_SIZE);

    let mut quick = if kind == recommended.algorithm && size == recommended.range_size {
        recommended.to_quick()
    } else {
        forecast(kind, size, today).to_quick()
    };
    if let Some(name) = requested {
        quick.algorithm_used = name.to_string();
    }
    quick
}
