//! Threshold indicators over a symbol's closing-price column.
//!
//! Every function here degrades to a sentinel (`Unknown` / 0) on short or
//! empty input instead of erroring; only the forecaster rejects a series
//! outright. Thresholds come from `ThresholdConfig`, not literals.

use crate::storage_utils::ThresholdConfig;
use std::fmt;
use ta::Next;
use ta::indicators::StandardDeviation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Bullish,
    Bearish,
    Neutral,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Risk {
    Low,
    Medium,
    High,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrashSignal {
    Stable,
    Downtrend,
    Unknown,
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Mood::Bullish => "Bullish",
            Mood::Bearish => "Bearish",
            Mood::Neutral => "Neutral",
            Mood::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Risk::Low => "Low",
            Risk::Medium => "Medium",
            Risk::High => "High",
            Risk::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

impl fmt::Display for CrashSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CrashSignal::Stable => "Stable",
            CrashSignal::Downtrend => "Downtrend",
            CrashSignal::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Market mood from the percent move between the last close and the close
/// `trend_window` observations back (the window's first element when the
/// series is exactly window-sized).
pub fn trend_mood(closes: &[f64], thresholds: &ThresholdConfig) -> Mood {
    if closes.len() < thresholds.trend_window {
        return Mood::Unknown;
    }

    let reference = closes[closes.len() - thresholds.trend_window];
    if reference == 0.0 {
        return Mood::Unknown;
    }

    let change_pct = (closes[closes.len() - 1] - reference) / reference * 100.0;
    if change_pct > thresholds.trend_pct {
        Mood::Bullish
    } else if change_pct < -thresholds.trend_pct {
        Mood::Bearish
    } else {
        Mood::Neutral
    }
}

/// Standard deviation of day-over-day percent returns, in percent units.
/// `None` when the series yields no returns.
pub fn volatility_pct(closes: &[f64]) -> Option<f64> {
    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|pair| pair[0] != 0.0)
        .map(|pair| (pair[1] - pair[0]) / pair[0] * 100.0)
        .collect();

    if returns.is_empty() {
        return None;
    }

    let mut stddev = StandardDeviation::new(returns.len()).ok()?;

    let mut last: Option<f64> = None;
    for ret in &returns {
        last = Some(stddev.next(*ret));
    }
    last
}

/// Buckets a volatility figure. Boundaries are inclusive-lower /
/// exclusive-upper: exactly `vol_low_max` lands in Medium.
pub fn risk_from_volatility(volatility: f64, thresholds: &ThresholdConfig) -> Risk {
    if volatility < thresholds.vol_low_max {
        Risk::Low
    } else if volatility < thresholds.vol_medium_max {
        Risk::Medium
    } else {
        Risk::High
    }
}

pub fn risk_bucket(closes: &[f64], thresholds: &ThresholdConfig) -> Risk {
    match volatility_pct(closes) {
        Some(volatility) => risk_from_volatility(volatility, thresholds),
        None => Risk::Unknown,
    }
}

/// Flags a short-term downtrend: percent drop from the close
/// `crash_window` observations back to the last close.
pub fn crash_signal(closes: &[f64], thresholds: &ThresholdConfig) -> CrashSignal {
    if closes.len() < thresholds.crash_window {
        return CrashSignal::Unknown;
    }

    let reference = closes[closes.len() - thresholds.crash_window];
    if reference == 0.0 {
        return CrashSignal::Unknown;
    }

    let drop_pct = (reference - closes[closes.len() - 1]) / reference * 100.0;
    if drop_pct > thresholds.crash_drop_pct {
        CrashSignal::Downtrend
    } else {
        CrashSignal::Stable
    }
}

/// Percent change from the first to the last close over the whole series.
/// Under two observations there is no growth to speak of; 0 by contract.
pub fn growth_pct(closes: &[f64]) -> f64 {
    if closes.len() < 2 {
        return 0.0;
    }

    let first = closes[0];
    if first == 0.0 {
        return 0.0;
    }

    (closes[closes.len() - 1] - first) / first * 100.0
}
