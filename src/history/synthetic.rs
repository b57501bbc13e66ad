//! Whole-series fabrication for responses with too few timestamps to chart.
//!
//! Unlike gap filling, this replaces timestamps and values alike: a fresh
//! grid is counted backward from "now" and each source's values are derived
//! from its last known real observation. The result is always flagged as
//! approximated.

use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use std::collections::BTreeMap;
use std::f64::consts::TAU;

use super::densify::{DenseSeries, PriceKind};
use super::response::HistoricalResponse;
use crate::market::Period;

const WAVE_AMPLITUDE: f64 = 0.02;
const NOISE_BOUND: f64 = 0.003;

#[derive(Debug, Clone)]
pub struct SyntheticSeries {
    /// RFC 3339 timestamps, oldest first.
    pub timestamps: Vec<String>,
    pub sources: BTreeMap<String, DenseSeries>,
}

/// Fabricates a denser grid for a validated but too-sparse response.
/// Operates on the raw response directly; the densifier is not involved.
pub fn expand<R: Rng>(
    response: &HistoricalResponse,
    period: Period,
    now: DateTime<Utc>,
    rng: &mut R,
) -> SyntheticSeries {
    let count = period.point_count();
    let spacing = period.synthetic_spacing();

    let mut grid: Vec<DateTime<Utc>> = (0..count).map(|i| now - spacing * i as i32).collect();
    grid.reverse();
    let timestamps = grid
        .iter()
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .collect();

    let sources = response
        .sources
        .iter()
        .map(|(name, raw)| {
            let buy_base = raw.first_valid(PriceKind::Buy).unwrap_or(0.0);
            let sell_base = raw.first_valid(PriceKind::Sell).unwrap_or(0.0);
            let series = DenseSeries {
                buy: synthesize_values(buy_base, count, rng),
                sell: synthesize_values(sell_base, count, rng),
            };
            (name.clone(), series)
        })
        .collect();

    SyntheticSeries {
        timestamps,
        sources,
    }
}

fn synthesize_values<R: Rng>(base: f64, count: usize, rng: &mut R) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let wave = WAVE_AMPLITUDE * (TAU * i as f64 / count as f64).sin();
            let noise = rng.random_range(-NOISE_BOUND..=NOISE_BOUND);
            round4(base * (1.0 + wave + noise))
        })
        .collect()
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
