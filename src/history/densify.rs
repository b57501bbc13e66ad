//! Gap filling. Guarantees that every source leaves here with a fully
//! defined buy and sell array aligned to the response's timestamps.

use clap::ValueEnum;
use rand::Rng;
use std::collections::BTreeMap;
use std::f64::consts::TAU;
use std::fmt;
use tracing::debug;

use super::response::{HistoricalResponse, RawSourceSeries};

/// Wave amplitude applied when a whole series is synthesized from peers.
const WAVE_AMPLITUDE: f64 = 0.01;
/// Uniform noise bound for peer-synthesized values.
const NOISE_BOUND: f64 = 0.004;
/// Multiplicative noise when carrying a boundary value across a gap.
const CARRY_NOISE: f64 = 0.003;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PriceKind {
    Buy,
    Sell,
}

impl fmt::Display for PriceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceKind::Buy => f.write_str("buy"),
            PriceKind::Sell => f.write_str("sell"),
        }
    }
}

/// A source's series with every index defined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DenseSeries {
    pub buy: Vec<f64>,
    pub sell: Vec<f64>,
}

/// Densifies every source in a validated response. Total: the output always
/// has one value per timestamp per source per price kind.
pub fn densify<R: Rng>(
    response: &HistoricalResponse,
    rng: &mut R,
) -> BTreeMap<String, DenseSeries> {
    let n = response.timestamps.len();
    response
        .sources
        .keys()
        .map(|name| {
            let series = DenseSeries {
                buy: densify_kind(response, name, PriceKind::Buy, n, rng),
                sell: densify_kind(response, name, PriceKind::Sell, n, rng),
            };
            (name.clone(), series)
        })
        .collect()
}

fn densify_kind<R: Rng>(
    response: &HistoricalResponse,
    name: &str,
    kind: PriceKind,
    n: usize,
    rng: &mut R,
) -> Vec<f64> {
    let series = &response.sources[name];
    if !series.has_valid(kind) {
        debug!(source = name, kind = %kind, "No valid samples, synthesizing from peers");
        return synthesize_from_peers(response, name, kind, n, rng);
    }
    fill_gaps(series, kind, n, rng)
}

/// Builds a full series for a source that supplied no usable data, from the
/// cross-source average of the same price kind. Where no peer has a value at
/// an index either, the last known cross-source average carries over; the
/// running average starts at the overall peer mean so leading gaps do not
/// collapse to zero. A gentle wave plus noise keeps the line from rendering
/// flat.
fn synthesize_from_peers<R: Rng>(
    response: &HistoricalResponse,
    skip: &str,
    kind: PriceKind,
    n: usize,
    rng: &mut R,
) -> Vec<f64> {
    let peers: Vec<&RawSourceSeries> = response
        .sources
        .iter()
        .filter(|(name, _)| name.as_str() != skip)
        .map(|(_, series)| series)
        .collect();

    let all_samples: Vec<f64> = peers
        .iter()
        .flat_map(|s| s.prices(kind).iter().copied().flatten())
        .collect();
    let mut running = if all_samples.is_empty() {
        0.0
    } else {
        all_samples.iter().sum::<f64>() / all_samples.len() as f64
    };

    (0..n)
        .map(|i| {
            let at_index: Vec<f64> = peers.iter().filter_map(|s| s.sample(kind, i)).collect();
            if !at_index.is_empty() {
                running = at_index.iter().sum::<f64>() / at_index.len() as f64;
            }
            let wave = WAVE_AMPLITUDE * (TAU * i as f64 / n as f64).sin();
            let noise = rng.random_range(-NOISE_BOUND..=NOISE_BOUND);
            running * (1.0 + wave + noise)
        })
        .collect()
}

/// Fills every missing index of a series that has at least one valid sample.
/// Interior gaps interpolate between the nearest valid neighbours; leading
/// and trailing gaps carry the boundary value across with small noise.
fn fill_gaps<R: Rng>(series: &RawSourceSeries, kind: PriceKind, n: usize, rng: &mut R) -> Vec<f64> {
    (0..n)
        .map(|i| {
            if let Some(value) = series.sample(kind, i) {
                return value;
            }
            let earlier = (0..i)
                .rev()
                .find_map(|j| series.sample(kind, j).map(|v| (j, v)));
            let later = (i + 1..n).find_map(|j| series.sample(kind, j).map(|v| (j, v)));
            match (earlier, later) {
                (Some((j0, v0)), Some((j1, v1))) => {
                    let t = (i - j0) as f64 / (j1 - j0) as f64;
                    v0 + (v1 - v0) * t
                }
                (Some((_, v)), None) | (None, Some((_, v))) => {
                    v * (1.0 + rng.random_range(-CARRY_NOISE..=CARRY_NOISE))
                }
                (None, None) => unreachable!("caller checked the series has a valid sample"),
            }
        })
        .collect()
}
