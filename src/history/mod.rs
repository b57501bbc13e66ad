//! Historical series reconstruction.
//!
//! The `/historical` endpoint returns a per-source time series that is often
//! sparse: prices may be missing at some timestamps, whole series may be
//! absent, and occasionally the backend sends only one or two timestamps.
//! This module turns any such payload into a dense, chart-ready series:
//!
//! 1. validate the top-level shape ([`HistoricalResponse::validate`]);
//! 2. either fabricate a denser grid when the response is too sparse
//!    ([`synthetic::expand`]) or fill per-source gaps ([`densify::densify`]);
//! 3. project the dense arrays into one row per timestamp
//!    ([`project::project_rows`]).

pub mod densify;
pub mod project;
pub mod response;
pub mod synthetic;

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::debug;

use crate::market::Period;

pub use densify::{DenseSeries, PriceKind};
pub use project::ChartRow;
pub use response::{HistoricalResponse, RawSourceSeries};

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// The response violated the top-level shape invariant: an explicit
    /// error flag, or empty/missing timestamps or sources.
    #[error("invalid historical response: {0}")]
    InvalidResponse(String),
}

/// A reconstructed series, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub rows: Vec<ChartRow>,
    /// True when any of the values are synthetic rather than observed,
    /// either flagged by the backend or fabricated here.
    pub approximated: bool,
}

/// Reconstructs a chart series from a raw `/historical` payload.
///
/// `sparse_threshold` is the timestamp count at or below which the whole
/// response is replaced by a synthetic grid (see [`synthetic::expand`]).
pub fn reconstruct(
    payload: serde_json::Value,
    period: Period,
    sparse_threshold: usize,
) -> Result<ChartSeries, HistoryError> {
    let mut rng = StdRng::from_os_rng();
    reconstruct_at(payload, period, sparse_threshold, Utc::now(), &mut rng)
}

/// [`reconstruct`] with the clock and randomness injected, so tests can pin
/// both and assert on the output.
pub fn reconstruct_at<R: Rng>(
    payload: serde_json::Value,
    period: Period,
    sparse_threshold: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<ChartSeries, HistoryError> {
    let response = HistoricalResponse::from_value(payload);
    response.validate()?;

    if response.timestamps.len() <= sparse_threshold {
        debug!(
            timestamps = response.timestamps.len(),
            "Response too sparse to chart, expanding synthetically"
        );
        let synthetic = synthetic::expand(&response, period, now, rng);
        let rows = project::project_rows(&synthetic.timestamps, &synthetic.sources, now);
        return Ok(ChartSeries {
            rows,
            approximated: true,
        });
    }

    let dense = densify::densify(&response, rng);
    let rows = project::project_rows(&response.timestamps, &dense, now);
    Ok(ChartSeries {
        rows,
        approximated: response.is_approximated,
    })
}
