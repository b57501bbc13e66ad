//! Projection of dense per-source arrays into chart rows.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::densify::DenseSeries;

/// One point on the chart's horizontal axis. `time` is the display category;
/// consumers that sort or deduplicate must use `timestamp` since distinct
/// indices can format to the same displayed time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRow {
    pub time: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub date: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

/// Builds one row per timestamp. Pure: same input (including `now`) yields
/// the same output. Never fails; unparseable timestamps get a substitute
/// `now - (N - i) * 30min` so ordering and spacing stay sane. A
/// `{source}_buy` / `{source}_sell` key is emitted only when the series has
/// a value at that index, which after densification is always.
pub fn project_rows(
    timestamps: &[String],
    sources: &BTreeMap<String, DenseSeries>,
    now: DateTime<Utc>,
) -> Vec<ChartRow> {
    let n = timestamps.len();
    timestamps
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let at = parse_timestamp(raw)
                .unwrap_or_else(|| now - Duration::minutes(30) * (n - i) as i32);

            let mut values = BTreeMap::new();
            for (name, series) in sources {
                if let Some(&v) = series.buy.get(i) {
                    values.insert(format!("{name}_buy"), v);
                }
                if let Some(&v) = series.sell.get(i) {
                    values.insert(format!("{name}_sell"), v);
                }
            }

            ChartRow {
                time: at.format("%H:%M").to_string(),
                timestamp: at.timestamp_millis(),
                date: at.format("%Y-%m-%d").to_string(),
                values,
            }
        })
        .collect()
}

/// Accepts RFC 3339, a bare `Y-m-d H:M:S` form, or numeric epoch seconds or
/// milliseconds.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(n) = raw.parse::<i64>() {
        // Heuristic: values this large are epoch milliseconds.
        return if n >= 1_000_000_000_000 {
            Utc.timestamp_millis_opt(n).single()
        } else {
            Utc.timestamp_opt(n, 0).single()
        };
    }
    None
}
