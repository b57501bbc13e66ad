use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

use super::{HistoryError, PriceKind};

/// The `/historical` payload, decoded leniently: price entries that are not
/// numbers become `None`, series may be shorter than `timestamps` or missing
/// entirely, and unknown fields are ignored. Whether the payload is usable
/// at all is decided by [`HistoricalResponse::validate`], not by serde.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoricalResponse {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamps")]
    pub timestamps: Vec<String>,
    #[serde(default, deserialize_with = "lenient_sources")]
    pub sources: BTreeMap<String, RawSourceSeries>,
    #[serde(default, rename = "isApproximated")]
    pub is_approximated: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSourceSeries {
    #[serde(default, deserialize_with = "lenient_prices")]
    pub buy_prices: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "lenient_prices")]
    pub sell_prices: Vec<Option<f64>>,
}

impl RawSourceSeries {
    pub fn prices(&self, kind: PriceKind) -> &[Option<f64>] {
        match kind {
            PriceKind::Buy => &self.buy_prices,
            PriceKind::Sell => &self.sell_prices,
        }
    }

    /// The sample at index `i`, treating out-of-range as missing.
    pub fn sample(&self, kind: PriceKind, i: usize) -> Option<f64> {
        self.prices(kind).get(i).copied().flatten()
    }

    pub fn has_valid(&self, kind: PriceKind) -> bool {
        self.prices(kind).iter().any(Option::is_some)
    }

    pub fn first_valid(&self, kind: PriceKind) -> Option<f64> {
        self.prices(kind).iter().copied().flatten().next()
    }
}

impl HistoricalResponse {
    /// Decodes a payload of any shape. A top-level value that is not even an
    /// object decodes to the default, which fails validation.
    pub fn from_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Top-level shape check; must pass before any densification runs.
    pub fn validate(&self) -> Result<(), HistoryError> {
        if self.error {
            let message = self
                .message
                .clone()
                .unwrap_or_else(|| "backend reported an error".to_string());
            return Err(HistoryError::InvalidResponse(message));
        }
        if self.timestamps.is_empty() {
            return Err(HistoryError::InvalidResponse(
                "no timestamps in response".to_string(),
            ));
        }
        if self.sources.is_empty() {
            return Err(HistoryError::InvalidResponse(
                "no sources in response".to_string(),
            ));
        }
        Ok(())
    }
}

fn lenient_prices<'de, D>(deserializer: D) -> Result<Vec<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer).unwrap_or_default();
    Ok(raw
        .into_iter()
        .map(|v| v.as_f64().filter(|n| n.is_finite()))
        .collect())
}

fn lenient_timestamps<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer).unwrap_or_default();
    Ok(raw
        .into_iter()
        .map(|v| match v {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            _ => String::new(),
        })
        .collect())
}

fn lenient_sources<'de, D>(deserializer: D) -> Result<BTreeMap<String, RawSourceSeries>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer).unwrap_or_default();
    Ok(raw
        .into_iter()
        .map(|(name, v)| (name, serde_json::from_value(v).unwrap_or_default()))
        .collect())
}
