use chrono::Duration;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Countries the backend serves quotes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    Brazil,
    Argentina,
}

impl Country {
    /// Value used for both the `country` query parameter and header.
    pub fn as_query(self) -> &'static str {
        match self {
            Country::Brazil => "brazil",
            Country::Argentina => "argentina",
        }
    }

    /// Display currency for quotes from this country.
    pub fn currency(self) -> &'static str {
        match self {
            Country::Brazil => "BRL",
            Country::Argentina => "ARS",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

/// Lookback window for the `/historical` endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum Period {
    #[value(name = "1h")]
    #[serde(rename = "1h")]
    OneHour,
    #[value(name = "6h")]
    #[serde(rename = "6h")]
    SixHours,
    #[value(name = "12h")]
    #[serde(rename = "12h")]
    TwelveHours,
    #[default]
    #[value(name = "24h")]
    #[serde(rename = "24h")]
    TwentyFourHours,
}

impl Period {
    pub fn as_query(self) -> &'static str {
        match self {
            Period::OneHour => "1h",
            Period::SixHours => "6h",
            Period::TwelveHours => "12h",
            Period::TwentyFourHours => "24h",
        }
    }

    /// Number of points fabricated when the backend returns too few timestamps.
    pub fn point_count(self) -> usize {
        match self {
            Period::OneHour => 4,
            Period::SixHours => 12,
            Period::TwelveHours => 24,
            Period::TwentyFourHours => 48,
        }
    }

    /// Spacing between fabricated points.
    pub fn synthetic_spacing(self) -> Duration {
        match self {
            Period::OneHour => Duration::minutes(15),
            _ => Duration::minutes(30),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Quote {
    pub source: String,
    pub buy_price: f64,
    pub sell_price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AverageQuote {
    pub average_buy_price: f64,
    pub average_sell_price: f64,
}

/// Per-source deviation from the cross-source average, as fractions.
#[derive(Debug, Clone, Deserialize)]
pub struct Slippage {
    pub source: String,
    pub buy_price_slippage: f64,
    pub sell_price_slippage: f64,
}

/// One `/news` record. Everything but the title is optional pass-through data.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsItem {
    pub title: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "publishedAt")]
    pub published_at: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "imageUrl")]
    pub image_url: Option<String>,
}

/// Shortens a source identifier for display. Sources arrive as URLs from some
/// backends ("https://wise.com/..." becomes "wise"); anything that is not a
/// URL is truncated to ten characters.
pub fn short_source_name(source: &str) -> String {
    let stripped = source
        .strip_prefix("https://")
        .or_else(|| source.strip_prefix("http://"));
    if let Some(rest) = stripped {
        let host = rest.split('/').next().unwrap_or(rest);
        let label = host.strip_prefix("www.").unwrap_or(host);
        if let Some(head) = label.split('.').next()
            && !head.is_empty()
        {
            return head.to_string();
        }
    }
    source.chars().take(10).collect()
}
