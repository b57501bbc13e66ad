//! The auto-refreshing dashboard loop.
//!
//! Every cycle fetches all cards concurrently, renders them, and replaces
//! the previous output wholesale. Cycles are guarded by a generation token:
//! a cycle that finishes after a newer one has begun discards its output
//! instead of overwriting fresher state.

use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::backend::ExchangeBackend;
use crate::config::AppConfig;
use crate::history::{self, PriceKind};
use crate::market::{Country, Period};
use crate::views;

const DASHBOARD_NEWS_LIMIT: usize = 5;

/// Latest-request-wins token dispenser. `begin` stamps a new cycle; output
/// is only valid while `is_current` still holds for that stamp.
#[derive(Debug, Default)]
pub struct CycleGate {
    latest: AtomicU64,
}

impl CycleGate {
    pub fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == token
    }
}

pub async fn run(
    backend: Arc<dyn ExchangeBackend>,
    country: Country,
    period: Period,
    config: &AppConfig,
) -> Result<()> {
    let gate = Arc::new(CycleGate::default());
    let mut ticker = tokio::time::interval(Duration::from_secs(config.refresh_secs.max(1)));
    info!(
        country = %country,
        period = %period,
        refresh_secs = config.refresh_secs,
        "Starting dashboard"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Each cycle runs as its own task so a stalled fetch cannot
                // block the next tick; the gate decides whose output renders.
                let token = gate.begin();
                let gate = Arc::clone(&gate);
                let backend = Arc::clone(&backend);
                let sparse_threshold = config.sparse_threshold;
                tokio::spawn(async move {
                    let output =
                        render_cycle(backend.as_ref(), country, period, sparse_threshold).await;
                    if !gate.is_current(token) {
                        debug!(token, "Discarding stale cycle output");
                        return;
                    }
                    let _ = console::Term::stdout().clear_screen();
                    println!("{output}");
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down dashboard");
                return Ok(());
            }
        }
    }
}

/// Fetches and renders every card. Card failures degrade to an inline error
/// line rather than failing the whole cycle, mirroring the per-card error
/// states of the web original.
pub async fn render_cycle(
    backend: &dyn ExchangeBackend,
    country: Country,
    period: Period,
    sparse_threshold: usize,
) -> String {
    let (quotes, average, slippage, historical, news) = futures::join!(
        backend.quotes(country),
        backend.average(country),
        backend.slippage(country),
        backend.historical(country, period),
        backend.news(country),
    );

    let mut sections = vec![format!(
        "{}  ({country}, refreshed {})",
        views::ui::style_text(
            &format!("USD/{} exchange dashboard", country.currency()),
            views::ui::StyleType::Title
        ),
        chrono::Local::now().format("%H:%M:%S"),
    )];

    sections.push(match &quotes {
        Ok(quotes) => views::quotes::render(quotes, country),
        Err(e) => card_error("quotes", e),
    });
    sections.push(match &average {
        Ok(average) => views::average::render(average, country),
        Err(e) => card_error("average", e),
    });
    sections.push(match &slippage {
        Ok(slippage) => views::slippage::render(slippage),
        Err(e) => card_error("slippage", e),
    });
    sections.push(match historical {
        Ok(payload) => match history::reconstruct(payload, period, sparse_threshold) {
            Ok(series) => views::chart::render(&series, PriceKind::Buy, country, period),
            Err(e) => {
                warn!(error = %e, "Historical reconstruction failed");
                card_error("chart", &anyhow::anyhow!(e))
            }
        },
        Err(e) => card_error("chart", &e),
    });
    sections.push(match &news {
        Ok(news) => views::news::render(news, Some(DASHBOARD_NEWS_LIMIT)),
        Err(e) => card_error("news", e),
    });

    sections.join("\n\n")
}

fn card_error(card: &str, error: &anyhow::Error) -> String {
    views::ui::style_text(
        &format!("Could not load {card}: {error}"),
        views::ui::StyleType::Error,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{AverageQuote, NewsItem, Quote, Slippage};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use serde_json::json;

    struct CannedBackend;

    #[async_trait]
    impl ExchangeBackend for CannedBackend {
        async fn quotes(&self, _country: Country) -> Result<Vec<Quote>> {
            Ok(vec![Quote {
                source: "wise".to_string(),
                buy_price: 5.1,
                sell_price: 5.2,
            }])
        }

        async fn average(&self, _country: Country) -> Result<AverageQuote> {
            Ok(AverageQuote {
                average_buy_price: 5.15,
                average_sell_price: 5.25,
            })
        }

        async fn slippage(&self, _country: Country) -> Result<Vec<Slippage>> {
            Err(anyhow!("slippage service down"))
        }

        async fn news(&self, _country: Country) -> Result<Vec<NewsItem>> {
            Ok(vec![])
        }

        async fn historical(
            &self,
            _country: Country,
            _period: Period,
        ) -> Result<serde_json::Value> {
            Ok(json!({
                "timestamps": [
                    "2025-03-14T10:00:00Z",
                    "2025-03-14T11:00:00Z",
                    "2025-03-14T12:00:00Z"
                ],
                "sources": {
                    "wise": { "buy_prices": [5.0, 5.1, 5.2], "sell_prices": [5.2, 5.3, 5.4] }
                }
            }))
        }
    }

    #[test]
    fn test_cycle_gate_latest_wins() {
        let gate = CycleGate::default();
        let first = gate.begin();
        assert!(gate.is_current(first));

        let second = gate.begin();
        assert!(!gate.is_current(first), "older cycle must be stale");
        assert!(gate.is_current(second));
    }

    #[tokio::test]
    async fn test_slow_cycle_output_is_discarded() {
        let gate = Arc::new(CycleGate::default());

        // A cycle that outlives the refresh interval: it holds its token
        // across a delay while a newer cycle begins.
        let slow_token = gate.begin();
        let slow_cycle = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                gate.is_current(slow_token)
            })
        };

        let fresh_token = gate.begin();
        assert!(
            !slow_cycle.await.unwrap(),
            "a cycle finishing after a newer one began must discard its output"
        );
        assert!(gate.is_current(fresh_token));
    }

    #[tokio::test]
    async fn test_render_cycle_degrades_per_card() {
        let output = render_cycle(&CannedBackend, Country::Brazil, Period::default(), 2).await;

        assert!(output.contains("exchange dashboard"));
        assert!(output.contains("wise"));
        assert!(output.contains("5.1500"));
        assert!(output.contains("Could not load slippage"));
        assert!(output.contains("Rate evolution"));
        assert!(output.contains("No news available"));
    }
}
