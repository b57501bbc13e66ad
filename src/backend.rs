use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::market::{AverageQuote, Country, NewsItem, Period, Quote, Slippage};

/// The remote quote service. Everything the dashboard shows comes through
/// here, so tests can swap in a mock server or a canned implementation.
#[async_trait]
pub trait ExchangeBackend: Send + Sync {
    async fn quotes(&self, country: Country) -> Result<Vec<Quote>>;
    async fn average(&self, country: Country) -> Result<AverageQuote>;
    async fn slippage(&self, country: Country) -> Result<Vec<Slippage>>;
    async fn news(&self, country: Country) -> Result<Vec<NewsItem>>;

    /// Returns the raw `/historical` payload. The shape is left to the
    /// reconstructor, which tolerates malformed responses.
    async fn historical(&self, country: Country, period: Period) -> Result<serde_json::Value>;
}

pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("cambial/0.1")
            .build()?;
        Ok(HttpBackend {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        country: Country,
        period: Option<Period>,
    ) -> Result<T> {
        let mut url = format!(
            "{}/{}?country={}",
            self.base_url,
            endpoint,
            country.as_query()
        );
        if let Some(period) = period {
            url.push_str(&format!("&period={}", period.as_query()));
        }
        debug!("Requesting {}", url);

        let response = self
            .client
            .get(&url)
            .header("country", country.as_query())
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for endpoint: {}", e, endpoint))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for endpoint: {}",
                response.status(),
                endpoint
            ));
        }

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", endpoint, e))
    }
}

#[async_trait]
impl ExchangeBackend for HttpBackend {
    #[instrument(skip(self), fields(country = %country))]
    async fn quotes(&self, country: Country) -> Result<Vec<Quote>> {
        self.get_json("quotes", country, None).await
    }

    async fn average(&self, country: Country) -> Result<AverageQuote> {
        self.get_json("average", country, None).await
    }

    async fn slippage(&self, country: Country) -> Result<Vec<Slippage>> {
        self.get_json("slippage", country, None).await
    }

    async fn news(&self, country: Country) -> Result<Vec<NewsItem>> {
        self.get_json("news", country, None).await
    }

    #[instrument(skip(self), fields(country = %country, period = %period))]
    async fn historical(&self, country: Country, period: Period) -> Result<serde_json::Value> {
        self.get_json("historical", country, Some(period)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(endpoint: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/{endpoint}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_quotes_fetch() {
        let mock_response = r#"[
            {"source": "https://wise.com", "buy_price": 5.12, "sell_price": 5.18},
            {"source": "nubank", "buy_price": 5.10, "sell_price": 5.21}
        ]"#;

        let mock_server = create_mock_server("quotes", mock_response).await;
        let backend = HttpBackend::new(&mock_server.uri()).unwrap();

        let quotes = backend.quotes(Country::Brazil).await.unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].source, "https://wise.com");
        assert_eq!(quotes[0].buy_price, 5.12);
        assert_eq!(quotes[1].sell_price, 5.21);
    }

    #[tokio::test]
    async fn test_country_sent_as_query_and_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/quotes"))
            .and(query_param("country", "argentina"))
            .and(header("country", "argentina"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let backend = HttpBackend::new(&mock_server.uri()).unwrap();
        let quotes = backend.quotes(Country::Argentina).await.unwrap();
        assert!(quotes.is_empty());
    }

    #[tokio::test]
    async fn test_average_fetch() {
        let mock_response = r#"{"average_buy_price": 5.11, "average_sell_price": 5.19}"#;
        let mock_server = create_mock_server("average", mock_response).await;
        let backend = HttpBackend::new(&mock_server.uri()).unwrap();

        let average = backend.average(Country::Brazil).await.unwrap();
        assert_eq!(average.average_buy_price, 5.11);
        assert_eq!(average.average_sell_price, 5.19);
    }

    #[tokio::test]
    async fn test_historical_sends_period_and_passes_value_through() {
        let mock_server = MockServer::start().await;

        let body = r#"{"timestamps": ["t0"], "sources": {}, "isApproximated": false}"#;
        Mock::given(method("GET"))
            .and(path("/historical"))
            .and(query_param("country", "brazil"))
            .and(query_param("period", "6h"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        let backend = HttpBackend::new(&mock_server.uri()).unwrap();
        let value = backend
            .historical(Country::Brazil, Period::SixHours)
            .await
            .unwrap();
        assert_eq!(value["timestamps"][0], "t0");
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slippage"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let backend = HttpBackend::new(&mock_server.uri()).unwrap();
        let result = backend.slippage(Country::Brazil).await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 500 Internal Server Error for endpoint: slippage"
        );
    }

    #[tokio::test]
    async fn test_malformed_json_response() {
        let mock_server = create_mock_server("quotes", "not json at all").await;
        let backend = HttpBackend::new(&mock_server.uri()).unwrap();

        let result = backend.quotes(Country::Brazil).await;
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse JSON response for quotes")
        );
    }
}
