use crate::config::RunConfig;
use crate::data::{CoinSnapshot, MarketChart, PricePoint};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("rate limited, gave up after {0} attempts")]
    Throttled(u32),
    #[error("upstream returned {0}")]
    Upstream(StatusCode),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("no historical data")]
    EmptyResult,
}

impl FetchError {
    /// Whether the coin deserves one more attempt in the retry pass.
    /// An empty series means the coin has no data at all, so retrying
    /// it would return the same nothing.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::EmptyResult)
    }
}

pub struct Fetcher {
    client: Client,
    base_url: String,
    max_retries: u32,
    initial_backoff: Duration,
}

impl Fetcher {
    pub fn new(config: &RunConfig) -> Self {
        Self::with_base_url(COINGECKO_API_URL, config)
    }

    /// Point the fetcher at a different host (for tests).
    pub fn with_base_url(base_url: &str, config: &RunConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Fetcher {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            initial_backoff: config.initial_backoff,
        }
    }

    /// Fetch the time-ranged market chart for one coin and join its
    /// three series into price points.
    ///
    /// Throttling responses are retried with doubling backoff, at most
    /// `max_retries` requests in total. Any other non-success status is
    /// a definitive failure with no retry inside this call.
    pub async fn market_range(
        &self,
        coin_id: &str,
        from: i64,
        to: i64,
        currency: &str,
    ) -> Result<Vec<PricePoint>, FetchError> {
        let url = format!("{}/coins/{}/market_chart/range", self.base_url, coin_id);
        let params = [
            ("vs_currency", currency.to_string()),
            ("from", from.to_string()),
            ("to", to.to_string()),
        ];

        println!("Fetching historical data for {}...", coin_id);

        for attempt in 0..self.max_retries {
            let response = self.client.get(&url).query(&params).send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt + 1 == self.max_retries {
                    break;
                }
                let wait = backoff_for_attempt(self.initial_backoff, attempt);
                println!(
                    "Rate limit hit for {}, retrying in {}s...",
                    coin_id,
                    wait.as_secs()
                );
                sleep(wait).await;
                continue;
            }

            if !status.is_success() {
                return Err(FetchError::Upstream(status));
            }

            let chart = response.json::<MarketChart>().await?;
            if chart.prices.is_empty() {
                return Err(FetchError::EmptyResult);
            }
            return Ok(chart.into_points());
        }

        Err(FetchError::Throttled(self.max_retries))
    }

    /// Fetch the coin's all-time high/low. Single attempt; any failure
    /// just leaves the values absent.
    pub async fn coin_snapshot(&self, coin_id: &str, currency: &str) -> CoinSnapshot {
        let url = format!("{}/coins/{}", self.base_url, coin_id);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                eprintln!("Failed to fetch ATH/ATL for {}: {}", coin_id, e);
                return CoinSnapshot::default();
            }
        };

        if !response.status().is_success() {
            eprintln!(
                "Failed to fetch ATH/ATL for {}: {}",
                coin_id,
                response.status()
            );
            return CoinSnapshot::default();
        }

        let body = match response.json::<Value>().await {
            Ok(body) => body,
            Err(e) => {
                eprintln!("Failed to parse coin info for {}: {}", coin_id, e);
                return CoinSnapshot::default();
            }
        };

        let extreme = |key: &str| {
            body.get("market_data")
                .and_then(|data| data.get(key))
                .and_then(|value| value.get(currency))
                .and_then(Value::as_f64)
        };

        CoinSnapshot {
            ath: extreme("ath"),
            atl: extreme("atl"),
        }
    }
}

fn backoff_for_attempt(initial: Duration, attempt: u32) -> Duration {
    initial * 2u32.pow(attempt)
}
