//! Currency conversion with live-rate fetch and static fallback
//!
//! The live rate is fetched at most once per run; every per-sponsor
//! conversion reuses the resolved rate. A provider failure or timeout
//! degrades to the static configured rate and marks results stale -
//! conversion never fails the pipeline.

use crate::config::CurrencyConfig;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug)]
pub enum RateProviderError {
    Http(reqwest::Error),
    Api(String),
}

impl From<reqwest::Error> for RateProviderError {
    fn from(err: reqwest::Error) -> Self {
        RateProviderError::Http(err)
    }
}

impl std::fmt::Display for RateProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateProviderError::Http(e) => write!(f, "HTTP error: {}", e),
            RateProviderError::Api(msg) => write!(f, "Provider error: {}", msg),
        }
    }
}

impl std::error::Error for RateProviderError {}

/// Exchange-rate source keyed by currency pair
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rate(&self, base: &str, quote: &str) -> Result<f64, RateProviderError>;
}

/// exchangerate-api.com v6 pair endpoint response
#[derive(Debug, Deserialize)]
struct PairResponse {
    result: String,
    conversion_rate: Option<f64>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

/// Client for the exchangerate-api.com v6 pair endpoint
///
/// Endpoint: `https://v6.exchangerate-api.com/v6/{key}/pair/{base}/{quote}`
pub struct ExchangeRateApiClient {
    api_key: String,
    client: reqwest::Client,
}

impl ExchangeRateApiClient {
    pub fn new(api_key: String) -> Result<Self, RateProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { api_key, client })
    }
}

#[async_trait]
impl RateProvider for ExchangeRateApiClient {
    async fn fetch_rate(&self, base: &str, quote: &str) -> Result<f64, RateProviderError> {
        let url = format!(
            "https://v6.exchangerate-api.com/v6/{}/pair/{}/{}",
            self.api_key, base, quote
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(RateProviderError::Api(format!(
                "exchangerate-api returned {}",
                response.status()
            )));
        }

        let body: PairResponse = response.json().await?;

        if body.result != "success" {
            return Err(RateProviderError::Api(
                body.error_type.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        body.conversion_rate
            .ok_or_else(|| RateProviderError::Api("missing conversion_rate".to_string()))
    }
}

/// Immutable USD→NPR converter resolved once per run
#[derive(Debug, Clone, Copy)]
pub struct CurrencyConverter {
    rate: f64,
    stale: bool,
}

impl CurrencyConverter {
    /// Converter pinned to the static configured rate
    pub fn with_static_rate(rate: f64) -> Self {
        Self { rate, stale: false }
    }

    /// Resolve the conversion rate, querying the provider at most once.
    ///
    /// With no provider configured the static rate is used as-is. A fetch
    /// failure, a non-positive rate, or a timeout falls back to the static
    /// rate and marks the converter stale.
    pub async fn resolve(config: &CurrencyConfig, provider: Option<&dyn RateProvider>) -> Self {
        let provider = match provider {
            Some(provider) => provider,
            None => return Self::with_static_rate(config.static_npr_rate),
        };

        let timeout = Duration::from_secs(config.fetch_timeout_secs);
        match tokio::time::timeout(timeout, provider.fetch_rate("USD", "NPR")).await {
            Ok(Ok(rate)) if rate > 0.0 && rate.is_finite() => {
                log::info!("💱 Live USD→NPR rate: {:.4}", rate);
                Self { rate, stale: false }
            }
            Ok(Ok(rate)) => {
                log::warn!(
                    "Provider returned unusable rate {}, falling back to static {}",
                    rate,
                    config.static_npr_rate
                );
                Self {
                    rate: config.static_npr_rate,
                    stale: true,
                }
            }
            Ok(Err(e)) => {
                log::warn!(
                    "Rate fetch failed ({}), falling back to static {}",
                    e,
                    config.static_npr_rate
                );
                Self {
                    rate: config.static_npr_rate,
                    stale: true,
                }
            }
            Err(_) => {
                log::warn!(
                    "Rate fetch timed out after {}s, falling back to static {}",
                    config.fetch_timeout_secs,
                    config.static_npr_rate
                );
                Self {
                    rate: config.static_npr_rate,
                    stale: true,
                }
            }
        }
    }

    pub fn convert(&self, usd_value: f64) -> f64 {
        usd_value * self.rate
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Whether the static fallback was used after a provider failure
    pub fn is_stale(&self) -> bool {
        self.stale
    }
}
