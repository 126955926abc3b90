//! CoinMarketCap listings client
//!
//! Pulls the top-N assets by market cap from `/v1/cryptocurrency/listings/latest`
//! and reduces the response to a symbol → price snapshot in one quote currency.

use super::{excerpt, SnapshotSource, SourceError};
use crate::config::SourceConfig;
use crate::history::Snapshot;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// CoinMarketCap Pro API base URL
pub const CMC_API_URL: &str = "https://pro-api.coinmarketcap.com";

const LISTINGS_PATH: &str = "/v1/cryptocurrency/listings/latest";
const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

/// Configuration for the CoinMarketCap client
#[derive(Debug, Clone)]
pub struct CmcConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Number of assets requested
    pub limit: u32,
    /// Quote currency (e.g. "USD")
    pub convert: String,
    /// Ranking criterion
    pub sort: String,
}

impl Default for CmcConfig {
    fn default() -> Self {
        Self {
            base_url: CMC_API_URL.to_string(),
            timeout: Duration::from_secs(20),
            limit: 200,
            convert: "USD".to_string(),
            sort: "market_cap".to_string(),
        }
    }
}

impl From<&SourceConfig> for CmcConfig {
    fn from(config: &SourceConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
            limit: config.universe_size,
            convert: config.quote_currency.to_uppercase(),
            sort: config.sort.clone(),
        }
    }
}

/// Client for the CoinMarketCap listings endpoint
pub struct CmcClient {
    config: CmcConfig,
    api_key: String,
    client: Client,
}

impl CmcClient {
    /// Create a client with the given configuration
    pub fn new(config: CmcConfig, api_key: impl Into<String>) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            config,
            api_key: api_key.into(),
            client,
        })
    }

    /// Full listings URL
    fn listings_url(&self) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            LISTINGS_PATH
        )
    }

    /// Query parameters for the listings request
    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("start", "1".to_string()),
            ("limit", self.config.limit.to_string()),
            ("convert", self.config.convert.clone()),
            ("sort", self.config.sort.clone()),
            ("sort_dir", "desc".to_string()),
        ]
    }

    /// Reduce a listings body to a snapshot
    ///
    /// Entries without a quote in the configured currency, or with a
    /// non-positive price, are dropped. A repeated symbol keeps the later
    /// entry.
    fn parse_listings(body: &str, convert: &str) -> Result<Snapshot, SourceError> {
        let listings: ListingsResponse =
            serde_json::from_str(body).map_err(|e| SourceError::Decode(e.to_string()))?;

        let mut snapshot = Snapshot::with_capacity(listings.data.len());
        let mut dropped = 0usize;

        for asset in listings.data {
            let price = asset
                .quote
                .get(convert)
                .and_then(|q| q.price)
                .filter(|p| *p > Decimal::ZERO);

            match price {
                Some(price) => {
                    snapshot.insert(asset.symbol.to_uppercase(), price);
                }
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            tracing::debug!(dropped, "Listings entries without a usable price");
        }

        Ok(snapshot)
    }
}

#[async_trait]
impl SnapshotSource for CmcClient {
    async fn fetch(&self) -> Result<Snapshot, SourceError> {
        let url = self.listings_url();

        tracing::debug!(url = %url, limit = self.config.limit, "Fetching listings");

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&self.query())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        Self::parse_listings(&body, &self.config.convert)
    }
}

/// Listings response envelope
#[derive(Debug, Deserialize)]
struct ListingsResponse {
    data: Vec<CmcAsset>,
}

/// One ranked asset
#[derive(Debug, Deserialize)]
struct CmcAsset {
    symbol: String,
    #[serde(default)]
    quote: HashMap<String, CmcQuote>,
}

/// Price in one quote currency
#[derive(Debug, Deserialize)]
struct CmcQuote {
    #[serde(default)]
    price: Option<Decimal>,
}
