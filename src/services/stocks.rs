// src/services/stocks.rs
//
// Comparable public company fundamentals from the Alpha Vantage OVERVIEW
// endpoint. Cache-first: the raw payload is cached under the ticker and
// stays valid until its embedded LatestQuarter is 3 months in the past
// (Alpha Vantage free keys allow 25 requests per day, so every avoided
// call matters). Every failure surfaces as `StockUnavailable`, which the
// valuation engine treats as recoverable.

use chrono::{NaiveDate, Utc};
use log::{info, warn};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;

use crate::cache::{CacheStore, Namespace};
use crate::config::Config;
use crate::error::{Result, ValuatorError};
use crate::models::StockProfile;

use super::months_between;

/// Cached overviews expire 3 months after the latest reported quarter
/// (inclusive: exactly 3 months old means expired).
pub const COMPANY_DATA_EXPIRATION_MONTHS: i32 = 3;

pub struct StockDataService {
    client: Client,
    base_url: String,
    api_key: String,
    cache: Arc<CacheStore>,
}

impl StockDataService {
    pub fn new(config: &Config, cache: Arc<CacheStore>) -> Self {
        StockDataService {
            client: Client::new(),
            base_url: config.alphavantage_url.clone(),
            api_key: config.alphavantage_key.clone(),
            cache,
        }
    }

    /// Resolves fundamentals for a ticker, fetching only on cache miss or
    /// expiry. An empty response object or an `Information` note in place
    /// of data (the provider's rate-limit signal) is an error.
    pub async fn resolve(&self, ticker: &str) -> Result<StockProfile> {
        let ticker = ticker.trim().to_ascii_uppercase();
        if ticker.is_empty() {
            return Err(ValuatorError::StockUnavailable(
                "no comparable stock ticker supplied".to_string(),
            ));
        }
        let today = Utc::now().date_naive();

        if let Some(payload) = self.cache.get(Namespace::Companies, &ticker) {
            match serde_json::from_str::<Value>(&payload)
                .map_err(ValuatorError::from)
                .and_then(|overview| StockProfile::from_overview(&overview))
            {
                Ok(profile) if overview_is_fresh(profile.latest_quarter, today) => {
                    info!("Serving {} overview from cache", ticker);
                    return Ok(profile);
                }
                Ok(_) => info!("Cached {} overview expired, refetching", ticker),
                Err(e) => warn!("Ignoring unreadable cache entry for {}: {}", ticker, e),
            }
        }

        let url = format!(
            "{}?function=OVERVIEW&symbol={}&apikey={}",
            self.base_url, ticker, self.api_key
        );
        info!("Fetching overview for {} from Alpha Vantage", ticker);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ValuatorError::StockUnavailable(format!("request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(ValuatorError::StockUnavailable(format!(
                "status {} for ticker {}",
                response.status(),
                ticker
            )));
        }
        let text = response
            .text()
            .await
            .map_err(|e| ValuatorError::StockUnavailable(format!("reading body failed: {e}")))?;

        let overview: Value = serde_json::from_str(&text).map_err(|_| {
            ValuatorError::StockUnavailable(format!("malformed overview payload for {ticker}"))
        })?;
        let fields = overview.as_object().ok_or_else(|| {
            ValuatorError::StockUnavailable(format!("overview for {ticker} is not an object"))
        })?;
        if fields.is_empty() {
            return Err(ValuatorError::StockUnavailable(format!(
                "empty overview returned for {ticker}"
            )));
        }
        if let Some(note) = fields.get("Information").and_then(Value::as_str) {
            return Err(ValuatorError::StockUnavailable(note.to_string()));
        }

        let profile = StockProfile::from_overview(&overview)?;
        self.cache.put(Namespace::Companies, &ticker, &text)?;
        Ok(profile)
    }
}

pub(crate) fn overview_is_fresh(latest_quarter: NaiveDate, today: NaiveDate) -> bool {
    months_between(latest_quarter, today) < COMPANY_DATA_EXPIRATION_MONTHS
}
