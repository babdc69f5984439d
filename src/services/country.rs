// src/services/country.rs
//
// Country economic profiles: GDP and inflation history from the World Bank
// open data API, corporate tax and base rate from the static tables.
// Profiles are served cache-first; a cached profile stays valid until its
// embedded last data year is 12 months in the past.

use chrono::{Datelike, NaiveDate, Utc};
use log::{info, warn};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;

use crate::cache::{CacheStore, Namespace};
use crate::config::Config;
use crate::error::{Result, ValuatorError};
use crate::math;
use crate::models::CountryProfile;

use super::country_tables as tables;
use super::months_between;

pub const WORLD_BANK_REAL_GDP: &str = "NY.GDP.MKTP.KD";
pub const WORLD_BANK_INFLATION: &str = "NY.GDP.DEFL.KD.ZG";

pub const MINIMUM_YEARS_OF_HISTORY: i32 = 3;
pub const DEFAULT_YEARS_OF_HISTORY: i32 = 5;
pub const MAXIMUM_YEARS_OF_HISTORY: i32 = 10;

/// Cached country profiles expire 12 months after their embedded year end
/// (inclusive: exactly 12 months old means expired).
pub const COUNTRY_DATA_EXPIRATION_MONTHS: i32 = 12;

pub struct CountryDataService {
    client: Client,
    base_url: String,
    cache: Arc<CacheStore>,
}

impl CountryDataService {
    pub fn new(config: &Config, cache: Arc<CacheStore>) -> Self {
        CountryDataService {
            client: Client::new(),
            base_url: config.worldbank_url.clone(),
            cache,
        }
    }

    pub async fn resolve_default(&self, country_code: &str) -> Result<CountryProfile> {
        self.resolve(country_code, DEFAULT_YEARS_OF_HISTORY).await
    }

    /// Resolves the economic profile for an alpha-2 country code, fetching
    /// from the World Bank only when no fresh cached profile exists.
    /// A failed or malformed fetch is fatal: the valuation cannot proceed
    /// without country data.
    pub async fn resolve(&self, country_code: &str, years_of_history: i32) -> Result<CountryProfile> {
        let country = tables::find(country_code)
            .ok_or_else(|| ValuatorError::UnknownCountry(country_code.to_string()))?;
        let years = years_of_history.clamp(MINIMUM_YEARS_OF_HISTORY, MAXIMUM_YEARS_OF_HISTORY);
        let today = Utc::now().date_naive();

        if let Some(payload) = self.cache.get(Namespace::Countries, country.alpha2) {
            match serde_json::from_str::<CountryProfile>(&payload) {
                Ok(profile) if profile_is_fresh(&profile, today) => {
                    info!("Serving {} profile from cache", country.alpha2);
                    return Ok(profile);
                }
                Ok(_) => info!("Cached {} profile expired, refetching", country.alpha2),
                Err(e) => warn!("Ignoring unreadable cache entry for {}: {}", country.alpha2, e),
            }
        }

        // World Bank data lags by one year.
        let last_year = today.year() - 1;
        let first_year = last_year - (years - 1);

        let gdp = self
            .fetch_series(country.alpha2, WORLD_BANK_REAL_GDP, first_year, last_year)
            .await?;
        let mut inflation = self
            .fetch_series(country.alpha2, WORLD_BANK_INFLATION, first_year, last_year)
            .await?;
        // Inflation arrives in percent.
        for value in &mut inflation {
            *value /= 100.0;
        }

        let gdp_growth_rate = math::cagr(gdp[0], gdp[gdp.len() - 1], (years - 1) as f64);
        let inflation_rate = leading_nonzero_average(&inflation);

        let profile = CountryProfile {
            country_code: country.alpha2.to_string(),
            country_name: country.name.to_string(),
            first_year,
            last_year,
            gdp,
            inflation,
            gdp_growth_rate,
            inflation_rate,
            corporate_tax: tables::corporate_tax_rate(country.alpha3),
            risk_free_rate: tables::base_rate(country.alpha3),
            market_return: tables::DEFAULT_MARKET_RETURN_RATE,
        };

        self.cache
            .put(Namespace::Countries, country.alpha2, &serde_json::to_string(&profile)?)?;
        Ok(profile)
    }

    async fn fetch_series(
        &self,
        alpha2: &str,
        indicator: &str,
        first_year: i32,
        last_year: i32,
    ) -> Result<Vec<f64>> {
        let url = format!(
            "{}{}/indicator/{}?date={}:{}&format=json",
            self.base_url, alpha2, indicator, first_year, last_year
        );
        info!("Fetching {} for {} from World Bank", indicator, alpha2);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ValuatorError::ExternalData(format!(
                "status {} for {}",
                response.status(),
                url
            )));
        }
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).map_err(|_| {
            ValuatorError::ExternalData(format!("malformed World Bank payload from {url}"))
        })?;
        parse_series(&body, first_year, last_year, &url)
    }
}

/// The World Bank response is a two-element array; element 1 holds the
/// `{date, value}` entries, newest first. Missing or null values read as
/// zero, years outside the requested window are ignored.
fn parse_series(body: &Value, first_year: i32, last_year: i32, url: &str) -> Result<Vec<f64>> {
    let entries = body.get(1).and_then(Value::as_array).ok_or_else(|| {
        ValuatorError::ExternalData(format!("unexpected response shape from {url}"))
    })?;

    let len = (last_year - first_year + 1) as usize;
    let mut values = vec![0.0; len];
    for entry in entries {
        let year = entry
            .get("date")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<i32>().ok());
        let Some(year) = year else { continue };
        let index = year - first_year;
        if index < 0 || index as usize >= len {
            continue;
        }
        values[index as usize] = entry.get("value").and_then(Value::as_f64).unwrap_or(0.0);
    }
    Ok(values)
}

/// Mean of the leading non-zero values: summation stops at the first zero
/// (a gap in the source data) but the divisor stays the full window length.
fn leading_nonzero_average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sum = 0.0;
    for value in values {
        if *value == 0.0 {
            break;
        }
        sum += value;
    }
    sum / values.len() as f64
}

pub(crate) fn profile_is_fresh(profile: &CountryProfile, today: NaiveDate) -> bool {
    match NaiveDate::from_ymd_opt(profile.last_year, 12, 31) {
        Some(year_end) => months_between(year_end, today) < COUNTRY_DATA_EXPIRATION_MONTHS,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn profile_with_last_year(last_year: i32) -> CountryProfile {
        CountryProfile {
            country_code: "KZ".to_string(),
            country_name: "Kazakhstan".to_string(),
            first_year: last_year - 4,
            last_year,
            gdp: vec![1.0; 5],
            inflation: vec![0.05; 5],
            gdp_growth_rate: 0.0,
            inflation_rate: 0.05,
            corporate_tax: 0.20,
            risk_free_rate: 0.1425,
            market_return: 0.2493,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_series_orders_by_year_and_zeroes_nulls() {
        // World Bank answers newest-first with nullable values.
        let body = json!([
            { "page": 1, "pages": 1, "per_page": 50, "total": 3 },
            [
                { "date": "2023", "value": 300.0 },
                { "date": "2022", "value": null },
                { "date": "2021", "value": 100.0 }
            ]
        ]);
        let values = parse_series(&body, 2021, 2023, "test").unwrap();
        assert_eq!(values, vec![100.0, 0.0, 300.0]);
    }

    #[test]
    fn parse_series_ignores_out_of_window_years() {
        let body = json!([
            {},
            [
                { "date": "2019", "value": 1.0 },
                { "date": "2021", "value": 2.0 },
                { "date": "2030", "value": 3.0 }
            ]
        ]);
        let values = parse_series(&body, 2021, 2023, "test").unwrap();
        assert_eq!(values, vec![2.0, 0.0, 0.0]);
    }

    #[test]
    fn parse_series_rejects_unexpected_shape() {
        let body = json!({ "message": "Invalid format" });
        assert!(matches!(
            parse_series(&body, 2021, 2023, "test"),
            Err(ValuatorError::ExternalData(_))
        ));
    }

    #[test]
    fn leading_average_stops_at_first_gap() {
        // 5% and 10% count, the trailing 20% is cut off by the gap, yet the
        // divisor stays 4.
        let got = leading_nonzero_average(&[0.05, 0.10, 0.0, 0.20]);
        assert!((got - 0.0375).abs() < 1e-12);
    }

    #[test]
    fn leading_average_empty_is_zero() {
        assert_eq!(leading_nonzero_average(&[]), 0.0);
    }

    #[test]
    fn profile_fresh_within_twelve_months() {
        let profile = profile_with_last_year(2023);
        // Year end 2023-12-31; 11 months and change later is still fresh.
        assert!(profile_is_fresh(&profile, date(2024, 12, 30)));
    }

    #[test]
    fn profile_expired_at_exactly_twelve_months() {
        let profile = profile_with_last_year(2023);
        assert!(!profile_is_fresh(&profile, date(2024, 12, 31)));
        assert!(!profile_is_fresh(&profile, date(2025, 6, 1)));
    }
}
