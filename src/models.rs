// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ValuatorError};

/// Financial data of the private company being valued, as supplied by the
/// caller. Field names follow the JSON contract of the input form:
/// `revenue`, `ebitda` and `freeCashFlow` are yearly series starting at
/// `dataFirstYear`; they may differ in length.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyData {
    pub name: String,
    /// Head office country, ISO 3166 alpha-2 code.
    pub country: String,
    pub data_first_year: i32,
    pub revenue: Vec<f64>,
    pub ebitda: Vec<f64>,
    pub free_cash_flow: Vec<f64>,
    pub cash: f64,
    pub equity: f64,
    pub equity_rate: f64,
    pub debt: f64,
    pub debt_rate: f64,
    #[serde(default)]
    pub market_share: f64,
    #[serde(default)]
    pub is_leader: bool,
    #[serde(default)]
    pub comparable_stock: String,
    #[serde(default)]
    pub venture_exit_year: Option<i32>,
    #[serde(default)]
    pub venture_rate: f64,
}

impl CompanyData {
    /// Fail-fast input validation with field-specific messages. Values that
    /// only some methods need (EBITDA series, comparable ticker) are allowed
    /// to be empty; those methods degrade on their own.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ValuatorError::invalid("name", "must not be empty"));
        }
        if self.country.len() != 2 || !self.country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValuatorError::invalid(
                "country",
                format!("'{}' is not an ISO 3166 alpha-2 code", self.country),
            ));
        }
        if self.free_cash_flow.is_empty() {
            return Err(ValuatorError::invalid(
                "freeCashFlow",
                "at least one forecast value is required",
            ));
        }
        if self.data_first_year < 1900 || self.data_first_year > 2200 {
            return Err(ValuatorError::invalid(
                "dataFirstYear",
                format!("{} is not a plausible year", self.data_first_year),
            ));
        }
        Ok(())
    }

    /// Net financial position: debt minus cash and equivalents.
    pub fn nfp(&self) -> f64 {
        self.debt - self.cash
    }

    /// Last year covered by any of the series.
    pub fn data_last_year(&self) -> i32 {
        let longest = self
            .revenue
            .len()
            .max(self.ebitda.len())
            .max(self.free_cash_flow.len());
        self.data_first_year + longest.saturating_sub(1) as i32
    }
}

/// Economic profile of a country, assembled from World Bank series and the
/// static per-country tables. Cached whole under the `countries` namespace;
/// `last_year` is the embedded freshness marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryProfile {
    pub country_code: String,
    pub country_name: String,
    pub first_year: i32,
    pub last_year: i32,
    pub gdp: Vec<f64>,
    pub inflation: Vec<f64>,
    /// CAGR between the first and last GDP values of the window.
    pub gdp_growth_rate: f64,
    /// Arithmetic mean of the leading non-zero inflation values.
    pub inflation_rate: f64,
    pub corporate_tax: f64,
    pub risk_free_rate: f64,
    pub market_return: f64,
}

impl CountryProfile {
    pub fn gdp_in(&self, year: i32) -> f64 {
        self.series_value(&self.gdp, year)
    }

    pub fn inflation_in(&self, year: i32) -> f64 {
        self.series_value(&self.inflation, year)
    }

    fn series_value(&self, series: &[f64], year: i32) -> f64 {
        let index = year - self.first_year;
        if index < 0 {
            return f64::NAN;
        }
        series.get(index as usize).copied().unwrap_or(f64::NAN)
    }
}

/// Public comparable company fundamentals from the Alpha Vantage OVERVIEW
/// endpoint. The payload delivers every number as a JSON string (often
/// "None" or "-" for missing data), so fields are parsed defensively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockProfile {
    pub symbol: String,
    pub name: String,
    pub revenue_ttm: f64,
    pub ebitda_ttm: f64,
    pub ev_to_revenue: f64,
    pub ev_to_ebitda: f64,
    pub market_capitalization: f64,
    /// End date of the latest reported fiscal quarter; freshness marker.
    pub latest_quarter: NaiveDate,
}

impl StockProfile {
    /// Parses an OVERVIEW payload. A payload without `LatestQuarter` cannot
    /// participate in cache freshness checks and is rejected.
    pub fn from_overview(overview: &Value) -> Result<StockProfile> {
        let latest_quarter = overview
            .get("LatestQuarter")
            .and_then(Value::as_str)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .ok_or_else(|| {
                ValuatorError::StockUnavailable(
                    "overview payload carries no LatestQuarter date".to_string(),
                )
            })?;

        Ok(StockProfile {
            symbol: string_field(overview, "Symbol"),
            name: string_field(overview, "Name"),
            revenue_ttm: numeric_field(overview, "RevenueTTM"),
            ebitda_ttm: numeric_field(overview, "EBITDA"),
            ev_to_revenue: numeric_field(overview, "EVToRevenue"),
            ev_to_ebitda: numeric_field(overview, "EVToEBITDA"),
            market_capitalization: numeric_field(overview, "MarketCapitalization"),
            latest_quarter,
        })
    }

    /// Enterprise value implied by the reported EBITDA and its multiple.
    pub fn enterprise_value(&self) -> f64 {
        self.ebitda_ttm * self.ev_to_ebitda
    }
}

fn string_field(overview: &Value, field: &str) -> String {
    overview
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Numeric OVERVIEW fields arrive as strings; "None", "-" and absent fields
/// all read as 0.0.
fn numeric_field(overview: &Value, field: &str) -> f64 {
    match overview.get(field) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}
