// src/engine.rs
//
// Valuation engine: runs the three valuation methods against a company,
// its country's economic profile and an optional comparable public stock,
// then blends them into a composite valuation, discounted to present value
// when the exit year is in the future. Stateless across calls; every method
// is idempotent for a given company and exit year.

use chrono::Datelike;
use chrono::Utc;
use log::warn;
use serde::Serialize;

use crate::error::{Result, ValuatorError};
use crate::math;
use crate::models::{CompanyData, CountryProfile};
use crate::services::country::CountryDataService;
use crate::services::stocks::StockDataService;

pub const DEFAULT_GROWTH_MULTIPLE: f64 = 4.0;
pub const FAST_GROWTH_MULTIPLE: f64 = 6.0;
pub const LEADER_MULTIPLE: f64 = 8.0;
/// EBITDA CAGR from which a company counts as fast-growing.
pub const FAST_GROWTH_THRESHOLD: f64 = 0.5;

pub const BASE_EBITDA_MULTIPLE: f64 = 2.0;
pub const MAX_GROWTH_MULTIPLE: f64 = 8.0;
pub const MAX_MARKET_MULTIPLE: f64 = 5.0;
pub const COEFFICIENT_TO_MULTIPLE: f64 = 10.0;
pub const MIN_EBITDA_MULTIPLE: f64 = 1.5;
pub const MAX_EBITDA_MULTIPLE: f64 = 15.0;

/// How the EBITDA multiple is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultiplePolicy {
    /// Discrete bands on EBITDA CAGR: 4x by default, 6x for CAGR >= 50%,
    /// flat 8x for a market leader.
    #[default]
    Banded,
    /// Continuous multiple from inflation-adjusted AAGR and market share:
    /// `2 + min(net_growth*10, 8) + min(share*10, 5)`, clamped to
    /// [1.5, 15.0].
    Continuous,
}

/// How the three method results are blended into one figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompositeMode {
    /// Unweighted mean of the methods with a strictly positive result;
    /// zero when no method produced one.
    PositiveMean,
    /// Fixed weighted blend; weights are expected to sum to 1.
    Weighted {
        dcf: f64,
        ebitda: f64,
        multiples: f64,
    },
}

impl CompositeMode {
    /// The historically observed fixed blend.
    pub fn default_weighted() -> CompositeMode {
        CompositeMode::Weighted {
            dcf: 0.4,
            ebitda: 0.3,
            multiples: 0.3,
        }
    }
}

impl Default for CompositeMode {
    fn default() -> Self {
        CompositeMode::PositiveMean
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    pub multiple_policy: MultiplePolicy,
    pub composite: CompositeMode,
}

/// Result of a full valuation run. `dcf` may be NaN when the terminal value
/// is undefined (GDP growth at or above the discount rate); check before
/// using it in further arithmetic.
#[derive(Debug, Clone, Serialize)]
pub struct Valuation {
    pub dcf: f64,
    pub ebitda: f64,
    pub multiples: f64,
    pub composite: f64,
    pub present_value: Option<f64>,
    pub report: String,
}

pub struct ValuatorEngine<'a> {
    company: &'a CompanyData,
    country: CountryProfile,
    stocks: &'a StockDataService,
    exit_year: i32,
    options: EngineOptions,
}

impl<'a> ValuatorEngine<'a> {
    /// Validates the company record and resolves its country profile
    /// (cache-first; a failed fetch is fatal, see the country service).
    pub async fn new(
        company: &'a CompanyData,
        exit_year: i32,
        countries: &CountryDataService,
        stocks: &'a StockDataService,
    ) -> Result<ValuatorEngine<'a>> {
        company.validate()?;
        let country = countries.resolve_default(&company.country).await?;
        Ok(ValuatorEngine {
            company,
            country,
            stocks,
            exit_year,
            options: EngineOptions::default(),
        })
    }

    /// Builds an engine from an already resolved country profile.
    pub fn from_parts(
        company: &'a CompanyData,
        country: CountryProfile,
        stocks: &'a StockDataService,
        exit_year: i32,
    ) -> Result<ValuatorEngine<'a>> {
        company.validate()?;
        Ok(ValuatorEngine {
            company,
            country,
            stocks,
            exit_year,
            options: EngineOptions::default(),
        })
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn country(&self) -> &CountryProfile {
        &self.country
    }

    /// Runs all three methods, blends them and discounts the composite to
    /// present value when the exit year lies beyond the current year.
    pub async fn valuate(&self) -> Result<Valuation> {
        self.valuate_at(Utc::now().year()).await
    }

    pub async fn valuate_at(&self, current_year: i32) -> Result<Valuation> {
        let mut report = Report::new();
        self.write_company_summary(&mut report);

        let dcf = self.valuate_dcf(&mut report)?;
        let ebitda = self.valuate_ebitda(&mut report);
        let multiples = self.valuate_multiples(&mut report).await;
        let composite = combine_methods(dcf, ebitda, multiples, self.options.composite);

        report.section(&format!("VALUATION SUMMARY ({})", self.exit_year));
        report.line(&format!("Composite valuation: {}", format_money(composite)));

        let years_to_exit = self.exit_year - current_year;
        let present_value = if years_to_exit >= 1 {
            let pv = math::present_value(composite, self.company.venture_rate, years_to_exit);
            report.line(&format!(
                "Present value ({}, venture rate {}): {}",
                current_year,
                format_percent(self.company.venture_rate),
                format_money(pv)
            ));
            Some(pv)
        } else {
            None
        };

        Ok(Valuation {
            dcf,
            ebitda,
            multiples,
            composite,
            present_value,
            report: report.into_string(),
        })
    }

    /// Discounted cash flow method. Slices the free cash flow forecast at
    /// the exit year, discounts it at WACC (CAPM with beta 1 when WACC is
    /// undetermined) and adds the Gordon terminal value at the country's
    /// GDP growth rate. A terminal value rendered NaN by growth >= rate
    /// propagates into the result.
    pub fn valuate_dcf(&self, report: &mut Report) -> Result<f64> {
        let company = self.company;
        let country = &self.country;

        let offset = self.exit_year - company.data_first_year;
        if offset < 0 {
            return Err(ValuatorError::invalid(
                "exitYear",
                format!(
                    "exit year {} precedes first data year {}",
                    self.exit_year, company.data_first_year
                ),
            ));
        }
        let offset = offset as usize;
        if offset >= company.free_cash_flow.len() {
            return Err(ValuatorError::invalid(
                "exitYear",
                format!("no free cash flow forecast for {}", self.exit_year),
            ));
        }
        let horizon = &company.free_cash_flow[offset..];

        let mut wacc = math::wacc(
            company.debt,
            company.debt_rate,
            company.equity,
            company.equity_rate,
            country.corporate_tax,
        );
        let mut rate_label = "WACC";
        if wacc == 0.0 {
            // Neither outside equity nor loans: approximate the discount
            // rate with CAPM at beta 1 (unlevered beta estimation deferred).
            wacc = math::capm(country.risk_free_rate, 1.0, country.market_return);
            rate_label = "CAPM";
        }

        let discounted = math::dcf(horizon, wacc);
        let terminal = math::terminal_value(horizon[horizon.len() - 1], wacc, country.gdp_growth_rate);
        let nfp = company.nfp();
        let equity_value = discounted + terminal - nfp;

        report.section(&format!(
            "{} Discounted Cash Flow (FCF) Valuation",
            company.name
        ));
        report.line(&format!(
            "Economy growth = {} ({})",
            format_percent(country.gdp_growth_rate),
            country.country_name
        ));
        report.line(&format!(
            "Corporate tax = {} ({})",
            format_percent(country.corporate_tax),
            country.country_name
        ));
        report.line(&format!("{} = {}", rate_label, format_percent(wacc)));
        report.line(&format!("DCF = {}", format_money(discounted)));
        report.line(&format!("TV = {}", format_money(terminal)));
        report.line(&format!("NFP = {}", format_money(nfp)));
        report.line(&format!("Valuation = {}", format_money(equity_value)));

        Ok(equity_value)
    }

    /// EBITDA multiple method. The method is optional: an empty EBITDA
    /// series yields zero rather than an error.
    pub fn valuate_ebitda(&self, report: &mut Report) -> f64 {
        let company = self.company;
        report.section(&format!("{} EBITDA Multiple Valuation", company.name));

        let ebitda = &company.ebitda;
        if ebitda.is_empty() {
            report.line("No EBITDA data available, method skipped");
            return 0.0;
        }

        let first_year = company.data_first_year;
        let last_year = first_year + ebitda.len() as i32 - 1;
        let (growth, multiple) = self.ebitda_multiple(ebitda);

        // Base EBITDA: first strictly positive value at or after the exit
        // year; first-year value when none qualifies.
        let mut base_ebitda = ebitda[0];
        let mut base_year = first_year;
        for (i, value) in ebitda.iter().enumerate() {
            let year = first_year + i as i32;
            if *value > 0.0 && year >= self.exit_year {
                base_ebitda = *value;
                base_year = year;
                break;
            }
        }

        let nfp = company.nfp();
        let enterprise_value = base_ebitda * multiple;
        let equity_value = enterprise_value - nfp;

        report.line(&format!(
            "EBITDA: {} ({})",
            format_money(base_ebitda),
            base_year
        ));
        report.line(&format!(
            "Growth rate ({}-{}): {}",
            first_year,
            last_year,
            format_percent(growth)
        ));
        if self.options.multiple_policy == MultiplePolicy::Continuous {
            report.line(&format!(
                "Inflation: {}  Market share: {}",
                format_percent(self.country.inflation_rate),
                format_percent(company.market_share)
            ));
        }
        report.line(&format!("Multiple: {:.2}x", multiple));
        report.line(&format!("NFP = {}", format_money(nfp)));
        report.line(&format!("Valuation: {}", format_money(equity_value)));

        equity_value
    }

    fn ebitda_multiple(&self, ebitda: &[f64]) -> (f64, f64) {
        match self.options.multiple_policy {
            MultiplePolicy::Banded => {
                let periods = (ebitda.len() - 1) as f64;
                let growth = math::cagr(ebitda[0], ebitda[ebitda.len() - 1], periods);
                let mut multiple = if growth >= FAST_GROWTH_THRESHOLD {
                    FAST_GROWTH_MULTIPLE
                } else {
                    DEFAULT_GROWTH_MULTIPLE
                };
                if self.company.is_leader {
                    multiple = LEADER_MULTIPLE;
                }
                (growth, multiple)
            }
            MultiplePolicy::Continuous => {
                let growth = math::aagr(ebitda);
                let net_growth = if growth.is_nan() {
                    0.0
                } else {
                    growth - self.country.inflation_rate
                };
                let growth_term = (net_growth * COEFFICIENT_TO_MULTIPLE).min(MAX_GROWTH_MULTIPLE);
                let share_term =
                    (self.company.market_share * COEFFICIENT_TO_MULTIPLE).min(MAX_MARKET_MULTIPLE);
                let multiple = (BASE_EBITDA_MULTIPLE + growth_term + share_term)
                    .clamp(MIN_EBITDA_MULTIPLE, MAX_EBITDA_MULTIPLE);
                (growth, multiple)
            }
        }
    }

    /// Comparable multiples method. Failures from the stock service are
    /// recoverable: the method reports the gap and contributes zero, the
    /// rest of the valuation continues untouched.
    pub async fn valuate_multiples(&self, report: &mut Report) -> f64 {
        let company = self.company;
        report.section(&format!("{} Comparable Multiples Valuation", company.name));

        let stock = match self.stocks.resolve(&company.comparable_stock).await {
            Ok(stock) => stock,
            Err(e) => {
                warn!("Comparable multiples method skipped: {}", e);
                report.line(&format!(
                    "Data for comparable stock '{}' is not available: {}",
                    company.comparable_stock, e
                ));
                return 0.0;
            }
        };

        report.line(&format!("Comparable: {} ({})", stock.name, stock.symbol));

        let offset = self.exit_year - company.data_first_year;
        if offset < 0 {
            report.line("Exit year precedes company data, method skipped");
            return 0.0;
        }
        let offset = offset as usize;

        // Each signal contributes only when its own inputs are usable;
        // the average is taken over the signals actually present.
        let mut enterprise_sum = 0.0;
        let mut signals = 0;

        if let Some(revenue) = company.revenue.get(offset) {
            if stock.ev_to_revenue > 0.0 {
                let value = revenue * stock.ev_to_revenue;
                report.line(&format!(
                    "EV/Revenue ({:.2}x): {}",
                    stock.ev_to_revenue,
                    format_money(value)
                ));
                enterprise_sum += value;
                signals += 1;
            }
        }
        if let Some(ebitda) = company.ebitda.get(offset) {
            if *ebitda > 0.0 && stock.ev_to_ebitda > 0.0 {
                let value = ebitda * stock.ev_to_ebitda;
                report.line(&format!(
                    "EV/EBITDA ({:.2}x): {}",
                    stock.ev_to_ebitda,
                    format_money(value)
                ));
                enterprise_sum += value;
                signals += 1;
            }
        }

        if signals == 0 {
            report.line("No usable EV/Revenue or EV/EBITDA signal, method skipped");
            return 0.0;
        }

        let enterprise_value = enterprise_sum / signals as f64;
        let nfp = company.nfp();
        let equity_value = enterprise_value - nfp;

        report.line(&format!(
            "EV average over {} signal(s): {}",
            signals,
            format_money(enterprise_value)
        ));
        report.line(&format!("NFP = {}", format_money(nfp)));
        report.line(&format!("Valuation: {}", format_money(equity_value)));

        equity_value
    }

    fn write_company_summary(&self, report: &mut Report) {
        let company = self.company;
        report.section(&format!("{} ({})", company.name, company.country));

        let len = company
            .revenue
            .len()
            .max(company.ebitda.len())
            .max(company.free_cash_flow.len());
        let years: String = (0..len)
            .map(|i| format!("{:>16}", company.data_first_year + i as i32))
            .collect();
        report.line(&format!("{:<10}{}", "Years", years));
        if !company.revenue.is_empty() {
            report.line(&series_row("Revenue", &company.revenue, len));
        }
        if !company.ebitda.is_empty() {
            report.line(&series_row("EBITDA", &company.ebitda, len));
        }
        if !company.free_cash_flow.is_empty() {
            report.line(&series_row("Free CF", &company.free_cash_flow, len));
        }
        report.line(&format!(
            "Equity: {} (rate {})",
            format_money(company.equity),
            format_percent(company.equity_rate)
        ));
        report.line(&format!(
            "Debt: {} (rate {})",
            format_money(company.debt),
            format_percent(company.debt_rate)
        ));
        report.line(&format!("Cash: {}", format_money(company.cash)));
        if !company.comparable_stock.is_empty() {
            report.line(&format!("Comparable stock: {}", company.comparable_stock));
        }
        if company.is_leader {
            report.line("Market position: leader");
        } else if company.market_share > 0.0 {
            report.line(&format!(
                "Market share: {}",
                format_percent(company.market_share)
            ));
        }
    }
}

/// Blends the three method results per the configured mode.
pub fn combine_methods(dcf: f64, ebitda: f64, multiples: f64, mode: CompositeMode) -> f64 {
    match mode {
        CompositeMode::PositiveMean => {
            let mut sum = 0.0;
            let mut count = 0;
            for value in [dcf, ebitda, multiples] {
                if value > 0.0 {
                    sum += value;
                    count += 1;
                }
            }
            if count == 0 {
                0.0
            } else {
                sum / count as f64
            }
        }
        CompositeMode::Weighted {
            dcf: w_dcf,
            ebitda: w_ebitda,
            multiples: w_multiples,
        } => dcf * w_dcf + ebitda * w_ebitda + multiples * w_multiples,
    }
}

const RULE: &str = "------------------------------------------------------------";

/// Plain-text report accumulator. HTML rendering is left to the UI layer.
#[derive(Debug, Default)]
pub struct Report {
    buf: String,
}

impl Report {
    pub fn new() -> Report {
        Report::default()
    }

    pub fn section(&mut self, title: &str) {
        self.buf.push('\n');
        self.buf.push_str(RULE);
        self.buf.push('\n');
        self.buf.push_str(title);
        self.buf.push('\n');
        self.buf.push_str(RULE);
        self.buf.push('\n');
    }

    pub fn line(&mut self, text: &str) {
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

/// Money formatting for reports: rounded to whole units, thousands
/// separated, NaN shown as "n/a".
pub fn format_money(value: f64) -> String {
    if value.is_nan() {
        return "n/a".to_string();
    }
    let rounded = value.abs().round() as i64;
    let raw = rounded.to_string();
    let mut grouped = String::with_capacity(raw.len() + raw.len() / 3 + 1);
    if value < 0.0 {
        grouped.push('-');
    }
    for (i, c) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

pub fn format_percent(value: f64) -> String {
    if value.is_nan() {
        return "n/a".to_string();
    }
    format!("{}%", math::to_percent(value))
}

fn series_row(label: &str, series: &[f64], len: usize) -> String {
    let mut row = format!("{:<10}", label);
    for i in 0..len {
        match series.get(i) {
            Some(value) => row.push_str(&format!("{:>16}", format_money(*value))),
            None => row.push_str(&format!("{:>16}", "-")),
        }
    }
    row
}
