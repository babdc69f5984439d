use anyhow::Context;
use chrono::{Datelike, Utc};
use dotenv::dotenv;
use log::info;
use std::env;
use std::fs;
use std::sync::Arc;

use valuator::cache::CacheStore;
use valuator::config::Config;
use valuator::engine::ValuatorEngine;
use valuator::models::CompanyData;
use valuator::services::country::CountryDataService;
use valuator::services::stocks::StockDataService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let mut args = env::args().skip(1);
    let path = args
        .next()
        .context("usage: valuator <company.json> [exit-year]")?;
    let exit_year_arg: Option<i32> = match args.next() {
        Some(raw) => Some(raw.parse().context("exit year must be a number")?),
        None => None,
    };

    let config = Config::from_env();
    info!("Using cache at {}", config.cache_path.display());

    let cache = Arc::new(CacheStore::open(&config.cache_path)?);
    let countries = CountryDataService::new(&config, cache.clone());
    let stocks = StockDataService::new(&config, cache.clone());

    let text = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let company: CompanyData =
        serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;

    let exit_year = exit_year_arg
        .or(company.venture_exit_year)
        .unwrap_or_else(|| Utc::now().year());
    info!("Valuating {} with exit year {}", company.name, exit_year);

    let engine = ValuatorEngine::new(&company, exit_year, &countries, &stocks).await?;
    let valuation = engine.valuate().await?;

    println!("{}", valuation.report);
    Ok(())
}
