// src/bin/probe_worldbank.rs
use std::env;
use std::sync::Arc;

use valuator::cache::CacheStore;
use valuator::config::Config;
use valuator::services::country::CountryDataService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let code = env::args().nth(1).unwrap_or_else(|| "KZ".to_string());
    let config = Config::from_env();
    let cache = Arc::new(CacheStore::open(&config.cache_path)?);
    let countries = CountryDataService::new(&config, cache);

    let profile = countries.resolve_default(&code).await?;
    println!("{} ({})", profile.country_name, profile.country_code);
    println!("Window: {}-{}", profile.first_year, profile.last_year);
    println!("GDP: {:?}", profile.gdp);
    println!("Average GDP growth: {:.4}", profile.gdp_growth_rate);
    println!("Average inflation:  {:.4}", profile.inflation_rate);
    println!("Corporate tax:      {:.4}", profile.corporate_tax);
    println!("Risk-free rate:     {:.4}", profile.risk_free_rate);
    Ok(())
}
