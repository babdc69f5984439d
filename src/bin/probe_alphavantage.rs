// src/bin/probe_alphavantage.rs
use std::env;
use std::sync::Arc;

use valuator::cache::CacheStore;
use valuator::config::Config;
use valuator::services::stocks::StockDataService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let ticker = env::args().nth(1).unwrap_or_else(|| "IBM".to_string());
    let config = Config::from_env();
    let cache = Arc::new(CacheStore::open(&config.cache_path)?);
    let stocks = StockDataService::new(&config, cache);

    let stock = stocks.resolve(&ticker).await?;
    println!("{} ({})", stock.name, stock.symbol);
    println!("Revenue (TTM):    {:.0}", stock.revenue_ttm);
    println!("EBITDA (TTM):     {:.0}", stock.ebitda_ttm);
    println!("EV/Revenue:       {:.2}x", stock.ev_to_revenue);
    println!("EV/EBITDA:        {:.2}x", stock.ev_to_ebitda);
    println!("Enterprise value: {:.0}", stock.enterprise_value());
    println!("Latest quarter:   {}", stock.latest_quarter);
    Ok(())
}
