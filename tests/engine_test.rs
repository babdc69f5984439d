// tests/engine_test.rs
//
// End-to-end valuation runs against a mocked World Bank / Alpha Vantage
// server, exercising the cache-first fetch paths and the degradation rules.

use chrono::{Datelike, Months, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use valuator::cache::CacheStore;
use valuator::config::Config;
use valuator::engine::{ValuatorEngine, DEFAULT_GROWTH_MULTIPLE};
use valuator::math;
use valuator::models::CompanyData;
use valuator::services::country::{
    CountryDataService, WORLD_BANK_INFLATION, WORLD_BANK_REAL_GDP,
};
use valuator::services::stocks::StockDataService;
use valuator::ValuatorError;

struct TestEnv {
    server: MockServer,
    config: Config,
    _dir: tempfile::TempDir,
}

async fn test_env() -> TestEnv {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        worldbank_url: format!("{}/", server.uri()),
        alphavantage_url: server.uri(),
        alphavantage_key: "test".to_string(),
        cache_path: dir.path().join("cache.json"),
    };
    TestEnv {
        server,
        config,
        _dir: dir,
    }
}

fn services(config: &Config) -> (CountryDataService, StockDataService) {
    let cache = Arc::new(CacheStore::open(&config.cache_path).unwrap());
    (
        CountryDataService::new(config, cache.clone()),
        StockDataService::new(config, cache),
    )
}

/// World Bank style body: metadata object first, newest-first value list.
fn wb_series_body(values: &[(i32, Option<f64>)]) -> Value {
    let entries: Vec<Value> = values
        .iter()
        .rev()
        .map(|(year, value)| {
            json!({
                "date": year.to_string(),
                "value": value,
            })
        })
        .collect();
    json!([
        { "page": 1, "pages": 1, "per_page": 50, "total": entries.len() },
        entries
    ])
}

async fn mount_worldbank_kz(server: &MockServer, expected_calls: u64) {
    let last_year = Utc::now().year() - 1;
    let gdp: Vec<(i32, Option<f64>)> = vec![
        (last_year - 4, Some(180e9)),
        (last_year - 3, Some(171e9)),
        (last_year - 2, Some(197e9)),
        (last_year - 1, Some(225e9)),
        (last_year, Some(262e9)),
    ];
    let inflation: Vec<(i32, Option<f64>)> = vec![
        (last_year - 4, Some(5.2)),
        (last_year - 3, Some(6.8)),
        (last_year - 2, Some(8.0)),
        (last_year - 1, Some(15.0)),
        (last_year, Some(14.8)),
    ];

    Mock::given(method("GET"))
        .and(path(format!("/KZ/indicator/{WORLD_BANK_REAL_GDP}")))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wb_series_body(&gdp)))
        .expect(expected_calls)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/KZ/indicator/{WORLD_BANK_INFLATION}")))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wb_series_body(&inflation)))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn fresh_overview() -> Value {
    let latest_quarter = Utc::now()
        .date_naive()
        .checked_sub_months(Months::new(1))
        .unwrap();
    json!({
        "Symbol": "SQ",
        "Name": "Block, Inc",
        "RevenueTTM": "21915905000",
        "EBITDA": "424389000",
        "EVToRevenue": "2.0",
        "EVToEBITDA": "10.0",
        "MarketCapitalization": "38066201000",
        "LatestQuarter": latest_quarter.format("%Y-%m-%d").to_string()
    })
}

fn kz_company(data_first_year: i32) -> CompanyData {
    serde_json::from_value(json!({
        "name": "Arta Logistics",
        "country": "KZ",
        "dataFirstYear": data_first_year,
        "revenue": [500e6, 750e6, 900e6],
        "ebitda": [200e6, 260e6, 300e6],
        "freeCashFlow": [120e6, 180e6, 240e6],
        "cash": -100e6,
        "equity": 50e6,
        "equityRate": 0.58,
        "debt": 125e6,
        "debtRate": 0.35,
        "comparableStock": "SQ",
        "ventureRate": 0.58
    }))
    .unwrap()
}

#[tokio::test]
async fn full_valuation_end_to_end() {
    let env = test_env().await;
    mount_worldbank_kz(&env.server, 1).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("function", "OVERVIEW"))
        .and(query_param("symbol", "SQ"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fresh_overview()))
        .expect(1)
        .mount(&env.server)
        .await;

    let (countries, stocks) = services(&env.config);
    let current_year = Utc::now().year();
    let company = kz_company(current_year);

    let engine = ValuatorEngine::new(&company, current_year, &countries, &stocks)
        .await
        .unwrap();

    // KZ static data resolved from the tables.
    assert!((engine.country().corporate_tax - 0.20).abs() < 1e-12);
    assert!((engine.country().risk_free_rate - 0.1425).abs() < 1e-12);

    let valuation = engine.valuate_at(current_year).await.unwrap();

    // DCF must match the same formulas computed by hand.
    let wacc = math::wacc(125e6, 0.35, 50e6, 0.58, 0.20);
    assert!(wacc > 0.35 && wacc < 0.58);
    let growth = engine.country().gdp_growth_rate;
    let fcf = [120e6, 180e6, 240e6];
    let expected_dcf =
        math::dcf(&fcf, wacc) + math::terminal_value(240e6, wacc, growth) - 225e6;
    assert!(valuation.dcf.is_finite());
    assert!((valuation.dcf - expected_dcf).abs() < 1.0);

    // EBITDA CAGR ~22% selects the default band.
    let expected_ebitda = 200e6 * DEFAULT_GROWTH_MULTIPLE - 225e6;
    assert!((valuation.ebitda - expected_ebitda).abs() < 1.0);

    // Count-weighted comparable multiples.
    let expected_multiples = (500e6 * 2.0 + 200e6 * 10.0) / 2.0 - 225e6;
    assert!((valuation.multiples - expected_multiples).abs() < 1.0);

    // Composite is the mean of the three positive methods; exit is the
    // current year, so nothing is discounted.
    let expected_composite = (valuation.dcf + valuation.ebitda + valuation.multiples) / 3.0;
    assert!((valuation.composite - expected_composite).abs() < 1.0);
    assert_eq!(valuation.present_value, None);
    assert!(valuation.report.contains("Discounted Cash Flow"));
    assert!(valuation.report.contains("Comparable: Block, Inc (SQ)"));

    // A second run is served entirely from the cache; the .expect(1)
    // mounts verify no extra requests happen when the server drops.
    let engine = ValuatorEngine::new(&company, current_year, &countries, &stocks)
        .await
        .unwrap();
    let second = engine.valuate_at(current_year).await.unwrap();
    assert!((second.composite - valuation.composite).abs() < 1.0);
}

#[tokio::test]
async fn rate_limited_ticker_degrades_to_zero() {
    let env = test_env().await;
    mount_worldbank_kz(&env.server, 1).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("function", "OVERVIEW"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Information": "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day."
        })))
        .mount(&env.server)
        .await;

    let (countries, stocks) = services(&env.config);
    let current_year = Utc::now().year();
    let company = kz_company(current_year);

    let engine = ValuatorEngine::new(&company, current_year, &countries, &stocks)
        .await
        .unwrap();
    let valuation = engine.valuate_at(current_year).await.unwrap();

    assert_eq!(valuation.multiples, 0.0);
    assert!(valuation.dcf.is_finite());
    assert!(valuation.ebitda > 0.0);
    // The composite still averages the two live methods.
    let expected = (valuation.dcf + valuation.ebitda) / 2.0;
    assert!((valuation.composite - expected).abs() < 1.0);
    assert!(valuation.report.contains("not available"));
}

#[tokio::test]
async fn country_fetch_failure_is_fatal() {
    let env = test_env().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&env.server)
        .await;

    let (countries, stocks) = services(&env.config);
    let current_year = Utc::now().year();
    let company = kz_company(current_year);

    let err = ValuatorEngine::new(&company, current_year, &countries, &stocks)
        .await
        .err()
        .expect("country data failure must abort the valuation");
    assert!(matches!(err, ValuatorError::ExternalData(_)));
}

#[tokio::test]
async fn malformed_worldbank_payload_is_fatal() {
    let env = test_env().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&env.server)
        .await;

    let (countries, _) = services(&env.config);
    let err = countries.resolve_default("KZ").await.err().unwrap();
    assert!(matches!(err, ValuatorError::ExternalData(_)));
}

#[tokio::test]
async fn unknown_country_fails_before_any_fetch() {
    let env = test_env().await;
    // No mocks mounted: a request would 404 and the test would still pass,
    // but the lookup must fail first.
    let (countries, _) = services(&env.config);
    let err = countries.resolve_default("ZZ").await.err().unwrap();
    assert!(matches!(err, ValuatorError::UnknownCountry(_)));
}

#[tokio::test]
async fn country_cache_survives_service_restart() {
    let env = test_env().await;
    mount_worldbank_kz(&env.server, 1).await;

    {
        let (countries, _) = services(&env.config);
        countries.resolve_default("KZ").await.unwrap();
    }
    // Fresh store and service over the same file: no second fetch, the
    // .expect(1) mounts verify it on drop.
    let (countries, _) = services(&env.config);
    let profile = countries.resolve_default("KZ").await.unwrap();
    assert_eq!(profile.country_code, "KZ");
    assert_eq!(profile.last_year, Utc::now().year() - 1);
}

#[tokio::test]
async fn expired_stock_entry_triggers_refetch() {
    let env = test_env().await;

    // Seed an overview whose latest quarter is exactly 3 months old: expired.
    let stale_quarter = Utc::now()
        .date_naive()
        .checked_sub_months(Months::new(3))
        .unwrap();
    let mut stale = fresh_overview();
    stale["LatestQuarter"] = json!(stale_quarter.format("%Y-%m-%d").to_string());

    let cache = Arc::new(CacheStore::open(&env.config.cache_path).unwrap());
    cache
        .put(
            valuator::cache::Namespace::Companies,
            "SQ",
            &stale.to_string(),
        )
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("function", "OVERVIEW"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fresh_overview()))
        .expect(1)
        .mount(&env.server)
        .await;

    let stocks = StockDataService::new(&env.config, cache);
    let stock = stocks.resolve("SQ").await.unwrap();
    assert_eq!(stock.symbol, "SQ");
}

#[tokio::test]
async fn empty_overview_is_unavailable() {
    let env = test_env().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&env.server)
        .await;

    let (_, stocks) = services(&env.config);
    let err = stocks.resolve("SQ").await.err().unwrap();
    assert!(matches!(err, ValuatorError::StockUnavailable(_)));
}
