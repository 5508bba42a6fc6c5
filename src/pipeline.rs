//! The per-batch analysis pipeline: normalize each symbol, fetch its
//! history, run the indicators and the forecaster, and collect a typed
//! outcome per symbol. A failing symbol is recorded and skipped, never
//! fatal to the batch.

use crate::forecast::{self, ForecastError};
use crate::indicators::{self, CrashSignal, Mood, Risk};
use crate::market_data::{FetchError, MarketDataProvider};
use crate::portfolio::{self, PortfolioSuggestion};
use crate::storage_utils::AppConfig;
use crate::symbols;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SymbolError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("no price history available")]
    EmptySeries,
    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

/// Analysis record for one successfully processed symbol.
#[derive(Debug, Clone)]
pub struct SymbolReport {
    pub symbol: String,
    pub predicted_price: f64,
    pub mood: Mood,
    pub risk: Risk,
    pub crash: CrashSignal,
    pub growth_pct: f64,
}

#[derive(Debug)]
pub struct SymbolFailure {
    pub symbol: String,
    pub error: SymbolError,
}

/// One batch run: successful reports in input order, plus a failure
/// record per skipped symbol.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub reports: Vec<SymbolReport>,
    pub failures: Vec<SymbolFailure>,
}

impl BatchReport {
    /// Successful results sorted by growth descending, for display.
    pub fn ranked(&self) -> Vec<&SymbolReport> {
        portfolio::rank_by_growth(&self.reports)
    }

    /// The three-slot suggestion; `None` when every symbol failed.
    pub fn portfolio(&self) -> Option<PortfolioSuggestion> {
        portfolio::suggest(&self.reports)
    }
}

/// Runs the whole pipeline over a comma-separated symbol batch,
/// sequentially and in input order.
pub async fn run_batch(
    provider: &dyn MarketDataProvider,
    raw_symbols: &str,
    config: &AppConfig,
) -> BatchReport {
    let mut batch = BatchReport::default();

    for symbol in symbols::parse_batch(raw_symbols, &config.market.default_suffix) {
        match analyze_symbol(provider, &symbol, config).await {
            Ok(report) => batch.reports.push(report),
            Err(error) => {
                tracing::warn!(%symbol, %error, "skipping symbol");
                batch.failures.push(SymbolFailure { symbol, error });
            }
        }
    }

    batch
}

async fn analyze_symbol(
    provider: &dyn MarketDataProvider,
    symbol: &str,
    config: &AppConfig,
) -> Result<SymbolReport, SymbolError> {
    let bars = provider.fetch_daily(symbol).await?;
    if bars.is_empty() {
        return Err(SymbolError::EmptySeries);
    }

    let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();
    let predicted_price = forecast::forecast_close(&closes, config.forecast.horizon_days)?;

    Ok(SymbolReport {
        symbol: symbol.to_string(),
        predicted_price,
        mood: indicators::trend_mood(&closes, &config.thresholds),
        risk: indicators::risk_bucket(&closes, &config.thresholds),
        crash: indicators::crash_signal(&closes, &config.thresholds),
        growth_pct: indicators::growth_pct(&closes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::Bar;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    struct FakeProvider {
        series: HashMap<String, Vec<Bar>>,
    }

    impl FakeProvider {
        fn new(series: &[(&str, Vec<Bar>)]) -> Self {
            Self {
                series: series
                    .iter()
                    .map(|(symbol, bars)| (symbol.to_string(), bars.clone()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl MarketDataProvider for FakeProvider {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn fetch_daily(&self, symbol: &str) -> Result<Vec<Bar>, FetchError> {
            self.series
                .get(symbol)
                .cloned()
                .ok_or_else(|| FetchError::SymbolNotFound {
                    symbol: symbol.to_string(),
                })
        }
    }

    fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 1_000,
            })
            .collect()
    }

    fn us_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.market.default_suffix = String::new();
        config
    }

    #[tokio::test]
    async fn good_and_bad_symbols_split_into_reports_and_failures() {
        let rising: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let provider = FakeProvider::new(&[
            ("AAPL", bars_from_closes(&rising)),
            ("EMPTY", Vec::new()),
        ]);

        let batch = run_batch(&provider, "AAPL, BADSYMBOL, EMPTY", &us_config()).await;

        assert_eq!(batch.reports.len(), 1);
        assert_eq!(batch.failures.len(), 2);

        let report = &batch.reports[0];
        assert_eq!(report.symbol, "AAPL");
        // Unit-slope line from 100 over 30 points, read at index 30 + 30.
        assert!((report.predicted_price - 160.0).abs() < 1e-9);
        assert!((report.growth_pct - 29.0).abs() < 1e-9);
        assert_eq!(report.mood, Mood::Bullish);
        assert_eq!(report.risk, Risk::Low);
        assert_eq!(report.crash, CrashSignal::Stable);

        assert!(matches!(
            batch.failures[0],
            SymbolFailure {
                error: SymbolError::Fetch(FetchError::SymbolNotFound { .. }),
                ..
            }
        ));
        assert!(matches!(
            batch.failures[1],
            SymbolFailure {
                error: SymbolError::EmptySeries,
                ..
            }
        ));

        // Ranking and the suggestion only see the surviving result.
        assert_eq!(batch.ranked().len(), 1);
        assert_eq!(batch.portfolio().unwrap().high_return, "AAPL");
    }

    #[tokio::test]
    async fn one_bar_series_fails_the_forecast_not_the_batch() {
        let provider = FakeProvider::new(&[("STUB", bars_from_closes(&[42.0]))]);

        let batch = run_batch(&provider, "STUB", &us_config()).await;

        assert!(batch.reports.is_empty());
        assert!(matches!(
            batch.failures[0].error,
            SymbolError::Forecast(ForecastError::TooShort(1))
        ));
    }

    #[tokio::test]
    async fn all_failed_batch_produces_no_ranking_or_portfolio() {
        let provider = FakeProvider::new(&[]);

        let batch = run_batch(&provider, "ONE, TWO", &us_config()).await;

        assert!(batch.reports.is_empty());
        assert_eq!(batch.failures.len(), 2);
        assert!(batch.ranked().is_empty());
        assert!(batch.portfolio().is_none());
    }

    #[tokio::test]
    async fn reports_keep_input_order() {
        let flat = bars_from_closes(&[50.0; 25]);
        let provider = FakeProvider::new(&[("ZZZ", flat.clone()), ("AAA", flat)]);

        let batch = run_batch(&provider, "ZZZ, AAA", &us_config()).await;

        let order: Vec<&str> = batch.reports.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, vec!["ZZZ", "AAA"]);
    }

    #[tokio::test]
    async fn suffix_is_applied_before_the_fetch() {
        let flat = bars_from_closes(&[50.0; 25]);
        let provider = FakeProvider::new(&[("TCS.NS", flat)]);

        let batch = run_batch(&provider, "tcs", &AppConfig::default()).await;

        assert_eq!(batch.reports.len(), 1);
        assert_eq!(batch.reports[0].symbol, "TCS.NS");
    }
}
