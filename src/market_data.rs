//! Daily-bar market data: the provider seam and the Yahoo Finance client.
//!
//! Yahoo's v8 chart API has no official contract and pads holidays with
//! null quote rows; those are dropped here so the analysis pipeline only
//! ever sees complete bars.

use crate::storage_utils::MarketConfig;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// One trading day of a symbol's history, oldest-first in a series.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no price data for {symbol}")]
    SymbolNotFound { symbol: String },
    #[error("rate limited by the data provider")]
    RateLimited,
    #[error("provider returned HTTP {status}")]
    HttpStatus { status: u16 },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed provider response: {0}")]
    BadResponse(String),
}

impl FetchError {
    /// Transient failures worth another attempt; 4xx rejections and
    /// malformed bodies are terminal.
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::RateLimited | FetchError::Transport(_) => true,
            FetchError::HttpStatus { status } => *status >= 500,
            FetchError::SymbolNotFound { .. } | FetchError::BadResponse(_) => false,
        }
    }
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Daily bars over the configured lookback window, ordered by date
    /// ascending. The series is free of null bars but may be empty.
    async fn fetch_daily(&self, symbol: &str) -> Result<Vec<Bar>, FetchError>;
}

// --- Yahoo Finance v8 chart API response shape ---

#[derive(Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

// --- Client ---

const BASE_DELAY: Duration = Duration::from_millis(500);

pub struct YahooProvider {
    http: reqwest::Client,
    lookback_range: String,
    interval: String,
    max_retries: u32,
}

impl YahooProvider {
    pub fn new(market: &MarketConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;

        Ok(Self {
            http,
            lookback_range: market.lookback_range.clone(),
            interval: market.interval.clone(),
            max_retries: 3,
        })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{}?range={}&interval={}",
            symbol, self.lookback_range, self.interval
        )
    }

    async fn fetch_once(&self, symbol: &str) -> Result<Vec<Bar>, FetchError> {
        let response = self
            .http
            .get(self.chart_url(symbol))
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited);
        }
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let chart: ChartResponse = response
            .json()
            .await
            .map_err(|e| FetchError::BadResponse(e.to_string()))?;

        parse_chart(symbol, chart)
    }
}

/// Flattens the chart payload into bars, dropping rows with any missing
/// OHLC value (holidays, halted sessions). A result with no timestamps is
/// an empty series, not an error; the orchestrator reports it per symbol.
fn parse_chart(symbol: &str, resp: ChartResponse) -> Result<Vec<Bar>, FetchError> {
    let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
        Some(err) if err.code == "Not Found" => FetchError::SymbolNotFound {
            symbol: symbol.to_string(),
        },
        Some(err) => FetchError::BadResponse(format!("{}: {}", err.code, err.description)),
        None => FetchError::BadResponse("empty result with no error".to_string()),
    })?;

    let Some(data) = result.into_iter().next() else {
        return Err(FetchError::BadResponse("result array is empty".to_string()));
    };

    let Some(timestamps) = data.timestamp else {
        return Ok(Vec::new());
    };

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::BadResponse("no quote data".to_string()))?;

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.naive_utc().date())
            .ok_or_else(|| FetchError::BadResponse(format!("invalid timestamp: {ts}")))?;

        let open = quote.open.get(i).copied().flatten();
        let high = quote.high.get(i).copied().flatten();
        let low = quote.low.get(i).copied().flatten();
        let close = quote.close.get(i).copied().flatten();

        let (Some(open), Some(high), Some(low), Some(close)) = (open, high, low, close) else {
            continue;
        };

        bars.push(Bar {
            date,
            open,
            high,
            low,
            close,
            volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
        });
    }

    Ok(bars)
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &'static str {
        "yahoo_finance"
    }

    async fn fetch_daily(&self, symbol: &str) -> Result<Vec<Bar>, FetchError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once(symbol).await {
                Ok(bars) => return Ok(bars),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    let backoff = BASE_DELAY * 2u32.pow(attempt - 1);
                    tracing::warn!(%symbol, attempt, ?backoff, error = %err, "fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
