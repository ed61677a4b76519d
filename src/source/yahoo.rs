use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::PriceSource;
use crate::constants::USER_AGENT;
use crate::error::FetchError;
use crate::model::{Period, PricePoint, PriceSeries};

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartApiError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Daily closes from the Yahoo Finance chart endpoint.
pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl YahooClient {
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, ticker: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, ticker)
    }
}

#[async_trait]
impl PriceSource for YahooClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_series(&self, ticker: &str, period: Period) -> Result<PriceSeries, FetchError> {
        let http_error = |source: reqwest::Error| FetchError::Http {
            ticker: ticker.to_string(),
            source,
        };

        let response = self
            .client
            .get(self.chart_url(ticker))
            .query(&[
                ("range", period.as_str()),
                ("interval", "1d"),
                ("includeAdjustedClose", "true"),
            ])
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        let body = response.text().await.map_err(http_error)?;
        decode_response(ticker, status, &body)
    }
}

/// A failed status reports the provider's own error when the body carries one.
fn decode_response(ticker: &str, status: StatusCode, body: &str) -> Result<PriceSeries, FetchError> {
    if status.is_success() {
        return parse_chart_response(ticker, body);
    }

    let api_error = serde_json::from_str::<ChartEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.chart.error);
    match api_error {
        Some(err) => Err(FetchError::Api {
            ticker: ticker.to_string(),
            code: err.code,
            description: err.description,
        }),
        None => Err(FetchError::Status {
            ticker: ticker.to_string(),
            status: status.as_u16(),
        }),
    }
}

/// Decode a chart endpoint payload into a close series.
///
/// Adjusted closes win over raw closes when both are present. Null
/// observations are dropped. Timestamps are moved into exchange-local time
/// before taking the date.
pub fn parse_chart_response(ticker: &str, body: &str) -> Result<PriceSeries, FetchError> {
    let envelope: ChartEnvelope =
        serde_json::from_str(body).map_err(|source| FetchError::Decode {
            ticker: ticker.to_string(),
            source,
        })?;

    if let Some(err) = envelope.chart.error {
        return Err(FetchError::Api {
            ticker: ticker.to_string(),
            code: err.code,
            description: err.description,
        });
    }

    let no_data = || FetchError::NoData {
        ticker: ticker.to_string(),
    };

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(no_data)?;

    let ChartResult {
        meta,
        timestamp,
        mut indicators,
    } = result;

    let adjusted = indicators
        .adjclose
        .drain(..)
        .next()
        .map(|a| a.adjclose)
        .filter(|closes| closes.iter().any(Option::is_some));
    let closes = match adjusted {
        Some(closes) => closes,
        None => indicators
            .quote
            .drain(..)
            .next()
            .map(|q| q.close)
            .ok_or_else(no_data)?,
    };

    let points: Vec<PricePoint> = timestamp
        .iter()
        .zip(closes)
        .filter_map(|(ts, close)| {
            let close = close.filter(|c| c.is_finite())?;
            let date = DateTime::from_timestamp(ts + meta.gmtoffset, 0)?.date_naive();
            Some(PricePoint { date, close })
        })
        .collect();

    if points.is_empty() {
        return Err(no_data());
    }

    Ok(PriceSeries::new(ticker, points))
}
