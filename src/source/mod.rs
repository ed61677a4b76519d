mod synthetic;
mod yahoo;

use async_trait::async_trait;
use futures_util::future::join_all;
use serde_json::json;

use crate::error::FetchError;
use crate::logging;
use crate::model::{Period, PriceSeries, PriceTable};

pub use synthetic::SyntheticSource;
pub use yahoo::{parse_chart_response, YahooClient};

/// Anything that can produce a daily close series for a ticker.
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_series(&self, ticker: &str, period: Period) -> Result<PriceSeries, FetchError>;
}

/// Fetch every ticker concurrently. Failed or empty tickers are logged and
/// left out, so the table may be empty.
pub async fn fetch_prices(source: &dyn PriceSource, tickers: &[String], period: Period) -> PriceTable {
    let requests = tickers
        .iter()
        .map(|ticker| source.fetch_series(ticker, period));
    let results = join_all(requests).await;

    let mut series = Vec::with_capacity(results.len());
    for (ticker, result) in tickers.iter().zip(results) {
        match result {
            Ok(fetched) if fetched.is_empty() => {
                logging::warn(
                    "fetch.ticker_empty",
                    "Price source returned no observations",
                    json!({ "ticker": ticker, "source": source.name() }),
                );
            }
            Ok(fetched) => series.push(fetched),
            Err(err) => {
                logging::warn(
                    "fetch.ticker_failed",
                    "Skipping ticker after download failure",
                    json!({
                        "ticker": err.ticker(),
                        "source": source.name(),
                        "error": err.to_string(),
                    }),
                );
            }
        }
    }

    if series.is_empty() && !tickers.is_empty() {
        logging::error(
            "fetch.batch_failed",
            "No prices downloaded for requested tickers",
            json!({ "tickers": tickers, "period": period.as_str() }),
        );
    }

    PriceTable::new(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PricePoint;
    use chrono::NaiveDate;

    struct FlakySource;

    #[async_trait]
    impl PriceSource for FlakySource {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn fetch_series(&self, ticker: &str, _period: Period) -> Result<PriceSeries, FetchError> {
            let date = NaiveDate::from_ymd_opt(2024, 6, 3).expect("valid date");
            match ticker {
                "BAD.JO" => Err(FetchError::NoData {
                    ticker: ticker.to_string(),
                }),
                "EMPTY.JO" => Ok(PriceSeries::new(ticker, Vec::new())),
                _ => Ok(PriceSeries::new(ticker, vec![PricePoint { date, close: 10.0 }])),
            }
        }
    }

    #[tokio::test]
    async fn failed_tickers_are_skipped() {
        logging::set_silent(true);
        let tickers: Vec<String> = ["ABG.JO", "BAD.JO", "EMPTY.JO", "NED.JO"]
            .iter()
            .map(|t| t.to_string())
            .collect();

        let table = fetch_prices(&FlakySource, &tickers, Period::SixMonths).await;
        let fetched: Vec<&str> = table.tickers().collect();
        assert_eq!(fetched, vec!["ABG.JO", "NED.JO"]);
    }

    #[tokio::test]
    async fn all_failures_give_an_empty_table() {
        logging::set_silent(true);
        let tickers = vec!["BAD.JO".to_string()];
        let table = fetch_prices(&FlakySource, &tickers, Period::OneYear).await;
        assert!(table.is_empty());
    }
}
