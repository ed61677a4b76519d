use async_trait::async_trait;
use chrono::{Days, Local, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use super::PriceSource;
use crate::error::FetchError;
use crate::model::{is_weekday, Period, PricePoint, PriceSeries};

const DAILY_VOLATILITY: f64 = 0.015;

/// Offline price source producing a seeded random walk per ticker.
///
/// The same `(seed, ticker, anchor)` always yields the same series, so a
/// ticker shared by several sectors contributes identical prices to each.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    seed: u64,
    anchor: NaiveDate,
}

impl SyntheticSource {
    pub fn new(seed: u64) -> Self {
        Self::with_anchor(seed, Local::now().date_naive())
    }

    pub fn with_anchor(seed: u64, anchor: NaiveDate) -> Self {
        Self { seed, anchor }
    }

    fn ticker_seed(&self, ticker: &str) -> u64 {
        // FNV-1a over the ticker, folded into the run seed
        ticker
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325_u64 ^ self.seed, |hash, byte| {
                (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
            })
    }

    /// The most recent `count` weekdays up to and including the anchor, oldest first.
    fn session_dates(&self, count: usize) -> Vec<NaiveDate> {
        let mut dates = Vec::with_capacity(count);
        let mut day = self.anchor;
        while dates.len() < count {
            if is_weekday(day) {
                dates.push(day);
            }
            match day.checked_sub_days(Days::new(1)) {
                Some(previous) => day = previous,
                None => break,
            }
        }
        dates.reverse();
        dates
    }
}

#[async_trait]
impl PriceSource for SyntheticSource {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn fetch_series(&self, ticker: &str, period: Period) -> Result<PriceSeries, FetchError> {
        let mut rng = StdRng::seed_from_u64(self.ticker_seed(ticker));
        let mut price: f64 = rng.gen_range(80.0..150.0);

        let points = self
            .session_dates(period.trading_days(self.anchor))
            .into_iter()
            .map(|date| {
                let shock: f64 = rng.sample(StandardNormal);
                price = (price * (1.0 + shock * DAILY_VOLATILITY)).max(0.01);
                PricePoint { date, close: price }
            })
            .collect();

        Ok(PriceSeries::new(ticker, points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> NaiveDate {
        // a Sunday
        NaiveDate::from_ymd_opt(2024, 6, 9).expect("valid date")
    }

    #[tokio::test]
    async fn series_is_deterministic_per_ticker() {
        let source = SyntheticSource::with_anchor(7, anchor());
        let a = source.fetch_series("SOL.JO", Period::OneMonth).await.expect("series");
        let b = source.fetch_series("SOL.JO", Period::OneMonth).await.expect("series");
        let other = source.fetch_series("NPN.JO", Period::OneMonth).await.expect("series");

        assert_eq!(a, b);
        assert_ne!(a.points, other.points);
    }

    #[tokio::test]
    async fn sessions_skip_weekends_and_end_at_anchor() {
        let source = SyntheticSource::with_anchor(7, anchor());
        let series = source.fetch_series("MTN.JO", Period::FiveDays).await.expect("series");

        let dates: Vec<NaiveDate> = series.points.iter().map(|p| p.date).collect();
        let expected: Vec<NaiveDate> = (3..=7)
            .map(|day| NaiveDate::from_ymd_opt(2024, 6, day).expect("valid date"))
            .collect();
        assert_eq!(dates, expected);
        assert!(series.points.iter().all(|p| p.close > 0.0));
    }

    #[tokio::test]
    async fn length_follows_period() {
        let source = SyntheticSource::with_anchor(1, anchor());
        let series = source.fetch_series("AGL.JO", Period::SixMonths).await.expect("series");
        assert_eq!(series.points.len(), 126);
    }
}
