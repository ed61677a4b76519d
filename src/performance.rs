use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;

use crate::logging;
use crate::model::{PriceSeries, PriceTable};

/// Change of one ticker's close across the fetched window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerPerformance {
    pub ticker: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub first_close: f64,
    pub last_close: f64,
    pub change_pct: f64,
}

/// Average performance of a sector's tickers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorPerformance {
    pub sector: String,
    pub average_pct: f64,
}

pub fn change_pct(first: f64, last: f64) -> f64 {
    (last - first) / first * 100.0
}

/// Percentage change between the first and last observation.
///
/// Returns `None` for an empty series, a non-positive or non-finite opening
/// close, or a non-finite result.
pub fn ticker_performance(series: &PriceSeries) -> Option<TickerPerformance> {
    let first = series.first()?;
    let last = series.last()?;
    if !first.close.is_finite() || first.close <= 0.0 {
        return None;
    }

    let change = change_pct(first.close, last.close);
    if !change.is_finite() {
        return None;
    }

    Some(TickerPerformance {
        ticker: series.ticker.clone(),
        first_date: first.date,
        last_date: last.date,
        first_close: first.close,
        last_close: last.close,
        change_pct: change,
    })
}

pub fn calculate_performance(table: &PriceTable) -> Vec<TickerPerformance> {
    if table.is_empty() {
        return Vec::new();
    }

    table
        .iter()
        .filter_map(|series| {
            let performance = ticker_performance(series);
            if performance.is_none() {
                logging::warn(
                    "performance.skipped",
                    "Not enough usable prices to compute performance",
                    json!({ "ticker": series.ticker, "points": series.points.len() }),
                );
            }
            performance
        })
        .collect()
}

pub fn sector_average(performances: &[TickerPerformance]) -> Option<f64> {
    if performances.is_empty() {
        return None;
    }
    let total: f64 = performances.iter().map(|p| p.change_pct).sum();
    Some(total / performances.len() as f64)
}

/// Sector averages ordered best to worst.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Ranking {
    entries: Vec<SectorPerformance>,
}

impl Ranking {
    pub fn entries(&self) -> &[SectorPerformance] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn best(&self) -> Option<&SectorPerformance> {
        self.entries.first()
    }

    pub fn worst(&self) -> Option<&SectorPerformance> {
        self.entries.last()
    }

    pub fn top(&self, n: usize) -> &[SectorPerformance] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// The last `n` entries, still ordered best to worst.
    pub fn bottom(&self, n: usize) -> &[SectorPerformance] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }
}

/// Sort descending by average. Equal averages keep their input order.
pub fn rank_sectors(mut averages: Vec<SectorPerformance>) -> Ranking {
    averages.sort_by(|a, b| {
        b.average_pct
            .partial_cmp(&a.average_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ranking { entries: averages }
}
