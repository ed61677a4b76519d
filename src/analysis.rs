use std::collections::HashMap;

use serde::Serialize;
use serde_json::json;

use crate::logging;
use crate::model::{Period, PriceSeries, PriceTable, Sector, SectorUniverse};
use crate::performance::{
    calculate_performance, rank_sectors, sector_average, Ranking, SectorPerformance,
    TickerPerformance,
};
use crate::source::{fetch_prices, PriceSource};

/// Per-ticker and average performance for one sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorReport {
    pub sector: String,
    pub tickers: Vec<TickerPerformance>,
    /// Configured tickers that produced no performance.
    pub missing: Vec<String>,
    pub average_pct: Option<f64>,
}

impl SectorReport {
    pub fn has_data(&self) -> bool {
        self.average_pct.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub period: Period,
    pub source: &'static str,
    pub sectors: Vec<SectorReport>,
    pub ranking: Ranking,
}

impl AnalysisReport {
    pub fn sector(&self, name: &str) -> Option<&SectorReport> {
        self.sectors.iter().find(|s| s.sector == name)
    }

    pub fn best_sector(&self) -> Option<&SectorReport> {
        self.ranking.best().and_then(|best| self.sector(&best.sector))
    }

    pub fn worst_sector(&self) -> Option<&SectorReport> {
        self.ranking.worst().and_then(|worst| self.sector(&worst.sector))
    }
}

/// Drives one analysis run. Series are cached for the lifetime of the
/// analyzer, so a ticker listed in several sectors is downloaded once.
pub struct SectorAnalyzer<'a> {
    source: &'a dyn PriceSource,
    period: Period,
    cache: HashMap<String, Option<PriceSeries>>,
}

impl<'a> SectorAnalyzer<'a> {
    pub fn new(source: &'a dyn PriceSource, period: Period) -> Self {
        Self {
            source,
            period,
            cache: HashMap::new(),
        }
    }

    /// Prices for the sector's tickers, fetching only what the cache lacks.
    pub async fn fetch_sector(&mut self, sector: &Sector) -> PriceTable {
        let mut pending: Vec<String> = Vec::new();
        for ticker in &sector.tickers {
            if !self.cache.contains_key(ticker) && !pending.contains(ticker) {
                pending.push(ticker.clone());
            }
        }

        if !pending.is_empty() {
            let fetched = fetch_prices(self.source, &pending, self.period).await;
            for ticker in pending {
                let series = fetched.get(&ticker).cloned();
                self.cache.insert(ticker, series);
            }
        }

        let mut seen = Vec::with_capacity(sector.tickers.len());
        let series = sector
            .tickers
            .iter()
            .filter(|ticker| {
                if seen.contains(ticker) {
                    return false;
                }
                seen.push(*ticker);
                true
            })
            .filter_map(|ticker| self.cache.get(ticker).cloned().flatten())
            .collect();
        PriceTable::new(series)
    }

    pub async fn analyze_sector(&mut self, sector: &Sector) -> SectorReport {
        logging::info(
            "sector.processing",
            "Processing sector",
            json!({ "sector": sector.name, "tickers": sector.tickers }),
        );

        let table = self.fetch_sector(sector).await;
        let tickers = calculate_performance(&table);
        let average_pct = sector_average(&tickers);

        let mut missing: Vec<String> = Vec::new();
        for ticker in &sector.tickers {
            if !tickers.iter().any(|p| &p.ticker == ticker) && !missing.contains(ticker) {
                missing.push(ticker.clone());
            }
        }

        match average_pct {
            Some(average) => logging::info(
                "sector.performance",
                "Sector average performance computed",
                json!({
                    "sector": sector.name,
                    "average_pct": average,
                    "tickers_used": tickers.len(),
                    "tickers_missing": missing.len(),
                }),
            ),
            None => logging::warn(
                "sector.no_data",
                "No performance data available for sector",
                json!({ "sector": sector.name }),
            ),
        }

        SectorReport {
            sector: sector.name.clone(),
            tickers,
            missing,
            average_pct,
        }
    }

    /// Analyse every sector in order and rank those with data.
    pub async fn run(&mut self, universe: &SectorUniverse) -> AnalysisReport {
        let mut sectors = Vec::with_capacity(universe.len());
        for sector in universe.sectors() {
            sectors.push(self.analyze_sector(sector).await);
        }

        let averages = sectors
            .iter()
            .filter_map(|report| {
                report.average_pct.map(|average_pct| SectorPerformance {
                    sector: report.sector.clone(),
                    average_pct,
                })
            })
            .collect();
        let ranking = rank_sectors(averages);

        if ranking.is_empty() {
            logging::warn_simple("ranking.empty", "No sector produced performance data");
        } else {
            logging::info(
                "ranking.complete",
                "Sectors ranked by average performance",
                json!({
                    "ranked": ranking.len(),
                    "best": ranking.best().map(|s| s.sector.as_str()),
                    "worst": ranking.worst().map(|s| s.sector.as_str()),
                }),
            );
        }

        AnalysisReport {
            period: self.period,
            source: self.source.name(),
            sectors,
            ranking,
        }
    }

    /// Number of distinct tickers requested so far.
    pub fn fetched_tickers(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::model::PricePoint;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Two closes per ticker: 100 then `100 + table value`.
    struct TableSource {
        moves: HashMap<&'static str, f64>,
        calls: AtomicUsize,
    }

    impl TableSource {
        fn new(moves: &[(&'static str, f64)]) -> Self {
            Self {
                moves: moves.iter().copied().collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PriceSource for TableSource {
        fn name(&self) -> &'static str {
            "table"
        }

        async fn fetch_series(&self, ticker: &str, _period: Period) -> Result<PriceSeries, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let change = self.moves.get(ticker).ok_or_else(|| FetchError::NoData {
                ticker: ticker.to_string(),
            })?;
            let d = |day| NaiveDate::from_ymd_opt(2024, 5, day).expect("valid date");
            Ok(PriceSeries::new(
                ticker,
                vec![
                    PricePoint { date: d(1), close: 100.0 },
                    PricePoint { date: d(31), close: 100.0 + change },
                ],
            ))
        }
    }

    fn universe() -> SectorUniverse {
        SectorUniverse::new(vec![
            Sector::new("Energy", &["TGA.JO", "SOL.JO"]),
            Sector::new("Technology", &["NPN.JO", "DGH.JO"]),
            Sector::new("Utilities", &["CIL.JO"]),
            Sector::new("Industrials", &["SOL.JO", "BVT.JO"]),
        ])
        .expect("valid universe")
    }

    #[tokio::test]
    async fn ranks_sectors_and_reports_gaps() {
        logging::set_silent(true);
        let source = TableSource::new(&[
            ("TGA.JO", -10.0),
            ("SOL.JO", 4.0),
            ("NPN.JO", 20.0),
            ("DGH.JO", 10.0),
            ("BVT.JO", 2.0),
        ]);
        let mut analyzer = SectorAnalyzer::new(&source, Period::SixMonths);
        let report = analyzer.run(&universe()).await;

        let order: Vec<&str> = report
            .ranking
            .entries()
            .iter()
            .map(|s| s.sector.as_str())
            .collect();
        assert_eq!(order, vec!["Technology", "Industrials", "Energy"]);

        let utilities = report.sector("Utilities").expect("utilities report");
        assert!(!utilities.has_data());
        assert_eq!(utilities.missing, vec!["CIL.JO"]);

        assert_eq!(
            report.best_sector().map(|s| s.sector.as_str()),
            Some("Technology")
        );
        assert_eq!(report.worst_sector().map(|s| s.sector.as_str()), Some("Energy"));
        let energy = report.worst_sector().and_then(|s| s.average_pct).expect("energy average");
        assert!((energy - -3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn shared_tickers_are_fetched_once() {
        logging::set_silent(true);
        let source = TableSource::new(&[("TGA.JO", 1.0), ("SOL.JO", 1.0), ("BVT.JO", 1.0)]);
        let mut analyzer = SectorAnalyzer::new(&source, Period::SixMonths);
        analyzer.run(&universe()).await;

        // TGA SOL NPN DGH CIL BVT, with SOL requested only once
        assert_eq!(source.calls.load(Ordering::SeqCst), 6);
        assert_eq!(analyzer.fetched_tickers(), 6);
    }

    #[tokio::test]
    async fn no_data_anywhere_gives_empty_ranking() {
        logging::set_silent(true);
        let source = TableSource::new(&[]);
        let mut analyzer = SectorAnalyzer::new(&source, Period::SixMonths);
        let report = analyzer.run(&universe()).await;

        assert!(report.ranking.is_empty());
        assert!(report.best_sector().is_none());
        assert!(report.sectors.iter().all(|s| !s.has_data()));
    }

    #[tokio::test]
    async fn duplicate_ticker_within_sector_counts_once() {
        logging::set_silent(true);
        let source = TableSource::new(&[("SOL.JO", 10.0)]);
        let mut analyzer = SectorAnalyzer::new(&source, Period::SixMonths);
        let report = analyzer
            .analyze_sector(&Sector::new("Energy", &["SOL.JO", "SOL.JO"]))
            .await;
        assert_eq!(report.tickers.len(), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
