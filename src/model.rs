use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Lookback window requested from the price source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[default]
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    pub const ALL: [Period; 11] = [
        Period::OneDay,
        Period::FiveDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
        Period::TenYears,
        Period::YearToDate,
        Period::Max,
    ];

    /// Range token understood by the chart endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }

    /// Approximate number of trading sessions covered when ending on `anchor`.
    pub fn trading_days(self, anchor: NaiveDate) -> usize {
        match self {
            Period::OneDay => 1,
            Period::FiveDays => 5,
            Period::OneMonth => 21,
            Period::ThreeMonths => 63,
            Period::SixMonths => 126,
            Period::OneYear => 252,
            Period::TwoYears => 504,
            Period::FiveYears => 1_260,
            Period::TenYears => 2_520,
            Period::YearToDate => {
                use chrono::Datelike;

                let start = NaiveDate::from_ymd_opt(anchor.year(), 1, 1).unwrap_or(anchor);
                start
                    .iter_days()
                    .take_while(|day| *day <= anchor)
                    .filter(|day| is_weekday(*day))
                    .count()
                    .max(1)
            }
            Period::Max => 5_040,
        }
    }
}

pub(crate) fn is_weekday(day: NaiveDate) -> bool {
    use chrono::{Datelike, Weekday};

    !matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim().to_ascii_lowercase();
        Period::ALL
            .into_iter()
            .find(|period| period.as_str() == needle)
            .ok_or_else(|| ConfigError::UnknownPeriod {
                value: value.to_string(),
            })
    }
}

/// A named group of tickers. A ticker may appear in more than one sector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    pub name: String,
    pub tickers: Vec<String>,
}

impl Sector {
    pub fn new(name: &str, tickers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            tickers: tickers.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

/// Ordered set of sectors with unique names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectorUniverse {
    sectors: Vec<Sector>,
}

impl SectorUniverse {
    pub fn new(sectors: Vec<Sector>) -> Result<Self, ConfigError> {
        if sectors.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }

        let mut seen = HashSet::with_capacity(sectors.len());
        for sector in &sectors {
            if sector.name.trim().is_empty() {
                return Err(ConfigError::UnnamedSector);
            }
            if sector.tickers.is_empty() {
                return Err(ConfigError::EmptySector {
                    name: sector.name.clone(),
                });
            }
            if sector.tickers.iter().any(|t| t.trim().is_empty()) {
                return Err(ConfigError::BlankTicker {
                    sector: sector.name.clone(),
                });
            }
            // lookups ignore case and padding, so uniqueness must too
            if !seen.insert(sector.name.trim().to_ascii_lowercase()) {
                return Err(ConfigError::DuplicateSector {
                    name: sector.name.clone(),
                });
            }
        }

        Ok(Self { sectors })
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    /// Case-insensitive lookup by sector name.
    pub fn find(&self, name: &str) -> Result<&Sector, ConfigError> {
        self.sectors
            .iter()
            .find(|sector| sector.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| ConfigError::UnknownSector {
                name: name.to_string(),
            })
    }

    /// Distinct tickers across all sectors, in first-seen order.
    pub fn distinct_tickers(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.sectors
            .iter()
            .flat_map(|sector| sector.tickers.iter())
            .map(String::as_str)
            .filter(|ticker| seen.insert(*ticker))
            .collect()
    }
}

impl Default for SectorUniverse {
    fn default() -> Self {
        jse_sectors()
    }
}

/// JSE sectors and their constituent tickers.
pub fn jse_sectors() -> SectorUniverse {
    let sectors = vec![
        Sector::new(
            "Financials",
            &["ABG.JO", "FSR.JO", "NED.JO", "SBK.JO", "OMU.JO"],
        ),
        Sector::new("Industrials", &["SOL.JO", "BVT.JO", "SHP.JO", "APN.JO"]),
        Sector::new(
            "Resources",
            &["AGL.JO", "AMS.JO", "IMP.JO", "ANG.JO", "SOL.JO"],
        ),
        Sector::new("Technology", &["NPN.JO", "DGH.JO"]),
        Sector::new("Consumer Goods", &["BTI.JO", "SAB.JO", "WHL.JO", "TRU.JO"]),
        Sector::new("Telecommunications", &["MTN.JO", "VOD.JO"]),
        Sector::new("Real Estate", &["RDF.JO", "GRT.JO", "EPP.JO"]),
        Sector::new("Utilities", &["CIL.JO", "PPC.JO"]),
        Sector::new("Energy", &["TGA.JO", "SOL.JO"]),
        Sector::new("Consumer Services", &["CLS.JO", "MRP.JO", "TBS.JO"]),
    ];

    SectorUniverse { sectors }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Date-ordered closing prices for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub ticker: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self {
            ticker: ticker.into(),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}

/// Series fetched for one request, kept in request order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    series: Vec<PriceSeries>,
}

impl PriceTable {
    pub fn new(series: Vec<PriceSeries>) -> Self {
        Self { series }
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn get(&self, ticker: &str) -> Option<&PriceSeries> {
        self.series.iter().find(|s| s.ticker == ticker)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceSeries> {
        self.series.iter()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.ticker.as_str())
    }
}
