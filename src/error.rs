use thiserror::Error;

/// Failure to obtain prices for a single ticker.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for {ticker} failed: {source}")]
    Http {
        ticker: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("provider returned status {status} for {ticker}")]
    Status { ticker: String, status: u16 },

    #[error("provider rejected {ticker}: {code} ({description})")]
    Api {
        ticker: String,
        code: String,
        description: String,
    },

    #[error("malformed response for {ticker}: {source}")]
    Decode {
        ticker: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no price data for {ticker}")]
    NoData { ticker: String },
}

impl FetchError {
    pub fn ticker(&self) -> &str {
        match self {
            FetchError::Http { ticker, .. }
            | FetchError::Status { ticker, .. }
            | FetchError::Api { ticker, .. }
            | FetchError::Decode { ticker, .. }
            | FetchError::NoData { ticker } => ticker,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no sectors configured")]
    EmptyUniverse,

    #[error("sector name must not be empty")]
    UnnamedSector,

    #[error("sector {name} has no tickers")]
    EmptySector { name: String },

    #[error("sector {sector} lists a blank ticker")]
    BlankTicker { sector: String },

    #[error("sector {name} is configured more than once")]
    DuplicateSector { name: String },

    #[error("unknown sector {name}")]
    UnknownSector { name: String },

    #[error("top must be at least 1")]
    InvalidTop,

    #[error("unknown period {value}; expected one of 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max")]
    UnknownPeriod { value: String },
}
