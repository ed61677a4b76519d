pub const YAHOO_CHART_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) sector-performance/0.1";
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TOP_N: usize = 3;
pub const CHART_WIDTH: u32 = 120;
pub const CHART_HEIGHT: u32 = 30;
pub const SYNTHETIC_SEED: u64 = 0xBADF00D;
