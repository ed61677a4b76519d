pub mod analysis;
pub mod app;
pub mod chart;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod model;
pub mod performance;
pub mod report;
pub mod source;
