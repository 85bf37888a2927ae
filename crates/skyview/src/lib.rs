//! # skyview
//!
//! Daily weather observation toolkit:
//!
//! - **Dataset**: Arrow-backed table of dated, categorized weather records
//! - **Filtering**: Weather category and inclusive date range selection
//! - **Summaries**: Describe-style descriptive statistics per column
//! - **Export**: Byte-exact CSV downloads with human readable sizes

pub mod cache;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod export;
pub mod filter;
pub mod summary;

pub use cache::ExportCache;
pub use chart::ChartData;
pub use config::Config;
pub use dashboard::{Dashboard, DashboardView};
pub use dataset::{Column, DateRange, Record, Table, WeatherKind};
pub use export::{Download, ExportArtifact, export_csv, format_size};
pub use filter::{Criteria, filter, filter_weather};
pub use summary::{Summary, summarize};
