//! Dashboard pipeline: filter the source table, then summarize, chart and
//! export both the source and the selection.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::{
    cache::ExportCache,
    chart::ChartData,
    config::Config,
    dataset::{Error, Table, WeatherKind},
    export::Download,
    filter::Criteria,
    summary::{Summary, summarize},
};

#[derive(Debug)]
pub struct Dashboard {
    source: Table,
    default_weather: Vec<WeatherKind>,
    cache: ExportCache,
}

/// Everything shown for one selection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub criteria: Criteria,
    #[serde(skip)]
    pub filtered: Table,
    pub charts: ChartData,
    pub source_summary: Summary,
    pub filtered_summary: Summary,
    pub source_download: Download,
    pub filtered_download: Download,
}

impl Dashboard {
    #[must_use]
    pub fn new(source: Table, config: &Config) -> Self {
        info!(rows = source.num_rows(), "Loaded source table");
        Self {
            source,
            default_weather: config.default_weather().to_vec(),
            cache: ExportCache::new(config.cache_max_entries()),
        }
    }

    #[must_use]
    pub fn source(&self) -> &Table {
        &self.source
    }

    #[must_use]
    pub fn cache(&self) -> &ExportCache {
        &self.cache
    }

    /// Criteria over the source table; see [`Criteria::derive`].
    pub fn criteria(
        &self,
        weathers: impl IntoIterator<Item = WeatherKind>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Criteria, Error> {
        Criteria::derive(&self.source, weathers, start, end)
    }

    /// Criteria selecting the configured weather kinds over the full range.
    pub fn default_criteria(&self) -> Result<Criteria, Error> {
        self.criteria(self.default_weather.iter().copied(), None, None)
    }

    pub fn render(&self, criteria: &Criteria) -> Result<DashboardView, Error> {
        let filtered = criteria.apply(&self.source)?;
        info!(
            source_rows = self.source.num_rows(),
            filtered_rows = filtered.num_rows(),
            range = %criteria.range,
            "Rendering dashboard"
        );
        Ok(DashboardView {
            criteria: criteria.clone(),
            charts: ChartData::from_table(&filtered),
            source_summary: summarize(&self.source),
            filtered_summary: summarize(&filtered),
            source_download: Download::source(self.cache.get_or_export(&self.source)?),
            filtered_download: Download::filtered(self.cache.get_or_export(&filtered)?),
            filtered,
        })
    }
}
