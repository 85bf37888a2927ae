//! Chart-ready series derived from a table.

use chrono::NaiveDate;
use itertools::Itertools;
use serde::Serialize;

use crate::{
    dataset::{Table, WeatherKind},
    summary::NumericSummary,
};

/// One day on the max temperature scatter plot, sized by precipitation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterPoint {
    pub date: NaiveDate,
    pub temp_max: Option<f64>,
    pub precipitation: Option<f64>,
    pub weather: WeatherKind,
}

/// Number of days per weather kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherCount {
    pub weather: WeatherKind,
    pub count: usize,
    pub color: &'static str,
}

/// Mean max temperature per weather kind with a one standard deviation
/// extent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBar {
    pub weather: WeatherKind,
    pub mean: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub points: Vec<ScatterPoint>,
    pub counts: Vec<WeatherCount>,
    pub error_bars: Vec<ErrorBar>,
}

fn defined(value: f64) -> Option<f64> {
    (!value.is_nan()).then_some(value)
}

impl ChartData {
    #[must_use]
    pub fn from_table(table: &Table) -> Self {
        let points: Vec<_> = table
            .records()
            .map(|record| ScatterPoint {
                date: record.date,
                temp_max: defined(record.temp_max),
                precipitation: defined(record.precipitation),
                weather: record.weather,
            })
            .collect();

        let groups = table
            .records()
            .into_group_map_by(|record| record.weather);
        let counts = WeatherKind::ALL
            .into_iter()
            .map(|weather| WeatherCount {
                weather,
                count: groups.get(&weather).map_or(0, Vec::len),
                color: weather.color(),
            })
            .collect();
        let error_bars = WeatherKind::ALL
            .into_iter()
            .filter_map(|weather| {
                let records = groups.get(&weather)?;
                let summary =
                    NumericSummary::from_values(records.iter().map(|record| record.temp_max));
                let extent = summary.mean.zip(summary.std);
                Some(ErrorBar {
                    weather,
                    mean: summary.mean,
                    lower: extent.map(|(mean, std)| mean - std),
                    upper: extent.map(|(mean, std)| mean + std),
                })
            })
            .collect();

        Self {
            points,
            counts,
            error_bars,
        }
    }
}
