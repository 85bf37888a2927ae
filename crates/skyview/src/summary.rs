//! Describe-style descriptive statistics.
//!
//! Numeric columns get count, mean, sample standard deviation, min, quartiles
//! and max. Other columns get count, distinct values, the most frequent value
//! and its frequency. Aggregates that are undefined for the given input are
//! `None` and render as `n/a`.

use std::fmt::{self, Write as _};

use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;

use crate::dataset::{Column, Table};

const UNDEFINED: &str = "n/a";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub q50: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl NumericSummary {
    /// Summarize `values`, skipping `NaN`s.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let sorted: Vec<f64> = values
            .into_iter()
            .filter(|value| !value.is_nan())
            .sorted_by(f64::total_cmp)
            .collect();
        let count = sorted.len();
        let mean = (count > 0).then(|| sorted.iter().sum::<f64>() / count as f64);
        let std = mean.filter(|_| count > 1).map(|mean| {
            let squares: f64 = sorted.iter().map(|value| (value - mean).powi(2)).sum();
            (squares / (count - 1) as f64).sqrt()
        });
        Self {
            count,
            mean,
            std,
            min: sorted.first().copied(),
            q25: percentile(&sorted, 0.25),
            q50: percentile(&sorted, 0.5),
            q75: percentile(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }

    /// Aggregates in display order, after `count`.
    fn aggregates(&self) -> [Option<f64>; 7] {
        [
            self.mean, self.std, self.min, self.q25, self.q50, self.q75, self.max,
        ]
    }
}

/// Percentile of sorted values, interpolating linearly between neighbours.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let position = q * last as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoricalSummary {
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: usize,
}

impl CategoricalSummary {
    /// Summarize `values`. Ties for the most frequent value go to the one seen
    /// first.
    pub fn from_values<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for value in values {
            *counts.entry(value.into()).or_default() += 1;
        }
        let top = counts.iter().rev().max_by_key(|(_, freq)| **freq);
        Self {
            count: counts.values().sum(),
            unique: counts.len(),
            freq: top.map_or(0, |(_, freq)| *freq),
            top: top.map(|(value, _)| value.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnSummary {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

/// Statistics of every column of a table, in column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Summary {
    columns: IndexMap<String, ColumnSummary>,
}

impl Summary {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.get(name)
    }

    #[must_use]
    pub fn numeric(&self, column: Column) -> Option<&NumericSummary> {
        match self.get(column.name())? {
            ColumnSummary::Numeric(summary) => Some(summary),
            ColumnSummary::Categorical(_) => None,
        }
    }

    #[must_use]
    pub fn categorical(&self, column: Column) -> Option<&CategoricalSummary> {
        match self.get(column.name())? {
            ColumnSummary::Categorical(summary) => Some(summary),
            ColumnSummary::Numeric(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnSummary)> {
        self.columns
            .iter()
            .map(|(name, summary)| (name.as_str(), summary))
    }
}

/// Compute a fresh [`Summary`] of `table`.
#[must_use]
pub fn summarize(table: &Table) -> Summary {
    let columns = Column::ALL
        .into_iter()
        .map(|column| {
            let summary = match column {
                Column::Date => ColumnSummary::Categorical(CategoricalSummary::from_values(
                    table.records().map(|record| record.date.to_string()),
                )),
                Column::Weather => ColumnSummary::Categorical(CategoricalSummary::from_values(
                    table.weather_names().iter().flatten(),
                )),
                _ => ColumnSummary::Numeric(NumericSummary::from_values(
                    table
                        .measure(column)
                        .into_iter()
                        .flat_map(|array| array.iter().flatten()),
                )),
            };
            (column.name().to_string(), summary)
        })
        .collect();
    Summary { columns }
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| UNDEFINED.to_string(), |value| format!("{value:.6}"))
}

fn write_block<'a, T: 'a>(
    f: &mut fmt::Formatter<'_>,
    columns: &[(&str, &'a T)],
    labels: &[&str],
    value: impl Fn(&'a T, usize) -> String,
) -> fmt::Result {
    if columns.is_empty() {
        return Ok(());
    }
    let header: Vec<String> = columns.iter().map(|(name, _)| (*name).to_string()).collect();
    let cells: Vec<Vec<String>> = std::iter::once(header)
        .chain((0..labels.len()).map(|row| {
            columns
                .iter()
                .map(|&(_, summary)| value(summary, row))
                .collect()
        }))
        .collect();
    let label_width = labels.iter().map(|label| label.len()).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns.len())
        .map(|i| cells.iter().map(|row| row[i].len()).max().unwrap_or(0))
        .collect();
    for (i, row) in cells.iter().enumerate() {
        let label = if i == 0 { "" } else { labels[i - 1] };
        let mut line = format!("{label:<label_width$}");
        for (text, width) in row.iter().zip(&widths) {
            let _ = write!(line, "  {text:>width$}");
        }
        writeln!(f, "{}", line.trim_end())?;
    }
    Ok(())
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numeric: Vec<_> = self
            .iter()
            .filter_map(|(name, summary)| match summary {
                ColumnSummary::Numeric(s) => Some((name, s)),
                ColumnSummary::Categorical(_) => None,
            })
            .collect();
        let categorical: Vec<_> = self
            .iter()
            .filter_map(|(name, summary)| match summary {
                ColumnSummary::Categorical(s) => Some((name, s)),
                ColumnSummary::Numeric(_) => None,
            })
            .collect();

        let numeric_labels = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];
        write_block(f, &numeric, &numeric_labels, |s: &NumericSummary, row| {
            if row == 0 {
                s.count.to_string()
            } else {
                cell(s.aggregates()[row - 1])
            }
        })?;
        if !numeric.is_empty() && !categorical.is_empty() {
            writeln!(f)?;
        }
        let categorical_labels = ["count", "unique", "top", "freq"];
        write_block(f, &categorical, &categorical_labels, |s: &CategoricalSummary, row| {
            match row {
                0 => s.count.to_string(),
                1 => s.unique.to_string(),
                2 => s.top.clone().unwrap_or_else(|| UNDEFINED.to_string()),
                _ => s.freq.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::dataset::{Record, WeatherKind};

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("value should be defined");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn record(day: u32, weather: WeatherKind, temp_max: f64) -> Record {
        Record {
            date: NaiveDate::from_ymd_opt(2012, 1, day).unwrap(),
            precipitation: 0.0,
            temp_max,
            temp_min: 1.0,
            wind: 2.0,
            weather,
        }
    }

    #[test]
    fn numeric_summary_matches_describe() {
        let summary = NumericSummary::from_values([4.0, 1.0, 3.0, 2.0]);
        assert_eq!(summary.count, 4);
        assert_close(summary.mean, 2.5);
        assert_close(summary.std, 1.290_994_448_735_805_6);
        assert_close(summary.min, 1.0);
        assert_close(summary.q25, 1.75);
        assert_close(summary.q50, 2.5);
        assert_close(summary.q75, 3.25);
        assert_close(summary.max, 4.0);
    }

    #[test]
    fn numeric_summary_skips_missing_values() {
        let summary = NumericSummary::from_values([f64::NAN, 5.0, 7.0]);
        assert_eq!(summary.count, 2);
        assert_close(summary.mean, 6.0);
        assert_close(summary.q50, 6.0);
    }

    #[test]
    fn std_is_undefined_for_single_value() {
        let summary = NumericSummary::from_values([3.5]);
        assert_eq!(summary.count, 1);
        assert_close(summary.mean, 3.5);
        assert_eq!(summary.std, None);
        assert_close(summary.q25, 3.5);
        assert_close(summary.q75, 3.5);
    }

    #[test]
    fn empty_numeric_summary_is_undefined() {
        let summary = NumericSummary::from_values(Vec::new());
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean, None);
        assert_eq!(summary.std, None);
        assert_eq!(summary.min, None);
        assert_eq!(summary.q50, None);
        assert_eq!(summary.max, None);
    }

    #[test]
    fn categorical_summary_prefers_first_seen_on_ties() {
        let summary = CategoricalSummary::from_values(["rain", "sun", "sun", "rain", "fog"]);
        assert_eq!(summary.count, 5);
        assert_eq!(summary.unique, 3);
        assert_eq!(summary.top.as_deref(), Some("rain"));
        assert_eq!(summary.freq, 2);

        let empty = CategoricalSummary::from_values(Vec::<String>::new());
        assert_eq!(
            empty,
            CategoricalSummary {
                count: 0,
                unique: 0,
                top: None,
                freq: 0
            }
        );
    }

    #[test]
    fn summarize_table() {
        let table: Table = [
            record(1, WeatherKind::Drizzle, 10.0),
            record(2, WeatherKind::Rain, 8.0),
            record(3, WeatherKind::Rain, 15.0),
        ]
        .into_iter()
        .collect();
        let summary = summarize(&table);

        let names: Vec<_> = summary.iter().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            ["date", "precipitation", "temp_max", "temp_min", "wind", "weather"]
        );
        let temp_max = summary.numeric(Column::TempMax).unwrap();
        assert_eq!(temp_max.count, 3);
        assert_close(temp_max.mean, 11.0);
        assert_close(temp_max.q50, 10.0);

        let weather = summary.categorical(Column::Weather).unwrap();
        assert_eq!(weather.top.as_deref(), Some("rain"));
        assert_eq!(weather.freq, 2);
        assert_eq!(weather.unique, 2);

        let date = summary.categorical(Column::Date).unwrap();
        assert_eq!(date.unique, 3);
        assert_eq!(date.top.as_deref(), Some("2012-01-01"));
        assert!(summary.numeric(Column::Date).is_none());
    }

    #[test]
    fn summarize_empty_table() {
        let summary = summarize(&Table::empty());
        for column in Column::MEASURES {
            let numeric = summary.numeric(column).unwrap();
            assert_eq!(numeric.count, 0);
            assert_eq!(numeric.mean, None);
        }
        assert_eq!(summary.categorical(Column::Weather).unwrap().count, 0);
        assert_eq!(summary.categorical(Column::Date).unwrap().count, 0);
    }

    #[test]
    fn summary_serializes_undefined_as_null() {
        let summary = summarize(&Table::empty());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["wind"]["count"], 0);
        assert!(json["wind"]["std"].is_null());
        assert!(json["wind"]["25%"].is_null());
        assert!(json["weather"]["top"].is_null());
    }

    #[test]
    fn summary_display_marks_undefined() {
        let table: Table = [record(1, WeatherKind::Sun, 12.0)].into_iter().collect();
        let text = summarize(&table).to_string();
        let lines: Vec<_> = text.lines().collect();
        assert!(lines[0].contains("temp_max"));
        let std_line = lines.iter().find(|line| line.starts_with("std")).unwrap();
        assert!(std_line.contains("n/a"));
        assert!(text.contains("12.000000"));
        assert!(text.contains("top"));
        assert!(text.contains("sun"));
    }
}
