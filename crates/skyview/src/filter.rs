//! Weather category and date range selection.

use std::collections::BTreeSet;

use arrow_arith::boolean::{and, or};
use arrow_array::{BooleanArray, Date32Array, RecordBatch, RecordBatchOptions, StringArray};
use arrow_ord::cmp::{eq, gt_eq, lt_eq};
use arrow_select::filter::FilterBuilder;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::dataset::{Column, DateRange, Error, Table, WeatherKind, date_to_days};

/// Rows whose weather is in `weathers` and whose date lies in `start..=end`.
///
/// Row order is preserved. An empty `weathers` set or `start > end` yields an
/// empty table.
pub fn filter(
    table: &Table,
    weathers: &BTreeSet<WeatherKind>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Table, Error> {
    let mask = and(
        &weather_predicate(table, weathers)?,
        &date_predicate(table, DateRange::new(start, end))?,
    )?;
    let filtered = select(table, &mask)?;
    debug!(
        rows = table.num_rows(),
        selected = filtered.num_rows(),
        %start,
        %end,
        "Filtered table"
    );
    Ok(filtered)
}

/// Rows whose weather is in `weathers`, regardless of date.
pub fn filter_weather(table: &Table, weathers: &BTreeSet<WeatherKind>) -> Result<Table, Error> {
    select(table, &weather_predicate(table, weathers)?)
}

fn weather_predicate(
    table: &Table,
    weathers: &BTreeSet<WeatherKind>,
) -> Result<BooleanArray, Error> {
    let column = table.batch().column(Column::Weather.index());
    let mask = weathers
        .iter()
        .map(|kind| eq(column, &StringArray::new_scalar(kind.as_str())))
        .reduce(|x, y| x.and_then(|x| y.and_then(|y| or(&x, &y))))
        .transpose()?;
    Ok(mask.unwrap_or_else(|| BooleanArray::from(vec![false; table.num_rows()])))
}

fn date_predicate(table: &Table, range: DateRange) -> Result<BooleanArray, Error> {
    let column = table.batch().column(Column::Date.index());
    let start = Date32Array::new_scalar(date_to_days(range.start));
    let end = Date32Array::new_scalar(date_to_days(range.end));
    Ok(and(&gt_eq(column, &start)?, &lt_eq(column, &end)?)?)
}

fn select(table: &Table, mask: &BooleanArray) -> Result<Table, Error> {
    let predicate = FilterBuilder::new(mask).optimize().build();
    let columns = table
        .batch()
        .columns()
        .iter()
        .map(|array| predicate.filter(array))
        .collect::<Result<Vec<_>, _>>()?;
    let batch = RecordBatch::try_new_with_options(
        table.schema(),
        columns,
        &RecordBatchOptions::new().with_row_count(Some(predicate.count())),
    )?;
    Ok(Table::from_valid_batch(batch))
}

/// Accepted weather kinds plus an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Criteria {
    pub weathers: BTreeSet<WeatherKind>,
    pub range: DateRange,
}

impl Criteria {
    #[must_use]
    pub fn new(weathers: impl IntoIterator<Item = WeatherKind>, range: DateRange) -> Self {
        Self {
            weathers: weathers.into_iter().collect(),
            range,
        }
    }

    /// Build criteria whose dates lie within the selectable bounds of `table`.
    ///
    /// The bounds are those of the rows matching `weathers`, or of the whole
    /// table when nothing matches. A missing `start`/`end` defaults to the
    /// lower/upper bound; given dates are clamped into the bounds.
    pub fn derive(
        table: &Table,
        weathers: impl IntoIterator<Item = WeatherKind>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, Error> {
        let weathers: BTreeSet<_> = weathers.into_iter().collect();
        let bounds = filter_weather(table, &weathers)?
            .date_bounds()
            .or_else(|| table.date_bounds());
        let range = match bounds {
            Some(bounds) => DateRange::new(
                start.map_or(bounds.start, |date| bounds.clamp(date)),
                end.map_or(bounds.end, |date| bounds.clamp(date)),
            ),
            None => {
                let unbounded = DateRange::unbounded();
                DateRange::new(
                    start.unwrap_or(unbounded.start),
                    end.unwrap_or(unbounded.end),
                )
            }
        };
        Ok(Self { weathers, range })
    }

    pub fn apply(&self, table: &Table) -> Result<Table, Error> {
        filter(table, &self.weathers, self.range.start, self.range.end)
    }
}

#[cfg(test)]
mod tests {
    use crate::dataset::Record;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(day: u32, weather: WeatherKind, temp_max: f64) -> Record {
        Record {
            date: date(2012, 1, day),
            precipitation: 0.0,
            temp_max,
            temp_min: temp_max - 5.0,
            wind: 3.0,
            weather,
        }
    }

    fn table() -> Table {
        [
            record(1, WeatherKind::Drizzle, 10.0),
            record(2, WeatherKind::Rain, 8.0),
            record(3, WeatherKind::Sun, 15.0),
            record(4, WeatherKind::Rain, 9.0),
            record(5, WeatherKind::Snow, 1.0),
            record(6, WeatherKind::Fog, 7.5),
        ]
        .into_iter()
        .collect()
    }

    fn kinds(kinds: &[WeatherKind]) -> BTreeSet<WeatherKind> {
        kinds.iter().copied().collect()
    }

    #[test]
    fn filter_by_weather_and_dates() {
        let table = table();
        let weathers = kinds(&[WeatherKind::Sun, WeatherKind::Rain]);
        let filtered = filter(&table, &weathers, date(2012, 1, 1), date(2012, 1, 3)).unwrap();
        let records: Vec<_> = filtered.records().collect();
        assert_eq!(
            records,
            [
                record(2, WeatherKind::Rain, 8.0),
                record(3, WeatherKind::Sun, 15.0)
            ]
        );
        assert_eq!(filtered.schema(), table.schema());
    }

    #[test]
    fn filter_bounds_are_inclusive() {
        let table = table();
        let all = kinds(&WeatherKind::ALL);
        let filtered = filter(&table, &all, date(2012, 1, 2), date(2012, 1, 4)).unwrap();
        let days: Vec<_> = filtered.records().map(|r| r.date).collect();
        assert_eq!(days, [date(2012, 1, 2), date(2012, 1, 3), date(2012, 1, 4)]);

        let single = filter(&table, &all, date(2012, 1, 5), date(2012, 1, 5)).unwrap();
        assert_eq!(single.num_rows(), 1);
    }

    #[test]
    fn filter_results_satisfy_both_predicates() {
        let table = table();
        let weathers = kinds(&[WeatherKind::Rain, WeatherKind::Fog, WeatherKind::Snow]);
        let range = DateRange::new(date(2012, 1, 2), date(2012, 1, 5));
        let filtered = filter(&table, &weathers, range.start, range.end).unwrap();
        for row in filtered.records() {
            assert!(weathers.contains(&row.weather));
            assert!(range.contains(row.date));
        }
        let expected: Vec<_> = table
            .records()
            .filter(|row| weathers.contains(&row.weather) && range.contains(row.date))
            .collect();
        assert_eq!(filtered.records().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn filter_is_deterministic() {
        let table = table();
        let weathers = kinds(&[WeatherKind::Rain]);
        let a = filter(&table, &weathers, date(2012, 1, 1), date(2012, 1, 6)).unwrap();
        let b = filter(&table, &weathers, date(2012, 1, 1), date(2012, 1, 6)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_weathers_yield_empty_table() {
        let table = table();
        let filtered =
            filter(&table, &BTreeSet::new(), date(2012, 1, 1), date(2012, 1, 6)).unwrap();
        assert!(filtered.is_empty());
        assert_eq!(filtered.schema(), table.schema());
    }

    #[test]
    fn reversed_range_yields_empty_table() {
        let table = table();
        let all = kinds(&WeatherKind::ALL);
        let filtered = filter(&table, &all, date(2012, 1, 4), date(2012, 1, 2)).unwrap();
        assert!(filtered.is_empty());
    }

    #[test]
    fn dates_outside_table_never_match() {
        let table = table();
        let all = kinds(&WeatherKind::ALL);
        let filtered = filter(&table, &all, date(2013, 1, 1), date(2014, 1, 1)).unwrap();
        assert!(filtered.is_empty());
        let wide = filter(&table, &all, date(2000, 1, 1), date(2030, 1, 1)).unwrap();
        assert_eq!(wide, table);
    }

    #[test]
    fn filter_empty_table() {
        let all = kinds(&WeatherKind::ALL);
        let filtered =
            filter(&Table::empty(), &all, date(2012, 1, 1), date(2012, 1, 6)).unwrap();
        assert!(filtered.is_empty());
    }

    #[test]
    fn filter_weather_ignores_dates() {
        let filtered = filter_weather(&table(), &kinds(&[WeatherKind::Rain])).unwrap();
        let days: Vec<_> = filtered.records().map(|r| r.date).collect();
        assert_eq!(days, [date(2012, 1, 2), date(2012, 1, 4)]);
    }

    #[test]
    fn derive_defaults_to_bounds_of_selected_weather() {
        let criteria = Criteria::derive(&table(), [WeatherKind::Rain], None, None).unwrap();
        assert_eq!(
            criteria.range,
            DateRange::new(date(2012, 1, 2), date(2012, 1, 4))
        );
        assert_eq!(criteria.weathers, kinds(&[WeatherKind::Rain]));
    }

    #[test]
    fn derive_clamps_requested_dates() {
        let criteria = Criteria::derive(
            &table(),
            WeatherKind::ALL,
            Some(date(2011, 1, 1)),
            Some(date(2012, 1, 3)),
        )
        .unwrap();
        assert_eq!(
            criteria.range,
            DateRange::new(date(2012, 1, 1), date(2012, 1, 3))
        );
        assert_eq!(criteria.apply(&table()).unwrap().num_rows(), 3);
    }

    #[test]
    fn derive_without_matches_uses_table_bounds() {
        let criteria = Criteria::derive(&table(), Vec::new(), None, None).unwrap();
        assert_eq!(
            criteria.range,
            DateRange::new(date(2012, 1, 1), date(2012, 1, 6))
        );
        assert!(criteria.apply(&table()).unwrap().is_empty());
    }

    #[test]
    fn derive_on_empty_table_is_unbounded() {
        let criteria = Criteria::derive(&Table::empty(), WeatherKind::ALL, None, None).unwrap();
        assert_eq!(criteria.range, DateRange::unbounded());
    }
}
