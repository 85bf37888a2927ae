use std::{
    hash::{DefaultHasher, Hash, Hasher},
    io::Read,
    sync::Arc,
};

use arrow_arith::aggregate::{max, min};
use arrow_array::{
    Array, ArrayRef, Date32Array, Float64Array, RecordBatch, StringArray,
    cast::AsArray,
    types::{Date32Type, Float64Type},
};
use arrow_csv::{ReaderBuilder, reader::Format};
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use arrow_select::concat::concat_batches;
use tracing::debug;

use super::{
    Column, DateRange, Error, Record, WeatherKind,
    schema::{date_to_days, days_to_date, table_schema},
};

/// Ordered observations sharing the fixed [`table_schema`].
///
/// Backed by a single [`RecordBatch`]; cloning is cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    batch: RecordBatch,
}

impl Table {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            batch: RecordBatch::new_empty(table_schema()),
        }
    }

    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        records.into_iter().collect()
    }

    /// Wrap a batch already known to match the table schema.
    pub(crate) fn from_valid_batch(batch: RecordBatch) -> Self {
        debug_assert_eq!(batch.schema(), table_schema());
        Self { batch }
    }

    /// Validate an arbitrary batch and rearrange it into the table schema.
    ///
    /// Columns are looked up by name, extra columns are dropped.
    pub fn from_batch(batch: &RecordBatch) -> Result<Self, Error> {
        let columns = Column::ALL
            .into_iter()
            .map(|column| {
                let array = batch
                    .column_by_name(column.name())
                    .ok_or(Error::MissingColumn(column.name()))?;
                let expected = column.data_type();
                if array.data_type() != &expected {
                    return Err(Error::ColumnType {
                        name: column.name(),
                        expected,
                        found: array.data_type().clone(),
                    });
                }
                Ok(array.clone())
            })
            .collect::<Result<Vec<ArrayRef>, Error>>()?;
        let batch = RecordBatch::try_new(table_schema(), columns)?;
        let table = Self { batch };
        table.validate()?;
        Ok(table)
    }

    /// Read CSV text with a header row. Columns may appear in any order.
    pub fn read_csv<R: Read>(mut reader: R) -> Result<Self, Error> {
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;

        let format = Format::default().with_header(true);
        let (header, _) = format.infer_schema(content.as_slice(), Some(0))?;
        for column in Column::ALL {
            if header.field_with_name(column.name()).is_err() {
                return Err(Error::MissingColumn(column.name()));
            }
        }
        let fields: Vec<Field> = header
            .fields()
            .iter()
            .map(|field| {
                Column::from_name(field.name()).map_or_else(
                    || Field::new(field.name(), DataType::Utf8, true),
                    Column::to_field,
                )
            })
            .collect();
        let schema: SchemaRef = Arc::new(Schema::new(fields));

        let batches = ReaderBuilder::new(schema.clone())
            .with_header(true)
            .build(content.as_slice())?
            .collect::<Result<Vec<_>, _>>()?;
        let batch = concat_batches(&schema, &batches)?;
        debug!(rows = batch.num_rows(), "Read CSV table");
        Self::from_batch(&batch)
    }

    fn validate(&self) -> Result<(), Error> {
        for days in self.dates().iter().flatten() {
            if days_to_date(days).is_none() {
                return Err(Error::DateOutOfRange(days));
            }
        }
        for value in self.weather_names().iter().flatten() {
            value.parse::<WeatherKind>()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    #[must_use]
    pub fn dates(&self) -> &Date32Array {
        self.batch
            .column(Column::Date.index())
            .as_primitive::<Date32Type>()
    }

    #[must_use]
    pub fn weather_names(&self) -> &StringArray {
        self.batch.column(Column::Weather.index()).as_string::<i32>()
    }

    /// Values of a measurement column, `None` for non-measure columns.
    #[must_use]
    pub fn measure(&self, column: Column) -> Option<&Float64Array> {
        if column.is_measure() {
            self.batch
                .column(column.index())
                .as_primitive_opt::<Float64Type>()
        } else {
            None
        }
    }

    #[must_use]
    pub fn record(&self, row: usize) -> Option<Record> {
        if row >= self.num_rows() {
            return None;
        }
        let measure = |column: Column| {
            self.measure(column)
                .filter(|array| array.is_valid(row))
                .map_or(f64::NAN, |array| array.value(row))
        };
        Some(Record {
            // Dates and weather names are validated on construction.
            date: days_to_date(self.dates().value(row)).unwrap_or_default(),
            precipitation: measure(Column::Precipitation),
            temp_max: measure(Column::TempMax),
            temp_min: measure(Column::TempMin),
            wind: measure(Column::Wind),
            weather: self.weather_names().value(row).parse().ok()?,
        })
    }

    pub fn records(&self) -> impl Iterator<Item = Record> + '_ {
        (0..self.num_rows()).filter_map(|row| self.record(row))
    }

    /// Earliest and latest date, `None` if the table is empty.
    #[must_use]
    pub fn date_bounds(&self) -> Option<DateRange> {
        let start = days_to_date(min(self.dates())?)?;
        let end = days_to_date(max(self.dates())?)?;
        Some(DateRange::new(start, end))
    }

    /// Hash of every cell, used to key memoized exports.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.num_rows().hash(&mut hasher);
        for days in self.dates().values().iter() {
            days.hash(&mut hasher);
        }
        for name in self.weather_names() {
            name.hash(&mut hasher);
        }
        for column in Column::MEASURES {
            if let Some(array) = self.measure(column) {
                for value in array {
                    value.map(f64::to_bits).hash(&mut hasher);
                }
            }
        }
        hasher.finish()
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<Record> for Table {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let records: Vec<Record> = iter.into_iter().collect();
        let measure = |value: fn(&Record) -> f64| -> ArrayRef {
            Arc::new(
                records
                    .iter()
                    .map(|record| Some(value(record)).filter(|v| !v.is_nan()))
                    .collect::<Float64Array>(),
            )
        };
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Date32Array::from_iter_values(
                records.iter().map(|record| date_to_days(record.date)),
            )),
            measure(|record| record.precipitation),
            measure(|record| record.temp_max),
            measure(|record| record.temp_min),
            measure(|record| record.wind),
            Arc::new(StringArray::from_iter_values(
                records.iter().map(|record| record.weather.as_str()),
            )),
        ];
        let batch =
            RecordBatch::try_new(table_schema(), columns).expect("Columns match table schema");
        Self { batch }
    }
}
