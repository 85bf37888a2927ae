mod schema;
mod table;
mod types;

pub use schema::{Column, table_schema};
pub(crate) use schema::{date_to_days, days_to_date};
pub use table::Table;
pub use types::{DateRange, ParseWeatherError, Record, WeatherKind};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),
    #[error("Column {name} has type {found}, expected {expected}")]
    ColumnType {
        name: &'static str,
        expected: arrow_schema::DataType,
        found: arrow_schema::DataType,
    },
    #[error("Date value out of range: {0} days since epoch")]
    DateOutOfRange(i32),
    #[error(transparent)]
    UnknownWeather(#[from] ParseWeatherError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Arrow(#[from] arrow_schema::ArrowError),
}
