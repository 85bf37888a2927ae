use std::sync::{Arc, LazyLock};

use arrow_schema::{DataType, Field, Schema, SchemaRef};
use chrono::{Datelike, NaiveDate};

/// `NaiveDate::from_ymd(1970, 1, 1).num_days_from_ce()`
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Columns of the observation table, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Date,
    Precipitation,
    TempMax,
    TempMin,
    Wind,
    Weather,
}

impl Column {
    pub const ALL: [Self; 6] = [
        Self::Date,
        Self::Precipitation,
        Self::TempMax,
        Self::TempMin,
        Self::Wind,
        Self::Weather,
    ];

    /// Numeric measurement columns.
    pub const MEASURES: [Self; 4] = [Self::Precipitation, Self::TempMax, Self::TempMin, Self::Wind];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Precipitation => "precipitation",
            Self::TempMax => "temp_max",
            Self::TempMin => "temp_min",
            Self::Wind => "wind",
            Self::Weather => "weather",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.name() == name)
    }

    /// Position in [`table_schema`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn is_measure(self) -> bool {
        !matches!(self, Self::Date | Self::Weather)
    }

    #[must_use]
    pub fn data_type(self) -> DataType {
        match self {
            Self::Date => DataType::Date32,
            Self::Weather => DataType::Utf8,
            Self::Precipitation | Self::TempMax | Self::TempMin | Self::Wind => DataType::Float64,
        }
    }

    #[must_use]
    pub fn to_field(self) -> Field {
        Field::new(self.name(), self.data_type(), self.is_measure())
    }
}

/// Arrow schema shared by every [`Table`](super::Table).
#[must_use]
pub fn table_schema() -> SchemaRef {
    static SCHEMA: LazyLock<SchemaRef> = LazyLock::new(|| {
        Arc::new(Schema::new(
            Column::ALL.map(Column::to_field).into_iter().collect::<Vec<_>>(),
        ))
    });
    SCHEMA.clone()
}

pub(crate) fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

pub(crate) fn days_to_date(days: i32) -> Option<NaiveDate> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}
