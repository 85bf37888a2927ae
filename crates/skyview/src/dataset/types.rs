use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of weather observed on a day.
///
/// Variants are declared in the order the categories appear on charts, which
/// is also the order of the derived [`Ord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherKind {
    Sun,
    Fog,
    Drizzle,
    Rain,
    Snow,
}

impl WeatherKind {
    pub const ALL: [Self; 5] = [Self::Sun, Self::Fog, Self::Drizzle, Self::Rain, Self::Snow];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sun => "sun",
            Self::Fog => "fog",
            Self::Drizzle => "drizzle",
            Self::Rain => "rain",
            Self::Snow => "snow",
        }
    }

    /// Chart color of this category.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Sun => "#e7ba52",
            Self::Fog => "#a7a7a7",
            Self::Drizzle => "#aec7e8",
            Self::Rain => "#1f77b4",
            Self::Snow => "#9467bd",
        }
    }
}

impl fmt::Display for WeatherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown weather kind: {0:?}")]
pub struct ParseWeatherError(pub String);

impl FromStr for WeatherKind {
    type Err = ParseWeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseWeatherError(s.to_string()))
    }
}

/// One day of observations.
///
/// Missing measurements are represented as `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: NaiveDate,
    pub precipitation: f64,
    pub temp_max: f64,
    pub temp_min: f64,
    pub wind: f64,
    pub weather: WeatherKind,
}

/// Inclusive range of calendar dates. A range with `start > end` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Range covering every representable date.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self::new(NaiveDate::MIN, NaiveDate::MAX)
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Move `date` into the range. Only meaningful for non-empty ranges.
    #[must_use]
    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        date.max(self.start).min(self.end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
