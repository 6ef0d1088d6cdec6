//! Page tokens and epoch-to-date conversion.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Date format used in URLs, tokens and bookmarks.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Identifies which day's snapshot to request next.
///
/// Displays as `YYYY-MM-DD`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    From,
    Into,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct PageToken(NaiveDate);

impl PageToken {
    /// Creates a token for the given day.
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Returns the day this token refers to.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.0
    }

    /// Returns the token for the following calendar day.
    #[must_use]
    pub fn next_day(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }
}

impl FromStr for PageToken {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, DATE_FORMAT).map(Self)
    }
}

/// Converts epoch seconds to the UTC calendar date, dropping the time of day.
#[must_use]
pub fn date_from_timestamp(secs: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}
