//! Day-by-day pagination over the historical endpoint.

use chrono::{NaiveDate, Utc};
use log::debug;
use oxtap_types::{PageToken, date_from_timestamp};
use serde_json::Value;

/// Response key holding the snapshot's epoch seconds.
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Decides whether another day can be fetched after the current page.
///
/// The historical endpoint refuses the current day, so paging stops once the
/// next candidate date reaches `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePaginator {
    today: NaiveDate,
}

impl DatePaginator {
    /// Creates a paginator that treats `today` as the first unavailable day.
    #[must_use]
    pub const fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Creates a paginator using the current UTC date.
    #[must_use]
    pub fn from_clock() -> Self {
        Self::new(Utc::now().date_naive())
    }

    /// Returns the first day that can not be requested.
    #[must_use]
    pub const fn today(&self) -> NaiveDate {
        self.today
    }

    /// Returns true if `token` names a day the API will serve.
    #[must_use]
    pub fn is_available(&self, token: &PageToken) -> bool {
        token.date() < self.today
    }

    /// Returns the token for the day after the response's snapshot, if that
    /// day is strictly before today.
    ///
    /// A response without an integer `timestamp` ends pagination.
    #[must_use]
    pub fn next_token(&self, response: &Value) -> Option<PageToken> {
        let Some(current) = response
            .get(TIMESTAMP_KEY)
            .and_then(Value::as_i64)
            .and_then(date_from_timestamp)
        else {
            debug!("Response has no usable `{TIMESTAMP_KEY}`, stopping pagination");
            return None;
        };
        self.token_after(current)
    }

    /// Returns the token for the day after `date`, if that day is strictly before today.
    #[must_use]
    pub fn token_after(&self, date: NaiveDate) -> Option<PageToken> {
        PageToken::new(date)
            .next_day()
            .filter(|next| self.is_available(next))
    }
}
