//! Daily exchange-rate snapshots and the rows they expand into.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Result, TapError, date_from_timestamp};

/// One flattened output record: the rate of `symbol` against `base` on `date`.
///
/// Serializes with the keys `date`, `base`, `symbol`, `rate` in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRow {
    /// Calendar date of the snapshot (UTC).
    pub date: NaiveDate,
    /// Base currency code.
    pub base: String,
    /// Quoted currency code.
    pub symbol: String,
    /// Units of `symbol` per one unit of `base`.
    pub rate: f64,
}

/// One day's response from the historical endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Base currency code.
    pub base: String,
    /// Epoch seconds reported by the API.
    pub timestamp: i64,
    /// UTC calendar date of `timestamp`.
    pub date: NaiveDate,
    /// Rates in the order the API returned them.
    pub rates: Vec<(String, f64)>,
    /// Usage disclaimer text, if the API sent one.
    pub disclaimer: Option<String>,
    /// License text, if the API sent one.
    pub license: Option<String>,
}

impl Snapshot {
    /// Validates a parsed response body and extracts the snapshot.
    ///
    /// Every rate is checked up front, so a body that fails here yields no rows at all.
    ///
    /// # Errors
    ///
    /// Returns [`TapError::MalformedResponse`] if `base`, `timestamp` or `rates`
    /// is absent or has the wrong type, or if any rate is not a number.
    pub fn from_value(body: &Value) -> Result<Self> {
        let obj = body
            .as_object()
            .ok_or_else(|| TapError::malformed("$", "is not a JSON object"))?;

        let base = obj
            .get("base")
            .ok_or_else(|| TapError::malformed("base", "is missing"))?
            .as_str()
            .ok_or_else(|| TapError::malformed("base", "is not a string"))?
            .to_string();

        let timestamp = obj
            .get("timestamp")
            .ok_or_else(|| TapError::malformed("timestamp", "is missing"))?
            .as_i64()
            .ok_or_else(|| TapError::malformed("timestamp", "is not an integer"))?;

        let date = date_from_timestamp(timestamp)
            .ok_or_else(|| TapError::malformed("timestamp", "is out of range"))?;

        let rates = obj
            .get("rates")
            .ok_or_else(|| TapError::malformed("rates", "is missing"))?
            .as_object()
            .ok_or_else(|| TapError::malformed("rates", "is not an object"))?
            .iter()
            .map(|(symbol, rate)| {
                rate.as_f64()
                    .map(|rate| (symbol.clone(), rate))
                    .ok_or_else(|| TapError::malformed(format!("rates.{symbol}"), "is not a number"))
            })
            .collect::<Result<Vec<_>>>()?;

        let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);

        Ok(Self {
            base,
            timestamp,
            date,
            rates,
            disclaimer: text("disclaimer"),
            license: text("license"),
        })
    }

    /// Consumes the snapshot, yielding one [`RateRow`] per rate.
    #[must_use]
    pub fn into_rows(self) -> RateRows {
        RateRows {
            date: self.date,
            base: self.base,
            rates: self.rates.into_iter(),
        }
    }
}

/// Iterator over the rows of a single [`Snapshot`].
#[derive(Debug, Clone)]
pub struct RateRows {
    date: NaiveDate,
    base: String,
    rates: std::vec::IntoIter<(String, f64)>,
}

impl RateRows {
    /// Returns the date shared by every row.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Iterator for RateRows {
    type Item = RateRow;

    fn next(&mut self) -> Option<Self::Item> {
        let (symbol, rate) = self.rates.next()?;
        Some(RateRow {
            date: self.date,
            base: self.base.clone(),
            symbol,
            rate,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rates.size_hint()
    }
}

impl ExactSizeIterator for RateRows {}
