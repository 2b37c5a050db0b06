// src/fares/selector.rs
use std::fmt;

use super::{Fare, FareRow};
use crate::core::sanitize::fmt_amount;

/// Cheapest fare for one leg at the requested time, or an explicit miss.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FareQuote {
    Found(Fare),
    NotFound,
}

impl FareQuote {
    pub fn found(self) -> bool {
        matches!(self, FareQuote::Found(_))
    }

    pub fn fare(self) -> Option<Fare> {
        match self {
            FareQuote::Found(f) => Some(f),
            FareQuote::NotFound => None,
        }
    }
}

impl fmt::Display for FareQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FareQuote::Found(fare) => f.write_str(&fmt_amount(u64::from(*fare))),
            FareQuote::NotFound => f.write_str("not found"),
        }
    }
}

/// Minimum price of the first row (in document order) labelled exactly `requested_time`.
/// Later rows with the same label are ignored, even when the first one has no prices.
pub fn select_fare(rows: &[FareRow], requested_time: &str) -> FareQuote {
    rows.iter()
        .find(|r| r.time_label == requested_time)
        .and_then(|r| r.prices.iter().min().copied())
        .map_or(FareQuote::NotFound, FareQuote::Found)
}
