// src/fares/evaluator.rs
use chrono::{DateTime, TimeZone};
use rust_decimal::Decimal;

use super::FareQuote;
use crate::core::sanitize::{fmt_amount, fmt_decimal};

/// Outcome of comparing one cycle's fares against the ceiling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DealDecision {
    pub outbound: FareQuote,
    /// `None` for one-way searches.
    pub inbound: Option<FareQuote>,
    /// `None` when any leg had no fare at the requested time.
    pub total: Option<u64>,
    pub ceiling: Decimal,
    pub qualifies: bool,
}

/// Combine leg quotes and compare against `ceiling`. A missing leg never qualifies;
/// otherwise the total must be strictly below the ceiling.
pub fn evaluate(outbound: FareQuote, inbound: Option<FareQuote>, ceiling: Decimal) -> DealDecision {
    let total = match (outbound, inbound) {
        (FareQuote::Found(out), None) => Some(u64::from(out)),
        (FareQuote::Found(out), Some(FareQuote::Found(ret))) => Some(u64::from(out) + u64::from(ret)),
        _ => None,
    };
    let qualifies = total.is_some_and(|t| Decimal::from(t) < ceiling);

    DealDecision { outbound, inbound, total, ceiling, qualifies }
}

impl DealDecision {
    pub fn total_display(&self) -> String {
        self.total.map_or_else(|| "n/a".to_string(), fmt_amount)
    }

    pub fn ceiling_display(&self) -> String {
        fmt_decimal(self.ceiling)
    }

    /// Lines for the operator: each leg, then the total.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Current Lowest Outbound Fare: {}.", self.outbound)];
        if let Some(ret) = self.inbound {
            lines.push(format!("Current Lowest Return Fare: {ret}."));
        }
        lines.push(format!("Current Lowest TOTAL Fare: {}.", self.total_display()));
        lines
    }

    /// Operator line for a cycle that found nothing under the ceiling.
    pub fn miss_message(&self) -> String {
        format!(
            "Couldn't find a deal under the amount you specified, {}. Trying again to find cheaper prices...",
            self.ceiling_display()
        )
    }

    /// SMS body sent when the deal qualifies.
    pub fn alert_message<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        format!(
            "[{}] Found a deal. Desired total: {}. Current Total: {}",
            at.format("%Y-%m-%d %H:%M:%S"),
            self.ceiling_display(),
            self.total_display(),
        )
    }
}
