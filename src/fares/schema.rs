// src/fares/schema.rs
//! The two known fare-table layouts and the probe that picks one per page load.
//!
//! - `Primary` (domestic results): tables `faresOutbound` / `faresReturn`, time in a
//!   `span.bugText`, prices in `label.product_price`.
//! - `Fallback` (international results): tables `b0Table` / `b1Table`, time in the first
//!   `td` whose class contains `h6 h8`, prices in the `span`s of `td.price` cells.

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::consts::{FALLBACK_READY_MARKER, PRIMARY_READY_MARKER};
use crate::config::options::Leg;
use crate::error::FareError;
use crate::page::PageSession;

/// One step of a descendant path: an element name plus an optional class substring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    pub tag: &'static str,
    pub class: Option<&'static str>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Locators {
    pub ready_marker: &'static str,
    pub outbound_table: &'static str,
    pub return_table: &'static str,
    /// First match is the row's time label.
    pub time_path: &'static [Step],
    /// Every match is a candidate price.
    pub price_path: &'static [Step],
}

static PRIMARY: Locators = Locators {
    ready_marker: PRIMARY_READY_MARKER,
    outbound_table: "faresOutbound",
    return_table: "faresReturn",
    time_path: &[Step { tag: "span", class: Some("bugText") }],
    price_path: &[Step { tag: "label", class: Some("product_price") }],
};

static FALLBACK: Locators = Locators {
    ready_marker: FALLBACK_READY_MARKER,
    outbound_table: "b0Table",
    return_table: "b1Table",
    time_path: &[Step { tag: "td", class: Some("h6 h8") }],
    price_path: &[Step { tag: "td", class: Some("price") }, Step { tag: "span", class: None }],
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TableSchema {
    Primary,
    Fallback,
}

impl TableSchema {
    pub fn locators(self) -> &'static Locators {
        match self {
            TableSchema::Primary => &PRIMARY,
            TableSchema::Fallback => &FALLBACK,
        }
    }

    pub fn table_id(self, leg: Leg) -> &'static str {
        let loc = self.locators();
        match leg {
            Leg::Outbound => loc.outbound_table,
            Leg::Return => loc.return_table,
        }
    }
}

/// Probe for the primary layout, then the fallback, each within `wait`.
pub fn detect<S: PageSession + ?Sized>(session: &mut S, wait: Duration) -> Result<TableSchema, FareError> {
    match session.wait_until_ready(PRIMARY.ready_marker, wait) {
        Ok(()) => return Ok(TableSchema::Primary),
        Err(e) => debug!("primary fare table not ready ({e}); trying fallback layout"),
    }
    match session.wait_until_ready(FALLBACK.ready_marker, wait) {
        Ok(()) => Ok(TableSchema::Fallback),
        Err(e) => {
            warn!("fallback fare table not ready either ({e})");
            Err(FareError::SchemaFallbackTimeout {
                primary: PRIMARY.ready_marker,
                fallback: FALLBACK.ready_marker,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::options::SearchRequest;
    use crate::error::PageError;
    use crate::page::RawRow;

    /// Session whose page only ever shows the listed markers.
    struct Markers {
        present: &'static [&'static str],
        probed: Vec<String>,
    }

    impl PageSession for Markers {
        fn submit_search(&mut self, _: &SearchRequest, _: Duration) -> Result<(), PageError> {
            Ok(())
        }
        fn wait_until_ready(&mut self, marker: &str, wait: Duration) -> Result<(), PageError> {
            self.probed.push(marker.to_string());
            if self.present.contains(&marker) {
                Ok(())
            } else {
                Err(PageError::Timeout { marker: marker.to_string(), waited: wait })
            }
        }
        fn read_rows(&mut self, _: TableSchema, _: Leg) -> Result<Vec<RawRow>, PageError> {
            Ok(Vec::new())
        }
    }

    fn probe(present: &'static [&'static str]) -> (Result<TableSchema, FareError>, Vec<String>) {
        let mut s = Markers { present, probed: Vec::new() };
        let r = detect(&mut s, Duration::from_secs(10));
        (r, s.probed)
    }

    #[test]
    fn primary_wins_without_probing_fallback() {
        let (r, probed) = probe(&["faresOutbound", "b0Table"]);
        assert_eq!(r.unwrap(), TableSchema::Primary);
        assert_eq!(probed, vec!["faresOutbound"]);
    }

    #[test]
    fn falls_back_after_primary_timeout() {
        let (r, probed) = probe(&["b0Table"]);
        assert_eq!(r.unwrap(), TableSchema::Fallback);
        assert_eq!(probed, vec!["faresOutbound", "b0Table"]);
    }

    #[test]
    fn neither_layout_is_a_schema_timeout() {
        let (r, _) = probe(&[]);
        assert!(matches!(r, Err(FareError::SchemaFallbackTimeout { .. })));
    }

    #[test]
    fn table_ids_per_leg() {
        assert_eq!(TableSchema::Primary.table_id(Leg::Outbound), "faresOutbound");
        assert_eq!(TableSchema::Primary.table_id(Leg::Return), "faresReturn");
        assert_eq!(TableSchema::Fallback.table_id(Leg::Outbound), "b0Table");
        assert_eq!(TableSchema::Fallback.table_id(Leg::Return), "b1Table");
    }
}
