// src/page/mod.rs
//! # Page-interaction providers
//!
//! The fare engine never drives a browser itself. It talks to a [`PageProvider`], which
//! hands out one [`PageSession`] per poll cycle. A session submits the search, reports
//! whether a readiness marker showed up within a bounded wait, and reads raw table rows
//! using the locators of a [`TableSchema`].
//!
//! Sessions are released when dropped, so every exit path of a cycle (deal found,
//! parse failure, early `?`) tears the session down.
//!
//! [`document::DocumentProvider`] is the bundled provider: it works on a rendered HTML
//! document fetched over HTTP or read from a snapshot file.

use std::time::Duration;

use crate::config::options::{Leg, SearchRequest};
use crate::error::PageError;
use crate::fares::TableSchema;

pub mod document;

/// One fare-table row as the page shows it, before any price parsing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawRow {
    /// Text of the row's time element; `None` when the row has no such element.
    pub time_label: Option<String>,
    /// Text of every price element in the row, in document order.
    pub price_texts: Vec<String>,
}

pub trait PageSession {
    /// Fill in and submit the search; fails if results do not load within `wait`.
    fn submit_search(&mut self, request: &SearchRequest, wait: Duration) -> Result<(), PageError>;

    /// Block until the element with id `marker` is present, or fail after `wait`.
    fn wait_until_ready(&mut self, marker: &str, wait: Duration) -> Result<(), PageError>;

    /// Rows of the `leg` fare table, located with `schema`'s paths.
    fn read_rows(&mut self, schema: TableSchema, leg: Leg) -> Result<Vec<RawRow>, PageError>;
}

pub trait PageProvider {
    type Session: PageSession;

    fn open(&mut self) -> Result<Self::Session, PageError>;
}
