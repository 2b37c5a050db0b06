// src/page/document.rs
//! Page provider over a rendered HTML document.
//!
//! - `Source::Http`: GET the results page with the search encoded as query parameters.
//!   The request timeout is the page-load wait.
//! - `Source::Snapshot`: read a saved results page from disk (offline runs, replaying a
//!   page that broke the parser).
//!
//! A fetched document does not change, so readiness is decided on the spot: the marker
//! element is either in the document or the wait is reported as timed out.

use std::{fs, path::PathBuf, time::Duration};

use tracing::{debug, info};

use super::{PageProvider, PageSession, RawRow};
use crate::config::options::{Leg, SearchRequest};
use crate::core::{html, net};
use crate::error::PageError;
use crate::fares::{Locators, Step, TableSchema};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Http { url: String },
    Snapshot(PathBuf),
}

pub struct DocumentProvider {
    source: Source,
    opened: u32,
}

impl DocumentProvider {
    pub fn new(source: Source) -> Self {
        Self { source, opened: 0 }
    }

    pub fn http(url: impl Into<String>) -> Self {
        Self::new(Source::Http { url: url.into() })
    }

    pub fn snapshot(path: impl Into<PathBuf>) -> Self {
        Self::new(Source::Snapshot(path.into()))
    }
}

impl PageProvider for DocumentProvider {
    type Session = DocumentSession;

    fn open(&mut self) -> Result<DocumentSession, PageError> {
        self.opened += 1;
        debug!(session = self.opened, source = ?self.source, "opening page session");
        Ok(DocumentSession { id: self.opened, source: self.source.clone(), doc: None })
    }
}

pub struct DocumentSession {
    id: u32,
    source: Source,
    doc: Option<String>,
}

impl DocumentSession {
    fn doc(&self) -> Result<&str, PageError> {
        self.doc.as_deref().ok_or(PageError::NotLoaded)
    }
}

impl Drop for DocumentSession {
    fn drop(&mut self) {
        debug!(session = self.id, "page session closed");
    }
}

impl PageSession for DocumentSession {
    fn submit_search(&mut self, request: &SearchRequest, wait: Duration) -> Result<(), PageError> {
        let doc = match &self.source {
            Source::Http { url } => {
                let client = net::client(wait)?;
                info!(%url, from = %request.departure, to = %request.arrival, "searching fares");
                net::http_get(&client, url, &search_query(request))?
            }
            Source::Snapshot(path) => fs::read_to_string(path)
                .map_err(|source| PageError::Snapshot { path: path.clone(), source })?,
        };
        debug!(session = self.id, bytes = doc.len(), "results page loaded");
        self.doc = Some(doc);
        Ok(())
    }

    fn wait_until_ready(&mut self, marker: &str, wait: Duration) -> Result<(), PageError> {
        if html::element_by_id(self.doc()?, marker).is_some() {
            Ok(())
        } else {
            Err(PageError::Timeout { marker: marker.to_string(), waited: wait })
        }
    }

    fn read_rows(&mut self, schema: TableSchema, leg: Leg) -> Result<Vec<RawRow>, PageError> {
        let id = schema.table_id(leg);
        let table = html::element_by_id(self.doc()?, id).ok_or_else(|| PageError::TableMissing(id.to_string()))?;
        Ok(extract_rows(table, schema.locators()))
    }
}

/// Query parameters for the results page.
pub fn search_query(request: &SearchRequest) -> Vec<(&'static str, String)> {
    let return_date = request.return_date().map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
    vec![
        ("originationAirportCode", request.departure.to_string()),
        ("destinationAirportCode", request.arrival.to_string()),
        ("departureDate", request.departure_date.format("%Y-%m-%d").to_string()),
        ("departureTimeOfDay", "ALL_DAY".to_string()),
        ("returnDate", return_date),
        ("returnTimeOfDay", "ALL_DAY".to_string()),
        ("tripType", if request.is_one_way() { "oneway" } else { "roundtrip" }.to_string()),
        ("adultPassengersCount", request.passengers.to_string()),
        ("fareType", request.price_type.fare_type().to_string()),
        ("passengerType", "ADULT".to_string()),
    ]
}

/// Rows of a fare table: the `tr`s of its `tbody`, or of the table itself when there is
/// no `tbody`.
pub fn extract_rows(table: &str, loc: &Locators) -> Vec<RawRow> {
    let tbody = html::blocks(html::inner_after_open_tag(table), "tbody");
    let body = tbody.first().map_or_else(|| html::inner_after_open_tag(table), |b| html::inner_after_open_tag(b));

    html::blocks(body, "tr")
        .into_iter()
        .map(|tr| RawRow {
            time_label: find_path(tr, loc.time_path).first().map(|b| html::text_of(b)),
            price_texts: find_path(tr, loc.price_path).into_iter().map(html::text_of).collect(),
        })
        .collect()
}

/// Elements reached by following `path` down from `block`, in document order.
fn find_path<'a>(block: &'a str, path: &[Step]) -> Vec<&'a str> {
    let mut current = vec![block];
    for step in path {
        current = current
            .into_iter()
            .flat_map(|b| html::descendants(b, step.tag))
            .filter(|b| step.class.is_none_or(|c| html::has_class(b, c)))
            .collect();
    }
    current
}
