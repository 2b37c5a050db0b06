// src/error.rs
use std::{path::PathBuf, time::Duration};

use thiserror::Error;

use crate::fares::{DealDecision, TableSchema};

/// Failures talking to the page-interaction provider.
#[derive(Error, Debug)]
pub enum PageError {
    #[error("timed out after {waited:?} waiting for `{marker}`")]
    Timeout { marker: String, waited: Duration },
    #[error("table `{0}` not found on the results page")]
    TableMissing(String),
    #[error("no search submitted in this session")]
    NotLoaded,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("could not read snapshot {path}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PageError {
    pub fn is_timeout(&self) -> bool {
        match self {
            PageError::Timeout { .. } => true,
            PageError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Failures extracting fares from a loaded page.
#[derive(Error, Debug)]
pub enum FareError {
    #[error("neither fare table layout became ready (primary `{primary}`, fallback `{fallback}`)")]
    SchemaFallbackTimeout {
        primary: &'static str,
        fallback: &'static str,
    },
    #[error("reading {schema:?} rows: {source}")]
    Rows {
        schema: TableSchema,
        #[source]
        source: PageError,
    },
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("notification transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("notification rejected ({status}): {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("settings file {0} has no [twilio] section")]
    MissingTwilio(PathBuf),
    #[error("invalid airport code `{0}` (expected three letters)")]
    Airport(String),
    #[error("passenger count must be between 1 and {max}, got {got}")]
    Passengers { got: u8, max: u8 },
    #[error("round trips need {0}")]
    MissingReturn(&'static str),
    #[error("return date {ret} is before departure date {depart}")]
    ReturnBeforeDeparture { depart: String, ret: String },
    #[error("price ceiling must be positive, got {0}")]
    Ceiling(String),
    #[error("poll interval must be at least one minute and fit in a duration")]
    Interval,
    #[error("max duration of {0} minutes is too large")]
    MaxDuration(u64),
}

/// Terminal failures of the poll loop.
#[derive(Error, Debug)]
pub enum PollError {
    #[error("attempt {attempt}: search page failed to load: {source}")]
    PageLoad {
        attempt: u32,
        #[source]
        source: PageError,
    },
    #[error("deal found (total {total}) but the alert could not be sent: {source}", total = .decision.total_display())]
    Notify {
        decision: Box<DealDecision>,
        #[source]
        source: NotifyError,
    },
}
