// src/cli.rs
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::consts::{DEFAULT_INTERVAL_MINUTES, DEFAULT_SETTINGS_FILE, RESULTS_URL};
use crate::config::options::{AirportCode, LoadErrorPolicy, PollOptions, PriceType, SearchRequest, Trip};
use crate::config::settings::Settings;
use crate::error::ConfigError;
use crate::fares::DealDecision;
use crate::notify::{AlertSink, LogNotifier, Notifier};
use crate::page::document::DocumentProvider;
use crate::poll::{PollLoop, PollOutcome};
use crate::progress::Progress;

#[derive(Parser, Debug, Clone)]
#[command(name = "fare_watch", version, about = "Watch a flight search and text me when the fare drops", long_about = None)]
pub struct Args {
    /// Search one-way fares only.
    #[arg(long)]
    pub one_way: bool,

    /// Origin airport code.
    #[arg(short, long, value_name = "CODE")]
    pub depart: AirportCode,

    /// Destination airport code.
    #[arg(short, long, value_name = "CODE")]
    pub arrive: AirportCode,

    /// Date of the departing flight (YYYY-MM-DD or MM/DD/YYYY).
    #[arg(long, value_parser = parse_date)]
    pub departure_date: NaiveDate,

    /// Date of the return flight.
    #[arg(long, value_parser = parse_date)]
    pub return_date: Option<NaiveDate>,

    /// Departure time exactly as the results page shows it, e.g. "8:00 AM".
    #[arg(long)]
    pub departure_time: String,

    /// Return time exactly as the results page shows it.
    #[arg(long)]
    pub return_time: Option<String>,

    #[arg(short, long, default_value_t = 1)]
    pub passengers: u8,

    /// Alert once the total drops strictly below this amount.
    #[arg(short, long, value_name = "AMOUNT")]
    pub max_price: Decimal,

    /// Minutes between searches.
    #[arg(short, long, value_name = "MINUTES", default_value_t = DEFAULT_INTERVAL_MINUTES)]
    pub interval: u64,

    /// Price fares in points instead of dollars.
    #[arg(long)]
    pub points: bool,

    /// What to do when the search page does not load.
    #[arg(long, value_enum, default_value_t = OnLoadError::FailFast)]
    pub on_load_error: OnLoadError,

    /// Stop after this many searches without a deal.
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Stop after this many minutes without a deal.
    #[arg(long, value_name = "MINUTES")]
    pub max_duration: Option<u64>,

    /// Settings file holding the SMS credentials.
    #[arg(long, env = "FARE_WATCH_CONFIG", default_value = DEFAULT_SETTINGS_FILE)]
    pub config: PathBuf,

    #[arg(long, value_name = "URL", default_value = RESULTS_URL)]
    pub results_url: String,

    /// Read results from a saved page instead of fetching them.
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Log the alert instead of sending it.
    #[arg(long)]
    pub dry_run: bool,

    /// Debug output on stderr and in the log file.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OnLoadError {
    FailFast,
    Retry,
}

impl From<OnLoadError> for LoadErrorPolicy {
    fn from(v: OnLoadError) -> Self {
        match v {
            OnLoadError::FailFast => LoadErrorPolicy::FailFast,
            OnLoadError::Retry => LoadErrorPolicy::RetryOnLoadError,
        }
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
        .map_err(|_| format!("invalid date `{s}` (expected YYYY-MM-DD or MM/DD/YYYY)"))
}

impl Args {
    pub fn to_request(&self) -> Result<SearchRequest, ConfigError> {
        let trip = if self.one_way {
            Trip::OneWay
        } else {
            Trip::RoundTrip {
                return_date: self.return_date.ok_or(ConfigError::MissingReturn("--return-date"))?,
                return_time: self.return_time.clone().ok_or(ConfigError::MissingReturn("--return-time"))?,
            }
        };
        let request = SearchRequest {
            departure: self.depart.clone(),
            arrival: self.arrive.clone(),
            departure_date: self.departure_date,
            departure_time: self.departure_time.clone(),
            trip,
            passengers: self.passengers,
            price_type: if self.points { PriceType::Points } else { PriceType::Dollars },
            max_price: self.max_price,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn poll_options(&self) -> Result<PollOptions, ConfigError> {
        let mut opts = PollOptions::with_interval_minutes(self.interval)?;
        opts.on_load_error = self.on_load_error.into();
        opts.max_attempts = self.max_attempts;
        opts.max_duration = self
            .max_duration
            .map(|m| m.checked_mul(60).map(Duration::from_secs).ok_or(ConfigError::MaxDuration(m)))
            .transpose()?;
        Ok(opts)
    }

    fn provider(&self) -> DocumentProvider {
        match &self.snapshot {
            Some(path) => DocumentProvider::snapshot(path),
            None => DocumentProvider::http(&self.results_url),
        }
    }

    /// Twilio sink from the settings file. Dry runs log instead, and do not need the file.
    fn sink(&self) -> color_eyre::Result<AlertSink<Box<dyn Notifier>>> {
        if self.dry_run {
            let (to, from) = match Settings::load(&self.config) {
                Ok(s) => s.twilio.map(|t| (t.to_number, t.from_number)).unwrap_or_default(),
                Err(e) => {
                    warn!("dry run without settings: {e}");
                    Default::default()
                }
            };
            return Ok(AlertSink::new(Box::new(LogNotifier) as Box<dyn Notifier>, to, from));
        }
        let settings = Settings::load(&self.config)?;
        let twilio = settings.require_twilio(&self.config)?;
        let AlertSink { notifier, to, from } = AlertSink::from_twilio(twilio)?;
        Ok(AlertSink::new(Box::new(notifier) as Box<dyn Notifier>, to, from))
    }
}

/// Timestamped status lines for the operator, on stdout unless told otherwise.
pub struct ConsoleProgress<W = io::Stdout> {
    out: W,
}

impl ConsoleProgress {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, msg: &str) {
        // A closed stdout must not stop the watch.
        let _ = writeln!(self.out, "[{}] {msg}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    }
}

impl<W: Write> Progress for ConsoleProgress<W> {
    fn attempt_started(&mut self, attempt: u32) {
        self.line(&format!("Searching for fares (attempt {attempt})."));
    }

    fn log(&mut self, msg: &str) {
        self.line(msg);
    }

    fn evaluated(&mut self, decision: &DealDecision) {
        for l in decision.summary_lines() {
            self.line(&l);
        }
        if !decision.qualifies {
            self.line(&decision.miss_message());
        }
    }

    fn notified(&mut self, body: &str) {
        let _ = writeln!(self.out, "{body}");
        self.line("Text message sent!");
    }
}

pub fn run(args: Args) -> color_eyre::Result<()> {
    crate::log::init(args.verbose);

    let request = args.to_request()?;
    let options = args.poll_options()?;
    let sink = args.sink()?;
    info!(from = %request.departure, to = %request.arrival, ceiling = %request.max_price, "starting fare watch");

    let mut poller = PollLoop::new(request, options, args.provider(), sink);
    let mut progress = ConsoleProgress::stdout();
    match poller.run(Some(&mut progress))? {
        PollOutcome::Notified { decision, attempts } => {
            info!(attempts, total = %decision.total_display(), "deal alerted, done");
        }
        PollOutcome::GaveUp { attempts, reason } => {
            println!("No qualifying fare after {attempts} searches ({reason:?}).");
        }
    }
    Ok(())
}
