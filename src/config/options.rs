// src/config/options.rs
use std::{fmt, str::FromStr, time::Duration};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::consts::*;
use crate::error::ConfigError;

/// Three-letter IATA code, stored upper-cased.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AirportCode(String);

impl AirportCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AirportCode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.len() == 3 && t.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(t.to_ascii_uppercase()))
        } else {
            Err(ConfigError::Airport(s.to_string()))
        }
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PriceType {
    #[default]
    Dollars,
    Points,
}

impl PriceType {
    /// Query value the results page expects.
    pub fn fare_type(self) -> &'static str {
        match self {
            PriceType::Dollars => "USD",
            PriceType::Points => "POINTS",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trip {
    OneWay,
    RoundTrip {
        return_date: NaiveDate,
        return_time: String,
    },
}

/// One leg of the trip. Picks which fare table a row is read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Leg {
    Outbound,
    Return,
}

/// Everything needed to run one search. Built once at startup, never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    pub departure: AirportCode,
    pub arrival: AirportCode,
    pub departure_date: NaiveDate,
    /// Matched verbatim against the time label on the results page, e.g. "8:00 AM".
    pub departure_time: String,
    pub trip: Trip,
    pub passengers: u8,
    pub price_type: PriceType,
    pub max_price: Decimal,
}

impl SearchRequest {
    pub fn is_one_way(&self) -> bool {
        matches!(self.trip, Trip::OneWay)
    }

    pub fn return_date(&self) -> Option<NaiveDate> {
        match &self.trip {
            Trip::OneWay => None,
            Trip::RoundTrip { return_date, .. } => Some(*return_date),
        }
    }

    pub fn requested_time(&self, leg: Leg) -> Option<&str> {
        match (leg, &self.trip) {
            (Leg::Outbound, _) => Some(&self.departure_time),
            (Leg::Return, Trip::RoundTrip { return_time, .. }) => Some(return_time),
            (Leg::Return, Trip::OneWay) => None,
        }
    }

    /// Checks the cross-field rules a parsed command line cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.passengers == 0 || self.passengers > MAX_PASSENGERS {
            return Err(ConfigError::Passengers { got: self.passengers, max: MAX_PASSENGERS });
        }
        if self.max_price <= Decimal::ZERO {
            return Err(ConfigError::Ceiling(self.max_price.to_string()));
        }
        if let Trip::RoundTrip { return_date, .. } = &self.trip {
            if *return_date < self.departure_date {
                return Err(ConfigError::ReturnBeforeDeparture {
                    depart: self.departure_date.to_string(),
                    ret: return_date.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// What to do when the search page itself never finishes loading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadErrorPolicy {
    /// Stop the run on the first load failure.
    #[default]
    FailFast,
    /// Treat a load failure like an unlucky cycle: sleep, then search again.
    RetryOnLoadError,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Waits {
    pub page_load: Duration,
    pub table: Duration,
}

impl Default for Waits {
    fn default() -> Self {
        Self {
            page_load: Duration::from_secs(PAGE_LOAD_WAIT_SECS),
            table: Duration::from_secs(TABLE_WAIT_SECS),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub on_load_error: LoadErrorPolicy,
    /// `None` polls until a deal shows up.
    pub max_attempts: Option<u32>,
    pub max_duration: Option<Duration>,
    pub waits: Waits,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_MINUTES * 60),
            on_load_error: LoadErrorPolicy::default(),
            max_attempts: None,
            max_duration: None,
            waits: Waits::default(),
        }
    }
}

impl PollOptions {
    pub fn with_interval_minutes(minutes: u64) -> Result<Self, ConfigError> {
        if minutes == 0 {
            return Err(ConfigError::Interval);
        }
        let secs = minutes.checked_mul(60).ok_or(ConfigError::Interval)?;
        Ok(Self { interval: Duration::from_secs(secs), ..Self::default() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(trip: Trip) -> SearchRequest {
        SearchRequest {
            departure: "dal".parse().unwrap(),
            arrival: "HOU".parse().unwrap(),
            departure_date: date(2026, 11, 20),
            departure_time: "8:00 AM".into(),
            trip,
            passengers: 1,
            price_type: PriceType::Dollars,
            max_price: Decimal::from(300),
        }
    }

    #[test]
    fn airport_codes_are_uppercased_and_checked() {
        let code: AirportCode = " mdw ".parse().unwrap();
        assert_eq!(code.as_str(), "MDW");
        assert!("MD".parse::<AirportCode>().is_err());
        assert!("M1W".parse::<AirportCode>().is_err());
        assert!("MDWX".parse::<AirportCode>().is_err());
    }

    #[test]
    fn requested_time_per_leg() {
        let one_way = request(Trip::OneWay);
        assert!(one_way.is_one_way());
        assert_eq!(one_way.requested_time(Leg::Outbound), Some("8:00 AM"));
        assert_eq!(one_way.requested_time(Leg::Return), None);
        assert_eq!(one_way.return_date(), None);

        let round = request(Trip::RoundTrip { return_date: date(2026, 11, 23), return_time: "5:15 PM".into() });
        assert!(!round.is_one_way());
        assert_eq!(round.requested_time(Leg::Return), Some("5:15 PM"));
        assert_eq!(round.return_date(), Some(date(2026, 11, 23)));
    }

    #[test]
    fn validate_rejects_bad_requests() {
        assert!(request(Trip::OneWay).validate().is_ok());

        let mut r = request(Trip::OneWay);
        r.passengers = 0;
        assert!(matches!(r.validate(), Err(ConfigError::Passengers { .. })));
        r.passengers = 9;
        assert!(matches!(r.validate(), Err(ConfigError::Passengers { .. })));

        let mut r = request(Trip::OneWay);
        r.max_price = Decimal::ZERO;
        assert!(matches!(r.validate(), Err(ConfigError::Ceiling(_))));

        let r = request(Trip::RoundTrip { return_date: date(2026, 11, 19), return_time: "5:15 PM".into() });
        assert!(matches!(r.validate(), Err(ConfigError::ReturnBeforeDeparture { .. })));
    }

    #[test]
    fn poll_defaults_keep_polling_forever() {
        let opts = PollOptions::default();
        assert_eq!(opts.interval, Duration::from_secs(180 * 60));
        assert_eq!(opts.on_load_error, LoadErrorPolicy::FailFast);
        assert_eq!(opts.max_attempts, None);
        assert_eq!(opts.max_duration, None);
        assert_eq!(opts.waits.table, Duration::from_secs(10));

        assert_eq!(PollOptions::with_interval_minutes(5).unwrap().interval, Duration::from_secs(300));
        assert!(PollOptions::with_interval_minutes(0).is_err());
        assert!(matches!(PollOptions::with_interval_minutes(u64::MAX / 30), Err(ConfigError::Interval)));
    }
}
