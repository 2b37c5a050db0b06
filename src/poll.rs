// src/poll.rs
//! The polling loop: search, evaluate, then either alert once and stop or sleep and go
//! again.
//!
//! ```text
//!            ┌──────────── sleep(interval) ◀─────────────┐
//!            ▼                                            │
//!        Searching ──(no deal / table timeout)──▶ Retrying ┘
//!            │   └──(page load failed, FailFast)──▶ Fatal
//!            └──(deal qualifies)──▶ dispatch ──▶ Notified
//! ```
//!
//! Every cycle opens its own page session and drops it before sleeping, whatever way the
//! cycle ended. At most one alert is sent per run.

use std::time::{Duration, Instant};

use chrono::Local;
use tracing::{error, info, warn};

use crate::config::options::{Leg, LoadErrorPolicy, PollOptions, SearchRequest};
use crate::error::{FareError, PageError, PollError};
use crate::fares::{self, DealDecision, FareQuote, TableSchema};
use crate::notify::{AlertSink, Notifier};
use crate::page::{PageProvider, PageSession};
use crate::progress::Progress;

/// Time source for the loop, so tests can run a day of polling instantly.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&mut self, d: Duration);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&mut self, d: Duration) {
        std::thread::sleep(d);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollState {
    Searching,
    Retrying,
    Notified,
    Fatal,
    GaveUp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GiveUpReason {
    MaxAttempts,
    MaxDuration,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// A deal qualified and the alert went out.
    Notified { decision: DealDecision, attempts: u32 },
    /// An attempt or time cap ran out before any deal qualified.
    GaveUp { attempts: u32, reason: GiveUpReason },
}

enum CycleError {
    Load(PageError),
    Fares(FareError),
}

pub struct PollLoop<P, N, C = SystemClock> {
    request: SearchRequest,
    options: PollOptions,
    provider: P,
    sink: AlertSink<N>,
    clock: C,
    state: PollState,
    attempts: u32,
}

impl<P: PageProvider, N: Notifier> PollLoop<P, N, SystemClock> {
    pub fn new(request: SearchRequest, options: PollOptions, provider: P, sink: AlertSink<N>) -> Self {
        Self {
            request,
            options,
            provider,
            sink,
            clock: SystemClock,
            state: PollState::Searching,
            attempts: 0,
        }
    }
}

impl<P: PageProvider, N: Notifier, C: Clock> PollLoop<P, N, C> {
    pub fn with_clock<C2: Clock>(self, clock: C2) -> PollLoop<P, N, C2> {
        PollLoop {
            request: self.request,
            options: self.options,
            provider: self.provider,
            sink: self.sink,
            clock,
            state: self.state,
            attempts: self.attempts,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn sink(&self) -> &AlertSink<N> {
        &self.sink
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Poll until a deal is alerted, a fatal error, or a configured cap runs out.
    /// `progress` can be None (no UI updates) or Some(&mut impl Progress).
    pub fn run(&mut self, mut progress: Option<&mut dyn Progress>) -> Result<PollOutcome, PollError> {
        let started = self.clock.now();
        let result = self.poll(started, &mut progress);
        if let Some(p) = progress.as_deref_mut() {
            p.finish();
        }
        result
    }

    fn poll(&mut self, started: Instant, progress: &mut Option<&mut dyn Progress>) -> Result<PollOutcome, PollError> {
        loop {
            if let Some(reason) = self.cap_reached(started, false) {
                return Ok(self.give_up(reason, progress));
            }

            self.attempts += 1;
            self.state = PollState::Searching;
            info!(attempt = self.attempts, "searching for fares");
            if let Some(p) = progress.as_deref_mut() {
                p.attempt_started(self.attempts);
            }

            match self.search_once() {
                Ok(decision) => {
                    for line in decision.summary_lines() {
                        info!("{line}");
                    }
                    if let Some(p) = progress.as_deref_mut() {
                        p.evaluated(&decision);
                    }
                    if decision.qualifies {
                        return self.alert(decision, progress);
                    }
                }
                Err(CycleError::Load(source)) => match self.options.on_load_error {
                    LoadErrorPolicy::FailFast => {
                        error!(attempt = self.attempts, "search page failed to load: {source}");
                        self.state = PollState::Fatal;
                        return Err(PollError::PageLoad { attempt: self.attempts, source });
                    }
                    LoadErrorPolicy::RetryOnLoadError => {
                        warn!(attempt = self.attempts, "search page failed to load, will retry: {source}");
                        if let Some(p) = progress.as_deref_mut() {
                            p.log(&format!("Search page failed to load ({source}); retrying."));
                        }
                    }
                },
                Err(CycleError::Fares(e)) => {
                    warn!(attempt = self.attempts, "could not read fares, will retry: {e}");
                    if let Some(p) = progress.as_deref_mut() {
                        p.log(&format!("Could not read fares ({e}); retrying."));
                    }
                }
            }

            self.state = PollState::Retrying;
            if let Some(reason) = self.cap_reached(started, true) {
                return Ok(self.give_up(reason, progress));
            }

            let interval = self.options.interval;
            if let Some(p) = progress.as_deref_mut() {
                p.log(&format!("Sleeping {} minutes.", interval.as_secs() / 60));
            }
            self.clock.sleep(interval);
        }
    }

    /// One search cycle. The session lives only inside this call.
    fn search_once(&mut self) -> Result<DealDecision, CycleError> {
        let waits = self.options.waits;
        let mut session = self.provider.open().map_err(CycleError::Load)?;
        session
            .submit_search(&self.request, waits.page_load)
            .map_err(CycleError::Load)?;

        let schema = fares::detect(&mut session, waits.table).map_err(CycleError::Fares)?;
        let outbound = quote(&mut session, &self.request, schema, Leg::Outbound).map_err(CycleError::Fares)?;
        let inbound = if self.request.is_one_way() {
            None
        } else {
            Some(quote(&mut session, &self.request, schema, Leg::Return).map_err(CycleError::Fares)?)
        };

        Ok(fares::evaluate(outbound, inbound, self.request.max_price))
    }

    fn alert(
        &mut self,
        decision: DealDecision,
        progress: &mut Option<&mut dyn Progress>,
    ) -> Result<PollOutcome, PollError> {
        let body = decision.alert_message(&Local::now());
        match self.sink.dispatch(&body) {
            Ok(()) => {
                self.state = PollState::Notified;
                if let Some(p) = progress.as_deref_mut() {
                    p.notified(&body);
                }
                Ok(PollOutcome::Notified { decision, attempts: self.attempts })
            }
            Err(source) => {
                error!(total = %decision.total_display(), "deal found but the alert failed: {source}");
                self.state = PollState::Fatal;
                Err(PollError::Notify { decision: Box::new(decision), source })
            }
        }
    }

    /// `before_sleep` also counts the coming interval against `max_duration`.
    fn cap_reached(&self, started: Instant, before_sleep: bool) -> Option<GiveUpReason> {
        if self.options.max_attempts.is_some_and(|max| self.attempts >= max) {
            return Some(GiveUpReason::MaxAttempts);
        }
        let max = self.options.max_duration?;
        let mut elapsed = self.clock.now().saturating_duration_since(started);
        if before_sleep {
            elapsed = elapsed.saturating_add(self.options.interval);
        }
        (elapsed >= max).then_some(GiveUpReason::MaxDuration)
    }

    fn give_up(&mut self, reason: GiveUpReason, progress: &mut Option<&mut dyn Progress>) -> PollOutcome {
        warn!(attempts = self.attempts, ?reason, "giving up without a qualifying fare");
        self.state = PollState::GaveUp;
        if let Some(p) = progress.as_deref_mut() {
            p.log(&format!("Giving up after {} attempts ({reason:?}).", self.attempts));
        }
        PollOutcome::GaveUp { attempts: self.attempts, reason }
    }
}

fn quote<S: PageSession>(
    session: &mut S,
    request: &SearchRequest,
    schema: TableSchema,
    leg: Leg,
) -> Result<FareQuote, FareError> {
    let Some(time) = request.requested_time(leg) else {
        return Ok(FareQuote::NotFound);
    };
    let rows = fares::read_leg(session, schema, leg)?;
    let q = fares::select_fare(&rows, time);
    if !q.found() {
        info!(?leg, time, "no fare listed at the requested time");
    }
    Ok(q)
}
