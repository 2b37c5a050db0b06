// src/progress.rs
use crate::fares::DealDecision;

/// Progress reporting for the poll loop.
/// Frontends implement this to surface each cycle to the operator.
pub trait Progress {
    /// A search attempt is starting (1-based).
    fn attempt_started(&mut self, _attempt: u32) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// A cycle produced a decision, qualifying or not.
    fn evaluated(&mut self, _decision: &DealDecision) {}

    /// The alert with this body was sent.
    fn notified(&mut self, _body: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
