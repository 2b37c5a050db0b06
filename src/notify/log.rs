// src/notify/log.rs
use tracing::warn;

use super::Notifier;
use crate::error::NotifyError;

/// Writes the alert to the log instead of sending it. Used for `--dry-run`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, to: &str, from: &str, body: &str) -> Result<(), NotifyError> {
        warn!(%to, %from, "dry run, alert not sent: {body}");
        Ok(())
    }
}
