// src/notify/mod.rs
//! Alert delivery. The poll loop owns one [`AlertSink`] and calls [`AlertSink::dispatch`]
//! exactly once, when a deal qualifies.

use tracing::info;

use crate::config::settings::TwilioSettings;
use crate::error::NotifyError;

pub mod log;
pub mod twilio;

pub use self::log::LogNotifier;
pub use twilio::TwilioNotifier;

/// A channel that can deliver one text message.
pub trait Notifier {
    fn send(&self, to: &str, from: &str, body: &str) -> Result<(), NotifyError>;
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn send(&self, to: &str, from: &str, body: &str) -> Result<(), NotifyError> {
        (**self).send(to, from, body)
    }
}

/// Where alerts go: a notifier plus the recipient and sender numbers.
#[derive(Debug)]
pub struct AlertSink<N> {
    pub notifier: N,
    pub to: String,
    pub from: String,
}

impl<N: Notifier> AlertSink<N> {
    pub fn new(notifier: N, to: impl Into<String>, from: impl Into<String>) -> Self {
        Self { notifier, to: to.into(), from: from.into() }
    }

    pub fn dispatch(&self, body: &str) -> Result<(), NotifyError> {
        self.notifier.send(&self.to, &self.from, body)?;
        info!(to = %self.to, "alert sent");
        Ok(())
    }
}

impl AlertSink<TwilioNotifier> {
    pub fn from_twilio(settings: &TwilioSettings) -> Result<Self, NotifyError> {
        Ok(Self::new(
            TwilioNotifier::new(&settings.account_sid, &settings.auth_token)?,
            &settings.to_number,
            &settings.from_number,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<(String, String, String)>>);

    impl Notifier for Recorder {
        fn send(&self, to: &str, from: &str, body: &str) -> Result<(), NotifyError> {
            self.0.borrow_mut().push((to.into(), from.into(), body.into()));
            Ok(())
        }
    }

    #[test]
    fn dispatch_uses_sink_numbers() {
        let sink = AlertSink::new(Recorder::default(), "+15551111111", "+15550000000");
        sink.dispatch("hello").unwrap();
        let sent = sink.notifier.0.borrow();
        assert_eq!(sent.len(), 1);
        let (to, from, body) = &sent[0];
        assert_eq!((to.as_str(), from.as_str(), body.as_str()), ("+15551111111", "+15550000000", "hello"));
    }

    #[test]
    fn boxed_notifier_forwards() {
        let sink: AlertSink<Box<dyn Notifier>> = AlertSink::new(Box::new(LogNotifier) as Box<dyn Notifier>, "a", "b");
        assert!(sink.dispatch("dry").is_ok());
    }

    #[test]
    fn sink_from_settings() {
        let s = TwilioSettings {
            account_sid: "AC123".into(),
            auth_token: "secret".into(),
            from_number: "+1000".into(),
            to_number: "+2000".into(),
        };
        let sink = AlertSink::from_twilio(&s).unwrap();
        assert_eq!(sink.to, "+2000");
        assert_eq!(sink.from, "+1000");
    }
}
