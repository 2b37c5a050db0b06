// src/config/settings.rs
//! Notification credentials, read from a TOML file at startup.
//!
//! ```toml
//! [twilio]
//! account_sid = "AC..."
//! auth_token  = "..."
//! from_number = "+15550000000"
//! to_number   = "+15551111111"
//! ```

use std::{fmt, fs, path::Path};

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Deserialize, Clone, Default)]
pub struct Settings {
    pub twilio: Option<TwilioSettings>,
}

#[derive(Deserialize, Clone, PartialEq, Eq)]
pub struct TwilioSettings {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub to_number: String,
}

// Keep the token out of logs.
impl fmt::Debug for TwilioSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioSettings")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"***")
            .field("from_number", &self.from_number)
            .field("to_number", &self.to_number)
            .finish()
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings").field("twilio", &self.twilio).finish()
    }
}

impl Settings {
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let settings = Self::from_toml(&text, path)?;
        tracing::debug!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }

    /// Twilio section, or an error naming the file it was expected in.
    pub fn require_twilio(&self, path: &Path) -> Result<&TwilioSettings, ConfigError> {
        self.twilio.as_ref().ok_or_else(|| ConfigError::MissingTwilio(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [twilio]
        account_sid = "AC123"
        auth_token = "secret"
        from_number = "+15550000000"
        to_number = "+15551111111"
    "#;

    #[test]
    fn parses_twilio_section() {
        let path = Path::new("config.toml");
        let s = Settings::from_toml(SAMPLE, path).unwrap();
        let t = s.require_twilio(path).unwrap();
        assert_eq!(t.account_sid, "AC123");
        assert_eq!(t.to_number, "+15551111111");
    }

    #[test]
    fn debug_hides_token() {
        let s = Settings::from_toml(SAMPLE, Path::new("config.toml")).unwrap();
        let dbg = format!("{s:?}");
        assert!(dbg.contains("AC123"));
        assert!(!dbg.contains("secret"));
    }

    #[test]
    fn missing_section_and_bad_toml() {
        let path = Path::new("empty.toml");
        let s = Settings::from_toml("", path).unwrap();
        assert!(matches!(s.require_twilio(path), Err(ConfigError::MissingTwilio(_))));

        let err = Settings::from_toml("[twilio]\naccount_sid = 1", path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut p = std::env::temp_dir();
        p.push("fare_watch_settings_test.toml");
        fs::write(&p, SAMPLE).unwrap();
        let s = Settings::load(&p).unwrap();
        assert!(s.twilio.is_some());

        let missing = std::env::temp_dir().join("fare_watch_settings_missing.toml");
        let _ = fs::remove_file(&missing);
        assert!(matches!(Settings::load(&missing), Err(ConfigError::Read { .. })));
    }
}
