// src/config/consts.rs

// Site
pub const RESULTS_URL: &str = "https://www.southwest.com/air/booking/select.html";
pub const USER_AGENT: &str = "fare_watch/0.1";

// Readiness markers (element ids)
pub const PRIMARY_READY_MARKER: &str = "faresOutbound";
pub const FALLBACK_READY_MARKER: &str = "b0Table";

// Bounded waits
pub const PAGE_LOAD_WAIT_SECS: u64 = 30;
pub const TABLE_WAIT_SECS: u64 = 10;

// Polling
pub const DEFAULT_INTERVAL_MINUTES: u64 = 180;

// Search
pub const MAX_PASSENGERS: u8 = 8;

// Local files
pub const STORE_DIR: &str = ".store";
pub const LOG_FILE: &str = "debug.log";
pub const DEFAULT_SETTINGS_FILE: &str = "config.toml";
