// src/lib.rs

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod fares;
pub mod log;
pub mod notify;
pub mod page;
pub mod poll;
pub mod progress;
