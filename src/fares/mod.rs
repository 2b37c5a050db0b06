// src/fares/mod.rs
//! # Fare extraction and deal decision
//!
//! Everything that turns a results page into a yes/no answer lives here:
//!
//! ```text
//! schema::detect ──▶ parser::read_leg ──▶ selector::select_fare ──▶ evaluator::evaluate
//!  (which layout)     (raw rows → FareRow)   (min at requested time)    (total vs ceiling)
//! ```
//!
//! - **No I/O of its own.** Page access goes through `page::PageSession`; this module
//!   only decides which locators to use and what the rows mean.
//! - **Integer fares.** Prices are whole dollars (or points); cents are truncated when
//!   a cell is read.
//! - **Misses are values.** A time slot that is not on the page is `FareQuote::NotFound`,
//!   and a decision with a missing leg never qualifies.

pub mod evaluator;
pub mod parser;
pub mod schema;
pub mod selector;

pub use evaluator::{DealDecision, evaluate};
pub use parser::{parse, read_leg};
pub use schema::{Locators, Step, TableSchema, detect};
pub use selector::{FareQuote, select_fare};

/// Whole currency units, or points.
pub type Fare = u32;

/// One time slot of a fare table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FareRow {
    pub time_label: String,
    /// Never empty for rows produced by [`parse`].
    pub prices: Vec<Fare>,
}
