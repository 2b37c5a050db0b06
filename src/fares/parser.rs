// src/fares/parser.rs
use tracing::debug;

use super::{FareRow, TableSchema};
use crate::config::options::Leg;
use crate::core::sanitize::parse_price;
use crate::error::FareError;
use crate::page::{PageSession, RawRow};

/// Normalize raw rows into fare rows.
/// Time labels are kept verbatim. Rows without a time label or without any
/// parseable price are dropped; unparseable price cells are ignored one by one.
pub fn parse(schema: TableSchema, raw: &[RawRow]) -> Vec<FareRow> {
    let mut rows = Vec::with_capacity(raw.len());
    let mut skipped = 0usize;

    for r in raw {
        let Some(label) = &r.time_label else {
            skipped += 1;
            continue;
        };
        let prices: Vec<u32> = r.price_texts.iter().filter_map(|t| parse_price(t)).collect();
        if prices.is_empty() {
            skipped += 1;
            continue;
        }
        rows.push(FareRow { time_label: label.clone(), prices });
    }

    debug!(?schema, kept = rows.len(), skipped, "parsed fare table");
    rows
}

/// Read and parse one leg's table from a session whose layout is already known.
pub fn read_leg<S: PageSession + ?Sized>(
    session: &mut S,
    schema: TableSchema,
    leg: Leg,
) -> Result<Vec<FareRow>, FareError> {
    let raw = session
        .read_rows(schema, leg)
        .map_err(|source| FareError::Rows { schema, source })?;
    Ok(parse(schema, &raw))
}
