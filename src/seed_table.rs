//! The seed table: fragment records serialized as a line stream. First line
//! is the record count, then one `index,offset,sentinel,fingerprint,shift,`
//! line per fragment (trailing separator preserved), ordered by dense index
//! ascending then offset ascending. This ordering is a contract: the matcher
//! assumes records for one strand arrive in increasing offset.

use crate::error::PlasmapError;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::str::FromStr;

/// One fixed-width fragment of one strand. Ephemeral: streamed to the
/// matcher, never stored as an entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentRecord {
    /// Dense, collection-local strand index from the strand-resolution table.
    pub feature_index: usize,
    /// Chunk number within the strand, pre-splice.
    pub offset: usize,
    /// 0 for full-length fragments; for a short tail, the fingerprint of a
    /// t-run of the tail's length.
    pub sentinel: u32,
    pub fingerprint: u32,
    /// Bases borrowed from the preceding chunk to pad an undersized tail.
    pub shift: usize,
}

pub fn seed_table_string(records: &[FragmentRecord]) -> String {
    let mut out = format!("{}\n", records.len());
    for r in records {
        out.push_str(&format!(
            "{},{},{},{},{},\n",
            r.feature_index, r.offset, r.sentinel, r.fingerprint, r.shift
        ));
    }
    out
}

pub fn write_seed_table<W: Write>(out: &mut W, records: &[FragmentRecord]) -> std::io::Result<()> {
    out.write_all(seed_table_string(records).as_bytes())
}

fn parse_field<T: FromStr>(field: &str) -> Result<T, PlasmapError> {
    field
        .parse()
        .map_err(|_| PlasmapError::String(format!("Bad seed table field '{field}'")))
}

/// Parses a seed table back into records; the count line is validated
/// against the body.
pub fn parse_seed_table(text: &str) -> Result<Vec<FragmentRecord>, PlasmapError> {
    let mut lines = text.lines();
    let declared: usize = parse_field(
        lines
            .next()
            .ok_or_else(|| PlasmapError::String("Empty seed table".to_string()))?
            .trim(),
    )?;
    let mut records = Vec::with_capacity(declared);
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 5 {
            return Err(PlasmapError::String(format!(
                "Bad seed table line '{line}'"
            )));
        }
        records.push(FragmentRecord {
            feature_index: parse_field(fields[0])?,
            offset: parse_field(fields[1])?,
            sentinel: parse_field(fields[2])?,
            fingerprint: parse_field(fields[3])?,
            shift: parse_field(fields[4])?,
        });
    }
    if records.len() != declared {
        return Err(PlasmapError::String(format!(
            "Seed table declares {declared} records but contains {}",
            records.len()
        )));
    }
    Ok(records)
}
