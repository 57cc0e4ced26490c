//! Snapshot persistence for hosts that record or replay rounds.
//!
//! Recordings are newline-delimited JSON, one snapshot per tick. Decoding
//! rejects entities whose tag names no known kind.

use std::io::Write;

use crate::error::{SimError, SimResult};
use crate::world::Snapshot;

pub fn encode_snapshot(snapshot: &Snapshot) -> SimResult<Vec<u8>> {
    Ok(serde_json::to_vec(snapshot)?)
}

pub fn decode_snapshot(data: &[u8]) -> SimResult<Snapshot> {
    let snapshot: Snapshot = serde_json::from_slice(data)?;
    check_tags(&snapshot)?;
    Ok(snapshot)
}

/// Appends one snapshot as a single line.
pub fn write_snapshot_line<W: Write>(mut writer: W, snapshot: &Snapshot) -> SimResult<()> {
    serde_json::to_writer(&mut writer, snapshot)?;
    writer.write_all(b"\n").map_err(serde_json::Error::io)?;
    Ok(())
}

/// Reads a recording back, skipping blank lines.
pub fn read_snapshot_lines(recording: &str) -> SimResult<Vec<Snapshot>> {
    recording
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| decode_snapshot(line.as_bytes()))
        .collect()
}

fn check_tags(snapshot: &Snapshot) -> SimResult<()> {
    match snapshot.entities.iter().find(|e| e.kind().is_none()) {
        Some(bad) => Err(SimError::InvalidSnapshot(format!(
            "tick {}: entity {} has unknown tag {:?}",
            snapshot.tick, bad.id, bad.tag
        ))),
        None => Ok(()),
    }
}
