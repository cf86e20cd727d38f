//! Snapshot format for the spatial index.
//!
//! A snapshot is a bare sequence of 20-byte records, one per rect, in network
//! byte order (big-endian):
//!
//! | offset | type  | field  |
//! |--------|-------|--------|
//! | 0      | `u32` | id     |
//! | 4      | `f32` | x      |
//! | 8      | `f32` | y      |
//! | 12     | `f32` | width  |
//! | 16     | `f32` | height |
//!
//! There is no header or count. Relations are not stored.

use crate::error::{GridError, Result};
use crate::layout::Rect;

pub const RECORD_SIZE: usize = 20;

pub fn encode(rects: &[Rect]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rects.len() * RECORD_SIZE);
    for r in rects {
        out.extend_from_slice(&r.id.to_be_bytes());
        for v in [r.x, r.y, r.width, r.height] {
            out.extend_from_slice(&(v as f32).to_be_bytes());
        }
    }
    out
}

/// Fail unless every field of `rect` survives the cast to `f32` as a finite
/// value, so the snapshot written for it can be loaded again.
pub(crate) fn check_encodable(rect: &Rect, fields: [&'static str; 4]) -> Result<()> {
    let values = [rect.x, rect.y, rect.width, rect.height];
    for (field, value) in fields.into_iter().zip(values) {
        if !value.is_finite() || value.abs() > f32::MAX as f64 {
            return Err(GridError::InvalidInput { field, value });
        }
    }
    Ok(())
}

/// Decode every whole record. Trailing bytes that don't make up a record are
/// dropped with a warning.
pub fn decode(bytes: &[u8]) -> Vec<Rect> {
    let trailing = bytes.len() % RECORD_SIZE;
    if trailing != 0 {
        log::warn!(
            "snapshot of {} bytes has {} trailing bytes; ignoring partial record",
            bytes.len(),
            trailing
        );
    }
    bytes.chunks_exact(RECORD_SIZE).map(decode_record).collect()
}

/// Like [`decode`], but a partial trailing record is an error.
pub fn decode_checked(bytes: &[u8]) -> Result<Vec<Rect>> {
    let trailing = bytes.len() % RECORD_SIZE;
    if trailing != 0 {
        return Err(GridError::MalformedBuffer { len: bytes.len(), trailing });
    }
    Ok(bytes.chunks_exact(RECORD_SIZE).map(decode_record).collect())
}

fn decode_record(chunk: &[u8]) -> Rect {
    let word = |at: usize| [chunk[at], chunk[at + 1], chunk[at + 2], chunk[at + 3]];
    let float = |at: usize| f32::from_be_bytes(word(at)) as f64;
    Rect::new(
        u32::from_be_bytes(word(0)),
        float(4),
        float(8),
        float(12),
        float(16),
    )
}
