//! Genomic coordinates and structured event keys.
//!
//! Event identifiers arrive from the event caller as encoded strings. They are
//! parsed into [`EventKey`] values here, at the boundary, and formatted back
//! only when records are written out.

mod event_key;
mod interval;

pub use event_key::{EventCoords, EventKey, EventType, KeyError};
pub use interval::{GenomicInterval, IntervalError, Strand};
