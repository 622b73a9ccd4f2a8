//! Event Splicing Graph construction.
//!
//! Each resolved event contributes a small sequence graph: reference bases
//! are cut into fixed-size chunk nodes, chunks of one logical segment are
//! chained, and each isoform becomes a named path. Edges that cross from one
//! logical segment to the next are the junction edges used for
//! quantification; they are also written to an auxiliary edge file keyed by
//! event and isoform.

mod allocator;
mod edge_index;
mod builder;
mod gfa;
mod writer;

pub use allocator::{NodeId, NodeIdAllocator};
pub use edge_index::{read_aux_edges, AuxEdgeRecord};
pub use builder::{chunk_sequence, EventGraph, GraphBuilder, DEFAULT_CHUNK_SIZE};
pub use gfa::{GfaRecord, GFA_HEADER};
pub use writer::GraphWriter;

use thiserror::Error;

use crate::annotation::ReferenceError;

/// Errors raised while building, writing or reading graph files.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Underlying I/O failure.
    #[error("graph I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Reference bases for one of the event's segments were unavailable.
    #[error("event {event}: {source}")]
    Reference {
        /// Record id of the event.
        event: String,
        /// Underlying reference error.
        #[source]
        source: ReferenceError,
    },

    /// Chunk size must be at least one base.
    #[error("invalid chunk size {0}")]
    InvalidChunkSize(usize),

    /// A graph or auxiliary line could not be parsed.
    #[error("malformed line {line}: {reason}")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },
}
