//! # Event Splicing Graph quantification
//!
//! Builds a sequence graph whose paths spell the two isoforms of every
//! alternative-splicing event, then measures, from reads aligned to that
//! graph, how often each isoform is used.
//!
//! ## Pipeline
//!
//! 1. **Analyzers** ([`events`]): read the event caller's per-type files and
//!    decode each event id into an [`EventKey`]
//! 2. **Resolution** ([`resolve`]): find the flanking exons in the
//!    annotation and lay out both isoforms as ordered segments
//! 3. **Graph** ([`graph`]): chunk segment sequences into nodes, link them and
//!    record every junction edge in an auxiliary index
//! 4. **Quantification** ([`quant`]): count junction traversals in alignment
//!    paths, derive PSI per event and compare conditions with dPSI
//!
//! ## Usage Example
//!
//! ```ignore
//! use esgq::{BuildConfig, annotation::{ExonIndex, IndexedFasta}};
//!
//! let exons = ExonIndex::from_path("annotation.gtf")?;
//! let reference = IndexedFasta::from_path("genome.fa")?;
//! let summary = esgq::events::build_graph_files(
//!     &BuildConfig::default(), &exons, &reference,
//!     "events/".as_ref(), "esg.gfa".as_ref(), "esg.addinfo".as_ref(),
//! )?;
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

pub mod coords;     // Intervals, strands and structured event keys
pub mod annotation; // Exon index and reference sequence access
pub mod resolve;    // Event isoform layout
pub mod graph;      // Node allocation, graph records and writers
pub mod events;     // Event-caller input and the build driver
pub mod quant;      // Edge counts, PSI and dPSI

pub use coords::{EventKey, EventType, GenomicInterval, Strand};
pub use graph::{GraphBuilder, NodeId, NodeIdAllocator, DEFAULT_CHUNK_SIZE};
pub use quant::{DpsiRecord, Psi, PsiRecord};
pub use resolve::{resolve_event, EventIsoforms};

use thiserror::Error;

/// Decimal places of per-sample PSIs in the dPSI table.
pub const DEFAULT_DPSI_DECIMALS: u32 = 3;

/// Invalid configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Chunk size must be positive.
    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,

    /// No event type selected.
    #[error("no event types selected")]
    NoEventTypes,

    /// An event type listed twice.
    #[error("event type {0} selected more than once")]
    DuplicateEventType(EventType),
}

/// Parameters of a graph build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Maximum bases per graph node.
    pub chunk_size: usize,

    /// Event types to process, in processing order.
    pub event_types: Vec<EventType>,

    /// Prefix of the caller's files (`<prefix>_<TYPE>_strict.ioe`).
    pub caller_prefix: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            event_types: EventType::ALL.to_vec(),
            caller_prefix: String::new(),
        }
    }
}

impl BuildConfig {
    /// Set the node chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Restrict and order the processed event types.
    pub fn with_event_types(mut self, event_types: impl Into<Vec<EventType>>) -> Self {
        self.event_types = event_types.into();
        self
    }

    /// Set the caller file prefix.
    pub fn with_caller_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.caller_prefix = prefix.into();
        self
    }

    /// Check the configuration before a build.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.event_types.is_empty() {
            return Err(ConfigError::NoEventTypes);
        }
        for (i, t) in self.event_types.iter().enumerate() {
            if self.event_types[..i].contains(t) {
                return Err(ConfigError::DuplicateEventType(*t));
            }
        }
        Ok(())
    }
}

/// Parameters of the dPSI table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DpsiConfig {
    /// Decimal places of per-sample PSIs.
    pub decimals: u32,
}

impl Default for DpsiConfig {
    fn default() -> Self {
        Self {
            decimals: DEFAULT_DPSI_DECIMALS,
        }
    }
}

impl DpsiConfig {
    /// Set the rounding of per-sample PSIs.
    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }
}

/// Any error the library can return.
#[derive(Debug, Error)]
pub enum EsgqError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Annotation could not be loaded.
    #[error(transparent)]
    Annotation(#[from] annotation::AnnotationError),

    /// Reference could not be opened or read.
    #[error(transparent)]
    Reference(#[from] annotation::ReferenceError),

    /// Graph build failed.
    #[error(transparent)]
    Analysis(#[from] events::AnalysisError),

    /// Quantification failed.
    #[error(transparent)]
    Quant(#[from] quant::QuantError),
}
