//! Event-type analyzers: from event-caller files to graph records.
//!
//! For every configured event type the caller's file is read, each event id
//! is decoded, its isoforms are resolved against the annotation and the
//! resulting graph is streamed to the writer. Events that cannot be resolved
//! are dropped individually; a missing file skips its whole type.

mod ioe;

pub use ioe::{caller_file, read_ioe, IoeError, IoeRecord};

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use crate::annotation::{ExonIndex, SequenceSource};
use crate::coords::{EventKey, EventType};
use crate::graph::{GraphBuilder, GraphError, GraphWriter, NodeIdAllocator};
use crate::resolve::resolve_event;
use crate::{BuildConfig, ConfigError};

/// Errors that abort a graph build.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Event-caller file unreadable or malformed.
    #[error("{path}: {source}")]
    Ioe {
        /// File being read.
        path: String,
        /// Underlying error.
        #[source]
        source: IoeError,
    },

    /// Graph construction or output failure.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Invalid build parameters.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Outcome for one event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSummary {
    /// Event type processed.
    pub event_type: EventType,
    /// Events whose graph was written.
    pub written: usize,
    /// Events dropped because they could not be resolved or fetched.
    pub dropped: usize,
    /// Whether the caller file was missing.
    pub missing_file: bool,
}

impl TypeSummary {
    fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            written: 0,
            dropped: 0,
            missing_file: false,
        }
    }
}

/// Outcome of a whole graph build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    /// Per-type outcomes in processing order.
    pub per_type: Vec<TypeSummary>,
    /// Graph nodes allocated.
    pub nodes: u64,
}

impl BuildSummary {
    /// Events written across all types.
    pub fn events_written(&self) -> usize {
        self.per_type.iter().map(|t| t.written).sum()
    }

    /// Events dropped across all types.
    pub fn events_dropped(&self) -> usize {
        self.per_type.iter().map(|t| t.dropped).sum()
    }
}

/// Build graphs for the events of one type.
///
/// Rows whose id names another event type are skipped with a warning.
pub fn analyze_events<S, G, A>(
    event_type: EventType,
    records: &[IoeRecord],
    exons: &ExonIndex,
    builder: &GraphBuilder<'_, S>,
    writer: &mut GraphWriter<G, A>,
    ids: &mut NodeIdAllocator,
) -> Result<TypeSummary, GraphError>
where
    S: SequenceSource,
    G: Write,
    A: Write,
{
    let mut summary = TypeSummary::new(event_type);

    for record in records {
        let key = match EventKey::parse_caller_id(&record.caller_id) {
            Ok(key) => key,
            Err(e) => {
                warn!(line = record.line, "dropping event: {e}");
                summary.dropped += 1;
                continue;
            }
        };
        if key.event_type != event_type {
            warn!(
                line = record.line,
                "skipping {} event in {} file: {}",
                key.event_type,
                event_type,
                record.caller_id
            );
            summary.dropped += 1;
            continue;
        }
        // Downstream stages only see the record id, which must decode back.
        if let Err(e) = EventKey::parse_record_id(&key.record_id()) {
            warn!(line = record.line, "dropping event: {e}");
            summary.dropped += 1;
            continue;
        }

        let isoforms = match resolve_event(&key, exons) {
            Ok(isoforms) => isoforms,
            Err(e) => {
                warn!("dropping event: {e}");
                summary.dropped += 1;
                continue;
            }
        };

        match builder.build_event(&isoforms, ids) {
            Ok(graph) => {
                writer.write_event(&graph)?;
                summary.written += 1;
            }
            Err(e @ GraphError::Reference { .. }) => {
                warn!("dropping event: {e}");
                summary.dropped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(summary)
}

/// Build the graph for every configured event type found in `caller_dir`.
pub fn build_graph<S, G, A>(
    config: &BuildConfig,
    exons: &ExonIndex,
    reference: &S,
    caller_dir: &Path,
    writer: &mut GraphWriter<G, A>,
) -> Result<BuildSummary, AnalysisError>
where
    S: SequenceSource,
    G: Write,
    A: Write,
{
    config.validate()?;
    let builder = GraphBuilder::new(reference, config.chunk_size)?;
    let mut ids = NodeIdAllocator::new();
    let mut per_type = Vec::with_capacity(config.event_types.len());

    for &event_type in &config.event_types {
        let path = caller_file(caller_dir, &config.caller_prefix, event_type);
        if !path.exists() {
            warn!("{} not found, skipping {} events", path.display(), event_type);
            per_type.push(TypeSummary {
                missing_file: true,
                ..TypeSummary::new(event_type)
            });
            continue;
        }

        let records = File::open(&path)
            .map_err(IoeError::from)
            .and_then(|file| read_ioe(BufReader::new(file)))
            .map_err(|source| AnalysisError::Ioe {
                path: path.display().to_string(),
                source,
            })?;

        let summary = analyze_events(event_type, &records, exons, &builder, writer, &mut ids)?;
        info!(
            "{}: {} events written, {} dropped",
            event_type, summary.written, summary.dropped
        );
        per_type.push(summary);
    }

    Ok(BuildSummary {
        per_type,
        nodes: ids.allocated(),
    })
}

/// Build the graph and write `<gfa_path>` and `<aux_path>`.
pub fn build_graph_files<S: SequenceSource>(
    config: &BuildConfig,
    exons: &ExonIndex,
    reference: &S,
    caller_dir: &Path,
    gfa_path: &Path,
    aux_path: &Path,
) -> Result<BuildSummary, AnalysisError> {
    let gfa = BufWriter::new(File::create(gfa_path).map_err(GraphError::from)?);
    let aux = BufWriter::new(File::create(aux_path).map_err(GraphError::from)?);
    let mut writer = GraphWriter::new(gfa, aux)?;

    let summary = build_graph(config, exons, reference, caller_dir, &mut writer)?;
    writer.finish()?;

    info!(
        "graph written to {} ({} events, {} nodes)",
        gfa_path.display(),
        summary.events_written(),
        summary.nodes
    );
    Ok(summary)
}
