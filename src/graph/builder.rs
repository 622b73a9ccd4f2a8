use std::collections::HashMap;

use tracing::debug;

use super::{AuxEdgeRecord, GfaRecord, GraphError, NodeId, NodeIdAllocator};
use crate::annotation::SequenceSource;
use crate::resolve::{EventIsoforms, Isoform, SegmentId};

/// Maximum number of bases carried by one graph node.
pub const DEFAULT_CHUNK_SIZE: usize = 32;

/// Split a segment into consecutive chunks of at most `chunk_size` bases.
///
/// Only the last chunk may be shorter. Panics if `chunk_size` is zero.
pub fn chunk_sequence(sequence: &[u8], chunk_size: usize) -> std::slice::Chunks<'_, u8> {
    sequence.chunks(chunk_size)
}

/// Graph records and junction edges contributed by one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventGraph {
    /// Segment, link and path records in emission order.
    pub records: Vec<GfaRecord>,
    /// Junction edges of both isoforms, primary first.
    pub aux: Vec<AuxEdgeRecord>,
}

impl EventGraph {
    /// Number of segment records (graph nodes) in this event.
    pub fn num_nodes(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r, GfaRecord::Segment { .. }))
            .count()
    }
}

/// Turns resolved events into graph records.
#[derive(Debug)]
pub struct GraphBuilder<'a, S: SequenceSource> {
    reference: &'a S,
    chunk_size: usize,
}

impl<'a, S: SequenceSource> GraphBuilder<'a, S> {
    /// Create a builder reading bases from `reference`.
    pub fn new(reference: &'a S, chunk_size: usize) -> Result<Self, GraphError> {
        if chunk_size == 0 {
            return Err(GraphError::InvalidChunkSize(chunk_size));
        }
        Ok(Self {
            reference,
            chunk_size,
        })
    }

    /// Emit the graph of one event, drawing node ids from `ids`.
    ///
    /// Every segment's bases are fetched before the first id is allocated, so
    /// an event that fails consumes no ids. Segments are materialised in the
    /// order they are first met walking the primary then the secondary
    /// isoform; each one emits its chunk nodes and the links chaining them.
    /// Then each isoform emits its junction links, auxiliary edges and path.
    pub fn build_event(
        &self,
        event: &EventIsoforms,
        ids: &mut NodeIdAllocator,
    ) -> Result<EventGraph, GraphError> {
        let event_id = event.key.record_id();

        let mut segments: Vec<(SegmentId, Vec<u8>)> = Vec::new();
        for isoform in event.isoforms() {
            for segment in &isoform.segments {
                if segments.iter().any(|(id, _)| *id == segment.id) {
                    continue;
                }
                let bases = self
                    .reference
                    .fetch(&event.key.chrom, segment.interval)
                    .map_err(|source| GraphError::Reference {
                        event: event_id.clone(),
                        source,
                    })?;
                segments.push((segment.id, bases));
            }
        }

        let mut graph = EventGraph::default();
        let mut nodes: HashMap<SegmentId, Vec<NodeId>> = HashMap::new();
        for (segment_id, bases) in &segments {
            let mut chain = Vec::new();
            for chunk in chunk_sequence(bases, self.chunk_size) {
                let id = ids.allocate();
                graph.records.push(GfaRecord::Segment {
                    id,
                    sequence: chunk.to_vec(),
                });
                chain.push(id);
            }
            for pair in chain.windows(2) {
                graph.records.push(GfaRecord::Link {
                    from: pair[0],
                    to: pair[1],
                });
            }
            nodes.insert(*segment_id, chain);
        }

        for isoform in event.isoforms() {
            self.emit_isoform(event, &event_id, isoform, &nodes, &mut graph);
        }

        debug!(
            event = %event_id,
            nodes = nodes.values().map(Vec::len).sum::<usize>(),
            "built event graph"
        );
        Ok(graph)
    }

    fn emit_isoform(
        &self,
        event: &EventIsoforms,
        event_id: &str,
        isoform: &Isoform,
        nodes: &HashMap<SegmentId, Vec<NodeId>>,
        graph: &mut EventGraph,
    ) {
        let mut path = Vec::new();
        let mut previous: Option<NodeId> = None;

        for segment in &isoform.segments {
            let chain = &nodes[&segment.id];
            if let (Some(from), Some(&to)) = (previous, chain.first()) {
                graph.records.push(GfaRecord::Link { from, to });
                graph.aux.push(AuxEdgeRecord {
                    event: event.key.clone(),
                    tag: isoform.tag,
                    from,
                    to,
                });
            }
            path.extend_from_slice(chain);
            previous = chain.last().copied();
        }

        graph.records.push(GfaRecord::Path {
            name: format!("{}_{}", event_id, isoform.tag),
            nodes: path,
        });
    }
}
