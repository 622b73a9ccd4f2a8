use std::io::Write;

use super::{EventGraph, GraphError, GFA_HEADER};

/// Streams event graphs to a graph file and an auxiliary edge file.
#[derive(Debug)]
pub struct GraphWriter<G: Write, A: Write> {
    gfa: G,
    aux: A,
    events: usize,
}

impl<G: Write, A: Write> GraphWriter<G, A> {
    /// Wrap the two outputs and write the graph header.
    pub fn new(mut gfa: G, aux: A) -> Result<Self, GraphError> {
        writeln!(gfa, "{GFA_HEADER}")?;
        Ok(Self {
            gfa,
            aux,
            events: 0,
        })
    }

    /// Append one event's records.
    pub fn write_event(&mut self, graph: &EventGraph) -> Result<(), GraphError> {
        for record in &graph.records {
            writeln!(self.gfa, "{record}")?;
        }
        for edge in &graph.aux {
            writeln!(self.aux, "{edge}")?;
        }
        self.events += 1;
        Ok(())
    }

    /// Events written so far.
    pub fn events_written(&self) -> usize {
        self.events
    }

    /// Flush both outputs and hand them back.
    pub fn finish(mut self) -> Result<(G, A), GraphError> {
        self.gfa.flush()?;
        self.aux.flush()?;
        Ok((self.gfa, self.aux))
    }
}
