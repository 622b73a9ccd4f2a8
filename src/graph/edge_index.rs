use std::fmt;
use std::io::BufRead;

use super::{GraphError, NodeId};
use crate::coords::EventKey;
use crate::resolve::IsoformTag;

/// One junction edge of an event isoform.
///
/// Only edges crossing from one logical segment into the next are recorded;
/// chunk-to-chunk edges inside a segment carry no splicing information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxEdgeRecord {
    /// Event the edge belongs to.
    pub event: EventKey,
    /// Isoform the edge belongs to.
    pub tag: IsoformTag,
    /// Last chunk node of the upstream segment.
    pub from: NodeId,
    /// First chunk node of the downstream segment.
    pub to: NodeId,
}

impl AuxEdgeRecord {
    /// The oriented edge.
    pub fn edge(&self) -> (NodeId, NodeId) {
        (self.from, self.to)
    }

    /// Parse `<eventId> <P|S> <from> <to>`.
    pub fn parse(line: &str, line_no: usize) -> Result<Self, GraphError> {
        let malformed = |reason: String| GraphError::MalformedLine {
            line: line_no,
            reason,
        };

        let fields: Vec<&str> = line.split(' ').collect();
        let [event, tag, from, to] = fields.as_slice() else {
            return Err(malformed(format!(
                "expected 4 space-separated fields, found {}",
                fields.len()
            )));
        };

        let event = EventKey::parse_record_id(event).map_err(|e| malformed(e.to_string()))?;
        let tag = IsoformTag::from_letter(tag)
            .ok_or_else(|| malformed(format!("unknown isoform tag '{tag}'")))?;
        let from = from
            .parse::<NodeId>()
            .map_err(|_| malformed(format!("invalid node id '{from}'")))?;
        let to = to
            .parse::<NodeId>()
            .map_err(|_| malformed(format!("invalid node id '{to}'")))?;

        Ok(Self {
            event,
            tag,
            from,
            to,
        })
    }
}

impl fmt::Display for AuxEdgeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.event.record_id(),
            self.tag,
            self.from,
            self.to
        )
    }
}

/// Read every record of an auxiliary edge file, in file order.
pub fn read_aux_edges<R: BufRead>(reader: R) -> Result<Vec<AuxEdgeRecord>, GraphError> {
    let mut records = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(AuxEdgeRecord::parse(line.trim_end(), line_no + 1)?);
    }
    Ok(records)
}
