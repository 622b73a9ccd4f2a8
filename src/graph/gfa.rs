use std::fmt;

use super::NodeId;

/// Header line opening every graph file.
pub const GFA_HEADER: &str = "H\tVN:Z:1.0";

/// One line of the graph file.
///
/// Links are always forward-to-forward with a wildcard overlap, and every path
/// step is forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GfaRecord {
    /// `S <id> <sequence>`
    Segment {
        /// Node id.
        id: NodeId,
        /// Bases carried by the node.
        sequence: Vec<u8>,
    },
    /// `L <from> + <to> + *`
    Link {
        /// Source node.
        from: NodeId,
        /// Target node.
        to: NodeId,
    },
    /// `P <name> <n1+,n2+,...> *`
    Path {
        /// Path name (`{eventId}_{P|S}`).
        name: String,
        /// Visited nodes in order.
        nodes: Vec<NodeId>,
    },
}

impl fmt::Display for GfaRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GfaRecord::Segment { id, sequence } => {
                write!(f, "S\t{}\t{}", id, String::from_utf8_lossy(sequence))
            }
            GfaRecord::Link { from, to } => write!(f, "L\t{from}\t+\t{to}\t+\t*"),
            GfaRecord::Path { name, nodes } => {
                let steps: Vec<String> = nodes.iter().map(|n| format!("{n}+")).collect();
                write!(f, "P\t{}\t{}\t*", name, steps.join(","))
            }
        }
    }
}
