use std::collections::HashMap;
use std::io::BufRead;

use thiserror::Error;

use crate::graph::NodeId;

const PATH_COLUMN: usize = 5;
const MAPPED_COLUMN: usize = 2;
const UNMAPPED: &str = "*";

/// Problems with a single alignment path string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// Path contains both `>` and `<` steps.
    #[error("path '{0}' mixes forward and reverse steps")]
    MixedOrientation(String),

    /// Path contains no `>` or `<` step at all.
    #[error("path '{0}' has no oriented steps")]
    Unoriented(String),

    /// A step does not name a numeric node.
    #[error("invalid node id '{token}' in path '{path}'")]
    InvalidNode {
        /// Whole path string.
        path: String,
        /// Offending step.
        token: String,
    },
}

/// Errors raised while scanning an alignment file.
#[derive(Debug, Error)]
pub enum AlignmentError {
    /// Underlying I/O failure.
    #[error("failed to read alignments: {0}")]
    Io(#[from] std::io::Error),

    /// Record with too few columns.
    #[error("malformed alignment line {line}: {reason}")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// Path column could not be interpreted.
    #[error("alignment line {line}: {source}")]
    InvalidPath {
        /// 1-based line number.
        line: usize,
        /// Underlying path error.
        #[source]
        source: PathError,
    },
}

/// A read's walk through the graph, normalised to forward order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentPath {
    nodes: Vec<NodeId>,
}

impl AlignmentPath {
    /// Parse a path such as `>12>13>14` or `<14<13<12`.
    ///
    /// A reverse walk is turned around, so both examples yield `[12, 13, 14]`.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let forward = path.contains('>');
        let reverse = path.contains('<');
        let marker = match (forward, reverse) {
            (true, true) => return Err(PathError::MixedOrientation(path.to_string())),
            (false, false) => return Err(PathError::Unoriented(path.to_string())),
            (true, false) => '>',
            (false, true) => '<',
        };

        let mut nodes = path
            .split(marker)
            .skip(1)
            .map(|token| {
                token.parse::<NodeId>().map_err(|_| PathError::InvalidNode {
                    path: path.to_string(),
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if reverse {
            nodes.reverse();
        }

        Ok(Self { nodes })
    }

    /// Visited nodes in forward order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Consecutive node pairs.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes.windows(2).map(|pair| (pair[0], pair[1]))
    }
}

/// How many times each oriented edge was traversed across all reads.
#[derive(Debug, Clone, Default)]
pub struct EdgeCounts {
    counts: HashMap<(NodeId, NodeId), u64>,
    paths: u64,
}

impl EdgeCounts {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every edge of `path`.
    pub fn add_path(&mut self, path: &AlignmentPath) {
        for edge in path.edges() {
            *self.counts.entry(edge).or_insert(0) += 1;
        }
        self.paths += 1;
    }

    /// Traversals of `edge`; an edge never seen counts zero.
    pub fn count(&self, edge: (NodeId, NodeId)) -> u64 {
        self.counts.get(&edge).copied().unwrap_or(0)
    }

    /// Number of distinct edges seen.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no edge has been seen.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of paths accumulated.
    pub fn paths(&self) -> u64 {
        self.paths
    }

    /// Accumulate edge counts from tab-separated alignment records.
    ///
    /// Column 6 holds the path; records marked unmapped (`*` in column 3 or
    /// in the path column) are ignored.
    pub fn from_gaf_reader<R: BufRead>(reader: R) -> Result<Self, AlignmentError> {
        let mut counts = Self::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = line_no + 1;
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() <= PATH_COLUMN {
                return Err(AlignmentError::MalformedLine {
                    line: line_no,
                    reason: format!(
                        "expected at least {} tab-separated columns, found {}",
                        PATH_COLUMN + 1,
                        fields.len()
                    ),
                });
            }
            if fields[MAPPED_COLUMN] == UNMAPPED || fields[PATH_COLUMN] == UNMAPPED {
                continue;
            }

            let path = AlignmentPath::parse(fields[PATH_COLUMN]).map_err(|source| {
                AlignmentError::InvalidPath {
                    line: line_no,
                    source,
                }
            })?;
            counts.add_path(&path);
        }

        Ok(counts)
    }
}
