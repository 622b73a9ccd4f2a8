use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::coords::GenomicInterval;

const GTF_COLUMNS: usize = 9;
const EXON_FEATURE: &str = "exon";
const GENE_ID_KEY: &str = "gene_id";

/// Errors raised while loading a gene annotation.
#[derive(Debug, Error)]
pub enum AnnotationError {
    /// Underlying I/O failure.
    #[error("failed to read annotation: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be interpreted.
    #[error("malformed annotation line {line}: {reason}")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },
}

/// Annotated exon intervals grouped by chromosome and gene.
///
/// Exons shared by several transcripts of a gene are stored once.
#[derive(Debug, Clone, Default)]
pub struct ExonIndex {
    by_chrom: HashMap<String, HashMap<String, BTreeSet<GenomicInterval>>>,
}

impl ExonIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an exon of `gene` on `chrom`.
    pub fn insert(&mut self, chrom: &str, gene: &str, exon: GenomicInterval) {
        self.by_chrom
            .entry(chrom.to_string())
            .or_default()
            .entry(gene.to_string())
            .or_default()
            .insert(exon);
    }

    /// Exons of `gene` on `chrom`, in coordinate order.
    pub fn exons(&self, chrom: &str, gene: &str) -> Option<&BTreeSet<GenomicInterval>> {
        self.by_chrom.get(chrom)?.get(gene)
    }

    /// Number of genes with at least one exon.
    pub fn num_genes(&self) -> usize {
        self.by_chrom.values().map(HashMap::len).sum()
    }

    /// Load `exon` features from a GTF file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, AnnotationError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load `exon` features from GTF text.
    ///
    /// Comment lines (`#`) and features other than `exon` are ignored.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, AnnotationError> {
        let mut index = Self::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = line_no + 1;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < GTF_COLUMNS {
                return Err(AnnotationError::MalformedLine {
                    line: line_no,
                    reason: format!(
                        "expected {GTF_COLUMNS} tab-separated columns, found {}",
                        fields.len()
                    ),
                });
            }
            if fields[2] != EXON_FEATURE {
                continue;
            }

            let malformed = |reason: String| AnnotationError::MalformedLine {
                line: line_no,
                reason,
            };
            let start: u64 = fields[3]
                .parse()
                .map_err(|_| malformed(format!("invalid start '{}'", fields[3])))?;
            let end: u64 = fields[4]
                .parse()
                .map_err(|_| malformed(format!("invalid end '{}'", fields[4])))?;
            let exon = GenomicInterval::new(start, end).map_err(|e| malformed(e.to_string()))?;
            let gene = attribute(fields[8], GENE_ID_KEY)
                .ok_or_else(|| malformed(format!("missing {GENE_ID_KEY} attribute")))?;

            index.insert(fields[0], gene, exon);
        }

        Ok(index)
    }
}

/// Value of `key` in a GTF attribute column (`key "value"; key2 "value2";`).
fn attribute<'a>(column: &'a str, key: &str) -> Option<&'a str> {
    column
        .split(';')
        .filter_map(|entry| entry.trim().split_once(' '))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.trim().trim_matches('"'))
}
