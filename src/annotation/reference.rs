use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use rust_htslib::faidx;
use thiserror::Error;

use crate::coords::GenomicInterval;

/// Errors raised while retrieving reference bases.
#[derive(Debug, Error)]
pub enum ReferenceError {
    /// Chromosome not present in the reference.
    #[error("unknown chromosome '{0}'")]
    UnknownChromosome(String),

    /// Interval extends past the end of the chromosome.
    #[error("interval {chrom}:{interval} exceeds the reference ({available} bases available)")]
    Truncated {
        /// Chromosome name.
        chrom: String,
        /// Requested interval.
        interval: GenomicInterval,
        /// Bases actually returned.
        available: usize,
    },

    /// htslib reported an error.
    #[error("htslib error: {0}")]
    Htslib(String),
}

/// Anything able to return the bases of a 1-based inclusive interval.
pub trait SequenceSource {
    /// Upper-cased bases of `interval` on `chrom`.
    fn fetch(&self, chrom: &str, interval: GenomicInterval) -> Result<Vec<u8>, ReferenceError>;
}

/// FASTA reference accessed through an htslib `.fai` index.
///
/// The index is built next to the FASTA when it does not exist yet.
pub struct IndexedFasta {
    reader: faidx::Reader,
    names: HashSet<String>,
}

impl IndexedFasta {
    /// Open (and index if needed) a FASTA file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ReferenceError> {
        let htslib = |e: rust_htslib::errors::Error| ReferenceError::Htslib(e.to_string());
        let reader = faidx::Reader::from_path(path).map_err(htslib)?;

        // faidx does not report unknown names on fetch, so they are checked here.
        let names = (0..reader.n_seqs())
            .map(|i| {
                let i = i32::try_from(i)
                    .map_err(|_| ReferenceError::Htslib(format!("too many sequences ({i})")))?;
                reader.seq_name(i).map_err(htslib)
            })
            .collect::<Result<HashSet<_>, _>>()?;

        Ok(Self { reader, names })
    }

    /// Whether the index knows `chrom`.
    pub fn contains(&self, chrom: &str) -> bool {
        self.names.contains(chrom)
    }
}

impl fmt::Debug for IndexedFasta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedFasta")
            .field("sequences", &self.names.len())
            .finish_non_exhaustive()
    }
}

impl SequenceSource for IndexedFasta {
    fn fetch(&self, chrom: &str, interval: GenomicInterval) -> Result<Vec<u8>, ReferenceError> {
        if !self.contains(chrom) {
            return Err(ReferenceError::UnknownChromosome(chrom.to_string()));
        }
        // faidx takes 0-based, end-inclusive offsets.
        let begin = (interval.start() - 1) as usize;
        let end = (interval.end() - 1) as usize;
        let seq = self
            .reader
            .fetch_seq_string(chrom, begin, end)
            .map_err(|e| ReferenceError::Htslib(e.to_string()))?;
        check_length(chrom, interval, seq.into_bytes())
    }
}

/// Reference held entirely in memory, keyed by sequence name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReference {
    sequences: HashMap<String, Vec<u8>>,
}

impl InMemoryReference {
    /// Create an empty reference.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a sequence.
    pub fn insert(&mut self, name: impl Into<String>, sequence: impl AsRef<[u8]>) {
        self.sequences
            .insert(name.into(), sequence.as_ref().to_ascii_uppercase());
    }
}

impl SequenceSource for InMemoryReference {
    fn fetch(&self, chrom: &str, interval: GenomicInterval) -> Result<Vec<u8>, ReferenceError> {
        let sequence = self
            .sequences
            .get(chrom)
            .ok_or_else(|| ReferenceError::UnknownChromosome(chrom.to_string()))?;
        let (begin, end) = interval.to_zero_based();
        let end = end.min(sequence.len());
        let bases = sequence.get(begin..end).unwrap_or_default().to_vec();
        check_length(chrom, interval, bases)
    }
}

fn check_length(
    chrom: &str,
    interval: GenomicInterval,
    bases: Vec<u8>,
) -> Result<Vec<u8>, ReferenceError> {
    if (bases.len() as u64) < interval.len() {
        return Err(ReferenceError::Truncated {
            chrom: chrom.to_string(),
            interval,
            available: bases.len(),
        });
    }
    Ok(bases.to_ascii_uppercase())
}
