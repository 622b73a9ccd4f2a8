use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors raised while constructing intervals or strands.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntervalError {
    /// Start coordinate lies after the end coordinate.
    #[error("inverted interval {start}-{end}")]
    Inverted {
        /// Requested start (1-based).
        start: u64,
        /// Requested end (1-based, inclusive).
        end: u64,
    },

    /// Genomic coordinates are 1-based; position 0 does not exist.
    #[error("interval {start}-{end} starts before position 1")]
    ZeroStart {
        /// Requested start.
        start: u64,
        /// Requested end.
        end: u64,
    },

    /// Strand symbol other than `+` or `-`.
    #[error("unknown strand '{0}'")]
    UnknownStrand(String),
}

/// Closed genomic interval, 1-based with an inclusive end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenomicInterval {
    start: u64,
    end: u64,
}

impl GenomicInterval {
    /// Construct a validated interval (`1 <= start <= end`).
    pub fn new(start: u64, end: u64) -> Result<Self, IntervalError> {
        if start == 0 {
            return Err(IntervalError::ZeroStart { start, end });
        }
        if start > end {
            return Err(IntervalError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// First base (1-based).
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last base (1-based, inclusive).
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of bases covered.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always `false`: a valid interval covers at least one base.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// 0-based half-open offsets, for slicing an in-memory sequence.
    pub fn to_zero_based(&self) -> (usize, usize) {
        ((self.start - 1) as usize, self.end as usize)
    }
}

impl fmt::Display for GenomicInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Transcription strand of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    /// `+`
    Forward,
    /// `-`
    Reverse,
}

impl Strand {
    /// Symbol used in encoded identifiers.
    pub fn symbol(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl FromStr for Strand {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            other => Err(IntervalError::UnknownStrand(other.to_string())),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_length_is_inclusive() {
        let interval = GenomicInterval::new(100, 200).unwrap();
        assert_eq!(interval.len(), 101);
        assert_eq!(interval.to_zero_based(), (99, 200));
        assert_eq!(interval.to_string(), "100-200");
    }

    #[test]
    fn single_base_interval_is_valid() {
        let interval = GenomicInterval::new(7, 7).unwrap();
        assert_eq!(interval.len(), 1);
    }

    #[test]
    fn rejects_inverted_and_zero_start() {
        assert_eq!(
            GenomicInterval::new(10, 9),
            Err(IntervalError::Inverted { start: 10, end: 9 })
        );
        assert!(matches!(
            GenomicInterval::new(0, 9),
            Err(IntervalError::ZeroStart { .. })
        ));
    }

    #[test]
    fn strand_round_trips_symbol() {
        assert_eq!("+".parse::<Strand>().unwrap(), Strand::Forward);
        assert_eq!("-".parse::<Strand>().unwrap().symbol(), '-');
        assert!(".".parse::<Strand>().is_err());
    }
}
