use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::{GenomicInterval, IntervalError, Strand};

/// Errors produced while decoding event identifiers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// Identifier does not follow the expected layout.
    #[error("malformed event id '{id}': {reason}")]
    Malformed {
        /// Offending identifier.
        id: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Event type code not among SE/A3/A5/RI.
    #[error("unsupported event type '{code}' in event id '{id}'")]
    UnsupportedType {
        /// Offending identifier.
        id: String,
        /// Type code found in the identifier.
        code: String,
    },
}

/// Splicing event categories handled by the graph builder and PSI stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum EventType {
    /// Exon skipping (`SE`).
    SkippedExon,
    /// Alternative 3' splice site (`A3`).
    Alt3,
    /// Alternative 5' splice site (`A5`).
    Alt5,
    /// Intron retention (`RI`).
    RetainedIntron,
}

impl EventType {
    /// Processing order used when building graphs.
    pub const ALL: [EventType; 4] = [
        EventType::SkippedExon,
        EventType::Alt3,
        EventType::Alt5,
        EventType::RetainedIntron,
    ];

    /// Two-letter code used by the event caller.
    pub fn code(&self) -> &'static str {
        match self {
            EventType::SkippedExon => "SE",
            EventType::Alt3 => "A3",
            EventType::Alt5 => "A5",
            EventType::RetainedIntron => "RI",
        }
    }

    /// Decode a two-letter code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "SE" => Some(EventType::SkippedExon),
            "A3" => Some(EventType::Alt3),
            "A5" => Some(EventType::Alt5),
            "RI" => Some(EventType::RetainedIntron),
            _ => None,
        }
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::from_code(s).ok_or_else(|| format!("unknown event type '{s}'"))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Event coordinates, reconciled to 1-based inclusive intron intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCoords {
    /// Two competing introns (SE, A3, A5), in genomic order.
    Introns {
        /// Upstream intron.
        first: GenomicInterval,
        /// Downstream intron.
        second: GenomicInterval,
    },
    /// A retained intron with the outer boundaries of its flanking exons.
    RetainedIntron {
        /// First base of the upstream exon.
        exon1_start: u64,
        /// The retained intron itself.
        intron: GenomicInterval,
        /// Last base of the downstream exon.
        exon2_end: u64,
    },
}

/// Structured identity of one splicing event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    /// Gene identifier the event belongs to.
    pub gene: String,
    /// Event category.
    pub event_type: EventType,
    /// Chromosome / contig name.
    pub chrom: String,
    /// Event coordinates.
    pub coords: EventCoords,
    /// Transcription strand.
    pub strand: Strand,
}

impl EventKey {
    /// Parse an event-caller identifier such as
    /// `G1;SE:chr1:99-201:299-401:+` or `G1;RI:chr1:1:99-201:300:+`.
    ///
    /// The caller reports each junction as `exonEnd-exonStart`; the intron is
    /// the span strictly between them.
    pub fn parse_caller_id(id: &str) -> Result<Self, KeyError> {
        let malformed = |reason: &str| KeyError::Malformed {
            id: id.to_string(),
            reason: reason.to_string(),
        };

        let (gene, rest) = id
            .split_once(';')
            .ok_or_else(|| malformed("missing ';' after gene"))?;
        if gene.is_empty() {
            return Err(malformed("empty gene"));
        }

        let fields: Vec<&str> = rest.split(':').collect();
        let code = fields.first().copied().unwrap_or_default();
        let event_type = EventType::from_code(code).ok_or_else(|| KeyError::UnsupportedType {
            id: id.to_string(),
            code: code.to_string(),
        })?;

        let expected = match event_type {
            EventType::RetainedIntron => 6,
            _ => 5,
        };
        if fields.len() != expected {
            return Err(malformed(&format!(
                "expected {expected} ':'-separated fields, found {}",
                fields.len()
            )));
        }

        let chrom = fields[1];
        if chrom.is_empty() {
            return Err(malformed("empty chromosome"));
        }
        let strand = fields[expected - 1]
            .parse::<Strand>()
            .map_err(|e| malformed(&e.to_string()))?;

        let coords = match event_type {
            EventType::RetainedIntron => EventCoords::RetainedIntron {
                exon1_start: parse_coord(fields[2]).map_err(|e| malformed(&e))?,
                intron: parse_junction(fields[3]).map_err(|e| malformed(&e))?,
                exon2_end: parse_coord(fields[4]).map_err(|e| malformed(&e))?,
            },
            _ => EventCoords::Introns {
                first: parse_junction(fields[2]).map_err(|e| malformed(&e))?,
                second: parse_junction(fields[3]).map_err(|e| malformed(&e))?,
            },
        };

        Ok(Self {
            gene: gene.to_string(),
            event_type,
            chrom: chrom.to_string(),
            coords,
            strand,
        })
    }

    /// Parse the underscore-joined form produced by [`EventKey::record_id`].
    ///
    /// Gene and chromosome names may themselves contain underscores; the
    /// strand and coordinate tokens are taken from the right and the single
    /// event-type token between them separates gene from chromosome. An id
    /// with more than one candidate type token is rejected.
    pub fn parse_record_id(id: &str) -> Result<Self, KeyError> {
        let malformed = |reason: &str| KeyError::Malformed {
            id: id.to_string(),
            reason: reason.to_string(),
        };

        let tokens: Vec<&str> = id.split('_').collect();
        if tokens.len() < 6 {
            return Err(malformed("too few '_'-separated fields"));
        }
        let n = tokens.len();
        let strand = tokens[n - 1]
            .parse::<Strand>()
            .map_err(|e| malformed(&e.to_string()))?;

        let retained = !tokens[n - 2].contains('-');
        let (coords, prefix) = if retained {
            let coords = EventCoords::RetainedIntron {
                exon1_start: parse_coord(tokens[n - 4]).map_err(|e| malformed(&e))?,
                intron: parse_junction(tokens[n - 3]).map_err(|e| malformed(&e))?,
                exon2_end: parse_coord(tokens[n - 2]).map_err(|e| malformed(&e))?,
            };
            (coords, &tokens[..n - 4])
        } else {
            let coords = EventCoords::Introns {
                first: parse_junction(tokens[n - 3]).map_err(|e| malformed(&e))?,
                second: parse_junction(tokens[n - 2]).map_err(|e| malformed(&e))?,
            };
            (coords, &tokens[..n - 3])
        };

        let mut candidates = (1..prefix.len().saturating_sub(1)).filter(|&i| {
            match EventType::from_code(prefix[i]) {
                Some(EventType::RetainedIntron) => retained,
                Some(_) => !retained,
                None => false,
            }
        });
        let type_idx = candidates
            .next()
            .ok_or_else(|| malformed("no event type token between gene and chromosome"))?;
        if candidates.next().is_some() {
            return Err(malformed(
                "gene or chromosome contains an event type token, type is ambiguous",
            ));
        }

        let event_type = EventType::from_code(prefix[type_idx])
            .ok_or_else(|| malformed("no event type token"))?;

        Ok(Self {
            gene: prefix[..type_idx].join("_"),
            event_type,
            chrom: prefix[type_idx + 1..].join("_"),
            coords,
            strand,
        })
    }

    /// Identifier used in graph path names, auxiliary edges and PSI tables.
    pub fn record_id(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}",
            self.gene,
            self.event_type,
            self.chrom,
            self.encoded_coords("_"),
            self.strand
        )
    }

    /// Identifier in the event caller's own notation.
    pub fn caller_id(&self) -> String {
        format!(
            "{};{}:{}:{}:{}",
            self.gene,
            self.event_type,
            self.chrom,
            self.encoded_coords(":"),
            self.strand
        )
    }

    fn encoded_coords(&self, sep: &str) -> String {
        match self.coords {
            EventCoords::Introns { first, second } => {
                format!("{}{sep}{}", encode_junction(first), encode_junction(second))
            }
            EventCoords::RetainedIntron {
                exon1_start,
                intron,
                exon2_end,
            } => format!(
                "{exon1_start}{sep}{}{sep}{exon2_end}",
                encode_junction(intron)
            ),
        }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.record_id())
    }
}

fn parse_coord(token: &str) -> Result<u64, String> {
    token
        .parse::<u64>()
        .map_err(|_| format!("invalid coordinate '{token}'"))
}

/// `exonEnd-exonStart` to the intron strictly between them.
fn parse_junction(token: &str) -> Result<GenomicInterval, String> {
    let (donor, acceptor) = token
        .split_once('-')
        .ok_or_else(|| format!("invalid junction '{token}'"))?;
    let donor = parse_coord(donor)?;
    let acceptor = parse_coord(acceptor)?;
    let (Some(start), Some(end)) = (donor.checked_add(1), acceptor.checked_sub(1)) else {
        return Err(format!("invalid junction '{token}'"));
    };
    GenomicInterval::new(start, end)
        .map_err(|e: IntervalError| format!("junction '{token}' has no intron: {e}"))
}

fn encode_junction(intron: GenomicInterval) -> String {
    format!("{}-{}", intron.start() - 1, intron.end() + 1)
}
