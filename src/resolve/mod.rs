//! Recovery of exon intervals around an event's introns.
//!
//! The event caller only reports intron boundaries. To build isoform paths the
//! resolver looks up the annotated exons bordering those introns and lays out
//! each isoform as an ordered list of logical segments. Segment ids are local
//! to the event; an id shared by both isoforms denotes the same graph segment,
//! which forces the isoforms to share nodes (and junction edges) there.

mod retained_intron;
mod skipped_exon;
mod splice_site;

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::annotation::ExonIndex;
use crate::coords::{EventCoords, EventKey, EventType, GenomicInterval};

pub use retained_intron::resolve_retained_intron;
pub use skipped_exon::resolve_skipped_exon;
pub use splice_site::resolve_splice_site;

/// Event-local identifier of a logical segment.
pub type SegmentId = u32;

/// Errors that cause a single event to be dropped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// No annotated exon satisfies the boundary constraint for `role`.
    #[error("event {event}: no annotated exon found for {role}")]
    Unresolved {
        /// Record id of the event.
        event: String,
        /// Which exon could not be found.
        role: &'static str,
    },

    /// A derived interval is empty or inverted.
    #[error("event {event}: {role} interval {start}-{end} is not a valid interval")]
    Invalid {
        /// Record id of the event.
        event: String,
        /// Which segment is invalid.
        role: &'static str,
        /// Derived start.
        start: u64,
        /// Derived end.
        end: u64,
    },

    /// The gene has no exons in the annotation.
    #[error("event {event}: gene {gene} has no annotated exons on {chrom}")]
    UnknownGene {
        /// Record id of the event.
        event: String,
        /// Gene identifier.
        gene: String,
        /// Chromosome searched.
        chrom: String,
    },

    /// Coordinates do not match the event type.
    #[error("event {event}: coordinates do not match event type {event_type}")]
    CoordinateMismatch {
        /// Record id of the event.
        event: String,
        /// Declared type.
        event_type: EventType,
    },
}

/// Which of an event's two isoforms a path or edge belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum IsoformTag {
    /// Isoform 1 (`P`).
    Primary,
    /// Isoform 2 (`S`).
    Secondary,
}

impl IsoformTag {
    /// Tag letter written to graph path names and the auxiliary edge file.
    pub fn letter(&self) -> char {
        match self {
            IsoformTag::Primary => 'P',
            IsoformTag::Secondary => 'S',
        }
    }

    /// Decode a tag letter.
    pub fn from_letter(s: &str) -> Option<Self> {
        match s {
            "P" => Some(IsoformTag::Primary),
            "S" => Some(IsoformTag::Secondary),
            _ => None,
        }
    }
}

impl fmt::Display for IsoformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// One logical segment of an isoform path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Event-local segment id.
    pub id: SegmentId,
    /// Genomic span of the segment.
    pub interval: GenomicInterval,
}

impl Segment {
    /// Construct a segment.
    pub fn new(id: SegmentId, interval: GenomicInterval) -> Self {
        Self { id, interval }
    }
}

/// Ordered segments making up one isoform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Isoform {
    /// Which isoform this is.
    pub tag: IsoformTag,
    /// Segments in path order.
    pub segments: Vec<Segment>,
}

/// Both isoforms of a resolved event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventIsoforms {
    /// Event identity.
    pub key: EventKey,
    /// Isoform 1.
    pub primary: Isoform,
    /// Isoform 2.
    pub secondary: Isoform,
}

impl EventIsoforms {
    pub(crate) fn new(key: EventKey, primary: Vec<Segment>, secondary: Vec<Segment>) -> Self {
        Self {
            key,
            primary: Isoform {
                tag: IsoformTag::Primary,
                segments: primary,
            },
            secondary: Isoform {
                tag: IsoformTag::Secondary,
                segments: secondary,
            },
        }
    }

    /// Isoforms in emission order (primary first).
    pub fn isoforms(&self) -> [&Isoform; 2] {
        [&self.primary, &self.secondary]
    }
}

/// Resolve the isoforms of any supported event.
///
/// Retained-intron events carry their flanking exon boundaries and never
/// consult the annotation.
pub fn resolve_event(key: &EventKey, exons: &ExonIndex) -> Result<EventIsoforms, ResolveError> {
    if let EventType::RetainedIntron = key.event_type {
        return resolve_retained_intron(key);
    }

    let gene_exons = exons
        .exons(&key.chrom, &key.gene)
        .ok_or_else(|| ResolveError::UnknownGene {
            event: key.record_id(),
            gene: key.gene.clone(),
            chrom: key.chrom.clone(),
        })?;

    match key.event_type {
        EventType::SkippedExon => resolve_skipped_exon(key, gene_exons),
        EventType::Alt3 | EventType::Alt5 => resolve_splice_site(key, gene_exons),
        EventType::RetainedIntron => resolve_retained_intron(key),
    }
}

/// Boundary an exon must touch to fill a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Anchor {
    /// Exon must end at this base; the longest (smallest start) wins.
    EndsAt(u64),
    /// Exon must start at this base; the longest (largest end) wins.
    StartsAt(u64),
}

impl Anchor {
    fn matches(&self, exon: &GenomicInterval) -> bool {
        match *self {
            Anchor::EndsAt(end) => exon.end() == end,
            Anchor::StartsAt(start) => exon.start() == start,
        }
    }

    fn prefers(&self, candidate: &GenomicInterval, current: &GenomicInterval) -> bool {
        match self {
            Anchor::EndsAt(_) => candidate.start() < current.start(),
            Anchor::StartsAt(_) => candidate.end() > current.end(),
        }
    }
}

/// Fill each role with its longest matching exon.
///
/// An exon is offered to the roles in order and taken by the first whose
/// anchor it matches. Roles left empty are `None`.
pub(crate) fn resolve_roles<const N: usize>(
    exons: &BTreeSet<GenomicInterval>,
    anchors: [Anchor; N],
) -> [Option<GenomicInterval>; N] {
    let mut best = [None; N];
    for exon in exons {
        if let Some(role) = anchors.iter().position(|anchor| anchor.matches(exon)) {
            let keep = match &best[role] {
                Some(current) => anchors[role].prefers(exon, current),
                None => true,
            };
            if keep {
                best[role] = Some(*exon);
            }
        }
    }
    best
}

pub(crate) fn require(
    key: &EventKey,
    role: &'static str,
    found: Option<GenomicInterval>,
) -> Result<GenomicInterval, ResolveError> {
    found.ok_or_else(|| ResolveError::Unresolved {
        event: key.record_id(),
        role,
    })
}

pub(crate) fn span(
    key: &EventKey,
    role: &'static str,
    start: u64,
    end: u64,
) -> Result<GenomicInterval, ResolveError> {
    GenomicInterval::new(start, end).map_err(|_| ResolveError::Invalid {
        event: key.record_id(),
        role,
        start,
        end,
    })
}

pub(crate) fn two_introns(
    key: &EventKey,
) -> Result<(GenomicInterval, GenomicInterval), ResolveError> {
    match key.coords {
        EventCoords::Introns { first, second } => Ok((first, second)),
        EventCoords::RetainedIntron { .. } => Err(ResolveError::CoordinateMismatch {
            event: key.record_id(),
            event_type: key.event_type,
        }),
    }
}
