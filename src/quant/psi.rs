use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

use super::EdgeCounts;
use crate::coords::{EventKey, EventType};
use crate::graph::{AuxEdgeRecord, NodeId};
use crate::resolve::IsoformTag;

/// Marker written in place of an undefined PSI or dPSI.
pub const UNDEFINED_MARKER: &str = "NaN";

/// PSI reported for an intron-retention event without any junction coverage.
///
/// Distinct from [`Psi::Undefined`] so consumers can tell "no coverage of a
/// retained intron" apart from "no data" for the other event types.
pub const RI_NO_COVERAGE: f64 = -1.0;

/// A PSI (or dPSI) value that may be undefined.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Psi {
    /// A numeric value.
    Defined(f64),
    /// No data to compute a value from.
    Undefined,
}

impl Psi {
    /// The numeric value, if defined.
    pub fn value(&self) -> Option<f64> {
        match self {
            Psi::Defined(v) => Some(*v),
            Psi::Undefined => None,
        }
    }

    /// Whether a numeric value is present.
    pub fn is_defined(&self) -> bool {
        matches!(self, Psi::Defined(_))
    }

    /// Round a defined value to `decimals` places.
    pub fn rounded(&self, decimals: u32) -> Psi {
        match self {
            Psi::Defined(v) => {
                let scale = 10f64.powi(decimals as i32);
                Psi::Defined((v * scale).round() / scale)
            }
            Psi::Undefined => Psi::Undefined,
        }
    }
}

impl fmt::Display for Psi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // shortest round-trip form, always with a fractional part
            Psi::Defined(v) => write!(f, "{v:?}"),
            Psi::Undefined => f.write_str(UNDEFINED_MARKER),
        }
    }
}

impl FromStr for Psi {
    type Err = std::num::ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == UNDEFINED_MARKER {
            return Ok(Psi::Undefined);
        }
        let value = s.parse::<f64>()?;
        Ok(if value.is_finite() {
            Psi::Defined(value)
        } else {
            Psi::Undefined
        })
    }
}

/// Fatal inconsistencies found while computing PSI.
#[derive(Debug, Error, PartialEq)]
pub enum PsiError {
    /// A computed PSI left the `[-1, 1]` range.
    #[error("event {event}: PSI {value} outside [-1, 1]")]
    OutOfRange {
        /// Record id of the event.
        event: String,
        /// Offending value.
        value: f64,
    },
}

/// PSI of one event in one sample, with the junction counts behind it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PsiRecord {
    /// Record id of the event.
    pub event: String,
    /// First junction count.
    pub w1: u64,
    /// Second junction count.
    pub w2: u64,
    /// Third junction count (0 when unused).
    pub w3: u64,
    /// Resulting PSI.
    pub psi: Psi,
}

impl fmt::Display for PsiRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {} ", self.event, self.w1, self.w2, self.w3)?;
        match self.psi {
            Psi::Defined(v) if v == RI_NO_COVERAGE => f.write_str("-1"),
            psi => write!(f, "{psi}"),
        }
    }
}

/// Junction edges of one event, per isoform, in graph order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventEdges {
    /// Event identity.
    pub key: EventKey,
    /// Junction edges of isoform 1.
    pub primary: Vec<(NodeId, NodeId)>,
    /// Junction edges of isoform 2.
    pub secondary: Vec<(NodeId, NodeId)>,
}

impl EventEdges {
    fn new(key: EventKey) -> Self {
        Self {
            key,
            primary: Vec::new(),
            secondary: Vec::new(),
        }
    }

    fn push(&mut self, record: &AuxEdgeRecord) {
        match record.tag {
            IsoformTag::Primary => self.primary.push(record.edge()),
            IsoformTag::Secondary => self.secondary.push(record.edge()),
        }
    }
}

/// Group auxiliary records into per-event edge lists.
///
/// Records of one event are contiguous, isoform 1 edges before isoform 2
/// edges. An event whose records show up again, either after another event's
/// or as isoform 1 edges following its own isoform 2 edges, is a duplicate:
/// the later group replaces the earlier one (keeping the earlier position).
pub fn group_event_edges(records: &[AuxEdgeRecord]) -> Vec<EventEdges> {
    let mut groups: Vec<EventEdges> = Vec::new();
    let mut positions: HashMap<EventKey, usize> = HashMap::new();
    let mut current: Option<usize> = None;

    for record in records {
        let continues = current.is_some_and(|idx| {
            let group = &groups[idx];
            group.key == record.event
                && !(record.tag == IsoformTag::Primary && !group.secondary.is_empty())
        });
        if !continues {
            let idx = match positions.get(&record.event) {
                Some(&idx) => {
                    warn!(
                        "duplicate event {} in edge index, keeping the latest edges",
                        record.event
                    );
                    groups[idx] = EventEdges::new(record.event.clone());
                    idx
                }
                None => {
                    groups.push(EventEdges::new(record.event.clone()));
                    positions.insert(record.event.clone(), groups.len() - 1);
                    groups.len() - 1
                }
            };
            current = Some(idx);
        }
        if let Some(idx) = current {
            groups[idx].push(record);
        }
    }

    groups
}

/// PSI from junction counts, by event type.
///
/// - SE: `((w1+w2)/2) / ((w1+w2)/2 + w3)`, undefined without coverage.
/// - A3/A5: `w1 / (w1+w2)`, undefined without coverage.
/// - RI: `1 - w1 / (w1 + (w2+w3)/2)`, [`RI_NO_COVERAGE`] without coverage.
pub fn psi_for_counts(event_type: EventType, w1: u64, w2: u64, w3: u64) -> Psi {
    let (f1, f2, f3) = (w1 as f64, w2 as f64, w3 as f64);
    match event_type {
        EventType::SkippedExon => {
            if w1 + w2 + w3 == 0 {
                return Psi::Undefined;
            }
            let inclusion = (f1 + f2) / 2.0;
            Psi::Defined(inclusion / (inclusion + f3))
        }
        EventType::Alt3 | EventType::Alt5 => {
            if w1 + w2 == 0 {
                return Psi::Undefined;
            }
            Psi::Defined(f1 / (f1 + f2))
        }
        EventType::RetainedIntron => {
            if w1 + w2 + w3 == 0 {
                return Psi::Defined(RI_NO_COVERAGE);
            }
            Psi::Defined(1.0 - f1 / (f1 + (f2 + f3) / 2.0))
        }
    }
}

/// Compute the PSI record of one event.
///
/// SE reads both inclusion junctions and the exclusion junction; A3/A5 one
/// junction per isoform; RI the spliced junction and both retained-isoform
/// junctions. Junctions absent from the index count zero.
pub fn compute_event_psi(edges: &EventEdges, counts: &EdgeCounts) -> Result<PsiRecord, PsiError> {
    let junction = |list: &[(NodeId, NodeId)], idx: usize| -> u64 {
        list.get(idx).map(|&edge| counts.count(edge)).unwrap_or(0)
    };

    let event_type = edges.key.event_type;
    let (w1, w2, w3) = match event_type {
        EventType::SkippedExon => (
            junction(&edges.primary, 0),
            junction(&edges.primary, 1),
            junction(&edges.secondary, 0),
        ),
        EventType::Alt3 | EventType::Alt5 => (
            junction(&edges.primary, 0),
            junction(&edges.secondary, 0),
            0,
        ),
        EventType::RetainedIntron => (
            junction(&edges.primary, 0),
            junction(&edges.secondary, 0),
            junction(&edges.secondary, 1),
        ),
    };

    let event = edges.key.record_id();
    let psi = psi_for_counts(event_type, w1, w2, w3);
    if let Psi::Defined(value) = psi {
        if !(-1.0..=1.0).contains(&value) {
            return Err(PsiError::OutOfRange { event, value });
        }
    }

    Ok(PsiRecord {
        event,
        w1,
        w2,
        w3,
        psi,
    })
}

/// Compute PSI for every event of the edge index, in index order.
pub fn compute_psi(
    records: &[AuxEdgeRecord],
    counts: &EdgeCounts,
) -> Result<Vec<PsiRecord>, PsiError> {
    group_event_edges(records)
        .iter()
        .map(|edges| compute_event_psi(edges, counts))
        .collect()
}

/// Write PSI records, one space-separated line each.
pub fn write_psi<W: Write>(writer: &mut W, records: &[PsiRecord]) -> std::io::Result<()> {
    for record in records {
        writeln!(writer, "{record}")?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quant::AlignmentPath;

    fn aux(event: &str, tag: IsoformTag, from: NodeId, to: NodeId) -> AuxEdgeRecord {
        AuxEdgeRecord {
            event: EventKey::parse_record_id(event).unwrap(),
            tag,
            from,
            to,
        }
    }

    fn counts_with(edges: &[((NodeId, NodeId), u64)]) -> EdgeCounts {
        let mut counts = EdgeCounts::new();
        for &((from, to), n) in edges {
            let path = AlignmentPath::parse(&format!(">{from}>{to}")).unwrap();
            for _ in 0..n {
                counts.add_path(&path);
            }
        }
        counts
    }

    const SE: &str = "G1_SE_chr1_99-201_299-401_+";
    const RI: &str = "G1_RI_chr1_1_99-201_300_+";

    #[test]
    fn skipped_exon_formula() {
        let records = vec![
            aux(SE, IsoformTag::Primary, 4, 5),
            aux(SE, IsoformTag::Primary, 8, 9),
            aux(SE, IsoformTag::Secondary, 4, 9),
        ];
        let counts = counts_with(&[((4, 5), 8), ((8, 9), 8), ((4, 9), 4)]);
        let psi = compute_psi(&records, &counts).unwrap();

        assert_eq!(psi.len(), 1);
        assert_eq!((psi[0].w1, psi[0].w2, psi[0].w3), (8, 8, 4));
        let value = psi[0].psi.value().unwrap();
        assert!((value - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn undefined_and_sentinel_without_coverage() {
        assert_eq!(psi_for_counts(EventType::SkippedExon, 0, 0, 0), Psi::Undefined);
        assert_eq!(psi_for_counts(EventType::Alt3, 0, 0, 0), Psi::Undefined);
        assert_eq!(psi_for_counts(EventType::Alt5, 0, 0, 7), Psi::Undefined);
        assert_eq!(
            psi_for_counts(EventType::RetainedIntron, 0, 0, 0),
            Psi::Defined(RI_NO_COVERAGE)
        );
    }

    #[test]
    fn splice_site_formula() {
        assert_eq!(psi_for_counts(EventType::Alt5, 3, 1, 0), Psi::Defined(0.75));
        assert_eq!(psi_for_counts(EventType::Alt3, 0, 5, 0), Psi::Defined(0.0));
    }

    #[test]
    fn retained_intron_formula() {
        assert_eq!(psi_for_counts(EventType::RetainedIntron, 0, 5, 5), Psi::Defined(1.0));
        assert_eq!(psi_for_counts(EventType::RetainedIntron, 5, 0, 0), Psi::Defined(0.0));
        assert_eq!(psi_for_counts(EventType::RetainedIntron, 5, 5, 5), Psi::Defined(0.5));
    }

    #[test]
    fn missing_junctions_count_zero() {
        let records = vec![aux(RI, IsoformTag::Primary, 2, 3)];
        let record = compute_psi(&records, &EdgeCounts::new()).unwrap().remove(0);
        assert_eq!(record.to_string(), format!("{RI} 0 0 0 -1"));
    }

    #[test]
    fn record_lines_keep_integral_psi_fractional() {
        let record = |psi| PsiRecord {
            event: SE.to_string(),
            w1: 0,
            w2: 5,
            w3: 0,
            psi,
        };
        assert_eq!(record(Psi::Defined(0.0)).to_string(), format!("{SE} 0 5 0 0.0"));
        assert_eq!(record(Psi::Defined(1.0)).to_string(), format!("{SE} 0 5 0 1.0"));
        assert_eq!(record(Psi::Defined(-1.0)).to_string(), format!("{SE} 0 5 0 -1"));
    }

    #[test]
    fn duplicate_event_keeps_latest_group() {
        let records = vec![
            aux(SE, IsoformTag::Primary, 1, 2),
            aux(RI, IsoformTag::Primary, 10, 11),
            aux(SE, IsoformTag::Primary, 20, 21),
        ];
        let groups = group_event_edges(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key.record_id(), SE);
        assert_eq!(groups[0].primary, vec![(20, 21)]);
    }

    #[test]
    fn back_to_back_duplicate_keeps_latest_group() {
        let records = vec![
            aux(SE, IsoformTag::Primary, 1, 2),
            aux(SE, IsoformTag::Primary, 3, 4),
            aux(SE, IsoformTag::Secondary, 1, 4),
            aux(SE, IsoformTag::Primary, 11, 12),
            aux(SE, IsoformTag::Primary, 13, 14),
            aux(SE, IsoformTag::Secondary, 11, 14),
        ];
        let counts = counts_with(&[((11, 12), 1), ((13, 14), 1), ((11, 14), 1)]);
        let psi = compute_psi(&records, &counts).unwrap();

        assert_eq!(psi.len(), 1);
        assert_eq!((psi[0].w1, psi[0].w2, psi[0].w3), (1, 1, 1));
        assert_eq!(psi[0].psi, Psi::Defined(0.5));
    }

    #[test]
    fn psi_display_and_parse() {
        assert_eq!(Psi::Undefined.to_string(), "NaN");
        assert_eq!(Psi::Defined(0.5).to_string(), "0.5");
        assert_eq!(Psi::Defined(1.0).to_string(), "1.0");
        assert_eq!(Psi::Defined(0.0).to_string(), "0.0");
        assert_eq!(Psi::Defined(RI_NO_COVERAGE).to_string(), "-1.0");
        assert_eq!("NaN".parse::<Psi>().unwrap(), Psi::Undefined);
        assert_eq!("inf".parse::<Psi>().unwrap(), Psi::Undefined);
        assert_eq!("-1".parse::<Psi>().unwrap(), Psi::Defined(-1.0));
        assert_eq!(Psi::Defined(2.0 / 3.0).rounded(3), Psi::Defined(0.667));
    }
}
