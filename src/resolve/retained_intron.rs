use super::{span, EventIsoforms, ResolveError, Segment};
use crate::coords::{EventCoords, EventKey};

/// Intron retention: `[exon1, exon2]` and `[exon1, intron, exon2]`.
///
/// The direct exon1→exon2 junction of the primary isoform represents the
/// spliced form; the secondary isoform walks through the retained intron.
pub fn resolve_retained_intron(key: &EventKey) -> Result<EventIsoforms, ResolveError> {
    let (exon1_start, intron, exon2_end) = match key.coords {
        EventCoords::RetainedIntron {
            exon1_start,
            intron,
            exon2_end,
        } => (exon1_start, intron, exon2_end),
        EventCoords::Introns { .. } => {
            return Err(ResolveError::CoordinateMismatch {
                event: key.record_id(),
                event_type: key.event_type,
            })
        }
    };

    let exon1 = span(key, "upstream exon", exon1_start, intron.start() - 1)?;
    let exon2 = span(key, "downstream exon", intron.end() + 1, exon2_end)?;

    Ok(EventIsoforms::new(
        key.clone(),
        vec![Segment::new(1, exon1), Segment::new(2, exon2)],
        vec![
            Segment::new(1, exon1),
            Segment::new(3, intron),
            Segment::new(2, exon2),
        ],
    ))
}
