use std::collections::BTreeSet;

use super::{require, resolve_roles, two_introns, Anchor, EventIsoforms, ResolveError, Segment};
use crate::coords::{EventKey, EventType, GenomicInterval, Strand};

/// Alternative 3'/5' splice site: two competing introns share one end.
///
/// When the competing splice sites lie upstream of the shared exon in
/// genomic order (A5 on `+`, A3 on `-`) the alternative exons end at the
/// intron starts and the constitutive exon starts after the shared intron
/// end. Otherwise the constitutive exon ends before the shared intron start
/// and the alternatives start after each intron end.
pub fn resolve_splice_site(
    key: &EventKey,
    exons: &BTreeSet<GenomicInterval>,
) -> Result<EventIsoforms, ResolveError> {
    let (first, second) = two_introns(key)?;

    if alternatives_upstream(key.event_type, key.strand) {
        let [constitutive, alt1, alt2] = resolve_roles(
            exons,
            [
                Anchor::StartsAt(first.end() + 1),
                Anchor::EndsAt(first.start() - 1),
                Anchor::EndsAt(second.start() - 1),
            ],
        );
        let constitutive = require(key, "constitutive exon", constitutive)?;
        let alt1 = require(key, "first alternative exon", alt1)?;
        let alt2 = require(key, "second alternative exon", alt2)?;

        Ok(EventIsoforms::new(
            key.clone(),
            vec![Segment::new(1, alt1), Segment::new(2, constitutive)],
            vec![Segment::new(3, alt2), Segment::new(2, constitutive)],
        ))
    } else {
        let [constitutive, alt1, alt2] = resolve_roles(
            exons,
            [
                Anchor::EndsAt(first.start() - 1),
                Anchor::StartsAt(first.end() + 1),
                Anchor::StartsAt(second.end() + 1),
            ],
        );
        let constitutive = require(key, "constitutive exon", constitutive)?;
        let alt1 = require(key, "first alternative exon", alt1)?;
        let alt2 = require(key, "second alternative exon", alt2)?;

        Ok(EventIsoforms::new(
            key.clone(),
            vec![Segment::new(1, constitutive), Segment::new(2, alt1)],
            vec![Segment::new(1, constitutive), Segment::new(3, alt2)],
        ))
    }
}

fn alternatives_upstream(event_type: EventType, strand: Strand) -> bool {
    matches!(
        (event_type, strand),
        (EventType::Alt5, Strand::Forward) | (EventType::Alt3, Strand::Reverse)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start: u64, end: u64) -> GenomicInterval {
        GenomicInterval::new(start, end).unwrap()
    }

    fn layout(event: &EventIsoforms) -> (Vec<(u32, GenomicInterval)>, Vec<(u32, GenomicInterval)>) {
        let collect = |segments: &[Segment]| -> Vec<(u32, GenomicInterval)> {
            segments.iter().map(|s| (s.id, s.interval)).collect()
        };
        (
            collect(&event.primary.segments),
            collect(&event.secondary.segments),
        )
    }

    #[test]
    fn alt5_forward_matches_exon_ends() {
        let key = EventKey::parse_caller_id("G1;A5:chr1:99-201:149-201:+").unwrap();
        let exons: BTreeSet<_> = [iv(1, 99), iv(1, 149), iv(201, 300)].into_iter().collect();

        let (primary, secondary) = layout(&resolve_splice_site(&key, &exons).unwrap());
        assert_eq!(primary, vec![(1, iv(1, 99)), (2, iv(201, 300))]);
        assert_eq!(secondary, vec![(3, iv(1, 149)), (2, iv(201, 300))]);
    }

    #[test]
    fn alt3_reverse_uses_same_layout_as_alt5_forward() {
        let key = EventKey::parse_caller_id("G1;A3:chr1:99-201:149-201:-").unwrap();
        let exons: BTreeSet<_> = [iv(1, 99), iv(1, 149), iv(201, 300)].into_iter().collect();

        let (primary, _) = layout(&resolve_splice_site(&key, &exons).unwrap());
        assert_eq!(primary, vec![(1, iv(1, 99)), (2, iv(201, 300))]);
    }

    #[test]
    fn alt3_forward_matches_exon_starts() {
        let key = EventKey::parse_caller_id("G1;A3:chr1:99-201:99-251:+").unwrap();
        let exons: BTreeSet<_> = [iv(1, 99), iv(201, 300), iv(251, 300), iv(251, 280)]
            .into_iter()
            .collect();

        let (primary, secondary) = layout(&resolve_splice_site(&key, &exons).unwrap());
        assert_eq!(primary, vec![(1, iv(1, 99)), (2, iv(201, 300))]);
        assert_eq!(secondary, vec![(1, iv(1, 99)), (3, iv(251, 300))]);
    }

    #[test]
    fn missing_alternative_drops_event() {
        let key = EventKey::parse_caller_id("G1;A5:chr1:99-201:149-201:+").unwrap();
        let exons: BTreeSet<_> = [iv(1, 99), iv(201, 300)].into_iter().collect();
        let err = resolve_splice_site(&key, &exons).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Unresolved { role: "second alternative exon", .. }
        ));
    }
}
