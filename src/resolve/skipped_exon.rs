use std::collections::BTreeSet;

use super::{require, resolve_roles, span, two_introns, Anchor, EventIsoforms, ResolveError, Segment};
use crate::coords::{EventKey, GenomicInterval};

const PRE: u32 = 1;
const MID: u32 = 2;
const POST: u32 = 3;

/// Exon skipping: inclusion `[pre, mid, post]`, exclusion `[pre, post]`.
///
/// `pre` ends right before the first intron, `post` starts right after the
/// second, and the skipped exon spans the gap between the two introns.
pub fn resolve_skipped_exon(
    key: &EventKey,
    exons: &BTreeSet<GenomicInterval>,
) -> Result<EventIsoforms, ResolveError> {
    let (first, second) = two_introns(key)?;

    let [pre, post] = resolve_roles(
        exons,
        [
            Anchor::EndsAt(first.start() - 1),
            Anchor::StartsAt(second.end() + 1),
        ],
    );
    let pre = require(key, "upstream exon", pre)?;
    let post = require(key, "downstream exon", post)?;
    let mid = span(key, "skipped exon", first.end() + 1, second.start() - 1)?;

    Ok(EventIsoforms::new(
        key.clone(),
        vec![
            Segment::new(PRE, pre),
            Segment::new(MID, mid),
            Segment::new(POST, post),
        ],
        vec![Segment::new(PRE, pre), Segment::new(POST, post)],
    ))
}
