use proptest::prelude::*;
use esgq::coords::EventKey;
use esgq::graph::{chunk_sequence, NodeIdAllocator};
use esgq::quant::psi_for_counts;
use esgq::{EventType, Psi};

fn event_types() -> impl Strategy<Value = EventType> {
    prop_oneof![
        Just(EventType::SkippedExon),
        Just(EventType::Alt3),
        Just(EventType::Alt5),
        Just(EventType::RetainedIntron),
    ]
}

proptest! {
    #[test]
    fn chunks_concatenate_to_the_segment(
        sequence in proptest::collection::vec(prop_oneof![
            Just(b'A'), Just(b'C'), Just(b'G'), Just(b'T'), Just(b'N')
        ], 1..300),
        chunk_size in 1usize..64,
    ) {
        let chunks: Vec<&[u8]> = chunk_sequence(&sequence, chunk_size).collect();
        prop_assert_eq!(chunks.len(), sequence.len().div_ceil(chunk_size));
        for chunk in &chunks[..chunks.len() - 1] {
            prop_assert_eq!(chunk.len(), chunk_size, "only the last chunk may be short");
        }
        prop_assert_eq!(chunks.concat(), sequence);
    }

    #[test]
    fn psi_stays_in_range(
        event_type in event_types(),
        w1 in 0u64..10_000,
        w2 in 0u64..10_000,
        w3 in 0u64..10_000,
    ) {
        match psi_for_counts(event_type, w1, w2, w3) {
            Psi::Defined(value) => {
                prop_assert!((-1.0..=1.0).contains(&value), "PSI {} out of range", value);
                if value < 0.0 {
                    prop_assert_eq!(event_type, EventType::RetainedIntron);
                    prop_assert_eq!(w1 + w2 + w3, 0);
                }
            }
            Psi::Undefined => prop_assert!(event_type != EventType::RetainedIntron),
        }
    }

    #[test]
    fn skipped_exon_psi_falls_with_exclusion(
        w1 in 1u64..1_000,
        w2 in 0u64..1_000,
        w3 in 0u64..1_000,
        extra in 1u64..1_000,
    ) {
        let before = psi_for_counts(EventType::SkippedExon, w1, w2, w3).value().unwrap();
        let after = psi_for_counts(EventType::SkippedExon, w1, w2, w3 + extra).value().unwrap();
        prop_assert!(after < before);
        let more_inclusion = psi_for_counts(EventType::SkippedExon, w1 + extra, w2, w3).value().unwrap();
        prop_assert!(more_inclusion >= before);
    }

    #[test]
    fn node_ids_strictly_increase(n in 1usize..500) {
        let mut ids = NodeIdAllocator::new();
        let allocated: Vec<_> = (0..n).map(|_| ids.allocate()).collect();
        prop_assert_eq!(allocated[0], 1);
        prop_assert!(allocated.windows(2).all(|w| w[1] == w[0] + 1));
        prop_assert_eq!(ids.allocated(), n as u64);
    }

    #[test]
    fn record_ids_decode_to_the_same_event(
        gene in "[A-Z][A-Za-z0-9.]{0,12}",
        chrom in "(chr)?[0-9XY]{1,2}",
        a in 2u64..10_000,
        len1 in 1u64..5_000,
        gap in 1u64..5_000,
        len2 in 1u64..5_000,
        forward in any::<bool>(),
        event_type in event_types(),
    ) {
        let strand = if forward { '+' } else { '-' };
        let b = a + len1 + 1;
        let c = b + gap;
        let d = c + len2 + 1;
        let caller_id = match event_type {
            EventType::RetainedIntron => format!("{gene};RI:{chrom}:1:{a}-{b}:{c}:{strand}"),
            EventType::SkippedExon => format!("{gene};SE:{chrom}:{a}-{b}:{c}-{d}:{strand}"),
            other => format!("{gene};{}:{chrom}:{a}-{b}:{a}-{d}:{strand}", other.code()),
        };

        let key = EventKey::parse_caller_id(&caller_id).unwrap();
        prop_assert_eq!(key.caller_id(), caller_id);
        let decoded = EventKey::parse_record_id(&key.record_id()).unwrap();
        prop_assert_eq!(decoded, key);
    }
}
