//! Performance benchmarks

use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use esgq::annotation::{ExonIndex, InMemoryReference};
use esgq::coords::EventKey;
use esgq::graph::{GraphBuilder, NodeIdAllocator};
use esgq::quant::{compute_psi, EdgeCounts};
use esgq::{resolve_event, GenomicInterval};

const EVENTS: u64 = 500;
const STRIDE: u64 = 1_000;

fn fixture() -> (ExonIndex, InMemoryReference, Vec<EventKey>) {
    let mut exons = ExonIndex::new();
    let mut keys = Vec::new();
    for i in 0..EVENTS {
        let base = i * STRIDE;
        for (start, end) in [(1, 99), (201, 299), (401, 500)] {
            exons.insert(
                "chr1",
                "G1",
                GenomicInterval::new(base + start, base + end).expect("valid exon"),
            );
        }
        let id = format!(
            "G1;SE:chr1:{}-{}:{}-{}:+",
            base + 99,
            base + 201,
            base + 299,
            base + 401
        );
        keys.push(EventKey::parse_caller_id(&id).expect("valid id"));
    }

    let mut reference = InMemoryReference::new();
    let sequence: Vec<u8> = b"ACGT"
        .iter()
        .copied()
        .cycle()
        .take((EVENTS * STRIDE) as usize)
        .collect();
    reference.insert("chr1", sequence);
    (exons, reference, keys)
}

fn benchmark_quantification(c: &mut Criterion) {
    let (exons, reference, keys) = fixture();
    let builder = GraphBuilder::new(&reference, 32).expect("chunk size is positive");

    c.bench_function("build_500_skipped_exons", |b| {
        b.iter(|| {
            let mut ids = NodeIdAllocator::new();
            for key in &keys {
                let isoforms = resolve_event(key, &exons).expect("event resolves");
                black_box(builder.build_event(&isoforms, &mut ids).expect("event builds"));
            }
        });
    });

    let mut ids = NodeIdAllocator::new();
    let mut aux = Vec::new();
    for key in &keys {
        let isoforms = resolve_event(key, &exons).expect("event resolves");
        aux.extend(builder.build_event(&isoforms, &mut ids).expect("event builds").aux);
    }

    // every event gets inclusion and exclusion reads
    let mut gaf = String::new();
    for (i, chunk) in aux.chunks(3).enumerate() {
        let (a, b) = chunk[0].edge();
        let (c, d) = chunk[1].edge();
        let (e, f) = chunk[2].edge();
        for r in 0..10 {
            gaf.push_str(&format!(
                "r{i}_{r}\t150\t0\t150\t+\t>{a}>{b}\t1\t0\t1\t1\t1\t60\n\
                 s{i}_{r}\t150\t0\t150\t+\t<{d}<{c}\t1\t0\t1\t1\t1\t60\n\
                 t{i}_{r}\t150\t0\t150\t+\t>{e}>{f}\t1\t0\t1\t1\t1\t60\n"
            ));
        }
    }

    c.bench_function("count_edges_15k_reads", |b| {
        b.iter(|| EdgeCounts::from_gaf_reader(Cursor::new(black_box(gaf.as_bytes()))).expect("parses"));
    });

    let counts = EdgeCounts::from_gaf_reader(Cursor::new(gaf.as_bytes())).expect("parses");
    c.bench_function("psi_500_events", |b| {
        b.iter(|| compute_psi(black_box(&aux), &counts).expect("PSI in range"));
    });
}

criterion_group!(benches, benchmark_quantification);
criterion_main!(benches);
