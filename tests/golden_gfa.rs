#[path = "common/mod.rs"]
mod common;

use common::{assert_snapshot, Fixture};
use esgq::annotation::{ExonIndex, InMemoryReference};
use esgq::events::build_graph;
use esgq::graph::GraphWriter;
use esgq::{BuildConfig, EventType};

#[test]
fn small_graph_matches_golden() {
    let fixture = Fixture::new()
        .with_exons("chr2", "G9", &[(1, 5), (11, 15), (21, 28)])
        .with_events(EventType::SkippedExon, &["G9;SE:chr2:5-11:15-21:+"])
        .with_events(EventType::RetainedIntron, &["G9;RI:chr2:1:5-11:15:+"]);

    let exons = ExonIndex::from_path(&fixture.annotation).expect("annotation loads");
    let mut reference = InMemoryReference::new();
    reference.insert("chr2", "AAAAACCCCCGGGGGTTTTTACGTACGTACTTTTTGGGGG");

    let mut writer = GraphWriter::new(Vec::new(), Vec::new()).expect("header written");
    build_graph(
        &BuildConfig::default().with_chunk_size(4),
        &exons,
        &reference,
        &fixture.events,
        &mut writer,
    )
    .expect("graph builds");
    let (gfa, addinfo) = writer.finish().expect("outputs flushed");

    assert_snapshot("graph/small.gfa", &String::from_utf8(gfa).unwrap());
    assert_snapshot("graph/small.addinfo", &String::from_utf8(addinfo).unwrap());
}
