#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use esgq::events::caller_file;
use esgq::EventType;

fn snapshot_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("snapshots")
}

pub fn assert_snapshot(name: &str, actual: &str) {
    let path = snapshot_root().join(name);
    if std::env::var("ESGQ_UPDATE_SNAPSHOTS").is_ok() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create snapshot directory");
        }
        fs::write(&path, actual).expect("write snapshot");
        return;
    }

    let expected =
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("snapshot {:?} not found", path));
    if normalize(&expected) != normalize(actual) {
        panic!(
            "Snapshot mismatch for {:?}. Set ESGQ_UPDATE_SNAPSHOTS=1 to regenerate.\nExpected:\n{}\nActual:\n{}",
            path,
            expected,
            actual
        );
    }
}

fn normalize(input: &str) -> String {
    input.replace("\r\n", "\n")
}

const IOE_HEADER: &str = "seqname\tgene_id\tevent_id\talternative_transcripts\ttotal_transcripts";

/// On-disk inputs of a graph build: reference, annotation and caller files.
pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub reference: PathBuf,
    pub annotation: PathBuf,
    pub events: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create fixture directory");
        let events = dir.path().join("events");
        fs::create_dir(&events).expect("create events directory");
        Self {
            reference: dir.path().join("reference.fa"),
            annotation: dir.path().join("annotation.gtf"),
            events,
            dir,
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn with_reference(self, records: &[(&str, &str)]) -> Self {
        let mut text = String::new();
        for (name, sequence) in records {
            text.push_str(&format!(">{name}\n"));
            for line in sequence.as_bytes().chunks(60) {
                text.push_str(std::str::from_utf8(line).expect("ascii sequence"));
                text.push('\n');
            }
        }
        fs::write(&self.reference, text).expect("write reference");
        self
    }

    pub fn with_exons(self, chrom: &str, gene: &str, exons: &[(u64, u64)]) -> Self {
        let mut text = fs::read_to_string(&self.annotation).unwrap_or_default();
        for (start, end) in exons {
            text.push_str(&format!(
                "{chrom}\ttest\texon\t{start}\t{end}\t.\t+\t.\tgene_id \"{gene}\"; transcript_id \"{gene}.1\";\n"
            ));
        }
        fs::write(&self.annotation, text).expect("write annotation");
        self
    }

    pub fn with_events(self, event_type: EventType, ids: &[&str]) -> Self {
        let mut text = format!("{IOE_HEADER}\n");
        for id in ids {
            let (gene, _) = id.split_once(';').expect("caller id has a gene");
            let chrom = id.split(':').nth(1).expect("caller id has a chromosome");
            text.push_str(&format!("{chrom}\t{gene}\t{id}\tT1\tT1,T2\n"));
        }
        fs::write(caller_file(&self.events, "", event_type), text).expect("write caller file");
        self
    }
}

/// A repeating, easily recognisable sequence.
pub fn pattern(len: usize) -> String {
    "ACGT".chars().cycle().take(len).collect()
}

/// A GAF line whose path is `path`.
pub fn gaf_line(name: &str, path: &str) -> String {
    format!("{name}\t150\t0\t150\t+\t{path}\t1000\t0\t150\t150\t150\t60\n")
}
