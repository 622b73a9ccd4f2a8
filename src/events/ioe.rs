use std::io::BufRead;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::coords::EventType;

const HEADER_PREFIX: &str = "seqname";
const EVENT_ID_COLUMN: usize = 2;

/// Errors raised while reading event-caller output.
#[derive(Debug, Error)]
pub enum IoeError {
    /// Underlying I/O failure.
    #[error("failed to read event file: {0}")]
    Io(#[from] std::io::Error),

    /// A row has too few columns.
    #[error("malformed event file line {line}: {reason}")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },
}

/// One event row of a caller file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoeRecord {
    /// 1-based line number, for diagnostics.
    pub line: usize,
    /// Event id in caller notation (`gene;TYPE:chrom:...:strand`).
    pub caller_id: String,
}

/// Path of the caller's output for one event type:
/// `<dir>/<prefix>_<TYPE>_strict.ioe`.
pub fn caller_file(dir: &Path, prefix: &str, event_type: EventType) -> PathBuf {
    dir.join(format!("{prefix}_{}_strict.ioe", event_type.code()))
}

/// Read the event ids of a caller file, skipping its header row.
pub fn read_ioe<R: BufRead>(reader: R) -> Result<Vec<IoeRecord>, IoeError> {
    let mut records = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with(HEADER_PREFIX) {
            continue;
        }
        let caller_id = line
            .split('\t')
            .nth(EVENT_ID_COLUMN)
            .ok_or_else(|| IoeError::MalformedLine {
                line: line_no + 1,
                reason: format!("missing event id column {}", EVENT_ID_COLUMN + 1),
            })?;
        records.push(IoeRecord {
            line: line_no + 1,
            caller_id: caller_id.to_string(),
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn skips_header_and_takes_third_column() {
        let text = "seqname\tgene_id\tevent_id\talternative_transcripts\ttotal_transcripts\n\
                    chr1\tG1\tG1;SE:chr1:99-201:299-401:+\tT1\tT1,T2\n";
        let records = read_ioe(Cursor::new(text)).unwrap();
        assert_eq!(
            records,
            vec![IoeRecord {
                line: 2,
                caller_id: "G1;SE:chr1:99-201:299-401:+".to_string(),
            }]
        );
    }

    #[test]
    fn short_row_is_malformed() {
        let err = read_ioe(Cursor::new("chr1\tG1\n")).unwrap_err();
        assert!(matches!(err, IoeError::MalformedLine { line: 1, .. }));
    }

    #[test]
    fn caller_file_naming() {
        let path = caller_file(Path::new("/tmp/events"), "", EventType::Alt3);
        assert_eq!(path, PathBuf::from("/tmp/events/_A3_strict.ioe"));
        let path = caller_file(Path::new("out"), "sample", EventType::RetainedIntron);
        assert_eq!(path, PathBuf::from("out/sample_RI_strict.ioe"));
    }
}
