use std::collections::HashMap;
use std::fmt;
use std::io::{BufRead, Write};

use thiserror::Error;
use tracing::{debug, warn};

use super::Psi;

/// Errors raised while combining PSI tables.
#[derive(Debug, Error)]
pub enum DpsiError {
    /// Underlying I/O failure.
    #[error("dPSI I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A PSI table line could not be parsed.
    #[error("malformed PSI line {line}: {reason}")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// A condition has no samples.
    #[error("condition {0} has no samples")]
    EmptyCondition(u8),
}

/// PSI values of one sample keyed by event id, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PsiTable {
    order: Vec<String>,
    values: HashMap<String, Psi>,
}

impl PsiTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the PSI of `event`; a repeated id overwrites the value but keeps
    /// its first position.
    pub fn insert(&mut self, event: impl Into<String>, psi: Psi) {
        let event = event.into();
        if self.values.insert(event.clone(), psi).is_some() {
            warn!("duplicate event {event} in PSI table, keeping the latest value");
        } else {
            self.order.push(event);
        }
    }

    /// PSI of `event`, if present.
    pub fn get(&self, event: &str) -> Option<Psi> {
        self.values.get(event).copied()
    }

    /// Event ids in first-appearance order.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Parse `<eventId> <w1> <w2> <w3> <psi>` lines.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, DpsiError> {
        let mut table = Self::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let malformed = |reason: String| DpsiError::MalformedLine {
                line: line_no + 1,
                reason,
            };

            let fields: Vec<&str> = line.trim_end().split(' ').collect();
            let [event, _w1, _w2, _w3, psi] = fields.as_slice() else {
                return Err(malformed(format!(
                    "expected 5 space-separated fields, found {}",
                    fields.len()
                )));
            };
            let psi = psi
                .parse::<Psi>()
                .map_err(|_| malformed(format!("invalid PSI '{psi}'")))?;
            table.insert(*event, psi);
        }

        Ok(table)
    }
}

/// A named PSI table.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Sample name, used as column label.
    pub name: String,
    /// The sample's PSI values.
    pub table: PsiTable,
}

impl Sample {
    /// Pair a name with a table.
    pub fn new(name: impl Into<String>, table: PsiTable) -> Self {
        Self {
            name: name.into(),
            table,
        }
    }
}

/// Differential PSI of one event.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DpsiRecord {
    /// Record id of the event.
    pub event: String,
    /// Per-sample PSI of condition 1.
    pub condition1: Vec<Psi>,
    /// Per-sample PSI of condition 2.
    pub condition2: Vec<Psi>,
    /// `|mean1| - |mean2|`, or undefined.
    pub dpsi: Psi,
}

/// Mean of PSI values; undefined when any value is undefined or there are
/// none.
pub fn mean(values: &[Psi]) -> Psi {
    if values.is_empty() {
        return Psi::Undefined;
    }
    let mut sum = 0.0;
    for psi in values {
        match psi {
            Psi::Defined(v) => sum += v,
            Psi::Undefined => return Psi::Undefined,
        }
    }
    Psi::Defined(sum / values.len() as f64)
}

/// `|m1| - |m2|` when both means are defined and their difference is finite.
pub fn delta_psi(m1: Psi, m2: Psi) -> Psi {
    match (m1, m2) {
        (Psi::Defined(a), Psi::Defined(b)) if (a - b).is_finite() => {
            Psi::Defined(a.abs() - b.abs())
        }
        _ => Psi::Undefined,
    }
}

fn collect(samples: &[Sample], event: &str) -> Vec<Psi> {
    samples
        .iter()
        .map(|sample| {
            sample.table.get(event).unwrap_or_else(|| {
                debug!("event {event} missing from sample {}", sample.name);
                Psi::Undefined
            })
        })
        .collect()
}

/// Combine the PSI tables of two conditions.
///
/// Events are taken from the last sample of condition 2, in its order; an
/// event only present in other samples is not reported. A sample lacking an
/// event contributes an undefined PSI.
pub fn compute_dpsi(
    condition1: &[Sample],
    condition2: &[Sample],
) -> Result<Vec<DpsiRecord>, DpsiError> {
    if condition1.is_empty() {
        return Err(DpsiError::EmptyCondition(1));
    }
    let driver = condition2.last().ok_or(DpsiError::EmptyCondition(2))?;

    let records = driver
        .table
        .events()
        .map(|event| {
            let psi1 = collect(condition1, event);
            let psi2 = collect(condition2, event);
            let dpsi = delta_psi(mean(&psi1), mean(&psi2));
            DpsiRecord {
                event: event.to_string(),
                condition1: psi1,
                condition2: psi2,
                dpsi,
            }
        })
        .collect();

    Ok(records)
}

struct Joined<'a>(&'a [Psi], u32);

impl fmt::Display for Joined<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, psi) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", psi.rounded(self.1))?;
        }
        Ok(())
    }
}

/// Write the differential table.
///
/// Sample PSIs are rounded to `decimals` places and space-joined per
/// condition; dPSI is written at full precision.
pub fn write_dpsi<W: Write>(
    writer: &mut W,
    condition1: &[Sample],
    condition2: &[Sample],
    records: &[DpsiRecord],
    decimals: u32,
) -> std::io::Result<()> {
    let names = |samples: &[Sample]| {
        samples
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    };
    writeln!(
        writer,
        "Event\t{}\t{}\tdPSI",
        names(condition1),
        names(condition2)
    )?;

    for record in records {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            record.event,
            Joined(&record.condition1, decimals),
            Joined(&record.condition2, decimals),
            record.dpsi
        )?;
    }
    writer.flush()
}
