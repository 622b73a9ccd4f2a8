//! Quantification: junction counts from alignment paths, per-sample PSI and
//! the differential statistic between two conditions.
//!
//! Counting works on the node ids of the graph file; the auxiliary edge index
//! maps each event isoform to the junction edges it owns. A sample's PSI
//! table is the output of [`compute_psi`]; [`compute_dpsi`] combines several
//! of them.

mod alignment;
mod dpsi;
mod psi;

pub use alignment::{AlignmentError, AlignmentPath, EdgeCounts, PathError};
pub use dpsi::{
    compute_dpsi, delta_psi, mean, write_dpsi, DpsiError, DpsiRecord, PsiTable, Sample,
};
pub use psi::{
    compute_event_psi, compute_psi, group_event_edges, psi_for_counts, write_psi, EventEdges, Psi,
    PsiError, PsiRecord, RI_NO_COVERAGE, UNDEFINED_MARKER,
};

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::graph::{read_aux_edges, GraphError};
use crate::DpsiConfig;

/// Errors of the file-level quantification entry points.
#[derive(Debug, Error)]
pub enum QuantError {
    /// Alignment file problem.
    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    /// Auxiliary edge index problem.
    #[error(transparent)]
    EdgeIndex(#[from] GraphError),

    /// Inconsistent PSI.
    #[error(transparent)]
    Psi(#[from] PsiError),

    /// dPSI problem.
    #[error(transparent)]
    Dpsi(#[from] DpsiError),

    /// A sample's PSI table could not be read.
    #[error("PSI table of sample '{sample}' ({path}): {source}")]
    PsiTable {
        /// Sample name.
        sample: String,
        /// Table path.
        path: String,
        /// Underlying error.
        #[source]
        source: DpsiError,
    },

    /// Output failure.
    #[error("failed to write {path}: {source}")]
    Output {
        /// File being written.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

fn open(path: &Path) -> Result<BufReader<File>, std::io::Error> {
    File::open(path).map(BufReader::new)
}

fn output_error(path: &Path) -> impl FnOnce(std::io::Error) -> QuantError + '_ {
    move |source| QuantError::Output {
        path: path.display().to_string(),
        source,
    }
}

/// Compute one sample's PSI table from its alignments and the edge index,
/// writing it to `out_path`.
pub fn psi_from_files(
    gaf_path: &Path,
    aux_path: &Path,
    out_path: &Path,
) -> Result<Vec<PsiRecord>, QuantError> {
    let counts = EdgeCounts::from_gaf_reader(open(gaf_path).map_err(AlignmentError::from)?)?;
    info!(
        "{}: {} paths, {} distinct edges",
        gaf_path.display(),
        counts.paths(),
        counts.len()
    );

    let edges = read_aux_edges(open(aux_path).map_err(GraphError::from)?)?;
    let records = compute_psi(&edges, &counts)?;

    let mut out = BufWriter::new(File::create(out_path).map_err(output_error(out_path))?);
    write_psi(&mut out, &records).map_err(output_error(out_path))?;

    let undefined = records.iter().filter(|r| !r.psi.is_defined()).count();
    info!(
        "PSI of {} events written to {} ({} undefined)",
        records.len(),
        out_path.display(),
        undefined
    );
    Ok(records)
}

/// Load a PSI table written by [`psi_from_files`].
pub fn read_psi_table(path: &Path) -> Result<PsiTable, DpsiError> {
    PsiTable::from_reader(open(path)?)
}

/// Default sample name for a PSI table path: the file name up to its first
/// dot (`sample1.gaf.psi` -> `sample1`).
pub fn sample_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => name,
    }
}

/// Combine the PSI tables of two conditions and write the differential
/// table to `out_path`.
pub fn dpsi_from_files(
    condition1: &[(String, &Path)],
    condition2: &[(String, &Path)],
    out_path: &Path,
    config: &DpsiConfig,
) -> Result<Vec<DpsiRecord>, QuantError> {
    let load = |samples: &[(String, &Path)]| -> Result<Vec<Sample>, QuantError> {
        samples
            .iter()
            .map(|(name, path)| {
                let table = read_psi_table(path).map_err(|source| QuantError::PsiTable {
                    sample: name.clone(),
                    path: path.display().to_string(),
                    source,
                })?;
                Ok::<_, QuantError>(Sample::new(name.clone(), table))
            })
            .collect()
    };
    let c1 = load(condition1)?;
    let c2 = load(condition2)?;

    let records = compute_dpsi(&c1, &c2)?;

    let mut out = BufWriter::new(File::create(out_path).map_err(output_error(out_path))?);
    write_dpsi(&mut out, &c1, &c2, &records, config.decimals).map_err(output_error(out_path))?;

    info!(
        "dPSI of {} events written to {}",
        records.len(),
        out_path.display()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_names_drop_extensions() {
        assert_eq!(sample_name(Path::new("/wd/sample1.gaf.psi")), "sample1");
        assert_eq!(sample_name(Path::new("ctrl_rep2")), "ctrl_rep2");
        assert_eq!(sample_name(Path::new(".hidden")), ".hidden");
    }

    #[test]
    fn bad_tables_name_their_sample() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a1.psi");
        let bad = dir.path().join("b2.psi");
        std::fs::write(&good, "E1 1 1 0 0.5\n").unwrap();
        std::fs::write(&bad, "E1 1 1 0 0.5\nE2 1 1 0\n").unwrap();

        let err = dpsi_from_files(
            &[("a1".to_string(), good.as_path())],
            &[("ctrl".to_string(), good.as_path()), ("treated".to_string(), bad.as_path())],
            &dir.path().join("out.dpsi"),
            &DpsiConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(
            &err,
            QuantError::PsiTable { sample, source: DpsiError::MalformedLine { line: 2, .. }, .. }
                if sample == "treated"
        ));
        let message = err.to_string();
        assert!(message.contains("'treated'"), "{message}");
        assert!(message.contains(&bad.display().to_string()), "{message}");
        assert!(message.contains("line 2"), "{message}");
    }

    #[test]
    fn missing_tables_name_their_sample() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.psi");
        let err = dpsi_from_files(
            &[("gone".to_string(), missing.as_path())],
            &[("gone".to_string(), missing.as_path())],
            &dir.path().join("out.dpsi"),
            &DpsiConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, QuantError::PsiTable { source: DpsiError::Io(_), .. }));
    }
}
