use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use esgq::annotation::{ExonIndex, IndexedFasta};
use esgq::events::build_graph_files;
use esgq::quant::{dpsi_from_files, psi_from_files, sample_name};
use esgq::{BuildConfig, DpsiConfig, EventType};

#[derive(Parser, Debug)]
#[command(
    name = "esgq",
    version,
    about = "Event Splicing Graph construction and PSI/dPSI quantification"
)]
struct Cli {
    /// Log debug messages (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the splicing graph and its junction edge index.
    Build {
        /// Reference genome (FASTA, indexed on the fly if no .fai exists).
        reference: PathBuf,
        /// Gene annotation (GTF).
        annotation: PathBuf,
        /// Directory holding the event caller's `<prefix>_<TYPE>_strict.ioe` files.
        events: PathBuf,
        /// Output prefix; writes `<prefix>.gfa` and `<prefix>.addinfo`.
        #[arg(short, long)]
        output: PathBuf,
        /// Maximum bases per graph node.
        #[arg(long, default_value_t = esgq::DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
        /// Prefix of the event caller's files.
        #[arg(long, default_value = "")]
        caller_prefix: String,
        /// Event types to process (SE, A3, A5, RI), in order.
        #[arg(long, value_delimiter = ',')]
        types: Vec<EventType>,
    },
    /// Compute per-event PSI from alignments against the graph.
    Psi {
        /// Alignments in GAF format.
        alignments: PathBuf,
        /// Junction edge index written by `build`.
        addinfo: PathBuf,
        /// Output PSI table.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Compare PSI tables of two conditions.
    Dpsi {
        /// Condition 1 PSI tables, as `name=path` or `path`.
        #[arg(short = '1', long = "c1", num_args = 1.., required = true)]
        condition1: Vec<String>,
        /// Condition 2 PSI tables, as `name=path` or `path`.
        #[arg(short = '2', long = "c2", num_args = 1.., required = true)]
        condition2: Vec<String>,
        /// Output dPSI table.
        #[arg(short, long)]
        output: PathBuf,
        /// Decimal places of per-sample PSIs.
        #[arg(long, default_value_t = esgq::DEFAULT_DPSI_DECIMALS)]
        decimals: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            reference,
            annotation,
            events,
            output,
            chunk_size,
            caller_prefix,
            types,
        } => {
            let mut config = BuildConfig::default()
                .with_chunk_size(chunk_size)
                .with_caller_prefix(caller_prefix);
            if !types.is_empty() {
                config = config.with_event_types(types);
            }
            run_build(&reference, &annotation, &events, &output, &config)?
        }
        Commands::Psi {
            alignments,
            addinfo,
            output,
        } => {
            psi_from_files(&alignments, &addinfo, &output).with_context(|| {
                format!("failed to compute PSI from {}", alignments.display())
            })?;
        }
        Commands::Dpsi {
            condition1,
            condition2,
            output,
            decimals,
        } => run_dpsi(&condition1, &condition2, &output, decimals)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_build(
    reference_path: &Path,
    annotation_path: &Path,
    events_dir: &Path,
    prefix: &Path,
    config: &BuildConfig,
) -> Result<()> {
    config.validate().context("invalid build options")?;
    if !events_dir.is_dir() {
        bail!("event directory {} does not exist", events_dir.display());
    }

    let exons = ExonIndex::from_path(annotation_path).with_context(|| {
        format!("failed to read annotation from {}", annotation_path.display())
    })?;
    info!("{} genes loaded from {}", exons.num_genes(), annotation_path.display());

    let reference = IndexedFasta::from_path(reference_path).with_context(|| {
        format!("failed to open reference {}", reference_path.display())
    })?;

    let gfa_path = with_suffix(prefix, ".gfa");
    let aux_path = with_suffix(prefix, ".addinfo");
    let summary = build_graph_files(config, &exons, &reference, events_dir, &gfa_path, &aux_path)
        .context("graph construction failed")?;

    info!(
        "{} events written, {} dropped, {} nodes",
        summary.events_written(),
        summary.events_dropped(),
        summary.nodes
    );
    Ok(())
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut path = prefix.as_os_str().to_owned();
    path.push(suffix);
    PathBuf::from(path)
}

fn parse_sample(arg: &str) -> (String, PathBuf) {
    match arg.split_once('=') {
        Some((name, path)) if !name.is_empty() => (name.to_string(), PathBuf::from(path)),
        _ => {
            let path = PathBuf::from(arg);
            (sample_name(&path), path)
        }
    }
}

fn as_path_refs(samples: &[(String, PathBuf)]) -> Vec<(String, &Path)> {
    samples
        .iter()
        .map(|(name, path)| (name.clone(), path.as_path()))
        .collect()
}

fn run_dpsi(
    condition1: &[String],
    condition2: &[String],
    output: &Path,
    decimals: u32,
) -> Result<()> {
    let c1: Vec<(String, PathBuf)> = condition1.iter().map(|a| parse_sample(a)).collect();
    let c2: Vec<(String, PathBuf)> = condition2.iter().map(|a| parse_sample(a)).collect();

    dpsi_from_files(
        &as_path_refs(&c1),
        &as_path_refs(&c2),
        output,
        &DpsiConfig::default().with_decimals(decimals),
    )
    .context("failed to compute dPSI")?;
    Ok(())
}
