use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use csdl::config::MinimizerKind;
use csdl::registry::Registry;
use csdl::{CsdlWriter, Dialect, Node, OptimizeError, OptimizerConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Filter tree file (.json, .yaml, .yml)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csdl)]
    pub format: OutputFormat,

    /// Optimizer configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Fold conditions without boolean minimization
    #[arg(long)]
    pub fold_only: bool,

    /// Target set to validate against (generic, interaction, query)
    #[arg(long)]
    pub dialect: Option<Dialect>,

    /// External minimizer program (reads a formula on stdin)
    #[arg(long)]
    pub minimizer_program: Option<PathBuf>,

    /// Timeout for the external minimizer
    #[arg(long)]
    pub minimizer_timeout_ms: Option<u64>,

    /// Number of threads (default: all cores)
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum OutputFormat {
    Csdl,
    Json,
    Yaml,
}

/// Input file: a single tree, or named trees under `filters`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FilterDocument {
    Batch { filters: BTreeMap<String, Node> },
    Single(Node),
}

#[derive(Serialize)]
struct BatchOutput<'a> {
    filters: BTreeMap<&'a str, &'a Node>,
}

/// Optimization outcome of one named filter.
pub struct FilterOutcome {
    pub name: Option<String>,
    pub result: std::result::Result<Node, OptimizeError>,
}

pub fn load_config(cli: &Cli) -> Result<OptimizerConfig> {
    let mut config = OptimizerConfig::load(cli.config.as_deref())?;
    if cli.fold_only {
        config.fold_only = true;
    }
    if let Some(dialect) = cli.dialect {
        config.dialect = dialect;
    }
    if let Some(program) = &cli.minimizer_program {
        config.minimizer.kind = MinimizerKind::Process;
        config.minimizer.program = Some(program.clone());
    }
    if let Some(timeout_ms) = cli.minimizer_timeout_ms {
        config.minimizer.timeout_ms = timeout_ms;
    }
    Ok(config)
}

pub fn read_document(path: &Path) -> Result<FilterDocument> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("CLI: Failed to read {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);
    match ext.as_deref() {
        Some("json") => serde_json::from_str(&text)
            .with_context(|| format!("CLI: Invalid JSON filter file {}", path.display())),
        Some("yaml") | Some("yml") => serde_yaml::from_str(&text)
            .with_context(|| format!("CLI: Invalid YAML filter file {}", path.display())),
        _ => bail!(
            "CLI: Could not detect input format of {}; use .json, .yaml or .yml",
            path.display()
        ),
    }
}

/// Optimize every filter of the document. Batches run in parallel.
pub fn optimize_document(
    config: &OptimizerConfig,
    document: FilterDocument,
) -> Result<Vec<FilterOutcome>> {
    let optimizer = config.build_optimizer()?;
    let start = std::time::Instant::now();

    let entries: Vec<(Option<String>, Node)> = match document {
        FilterDocument::Single(tree) => vec![(None, tree)],
        FilterDocument::Batch { filters } => filters
            .into_iter()
            .map(|(name, tree)| (Some(name), tree))
            .collect(),
    };
    tracing::info!("Optimizing {} filters", entries.len());

    let outcomes: Vec<FilterOutcome> = entries
        .into_par_iter()
        .map(|(name, tree)| {
            let result = match optimizer.optimize(&tree) {
                Ok(Some(optimized)) => Ok(optimized),
                Ok(None) => {
                    tracing::info!("No optimization applies to {}", label(&name));
                    Ok(tree)
                }
                Err(err) => Err(err),
            };
            FilterOutcome { name, result }
        })
        .collect();

    tracing::info!(
        "Done! Optimized {} filters in {:.2}s",
        outcomes.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(outcomes)
}

fn label(name: &Option<String>) -> &str {
    name.as_deref().unwrap_or("filter")
}

/// Report failures on stderr. Returns whether every filter succeeded.
pub fn report_failures(outcomes: &[FilterOutcome]) -> bool {
    let mut ok = true;
    for outcome in outcomes {
        if let Err(err) = &outcome.result {
            ok = false;
            if err.is_filter_error() {
                tracing::error!("{}: {}", label(&outcome.name), err);
            } else {
                tracing::error!("{}: internal error: {}", label(&outcome.name), err);
            }
        }
    }
    ok
}

pub fn render_output(
    format: OutputFormat,
    registry: &dyn Registry,
    outcomes: &[FilterOutcome],
) -> Result<String> {
    let succeeded: Vec<(Option<&str>, &Node)> = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok().map(|node| (o.name.as_deref(), node)))
        .collect();
    let single = matches!(succeeded.as_slice(), [(None, _)]);

    match format {
        OutputFormat::Csdl => {
            let writer = CsdlWriter::new(registry);
            let mut out = String::new();
            for (name, node) in succeeded {
                let text = writer.write(node).context("CLI: Failed to write CSDL")?;
                match name {
                    Some(name) => out.push_str(&format!("{}: {}\n", name, text)),
                    None => out.push_str(&format!("{}\n", text)),
                }
            }
            Ok(out)
        }
        OutputFormat::Json | OutputFormat::Yaml if single => {
            let node = succeeded[0].1;
            serialize(format, node)
        }
        OutputFormat::Json | OutputFormat::Yaml => {
            let batch = BatchOutput {
                filters: succeeded
                    .into_iter()
                    .map(|(name, node)| (name.unwrap_or_default(), node))
                    .collect(),
            };
            serialize(format, &batch)
        }
    }
}

fn serialize<T: Serialize>(format: OutputFormat, value: &T) -> Result<String> {
    match format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        _ => Ok(format!("{}\n", serde_json::to_string_pretty(value)?)),
    }
}

pub fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::write(path, text)
            .with_context(|| format!("CLI: Failed to write {}", path.display())),
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .context("CLI: Failed to write to stdout")
        }
    }
}

/// Run the CLI. Returns whether every filter was optimized.
pub fn run(cli: &Cli) -> Result<bool> {
    let config = load_config(cli)?;
    tracing::info!(
        "Dialect: {:?}, minimizer: {:?}, fold only: {}",
        config.dialect,
        config.minimizer.kind,
        config.fold_only
    );

    let document = read_document(&cli.input)?;
    let outcomes = optimize_document(&config, document)?;
    let ok = report_failures(&outcomes);

    let registry = config.registry();
    let text = render_output(cli.format, &registry, &outcomes)?;
    write_output(cli.output.as_deref(), &text)?;
    Ok(ok)
}
