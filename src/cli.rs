//src/cli.rs

use std::path::PathBuf;

use clap::Parser;

use crate::error::{ConfigError, TaxCountError};
use crate::lineage::{LineageMode, RankFilter};
use crate::report::ReportMode;

/// Counts reads per taxon in Kaiju-style classifier output.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct CountArgs {
    /// nodes.dmp of the taxonomy (may be gzipped)
    #[arg(short = 't', long)]
    pub nodes: Option<PathBuf>,
    /// names.dmp of the taxonomy (may be gzipped)
    #[arg(short = 'n', long)]
    pub names: Option<PathBuf>,
    /// Classifier output file
    #[arg(short, long)]
    pub input: PathBuf,
    /// Output file. If not specified, output is printed to stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
    /// Print the taxon name next to each id
    #[arg(short = 'N', long)]
    pub names_output: bool,
    /// Print the full lineage next to each id
    #[arg(short = 'p', long)]
    pub full_path: bool,
    /// Print only these ranks of the lineage, e.g. `phylum,class,order`
    #[arg(short, long)]
    pub ranks: Option<String>,
    /// Drop reads whose taxon id is missing from nodes.dmp or names.dmp
    #[arg(short, long)]
    pub strict: bool,
}

/// Validated settings for one counting run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountOptions {
    pub nodes: Option<PathBuf>,
    pub names: Option<PathBuf>,
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub mode: ReportMode,
    pub strict: bool,
}

impl CountOptions {
    /// Plain counting of `input`, no taxonomy involved.
    pub fn counts_only<P: Into<PathBuf>>(input: P) -> Self {
        Self {
            nodes: None,
            names: None,
            input: input.into(),
            output: None,
            mode: ReportMode::CountsOnly,
            strict: false,
        }
    }

    pub fn needs_taxonomy(&self) -> bool {
        self.strict || self.mode.needs_taxonomy()
    }
}

impl CountArgs {
    /// Checks option combinations and builds the run settings.
    pub fn into_options(self) -> Result<CountOptions, TaxCountError> {
        if self.ranks.is_some() && self.full_path {
            return Err(ConfigError::RanksWithFullPath.into());
        }

        let feature = if self.full_path {
            Some("--full-path")
        } else if self.ranks.is_some() {
            Some("--ranks")
        } else if self.names_output {
            Some("--names-output")
        } else if self.strict {
            Some("--strict")
        } else {
            None
        };
        // the taxonomy is always built from both tables
        if let Some(feature) = feature {
            if self.nodes.is_none() {
                return Err(ConfigError::MissingNodes(feature).into());
            }
            if self.names.is_none() {
                return Err(ConfigError::MissingNames(feature).into());
            }
        }

        let mode = if self.full_path {
            ReportMode::Lineage(LineageMode::FullPath)
        } else if let Some(list) = &self.ranks {
            ReportMode::Lineage(LineageMode::Ranks(RankFilter::parse(list)?))
        } else if self.names_output {
            ReportMode::Names
        } else {
            ReportMode::CountsOnly
        };

        Ok(CountOptions {
            nodes: self.nodes,
            names: self.names,
            input: self.input,
            output: self.output,
            mode,
            strict: self.strict,
        })
    }
}

/// Converts Kaiju output into the input format of Recentrifuge.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct RecentrifugeArgs {
    /// Classifier output file
    #[arg(short, long)]
    pub input: PathBuf,
    /// Output file. If not specified, output is printed to stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Sets up `env_logger`: `info` when verbose, `warn` otherwise. `RUST_LOG`
/// takes precedence.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .try_init();
}
