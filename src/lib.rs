// src/lib.rs
pub mod types;
pub mod error;
pub mod fields;
pub mod reader;
pub mod taxdb;
pub mod lineage;
pub mod counts;
pub mod report;
pub mod recentrifuge;
pub mod cli;

use crate::cli::CountOptions;
use crate::counts::{FinalCounts, IngestStats, ReadAggregator};
use crate::error::TaxCountError;
use crate::reader::{open_lines, open_output};
use crate::report::{build_report, render_report, write_report};
use crate::taxdb::Taxonomy;
use crate::types::CountRow;

/// Everything one counting run produces. Text is generated on demand.
#[derive(Debug)]
pub struct CountResults {
    /// Report rows, highest count first
    pub rows: Vec<CountRow>,

    /// Per-taxon counts the rows were built from
    pub counts: FinalCounts,

    /// How the input lines were handled
    pub stats: IngestStats,

    /// The taxonomy, if the run needed one
    pub taxonomy: Option<Taxonomy>,
}

impl CountResults {
    /// Generate the report text on demand
    pub fn get_report_text(&self) -> String {
        render_report(&self.rows)
    }

    /// Write the report to `writer`
    pub fn write_report<W: std::io::Write>(&self, writer: W) -> std::io::Result<()> {
        write_report(&self.rows, writer)
    }
}

/// Loads the taxonomy named in `options`, if the run needs one.
pub fn load_taxonomy(options: &CountOptions) -> Result<Option<Taxonomy>, TaxCountError> {
    if !options.needs_taxonomy() {
        return Ok(None);
    }
    match (&options.nodes, &options.names) {
        (Some(nodes), Some(names)) => Ok(Some(Taxonomy::from_files(nodes, names)?)),
        (None, _) => Err(error::ConfigError::MissingNodes("taxonomy lookup").into()),
        (_, None) => Err(error::ConfigError::MissingNames("taxonomy lookup").into()),
    }
}

/// Counts the reads in `options.input` per taxon and builds the report rows.
///
/// 1. load the taxonomy (only when names, lineages or strict checks are asked for)
/// 2. stream the classifier output through a `ReadAggregator`
/// 3. sort and label the counts
pub fn count_taxon_reads(options: &CountOptions) -> Result<CountResults, TaxCountError> {
    let taxonomy = load_taxonomy(options)?;

    log::info!("Processing {}...", options.input.display());
    let input = open_lines(&options.input)?;
    let mut aggregator = match (&taxonomy, options.strict) {
        (Some(tax), true) => ReadAggregator::strict(tax),
        _ => ReadAggregator::new(),
    };
    aggregator.ingest_reader(input)?;
    let (counts, stats) = aggregator.finalize();

    let rows = build_report(&counts, &options.mode, taxonomy.as_ref());

    Ok(CountResults {
        rows,
        counts,
        stats,
        taxonomy,
    })
}

/// Like [`count_taxon_reads`], then writes the report to `options.output`
/// (stdout if unset). The output is opened before any input is read.
pub fn count_to_output(options: &CountOptions) -> Result<CountResults, TaxCountError> {
    if let Some(path) = &options.output {
        log::info!("Output file: {}", path.display());
    }
    let output = open_output(options.output.as_ref())?;
    let results = count_taxon_reads(options)?;
    results.write_report(output)?;
    Ok(results)
}
