//src/report.rs

use std::cmp::Reverse;
use std::io::{self, Write};

use crate::counts::FinalCounts;
use crate::lineage::{lineage_text, LineageMode};
use crate::taxdb::Taxonomy;
use crate::types::{CountRow, TaxonId, UNKNOWN_NAME};

/// The optional label column of the count report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportMode {
    /// `taxID  count`
    CountsOnly,
    /// `taxID  name  count`
    Names,
    /// `taxID  lineage  count`
    Lineage(LineageMode),
}

impl ReportMode {
    pub fn needs_taxonomy(&self) -> bool {
        !matches!(self, ReportMode::CountsOnly)
    }
}

/// Label of one row. Ids missing from the node table or the name table are
/// labelled `Unknown`.
fn row_label(taxid: TaxonId, mode: &ReportMode, taxonomy: Option<&Taxonomy>) -> Option<String> {
    match mode {
        ReportMode::CountsOnly => None,
        ReportMode::Names => Some(match taxonomy {
            Some(tax) if tax.contains(taxid) && tax.has_name(taxid) => tax.name_of(taxid).to_string(),
            _ => UNKNOWN_NAME.to_string(),
        }),
        ReportMode::Lineage(lineage_mode) => Some(match taxonomy {
            Some(tax) if tax.contains(taxid) && tax.has_name(taxid) => {
                lineage_text(tax, taxid, lineage_mode)
            }
            _ => UNKNOWN_NAME.to_string(),
        }),
    }
}

/// Builds report rows ordered by count (highest first), ties by ascending id.
pub fn build_report(
    counts: &FinalCounts,
    mode: &ReportMode,
    taxonomy: Option<&Taxonomy>,
) -> Vec<CountRow> {
    let mut sorted: Vec<(TaxonId, u64)> = counts.iter().collect();
    sorted.sort_unstable_by_key(|&(taxid, count)| (Reverse(count), taxid));

    sorted
        .into_iter()
        .map(|(tax_id, count)| CountRow {
            tax_id,
            label: row_label(tax_id, mode, taxonomy),
            count,
        })
        .collect()
}

fn format_row(row: &CountRow) -> String {
    match &row.label {
        Some(label) => format!("{}\t{}\t{}\n", row.tax_id, label, row.count),
        None => format!("{}\t{}\n", row.tax_id, row.count),
    }
}

/// Writes one tab-separated line per row, no header.
pub fn write_report<W: Write>(rows: &[CountRow], mut writer: W) -> io::Result<()> {
    for row in rows {
        writer.write_all(format_row(row).as_bytes())?;
    }
    writer.flush()
}

/// The report as one string.
pub fn render_report(rows: &[CountRow]) -> String {
    let mut output = String::new();
    for row in rows {
        output.push_str(&format_row(row));
    }
    output
}
