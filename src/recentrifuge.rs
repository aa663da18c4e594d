//src/recentrifuge.rs

use std::io::{BufRead, Write};

use crate::error::TaxCountError;
use crate::fields::{parse_decimal_prefix, parse_digit_run, TabFields};
use crate::types::RecentrifugeRecord;

/// Header line of the Recentrifuge input format.
pub const HEADER: &str = "readID\ttaxID\tscore\tqueryLength";

/// Classifier scores and lengths are in amino acids; Recentrifuge wants nucleotides.
const NT_PER_AA: u64 = 3;

/// Field of a classifier line that could not be converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    ClassifiedFlag,
    ReadId,
    TaxonId,
    Score,
    QueryLength,
}

impl RecordError {
    fn describe(self) -> &'static str {
        match self {
            RecordError::ClassifiedFlag => "classified/unclassified indicator",
            RecordError::ReadId => "read id",
            RecordError::TaxonId => "taxon id",
            RecordError::Score => "score",
            RecordError::QueryLength => "query length",
        }
    }
}

/// Converts `C/U  readID  taxID  score  queryLength` into a Recentrifuge record.
/// `Ok(None)` for blank lines.
pub fn convert_line(line: &str) -> Result<Option<RecentrifugeRecord>, RecordError> {
    if line.trim_end_matches(['\n', '\r']).is_empty() {
        return Ok(None);
    }
    let fields = TabFields::split(line);

    fields
        .get(0)
        .filter(|flag| !flag.is_empty())
        .ok_or(RecordError::ClassifiedFlag)?;
    let read_id = fields.get(1).ok_or(RecordError::ReadId)?;
    let tax_id = fields.taxon_id().ok_or(RecordError::TaxonId)?;
    let score = fields
        .get(3)
        .and_then(parse_digit_run)
        .and_then(|raw| raw.checked_mul(NT_PER_AA))
        .ok_or(RecordError::Score)?;
    let query_length = fields
        .get(4)
        .and_then(parse_decimal_prefix)
        .map(|raw| (raw * NT_PER_AA as f64).round())
        .filter(|len| len.is_finite() && len.abs() < i64::MAX as f64)
        .ok_or(RecordError::QueryLength)?;

    Ok(Some(RecentrifugeRecord {
        read_id: read_id.to_string(),
        tax_id,
        score,
        query_length: query_length as i64,
    }))
}

fn format_record(record: &RecentrifugeRecord) -> String {
    format!(
        "{}\t{}\t{}\t{}\n",
        record.read_id, record.tax_id, record.score, record.query_length
    )
}

/// Line tallies for one conversion run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConvertStats {
    pub written: u64,
    pub skipped: u64,
}

/// Converts a whole classifier output stream, header first. Bad lines are
/// skipped with a warning.
pub fn convert_stream<R: BufRead, W: Write>(
    mut reader: R,
    mut writer: W,
) -> Result<ConvertStats, TaxCountError> {
    let mut stats = ConvertStats::default();
    writeln!(writer, "{HEADER}")?;

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break; // EOF
        }
        match convert_line(&line) {
            Ok(Some(record)) => {
                writer.write_all(format_record(&record).as_bytes())?;
                stats.written += 1;
            }
            Ok(None) => {}
            Err(err) => {
                log::warn!("Found bad {} in line: {}", err.describe(), line.trim_end());
                stats.skipped += 1;
            }
        }
    }
    writer.flush()?;

    log::info!("Wrote {} records, skipped {} lines", stats.written, stats.skipped);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn record(read_id: &str, tax_id: u64, score: u64, query_length: i64) -> RecentrifugeRecord {
        RecentrifugeRecord {
            read_id: read_id.to_string(),
            tax_id,
            score,
            query_length,
        }
    }

    #[test]
    fn test_convert_line() {
        assert_eq!(
            convert_line("C\tread_1\t562\t40\t33.5\n"),
            Ok(Some(record("read_1", 562, 120, 101)))
        );
        assert_eq!(
            convert_line("C\tread_2\t1280\t17\t20\tMKV...\n"),
            Ok(Some(record("read_2", 1280, 51, 60)))
        );
        assert_eq!(convert_line("\n"), Ok(None));
    }

    #[test]
    fn test_convert_line_rounds_query_length() {
        assert_eq!(convert_line("C\tr\t1\t1\t0.5").unwrap().unwrap().query_length, 2);
        assert_eq!(convert_line("C\tr\t1\t1\t0.1").unwrap().unwrap().query_length, 0);
    }

    #[test]
    fn test_convert_line_errors() {
        assert_eq!(convert_line("\tr\t1\t1\t1"), Err(RecordError::ClassifiedFlag));
        assert_eq!(convert_line("C"), Err(RecordError::ReadId));
        assert_eq!(convert_line("U\tread_3\t0"), Err(RecordError::Score));
        assert_eq!(convert_line("C\tr\tx\t1\t1"), Err(RecordError::TaxonId));
        assert_eq!(convert_line("C\tr\t1\tx\t1"), Err(RecordError::Score));
        assert_eq!(convert_line("C\tr\t1\t1\tabc"), Err(RecordError::QueryLength));
        assert_eq!(
            convert_line("C\tr\t1\t18446744073709551615\t1"),
            Err(RecordError::Score)
        );
    }

    #[test]
    fn test_convert_stream() {
        let input = "C\tread_1\t562\t40\t33.5\nU\tread_2\t0\n\nC\tread_3\t2\t10\t12\n";
        let mut out = Vec::new();
        let stats = convert_stream(Cursor::new(input), &mut out).unwrap();

        assert_eq!(stats, ConvertStats { written: 2, skipped: 1 });
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "readID\ttaxID\tscore\tqueryLength\nread_1\t562\t120\t101\nread_3\t2\t30\t36\n"
        );
    }
}
