//src/counts.rs

use std::io::BufRead;

use ahash::AHashMap;

use crate::fields::TabFields;
use crate::taxdb::Taxonomy;
use crate::types::{TaxonId, UNCLASSIFIED};

pub type TaxonCounts = AHashMap<TaxonId, u64>;

/// What happened to one classifier output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Counted(TaxonId),
    Blank,
    /// Missing or non-numeric taxon id field.
    Malformed,
    /// Unknown taxon id, dropped by strict validation.
    Rejected(TaxonId),
}

/// Line tallies for one aggregation run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub lines: u64,
    pub counted: u64,
    pub blank: u64,
    pub malformed: u64,
    pub rejected: u64,
}

/// Accumulates per-taxon read counts from classifier output lines.
///
/// With a validating taxonomy, nonzero ids that are missing from the node or
/// the name table are rejected instead of counted.
pub struct ReadAggregator<'a> {
    counts: TaxonCounts,
    stats: IngestStats,
    validator: Option<&'a Taxonomy>,
}

impl<'a> ReadAggregator<'a> {
    pub fn new() -> Self {
        Self {
            counts: TaxonCounts::new(),
            stats: IngestStats::default(),
            validator: None,
        }
    }

    /// An aggregator that drops ids unknown to `taxonomy`.
    pub fn strict(taxonomy: &'a Taxonomy) -> Self {
        Self {
            validator: Some(taxonomy),
            ..Self::new()
        }
    }

    pub fn ingest(&mut self, line: &str) -> IngestOutcome {
        self.stats.lines += 1;
        let outcome = self.classify_line(line);
        match outcome {
            IngestOutcome::Counted(taxid) => {
                *self.counts.entry(taxid).or_insert(0) += 1;
                self.stats.counted += 1;
            }
            IngestOutcome::Blank => self.stats.blank += 1,
            IngestOutcome::Malformed => self.stats.malformed += 1,
            IngestOutcome::Rejected(_) => self.stats.rejected += 1,
        }
        outcome
    }

    fn classify_line(&self, line: &str) -> IngestOutcome {
        if line.trim_end_matches(['\n', '\r']).is_empty() {
            return IngestOutcome::Blank;
        }

        let fields = TabFields::split(line);
        let taxid = match fields.taxon_id() {
            Some(taxid) => taxid,
            None => {
                log::warn!("Found bad taxon id in line: {}", line.trim_end());
                return IngestOutcome::Malformed;
            }
        };

        if let Some(taxonomy) = self.validator {
            if taxid != UNCLASSIFIED {
                if !taxonomy.contains(taxid) {
                    log::warn!("Taxon ID {taxid} is not contained in the taxonomic tree, skipping line");
                    return IngestOutcome::Rejected(taxid);
                }
                if !taxonomy.has_name(taxid) {
                    log::warn!("Taxon ID {taxid} has no name in the names table, skipping line");
                    return IngestOutcome::Rejected(taxid);
                }
            }
        }
        IngestOutcome::Counted(taxid)
    }

    /// Reads `reader` to the end, ingesting every line.
    pub fn ingest_reader<R: BufRead>(&mut self, mut reader: R) -> std::io::Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break; // EOF
            }
            self.ingest(&line);
        }
        Ok(())
    }

    /// Ends the stream and hands out the counts, which cannot change anymore.
    pub fn finalize(self) -> (FinalCounts, IngestStats) {
        log::info!(
            "Read {} lines: {} counted, {} malformed, {} rejected, {} blank",
            self.stats.lines,
            self.stats.counted,
            self.stats.malformed,
            self.stats.rejected,
            self.stats.blank
        );
        (FinalCounts { counts: self.counts }, self.stats)
    }
}

impl Default for ReadAggregator<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only per-taxon counts of a finished stream.
#[derive(Debug, Clone, Default)]
pub struct FinalCounts {
    counts: TaxonCounts,
}

impl FinalCounts {
    pub fn get(&self, taxid: TaxonId) -> u64 {
        self.counts.get(&taxid).copied().unwrap_or(0)
    }

    /// Number of distinct taxa.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TaxonId, u64)> + '_ {
        self.counts.iter().map(|(&taxid, &count)| (taxid, count))
    }
}

impl From<TaxonCounts> for FinalCounts {
    fn from(counts: TaxonCounts) -> Self {
        Self { counts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxdb::tests::{taxonomy, NAMES, NODES};
    use std::io::Cursor;

    const STREAM: &str = "\
C\tread1\t3\t50\t120
C\tread2\t3\t48\t118

C\tread3\t2\t33\t90
U\tread4\t0
C\tread5\tabc\t10\t10
C\tread6\t42\t12\t30
C\tread7
C\tread8\t3\t51\t125
";

    #[test]
    fn test_ingest_outcomes() {
        let mut agg = ReadAggregator::new();
        assert_eq!(agg.ingest("C\tr\t562\t4"), IngestOutcome::Counted(562));
        assert_eq!(agg.ingest("C\tr\t562abc"), IngestOutcome::Counted(562));
        assert_eq!(agg.ingest(""), IngestOutcome::Blank);
        assert_eq!(agg.ingest("\n"), IngestOutcome::Blank);
        assert_eq!(agg.ingest("C\tr\tx12"), IngestOutcome::Malformed);
        assert_eq!(agg.ingest("C\tr"), IngestOutcome::Malformed);
        assert_eq!(agg.ingest("C\tr\t"), IngestOutcome::Malformed);

        let (counts, stats) = agg.finalize();
        assert_eq!(counts.get(562), 2);
        assert_eq!(counts.len(), 1);
        assert_eq!(
            stats,
            IngestStats { lines: 7, counted: 2, blank: 2, malformed: 3, rejected: 0 }
        );
    }

    #[test]
    fn test_non_strict_keeps_unknown_ids() {
        let mut agg = ReadAggregator::new();
        agg.ingest_reader(Cursor::new(STREAM)).unwrap();
        let (counts, stats) = agg.finalize();

        assert_eq!(counts.get(3), 3);
        assert_eq!(counts.get(2), 1);
        assert_eq!(counts.get(0), 1);
        assert_eq!(counts.get(42), 1);
        assert_eq!(stats.malformed, 2);
        assert_eq!(stats.blank, 1);
        assert_eq!(counts.total(), stats.counted);
    }

    #[test]
    fn test_strict_rejects_unknown_ids() {
        let tax = taxonomy(NODES, NAMES);
        let mut agg = ReadAggregator::strict(&tax);
        agg.ingest_reader(Cursor::new(STREAM)).unwrap();
        let (counts, stats) = agg.finalize();

        assert_eq!(counts.get(42), 0);
        assert_eq!(counts.get(0), 1, "unclassified reads are never rejected");
        assert_eq!(stats.rejected, 1);
        assert_eq!(counts.total(), 5);
    }

    #[test]
    fn test_strict_rejects_ids_without_name() {
        let nodes = format!("{NODES}4\t|\t3\t|\tstrain\t|\n");
        let tax = taxonomy(&nodes, NAMES);
        let mut agg = ReadAggregator::strict(&tax);
        assert_eq!(agg.ingest("C\tr\t4\t1\t1"), IngestOutcome::Rejected(4));
        assert_eq!(agg.ingest("C\tr\t3\t1\t1"), IngestOutcome::Counted(3));
    }

    #[test]
    fn test_aggregation_is_repeatable() {
        let run = || {
            let mut agg = ReadAggregator::default();
            agg.ingest_reader(Cursor::new(STREAM)).unwrap();
            let mut pairs: Vec<_> = agg.finalize().0.iter().collect();
            pairs.sort_unstable();
            pairs
        };
        assert_eq!(run(), run());
    }
}
