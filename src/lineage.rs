//src/lineage.rs

use std::collections::VecDeque;

use crate::error::TaxCountError;
use crate::taxdb::Taxonomy;
use crate::types::{NodeKind, TaxonId, MISSING_RANK, NO_RANK};

/// Separator written after every lineage element, the last one included.
pub const LINEAGE_SEPARATOR: &str = "; ";

/// Ordered set of ranks that a filtered lineage reports, one column each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankFilter {
    ranks: Vec<String>,
}

impl RankFilter {
    /// Builds a filter from rank labels in output order. Empty, duplicate and
    /// `no rank` labels are rejected.
    pub fn new<I, S>(ranks: I) -> Result<Self, TaxCountError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = Vec::new();
        for rank in ranks {
            let rank: String = rank.into();
            let rank = rank.trim().to_string();
            if rank.is_empty() {
                return Err(TaxCountError::InvalidRankFilter("empty rank name".to_string()));
            }
            if rank == NO_RANK {
                return Err(TaxCountError::InvalidRankFilter(format!("'{NO_RANK}' cannot be selected")));
            }
            if seen.contains(&rank) {
                return Err(TaxCountError::InvalidRankFilter(format!("rank '{rank}' listed twice")));
            }
            seen.push(rank);
        }
        if seen.is_empty() {
            return Err(TaxCountError::InvalidRankFilter("no ranks given".to_string()));
        }
        Ok(Self { ranks: seen })
    }

    /// Parses a comma-separated list such as `phylum,class,order`.
    pub fn parse(list: &str) -> Result<Self, TaxCountError> {
        Self::new(list.split(','))
    }

    pub fn ranks(&self) -> &[String] {
        &self.ranks
    }

    /// Output column of `rank`, if it is selected.
    pub fn position(&self, rank: &str) -> Option<usize> {
        self.ranks.iter().position(|r| r == rank)
    }
}

/// What a lineage lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineageMode {
    /// Every node from the root down to the taxon.
    FullPath,
    /// One entry per selected rank, `NA` where the path has no such rank.
    Ranks(RankFilter),
}

/// Walks from `taxid` up to the root and returns the lineage names.
///
/// Full paths are ordered root first. Rank-filtered lineages follow the
/// filter's order; if several nodes on the path share a rank, the one nearest
/// the root wins. The walk stops at the root, at a parent missing from the
/// taxonomy, or after visiting as many nodes as the taxonomy holds. An id that
/// is not in the taxonomy gives an empty full path (callers check presence
/// first).
pub fn resolve(taxonomy: &Taxonomy, taxid: TaxonId, mode: &LineageMode) -> Vec<String> {
    let mut path: VecDeque<String> = VecDeque::new();
    let mut slots: Vec<String> = match mode {
        LineageMode::FullPath => Vec::new(),
        LineageMode::Ranks(filter) => vec![MISSING_RANK.to_string(); filter.ranks().len()],
    };

    let mut current = taxid;
    let mut steps = 0usize;
    while let Some(kind) = taxonomy.node_kind(current) {
        match mode {
            LineageMode::FullPath => path.push_front(taxonomy.name_of(current).to_string()),
            LineageMode::Ranks(filter) => {
                let slot = taxonomy
                    .rank_of(current)
                    .filter(|rank| *rank != NO_RANK)
                    .and_then(|rank| filter.position(rank));
                if let Some(slot) = slot {
                    slots[slot] = taxonomy.name_of(current).to_string();
                }
            }
        }

        let parent = match kind {
            NodeKind::Root => break,
            NodeKind::Child(parent) => parent,
        };

        steps += 1;
        if steps >= taxonomy.len() {
            log::warn!("Lineage of taxon {taxid} does not reach the root within {steps} steps, cut short");
            break;
        }
        current = parent;
    }

    match mode {
        LineageMode::FullPath => path.into(),
        LineageMode::Ranks(_) => slots,
    }
}

/// Joins lineage names, each followed by `"; "`.
pub fn format_lineage<S: AsRef<str>>(names: &[S]) -> String {
    let mut text = String::new();
    for name in names {
        text.push_str(name.as_ref());
        text.push_str(LINEAGE_SEPARATOR);
    }
    text
}

/// [`resolve`] followed by [`format_lineage`].
pub fn lineage_text(taxonomy: &Taxonomy, taxid: TaxonId, mode: &LineageMode) -> String {
    format_lineage(&resolve(taxonomy, taxid, mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxdb::tests::{taxonomy, NAMES, NODES};

    fn ranks(list: &str) -> LineageMode {
        LineageMode::Ranks(RankFilter::parse(list).unwrap())
    }

    #[test]
    fn test_full_path_root_first() {
        let tax = taxonomy(NODES, NAMES);
        assert_eq!(resolve(&tax, 3, &LineageMode::FullPath), vec!["root", "Bacteria", "E. coli"]);
        assert_eq!(lineage_text(&tax, 3, &LineageMode::FullPath), "root; Bacteria; E. coli; ");
        assert_eq!(lineage_text(&tax, 2, &LineageMode::FullPath), "root; Bacteria; ");
        assert_eq!(lineage_text(&tax, 1, &LineageMode::FullPath), "root; ");
    }

    #[test]
    fn test_leaf_mid_root() {
        let tax = taxonomy(
            "1\t|\t1\t|\tno rank\t|\n5\t|\t1\t|\tgenus\t|\n6\t|\t5\t|\tspecies\t|\n",
            "1\t|\troot\t|\t\t|\tscientific name\t|\n5\t|\tmid\t|\t\t|\tscientific name\t|\n6\t|\tleaf\t|\t\t|\tscientific name\t|\n",
        );
        assert_eq!(lineage_text(&tax, 6, &LineageMode::FullPath), "root; mid; leaf; ");
    }

    #[test]
    fn test_rank_filter_missing_rank_is_na() {
        let tax = taxonomy(NODES, NAMES);
        assert_eq!(lineage_text(&tax, 3, &ranks("genus,species")), "NA; E. coli; ");
        assert_eq!(resolve(&tax, 2, &ranks("species,superkingdom")), vec!["NA", "Bacteria"]);
    }

    #[test]
    fn test_rank_filter_follows_filter_order() {
        let tax = taxonomy(NODES, NAMES);
        assert_eq!(lineage_text(&tax, 3, &ranks("species,superkingdom")), "E. coli; Bacteria; ");
        assert_eq!(lineage_text(&tax, 3, &ranks("superkingdom,species")), "Bacteria; E. coli; ");
    }

    #[test]
    fn test_repeated_rank_keeps_rootward_node() {
        let nodes = "1\t|\t1\t|\tno rank\t|\n2\t|\t1\t|\tgenus\t|\n3\t|\t2\t|\tgenus\t|\n4\t|\t3\t|\tspecies\t|\n";
        let names = "1\t|\troot\t|\t\t|\tscientific name\t|\n2\t|\tUpper\t|\t\t|\tscientific name\t|\n\
3\t|\tLower\t|\t\t|\tscientific name\t|\n4\t|\tLeaf\t|\t\t|\tscientific name\t|\n";
        let tax = taxonomy(nodes, names);
        assert_eq!(lineage_text(&tax, 4, &ranks("genus,species")), "Upper; Leaf; ");
    }

    #[test]
    fn test_unknown_name_inside_path() {
        let nodes = format!("{NODES}4\t|\t3\t|\tstrain\t|\n");
        let tax = taxonomy(&nodes, NAMES);
        assert_eq!(lineage_text(&tax, 4, &LineageMode::FullPath), "root; Bacteria; E. coli; Unknown; ");
    }

    #[test]
    fn test_walk_stops_at_missing_parent_and_cycles() {
        let nodes = format!(
            "{NODES}10\t|\t11\t|\tgenus\t|\n11\t|\t10\t|\tfamily\t|\n20\t|\t99\t|\tgenus\t|\n"
        );
        let names = format!(
            "{NAMES}10\t|\tTen\t|\t\t|\tscientific name\t|\n11\t|\tEleven\t|\t\t|\tscientific name\t|\n\
20\t|\tTwenty\t|\t\t|\tscientific name\t|\n"
        );
        let tax = taxonomy(&nodes, &names);
        assert_eq!(lineage_text(&tax, 20, &LineageMode::FullPath), "Twenty; ");

        let cyclic = resolve(&tax, 10, &LineageMode::FullPath);
        assert!(cyclic.len() <= tax.len());
        assert_eq!(cyclic.last().map(String::as_str), Some("Ten"));
    }

    #[test]
    fn test_absent_taxon() {
        let tax = taxonomy(NODES, NAMES);
        assert!(resolve(&tax, 77, &LineageMode::FullPath).is_empty());
        assert_eq!(lineage_text(&tax, 77, &ranks("species")), "NA; ");
    }

    #[test]
    fn test_rank_filter_validation() {
        assert!(RankFilter::parse("genus,species").is_ok());
        assert_eq!(RankFilter::parse(" genus , species ").unwrap().ranks(), ["genus", "species"]);
        assert!(RankFilter::parse("genus,genus").is_err());
        assert!(RankFilter::parse("genus,,species").is_err());
        assert!(RankFilter::parse("no rank").is_err());
        assert!(RankFilter::new(Vec::<String>::new()).is_err());
    }
}
