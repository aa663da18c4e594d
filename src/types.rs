//src/types.rs

/// Numeric taxon identifier as found in `nodes.dmp` and the classifier output.
pub type TaxonId = u64;

/// Taxon id the classifier uses for reads it could not assign.
pub const UNCLASSIFIED: TaxonId = 0;

/// Rank label marking nodes without a formal taxonomic level.
pub const NO_RANK: &str = "no rank";

/// Label printed for ids missing from the taxonomy tables.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Placeholder for ranks absent from a rank-filtered lineage.
pub const MISSING_RANK: &str = "NA";

/// Position of a node in the tree, resolved once while loading `nodes.dmp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The node lists itself as its parent.
    Root,
    /// Any other node, pointing at its parent.
    Child(TaxonId),
}

/// One loaded taxonomy node.
#[derive(Debug, Clone)]
pub struct TaxonNode {
    pub kind: NodeKind,
    pub rank: String,
}

/// A structured representation of one row in the per-taxon count report.
/// Rendered as:
///  taxID  [name-or-lineage]  count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountRow {
    pub tax_id: TaxonId,
    pub label: Option<String>,
    pub count: u64,
}

/// One line of the Recentrifuge-compatible output.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentrifugeRecord {
    pub read_id: String,
    pub tax_id: TaxonId,
    pub score: u64,
    pub query_length: i64,
}
