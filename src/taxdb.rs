//src/taxdb.rs

use std::io::BufRead;
use std::path::Path;

use ahash::{AHashMap, AHashSet};

use crate::error::TaxCountError;
use crate::reader::open_lines;
use crate::types::{NodeKind, TaxonId, TaxonNode, UNKNOWN_NAME};

pub type NodeMap = AHashMap<TaxonId, TaxonNode>;
pub type NameMap = AHashMap<TaxonId, String>;

/// Name class retained from `names.dmp`.
pub const SCIENTIFIC_NAME: &str = "scientific name";

/// The taxonomic tree plus display names, built once from `nodes.dmp` and
/// `names.dmp` and read-only afterwards.
#[derive(Debug)]
pub struct Taxonomy {
    nodes: NodeMap,
    names: NameMap,
}

/// Splits an NCBI dump row (`1\t|\t1\t|\tno rank\t|`) into trimmed fields.
/// Rows without any `|` are treated as plain tab-separated.
fn dmp_fields(line: &str) -> Vec<&str> {
    let line = line.trim_end_matches(['\n', '\r']);
    let mut fields: Vec<&str> = if line.contains('|') {
        line.split('|').map(str::trim).collect()
    } else {
        line.split('\t').map(str::trim).collect()
    };
    // the closing `\t|` leaves one empty field behind
    if fields.last() == Some(&"") {
        fields.pop();
    }
    fields
}

/// Parses a `nodes.dmp` table:
/// ```text
/// <taxid>\t|\t<parentid>\t|\t<rank>\t|\t...
/// ```
/// Rows with a malformed id or parent are skipped with a warning.
pub fn parse_nodes<R: BufRead>(reader: R) -> std::io::Result<NodeMap> {
    let mut nodes = NodeMap::new();

    for (line_no, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }
        let parts = dmp_fields(&line);
        if parts.len() < 3 {
            log::warn!("nodes table line {}: expected at least 3 fields, skipping", line_no + 1);
            continue;
        }

        let taxid: TaxonId = match parts[0].parse() {
            Ok(id) => id,
            Err(_) => {
                log::warn!("nodes table line {}: bad taxon id {:?}, skipping", line_no + 1, parts[0]);
                continue;
            }
        };
        let parentid: TaxonId = match parts[1].parse() {
            Ok(id) => id,
            Err(_) => {
                log::warn!("nodes table line {}: bad parent id {:?}, skipping", line_no + 1, parts[1]);
                continue;
            }
        };

        let kind = if taxid == parentid {
            NodeKind::Root
        } else {
            NodeKind::Child(parentid)
        };
        nodes.insert(
            taxid,
            TaxonNode {
                kind,
                rank: parts[2].to_string(),
            },
        );
    }
    Ok(nodes)
}

/// Parses a `names.dmp` table:
/// ```text
/// <taxid>\t|\t<name>\t|\t<unique name>\t|\t<name class>\t|
/// ```
/// Only `scientific name` rows are kept; a later row for the same id replaces
/// an earlier one.
pub fn parse_names<R: BufRead>(reader: R) -> std::io::Result<NameMap> {
    let mut names = NameMap::new();

    for (line_no, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }
        let parts = dmp_fields(&line);
        if parts.len() < 4 {
            log::warn!("names table line {}: expected 4 fields, skipping", line_no + 1);
            continue;
        }
        if parts[3] != SCIENTIFIC_NAME {
            continue;
        }

        match parts[0].parse::<TaxonId>() {
            Ok(taxid) => {
                names.insert(taxid, parts[1].to_string());
            }
            Err(_) => {
                log::warn!("names table line {}: bad taxon id {:?}, skipping", line_no + 1, parts[0]);
            }
        }
    }
    Ok(names)
}

impl Taxonomy {
    /// Builds the taxonomy from already opened tables. `origin` names the
    /// inputs in error messages.
    pub fn from_readers<N: BufRead, M: BufRead>(
        nodes_reader: N,
        names_reader: M,
        origin: (&str, &str),
    ) -> Result<Self, TaxCountError> {
        let nodes = parse_nodes(nodes_reader)?;
        if nodes.is_empty() {
            return Err(TaxCountError::EmptyTable {
                table: "nodes",
                origin: origin.0.to_string(),
            });
        }
        log::debug!("Parsed {} nodes from {}", nodes.len(), origin.0);

        let names = parse_names(names_reader)?;
        if names.is_empty() {
            return Err(TaxCountError::EmptyTable {
                table: "names",
                origin: origin.1.to_string(),
            });
        }
        log::debug!("Parsed {} scientific names from {}", names.len(), origin.1);

        let taxonomy = Self { nodes, names };
        let dangling = taxonomy.dangling_nodes();
        if !dangling.is_empty() {
            log::warn!(
                "{} taxa in {} do not lead to a root node; their lineages will be cut short",
                dangling.len(),
                origin.0
            );
        }
        Ok(taxonomy)
    }

    /// Builds the taxonomy from `nodes.dmp` and `names.dmp` (optionally gzipped).
    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(
        nodes_path: P,
        names_path: Q,
    ) -> Result<Self, TaxCountError> {
        let nodes_path = nodes_path.as_ref();
        let names_path = names_path.as_ref();

        log::info!("Reading taxonomic tree from file {}", nodes_path.display());
        let nodes_reader = open_lines(nodes_path)?;
        log::info!("Reading taxon names from file {}", names_path.display());
        let names_reader = open_lines(names_path)?;

        Self::from_readers(
            nodes_reader,
            names_reader,
            (
                &nodes_path.display().to_string(),
                &names_path.display().to_string(),
            ),
        )
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `taxid` is in the node table.
    pub fn contains(&self, taxid: TaxonId) -> bool {
        self.nodes.contains_key(&taxid)
    }

    /// Whether `taxid` has a scientific name.
    pub fn has_name(&self, taxid: TaxonId) -> bool {
        self.names.contains_key(&taxid)
    }

    pub fn node_kind(&self, taxid: TaxonId) -> Option<NodeKind> {
        self.nodes.get(&taxid).map(|node| node.kind)
    }

    /// Parent of `taxid`; the root is its own parent.
    pub fn parent_of(&self, taxid: TaxonId) -> Option<TaxonId> {
        self.node_kind(taxid).map(|kind| match kind {
            NodeKind::Root => taxid,
            NodeKind::Child(parent) => parent,
        })
    }

    pub fn rank_of(&self, taxid: TaxonId) -> Option<&str> {
        self.nodes.get(&taxid).map(|node| node.rank.as_str())
    }

    /// Scientific name of `taxid`, or `"Unknown"`.
    pub fn name_of(&self, taxid: TaxonId) -> &str {
        self.names
            .get(&taxid)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_NAME)
    }

    /// Nodes whose parent chain ends at a missing parent or runs in a cycle
    /// instead of reaching a root. Sorted by id.
    pub fn dangling_nodes(&self) -> Vec<TaxonId> {
        // taxid -> reaches a root
        let mut resolved: AHashMap<TaxonId, bool> = AHashMap::with_capacity(self.nodes.len());

        for &start in self.nodes.keys() {
            if resolved.contains_key(&start) {
                continue;
            }
            let mut path = Vec::new();
            let mut on_path = AHashSet::new();
            let mut current = start;

            let reaches_root = loop {
                if let Some(&known) = resolved.get(&current) {
                    break known;
                }
                if !on_path.insert(current) {
                    break false; // cycle
                }
                path.push(current);
                match self.node_kind(current) {
                    Some(NodeKind::Root) => break true,
                    Some(NodeKind::Child(parent)) if self.contains(parent) => current = parent,
                    _ => break false,
                }
            };

            for taxid in path {
                resolved.insert(taxid, reaches_root);
            }
        }

        let mut dangling: Vec<TaxonId> = resolved
            .into_iter()
            .filter_map(|(taxid, ok)| (!ok).then_some(taxid))
            .collect();
        dangling.sort_unstable();
        dangling
    }
}
