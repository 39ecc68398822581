// src/record.rs
//! The graph store record: one node per line, tab/comma delimited.
//!
//! Encoding: `<id>\t<rank>\t<neighbor1>,<neighbor2>,...` with an empty
//! neighbor field for a dangling node. Ranks use shortest round-trip
//! notation with a decimal point, so decoding an encoded record is exact.

use crate::error::{RankError, Result};
use std::path::Path;

/// Rank assigned to every node at extraction time, regardless of in-degree.
pub const INITIAL_RANK: f64 = 1.0;

/// One node of the link graph: identity, current rank and the outgoing
/// neighbor list. Neighbors are fixed at extraction and carried forward
/// verbatim through every propagation round.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub rank: f64,
    pub neighbors: Vec<String>,
}

impl GraphNode {
    /// Creates a node with the seed rank.
    #[must_use]
    pub fn seeded(id: String, neighbors: Vec<String>) -> Self {
        Self {
            id,
            rank: INITIAL_RANK,
            neighbors,
        }
    }

    /// Returns true if the node has no outgoing edges.
    #[must_use]
    pub fn is_dangling(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Encodes the node as one store line, without a trailing newline.
    #[must_use]
    pub fn encode(&self) -> String {
        format!(
            "{}\t{}\t{}",
            self.id,
            format_rank(self.rank),
            self.neighbors.join(",")
        )
    }

    /// Decodes one store line.
    ///
    /// # Errors
    ///
    /// Returns `RankError::MalformedRecord` if the line does not have three
    /// tab-separated fields or the rank does not parse.
    pub fn decode(line: &str, path: &Path, line_no: usize) -> Result<Self> {
        let malformed = |reason: String| RankError::MalformedRecord {
            path: path.to_path_buf(),
            line: line_no,
            reason,
        };

        let mut fields = line.splitn(3, '\t');
        let id = fields
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| malformed("empty node id".into()))?;
        let rank_field = fields
            .next()
            .ok_or_else(|| malformed("missing rank field".into()))?;
        let neighbor_field = fields
            .next()
            .ok_or_else(|| malformed("missing neighbor field".into()))?;

        let rank: f64 = rank_field
            .parse()
            .map_err(|_| malformed(format!("unparsable rank '{rank_field}'")))?;

        let neighbors = if neighbor_field.is_empty() {
            Vec::new()
        } else {
            neighbor_field.split(',').map(str::to_string).collect()
        };

        Ok(Self {
            id: id.to_string(),
            rank,
            neighbors,
        })
    }
}

/// Formats a rank with a guaranteed decimal point (`1.0`, not `1`).
#[must_use]
pub fn format_rank(rank: f64) -> String {
    format!("{rank:?}")
}

/// Encodes a full generation as newline-terminated store lines.
#[must_use]
pub fn encode_records(nodes: &[GraphNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        out.push_str(&node.encode());
        out.push('\n');
    }
    out
}

/// Reads a full generation from a store file.
///
/// Any malformed line fails the whole read: a generation is either consumed
/// completely or not at all.
///
/// # Errors
///
/// Returns an I/O error for an unreadable file and `MalformedRecord` for an
/// undecodable line.
pub fn read_records(path: &Path) -> Result<Vec<GraphNode>> {
    let content = std::fs::read_to_string(path).map_err(|e| RankError::io(e, path))?;
    content
        .lines()
        .enumerate()
        .map(|(i, line)| GraphNode::decode(line, path, i + 1))
        .collect()
}
