// src/finalize.rs
//! Final projection and sort: adjacency is discarded, ranks are ordered.

use crate::config::SortOrder;
use crate::record::{format_rank, GraphNode};
use std::cmp::Ordering;

/// A single line of the final ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPage {
    pub rank: f64,
    pub id: String,
}

/// Projects each node to `(rank, id)` and sorts by rank in the configured
/// direction, ties broken by ascending id. No aggregation happens here;
/// this is a pure projection plus a total-order sort.
#[must_use]
pub fn finalize(nodes: &[GraphNode], order: SortOrder) -> Vec<RankedPage> {
    let mut ranking: Vec<RankedPage> = nodes
        .iter()
        .map(|node| RankedPage {
            rank: node.rank,
            id: node.id.clone(),
        })
        .collect();

    ranking.sort_by(|a, b| {
        let by_rank = match order {
            SortOrder::Ascending => a.rank.total_cmp(&b.rank),
            SortOrder::Descending => b.rank.total_cmp(&a.rank),
        };
        match by_rank {
            Ordering::Equal => a.id.cmp(&b.id),
            other => other,
        }
    });
    ranking
}

/// Encodes the ranking as newline-terminated `<rank>\t<id>` lines.
#[must_use]
pub fn encode_ranking(ranking: &[RankedPage]) -> String {
    let mut out = String::new();
    for page in ranking {
        out.push_str(&format_rank(page.rank));
        out.push('\t');
        out.push_str(&page.id);
        out.push('\n');
    }
    out
}
