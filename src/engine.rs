// src/engine.rs
//! The rank propagation engine: one full round over the graph.
//!
//! A round fans every node out into keyed emissions, groups them by
//! destination id, and aggregates each group back into the node's next
//! record. Work is partitioned into fixed-size chunks; each worker builds a
//! local group map and the partial maps are merged in partition order, so
//! the result is identical however the chunks are scheduled.

use crate::config::PipelineConfig;
use crate::error::{RankError, Result};
use crate::record::GraphNode;
use rayon::prelude::*;
use std::collections::HashMap;

/// One keyed emission in the grouped stream of a round.
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    /// A share of a source node's rank addressed to one destination.
    Contribution { amount: f64 },
    /// The adjacency passthrough a node emits about itself, carrying the
    /// neighbor list into the next generation.
    Adjacency { neighbors: Vec<String> },
}

/// Per-destination aggregation state.
#[derive(Default)]
struct Accumulator {
    sum: f64,
    neighbors: Option<Vec<String>>,
}

impl Accumulator {
    fn absorb(&mut self, id: &str, emission: Emission) -> Result<()> {
        match emission {
            Emission::Contribution { amount } => self.sum += amount,
            Emission::Adjacency { neighbors } => {
                if self.neighbors.is_some() {
                    return Err(RankError::DuplicateAdjacency { id: id.to_string() });
                }
                self.neighbors = Some(neighbors);
            }
        }
        Ok(())
    }
}

/// Runs one propagation round.
///
/// The output holds exactly the input's node-id set, each node's neighbor
/// list carried forward verbatim and its rank recomputed, sorted by id.
///
/// # Errors
///
/// Returns `MissingAdjacency`/`DuplicateAdjacency` when the grouped stream
/// does not hold exactly one passthrough per known id, the corruption case
/// that fails the whole round.
pub fn propagate_round(nodes: &[GraphNode], config: &PipelineConfig) -> Result<Vec<GraphNode>> {
    let groups = shuffle(nodes, config.chunk_size)?;
    aggregate(nodes, groups, config)
}

/// Emits the keyed records one node produces: one contribution of
/// `rank / degree` per neighbor occurrence, plus the adjacency passthrough.
/// A dangling node emits no contributions; its mass is dropped unless
/// redistribution is enabled at aggregation time.
fn fan_out(node: &GraphNode, emissions: &mut Vec<(String, Emission)>) {
    let degree = node.neighbors.len();
    if degree > 0 {
        let share = node.rank / degree as f64;
        for target in &node.neighbors {
            emissions.push((target.clone(), Emission::Contribution { amount: share }));
        }
    }
    emissions.push((
        node.id.clone(),
        Emission::Adjacency {
            neighbors: node.neighbors.clone(),
        },
    ));
}

/// Groups all emissions by destination id.
///
/// Each chunk of input records is fanned out and pre-aggregated by one
/// worker; the per-chunk maps are then folded together in chunk order.
/// Per-id contribution sums therefore always add up in the same order for a
/// given chunk size, keeping round output byte-reproducible.
fn shuffle(nodes: &[GraphNode], chunk_size: usize) -> Result<HashMap<String, Accumulator>> {
    let partials: Vec<Result<HashMap<String, Accumulator>>> = nodes
        .par_chunks(chunk_size)
        .map(group_chunk)
        .collect();

    let mut merged: HashMap<String, Accumulator> = HashMap::new();
    for partial in partials {
        for (id, acc) in partial? {
            match merged.get_mut(&id) {
                Some(entry) => {
                    entry.sum += acc.sum;
                    if let Some(neighbors) = acc.neighbors {
                        if entry.neighbors.is_some() {
                            return Err(RankError::DuplicateAdjacency { id });
                        }
                        entry.neighbors = Some(neighbors);
                    }
                }
                None => {
                    merged.insert(id, acc);
                }
            }
        }
    }
    Ok(merged)
}

fn group_chunk(chunk: &[GraphNode]) -> Result<HashMap<String, Accumulator>> {
    let mut groups: HashMap<String, Accumulator> = HashMap::new();
    let mut emissions = Vec::new();
    for node in chunk {
        fan_out(node, &mut emissions);
        for (id, emission) in emissions.drain(..) {
            groups.entry(id.clone()).or_default().absorb(&id, emission)?;
        }
    }
    Ok(groups)
}

/// Recombines each known node's grouped emissions into its next record.
fn aggregate(
    nodes: &[GraphNode],
    mut groups: HashMap<String, Accumulator>,
    config: &PipelineConfig,
) -> Result<Vec<GraphNode>> {
    let n = nodes.len() as f64;

    // Mass parked on dangling nodes flows nowhere; optionally spread it
    // uniformly instead of dropping it.
    let dangling_share = if config.redistribute_dangling && !nodes.is_empty() {
        let dangling_mass: f64 = nodes
            .iter()
            .filter(|node| node.is_dangling())
            .map(|node| node.rank)
            .sum();
        dangling_mass / n
    } else {
        0.0
    };

    let mut next = Vec::with_capacity(nodes.len());
    for node in nodes {
        let acc = groups
            .remove(&node.id)
            .ok_or_else(|| RankError::MissingAdjacency {
                id: node.id.clone(),
            })?;
        let neighbors = acc.neighbors.ok_or_else(|| RankError::MissingAdjacency {
            id: node.id.clone(),
        })?;

        let sum = acc.sum + dangling_share;
        let rank = match config.damping {
            Some(d) => (1.0 - d) / n + d * sum,
            None => sum,
        };

        next.push(GraphNode {
            id: node.id.clone(),
            rank,
            neighbors,
        });
    }

    // Groups still left are link targets outside the node set; their mass is
    // dropped and the node-id set stays stable across rounds.
    next.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(next)
}

/// Largest absolute per-node rank change between two generations.
///
/// Both slices must be sorted by id, as produced by the engine.
#[must_use]
pub fn max_delta(prev: &[GraphNode], next: &[GraphNode]) -> f64 {
    prev.iter()
        .zip(next)
        .map(|(a, b)| (a.rank - b.rank).abs())
        .fold(0.0, f64::max)
}
