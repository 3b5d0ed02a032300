/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! PageRank by power iteration.
//!
//! # The recurrence
//!
//! Given a graph with *n* nodes and a damping factor α, every node starts
//! with rank 1/*n*. At each round, if *D* is the rank of the dangling nodes
//! (nodes without successors) in the previous round, the new rank of node *p*
//! is
//!
//! > α *D* / *n*  +  (1 − α) / *n*  +  α ∑_(*q* → *p*) *rₚ*(*q*) / *d*⁺(*q*),
//!
//! where *rₚ* is the previous rank and *d*⁺ the outdegree. The computation
//! stops as soon as the _residual_, that is, the ℓ₁ norm of the difference
//! between two successive rank vectors, is smaller than a given tolerance. If
//! this does not happen within the given number of iterations, the
//! computation fails with [`RankError::NotConverged`]: no partial result is
//! ever returned.
//!
//! # Strategies
//!
//! The [`RankComputer`] trait is implemented by a
//! [sequential](SequentialRankComputer) and by a
//! [parallel](ParallelRankComputer) strategy. The two strategies compute the
//! same recurrence, and they differ only in the order in which floating-point
//! sums are performed.

use crate::graph::{Graph, NodeId};
use kahan::KahanSum;
use std::collections::hash_map::{self, HashMap};
use thiserror::Error;

mod engine;
mod index;

mod parallel;
pub use parallel::ParallelRankComputer;

mod sequential;
pub use sequential::SequentialRankComputer;

/// Errors of a PageRank computation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RankError {
    #[error("The damping factor must be in (0 . . 1), got {0}")]
    InvalidAlpha(f64),
    #[error("The number of iterations must be positive")]
    NoIterations,
    #[error("The tolerance must be a nonnegative number, got {0}")]
    InvalidTolerance(f64),
    #[error("Not able to find result in iterations={iterations} (last residual: {residual})")]
    NotConverged { iterations: usize, residual: f64 },
    #[error("Invalid result size={got}, for a graph with {expected} nodes")]
    SizeMismatch { expected: usize, got: usize },
}

/// A strategy computing PageRank.
pub trait RankComputer {
    /// Computes the PageRank of `graph` with damping factor `alpha`,
    /// performing at most `iterations` rounds and stopping at the first round
    /// whose residual is smaller than `tolerance`.
    fn compute(
        &self,
        graph: &Graph,
        alpha: f64,
        iterations: usize,
        tolerance: f64,
    ) -> Result<RankResult, RankError>;

    /// Returns a descriptive name for the strategy.
    fn name(&self) -> String;
}

/// Validated parameters of a computation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Params {
    pub(crate) alpha: f64,
    pub(crate) iterations: usize,
    pub(crate) tolerance: f64,
}

impl Params {
    pub(crate) fn new(alpha: f64, iterations: usize, tolerance: f64) -> Result<Self, RankError> {
        // Negated comparisons reject NaNs, too
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(RankError::InvalidAlpha(alpha));
        }
        if iterations == 0 {
            return Err(RankError::NoIterations);
        }
        if !(tolerance >= 0.0) {
            return Err(RankError::InvalidTolerance(tolerance));
        }
        Ok(Self {
            alpha,
            iterations,
            tolerance,
        })
    }

    /// Returns the part of the rank that every node receives in a round,
    /// given the rank of dangling nodes in the previous round.
    #[inline(always)]
    pub(crate) fn uniform_term(&self, dangling_rank: f64, inv_n: f64) -> f64 {
        self.alpha * dangling_rank * inv_n + (1.0 - self.alpha) * inv_n
    }

    pub(crate) fn log(&self, graph: &Graph) {
        log::info!("Alpha: {}", self.alpha);
        log::info!("Iterations: {}", self.iterations);
        log::info!("Tolerance: {}", self.tolerance);
        log::info!(
            "Graph: {} nodes, {} arcs, {} dangling nodes",
            graph.size(),
            graph.num_arcs(),
            graph.num_dangling()
        );
    }
}

/// The result of a PageRank computation: a map from node identifiers to
/// ranks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankResult {
    ranks: HashMap<NodeId, f64>,
}

impl RankResult {
    /// Builds a result from identifier/rank pairs, checking that no
    /// identifier is repeated, and that the result has the expected size.
    pub(crate) fn assemble(
        pairs: impl IntoIterator<Item = (NodeId, f64)>,
        expected: usize,
    ) -> Result<Self, RankError> {
        let ranks = HashMap::from_iter(pairs);
        if ranks.len() != expected {
            return Err(RankError::SizeMismatch {
                expected,
                got: ranks.len(),
            });
        }
        Ok(Self { ranks })
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Returns the rank of the node with the given identifier.
    pub fn get(&self, id: &str) -> Option<f64> {
        self.ranks.get(id).copied()
    }

    /// Iterates over identifier/rank pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, f64)> + '_ {
        self.ranks.iter().map(|(id, &rank)| (id, rank))
    }

    /// Returns the sum of all ranks.
    pub fn sum(&self) -> f64 {
        self.ranks
            .values()
            .fold(KahanSum::<f64>::new(), |sum, &rank| sum + rank)
            .sum()
    }

    /// Returns identifier/rank pairs by decreasing rank; ties are broken by
    /// identifier.
    pub fn into_sorted_vec(self) -> Vec<(NodeId, f64)> {
        let mut pairs = Vec::from_iter(self.ranks);
        pairs.sort_by(|(id0, rank0), (id1, rank1)| rank1.total_cmp(rank0).then(id0.cmp(id1)));
        pairs
    }
}

impl IntoIterator for RankResult {
    type Item = (NodeId, f64);
    type IntoIter = hash_map::IntoIter<NodeId, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranks.into_iter()
    }
}
