/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::index::LinkIndex;
use super::{Params, RankComputer, RankError, RankResult};
use crate::graph::{Graph, NodeId};
use dsi_progress_logger::{no_logging, ProgressLog};
use kahan::KahanSum;
use std::collections::HashSet;

/// Computes PageRank in the current thread.
///
/// This strategy is the reference for
/// [`ParallelRankComputer`](super::ParallelRankComputer): it computes the same
/// recurrence on a single range containing all nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialRankComputer;

impl SequentialRankComputer {
    /// Computes PageRank, logging progress on `pl`.
    ///
    /// See [`RankComputer::compute`].
    pub fn compute_with_logging(
        &self,
        graph: &Graph,
        alpha: f64,
        iterations: usize,
        tolerance: f64,
        pl: &mut impl ProgressLog,
    ) -> Result<RankResult, RankError> {
        let params = Params::new(alpha, iterations, tolerance)?;
        let n = graph.size();
        if n == 0 {
            return Ok(RankResult::default());
        }
        params.log(graph);

        let nodes = graph.nodes();
        let generator = graph.generator();

        pl.info(format_args!("Assigning identifiers..."));
        let ids: Vec<NodeId> = nodes
            .iter()
            .map(|node| generator.generate_id(node.content()))
            .collect();

        let distinct = ids.iter().collect::<HashSet<_>>().len();
        if distinct != n {
            log::warn!("{} node(s) share their identifier with another node", n - distinct);
            return Err(RankError::SizeMismatch {
                expected: n,
                got: distinct,
            });
        }

        pl.info(format_args!("Building the reversed-edge index..."));
        let index = LinkIndex::build(graph);
        let in_links: Vec<&[usize]> = ids.iter().map(|id| index.in_links(id)).collect();
        let inv_outdegrees = index.inv_outdegrees();

        let inv_n = 1.0 / n as f64;
        let mut previous = vec![inv_n; n];
        let mut current = vec![inv_n; n];
        let mut residual = f64::INFINITY;

        pl.item_name("iteration");
        pl.expected_updates(Some(iterations));
        pl.start(format!("Computing PageRank (alpha={})...", alpha));

        for iteration in 0..iterations {
            let mut dangling_rank = KahanSum::<f64>::new();
            for (node, &rank) in nodes.iter().zip(&previous) {
                if node.is_dangling() {
                    dangling_rank += rank;
                }
            }
            let uniform = params.uniform_term(dangling_rank.sum(), inv_n);

            let mut delta = KahanSum::<f64>::new();
            for (p, preds) in in_links.iter().enumerate() {
                let mut sigma = KahanSum::<f64>::new();
                for &q in *preds {
                    sigma += previous[q] * inv_outdegrees[q];
                }
                let rank = uniform + alpha * sigma.sum();
                delta += (rank - previous[p]).abs();
                current[p] = rank;
            }
            residual = delta.sum();

            log::debug!("Iteration {}: residual = {}", iteration + 1, residual);
            pl.update();

            if residual < tolerance {
                pl.done();
                log::info!(
                    "Converged after {} iteration(s), residual = {}",
                    iteration + 1,
                    residual
                );
                return RankResult::assemble(ids.into_iter().zip(current), n);
            }
            previous.copy_from_slice(&current);
        }

        pl.done();
        log::warn!(
            "No convergence after {} iteration(s), residual = {}",
            iterations,
            residual
        );
        Err(RankError::NotConverged {
            iterations,
            residual,
        })
    }
}

impl RankComputer for SequentialRankComputer {
    fn compute(
        &self,
        graph: &Graph,
        alpha: f64,
        iterations: usize,
        tolerance: f64,
    ) -> Result<RankResult, RankError> {
        self.compute_with_logging(graph, alpha, iterations, tolerance, no_logging![])
    }

    fn name(&self) -> String {
        "SequentialRankComputer".to_string()
    }
}
