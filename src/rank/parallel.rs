/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::engine::{RankIterationEngine, Shared, WorkerOutcome};
use super::index::LinkIndex;
use super::{Params, RankComputer, RankError, RankResult};
use crate::graph::Graph;
use crate::utils::{partition, ReductionBarrier};
use dsi_progress_logger::{no_logging, ProgressLog};
use std::collections::HashSet;
use std::sync::{Mutex, RwLock};
use sync_cell_slice::SyncSlice;

/// Computes PageRank using a fixed number of worker threads.
///
/// Nodes are [partitioned](crate::utils::partition) into as many contiguous
/// ranges as there are workers, and each worker updates the ranks of its
/// range. Workers synchronize on a [`ReductionBarrier`], which also computes,
/// at each round, the global dangling rank and the global residual. The
/// threads are created at the start of each computation and joined at its
/// end; no more threads than nodes are created.
///
/// Threads are spawned one at a time, and a worker starts waiting on the
/// barrier as soon as it is spawned: if the operating system refuses to
/// create a thread, the computation blocks forever, as the workers already
/// spawned can never cross the barrier.
///
/// Results are the same as those of
/// [`SequentialRankComputer`](super::SequentialRankComputer), up to the order
/// of floating-point sums.
///
/// # Examples
///
/// ```
/// use pagerank_barrier::prelude::*;
///
/// let mut graph = Graph::new(Sha256IdGenerator);
/// graph.push_with_targets("a", ["b"]);
/// graph.push_with_targets("b", ["a", "c"]);
/// graph.push(Node::new("c", vec![]));
///
/// let computer = ParallelRankComputer::new(3);
/// assert_eq!(computer.name(), "ParallelRankComputer[3]");
/// let ranks = computer.compute(&graph, 0.85, 100, 1E-12)?;
/// assert_eq!(ranks.len(), 3);
/// assert!((ranks.sum() - 1.0).abs() < 1E-9);
/// # Ok::<(), RankError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ParallelRankComputer {
    num_workers: usize,
}

impl Default for ParallelRankComputer {
    /// Returns a computer using as many workers as there are CPUs.
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

impl ParallelRankComputer {
    /// Creates a computer using `num_workers` workers.
    ///
    /// # Panics
    ///
    /// Panics if `num_workers` is zero.
    pub fn new(num_workers: usize) -> Self {
        assert_ne!(num_workers, 0, "At least one worker is needed");
        Self { num_workers }
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

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
        // Parameters must be checked before starting the workers, as no
        // worker may leave early.
        let params = Params::new(alpha, iterations, tolerance)?;
        let n = graph.size();
        if n == 0 {
            return Ok(RankResult::default());
        }
        params.log(graph);
        let num_workers = self.num_workers.min(n);
        log::info!("Workers: {}", num_workers);

        let mut previous = vec![0.0; n];
        let mut current = vec![0.0; n];

        pl.item_name("iteration");
        pl.expected_updates(Some(iterations));
        pl.start(format!(
            "Computing PageRank (alpha={}, workers={})...",
            alpha, num_workers
        ));

        let outcomes = {
            let shared = Shared {
                graph,
                params,
                barrier: ReductionBarrier::new(num_workers),
                index: RwLock::new(LinkIndex::new(n)),
                distinct: Mutex::new(HashSet::with_capacity(n)),
                previous: previous.as_sync_slice(),
                current: current.as_sync_slice(),
            };

            std::thread::scope(|s| {
                // Collect the handles first, or workers would be joined one
                // at a time and the first barrier would never be crossed.
                let handles = partition(n, num_workers)
                    .enumerate()
                    .map(|(worker, range)| {
                        let engine = RankIterationEngine::new(worker, range, &shared);
                        std::thread::Builder::new()
                            .name(format!("rank-worker-{worker}"))
                            .spawn_scoped(s, move || engine.run())
                            .expect("Failed to spawn a rank worker")
                    })
                    .collect::<Vec<_>>();

                handles
                    .into_iter()
                    .map(|handle| {
                        handle
                            .join()
                            .unwrap_or_else(|err| std::panic::resume_unwind(err))
                    })
                    .collect::<Vec<WorkerOutcome>>()
            })
        };

        let (rounds, residual, converged, duplicates) = {
            let first = &outcomes[0];
            (first.rounds, first.residual, first.converged, first.duplicates)
        };
        debug_assert!(outcomes.iter().all(|o| o.rounds == rounds
            && o.converged == converged
            && o.duplicates == duplicates));

        pl.update_with_count(rounds);
        pl.done();

        if duplicates != 0 {
            log::warn!("{} node(s) share their identifier with another node", duplicates);
            return Err(RankError::SizeMismatch {
                expected: n,
                got: n - duplicates,
            });
        }

        if !converged {
            log::warn!(
                "No convergence after {} iteration(s), residual = {}",
                iterations,
                residual
            );
            return Err(RankError::NotConverged {
                iterations,
                residual,
            });
        }
        log::info!(
            "Converged after {} iteration(s), residual = {}",
            rounds,
            residual
        );

        RankResult::assemble(
            outcomes.into_iter().flat_map(|outcome| {
                let ranks = &current[outcome.range];
                outcome.ids.into_iter().zip(ranks.iter().copied())
            }),
            n,
        )
    }
}

impl RankComputer for ParallelRankComputer {
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
        format!("ParallelRankComputer[{}]", self.num_workers)
    }
}
