/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The work of a single worker of
//! [`ParallelRankComputer`](super::ParallelRankComputer).
//!
//! Each worker owns a contiguous range of nodes and goes through three
//! phases, separated by crossings of a shared [`ReductionBarrier`]:
//!
//! 1. it assigns identifiers to its nodes;
//! 2. it initializes the ranks of its nodes, merges its contribution to the
//!    shared [`LinkIndex`] while holding the write lock, and records its
//!    identifiers in a shared set; the number of repeated identifiers is then
//!    summed over all workers, and if it is not zero no worker iterates;
//! 3. it iterates, taking a read lock on the index once and for all; in each
//!    round the dangling rank and the residual are summed over all workers by
//!    [`arrive_and_reduce`](ReductionBarrier::arrive_and_reduce).
//!
//! Rank vectors are shared as slices of [`SyncCell`]s. During an iteration a
//! worker writes only the ranks of its own nodes, and it reads the previous
//! ranks of other nodes only after a barrier crossing following their last
//! write.
//!
//! All workers see the same residual, so they all leave the loop at the same
//! round, and they cross the barrier the same number of times.

use super::index::{LinkIndex, LinkIndexPart};
use super::Params;
use crate::graph::{Graph, NodeId};
use crate::utils::ReductionBarrier;
use kahan::KahanSum;
use std::ops::Range;
use std::collections::HashSet;
use std::sync::{Mutex, RwLock};
use sync_cell_slice::SyncCell;

/// The state shared by all workers of a computation.
pub(super) struct Shared<'a> {
    pub(super) graph: &'a Graph,
    pub(super) params: Params,
    pub(super) barrier: ReductionBarrier,
    pub(super) index: RwLock<LinkIndex>,
    /// The identifiers seen so far.
    pub(super) distinct: Mutex<HashSet<NodeId>>,
    pub(super) previous: &'a [SyncCell<f64>],
    pub(super) current: &'a [SyncCell<f64>],
}

/// What a worker reports when it is done.
#[derive(Debug)]
pub(super) struct WorkerOutcome {
    /// The range of nodes of the worker.
    pub(super) range: Range<usize>,
    /// The identifiers of the nodes in the range.
    pub(super) ids: Vec<NodeId>,
    /// The number of rounds performed.
    pub(super) rounds: usize,
    /// The residual of the last round.
    pub(super) residual: f64,
    pub(super) converged: bool,
    /// The number of nodes, over all workers, whose identifier was already
    /// assigned to another node.
    pub(super) duplicates: usize,
}

pub(super) struct RankIterationEngine<'a> {
    worker: usize,
    range: Range<usize>,
    shared: &'a Shared<'a>,
}

impl<'a> RankIterationEngine<'a> {
    pub(super) fn new(worker: usize, range: Range<usize>, shared: &'a Shared<'a>) -> Self {
        Self {
            worker,
            range,
            shared,
        }
    }

    pub(super) fn run(self) -> WorkerOutcome {
        log::debug!(
            "Worker {} started on nodes [{}..{})",
            self.worker,
            self.range.start,
            self.range.end
        );

        let ids = self.assign_ids();
        self.shared.barrier.arrive_and_wait();

        let duplicates = self.build_index(&ids);
        let duplicates = self.shared.barrier.arrive_and_reduce(duplicates as f64) as usize;

        let (rounds, residual, converged) = if duplicates == 0 {
            self.iterate(&ids)
        } else {
            // Every worker sees the same count, so every worker skips the loop
            (0, f64::NAN, false)
        };

        log::debug!("Worker {} done after {} round(s)", self.worker, rounds);
        WorkerOutcome {
            range: self.range,
            ids,
            rounds,
            residual,
            converged,
            duplicates,
        }
    }

    fn assign_ids(&self) -> Vec<NodeId> {
        let generator = self.shared.graph.generator();
        self.shared.graph.nodes()[self.range.clone()]
            .iter()
            .map(|node| generator.generate_id(node.content()))
            .collect()
    }

    /// Initializes ranks and merges the index contribution of the worker,
    /// returning how many of its identifiers had already been seen.
    fn build_index(&self, ids: &[NodeId]) -> usize {
        let Shared {
            graph,
            index,
            distinct,
            previous,
            current,
            ..
        } = self.shared;

        let inv_n = 1.0 / graph.size() as f64;
        for p in self.range.clone() {
            // SAFETY: no other worker accesses the ranks of our nodes in
            // this phase.
            unsafe {
                previous[p].set(inv_n);
                current[p].set(inv_n);
            }
        }

        let part = LinkIndexPart::build(graph, self.range.clone());
        index.write().unwrap().merge(part);

        let mut distinct = distinct.lock().unwrap();
        ids.iter().filter(|&id| !distinct.insert(id.clone())).count()
    }

    /// Runs the power iteration on the nodes of the worker, returning the
    /// number of rounds, the last residual, and whether the computation
    /// converged.
    fn iterate(&self, ids: &[NodeId]) -> (usize, f64, bool) {
        let Shared {
            graph,
            params,
            barrier,
            index,
            previous,
            current,
            ..
        } = self.shared;

        // The index is not modified anymore: the guard is kept until the end
        // so that the loop takes no locks.
        let index = index.read().unwrap();
        let in_links: Vec<&[usize]> = ids.iter().map(|id| index.in_links(id)).collect();
        let inv_outdegrees = index.inv_outdegrees();
        let nodes = &graph.nodes()[self.range.clone()];
        let inv_n = 1.0 / graph.size() as f64;
        let mut residual = f64::INFINITY;

        for round in 0..params.iterations {
            let mut local_dangling = KahanSum::<f64>::new();
            for (p, node) in self.range.clone().zip(nodes) {
                if node.is_dangling() {
                    // SAFETY: previous ranks are written only after the next
                    // crossing.
                    local_dangling += unsafe { previous[p].get() };
                }
            }
            let dangling_rank = barrier.arrive_and_reduce(local_dangling.sum());
            let uniform = params.uniform_term(dangling_rank, inv_n);

            let mut local_delta = KahanSum::<f64>::new();
            for (p, preds) in self.range.clone().zip(&in_links) {
                // SAFETY: only this worker writes current[p]; all previous
                // ranks were written before the last crossing.
                unsafe {
                    let mut sigma = KahanSum::<f64>::new();
                    for &q in *preds {
                        sigma += previous[q].get() * inv_outdegrees[q];
                    }
                    let rank = uniform + params.alpha * sigma.sum();
                    local_delta += (rank - previous[p].get()).abs();
                    current[p].set(rank);
                }
            }
            residual = barrier.arrive_and_reduce(local_delta.sum());

            if self.worker == 0 {
                log::debug!("Iteration {}: residual = {}", round + 1, residual);
            }

            if residual < params.tolerance {
                return (round + 1, residual, true);
            }

            for p in self.range.clone() {
                // SAFETY: other workers read previous ranks only after the
                // next crossing.
                unsafe {
                    previous[p].set(current[p].get());
                }
            }
            barrier.arrive_and_wait();
        }

        (params.iterations, residual, false)
    }
}
