/*
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::graph::{Graph, IdGenerator};
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Provides Erdös-Rényi random graphs.
///
/// The Erdös-Rényi random graph model is a simple model for generating random
/// graphs. It is parameterized by the number of nodes `n` and the probability
/// `p` of an arc between any two nodes. In this implementation, loops are never
/// included.
///
/// The content of node `x` is the decimal representation of `x`, so graphs
/// built with different [identifier functions](IdGenerator) have the same
/// structure. Nodes without successors are dangling nodes, which for small `p`
/// are quite common.
///
/// Note that the time required to iterate over the graph is quadratic in `n`.
#[derive(Debug, Clone)]
pub struct ErdosRenyi {
    n: usize,
    p: f64,
    seed: u64,
}

impl ErdosRenyi {
    /// Creates a new Erdös-Rényi random graph, given the number of
    /// nodes, the probability of an edge between any two nodes, and a
    /// seed for the [pseudorandom number generator](SmallRng).
    pub fn new(n: usize, p: f64, seed: u64) -> Self {
        assert!((0.0..=1.0).contains(&p), "p must be in [0..1]");
        Self { n, p, seed }
    }

    pub fn num_nodes(&self) -> usize {
        self.n
    }

    /// Returns an iterator on pairs given by a node and the list of its
    /// successors.
    pub fn iter(&self) -> Iter {
        self.iter_from(0)
    }

    /// Returns an iterator on pairs given by a node and the list of its
    /// successors, starting from node `from`.
    pub fn iter_from(&self, from: usize) -> Iter {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        if self.n > 0 {
            for _ in 0..from * (self.n - 1) {
                rng.random_bool(self.p);
            }
        }
        Iter {
            n: self.n,
            p: self.p,
            x: from,
            rng,
        }
    }

    /// Builds the graph, using `generator` to assign identifiers.
    pub fn build(&self, generator: impl IdGenerator + 'static) -> Graph {
        let mut graph = Graph::new(generator);
        for (x, succ) in self.iter() {
            graph.push_with_targets(x.to_string(), succ.iter().map(usize::to_string));
        }
        graph
    }
}

#[derive(Debug, Clone)]
pub struct Iter {
    n: usize,
    p: f64,
    x: usize,
    rng: SmallRng,
}

impl Iterator for Iter {
    type Item = (usize, Vec<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.x >= self.n {
            return None;
        }

        let result = Some((
            self.x,
            (0..self.n)
                .filter(|&y| y != self.x && self.rng.random_bool(self.p))
                .collect::<Vec<_>>(),
        ));
        self.x += 1;
        result
    }
}
