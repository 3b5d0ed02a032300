/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::graph::{Graph, NodeId};
use std::collections::HashMap;
use std::ops::Range;

/// The structures derived from a graph before iterating: the reversed-edge
/// index and the inverse outdegrees.
///
/// The index maps the identifier of each node with at least one predecessor
/// to the positions of its predecessors in the graph, with repetitions if a
/// predecessor has parallel arcs. Inverse outdegrees are indexed by position,
/// and they are zero for dangling nodes.
#[derive(Debug, Default)]
pub(crate) struct LinkIndex {
    in_links: HashMap<NodeId, Vec<usize>>,
    inv_outdegrees: Box<[f64]>,
}

impl LinkIndex {
    /// Creates an empty index for a graph with `n` nodes.
    pub(crate) fn new(n: usize) -> Self {
        Self {
            in_links: HashMap::new(),
            inv_outdegrees: vec![0.0; n].into_boxed_slice(),
        }
    }

    /// Builds the complete index of a graph.
    pub(crate) fn build(graph: &Graph) -> Self {
        let mut index = Self::new(graph.size());
        index.merge(LinkIndexPart::build(graph, 0..graph.size()));
        index
    }

    /// Merges the contribution of a range of nodes.
    pub(crate) fn merge(&mut self, part: LinkIndexPart) {
        for (target, mut sources) in part.in_links {
            self.in_links
                .entry(target)
                .or_default()
                .append(&mut sources);
        }
        self.inv_outdegrees[part.range].copy_from_slice(&part.inv_outdegrees);
    }

    /// Returns the positions of the predecessors of the node with the given
    /// identifier.
    pub(crate) fn in_links(&self, id: &NodeId) -> &[usize] {
        self.in_links.get(id).map_or(&[][..], Vec::as_slice)
    }

    pub(crate) fn inv_outdegrees(&self) -> &[f64] {
        &self.inv_outdegrees
    }
}

/// The contribution of a range of nodes to a [`LinkIndex`].
#[derive(Debug)]
pub(crate) struct LinkIndexPart {
    range: Range<usize>,
    in_links: HashMap<NodeId, Vec<usize>>,
    inv_outdegrees: Vec<f64>,
}

impl LinkIndexPart {
    pub(crate) fn build(graph: &Graph, range: Range<usize>) -> Self {
        let nodes = &graph.nodes()[range.clone()];
        let mut in_links = HashMap::<NodeId, Vec<usize>>::new();
        let mut inv_outdegrees = Vec::with_capacity(nodes.len());

        for (source, node) in range.clone().zip(nodes) {
            for target in node.links() {
                in_links.entry(target.clone()).or_default().push(source);
            }
            inv_outdegrees.push(if node.is_dangling() {
                0.0
            } else {
                1.0 / node.links().len() as f64
            });
        }

        Self {
            range,
            in_links,
            inv_outdegrees,
        }
    }
}
