/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Graphs to be ranked.
//!
//! A [`Graph`] is an ordered sequence of [nodes](Node), each made of some
//! content and of the identifiers of its successors, together with the
//! [identifier function](IdGenerator) that maps content to a [`NodeId`].
//! Identifiers are assigned by the ranking strategies themselves, possibly in
//! parallel, so the identifier function must be [`Send`] and [`Sync`].

use anyhow::{Context, Result};
use std::borrow::Borrow;
use std::fmt::{Debug, Display};
use std::io::BufRead;

/// The identifier of a node.
///
/// Identifiers are opaque strings (for example, a hex digest of the node
/// content) that are compared and hashed as a whole.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(Box<str>);

impl NodeId {
    pub fn new(id: impl Into<Box<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// A function assigning identifiers to node contents.
///
/// Implementations must be deterministic: the same content must always
/// yield the same identifier, as the identifiers of successors are computed
/// independently of the identifiers of the nodes they point to.
pub trait IdGenerator: Send + Sync {
    fn generate_id(&self, content: &str) -> NodeId;
}

/// A node: its content and the identifiers of its successors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    content: String,
    links: Vec<NodeId>,
}

impl Node {
    pub fn new(content: impl Into<String>, links: Vec<NodeId>) -> Self {
        Self {
            content: content.into(),
            links,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the identifiers of the successors of this node, with
    /// repetitions if the input had any.
    pub fn links(&self) -> &[NodeId] {
        &self.links
    }

    /// Returns true if the node has no successors.
    pub fn is_dangling(&self) -> bool {
        self.links.is_empty()
    }
}

/// An ordered sequence of nodes and the identifier function for their
/// content.
///
/// The order of the nodes is the order used to
/// [partition](crate::utils::partition) them among workers.
pub struct Graph {
    nodes: Vec<Node>,
    generator: Box<dyn IdGenerator>,
}

impl Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("size", &self.size())
            .field("num_arcs", &self.num_arcs())
            .finish_non_exhaustive()
    }
}

impl Graph {
    /// Creates a new empty graph whose node identifiers will be computed by
    /// `generator`.
    pub fn new(generator: impl IdGenerator + 'static) -> Self {
        Self {
            nodes: Vec::new(),
            generator: Box::new(generator),
        }
    }

    /// Appends a node.
    pub fn push(&mut self, node: Node) -> &mut Self {
        self.nodes.push(node);
        self
    }

    /// Appends a node given its content and the contents of its successors;
    /// the latter are turned into identifiers using the identifier function
    /// of the graph.
    pub fn push_with_targets<I>(&mut self, content: impl Into<String>, targets: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let links = targets
            .into_iter()
            .map(|target| self.generator.generate_id(target.as_ref()))
            .collect();
        self.push(Node::new(content, links))
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn generator(&self) -> &dyn IdGenerator {
        self.generator.as_ref()
    }

    /// Returns the number of nodes.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_arcs(&self) -> usize {
        self.nodes.iter().map(|node| node.links.len()).sum()
    }

    pub fn num_dangling(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_dangling()).count()
    }
}

/// Reads a graph in adjacency-list format.
///
/// Each non-empty line describes a node: the first whitespace-separated token
/// is its content, and the following ones are the contents of its
/// successors. Lines starting with `#` are ignored. Successors need not appear
/// as nodes: arcs towards them count in the outdegree of their source, but
/// the corresponding rank is lost.
pub fn read_adjacency_list(
    reader: impl BufRead,
    generator: impl IdGenerator + 'static,
) -> Result<Graph> {
    let mut graph = Graph::new(generator);
    for (line_num, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Could not read line {}", line_num + 1))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        // The line is not empty, so there is at least one token
        if let Some(content) = tokens.next() {
            graph.push_with_targets(content, tokens);
        }
    }
    log::info!(
        "Read a graph with {} nodes and {} arcs",
        graph.size(),
        graph.num_arcs()
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ContentIdGenerator;

    #[test]
    fn test_push_with_targets() {
        let mut g = Graph::new(ContentIdGenerator);
        g.push_with_targets("a", ["b", "c"]).push_with_targets("b", ["a"]);
        g.push(Node::new("c", vec![]));
        assert_eq!(g.size(), 3);
        assert_eq!(g.num_arcs(), 3);
        assert_eq!(g.num_dangling(), 1);
        assert_eq!(
            g.nodes()[0].links(),
            &[NodeId::from("b"), NodeId::from("c")]
        );
        assert!(g.nodes()[2].is_dangling());
    }

    #[test]
    fn test_read_adjacency_list() -> Result<()> {
        let text = "# a comment\na b c\n\n  b   c \nc\nd a a\n";
        let g = read_adjacency_list(text.as_bytes(), ContentIdGenerator)?;
        assert_eq!(g.size(), 4);
        assert_eq!(g.num_arcs(), 5);
        assert_eq!(g.nodes()[1].content(), "b");
        assert_eq!(g.nodes()[1].links(), &[NodeId::from("c")]);
        assert!(g.nodes()[2].is_dangling());
        assert_eq!(g.nodes()[3].links().len(), 2);
        Ok(())
    }
}
