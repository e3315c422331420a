//! Node and edge sequences handed to the load stage.
//!
//! Sequences are restartable: every call to [`GraphSource::produce_nodes`] or
//! [`GraphSource::produce_edges`] returns a fresh iterator over the same
//! cached pass results. Nodes are built lazily as the iterator advances, but
//! only after entity discovery has seen the whole table.

use crate::adapter::{CollectriAdapter, Discovery};
use crate::entity::{Edge, Node, NodeType};

/// Something that can hand out graph records.
pub trait GraphSource {
    /// All nodes, transcription factors first, each in first-seen order.
    fn produce_nodes(&self) -> Box<dyn Iterator<Item = Node> + '_>;

    /// One edge per valid row, in row order.
    fn produce_edges(&self) -> Box<dyn Iterator<Item = Edge> + '_>;
}

impl GraphSource for CollectriAdapter {
    fn produce_nodes(&self) -> Box<dyn Iterator<Item = Node> + '_> {
        Box::new(NodeStream::new(self))
    }

    fn produce_edges(&self) -> Box<dyn Iterator<Item = Edge> + '_> {
        Box::new(EdgeStream {
            inner: self.edge_pass().edges.iter(),
        })
    }
}

/// Lazily builds nodes from the discovered entity universe.
pub struct NodeStream<'a> {
    adapter: &'a CollectriAdapter,
    discovery: &'a Discovery,
    include_tfs: bool,
    include_genes: bool,
    tf_cursor: usize,
    gene_cursor: usize,
}

impl<'a> NodeStream<'a> {
    fn new(adapter: &'a CollectriAdapter) -> Self {
        let config = adapter.config();
        Self {
            adapter,
            discovery: adapter.discovery(),
            include_tfs: config.includes_node_type(NodeType::TranscriptionFactor),
            include_genes: config.includes_node_type(NodeType::Gene),
            tf_cursor: 0,
            gene_cursor: 0,
        }
    }
}

impl Iterator for NodeStream<'_> {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        if self.include_tfs {
            if let Some((id, entry)) = self.discovery.transcription_factors.get_index(self.tf_cursor) {
                self.tf_cursor += 1;
                return Some(self.adapter.build_node(NodeType::TranscriptionFactor, id, entry));
            }
        }

        if self.include_genes {
            while let Some((id, entry)) = self.discovery.genes.get_index(self.gene_cursor) {
                self.gene_cursor += 1;
                // Regulators are emitted once, as transcription factors.
                if self.discovery.transcription_factors.contains_key(id) {
                    continue;
                }
                return Some(self.adapter.build_node(NodeType::Gene, id, entry));
            }
        }

        None
    }
}

/// Iterates over the cached edges.
pub struct EdgeStream<'a> {
    inner: std::slice::Iter<'a, Edge>,
}

impl Iterator for EdgeStream<'_> {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        self.inner.next().cloned()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
