//! The root container: schema, root node, point count and config.

use std::sync::Arc;

use crate::attribute::{Attribute, AttributeList};
use crate::compactor::compact_tree;
use crate::config::Config;
use crate::error::PcResult;
use crate::hash::{self, Coordinate};
use crate::node::{DupesPolicy, Node};
use crate::schema::Schema;

//------------ PointAttribute / LeafEntry ----------------------------------------

/// One payload measurement for a point, prior to quantization: a
/// dimension name and its physical value.
#[derive(Debug, Clone)]
pub struct PointAttribute {
    pub dimension_name: String,
    pub value: f64,
}

impl PointAttribute {
    pub fn new(dimension_name: impl Into<String>, value: f64) -> Self {
        PointAttribute { dimension_name: dimension_name.into(), value }
    }
}

/// A single leaf to insert: a full-resolution hash plus its already
/// quantized attribute list. SPEC_FULL.md §4.7's flat nodelist is a
/// `Vec<LeafEntry>`.
#[derive(Debug, Clone)]
pub struct LeafEntry {
    pub hash: String,
    pub attributes: AttributeList,
}

//------------ Tree ---------------------------------------------------------------

/// The root container for a geohash-indexed radix tree of points.
#[derive(Debug, Clone)]
pub struct Tree {
    schema: Arc<Schema>,
    root: Node,
    num_nodes: usize,
    config: Config,
}

impl Tree {
    /// An empty tree over `schema`.
    pub fn new(schema: Arc<Schema>, config: Config) -> Self {
        Tree { schema, root: Node::new(""), num_nodes: 0, config }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn schema_arc(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    pub fn config(&self) -> Config {
        self.config
    }

    /// The number of leaves (points) in the tree. Recomputed from the
    /// tree's own structure rather than tracked incrementally, so it can
    /// never drift from reality (SPEC_FULL.md §3: "`num_nodes` counts
    /// leaves").
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    fn recount(&mut self) {
        self.num_nodes = self.root.count_leaves();
    }

    /// Rebuilds a tree around an already-assembled root, e.g. one just
    /// rehydrated by [`crate::codec::read_tree`]. `num_nodes` is recomputed
    /// from the root rather than trusted from the caller.
    pub(crate) fn from_parts(schema: Arc<Schema>, config: Config, root: Node) -> Self {
        let mut tree = Tree { schema, root, num_nodes: 0, config };
        tree.recount();
        tree
    }

    /// Encodes `coord` at the configured resolution and inserts it, with
    /// the given payload attributes quantized against the schema.
    pub fn insert_point(
        &mut self,
        coord: Coordinate,
        attrs: &[PointAttribute],
    ) -> PcResult<()> {
        let full_hash = hash::encode(coord, self.config.resolution())?;
        let mut quantized = Vec::with_capacity(attrs.len());
        for a in attrs {
            let dim = self.schema.by_name(&a.dimension_name)?;
            quantized.push(Attribute::new_from_double(dim, a.value)?);
        }
        self.insert_leaf(LeafEntry { hash: full_hash, attributes: quantized })
    }

    /// Inserts an already-encoded leaf (e.g. rehydrated from a reader, or
    /// built directly from a known hash).
    pub fn insert_leaf(&mut self, leaf: LeafEntry) -> PcResult<()> {
        log::debug!(
            "inserting leaf hash={} attrs={}",
            leaf.hash,
            leaf.attributes.len()
        );
        self.root.insert(
            Node::new_leaf(leaf.hash, leaf.attributes),
            self.config.dupes(),
        );
        self.recount();
        Ok(())
    }

    /// Runs the upward compaction pass (SPEC_FULL.md §4.3) over every
    /// payload dimension.
    pub fn compact(&mut self) {
        compact_tree(&mut self.root, &self.schema);
    }
}

/// Builds a tree from a flat list of leaves (SPEC_FULL.md §4.7): allocates
/// an empty root, inserts every leaf, compacts, and counts leaves.
pub fn tree_from_nodelist(
    schema: Arc<Schema>,
    config: Config,
    leaves: Vec<LeafEntry>,
) -> PcResult<Tree> {
    let mut tree = Tree::new(schema, config);
    for leaf in leaves {
        tree.insert_leaf(leaf)?;
    }
    tree.compact();
    Ok(tree)
}
