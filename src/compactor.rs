//! Upward attribute migration: when every child of a node agrees on a
//! dimension's value, that attribute is lifted to the parent and removed
//! from the children.

use crate::attribute::{self, Attribute};
use crate::node::Node;
use crate::schema::Schema;

/// Recursively compacts dimension `dim` within `node`'s subtree.
///
/// If `node` is a leaf, returns (a clone of) its attribute for `dim`, if
/// any. Otherwise recurses into every child first; if every child yields
/// an attribute for `dim` and all of their packed bytes are identical,
/// those attributes are removed from the children and a single clone is
/// returned for the caller to attach here. Otherwise returns `None` and
/// leaves the children untouched.
pub fn compact_attribute(node: &mut Node, dim: usize) -> Option<Attribute> {
    if node.is_leaf() {
        return attribute::get_by_dimension(node.attributes(), dim).cloned();
    }

    let mut lifted = Vec::with_capacity(node.children().len());
    for child in node.children_mut() {
        match compact_attribute(child, dim) {
            Some(attr) => lifted.push(attr),
            None => return None,
        }
    }

    let first_bytes = lifted[0].packed_bytes();
    if lifted.iter().all(|a| a.packed_bytes() == first_bytes) {
        for (child, attr) in node.children_mut().iter_mut().zip(&lifted) {
            child
                .attributes_mut()
                .retain(|a| a.dimension() != attr.dimension());
        }
        Some(lifted.into_iter().next().unwrap())
    } else {
        None
    }
}

/// Runs [`compact_attribute`] for every payload dimension (schema position
/// 2 onward — positions 0 and 1, conventionally `X`/`Y`, live in the hash
/// and never carry attributes). Idempotent: running it again is a no-op.
pub fn compact_tree(root: &mut Node, schema: &Schema) {
    for dim in schema.dimensions().iter().skip(2) {
        if let Some(attr) = compact_attribute(root, dim.position()) {
            root.attributes_mut().push(attr);
        }
    }
}
