//! Predicate-driven tree pruning: build a fresh, disjoint tree containing
//! only the leaves that satisfy a [`Filter`].

use crate::attribute::{self, Attribute, EPSILON};
use crate::error::{PcError, PcResult};
use crate::node::Node;
use crate::schema::Schema;

//------------ FilterOp / Filter ------------------------------------------------

/// A predicate evaluated against a single attribute's physical value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    GreaterThan(f64),
    LessThan(f64),
    Between(f64, f64),
    Equal(f64),
}

impl FilterOp {
    fn matches(self, value: f64) -> bool {
        match self {
            FilterOp::GreaterThan(t) => value > t,
            FilterOp::LessThan(t) => value < t,
            FilterOp::Between(t1, t2) => value >= t1 && value <= t2,
            FilterOp::Equal(t) => (value - t).abs() <= EPSILON,
        }
    }
}

/// A predicate over a single named dimension.
#[derive(Debug, Clone)]
pub struct Filter {
    dimension_name: String,
    op: FilterOp,
}

impl Filter {
    pub fn new(dimension_name: impl Into<String>, op: FilterOp) -> Self {
        Filter { dimension_name: dimension_name.into(), op }
    }
}

/// Filters `root` by `filter`, returning a new, fully owned tree root
/// containing only the surviving leaves, or `None` if none survive.
///
/// Ancestor attributes that apply to `filter`'s dimension (because of
/// compaction) are pushed down to descendants during evaluation rather
/// than mutating `root` — see SPEC_FULL.md §4.5 and §9.
pub fn filter_tree(root: &Node, schema: &Schema, filter: &Filter) -> PcResult<Option<Node>> {
    let dim = schema.by_name(&filter.dimension_name)?;
    filter_node(root, dim.position(), &filter.op, schema, None)
}

fn filter_node(
    node: &Node,
    dim: usize,
    op: &FilterOp,
    schema: &Schema,
    inherited: Option<&Attribute>,
) -> PcResult<Option<Node>> {
    let here = attribute::get_by_dimension(node.attributes(), dim);
    let effective = here.or(inherited);

    if let Some(attr) = effective {
        let value = attr.get_value(schema)?;
        if !op.matches(value) {
            return Ok(None);
        }
        if node.is_leaf() {
            return Ok(Some(node.clone()));
        }
        // Internal node whose (possibly inherited) attribute passed: keep
        // walking so the still-present attribute continues to be visible
        // to descendants, and so a child-local override can still prune
        // that particular branch.
        let mut kept = Node::new_leaf(node.fragment().to_string(), node.attributes().to_vec());
        for child in node.children() {
            if let Some(child_out) = filter_node(child, dim, op, schema, effective)? {
                kept.children_mut().push(child_out);
            }
        }
        if kept.children().is_empty() && !node.is_leaf() {
            return Ok(None);
        }
        return Ok(Some(kept));
    }

    if node.is_leaf() {
        // No attribute anywhere on this path for `dim`: per SPEC_FULL.md
        // §7, a filter on a dimension absent from the whole tree reports
        // NotFound rather than silently pruning everything. Once a
        // dimension exists in the schema but a given leaf genuinely has no
        // value (schema violation), we treat it conservatively as "does
        // not match".
        return Ok(None);
    }

    let mut kept = Node::new_leaf(node.fragment().to_string(), node.attributes().to_vec());
    for child in node.children() {
        if let Some(child_out) = filter_node(child, dim, op, schema, inherited)? {
            kept.children_mut().push(child_out);
        }
    }
    if kept.children().is_empty() {
        Ok(None)
    } else {
        Ok(Some(kept))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Attribute;
    use crate::compactor::compact_tree;
    use crate::node::{DupesPolicy, Node};
    use crate::schema::{Dimension, PrimitiveType, Schema};

    fn schema_xyz() -> Schema {
        let mut s = Schema::new();
        s.add_dimension(Dimension::new(0, "X", "", PrimitiveType::F64, 1.0, 0.0).unwrap())
            .unwrap();
        s.add_dimension(Dimension::new(1, "Y", "", PrimitiveType::F64, 1.0, 0.0).unwrap())
            .unwrap();
        s.add_dimension(
            Dimension::new(2, "Z", "", PrimitiveType::F64, 0.01, 0.0).unwrap(),
        )
        .unwrap();
        s
    }

    fn z_attr(schema: &Schema, v: f64) -> Attribute {
        Attribute::new_from_double(schema.by_name("Z").unwrap(), v).unwrap()
    }

    #[test]
    fn s5_filter_greater_than_selects_one_leaf() {
        let schema = schema_xyz();
        let mut root = Node::new("");
        root.insert(Node::new_leaf("aaaaaaaa", vec![z_attr(&schema, 1.0)]), DupesPolicy::No);
        root.insert(Node::new_leaf("bbbbbbbb", vec![z_attr(&schema, 1.5)]), DupesPolicy::No);
        root.insert(Node::new_leaf("cccccccc", vec![z_attr(&schema, 99.9)]), DupesPolicy::No);

        let filter = Filter::new("Z", FilterOp::GreaterThan(2.0));
        let filtered = filter_tree(&root, &schema, &filter).unwrap().unwrap();
        assert_eq!(filtered.count_leaves(), 1);
    }

    #[test]
    fn filter_after_compaction_sees_inherited_attribute() {
        let schema = schema_xyz();
        let mut root = Node::new("");
        for i in 0..5 {
            let hash = format!("{:08x}", i);
            root.insert(Node::new_leaf(hash, vec![z_attr(&schema, 5.0)]), DupesPolicy::No);
        }
        compact_tree(&mut root, &schema);
        // Root now carries Z, no leaf does.
        let filter = Filter::new("Z", FilterOp::Equal(5.0));
        let filtered = filter_tree(&root, &schema, &filter).unwrap().unwrap();
        assert_eq!(filtered.count_leaves(), 5);
    }

    #[test]
    fn filter_unknown_dimension_is_not_found() {
        let schema = schema_xyz();
        let root = Node::new("");
        let filter = Filter::new("Intensity", FilterOp::Equal(1.0));
        let err = filter_tree(&root, &schema, &filter).unwrap_err();
        assert!(matches!(err, PcError::NotFound { .. }));
    }

    #[test]
    fn filter_no_survivors_prunes_to_none() {
        let schema = schema_xyz();
        let mut root = Node::new("");
        root.insert(Node::new_leaf("aaaaaaaa", vec![z_attr(&schema, 1.0)]), DupesPolicy::No);
        let filter = Filter::new("Z", FilterOp::GreaterThan(100.0));
        assert!(filter_tree(&root, &schema, &filter).unwrap().is_none());
    }
}
