//! End-to-end scenarios S1-S6 from SPEC_FULL.md §8.

use std::sync::Arc;

use pc_tree::codec::{read_tree, write_tree, MemReader, MemWriter};
use pc_tree::hash::{common_length, decode_area, leaf_parts, LeafCase};
use pc_tree::{
    Coordinate, Dimension, DupesPolicy, Filter, FilterOp, PointAttribute, PrimitiveType,
    Schema, Config, Tree,
};

fn schema_xyz() -> Arc<Schema> {
    let mut s = Schema::new();
    s.add_dimension(Dimension::new(0, "X", "", PrimitiveType::F64, 1.0, 0.0).unwrap())
        .unwrap();
    s.add_dimension(Dimension::new(1, "Y", "", PrimitiveType::F64, 1.0, 0.0).unwrap())
        .unwrap();
    s.add_dimension(Dimension::new(2, "Z", "elevation", PrimitiveType::F64, 0.01, 0.0).unwrap())
        .unwrap();
    Arc::new(s)
}

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn s1_three_points_three_leaves_no_compaction() {
    init();
    let schema = schema_xyz();
    let mut tree = Tree::new(Arc::clone(&schema), Config::new(8, DupesPolicy::No));

    for (x, y, z) in [(0.0, 0.0, 1.0), (0.0001, 0.0001, 1.5), (45.0, 45.0, 99.9)] {
        tree.insert_point(Coordinate::new(x, y), &[PointAttribute::new("Z", z)])
            .unwrap();
    }
    tree.compact();

    assert_eq!(tree.num_nodes(), 3);
    let z_pos = schema.by_name("Z").unwrap().position();
    assert!(pc_tree::attribute::get_by_dimension(tree.root().attributes(), z_pos).is_none());
}

#[test]
fn s2_uniform_z_compacts_to_root_no_leaf_carries_it() {
    init();
    let schema = schema_xyz();
    let mut tree = Tree::new(Arc::clone(&schema), Config::new(8, DupesPolicy::No));

    for i in 0..100 {
        let x = (i % 10) as f64;
        let y = (i / 10) as f64;
        tree.insert_point(Coordinate::new(x, y), &[PointAttribute::new("Z", 5.0)])
            .unwrap();
    }
    tree.compact();

    let z_pos = schema.by_name("Z").unwrap().position();
    let root_z = pc_tree::attribute::get_by_dimension(tree.root().attributes(), z_pos);
    assert!(root_z.is_some());
    assert_eq!(root_z.unwrap().get_value(&schema).unwrap(), 5.0);

    fn no_leaf_has_z(node: &pc_tree::Node, dim: usize) -> bool {
        if node.is_leaf() {
            pc_tree::attribute::get_by_dimension(node.attributes(), dim).is_none()
        } else {
            node.children().iter().all(|c| no_leaf_has_z(c, dim))
        }
    }
    assert!(no_leaf_has_z(tree.root(), z_pos));
}

#[test]
fn s3_leaf_parts_split() {
    let lp = leaf_parts("abcde", "abcpq");
    assert_eq!(lp.case, LeafCase::Split);
    assert_eq!(lp.a_leaf, "de");
    assert_eq!(lp.b_leaf, "pq");
}

#[test]
fn s4_leaf_parts_global() {
    let lp = leaf_parts("", "abc");
    assert_eq!(lp.case, LeafCase::Global);
    assert_eq!(lp.a_leaf, "");
    assert_eq!(lp.b_leaf, "abc");
}

#[test]
fn s5_filter_builds_tree_with_one_surviving_leaf() {
    init();
    let schema = schema_xyz();
    let mut tree = Tree::new(Arc::clone(&schema), Config::new(8, DupesPolicy::No));
    for (x, y, z) in [(0.0, 0.0, 1.0), (0.0001, 0.0001, 1.5), (45.0, 45.0, 99.9)] {
        tree.insert_point(Coordinate::new(x, y), &[PointAttribute::new("Z", z)])
            .unwrap();
    }
    tree.compact();

    let filter = Filter::new("Z", FilterOp::GreaterThan(2.0));
    let filtered = pc_tree::filter::filter_tree(tree.root(), &schema, &filter)
        .unwrap()
        .unwrap();
    assert_eq!(filtered.count_leaves(), 1);
}

#[test]
fn s6_write_read_memory_roundtrip_coordinates_within_tolerance() {
    init();
    let schema = schema_xyz();
    let mut tree = Tree::new(Arc::clone(&schema), Config::new(8, DupesPolicy::No));
    let points = [(0.0, 0.0, 1.0), (0.0001, 0.0001, 1.5), (45.0, 45.0, 99.9)];
    for (x, y, z) in points {
        tree.insert_point(Coordinate::new(x, y), &[PointAttribute::new("Z", z)])
            .unwrap();
    }

    let mut writer = MemWriter::new();
    write_tree(&mut writer, &tree).unwrap();
    let bytes = writer.into_bytes();

    let mut reader = MemReader::new(&bytes);
    let read_back = read_tree(&mut reader, &schema).unwrap();

    assert_eq!(read_back.num_nodes(), 3);

    fn collect_hashes(node: &pc_tree::Node, prefix: &str, out: &mut Vec<String>) {
        let full = format!("{prefix}{}", node.fragment());
        if node.is_leaf() {
            out.push(full);
        } else {
            for c in node.children() {
                collect_hashes(c, &full, out);
            }
        }
    }
    let mut hashes = Vec::new();
    collect_hashes(read_back.root(), "", &mut hashes);
    assert_eq!(hashes.len(), 3);

    for (x, y, _) in points {
        let matching = hashes.iter().any(|h| {
            let area = decode_area(h).unwrap();
            area.contains(Coordinate::new(x, y))
        });
        assert!(matching, "no decoded area contains ({x}, {y})");
    }
}

#[test]
fn common_length_is_symmetric_property() {
    for (a, b) in [("abcde", "abcpq"), ("", "xyz"), ("same", "same")] {
        assert_eq!(common_length(a, b, 16), common_length(b, a, 16));
    }
}

#[test]
fn compact_is_idempotent_end_to_end() {
    let schema = schema_xyz();
    let mut tree = Tree::new(Arc::clone(&schema), Config::new(8, DupesPolicy::No));
    for i in 0..20 {
        let x = (i % 5) as f64;
        let y = (i / 5) as f64;
        tree.insert_point(Coordinate::new(x, y), &[PointAttribute::new("Z", 3.0)])
            .unwrap();
    }
    tree.compact();
    let once = tree.root().clone();
    tree.compact();
    assert_eq!(once, *tree.root());
}

#[test]
fn insert_after_n_distinct_leaves_counts_exactly_n() {
    let schema = schema_xyz();
    let mut tree = Tree::new(schema, Config::new(10, DupesPolicy::No));
    for i in 0..250 {
        let x = -170.0 + (i as f64) * 0.1;
        let y = -80.0 + (i as f64) * 0.05;
        tree.insert_point(Coordinate::new(x, y), &[PointAttribute::new("Z", i as f64)])
            .unwrap();
    }
    assert_eq!(tree.num_nodes(), 250);
}
