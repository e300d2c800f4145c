//! The binary wire format (SPEC_FULL.md §4.6): a fixed header followed by
//! a pre-order DFS dump of the tree. Schema is never written — readers are
//! always constructed with the schema supplied out of band by the caller.

mod reader;
mod writer;

pub use reader::{FileReader, MemReader, Reader};
pub use writer::{FileWriter, MemWriter, Writer};

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::attribute::{Attribute, AttrValue};
use crate::error::{PcError, PcResult};
use crate::node::Node;
use crate::schema::Schema;
use crate::tree::Tree;

/// `b"PCGT"`: Point Cloud Geohash Tree.
const MAGIC: [u8; 4] = *b"PCGT";
const VERSION: u8 = 1;
const ENDIAN_LITTLE: u8 = 0;

#[derive(FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned, Clone, Copy)]
#[repr(C)]
struct Header {
    magic: [u8; 4],
    version: u8,
    endian: u8,
    reserved: [u8; 2],
}

fn write_header(w: &mut dyn Writer) -> PcResult<()> {
    let header = Header { magic: MAGIC, version: VERSION, endian: ENDIAN_LITTLE, reserved: [0, 0] };
    w.write_bytes(header.as_bytes())
}

fn read_header(r: &mut dyn Reader) -> PcResult<()> {
    let bytes = r.read_bytes(std::mem::size_of::<Header>())?;
    let header = Header::read_from_bytes(&bytes).map_err(|_| {
        PcError::malformed("truncated header")
    })?;
    if header.magic != MAGIC {
        return Err(PcError::malformed(format!(
            "bad magic {:?}, expected {:?}",
            header.magic, MAGIC
        )));
    }
    if header.version != VERSION {
        return Err(PcError::unsupported(format!(
            "unsupported format version {}",
            header.version
        )));
    }
    if header.endian != ENDIAN_LITTLE {
        return Err(PcError::unsupported(
            "only little-endian encoded trees are supported",
        ));
    }
    Ok(())
}

/// Writes `tree`'s header and full contents (pre-order DFS) to `w`.
pub fn write_tree(w: &mut dyn Writer, tree: &Tree) -> PcResult<()> {
    write_header(w)?;
    w.write_bytes(&(tree.num_nodes() as u32).to_le_bytes())?;
    write_node(w, tree.root())
}

fn write_node(w: &mut dyn Writer, node: &Node) -> PcResult<()> {
    let hash = node.fragment().as_bytes();
    if hash.len() > u8::MAX as usize {
        return Err(PcError::malformed("hash fragment longer than 255 bytes"));
    }
    w.write_bytes(&[hash.len() as u8])?;
    w.write_bytes(hash)?;
    w.write_bytes(&[node.flag()])?;

    let attrs = node.attributes();
    if attrs.len() > u8::MAX as usize {
        return Err(PcError::malformed("more than 255 attributes on one node"));
    }
    w.write_bytes(&[attrs.len() as u8])?;
    for attr in attrs {
        let ty = attr.value().primitive_type();
        w.write_bytes(&[attr.dimension() as u8])?;
        w.write_bytes(&attr.packed_bytes()[..ty.size()])?;
    }

    let children = node.children();
    w.write_bytes(&(children.len() as u32).to_le_bytes())?;
    for child in children {
        write_node(w, child)?;
    }
    Ok(())
}

/// Reads a tree written by [`write_tree`], validating the header and
/// rehydrating every node against `schema`.
pub fn read_tree(r: &mut dyn Reader, schema: &Schema) -> PcResult<Tree> {
    read_header(r)?;
    let num_nodes_bytes = r.read_bytes(4)?;
    let expected_num_nodes = u32::from_le_bytes(num_nodes_bytes.try_into().unwrap());
    let root = read_node(r, schema)?;

    let actual = root.count_leaves() as u32;
    if actual != expected_num_nodes {
        return Err(PcError::malformed(format!(
            "tree header claims {expected_num_nodes} leaves, read {actual}"
        )));
    }

    let tree = Tree::from_parts(
        std::sync::Arc::new(schema.clone()),
        crate::config::Config::default(),
        root,
    );
    Ok(tree)
}

fn read_node(r: &mut dyn Reader, schema: &Schema) -> PcResult<Node> {
    let hash_len = r.read_bytes(1)?[0] as usize;
    let hash = String::from_utf8(r.read_bytes(hash_len)?)
        .map_err(|_| PcError::malformed("hash fragment is not valid utf-8"))?;
    let flag = r.read_bytes(1)?[0];

    let attr_count = r.read_bytes(1)?[0] as usize;
    let mut attributes = Vec::with_capacity(attr_count);
    for _ in 0..attr_count {
        let dim_index = r.read_bytes(1)?[0] as usize;
        let dim = schema.by_index(dim_index)?;
        let ty = dim.primitive_type();
        let bytes = r.read_bytes(ty.size())?;
        let value = AttrValue::from_packed_bytes(ty, &bytes)?;
        attributes.push(Attribute::from_raw(dim_index, value));
    }

    let child_count_bytes = r.read_bytes(4)?;
    let child_count = u32::from_le_bytes(child_count_bytes.try_into().unwrap()) as usize;
    let mut children = Vec::with_capacity(child_count);
    for _ in 0..child_count {
        children.push(read_node(r, schema)?);
    }

    let mut node = Node::new_leaf(hash, attributes);
    node.set_flag(flag);
    *node.children_mut() = children;
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::hash::Coordinate;
    use crate::node::DupesPolicy;
    use crate::schema::{Dimension, PrimitiveType};
    use crate::tree::{PointAttribute, Tree};
    use std::sync::Arc;

    fn schema_xyz() -> Arc<Schema> {
        let mut s = Schema::new();
        s.add_dimension(Dimension::new(0, "X", "", PrimitiveType::F64, 1.0, 0.0).unwrap())
            .unwrap();
        s.add_dimension(Dimension::new(1, "Y", "", PrimitiveType::F64, 1.0, 0.0).unwrap())
            .unwrap();
        s.add_dimension(
            Dimension::new(2, "Z", "", PrimitiveType::F64, 0.01, 0.0).unwrap(),
        )
        .unwrap();
        Arc::new(s)
    }

    #[test]
    fn s6_write_then_read_memory_roundtrip() {
        let schema = schema_xyz();
        let mut tree = Tree::new(Arc::clone(&schema), Config::new(8, DupesPolicy::No));
        for (x, y, z) in [(0.0, 0.0, 1.0), (0.0001, 0.0001, 1.5), (45.0, 45.0, 99.9)] {
            tree.insert_point(Coordinate::new(x, y), &[PointAttribute::new("Z", z)])
                .unwrap();
        }

        let mut writer = MemWriter::new();
        write_tree(&mut writer, &tree).unwrap();
        let bytes = writer.into_bytes();

        let mut reader = MemReader::new(&bytes);
        let read_back = read_tree(&mut reader, &schema).unwrap();

        assert_eq!(read_back.num_nodes(), 3);
        assert_eq!(read_back.root().count_leaves(), tree.root().count_leaves());
    }

    #[test]
    fn bad_magic_is_rejected() {
        let bytes = vec![0u8; 16];
        let mut reader = MemReader::new(&bytes);
        let schema = schema_xyz();
        assert!(matches!(
            read_tree(&mut reader, &schema),
            Err(PcError::Malformed { .. })
        ));
    }

    #[test]
    fn truncated_stream_is_an_error() {
        let schema = schema_xyz();
        let mut tree = Tree::new(Arc::clone(&schema), Config::new(8, DupesPolicy::No));
        tree.insert_point(Coordinate::new(1.0, 1.0), &[PointAttribute::new("Z", 1.0)])
            .unwrap();
        let mut writer = MemWriter::new();
        write_tree(&mut writer, &tree).unwrap();
        let mut bytes = writer.into_bytes();
        bytes.truncate(bytes.len() - 2);

        let mut reader = MemReader::new(&bytes);
        assert!(read_tree(&mut reader, &schema).is_err());
    }
}
