//! A library for storing and querying point clouds (LiDAR-style datasets)
//! as a geohash-indexed radix tree.
//!
//! Every point's `(x, y)` location is encoded as a short textual geohash of
//! bounded resolution ([`hash`]); points whose geohashes share a common
//! prefix are grouped under a shared [`node::Node`] whose fragment is that
//! prefix. Non-spatial per-point measurements ([`attribute`]) attach to
//! nodes and are compacted upward ([`compactor`]) whenever every descendant
//! of a node agrees on a value, which is the structure's compression
//! mechanism. [`tree::Tree`] ties a root node to a [`schema::Schema`];
//! [`codec`] serializes a tree to a compact binary form, and [`filter`]
//! builds a pruned, disjoint tree from an attribute predicate.

pub mod attribute;
pub mod codec;
pub mod compactor;
pub mod config;
pub mod error;
pub mod filter;
pub mod hash;
pub mod node;
pub mod schema;
pub mod tree;

#[cfg(feature = "xml")]
pub mod schema_xml;

pub use attribute::{AttrValue, Attribute, AttributeList};
pub use config::Config;
pub use error::{PcError, PcResult};
pub use filter::{Filter, FilterOp};
pub use hash::{Area, Coordinate, Hash};
pub use node::{DupesPolicy, Node};
pub use schema::{Dimension, PrimitiveType, Schema};
pub use tree::{tree_from_nodelist, LeafEntry, PointAttribute, Tree};
