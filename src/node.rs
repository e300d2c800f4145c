//! The tree element: a hash fragment, an attribute list, and children —
//! plus the recursive insertion state machine ("leaf parts") that builds
//! the tree one point at a time.

use crate::attribute::{self, Attribute, AttributeList};
use crate::error::PcResult;
use crate::hash::{self, Hash, LeafCase};
use crate::schema::Schema;

//------------ DupesPolicy -----------------------------------------------------

/// What to do when two inserted points encode to the exact same
/// full-resolution hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DupesPolicy {
    /// Merge the incoming point's attributes into the existing leaf
    /// (union, existing entries win on conflict) and discard the
    /// duplicate point.
    #[default]
    No,
    /// Keep both leaves; the children list may carry fragment duplicates.
    Yes,
}

//------------ Node -------------------------------------------------------------

/// A node in the geohash radix tree.
///
/// `fragment` is the suffix that distinguishes this node from its parent;
/// the concatenation of fragments along a root-to-leaf path equals that
/// leaf's full-resolution geohash. The root's fragment is always `""`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    fragment: Hash,
    /// Reserved; always zero on write, never interpreted on read (see
    /// DESIGN.md Open Question resolution).
    flag: u8,
    attributes: AttributeList,
    children: Vec<Node>,
}

impl Node {
    /// A fresh, attribute-less, child-less node carrying `fragment`.
    pub fn new(fragment: impl Into<Hash>) -> Self {
        Node {
            fragment: fragment.into(),
            flag: 0,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A leaf node: a fragment plus the attributes observed for one point.
    pub fn new_leaf(fragment: impl Into<Hash>, attributes: AttributeList) -> Self {
        Node { fragment: fragment.into(), flag: 0, attributes, children: Vec::new() }
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn flag(&self) -> u8 {
        self.flag
    }

    /// Sets the reserved flag byte. Always zero on write (see DESIGN.md);
    /// exposed so the codec can round-trip whatever a reader encounters.
    pub fn set_flag(&mut self, flag: u8) {
        self.flag = flag;
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeList {
        &mut self.attributes
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Counts leaves in the subtree rooted at `self`.
    pub fn count_leaves(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(Node::count_leaves).sum()
        }
    }

    /// Inserts `incoming` under `self`, applying the leaf-parts state
    /// machine of SPEC_FULL.md §4.2. `incoming.fragment` is interpreted
    /// relative to `self`: it is the remainder of the full-resolution hash
    /// not yet consumed by the path from the tree root down to `self`.
    pub fn insert(&mut self, mut incoming: Node, dupes: DupesPolicy) {
        if self.children.is_empty() {
            self.children.push(incoming);
            return;
        }

        for i in 0..self.children.len() {
            let existing_fragment = self.children[i].fragment.clone();

            // A child with an empty fragment is a terminal leaf whose own
            // hash equals the path down to this node (reachable when a
            // shorter-hash point is inserted after a longer one already
            // occupies this spot, splitting off an empty remainder — see
            // the `Split` arm below). The empty string is a prefix of
            // everything, but it shares no *non-empty* prefix with
            // anything, so such a child coexists as an ordinary sibling:
            // it only matches an incoming fragment that is itself empty
            // (an exact duplicate at this depth), and is otherwise
            // unrelated to every other incoming fragment. Handling this
            // before calling `leaf_parts` keeps `a` non-empty there, so
            // `LeafCase::Global` (which `leaf_parts` only produces for an
            // empty `a`) never arises in this loop.
            if existing_fragment.is_empty() {
                if incoming.fragment.is_empty() {
                    match dupes {
                        DupesPolicy::No => {
                            let existing = &mut self.children[i];
                            existing.attributes = attribute::union(
                                &existing.attributes,
                                &incoming.attributes,
                            );
                        }
                        DupesPolicy::Yes => {
                            self.children.push(incoming);
                        }
                    }
                    return;
                }
                continue;
            }

            let parts = hash::leaf_parts(&existing_fragment, &incoming.fragment);
            match parts.case {
                LeafCase::None => continue,
                LeafCase::Same => {
                    if !self.children[i].is_leaf() {
                        // `existing_fragment` matches `incoming` exactly,
                        // but this child is itself a branch point, not a
                        // terminal point: it was created by the `Split`
                        // arm below when a shorter hash arrived after a
                        // longer sibling already occupied this spot, and
                        // the point this fragment denotes lives in its
                        // own zero-length-fragment child, not in this
                        // node's attribute list. Descend so the duplicate
                        // is resolved against that nested leaf instead of
                        // being merged onto the branch point itself.
                        incoming.fragment = parts.b_leaf; // always ""
                        self.children[i].insert(incoming, dupes);
                        return;
                    }
                    match dupes {
                        DupesPolicy::No => {
                            let existing = &mut self.children[i];
                            existing.attributes = attribute::union(
                                &existing.attributes,
                                &incoming.attributes,
                            );
                        }
                        DupesPolicy::Yes => {
                            // `incoming.fragment` already equals
                            // `existing_fragment` (that is what `Same`
                            // means); keep it as-is rather than
                            // overwriting it with `parts.b_leaf`, which is
                            // always empty for this case and would turn
                            // the duplicate into an unrelated empty-
                            // fragment child.
                            self.children.push(incoming);
                        }
                    }
                    return;
                }
                LeafCase::Child => {
                    incoming.fragment = parts.b_leaf;
                    self.children[i].insert(incoming, dupes);
                    return;
                }
                LeafCase::Global => {
                    unreachable!(
                        "Global only arises when `a` is empty, but the \
                         empty-fragment case is handled above before \
                         leaf_parts is ever called with a non-empty `a`"
                    );
                }
                LeafCase::Split => {
                    // `leaf_parts` hands back only the trimmed remainders
                    // (by design, SPEC_FULL.md §4.1); the shared prefix
                    // itself — the new splice node's own fragment — is
                    // recovered here from the untrimmed fragments.
                    let shared_len = existing_fragment.len() - parts.a_leaf.len();
                    let shared = existing_fragment[..shared_len].to_string();

                    let mut existing = self.children.remove(i);
                    existing.fragment = parts.a_leaf;
                    incoming.fragment = parts.b_leaf;

                    let mut splice = Node::new(shared);
                    splice.children.push(existing);
                    splice.children.push(incoming);
                    self.children.insert(i, splice);
                    return;
                }
            }
        }

        self.children.push(incoming);
    }

    /// Recomputes the average `Z` value over every leaf in this subtree,
    /// consulting this node's own attributes first (a `Z` compacted here
    /// applies to every descendant). Returns `None` if the schema has no
    /// `Z` dimension or no leaf carries a value for it.
    ///
    /// Not incrementally maintained — see DESIGN.md Open Question
    /// resolution for `z_avg`.
    pub fn z_average(&self, schema: &Schema) -> PcResult<Option<f64>> {
        let dim = match schema.by_name("Z") {
            Ok(d) => d,
            Err(_) => return Ok(None),
        };
        let mut sum = 0.0;
        let mut count = 0usize;
        self.z_sum(dim.position(), schema, None, &mut sum, &mut count)?;
        Ok(if count == 0 { None } else { Some(sum / count as f64) })
    }

    fn z_sum(
        &self,
        z_dim: usize,
        schema: &Schema,
        inherited: Option<f64>,
        sum: &mut f64,
        count: &mut usize,
    ) -> PcResult<()> {
        let here = match attribute::get_by_dimension(&self.attributes, z_dim) {
            Some(attr) => Some(attr.get_value(schema)?),
            None => inherited,
        };
        if self.is_leaf() {
            if let Some(z) = here {
                *sum += z;
                *count += 1;
            }
            return Ok(());
        }
        for child in &self.children {
            child.z_sum(z_dim, schema, here, sum, count)?;
        }
        Ok(())
    }
}
