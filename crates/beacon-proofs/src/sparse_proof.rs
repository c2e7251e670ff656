//! Sparse Merkle Proof Source
//!
//! Generates SSZ Merkle proofs without allocating full trees for large lists.
//! `ssz_rs`'s `Prove` trait materialises the whole tree, which for
//! `List<Validator, 2^40>` is not an option.
//!
//! # Approach
//! 1. Hash individual elements and container fields with `hash_tree_root()`
//! 2. Cache the populated part of each subtree, layer by layer
//! 3. Use precomputed "zero hashes" for empty subtrees
//!
//! Only the subtrees a proof has to descend through are expanded; everything
//! else is an opaque leaf holding its root.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use sha2::{Digest, Sha256};

use crate::gindex::{gindex_depth, power_of_two_ceil};
use crate::proof::ProofError;
use crate::types::Hash32;

/// Maximum supported tree depth
const MAX_DEPTH: usize = 64;

/// Precomputed zero hashes for each depth level.
/// `zero_hashes()[0]` = all-zeros (the zero leaf).
/// `zero_hashes()[i]` = hash(zero_hashes()[i-1], zero_hashes()[i-1])
pub fn zero_hashes() -> &'static [Hash32; MAX_DEPTH + 1] {
    static ZERO_HASHES: OnceLock<[Hash32; MAX_DEPTH + 1]> = OnceLock::new();
    ZERO_HASHES.get_or_init(|| {
        let mut hashes = [[0u8; 32]; MAX_DEPTH + 1];
        let mut hasher = Sha256::new();
        for i in 1..=MAX_DEPTH {
            hasher.update(hashes[i - 1]);
            hasher.update(hashes[i - 1]);
            hashes[i] = hasher.finalize_reset().into();
        }
        hashes
    })
}

/// SHA-256 hash of two 32-byte nodes
#[must_use]
pub fn hash_pair(left: &Hash32, right: &Hash32) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// The length chunk mixed into a list root: little-endian `length` padded to 32 bytes.
#[must_use]
pub fn length_chunk(length: u64) -> Hash32 {
    let mut chunk = [0u8; 32];
    chunk[..8].copy_from_slice(&length.to_le_bytes());
    chunk
}

/// Mix in the length for a List's Merkle root.
/// `list_root = hash(data_root, length_as_le_bytes32)`
#[must_use]
pub fn mix_in_length(data_root: Hash32, length: u64) -> Hash32 {
    hash_pair(&data_root, &length_chunk(length))
}

/// Tree depth needed to hold `count` chunks.
#[must_use]
pub const fn chunk_depth(count: u64) -> u32 {
    gindex_depth(power_of_two_ceil(count))
}

/// Leaf and sibling path of one node, siblings ordered from the leaf upwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtreeProof {
    pub leaf: Hash32,
    pub branch: Vec<Hash32>,
}

/// Anything that can hand out Merkle branches by generalized index.
pub trait ProofSource {
    /// Root of the whole source, recomputed from its own contents.
    fn hash_tree_root(&self) -> Hash32;

    /// Leaf at `gindex` and its siblings up to the root.
    ///
    /// # Errors
    /// `InvalidGindex` for 0, `OpaqueSubtree` if `gindex` lies below a node
    /// whose contents were not expanded.
    fn prove(&self, gindex: u64) -> Result<SubtreeProof, ProofError>;
}

/// `2^depth` leaf slots with the populated prefix cached layer by layer.
#[derive(Debug, Clone)]
pub struct ChunkTree {
    depth: u32,
    /// `layers[h]` holds the populated nodes at height `h` (0 = leaves).
    layers: Vec<Vec<Hash32>>,
    children: BTreeMap<u64, Subtree>,
}

impl ChunkTree {
    /// Build a tree of depth `depth` over `leaves`, padding with zero chunks.
    ///
    /// # Errors
    /// `IndexOutOfBounds` if `leaves` does not fit in `2^depth` slots.
    pub fn new(leaves: Vec<Hash32>, depth: u32) -> Result<Self, ProofError> {
        if depth as usize > MAX_DEPTH || (depth < 64 && leaves.len() as u64 > 1 << depth) {
            return Err(ProofError::IndexOutOfBounds {
                collection: "chunk tree leaves",
                index: leaves.len() as u64,
                limit: 1_u64.checked_shl(depth).unwrap_or(u64::MAX),
            });
        }

        let zh = zero_hashes();
        let mut layers = Vec::with_capacity(depth as usize + 1);
        layers.push(leaves);
        for height in 1..=depth as usize {
            let next: Vec<Hash32> = layers[height - 1]
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    [left] => hash_pair(left, &zh[height - 1]),
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();
            layers.push(next);
        }

        Ok(Self {
            depth,
            layers,
            children: BTreeMap::new(),
        })
    }

    /// Attach the expanded contents of leaf `position`.
    ///
    /// # Errors
    /// `LeafMismatch` if `child` does not hash to the cached leaf.
    pub fn with_child(mut self, position: u64, child: Subtree) -> Result<Self, ProofError> {
        let expected = self.node(0, position);
        let actual = child.root();
        if expected != actual {
            return Err(ProofError::LeafMismatch {
                what: "expanded subtree",
                expected,
                actual,
            });
        }
        self.children.insert(position, child);
        Ok(self)
    }

    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    #[must_use]
    pub fn root(&self) -> Hash32 {
        self.node(self.depth, 0)
    }

    /// Node at `height` above the leaves, `position` counted from the left.
    fn node(&self, height: u32, position: u64) -> Hash32 {
        usize::try_from(position)
            .ok()
            .and_then(|p| self.layers[height as usize].get(p))
            .copied()
            .unwrap_or(zero_hashes()[height as usize])
    }
}

/// A node of the overlay tree.
#[derive(Debug, Clone)]
pub enum Subtree {
    /// A node whose contents were not expanded; proofs stop here.
    Leaf(Hash32),
    /// Containers and vectors: a padded run of chunks.
    Chunks(ChunkTree),
    /// Lists: `hash(data, length)`.
    MixIn { data: Box<Subtree>, length: u64 },
}

impl Subtree {
    /// Container of opaque field roots.
    ///
    /// # Errors
    /// Never for realistic field counts.
    pub fn container(field_roots: Vec<Hash32>) -> Result<ChunkTree, ProofError> {
        let depth = chunk_depth(field_roots.len() as u64);
        ChunkTree::new(field_roots, depth)
    }

    /// Fixed-capacity vector of element roots.
    ///
    /// # Errors
    /// `IndexOutOfBounds` if more roots than `capacity` are supplied.
    pub fn vector(element_roots: Vec<Hash32>, capacity: u64) -> Result<ChunkTree, ProofError> {
        ChunkTree::new(element_roots, chunk_depth(capacity))
    }

    /// List of element roots with maximum length `limit`.
    ///
    /// # Errors
    /// `IndexOutOfBounds` if more roots than `limit` are supplied.
    pub fn list(element_roots: Vec<Hash32>, limit: u64) -> Result<Self, ProofError> {
        let length = element_roots.len() as u64;
        let data = ChunkTree::new(element_roots, chunk_depth(limit))?;
        Ok(Self::MixIn {
            data: Box::new(Self::Chunks(data)),
            length,
        })
    }

    #[must_use]
    pub fn root(&self) -> Hash32 {
        match self {
            Self::Leaf(root) => *root,
            Self::Chunks(tree) => tree.root(),
            Self::MixIn { data, length } => mix_in_length(data.root(), *length),
        }
    }
}

impl From<ChunkTree> for Subtree {
    fn from(tree: ChunkTree) -> Self {
        Self::Chunks(tree)
    }
}

/// A [`ProofSource`] over a [`Subtree`] overlay.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    root: Subtree,
}

impl MerkleTree {
    #[must_use]
    pub fn new(root: impl Into<Subtree>) -> Self {
        Self { root: root.into() }
    }
}

impl ProofSource for MerkleTree {
    fn hash_tree_root(&self) -> Hash32 {
        self.root.root()
    }

    fn prove(&self, gindex: u64) -> Result<SubtreeProof, ProofError> {
        if gindex == 0 {
            return Err(ProofError::InvalidGindex(gindex.into()));
        }

        let total = gindex_depth(gindex);
        let mut remaining = total;
        // Collected root-first, reversed before returning.
        let mut branch = Vec::with_capacity(total as usize);
        let mut node = &self.root;

        let leaf = loop {
            if remaining == 0 {
                break node.root();
            }
            match node {
                Subtree::Leaf(_) => {
                    return Err(ProofError::OpaqueSubtree {
                        gindex,
                        depth: total - remaining,
                    })
                }
                Subtree::MixIn { data, length } => {
                    remaining -= 1;
                    if (gindex >> remaining) & 1 == 0 {
                        branch.push(length_chunk(*length));
                        node = data;
                    } else {
                        branch.push(data.root());
                        if remaining > 0 {
                            return Err(ProofError::OpaqueSubtree {
                                gindex,
                                depth: total - remaining,
                            });
                        }
                        break length_chunk(*length);
                    }
                }
                Subtree::Chunks(tree) => {
                    let steps = remaining.min(tree.depth);
                    let position = (gindex >> (remaining - steps)) & ((1_u64 << steps) - 1);
                    for step in 1..=steps {
                        let ancestor = position >> (steps - step);
                        branch.push(tree.node(tree.depth - step, ancestor ^ 1));
                    }
                    remaining -= steps;

                    if steps < tree.depth {
                        break tree.node(tree.depth - steps, position);
                    }
                    match tree.children.get(&position) {
                        Some(child) => node = child,
                        None if remaining == 0 => break tree.node(0, position),
                        None => {
                            return Err(ProofError::OpaqueSubtree {
                                gindex,
                                depth: total - remaining,
                            })
                        }
                    }
                }
            }
        };

        branch.reverse();
        Ok(SubtreeProof { leaf, branch })
    }
}
