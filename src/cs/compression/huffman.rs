use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bitvec::prelude::*;
use log::debug;

use crate::cs::compression::code_table::{self, CodeTable, FrequencyTable};
use crate::cs::compression::{Compression, Result};

/// A node of the Huffman tree arena.
///
/// Leaves carry a symbol and no children; internal nodes carry two children
/// and no symbol. Children are arena indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanNode {
    pub weight: u64,
    pub symbol: Option<u8>,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

impl HuffmanNode {
    fn leaf(symbol: u8, weight: u64) -> Self {
        Self {
            weight,
            symbol: Some(symbol),
            left: None,
            right: None,
        }
    }

    /// Returns true if the node owns a symbol.
    pub fn is_leaf(&self) -> bool {
        self.symbol.is_some()
    }
}

/// Huffman tree stored as an arena; the root is one index into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: Vec<HuffmanNode>,
    root: usize,
}

impl HuffmanTree {
    /// Index of the root node.
    pub fn root(&self) -> usize {
        self.root
    }

    /// Node at `id`.
    pub fn node(&self, id: usize) -> &HuffmanNode {
        &self.nodes[id]
    }

    /// All nodes, leaves first in first-seen order, then internal nodes in
    /// creation order.
    pub fn nodes(&self) -> &[HuffmanNode] {
        &self.nodes
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// Number of internal nodes.
    pub fn internal_count(&self) -> usize {
        self.nodes.len() - self.leaf_count()
    }
}

/// Priority queue entry. The node id doubles as the insertion sequence, so
/// equal weights are broken in favour of the node created first.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct HeapEntry {
    weight: u64,
    node: usize,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse: lower weight, then lower id, should come first.
        (other.weight, other.node).cmp(&(self.weight, self.node))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Build a frequency table over every byte of `input`.
pub fn build_frequency_table(input: &[u8]) -> FrequencyTable {
    FrequencyTable::from_bytes(input)
}

/// Build the Huffman tree given a frequency table.
/// Returns `None` if the frequency table is empty.
///
/// Leaves enter the queue in first-seen order. The first node popped in each
/// round becomes the left child.
pub fn build_huffman_tree(freq_table: &FrequencyTable) -> Option<HuffmanTree> {
    if freq_table.is_empty() {
        return None;
    }

    let mut nodes: Vec<HuffmanNode> = freq_table
        .symbols()
        .iter()
        .map(|&symbol| HuffmanNode::leaf(symbol, freq_table.count(symbol)))
        .collect();
    let mut heap: BinaryHeap<HeapEntry> = nodes
        .iter()
        .enumerate()
        .map(|(node, leaf)| HeapEntry {
            weight: leaf.weight,
            node,
        })
        .collect();

    // Combine nodes until only one tree remains.
    while heap.len() > 1 {
        let (Some(left), Some(right)) = (heap.pop(), heap.pop()) else {
            break;
        };
        let id = nodes.len();
        let weight = left.weight + right.weight;
        nodes.push(HuffmanNode {
            weight,
            symbol: None,
            left: Some(left.node),
            right: Some(right.node),
        });
        heap.push(HeapEntry { weight, node: id });
    }

    let root = heap.pop().map_or(0, |entry| entry.node);
    Some(HuffmanTree { nodes, root })
}

/// Walk the tree and build a fresh code table, `0` for left and `1` for right.
///
/// If the tree consists of a single leaf (one unique symbol), the code "0" is assigned.
pub fn build_code_table(tree: &HuffmanTree) -> CodeTable {
    let mut table = CodeTable::new();
    build_code_table_helper(tree, tree.root(), BitVec::new(), &mut table);
    table
}

fn build_code_table_helper(
    tree: &HuffmanTree,
    id: usize,
    prefix: BitVec<u8, Msb0>,
    table: &mut CodeTable,
) {
    let node = tree.node(id);
    if let Some(symbol) = node.symbol {
        let code = if prefix.is_empty() {
            bitvec![u8, Msb0; 0]
        } else {
            prefix
        };
        table.insert(symbol, code);
        return;
    }
    if let Some(left) = node.left {
        let mut left_prefix = prefix.clone();
        left_prefix.push(false);
        build_code_table_helper(tree, left, left_prefix, table);
    }
    if let Some(right) = node.right {
        let mut right_prefix = prefix;
        right_prefix.push(true);
        build_code_table_helper(tree, right, right_prefix, table);
    }
}

/// Builds the model from `input` and returns its code table.
pub fn code_table_for(input: &[u8]) -> CodeTable {
    build_huffman_tree(&build_frequency_table(input))
        .map(|tree| build_code_table(&tree))
        .unwrap_or_default()
}

/// Convenience function: builds the Huffman tree from input and serializes
/// the code table plus encoded payload into a container.
pub fn huffman_encode(input: &[u8]) -> Result<Vec<u8>> {
    let table = code_table_for(input);
    debug!(
        "huffman: {} input bytes, {} distinct symbols",
        input.len(),
        table.len()
    );
    code_table::write_container(input, &table)
}

/// Convenience function: decodes a container using the code table stored in it.
pub fn huffman_decode(container: &[u8]) -> Result<Vec<u8>> {
    code_table::read_container(container)
}

/// Huffman coding with the table-based container.
///
/// # Example
///
/// ```
/// use classic_codecs::cs::compression::huffman::Huffman;
/// use classic_codecs::cs::compression::Compression;
///
/// let data = b"this is an example for huffman encoding";
/// let compressed = Huffman.compress(data).unwrap();
/// assert_eq!(Huffman.decompress(&compressed).unwrap(), data);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Huffman;

impl Compression for Huffman {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        huffman_encode(data)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        huffman_decode(data)
    }
}
