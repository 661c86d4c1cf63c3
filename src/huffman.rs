//! Greedy Huffman tree construction over the byte alphabet plus an
//! end-of-stream sentinel.
//!
//! Nodes live in an arena and refer to each other by index. Child links own
//! nothing; the whole tree is dropped at once with the arena. The parent link
//! exists only so code lengths and bit paths can be read off a leaf by
//! walking up to the root.

use log::{debug, info, trace};

use crate::error::{HuffmanError, Result};
use crate::frequency::{EOF_SYMBOL, FreqTable, SYMBOL_COUNT, Symbol};
use crate::pqueue::PriorityQueue;

pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub weight: u64,
    pub symbol: Option<Symbol>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub parent: Option<NodeId>,
}

impl Node {
    fn leaf(symbol: Symbol, weight: u64) -> Self {
        Node {
            weight,
            symbol: Some(symbol),
            left: None,
            right: None,
            parent: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Queue entry: the node's weight is copied in so the comparator never has to
/// look into the arena while it is being extended.
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    weight: u64,
    id: NodeId,
}

#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    leaves: [Option<NodeId>; SYMBOL_COUNT],
    root: NodeId,
}

impl HuffmanTree {
    /// Builds the tree for `frequencies`.
    ///
    /// Leaves are created in ascending symbol order with the sentinel last,
    /// internal nodes in merge order, and the queue breaks weight ties by that
    /// creation order. The same table therefore always yields the same tree.
    /// With empty input the sentinel is the only leaf and becomes the root at
    /// depth 0. Fails with `WeightOverflow` when the weights sum past `u64`.
    pub fn build(frequencies: &FreqTable) -> Result<Self> {
        let mut nodes: Vec<Node> = Vec::with_capacity(2 * SYMBOL_COUNT);
        let mut leaves = [None; SYMBOL_COUNT];
        let mut queue = PriorityQueue::new(|a: &QueueEntry, b: &QueueEntry| {
            a.weight.cmp(&b.weight).then(a.id.cmp(&b.id))
        });

        for (symbol, count) in frequencies.iter() {
            if count == 0 && symbol != EOF_SYMBOL {
                continue;
            }
            let weight = if symbol == EOF_SYMBOL { 0 } else { count };
            let id = nodes.len();
            nodes.push(Node::leaf(symbol, weight));
            leaves[symbol as usize] = Some(id);
            queue.push(QueueEntry { weight, id });
        }
        debug!("Queue populated with {} leaves", queue.len());

        while queue.len() > 1 {
            let a = queue.pop_min()?;
            let b = queue.pop_min()?;
            let weight = a
                .weight
                .checked_add(b.weight)
                .ok_or(HuffmanError::WeightOverflow)?;
            let id = nodes.len();
            nodes.push(Node {
                weight,
                symbol: None,
                left: Some(a.id),
                right: Some(b.id),
                parent: None,
            });
            nodes[a.id].parent = Some(id);
            nodes[b.id].parent = Some(id);
            trace!(
                "merged #{} ({}) + #{} ({}) into #{} ({})",
                a.id, a.weight, b.id, b.weight, id, weight
            );
            queue.push(QueueEntry { weight, id });
        }

        let root = queue.pop_min()?.id;
        info!(
            "Huffman tree ready: {} nodes, root weight {}",
            nodes.len(),
            nodes[root].weight
        );

        Ok(HuffmanTree {
            nodes,
            leaves,
            root,
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn leaf(&self, symbol: Symbol) -> Option<NodeId> {
        self.leaves.get(symbol as usize).copied().flatten()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.iter().flatten().count()
    }

    /// Follows one edge down: `false` is the left child, `true` the right.
    pub fn child(&self, id: NodeId, bit: bool) -> Option<NodeId> {
        let node = &self.nodes[id];
        if bit { node.right } else { node.left }
    }

    /// Number of parent links between the symbol's leaf and the root.
    pub fn depth(&self, symbol: Symbol) -> Option<usize> {
        let mut current = self.leaf(symbol)?;
        let mut depth = 0;
        while let Some(parent) = self.nodes[current].parent {
            depth += 1;
            current = parent;
        }
        Some(depth)
    }

    /// Bit path from the root down to the symbol's leaf.
    pub fn code(&self, symbol: Symbol) -> Option<Vec<bool>> {
        let mut current = self.leaf(symbol)?;
        let mut bits = Vec::new();
        while let Some(parent) = self.nodes[current].parent {
            bits.push(self.nodes[parent].right == Some(current));
            current = parent;
        }
        bits.reverse();
        Some(bits)
    }

    /// Sum of `weight * depth` over all leaves: the payload size in bits.
    pub fn weighted_length(&self) -> u64 {
        self.leaves
            .iter()
            .enumerate()
            .filter_map(|(s, id)| id.map(|id| (s as Symbol, id)))
            .map(|(s, id)| {
                self.nodes[id]
                    .weight
                    .saturating_mul(self.depth(s).unwrap_or(0) as u64)
            })
            .fold(0, u64::saturating_add)
    }

    pub fn codebook(&self) -> Codebook {
        let entries = (0..SYMBOL_COUNT as Symbol)
            .map(|symbol| {
                let id = self.leaf(symbol)?;
                let bits = self.code(symbol)?;
                Some(CodeEntry {
                    symbol,
                    weight: self.nodes[id].weight,
                    bits,
                })
            })
            .collect();
        Codebook { entries }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeEntry {
    pub symbol: Symbol,
    pub weight: u64,
    pub bits: Vec<bool>,
}

impl CodeEntry {
    /// Code length in bits, i.e. the leaf depth.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn total_bits(&self) -> u64 {
        self.weight.saturating_mul(self.len() as u64)
    }
}

/// One optional entry per symbol id, sentinel included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codebook {
    entries: Vec<Option<CodeEntry>>,
}

impl Codebook {
    pub fn get(&self, symbol: Symbol) -> Option<&CodeEntry> {
        self.entries.get(symbol as usize).and_then(Option::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CodeEntry> {
        self.entries.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lengths(tree: &HuffmanTree) -> Vec<Option<usize>> {
        (0..SYMBOL_COUNT as Symbol).map(|s| tree.depth(s)).collect()
    }

    fn is_prefix(a: &[bool], b: &[bool]) -> bool {
        a.len() <= b.len() && b[..a.len()] == *a
    }

    // Cheapest cost over every possible merge order, i.e. over every full
    // binary tree on these leaves.
    fn brute_force_cost(weights: Vec<u64>) -> u64 {
        if weights.len() <= 1 {
            return 0;
        }
        let mut best = u64::MAX;
        for i in 0..weights.len() {
            for j in i + 1..weights.len() {
                let merged = weights[i] + weights[j];
                let mut rest: Vec<u64> = weights
                    .iter()
                    .enumerate()
                    .filter(|&(k, _)| k != i && k != j)
                    .map(|(_, &w)| w)
                    .collect();
                rest.push(merged);
                best = best.min(merged + brute_force_cost(rest));
            }
        }
        best
    }

    #[test]
    fn test_scenario_aaab() {
        let tree = HuffmanTree::build(&FreqTable::from_bytes(b"aaab")).unwrap();
        assert_eq!(tree.depth(b'a' as Symbol), Some(1));
        assert_eq!(tree.depth(b'b' as Symbol), Some(2));
        assert_eq!(tree.depth(EOF_SYMBOL), Some(2));
        assert_eq!(tree.node(tree.root()).weight, 4);
        assert_eq!(tree.leaf_count(), 3);

        assert_eq!(tree.code(b'a' as Symbol), Some(vec![true]));
        assert_eq!(tree.code(EOF_SYMBOL), Some(vec![false, false]));
        assert_eq!(tree.code(b'b' as Symbol), Some(vec![false, true]));
        assert_eq!(tree.weighted_length(), 3 + 2);
    }

    #[test]
    fn test_empty_input_root_is_sentinel() {
        let tree = HuffmanTree::build(&FreqTable::from_bytes(b"")).unwrap();
        assert_eq!(tree.nodes().len(), 1);
        assert_eq!(tree.leaf(EOF_SYMBOL), Some(tree.root()));
        assert_eq!(tree.depth(EOF_SYMBOL), Some(0));
        assert_eq!(tree.code(EOF_SYMBOL), Some(vec![]));
        assert_eq!(tree.node(tree.root()).weight, 0);
    }

    #[test]
    fn test_single_symbol_gets_one_bit() {
        let tree = HuffmanTree::build(&FreqTable::from_bytes(b"zzzzzz")).unwrap();
        assert_eq!(tree.depth(b'z' as Symbol), Some(1));
        assert_eq!(tree.depth(EOF_SYMBOL), Some(1));
    }

    #[test]
    fn test_tree_is_full_binary() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let freq = FreqTable::from_bytes(data);
        let tree = HuffmanTree::build(&freq).unwrap();

        assert_eq!(tree.leaf_count(), freq.distinct() + 1);
        for node in tree.nodes() {
            assert_eq!(node.left.is_some(), node.right.is_some());
            assert_eq!(node.is_leaf(), node.symbol.is_some());
            if let (Some(l), Some(r)) = (node.left, node.right) {
                assert_eq!(node.weight, tree.node(l).weight + tree.node(r).weight);
            }
        }
        let roots: Vec<_> = tree.nodes().iter().filter(|n| n.parent.is_none()).collect();
        assert_eq!(roots.len(), 1);
        assert_eq!(tree.nodes().len(), 2 * tree.leaf_count() - 1);
    }

    #[test]
    fn test_codes_are_prefix_free() {
        let data: Vec<u8> = b"abracadabra, mississippi".to_vec();
        let book = HuffmanTree::build(&FreqTable::from_bytes(&data))
            .unwrap()
            .codebook();
        let codes: Vec<&CodeEntry> = book.iter().collect();
        for a in &codes {
            assert!(!a.is_empty());
            for b in &codes {
                if a.symbol != b.symbol {
                    assert!(!is_prefix(&a.bits, &b.bits));
                }
            }
        }
    }

    #[test]
    fn test_equal_weights_are_optimal() {
        let tree = HuffmanTree::build(&FreqTable::from_bytes(b"wxyz")).unwrap();
        assert_eq!(tree.leaf_count(), 5);
        assert_eq!(tree.weighted_length(), brute_force_cost(vec![1, 1, 1, 1, 0]));
        assert_eq!(tree.nodes().len(), 9);
    }

    #[test]
    fn test_skewed_weights_are_optimal() {
        let data = b"aaaaaaaaaaaabbbbbbccccdde";
        let tree = HuffmanTree::build(&FreqTable::from_bytes(data)).unwrap();
        assert_eq!(tree.weighted_length(), brute_force_cost(vec![12, 6, 4, 2, 1, 0]));
    }

    #[test]
    fn test_overflowing_weights_are_rejected() {
        let mut counts = [0u64; 256];
        counts[b'a' as usize] = u64::MAX;
        counts[b'b' as usize] = u64::MAX;
        let result = HuffmanTree::build(&FreqTable::from_counts(&counts));
        assert!(matches!(result, Err(HuffmanError::WeightOverflow)));
    }

    #[test]
    fn test_heaviest_representable_tree() {
        let mut counts = [0u64; 256];
        counts[b'a' as usize] = u64::MAX - 1;
        counts[b'b' as usize] = 1;
        let tree = HuffmanTree::build(&FreqTable::from_counts(&counts)).unwrap();
        assert_eq!(tree.node(tree.root()).weight, u64::MAX);
        assert_eq!(tree.weighted_length(), u64::MAX);
    }

    #[test]
    fn test_rebuild_gives_identical_lengths() {
        let freq = FreqTable::from_bytes(b"she sells sea shells by the sea shore");
        let first = HuffmanTree::build(&freq).unwrap();
        let second = HuffmanTree::build(&freq).unwrap();
        assert_eq!(lengths(&first), lengths(&second));
        assert_eq!(first.codebook(), second.codebook());
    }

    #[test]
    fn test_codebook_covers_alphabet() {
        let book = HuffmanTree::build(&FreqTable::from_bytes(b"aaab"))
            .unwrap()
            .codebook();
        assert_eq!(book.len(), SYMBOL_COUNT);
        assert_eq!(book.iter().count(), 3);
        assert!(book.get(b'c' as Symbol).is_none());
        let a = book.get(b'a' as Symbol).unwrap();
        assert_eq!((a.weight, a.len(), a.total_bits()), (3, 1, 3));
        assert_eq!(book.get(EOF_SYMBOL).unwrap().weight, 0);
    }
}
