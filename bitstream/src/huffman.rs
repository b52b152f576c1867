//! Static Huffman model for the in-band mode.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::entropy::{load_bit, store_bit, EntropyCoder};

const SYMBOLS: usize = 256;

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf(u8),
    Branch([usize; 2]),
}

/// A fixed prefix code over byte symbols.
///
/// Both peers must build the coder from the same frequency table. Symbols with
/// a zero count still receive a code, so any byte can be encoded.
#[derive(Debug, Clone)]
pub struct HuffmanCoder {
    nodes: Vec<Node>,
    root: usize,
    codes: Vec<Vec<bool>>,
}

impl HuffmanCoder {
    /// Builds a coder from per-symbol occurrence counts.
    #[must_use]
    pub fn from_frequencies(frequencies: &[u32; SYMBOLS]) -> Self {
        let mut nodes: Vec<Node> = (0..SYMBOLS).map(|s| Node::Leaf(s as u8)).collect();
        // Ties break on node index so construction is deterministic.
        let mut heap: BinaryHeap<Reverse<(u64, usize)>> = frequencies
            .iter()
            .enumerate()
            .map(|(idx, count)| Reverse((u64::from((*count).max(1)), idx)))
            .collect();

        while heap.len() > 1 {
            let (Some(Reverse((w0, n0))), Some(Reverse((w1, n1)))) = (heap.pop(), heap.pop())
            else {
                break;
            };
            nodes.push(Node::Branch([n0, n1]));
            heap.push(Reverse((w0 + w1, nodes.len() - 1)));
        }
        let root = nodes.len() - 1;

        let mut codes = vec![Vec::new(); SYMBOLS];
        let mut stack = vec![(root, Vec::new())];
        while let Some((idx, path)) = stack.pop() {
            match nodes[idx] {
                Node::Leaf(symbol) => codes[usize::from(symbol)] = path,
                Node::Branch([zero, one]) => {
                    let mut one_path = path.clone();
                    one_path.push(true);
                    let mut zero_path = path;
                    zero_path.push(false);
                    stack.push((one, one_path));
                    stack.push((zero, zero_path));
                }
            }
        }

        Self { nodes, root, codes }
    }

    /// Builds a coder from the byte distribution of a sample payload.
    #[must_use]
    pub fn train(sample: &[u8]) -> Self {
        let mut frequencies = [0u32; SYMBOLS];
        for byte in sample {
            let slot = &mut frequencies[usize::from(*byte)];
            *slot = slot.saturating_add(1);
        }
        Self::from_frequencies(&frequencies)
    }

    /// Returns the code length in bits for `symbol`.
    #[must_use]
    pub fn code_len(&self, symbol: u8) -> usize {
        self.codes[usize::from(symbol)].len()
    }
}

impl EntropyCoder for HuffmanCoder {
    fn put_bit(&self, buf: &mut [u8], bit_pos: usize, bit: bool) {
        store_bit(buf, bit_pos, bit);
    }

    fn put_symbol(&self, buf: &mut [u8], bit_pos: usize, symbol: u8) -> usize {
        let code = &self.codes[usize::from(symbol)];
        for (offset, bit) in code.iter().enumerate() {
            store_bit(buf, bit_pos + offset, *bit);
        }
        code.len()
    }

    fn get_bit(&self, buf: &[u8], bit_pos: usize) -> bool {
        load_bit(buf, bit_pos)
    }

    fn get_symbol(&self, buf: &[u8], bit_pos: usize) -> (u8, usize) {
        let mut node = self.root;
        let mut consumed = 0;
        loop {
            match self.nodes[node] {
                Node::Leaf(symbol) => return (symbol, consumed),
                Node::Branch(children) => {
                    let bit = load_bit(buf, bit_pos + consumed);
                    consumed += 1;
                    node = children[usize::from(bit)];
                }
            }
        }
    }
}
