//! Greedy rank-based pair merging.
//!
//! A chunk enters as one [`Symbol`] per source byte. The lowest-ranked adjacent pair
//! (leftmost on ties) is merged, together with every later occurrence of the same pair,
//! until no adjacent pair has a rank. Each symbol carries the number of source bytes it
//! covers so that character offsets can be rebuilt after merging.

use crate::core::merges::MergeRules;

/// A vocabulary id plus the number of source bytes it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub id: u32,
    pub len: u32,
}

impl Symbol {
    #[inline]
    pub fn new(id: u32, len: u32) -> Self {
        Self { id, len }
    }
}

/// Current state of a chunk during or after merging.
pub type SymbolList = Vec<Symbol>;

/// Merge `symbols` in place until no adjacent pair is mergeable.
///
/// Worst case is quadratic in the chunk length; chunks are single words so this stays
/// cheap in practice.
pub fn apply_merges(symbols: &mut SymbolList, merges: &MergeRules) {
    while symbols.len() >= 2 {
        let mut best: Option<(usize, u32, u32)> = None;
        for (pos, window) in symbols.windows(2).enumerate() {
            if let Some((rank, new_id)) = merges.get((window[0].id, window[1].id)) {
                if best.map_or(true, |(_, best_rank, _)| rank < best_rank) {
                    best = Some((pos, rank, new_id));
                }
            }
        }

        let Some((pos, _, new_id)) = best else {
            break;
        };

        let (left, right) = (symbols[pos].id, symbols[pos + 1].id);
        let mut i = pos;
        while i + 1 < symbols.len() {
            if symbols[i].id == left && symbols[i + 1].id == right {
                let len = symbols[i].len + symbols[i + 1].len;
                symbols[i] = Symbol::new(new_id, len);
                symbols.remove(i + 1);
            }
            i += 1;
        }
    }
}
