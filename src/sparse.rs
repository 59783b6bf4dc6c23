//! Sparse representation: 32-bit encoded hashes at a fixed high precision.
//!
//! Until the register file is worth allocating, hashes are kept as encoded
//! 32-bit values at precision `P_PRIME = 25`. The encoding preserves enough
//! of the original hash that decoding at any precision `p <= P_PRIME`
//! reproduces the exact register index and rank a direct dense insertion
//! would have produced.
//!
//! Encoded hash layout (bit 0 is the discriminator):
//! - flagged (bit 0 = 1): bits 1..=6 hold the leading-zero count of the
//!   hash portion below the `P_PRIME` index bits, plus one; bits 7.. hold
//!   the `P_PRIME`-bit index. Chosen when the hash bits between positions
//!   `64 - p` and `64 - P_PRIME` are all zero, because then the index alone
//!   cannot determine the rank.
//! - unflagged (bit 0 = 0): just the `P_PRIME`-bit index shifted up one.
//!   The rank is recovered by re-counting leading zeros of the index bits
//!   below the `p`-bit prefix.
//!
//! New hashes land in an unordered temporary set; once the set outgrows one
//! percent of the register count it is flushed into the sorted
//! delta-compressed list, collapsing exact duplicates.

use hashbrown::HashSet;

use crate::bits::{extract_u32, extract_u64};
use crate::dense::Dense;
use crate::estimate::linear_counting;
use crate::representation::RepresentationTrait;
use crate::varint::CompressedList;

/// Precision of the sparse encoding.
pub(crate) const P_PRIME: u8 = 25;
/// Register count backing the sparse linear-counting estimate.
pub(crate) const M_PRIME: u32 = 1 << (P_PRIME - 1);

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Sparse {
    p: u8,
    tmp_set: HashSet<u32>,
    list: CompressedList,
}

/// Encode a hash at precision `P_PRIME`, tagged so that decoding at any
/// `p <= P_PRIME` recovers the dense `(index, rank)` pair.
pub(crate) fn encode_hash(p: u8, x: u64) -> u32 {
    let idx = extract_u64(x, 64, 64 - P_PRIME) as u32;

    if extract_u64(x, 64 - p, 64 - P_PRIME) == 0 {
        let w = extract_u64(x, 64 - P_PRIME, 0) << P_PRIME | 1 << (P_PRIME - 1);
        let zeros = w.leading_zeros() + 1;
        idx << 7 | (zeros & 0x3f) << 1 | 1
    } else {
        idx << 1
    }
}

/// Recover the dense register index and rank from an encoded hash.
pub(crate) fn decode_hash(p: u8, k: u32) -> (usize, u8) {
    if k & 1 == 1 {
        let rank = extract_u32(k, 7, 1) as u8 + (P_PRIME - p);
        (extract_u32(k, 32, 32 - p) as usize, rank)
    } else {
        let rank = (k << (32 - P_PRIME + p - 1)).leading_zeros() as u8 + 1;
        (
            extract_u32(k, P_PRIME + 1, P_PRIME - p + 1) as usize,
            rank,
        )
    }
}

impl Sparse {
    pub(crate) fn new(p: u8) -> Self {
        Self {
            p,
            tmp_set: HashSet::new(),
            list: CompressedList::default(),
        }
    }

    /// Flush the temporary set into the sorted list, collapsing exact
    /// duplicates.
    pub(crate) fn flush(&mut self) {
        let mut keys: Vec<u32> = self.tmp_set.iter().copied().collect();
        keys.sort_unstable();

        let mut merged = CompressedList::with_capacity(self.list.len_bytes() + keys.len() * 4);
        let mut cursor = self.list.iter();
        let mut i = 0;
        loop {
            match (cursor.peek(), keys.get(i).copied()) {
                (None, None) => break,
                (Some(x), None) => {
                    merged.append(x);
                    cursor.next();
                }
                (None, Some(k)) => {
                    merged.append(k);
                    i += 1;
                }
                (Some(x), Some(k)) => {
                    if x == k {
                        merged.append(x);
                        cursor.next();
                        i += 1;
                    } else if x > k {
                        merged.append(k);
                        i += 1;
                    } else {
                        merged.append(x);
                        cursor.next();
                    }
                }
            }
        }

        self.list = merged;
        self.tmp_set.clear();
    }

    /// Whether the sorted list has outgrown the dense register file.
    pub(crate) fn should_promote(&self) -> bool {
        u64::from(self.list.count()) > 1u64 << self.p
    }

    /// Build the dense register file this sparse content stands for.
    /// Pending temporary entries are flushed first.
    pub(crate) fn promote(&mut self) -> Dense {
        if !self.tmp_set.is_empty() {
            self.flush();
        }
        let mut dense = Dense::new(self.p);
        for k in self.list.iter() {
            let (i, rank) = decode_hash(self.p, k);
            dense.update_rank(i, rank);
        }
        dense
    }

    /// Fold this sparse content into a register file of the same precision
    /// without consuming pending entries.
    pub(crate) fn fold_into(&self, dense: &mut Dense) {
        for &k in self.tmp_set.iter() {
            let (i, rank) = decode_hash(self.p, k);
            dense.update_rank(i, rank);
        }
        for k in self.list.iter() {
            let (i, rank) = decode_hash(self.p, k);
            dense.update_rank(i, rank);
        }
    }

    pub(crate) fn precision(&self) -> u8 {
        self.p
    }

    #[cfg(feature = "with_serde")]
    pub(crate) fn list(&self) -> &CompressedList {
        &self.list
    }

    #[cfg(feature = "with_serde")]
    pub(crate) fn tmp_set(&self) -> &HashSet<u32> {
        &self.tmp_set
    }

    #[cfg(feature = "with_serde")]
    pub(crate) fn from_parts(p: u8, tmp_set: HashSet<u32>, list: CompressedList) -> Self {
        Self { p, tmp_set, list }
    }
}

impl RepresentationTrait for Sparse {
    fn insert_hash(&mut self, x: u64) {
        self.tmp_set.insert(encode_hash(self.p, x));
        if self.tmp_set.len() * 100 > 1 << self.p {
            self.flush();
        }
    }

    fn count(&mut self) -> u64 {
        self.flush();
        let m = f64::from(M_PRIME);
        linear_counting(m, m - f64::from(self.list.count())) as u64
    }

    fn size_of(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.tmp_set.capacity() * std::mem::size_of::<u32>()
            + self.list.len_bytes()
    }
}
