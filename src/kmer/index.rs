/// kmer/index.rs — Column index over all 4^k k-mers
///
/// Every k-mer over {a,c,g,t} gets one feature column. The enumeration is
/// collected into an ordered set before numbering, so the same k always
/// produces the same columns: index 0 is `aaa…a`, the last is `ttt…t`,
/// and everything in between is lexicographic.
use std::collections::{BTreeSet, HashMap};

use crate::config::validate_k;
use crate::error::Result;

pub const ALPHABET: [u8; 4] = [b'a', b'c', b'g', b't'];

/// Read-only bijection between k-mer strings and column numbers.
#[derive(Debug, Clone)]
pub struct KmerIndex {
    k: usize,
    /// column → k-mer
    columns: Vec<String>,
    /// k-mer → column
    lookup: HashMap<String, usize>,
}

impl KmerIndex {
    pub fn build(k: usize) -> Result<Self> {
        validate_k(k)?;

        let total = ALPHABET.len().pow(k as u32);
        let mut kmers: BTreeSet<String> = BTreeSet::new();
        for code in 0..total {
            kmers.insert(decode(code, k));
        }

        let columns: Vec<String> = kmers.into_iter().collect();
        let lookup = columns
            .iter()
            .enumerate()
            .map(|(i, kmer)| (kmer.clone(), i))
            .collect();

        Ok(Self { k, columns, lookup })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of columns, always 4^k.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn index_of(&self, kmer: &str) -> Option<usize> {
        self.lookup.get(kmer).copied()
    }

    pub fn kmer_at(&self, column: usize) -> Option<&str> {
        self.columns.get(column).map(|s| s.as_str())
    }
}

/// Spell out `code` as a k-long base-4 word over ALPHABET, most
/// significant digit first.
fn decode(mut code: usize, k: usize) -> String {
    let mut kmer = vec![ALPHABET[0]; k];
    for slot in kmer.iter_mut().rev() {
        *slot = ALPHABET[code & 0b11];
        code >>= 2;
    }
    // ALPHABET is ASCII
    kmer.into_iter().map(char::from).collect()
}
