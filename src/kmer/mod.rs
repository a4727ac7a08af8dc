/// kmer/mod.rs — k-mer enumeration and strand handling
///
/// Both pieces are pure and built once per run. Feature extraction reads
/// them through shared references only.
pub mod index;
pub mod strand;

pub use index::KmerIndex;

/// Every k-long window of `seq`, stride 1, with its start position.
/// Empty when `seq` is shorter than `k`. `k` is non-zero once it has
/// passed `KmerIndex::build`.
pub fn windows(seq: &[u8], k: usize) -> impl Iterator<Item = (usize, &[u8])> {
    seq.windows(k.max(1)).enumerate()
}
