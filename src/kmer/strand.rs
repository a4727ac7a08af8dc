/// kmer/strand.rs — Watson-Crick complement and strand collapse
///
/// The fixed pairing is biological convention:
///   A ↔ T
///   G ↔ C
/// Case is preserved so that lower-cased sequences stay lower-cased.
/// Anything else (N, IUPAC ambiguity codes) maps to the sentinel `N`.

pub const SENTINEL: u8 = b'N';

pub fn complement(base: u8) -> u8 {
    match base {
        b'a' => b't',
        b't' => b'a',
        b'c' => b'g',
        b'g' => b'c',
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        _ => SENTINEL,
    }
}

/// Reverse the k-mer and complement each base.
pub fn reverse_complement(kmer: &[u8]) -> Vec<u8> {
    kmer.iter().rev().map(|&b| complement(b)).collect()
}

/// Strand-collapse rule: a k-mer is counted only when it differs from its
/// own reverse complement. Self-complementary k-mers read the same from
/// both strands and are dropped entirely, not counted once.
pub fn is_counted(kmer: &[u8]) -> bool {
    !kmer
        .iter()
        .zip(kmer.iter().rev())
        .all(|(&fwd, &rev)| fwd == complement(rev))
}
