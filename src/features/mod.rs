/// features/mod.rs — One sequence → one feature row
///
/// Row layout, fixed for a given k:
///
///   [0, 4^k)        strand-collapsed k-mer counts (optionally L1-scaled)
///   4^k             E-box indicator
///   4^k + 1         TAAT-core indicator
///
/// Normalisation touches the count block only; the motif columns always
/// stay exactly 0.0 or 1.0.
pub mod motif;
pub mod select;

use tracing::debug;

use crate::config::AmbiguityPolicy;
use crate::error::{ClfError, Result};
use crate::kmer::{self, strand, KmerIndex};
use motif::{MotifScanner, MOTIF_COLUMNS, MOTIF_NAMES};

/// Counts for one sequence plus how many windows were dropped as ambiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct KmerCounts {
    pub counts: Vec<f64>,
    pub skipped: usize,
}

/// Borrowing builder. The index is shared read-only, so one builder can
/// serve any number of rows, including from several threads.
#[derive(Debug, Clone)]
pub struct FeatureVectorBuilder<'a> {
    index: &'a KmerIndex,
    motifs: MotifScanner,
    policy: AmbiguityPolicy,
}

impl<'a> FeatureVectorBuilder<'a> {
    pub fn new(index: &'a KmerIndex, policy: AmbiguityPolicy) -> Result<Self> {
        Ok(Self {
            index,
            motifs: MotifScanner::new()?,
            policy,
        })
    }

    /// Total row width: 4^k + 2.
    pub fn width(&self) -> usize {
        self.index.len() + MOTIF_COLUMNS
    }

    /// Slide a k-window over `seq` and count every non-palindromic k-mer.
    ///
    /// Sequences shorter than k give an all-zero block. A window with a
    /// base outside a/c/g/t is an error under `Reject` and dropped under
    /// `Skip`.
    pub fn kmer_counts(&self, seq: &str) -> Result<KmerCounts> {
        let mut counts = vec![0.0; self.index.len()];
        let mut skipped = 0usize;

        for (position, window) in kmer::windows(seq.as_bytes(), self.index.k()) {
            if !strand::is_counted(window) {
                continue;
            }
            let column = std::str::from_utf8(window)
                .ok()
                .and_then(|kmer| self.index.index_of(kmer));

            match (column, self.policy) {
                (Some(col), _) => counts[col] += 1.0,
                (None, AmbiguityPolicy::Skip) => skipped += 1,
                (None, AmbiguityPolicy::Reject) => {
                    return Err(ClfError::Lookup {
                        kmer: String::from_utf8_lossy(window).into_owned(),
                        position,
                    });
                }
            }
        }

        if skipped > 0 {
            debug!(skipped, "dropped ambiguous k-mers from row");
        }

        Ok(KmerCounts { counts, skipped })
    }

    /// Full feature row for `seq`.
    pub fn build_row(&self, seq: &str, normalize: bool) -> Result<KmerCounts> {
        let KmerCounts { mut counts, skipped } = self.kmer_counts(seq)?;
        if normalize {
            l1_normalize(&mut counts);
        }
        counts.extend_from_slice(&self.motifs.flags(seq));
        Ok(KmerCounts { counts, skipped })
    }
}

/// Name of feature column `column`: its k-mer, or the motif it flags.
pub fn column_name(index: &KmerIndex, column: usize) -> Option<&str> {
    index
        .kmer_at(column)
        .or_else(|| MOTIF_NAMES.get(column.checked_sub(index.len())?).copied())
}

/// Divide each entry by the L1 norm of the slice. An all-zero slice is
/// left untouched instead of turning into NaN.
pub fn l1_normalize(values: &mut [f64]) {
    let norm: f64 = values.iter().map(|v| v.abs()).sum();
    if norm > 0.0 {
        for v in values.iter_mut() {
            *v /= norm;
        }
    }
}
