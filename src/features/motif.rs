/// features/motif.rs — Regulatory motif indicator columns
///
/// Two binary features appended after the k-mer block, computed on the
/// raw lower-case sequence:
///
///   E-box      `ca[atcg]{2}tg` found anywhere in the sequence
///   TAAT-core  the whole sequence is `[atgc]+taat[atcg]+`
///
/// The TAAT check is anchored at both ends, so one stray `n` anywhere in
/// the sequence switches it off even if a `taat` is present.
use regex::Regex;

use crate::error::Result;

const EBOX_PATTERN: &str = "ca[atcg]{2}tg";
const TAAT_CORE_PATTERN: &str = "^[atgc]+taat[atcg]+$";

/// Number of columns this module contributes to each row.
pub const MOTIF_COLUMNS: usize = 2;
/// Column names, in the order `flags` returns them.
pub const MOTIF_NAMES: [&str; MOTIF_COLUMNS] = ["E-box", "TAAT-core"];

#[derive(Debug, Clone)]
pub struct MotifScanner {
    ebox: Regex,
    taat_core: Regex,
}

impl MotifScanner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            ebox: Regex::new(EBOX_PATTERN)?,
            taat_core: Regex::new(TAAT_CORE_PATTERN)?,
        })
    }

    pub fn ebox(&self, seq: &str) -> f64 {
        indicator(self.ebox.is_match(seq))
    }

    pub fn taat_core(&self, seq: &str) -> f64 {
        indicator(self.taat_core.is_match(seq))
    }

    /// `[E-box, TAAT-core]`, in column order.
    pub fn flags(&self, seq: &str) -> [f64; MOTIF_COLUMNS] {
        [self.ebox(seq), self.taat_core(seq)]
    }
}

fn indicator(hit: bool) -> f64 {
    if hit {
        1.0
    } else {
        0.0
    }
}
