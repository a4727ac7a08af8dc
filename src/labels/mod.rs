/// labels/mod.rs — Labels derived from FASTA descriptions
///
/// Descriptions are `|`-delimited:
///
///   hs1|chr16:84987588-84989638|element 1|positive|neural tube[12/12]|limb[3/12]
///   0   1                       2         3        4 …
///
/// Field 3 carries the enhancer call, fields 4 onward carry one tissue
/// annotation each. Three independent schemes read them:
///
///   binary      positive → +1, anything else → -1
///   tissue      none 0, brain 1, limb 2, neural 3
///   fine-grain  none 0, forebrain 1, midbrain 2, hindbrain 3
///
/// The tissue schemes pick the category with the highest count. On a tie
/// the category seen first keeps the label.
pub mod annotation;

use crate::config::Task;
use crate::error::{ClfError, Result};
use annotation::{AnnotationGrammar, BracketCount};

pub type Label = i32;

pub const POSITIVE: Label = 1;
pub const NEGATIVE: Label = -1;
/// No recognised tissue in any annotation field.
pub const UNLABELLED: Label = 0;

const STATUS_FIELD: usize = 3;
const FIRST_TISSUE_FIELD: usize = 4;

/// Substring → label, checked in this order within each field.
const TISSUES: &[(&str, Label)] = &[("brain", 1), ("limb", 2), ("neural", 3)];
const BRAIN_REGIONS: &[(&str, Label)] = &[("midbrain", 2), ("forebrain", 1), ("hindbrain", 3)];

#[derive(Debug, Clone)]
pub struct LabelDeriver<G = BracketCount> {
    grammar: G,
}

impl LabelDeriver<BracketCount> {
    pub fn new() -> Result<Self> {
        Ok(Self::with_grammar(BracketCount::new()?))
    }
}

impl<G: AnnotationGrammar> LabelDeriver<G> {
    pub fn with_grammar(grammar: G) -> Self {
        Self { grammar }
    }

    /// Label `description` under the scheme `task` uses.
    pub fn derive(&self, task: Task, description: &str) -> Result<Label> {
        match task {
            Task::Enhancer => binary(description),
            Task::Tissue => self.tissue(description),
            Task::FineGrain => self.fine_grain(description),
        }
    }

    pub fn tissue(&self, description: &str) -> Result<Label> {
        self.ranked(description, TISSUES)
    }

    pub fn fine_grain(&self, description: &str) -> Result<Label> {
        self.ranked(description, BRAIN_REGIONS)
    }

    fn ranked(&self, description: &str, categories: &[(&str, Label)]) -> Result<Label> {
        let mut best: Option<(Label, u64)> = None;

        for raw in description.split('|').skip(FIRST_TISSUE_FIELD) {
            let field = raw.trim();
            for &(needle, label) in categories {
                if !field.contains(needle) {
                    continue;
                }
                let count = self.grammar.count(field)?;
                // strictly greater: the first maximum stays
                if best.map_or(true, |(_, top)| count > top) {
                    best = Some((label, count));
                }
            }
        }

        Ok(best.map_or(UNLABELLED, |(label, _)| label))
    }
}

/// Enhancer call from field 3.
pub fn binary(description: &str) -> Result<Label> {
    let status = description
        .split('|')
        .nth(STATUS_FIELD)
        .ok_or_else(|| ClfError::Parse {
            field: description.to_string(),
            reason: format!("description has no field {STATUS_FIELD}"),
        })?;

    Ok(if status.trim() == "positive" { POSITIVE } else { NEGATIVE })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VISTA: &str = "hs1|chr16:84987588-84989638|element 1|positive|neural tube[12/12]|hindbrain (rhombencephalon)[12/12]|limb[3/12]|cranial nerve[8/12]";

    fn deriver() -> LabelDeriver {
        LabelDeriver::new().unwrap()
    }

    #[test]
    fn test_binary_label() {
        assert_eq!(binary("x|x|x|positive|limb[5/10]").unwrap(), POSITIVE);
        assert_eq!(binary("x|x|x| positive ").unwrap(), POSITIVE);
        assert_eq!(binary("x|x|x|negative").unwrap(), NEGATIVE);
        assert_eq!(binary("x|x|x|Positive").unwrap(), NEGATIVE);
    }

    #[test]
    fn test_binary_label_missing_field() {
        assert!(matches!(binary("chr1|100|200"), Err(ClfError::Parse { .. })));
    }

    #[test]
    fn test_limb_beats_forebrain() {
        let d = deriver();
        let desc = "x|x|x|positive|limb[5/10]|forebrain[2/10]";
        assert_eq!(d.derive(Task::Enhancer, desc).unwrap(), POSITIVE);
        assert_eq!(d.tissue(desc).unwrap(), 2);
        assert_eq!(d.fine_grain(desc).unwrap(), 1);
    }

    #[test]
    fn test_tie_keeps_first_seen() {
        let d = deriver();
        assert_eq!(d.tissue("x|x|x|positive|limb[4/9]|midbrain[4/9]").unwrap(), 2);
        assert_eq!(d.tissue("x|x|x|positive|midbrain[4/9]|limb[4/9]").unwrap(), 1);
        assert_eq!(d.fine_grain("x|x|x|positive|hindbrain[6/9]|forebrain[6/9]").unwrap(), 3);
    }

    #[test]
    fn test_vista_header() {
        let d = deriver();
        // neural 12 is seen before hindbrain's brain 12
        assert_eq!(d.tissue(VISTA).unwrap(), 3);
        assert_eq!(d.fine_grain(VISTA).unwrap(), 3);
    }

    #[test]
    fn test_no_recognised_tissue() {
        let d = deriver();
        let desc = "x|x|x|positive|heart[9/10]|eye[2/10]";
        assert_eq!(d.tissue(desc).unwrap(), UNLABELLED);
        assert_eq!(d.fine_grain(desc).unwrap(), UNLABELLED);
        assert_eq!(d.tissue("x|x|x|negative").unwrap(), UNLABELLED);
    }

    #[test]
    fn test_brain_only_in_fine_grain_is_ignored() {
        // plain "brain" is a tissue, but not a brain region
        let d = deriver();
        assert_eq!(d.fine_grain("x|x|x|positive|brain[5/5]").unwrap(), UNLABELLED);
        assert_eq!(d.tissue("x|x|x|positive|brain[5/5]").unwrap(), 1);
    }

    #[test]
    fn test_malformed_recognised_field_fails() {
        let d = deriver();
        let err = d.tissue("x|x|x|positive|limb 5 of 10").unwrap_err();
        assert!(matches!(err, ClfError::Parse { .. }));
    }

    #[test]
    fn test_malformed_unrecognised_field_ignored() {
        let d = deriver();
        assert_eq!(d.tissue("x|x|x|positive|heart|limb[1/2]").unwrap(), 2);
    }

    struct FixedCount(u64);

    impl AnnotationGrammar for FixedCount {
        fn count(&self, _field: &str) -> Result<u64> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_grammar_is_swappable() {
        let d = LabelDeriver::with_grammar(FixedCount(1));
        // every field scores equally, so the first recognised one wins
        assert_eq!(d.tissue("x|x|x|positive|limb 5 of 10|midbrain").unwrap(), 2);
    }
}
