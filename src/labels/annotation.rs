/// labels/annotation.rs — Grammar for tissue annotation fields
///
/// Annotated FASTA headers carry one field per tissue in which the region
/// was active, e.g. `forebrain[7/12]`: a name, then the number of embryos
/// showing expression over the number tested. The label schemes only ever
/// need the first number.
use regex::Regex;

use crate::error::{ClfError, Result};

/// Extracts the reproducibility count from a single, already-trimmed field.
pub trait AnnotationGrammar {
    fn count(&self, field: &str) -> Result<u64>;
}

/// `name[count/total]`, matched from the start of the field.
#[derive(Debug, Clone)]
pub struct BracketCount {
    pattern: Regex,
}

impl BracketCount {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(r"^([^\[]+)\[(\d+)/(\d+)\]")?,
        })
    }
}

impl AnnotationGrammar for BracketCount {
    fn count(&self, field: &str) -> Result<u64> {
        let caps = self.pattern.captures(field).ok_or_else(|| ClfError::Parse {
            field: field.to_string(),
            reason: "expected name[count/total]".into(),
        })?;

        caps[2].parse().map_err(|e| ClfError::Parse {
            field: field.to_string(),
            reason: format!("count does not fit: {e}"),
        })
    }
}
