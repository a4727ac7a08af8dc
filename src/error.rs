use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClfError {
    // ── configuration ─────────────────────────────────────────────────
    #[error("Invalid configuration: {0}")]
    Config(String),

    // ── record source ─────────────────────────────────────────────────
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record source {path}: {reason}")]
    Format { path: PathBuf, reason: String },

    // ── labels ────────────────────────────────────────────────────────
    /// An annotation field names a known tissue but is not `name[count/total]`.
    #[error("Malformed annotation field '{field}': {reason}")]
    Parse { field: String, reason: String },

    // ── features ──────────────────────────────────────────────────────
    #[error("k-mer '{kmer}' at position {position} is outside the a/c/g/t alphabet")]
    Lookup { kmer: String, position: usize },

    #[error("Invalid motif pattern: {0}")]
    Pattern(#[from] regex::Error),

    // ── pipeline invariants ───────────────────────────────────────────
    /// Row/label count or feature width disagreement. Always a pipeline bug.
    #[error("Shape mismatch: {0}")]
    Shape(String),

    #[error("Not enough data: {0}")]
    InsufficientData(String),

    // ── reporting ─────────────────────────────────────────────────────
    #[error("Could not serialise report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Plot {path} failed: {reason}")]
    Plot { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, ClfError>;
