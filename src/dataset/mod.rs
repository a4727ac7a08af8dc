/// dataset/mod.rs — Records → (feature matrix, label vector)
///
///   enhancer      positives labelled +1, then negatives labelled -1
///   tissue        positives only, labels from the annotation fields
///   fine-grain    positives only, labels from the annotation fields
///
/// Rows are computed in parallel but written back by record index, so
/// row i always belongs to record i.
pub mod fasta;

use std::collections::BTreeMap;

use ndarray::{aview1, Array1, Array2, Axis};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::Task;
use crate::error::{ClfError, Result};
use crate::features::FeatureVectorBuilder;
use crate::labels::{Label, LabelDeriver, NEGATIVE, POSITIVE};
pub use fasta::Record;

/// Feature matrix with one label per row.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub features: Array2<f64>,
    pub labels: Array1<Label>,
}

impl Dataset {
    pub fn new(features: Array2<f64>, labels: Array1<Label>) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(ClfError::Shape(format!(
                "{} feature rows but {} labels",
                features.nrows(),
                labels.len()
            )));
        }
        Ok(Self { features, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Rows `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: self.features.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
        }
    }

    /// Columns `columns`, in that order. Labels are unchanged.
    pub fn select_columns(&self, columns: &[usize]) -> Dataset {
        Dataset {
            features: self.features.select(Axis(1), columns),
            labels: self.labels.clone(),
        }
    }

    pub fn label_counts(&self) -> BTreeMap<Label, usize> {
        let mut counts = BTreeMap::new();
        for &label in self.labels.iter() {
            *counts.entry(label).or_insert(0) += 1;
        }
        counts
    }
}

pub struct DatasetAssembler<'a> {
    builder: FeatureVectorBuilder<'a>,
    deriver: LabelDeriver,
    normalize: bool,
}

impl<'a> DatasetAssembler<'a> {
    pub fn new(builder: FeatureVectorBuilder<'a>, deriver: LabelDeriver, normalize: bool) -> Self {
        Self {
            builder,
            deriver,
            normalize,
        }
    }

    /// `negatives` is only read for the enhancer task.
    pub fn assemble(&self, task: Task, positives: &[Record], negatives: &[Record]) -> Result<Dataset> {
        let (records, labels): (Vec<&Record>, Vec<Label>) = match task {
            Task::Enhancer => {
                let records = positives.iter().chain(negatives).collect();
                let labels = std::iter::repeat(POSITIVE)
                    .take(positives.len())
                    .chain(std::iter::repeat(NEGATIVE).take(negatives.len()))
                    .collect();
                (records, labels)
            }
            Task::Tissue | Task::FineGrain => {
                let labels = positives
                    .iter()
                    .enumerate()
                    .map(|(i, r)| {
                        self.deriver
                            .derive(task, &r.description)
                            .map_err(|e| in_record(e, i, &r.description))
                    })
                    .collect::<Result<Vec<_>>>()?;
                (positives.iter().collect(), labels)
            }
        };

        let features = self.matrix(&records)?;
        let dataset = Dataset::new(features, Array1::from(labels))?;

        info!(
            rows = dataset.len(),
            cols = dataset.n_features(),
            task = %task,
            "feature matrix assembled"
        );
        for (label, count) in dataset.label_counts() {
            info!(label, count, "label count");
        }

        Ok(dataset)
    }

    fn matrix(&self, records: &[&Record]) -> Result<Array2<f64>> {
        let rows = records
            .par_iter()
            .map(|r| self.builder.build_row(&r.sequence, self.normalize))
            .collect::<Result<Vec<_>>>()?;

        let width = self.builder.width();
        let mut features = Array2::zeros((rows.len(), width));
        let mut skipped = 0usize;

        for (i, row) in rows.iter().enumerate() {
            if row.counts.len() != width {
                return Err(ClfError::Shape(format!(
                    "row {i} has {} columns, expected {width}",
                    row.counts.len()
                )));
            }
            features.row_mut(i).assign(&aview1(&row.counts));
            skipped += row.skipped;
        }

        if skipped > 0 {
            warn!(skipped, "ambiguous k-mers were left out of the counts");
        }

        Ok(features)
    }
}

/// Name the record a label error came from.
fn in_record(err: ClfError, index: usize, description: &str) -> ClfError {
    match err {
        ClfError::Parse { field, reason } => ClfError::Parse {
            field,
            reason: format!("{reason} (record {index}: >{description})"),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AmbiguityPolicy;
    use crate::kmer::KmerIndex;
    use approx::assert_relative_eq;

    fn record(description: &str, sequence: &str) -> Record {
        Record {
            description: description.to_string(),
            sequence: sequence.to_string(),
        }
    }

    fn assembler(index: &KmerIndex, normalize: bool) -> DatasetAssembler<'_> {
        let builder = FeatureVectorBuilder::new(index, AmbiguityPolicy::Reject).unwrap();
        DatasetAssembler::new(builder, LabelDeriver::new().unwrap(), normalize)
    }

    #[test]
    fn test_enhancer_order_and_labels() {
        let index = KmerIndex::build(3).unwrap();
        let pos = vec![record("p1", "acgtac"), record("p2", "ggggcc"), record("p3", "aaaa")];
        let neg = vec![record("n1", "ttttaa"), record("n2", "cacgtg")];

        let data = assembler(&index, false).assemble(Task::Enhancer, &pos, &neg).unwrap();
        assert_eq!(data.len(), 5);
        assert_eq!(data.n_features(), 64 + 2);
        assert_eq!(data.labels.to_vec(), vec![1, 1, 1, -1, -1]);

        // row 3 is n1: tttt… → ttt twice
        let ttt = index.index_of("ttt").unwrap();
        assert_eq!(data.features[[3, ttt]], 2.0);
        // row 4 is n2 and carries the E-box
        assert_eq!(data.features[[4, 64]], 1.0);
        assert_eq!(data.features[[3, 64]], 0.0);
    }

    #[test]
    fn test_tissue_labels_from_descriptions() {
        let index = KmerIndex::build(2).unwrap();
        let pos = vec![
            record("x|x|x|positive|limb[5/10]|forebrain[2/10]", "acgt"),
            record("x|x|x|positive|midbrain[7/10]", "acgt"),
            record("x|x|x|negative", "acgt"),
        ];

        let tissue = assembler(&index, true).assemble(Task::Tissue, &pos, &[]).unwrap();
        assert_eq!(tissue.labels.to_vec(), vec![2, 1, 0]);

        let fine = assembler(&index, true).assemble(Task::FineGrain, &pos, &[]).unwrap();
        assert_eq!(fine.labels.to_vec(), vec![1, 2, 0]);
    }

    #[test]
    fn test_negatives_ignored_for_tissue() {
        let index = KmerIndex::build(2).unwrap();
        let pos = vec![record("x|x|x|positive|limb[1/1]", "acgt")];
        let neg = vec![record("n", "acgt"), record("n", "acgt")];
        let data = assembler(&index, true).assemble(Task::Tissue, &pos, &neg).unwrap();
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn test_malformed_annotation_aborts() {
        let index = KmerIndex::build(2).unwrap();
        let pos = vec![record("x|x|x|positive|limb[1/1]", "acgt"), record("x|x|x|positive|limb", "acgt")];
        let err = assembler(&index, true).assemble(Task::Tissue, &pos, &[]).unwrap_err();
        match err {
            ClfError::Parse { field, reason } => {
                assert_eq!(field, "limb");
                assert!(reason.contains("record 1"), "{reason}");
                assert!(reason.contains("x|x|x|positive|limb"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_normalisation_per_row() {
        let index = KmerIndex::build(2).unwrap();
        let pos = vec![record("p", "aaaaaac"), record("p", "a")];
        let data = assembler(&index, true).assemble(Task::Enhancer, &pos, &[]).unwrap();

        let first = data.features.row(0);
        assert_relative_eq!(first.slice(ndarray::s![..16]).sum(), 1.0, epsilon = 1e-12);
        // too short for a 2-mer: zero, not NaN
        assert!(data.features.row(1).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_lookup_error_propagates() {
        let index = KmerIndex::build(2).unwrap();
        let pos = vec![record("p", "acnnac")];
        let err = assembler(&index, true).assemble(Task::Enhancer, &pos, &[]).unwrap_err();
        assert!(matches!(err, ClfError::Lookup { .. }));
    }

    #[test]
    fn test_mismatched_shape_rejected() {
        let err = Dataset::new(Array2::zeros((3, 2)), Array1::from(vec![1, -1])).unwrap_err();
        assert!(matches!(err, ClfError::Shape(_)));
    }

    #[test]
    fn test_select_keeps_pairing() {
        let features = Array2::from_shape_fn((4, 2), |(i, j)| (i * 10 + j) as f64);
        let data = Dataset::new(features, Array1::from(vec![1, 2, 3, 4])).unwrap();
        let picked = data.select(&[3, 1]);
        assert_eq!(picked.labels.to_vec(), vec![4, 2]);
        assert_eq!(picked.features[[0, 1]], 31.0);
        assert_eq!(picked.features[[1, 0]], 10.0);
    }

    #[test]
    fn test_select_columns() {
        let features = Array2::from_shape_fn((2, 4), |(i, j)| (i * 10 + j) as f64);
        let data = Dataset::new(features, Array1::from(vec![1, -1])).unwrap();
        let picked = data.select_columns(&[3, 0]);
        assert_eq!(picked.n_features(), 2);
        assert_eq!(picked.features.row(1).to_vec(), vec![13.0, 10.0]);
        assert_eq!(picked.labels.to_vec(), vec![1, -1]);
    }

    #[test]
    fn test_label_counts() {
        let data = Dataset::new(Array2::zeros((4, 1)), Array1::from(vec![1, -1, 1, 1])).unwrap();
        let counts = data.label_counts();
        assert_eq!(counts[&1], 3);
        assert_eq!(counts[&-1], 1);
    }
}
