//! Extremely-randomized-trees classifier
//!
//! Binary ensemble over the 22-column feature matrix. Every tree sees the
//! full training set (no bootstrap); randomness comes entirely from the
//! split search, which draws sqrt(n_features) candidate features per node
//! and a uniform threshold inside each candidate's observed range, then
//! keeps the candidate with the lowest Gini impurity. Depth is
//! unconstrained; growth stops on pure or too-small nodes.

use crate::classify::training::TrainingSet;
use crate::maybe_rayon::*;
use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vegclass_core::{Error, Result};

/// Ensemble hyperparameters
#[derive(Debug, Clone)]
pub struct ForestParams {
    /// Number of trees (default 3, must be >= 1)
    pub n_trees: usize,
    /// Seed for the split-search generator
    pub seed: u64,
    /// Minimum samples a node needs to attempt a split (default 2)
    pub min_samples_split: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 3,
            seed: 3,
            min_samples_split: 2,
        }
    }
}

/// Flat-vector tree node; children index into the same vector
#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
    Leaf {
        class: u8,
    },
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn predict(&self, sample: ArrayView1<f32>) -> u8 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Leaf { class } => return class,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if sample[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

/// A fitted, immutable ensemble
#[derive(Debug, Clone)]
pub struct ExtraTreesModel {
    trees: Vec<Tree>,
    n_features: usize,
}

impl ExtraTreesModel {
    /// Number of trees in the ensemble
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Predict one feature vector by majority vote.
    ///
    /// Exact ties resolve to class 0, the lower class index.
    pub fn predict_one(&self, sample: ArrayView1<f32>) -> u8 {
        let votes: usize = self
            .trees
            .iter()
            .map(|t| t.predict(sample) as usize)
            .sum();
        u8::from(votes * 2 > self.trees.len())
    }

    /// Predict a feature matrix (one sample per row)
    pub fn predict(&self, features: ArrayView2<f32>) -> Result<Vec<u8>> {
        if features.ncols() != self.n_features {
            return Err(Error::InvalidParameter {
                name: "features",
                value: features.ncols().to_string(),
                reason: format!("feature matrix must have {} columns", self.n_features),
            });
        }

        Ok((0..features.nrows())
            .into_par_iter()
            .map(|i| self.predict_one(features.row(i)))
            .collect())
    }
}

/// Fit an ensemble on a training set
pub fn fit(set: &TrainingSet, params: &ForestParams) -> Result<ExtraTreesModel> {
    if params.n_trees == 0 {
        return Err(Error::InvalidParameter {
            name: "n_trees",
            value: "0".to_string(),
            reason: "ensemble needs at least one tree".to_string(),
        });
    }
    if set.is_empty() {
        return Err(Error::NoTrainingData);
    }

    let matrix = set.matrix();
    let labels = set.labels();
    let n_features = matrix.ncols();
    let n_candidates = ((n_features as f64).sqrt().round() as usize).max(1);

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut trees = Vec::with_capacity(params.n_trees);
    for _ in 0..params.n_trees {
        let mut builder = TreeBuilder {
            matrix: matrix.view(),
            labels: &labels,
            min_samples_split: params.min_samples_split.max(2),
            n_candidates,
            nodes: Vec::new(),
        };
        let all: Vec<usize> = (0..matrix.nrows()).collect();
        builder.grow(all, &mut rng);
        trees.push(Tree { nodes: builder.nodes });
    }

    Ok(ExtraTreesModel { trees, n_features })
}

struct TreeBuilder<'a> {
    matrix: ArrayView2<'a, f32>,
    labels: &'a [u8],
    min_samples_split: usize,
    n_candidates: usize,
    nodes: Vec<Node>,
}

impl TreeBuilder<'_> {
    /// Grow a subtree over `indices`, returning its node index
    fn grow(&mut self, indices: Vec<usize>, rng: &mut StdRng) -> usize {
        let counts = self.class_counts(&indices);

        if counts[0] == 0 || counts[1] == 0 || indices.len() < self.min_samples_split {
            return self.push_leaf(counts);
        }

        let Some((feature, threshold)) = self.best_split(&indices, rng) else {
            return self.push_leaf(counts);
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.matrix[(i, feature)] <= threshold);

        // Reserve the split slot before recursing so children land after it
        let node = self.nodes.len();
        self.nodes.push(Node::Leaf { class: 0 });
        let left = self.grow(left_idx, rng);
        let right = self.grow(right_idx, rng);
        self.nodes[node] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        node
    }

    fn push_leaf(&mut self, counts: [usize; 2]) -> usize {
        // Majority class; ties resolve to 0
        let class = u8::from(counts[1] > counts[0]);
        self.nodes.push(Node::Leaf { class });
        self.nodes.len() - 1
    }

    fn class_counts(&self, indices: &[usize]) -> [usize; 2] {
        let mut counts = [0usize; 2];
        for &i in indices {
            counts[usize::from(self.labels[i] > 0)] += 1;
        }
        counts
    }

    /// Draw candidate (feature, uniform threshold) pairs and keep the one
    /// with the lowest weighted Gini impurity. `None` when every drawn
    /// feature is constant over the node.
    fn best_split(&self, indices: &[usize], rng: &mut StdRng) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32, f64)> = None;

        for _ in 0..self.n_candidates {
            let feature = rng.gen_range(0..self.matrix.ncols());

            let mut lo = f32::INFINITY;
            let mut hi = f32::NEG_INFINITY;
            for &i in indices {
                let v = self.matrix[(i, feature)];
                lo = lo.min(v);
                hi = hi.max(v);
            }
            if !(lo < hi) {
                continue;
            }

            let threshold = rng.gen_range(lo..hi);
            let impurity = self.split_impurity(indices, feature, threshold);

            match best {
                Some((_, _, best_impurity)) if impurity >= best_impurity => {}
                _ => best = Some((feature, threshold, impurity)),
            }
        }

        best.map(|(feature, threshold, _)| (feature, threshold))
    }

    fn split_impurity(&self, indices: &[usize], feature: usize, threshold: f32) -> f64 {
        let mut left = [0usize; 2];
        let mut right = [0usize; 2];
        for &i in indices {
            let side = if self.matrix[(i, feature)] <= threshold {
                &mut left
            } else {
                &mut right
            };
            side[usize::from(self.labels[i] > 0)] += 1;
        }

        let total = indices.len() as f64;
        (weighted_gini(left) + weighted_gini(right)) / total
    }
}

/// Gini impurity of a two-class count, scaled by the node size
fn weighted_gini(counts: [usize; 2]) -> f64 {
    let n = (counts[0] + counts[1]) as f64;
    if n == 0.0 {
        return 0.0;
    }
    let p0 = counts[0] as f64 / n;
    let p1 = counts[1] as f64 / n;
    n * (1.0 - p0 * p0 - p1 * p1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::resolver::FeatureVariable;
    use crate::classify::training::{build_training_set, TrainingSample};
    use ndarray::Array2;
    use std::path::Path;
    use vegclass_core::io::write_geotiff;
    use vegclass_core::Raster;

    /// Separable set: vegetation has high NDVI (column 0), background low
    fn separable_set(per_class: usize) -> TrainingSet {
        let dir = tempfile::tempdir().unwrap();
        write_split_catalog(dir.path(), 2 * per_class);
        let catalog = crate::classify::catalog::FeatureCatalog::from_dir(dir.path()).unwrap();

        let veg: Vec<(i64, i64)> = (0..per_class as i64).map(|r| (r, 0)).collect();
        let bg: Vec<(i64, i64)> = (per_class as i64..2 * per_class as i64)
            .map(|r| (r, 0))
            .collect();
        build_training_set(&catalog, &veg, &bg).unwrap()
    }

    /// One-column catalog where the top half of rows is "vegetation-like"
    fn write_split_catalog(dir: &Path, rows: usize) {
        for var in FeatureVariable::ALL {
            let mut band = Raster::new(rows, 1);
            for row in 0..rows {
                // Top half high, bottom half low, with per-row jitter so
                // features aren't constant within a class
                let base = if row < rows / 2 { 0.8 } else { 0.1 };
                band.set(row, 0, base + row as f32 * 1e-3).unwrap();
            }
            write_geotiff(&band, dir.join(var.file_name())).unwrap();
        }
    }

    fn matrix_of(samples: &[TrainingSample]) -> Array2<f32> {
        let mut m = Array2::zeros((samples.len(), FeatureVariable::COUNT));
        for (i, s) in samples.iter().enumerate() {
            for (j, &v) in s.features.iter().enumerate() {
                m[(i, j)] = v;
            }
        }
        m
    }

    #[test]
    fn separable_data_is_fit_exactly() {
        let set = separable_set(10);
        let model = fit(&set, &ForestParams::default()).unwrap();

        let m = matrix_of(set.samples());
        let predictions = model.predict(m.view()).unwrap();
        let labels = set.labels();
        assert_eq!(predictions, labels);
    }

    #[test]
    fn same_seed_same_model() {
        let set = separable_set(8);
        let params = ForestParams { n_trees: 5, seed: 42, min_samples_split: 2 };

        let a = fit(&set, &params).unwrap();
        let b = fit(&set, &params).unwrap();

        let m = matrix_of(set.samples());
        assert_eq!(a.predict(m.view()).unwrap(), b.predict(m.view()).unwrap());
        assert_eq!(a.n_trees(), 5);
    }

    #[test]
    fn zero_trees_rejected() {
        let set = separable_set(4);
        let params = ForestParams { n_trees: 0, ..Default::default() };
        assert!(matches!(
            fit(&set, &params),
            Err(Error::InvalidParameter { name: "n_trees", .. })
        ));
    }

    #[test]
    fn empty_set_rejected() {
        let set = TrainingSet::default();
        assert!(matches!(
            fit(&set, &ForestParams::default()),
            Err(Error::NoTrainingData)
        ));
    }

    #[test]
    fn predict_checks_column_count() {
        let set = separable_set(4);
        let model = fit(&set, &ForestParams::default()).unwrap();

        let narrow = Array2::<f32>::zeros((3, 5));
        assert!(matches!(
            model.predict(narrow.view()),
            Err(Error::InvalidParameter { name: "features", .. })
        ));
    }

    #[test]
    fn vote_tie_resolves_to_background() {
        // Two leaves voting 1, two voting 0 on a hand-built ensemble is
        // awkward to force through fit(); check the counting rule directly.
        let model = ExtraTreesModel {
            trees: vec![
                Tree { nodes: vec![Node::Leaf { class: 1 }] },
                Tree { nodes: vec![Node::Leaf { class: 0 }] },
            ],
            n_features: FeatureVariable::COUNT,
        };
        let sample = ndarray::Array1::<f32>::zeros(FeatureVariable::COUNT);
        assert_eq!(model.predict_one(sample.view()), 0);
    }
}
