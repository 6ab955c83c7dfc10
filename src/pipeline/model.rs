//! Persisted classifiers
//!
//! Trees are stored as the flat parallel arrays scikit-learn exposes on a
//! fitted tree (`children_left`, `children_right`, `feature`, `threshold`,
//! `value`). A node is a leaf when its left child is [`TREE_LEAF`].

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::PredictError;

/// Child index marking a leaf node
pub const TREE_LEAF: i64 = -1;

/// A fitted probabilistic classifier over a dense feature row
pub trait Classifier {
    /// Class labels, in the order of [`Classifier::predict_proba`] output
    fn classes(&self) -> &[String];

    /// Number of features the classifier was fitted on
    fn n_features(&self) -> usize;

    /// Per-class probabilities for one row
    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, PredictError>;

    /// Predicted label and the full probability vector.
    ///
    /// The label is the first class with the highest probability.
    fn predict(&self, row: &[f64]) -> Result<(String, Vec<f64>), PredictError> {
        let proba = self.predict_proba(row)?;
        let best = argmax(&proba).ok_or_else(|| {
            PredictError::InvalidBundle("classifier produced no probabilities".to_string())
        })?;
        let label = self.classes().get(best).cloned().ok_or_else(|| {
            PredictError::InvalidBundle(format!("no class label at index {}", best))
        })?;
        Ok((label, proba))
    }
}

/// Index of the first maximum
fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, current)) if v <= current => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

fn check_row(n_features: usize, row: &[f64]) -> Result<(), PredictError> {
    if row.len() != n_features {
        return Err(PredictError::ShapeMismatch {
            stage: "classifier",
            expected: n_features,
            actual: row.len(),
        });
    }
    Ok(())
}

/// A single fitted decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights; only leaves are read
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    pub fn node_count(&self) -> usize {
        self.children_left.len()
    }

    /// Class distribution of the leaf `row` falls into, normalized to sum to one
    pub fn leaf_distribution(&self, row: &[f64]) -> Result<Vec<f64>, PredictError> {
        let broken = |node: usize| {
            PredictError::InvalidBundle(format!("decision tree node {} is malformed", node))
        };

        let mut node = 0usize;
        // a well-formed tree reaches a leaf in fewer steps than it has nodes
        for _ in 0..=self.node_count() {
            let left = *self.children_left.get(node).ok_or_else(|| broken(node))?;
            if left == TREE_LEAF {
                let value = self.value.get(node).ok_or_else(|| broken(node))?;
                return Ok(normalize(value));
            }
            let feature = self.feature.get(node).ok_or_else(|| broken(node))?;
            let x = usize::try_from(*feature)
                .ok()
                .and_then(|f| row.get(f))
                .ok_or_else(|| broken(node))?;
            let threshold = self.threshold.get(node).ok_or_else(|| broken(node))?;
            let next = if x <= threshold {
                left
            } else {
                *self.children_right.get(node).ok_or_else(|| broken(node))?
            };
            node = usize::try_from(next).map_err(|_| broken(node))?;
        }
        Err(PredictError::InvalidBundle(
            "decision tree contains a cycle".to_string(),
        ))
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), PredictError> {
        let n = self.node_count();
        if n == 0 {
            return Err(PredictError::InvalidBundle("decision tree has no nodes".to_string()));
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err(PredictError::InvalidBundle(
                "decision tree arrays have different lengths".to_string(),
            ));
        }

        let in_range = |child: i64| child >= 0 && (child as usize) < n;
        for i in 0..n {
            if self.children_left[i] == TREE_LEAF {
                if self.value[i].len() != n_classes {
                    return Err(PredictError::InvalidBundle(format!(
                        "leaf {} has {} class weights, expected {}",
                        i,
                        self.value[i].len(),
                        n_classes
                    )));
                }
                continue;
            }
            if !in_range(self.children_left[i]) || !in_range(self.children_right[i]) {
                return Err(PredictError::InvalidBundle(format!(
                    "node {} has an out-of-range child",
                    i
                )));
            }
            if self.feature[i] < 0 || self.feature[i] as usize >= n_features {
                return Err(PredictError::InvalidBundle(format!(
                    "node {} splits on feature {} of {}",
                    i, self.feature[i], n_features
                )));
            }
        }
        Ok(())
    }
}

fn normalize(weights: &[f64]) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    if total > 0.0 {
        weights.iter().map(|w| w / total).collect()
    } else {
        weights.to_vec()
    }
}

/// Averaged ensemble of decision trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub classes: Vec<String>,
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl Classifier for RandomForest {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, PredictError> {
        check_row(self.n_features, row)?;
        if self.trees.is_empty() {
            return Err(PredictError::InvalidBundle("random forest has no trees".to_string()));
        }

        let distributions = self
            .trees
            .par_iter()
            .map(|tree| tree.leaf_distribution(row))
            .collect::<Result<Vec<_>, _>>()?;

        // summed in tree order so the result does not depend on scheduling
        let mut proba = vec![0.0; self.classes.len()];
        for distribution in &distributions {
            for (p, d) in proba.iter_mut().zip(distribution) {
                *p += d;
            }
        }
        let n_trees = distributions.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        Ok(proba)
    }
}

/// Binary logistic regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub classes: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl Classifier for LogisticRegression {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, PredictError> {
        check_row(self.coefficients.len(), row)?;
        let z: f64 = self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(w, x)| w * x)
                .sum::<f64>();
        let positive = 1.0 / (1.0 + (-z).exp());
        Ok(vec![1.0 - positive, positive])
    }
}

/// Classifier stored in the model bundle, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassifierModel {
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
}

impl ClassifierModel {
    fn inner(&self) -> &dyn Classifier {
        match self {
            ClassifierModel::RandomForest(m) => m,
            ClassifierModel::LogisticRegression(m) => m,
        }
    }

    /// Check that the parameters describe a usable classifier
    pub fn validate(&self) -> Result<(), PredictError> {
        if self.classes().len() < 2 {
            return Err(PredictError::InvalidBundle(
                "classifier needs at least two classes".to_string(),
            ));
        }
        match self {
            ClassifierModel::RandomForest(forest) => {
                if forest.trees.is_empty() {
                    return Err(PredictError::InvalidBundle("random forest has no trees".to_string()));
                }
                for tree in &forest.trees {
                    tree.validate(forest.n_features, forest.classes.len())?;
                }
            }
            ClassifierModel::LogisticRegression(model) => {
                if model.classes.len() != 2 {
                    return Err(PredictError::InvalidBundle(
                        "logistic regression supports exactly two classes".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Classifier for ClassifierModel {
    fn classes(&self) -> &[String] {
        self.inner().classes()
    }

    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, PredictError> {
        self.inner().predict_proba(row)
    }
}
