//! Tree-ensemble classifier loaded from a JSON artifact.
//!
//! The artifact mirrors the structure exported from a trained random
//! forest:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "classes": ["Leptospirosis", "Rabies"],
//!   "feature_names": ["latitude", "longitude", "temperature", "..."],
//!   "trees": [
//!     { "nodes": [
//!         { "feature": 2, "threshold": 27.5, "left": 1, "right": 2 },
//!         { "value": [8.0, 2.0] },
//!         { "value": [1.0, 9.0] }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Node `0` is the root. A sample goes left when
//! `features[feature] <= threshold`. Leaf values are per-class weights
//! (usually training sample counts) and are normalized at load time.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;
use zoonosis_map_zoonosis_models::Covariate;

use crate::{Classifier, ModelError};

/// Artifact layout version understood by this loader.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Deserialize)]
struct VersionProbe {
    format_version: u32,
}

#[derive(Deserialize)]
struct ForestArtifact {
    classes: Vec<String>,
    feature_names: Vec<String>,
    trees: Vec<TreeArtifact>,
}

#[derive(Deserialize)]
struct TreeArtifact {
    nodes: Vec<NodeArtifact>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NodeArtifact {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Normalized class distribution.
    Leaf(Vec<f64>),
}

struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Walks from the root to a leaf. Indices and acyclicity are checked
    /// at load time.
    fn leaf(&self, features: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf(distribution) => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// A random-forest style classifier: the mean of per-tree leaf
/// distributions.
pub struct ForestClassifier {
    classes: Vec<String>,
    feature_names: Vec<Covariate>,
    trees: Vec<Tree>,
}

impl std::fmt::Debug for ForestClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForestClassifier")
            .field("classes", &self.classes)
            .field("feature_names", &self.feature_names)
            .field("trees", &self.trees.len())
            .finish()
    }
}

impl ForestClassifier {
    /// Reads and validates the artifact at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the file cannot be read or the artifact is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ModelError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    /// Parses and validates an artifact from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the JSON is malformed, the format version
    /// is unsupported, or the tree structure is inconsistent.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let probe: VersionProbe = serde_json::from_str(json)?;
        if probe.format_version != FORMAT_VERSION {
            return Err(ModelError::UnsupportedVersion {
                found: probe.format_version,
                expected: FORMAT_VERSION,
            });
        }

        let artifact: ForestArtifact = serde_json::from_str(json)?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(artifact: ForestArtifact) -> Result<Self, ModelError> {
        if artifact.classes.is_empty() {
            return Err(invalid("no classes"));
        }
        let mut seen = BTreeSet::new();
        for class in &artifact.classes {
            if !seen.insert(class.as_str()) {
                return Err(invalid(format!("duplicate class '{class}'")));
            }
        }

        let mut feature_names = Vec::with_capacity(artifact.feature_names.len());
        for name in &artifact.feature_names {
            let covariate: Covariate = name
                .parse()
                .map_err(|_| invalid(format!("unknown feature '{name}'")))?;
            if feature_names.contains(&covariate) {
                return Err(invalid(format!("duplicate feature '{name}'")));
            }
            feature_names.push(covariate);
        }
        if feature_names.is_empty() {
            return Err(invalid("no features"));
        }

        if artifact.trees.is_empty() {
            return Err(invalid("no trees"));
        }

        let n_classes = artifact.classes.len();
        let n_features = feature_names.len();
        let trees = artifact
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, tree)| build_tree(i, tree, n_classes, n_features))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            classes: artifact.classes,
            feature_names,
            trees,
        })
    }

    /// Number of trees in the ensemble.
    #[must_use]
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    fn check_features(&self, features: &[f64]) -> Result<(), ModelError> {
        if features.len() != self.feature_names.len() {
            return Err(ModelError::FeatureCount {
                expected: self.feature_names.len(),
                found: features.len(),
            });
        }
        for (value, covariate) in features.iter().zip(&self.feature_names) {
            if !value.is_finite() {
                return Err(ModelError::NonFinite {
                    covariate: *covariate,
                });
            }
        }
        Ok(())
    }
}

impl Classifier for ForestClassifier {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn feature_names(&self) -> &[Covariate] {
        &self.feature_names
    }

    fn classify(&self, features: &[f64]) -> Result<String, ModelError> {
        let probabilities = self.class_probabilities(features)?;

        // First maximum wins, so ties resolve to the earliest class.
        let mut best = 0;
        for (i, p) in probabilities.iter().enumerate().skip(1) {
            if *p > probabilities[best] {
                best = i;
            }
        }

        Ok(self.classes[best].clone())
    }

    fn class_probabilities(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.check_features(features)?;

        let mut sums = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (sum, p) in sums.iter_mut().zip(tree.leaf(features)) {
                *sum += p;
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let n_trees = self.trees.len() as f64;
        Ok(sums.into_iter().map(|s| s / n_trees).collect())
    }
}

fn build_tree(
    tree_idx: usize,
    tree: TreeArtifact,
    n_classes: usize,
    n_features: usize,
) -> Result<Tree, ModelError> {
    if tree.nodes.is_empty() {
        return Err(invalid(format!("tree {tree_idx} has no nodes")));
    }

    let n_nodes = tree.nodes.len();
    let nodes = tree
        .nodes
        .into_iter()
        .enumerate()
        .map(|(idx, node)| match node {
            NodeArtifact::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if feature >= n_features {
                    return Err(invalid(format!(
                        "tree {tree_idx} node {idx}: feature index {feature} out of range"
                    )));
                }
                if !threshold.is_finite() {
                    return Err(invalid(format!(
                        "tree {tree_idx} node {idx}: threshold is not finite"
                    )));
                }
                for child in [left, right] {
                    if child <= idx || child >= n_nodes {
                        return Err(invalid(format!(
                            "tree {tree_idx} node {idx}: invalid child index {child}"
                        )));
                    }
                }
                Ok(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                })
            }
            NodeArtifact::Leaf { value } => {
                if value.len() != n_classes {
                    return Err(invalid(format!(
                        "tree {tree_idx} node {idx}: leaf has {} values for {n_classes} classes",
                        value.len()
                    )));
                }
                if value.iter().any(|v| !v.is_finite() || *v < 0.0) {
                    return Err(invalid(format!(
                        "tree {tree_idx} node {idx}: leaf weights must be finite and non-negative"
                    )));
                }
                let total: f64 = value.iter().sum();
                if total <= 0.0 {
                    return Err(invalid(format!(
                        "tree {tree_idx} node {idx}: leaf weights sum to zero"
                    )));
                }
                Ok(Node::Leaf(value.into_iter().map(|v| v / total).collect()))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Tree { nodes })
}

fn invalid(message: impl Into<String>) -> ModelError {
    ModelError::InvalidArtifact {
        message: message.into(),
    }
}
