use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use super::ModelError;

/// Multi-class gradient boosted tree ensemble (softprob objective).
///
/// Tree `i` contributes to class `tree.class`, or `i % num_class` when the
/// export leaves it implicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub feature_names: Vec<String>,
    pub num_class: usize,
    #[serde(default = "default_base_score")]
    pub base_score: f64,
    pub trees: Vec<RegressionTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<usize>,
    /// Node 0 is the root; children always sit after their parent.
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        split: usize,
        split_condition: f64,
        yes: usize,
        no: usize,
        missing: usize,
    },
    Leaf {
        leaf: f64,
    },
}

fn default_base_score() -> f64 {
    0.5
}

impl TreeEnsemble {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.feature_names.is_empty() {
            return Err(ModelError::NoFeatures);
        }
        if self.num_class == 0 {
            return Err(ModelError::NoClasses);
        }
        if self.trees.is_empty() {
            return Err(ModelError::NoTrees);
        }
        if !self.base_score.is_finite() {
            return Err(ModelError::NonFinite {
                parameter: "base_score".to_string(),
            });
        }
        for (tree_index, tree) in self.trees.iter().enumerate() {
            tree.validate(tree_index, self.feature_names.len())?;
            let class = self.class_of(tree_index, tree);
            if class >= self.num_class {
                return Err(ModelError::UnknownClass {
                    tree: tree_index,
                    class,
                    num_class: self.num_class,
                });
            }
        }
        Ok(())
    }

    pub(crate) fn margins(&self, features: ArrayView1<'_, f64>) -> Array1<f64> {
        let mut margins = Array1::from_elem(self.num_class, self.base_score);
        for (tree_index, tree) in self.trees.iter().enumerate() {
            let class = self.class_of(tree_index, tree);
            match margins.get_mut(class) {
                Some(margin) => *margin += tree.leaf_value(features),
                None => return Array1::from_elem(self.num_class, f64::NAN),
            }
        }
        margins
    }

    fn class_of(&self, tree_index: usize, tree: &RegressionTree) -> usize {
        tree.class.unwrap_or(tree_index % self.num_class.max(1))
    }
}

impl RegressionTree {
    fn validate(&self, tree: usize, num_features: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::EmptyTree { tree });
        }
        for (node, entry) in self.nodes.iter().enumerate() {
            match *entry {
                TreeNode::Leaf { leaf } => {
                    if !leaf.is_finite() {
                        return Err(ModelError::NonFinite {
                            parameter: format!("tree {tree} node {node} leaf"),
                        });
                    }
                }
                TreeNode::Split {
                    split,
                    split_condition,
                    yes,
                    no,
                    missing,
                } => {
                    if split >= num_features {
                        return Err(ModelError::UnknownFeature {
                            tree,
                            node,
                            feature: split,
                            features: num_features,
                        });
                    }
                    if !split_condition.is_finite() {
                        return Err(ModelError::NonFinite {
                            parameter: format!("tree {tree} node {node} split_condition"),
                        });
                    }
                    for child in [yes, no, missing] {
                        if child <= node || child >= self.nodes.len() {
                            return Err(ModelError::BackwardLink { tree, node, child });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Walk from the root: NaN takes `missing`, `x < split_condition` takes
    /// `yes`, anything else takes `no`.
    pub(crate) fn leaf_value(&self, features: ArrayView1<'_, f64>) -> f64 {
        let mut at = 0;
        // Forward-only links bound the walk by the node count.
        for _ in 0..self.nodes.len() {
            match self.nodes.get(at) {
                Some(TreeNode::Leaf { leaf }) => return *leaf,
                Some(TreeNode::Split {
                    split,
                    split_condition,
                    yes,
                    no,
                    missing,
                }) => {
                    let value = features.get(*split).copied().unwrap_or(f64::NAN);
                    at = if value.is_nan() {
                        *missing
                    } else if value < *split_condition {
                        *yes
                    } else {
                        *no
                    };
                }
                None => break,
            }
        }
        f64::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn stump(
        feature: usize,
        threshold: f64,
        below: f64,
        above: f64,
        missing_below: bool,
    ) -> RegressionTree {
        RegressionTree {
            class: None,
            nodes: vec![
                TreeNode::Split {
                    split: feature,
                    split_condition: threshold,
                    yes: 1,
                    no: 2,
                    missing: if missing_below { 1 } else { 2 },
                },
                TreeNode::Leaf { leaf: below },
                TreeNode::Leaf { leaf: above },
            ],
        }
    }

    fn ensemble() -> TreeEnsemble {
        TreeEnsemble {
            feature_names: vec!["x".into(), "y".into()],
            num_class: 2,
            base_score: 0.5,
            trees: vec![
                stump(0, 1.0, 1.0, -1.0, true),
                stump(1, 5.0, -0.5, 0.5, false),
            ],
        }
    }

    #[test]
    fn test_tree_walk_follows_thresholds() {
        let tree = stump(0, 1.0, 10.0, 20.0, true);
        assert_eq!(tree.leaf_value(array![0.5].view()), 10.0);
        assert_eq!(tree.leaf_value(array![1.0].view()), 20.0);
        assert_eq!(tree.leaf_value(array![f64::NAN].view()), 10.0);
    }

    #[test]
    fn test_margins_accumulate_per_class() {
        let model = ensemble();
        model.validate().unwrap();
        let margins = model.margins(array![0.0, 7.0].view());
        assert_eq!(margins, array![1.5, 1.0]);
        let margins = model.margins(array![2.0, f64::NAN].view());
        assert_eq!(margins, array![-0.5, 1.0]);
    }

    #[test]
    fn test_explicit_tree_class() {
        let mut model = ensemble();
        model.trees[1].class = Some(0);
        let margins = model.margins(array![0.0, 7.0].view());
        assert_eq!(margins, array![2.0, 0.5]);
    }

    #[test]
    fn test_validate_rejects_backward_links() {
        let mut model = ensemble();
        model.trees[0].nodes[0] = TreeNode::Split {
            split: 0,
            split_condition: 1.0,
            yes: 0,
            no: 2,
            missing: 1,
        };
        match model.validate() {
            Err(ModelError::BackwardLink { tree, node, child }) => {
                assert_eq!((tree, node, child), (0, 0, 0));
            }
            other => panic!("expected backward link, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_unknown_feature_and_class() {
        let mut model = ensemble();
        model.trees[1] = stump(5, 1.0, 0.0, 0.0, true);
        let err = model.validate().unwrap_err();
        assert!(matches!(err, ModelError::UnknownFeature { tree: 1, feature: 5, .. }));
        assert_eq!(err.to_string(), "tree 1 node 0: split feature 5 out of 2");

        let mut model = ensemble();
        model.trees[0].class = Some(3);
        assert!(matches!(
            model.validate(),
            Err(ModelError::UnknownClass { tree: 0, class: 3, num_class: 2 })
        ));

        let mut model = ensemble();
        model.trees[1].nodes[2] = TreeNode::Leaf { leaf: f64::NAN };
        assert!(matches!(model.validate(), Err(ModelError::NonFinite { .. })));
    }

    #[test]
    fn test_nodes_parse_from_export() {
        let json = r#"{
            "feature_names": ["x"],
            "num_class": 1,
            "trees": [{"nodes": [
                {"split": 0, "split_condition": 0.5, "yes": 1, "no": 2, "missing": 2},
                {"leaf": -0.25},
                {"leaf": 0.75}
            ]}]
        }"#;
        let model: TreeEnsemble = serde_json::from_str(json).unwrap();
        model.validate().unwrap();
        assert_eq!(model.base_score, 0.5);
        assert_eq!(model.trees[0].nodes[1], TreeNode::Leaf { leaf: -0.25 });
    }
}
