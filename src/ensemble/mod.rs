pub mod artifact;
pub mod classifier;
pub mod consensus;

pub use artifact::{Ensemble, SubModel};
pub use classifier::{
    Classifier, DecisionTree, GradientBoostedModel, LogisticRegressionModel, RandomForestModel,
    RegressionNode, RegressionTree, TreeNode,
};
pub use consensus::{score_consensus, top_factors};
