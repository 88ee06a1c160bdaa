//! Model training
//!
//! - [`RegressionTree`] - CART regression tree on squared error
//! - [`RandomForestRegressor`] - bootstrap-aggregated regression trees

pub mod decision_tree;
pub mod random_forest;

pub use decision_tree::{RegressionTree, TreeNode};
pub use random_forest::RandomForestRegressor;
