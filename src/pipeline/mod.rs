//! Fitted price pipeline and its shared store

mod fitted;
mod store;

pub use fitted::{ColumnImportance, FittedPipeline, ModelSummary};
pub use store::ModelStore;
