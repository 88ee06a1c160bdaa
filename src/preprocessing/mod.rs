//! Feature preprocessing
//!
//! - [`StandardScaler`] - zero mean, unit variance for numerical columns
//! - [`OneHotEncoder`] - one indicator per learned category
//! - [`ColumnTransformer`] - both of the above over a [`FeatureLayout`](crate::data::FeatureLayout)

mod column_transformer;
mod encoder;
mod scaler;

pub use column_transformer::ColumnTransformer;
pub use encoder::{OneHotEncoder, UnknownCategoryPolicy, Vocabulary};
pub use scaler::{ScalerParams, StandardScaler};
