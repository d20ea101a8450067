pub mod chunk;
pub mod feature;

pub use chunk::FeatureChunk;
pub use feature::{RiskProperties, SimplifiedFeature};
