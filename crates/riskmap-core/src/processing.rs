pub mod chunk;
pub mod simplify;

pub use chunk::{partition, DEFAULT_CHUNK_SIZE};
pub use simplify::{simplify_feature, DEFAULT_TOLERANCE};
