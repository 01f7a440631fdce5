pub mod vector_cache;

mod error;

pub use error::{Error, Result};
pub use vector_cache::{VectorCacheEntry, VectorCacheFile, VectorSnapshot};
