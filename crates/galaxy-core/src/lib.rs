pub mod cache;
pub mod error;
pub mod key;
pub mod summary;

pub use cache::ArtifactCache;
pub use error::{GalaxyError, Result};
pub use summary::ArtifactSummary;
