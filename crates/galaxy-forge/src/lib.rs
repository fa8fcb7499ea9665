pub mod archive;
pub mod error;
pub mod gitlab;
pub mod http_client;
pub mod tags;
pub mod traits;

pub use gitlab::GitLab;
pub use traits::Forge;
