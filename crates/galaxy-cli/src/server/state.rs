use std::sync::Arc;

use galaxy_core::ArtifactCache;
use galaxy_forge::Forge;

pub type SharedCache = Arc<ArtifactCache<Box<dyn Forge>>>;

/// Immutable state shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub cache: SharedCache,
    /// Base of every link handed to clients, without a trailing slash.
    pub public_url: Arc<str>,
}

impl AppState {
    pub fn new(cache: ArtifactCache<Box<dyn Forge>>, public_url: &str) -> Self {
        Self {
            cache: Arc::new(cache),
            public_url: Arc::from(public_url.trim_end_matches('/')),
        }
    }

    pub fn collection_href(&self, namespace: &str, collection: &str) -> String {
        format!(
            "{}/api/v2/collections/{namespace}/{collection}/",
            self.public_url
        )
    }

    pub fn versions_href(&self, namespace: &str, collection: &str) -> String {
        format!("{}versions/", self.collection_href(namespace, collection))
    }

    pub fn version_href(&self, namespace: &str, collection: &str, version: &str) -> String {
        format!("{}{version}/", self.versions_href(namespace, collection))
    }

    pub fn namespace_href(&self) -> String {
        format!("{}/api/v1/namespaces/1/", self.public_url)
    }

    pub fn download_url(&self, file_name: &str) -> String {
        format!("{}/dl/{file_name}", self.public_url)
    }
}
