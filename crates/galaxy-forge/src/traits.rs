use galaxy_package::tree::FileTree;

use crate::error::Result;

/// A source-control forge hosting one repository per collection.
///
/// Implementations perform blocking network I/O.
pub trait Forge: Send + Sync {
    /// Release versions of `namespace.collection`, newest first. Never empty on success.
    fn versions(&self, namespace: &str, collection: &str) -> Result<Vec<String>>;

    /// URL of the source archive for a tagged version.
    fn archive_url(&self, namespace: &str, collection: &str, version: &str) -> String;

    /// Downloads and unpacks the source archive for a tagged version.
    fn fetch_archive(&self, namespace: &str, collection: &str, version: &str) -> Result<FileTree>;
}

impl<T: Forge + ?Sized> Forge for Box<T> {
    fn versions(&self, namespace: &str, collection: &str) -> Result<Vec<String>> {
        (**self).versions(namespace, collection)
    }

    fn archive_url(&self, namespace: &str, collection: &str, version: &str) -> String {
        (**self).archive_url(namespace, collection, version)
    }

    fn fetch_archive(&self, namespace: &str, collection: &str, version: &str) -> Result<FileTree> {
        (**self).fetch_archive(namespace, collection, version)
    }
}
