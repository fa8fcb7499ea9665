//! Response bodies of the Galaxy v2 API subset served here.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

/// Placeholder timestamp for fields the forge does not provide.
pub const EPOCH: &str = "1970-01-01T00:00:00+00:00";

#[derive(Debug, Serialize)]
pub struct ApiRoot {
    pub description: &'static str,
    pub current_version: &'static str,
    pub available_versions: HashMap<&'static str, &'static str>,
    pub server_version: &'static str,
    pub version_name: &'static str,
    pub team_members: &'static [&'static str],
}

impl Default for ApiRoot {
    fn default() -> Self {
        Self {
            description: "GALAXY REST API",
            current_version: "v2",
            available_versions: HashMap::from([("v2", "v2/")]),
            server_version: "3.4.15",
            version_name: "Doin' it Right",
            team_members: &[
                "chouseknecht",
                "cutwater",
                "alikins",
                "newswangerd",
                "awcrosby",
                "tima",
                "gregdek",
            ],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NamespaceRef {
    pub id: u32,
    pub href: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CollectionRef {
    pub id: u32,
    pub href: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct LatestVersion {
    pub version: String,
    pub href: String,
    pub deprecated: bool,
    pub created: &'static str,
    pub modified: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Collection {
    pub id: u32,
    pub href: String,
    pub name: String,
    pub namespace: NamespaceRef,
    pub versions_url: String,
    pub latest_version: LatestVersion,
}

#[derive(Debug, Serialize)]
pub struct VersionLink {
    pub version: String,
    pub href: String,
}

/// Version listing. Everything fits on one page.
#[derive(Debug, Serialize)]
pub struct Versions {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<VersionLink>,
}

#[derive(Debug, Serialize)]
pub struct VersionMetadata {
    pub namespace: String,
    pub dependencies: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct Artifact {
    pub filename: String,
    pub size: u64,
    pub sha256: String,
}

#[derive(Debug, Serialize)]
pub struct VersionDetail {
    pub id: u32,
    pub href: String,
    pub download_url: String,
    pub metadata: VersionMetadata,
    pub namespace: NamespaceRef,
    pub collection: CollectionRef,
    pub version: String,
    pub artifact: Artifact,
}
