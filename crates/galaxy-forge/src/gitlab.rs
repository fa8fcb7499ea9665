use galaxy_config::config::{Config, VersionOrder};
use galaxy_package::tree::FileTree;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::debug;
use ureq::{typestate::WithoutBody, Agent, RequestBuilder};

use crate::{
    archive,
    error::{ForgeError, Result},
    http_client::ClientConfig,
    tags::{release_versions, Tag},
    traits::Forge,
};

/// Characters kept verbatim in an encoded project path; everything else, `/` included,
/// is percent-encoded.
const PROJECT_PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const TAGS_PER_PAGE: u32 = 100;

/// A GitLab instance whose `root_group` holds one `<namespace>.<collection>` project
/// per collection.
pub struct GitLab {
    agent: Agent,
    endpoint: String,
    root_group: String,
    token: Option<String>,
    version_order: VersionOrder,
}

impl GitLab {
    pub fn new(endpoint: impl Into<String>, root_group: impl Into<String>) -> Self {
        Self {
            agent: ClientConfig::default().build(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            root_group: root_group.into().trim_matches('/').to_string(),
            token: None,
            version_order: VersionOrder::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.gitlab_endpoint(), config.root_group())
            .with_client(&ClientConfig::from_config(config))
            .with_token(config.gitlab_token().map(String::from))
            .with_version_order(config.version_order())
    }

    pub fn with_client(mut self, client: &ClientConfig) -> Self {
        self.agent = client.build();
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn with_version_order(mut self, order: VersionOrder) -> Self {
        self.version_order = order;
        self
    }

    /// Full project path below the root group.
    pub fn project_path(&self, namespace: &str, collection: &str) -> String {
        if self.root_group.is_empty() {
            format!("{namespace}.{collection}")
        } else {
            format!("{}/{namespace}.{collection}", self.root_group)
        }
    }

    pub fn tags_url(&self, namespace: &str, collection: &str) -> String {
        let project = self.project_path(namespace, collection);
        format!(
            "{}/api/v4/projects/{}/repository/tags",
            self.endpoint,
            utf8_percent_encode(&project, PROJECT_PATH)
        )
    }

    fn get(&self, url: &str) -> RequestBuilder<WithoutBody> {
        let req = self.agent.get(url);
        match &self.token {
            Some(token) => req.header("PRIVATE-TOKEN", token),
            None => req,
        }
    }

    /// Fetches every tag of the project, following GitLab's `X-Next-Page` pagination.
    fn fetch_tags(&self, namespace: &str, collection: &str) -> Result<Vec<Tag>> {
        let base = self.tags_url(namespace, collection);
        let mut tags = Vec::new();
        let mut page = 1u32;

        loop {
            let url = format!("{base}?per_page={TAGS_PER_PAGE}&page={page}");
            debug!("fetching tags from {url}");

            let mut resp = self.get(&url).call()?;
            let status = resp.status();
            if !status.is_success() {
                return Err(ForgeError::Upstream {
                    status: status.as_u16(),
                    url,
                });
            }

            let next_page = resp
                .headers()
                .get("x-next-page")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u32>().ok())
                .filter(|next| *next > page);

            let batch: Vec<Tag> = resp
                .body_mut()
                .read_json()
                .map_err(|_| ForgeError::InvalidResponse { url: url.clone() })?;
            tags.extend(batch);

            match next_page {
                Some(next) => page = next,
                None => break,
            }
        }

        Ok(tags)
    }
}

impl Forge for GitLab {
    fn versions(&self, namespace: &str, collection: &str) -> Result<Vec<String>> {
        let tags = self.fetch_tags(namespace, collection)?;
        let total = tags.len();
        let versions = release_versions(tags, self.version_order);

        debug!(
            "{} of {} tags of {}.{} are release versions",
            versions.len(),
            total,
            namespace,
            collection
        );

        if versions.is_empty() {
            return Err(ForgeError::NotFound {
                project: self.project_path(namespace, collection),
            });
        }

        Ok(versions)
    }

    fn archive_url(&self, namespace: &str, collection: &str, version: &str) -> String {
        archive::archive_url(
            &self.endpoint,
            &self.root_group,
            namespace,
            collection,
            version,
        )
    }

    fn fetch_archive(&self, namespace: &str, collection: &str, version: &str) -> Result<FileTree> {
        let url = self.archive_url(namespace, collection, version);
        archive::fetch_archive(&self.agent, &url, self.token.as_deref())
    }
}
