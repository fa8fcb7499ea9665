use galaxy_package::tree::FileTree;
use tracing::debug;
use ureq::Agent;

use crate::error::{ForgeError, Result};

/// Location of the tarball GitLab generates for a tag.
pub fn archive_url(
    endpoint: &str,
    group: &str,
    namespace: &str,
    collection: &str,
    version: &str,
) -> String {
    let project = format!("{namespace}.{collection}");
    let endpoint = endpoint.trim_end_matches('/');
    let group = group.trim_matches('/');

    if group.is_empty() {
        format!("{endpoint}/{project}/-/archive/{version}/{project}-{version}.tar.gz")
    } else {
        format!("{endpoint}/{group}/{project}/-/archive/{version}/{project}-{version}.tar.gz")
    }
}

/// Downloads a `.tar.gz` archive and reads it into memory.
pub fn fetch_archive(agent: &Agent, url: &str, token: Option<&str>) -> Result<FileTree> {
    debug!("fetching source archive {url}");

    let mut req = agent.get(url);
    if let Some(token) = token {
        req = req.header("PRIVATE-TOKEN", token);
    }

    let resp = req.call()?;
    let status = resp.status();
    if !status.is_success() {
        return Err(ForgeError::Upstream {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    FileTree::from_tar_gz(resp.into_body().into_reader()).map_err(|source| {
        ForgeError::Format {
            url: url.to_string(),
            source,
        }
    })
}
