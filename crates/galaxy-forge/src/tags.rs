//! Selection and ordering of release tags.

use std::{cmp::Reverse, sync::LazyLock};

use galaxy_config::config::VersionOrder;
use regex::Regex;
use semver::Version;
use serde::Deserialize;

static RELEASE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)$")
        .expect("unable to compile release tag regex")
});

/// A repository tag as reported by the GitLab tags API.
#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub name: String,
}

/// Whether `tag` is a plain `MAJOR.MINOR.PATCH` release tag.
///
/// Prefixed (`v1.0.0`), suffixed (`1.0.0-rc1`) and zero-padded (`01.0.0`) tags are
/// rejected rather than normalized.
pub fn is_release_tag(tag: &str) -> bool {
    RELEASE_TAG_RE.is_match(tag)
}

/// Sorts versions newest first.
pub fn sort_versions(versions: &mut [String], order: VersionOrder) {
    match order {
        VersionOrder::Semver => {
            versions.sort_by_cached_key(|v| Reverse(Version::parse(v).ok()));
        }
        VersionOrder::Lexical => versions.sort_by(|a, b| b.cmp(a)),
    }
}

/// Release versions among `tags`, newest first.
pub fn release_versions<I>(tags: I, order: VersionOrder) -> Vec<String>
where
    I: IntoIterator<Item = Tag>,
{
    let mut versions: Vec<String> = tags
        .into_iter()
        .map(|tag| tag.name)
        .filter(|name| is_release_tag(name))
        .collect();
    sort_versions(&mut versions, order);
    versions.dedup();
    versions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(names: &[&str]) -> Vec<Tag> {
        names
            .iter()
            .map(|name| {
                Tag {
                    name: name.to_string(),
                }
            })
            .collect()
    }

    #[test]
    fn test_release_tag_acceptance() {
        for tag in ["0.0.0", "1.2.3", "10.0.1", "2.30.400"] {
            assert!(is_release_tag(tag), "{tag} should be accepted");
        }
    }

    #[test]
    fn test_release_tag_rejection() {
        for tag in [
            "v1.2.3",
            "1.2.3-rc1",
            "1.2.3+build",
            "01.2.3",
            "1.02.3",
            "1.2",
            "1.2.3.4",
            " 1.2.3",
            "latest",
            "",
        ] {
            assert!(!is_release_tag(tag), "{tag:?} should be rejected");
        }
    }

    #[test]
    fn test_semver_order() {
        let versions = release_versions(
            tags(&["1.0.0", "v2.0.0", "10.0.0", "9.1.0", "9.0.12", "9.0.2"]),
            VersionOrder::Semver,
        );
        assert_eq!(versions, vec!["10.0.0", "9.1.0", "9.0.12", "9.0.2", "1.0.0"]);
    }

    #[test]
    fn test_lexical_order() {
        let versions = release_versions(
            tags(&["1.0.0", "10.0.0", "9.1.0", "9.0.12", "9.0.2"]),
            VersionOrder::Lexical,
        );
        assert_eq!(versions, vec!["9.1.0", "9.0.2", "9.0.12", "10.0.0", "1.0.0"]);
    }

    #[test]
    fn test_no_release_tags() {
        let versions = release_versions(tags(&["main", "v1.0.0"]), VersionOrder::Semver);
        assert!(versions.is_empty());
    }
}
