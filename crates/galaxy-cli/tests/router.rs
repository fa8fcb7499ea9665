use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use galaxy_cli::server::{router, AppState};
use galaxy_core::ArtifactCache;
use galaxy_forge::{
    error::{ForgeError, Result as ForgeResult},
    Forge,
};
use galaxy_package::tree::{FileEntry, FileTree};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

const PUBLIC_URL: &str = "http://galaxy.test:8181";

/// Serves `acme.tools` normally; other collection names trigger failures.
struct FakeForge;

impl Forge for FakeForge {
    fn versions(&self, namespace: &str, collection: &str) -> ForgeResult<Vec<String>> {
        let url = format!("fake://{namespace}.{collection}/tags");
        match collection {
            "missing" => {
                Err(ForgeError::NotFound {
                    project: format!("{namespace}.{collection}"),
                })
            }
            "down" => Err(ForgeError::Upstream { status: 503, url }),
            "private" => Err(ForgeError::Upstream { status: 403, url }),
            _ => Ok(vec!["1.1.0".into(), "1.0.0".into()]),
        }
    }

    fn archive_url(&self, namespace: &str, collection: &str, version: &str) -> String {
        format!("fake://{namespace}.{collection}/{version}.tar.gz")
    }

    fn fetch_archive(
        &self,
        namespace: &str,
        collection: &str,
        version: &str,
    ) -> ForgeResult<FileTree> {
        let root = format!("{collection}-{version}");
        let mut tree = FileTree::new();
        if collection != "broken" {
            let declaration = format!(
                "namespace: {namespace}\nname: {collection}\n\
                 dependencies:\n  community.general: \">=7.0.0\"\n"
            );
            tree.insert(
                format!("{root}/galaxy.yml"),
                FileEntry::new(declaration, 0o644, 0),
            );
        }
        tree.insert(
            format!("{root}/plugins/modules/ping.py"),
            FileEntry::new("print('pong')\n", 0o644, 0),
        );
        Ok(tree)
    }
}

fn app() -> (Router, TempDir) {
    let dir = tempdir().unwrap();
    let forge: Box<dyn Forge> = Box::new(FakeForge);
    let cache = ArtifactCache::new(forge, dir.path());
    (router(AppState::new(cache, &format!("{PUBLIC_URL}/"))), dir)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = get(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_api_root() {
    let (app, _dir) = app();
    let (status, json) = get_json(&app, "/api/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["current_version"], "v2");
    assert_eq!(json["available_versions"]["v2"], "v2/");
    assert_eq!(json["description"], "GALAXY REST API");
    assert_eq!(json["version_name"], "Doin' it Right");
    assert_eq!(json["team_members"].as_array().map(Vec::len), Some(7));
    assert_eq!(json["team_members"][0], "chouseknecht");
}

#[tokio::test]
async fn test_collection_descriptor() {
    let (app, _dir) = app();
    let (status, json) = get_json(&app, "/api/v2/collections/acme/tools/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "tools");
    assert_eq!(json["namespace"]["name"], "acme");
    assert_eq!(
        json["versions_url"],
        format!("{PUBLIC_URL}/api/v2/collections/acme/tools/versions/")
    );
    assert_eq!(json["latest_version"]["version"], "1.1.0");
    assert_eq!(
        json["latest_version"]["href"],
        format!("{PUBLIC_URL}/api/v2/collections/acme/tools/versions/1.1.0/")
    );
    assert_eq!(json["latest_version"]["deprecated"], false);
}

#[tokio::test]
async fn test_versions_list() {
    let (app, _dir) = app();
    let (status, json) = get_json(&app, "/api/v2/collections/acme/tools/versions/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 2);
    assert!(json["next"].is_null());
    assert!(json["previous"].is_null());
    assert_eq!(json["results"][0]["version"], "1.1.0");
    assert_eq!(json["results"][1]["version"], "1.0.0");
}

#[tokio::test]
async fn test_listing_errors() {
    let (app, _dir) = app();

    for (collection, expected) in [
        ("missing", StatusCode::NOT_FOUND),
        ("private", StatusCode::FORBIDDEN),
        ("down", StatusCode::INTERNAL_SERVER_ERROR),
    ] {
        let (status, json) =
            get_json(&app, &format!("/api/v2/collections/acme/{collection}/versions/")).await;
        assert_eq!(status, expected, "{collection}");
        assert_eq!(json["error"]["code"], expected.as_u16());

        let (status, _) = get_json(&app, &format!("/api/v2/collections/acme/{collection}/")).await;
        assert_eq!(status, expected, "{collection}");
    }
}

#[tokio::test]
async fn test_version_detail_then_download() {
    let (app, dir) = app();

    let (status, _, _) = get(&app, "/dl/acme.tools-1.0.0.tar.gz").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = get_json(&app, "/api/v2/collections/acme/tools/versions/1.0.0/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["version"], "1.0.0");
    assert_eq!(
        json["download_url"],
        format!("{PUBLIC_URL}/dl/acme.tools-1.0.0.tar.gz")
    );
    assert_eq!(json["metadata"]["namespace"], "acme");
    assert_eq!(
        json["metadata"]["dependencies"]["community.general"],
        ">=7.0.0"
    );
    assert_eq!(json["collection"]["name"], "tools");
    assert_eq!(json["artifact"]["filename"], "acme.tools-1.0.0.tar.gz");

    let on_disk = std::fs::read(dir.path().join("acme.tools-1.0.0.tar.gz")).unwrap();
    assert_eq!(json["artifact"]["size"], on_disk.len() as u64);
    assert_eq!(json["artifact"]["sha256"].as_str().map(str::len), Some(64));

    let (status, headers, body) = get(&app, "/dl/acme.tools-1.0.0.tar.gz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/octet-stream");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"acme.tools-1.0.0.tar.gz\""
    );
    assert_eq!(body, on_disk);
}

#[tokio::test]
async fn test_version_detail_without_trailing_slash() {
    let (app, _dir) = app();
    let (status, json) = get_json(&app, "/api/v2/collections/acme/tools/versions/1.1.0").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["href"],
        format!("{PUBLIC_URL}/api/v2/collections/acme/tools/versions/1.1.0/")
    );
}

#[tokio::test]
async fn test_build_failure_is_failed_dependency() {
    let (app, dir) = app();
    let (status, json) = get_json(&app, "/api/v2/collections/acme/broken/versions/1.0.0/").await;

    assert_eq!(status, StatusCode::FAILED_DEPENDENCY);
    assert_eq!(json["error"]["code"], 424);
    assert!(!dir.path().join("acme.broken-1.0.0.tar.gz.metadata").exists());

    let (status, _, _) = get(&app, "/dl/acme.broken-1.0.0.tar.gz").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_version_is_bad_request() {
    let (app, _dir) = app();
    let (status, json) = get_json(&app, "/api/v2/collections/acme/tools/versions/1..0/").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], 400);
}

#[tokio::test]
async fn test_download_rejects_non_artifacts() {
    let (app, _dir) = app();
    get_json(&app, "/api/v2/collections/acme/tools/versions/1.0.0/").await;

    let (status, _, _) = get(&app, "/dl/acme.tools-1.0.0.tar.gz.metadata").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
