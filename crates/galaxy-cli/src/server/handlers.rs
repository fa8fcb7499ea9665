use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use galaxy_core::key::ArtifactKey;
use tracing::debug;

use super::{
    error::AppError,
    responses::{
        ApiRoot, Artifact, Collection, CollectionRef, LatestVersion, NamespaceRef, VersionDetail,
        VersionLink, VersionMetadata, Versions, EPOCH,
    },
    state::AppState,
};

/// Runs cache and forge work, which blocks, off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| AppError::Internal(format!("worker task failed: {err}")))
}

async fn list_versions(
    state: &AppState,
    namespace: &str,
    collection: &str,
) -> Result<Vec<String>, AppError> {
    let cache = state.cache.clone();
    let (ns, coll) = (namespace.to_string(), collection.to_string());

    blocking(move || cache.versions(&ns, &coll))
        .await?
        .map_err(AppError::from_listing)
}

fn namespace_ref(state: &AppState, namespace: &str) -> NamespaceRef {
    NamespaceRef {
        id: 1,
        href: state.namespace_href(),
        name: namespace.to_string(),
    }
}

pub async fn api_root() -> Json<ApiRoot> {
    Json(ApiRoot::default())
}

pub async fn collection(
    State(state): State<AppState>,
    Path((namespace, collection)): Path<(String, String)>,
) -> Result<Json<Collection>, AppError> {
    let versions = list_versions(&state, &namespace, &collection).await?;
    let latest = versions
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound(format!("no versions of {namespace}.{collection}")))?;

    Ok(Json(Collection {
        id: 1,
        href: state.collection_href(&namespace, &collection),
        versions_url: state.versions_href(&namespace, &collection),
        latest_version: LatestVersion {
            href: state.version_href(&namespace, &collection, &latest),
            version: latest,
            deprecated: false,
            created: EPOCH,
            modified: EPOCH,
        },
        namespace: namespace_ref(&state, &namespace),
        name: collection,
    }))
}

pub async fn versions(
    State(state): State<AppState>,
    Path((namespace, collection)): Path<(String, String)>,
) -> Result<Json<Versions>, AppError> {
    let versions = list_versions(&state, &namespace, &collection).await?;

    let results: Vec<_> = versions
        .into_iter()
        .map(|version| {
            VersionLink {
                href: state.version_href(&namespace, &collection, &version),
                version,
            }
        })
        .collect();

    Ok(Json(Versions {
        count: results.len(),
        next: None,
        previous: None,
        results,
    }))
}

pub async fn version_detail(
    State(state): State<AppState>,
    Path((namespace, collection, version)): Path<(String, String, String)>,
) -> Result<Json<VersionDetail>, AppError> {
    let key = ArtifactKey::new(&namespace, &collection, &version).map_err(AppError::from_build)?;

    let cache = state.cache.clone();
    let summary = {
        let key = key.clone();
        blocking(move || cache.get_or_build(&key.namespace, &key.collection, &key.version))
            .await?
            .map_err(AppError::from_build)?
    };

    let file_name = key.file_name();
    Ok(Json(VersionDetail {
        id: 1,
        href: state.version_href(&namespace, &collection, &version),
        download_url: state.download_url(&file_name),
        metadata: VersionMetadata {
            namespace: namespace.clone(),
            dependencies: summary.dependencies,
        },
        namespace: namespace_ref(&state, &namespace),
        collection: CollectionRef {
            id: 1,
            href: state.collection_href(&namespace, &collection),
            name: collection,
        },
        version,
        artifact: Artifact {
            filename: file_name,
            size: summary.size,
            sha256: summary.hash,
        },
    }))
}

pub async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let cache = state.cache.clone();
    let requested = filename.clone();
    let artifact = blocking(move || cache.artifact_for_download(&requested))
        .await?
        .ok_or_else(|| AppError::NotFound(filename.clone()))?;

    debug!("serving {}", artifact.display());
    let data = tokio::fs::read(&artifact)
        .await
        .map_err(|err| AppError::Internal(format!("reading {}: {err}", artifact.display())))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        data,
    ))
}
