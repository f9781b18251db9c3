//! Request dispatch and responders
//!
//! Every method and path lands in [`handle_request`]. A cache hit streams the
//! entry from disk; a miss forwards the request to the origin and tees a 200
//! response into the cache.
//!
//! Failures never produce error statuses. Each one is logged where it happens
//! and the client gets whatever was already sent, or an empty 200 if nothing
//! was.

use axum::{
    body::{Body, HttpBody},
    extract::{Request, State},
    http::uri::PathAndQuery,
    response::Response,
    Router,
};
use futures::TryStreamExt;
use std::path::{Path, PathBuf};
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

use super::AppState;
use crate::core::lookup::Route;
use crate::error::{CacheError, FetchError};
use crate::infra::locks::Lease;
use crate::infra::populate::{tee_to_cache, CacheWriter};

/// Build the router: a single wildcard handler for all methods and paths
pub fn create_router(state: AppState) -> Router {
    Router::new().fallback(handle_request).with_state(state)
}

/// Path and query of the request, as received
pub fn request_uri(request: &Request) -> String {
    request
        .uri()
        .path_and_query()
        .map_or("/", PathAndQuery::as_str)
        .to_string()
}

async fn handle_request(State(state): State<AppState>, request: Request) -> Response {
    let uri = request_uri(&request);
    info!(method = %request.method(), %uri, "request");

    match state.lookup.route(&uri).await {
        Route::Hit(path) => {
            debug!(path = %path.display(), "cache hit");
            serve_local_file(&path).await
        }
        Route::Miss(path) if state.config.atomic_writes() => {
            let lease = state.locks.acquire(&path).await;
            // Another request may have populated the entry while we waited
            if state.lookup.contains_path(&path).await {
                debug!(path = %path.display(), "cache hit after wait");
                drop(lease);
                return serve_local_file(&path).await;
            }
            debug!(path = %path.display(), "cache miss");
            fetch_and_populate(&state, request, &uri, path, Some(lease)).await
        }
        Route::Miss(path) => {
            debug!(path = %path.display(), "cache miss");
            fetch_and_populate(&state, request, &uri, path, None).await
        }
    }
}

/// Stream a cache entry to the client
async fn serve_local_file(path: &Path) -> Response {
    let file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) => {
            let err = CacheError::OpenFile {
                path: path.to_path_buf(),
                error: e.to_string(),
            };
            warn!(error = %err, "failed to serve cache entry");
            return default_response();
        }
    };

    let entry = path.display().to_string();
    let stream = ReaderStream::new(file).inspect_err(move |e| {
        warn!(path = %entry, error = %e, "failed reading cache entry mid-stream");
    });

    Response::new(Body::from_stream(stream))
}

/// Forward to the origin and tee a 200 response into the cache
async fn fetch_and_populate(
    state: &AppState,
    request: Request,
    uri: &str,
    path: PathBuf,
    lease: Option<Lease>,
) -> Response {
    if state.lookup.is_root(&path) {
        let err = CacheError::NotAnEntry {
            uri: uri.to_string(),
        };
        warn!(error = %err, "refusing to fetch");
        return default_response();
    }

    let url = state.config.origin_url(uri);
    let (parts, body) = request.into_parts();

    let response = match state
        .origin
        .fetch(parts.method, &url, outbound_body(body))
        .await
    {
        Ok(response) => response,
        Err(FetchError::NonSuccess { status, .. }) => {
            // Flaky origin responses must not end up in the cache
            debug!(%url, status, "origin did not return 200, not caching");
            return default_response();
        }
        Err(e) => {
            warn!(error = %e, "origin fetch failed");
            return default_response();
        }
    };

    let writer = match CacheWriter::create(&path, state.config.atomic_writes()).await {
        Ok(writer) => writer,
        Err(e) => {
            warn!(error = %e, "failed to create cache entry");
            return default_response();
        }
    };

    let body = tee_to_cache(response.bytes_stream(), writer, lease);
    Response::new(Body::from_stream(body))
}

/// Request body as a pass-through stream, or nothing when it is known empty
fn outbound_body(body: Body) -> Option<reqwest::Body> {
    if body.size_hint().exact() == Some(0) {
        return None;
    }
    Some(reqwest::Body::wrap_stream(body.into_data_stream()))
}

/// Empty body with the default 200 status
fn default_response() -> Response {
    Response::new(Body::empty())
}
