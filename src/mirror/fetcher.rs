//! HTTP fetching for kagami
//!
//! This module handles all network I/O:
//! - Building the HTTP client with a browser-like user agent
//! - Page fetches, direct or routed through a dynamic-rendering proxy
//! - Idempotent resource downloads with a single immediate retry
//!
//! Every failure surfaces with a human-readable cause string; nothing here
//! aborts the crawl.

use crate::config::CrawlConfig;
use crate::mirror::paths::local_path;
use crate::mirror::{FetchOutcome, MirrorEntry, ResourceKind};
use crate::MirrorError;
use reqwest::Client;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

/// Destinations written or in flight within one session
///
/// Checked-and-inserted in one step under the lock, so concurrent fetches
/// whose URLs map to the same file resolve to exactly one download. The
/// `dest.exists()` check alone is not enough: two pages of the same level can
/// both pass it before either has written a byte.
pub type ClaimedPaths = Mutex<HashSet<PathBuf>>;

/// Builds the HTTP client used for all requests in one session
///
/// # Arguments
///
/// * `user_agent` - User agent header value (browser-like by default)
/// * `timeout` - Per-request timeout; applies to each call, not the session
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches the raw HTML of a page
///
/// When `dynamic-rendering` is enabled the request is routed through the
/// configured rendering proxy so script-driven pages come back as rendered
/// HTML; otherwise it is a direct GET.
///
/// # Returns
///
/// * `Ok(String)` - The page body
/// * `Err(MirrorError::Fetch)` - Timeout, transport error, or non-2xx status,
///   with a human-readable cause
pub async fn fetch_page(client: &Client, config: &CrawlConfig, url: &Url) -> Result<String, MirrorError> {
    let request_url = if config.crawl.dynamic_rendering {
        render_url(&config.fetch.render_service_url, url)
    } else {
        url.to_string()
    };

    let response = client
        .get(&request_url)
        .send()
        .await
        .map_err(|e| fetch_error(url, &e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(MirrorError::Fetch {
            url: url.to_string(),
            reason: format!("HTTP {}", status),
        });
    }

    response.text().await.map_err(|e| fetch_error(url, &e))
}

/// Builds the proxy URL for a dynamically rendered page
pub fn render_url(service_base: &str, url: &Url) -> String {
    format!("{}/{}", service_base.trim_end_matches('/'), url)
}

/// Downloads a single resource into the mirror, idempotently
///
/// The destination is computed via the path mapper and claimed before any
/// I/O: a destination that is already claimed or already on disk is a cache
/// hit, with no network round trip (this is also how colliding basenames
/// resolve: first claimant wins). On a transport failure or non-2xx status
/// the fetch is retried exactly once, immediately; after that the claim is
/// released, the entry is recorded as failed, and the crawl moves on.
///
/// Concurrent downloads are bounded by the shared semaphore.
pub async fn fetch_resource(
    client: &Client,
    url: &Url,
    root: &Path,
    kind: ResourceKind,
    limit: &Semaphore,
    claims: &ClaimedPaths,
) -> MirrorEntry {
    let dest = local_path(url, root, kind);

    let newly_claimed = claims
        .lock()
        .expect("claims lock poisoned")
        .insert(dest.clone());
    if !newly_claimed || dest.exists() {
        tracing::debug!("Skipping {} ({} already claimed)", url, dest.display());
        return MirrorEntry {
            url: url.to_string(),
            local_path: Some(dest),
            kind,
            outcome: FetchOutcome::Ok,
        };
    }

    let _permit = limit.acquire().await.expect("fetch semaphore closed");

    let mut last_error = String::new();
    for attempt in 0..2 {
        if attempt > 0 {
            tracing::debug!("Retrying {} after: {}", url, last_error);
        }
        match download(client, url, &dest).await {
            Ok(()) => {
                tracing::debug!("Fetched {} -> {}", url, dest.display());
                return MirrorEntry {
                    url: url.to_string(),
                    local_path: Some(dest),
                    kind,
                    outcome: FetchOutcome::Ok,
                };
            }
            Err(reason) => last_error = reason,
        }
    }

    // Release the claim so a later discovery of this destination can retry.
    claims.lock().expect("claims lock poisoned").remove(&dest);

    tracing::warn!("Failed to download {}: {}", url, last_error);
    MirrorEntry {
        url: url.to_string(),
        local_path: Some(dest),
        kind,
        outcome: FetchOutcome::Failed(last_error),
    }
}

/// One download attempt: GET, status check, write to disk
async fn download(client: &Client, url: &Url, dest: &Path) -> Result<(), String> {
    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| describe_reqwest_error(&e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("HTTP {}", status));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| describe_reqwest_error(&e))?;

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("write {}: {}", parent.display(), e))?;
    }
    tokio::fs::write(dest, &bytes)
        .await
        .map_err(|e| format!("write {}: {}", dest.display(), e))?;

    Ok(())
}

fn fetch_error(url: &Url, error: &reqwest::Error) -> MirrorError {
    MirrorError::Fetch {
        url: url.to_string(),
        reason: describe_reqwest_error(error),
    }
}

/// Classifies a reqwest error into a short human-readable cause
fn describe_reqwest_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        "connection failed".to_string()
    } else {
        error.to_string()
    }
}
