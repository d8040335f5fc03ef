//! PathMapper: deterministic URL to local-path mapping
//!
//! Every artifact of one host lands under `root/<host dir>/`. Pages keep
//! their URL path as subdirectories (gaining `.html` when extension-less),
//! resources are flattened to their basename, matching how pages reference
//! them after a shallow mirror.

use crate::mirror::ResourceKind;
use std::path::{Path, PathBuf};
use url::Url;

/// Maps a URL to its local file path within the mirror root
///
/// The mapping is a pure function of the URL and kind: identical inputs
/// always yield identical paths, so callers can dedup by path as well as by
/// URL (destination already on disk means skip, first writer wins).
///
/// # Behavior
///
/// * All paths live under `root/<host>/` (`<host>_<port>` when the URL
///   carries an explicit port).
/// * Pages: `/` maps to `index.html`; any other path keeps its segments as
///   subdirectories and gains `.html` when the final segment has no
///   extension.
/// * Resources (stylesheets, scripts, images): flattened to the basename of
///   the URL path, directly under the host directory.
///
/// Dot segments and empty segments are dropped so a hostile path can never
/// escape the mirror root.
pub fn local_path(url: &Url, root: &Path, kind: ResourceKind) -> PathBuf {
    let mut path = root.join(host_dir(url));

    match kind {
        ResourceKind::Page => {
            let segments = clean_segments(url.path());
            if segments.is_empty() {
                path.push("index.html");
            } else {
                let last_index = segments.len() - 1;
                for (i, segment) in segments.iter().enumerate() {
                    if i == last_index && !has_extension(segment) {
                        path.push(format!("{}.html", segment));
                    } else {
                        path.push(segment);
                    }
                }
            }
        }
        _ => {
            let basename = clean_segments(url.path())
                .last()
                .cloned()
                .unwrap_or_else(|| "resource".to_string());
            path.push(basename);
        }
    }

    path
}

/// Directory name for a URL's host, port-qualified when explicit
fn host_dir(url: &Url) -> String {
    let host = url.host_str().unwrap_or("unknown-host");
    let mut dir = match url.port() {
        Some(port) => format!("{}_{}", host, port),
        None => host.to_string(),
    };
    // IPv6 hosts carry characters the filesystem dislikes.
    dir = dir
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    dir
}

/// Splits a URL path into segments, dropping empties and dot segments
fn clean_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .map(|s| s.to_string())
        .collect()
}

fn has_extension(segment: &str) -> bool {
    match segment.rsplit_once('.') {
        Some((stem, ext)) => !stem.is_empty() && !ext.is_empty(),
        None => false,
    }
}
