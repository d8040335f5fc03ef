//! Page processing: persist a fetched page and pull out what it references
//!
//! Parsing happens inside synchronous helpers so the scraper DOM (which is
//! not Send) never lives across an await point. Extraction never errors:
//! malformed HTML yields a best-effort tree and missing or malformed
//! attributes are simply skipped.

use crate::config::CrawlConfig;
use crate::mirror::fetcher::{fetch_page, fetch_resource, ClaimedPaths};
use crate::mirror::paths::local_path;
use crate::mirror::{FetchOutcome, MirrorEntry, PageMetadata, PageRecord, ResourceKind};
use crate::url::{canonical_key, canonicalize, OriginPolicy};
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tokio::sync::Semaphore;
use url::Url;

/// Everything extracted from one parsed page
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// Title and SEO meta tags
    pub metadata: PageMetadata,

    /// Embedded resources to download, deduplicated within the page
    pub resources: Vec<(Url, ResourceKind)>,

    /// Same-origin outbound links, canonicalized and deduplicated within the
    /// page, in discovery order
    pub links: Vec<Url>,
}

/// Result of processing one frontier URL
#[derive(Debug)]
pub struct PageVisit {
    pub record: PageRecord,
    pub entries: Vec<MirrorEntry>,
    pub links: Vec<Url>,
    /// Raw HTML, kept only for the seed page (post-processing input)
    pub html: Option<String>,
}

/// Processes one page: fetch, persist, mirror its resources, return links
///
/// A fetch failure is the only condition that stops processing of this URL;
/// it yields a failed record with empty link and resource sets. Persisting
/// and resource downloads are best-effort: their failures are recorded and
/// the page's links are still returned so the crawl continues.
pub async fn process_page(
    client: &Client,
    config: &CrawlConfig,
    policy: &OriginPolicy,
    fetch_limit: &Semaphore,
    claims: &ClaimedPaths,
    url: &Url,
    depth: u32,
    keep_html: bool,
) -> PageVisit {
    let html = match fetch_page(client, config, url).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Failed to fetch page {}: {}", url, e);
            return PageVisit {
                record: PageRecord {
                    url: url.to_string(),
                    local_path: None,
                    title: None,
                    depth,
                    outcome: FetchOutcome::Failed(e.to_string()),
                },
                entries: Vec::new(),
                links: Vec::new(),
                html: None,
            };
        }
    };

    let extracted = extract_page(&html, url, policy);

    // Persist the page itself. A failed write leaves no file, so the record
    // carries no local path either.
    let dest = local_path(url, &config.output.root, ResourceKind::Page);
    let (outcome, page_path) = match persist(&html, &dest).await {
        Ok(()) => (FetchOutcome::Ok, Some(dest)),
        Err(reason) => {
            tracing::warn!("Failed to persist page {}: {}", url, reason);
            (FetchOutcome::Failed(reason), None)
        }
    };

    // Mirror embedded resources; failures accumulate, never propagate.
    let mut entries = Vec::with_capacity(extracted.resources.len());
    let fetches = extracted.resources.iter().map(|(resource_url, kind)| {
        fetch_resource(client, resource_url, &config.output.root, *kind, fetch_limit, claims)
    });
    entries.extend(futures::future::join_all(fetches).await);

    tracing::debug!(
        "Processed {} ({} resources, {} links)",
        url,
        entries.len(),
        extracted.links.len()
    );

    PageVisit {
        record: PageRecord {
            url: url.to_string(),
            local_path: page_path,
            title: extracted.metadata.title.clone(),
            depth,
            outcome,
        },
        entries,
        links: extracted.links,
        html: keep_html.then_some(html),
    }
}

async fn persist(html: &str, dest: &std::path::Path) -> Result<(), String> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("write {}: {}", parent.display(), e))?;
    }
    tokio::fs::write(dest, html)
        .await
        .map_err(|e| format!("write {}: {}", dest.display(), e))
}

/// Parses a page and extracts metadata, embedded resources, and outbound links
///
/// # Extraction Rules
///
/// Resources: `link[rel=stylesheet]` hrefs, `script` and `img` srcs, resolved
/// against the page URL, any origin. Links: `a` hrefs, resolved, filtered to
/// the allowed origin, canonicalized. `javascript:`, `mailto:`, `tel:` and
/// `data:` hrefs and fragment-only anchors are skipped.
pub fn extract_page(html: &str, page_url: &Url, policy: &OriginPolicy) -> ExtractedPage {
    let document = Html::parse_document(html);

    ExtractedPage {
        metadata: extract_metadata(&document),
        resources: extract_resources(&document, page_url),
        links: extract_links(&document, page_url, policy),
    }
}

/// Extracts title, description, and keywords from raw HTML
///
/// Pure function; used by the session for the seed page's SEO block.
pub fn page_metadata(html: &str) -> PageMetadata {
    extract_metadata(&Html::parse_document(html))
}

/// Extracts title, description, and keywords from a parsed document
fn extract_metadata(document: &Html) -> PageMetadata {
    PageMetadata {
        title: extract_title(document),
        description: extract_meta_content(document, "description"),
        keywords: extract_meta_content(document, "keywords"),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_meta_content(document: &Html, name: &str) -> Option<String> {
    let selector = Selector::parse(&format!("meta[name='{}']", name)).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts embedded resource URLs, deduplicated within the page
fn extract_resources(document: &Html, page_url: &Url) -> Vec<(Url, ResourceKind)> {
    let mut resources = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    let sources = [
        ("link[rel='stylesheet'][href]", "href", ResourceKind::Stylesheet),
        ("script[src]", "src", ResourceKind::Script),
        ("img[src]", "src", ResourceKind::Image),
    ];

    for (selector_str, attr, kind) in sources {
        if let Ok(selector) = Selector::parse(selector_str) {
            for element in document.select(&selector) {
                if let Some(value) = element.value().attr(attr) {
                    if let Some(resolved) = resolve_href(value, page_url) {
                        if seen.insert(resolved.to_string()) {
                            resources.push((resolved, kind));
                        }
                    }
                }
            }
        }
    }

    resources
}

/// Extracts same-origin outbound links in discovery order
fn extract_links(document: &Html, page_url: &Url, policy: &OriginPolicy) -> Vec<Url> {
    let mut links = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(resolved) = resolve_href(href, page_url) else {
                continue;
            };
            if !policy.allows(&resolved) {
                continue;
            }
            let Ok(canonical) = canonicalize(resolved.as_str()) else {
                continue;
            };
            if seen.insert(canonical_key(&canonical)) {
                links.push(canonical);
            }
        }
    }

    links
}

/// Resolves an href/src to an absolute URL and validates it
///
/// Returns None for hrefs that should be excluded: empty, special schemes
/// (`javascript:`, `mailto:`, `tel:`, `data:`), fragment-only anchors, and
/// anything that fails to resolve or is not http(s).
fn resolve_href(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute)
        }
        _ => None,
    }
}
