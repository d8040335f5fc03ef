//! Mirror core: path mapping, fetching, page processing, and the crawl engine
//!
//! The data model lives here: one [`MirrorEntry`] per fetched artifact, one
//! [`PageRecord`] per visited page, aggregated into a [`SessionResult`] at
//! session end.

pub mod engine;
pub mod fetcher;
pub mod page;
pub mod paths;

pub use engine::{CrawlEngine, CrawlOutcome, EngineState};
pub use fetcher::{build_http_client, fetch_page, fetch_resource, ClaimedPaths};
pub use page::{extract_page, process_page, ExtractedPage, PageVisit};
pub use paths::local_path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Kind of a fetched artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Page,
    Stylesheet,
    Script,
    Image,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResourceKind::Page => "page",
            ResourceKind::Stylesheet => "stylesheet",
            ResourceKind::Script => "script",
            ResourceKind::Image => "image",
        };
        f.write_str(s)
    }
}

/// Outcome of fetching one page or resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum FetchOutcome {
    Ok,
    Failed(String),
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, FetchOutcome::Ok)
    }
}

/// One fetched artifact: a URL, its local path, and how the fetch went
///
/// Immutable once recorded; the mirror directory is append-only for the
/// duration of a session.
#[derive(Debug, Clone, Serialize)]
pub struct MirrorEntry {
    pub url: String,
    pub local_path: Option<PathBuf>,
    pub kind: ResourceKind,
    #[serde(flatten)]
    pub outcome: FetchOutcome,
}

/// One visited page
#[derive(Debug, Clone, Serialize)]
pub struct PageRecord {
    pub url: String,
    pub local_path: Option<PathBuf>,
    pub title: Option<String>,
    pub depth: u32,
    #[serde(flatten)]
    pub outcome: FetchOutcome,
}

/// Metadata extracted from a parsed page (title, description, keywords)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
}

/// Summary of one completed mirror session
///
/// Produced exactly once, at session end; read-only afterward. A session
/// always ends with one of these, never a silent partial mirror.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResult {
    pub seed: String,
    pub output_root: PathBuf,
    pub state: EngineState,
    pub pages: Vec<PageRecord>,
    pub resources: Vec<MirrorEntry>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// SEO metadata of the seed page, when it was reachable
    pub metadata: Option<PageMetadata>,
    /// AI summary of the seed page, when a summarizer was configured
    pub summary: Option<String>,
    /// Path of the zip archive, when archiving was enabled
    pub archive_path: Option<PathBuf>,
}

impl SessionResult {
    /// Number of pages fetched and persisted successfully
    pub fn pages_ok(&self) -> usize {
        self.pages.iter().filter(|p| p.outcome.is_ok()).count()
    }

    /// Number of pages that failed to fetch or persist
    pub fn pages_failed(&self) -> usize {
        self.pages.len() - self.pages_ok()
    }

    /// Number of resources on disk (downloaded or already present)
    pub fn resources_fetched(&self) -> usize {
        self.resources.iter().filter(|r| r.outcome.is_ok()).count()
    }

    /// Number of resources that could not be downloaded
    pub fn resources_failed(&self) -> usize {
        self.resources.len() - self.resources_fetched()
    }
}
