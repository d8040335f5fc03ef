//! Crawl engine: level-synchronous, depth-bounded breadth-first traversal
//!
//! The engine exclusively owns the frontier and the visited set for the
//! lifetime of one session. Each depth level is fully drained before the
//! next begins; the level boundary is the synchronization barrier, because
//! the next frontier is only known once every page of the current level has
//! been parsed.
//!
//! Termination: the visited set only grows, each URL enters it at most once,
//! and the level counter is strictly bounded by `max-depth`, so total work is
//! bounded by `max-depth` times the reachable same-origin subgraph.

use crate::config::CrawlConfig;
use crate::mirror::fetcher::{build_http_client, ClaimedPaths};
use crate::mirror::page::process_page;
use crate::mirror::{MirrorEntry, PageRecord, SessionResult};
use crate::url::{canonical_key, canonicalize, OriginPolicy};
use crate::{ConfigError, MirrorError};
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

/// Engine lifecycle states
///
/// `Completed` and `Aborted` are terminal. `Aborted` is reached only for a
/// fatal configuration failure detected before any page fetch; per-URL
/// failures never leave `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    Idle,
    Running,
    Completed,
    Aborted,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EngineState::Idle => "idle",
            EngineState::Running => "running",
            EngineState::Completed => "completed",
            EngineState::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// What the engine hands back to the session
#[derive(Debug)]
pub struct CrawlOutcome {
    pub result: SessionResult,
    /// Raw HTML of the seed page, for post-processing (metadata, summary)
    pub seed_html: Option<String>,
}

/// Drives one breadth-first mirror traversal
pub struct CrawlEngine {
    config: Arc<CrawlConfig>,
    client: Client,
    policy: OriginPolicy,
    page_limit: Arc<Semaphore>,
    fetch_limit: Arc<Semaphore>,
    claims: ClaimedPaths,
    state: EngineState,
    visited: HashSet<String>,
}

impl CrawlEngine {
    /// Creates an engine for one session
    ///
    /// # Arguments
    ///
    /// * `config` - Validated session configuration
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlEngine)` - Engine in the `Idle` state
    /// * `Err(MirrorError)` - HTTP client construction failed
    pub fn new(config: CrawlConfig) -> Result<Self, MirrorError> {
        let timeout = Duration::from_secs(config.crawl.request_timeout_secs);
        let client = build_http_client(&config.fetch.user_agent, timeout)?;

        // The policy is rebuilt from the canonical seed in run(); seed parse
        // failures surface there as the abort condition.
        let policy = match Url::parse(&config.crawl.seed_url) {
            Ok(seed) => OriginPolicy::for_seed(&seed, &config.crawl.allowed_hosts),
            Err(_) => OriginPolicy::for_seed(
                &Url::parse("http://invalid.invalid/").expect("static URL parses"),
                &config.crawl.allowed_hosts,
            ),
        };

        let page_limit = Arc::new(Semaphore::new(config.fetch.max_concurrent_pages));
        let fetch_limit = Arc::new(Semaphore::new(config.fetch.max_concurrent_fetches));

        Ok(Self {
            config: Arc::new(config),
            client,
            policy,
            page_limit,
            fetch_limit,
            claims: ClaimedPaths::default(),
            state: EngineState::Idle,
            visited: HashSet::new(),
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Runs the traversal to completion
    ///
    /// Seeds the frontier, then per level: marks not-yet-visited URLs as
    /// visited (sequentially, so a URL is dispatched at most once no matter
    /// how often it was discovered), processes the level's pages concurrently
    /// up to the page-worker bound, waits for all of them, and assembles the
    /// deduplicated next frontier. Per-URL failures are recorded into the
    /// result; only an invalid seed or an uncreatable output root aborts.
    pub async fn run(&mut self) -> Result<CrawlOutcome, MirrorError> {
        let started_at = Utc::now();
        self.state = EngineState::Running;

        let seed = match canonicalize(&self.config.crawl.seed_url) {
            Ok(seed) => seed,
            Err(e) => {
                self.state = EngineState::Aborted;
                return Err(ConfigError::InvalidSeed(format!(
                    "{}: {}",
                    self.config.crawl.seed_url, e
                ))
                .into());
            }
        };
        self.policy = OriginPolicy::for_seed(&seed, &self.config.crawl.allowed_hosts);

        if let Err(e) = std::fs::create_dir_all(&self.config.output.root) {
            self.state = EngineState::Aborted;
            return Err(ConfigError::OutputRoot(format!(
                "{}: {}",
                self.config.output.root.display(),
                e
            ))
            .into());
        }

        tracing::info!(
            "Starting mirror of {} (max depth {}, root {})",
            seed,
            self.config.crawl.max_depth,
            self.config.output.root.display()
        );

        let mut pages: Vec<PageRecord> = Vec::new();
        let mut resources: Vec<MirrorEntry> = Vec::new();
        let mut seed_html: Option<String> = None;

        let mut frontier: Vec<Url> = vec![seed.clone()];
        let mut level: u32 = 0;

        while !frontier.is_empty() && level < self.config.crawl.max_depth {
            // Mark visited at dispatch time, sequentially: a URL discovered
            // from several pages still gets processed exactly once.
            let batch: Vec<Url> = frontier
                .drain(..)
                .filter(|url| self.visited.insert(canonical_key(url)))
                .collect();

            if batch.is_empty() {
                break;
            }

            tracing::info!("Level {}: processing {} pages", level, batch.len());

            let visits = futures::future::join_all(batch.iter().map(|url| {
                let page_limit = Arc::clone(&self.page_limit);
                let client = &self.client;
                let config = &self.config;
                let policy = &self.policy;
                let fetch_limit = &self.fetch_limit;
                let claims = &self.claims;
                let keep_html = level == 0 && seed_html.is_none();
                async move {
                    let _permit = page_limit.acquire().await.expect("page semaphore closed");
                    process_page(
                        client, config, policy, fetch_limit, claims, url, level, keep_html,
                    )
                    .await
                }
            }))
            .await;

            // Level barrier passed; assemble the next frontier in discovery
            // order, deduplicated against the visited set and within itself.
            let mut queued: HashSet<String> = HashSet::new();
            for visit in visits {
                if visit.html.is_some() && seed_html.is_none() {
                    seed_html = visit.html;
                }
                pages.push(visit.record);
                resources.extend(visit.entries);
                for link in visit.links {
                    let key = canonical_key(&link);
                    if !self.visited.contains(&key) && queued.insert(key) {
                        frontier.push(link);
                    }
                }
            }

            level += 1;
        }

        self.state = EngineState::Completed;

        let result = SessionResult {
            seed: seed.to_string(),
            output_root: self.config.output.root.clone(),
            state: self.state,
            pages,
            resources,
            started_at,
            finished_at: Utc::now(),
            metadata: None,
            summary: None,
            archive_path: None,
        };

        tracing::info!(
            "Mirror completed: {} pages ok, {} failed, {} resources, {} resource failures",
            result.pages_ok(),
            result.pages_failed(),
            result.resources_fetched(),
            result.resources_failed()
        );

        Ok(CrawlOutcome {
            result,
            seed_html,
        })
    }
}
