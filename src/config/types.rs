use serde::Deserialize;
use std::path::PathBuf;

/// Default base address of the dynamic-rendering proxy
pub const DEFAULT_RENDER_SERVICE: &str = "https://render-tron.appspot.com/render";

const DEFAULT_SUMMARIZER_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

/// Immutable per-session configuration for one mirror run
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    pub crawl: CrawlSection,
    #[serde(default)]
    pub fetch: FetchSection,
    pub output: OutputSection,
    /// Optional summarizer; absent means no AI summary is produced
    #[serde(default)]
    pub summarizer: Option<SummarizerSection>,
}

/// Crawl traversal configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSection {
    /// Seed URL to start mirroring from
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Maximum traversal depth (levels of pages, >= 1; 1 = seed page only)
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Route page fetches through the dynamic-rendering proxy
    #[serde(rename = "dynamic-rendering", default)]
    pub dynamic_rendering: bool,

    /// Per-request timeout in seconds (applies to each network call, not the session)
    #[serde(rename = "request-timeout-secs", default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Extra hosts allowed beyond the seed's host (exact match)
    #[serde(rename = "allowed-hosts", default)]
    pub allowed_hosts: Vec<String>,
}

/// Network behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchSection {
    /// Maximum number of pages processed concurrently within one level
    #[serde(rename = "max-concurrent-pages", default = "default_concurrent_pages")]
    pub max_concurrent_pages: usize,

    /// Global bound on concurrent resource downloads
    #[serde(rename = "max-concurrent-fetches", default = "default_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Base address of the dynamic-rendering proxy
    #[serde(rename = "render-service-url", default = "default_render_service")]
    pub render_service_url: String,

    /// User agent sent with direct requests
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            max_concurrent_pages: default_concurrent_pages(),
            max_concurrent_fetches: default_concurrent_fetches(),
            render_service_url: default_render_service(),
            user_agent: default_user_agent(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSection {
    /// Mirror root directory
    pub root: PathBuf,

    /// Compress the finished mirror into mirror.zip
    #[serde(default)]
    pub archive: bool,

    /// Write mirror-report.json into the mirror root
    #[serde(default = "default_true")]
    pub report: bool,
}

/// AI summarizer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SummarizerSection {
    /// generateContent-style endpoint to POST to
    #[serde(default = "default_summarizer_endpoint")]
    pub endpoint: String,

    /// Environment variable holding the API key
    #[serde(rename = "api-key-env", default = "default_api_key_env")]
    pub api_key_env: String,

    /// Maximum number of characters of page content sent for summarization
    #[serde(rename = "max-chars", default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for SummarizerSection {
    fn default() -> Self {
        Self {
            endpoint: default_summarizer_endpoint(),
            api_key_env: default_api_key_env(),
            max_chars: default_max_chars(),
        }
    }
}

impl CrawlConfig {
    /// Builds a configuration with defaults for everything except the seed
    /// URL and output root. Used by the CLI when no config file is given and
    /// by tests.
    pub fn new(seed_url: impl Into<String>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            crawl: CrawlSection {
                seed_url: seed_url.into(),
                max_depth: default_max_depth(),
                dynamic_rendering: false,
                request_timeout_secs: default_timeout_secs(),
                allowed_hosts: Vec::new(),
            },
            fetch: FetchSection::default(),
            output: OutputSection {
                root: output_root.into(),
                archive: false,
                report: true,
            },
            summarizer: None,
        }
    }
}

fn default_max_depth() -> u32 {
    1
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_concurrent_pages() -> usize {
    4
}

fn default_concurrent_fetches() -> usize {
    8
}

fn default_render_service() -> String {
    DEFAULT_RENDER_SERVICE.to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_true() -> bool {
    true
}

fn default_summarizer_endpoint() -> String {
    DEFAULT_SUMMARIZER_ENDPOINT.to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_max_chars() -> usize {
    4000
}
