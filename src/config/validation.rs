use crate::config::types::{CrawlConfig, CrawlSection, FetchSection, OutputSection};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Every check here runs before any network activity; a failure aborts the
/// session as a whole rather than being recorded as a per-URL error.
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_crawl_section(&config.crawl)?;
    validate_fetch_section(&config.fetch)?;
    validate_output_section(&config.output)?;
    Ok(())
}

/// Validates crawl traversal settings, including that the seed parses as an
/// absolute http(s) URL with a host
fn validate_crawl_section(config: &CrawlSection) -> Result<(), ConfigError> {
    let seed = Url::parse(&config.seed_url)
        .map_err(|e| ConfigError::InvalidSeed(format!("{}: {}", config.seed_url, e)))?;

    if seed.scheme() != "http" && seed.scheme() != "https" {
        return Err(ConfigError::InvalidSeed(format!(
            "seed must use http or https, got '{}'",
            seed.scheme()
        )));
    }

    if seed.host_str().is_none() {
        return Err(ConfigError::InvalidSeed(format!(
            "seed has no host: {}",
            config.seed_url
        )));
    }

    if config.max_depth < 1 {
        return Err(ConfigError::Validation(format!(
            "max-depth must be >= 1, got {}",
            config.max_depth
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    for host in &config.allowed_hosts {
        if host.is_empty() {
            return Err(ConfigError::Validation(
                "allowed-hosts entries cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates network behavior settings
fn validate_fetch_section(config: &FetchSection) -> Result<(), ConfigError> {
    if config.max_concurrent_pages < 1 || config.max_concurrent_pages > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-pages must be between 1 and 100, got {}",
            config.max_concurrent_pages
        )));
    }

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-fetches must be between 1 and 100, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.render_service_url.is_empty() {
        return Err(ConfigError::Validation(
            "render-service-url cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output settings and probes the mirror root for writability
fn validate_output_section(config: &OutputSection) -> Result<(), ConfigError> {
    if config.root.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output root cannot be empty".to_string(),
        ));
    }

    std::fs::create_dir_all(&config.root)
        .map_err(|e| ConfigError::OutputRoot(format!("{}: {}", config.root.display(), e)))?;

    // A created directory can still be read-only; probe with a real write.
    let probe = config.root.join(".kagami-write-probe");
    std::fs::write(&probe, b"")
        .map_err(|e| ConfigError::OutputRoot(format!("{}: {}", config.root.display(), e)))?;
    let _ = std::fs::remove_file(&probe);

    Ok(())
}
