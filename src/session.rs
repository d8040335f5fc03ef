//! Mirror session orchestration
//!
//! One [`MirrorSession`] owns one end-to-end run: configuration validation,
//! driving the crawl engine to completion, then post-processing over the
//! finished directory (seed-page metadata, optional AI summary, JSON report,
//! optional zip archive). Post-processing is strictly additive: none of it
//! can change the crawl outcome.

use crate::archive::write_archive;
use crate::config::{validate, CrawlConfig};
use crate::mirror::page::page_metadata;
use crate::mirror::{CrawlEngine, SessionResult};
use crate::output::write_report;
use crate::summarize::Summarizer;
use crate::Result;

/// Archive file written into the mirror root when archiving is enabled
pub const ARCHIVE_NAME: &str = "mirror.zip";

/// One end-to-end mirror run
pub struct MirrorSession {
    config: CrawlConfig,
}

impl MirrorSession {
    pub fn new(config: CrawlConfig) -> Self {
        Self { config }
    }

    /// Runs the session to completion
    ///
    /// Configuration errors abort before any network activity; everything
    /// after that is best-effort and ends in a [`SessionResult`] summarizing
    /// successes and failures, never a silent partial mirror.
    pub async fn run(self) -> Result<SessionResult> {
        validate(&self.config)?;

        let summarizer = self
            .config
            .summarizer
            .as_ref()
            .and_then(Summarizer::from_config);

        let mut engine = CrawlEngine::new(self.config.clone())?;
        let outcome = engine.run().await?;
        let mut result = outcome.result;

        if let Some(html) = &outcome.seed_html {
            result.metadata = Some(page_metadata(html));

            // At most one summary per session, only after mirroring is done.
            if let Some(summarizer) = &summarizer {
                match summarizer.summarize(html).await {
                    Ok(summary) => result.summary = Some(summary),
                    Err(e) => tracing::warn!("Summarization skipped: {}", e),
                }
            }
        }

        if self.config.output.archive {
            let archive_path = self.config.output.root.join(ARCHIVE_NAME);
            match write_archive(&self.config.output.root, &archive_path) {
                Ok(()) => {
                    tracing::info!("Archived mirror to {}", archive_path.display());
                    result.archive_path = Some(archive_path);
                }
                Err(e) => tracing::warn!("Archiving failed: {}", e),
            }
        }

        if self.config.output.report {
            let report_path = self.config.output.root.join("mirror-report.json");
            match write_report(&result, &report_path) {
                Ok(()) => tracing::info!("Wrote session report to {}", report_path.display()),
                Err(e) => tracing::warn!("Failed to write session report: {}", e),
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use crate::MirrorError;

    #[tokio::test]
    async fn test_invalid_config_aborts_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CrawlConfig::new("https://example.com/", dir.path());
        config.crawl.max_depth = 0;

        let result = MirrorSession::new(config).run().await;
        assert!(matches!(
            result.unwrap_err(),
            MirrorError::Config(ConfigError::Validation(_))
        ));
    }
}
