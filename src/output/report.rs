//! Session report rendering
//!
//! The JSON report is the structured record of one session; the printed
//! summary is the same data for humans.

use crate::mirror::SessionResult;
use crate::MirrorError;
use std::path::Path;

/// Renders the session result as pretty-printed JSON
pub fn render_report(result: &SessionResult) -> Result<String, MirrorError> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Writes the JSON session report to the given path
pub fn write_report(result: &SessionResult, path: &Path) -> Result<(), MirrorError> {
    let rendered = render_report(result)?;
    std::fs::write(path, rendered).map_err(|e| MirrorError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Prints a human-readable summary of a finished session
pub fn print_summary(result: &SessionResult) {
    println!("=== Mirror Session Summary ===\n");
    println!("Seed: {}", result.seed);
    println!("Output: {}", result.output_root.display());
    println!("State: {}", result.state);
    println!(
        "Duration: {}s",
        (result.finished_at - result.started_at).num_seconds()
    );

    println!(
        "\nPages: {} ok, {} failed",
        result.pages_ok(),
        result.pages_failed()
    );
    for page in &result.pages {
        match &page.outcome {
            crate::mirror::FetchOutcome::Ok => {
                println!("  [ok]   depth {} {}", page.depth, page.url)
            }
            crate::mirror::FetchOutcome::Failed(reason) => {
                println!("  [fail] depth {} {} ({})", page.depth, page.url, reason)
            }
        }
    }

    println!(
        "\nResources: {} fetched, {} failed",
        result.resources_fetched(),
        result.resources_failed()
    );
    for resource in &result.resources {
        if let crate::mirror::FetchOutcome::Failed(reason) = &resource.outcome {
            println!("  [fail] {} {} ({})", resource.kind, resource.url, reason);
        }
    }

    if let Some(metadata) = &result.metadata {
        println!("\nSeed page metadata:");
        println!(
            "  Title: {}",
            metadata.title.as_deref().unwrap_or("(none)")
        );
        println!(
            "  Description: {}",
            metadata.description.as_deref().unwrap_or("(none)")
        );
        println!(
            "  Keywords: {}",
            metadata.keywords.as_deref().unwrap_or("(none)")
        );
    }

    if let Some(summary) = &result.summary {
        println!("\nAI summary:\n{}", summary);
    }

    if let Some(archive) = &result.archive_path {
        println!("\nArchive: {}", archive.display());
    }
}
