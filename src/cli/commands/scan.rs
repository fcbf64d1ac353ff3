//! Library scanning commands.

use std::io::Write;
use std::path::Path;

use tokio::runtime::Runtime;

use super::open_catalog;
use crate::config::Config;
use crate::error::ResultExt;
use crate::library::{self, ScanEvent, ScanSummary};

/// Register a directory and index it, printing progress.
pub fn cmd_scan(rt: &Runtime, config: &Config, path: &Path) -> anyhow::Result<()> {
    rt.block_on(async {
        let (pool, cache) = open_catalog(config).await?;
        println!("Scanning directory: {}", path.display());

        let summary = library::scan_directory_with(&pool, &cache, path, |event, summary| {
            match event {
                ScanEvent::Indexed { .. } => {
                    if summary.indexed % 100 == 0 {
                        print!("\rScanned {} tracks...", summary.indexed);
                        let _ = std::io::stdout().flush();
                    }
                }
                ScanEvent::Skipped(_) => {}
                ScanEvent::Error(p, e) => {
                    eprintln!("\nError processing {}: {}", p.display(), e);
                }
            }
        })
        .await?;

        let Some(summary) = summary else {
            anyhow::bail!("Not a directory: {}", path.display());
        };
        println!();
        print_summary(&summary);
        anyhow::Ok(())
    })
}

/// Rescan every registered directory.
pub fn cmd_rebuild(rt: &Runtime, config: &Config) -> anyhow::Result<()> {
    rt.block_on(async {
        let (pool, cache) = open_catalog(config).await?;
        let summaries = library::rebuild_library(&pool, &cache)
            .await
            .with_context("rebuilding library")?;

        if summaries.is_empty() {
            println!("No directories to rescan.");
        }
        for summary in &summaries {
            print_summary(summary);
        }
        anyhow::Ok(())
    })
}

fn print_summary(summary: &ScanSummary) {
    println!(
        "{} (#{}): {} tracks, {} new, {} skipped, {} failed",
        summary.root.display(),
        summary.dir_id,
        summary.indexed,
        summary.created,
        summary.skipped,
        summary.failed
    );
}
