//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of a crawl run,
//! including statistics, the depth breakdown, errors and visited domains.

use crate::filter::FilterStats;
use crate::output::stats::CrawlStatistics;
use crate::strategy::Strategy;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Run-level facts shown above the statistics
#[derive(Debug, Clone)]
pub struct RunInfo {
    pub start_url: String,
    pub strategy: Strategy,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Hash of the configuration file the run used
    pub config_hash: Option<String>,

    /// Whether the run ended because shutdown was requested
    pub interrupted: bool,

    pub filter_stats: FilterStats,
}

/// Writes a markdown summary to `output_path`
///
/// # Errors
///
/// Returns the I/O error if the file cannot be created or written.
pub fn generate_markdown_summary(
    info: &RunInfo,
    stats: &CrawlStatistics,
    output_path: &Path,
) -> std::io::Result<()> {
    let markdown = format_markdown_summary(info, stats);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run summary as markdown
pub fn format_markdown_summary(info: &RunInfo, stats: &CrawlStatistics) -> String {
    let mut md = String::new();

    md.push_str("# Deep-Crawl Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Start URL**: {}\n", info.start_url));
    md.push_str(&format!("- **Strategy**: {}\n", info.strategy));
    md.push_str(&format!("- **Started**: {}\n", info.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", info.finished_at.to_rfc3339()));
    let duration = (info.finished_at - info.started_at).num_milliseconds() as f64 / 1000.0;
    md.push_str(&format!("- **Duration**: {:.2} seconds\n", duration));
    md.push_str(&format!(
        "- **Status**: {}\n",
        if info.interrupted {
            "interrupted"
        } else {
            "completed"
        }
    ));
    if let Some(hash) = &info.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Crawled**: {}\n", stats.total_pages));
    md.push_str(&format!("- **Successful**: {}\n", stats.successful));
    md.push_str(&format!("- **Failed**: {}\n", stats.failed));
    md.push_str(&format!("- **Success Rate**: {:.2}%\n", stats.success_rate()));
    md.push_str(&format!(
        "- **Unique Domains**: {}\n",
        stats.unique_domains.len()
    ));
    if let Some(depth) = stats.max_depth() {
        md.push_str(&format!("- **Deepest Level**: {}\n", depth));
    }
    md.push_str(&format!("- **Average Score**: {:.3}\n\n", stats.average_score));

    md.push_str("## Link Filtering\n\n");
    md.push_str("| Considered | Allowed | Blocked |\n");
    md.push_str("|------------|---------|---------|\n");
    md.push_str(&format!(
        "| {} | {} | {} |\n\n",
        info.filter_stats.considered, info.filter_stats.allowed, info.filter_stats.blocked
    ));

    if !stats.depth_breakdown.is_empty() {
        md.push_str("## Depth Breakdown\n\n");
        md.push_str("| Depth | Pages |\n");
        md.push_str("|-------|-------|\n");
        for (depth, count) in &stats.depth_breakdown {
            md.push_str(&format!("| {} | {} |\n", depth, count));
        }
        md.push('\n');
    }

    if !stats.status_codes.is_empty() {
        md.push_str("## Status Codes\n\n");
        md.push_str("| Status | Pages |\n");
        md.push_str("|--------|-------|\n");
        for (code, count) in &stats.status_codes {
            md.push_str(&format!("| {} | {} |\n", code, count));
        }
        md.push('\n');
    }

    if !stats.error_summary.is_empty() {
        md.push_str("## Error Summary\n\n");
        md.push_str("| Error | Count |\n");
        md.push_str("|-------|-------|\n");
        let mut errors: Vec<_> = stats.error_summary.iter().collect();
        errors.sort_by(|a, b| b.1.cmp(a.1));
        for (error, count) in errors.into_iter().take(20) {
            md.push_str(&format!("| {} | {} |\n", error.replace('|', "\\|"), count));
        }
        md.push('\n');
    }

    if !stats.unique_domains.is_empty() {
        md.push_str("## Domains Visited\n\n");
        for domain in stats.unique_domains.iter().take(50) {
            md.push_str(&format!("- {}\n", domain));
        }
        if stats.unique_domains.len() > 50 {
            md.push_str(&format!(
                "\n... and {} more\n",
                stats.unique_domains.len() - 50
            ));
        }
        md.push('\n');
    }

    md
}
