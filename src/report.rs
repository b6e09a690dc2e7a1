//! Terminal summaries for completed commands.

use colored::*;
use std::path::Path;

use crate::compact::CompactStats;
use crate::format::{format_token_count, one_decimal};
use crate::pick::PickSummary;

/// Compaction rate as printed: one decimal, or `0` for an empty project.
pub fn format_compaction_rate(stats: &CompactStats) -> String {
    if stats.raw_tokens == 0 {
        return "0".to_string();
    }
    one_decimal(stats.compaction_rate())
}

/// Print the summary of a `compact` run.
pub fn write_compact_summary(output_path: &Path, stats: &CompactStats) {
    println!();
    println!("{} {}", "✔".green(), "Compaction complete!".bold());
    println!();
    println!(
        "  {} {}",
        "Saved to".dimmed(),
        output_path.display().to_string().cyan()
    );
    println!();
    println!("  {}            {}", "Files".dimmed(), stats.files.to_string().white());
    println!(
        "  {}   {}",
        "Project tokens".dimmed(),
        format_token_count(stats.raw_tokens).yellow()
    );
    println!(
        "  {} {}",
        "Compacted tokens".dimmed(),
        format_token_count(stats.compacted_tokens).green()
    );
    println!(
        "  {}  {}",
        "Compaction rate".dimmed(),
        format!("{}%", format_compaction_rate(stats)).green().bold()
    );
}

/// Print the summary of a `pick` run.
pub fn write_pick_summary(summary: &PickSummary) {
    println!();
    println!("{} {}", "Saved to:".dimmed(), summary.path.display().to_string().cyan());
    println!(
        "{}/{} sections, ~{} tokens",
        summary.selected,
        summary.total,
        format_token_count(summary.tokens)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_compaction_rate() {
        let stats = CompactStats {
            files: 3,
            raw_tokens: 1000,
            compacted_tokens: 123,
        };
        assert_eq!(format_compaction_rate(&stats), "87.7");
        assert_eq!(format_compaction_rate(&CompactStats::default()), "0");

        let grown = CompactStats {
            files: 1,
            raw_tokens: 2,
            compacted_tokens: 4,
        };
        assert_eq!(format_compaction_rate(&grown), "-100.0");

        let tie = CompactStats {
            files: 1,
            raw_tokens: 16,
            compacted_tokens: 15,
        };
        assert_eq!(format_compaction_rate(&tie), "6.3");
    }
}
