//! Console output for the organizer CLI.
//!
//! Styled status lines, the progress bar shown while items are moved, and the
//! per-destination summary table all go through [`OutputFormatter`].

use crate::item::ProjectSnapshot;
use crate::router::{Disposition, RoutingPlan};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

/// Manages all CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for moving `total` items.
    ///
    /// ```no_run
    /// use projtidy::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(10);
    /// pb.inc(1);
    /// pb.finish_with_message("done");
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints one line per item describing where it will go.
    pub fn plan_listing(plan: &RoutingPlan, snapshot: &ProjectSnapshot) {
        for decision in &plan.decisions {
            let Some(item) = snapshot.get(decision.item) else {
                continue;
            };
            let line = match decision.disposition {
                Disposition::Routed(category) => {
                    let destination = plan.destination_name(category).unwrap_or("?");
                    format!(
                        " {} {} → {}/ ({})",
                        decision.item,
                        item.name,
                        destination.green(),
                        category.description()
                    )
                }
                Disposition::Excluded => {
                    format!(" {} {} {}", decision.item, item.name, "(excluded)".yellow())
                }
                Disposition::Unmatched => {
                    format!(" {} {} {}", decision.item, item.name, "(left in place)".dimmed())
                }
                Disposition::Folder => continue,
            };
            println!("{}", line);
        }
    }

    /// Prints a summary table of routed items by destination.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use projtidy::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("Videos".to_string(), 4);
    /// counts.insert("Comp".to_string(), 2);
    /// OutputFormatter::summary_table(&counts, 1, 3);
    /// ```
    pub fn summary_table(counts: &BTreeMap<String, usize>, excluded: usize, left_in_place: usize) {
        Self::header("SUMMARY");

        let width = counts
            .keys()
            .map(|name| name.chars().count())
            .chain(["Destination".len(), "Left in place".len()])
            .max()
            .unwrap_or(0);

        println!(
            "{:<width$} | {}",
            "Destination".bold(),
            "Items".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (destination, count) in counts {
            println!(
                "{:<width$} | {} {}",
                destination,
                count.to_string().green(),
                item_word(*count),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        let total: usize = counts.values().sum();
        println!(
            "{:<width$} | {} {}",
            "Moved".bold(),
            total.to_string().green().bold(),
            item_word(total),
            width = width
        );
        println!(
            "{:<width$} | {} {}",
            "Excluded",
            excluded.to_string().yellow(),
            item_word(excluded),
            width = width
        );
        println!(
            "{:<width$} | {} {}",
            "Left in place",
            left_in_place,
            item_word(left_in_place),
            width = width
        );
    }
}

fn item_word(count: usize) -> &'static str {
    if count == 1 { "item" } else { "items" }
}
