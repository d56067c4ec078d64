//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use annotator_core::{Card, CardPage, Column, ExportSummary, ImportedFile, LabelSummary};
use serde::Serialize;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a value as pretty JSON
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize output: {}", e),
        }
    }

    /// Print the outcome of an import
    pub fn print_import(&self, file: &ImportedFile, labels: &[String]) {
        match self.format {
            OutputFormat::Human => {
                println!("File:    {}", file.metadata.name);
                println!("Size:    {}", format_bytes(file.metadata.size));
                println!("Rows:    {}", file.documents.len());
                println!("Columns: {}", file.columns.len());
                println!("Labels:  {}", labels.join(", "));
            }
            OutputFormat::Json => self.json(&serde_json::json!({
                "file": file.metadata,
                "documents": file.documents.len(),
                "columns": file.columns.len(),
                "labels": labels,
            })),
            OutputFormat::Quiet => println!("{}", file.documents.len()),
        }
    }

    /// Print the column list with display roles
    pub fn print_columns(&self, columns: &[Column]) {
        match self.format {
            OutputFormat::Human => {
                if columns.is_empty() {
                    println!("No columns. Import a file first.");
                    return;
                }
                for (i, column) in columns.iter().enumerate() {
                    let role = if column.primary {
                        " (primary)"
                    } else if column.secondary {
                        " (secondary)"
                    } else {
                        ""
                    };
                    println!("{:>3}. {}{}", i + 1, column.name, role);
                }
            }
            OutputFormat::Json => self.json(columns),
            OutputFormat::Quiet => {
                for column in columns {
                    println!("{}", column.name);
                }
            }
        }
    }

    /// Print labels with the number of documents carrying each
    pub fn print_label_summary(&self, summary: &LabelSummary) {
        match self.format {
            OutputFormat::Human => {
                if summary.counts.is_empty() {
                    println!("No labels defined.");
                    return;
                }
                for entry in &summary.counts {
                    println!("{} ({})", entry.label, entry.count);
                }
                println!();
                println!(
                    "{} of {} document(s) labelled",
                    summary.total - summary.unlabelled,
                    summary.total
                );
            }
            OutputFormat::Json => self.json(summary),
            OutputFormat::Quiet => {
                for entry in &summary.counts {
                    println!("{}", entry.label);
                }
            }
        }
    }

    /// Print one page of cards
    pub fn print_card_page(&self, page: &CardPage) {
        match self.format {
            OutputFormat::Human => {
                if page.cards.is_empty() {
                    println!("No documents on page {}.", page.page);
                } else {
                    for card in &page.cards {
                        print_card_line(card);
                    }
                }
                println!();
                println!(
                    "Page {} of {} ({} document(s))",
                    page.page,
                    page.page_count.max(1),
                    page.total_count
                );
            }
            OutputFormat::Json => self.json(page),
            OutputFormat::Quiet => {
                for card in &page.cards {
                    if let Some(id) = card.id {
                        println!("{}", id);
                    }
                }
            }
        }
    }

    /// Print a single card in full
    pub fn print_card(&self, card: &Card) {
        match self.format {
            OutputFormat::Human => {
                if let Some(id) = card.id {
                    println!("ID:    {}", id);
                }
                println!("Label: {}", card.label.as_deref().unwrap_or("(none)"));
                println!();
                println!("{}:", card.primary.column);
                println!("  {}", cell_text(&card.primary.value));
                for field in &card.secondary {
                    println!("{}:", field.column);
                    println!("  {}", cell_text(&field.value));
                }
            }
            OutputFormat::Json => self.json(card),
            OutputFormat::Quiet => {
                println!("{}", card.label.as_deref().unwrap_or(""));
            }
        }
    }

    pub fn print_export(&self, summary: &ExportSummary) {
        match self.format {
            OutputFormat::Human => {
                println!(
                    "✓ Exported {} row(s), {} labelled, to {}",
                    summary.rows,
                    summary.labelled,
                    summary.path.display()
                );
            }
            OutputFormat::Json => self.json(summary),
            OutputFormat::Quiet => println!("{}", summary.path.display()),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_card_line(card: &Card) {
    let id = card.id.map(|id| id.to_string()).unwrap_or_default();
    let label = card
        .label
        .as_deref()
        .map(|l| format!(" [{}]", l))
        .unwrap_or_default();
    println!(
        "{:>5} | {}{}",
        id,
        truncate_line(&cell_text(&card.primary.value), 60),
        label
    );
    for field in &card.secondary {
        println!(
            "      | {}: {}",
            field.column,
            truncate_line(&cell_text(&field.value), 50)
        );
    }
}

fn cell_text(value: &Option<annotator_core::CellValue>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// Human-readable byte size, two decimals
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let size = bytes as f64;
    if size >= GB {
        format!("{:.2} GB", size / GB)
    } else if size >= MB {
        format!("{:.2} MB", size / MB)
    } else if size >= KB {
        format!("{:.2} KB", size / KB)
    } else {
        format!("{:.2} bytes", size)
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}
