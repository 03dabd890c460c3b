//! pagecheck CLI - PDF page layout auditing tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pagecheck::model::points_to_inches;
use pagecheck::{
    AuditOptions, AuditOutput, JsonFormat, LopdfBackend, MarginSpec, PageAnalysis,
    PageNumberLocation, PageSource, Pagecheck, TargetMargins,
};

#[derive(Parser)]
#[command(name = "pagecheck")]
#[command(version)]
#[command(about = "Audit PDF page layout: margins, blank pages, orientation, page numbers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit every page and report violations
    Audit {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Write the annotated PDF here
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Also write the JSON report here
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,

        #[command(flatten)]
        audit: AuditArgs,
    },

    /// Report printed page numbers only
    PageNumbers {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        audit: AuditArgs,
    },

    /// Write the full analysis as JSON
    Json {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        audit: AuditArgs,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

/// Options shared by the auditing commands. Flags override the config file.
#[derive(Args, Clone, Default)]
struct AuditArgs {
    /// Required left margin (inches)
    #[arg(long)]
    left: Option<f32>,

    /// Required top margin (inches)
    #[arg(long)]
    top: Option<f32>,

    /// Required right margin (inches)
    #[arg(long)]
    right: Option<f32>,

    /// Required bottom margin (inches)
    #[arg(long)]
    bottom: Option<f32>,

    /// Measurement tolerance (points)
    #[arg(long)]
    tolerance: Option<f32>,

    /// Target margins to compare against, in inches
    #[arg(long, value_name = "L,T,R,B")]
    target_margins: Option<String>,

    /// Page index that carries printed number 1
    #[arg(long, value_name = "N")]
    first_printed_page: Option<u32>,

    /// Analyse pages one at a time
    #[arg(long)]
    sequential: bool,

    /// Stop at the first page that cannot be analysed
    #[arg(long)]
    strict: bool,

    /// JSON file with audit options
    #[arg(long, value_name = "FILE", env = "PAGECHECK_CONFIG")]
    config: Option<PathBuf>,
}

impl AuditArgs {
    fn to_options(&self) -> Result<AuditOptions, Box<dyn std::error::Error>> {
        let mut options = match &self.config {
            Some(path) => {
                log::debug!("Loading audit options from {}", path.display());
                AuditOptions::from_json_file(path)?
            }
            None => AuditOptions::new(),
        };

        let current = options.margins;
        let margin_flags = [self.left, self.top, self.right, self.bottom, self.tolerance];
        if margin_flags.iter().any(Option::is_some) {
            let margins = MarginSpec::from_inches(
                self.left.unwrap_or(points_to_inches(current.left)),
                self.top.unwrap_or(points_to_inches(current.top)),
                self.right.unwrap_or(points_to_inches(current.right)),
                self.bottom.unwrap_or(points_to_inches(current.bottom)),
            )
            .with_tolerance(self.tolerance.unwrap_or(current.tolerance));
            options = options.with_margins(margins);
        }

        if let Some(target) = &self.target_margins {
            options = options.with_target_margins(TargetMargins::parse(target)?);
        }
        if let Some(page) = self.first_printed_page {
            options = options.with_first_printed_page(page);
        }
        if self.sequential {
            options = options.sequential();
        }
        if self.strict {
            options = options.strict();
        }

        options.validate()?;
        Ok(options)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Audit {
            input,
            output,
            json,
            audit,
        } => cmd_audit(&input, output.as_deref(), json.as_deref(), &audit),
        Commands::PageNumbers { input, json, audit } => cmd_page_numbers(&input, json, &audit),
        Commands::Json {
            input,
            output,
            compact,
            audit,
        } => cmd_json(&input, output.as_deref(), compact, &audit),
        Commands::Info { input } => cmd_info(&input),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Run an audit behind a spinner.
fn run_audit(
    input: &Path,
    options: AuditOptions,
) -> Result<AuditOutput, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Auditing {}...", input.display()));

    let result = Pagecheck::with_options(options).audit_file(input);
    pb.finish_and_clear();
    Ok(result?)
}

fn cmd_audit(
    input: &Path,
    output: Option<&Path>,
    json: Option<&Path>,
    args: &AuditArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = args.to_options()?.with_overlay(output.is_some());
    let audit = run_audit(input, options)?;
    let analysis = audit.analysis();

    println!(
        "{:>5}  {:<9}  {:<5}  {:<7}  {:<6}  {:<7}  {}",
        "Page".bold(),
        "Layout".bold(),
        "Blank".bold(),
        "Borders".bold(),
        "Side".bold(),
        "Number".bold(),
        "Notes".bold()
    );
    println!("{}", "─".repeat(64).dimmed());
    for page in analysis.pages() {
        print_page_row(page);
    }

    let summary = analysis.summary();
    println!();
    println!("{}", "Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Pages".bold(), summary.page_count);
    println!(
        "{}: {} portrait, {} landscape",
        "Orientation".bold(),
        summary.portrait_count,
        summary.landscape_count
    );
    println!("{}: {}", "Blank".bold(), format_pages(&summary.blank_pages));
    println!(
        "{}: {}",
        "Outside margins".bold(),
        format_pages(&summary.out_of_bounds_pages)
    );
    if !summary.failed_pages.is_empty() {
        println!(
            "{}: {}",
            "Failed".bold(),
            format_pages(&summary.failed_pages).red()
        );
    }
    if let Some(matches) = summary.target_margin_matches {
        println!(
            "{}: {}/{}",
            "Match target margins".bold(),
            matches,
            summary.page_count
        );
    }

    let flagged = &summary.flagged_pages;
    if flagged.is_empty() {
        println!("\n{}", "All pages pass.".green().bold());
    } else {
        println!(
            "\n{} {}",
            format!("{} page(s) flagged:", flagged.len()).yellow().bold(),
            format_pages(flagged)
        );
    }

    if let Some(path) = output {
        audit.write_annotated(path)?;
        println!("{} {}", "Annotated PDF saved to".green(), path.display());
    }
    if let Some(path) = json {
        fs::write(path, audit.to_json(JsonFormat::Pretty)?)?;
        println!("{} {}", "Report saved to".green(), path.display());
    }

    Ok(())
}

fn print_page_row(page: &PageAnalysis) {
    if let Some(error) = page.error() {
        println!(
            "{:>5}  {}",
            page.page_number(),
            format!("analysis failed: {}", error).red()
        );
        return;
    }

    let blank = if page.is_blank() {
        "yes".yellow()
    } else {
        "no".normal()
    };
    let borders = if page.inside_borders() {
        "ok".green()
    } else {
        "OUT".red().bold()
    };
    let number = page
        .page_number_detection()
        .value
        .clone()
        .unwrap_or_else(|| "-".to_string());
    let notes = page
        .violation()
        .and_then(|v| v.text.clone())
        .map(|text| format!("text outside margins: {:?}", text))
        .unwrap_or_default();

    println!(
        "{:>5}  {:<9}  {:<5}  {:<7}  {:<6}  {:<7}  {}",
        page.page_number(),
        page.orientation().as_str(),
        blank,
        borders,
        format!("{:?}", page.side()).to_lowercase(),
        number,
        notes.dimmed()
    );
}

fn cmd_page_numbers(
    input: &Path,
    json: bool,
    args: &AuditArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = args.to_options()?.with_overlay(false);
    let audit = run_audit(input, options)?;
    let summary = audit.analysis().summary();

    let with_numbers = summary.numbered_pages;
    let missing = summary.unnumbered_pages();
    let coverage = if summary.page_count > 0 {
        with_numbers as f64 / summary.page_count as f64 * 100.0
    } else {
        0.0
    };

    if json {
        let stats = serde_json::json!({
            "total_pages": summary.page_count,
            "pages_with_numbers": with_numbers,
            "pages_without_numbers": missing,
            "coverage_percent": (coverage * 100.0).round() / 100.0,
            "top": summary.page_numbers_top,
            "bottom": summary.page_numbers_bottom,
            "band_distribution": summary.band_distribution,
        });
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    for page in audit.analysis().pages() {
        let detection = page.page_number_detection();
        let found = match (&detection.value, detection.location, detection.band_width) {
            (Some(value), location, Some(band)) if location != PageNumberLocation::None => {
                format!(
                    "{} ({}, {:.1}in band)",
                    value.green(),
                    format!("{:?}", location).to_lowercase(),
                    band
                )
            }
            _ => "-".dimmed().to_string(),
        };
        println!("{:>5}  {}", page.page_number(), found);
    }

    println!();
    println!("{}", "Page Numbers".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Pages".bold(), summary.page_count);
    println!(
        "{}: {} ({:.1}%)",
        "With numbers".bold(),
        with_numbers,
        coverage
    );
    println!("{}: {}", "Missing".bold(), missing);
    println!(
        "{}: {} top, {} bottom",
        "Position".bold(),
        summary.page_numbers_top,
        summary.page_numbers_bottom
    );
    for (band, count) in &summary.band_distribution {
        println!("  {} {}in band: {}", "├─".dimmed(), band, count);
    }

    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    args: &AuditArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = args.to_options()?.with_overlay(false);
    let audit = Pagecheck::with_options(options).audit_file(input)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = audit.to_json(format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let backend = LopdfBackend::load_file(input)?;
    let metadata = backend.metadata();

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), metadata.pdf_version);
    println!("{}: {}", "Pages".bold(), metadata.page_count);
    println!(
        "{}: {}",
        "Encrypted".bold(),
        if metadata.encrypted { "Yes" } else { "No" }
    );

    if let Some(ref title) = metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref creator) = metadata.creator {
        println!("{}: {}", "Creator".bold(), creator);
    }
    if let Some(ref producer) = metadata.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }
    if let Some(ref created) = metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pagecheck".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF page layout auditing tool");
    println!();
    println!("License: MIT");
}

/// Compact page list, e.g. "1-3, 7, 9-10".
fn format_pages(pages: &[u32]) -> String {
    if pages.is_empty() {
        return "none".to_string();
    }
    let mut ranges: Vec<String> = Vec::new();
    let mut start = pages[0];
    let mut end = pages[0];
    for &page in &pages[1..] {
        if page == end + 1 {
            end = page;
            continue;
        }
        ranges.push(format_range(start, end));
        start = page;
        end = page;
    }
    ranges.push(format_range(start, end));
    ranges.join(", ")
}

fn format_range(start: u32, end: u32) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{}-{}", start, end)
    }
}
