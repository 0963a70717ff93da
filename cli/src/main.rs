//! pdf-outline CLI - PDF outline extraction tool

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdf_outline::batch::collect_pdfs;
use pdf_outline::{
    BatchOptions, BatchProcessor, BatchSummary, DocumentStatus, JsonFormat, OutlineConfig,
    OutlineExtractor, PageSelection, ParseOptions,
};

/// Directory scanned when no input is given.
const DEFAULT_INPUT_DIR: &str = "input";
/// Directory written when no output is given in batch mode.
const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Parser)]
#[command(name = "pdf-outline")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract the title and H1-H3 outline of PDF documents as JSON", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Input PDF files or directories (default: ./input)
    #[arg(value_name = "FILE")]
    inputs: Vec<PathBuf>,

    /// Output directory (implies batch mode)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Write <stem>.json files into the output directory even for one input
    #[arg(long)]
    batch: bool,

    /// Compact JSON without indentation
    #[arg(long)]
    compact: bool,

    /// Process files one at a time
    #[arg(long)]
    sequential: bool,

    /// Fail on unreadable documents instead of writing an empty outline
    #[arg(long)]
    strict: bool,

    /// JSON file overriding heading weights and thresholds
    #[arg(long, value_name = "FILE", env = "PDF_OUTLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how each line of a PDF was classified
    Inspect {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Include lines that produced no candidate
        #[arg(long)]
        all: bool,

        /// Print the line reports as JSON
        #[arg(long)]
        json: bool,

        /// JSON file overriding heading weights and thresholds
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Inspect {
            ref input,
            all,
            json,
            ref config,
            ref pages,
        }) => cmd_inspect(input, all, json, config.as_deref(), pages.as_deref()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(true)
        }
        None => cmd_extract(&cli),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<OutlineConfig, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(OutlineConfig::from_file(p)?),
        None => Ok(OutlineConfig::default()),
    }
}

fn parse_options(strict: bool, pages: Option<&str>) -> Result<ParseOptions, Box<dyn std::error::Error>> {
    let mut options = if strict {
        ParseOptions::new().strict()
    } else {
        ParseOptions::new().lenient()
    };
    if let Some(p) = pages {
        let selection =
            PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?;
        options = options.with_pages(selection);
    }
    Ok(options)
}

/// Returns `Ok(false)` when any file failed.
fn cmd_extract(cli: &Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let config = load_config(cli.config.as_deref())?;
    let parse = parse_options(cli.strict, cli.pages.as_deref())?;

    let auto = cli.inputs.is_empty();
    let sources = if auto {
        let dir = Path::new(DEFAULT_INPUT_DIR);
        if !dir.is_dir() {
            println!("{}", "Usage: pdf-outline [FILE]... [-o DIR]".yellow());
            println!("       pdf-outline --help for more information");
            println!(
                "       (with no FILE, PDFs are read from ./{}/)",
                DEFAULT_INPUT_DIR
            );
            return Ok(true);
        }
        vec![dir.to_path_buf()]
    } else {
        cli.inputs.clone()
    };

    let mut files = Vec::new();
    for source in &sources {
        if source.is_dir() {
            files.extend(collect_pdfs(source)?);
        } else {
            files.push(source.clone());
        }
    }
    if files.is_empty() {
        println!("{}", "No PDF files found".yellow());
        return Ok(true);
    }

    let single = files.len() == 1
        && !auto
        && !cli.batch
        && cli.output.is_none()
        && !sources[0].is_dir();

    let mut options = BatchOptions::new().with_parse_options(parse).with_format(if cli.compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    });
    if !single {
        let dir = cli
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        options = options.with_output_dir(dir);
    }
    if cli.sequential {
        options = options.sequential();
    }

    let processor = BatchProcessor::new(options).with_config(config);

    let summary = if single {
        processor.process(&files)
    } else {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        let summary = processor.process_with(&files, |outcome| {
            pb.set_message(file_name(&outcome.input));
            pb.inc(1);
        });
        pb.finish_with_message("Done!");
        summary
    };

    print_summary(&summary);
    Ok(summary.failed() == 0)
}

fn print_summary(summary: &BatchSummary) {
    println!();
    for outcome in &summary.outcomes {
        let name = file_name(&outcome.input);
        match (&outcome.error, &outcome.output) {
            (Some(err), _) => println!("  {} {} {}", "✗".red(), name, err.dimmed()),
            (None, Some(output)) => {
                let status = match outcome.status {
                    Some(DocumentStatus::Form) => " (form)".yellow().to_string(),
                    Some(DocumentStatus::Empty) => " (no text)".yellow().to_string(),
                    Some(DocumentStatus::Unreadable) => " (unreadable)".red().to_string(),
                    _ => String::new(),
                };
                println!(
                    "  {} {} {} {}{} {}",
                    "✓".green(),
                    name,
                    "→".dimmed(),
                    output.display(),
                    status,
                    format!("[{} headings]", outcome.heading_count).dimmed()
                );
            }
            (None, None) => println!("  {} {}", "?".yellow(), name),
        }
    }

    println!();
    let line = format!(
        "{} succeeded, {} failed, {} headings",
        summary.succeeded(),
        summary.failed(),
        summary.total_headings()
    );
    if summary.failed() == 0 {
        println!("{}", line.green().bold());
    } else {
        println!("{}", line.red().bold());
    }
}

fn cmd_inspect(
    input: &Path,
    all: bool,
    json: bool,
    config: Option<&Path>,
    pages: Option<&str>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let extractor = OutlineExtractor::new()
        .with_parse_options(parse_options(false, pages)?)
        .with_config(load_config(config)?);
    let inspection = extractor.inspect_file(input)?;

    let rows: Vec<_> = inspection
        .lines
        .iter()
        .filter(|r| all || r.pattern.is_some())
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(true);
    }

    println!("{}", "Document Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), inspection.stats.page_count);
    println!("{}: {}", "Lines".bold(), inspection.lines.len());
    println!("{}: {:.1}pt", "Body size".bold(), inspection.stats.modal_font_size);
    println!(
        "{}: {:.1}%",
        "Form-like lines".bold(),
        inspection.form.form_fraction() * 100.0
    );
    if inspection.form.is_form {
        println!("{}", "Classified as a form: outline suppressed".yellow());
    }
    println!("{}: {:.3}", "Threshold".bold(), inspection.threshold);

    println!();
    println!("{}", "Lines".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for row in rows {
        let mark = if row.accepted {
            "✓".green().to_string()
        } else {
            " ".to_string()
        };
        let pattern = row.pattern.map(|p| p.label()).unwrap_or("-");
        let confidence = row
            .confidence
            .map(|c| format!("{:.3}", c))
            .unwrap_or_else(|| "  -  ".to_string());
        let text = if row.line.is_bold {
            row.line.text.bold().to_string()
        } else {
            row.line.text.clone()
        };
        println!(
            "{} p{:<3} {:>5.1}pt {:<9} {} {}",
            mark,
            row.line.page,
            row.line.font_size,
            pattern,
            confidence.dimmed(),
            text
        );
    }

    Ok(true)
}

fn cmd_version() {
    println!("{} {}", "pdf-outline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF outline extraction tool");
    println!();
    println!("License: MIT");
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
