//! pdf-outline CLI - PDF title and heading outline extraction tool

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdf_outline::render::{self, ValidationReport};
use pdf_outline::{
    extract_outline, process_directory_with_events, BatchEvent, BatchOptions, EncoderOptions,
    ExtractOptions, FeatureEncoder, JsonFormat, Models, ParseOptions, PdfSpanSource, SpanSource,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "pdf-outline")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract PDF titles and heading outlines to JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract outlines for every PDF in a directory
    Run {
        /// Directory containing PDF files
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Directory receiving one JSON file per PDF
        #[arg(value_name = "OUTPUT_DIR")]
        output: PathBuf,

        #[command(flatten)]
        models: ModelArgs,

        /// Process documents one at a time
        #[arg(long)]
        sequential: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Skip unreadable pages instead of failing the document
        #[arg(long)]
        lenient: bool,

        #[command(flatten)]
        encoder: EncoderArgs,
    },

    /// Extract the outline of a single PDF
    File {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        models: ModelArgs,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Skip unreadable pages instead of failing the document
        #[arg(long)]
        lenient: bool,

        #[command(flatten)]
        encoder: EncoderArgs,
    },

    /// Print the encoded feature rows of a PDF as CSV
    Features {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        encoder: EncoderArgs,
    },

    /// Validate every JSON file in a directory against the output schema
    Validate {
        /// Directory containing JSON outlines
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct ModelArgs {
    /// Directory holding the block and level model artifacts
    #[arg(short, long, value_name = "DIR", env = "PDF_OUTLINE_MODELS")]
    models: PathBuf,
}

#[derive(Args)]
struct EncoderArgs {
    /// Encode whole text lines instead of single spans
    #[arg(long)]
    lines: bool,

    /// Also treat spans with the bold style flag as bold
    #[arg(long)]
    strict_bold: bool,
}

impl From<&EncoderArgs> for EncoderOptions {
    fn from(args: &EncoderArgs) -> Self {
        let mut options = EncoderOptions::new();
        if args.lines {
            options = options.lines();
        }
        if args.strict_bold {
            options = options.strict_bold();
        }
        options
    }
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn parse_options(lenient: bool) -> ParseOptions {
    if lenient {
        ParseOptions::new().lenient()
    } else {
        ParseOptions::new()
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            input,
            output,
            models,
            sequential,
            compact,
            lenient,
            encoder,
        } => {
            let mut options = BatchOptions::new()
                .with_format(json_format(compact))
                .with_extract(ExtractOptions::new().with_encoder((&encoder).into()));
            if sequential {
                options = options.sequential();
            }
            options = options.with_parse(parse_options(lenient));
            cmd_run(&input, &output, &models.models, &options)
        }
        Commands::File {
            input,
            output,
            models,
            compact,
            lenient,
            encoder,
        } => cmd_file(
            &input,
            output.as_deref(),
            &models.models,
            json_format(compact),
            parse_options(lenient),
            (&encoder).into(),
        ),
        Commands::Features {
            input,
            output,
            encoder,
        } => cmd_features(&input, output.as_deref(), (&encoder).into()),
        Commands::Validate { dir } => cmd_validate(&dir),
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

fn load_models(dir: &Path) -> CliResult<Models> {
    log::debug!("Loading models from {}", dir.display());
    Ok(Models::load(dir)?)
}

fn cmd_run(input: &Path, output: &Path, models_dir: &Path, options: &BatchOptions) -> CliResult<()> {
    // Models are loaded before any document is touched.
    let models = load_models(models_dir)?;
    let source = options.span_source();

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let (tx, rx) = crossbeam_channel::unbounded();
    let summary = thread::scope(|s| {
        let models = &models;
        let source = &source;
        let worker = s.spawn(move || {
            process_directory_with_events(input, output, models, source, options, &tx)
        });

        for event in rx.iter() {
            match event {
                BatchEvent::Started { total } => pb.set_length(total as u64),
                BatchEvent::Completed { path, .. } => {
                    pb.set_message(file_name(&path));
                    pb.inc(1);
                }
                BatchEvent::Failed { path, reason } => {
                    pb.println(format!("{} {}: {}", "✗".red(), file_name(&path), reason));
                    pb.inc(1);
                }
            }
        }

        worker.join()
    })
    .map_err(|_| "batch worker panicked")??;

    pb.finish_with_message("Done!");

    println!();
    println!("{}", "Batch Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Documents".bold(), summary.total);
    println!("{}: {}", "Succeeded".bold(), summary.succeeded.to_string().green());
    if summary.is_success() {
        println!("{}: {}", "Failed".bold(), summary.failed());
    } else {
        println!("{}: {}", "Failed".bold(), summary.failed().to_string().red());
        for failure in &summary.failures {
            println!(
                "  {} {}: {}",
                "└─".dimmed(),
                file_name(&failure.path),
                failure.reason
            );
        }
    }
    println!("{}: {}", "Output".bold(), output.display());

    Ok(())
}

fn cmd_file(
    input: &Path,
    output: Option<&Path>,
    models_dir: &Path,
    format: JsonFormat,
    parse: ParseOptions,
    encoder: EncoderOptions,
) -> CliResult<()> {
    let models = load_models(models_dir)?;
    let doc = PdfSpanSource::with_options(parse).load(input)?;
    let result = extract_outline(&doc, &models, &ExtractOptions::new().with_encoder(encoder))?;
    let json = render::to_json(&result, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_features(input: &Path, output: Option<&Path>, encoder: EncoderOptions) -> CliResult<()> {
    let doc = PdfSpanSource::new().load(input)?;
    let units = FeatureEncoder::new(encoder).encode_document(&doc)?;

    let writer: Box<dyn Write> = if let Some(path) = output {
        Box::new(fs::File::create(path)?)
    } else {
        Box::new(io::stdout())
    };
    let mut rows = csv::WriterBuilder::new().from_writer(writer);

    rows.write_record(["text", "avg_size", "is_bold", "x_indentation", "page_num"])?;
    for unit in &units {
        let f = &unit.features;
        rows.write_record([
            unit.text.clone(),
            f.avg_size.to_string(),
            f.is_bold.to_string(),
            f.x_indentation.to_string(),
            f.page_num.to_string(),
        ])?;
    }
    rows.flush()?;

    if let Some(path) = output {
        println!(
            "{} {} rows to {}",
            "Wrote".green(),
            units.len(),
            path.display()
        );
    }

    Ok(())
}

fn cmd_validate(dir: &Path) -> CliResult<()> {
    let reports = render::validate_dir(dir)?;
    if reports.is_empty() {
        return Err(format!("No JSON files found in {}", dir.display()).into());
    }

    for report in &reports {
        print_report(report);
    }

    let total: usize = reports.iter().map(|r| r.errors.len()).sum();
    println!("\nValidation complete: {} total error(s)", total);
    if total > 0 {
        return Err(format!("{} file(s) failed validation", count_invalid(&reports)).into());
    }

    Ok(())
}

fn count_invalid(reports: &[ValidationReport]) -> usize {
    reports.iter().filter(|r| !r.is_valid()).count()
}

fn print_report(report: &ValidationReport) {
    println!("Validating {}...", file_name(&report.path));
    if report.is_valid() {
        println!("  {} Valid format", "✓".green());
        let title = match report.title.as_deref() {
            None | Some("") => "[Empty]".to_string(),
            Some(t) => truncate(t, 50),
        };
        println!("    Title: {}", title);
        println!("    Outline items: {}", report.outline_count);
    } else {
        println!(
            "  {} {} validation error(s):",
            "✗".red(),
            report.errors.len()
        );
        for error in &report.errors {
            println!("    - {}", error);
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn cmd_version() {
    println!("{} {}", "pdf-outline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF title and heading outline extraction tool");
    println!();
    println!("License: MIT");
}
