//! wrextract CLI - work-order report conversion tool

mod logging;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use wrextract::batch::detect_files;
use wrextract::parser::{LopdfBackend, PdfBackend};
use wrextract::render::{from_json, to_json};
use wrextract::{
    BatchConverter, BatchOptions, BatchStatus, HashAlgorithm, JsonFormat, OrganizeOptions,
    OutputStage, Pipeline, Profile, RawDocument,
};

#[derive(Parser)]
#[command(name = "wrextract")]
#[command(version)]
#[command(about = "Convert work-order report PDFs to structured JSON", long_about = None)]
struct Cli {
    /// Layout profile used to organize sections
    #[arg(long, value_enum, global = true, default_value = "auto")]
    profile: ProfileArg,

    /// Output compact JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract merged text blocks with file metadata
    Raw {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Organize a report into configuration and flexibility points
    Organize {
        /// Input PDF file or raw JSON written by `raw`
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Summarize a report
    Summarize {
        /// Input PDF file or raw JSON written by `raw`
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Convert a folder of reports
    Batch {
        /// A PDF file, or a directory (base directory unless --base-dir is
        /// set, input directory otherwise)
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        /// Base dataset directory
        #[arg(short = 'd', long, value_name = "DIR")]
        base_dir: Option<PathBuf>,

        /// Input PDF file or directory (default: <base-dir>/pdf)
        #[arg(short, long, value_name = "PATH")]
        input: Option<PathBuf>,

        /// Output directory (default: <base-dir>/converted)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Log directory (default: <base-dir>/log)
        #[arg(long, value_name = "DIR")]
        log_dir: Option<PathBuf>,

        /// Search input directories recursively
        #[arg(short, long)]
        recursive: bool,

        /// Convert at most this many files
        #[arg(short, long)]
        limit: Option<usize>,

        /// Replace existing JSON files
        #[arg(long)]
        overwrite: bool,

        /// Stage written per file
        #[arg(long, value_enum, default_value = "raw")]
        stage: StageArg,

        /// Write SHA-256 instead of MD5 file hashes
        #[arg(long)]
        sha256: bool,

        /// Convert one file at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Show report information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ProfileArg {
    /// Indented headers, side-by-side fields
    Indented,
    /// Font-tagged headers, stacked fields
    FontTagged,
    /// Try both, keep the first that finds state sections
    Auto,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum StageArg {
    /// Metadata and merged blocks
    Raw,
    /// Organized sections
    Organized,
    /// Compact summary
    Summary,
}

impl From<StageArg> for OutputStage {
    fn from(stage: StageArg) -> Self {
        match stage {
            StageArg::Raw => OutputStage::Raw,
            StageArg::Organized => OutputStage::Organized,
            StageArg::Summary => OutputStage::Summary,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_dir = match &cli.command {
        Commands::Batch {
            path,
            base_dir,
            log_dir,
            ..
        } => Some(log_dir.clone().unwrap_or_else(|| {
            resolve_base_dir(path.as_deref(), base_dir.as_deref()).join("log")
        })),
        _ => None,
    };
    match logging::init(log_dir.as_deref()) {
        Ok(Some(path)) => log::info!("logging to {}", path.display()),
        Ok(None) => {}
        Err(e) => eprintln!("{}: cannot open log file: {}", "Warning".yellow(), e),
    }

    let pipeline = build_pipeline(cli.profile);
    let format = if cli.compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let result = match cli.command {
        Commands::Raw { input, output } => cmd_raw(&pipeline, &input, output.as_deref(), format),
        Commands::Organize { input, output } => {
            cmd_organize(&pipeline, &input, output.as_deref(), format)
        }
        Commands::Summarize { input, output } => {
            cmd_summarize(&pipeline, &input, output.as_deref(), format)
        }
        Commands::Batch {
            path,
            base_dir,
            input,
            output,
            log_dir: _,
            recursive,
            limit,
            overwrite,
            stage,
            sha256,
            sequential,
        } => {
            let hash = if sha256 {
                HashAlgorithm::Sha256
            } else {
                HashAlgorithm::Md5
            };
            let options = BatchArgs {
                path,
                base_dir,
                input,
                output,
                recursive,
                limit,
                overwrite,
                stage: stage.into(),
                hash,
                parallel: !sequential,
                format,
            };
            cmd_batch(pipeline, options)
        }
        Commands::Info { input } => cmd_info(&pipeline, &input),
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

fn build_pipeline(profile: ProfileArg) -> Pipeline {
    let pipeline = Pipeline::new().lenient();
    match profile {
        ProfileArg::Indented => pipeline.with_profile(Profile::indented()),
        ProfileArg::FontTagged => pipeline.with_profile(Profile::font_tagged()),
        ProfileArg::Auto => pipeline.with_organize_options(OrganizeOptions::default()),
    }
}

/// Load a raw document from a PDF, or from raw JSON written earlier.
fn load_raw(pipeline: &Pipeline, input: &Path) -> Result<RawDocument, Box<dyn std::error::Error>> {
    let is_json = input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        let json = fs::read_to_string(input)?;
        return Ok(from_json(&json)?);
    }

    let data = fs::read(input)?;
    let filename = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(pipeline.extract(&data, &filename)?)
}

fn emit(json: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }
    Ok(())
}

fn cmd_raw(
    pipeline: &Pipeline,
    input: &Path,
    output: Option<&Path>,
    format: JsonFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = load_raw(pipeline, input)?;
    emit(&to_json(&raw, format)?, output)
}

fn cmd_organize(
    pipeline: &Pipeline,
    input: &Path,
    output: Option<&Path>,
    format: JsonFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = load_raw(pipeline, input)?;
    let organized = pipeline.organize(raw.blocks());
    if organized.is_empty() {
        eprintln!(
            "{} no template anchors found in {}",
            "Warning:".yellow(),
            input.display()
        );
    }
    emit(&to_json(&organized, format)?, output)
}

fn cmd_summarize(
    pipeline: &Pipeline,
    input: &Path,
    output: Option<&Path>,
    format: JsonFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = load_raw(pipeline, input)?;
    let summary = pipeline.summarize(&pipeline.organize(raw.blocks()));
    emit(&to_json(&summary, format)?, output)
}

struct BatchArgs {
    path: Option<PathBuf>,
    base_dir: Option<PathBuf>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    recursive: bool,
    limit: Option<usize>,
    overwrite: bool,
    stage: OutputStage,
    hash: HashAlgorithm,
    parallel: bool,
    format: JsonFormat,
}

/// Base directory: `--base-dir`, else a directory PATH, else `dataset`.
fn resolve_base_dir(path: Option<&Path>, base_dir: Option<&Path>) -> PathBuf {
    match (base_dir, path) {
        (Some(base), _) => base.to_path_buf(),
        (None, Some(path)) if path.is_dir() => path.to_path_buf(),
        _ => PathBuf::from("dataset"),
    }
}

fn cmd_batch(pipeline: Pipeline, args: BatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let base_dir = resolve_base_dir(args.path.as_deref(), args.base_dir.as_deref());

    // PATH is the input when it is a file, or a directory next to --base-dir.
    let input = match (&args.input, &args.path) {
        (Some(input), _) => input.clone(),
        (None, Some(path)) if path.is_file() || args.base_dir.is_some() => path.clone(),
        _ => base_dir.join("pdf"),
    };
    let output_dir = args.output.unwrap_or_else(|| base_dir.join("converted"));

    log::info!("base directory: {}", base_dir.display());
    log::info!("input path: {}", input.display());
    log::info!("output directory: {}", output_dir.display());
    log::info!("overwrite existing files: {}", args.overwrite);

    let files = detect_files(&base_dir, &input, args.recursive)?;
    if files.is_empty() {
        println!("{}", "No PDF files found to process".yellow());
        return Ok(());
    }

    let options = BatchOptions::new(&output_dir)
        .with_overwrite(args.overwrite)
        .with_limit(args.limit)
        .with_stage(args.stage)
        .with_parallel(args.parallel)
        .with_hash(args.hash)
        .with_format(args.format);
    let converter = BatchConverter::new(pipeline, options);

    let total = args.limit.map_or(files.len(), |l| l.min(files.len()));
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let report = converter.convert_all(&files, Some(&base_dir), |path, status| {
        if let BatchStatus::Failed(message) = status {
            pb.println(format!("{} {}: {}", "Failed".red(), path.display(), message));
        }
        pb.set_message(
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        );
        pb.inc(1);
    });
    pb.finish_with_message("Done!");

    println!("\n{}", "Batch summary:".green().bold());
    println!("  {} converted: {}", "├─".dimmed(), report.converted());
    println!("  {} skipped:   {}", "├─".dimmed(), report.skipped());
    println!("  {} failed:    {}", "└─".dimmed(), report.failed());
    if report.converted() > 0 {
        println!("{} {}", "Output saved to".green(), output_dir.display());
    }

    Ok(())
}

fn cmd_info(pipeline: &Pipeline, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let header = wrextract::sniff_header(&data)?;
    let backend = LopdfBackend::load_bytes(&data)?;

    println!("{}", "Report Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), header);
    println!("{}: {}", "Pages".bold(), backend.page_count());

    let mut fonts: Vec<String> = Vec::new();
    for (_, page_id) in backend.pages() {
        for font in backend.page_fonts(page_id)? {
            let label = format!("{} ({})", font.name, font.base_font);
            if !fonts.contains(&label) {
                fonts.push(label);
            }
        }
    }
    println!("{}: {}", "Fonts".bold(), fonts.join(", "));

    let fragments = pipeline.extract_fragments(&data)?;
    let blocks = pipeline.merge(&fragments);
    let organized = pipeline.organize(&blocks);

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Fragments".bold(), fragments.len());
    println!("{}: {}", "Blocks".bold(), blocks.len());
    println!(
        "{}: {}",
        "Service fields".bold(),
        organized.service_configurations.len()
    );
    println!(
        "{}: {}",
        "Flexibility points".bold(),
        organized.flexibility_points().len()
    );
    for (title, record) in organized.flexibility_points() {
        println!(
            "  {} {} ({} state sections)",
            "├─".dimmed(),
            title,
            record.state_sections.len()
        );
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "wrextract".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Work-order report conversion tool");
    println!();
    println!("License: MIT");
}
