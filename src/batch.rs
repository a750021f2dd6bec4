//! Batch conversion of report folders.
//!
//! Finds the PDFs to convert, skips outputs that already exist, and writes
//! one `<stem>.json` per input at the chosen pipeline stage.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::model::HashAlgorithm;
use crate::render::{write_json, JsonFormat};
use crate::Pipeline;

/// File stems reserved for files the output folder already uses.
pub const RESERVED_STEMS: &[&str] = &[
    "index", "config", "db", "log", "error", "temp", "backup", "label", "labels", "json",
];

/// Whether a path's file stem is reserved (case-insensitive).
pub fn is_reserved_name(path: &Path) -> bool {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_lowercase())
        .is_some_and(|stem| RESERVED_STEMS.contains(&stem.as_str()))
}

/// Reject a single input file with a reserved name.
pub fn check_name(path: &Path) -> Result<()> {
    if is_reserved_name(path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        return Err(Error::ReservedName(name));
    }
    Ok(())
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Collect the PDFs to convert.
///
/// A file input is returned alone (it must be a PDF with an allowed name).
/// Otherwise PDFs directly inside `base_dir` (when it differs from `input`)
/// come first, then PDFs of the `input` directory, optionally recursive,
/// without duplicates. A missing input directory is created and yields
/// nothing. Files with reserved names are skipped with an error log.
pub fn detect_files(base_dir: &Path, input: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        if !is_pdf(input) {
            return Err(Error::UnknownFormat);
        }
        check_name(input)?;
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    let mut seen = HashSet::new();

    if base_dir.is_dir() && base_dir != input {
        log::info!("looking for PDF files in base directory {}", base_dir.display());
        for path in list_pdfs(base_dir, false)? {
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    if input.is_dir() {
        log::info!("looking for PDF files in {}", input.display());
        for path in list_pdfs(input, recursive)? {
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    } else if !input.exists() {
        log::warn!("{} does not exist, creating it", input.display());
        fs::create_dir_all(input)?;
    }

    log::info!("found {} PDF files", files.len());
    Ok(files)
}

/// PDFs in a directory, sorted by path, reserved names removed.
///
/// Entries that cannot be read (including symlink loops) are logged and
/// skipped.
fn list_pdfs(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let base = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = if recursive {
        format!("{}/**/*.pdf", base)
    } else {
        format!("{}/*.pdf", base)
    };
    let options = glob::MatchOptions {
        case_sensitive: false,
        ..glob::MatchOptions::new()
    };

    let matches = glob::glob_with(&pattern, options)
        .map_err(|e| Error::Other(format!("invalid search pattern {}: {}", pattern, e)))?;

    let mut candidates = Vec::new();
    for entry in matches {
        match entry {
            Ok(path) if path.is_file() => candidates.push(path),
            Ok(_) => {}
            Err(e) => log::warn!("cannot read {}: {}", e.path().display(), e.error()),
        }
    }
    // A symlinked directory can reach the same file under many paths; the
    // shallowest one is kept.
    candidates.sort_by_key(|path| (path.components().count(), path.clone()));

    let mut found = Vec::new();
    let mut seen = HashSet::new();
    for path in candidates {
        let canonical = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if !seen.insert(canonical) {
            continue;
        }
        if is_reserved_name(&path) {
            log::error!(
                "skipping '{}': the file name is reserved, rename it to convert",
                path.display()
            );
            continue;
        }
        found.push(path);
    }

    found.sort();
    Ok(found)
}

/// Pipeline stage written for each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStage {
    /// Metadata plus merged blocks
    #[default]
    Raw,
    /// Organized sections
    Organized,
    /// Compact summary
    Summary,
}

/// Options for batch conversion.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory receiving `<stem>.json` files
    pub output_dir: PathBuf,

    /// Replace existing outputs instead of skipping them
    pub overwrite: bool,

    /// Convert at most this many files
    pub limit: Option<usize>,

    /// Stage written per file
    pub stage: OutputStage,

    /// Convert files in parallel
    pub parallel: bool,

    /// Digest written as `file_hash`
    pub hash: HashAlgorithm,

    /// JSON layout of outputs
    pub format: JsonFormat,
}

impl BatchOptions {
    /// Create batch options writing to `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            overwrite: false,
            limit: None,
            stage: OutputStage::default(),
            parallel: true,
            hash: HashAlgorithm::Sha256,
            format: JsonFormat::Pretty,
        }
    }

    /// Replace existing outputs.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Limit the number of converted files.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Set the output stage.
    pub fn with_stage(mut self, stage: OutputStage) -> Self {
        self.stage = stage;
        self
    }

    /// Enable or disable parallel conversion.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the hash algorithm.
    pub fn with_hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }

    /// Set the JSON layout.
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }
}

/// Outcome for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    /// Output written
    Converted,
    /// Output already existed
    Skipped,
    /// Conversion failed with this message
    Failed(String),
}

/// Outcomes of a batch run, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub results: Vec<(PathBuf, BatchStatus)>,
}

impl BatchReport {
    /// Number of processed files.
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Number of converted files.
    pub fn converted(&self) -> usize {
        self.count(|s| matches!(s, BatchStatus::Converted))
    }

    /// Number of skipped files.
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, BatchStatus::Skipped))
    }

    /// Number of failed files.
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, BatchStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&BatchStatus) -> bool) -> usize {
        self.results.iter().filter(|(_, s)| pred(s)).count()
    }
}

/// Converts many PDFs with one pipeline.
pub struct BatchConverter {
    pipeline: Pipeline,
    options: BatchOptions,
}

impl BatchConverter {
    /// Create a converter. The batch hash algorithm replaces the pipeline's.
    pub fn new(pipeline: Pipeline, options: BatchOptions) -> Self {
        let pipeline = pipeline.with_hash_algorithm(options.hash);
        Self { pipeline, options }
    }

    /// Output path of a PDF.
    pub fn output_path(&self, pdf: &Path) -> PathBuf {
        let stem = pdf
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        self.options.output_dir.join(format!("{}.json", stem))
    }

    /// Convert one file. `base_dir` makes the recorded `file_path` relative.
    pub fn convert_file(&self, pdf: &Path, base_dir: Option<&Path>) -> Result<BatchStatus> {
        let output = self.output_path(pdf);
        if output.exists() && !self.options.overwrite {
            log::info!(
                "skipping {}: {} already exists",
                pdf.display(),
                output.display()
            );
            return Ok(BatchStatus::Skipped);
        }

        log::info!("processing {}", pdf.display());
        let data = fs::read(pdf)?;
        let filename = pdf
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut raw = self.pipeline.extract(&data, &filename)?;
        let relative = base_dir
            .and_then(|base| pdf.strip_prefix(base).ok())
            .unwrap_or(pdf);
        raw.metadata = raw.metadata.with_file_path(relative.to_string_lossy());

        let format = self.options.format;
        match self.options.stage {
            OutputStage::Raw => write_json(&raw, &output, format)?,
            OutputStage::Organized => {
                write_json(&self.pipeline.organize(raw.blocks()), &output, format)?
            }
            OutputStage::Summary => {
                let organized = self.pipeline.organize(raw.blocks());
                write_json(&self.pipeline.summarize(&organized), &output, format)?
            }
        }

        log::info!("saved {}", output.display());
        Ok(BatchStatus::Converted)
    }

    /// Reason each file cannot be converted because an earlier file in
    /// `files` writes the same output, or `None`.
    fn output_conflicts(&self, files: &[PathBuf]) -> Vec<Option<String>> {
        let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
        files
            .iter()
            .map(|pdf| match claimed.entry(self.output_path(pdf)) {
                Entry::Occupied(first) => Some(format!(
                    "{} is already written for {}",
                    first.key().display(),
                    first.get().display()
                )),
                Entry::Vacant(slot) => {
                    slot.insert(pdf);
                    None
                }
            })
            .collect()
    }

    /// Convert files, calling `progress` after each one.
    ///
    /// Individual failures are logged and reported, never propagated. When
    /// two files share an output name only the first is converted; the
    /// later one fails.
    pub fn convert_all<F>(&self, files: &[PathBuf], base_dir: Option<&Path>, progress: F) -> BatchReport
    where
        F: Fn(&Path, &BatchStatus) + Sync,
    {
        let files = match self.options.limit {
            Some(limit) => &files[..limit.min(files.len())],
            None => files,
        };

        let conflicts = self.output_conflicts(files);

        let run = |(pdf, conflict): (&PathBuf, &Option<String>)| {
            let status = match conflict {
                Some(reason) => {
                    log::error!("not converting {}: {}", pdf.display(), reason);
                    BatchStatus::Failed(reason.clone())
                }
                None => self.convert_file(pdf, base_dir).unwrap_or_else(|e| {
                    log::error!("failed to process {}: {}", pdf.display(), e);
                    BatchStatus::Failed(e.to_string())
                }),
            };
            progress(pdf, &status);
            (pdf.clone(), status)
        };

        let results: Vec<_> = if self.options.parallel {
            files.par_iter().zip(conflicts.par_iter()).map(run).collect()
        } else {
            files.iter().zip(conflicts.iter()).map(run).collect()
        };

        let report = BatchReport { results };
        log::info!(
            "converted {} of {} files, failed {}, skipped {}",
            report.converted(),
            report.total(),
            report.failed(),
            report.skipped()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_names() {
        assert!(is_reserved_name(Path::new("in/INDEX.pdf")));
        assert!(is_reserved_name(Path::new("labels.PDF")));
        assert!(!is_reserved_name(Path::new("wo-1234.pdf")));
        assert!(!is_reserved_name(Path::new("indexes.pdf")));

        let err = check_name(Path::new("db.pdf")).unwrap_err();
        assert!(matches!(err, Error::ReservedName(ref n) if n == "db.pdf"));
    }

    #[test]
    fn test_report_counts() {
        let report = BatchReport {
            results: vec![
                (PathBuf::from("a.pdf"), BatchStatus::Converted),
                (PathBuf::from("b.pdf"), BatchStatus::Skipped),
                (PathBuf::from("c.pdf"), BatchStatus::Failed("bad".to_string())),
                (PathBuf::from("d.pdf"), BatchStatus::Converted),
            ],
        };
        assert_eq!(report.total(), 4);
        assert_eq!(report.converted(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn test_output_path_uses_stem() {
        let converter = BatchConverter::new(Pipeline::new(), BatchOptions::new("out"));
        assert_eq!(
            converter.output_path(Path::new("in/sub/wo-7.pdf")),
            PathBuf::from("out/wo-7.json")
        );
    }

    #[test]
    fn test_output_conflicts_keep_first_file() {
        let converter = BatchConverter::new(Pipeline::new(), BatchOptions::new("out"));
        let files = vec![
            PathBuf::from("in/x/report.pdf"),
            PathBuf::from("in/wo-2.pdf"),
            PathBuf::from("in/y/report.pdf"),
        ];
        let conflicts = converter.output_conflicts(&files);
        assert!(conflicts[0].is_none());
        assert!(conflicts[1].is_none());
        let reason = conflicts[2].as_deref().unwrap();
        assert!(reason.contains("report.json"));
        assert!(reason.contains("x"));
    }

    #[test]
    fn test_batch_options_builder() {
        let options = BatchOptions::new("out")
            .with_overwrite(true)
            .with_limit(Some(3))
            .with_stage(OutputStage::Summary)
            .with_parallel(false)
            .with_hash(HashAlgorithm::Md5);
        assert!(options.overwrite);
        assert_eq!(options.limit, Some(3));
        assert_eq!(options.stage, OutputStage::Summary);
        assert!(!options.parallel);
        assert_eq!(options.hash, HashAlgorithm::Md5);
    }
}
