use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::errors::{BgRemoveError, Result};
use crate::normalize::{file_name_for, Normalizer};
use crate::progress_tracker::ProgressTracker;
use crate::traits::BackgroundRemovalService;

/// Extensions accepted for upload, compared lowercased.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "avif"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Normalize,
    Upload,
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Normalize => "normalize",
            Self::Upload => "upload",
            Self::Persist => "persist",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnsupportedExtension(Option<String>),
}

#[derive(Debug)]
pub enum FileOutcome {
    Saved { normalized: PathBuf, output: PathBuf },
    Skipped(SkipReason),
    Failed { stage: Stage, error: BgRemoveError },
}

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

/// Per-file results of one run, in processing order.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub reports: Vec<FileReport>,
}

impl BatchSummary {
    pub fn saved(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Saved { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    /// One line per failed file, e.g. `b.png failed during upload: ...`.
    pub fn failure_lines(&self) -> Vec<String> {
        self.reports
            .iter()
            .filter_map(|r| match &r.outcome {
                FileOutcome::Failed { stage, error } => Some(format!(
                    "{} failed during {}: {}",
                    r.path.display(),
                    stage,
                    error
                )),
                _ => None,
            })
            .collect()
    }

    pub fn report_for(&self, file_name: &str) -> Option<&FileReport> {
        self.reports
            .iter()
            .find(|r| r.path.file_name().is_some_and(|n| n == file_name))
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }
}

pub fn is_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Normalizes every image in a directory and sends it through a
/// [`BackgroundRemovalService`], one file at a time.
///
/// A failing file never aborts the run: its outcome is logged, recorded in the
/// [`BatchSummary`] and the loop moves on.
pub struct BatchBackgroundRemover<S: BackgroundRemovalService> {
    service: S,
    config: Config,
}

impl<S: BackgroundRemovalService> BatchBackgroundRemover<S> {
    pub const fn new(service: S, config: Config) -> Self {
        Self { service, config }
    }

    pub fn run(&self) -> Result<BatchSummary> {
        let input_dir = &self.config.input_dir;
        let output_dir = self.config.output_dir();
        let temp_dir = self.config.temp_dir();

        if !input_dir.is_dir() {
            return Err(BgRemoveError::file_system(
                input_dir,
                "input directory check",
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "input directory does not exist",
                ),
            ));
        }

        fs::create_dir_all(&temp_dir)
            .map_err(|e| BgRemoveError::file_system(&temp_dir, "temp directory creation", e))?;
        fs::create_dir_all(&output_dir)
            .map_err(|e| BgRemoveError::file_system(&output_dir, "output directory creation", e))?;

        let files = self.collect_files(input_dir)?;
        let normalizer = Normalizer::new(&temp_dir, self.config.quality);
        let progress = ProgressTracker::new(files.len(), !self.config.no_progress);

        let mut summary = BatchSummary::default();
        for path in files {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            progress.start_file(&name);

            let outcome = self.process_file(&path, &name, &normalizer, &output_dir);
            summary.reports.push(FileReport { path, outcome });

            progress.finish_file();
        }
        progress.finish();

        info!(
            saved = summary.saved(),
            skipped = summary.skipped(),
            failed = summary.failed(),
            "Batch finished"
        );
        Ok(summary)
    }

    /// Regular files directly inside `input_dir`, sorted by name.
    ///
    /// Subdirectories are left out without a log line; the default temp and
    /// output directories live there.
    pub fn collect_files(&self, input_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(input_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(input_dir).to_path_buf();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                BgRemoveError::file_system(path, "directory listing", source)
            })?;

            if entry.path().is_file() {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    pub fn process_file(
        &self,
        path: &Path,
        name: &str,
        normalizer: &Normalizer,
        output_dir: &Path,
    ) -> FileOutcome {
        if !is_supported_extension(path) {
            info!("Skipping (unsupported ext): {}", name);
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase());
            return FileOutcome::Skipped(SkipReason::UnsupportedExtension(ext));
        }

        info!("Processing: {}", name);

        let base_name = path.file_stem().unwrap_or_default();

        let normalized = match normalizer.normalize(path, base_name) {
            Ok(jpeg) => {
                info!("   [OK] Converted to JPG → {}", jpeg.display());
                jpeg
            }
            Err(e) => {
                error!("   [ERROR] Failed to convert {} to JPG: {}", name, e);
                return FileOutcome::Failed {
                    stage: Stage::Normalize,
                    error: e,
                };
            }
        };

        let response = match self.service.remove_background(&normalized) {
            Ok(response) => response,
            Err(e) => {
                error!("   [ERROR] Request failed for {}: {}", name, e);
                return FileOutcome::Failed {
                    stage: Stage::Upload,
                    error: e,
                };
            }
        };

        if !response.is_success() {
            let body = response.body_text().into_owned();
            warn!("   [ERROR] {}: {}", response.status, body);
            return FileOutcome::Failed {
                stage: Stage::Upload,
                error: BgRemoveError::ServiceRejected {
                    status: response.status,
                    body,
                },
            };
        }

        let output = output_dir.join(file_name_for(base_name, "png"));
        if let Err(e) = fs::write(&output, &response.body) {
            error!("   [ERROR] Failed to write {}: {}", output.display(), e);
            return FileOutcome::Failed {
                stage: Stage::Persist,
                error: BgRemoveError::file_system(&output, "cutout write", e),
            };
        }

        debug!(bytes = response.body.len(), "cutout written");
        info!("   [OK] Saved → {}", output.display());
        FileOutcome::Saved { normalized, output }
    }
}
