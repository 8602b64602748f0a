use std::path::{Path, PathBuf};

use log::debug;
use rayon::prelude::*;

use crate::{
    analysis::report::{analyze_file, FindingRecord},
    Result,
};

/// Options of a batch [`scan`].
#[derive(Clone, Debug, Default)]
pub struct ScanOptions {
    /// Analyze files on the `rayon` thread pool.
    ///
    /// The report and the order of callbacks are the same as for a sequential scan.
    pub parallel: bool,
}

/// The outcome of analyzing one input file.
#[derive(Debug)]
pub struct FileReport {
    /// The input path
    pub path: PathBuf,
    /// The findings, or the error that stopped the analysis of this file
    pub outcome: Result<Vec<FindingRecord>>,
}

impl FileReport {
    fn analyze(path: &Path) -> FileReport {
        let outcome = analyze_file(path);
        if let Err(error) = &outcome {
            debug!("{}: {}", path.display(), error);
        }

        FileReport {
            path: path.to_path_buf(),
            outcome,
        }
    }
}

/// The outcome of a batch scan, one [`FileReport`] per input path, in input order.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Per-file outcomes
    pub files: Vec<FileReport>,
}

impl ScanReport {
    /// All findings, grouped by file in input order, each group in row order.
    pub fn findings(&self) -> impl Iterator<Item = &FindingRecord> {
        self.files
            .iter()
            .filter_map(|file| file.outcome.as_ref().ok())
            .flatten()
    }

    /// Total number of findings.
    #[must_use]
    pub fn finding_count(&self) -> usize {
        self.findings().count()
    }

    /// The files whose analysis failed.
    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|file| file.outcome.is_err())
    }
}

/// Analyzes every path and calls `on_file` once per path, in input order.
///
/// A file that fails to analyze does not stop the scan, its error is kept in its
/// [`FileReport`].
pub fn scan<F>(paths: &[PathBuf], options: &ScanOptions, mut on_file: F) -> ScanReport
where
    F: FnMut(&FileReport),
{
    let files: Vec<FileReport> = if options.parallel {
        paths
            .par_iter()
            .map(|path| FileReport::analyze(path))
            .collect()
    } else {
        paths
            .iter()
            .map(|path| {
                let report = FileReport::analyze(path);
                on_file(&report);
                report
            })
            .collect()
    };

    if options.parallel {
        files.iter().for_each(&mut on_file);
    }

    debug!(
        "Scanned {} files, {} failed",
        files.len(),
        files.iter().filter(|file| file.outcome.is_err()).count()
    );

    ScanReport { files }
}
