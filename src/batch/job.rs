use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use crate::{
    assets::source::ImageSource,
    batch::run::{BatchOpts, CombinationResult, run_batch},
    foundation::error::{OverlayError, OverlayResult},
    layout::variant::LayoutVariant,
    package::archive::{write_archive, write_pngs_to_dir},
};

/// A complete combine job: inputs, layout, threading and where to put the output.
///
/// Relative paths are resolved against the directory of the JSON file by [`JobSpec::from_path`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobSpec {
    /// Base product photos, in order.
    pub bases: Vec<PathBuf>,
    /// Fabric swatches, in order.
    pub fabrics: Vec<PathBuf>,
    /// Layout used for every composite.
    #[serde(default)]
    pub variant: LayoutVariant,
    /// Directory receiving one PNG per composite.
    #[serde(default)]
    pub out_dir: Option<PathBuf>,
    /// Zip archive receiving every composite.
    #[serde(default)]
    pub archive: Option<PathBuf>,
    /// Threading controls.
    #[serde(default)]
    pub batch: BatchOpts,
}

impl JobSpec {
    /// Parse a job from JSON and resolve relative paths against the file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> OverlayResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            OverlayError::validation(format!("open job JSON '{}': {e}", path.display()))
        })?;
        let job: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            OverlayError::validation(format!("parse job JSON '{}': {e}", path.display()))
        })?;
        let root = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(job.resolve_relative_to(root))
    }

    /// Parse a job from a JSON string. Paths are kept as written.
    pub fn from_json_str(s: &str) -> OverlayResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| OverlayError::validation(format!("parse job JSON: {e}")))
    }

    /// Rewrite every relative path so it is rooted at `root`.
    pub fn resolve_relative_to(mut self, root: &Path) -> Self {
        let rebase = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = root.join(&*p);
            }
        };
        self.bases.iter_mut().for_each(rebase);
        self.fabrics.iter_mut().for_each(rebase);
        if let Some(p) = self.out_dir.as_mut() {
            rebase(p);
        }
        if let Some(p) = self.archive.as_mut() {
            rebase(p);
        }
        self
    }

    /// Check that the job has somewhere to write and valid threading options.
    pub fn validate(&self) -> OverlayResult<()> {
        if self.out_dir.is_none() && self.archive.is_none() {
            return Err(OverlayError::validation(
                "job needs an output directory, an archive path, or both",
            ));
        }
        self.batch.validate()
    }

    /// Image sources for the bases and fabrics, named after their file stems.
    pub fn sources(&self) -> (Vec<ImageSource>, Vec<ImageSource>) {
        let to_sources = |paths: &[PathBuf]| -> Vec<ImageSource> {
            paths.iter().cloned().map(ImageSource::from_path).collect()
        };
        (to_sources(&self.bases), to_sources(&self.fabrics))
    }
}

/// What a finished job produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JobReport {
    /// Number of composites rendered.
    pub rendered: usize,
    /// PNG files written to the output directory.
    pub png_paths: Vec<PathBuf>,
    /// Archive written, if one was requested.
    pub archive_path: Option<PathBuf>,
}

/// Validate, render and write out a whole job.
pub fn run_job(job: &JobSpec) -> OverlayResult<JobReport> {
    job.validate()?;
    let (bases, fabrics) = job.sources();
    let results = run_batch(&bases, &fabrics, job.variant, &job.batch)?;
    write_job_outputs(job, &results)
}

/// The archive goes first; if the PNG directory then fails, the error names the archive that was
/// already written.
fn write_job_outputs(job: &JobSpec, results: &[CombinationResult]) -> OverlayResult<JobReport> {
    let mut report = JobReport {
        rendered: results.len(),
        ..JobReport::default()
    };
    if let Some(path) = &job.archive {
        write_archive(results, path)?;
        report.archive_path = Some(path.clone());
    }
    if let Some(dir) = &job.out_dir {
        report.png_paths = write_pngs_to_dir(results, dir).map_err(|e| match &report.archive_path {
            Some(archive) => OverlayError::packaging(format!(
                "{e} (archive '{}' was already written)",
                archive.display()
            )),
            None => e,
        })?;
    }
    Ok(report)
}

#[cfg(test)]
#[path = "../../tests/unit/batch/job.rs"]
mod tests;
