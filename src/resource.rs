//! ResourceArc Wrappers
//!
//! Persistent import jobs, fed one document per call from the BEAM.

use rustler::ResourceArc;
use std::sync::Mutex;

use crate::projection::{ImportError, ImportJob, ImportOptions, ImportResult, Projection};

/// Import job that can be stored in a ResourceArc
///
/// `None` once the job has been finished.
pub struct ImportJobResource {
    pub job: Mutex<Option<ImportJob>>,
}

impl ImportJobResource {
    pub fn new(options: ImportOptions) -> Self {
        ImportJobResource {
            job: Mutex::new(Some(ImportJob::new(options))),
        }
    }

    /// Run `f` against the live job
    ///
    /// # Errors
    ///
    /// `"mutex_poisoned"` if the job mutex is poisoned, the job-finished
    /// message if `finish` already ran, or the error `f` returns.
    pub fn with_job<F, R>(&self, f: F) -> Result<R, String>
    where
        F: FnOnce(&mut ImportJob) -> ImportResult<R>,
    {
        let mut guard = self.job.lock().map_err(|_| "mutex_poisoned".to_string())?;
        let job = guard.as_mut().ok_or_else(|| ImportError::JobFinished.to_string())?;
        f(job).map_err(|e| e.to_string())
    }

    /// Take the job out and materialize it; later calls fail
    pub fn finish(&self) -> Result<Projection, String> {
        let mut guard = self.job.lock().map_err(|_| "mutex_poisoned".to_string())?;
        let job = guard.take().ok_or_else(|| ImportError::JobFinished.to_string())?;
        Ok(job.finish())
    }
}

#[rustler::resource_impl]
impl rustler::Resource for ImportJobResource {}

/// Type alias for the ResourceArc
pub type ImportJobRef = ResourceArc<ImportJobResource>;
