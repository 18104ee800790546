//! Label rendering.
//!
//! The print core only knows the [`LabelRenderer`] trait. What happens on
//! the other side (an HTML sheet on disk, a browser print dialog, a
//! thermal printer) is up to the implementation.

mod html;

pub use html::*;

use thiserror::Error;

use crate::models::{BasketEntry, PatientSnapshot};
use crate::session::PrintQuantity;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// IO error while writing output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The output surface could not be opened
    #[error("Render surface unavailable: {0}")]
    Unavailable(String),

    /// The job can not be rendered
    #[error("Invalid label job: {0}")]
    InvalidJob(String),
}

/// Result type for renderer operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Everything needed to produce the labels of one print action.
#[derive(Debug, Clone, Copy)]
pub struct LabelJob<'a> {
    pub print_session_id: &'a str,
    pub patient: &'a PatientSnapshot,
    pub entries: &'a [BasketEntry],
    pub print_quantity: PrintQuantity,
}

impl LabelJob<'_> {
    /// Physical labels this job produces.
    pub fn label_count(&self) -> usize {
        self.entries.len() * self.print_quantity.get() as usize
    }
}

/// Produces label output for a print job.
///
/// Called exactly once per successful print action. Returning `Ok` means
/// the request was issued; it does not confirm paper came out.
pub trait LabelRenderer {
    fn render(&mut self, job: &LabelJob<'_>) -> RenderResult<()>;
}

impl<R: LabelRenderer + ?Sized> LabelRenderer for &mut R {
    fn render(&mut self, job: &LabelJob<'_>) -> RenderResult<()> {
        (**self).render(job)
    }
}
