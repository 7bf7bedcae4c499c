//! Pipeline artifact: loading and the probability-prediction contract.

pub mod artifact;

pub use artifact::{GbdtArtifact, ModelMetadata, ARTIFACT_FORMAT_VERSION};

use crate::error::CoreError;
use crate::schema::{ExpectedSchema, ReconciledRow};

/// Probability-prediction contract of the trained artifact.
///
/// The artifact is opaque beyond this interface: a batch of reconciled rows
/// in, one two-class probability vector per row out, with the positive class
/// ("ATRASO") at index 1.
pub trait Pipeline: Send + Sync {
    /// Column schema the artifact expects its input to conform to.
    fn schema(&self) -> &ExpectedSchema;

    /// Class probabilities for a batch of reconciled rows, aligned with the
    /// input order.
    fn predict_proba(&self, rows: &[ReconciledRow]) -> Result<Vec<[f64; 2]>, CoreError>;
}
