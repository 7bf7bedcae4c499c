//! Serialized pipeline artifact.
//!
//! The training side exports a JSON envelope holding the fitted
//! preprocessing configuration (ordered numeric columns, ordered categorical
//! columns with their fitted category lists) and a gbdt-rs native model with
//! calibrated binary probabilities.
//!
//! Dense input layout fed to the model: numeric values in schema order, then
//! one one-hot block per categorical column in schema order. The layout is
//! part of the contract with the exporter; changing it requires re-exporting
//! the artifact. Unknown or empty category codes leave their block all
//! zeros.

use std::path::Path;

use chrono::{DateTime, Utc};
use gbdt::decision_tree::Data;
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};

use super::Pipeline;
use crate::error::CoreError;
use crate::schema::{ExpectedSchema, ReconciledRow};

/// Envelope version this build understands.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Fitted category list for one categorical column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub name: String,
    pub categories: Vec<String>,
}

/// On-disk envelope. `model` is the gbdt-rs native serialization.
#[derive(Deserialize)]
struct ArtifactFile {
    format_version: u32,
    #[serde(default)]
    trained_at: Option<DateTime<Utc>>,
    numeric_features: Vec<String>,
    categorical_features: Vec<CategoricalColumn>,
    model: GBDT,
}

/// Artifact metadata surfaced by the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ModelMetadata {
    pub path: String,
    pub trained_at: Option<DateTime<Utc>>,
    pub loaded_at: DateTime<Utc>,
    pub numeric_features: usize,
    pub categorical_features: usize,
    pub encoded_width: usize,
}

/// Loaded pipeline artifact: preprocessing configuration plus model.
/// Loaded once at startup and shared read-only afterwards.
pub struct GbdtArtifact {
    schema: ExpectedSchema,
    categorical: Vec<CategoricalColumn>,
    model: GBDT,
    metadata: ModelMetadata,
}

impl std::fmt::Debug for GbdtArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GbdtArtifact")
            .field("schema", &self.schema)
            .field("categorical", &self.categorical)
            .field("model", &"<GBDT>")
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl GbdtArtifact {
    /// Load the artifact from disk. Absence or a parse failure is an error
    /// carrying the path; the caller treats it as fatal at startup.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            return Err(CoreError::ArtifactMissing {
                path: path.to_path_buf(),
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|source| CoreError::ArtifactRead {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ArtifactFile =
            serde_json::from_str(&raw).map_err(|source| CoreError::ArtifactFormat {
                path: path.to_path_buf(),
                source,
            })?;

        if file.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(CoreError::ArtifactVersion {
                found: file.format_version,
                expected: ARTIFACT_FORMAT_VERSION,
            });
        }

        let artifact = Self::from_file(file, path.display().to_string());
        log::info!(
            "Pipeline artifact loaded from {} ({} numeric + {} categorical columns, encoded width {})",
            artifact.metadata.path,
            artifact.metadata.numeric_features,
            artifact.metadata.categorical_features,
            artifact.metadata.encoded_width,
        );
        Ok(artifact)
    }

    fn from_file(file: ArtifactFile, path: String) -> Self {
        let schema = ExpectedSchema::new(
            file.numeric_features,
            file.categorical_features
                .iter()
                .map(|column| column.name.clone())
                .collect(),
        );
        let encoded_width = schema.numeric().len()
            + file
                .categorical_features
                .iter()
                .map(|column| column.categories.len())
                .sum::<usize>();

        let metadata = ModelMetadata {
            path,
            trained_at: file.trained_at,
            loaded_at: Utc::now(),
            numeric_features: schema.numeric().len(),
            categorical_features: schema.categorical().len(),
            encoded_width,
        };

        Self {
            schema,
            categorical: file.categorical_features,
            model: file.model,
            metadata,
        }
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Dense-encode one reconciled row per the layout described above.
    fn encode(&self, row: &ReconciledRow) -> Vec<f32> {
        let mut encoded = Vec::with_capacity(self.metadata.encoded_width);
        encoded.extend(row.numeric.iter().map(|&value| value as f32));
        for (column, value) in self.categorical.iter().zip(&row.categorical) {
            for category in &column.categories {
                encoded.push(if category == value { 1.0 } else { 0.0 });
            }
        }
        encoded
    }
}

impl Pipeline for GbdtArtifact {
    fn schema(&self) -> &ExpectedSchema {
        &self.schema
    }

    fn predict_proba(&self, rows: &[ReconciledRow]) -> Result<Vec<[f64; 2]>, CoreError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let data: Vec<Data> = rows
            .iter()
            .map(|row| Data::new_test_data(self.encode(row), None))
            .collect();
        let predictions = self.model.predict(&data);

        if predictions.len() != rows.len() {
            return Err(CoreError::Inference(format!(
                "model returned {} probabilities for {} rows",
                predictions.len(),
                rows.len()
            )));
        }

        Ok(predictions
            .into_iter()
            .map(|p| {
                let positive = (p as f64).clamp(0.0, 1.0);
                [1.0 - positive, positive]
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FieldValue, RecordMap};
    use gbdt::config::Config;
    use std::fs;
    use tempfile::tempdir;

    // age, failures, school{GP,MS}, internet{yes,no}
    const WIDTH: usize = 2 + 2 + 2;

    /// Train a tiny model so the envelope carries a real gbdt-rs payload.
    fn tiny_model() -> GBDT {
        let mut cfg = Config::new();
        cfg.set_feature_size(WIDTH);
        cfg.set_max_depth(3);
        cfg.set_iterations(10);
        cfg.set_shrinkage(0.3);
        cfg.set_loss("LogLikelyhood");
        cfg.set_debug(false);
        cfg.set_training_optimization_level(2);
        cfg.set_min_leaf_size(1);

        let mut model = GBDT::new(&cfg);
        let mut training: Vec<Data> = Vec::new();
        for i in 0..40 {
            let failures = (i % 5) as f32;
            let features = vec![
                15.0 + (i % 10) as f32,
                failures,
                1.0,
                0.0,
                (i % 2) as f32,
                ((i + 1) % 2) as f32,
            ];
            let label = if failures >= 2.0 { 1.0 } else { -1.0 };
            training.push(Data::new_training_data(features, 1.0, label, None));
        }
        model.fit(&mut training);
        model
    }

    fn write_artifact(dir: &Path, version: u32) -> std::path::PathBuf {
        let envelope = serde_json::json!({
            "format_version": version,
            "trained_at": "2025-11-02T10:00:00Z",
            "numeric_features": ["age", "failures"],
            "categorical_features": [
                {"name": "school", "categories": ["GP", "MS"]},
                {"name": "internet", "categories": ["yes", "no"]},
            ],
            "model": serde_json::to_value(tiny_model()).unwrap(),
        });
        let path = dir.join("modelo_atraso.json");
        fs::write(&path, envelope.to_string()).unwrap();
        path
    }

    fn record(age: f64, failures: f64, school: &str, internet: &str) -> RecordMap {
        RecordMap::from([
            ("age".to_string(), FieldValue::Number(age)),
            ("failures".to_string(), FieldValue::Number(failures)),
            ("school".to_string(), FieldValue::from(school)),
            ("internet".to_string(), FieldValue::from(internet)),
        ])
    }

    #[test]
    fn test_load_and_predict() {
        let dir = tempdir().unwrap();
        let artifact = GbdtArtifact::load(&write_artifact(dir.path(), 1)).unwrap();

        assert_eq!(artifact.schema().numeric(), ["age", "failures"]);
        assert_eq!(artifact.schema().categorical(), ["school", "internet"]);
        assert_eq!(artifact.metadata().encoded_width, WIDTH);
        assert_eq!(
            artifact.metadata().trained_at.unwrap().to_rfc3339(),
            "2025-11-02T10:00:00+00:00"
        );

        let rows = vec![
            artifact.schema().reconcile(&record(17.0, 0.0, "GP", "yes")),
            artifact.schema().reconcile(&record(19.0, 4.0, "MS", "no")),
        ];
        let proba = artifact.predict_proba(&rows).unwrap();

        assert_eq!(proba.len(), 2);
        for [negative, positive] in proba {
            assert!((0.0..=1.0).contains(&positive));
            assert!((negative + positive - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_unknown_category_matches_empty() {
        let dir = tempdir().unwrap();
        let artifact = GbdtArtifact::load(&write_artifact(dir.path(), 1)).unwrap();

        // Both encode to an all-zeros one-hot block.
        let unknown = artifact.schema().reconcile(&record(17.0, 1.0, "XX", "yes"));
        let empty = artifact.schema().reconcile(&record(17.0, 1.0, "", "yes"));

        let proba = artifact.predict_proba(&[unknown, empty]).unwrap();
        assert_eq!(proba[0], proba[1]);
    }

    #[test]
    fn test_predict_empty_batch() {
        let dir = tempdir().unwrap();
        let artifact = GbdtArtifact::load(&write_artifact(dir.path(), 1)).unwrap();
        assert!(artifact.predict_proba(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let err = GbdtArtifact::load(&path).unwrap_err();

        assert!(matches!(err, CoreError::ArtifactMissing { .. }));
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn test_load_unparseable_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "not json").unwrap();

        let err = GbdtArtifact::load(&path).unwrap_err();
        assert!(matches!(err, CoreError::ArtifactFormat { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_load_version_mismatch() {
        let dir = tempdir().unwrap();
        let err = GbdtArtifact::load(&write_artifact(dir.path(), 99)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::ArtifactVersion { found: 99, expected: 1 }
        ));
    }
}
