//! Single-record and batch inference over the loaded pipeline.

use serde::Serialize;

use crate::decision::{decide, label_for};
use crate::error::CoreError;
use crate::model::Pipeline;
use crate::record::RecordMap;
use crate::schema::ReconciledRow;

/// Outcome of one prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Positive-class ("ATRASO") probability.
    pub probability: f64,
    /// Thresholded decision, 0 or 1.
    pub decision: u8,
    /// Label for the decision.
    pub label: &'static str,
}

impl Prediction {
    fn from_probability(probability: f64) -> Self {
        let decision = decide(probability);
        Self {
            probability,
            decision,
            label: label_for(decision),
        }
    }
}

/// Predict one record: reconcile, invoke the artifact, threshold.
pub fn predict_record(
    pipeline: &dyn Pipeline,
    record: &RecordMap,
) -> Result<Prediction, CoreError> {
    let row = pipeline.schema().reconcile(record);
    let proba = pipeline.predict_proba(std::slice::from_ref(&row))?;
    let positive = proba
        .first()
        .map(|classes| classes[1])
        .ok_or_else(|| CoreError::Inference("model returned no probabilities".to_string()))?;
    Ok(Prediction::from_probability(positive))
}

/// Predict a batch of records with a single vectorized artifact call.
/// Output is aligned with the input order, one prediction per record.
pub fn predict_records(
    pipeline: &dyn Pipeline,
    records: &[RecordMap],
) -> Result<Vec<Prediction>, CoreError> {
    let rows: Vec<ReconciledRow> = records
        .iter()
        .map(|record| pipeline.schema().reconcile(record))
        .collect();
    let proba = pipeline.predict_proba(&rows)?;

    if proba.len() != records.len() {
        return Err(CoreError::Inference(format!(
            "model returned {} probabilities for {} records",
            proba.len(),
            records.len()
        )));
    }

    Ok(proba
        .into_iter()
        .map(|classes| Prediction::from_probability(classes[1]))
        .collect())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::decision::{LABEL_ATRASO, LABEL_NO_ATRASO};
    use crate::fields;
    use crate::record::FieldValue;
    use crate::schema::ExpectedSchema;

    /// Pipeline stub whose probability call returns a fixed value per row.
    pub(crate) struct FixedPipeline {
        pub schema: ExpectedSchema,
        pub positive: f64,
    }

    impl FixedPipeline {
        pub fn full_schema(positive: f64) -> Self {
            let mut numeric = Vec::new();
            let mut categorical = Vec::new();
            for field in fields::FORM_FIELDS {
                match field.domain {
                    fields::FieldDomain::IntRange { .. } => numeric.push(field.name.to_string()),
                    fields::FieldDomain::Select { .. } => categorical.push(field.name.to_string()),
                }
            }
            Self {
                schema: ExpectedSchema::new(numeric, categorical),
                positive,
            }
        }
    }

    impl Pipeline for FixedPipeline {
        fn schema(&self) -> &ExpectedSchema {
            &self.schema
        }

        fn predict_proba(&self, rows: &[ReconciledRow]) -> Result<Vec<[f64; 2]>, CoreError> {
            Ok(rows
                .iter()
                .map(|_| [1.0 - self.positive, self.positive])
                .collect())
        }
    }

    /// Pipeline stub deriving the probability from the first numeric value,
    /// to observe positional alignment.
    pub(crate) struct ScaledPipeline {
        pub schema: ExpectedSchema,
    }

    impl Pipeline for ScaledPipeline {
        fn schema(&self) -> &ExpectedSchema {
            &self.schema
        }

        fn predict_proba(&self, rows: &[ReconciledRow]) -> Result<Vec<[f64; 2]>, CoreError> {
            Ok(rows
                .iter()
                .map(|row| {
                    let positive = row.numeric[0] / 100.0;
                    [1.0 - positive, positive]
                })
                .collect())
        }
    }

    #[test]
    fn test_low_risk_record_with_mocked_probability() {
        // age=17, failures=0, absences=0, first-option categoricals; the
        // artifact's probability call is mocked to 0.73.
        let pipeline = FixedPipeline::full_schema(0.73);
        let prediction = predict_record(&pipeline, &fields::default_record()).unwrap();

        assert_eq!(prediction.probability, 0.73);
        assert_eq!(prediction.decision, 1);
        assert_eq!(prediction.label, LABEL_ATRASO);
    }

    #[test]
    fn test_negative_class_below_threshold() {
        let pipeline = FixedPipeline::full_schema(0.4999);
        let prediction = predict_record(&pipeline, &fields::default_record()).unwrap();

        assert_eq!(prediction.decision, 0);
        assert_eq!(prediction.label, LABEL_NO_ATRASO);
    }

    #[test]
    fn test_batch_alignment() {
        let pipeline = ScaledPipeline {
            schema: ExpectedSchema::new(vec!["absences".to_string()], Vec::new()),
        };
        let records: Vec<RecordMap> = [10.0, 60.0, 50.0]
            .iter()
            .map(|&absences| {
                RecordMap::from([("absences".to_string(), FieldValue::Number(absences))])
            })
            .collect();

        let predictions = predict_records(&pipeline, &records).unwrap();

        assert_eq!(predictions.len(), records.len());
        assert_eq!(predictions[0].probability, 0.1);
        assert_eq!(predictions[0].decision, 0);
        assert_eq!(predictions[1].probability, 0.6);
        assert_eq!(predictions[1].decision, 1);
        // Exactly at the threshold resolves to the positive class.
        assert_eq!(predictions[2].probability, 0.5);
        assert_eq!(predictions[2].decision, 1);
        assert_eq!(predictions[2].label, LABEL_ATRASO);
    }

    #[test]
    fn test_empty_batch() {
        let pipeline = FixedPipeline::full_schema(0.9);
        assert!(predict_records(&pipeline, &[]).unwrap().is_empty());
    }
}
