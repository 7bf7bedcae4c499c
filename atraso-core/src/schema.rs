//! Expected column schema and record reconciliation.
//!
//! The schema is derived from the loaded artifact's preprocessing
//! configuration, never from user input. Reconciliation conforms any record
//! to it: expected columns only, schema order, missing numerics as `0`,
//! missing categoricals as the empty string.

use serde::{Deserialize, Serialize};

use crate::record::{FieldValue, RecordMap};

/// Column kind expected by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// Ordered column set the artifact requires, partitioned by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedSchema {
    numeric: Vec<String>,
    categorical: Vec<String>,
}

impl ExpectedSchema {
    pub fn new(numeric: Vec<String>, categorical: Vec<String>) -> Self {
        Self { numeric, categorical }
    }

    pub fn numeric(&self) -> &[String] {
        &self.numeric
    }

    pub fn categorical(&self) -> &[String] {
        &self.categorical
    }

    /// All expected columns in schema order: numerics first, then
    /// categoricals.
    pub fn columns(&self) -> impl Iterator<Item = (&str, ColumnKind)> {
        self.numeric
            .iter()
            .map(|name| (name.as_str(), ColumnKind::Numeric))
            .chain(
                self.categorical
                    .iter()
                    .map(|name| (name.as_str(), ColumnKind::Categorical)),
            )
    }

    pub fn len(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.categorical.is_empty()
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        if self.numeric.iter().any(|column| column == name) {
            Some(ColumnKind::Numeric)
        } else if self.categorical.iter().any(|column| column == name) {
            Some(ColumnKind::Categorical)
        } else {
            None
        }
    }

    /// Conform `record` to this schema.
    ///
    /// Total over any input mapping: missing numeric columns become `0.0`,
    /// missing categorical columns become `""`, extra columns are dropped.
    /// A value of the wrong type for its column is treated as absent.
    pub fn reconcile(&self, record: &RecordMap) -> ReconciledRow {
        let numeric = self
            .numeric
            .iter()
            .map(|name| {
                record
                    .get(name.as_str())
                    .and_then(FieldValue::as_f64)
                    .unwrap_or(0.0)
            })
            .collect();
        let categorical = self
            .categorical
            .iter()
            .map(|name| {
                record
                    .get(name.as_str())
                    .and_then(FieldValue::as_text)
                    .unwrap_or("")
                    .to_string()
            })
            .collect();
        ReconciledRow { numeric, categorical }
    }
}

/// A record conformed to an [`ExpectedSchema`]: values aligned with the
/// schema's column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledRow {
    pub numeric: Vec<f64>,
    pub categorical: Vec<String>,
}

impl ReconciledRow {
    /// Back to a named record map.
    pub fn to_record(&self, schema: &ExpectedSchema) -> RecordMap {
        let mut record = RecordMap::with_capacity(schema.len());
        for (name, value) in schema.numeric.iter().zip(&self.numeric) {
            record.insert(name.clone(), FieldValue::Number(*value));
        }
        for (name, value) in schema.categorical.iter().zip(&self.categorical) {
            record.insert(name.clone(), FieldValue::Text(value.clone()));
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ExpectedSchema {
        ExpectedSchema::new(
            vec!["age".to_string(), "failures".to_string()],
            vec!["school".to_string(), "internet".to_string()],
        )
    }

    #[test]
    fn test_reconcile_fills_defaults() {
        let record = RecordMap::from([("age".to_string(), FieldValue::Number(17.0))]);
        let row = schema().reconcile(&record);

        assert_eq!(row.numeric, vec![17.0, 0.0]);
        assert_eq!(row.categorical, vec!["".to_string(), "".to_string()]);
    }

    #[test]
    fn test_reconcile_drops_extras_and_keeps_order() {
        let record = RecordMap::from([
            ("internet".to_string(), FieldValue::from("yes")),
            ("school".to_string(), FieldValue::from("GP")),
            ("failures".to_string(), FieldValue::Number(1.0)),
            ("age".to_string(), FieldValue::Number(18.0)),
            ("G3".to_string(), FieldValue::Number(12.0)),
        ]);
        let row = schema().reconcile(&record);

        assert_eq!(row.numeric, vec![18.0, 1.0]);
        assert_eq!(row.categorical, vec!["GP".to_string(), "yes".to_string()]);
    }

    #[test]
    fn test_reconcile_total_on_empty_record() {
        let row = schema().reconcile(&RecordMap::new());
        assert_eq!(row.numeric, vec![0.0, 0.0]);
        assert_eq!(row.categorical, vec!["".to_string(), "".to_string()]);
    }

    #[test]
    fn test_reconcile_idempotent() {
        let schema = schema();
        let record = RecordMap::from([
            ("age".to_string(), FieldValue::Number(20.0)),
            ("school".to_string(), FieldValue::from("MS")),
        ]);

        let once = schema.reconcile(&record);
        let twice = schema.reconcile(&once.to_record(&schema));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_reconcile_wrong_type_treated_as_absent() {
        let record = RecordMap::from([
            ("age".to_string(), FieldValue::from("seventeen")),
            ("school".to_string(), FieldValue::Number(1.0)),
        ]);
        let row = schema().reconcile(&record);

        assert_eq!(row.numeric[0], 0.0);
        assert_eq!(row.categorical[0], "");
    }

    #[test]
    fn test_columns_order_and_kind() {
        let binding = schema();
        let columns: Vec<_> = binding.columns().collect();
        assert_eq!(
            columns,
            vec![
                ("age", ColumnKind::Numeric),
                ("failures", ColumnKind::Numeric),
                ("school", ColumnKind::Categorical),
                ("internet", ColumnKind::Categorical),
            ]
        );
    }

    #[test]
    fn test_kind_of() {
        let schema = schema();
        assert_eq!(schema.kind_of("age"), Some(ColumnKind::Numeric));
        assert_eq!(schema.kind_of("school"), Some(ColumnKind::Categorical));
        assert_eq!(schema.kind_of("G3"), None);
    }
}
