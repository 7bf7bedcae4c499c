//! CSV batch mode.
//!
//! Parses an uploaded CSV, warns about absent visible columns, runs one
//! vectorized prediction over the whole table and appends the probability,
//! decision and label columns to the original rows.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::CoreError;
use crate::fields;
use crate::inference::predict_records;
use crate::model::Pipeline;
use crate::record::{FieldValue, RecordMap};
use crate::schema::ColumnKind;

pub const PROBA_COLUMN: &str = "proba_atraso";
pub const DECISION_COLUMN: &str = "pred_int";
pub const LABEL_COLUMN: &str = "pred_label";

/// In-memory CSV table: header row plus rectangular string rows.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Outcome summary of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub rows: usize,
    pub missing_columns: Vec<String>,
}

/// Parse UTF-8 CSV bytes with a header row. Ragged rows are an error; no
/// partial recovery is attempted.
pub fn parse_csv(bytes: &[u8]) -> Result<CsvTable, CoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(CoreError::EmptyCsv);
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(CsvTable { headers, rows })
}

/// Visible form columns absent from the table's header.
pub fn missing_visible_columns(table: &CsvTable) -> Vec<String> {
    let present: HashSet<&str> = table.headers.iter().map(String::as_str).collect();
    fields::visible_columns()
        .filter(|column| !present.contains(column))
        .map(str::to_string)
        .collect()
}

/// Run the pipeline over the whole table and append the three prediction
/// columns. Absent visible columns are reported in the summary (inference
/// proceeds with defaults for them).
pub fn annotate(pipeline: &dyn Pipeline, table: &mut CsvTable) -> Result<BatchSummary, CoreError> {
    let missing = missing_visible_columns(table);
    if !missing.is_empty() {
        log::warn!(
            "CSV is missing visible columns, defaults applied: {}",
            missing.join(", ")
        );
    }

    let records = rows_to_records(pipeline, table)?;
    let predictions = predict_records(pipeline, &records)?;

    table.headers.push(PROBA_COLUMN.to_string());
    table.headers.push(DECISION_COLUMN.to_string());
    table.headers.push(LABEL_COLUMN.to_string());
    for (row, prediction) in table.rows.iter_mut().zip(&predictions) {
        row.push(prediction.probability.to_string());
        row.push(prediction.decision.to_string());
        row.push(prediction.label.to_string());
    }

    Ok(BatchSummary {
        rows: predictions.len(),
        missing_columns: missing,
    })
}

/// Serialize the table back to CSV bytes.
pub fn to_csv_bytes(table: &CsvTable) -> Result<Vec<u8>, CoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| CoreError::CsvWrite(e.to_string()))
}

/// Convert table rows into record maps, parsing values of expected numeric
/// columns. Empty cells count as absent; non-numeric cells are errors naming
/// the 1-based file line (the header is line 1).
fn rows_to_records(pipeline: &dyn Pipeline, table: &CsvTable) -> Result<Vec<RecordMap>, CoreError> {
    let schema = pipeline.schema();
    let kinds: Vec<Option<ColumnKind>> = table
        .headers
        .iter()
        .map(|header| schema.kind_of(header))
        .collect();

    let mut records = Vec::with_capacity(table.rows.len());
    for (index, row) in table.rows.iter().enumerate() {
        let mut record = RecordMap::new();
        for ((header, kind), value) in table.headers.iter().zip(&kinds).zip(row) {
            match kind {
                // Not expected by the artifact; reconciliation would drop it.
                None => {}
                Some(ColumnKind::Categorical) => {
                    record.insert(header.clone(), FieldValue::Text(value.clone()));
                }
                Some(ColumnKind::Numeric) => {
                    let trimmed = value.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let parsed: f64 = trimmed.parse().map_err(|_| CoreError::NumericValue {
                        line: index + 2,
                        column: header.clone(),
                        value: value.clone(),
                    })?;
                    record.insert(header.clone(), FieldValue::Number(parsed));
                }
            }
        }
        records.push(record);
    }
    Ok(records)
}
