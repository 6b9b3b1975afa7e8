//! CSV batch upload and result download

use crate::error::{ClassifierError, GatewayError};
use crate::gateway::InferenceGateway;
use crate::types::prediction::PredictionResult;
use crate::types::schema::{FeatureSchema, FEATURE_COLUMNS, FEATURE_COUNT, PREDICTION_COLUMN};
use crate::types::transaction::TransactionRecord;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

/// An uploaded CSV before schema validation: header plus raw rows.
#[derive(Debug, Clone)]
pub struct RawBatch {
    columns: Vec<String>,
    rows: Vec<StringRecord>,
}

impl RawBatch {
    /// Header names, exactly as uploaded
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Parse every row into a record.
    ///
    /// The header must match the schema. A cell that is not a number fails
    /// the whole batch, naming its 1-based data row and column.
    pub fn into_records(self) -> Result<Vec<TransactionRecord>, GatewayError> {
        FeatureSchema::validate(&self.columns)?;

        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| parse_row(i + 1, row))
            .collect()
    }
}

// Rows always have as many cells as the header; the reader rejects ragged rows.
fn parse_row(row_number: usize, row: &StringRecord) -> Result<TransactionRecord, GatewayError> {
    let mut values = [0.0; FEATURE_COUNT];
    for (i, cell) in row.iter().enumerate() {
        values[i] = cell.trim().parse::<f64>().map_err(|_| ClassifierError::NonNumeric {
            row: row_number,
            column: FEATURE_COLUMNS[i].to_string(),
            value: cell.to_string(),
        })?;
    }
    Ok(TransactionRecord::new(values))
}

/// Read a CSV batch with a header row.
///
/// Header names are kept byte for byte; ragged rows fail the read.
pub fn read_batch<R: Read>(reader: R) -> Result<RawBatch, GatewayError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::None)
        .from_reader(reader);

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let rows = reader.records().collect::<Result<Vec<_>, _>>()?;

    debug!(columns = columns.len(), rows = rows.len(), "Batch read");
    Ok(RawBatch { columns, rows })
}

/// Read a CSV batch from a file
pub fn read_batch_from_path<P: AsRef<Path>>(path: P) -> Result<RawBatch, GatewayError> {
    let file = File::open(path.as_ref())?;
    read_batch(file)
}

/// Read, validate and parse an uploaded batch
pub fn ingest<R: Read>(
    gateway: &InferenceGateway,
    reader: R,
) -> Result<Vec<TransactionRecord>, GatewayError> {
    let batch = read_batch(reader)?;
    gateway.validate(batch.columns())?;
    batch.into_records()
}

/// Write records with the schema header, without predictions
pub fn write_records<W: Write>(
    writer: W,
    records: &[TransactionRecord],
) -> Result<(), GatewayError> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(FEATURE_COLUMNS)?;
    for record in records {
        writer.write_record(record.values().iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write labeled results: schema columns plus `Prediction`, in input order
pub fn write_results<W: Write>(
    writer: W,
    results: &[PredictionResult],
) -> Result<(), GatewayError> {
    let mut writer = WriterBuilder::new().from_writer(writer);

    writer.write_record(
        FEATURE_COLUMNS
            .iter()
            .chain(std::iter::once(&PREDICTION_COLUMN)),
    )?;
    for result in results {
        let mut row: Vec<String> = result
            .record()
            .values()
            .iter()
            .map(|v| v.to_string())
            .collect();
        row.push(result.label().to_string());
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write labeled results to a file
pub fn write_results_to_path<P: AsRef<Path>>(
    path: P,
    results: &[PredictionResult],
) -> Result<(), GatewayError> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_results(file, results)?;
    info!(path = %path.display(), rows = results.len(), "Results written");
    Ok(())
}
