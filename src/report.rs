//! Terminal rendering of predictions and summaries

use crate::error::GatewayError;
use crate::types::prediction::{PredictionResult, Summary};
use crate::types::schema::FeatureSchema;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{self, Write};
use uuid::Uuid;

/// Machine-readable summary of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub batch_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub model: String,
    #[serde(flatten)]
    pub summary: Summary,
}

impl SummaryReport {
    pub fn new(model: &str, summary: Summary) -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            model: model.to_string(),
            summary,
        }
    }
}

/// Print the first `limit` results as a table
pub fn render_preview<W: Write>(
    out: &mut W,
    results: &[PredictionResult],
    limit: usize,
) -> io::Result<()> {
    writeln!(out, "{:>6}  {:>12}  {:>12}  {:>10}", "Row", "Time", "Amount", "Prediction")?;
    writeln!(out, "{}", "─".repeat(46))?;

    for (i, result) in results.iter().take(limit).enumerate() {
        writeln!(
            out,
            "{:>6}  {:>12.1}  {:>12.2}  {:>10}",
            i + 1,
            result.record().time(),
            result.record().amount(),
            result.label()
        )?;
    }

    if results.len() > limit {
        writeln!(out, "  ... {} more rows", results.len() - limit)?;
    }
    Ok(())
}

/// Print the genuine/fraud counts
pub fn render_summary<W: Write>(out: &mut W, summary: &Summary) -> io::Result<()> {
    writeln!(out, "Total Transactions: {}", summary.total)?;
    writeln!(out, "Genuine: {}", summary.genuine)?;
    writeln!(
        out,
        "Fraudulent: {} ({:.2}%)",
        summary.fraud,
        summary.fraud_rate() * 100.0
    )
}

/// Print the verdict for a manually entered transaction
pub fn render_verdict<W: Write>(out: &mut W, result: &PredictionResult) -> io::Result<()> {
    writeln!(
        out,
        "This transaction is predicted to be {}.",
        result.label().verdict()
    )
}

/// Explain a rejected upload header
pub fn render_schema_mismatch<W: Write>(
    out: &mut W,
    expected: &[String],
    actual: &[String],
) -> io::Result<()> {
    writeln!(
        out,
        "Column mismatch. Your CSV must have {}.",
        FeatureSchema::describe()
    )?;
    writeln!(out, "  expected: {}", expected.join(", "))?;
    writeln!(out, "  actual:   {}", actual.join(", "))
}

/// Print a failed run for the user.
///
/// Uploads rejected for their header get the column mismatch explanation,
/// wherever the mismatch sits in the error chain. Other upload failures are
/// reported as file processing errors.
pub fn render_error<W: Write>(
    out: &mut W,
    error: &anyhow::Error,
    is_upload: bool,
) -> io::Result<()> {
    if !is_upload {
        return writeln!(out, "Error: {:#}", error);
    }

    let mismatch = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<GatewayError>())
        .and_then(|e| match e {
            GatewayError::SchemaMismatch { expected, actual } => Some((expected, actual)),
            _ => None,
        });

    match mismatch {
        Some((expected, actual)) => render_schema_mismatch(out, expected, actual),
        None => writeln!(out, "Error while processing the file: {:#}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClassifierError;
    use crate::types::prediction::Label;
    use crate::types::schema::FEATURE_COUNT;
    use crate::types::transaction::TransactionRecord;

    fn result(amount: f64, label: Label) -> PredictionResult {
        let mut values = [0.0; FEATURE_COUNT];
        values[0] = 3600.0;
        values[FEATURE_COUNT - 1] = amount;
        PredictionResult::new(TransactionRecord::new(values), label)
    }

    fn render<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_preview_truncates() {
        let results = vec![
            result(12.5, Label::Genuine),
            result(999.0, Label::Fraudulent),
            result(3.0, Label::Genuine),
        ];

        let text = render(|out| render_preview(out, &results, 2));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[2].contains("3600.0"));
        assert!(lines[2].ends_with("0"));
        assert!(lines[3].contains("999.00"));
        assert!(lines[3].ends_with("1"));
        assert_eq!(lines[4], "  ... 1 more rows");
    }

    #[test]
    fn test_summary_lines() {
        let summary = Summary {
            total: 4,
            genuine: 3,
            fraud: 1,
        };
        let text = render(|out| render_summary(out, &summary));
        assert_eq!(
            text,
            "Total Transactions: 4\nGenuine: 3\nFraudulent: 1 (25.00%)\n"
        );
    }

    #[test]
    fn test_verdict() {
        let text = render(|out| render_verdict(out, &result(1.0, Label::Fraudulent)));
        assert_eq!(text, "This transaction is predicted to be FRAUDULENT.\n");
    }

    #[test]
    fn test_schema_mismatch_message() {
        let expected = vec!["Time".to_string(), "Amount".to_string()];
        let actual = vec!["Time".to_string()];
        let text = render(|out| render_schema_mismatch(out, &expected, &actual));
        assert!(text.starts_with(
            "Column mismatch. Your CSV must have 30 columns: Time, V1–V28, Amount."
        ));
        assert!(text.contains("actual:   Time\n"));
    }

    #[test]
    fn test_error_schema_mismatch_upload() {
        let err = anyhow::Error::from(GatewayError::schema_mismatch(&["Time", "V1"]));
        let text = render(|out| render_error(out, &err, true));
        assert!(text.starts_with(
            "Column mismatch. Your CSV must have 30 columns: Time, V1–V28, Amount.\n"
        ));
        assert!(text.contains("actual:   Time, V1\n"));
    }

    #[test]
    fn test_error_schema_mismatch_behind_context() {
        use anyhow::Context;

        let err = Err::<(), _>(GatewayError::schema_mismatch(&["Amount"]))
            .context("Failed to ingest upload")
            .context("Batch run failed")
            .unwrap_err();
        let text = render(|out| render_error(out, &err, true));
        assert!(text.starts_with("Column mismatch."));
        assert!(text.contains("actual:   Amount\n"));
    }

    #[test]
    fn test_error_inference_failure_upload() {
        let err = anyhow::Error::from(GatewayError::from(ClassifierError::EmptyBatch));
        let text = render(|out| render_error(out, &err, true));
        assert!(text.starts_with("Error while processing the file: inference failed: empty batch"));
    }

    #[test]
    fn test_error_manual_entry() {
        let err = anyhow::Error::from(GatewayError::schema_mismatch(&["V29"]));
        let text = render(|out| render_error(out, &err, false));
        assert!(text.starts_with("Error: column mismatch"));
    }

    #[test]
    fn test_summary_report_json() {
        let report = SummaryReport::new(
            "fraud_model",
            Summary {
                total: 3,
                genuine: 2,
                fraud: 1,
            },
        );
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total"], 3);
        assert_eq!(json["genuine"], 2);
        assert_eq!(json["fraud"], 1);
        assert_eq!(json["model"], "fraud_model");
        assert!(json["generated_at"].is_string());
    }
}
