//! Prediction labels, labeled records and batch summaries

use crate::types::transaction::TransactionRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary classification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Label {
    /// `0`
    Genuine,
    /// `1`
    Fraudulent,
}

impl Label {
    /// Map a raw classifier output onto a label.
    ///
    /// Anything other than `0` or `1` is rejected.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Label::Genuine),
            1 => Some(Label::Fraudulent),
            _ => None,
        }
    }

    /// Numeric code written to the `Prediction` column
    pub fn code(self) -> u8 {
        match self {
            Label::Genuine => 0,
            Label::Fraudulent => 1,
        }
    }

    pub fn is_fraud(self) -> bool {
        self == Label::Fraudulent
    }

    /// Verdict shown for a single transaction
    pub fn verdict(self) -> &'static str {
        match self {
            Label::Genuine => "GENUINE",
            Label::Fraudulent => "FRAUDULENT",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> Self {
        label.code()
    }
}

impl TryFrom<u8> for Label {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Label::from_code(code as i64)
            .ok_or_else(|| format!("invalid label {code}, expected 0 or 1"))
    }
}

/// A transaction paired with the label the classifier assigned to it.
///
/// Only the gateway creates these; they are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    record: TransactionRecord,
    label: Label,
}

impl PredictionResult {
    pub(crate) fn new(record: TransactionRecord, label: Label) -> Self {
        Self { record, label }
    }

    pub fn record(&self) -> &TransactionRecord {
        &self.record
    }

    pub fn label(&self) -> Label {
        self.label
    }
}

/// Aggregate counts over a result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of results
    pub total: usize,
    /// Results labeled `0`
    pub genuine: usize,
    /// Results labeled `1`
    pub fraud: usize,
}

impl Summary {
    /// Count labels over `results`
    pub fn from_results(results: &[PredictionResult]) -> Self {
        let fraud = results.iter().filter(|r| r.label().is_fraud()).count();
        Self {
            total: results.len(),
            genuine: results.len() - fraud,
            fraud,
        }
    }

    /// Share of fraudulent results, 0.0 for an empty set
    pub fn fraud_rate(&self) -> f64 {
        if self.total > 0 {
            self.fraud as f64 / self.total as f64
        } else {
            0.0
        }
    }
}
