//! Classifier capability consumed by the gateway

use crate::error::ClassifierError;
use crate::types::transaction::TransactionRecord;

/// A pre-trained binary classifier.
///
/// Implementations are loaded once and shared read-only across callers,
/// so `predict` takes `&self` and must be safe to call concurrently.
pub trait Classifier: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Label every record in `records`, in order.
    ///
    /// Returns one raw label per record; the gateway checks the length and
    /// that every label is `0` or `1`.
    fn predict(&self, records: &[TransactionRecord]) -> Result<Vec<i64>, ClassifierError>;
}
