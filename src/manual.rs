//! Manual single-transaction entry
//!
//! Mirrors a form with one numeric input per schema field: every field
//! starts at zero and can be set by name or answered interactively.

use crate::error::GatewayError;
use crate::types::schema::{FeatureSchema, FEATURE_COLUMNS, FEATURE_COUNT};
use crate::types::transaction::TransactionRecord;
use anyhow::{anyhow, Context, Result};
use std::io::{BufRead, Write};

/// Field values collected before a record is built
#[derive(Debug, Clone, PartialEq)]
pub struct ManualEntry {
    values: [f64; FEATURE_COUNT],
}

impl ManualEntry {
    /// All fields set to `0.0`
    pub fn new() -> Self {
        Self {
            values: [0.0; FEATURE_COUNT],
        }
    }

    /// Set one field by its schema name
    pub fn set(&mut self, column: &str, value: f64) -> Result<(), GatewayError> {
        let index = FeatureSchema::index_of(column)
            .ok_or_else(|| GatewayError::schema_mismatch(&[column]))?;
        self.values[index] = value;
        Ok(())
    }

    /// Apply a `NAME=VALUE` assignment
    pub fn apply(&mut self, assignment: &str) -> Result<()> {
        let (column, value) = parse_assignment(assignment)?;
        self.set(column, value)
            .with_context(|| format!("Unknown field {:?}", column))?;
        Ok(())
    }

    /// Prompt for every field in schema order.
    ///
    /// A blank answer keeps the current value; an unparsable answer is asked
    /// again. Ends early if `input` is exhausted.
    pub fn prompt<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> Result<()> {
        for (i, column) in FEATURE_COLUMNS.iter().enumerate() {
            loop {
                write!(output, "{} [{:.6}]: ", column, self.values[i])?;
                output.flush()?;

                let mut line = String::new();
                if input.read_line(&mut line)? == 0 {
                    writeln!(output)?;
                    return Ok(());
                }

                let answer = line.trim();
                if answer.is_empty() {
                    break;
                }
                match answer.parse::<f64>() {
                    Ok(value) => {
                        self.values[i] = value;
                        break;
                    }
                    Err(_) => writeln!(output, "  {:?} is not a number, try again", answer)?,
                }
            }
        }
        Ok(())
    }

    /// Build the immutable record
    pub fn finish(self) -> TransactionRecord {
        TransactionRecord::new(self.values)
    }
}

impl Default for ManualEntry {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `NAME=VALUE` into a field name and number
pub fn parse_assignment(assignment: &str) -> Result<(&str, f64)> {
    let (column, value) = assignment
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected NAME=VALUE, got {:?}", assignment))?;
    let column = column.trim();
    let value = value
        .trim()
        .parse::<f64>()
        .with_context(|| format!("Value for {} is not a number: {:?}", column, value.trim()))?;
    Ok((column, value))
}
