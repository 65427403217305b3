use crate::error::{PipelineError, Result};
use crate::process::{date_parser, schema, CleanStats};
use arrow::{
    array::{Array, StringArray, TimestampMicrosecondArray},
    compute::{max, min},
    record_batch::RecordBatch,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Summary of one cleaning run.
///
/// Holds no wall-clock data, so two runs over the same input serialise
/// identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub input_rows: usize,
    pub output_rows: usize,
    pub dropped_missing_customer: usize,
    pub filled_descriptions: usize,
    pub retention_rate: f64,
    pub first_invoice: Option<String>,
    pub last_invoice: Option<String>,
    pub unique_customers: usize,
    pub unique_products: usize,
    pub input_columns: usize,
    pub output_columns: usize,
}

impl CleaningReport {
    pub fn build(stats: &CleanStats, cleaned: &RecordBatch) -> Result<Self> {
        let dates = column::<TimestampMicrosecondArray>(cleaned, schema::INVOICE_DATE)?;
        let fmt = |v: Option<i64>| {
            v.and_then(date_parser::from_micros)
                .map(|dt| dt.format(TS_FORMAT).to_string())
        };

        let output_rows = cleaned.num_rows();
        let retention_rate = if stats.input_rows == 0 {
            0.0
        } else {
            output_rows as f64 / stats.input_rows as f64
        };

        Ok(Self {
            input_rows: stats.input_rows,
            output_rows,
            dropped_missing_customer: stats.dropped_missing_customer,
            filled_descriptions: stats.filled_descriptions,
            retention_rate,
            first_invoice: fmt(min(dates)),
            last_invoice: fmt(max(dates)),
            unique_customers: distinct(column::<StringArray>(cleaned, schema::CUSTOMER_ID)?),
            unique_products: distinct(column::<StringArray>(cleaned, schema::STOCK_CODE)?),
            input_columns: stats.input_columns,
            output_columns: cleaned.num_columns(),
        })
    }

    pub fn log(&self) {
        info!(
            input_rows = self.input_rows,
            output_rows = self.output_rows,
            retention = %format!("{:.1}%", self.retention_rate * 100.0),
            "data cleaning completed"
        );
        info!(
            first = self.first_invoice.as_deref().unwrap_or("-"),
            last = self.last_invoice.as_deref().unwrap_or("-"),
            customers = self.unique_customers,
            products = self.unique_products,
            "cleaned table coverage"
        );
    }
}

fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| PipelineError::Schema(format!("cleaned table lacks typed column {name}")))
}

fn distinct(arr: &StringArray) -> usize {
    arr.iter().flatten().collect::<HashSet<&str>>().len()
}
