// src/process/mod.rs
pub mod convert;
pub mod date_parser;
pub mod derive;
pub mod schema;
pub mod utils;

use crate::error::{PipelineError, Result};
use arrow::{
    array::{
        Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray,
        TimestampMicrosecondArray,
    },
    compute::filter,
    record_batch::RecordBatch,
};
use schema::{cleaned_schema, RawColumns};
use std::sync::Arc;
use tracing::{debug, info};

/// Counters collected while cleaning, used by the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub input_rows: usize,
    pub input_columns: usize,
    pub dropped_missing_customer: usize,
    pub filled_descriptions: usize,
}

#[derive(Debug)]
pub struct Cleaned {
    pub batch: RecordBatch,
    pub stats: CleanStats,
}

/// Turns a raw all-text transactions batch into the cleaned, typed table.
///
/// Steps, in order: drop rows without a customer id, fill missing
/// descriptions, type the numeric and timestamp columns, then append
/// Year, Month, DayOfWeek and TotalAmount. Each step builds new arrays;
/// the input batch is never modified.
pub struct Cleaner {
    missing_description: String,
}

impl Cleaner {
    pub fn new(missing_description: impl Into<String>) -> Self {
        Self {
            missing_description: missing_description.into(),
        }
    }

    #[tracing::instrument(level = "info", skip_all, fields(rows = raw.num_rows()))]
    pub fn clean(&self, raw: &RecordBatch) -> Result<Cleaned> {
        let raw_schema = raw.schema();
        let cols = RawColumns::locate(&raw_schema)?;
        let mut stats = CleanStats {
            input_rows: raw.num_rows(),
            input_columns: raw.num_columns(),
            ..Default::default()
        };

        // 1) customer filter
        let customers: StringArray = text_column(raw, cols.customer_id)?
            .iter()
            .map(utils::normalize_customer_id)
            .collect();
        let keep: BooleanArray = customers.iter().map(|c| Some(c.is_some())).collect();
        let kept_rows: Vec<usize> = keep.values().set_indices().collect();
        stats.dropped_missing_customer = raw.num_rows() - kept_rows.len();
        info!(
            dropped = stats.dropped_missing_customer,
            "removed rows with missing CustomerID"
        );

        let mut columns: Vec<ArrayRef> = Vec::with_capacity(raw.num_columns() + 4);
        for (i, col) in raw.columns().iter().enumerate() {
            let source: ArrayRef = if i == cols.customer_id {
                Arc::new(customers.clone())
            } else {
                col.clone()
            };
            columns.push(filter(&source, &keep)?);
        }

        // 2) description fill
        let (descriptions, filled) =
            self.fill_descriptions(downcast::<StringArray>(&columns[cols.description])?);
        stats.filled_descriptions = filled;
        columns[cols.description] = Arc::new(descriptions);
        info!(filled, "filled missing product descriptions");

        // 3) typed columns
        let quantity = convert::to_int64(
            downcast::<StringArray>(&columns[cols.quantity])?,
            schema::QUANTITY,
            &kept_rows,
        )?;
        let unit_price = convert::to_float64(
            downcast::<StringArray>(&columns[cols.unit_price])?,
            schema::UNIT_PRICE,
            &kept_rows,
        )?;
        let invoice_date = convert::to_timestamp(
            downcast::<StringArray>(&columns[cols.invoice_date])?,
            schema::INVOICE_DATE,
            &kept_rows,
        )?;
        columns[cols.quantity] = quantity;
        columns[cols.unit_price] = unit_price;
        columns[cols.invoice_date] = invoice_date;
        debug!("converted InvoiceDate, Quantity and UnitPrice");

        // 4) calendar fields
        let calendar = derive::calendar_columns(downcast::<TimestampMicrosecondArray>(
            &columns[cols.invoice_date],
        )?)?;

        // 5) totals
        let total = derive::total_amount(
            downcast::<Int64Array>(&columns[cols.quantity])?,
            downcast::<Float64Array>(&columns[cols.unit_price])?,
        );

        columns.push(calendar.year);
        columns.push(calendar.month);
        columns.push(calendar.day_of_week);
        columns.push(total);

        let out_schema = Arc::new(cleaned_schema(&raw_schema));
        let batch = RecordBatch::try_new(out_schema, columns)?;
        info!(
            rows = batch.num_rows(),
            columns = batch.num_columns(),
            "cleaned table ready"
        );
        Ok(Cleaned { batch, stats })
    }

    /// Replace absent descriptions with the sentinel; returns the count filled.
    fn fill_descriptions(&self, arr: &StringArray) -> (StringArray, usize) {
        let mut filled = 0;
        let out: StringArray = arr
            .iter()
            .map(|d| match utils::present(d) {
                Some(s) => Some(s.to_string()),
                None => {
                    filled += 1;
                    Some(self.missing_description.clone())
                }
            })
            .collect();
        (out, filled)
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new(crate::config::UNKNOWN_PRODUCT)
    }
}

fn text_column(batch: &RecordBatch, idx: usize) -> Result<&StringArray> {
    downcast::<StringArray>(batch.column(idx))
}

/// Downcast a column, turning a type mismatch into a schema error.
fn downcast<T: Array + 'static>(arr: &ArrayRef) -> Result<&T> {
    arr.as_any().downcast_ref::<T>().ok_or_else(|| {
        PipelineError::Schema(format!("unexpected column type {:?}", arr.data_type()))
    })
}
