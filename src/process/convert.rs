use crate::error::{PipelineError, Result};
use crate::process::{date_parser, utils};
use arrow::array::{
    Array, ArrayRef, Float64Builder, Int64Builder, StringArray, TimestampMicrosecondBuilder,
};
use std::sync::Arc;

/// Convert a text column into Int64. Blank cells become null.
///
/// `rows` maps each position back to its row in the raw input so errors
/// point at the line the user can find.
pub fn to_int64(arr: &StringArray, column: &str, rows: &[usize]) -> Result<ArrayRef> {
    let mut b = Int64Builder::with_capacity(arr.len());
    for (i, opt) in arr.iter().enumerate() {
        match utils::non_blank(opt) {
            None => b.append_null(),
            Some(s) => {
                let v = parse_integral(s).ok_or_else(|| PipelineError::parse(column, rows[i], s))?;
                b.append_value(v);
            }
        }
    }
    Ok(Arc::new(b.finish()))
}

/// `"6"` and `"6.0"` are both 6; `"6.5"` is not an integer.
fn parse_integral(s: &str) -> Option<i64> {
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    (f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15).then_some(f as i64)
}

/// Convert a text column into Float64. Blank cells become null.
pub fn to_float64(arr: &StringArray, column: &str, rows: &[usize]) -> Result<ArrayRef> {
    let mut b = Float64Builder::with_capacity(arr.len());
    for (i, opt) in arr.iter().enumerate() {
        match utils::non_blank(opt) {
            None => b.append_null(),
            Some(s) => {
                let v: f64 = s
                    .parse()
                    .map_err(|_| PipelineError::parse(column, rows[i], s))?;
                b.append_value(v);
            }
        }
    }
    Ok(Arc::new(b.finish()))
}

/// Convert a text column into naive microsecond timestamps.
///
/// Any blank or unparseable cell fails the whole column.
pub fn to_timestamp(arr: &StringArray, column: &str, rows: &[usize]) -> Result<ArrayRef> {
    let mut b = TimestampMicrosecondBuilder::with_capacity(arr.len());
    for (i, opt) in arr.iter().enumerate() {
        let raw = opt.unwrap_or_default();
        let dt = utils::non_blank(opt)
            .and_then(date_parser::parse_invoice_timestamp)
            .ok_or_else(|| PipelineError::parse(column, rows[i], raw))?;
        b.append_value(date_parser::to_micros(&dt));
    }
    Ok(Arc::new(b.finish()))
}
