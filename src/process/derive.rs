use crate::error::{PipelineError, Result};
use crate::process::date_parser;
use arrow::array::{
    ArrayRef, Float64Array, Int32Builder, Int64Array, StringBuilder,
    TimestampMicrosecondArray,
};
use chrono::Datelike;
use std::sync::Arc;

/// Year, Month and DayOfWeek columns derived from invoice timestamps.
pub struct CalendarColumns {
    pub year: ArrayRef,
    pub month: ArrayRef,
    pub day_of_week: ArrayRef,
}

/// Calendar fields of each timestamp, read in the timestamp's own wall clock.
/// DayOfWeek is the full English name (`%A`).
pub fn calendar_columns(ts: &TimestampMicrosecondArray) -> Result<CalendarColumns> {
    let mut year = Int32Builder::with_capacity(ts.len());
    let mut month = Int32Builder::with_capacity(ts.len());
    let mut dow = StringBuilder::with_capacity(ts.len(), ts.len() * 8);

    for (i, micros) in ts.iter().enumerate() {
        let dt = micros
            .and_then(date_parser::from_micros)
            .ok_or_else(|| PipelineError::Schema(format!("invoice timestamp missing at {i}")))?;
        year.append_value(dt.year());
        month.append_value(dt.month() as i32);
        dow.append_value(dt.format("%A").to_string());
    }

    Ok(CalendarColumns {
        year: Arc::new(year.finish()),
        month: Arc::new(month.finish()),
        day_of_week: Arc::new(dow.finish()),
    })
}

/// Quantity × UnitPrice per row. No rounding; negative quantities give
/// negative totals. A null operand gives a null total.
pub fn total_amount(quantity: &Int64Array, unit_price: &Float64Array) -> ArrayRef {
    let totals: Float64Array = quantity
        .iter()
        .zip(unit_price.iter())
        .map(|(q, p)| match (q, p) {
            (Some(q), Some(p)) => Some(q as f64 * p),
            _ => None,
        })
        .collect();
    Arc::new(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::date_parser::{parse_invoice_timestamp, to_micros};
    use arrow::array::{Array, Int32Array, StringArray};

    fn ts(values: &[&str]) -> TimestampMicrosecondArray {
        values
            .iter()
            .map(|s| Some(to_micros(&parse_invoice_timestamp(s).unwrap())))
            .collect()
    }

    #[test]
    fn test_calendar_columns() {
        let arr = ts(&["2010-12-01 09:00:00", "2011-01-02 23:59:59", "2011-12-09 12:50:00"]);
        let cal = calendar_columns(&arr).unwrap();

        let year = cal.year.as_any().downcast_ref::<Int32Array>().unwrap();
        let month = cal.month.as_any().downcast_ref::<Int32Array>().unwrap();
        let dow = cal.day_of_week.as_any().downcast_ref::<StringArray>().unwrap();

        assert_eq!(year.values().to_vec(), vec![2010, 2011, 2011]);
        assert_eq!(month.values().to_vec(), vec![12, 1, 12]);
        assert_eq!(dow.value(0), "Wednesday");
        assert_eq!(dow.value(1), "Sunday");
        assert_eq!(dow.value(2), "Friday");
    }

    #[test]
    fn test_late_evening_stays_on_same_day() {
        let arr = ts(&["2010-12-05 23:30:00"]);
        let cal = calendar_columns(&arr).unwrap();
        let dow = cal.day_of_week.as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(dow.value(0), "Sunday");
    }

    #[test]
    fn test_total_amount() {
        let qty = Int64Array::from(vec![Some(6), Some(-2), None, Some(3)]);
        let price = Float64Array::from(vec![Some(2.55), Some(4.25), Some(1.0), None]);
        let total = total_amount(&qty, &price);
        let total = total.as_any().downcast_ref::<Float64Array>().unwrap();

        assert_eq!(total.value(0), 6.0 * 2.55);
        assert!((total.value(0) - 15.30).abs() < 1e-9);
        assert_eq!(total.value(1), -8.5);
        assert!(total.is_null(2));
        assert!(total.is_null(3));
    }

    #[test]
    fn test_day_of_week_covers_a_full_week() {
        // 2010-12-06 is a Monday
        let days: Vec<String> = (6..=12)
            .map(|d| format!("2010-12-{d:02} 12:00:00"))
            .collect();
        let arr = ts(&days.iter().map(String::as_str).collect::<Vec<_>>());
        let cal = calendar_columns(&arr).unwrap();
        let dow = cal.day_of_week.as_any().downcast_ref::<StringArray>().unwrap();
        let names: Vec<&str> = dow.iter().flatten().collect();
        assert_eq!(
            names,
            vec!["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"]
        );
    }
}
