use crate::error::{PipelineError, Result};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};

pub const INVOICE_NO: &str = "InvoiceNo";
pub const STOCK_CODE: &str = "StockCode";
pub const DESCRIPTION: &str = "Description";
pub const QUANTITY: &str = "Quantity";
pub const INVOICE_DATE: &str = "InvoiceDate";
pub const UNIT_PRICE: &str = "UnitPrice";
pub const CUSTOMER_ID: &str = "CustomerID";
pub const COUNTRY: &str = "Country";

pub const YEAR: &str = "Year";
pub const MONTH: &str = "Month";
pub const DAY_OF_WEEK: &str = "DayOfWeek";
pub const TOTAL_AMOUNT: &str = "TotalAmount";

/// Columns every raw table must carry.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    INVOICE_NO,
    STOCK_CODE,
    DESCRIPTION,
    QUANTITY,
    INVOICE_DATE,
    UNIT_PRICE,
    CUSTOMER_ID,
    COUNTRY,
];

/// Positions of the required columns within a raw batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawColumns {
    pub invoice_no: usize,
    pub stock_code: usize,
    pub description: usize,
    pub quantity: usize,
    pub invoice_date: usize,
    pub unit_price: usize,
    pub customer_id: usize,
    pub country: usize,
}

impl RawColumns {
    /// Find every required column by name, reporting all missing ones at once.
    pub fn locate(schema: &Schema) -> Result<Self> {
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| schema.index_of(name).is_err())
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::Schema(format!(
                "missing required column(s): {}",
                missing.join(", ")
            )));
        }

        let idx = |name: &str| schema.index_of(name).map_err(PipelineError::from);
        Ok(Self {
            invoice_no: idx(INVOICE_NO)?,
            stock_code: idx(STOCK_CODE)?,
            description: idx(DESCRIPTION)?,
            quantity: idx(QUANTITY)?,
            invoice_date: idx(INVOICE_DATE)?,
            unit_price: idx(UNIT_PRICE)?,
            customer_id: idx(CUSTOMER_ID)?,
            country: idx(COUNTRY)?,
        })
    }
}

/// Final field for a raw column once the cleaner has typed it.
/// Columns outside the known set stay nullable text.
pub fn cleaned_field(name: &str) -> Field {
    match name {
        QUANTITY => Field::new(name, DataType::Int64, true),
        UNIT_PRICE => Field::new(name, DataType::Float64, true),
        INVOICE_DATE => Field::new(
            name,
            DataType::Timestamp(TimeUnit::Microsecond, None),
            false,
        ),
        CUSTOMER_ID | DESCRIPTION => Field::new(name, DataType::Utf8, false),
        _ => Field::new(name, DataType::Utf8, true),
    }
}

/// The four columns appended by the cleaner, in output order.
pub fn derived_fields() -> [Field; 4] {
    [
        Field::new(YEAR, DataType::Int32, false),
        Field::new(MONTH, DataType::Int32, false),
        Field::new(DAY_OF_WEEK, DataType::Utf8, false),
        Field::new(TOTAL_AMOUNT, DataType::Float64, true),
    ]
}

/// Cleaned schema for a raw schema: every raw column retyped, then the derived ones.
pub fn cleaned_schema(raw: &Schema) -> Schema {
    let mut fields: Vec<Field> = raw
        .fields()
        .iter()
        .map(|f| cleaned_field(f.name()))
        .collect();
    fields.extend(derived_fields());
    Schema::new(fields)
}
