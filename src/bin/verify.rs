use anyhow::{bail, Context, Result};
use arrow::array::{Array, StringArray};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use retail_clean::{
    load::load_transactions,
    process::{schema, utils::normalize_customer_id},
    PipelineConfig,
};
use std::fs::File;

/// Null count of a text column across every batch.
fn nulls(batches: &[RecordBatch], name: &str) -> Result<usize> {
    let mut n = 0;
    for b in batches {
        let col = b
            .column_by_name(name)
            .with_context(|| format!("cleaned table has no {name} column"))?;
        n += col.null_count();
    }
    Ok(n)
}

fn main() -> Result<()> {
    let config = PipelineConfig::load()?;

    // 1) raw side: rows carrying a customer id
    let raw = load_transactions(&config.input_path)
        .with_context(|| format!("loading {}", config.input_path.display()))?;
    let customers = raw
        .column_by_name(schema::CUSTOMER_ID)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .context("raw CustomerID is not text")?;
    let expected_rows = customers
        .iter()
        .filter(|c| normalize_customer_id(*c).is_some())
        .count();

    // 2) cleaned side
    let file = File::open(&config.output_path)
        .with_context(|| format!("opening {}", config.output_path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let cleaned_columns = builder.schema().fields().len();
    let batches = builder
        .build()?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("reading cleaned table")?;
    let cleaned_rows: usize = batches.iter().map(|b| b.num_rows()).sum();

    let checks = [
        ("rows", expected_rows, cleaned_rows),
        ("columns", raw.num_columns() + 4, cleaned_columns),
        ("CustomerID nulls", 0, nulls(&batches, schema::CUSTOMER_ID)?),
        ("Description nulls", 0, nulls(&batches, schema::DESCRIPTION)?),
    ];

    println!("\n{: <20} {:>12} {:>12}", "Check", "Expected", "Cleaned");
    println!("{:-<46}", "");
    let mut failed = 0;
    for (name, expected, actual) in checks {
        let mark = if expected == actual { "" } else { "  ✗" };
        println!("{: <20} {:>12} {:>12}{}", name, expected, actual, mark);
        if expected != actual {
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{} check(s) failed", failed);
    }
    println!("\nall checks passed");
    Ok(())
}
