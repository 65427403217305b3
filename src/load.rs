// src/load.rs
use crate::error::{PipelineError, Result};
use crate::process::schema::RawColumns;
use arrow::{
    compute::concat_batches,
    csv::{reader::Format, ReaderBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::{
    fs::File,
    io::{Cursor, Read},
    path::Path,
    sync::Arc,
};
use tracing::{debug, info};
use zip::ZipArchive;

const READ_BATCH_ROWS: usize = 64 * 1024;

/// Load the raw transactions table from `path`.
///
/// A `.zip` path is opened as an archive and its first `.csv` entry is used;
/// anything else is read as a CSV file with a header row. Every column comes
/// back as nullable Utf8; typing happens in the cleaner.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_transactions<P: AsRef<Path>>(path: P) -> Result<RecordBatch> {
    let path = path.as_ref();
    let bytes = if is_zip(path) {
        read_first_csv_in_zip(path)?
    } else {
        std::fs::read(path).map_err(|e| PipelineError::missing_input(path, e))?
    };
    info!(bytes = bytes.len(), "read raw input");

    let batch = parse_csv(&bytes)?;
    RawColumns::locate(&batch.schema())?;
    info!(
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        "loaded raw table"
    );
    Ok(batch)
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

/// Buffer the first `.csv` entry of the archive into memory.
fn read_first_csv_in_zip(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path).map_err(|e| PipelineError::missing_input(path, e))?;
    let mut archive = ZipArchive::new(file)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();
        if !entry.is_file() || !name.to_lowercase().ends_with(".csv") {
            continue;
        }
        debug!(entry = %name, "using archive entry");
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut buf)
            .map_err(|e| PipelineError::missing_input(path, e))?;
        return Ok(buf);
    }

    Err(PipelineError::missing_input(
        path,
        std::io::Error::new(std::io::ErrorKind::NotFound, "no .csv entry in archive"),
    ))
}

/// Parse CSV bytes (header row required) into a single all-text batch.
///
/// Invalid UTF-8 is replaced rather than rejected; the spreadsheet export
/// is not reliably UTF-8.
pub fn parse_csv(bytes: &[u8]) -> Result<RecordBatch> {
    let text = String::from_utf8_lossy(bytes);

    let (header_schema, _) = Format::default()
        .with_header(true)
        .infer_schema(Cursor::new(text.as_bytes()), Some(0))?;
    if header_schema.fields().is_empty() {
        return Err(PipelineError::Schema("input has no header row".into()));
    }

    let fields: Vec<Field> = header_schema
        .fields()
        .iter()
        .map(|f| {
            let name = f.name().trim_start_matches('\u{feff}').trim();
            Field::new(name, DataType::Utf8, true)
        })
        .collect();
    let read_schema = Arc::new(Schema::new(fields));

    let reader = ReaderBuilder::new(read_schema.clone())
        .with_header(true)
        .with_batch_size(READ_BATCH_ROWS)
        .build(Cursor::new(text.as_bytes()))?;

    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch?);
    }
    debug!(batches = batches.len(), "parsed csv");

    Ok(concat_batches(&read_schema, &batches)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use arrow::array::{Array, StringArray};
    use std::io::Write;
    use tempfile::{tempdir, Builder, NamedTempFile};
    use zip::write::SimpleFileOptions;
    use zip::CompressionMethod;

    const SAMPLE: &str = "InvoiceNo,StockCode,Description,Quantity,InvoiceDate,UnitPrice,CustomerID,Country
536365,85123A,\"WHITE HANGING HEART T-LIGHT HOLDER\",6,2010-12-01 08:26:00,2.55,,United Kingdom
536366,22633,,6,2010-12-01 08:28:00,1.85,17850,United Kingdom
";

    fn csv_tempfile() -> Result<NamedTempFile> {
        Ok(Builder::new().suffix(".csv").tempfile()?)
    }

    #[test]
    fn test_parse_csv_all_text() -> Result<()> {
        let batch = parse_csv(SAMPLE.as_bytes())?;
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 8);
        for f in batch.schema().fields() {
            assert_eq!(f.data_type(), &DataType::Utf8);
        }

        let customer = batch
            .column(6)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert!(customer.is_null(0));
        assert_eq!(customer.value(1), "17850");

        let desc = batch
            .column(2)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(desc.value(0), "WHITE HANGING HEART T-LIGHT HOLDER");
        assert!(desc.is_null(1));
        Ok(())
    }

    #[test]
    fn test_load_csv_file() -> Result<()> {
        let mut tmp = csv_tempfile()?;
        tmp.write_all(SAMPLE.as_bytes())?;
        let batch = load_transactions(tmp.path())?;
        assert_eq!(batch.num_rows(), 2);
        Ok(())
    }

    #[test]
    fn test_load_zip_archive() -> Result<()> {
        let dir = tempdir()?;
        let zip_path = dir.path().join("online_retail.zip");
        {
            let mut zip = zip::ZipWriter::new(File::create(&zip_path)?);
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
            zip.start_file("README.txt", options)?;
            zip.write_all(b"not a table")?;
            zip.start_file("online_retail.csv", options)?;
            zip.write_all(SAMPLE.as_bytes())?;
            zip.finish()?;
        }
        let batch = load_transactions(&zip_path)?;
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 8);
        Ok(())
    }

    #[test]
    fn test_zip_without_csv_is_missing_input() -> Result<()> {
        let dir = tempdir()?;
        let zip_path = dir.path().join("empty.zip");
        {
            let mut zip = zip::ZipWriter::new(File::create(&zip_path)?);
            zip.start_file("notes.txt", SimpleFileOptions::default())?;
            zip.write_all(b"nothing here")?;
            zip.finish()?;
        }
        let err = load_transactions(&zip_path).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput { .. }));
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let err = load_transactions("no/such/online_retail.csv").unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput { .. }));
    }

    #[test]
    fn test_missing_column_is_schema_error() -> Result<()> {
        let mut tmp = csv_tempfile()?;
        writeln!(tmp, "InvoiceNo,StockCode,Description,Quantity,UnitPrice,CustomerID,Country")?;
        writeln!(tmp, "536365,85123A,HOLDER,6,2.55,17850,United Kingdom")?;
        let err = load_transactions(tmp.path()).unwrap_err();
        match err {
            PipelineError::Schema(msg) => assert!(msg.contains("InvoiceDate")),
            other => panic!("expected schema error, got {other:?}"),
        }
        Ok(())
    }
}
