// src/write.rs
use crate::error::Result;
use crate::report::CleaningReport;
use arrow::record_batch::RecordBatch;
use parquet::{
    arrow::ArrowWriter,
    basic::Compression,
    file::properties::WriterProperties,
};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// `<path>.tmp` next to the final file.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Write `batch` as a single Parquet file at `path`, replacing any previous file.
///
/// The file is written to `<path>.tmp` and renamed into place, so readers never
/// observe a half-written table. Returns the size in bytes of the final file.
#[tracing::instrument(level = "info", skip_all, fields(path = %path.display(), rows = batch.num_rows()))]
pub fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<u64> {
    ensure_parent(path)?;
    let tmp = temp_path(path);

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_dictionary_enabled(true)
        .build();

    let file = File::create(&tmp)?;
    let mut writer = ArrowWriter::try_new(BufWriter::new(file), batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.into_inner()?.flush()?;
    debug!(tmp = %tmp.display(), "closed parquet writer");

    fs::rename(&tmp, path)?;
    let bytes = fs::metadata(path)?.len();
    info!(bytes, "wrote cleaned table");
    Ok(bytes)
}

/// A report written to `<path>.tmp`, waiting to be renamed into place.
///
/// Dropping it without [`StagedReport::commit`] removes the temporary file.
pub struct StagedReport {
    tmp: PathBuf,
    path: PathBuf,
    committed: bool,
}

impl StagedReport {
    pub fn commit(mut self) -> Result<()> {
        fs::rename(&self.tmp, &self.path)?;
        self.committed = true;
        info!(path = %self.path.display(), "wrote cleaning report");
        Ok(())
    }
}

impl Drop for StagedReport {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.tmp);
        }
    }
}

/// Serialize the cleaning report as pretty JSON next to `path`.
pub fn stage_report(report: &CleaningReport, path: &Path) -> Result<StagedReport> {
    ensure_parent(path)?;
    let tmp = temp_path(path);
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    fs::write(&tmp, json)?;
    debug!(tmp = %tmp.display(), "staged cleaning report");
    Ok(StagedReport {
        tmp,
        path: path.to_path_buf(),
        committed: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use arrow::array::{ArrayRef, Int64Array, StringArray};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn sample(rows: i64) -> RecordBatch {
        let ids: ArrayRef = Arc::new(Int64Array::from_iter_values(0..rows));
        let names: ArrayRef = Arc::new(StringArray::from_iter_values(
            (0..rows).map(|i| format!("row-{i}")),
        ));
        RecordBatch::try_from_iter(vec![("id", ids), ("name", names)]).unwrap()
    }

    #[test]
    fn test_write_and_read_back() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/out.parquet");
        let batch = sample(10);

        let bytes = write_parquet(&batch, &path)?;
        assert!(bytes > 0);
        assert!(!temp_path(&path).exists());

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?.build()?;
        let batches: Vec<RecordBatch> = reader.collect::<std::result::Result<_, _>>()?;
        let total: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(total, 10);
        assert_eq!(batches[0].num_columns(), 2);
        assert_eq!(batches[0].column(1).data_type(), batch.column(1).data_type());
        Ok(())
    }

    #[test]
    fn test_overwrite_replaces_previous() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("out.parquet");
        write_parquet(&sample(100), &path)?;
        write_parquet(&sample(3), &path)?;

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?;
        assert_eq!(reader.metadata().file_metadata().num_rows(), 3);
        Ok(())
    }

    #[test]
    fn test_same_batch_same_bytes() -> Result<()> {
        let dir = tempdir()?;
        let a = dir.path().join("a.parquet");
        let b = dir.path().join("b.parquet");
        write_parquet(&sample(50), &a)?;
        write_parquet(&sample(50), &b)?;
        assert_eq!(fs::read(&a)?, fs::read(&b)?);
        Ok(())
    }

    #[test]
    fn test_uncommitted_report_leaves_nothing() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("report.json");
        let staged = stage_report(&CleaningReport::default(), &path)?;
        assert!(temp_path(&path).exists());
        drop(staged);
        assert!(!temp_path(&path).exists());
        assert!(!path.exists());

        stage_report(&CleaningReport::default(), &path)?.commit()?;
        assert!(path.exists());
        assert!(!temp_path(&path).exists());
        Ok(())
    }
}
