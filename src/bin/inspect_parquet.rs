use anyhow::{Context, Result};
use parquet::file::metadata::{ColumnChunkMetaData, RowGroupMetaData};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::schema::types::Type;
use retail_clean::PipelineConfig;
use std::{env, fs::File, path::PathBuf};

fn main() -> Result<()> {
    // Optional argument: path to a Parquet file. Defaults to the cleaned table.
    let path = match env::args().nth(1) {
        Some(p) => PathBuf::from(p),
        None => PipelineConfig::load()?.output_path,
    };

    let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let reader = SerializedFileReader::new(file)
        .with_context(|| format!("reading parquet footer of {}", path.display()))?;
    let meta = reader.metadata();
    let file_meta = meta.file_metadata();

    println!("=== {} ===", path.display());
    println!(
        "Created by:     {}",
        file_meta.created_by().unwrap_or("<unknown>")
    );
    println!("Rows:           {}", file_meta.num_rows());
    println!("Row groups:     {}", meta.num_row_groups());
    println!("Size on disk:   {} bytes", std::fs::metadata(&path)?.len());
    println!();

    println!("=== Schema ===");
    print_schema(file_meta.schema_descr().root_schema(), 0);
    println!();

    for rg_idx in 0..meta.num_row_groups() {
        print_row_group(rg_idx, meta.row_group(rg_idx));
    }
    Ok(())
}

fn print_schema(node: &Type, level: usize) {
    let indent = "  ".repeat(level);
    match node {
        Type::PrimitiveType {
            basic_info,
            physical_type,
            ..
        } => {
            let logical = basic_info
                .logical_type()
                .as_ref()
                .map_or(String::new(), |lt| format!(", {:?}", lt));
            let nullable = if basic_info.has_repetition() {
                format!(" [{:?}]", basic_info.repetition())
            } else {
                String::new()
            };
            println!(
                "{}- {}: {:?}{}{}",
                indent,
                basic_info.name(),
                physical_type,
                logical,
                nullable
            );
        }
        Type::GroupType { basic_info, fields } => {
            println!("{}+ {}", indent, basic_info.name());
            for field in fields {
                print_schema(field, level + 1);
            }
        }
    }
}

fn print_row_group(idx: usize, rg: &RowGroupMetaData) {
    println!("--- Row group {} ({} rows, {} bytes uncompressed) ---", idx, rg.num_rows(), rg.total_byte_size());
    for col in rg.columns() {
        print_column_chunk(col);
    }
    println!();
}

fn print_column_chunk(col: &ColumnChunkMetaData) {
    println!(
        "  {:<12} {:?}  {} → {} bytes",
        col.column_descr().name(),
        col.compression(),
        col.uncompressed_size(),
        col.compressed_size()
    );
    if let Some(stats) = col.statistics() {
        if let Some(nulls) = stats.null_count_opt() {
            println!("      nulls: {}", nulls);
        }
        if let (Some(min), Some(max)) = (stats.min_bytes_opt(), stats.max_bytes_opt()) {
            match (std::str::from_utf8(min), std::str::from_utf8(max)) {
                (Ok(lo), Ok(hi)) if col.column_descr().physical_type() == parquet::basic::Type::BYTE_ARRAY => {
                    println!("      range: {:?} .. {:?}", lo, hi)
                }
                _ => println!("      range (bytes): {:?} .. {:?}", min, max),
            }
        }
    }
}
