//! Table sinks: delimited text or Parquet, with atomic tmp→rename

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::RecordBatch;
use arrow::csv::WriterBuilder;
use arrow::datatypes::{Schema, SchemaRef};
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;

/// On-disk table format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Delimited text with a header row
    #[default]
    Csv,
    /// Zstd-compressed Parquet
    Parquet,
}

impl OutputFormat {
    /// Parse CLI/config string into enum
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" | "tsv" | "delimited" => Some(Self::Csv),
            "parquet" => Some(Self::Parquet),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How tables are encoded on disk
#[derive(Debug, Clone, Copy)]
pub struct SinkOptions {
    pub format: OutputFormat,
    /// Field delimiter for [`OutputFormat::Csv`]
    pub delimiter: u8,
    /// Zstd level for [`OutputFormat::Parquet`] (1-22)
    pub zstd_level: i32,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            delimiter: b',',
            zstd_level: 3,
        }
    }
}

impl SinkOptions {
    /// File extension: `csv`, `tsv` (tab delimiter) or `parquet`
    pub fn extension(&self) -> &'static str {
        match (self.format, self.delimiter) {
            (OutputFormat::Csv, b'\t') => "tsv",
            (OutputFormat::Csv, _) => "csv",
            (OutputFormat::Parquet, _) => "parquet",
        }
    }

    /// Final path of `table` inside `output_dir`
    pub fn table_path(&self, output_dir: &Path, table: &str) -> PathBuf {
        output_dir.join(format!("{table}.{}", self.extension()))
    }
}

enum Writer {
    Csv(arrow::csv::Writer<BufWriter<File>>),
    Parquet(ArrowWriter<File>),
}

/// Buffered table writer with atomic tmp→rename
pub struct TableSink {
    writer: Writer,
    schema: SchemaRef,
    tmp_path: PathBuf,
    final_path: PathBuf,
    row_count: usize,
}

impl std::fmt::Debug for TableSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableSink")
            .field("final_path", &self.final_path)
            .field("row_count", &self.row_count)
            .finish_non_exhaustive()
    }
}

impl TableSink {
    /// Create a new sink for `table`, writing to a temporary file
    pub fn new(
        table: &str,
        output_dir: &Path,
        schema: &Schema,
        options: &SinkOptions,
    ) -> Result<Self, io::Error> {
        let final_path = options.table_path(output_dir, table);
        let mut tmp_name = final_path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        // Clean up stale tmp file
        if tmp_path.exists() {
            fs::remove_file(&tmp_path)?;
        }

        let file = File::create(&tmp_path)?;
        let schema = Arc::new(schema.clone());
        let writer = match options.format {
            OutputFormat::Csv => Writer::Csv(
                WriterBuilder::new()
                    .with_header(true)
                    .with_delimiter(options.delimiter)
                    .build(BufWriter::new(file)),
            ),
            OutputFormat::Parquet => {
                let level = ZstdLevel::try_new(options.zstd_level)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
                let props = WriterProperties::builder()
                    .set_compression(Compression::ZSTD(level))
                    .build();
                Writer::Parquet(
                    ArrowWriter::try_new(file, schema.clone(), Some(props))
                        .map_err(io::Error::other)?,
                )
            }
        };

        Ok(Self {
            writer,
            schema,
            tmp_path,
            final_path,
            row_count: 0,
        })
    }

    /// Write a record batch
    pub fn write_batch(&mut self, batch: &RecordBatch) -> Result<(), io::Error> {
        self.row_count += batch.num_rows();
        match &mut self.writer {
            Writer::Csv(w) => w.write(batch).map_err(io::Error::other),
            Writer::Parquet(w) => w.write(batch).map_err(io::Error::other),
        }
    }

    /// Finalize: flush footer/buffers and atomically rename tmp → final.
    ///
    /// An empty delimited table still gets its header row.
    pub fn finalize(mut self) -> Result<usize, io::Error> {
        if self.row_count == 0 {
            if let Writer::Csv(w) = &mut self.writer {
                w.write(&RecordBatch::new_empty(self.schema.clone()))
                    .map_err(io::Error::other)?;
            }
        }
        match self.writer {
            Writer::Csv(w) => {
                let mut inner = w.into_inner();
                inner.flush()?;
            }
            Writer::Parquet(w) => {
                w.close().map_err(io::Error::other)?;
            }
        }
        fs::rename(&self.tmp_path, &self.final_path)?;
        log::debug!(
            "wrote {} rows to {}",
            self.row_count,
            self.final_path.display()
        );
        Ok(self.row_count)
    }

    pub fn path(&self) -> &Path {
        &self.final_path
    }
}

/// Check if a completed parquet file exists and has a valid footer
pub fn is_valid_parquet(path: &Path) -> bool {
    if !path.exists() {
        return false;
    }
    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return false,
    };
    parquet::file::reader::SerializedFileReader::new(file).is_ok()
}

/// Remove stale .tmp files in the output directory
pub fn cleanup_tmp_files(output_dir: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(output_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "tmp") {
            log::warn!("Removing stale tmp file: {}", path.display());
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int32Array, StringArray};
    use arrow::datatypes::{DataType, Field};
    use tempfile::TempDir;

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("laureate_id", DataType::Utf8, false),
            Field::new("award_year", DataType::Int32, true),
        ])
    }

    fn batch() -> RecordBatch {
        RecordBatch::try_new(
            Arc::new(schema()),
            vec![
                Arc::new(StringArray::from(vec!["1", "6"])),
                Arc::new(Int32Array::from(vec![Some(1901), None])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn csv_sink_writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let mut sink =
            TableSink::new("prizes", dir.path(), &schema(), &SinkOptions::default()).unwrap();
        sink.write_batch(&batch()).unwrap();
        assert_eq!(sink.finalize().unwrap(), 2);

        let text = std::fs::read_to_string(dir.path().join("prizes.csv")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["laureate_id,award_year", "1,1901", "6,"]);
        assert!(!dir.path().join("prizes.csv.tmp").exists());
    }

    #[test]
    fn csv_sink_empty_table_keeps_header() {
        let dir = TempDir::new().unwrap();
        let sink =
            TableSink::new("empty", dir.path(), &schema(), &SinkOptions::default()).unwrap();
        assert_eq!(sink.finalize().unwrap(), 0);

        let text = std::fs::read_to_string(dir.path().join("empty.csv")).unwrap();
        assert_eq!(text.trim_end(), "laureate_id,award_year");
    }

    #[test]
    fn tab_delimiter_uses_tsv_extension() {
        let dir = TempDir::new().unwrap();
        let options = SinkOptions {
            delimiter: b'\t',
            ..Default::default()
        };
        let mut sink = TableSink::new("prizes", dir.path(), &schema(), &options).unwrap();
        sink.write_batch(&batch()).unwrap();
        sink.finalize().unwrap();

        let text = std::fs::read_to_string(dir.path().join("prizes.tsv")).unwrap();
        assert!(text.starts_with("laureate_id\taward_year"));
    }

    #[test]
    fn parquet_sink_produces_valid_file() {
        let dir = TempDir::new().unwrap();
        let options = SinkOptions {
            format: OutputFormat::Parquet,
            ..Default::default()
        };
        let mut sink = TableSink::new("prizes", dir.path(), &schema(), &options).unwrap();
        sink.write_batch(&batch()).unwrap();
        sink.finalize().unwrap();

        assert!(is_valid_parquet(&dir.path().join("prizes.parquet")));
    }

    #[test]
    fn parquet_sink_rejects_bad_zstd_level() {
        let dir = TempDir::new().unwrap();
        let options = SinkOptions {
            format: OutputFormat::Parquet,
            zstd_level: 99,
            ..Default::default()
        };
        let err = TableSink::new("prizes", dir.path(), &schema(), &options).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn output_format_from_name() {
        assert_eq!(OutputFormat::from_name("CSV"), Some(OutputFormat::Csv));
        assert_eq!(OutputFormat::from_name("parquet"), Some(OutputFormat::Parquet));
        assert_eq!(OutputFormat::from_name("xlsx"), None);
    }

    #[test]
    fn is_valid_parquet_not_parquet() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.parquet");
        std::fs::write(&path, b"this is not parquet").unwrap();
        assert!(!is_valid_parquet(&path));
        assert!(!is_valid_parquet(&dir.path().join("missing.parquet")));
    }

    #[test]
    fn cleanup_tmp_files_removes_only_tmp() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("laureates.csv.tmp"), b"stale").unwrap();
        std::fs::write(dir.path().join("laureates.csv"), b"keep").unwrap();

        cleanup_tmp_files(dir.path()).unwrap();

        assert!(!dir.path().join("laureates.csv.tmp").exists());
        assert!(dir.path().join("laureates.csv").exists());
    }
}
