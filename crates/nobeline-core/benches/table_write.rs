use std::sync::Arc;

use arrow::array::{Int32Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use nobeline_core::{OutputFormat, SinkOptions, TableSink};

fn synthetic_batch(n: usize) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("laureate_id", DataType::Utf8, false),
        Field::new("award_year", DataType::Int32, true),
        Field::new("motivation", DataType::Utf8, true),
    ]));
    let ids = StringArray::from((0..n).map(|i| i.to_string()).collect::<Vec<_>>());
    let years = Int32Array::from((0..n).map(|i| 1901 + (i % 124) as i32).collect::<Vec<_>>());
    let motivations = StringArray::from(
        (0..n)
            .map(|i| format!("for discovery number {i}, \"quoted\""))
            .collect::<Vec<_>>(),
    );
    RecordBatch::try_new(
        schema,
        vec![Arc::new(ids), Arc::new(years), Arc::new(motivations)],
    )
    .unwrap()
}

#[divan::bench(args = ["csv", "parquet"])]
fn table_write(bencher: divan::Bencher, format: &str) {
    let batch = synthetic_batch(8192);
    let schema = batch.schema();
    let dir = tempfile::tempdir().unwrap();
    let options = SinkOptions {
        format: OutputFormat::from_name(format).unwrap(),
        ..Default::default()
    };
    bencher.bench(|| {
        let mut sink = TableSink::new("bench", dir.path(), schema.as_ref(), &options).unwrap();
        sink.write_batch(&batch).unwrap();
        sink.finalize().unwrap();
    });
}

fn main() {
    divan::main();
}
