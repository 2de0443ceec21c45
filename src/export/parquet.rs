// src/export/parquet.rs

use anyhow::{Context, Result};
use arrow::{
    array::{
        Array, ArrayRef, Float64Array, Float64Builder, Int64Array, Int64Builder, StringArray,
        StringBuilder,
    },
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use ::parquet::arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter};
use ::parquet::basic::Compression;
use ::parquet::file::properties::WriterProperties;
use std::{fs::File, path::Path, sync::Arc};
use tracing::{debug, info};

use crate::normalize::{Column, ColumnKind, RecordSet, Value};

fn arrow_type(kind: ColumnKind) -> DataType {
    match kind {
        ColumnKind::Text => DataType::Utf8,
        ColumnKind::Int => DataType::Int64,
        ColumnKind::Float => DataType::Float64,
    }
}

fn build_array(col: &Column) -> ArrayRef {
    match col.kind {
        ColumnKind::Text => {
            let mut b = StringBuilder::new();
            for v in &col.values {
                b.append_option(v.as_str());
            }
            Arc::new(b.finish())
        }
        ColumnKind::Int => {
            let mut b = Int64Builder::new();
            for v in &col.values {
                b.append_option(match v {
                    Value::Int(i) => Some(*i),
                    _ => None,
                });
            }
            Arc::new(b.finish())
        }
        ColumnKind::Float => {
            let mut b = Float64Builder::new();
            for v in &col.values {
                b.append_option(v.as_f64());
            }
            Arc::new(b.finish())
        }
    }
}

/// Build an Arrow batch from the record set. Missing values become nulls.
pub fn to_record_batch(records: &RecordSet) -> Result<RecordBatch> {
    let fields: Vec<Field> = records
        .columns()
        .iter()
        .map(|c| Field::new(&c.name, arrow_type(c.kind), /* nullable = */ true))
        .collect();
    let arrays: Vec<ArrayRef> = records.columns().iter().map(build_array).collect();
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).context("building record batch")
}

/// Write the typed record set to a Snappy-compressed Parquet file.
pub fn write_record_set<P: AsRef<Path>>(path: P, records: &RecordSet) -> Result<()> {
    let path = path.as_ref();
    let batch = to_record_batch(records)?;
    let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .context("creating Arrow writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing Parquet writer")?;
    info!(path = %path.display(), rows = batch.num_rows(), "parquet written");
    Ok(())
}

/// Read a file written by [`write_record_set`] back into a record set.
/// Roles are not resolved; call [`RecordSet::normalized`] for that.
pub fn read_record_set<P: AsRef<Path>>(path: P) -> Result<RecordSet> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {:?}", path))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("reading Parquet metadata from {:?}", path))?
        .build()
        .context("building Parquet reader")?;

    let mut columns: Vec<Column> = Vec::new();
    for batch in reader {
        let batch = batch.context("reading record batch")?;
        if columns.is_empty() {
            columns = batch
                .schema()
                .fields()
                .iter()
                .map(|f| -> Result<Column> {
                    let kind = match f.data_type() {
                        DataType::Utf8 => Ok(ColumnKind::Text),
                        DataType::Int64 => Ok(ColumnKind::Int),
                        DataType::Float64 => Ok(ColumnKind::Float),
                        other => Err(anyhow::anyhow!(
                            "unsupported type {:?} for column {}",
                            other,
                            f.name()
                        )),
                    }?;
                    Ok(Column {
                        name: f.name().clone(),
                        kind,
                        values: Vec::new(),
                    })
                })
                .collect::<Result<_>>()?;
        }

        for (col, arr) in columns.iter_mut().zip(batch.columns()) {
            append_values(col, arr.as_ref())?;
        }
        debug!(rows = batch.num_rows(), "batch read");
    }

    Ok(RecordSet::from_columns(columns))
}

fn append_values(col: &mut Column, arr: &dyn Array) -> Result<()> {
    let mismatch = || anyhow::anyhow!("column {} changed type between batches", col.name);
    match col.kind {
        ColumnKind::Text => {
            let a = arr
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(mismatch)?;
            let vals: Vec<Value> = a
                .iter()
                .map(|v| v.map_or(Value::Missing, |s| Value::Text(s.to_string())))
                .collect();
            col.values.extend(vals);
        }
        ColumnKind::Int => {
            let a = arr
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(mismatch)?;
            let vals: Vec<Value> = a.iter().map(|v| v.map_or(Value::Missing, Value::Int)).collect();
            col.values.extend(vals);
        }
        ColumnKind::Float => {
            let a = arr
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(mismatch)?;
            let vals: Vec<Value> = a
                .iter()
                .map(|v| v.map_or(Value::Missing, Value::Float))
                .collect();
            col.values.extend(vals);
        }
    }
    Ok(())
}
