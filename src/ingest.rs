//! Bridge from Arrow record batches into [`ColumnBatch`].
//!
//! Int64, Utf8, and Binary columns are materialized into the crate's
//! structure-of-arrays layout. Arrow's bit-packed null bitmaps become
//! one-byte-per-row validity arrays (`1 = null`), and a validity array is
//! attached only when the source column actually contains nulls.

use arrow::array::{Array, BinaryArray, Int64Array, StringArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use crate::column::{BytesColumn, Column, ColumnBatch, Int64Column, NULL};
use crate::error::{Result, RowsieveError};

/// Converts an Arrow record batch into a [`ColumnBatch`].
///
/// # Errors
///
/// Returns `IngestError` for column types other than `Int64`, `Utf8`, and
/// `Binary`, or when a column cannot be downcast to its declared type.
pub fn from_record_batch(batch: &RecordBatch) -> Result<ColumnBatch> {
    let mut out = ColumnBatch::new();
    for (field, array) in batch.schema().fields().iter().zip(batch.columns()) {
        let column = match field.data_type() {
            DataType::Int64 => ingest_int64(field.name(), array.as_ref())?,
            DataType::Utf8 => ingest_utf8(field.name(), array.as_ref())?,
            DataType::Binary => ingest_binary(field.name(), array.as_ref())?,
            other => {
                return Err(RowsieveError::IngestError(format!(
                    "unsupported column type {other} for '{}'",
                    field.name()
                )))
            }
        };
        out.add_column(field.name().clone(), column)?;
    }
    Ok(out)
}

fn validity_bytes(array: &dyn Array) -> Option<Vec<u8>> {
    if array.null_count() == 0 {
        return None;
    }
    Some(
        (0..array.len())
            .map(|i| if array.is_null(i) { NULL } else { 0 })
            .collect(),
    )
}

fn downcast_err(name: &str, expected: &str) -> RowsieveError {
    RowsieveError::IngestError(format!("column '{name}' is not a {expected} array"))
}

fn ingest_int64(name: &str, array: &dyn Array) -> Result<Column> {
    let typed = array
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| downcast_err(name, "int64"))?;
    let values = typed.values().to_vec();
    let column = match validity_bytes(array) {
        Some(validity) => Int64Column::with_validity(values, validity)?,
        None => Int64Column::new(values),
    };
    Ok(Column::Int64(column))
}

fn ingest_utf8(name: &str, array: &dyn Array) -> Result<Column> {
    let typed = array
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| downcast_err(name, "utf8"))?;
    ingest_byte_rows(array, |i| typed.value(i).as_bytes())
}

fn ingest_binary(name: &str, array: &dyn Array) -> Result<Column> {
    let typed = array
        .as_any()
        .downcast_ref::<BinaryArray>()
        .ok_or_else(|| downcast_err(name, "binary"))?;
    ingest_byte_rows(array, |i| typed.value(i))
}

/// Rebuilds a byte column row by row. Arrow slices can carry non-zero
/// offsets into a shared buffer, so the data and offsets are rematerialized
/// rather than borrowed.
fn ingest_byte_rows<'a>(array: &dyn Array, value: impl Fn(usize) -> &'a [u8]) -> Result<Column> {
    let mut data = Vec::new();
    let mut offsets = Vec::with_capacity(array.len() + 1);
    offsets.push(0u32);
    for i in 0..array.len() {
        if !array.is_null(i) {
            data.extend_from_slice(value(i));
        }
        data.len()
            .try_into()
            .map(|end| offsets.push(end))
            .map_err(|_| {
                RowsieveError::IngestError("byte column exceeds u32 offset range".to_string())
            })?;
    }
    let column = match validity_bytes(array) {
        Some(validity) => BytesColumn::with_validity(data, offsets, validity)?,
        None => BytesColumn::new(data, offsets)?,
    };
    Ok(Column::Bytes(column))
}
