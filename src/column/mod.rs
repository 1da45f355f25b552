//! Column store: immutable, fixed-length typed arrays with optional validity.
//!
//! Columns hold one physical type each: 64-bit integers, or byte-strings
//! stored as a flat buffer plus an offsets array delimiting each row's span.
//! A validity array, when present, carries one byte per row with the stored
//! convention `1 = null`. A column without a validity array is non-null.
//!
//! All structural invariants (length agreement, monotonic offsets) are
//! validated at construction so the kernel loops can trust them.

use crate::error::{Result, RowsieveError};

/// Validity byte marking an absent (null) value.
pub const NULL: u8 = 1;

/// A fixed-length column of 64-bit integers.
#[derive(Debug, Clone)]
pub struct Int64Column {
    values: Vec<i64>,
    validity: Option<Vec<u8>>,
}

impl Int64Column {
    /// Creates a non-null column from the given values.
    #[must_use]
    pub fn new(values: Vec<i64>) -> Self {
        Self {
            values,
            validity: None,
        }
    }

    /// Creates a column with a validity array (`1 = null`).
    ///
    /// Null slots may hold any placeholder value; they are never read as
    /// values by the kernel.
    ///
    /// # Errors
    ///
    /// Returns `LengthMismatch` if `validity.len() != values.len()`.
    pub fn with_validity(values: Vec<i64>, validity: Vec<u8>) -> Result<Self> {
        if validity.len() != values.len() {
            return Err(RowsieveError::LengthMismatch {
                expected: values.len(),
                actual: validity.len(),
            });
        }
        Ok(Self {
            values,
            validity: Some(validity),
        })
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the column has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The raw value slice.
    #[must_use]
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// The validity bytes, if the column is nullable.
    #[must_use]
    pub fn validity(&self) -> Option<&[u8]> {
        self.validity.as_deref()
    }

    /// Returns true if the value at `row` is null.
    #[must_use]
    pub fn is_null(&self, row: usize) -> bool {
        self.validity.as_ref().is_some_and(|v| v[row] == NULL)
    }
}

/// A fixed-length column of byte-strings.
///
/// Row `i` spans `data[offsets[i]..offsets[i + 1]]`. The offsets array has
/// `len + 1` entries, is monotonically non-decreasing, and its last entry
/// equals the data buffer length.
#[derive(Debug, Clone)]
pub struct BytesColumn {
    data: Vec<u8>,
    offsets: Vec<u32>,
    validity: Option<Vec<u8>>,
}

impl BytesColumn {
    /// Creates a non-null byte-string column.
    ///
    /// # Errors
    ///
    /// Returns `OffsetsError` if the offsets array is empty, non-monotonic,
    /// or does not span the data buffer exactly.
    pub fn new(data: Vec<u8>, offsets: Vec<u32>) -> Result<Self> {
        Self::validate_offsets(&data, &offsets)?;
        Ok(Self {
            data,
            offsets,
            validity: None,
        })
    }

    /// Creates a byte-string column with a validity array (`1 = null`).
    ///
    /// # Errors
    ///
    /// Returns `OffsetsError` for malformed offsets, or `LengthMismatch` if
    /// the validity array does not have one byte per row.
    pub fn with_validity(data: Vec<u8>, offsets: Vec<u32>, validity: Vec<u8>) -> Result<Self> {
        Self::validate_offsets(&data, &offsets)?;
        let rows = offsets.len() - 1;
        if validity.len() != rows {
            return Err(RowsieveError::LengthMismatch {
                expected: rows,
                actual: validity.len(),
            });
        }
        Ok(Self {
            data,
            offsets,
            validity: Some(validity),
        })
    }

    /// Builds a column from string slices, laying out the flat buffer and
    /// offsets. Convenience for tests and examples.
    #[must_use]
    pub fn from_strs(rows: &[&str]) -> Self {
        let mut data = Vec::new();
        let mut offsets = Vec::with_capacity(rows.len() + 1);
        offsets.push(0u32);
        for row in rows {
            data.extend_from_slice(row.as_bytes());
            offsets.push(data.len() as u32);
        }
        Self {
            data,
            offsets,
            validity: None,
        }
    }

    fn validate_offsets(data: &[u8], offsets: &[u32]) -> Result<()> {
        if offsets.is_empty() {
            return Err(RowsieveError::OffsetsError(
                "offsets array must have at least one entry".to_string(),
            ));
        }
        if offsets.windows(2).any(|w| w[0] > w[1]) {
            return Err(RowsieveError::OffsetsError(
                "offsets must be monotonically non-decreasing".to_string(),
            ));
        }
        let last = *offsets.last().unwrap_or(&0) as usize;
        if last != data.len() {
            return Err(RowsieveError::OffsetsError(format!(
                "last offset {} does not match buffer length {}",
                last,
                data.len()
            )));
        }
        Ok(())
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Returns true if the column has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.len() <= 1
    }

    /// The byte-string at `row`.
    #[must_use]
    pub fn value(&self, row: usize) -> &[u8] {
        &self.data[self.offsets[row] as usize..self.offsets[row + 1] as usize]
    }

    /// The flat data buffer.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The offsets array (`len + 1` entries).
    #[must_use]
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    /// The validity bytes, if the column is nullable.
    #[must_use]
    pub fn validity(&self) -> Option<&[u8]> {
        self.validity.as_deref()
    }

    /// Returns true if the value at `row` is null.
    #[must_use]
    pub fn is_null(&self, row: usize) -> bool {
        self.validity
            .as_ref()
            .is_some_and(|v| v[row] == NULL)
    }
}

/// Type-tagged column storage.
#[derive(Debug, Clone)]
pub enum Column {
    /// 64-bit integer column.
    Int64(Int64Column),
    /// Byte-string column.
    Bytes(BytesColumn),
}

impl Column {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Int64(c) => c.len(),
            Self::Bytes(c) => c.len(),
        }
    }

    /// Returns true if the column has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The validity bytes, if the column is nullable.
    #[must_use]
    pub fn validity(&self) -> Option<&[u8]> {
        match self {
            Self::Int64(c) => c.validity(),
            Self::Bytes(c) => c.validity(),
        }
    }

    /// Physical type name, for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int64(_) => "int64",
            Self::Bytes(_) => "bytes",
        }
    }
}

/// A batch of named columns sharing one row count.
///
/// Immutable for the duration of an evaluation call. All columns must agree
/// on length; this is checked when columns are added, not inside the kernel.
#[derive(Debug, Clone, Default)]
pub struct ColumnBatch {
    row_count: usize,
    columns: Vec<(String, Column)>,
}

impl ColumnBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows shared by every column.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Adds a named column. The first column fixes the batch row count.
    ///
    /// # Errors
    ///
    /// Returns `LengthMismatch` if the column's length disagrees with the
    /// batch row count.
    pub fn add_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let len = column.len();
        if !self.columns.is_empty() && len != self.row_count {
            return Err(RowsieveError::LengthMismatch {
                expected: self.row_count,
                actual: len,
            });
        }
        if self.columns.is_empty() {
            self.row_count = len;
        }
        self.columns.push((name.into(), column));
        Ok(())
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// Returns the column at `index`.
    #[must_use]
    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index).map(|(_, c)| c)
    }

    /// Column names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int64_column_basic() {
        let col = Int64Column::new(vec![1, 2, 3]);
        assert_eq!(col.len(), 3);
        assert_eq!(col.values(), &[1, 2, 3]);
        assert!(col.validity().is_none());
        assert!(!col.is_null(1));
    }

    #[test]
    fn test_int64_validity_length_checked() {
        let result = Int64Column::with_validity(vec![1, 2, 3], vec![0, 1]);
        assert!(matches!(
            result,
            Err(RowsieveError::LengthMismatch {
                expected: 3,
                actual: 2
            })
        ));

        let col = Int64Column::with_validity(vec![1, 2, 3], vec![0, NULL, 0]).unwrap();
        assert!(col.is_null(1));
        assert!(!col.is_null(2));
    }

    #[test]
    fn test_bytes_column_spans() {
        let col = BytesColumn::from_strs(&["1993-12-31", "1994-06-01", "1995-02-01"]);
        assert_eq!(col.len(), 3);
        assert_eq!(col.value(0), b"1993-12-31");
        assert_eq!(col.value(2), b"1995-02-01");
        assert_eq!(col.offsets(), &[0, 10, 20, 30]);
    }

    #[test]
    fn test_bytes_column_rejects_bad_offsets() {
        // Non-monotonic.
        assert!(BytesColumn::new(vec![1, 2, 3], vec![0, 2, 1, 3]).is_err());
        // Last offset does not span the buffer.
        assert!(BytesColumn::new(vec![1, 2, 3], vec![0, 1, 2]).is_err());
        // Empty offsets.
        assert!(BytesColumn::new(vec![], vec![]).is_err());
    }

    #[test]
    fn test_bytes_column_empty_rows() {
        let col = BytesColumn::from_strs(&["", "ab", ""]);
        assert_eq!(col.len(), 3);
        assert_eq!(col.value(0), b"");
        assert_eq!(col.value(1), b"ab");
        assert_eq!(col.value(2), b"");
    }

    #[test]
    fn test_batch_length_agreement() {
        let mut batch = ColumnBatch::new();
        batch
            .add_column("a", Column::Int64(Int64Column::new(vec![1, 2, 3])))
            .unwrap();
        assert_eq!(batch.row_count(), 3);

        let short = Column::Int64(Int64Column::new(vec![1]));
        assert!(batch.add_column("b", short).is_err());

        batch
            .add_column("b", Column::Bytes(BytesColumn::from_strs(&["x", "y", "z"])))
            .unwrap();
        assert_eq!(batch.column_count(), 2);
        assert!(batch.column("b").is_some());
        assert!(batch.column("missing").is_none());
    }
}
