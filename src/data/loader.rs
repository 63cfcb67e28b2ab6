use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use anyhow::{Context, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::FileFormat;
use super::model::{Column, Dataset, Value};
use crate::error::{MaskError, Result};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension (see [`FileFormat`]).
///
/// A path that does not exist (or is a directory) is `InputNotFound`; a
/// file without a single data row (zero bytes, blank lines, header only,
/// `[]`) is `EmptyInput`.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(MaskError::InputNotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("opening {}", path.display()))
                .into());
        }
    };

    let meta = file.metadata().context("reading file metadata")?;
    if meta.is_dir() {
        return Err(MaskError::InputNotFound(path.to_path_buf()));
    }
    if meta.len() == 0 {
        return Err(MaskError::EmptyInput(path.to_path_buf()));
    }

    let format = FileFormat::from_path(path);
    log::debug!("Loading {} as {format:?}", path.display());

    let dataset = match format {
        FileFormat::Csv => load_csv(BufReader::new(file)),
        FileFormat::Json => load_json(BufReader::new(file)),
        FileFormat::Parquet => load_parquet(file),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    if dataset.n_columns() == 0 || dataset.is_empty() {
        return Err(MaskError::EmptyInput(path.to_path_buf()));
    }

    log::debug!(
        "Loaded {} rows x {} columns",
        dataset.n_rows(),
        dataset.n_columns()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per row.
/// Rows shorter than the header are padded with nulls; longer rows are an
/// error. Blank lines are skipped.
fn load_csv<R: Read>(rdr: R) -> anyhow::Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let raw_headers = reader.headers().context("reading CSV headers")?.clone();

    if raw_headers.iter().all(|h| h.trim().is_empty()) {
        return Dataset::new(Vec::new());
    }
    let headers = dedup_headers(raw_headers.iter());

    let mut values: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        if record.len() > headers.len() {
            bail!(
                "CSV row {row_no}: expected {} fields, saw {}",
                headers.len(),
                record.len()
            );
        }

        for (col_idx, column) in values.iter_mut().enumerate() {
            column.push(record.get(col_idx).map_or(Value::Null, Value::parse_field));
        }
    }

    let columns = headers
        .into_iter()
        .zip(values)
        .map(|(name, vals)| Column::new(name, vals))
        .collect();
    Dataset::new(columns)
}

/// Make header names unique: the second `a` becomes `a.1`, the third `a.2`.
fn dedup_headers<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for name in names {
        let mut candidate = name.to_string();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{name}.{suffix}");
            suffix += 1;
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "id": 1, "name": "Alice", "salary": 52000 },
///   { "id": 2, "name": "Bob",   "salary": 61000.5 }
/// ]
/// ```
///
/// Columns appear in first-seen key order; keys missing from a record are
/// null for that row.
fn load_json<R: Read>(mut rdr: R) -> anyhow::Result<Dataset> {
    let mut text = String::new();
    rdr.read_to_string(&mut text).context("reading JSON file")?;
    if text.trim().is_empty() {
        return Dataset::new(Vec::new());
    }

    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<Column> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        for (key, val) in obj {
            let col_idx = *index.entry(key.clone()).or_insert_with(|| {
                columns.push(Column::new(key.clone(), vec![Value::Null; i]));
                columns.len() - 1
            });
            columns[col_idx].values.push(Value::from_json(val));
        }

        for column in &mut columns {
            if column.values.len() < i + 1 {
                column.values.push(Value::Null);
            }
        }
    }

    Dataset::new(columns)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file of scalar columns.
///
/// Integer columns (signed, and unsigned up to 32 bits) load as integers,
/// `UInt64` and floating point columns as floats, plus booleans and strings.
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(file: File) -> anyhow::Result<Dataset> {
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<Column> = schema
        .fields()
        .iter()
        .map(|f| Column::new(f.name().clone(), Vec::new()))
        .collect();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, column) in columns.iter_mut().enumerate() {
            append_arrow_values(batch.column(col_idx), &mut column.values)
                .with_context(|| format!("column '{}'", column.name))?;
        }
    }

    Dataset::new(columns)
}

// -- Parquet / Arrow helpers --

/// Append every cell of an Arrow array to `out`, nulls as [`Value::Null`].
fn append_arrow_values(col: &ArrayRef, out: &mut Vec<Value>) -> anyhow::Result<()> {
    match col.data_type() {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => {
            let ints = cast(col, &DataType::Int64).context("casting to Int64")?;
            out.extend(
                ints.as_primitive::<Int64Type>()
                    .iter()
                    .map(|v| v.map_or(Value::Null, Value::Integer)),
            );
        }
        DataType::UInt64 | DataType::Float16 | DataType::Float32 | DataType::Float64 => {
            let floats = cast(col, &DataType::Float64).context("casting to Float64")?;
            out.extend(
                floats
                    .as_primitive::<Float64Type>()
                    .iter()
                    .map(|v| v.map_or(Value::Null, Value::Float)),
            );
        }
        DataType::Boolean => {
            out.extend(
                col.as_boolean()
                    .iter()
                    .map(|v| v.map_or(Value::Null, Value::Bool)),
            );
        }
        DataType::Utf8 => {
            out.extend(
                col.as_string::<i32>()
                    .iter()
                    .map(|v| v.map_or(Value::Null, |s| Value::String(s.to_string()))),
            );
        }
        DataType::LargeUtf8 => {
            out.extend(
                col.as_string::<i64>()
                    .iter()
                    .map(|v| v.map_or(Value::Null, |s| Value::String(s.to_string()))),
            );
        }
        other => bail!("unsupported column type {other:?}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn csv_cells_are_typed_per_cell() {
        let f = write_tmp(".csv", "id,name,salary\n1,Alice,1000\n2,,2000.5\n");
        let ds = load_file(f.path()).unwrap();

        assert_eq!(ds.column_names(), vec!["id", "name", "salary"]);
        assert_eq!(ds.n_rows(), 2);
        let salary = ds.column("salary").unwrap();
        assert_eq!(salary.values, vec![Value::Integer(1000), Value::Float(2000.5)]);
        let name = ds.column("name").unwrap();
        assert_eq!(name.values, vec![Value::String("Alice".into()), Value::Null]);
    }

    #[test]
    fn csv_short_rows_are_padded() {
        let f = write_tmp(".csv", "a,b,c\n1,2\n");
        let ds = load_file(f.path()).unwrap();
        assert_eq!(ds.column("c").unwrap().values, vec![Value::Null]);
    }

    #[test]
    fn csv_long_rows_are_rejected() {
        let f = write_tmp(".csv", "a,b\n1,2,3\n");
        let err = load_file(f.path()).unwrap_err();
        assert!(matches!(err, MaskError::Unexpected(_)));
        assert!(err.to_string().contains("expected 2 fields, saw 3"));
    }

    #[test]
    fn csv_duplicate_headers_get_suffixes() {
        let f = write_tmp(".csv", "a,a,b,a\n1,2,3,4\n");
        let ds = load_file(f.path()).unwrap();
        assert_eq!(ds.column_names(), vec!["a", "a.1", "b", "a.2"]);
    }

    #[test]
    fn header_only_csv_is_empty_input() {
        let f = write_tmp(".csv", "id,salary\n");
        assert!(matches!(load_file(f.path()), Err(MaskError::EmptyInput(_))));

        let f = write_tmp(".csv", "id,salary");
        assert!(matches!(load_file(f.path()), Err(MaskError::EmptyInput(_))));
    }

    #[test]
    fn csv_numbers_after_comma_space_are_numeric() {
        let f = write_tmp(".csv", "id, name, salary\n1, Alice, 1000\n2, Bob, 2000.5\n");
        let ds = load_file(f.path()).unwrap();

        assert_eq!(ds.column_names(), vec!["id", " name", " salary"]);
        assert_eq!(
            ds.column(" salary").unwrap().values,
            vec![Value::Integer(1000), Value::Float(2000.5)]
        );
        assert_eq!(
            ds.column(" name").unwrap().values,
            vec![Value::String(" Alice".into()), Value::String(" Bob".into())]
        );
    }

    #[test]
    fn missing_file_is_input_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, MaskError::InputNotFound(_)));
    }

    #[test]
    fn directory_is_input_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(dir.path()).unwrap_err();
        assert!(matches!(err, MaskError::InputNotFound(_)));
    }

    #[test]
    fn zero_byte_and_blank_files_are_empty_input() {
        let f = write_tmp(".csv", "");
        assert!(matches!(load_file(f.path()), Err(MaskError::EmptyInput(_))));

        let f = write_tmp(".csv", "\n\n");
        assert!(matches!(load_file(f.path()), Err(MaskError::EmptyInput(_))));

        let f = write_tmp(".json", "  \n");
        assert!(matches!(load_file(f.path()), Err(MaskError::EmptyInput(_))));

        let f = write_tmp(".json", "[]");
        assert!(matches!(load_file(f.path()), Err(MaskError::EmptyInput(_))));
    }

    #[test]
    fn json_records_keep_key_order_and_fill_gaps() {
        let f = write_tmp(
            ".json",
            r#"[{"id": 1, "salary": 1000}, {"salary": 2.5, "id": 2, "note": "x"}]"#,
        );
        let ds = load_file(f.path()).unwrap();

        assert_eq!(ds.column_names(), vec!["id", "salary", "note"]);
        assert_eq!(
            ds.column("note").unwrap().values,
            vec![Value::Null, Value::String("x".into())]
        );
        assert_eq!(
            ds.column("salary").unwrap().values,
            vec![Value::Integer(1000), Value::Float(2.5)]
        );
    }

    #[test]
    fn json_non_object_row_is_rejected() {
        let f = write_tmp(".json", "[1, 2]");
        let err = load_file(f.path()).unwrap_err();
        assert!(err.to_string().contains("Row 0 is not a JSON object"));
    }
}
