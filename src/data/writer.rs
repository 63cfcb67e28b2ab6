use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::ser::{Error as _, Serialize, SerializeMap, Serializer};

use super::FileFormat;
use super::model::{Column, Dataset, Value};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Save a dataset to `path`, picking the format from its extension.
///
/// The whole file is encoded in memory first, so an encoding failure never
/// leaves a half-written output behind.
pub fn save_file(dataset: &Dataset, path: &Path) -> Result<()> {
    let format = FileFormat::from_path(path);
    log::debug!("Encoding {} rows as {format:?}", dataset.n_rows());

    let bytes = match format {
        FileFormat::Csv => render_csv(dataset),
        FileFormat::Json => render_json(dataset),
        FileFormat::Parquet => render_parquet(dataset),
    }
    .with_context(|| format!("encoding {}", path.display()))?;

    std::fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
    log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV writer
// ---------------------------------------------------------------------------

/// Header row, then one record per row. No index column is emitted.
fn render_csv(dataset: &Dataset) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(dataset.column_names())
        .context("writing CSV header")?;

    for row in 0..dataset.n_rows() {
        let cells = dataset
            .row(row)
            .with_context(|| format!("row {row} is missing cells"))?;
        writer
            .write_record(cells.iter().map(|v| v.to_field()))
            .with_context(|| format!("writing CSV row {row}"))?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow!("flushing CSV buffer: {}", e.error()))
}

// ---------------------------------------------------------------------------
// JSON writer
// ---------------------------------------------------------------------------

/// One row as a JSON object, keys in column order.
struct Record<'a> {
    dataset: &'a Dataset,
    row: usize,
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let columns = self.dataset.columns();
        let mut map = serializer.serialize_map(Some(columns.len()))?;
        for column in columns {
            let cell = column.values.get(self.row).ok_or_else(|| {
                S::Error::custom(format!("column '{}' has no row {}", column.name, self.row))
            })?;
            map.serialize_entry(&column.name, cell)?;
        }
        map.end()
    }
}

/// Records-oriented array, the layout the JSON loader reads.
/// Non-finite floats become `null`.
fn render_json(dataset: &Dataset) -> anyhow::Result<Vec<u8>> {
    let records: Vec<Record<'_>> = (0..dataset.n_rows())
        .map(|row| Record { dataset, row })
        .collect();
    let mut bytes = serde_json::to_vec_pretty(&records).context("serializing JSON")?;
    bytes.push(b'\n');
    Ok(bytes)
}

// ---------------------------------------------------------------------------
// Parquet writer
// ---------------------------------------------------------------------------

/// Single record batch, one nullable field per column.
fn render_parquet(dataset: &Dataset) -> anyhow::Result<Vec<u8>> {
    let mut fields = Vec::with_capacity(dataset.n_columns());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(dataset.n_columns());

    for column in dataset.columns() {
        let (data_type, array) = column_to_arrow(column);
        fields.push(Field::new(column.name.as_str(), data_type, true));
        arrays.push(array);
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let mut writer =
        ArrowWriter::try_new(Vec::new(), schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.into_inner().context("finishing parquet file")
}

/// Pick the narrowest Arrow type that holds every cell of the column.
///
/// Integers alone stay `Int64`; any float (or an all-null column) widens to
/// `Float64`; booleans alone are `Boolean`; anything mixed with text, or
/// booleans mixed with numbers, is written as `Utf8`.
fn arrow_type(values: &[Value]) -> DataType {
    let (mut ints, mut floats, mut bools, mut strings) = (false, false, false, false);
    for v in values {
        match v {
            Value::Integer(_) => ints = true,
            Value::Float(_) => floats = true,
            Value::Bool(_) => bools = true,
            Value::String(_) => strings = true,
            Value::Null => {}
        }
    }

    if strings || (bools && (ints || floats)) {
        DataType::Utf8
    } else if bools {
        DataType::Boolean
    } else if ints && !floats {
        DataType::Int64
    } else {
        DataType::Float64
    }
}

fn column_to_arrow(column: &Column) -> (DataType, ArrayRef) {
    let data_type = arrow_type(&column.values);
    let values = &column.values;

    let array: ArrayRef = match data_type {
        DataType::Int64 => Arc::new(Int64Array::from(
            values
                .iter()
                .map(|v| match v {
                    Value::Integer(i) => Some(*i),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        DataType::Boolean => Arc::new(BooleanArray::from(
            values
                .iter()
                .map(|v| match v {
                    Value::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        DataType::Utf8 => Arc::new(StringArray::from(
            values
                .iter()
                .map(|v| match v {
                    Value::Null => None,
                    other => Some(other.to_field()),
                })
                .collect::<Vec<_>>(),
        )),
        _ => Arc::new(Float64Array::from(
            values.iter().map(Value::as_f64).collect::<Vec<_>>(),
        )),
    };

    (data_type, array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_file;

    fn sample() -> Dataset {
        Dataset::new(vec![
            Column::new("id", vec![Value::Integer(1), Value::Integer(2)]),
            Column::new(
                "name",
                vec![Value::String("Alice, Jr.".into()), Value::Null],
            ),
            Column::new("salary", vec![Value::Float(1000.0), Value::Float(2050.75)]),
            Column::new("active", vec![Value::Bool(true), Value::Bool(false)]),
        ])
        .unwrap()
    }

    #[test]
    fn csv_output_has_header_and_no_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        save_file(&sample(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "id,name,salary,active\n1,\"Alice, Jr.\",1000.0,True\n2,,2050.75,False\n"
        );
    }

    #[test]
    fn json_output_reloads_to_same_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        save_file(&sample(), &path).unwrap();

        let reloaded = load_file(&path).unwrap();
        assert_eq!(reloaded.column_names(), sample().column_names());
        assert_eq!(reloaded.column("name"), sample().column("name"));
        assert_eq!(reloaded.column("active"), sample().column("active"));
    }

    #[test]
    fn parquet_output_reloads_to_same_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.parquet");
        save_file(&sample(), &path).unwrap();

        let reloaded = load_file(&path).unwrap();
        assert_eq!(reloaded, sample());
    }

    #[test]
    fn misaligned_columns_fail_instead_of_panicking() {
        let mut ds = sample();
        ds.column_mut("salary").unwrap().values.pop();
        let dir = tempfile::tempdir().unwrap();

        for name in ["out.csv", "out.json", "out.parquet"] {
            let path = dir.path().join(name);
            assert!(save_file(&ds, &path).is_err(), "{name} should fail");
            assert!(!path.exists());
        }
    }

    #[test]
    fn arrow_type_widens_mixed_columns() {
        use Value::*;
        assert_eq!(arrow_type(&[Integer(1), Null]), DataType::Int64);
        assert_eq!(arrow_type(&[Integer(1), Float(2.5)]), DataType::Float64);
        assert_eq!(arrow_type(&[Null, Null]), DataType::Float64);
        assert_eq!(arrow_type(&[Bool(true), Null]), DataType::Boolean);
        assert_eq!(arrow_type(&[Bool(true), Integer(1)]), DataType::Utf8);
        assert_eq!(arrow_type(&[String("a".into()), Float(1.0)]), DataType::Utf8);
    }
}
