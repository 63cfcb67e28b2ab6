use std::fmt;

use anyhow::{Result, bail};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Value – a single cell of a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the common DataFrame dtypes.
/// Serializes untagged, so a row maps straight onto a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Bool(bool),
    String(String),
    /// Missing cell (empty CSV field, JSON `null`, Parquet null).
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl Value {
    /// Infer the type of a raw text field.
    ///
    /// Order of attempts: empty → `Null`, `i64`, `f64`, boolean literal,
    /// otherwise the text itself.
    /// Numbers and booleans may be padded with whitespace (`1, 1000`);
    /// text keeps its raw form.
    pub fn parse_field(s: &str) -> Value {
        if s.is_empty() {
            return Value::Null;
        }
        let trimmed = s.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Value::Float(f);
        }
        match trimmed {
            "true" | "True" | "TRUE" => Value::Bool(true),
            "false" | "False" | "FALSE" => Value::Bool(false),
            _ => Value::String(s.to_string()),
        }
    }

    /// Convert one cell of a records-oriented JSON document.
    /// Nested arrays and objects are kept as their JSON text.
    pub fn from_json(val: &serde_json::Value) -> Value {
        use serde_json::Value as Json;
        match val {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => n
                .as_i64()
                .map(Value::Integer)
                .or_else(|| n.as_f64().map(Value::Float))
                .unwrap_or_else(|| Value::String(n.to_string())),
            Json::String(s) => Value::String(s.clone()),
            nested => Value::String(nested.to_string()),
        }
    }

    /// Render the value as a delimited-text field.
    ///
    /// Floats keep full round-trip precision and always carry a decimal point
    /// (`1000.0`), NaN and `Null` become an empty field.
    pub fn to_field(&self) -> String {
        match self {
            Value::Integer(i) => i.to_string(),
            Value::Float(v) if v.is_nan() => String::new(),
            Value::Float(v) if *v == f64::INFINITY => "inf".to_string(),
            Value::Float(v) if *v == f64::NEG_INFINITY => "-inf".to_string(),
            Value::Float(v) => format!("{v:?}"),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
        }
    }

    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Integer or floating point cell.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Column – one named column of the table
// ---------------------------------------------------------------------------

/// A named column; `values[i]` belongs to row `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// An ordered collection of named, row-aligned columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    /// Build a dataset, checking that every column has the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let n_rows = first.len();
            for col in &columns[1..] {
                if col.len() != n_rows {
                    bail!(
                        "column '{}' has {} rows but column '{}' has {}",
                        col.name,
                        col.len(),
                        first.name,
                        n_rows
                    );
                }
            }
        }
        Ok(Dataset { columns })
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Crate-internal so outside callers cannot resize a single column.
    pub(crate) fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Number of rows (0 for a dataset without columns).
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    /// Cells of row `i` in column order, `None` past the end or when a
    /// column does not reach row `i`.
    pub fn row(&self, i: usize) -> Option<Vec<&Value>> {
        if i >= self.n_rows() {
            return None;
        }
        self.columns.iter().map(|c| c.values.get(i)).collect()
    }
}
