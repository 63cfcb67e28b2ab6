/// Data layer: core types, loading, and saving.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Column>, row-aligned
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  writer   │  Dataset → file (same layout, no index column)
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod writer;

use std::path::Path;

/// On-disk table format, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Json,
    Parquet,
}

impl FileFormat {
    /// `.json` and `.parquet`/`.pq` are recognised; everything else is
    /// treated as comma-separated text.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "parquet" | "pq" => FileFormat::Parquet,
            "json" => FileFormat::Json,
            _ => FileFormat::Csv,
        }
    }
}
