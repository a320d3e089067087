/// Data layer: table types, loading, filtering and saving.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table   │  schema + Vec<Record>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  keep rows inside a column's bounds → new Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  writer  │  Table → .parquet / .json / .csv
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod writer;
