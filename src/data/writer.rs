use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::{Map, Number, Value as JsonValue};

use super::model::{Table, Value};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Save a table to a file.  Dispatch by extension, same formats as the loader.
pub fn save_file(table: &Table, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => save_parquet(table, path),
        "json" => save_json(table, path),
        "csv" => save_csv(table, path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("saving {}", path.display()))?;

    log::info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV writer
// ---------------------------------------------------------------------------

/// Columns in schema order; missing cells are written empty.
fn save_csv(table: &Table, path: &Path) -> Result<()> {
    let writer = csv::Writer::from_path(path).context("creating CSV")?;
    write_csv(table, writer)
}

pub(crate) fn write_csv<W: std::io::Write>(table: &Table, mut writer: csv::Writer<W>) -> Result<()> {
    writer
        .write_record(&table.columns)
        .context("writing CSV header")?;
    for (row_no, rec) in table.records.iter().enumerate() {
        writer
            .write_record(table.columns.iter().map(|c| cell_text(rec.get(c))))
            .with_context(|| format!("writing CSV row {row_no}"))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

/// Floats keep a fractional part (`40.0`, not `40`) so they reload as floats.
fn cell_text(value: &Value) -> String {
    match value {
        v if v.is_missing() => String::new(),
        Value::Float(f) => format!("{f:?}"),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// JSON writer
// ---------------------------------------------------------------------------

/// Records-oriented array, the shape the loader expects.
fn save_json(table: &Table, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).context("creating JSON file")?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &to_json(table))
        .context("writing JSON")?;
    Ok(())
}

pub(crate) fn to_json(table: &Table) -> JsonValue {
    JsonValue::Array(
        table
            .records
            .iter()
            .map(|rec| {
                let obj: Map<String, JsonValue> = table
                    .columns
                    .iter()
                    .map(|c| (c.clone(), value_to_json(rec.get(c))))
                    .collect();
                JsonValue::Object(obj)
            })
            .collect(),
    )
}

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Integer(i) => JsonValue::Number((*i).into()),
        // NaN has no JSON representation
        Value::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Null => JsonValue::Null,
    }
}

// ---------------------------------------------------------------------------
// Parquet writer
// ---------------------------------------------------------------------------

/// Arrow type chosen for a column from the cells it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int64,
    Float64,
    Boolean,
    Utf8,
}

impl ColumnKind {
    fn data_type(self) -> DataType {
        match self {
            ColumnKind::Int64 => DataType::Int64,
            ColumnKind::Float64 => DataType::Float64,
            ColumnKind::Boolean => DataType::Boolean,
            ColumnKind::Utf8 => DataType::Utf8,
        }
    }
}

/// All integers → Int64, any float mixed with integers → Float64, all bools
/// → Boolean, anything else (including an all-null column) → Utf8.
fn infer_kind(table: &Table, column: &str) -> ColumnKind {
    let mut kind: Option<ColumnKind> = None;
    for rec in &table.records {
        let cell = match rec.get(column) {
            Value::Null => continue,
            Value::Integer(_) => ColumnKind::Int64,
            Value::Float(_) => ColumnKind::Float64,
            Value::Bool(_) => ColumnKind::Boolean,
            Value::String(_) => return ColumnKind::Utf8,
        };
        kind = Some(match (kind, cell) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(ColumnKind::Int64), ColumnKind::Float64)
            | (Some(ColumnKind::Float64), ColumnKind::Int64) => ColumnKind::Float64,
            _ => return ColumnKind::Utf8,
        });
    }
    kind.unwrap_or(ColumnKind::Utf8)
}

fn build_array(table: &Table, column: &str, kind: ColumnKind) -> ArrayRef {
    let cells = table.records.iter().map(|r| r.get(column));
    match kind {
        ColumnKind::Int64 => {
            let mut b = Int64Builder::with_capacity(table.len());
            for v in cells {
                match v {
                    Value::Integer(i) => b.append_value(*i),
                    _ => b.append_null(),
                }
            }
            Arc::new(b.finish())
        }
        ColumnKind::Float64 => {
            let mut b = Float64Builder::with_capacity(table.len());
            for v in cells {
                match v.as_f64() {
                    Some(f) => b.append_value(f),
                    None => b.append_null(),
                }
            }
            Arc::new(b.finish())
        }
        ColumnKind::Boolean => {
            let mut b = BooleanBuilder::with_capacity(table.len());
            for v in cells {
                match v {
                    Value::Bool(x) => b.append_value(*x),
                    _ => b.append_null(),
                }
            }
            Arc::new(b.finish())
        }
        ColumnKind::Utf8 => {
            let mut b = StringBuilder::new();
            for v in cells {
                match v {
                    Value::Null => b.append_null(),
                    other => b.append_value(other.to_string()),
                }
            }
            Arc::new(b.finish())
        }
    }
}

fn save_parquet(table: &Table, path: &Path) -> Result<()> {
    let mut fields = Vec::with_capacity(table.columns.len());
    let mut arrays = Vec::with_capacity(table.columns.len());
    for col in &table.columns {
        let kind = infer_kind(table, col);
        fields.push(Field::new(col, kind.data_type(), true));
        arrays.push(build_array(table, col, kind));
    }
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}
