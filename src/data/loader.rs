use std::path::Path;
use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Record, Table, Value};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – flat Parquet file with scalar columns (recommended)
/// * `.json`    – `[{ "minutes": 40, "n_steps": 7, ... }, ...]`
/// * `.csv`     – header row followed by one row per record
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} rows with columns {:?} from {}",
        table.len(),
        table.columns,
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "name": "soup", "minutes": 40, "n_steps": 7, "n_ingredients": 9 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

pub(crate) fn parse_json(text: &str) -> Result<Table> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut record = Record::default();
        for (key, val) in obj {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
            record.fields.insert(key.clone(), json_to_value(val));
        }
        records.push(record);
    }

    Ok(Table::new(columns, records))
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout:  header row with column names, one record per line.
/// Cell types are guessed per cell, see [`guess_value_type`].
fn load_csv(path: &Path) -> Result<Table> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

pub(crate) fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Table> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;

        let mut record = Record::default();
        for (col_idx, value) in row.iter().enumerate() {
            let col_name = headers
                .get(col_idx)
                .with_context(|| format!("CSV row {row_no}: more fields than headers"))?;
            record
                .fields
                .insert(col_name.clone(), guess_value_type(value));
        }
        records.push(record);
    }

    Ok(Table::new(headers, records))
}

/// Markers Pandas' `read_csv` treats as missing by default (subset).
const NA_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

fn guess_value_type(s: &str) -> Value {
    let s = s.trim();
    if NA_MARKERS.contains(&s) {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    if s == "true" || s == "false" {
        return Value::Bool(s == "true");
    }
    Value::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with scalar columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Column order follows the file schema.
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let named: Vec<(&String, ArrayRef)> = schema
            .fields()
            .iter()
            .map(|f| f.name())
            .zip(batch.columns())
            .map(|(name, col)| {
                normalize_column(col)
                    .with_context(|| format!("converting column '{name}'"))
                    .map(|col| (name, col))
            })
            .collect::<Result<_>>()?;

        for row in 0..batch.num_rows() {
            let mut record = Record::default();
            for (name, col) in &named {
                let value = extract_value(col, row)
                    .with_context(|| format!("Row {row}: failed to read '{name}'"))?;
                record.fields.insert((*name).clone(), value);
            }
            records.push(record);
        }
    }

    Ok(Table::new(columns, records))
}

// -- Parquet / Arrow helpers --

/// Widen the narrower integer types to Int64 and the remaining numeric types
/// to Float64 so [`extract_value`] only has to know a handful of layouts.
/// Anything else (dates, timestamps, dictionaries, ...) is left as is.
fn normalize_column(col: &ArrayRef) -> Result<ArrayRef> {
    let target = match col.data_type() {
        DataType::Int8
        | DataType::Int16
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => DataType::Int64,
        DataType::UInt64
        | DataType::Float16
        | DataType::Decimal128(_, _)
        | DataType::Decimal256(_, _) => DataType::Float64,
        _ => return Ok(col.clone()),
    };
    Ok(cast(col, &target)?)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &ArrayRef, row: usize) -> Result<Value> {
    if col.is_null(row) {
        return Ok(Value::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => Value::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Value::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => Value::Integer(downcast::<Int32Array>(col)?.value(row) as i64),
        DataType::Int64 => Value::Integer(downcast::<Int64Array>(col)?.value(row)),
        DataType::Float32 => Value::Float(downcast::<Float32Array>(col)?.value(row) as f64),
        DataType::Float64 => Value::Float(downcast::<Float64Array>(col)?.value(row)),
        DataType::Boolean => Value::Bool(downcast::<BooleanArray>(col)?.value(row)),
        // rendered the way Arrow prints it, e.g. `2008-10-27` for Date32
        _ => Value::String(array_value_to_string(col, row)?),
    };
    Ok(value)
}

fn downcast<T: Array + 'static>(col: &ArrayRef) -> Result<&T> {
    col.as_any()
        .downcast_ref::<T>()
        .with_context(|| format!("unexpected array layout for {:?}", col.data_type()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_value_type() {
        assert_eq!(guess_value_type(""), Value::Null);
        assert_eq!(guess_value_type("NaN"), Value::Null);
        assert_eq!(guess_value_type("42"), Value::Integer(42));
        assert_eq!(guess_value_type("4.5"), Value::Float(4.5));
        assert_eq!(guess_value_type("true"), Value::Bool(true));
        assert_eq!(guess_value_type("soup"), Value::String("soup".into()));
    }

    #[test]
    fn test_read_csv_keeps_header_order() {
        let data = "name,minutes,n_steps\nsoup,40,7\nstew,,12\n";
        let table = read_csv(csv::Reader::from_reader(data.as_bytes())).unwrap();
        assert_eq!(table.columns, vec!["name", "minutes", "n_steps"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].get("minutes"), &Value::Integer(40));
        assert!(table.records[1].get("minutes").is_missing());
    }

    #[test]
    fn test_parse_json_records() {
        let table = parse_json(
            r#"[{"minutes": 40, "name": "soup"}, {"minutes": 2.5, "n_steps": null}]"#,
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.has_column("n_steps"));
        assert_eq!(table.records[1].get("minutes"), &Value::Float(2.5));
        assert!(table.records[0].get("n_steps").is_missing());
    }

    #[test]
    fn test_parse_json_rejects_non_array() {
        assert!(parse_json(r#"{"minutes": 1}"#).is_err());
        assert!(parse_json(r#"[1, 2]"#).is_err());
    }

    #[test]
    fn test_parquet_other_column_types() {
        use std::sync::Arc;

        use arrow::array::{Date32Array, StringArray, UInt16Array};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("name", DataType::Utf8, false),
            Field::new("n_steps", DataType::UInt16, true),
            Field::new("submitted", DataType::Date32, true),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec!["soup", "stew"])),
            Arc::new(UInt16Array::from(vec![Some(7), None])),
            // days since the epoch
            Arc::new(Date32Array::from(vec![Some(14179), Some(0)])),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipes.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.columns, vec!["name", "n_steps", "submitted"]);
        assert_eq!(table.records[0].get("n_steps"), &Value::Integer(7));
        assert!(table.records[1].get("n_steps").is_missing());
        assert_eq!(
            table.records[0].get("submitted"),
            &Value::String("2008-10-27".into())
        );
        assert_eq!(
            table.records[1].get("submitted"),
            &Value::String("1970-01-01".into())
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_file(Path::new("recipes.xlsx")).unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported file extension"));
    }
}
