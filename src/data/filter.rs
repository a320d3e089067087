use super::model::Table;
use crate::error::Result;
use crate::fence::Bounds;

// ---------------------------------------------------------------------------
// Range filter: keep rows strictly inside a column's bounds
// ---------------------------------------------------------------------------

/// Return indices of rows whose `column` value lies strictly inside `bounds`.
///
/// A row is dropped when:
/// * its value is missing (`Null` or NaN) → no comparison holds
/// * its value is not numeric
/// * `value <= lower` or `value >= upper`
pub fn retained_indices(table: &Table, column: &str, bounds: &Bounds) -> Result<Vec<usize>> {
    table.require_column(column)?;
    Ok(table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            rec.get(column)
                .as_f64()
                .is_some_and(|v| bounds.contains(v))
        })
        .map(|(i, _)| i)
        .collect())
}

/// New table holding the rows of `table` that pass [`retained_indices`].
/// The source table is left untouched.
pub fn filter_in_bounds(table: &Table, column: &str, bounds: &Bounds) -> Result<Table> {
    let keep = retained_indices(table, column, bounds)?;
    Ok(table.select(&keep))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Record, Value};
    use crate::error::FenceError;
    use crate::fence::compute_bounds;
    use crate::stats::Quartiles;

    fn minutes(values: &[Value]) -> Table {
        Table::new(
            vec!["id".into(), "minutes".into()],
            values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    Record::from_pairs([("id", Value::from(i as i64)), ("minutes", v.clone())])
                })
                .collect(),
        )
    }

    fn column_of(table: &Table, column: &str) -> Vec<f64> {
        table
            .records
            .iter()
            .filter_map(|r| r.get(column).as_f64())
            .collect()
    }

    #[test]
    fn test_literal_fixture_drops_only_outlier() {
        let vals: Vec<Value> = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0]
            .into_iter()
            .map(Value::from)
            .collect();
        let t = minutes(&vals);
        let b = compute_bounds(&t, "minutes").unwrap();
        let out = filter_in_bounds(&t, "minutes", &b).unwrap();
        assert_eq!(column_of(&out, "minutes"), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        // source untouched
        assert_eq!(t.len(), 6);
    }

    #[test]
    fn test_bounds_are_exclusive() {
        let t = minutes(&[Value::from(2_i64), Value::from(3_i64), Value::from(4_i64)]);
        let b = Bounds::from_quartiles(Quartiles { q1: 2.0, q3: 4.0 }, 0.0);
        assert_eq!(retained_indices(&t, "minutes", &b).unwrap(), vec![1]);
    }

    #[test]
    fn test_missing_and_text_rows_excluded() {
        let t = minutes(&[
            Value::from(3.0),
            Value::Null,
            Value::from(f64::NAN),
            Value::from("n/a"),
            Value::from(3_i64),
        ]);
        let b = Bounds::from_quartiles(Quartiles { q1: 2.0, q3: 4.0 }, 1.5);
        assert_eq!(retained_indices(&t, "minutes", &b).unwrap(), vec![0, 4]);
    }

    #[test]
    fn test_unknown_column() {
        let t = minutes(&[Value::from(1.0)]);
        let b = Bounds::from_quartiles(Quartiles { q1: 0.0, q3: 2.0 }, 1.5);
        assert!(matches!(
            filter_in_bounds(&t, "n_steps", &b),
            Err(FenceError::InvalidColumn { .. })
        ));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let vals: Vec<Value> = [5.0, -40.0, 6.0, 7.0, 8.0, 9.0, 70.0]
            .into_iter()
            .map(Value::from)
            .collect();
        let t = minutes(&vals);
        let b = compute_bounds(&t, "minutes").unwrap();
        let once = filter_in_bounds(&t, "minutes", &b).unwrap();
        let twice = filter_in_bounds(&once, "minutes", &b).unwrap();
        assert_eq!(once, twice);
    }
}
