use iqr_fence::{
    compute_bounds_with, filter_in_bounds, FenceError, Pipeline, Record, Table, Value,
};
use proptest::prelude::*;

fn column(values: &[Option<f64>]) -> Table {
    Table::new(
        vec!["x".to_string()],
        values
            .iter()
            .map(|v| Record::from_pairs([("x", Value::from(*v))]))
            .collect(),
    )
}

fn number() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => -1.0e6..1.0e6f64,
        1 => Just(f64::INFINITY),
        1 => Just(f64::NEG_INFINITY),
    ]
}

fn cells() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(prop::option::weighted(0.9, number()), 0..60)
}

proptest! {
    #[test]
    fn lower_never_exceeds_upper(values in cells(), k in 0.0..5.0f64) {
        let t = column(&values);
        match compute_bounds_with(&t, "x", k) {
            Ok(b) => prop_assert!(b.lower <= b.upper, "{} > {}", b.lower, b.upper),
            Err(FenceError::EmptyColumn { .. }) => {
                prop_assert!(values.iter().all(Option::is_none))
            }
            Err(FenceError::UndefinedBounds { .. }) => {
                prop_assert!(values.iter().flatten().any(|v| v.is_infinite()))
            }
            Err(e) => prop_assert!(false, "unexpected error {e}"),
        }
    }

    #[test]
    fn filter_is_idempotent(values in cells()) {
        let t = column(&values);
        if let Ok(b) = compute_bounds_with(&t, "x", 1.5) {
            let once = filter_in_bounds(&t, "x", &b).unwrap();
            let twice = filter_in_bounds(&once, "x", &b).unwrap();
            prop_assert_eq!(once, twice);
        }
    }

    #[test]
    fn output_is_a_subset_without_missing(values in cells()) {
        let t = column(&values);
        if let Ok(out) = Pipeline::new(["x"]).run(&t) {
            prop_assert!(out.table.len() <= t.len());
            prop_assert!(out.table.records.iter().all(|r| !r.get("x").is_missing()));
            prop_assert!(out.table.records.iter().all(|r| t.records.contains(r)));
        }
    }
}
