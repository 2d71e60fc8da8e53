//! Property tests for reconciliation

use chrono::{DateTime, Duration, TimeZone, Utc};
use liquidity_monitor::series::{reconcile, Series};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn instant(day: u16) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap() + Duration::days(i64::from(day))
}

fn series_strategy(name: &'static str) -> impl Strategy<Value = Series> {
    prop::collection::btree_map(0u16..400, -1_000.0f64..1_000.0, 1..40).prop_map(move |points| {
        Series::from_values(name, points.into_iter().map(|(d, v)| (instant(d), v))).unwrap()
    })
}

proptest! {
    #[test]
    fn reconcile_ignores_input_order(
        a in series_strategy("a"),
        b in series_strategy("b"),
        c in series_strategy("c"),
    ) {
        let zero_fill: BTreeSet<String> = ["c".to_string()].into();
        let forward = reconcile(&[a.clone(), b.clone(), c.clone()], &zero_fill);
        let reversed = reconcile(&[c, b, a], &zero_fill);
        prop_assert_eq!(forward, reversed);
    }

    #[test]
    fn reconcile_is_deterministic(a in series_strategy("a"), b in series_strategy("b")) {
        let first = reconcile(&[a.clone(), b.clone()], &BTreeSet::new());
        let second = reconcile(&[a, b], &BTreeSet::new());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn reconciled_panel_has_no_gaps(a in series_strategy("a"), b in series_strategy("b")) {
        if let Ok(panel) = reconcile(&[a, b], &BTreeSet::new()) {
            prop_assert!(panel.len() >= 2);
            prop_assert!(panel.index().windows(2).all(|w| w[0] < w[1]));
            for row in panel.rows() {
                prop_assert!(row.values.values().all(|v| v.is_finite()));
            }
        }
    }
}
