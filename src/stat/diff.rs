//! Turn cumulative statistics columns into per-second rates.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use crate::integrations::postgres::RowSet;

/// Diff `curr` against `prev`.
///
/// Rows are matched on the text of column `unique_key`. Every column in
/// `columns` that parses as a number on both sides becomes
/// `(curr - prev) / interval_secs`; a value that went backwards becomes 0.
/// Rows with no previous counterpart show 0 in those columns. Columns outside
/// `columns` are passed through untouched.
pub fn diff_rows(
    prev: &RowSet,
    curr: &RowSet,
    columns: RangeInclusive<usize>,
    unique_key: usize,
    interval_secs: f64,
) -> RowSet {
    let previous: HashMap<&str, &Vec<String>> = prev
        .rows
        .iter()
        .filter_map(|row| row.get(unique_key).map(|key| (key.as_str(), row)))
        .collect();

    let rows = curr
        .rows
        .iter()
        .map(|row| {
            let before = row
                .get(unique_key)
                .and_then(|key| previous.get(key.as_str()));
            let mut out = row.clone();
            for col in columns.clone() {
                let Some(value) = out.get_mut(col) else {
                    break;
                };
                match before {
                    Some(before) => {
                        if let Some(rate) = rate(before.get(col), value, interval_secs) {
                            *value = format_rate(rate);
                        }
                    }
                    None => *value = "0".to_string(),
                }
            }
            out
        })
        .collect();

    RowSet {
        columns: curr.columns.clone(),
        rows,
    }
}

fn rate(before: Option<&String>, after: &str, interval: f64) -> Option<f64> {
    let before: f64 = before?.trim().parse().ok()?;
    let after: f64 = after.trim().parse().ok()?;
    if after < before || !(interval > 0.0) {
        return Some(0.0);
    }
    Some((after - before) / interval)
}

/// Integers print bare; everything else with two decimals.
pub fn format_rate(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn set(rows: &[&[&str]]) -> RowSet {
        RowSet {
            columns: vec!["name".into(), "calls".into(), "rows".into(), "note".into()],
            rows: rows
                .iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn diffs_matching_rows_by_key() {
        let prev = set(&[&["a", "10", "100", "x"], &["b", "5", "50", "y"]]);
        let curr = set(&[&["b", "9", "53", "y"], &["a", "30", "101", "x"]]);

        let out = diff_rows(&prev, &curr, 1..=2, 0, 2.0);
        assert_eq!(out.rows[0], vec!["b", "2", "1.50", "y"]);
        assert_eq!(out.rows[1], vec!["a", "10", "0.50", "x"]);
    }

    #[test]
    fn new_rows_show_zero() {
        let prev = set(&[&["a", "10", "100", "x"]]);
        let curr = set(&[&["c", "7", "70", "z"]]);
        let out = diff_rows(&prev, &curr, 1..=2, 0, 1.0);
        assert_eq!(out.rows[0], vec!["c", "0", "0", "z"]);
    }

    #[test]
    fn regressions_and_bad_intervals_show_zero() {
        let prev = set(&[&["a", "10", "100", "x"]]);
        let curr = set(&[&["a", "4", "120", "x"]]);
        assert_eq!(
            diff_rows(&prev, &curr, 1..=2, 0, 1.0).rows[0],
            vec!["a", "0", "20", "x"]
        );
        assert_eq!(
            diff_rows(&prev, &curr, 1..=2, 0, 0.0).rows[0],
            vec!["a", "0", "0", "x"]
        );
    }

    #[test]
    fn non_numeric_values_are_left_alone() {
        let prev = set(&[&["a", "", "100", "x"]]);
        let curr = set(&[&["a", "", "110", "x"]]);
        assert_eq!(
            diff_rows(&prev, &curr, 1..=3, 0, 1.0).rows[0],
            vec!["a", "", "10", "x"]
        );
    }

    #[test]
    fn formats_rates() {
        assert_eq!(format_rate(3.0), "3");
        assert_eq!(format_rate(0.127), "0.13");
    }
}
