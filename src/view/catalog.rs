//! Built-in view definitions.

use super::{DiffInterval, Layout, ViewDefinition};
use crate::query::templates as t;

const fn diff(first: usize, last: usize) -> Option<DiffInterval> {
    Some(DiffInterval::new(first, last))
}

pub(super) fn definitions() -> Vec<ViewDefinition> {
    vec![
        ViewDefinition::new(
            "databases",
            "Show databases statistics",
            Layout::new(t::DATABASES, 18, diff(1, 16)),
        )
        // no checksum_failures before 12
        .below(120000, Layout::new(t::DATABASES_PG11, 17, diff(1, 15))),
        ViewDefinition::new(
            "replication",
            "Show replication statistics",
            Layout::new(t::REPLICATION, 15, diff(6, 6)),
        )
        .below(90500, Layout::new(t::REPLICATION_PG96, 12, diff(6, 6)))
        .with_commit_ts(
            Some(100000),
            Layout::new(t::REPLICATION_PG96_EXTENDED, 14, diff(6, 6)),
        )
        .below(100000, Layout::new(t::REPLICATION_PG96, 12, diff(6, 6)))
        .with_commit_ts(None, Layout::new(t::REPLICATION_EXTENDED, 17, diff(6, 6))),
        ViewDefinition::new(
            "tables",
            "Show tables statistics",
            Layout::new(t::TABLES, 19, diff(1, 18)),
        ),
        ViewDefinition::new(
            "indexes",
            "Show indexes statistics",
            Layout::new(t::INDEXES, 6, diff(1, 5)),
        ),
        ViewDefinition::new(
            "sizes",
            "Show tables sizes statistics",
            Layout::new(t::SIZES, 7, diff(4, 6)),
        ),
        ViewDefinition::new(
            "functions",
            "Show functions statistics",
            Layout::new(t::FUNCTIONS, 8, diff(3, 3)),
        ),
        ViewDefinition::new(
            "progress_vacuum",
            "Show vacuum progress statistics",
            Layout::new(t::PROGRESS_VACUUM, 13, diff(10, 11)),
        ),
        ViewDefinition::new(
            "progress_cluster",
            "Show cluster/vacuum full progress statistics",
            Layout::new(t::PROGRESS_CLUSTER, 13, diff(10, 11)),
        ),
        ViewDefinition::new(
            "progress_index",
            "Show create index/reindex progress statistics",
            Layout::new(t::PROGRESS_INDEX, 14, None),
        ),
        ViewDefinition::new(
            "activity",
            "Show activity statistics",
            Layout::new(t::ACTIVITY, 14, None),
        )
        .below(90600, Layout::new(t::ACTIVITY_PG95, 12, None))
        .below(100000, Layout::new(t::ACTIVITY_PG96, 13, None)),
        ViewDefinition::new(
            "statements_timings",
            "Show statements timings statistics",
            Layout::new(t::STATEMENTS_TIMINGS, 13, diff(6, 10)),
        )
        .with_unique_key(11)
        // total_exec_time was total_time before 13
        .below(130000, Layout::new(t::STATEMENTS_TIMINGS_PG12, 13, diff(6, 10))),
        ViewDefinition::new(
            "statements_general",
            "Show statements general statistics",
            Layout::new(t::STATEMENTS_GENERAL, 8, diff(4, 5)),
        )
        .with_unique_key(6),
        ViewDefinition::new(
            "statements_io",
            "Show statements IO statistics",
            Layout::new(t::STATEMENTS_IO, 13, diff(6, 10)),
        )
        .with_unique_key(11),
        ViewDefinition::new(
            "statements_temp",
            "Show statements temp files statistics",
            Layout::new(t::STATEMENTS_TEMP, 9, diff(4, 6)),
        )
        .with_unique_key(7),
        ViewDefinition::new(
            "statements_local",
            "Show statements temp tables statistics (local IO)",
            Layout::new(t::STATEMENTS_LOCAL, 13, diff(6, 10)),
        )
        .with_unique_key(11),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Diffed columns and the unique key must exist in the layout they're used with.
    #[test]
    fn column_indexes_fit_every_layout() {
        for view in definitions() {
            let layouts = std::iter::once(&view.default_layout)
                .chain(view.variants.iter().map(|v| &v.layout));
            for layout in layouts {
                assert!(view.unique_key < layout.ncols, "{}", view.name);
                if let Some(d) = layout.diff {
                    assert!(d.first <= d.last && d.last < layout.ncols, "{}", view.name);
                }
            }
        }
    }

    /// Items in the outermost select list, ignoring commas inside
    /// parentheses and string literals.
    fn select_list_len(template: &str) -> usize {
        let body = template
            .strip_prefix("SELECT")
            .unwrap_or_else(|| panic!("template does not start with SELECT: {template}"));
        let mut depth = 0usize;
        let mut in_string = false;
        let mut items = 1;
        for (i, c) in body.char_indices() {
            match c {
                '\'' => in_string = !in_string,
                _ if in_string => {}
                '(' => depth += 1,
                ')' => depth -= 1,
                ',' if depth == 0 => items += 1,
                ' ' if depth == 0 && body[i..].starts_with(" FROM ") => return items,
                _ => {}
            }
        }
        panic!("no top-level FROM in template: {template}");
    }

    #[test]
    fn select_list_len_skips_nested_commas() {
        assert_eq!(select_list_len("SELECT a, coalesce(b, 'x,y') AS b FROM t"), 2);
        assert_eq!(
            select_list_len("SELECT (SELECT 1 FROM u), c FROM t WHERE d IN (1, 2)"),
            2
        );
    }

    #[test]
    fn templates_have_as_many_columns_as_declared() {
        for view in definitions() {
            let layouts = std::iter::once(&view.default_layout)
                .chain(view.variants.iter().map(|v| &v.layout));
            for layout in layouts {
                assert_eq!(
                    select_list_len(layout.template),
                    layout.ncols,
                    "{}: column count differs from the declared one",
                    view.name
                );
            }
        }
    }
}
