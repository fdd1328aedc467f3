//! View registry: named statistics views, their version-dependent layouts and
//! display state.

mod catalog;

use indexmap::IndexMap;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

use crate::integrations::postgres::{CapabilityProfile, RowSet};
use crate::query::{self, ExpandError, Options};

/// Widest a column gets unless extra detail is on.
const MAX_COLUMN_WIDTH: usize = 48;

/// Inclusive column bounds whose values are cumulative and get diffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffInterval {
    pub first: usize,
    pub last: usize,
}

impl DiffInterval {
    pub const fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    pub fn range(&self) -> RangeInclusive<usize> {
        self.first..=self.last
    }
}

/// Query template plus the shape of its result. Always swapped as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub template: &'static str,
    pub ncols: usize,
    pub diff: Option<DiffInterval>,
}

impl Layout {
    pub const fn new(template: &'static str, ncols: usize, diff: Option<DiffInterval>) -> Self {
        Self {
            template,
            ncols,
            diff,
        }
    }
}

/// A layout used for servers older than `below`, optionally only when
/// commit timestamps are tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub below: Option<u32>,
    pub requires_commit_ts: bool,
    pub layout: Layout,
}

impl Variant {
    fn matches(&self, profile: &CapabilityProfile) -> bool {
        let version_ok = self.below.map_or(true, |below| profile.version < below);
        let feature_ok = !self.requires_commit_ts || profile.features.track_commit_timestamp;
        version_ok && feature_ok
    }
}

/// Compiled filter pattern for one column.
#[derive(Debug, Clone)]
pub struct ColumnFilter(Regex);

impl ColumnFilter {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self)
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for ColumnFilter {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// One named statistics view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewDefinition {
    pub name: &'static str,
    /// Shown on the command line when switching to the view.
    pub description: &'static str,
    default_layout: Layout,
    /// Ascending by `below`; first match wins.
    variants: Vec<Variant>,
    layout: Layout,
    query: String,
    pub order_key: usize,
    pub order_desc: bool,
    pub unique_key: usize,
    widths: Vec<usize>,
    filters: BTreeMap<usize, ColumnFilter>,
    pub refresh: Duration,
    pub show_extra: bool,
}

impl ViewDefinition {
    pub fn new(name: &'static str, description: &'static str, layout: Layout) -> Self {
        Self {
            name,
            description,
            default_layout: layout.clone(),
            variants: Vec::new(),
            layout,
            query: String::new(),
            order_key: 0,
            order_desc: true,
            unique_key: 0,
            widths: Vec::new(),
            filters: BTreeMap::new(),
            refresh: Duration::from_secs(1),
            show_extra: false,
        }
    }

    pub fn with_unique_key(mut self, column: usize) -> Self {
        self.unique_key = column;
        self
    }

    /// Use `layout` for servers older than `below`.
    pub fn below(mut self, below: u32, layout: Layout) -> Self {
        self.variants.push(Variant {
            below: Some(below),
            requires_commit_ts: false,
            layout,
        });
        self
    }

    /// Use `layout` when commit timestamps are tracked, for servers older
    /// than `below` if given.
    pub fn with_commit_ts(mut self, below: Option<u32>, layout: Layout) -> Self {
        self.variants.push(Variant {
            below,
            requires_commit_ts: true,
            layout,
        });
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Finalized query text; empty until the registry is configured.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn ncols(&self) -> usize {
        self.layout.ncols
    }

    pub fn diff(&self) -> Option<DiffInterval> {
        self.layout.diff
    }

    pub fn filters(&self) -> &BTreeMap<usize, ColumnFilter> {
        &self.filters
    }

    /// The layout this view should use against `profile`.
    pub fn select_layout(&self, profile: &CapabilityProfile) -> &Layout {
        self.variants
            .iter()
            .find(|v| v.matches(profile))
            .map(|v| &v.layout)
            .unwrap_or(&self.default_layout)
    }

    /// Move the order column by `step`, wrapping around.
    pub fn shift_order(&mut self, step: isize) {
        let ncols = self.ncols().max(1) as isize;
        self.order_key = (self.order_key as isize + step).rem_euclid(ncols) as usize;
    }

    pub fn flip_order(&mut self) {
        self.order_desc = !self.order_desc;
    }

    /// Filter `column` with `pattern`; an empty pattern removes the filter.
    pub fn set_filter(&mut self, column: usize, pattern: &str) -> Result<(), regex::Error> {
        if pattern.is_empty() {
            self.filters.remove(&column);
            return Ok(());
        }
        self.filters.insert(column, ColumnFilter::new(pattern)?);
        Ok(())
    }

    /// Rows passing every filter, sorted on the order column.
    pub fn arrange<'a>(&self, set: &'a RowSet) -> Vec<&'a Vec<String>> {
        let mut rows: Vec<&Vec<String>> = set
            .rows
            .iter()
            .filter(|row| {
                self.filters.iter().all(|(col, filter)| {
                    row.get(*col).is_some_and(|value| filter.is_match(value))
                })
            })
            .collect();

        let key = self.order_key;
        rows.sort_by(|a, b| {
            let ord = compare_values(
                a.get(key).map(String::as_str).unwrap_or(""),
                b.get(key).map(String::as_str).unwrap_or(""),
            );
            if self.order_desc {
                ord.reverse()
            } else {
                ord
            }
        });
        rows
    }

    /// Grow column widths to fit `set`. Widths never shrink while the view
    /// is shown, so columns don't jitter between refreshes.
    pub fn align(&mut self, set: &RowSet) {
        if self.widths.len() < set.columns.len() {
            self.widths.resize(set.columns.len(), 0);
        }
        for (i, name) in set.columns.iter().enumerate() {
            self.widths[i] = self.widths[i].max(name.width());
        }
        for row in &set.rows {
            for (i, value) in row.iter().enumerate().take(self.widths.len()) {
                self.widths[i] = self.widths[i].max(value.width());
            }
        }
    }

    pub fn reset_widths(&mut self) {
        self.widths.clear();
    }

    /// Display width of `column`, capped unless extra detail is on.
    pub fn column_width(&self, column: usize) -> usize {
        let width = self.widths.get(column).copied().unwrap_or(0);
        if self.show_extra {
            width
        } else {
            width.min(MAX_COLUMN_WIDTH)
        }
    }
}

/// Numbers compare numerically, anything else as text.
fn compare_values(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Ok(_)) => Ordering::Less,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// All views, in menu order.
#[derive(Debug, Clone, PartialEq)]
pub struct Views {
    views: IndexMap<&'static str, ViewDefinition>,
}

impl Views {
    /// The built-in views, each refreshed every `refresh`.
    pub fn builtin(refresh: Duration) -> Self {
        Self::from_definitions(catalog::definitions().into_iter().map(|mut v| {
            v.refresh = refresh;
            v
        }))
    }

    pub fn from_definitions(defs: impl IntoIterator<Item = ViewDefinition>) -> Self {
        Self {
            views: defs.into_iter().map(|v| (v.name, v)).collect(),
        }
    }

    /// Pick every view's layout for `profile` and expand its query.
    ///
    /// Works on a copy; on error the registry is left exactly as it was.
    pub fn configure(&mut self, profile: &CapabilityProfile) -> Result<(), ExpandError> {
        let options = Options::from_profile(profile);
        let mut next = self.views.clone();

        for view in next.values_mut() {
            let layout = view.select_layout(profile).clone();
            view.query = query::format(layout.template, &options).map_err(|e| {
                tracing::error!(view = view.name, error = %e, "cannot build query");
                e
            })?;
            view.layout = layout;
            if view.order_key >= view.layout.ncols {
                view.order_key = 0;
            }
            view.widths.clear();
        }

        self.views = next;
        tracing::info!(
            version = profile.version,
            views = self.views.len(),
            "views configured"
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ViewDefinition> {
        self.views.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ViewDefinition> {
        self.views.get_mut(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.views.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ViewDefinition> {
        self.views.values()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
