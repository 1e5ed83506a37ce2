//! Output shapes shared by every chart: 15-slot monthly series, the 13-slot
//! urgent-inspection split, labeled series and the top-N collapse.

use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Ordering;
use std::iter::Sum;
use std::ops::Add;

use crate::util::percent;

/// Label of the synthetic bucket absorbing everything beyond the top N.
pub const OTHERS_LABEL: &str = "Others";

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Numeric cell type of a series: `u64` for counts, `f64` for costs.
pub trait SeriesValue: Copy + Default + PartialOrd + Add<Output = Self> + Sum + Serialize {}

impl<T> SeriesValue for T where
    T: Copy + Default + PartialOrd + Add<Output = T> + Sum + Serialize
{
}

/// `[year N-2 total, year N-1 total, year N total, Jan..Dec of year N]`.
///
/// The year-N total is always derived from the month slots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MonthlySeries<T> {
    slots: [T; 15],
}

impl<T: SeriesValue> MonthlySeries<T> {
    pub const LEN: usize = 15;
    /// Index of the first month slot (January).
    pub const FIRST_MONTH: usize = 3;

    pub fn new(two_years_ago: T, last_year: T, months: [T; 12]) -> Self {
        let mut slots = [T::default(); 15];
        slots[0] = two_years_ago;
        slots[1] = last_year;
        slots[Self::FIRST_MONTH..].copy_from_slice(&months);
        slots[2] = months.iter().copied().sum();
        Self { slots }
    }

    pub fn slots(&self) -> &[T; 15] {
        &self.slots
    }

    pub fn two_years_ago(&self) -> T {
        self.slots[0]
    }

    pub fn last_year(&self) -> T {
        self.slots[1]
    }

    pub fn current_total(&self) -> T {
        self.slots[2]
    }

    /// Value of month `month0` (`0` = January).
    pub fn month(&self, month0: usize) -> T {
        self.slots[Self::FIRST_MONTH + month0]
    }

    pub fn months(&self) -> &[T] {
        &self.slots[Self::FIRST_MONTH..]
    }

    pub fn max(&self) -> T {
        self.slots.iter().copied().fold(T::default(), |acc, v| {
            if v > acc {
                v
            } else {
                acc
            }
        })
    }
}

impl<T: SeriesValue> Default for MonthlySeries<T> {
    fn default() -> Self {
        Self::new(T::default(), T::default(), [T::default(); 12])
    }
}

/// Axis labels matching the slots of a `MonthlySeries` for `current_year`.
pub fn year_month_labels(current_year: i32) -> Vec<String> {
    let mut labels: Vec<String> = (0..3)
        .rev()
        .map(|back| (current_year - back).to_string())
        .collect();
    labels.extend(MONTH_LABELS.iter().map(|m| m.to_string()));
    labels
}

/// Collects per-month values before the series is sealed.
#[derive(Debug, Clone, Copy)]
pub struct MonthlyAccumulator<T> {
    two_years_ago: T,
    last_year: T,
    months: [T; 12],
}

impl<T: SeriesValue> MonthlyAccumulator<T> {
    pub fn new(two_years_ago: T, last_year: T) -> Self {
        Self {
            two_years_ago,
            last_year,
            months: [T::default(); 12],
        }
    }

    pub fn add(&mut self, month0: usize, value: T) {
        if let Some(slot) = self.months.get_mut(month0) {
            *slot = *slot + value;
        }
    }

    pub fn finish(self) -> MonthlySeries<T> {
        MonthlySeries::new(self.two_years_ago, self.last_year, self.months)
    }
}

/// Passed official inspections of one year split by urgency.
///
/// Slot 0 is the year total and slots 1..=12 are months, a different layout
/// from `MonthlySeries`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrgentSeries {
    pub regular: [u64; 13],
    pub urgent: [u64; 13],
    pub urgent_pct: [f64; 13],
}

impl UrgentSeries {
    pub fn from_months(regular_months: [u64; 12], urgent_months: [u64; 12]) -> Self {
        let mut regular = [0u64; 13];
        let mut urgent = [0u64; 13];
        regular[1..].copy_from_slice(&regular_months);
        urgent[1..].copy_from_slice(&urgent_months);
        regular[0] = regular_months.iter().sum();
        urgent[0] = urgent_months.iter().sum();

        let mut urgent_pct = [0f64; 13];
        for (i, pct) in urgent_pct.iter_mut().enumerate() {
            *pct = percent(urgent[i] as f64, (urgent[i] + regular[i]) as f64);
        }
        Self {
            regular,
            urgent,
            urgent_pct,
        }
    }
}

/// Parallel labels and values for a single chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledSeries<T> {
    pub labels: Vec<String>,
    pub values: Vec<T>,
}

impl<T: SeriesValue> LabeledSeries<T> {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, T)>,
    {
        let (labels, values) = entries.into_iter().unzip();
        Self { labels, values }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn total(&self) -> T {
        self.values.iter().copied().sum()
    }

    pub fn get(&self, label: &str) -> Option<T> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, T)> + '_ {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Side-by-side values of the current and prior year under shared labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison<T> {
    pub labels: Vec<String>,
    pub current: Vec<T>,
    pub prior: Vec<T>,
}

/// Running totals per label, keeping first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Tally<T> {
    totals: IndexMap<String, T>,
}

impl<T: SeriesValue> Tally<T> {
    pub fn new() -> Self {
        Self {
            totals: IndexMap::new(),
        }
    }

    pub fn add(&mut self, label: &str, value: T) {
        match self.totals.get_mut(label) {
            Some(total) => *total = *total + value,
            None => {
                self.totals.insert(label.to_string(), value);
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<T> {
        self.totals.get(label).copied()
    }

    /// `(label, total)` pairs in first-seen order.
    pub fn entries(&self) -> Vec<(String, T)> {
        self.totals.iter().map(|(l, v)| (l.clone(), *v)).collect()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn total(&self) -> T {
        self.totals.values().copied().sum()
    }
}

/// Entries sorted by value descending; equal values keep input order.
fn sorted_desc<T: SeriesValue>(entries: &[(String, T)]) -> Vec<(String, T)> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    sorted
}

/// Bounds a breakdown to `n` entries plus an "Others" bucket.
///
/// With more than `n` entries, the largest `n` are kept in descending order
/// and the rest are summed into "Others". Otherwise the entries are
/// returned as given.
pub fn collapse_top_n<T: SeriesValue>(entries: &[(String, T)], n: usize) -> LabeledSeries<T> {
    if entries.len() <= n {
        return LabeledSeries::from_entries(entries.iter().cloned());
    }
    let sorted = sorted_desc(entries);
    let (top, rest) = sorted.split_at(n);
    let others: T = rest.iter().map(|(_, v)| *v).sum();
    LabeledSeries::from_entries(
        top.iter()
            .cloned()
            .chain(std::iter::once((OTHERS_LABEL.to_string(), others))),
    )
}

/// Labels of the `n` largest entries, without an "Others" bucket.
pub fn top_labels<T: SeriesValue>(entries: &[(String, T)], n: usize) -> Vec<String> {
    sorted_desc(entries)
        .into_iter()
        .take(n)
        .map(|(label, _)| label)
        .collect()
}
