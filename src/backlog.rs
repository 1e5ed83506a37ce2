//! Inspection backlog: work orders transferred to inspection and still open.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::loader::{open, read_rows};
use crate::series::Tally;
use crate::types::{BacklogRow, CustomerBacklogRow};
use crate::util::{days_diff, format_int, parse_date_safe, parse_qty};

/// Days after transfer at which an item is flagged.
pub const WARNING_DAYS: i64 = 7;
const CUSTOMER_PREFIX_LEN: usize = 4;
const UNKNOWN_CUSTOMER: &str = "Unk";

#[derive(Debug, Default, Deserialize)]
pub struct BacklogRaw {
    #[serde(rename = "Item Number", alias = "itemNumber")]
    pub item_number: Option<String>,
    #[serde(rename = "Work order", alias = "workOrder")]
    pub work_order: Option<String>,
    #[serde(rename = "WO Qty", alias = "qty")]
    pub qty: Option<String>,
    #[serde(rename = "이관일자", alias = "transferDate")]
    pub transfer_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacklogItem {
    pub customer: String,
    pub item_number: String,
    pub work_order: String,
    pub qty: i64,
    pub transfer_date_text: String,
    pub transfer_date: Option<NaiveDate>,
    pub elapsed_days: i64,
}

impl BacklogItem {
    pub fn from_raw(row: &BacklogRaw, today: NaiveDate) -> Self {
        let item_number = row.item_number.as_deref().unwrap_or("").trim().to_string();
        let customer = if item_number.is_empty() {
            UNKNOWN_CUSTOMER.to_string()
        } else {
            item_number.chars().take(CUSTOMER_PREFIX_LEN).collect()
        };
        // Work orders come out of the spreadsheet as floats ("10452.0").
        let work_order = row
            .work_order
            .as_deref()
            .unwrap_or("")
            .trim()
            .split('.')
            .next()
            .unwrap_or("")
            .to_string();
        let raw_date = row.transfer_date.as_deref().unwrap_or("").trim();
        let transfer_date = parse_date_safe(Some(raw_date));
        Self {
            customer,
            item_number,
            work_order,
            qty: parse_qty(row.qty.as_deref()),
            transfer_date_text: raw_date.chars().take(10).collect(),
            transfer_date,
            elapsed_days: transfer_date.map_or(0, |d| days_diff(d, today)),
        }
    }

    pub fn is_overdue(&self) -> bool {
        self.elapsed_days >= WARNING_DAYS
    }
}

/// Metric the per-customer backlog is ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum BacklogMode {
    #[default]
    Count,
    Qty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerBacklog {
    pub customer: String,
    pub count: u64,
    pub total_qty: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BacklogSummary {
    pub total_count: usize,
    pub total_qty: i64,
}

pub fn load_backlog(path: &Path, today: NaiveDate) -> Result<Vec<BacklogItem>> {
    let (rows, parse_errors) = read_rows::<BacklogRaw, _>(open(path)?, path)?;
    let items: Vec<BacklogItem> = rows.iter().map(|r| BacklogItem::from_raw(r, today)).collect();
    info!(path = %path.display(), items = items.len(), parse_errors, "backlog loaded");
    Ok(items)
}

/// Per-customer totals, largest first by the chosen metric.
pub fn group_by_customer(items: &[BacklogItem], mode: BacklogMode) -> Vec<CustomerBacklog> {
    let mut counts: Tally<u64> = Tally::new();
    let mut qty: Tally<i64> = Tally::new();
    for item in items {
        counts.add(&item.customer, 1);
        qty.add(&item.customer, item.qty);
    }
    let mut groups: Vec<CustomerBacklog> = counts
        .entries()
        .into_iter()
        .map(|(customer, count)| CustomerBacklog {
            total_qty: qty.get(&customer).unwrap_or(0),
            customer,
            count,
        })
        .collect();
    match mode {
        BacklogMode::Count => groups.sort_by(|a, b| b.count.cmp(&a.count)),
        BacklogMode::Qty => groups.sort_by(|a, b| b.total_qty.cmp(&a.total_qty)),
    }
    groups
}

/// Oldest transfers first; items without a usable date lead the list.
pub fn sorted_by_transfer_date(items: &[BacklogItem]) -> Vec<BacklogItem> {
    let mut sorted = items.to_vec();
    sorted.sort_by_key(|item| item.transfer_date);
    sorted
}

pub fn summary(items: &[BacklogItem]) -> BacklogSummary {
    BacklogSummary {
        total_count: items.len(),
        total_qty: items.iter().map(|i| i.qty).sum(),
    }
}

pub fn customer_rows(groups: &[CustomerBacklog]) -> Vec<CustomerBacklogRow> {
    groups
        .iter()
        .map(|g| CustomerBacklogRow {
            customer: g.customer.clone(),
            count: format_int(g.count),
            total_qty: format_int(g.total_qty),
        })
        .collect()
}

pub fn backlog_rows(items: &[BacklogItem]) -> Vec<BacklogRow> {
    sorted_by_transfer_date(items)
        .into_iter()
        .map(|item| BacklogRow {
            warning: if item.is_overdue() { "!".into() } else { String::new() },
            work_order: item.work_order,
            transfer_date: item.transfer_date_text,
            elapsed_days: item.elapsed_days,
        })
        .collect()
}
