//! Quality-management dashboard data pipeline.
//!
//! Loads three yearly inspection/nonconformity exports and reduces them to
//! the monthly, yearly and breakdown series a reporting dashboard draws.
//! Monthly buckets follow the reporting calendar, where anything issued on
//! or after the 26th belongs to the next month.

pub mod aggregate;
pub mod backlog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod loader;
pub mod output;
pub mod period;
pub mod reports;
pub mod series;
pub mod types;
pub mod util;

pub use config::DashboardConfig;
pub use dashboard::{compose_dashboard, DashboardSeries};
pub use error::{Error, Result};
pub use period::resolve_reporting_month;
pub use series::{collapse_top_n, MonthlySeries};
pub use types::{InspectionRecord, YearlyData};
