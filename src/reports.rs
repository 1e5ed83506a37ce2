use crate::dashboard::DashboardSeries;
use crate::series::{LabeledSeries, MonthlySeries, MONTH_LABELS};
use crate::types::{BreakdownRow, ComparisonRow};
use crate::util::{format_int, format_number, percent};

/// A table whose columns are only known at runtime (year labels).
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn count_cells(series: &MonthlySeries<u64>) -> impl Iterator<Item = String> + '_ {
    series.slots().iter().map(|v| format_int(*v))
}

fn cost_cells(series: &MonthlySeries<f64>) -> impl Iterator<Item = String> + '_ {
    series.slots().iter().map(|v| format_number(*v, 0))
}

fn row(name: String, cells: impl Iterator<Item = String>) -> Vec<String> {
    std::iter::once(name).chain(cells).collect()
}

/// One row per 15-slot series: yearly totals followed by the current months.
pub fn monthly_table(dash: &DashboardSeries) -> SeriesTable {
    let mut headers = vec!["Series".to_string()];
    headers.extend(dash.labels.iter().cloned());

    let mut rows = vec![
        row("Inspections".into(), count_cells(&dash.total_inspections)),
        row("Nonconformities".into(), count_cells(&dash.total_nonconformities)),
    ];
    for claims in &dash.customer_claims {
        rows.push(row(format!("Customer claim {} - All", claims.family), count_cells(&claims.all)));
        rows.push(row(
            format!("Customer claim {} - Official", claims.family),
            count_cells(&claims.official),
        ));
        rows.push(row(
            format!("Customer claim {} - Unofficial", claims.family),
            count_cells(&claims.unofficial),
        ));
    }
    for conq in &dash.conq_by_family {
        rows.push(row(format!("CONQ {}", conq.family), cost_cells(&conq.series)));
    }
    rows.push(row("Supplier claim - All".into(), count_cells(&dash.supplier_claims.all)));
    for family in &dash.supplier_claims.by_family {
        rows.push(row(format!("Supplier claim {}", family.family), count_cells(&family.series)));
    }
    SeriesTable { headers, rows }
}

/// Urgent inspection split: year total then months.
pub fn urgent_table(dash: &DashboardSeries) -> SeriesTable {
    let mut headers = vec!["Series".to_string(), dash.current_year.to_string()];
    headers.extend(MONTH_LABELS.iter().map(|m| m.to_string()));
    let urgent = &dash.urgent_inspections;
    let rows = vec![
        row("Regular".into(), urgent.regular.iter().map(|v| format_int(*v))),
        row("Urgent".into(), urgent.urgent.iter().map(|v| format_int(*v))),
        row("Urgent %".into(), urgent.urgent_pct.iter().map(|v| format!("{:.0}%", v))),
    ];
    SeriesTable { headers, rows }
}

fn breakdown<F>(chart: &str, series: &LabeledSeries<f64>, fmt: F) -> Vec<BreakdownRow>
where
    F: Fn(f64) -> String,
{
    let total = series.total();
    series
        .iter()
        .map(|(label, value)| BreakdownRow {
            chart: chart.to_string(),
            label: label.to_string(),
            value: fmt(value),
            share: format!("{:.1}%", percent(value, total)),
        })
        .collect()
}

fn count(v: u64) -> String {
    format_int(v)
}

fn cost(v: f64) -> String {
    format_number(v, 0)
}

fn counts_as_f64(series: &LabeledSeries<u64>) -> LabeledSeries<f64> {
    LabeledSeries {
        labels: series.labels.clone(),
        values: series.values.iter().map(|v| *v as f64).collect(),
    }
}

/// Donut-style breakdowns with each entry's share of the chart total.
pub fn breakdown_rows(dash: &DashboardSeries) -> Vec<BreakdownRow> {
    let as_count = |v: f64| format_int(v as u64);
    let conq = &dash.conq_current;
    let conq_current = LabeledSeries {
        labels: vec!["Incoming".into(), "Customer".into(), "Process".into()],
        values: vec![conq.incoming, conq.customer, conq.process],
    };

    let counted = [
        ("Inspection customers", &dash.inspection_customers),
        ("Nonconformity origins", &dash.nonconformity_origins),
    ];
    let mut rows = Vec::new();
    for (chart, series) in counted {
        rows.extend(breakdown(chart, &counts_as_f64(series), as_count));
    }
    rows.extend(breakdown("Customer defects", &dash.defects.current, cost));
    rows.extend(breakdown("CONQ current", &conq_current, cost));
    for (chart, series) in [
        ("Supplier origins", &dash.supplier_origins),
        ("Urgent customers", &dash.urgent_customers),
    ] {
        rows.extend(breakdown(chart, &counts_as_f64(series), as_count));
    }
    rows
}

/// Current vs prior year comparisons and the defect trend.
pub fn comparison_rows(dash: &DashboardSeries) -> Vec<ComparisonRow> {
    let mut rows: Vec<ComparisonRow> = Vec::new();
    let conq = &dash.conq_comparison;
    for (i, label) in conq.labels.iter().enumerate() {
        rows.push(ComparisonRow {
            chart: "CONQ current vs prior".into(),
            label: label.clone(),
            current: cost(conq.current[i]),
            prior: cost(conq.prior[i]),
        });
    }
    let supplier = &dash.supplier_comparison;
    for (i, label) in supplier.labels.iter().enumerate() {
        rows.push(ComparisonRow {
            chart: "Supplier defect case".into(),
            label: label.clone(),
            current: count(supplier.current[i]),
            prior: count(supplier.prior[i]),
        });
    }
    for (label, value) in dash.defects.trend.iter() {
        rows.push(ComparisonRow {
            chart: "Defect trend".into(),
            label: label.to_string(),
            current: cost(value),
            prior: String::new(),
        });
    }
    rows
}
