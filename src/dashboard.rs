//! Dashboard composition: the fixed pipeline from three yearly datasets to
//! every series the charts read.

use serde::Serialize;
use tracing::debug;

use crate::aggregate::{
    categorized_monthly_count, customer_label, defect_rollup, defect_trend, monthly_cost,
    monthly_count, nonconformity_origin, officiality_split, stage_costs, supplier_defect_origin,
    tally, urgent_split, DefectRollup, StageCosts, SUM_LABEL,
};
use crate::config::DashboardConfig;
use crate::series::{
    collapse_top_n, top_labels, year_month_labels, Comparison, LabeledSeries, MonthlySeries, Tally,
    UrgentSeries,
};
use crate::types::{InspectionRecord, Judgment, Stage, YearlyData};

/// Customer claims of one product family.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilyClaims {
    pub family: String,
    pub all: MonthlySeries<u64>,
    pub official: MonthlySeries<u64>,
    pub unofficial: MonthlySeries<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilySeries<T> {
    pub family: String,
    pub series: MonthlySeries<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierClaims {
    pub all: MonthlySeries<u64>,
    pub by_family: Vec<FamilySeries<u64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefectAnalysis {
    pub rollup: DefectRollup,
    pub current: LabeledSeries<f64>,
    pub trend: LabeledSeries<f64>,
    pub total: f64,
}

/// Everything the rendering layer needs, as plain values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSeries {
    pub current_year: i32,
    pub labels: Vec<String>,
    pub total_inspections: MonthlySeries<u64>,
    pub total_nonconformities: MonthlySeries<u64>,
    pub inspection_customers: LabeledSeries<u64>,
    pub nonconformity_origins: LabeledSeries<u64>,
    pub customer_claims: Vec<FamilyClaims>,
    pub defects: DefectAnalysis,
    pub conq_by_family: Vec<FamilySeries<f64>>,
    pub conq_current: StageCosts,
    pub conq_comparison: Comparison<f64>,
    pub supplier_claims: SupplierClaims,
    pub supplier_origins: LabeledSeries<u64>,
    pub supplier_comparison: Comparison<u64>,
    pub urgent_inspections: UrgentSeries,
    pub urgent_customers: LabeledSeries<u64>,
}

fn is_customer_claim(r: &InspectionRecord) -> bool {
    r.is_nonconformity() && r.stage == Stage::Customer
}

fn is_supplier_claim(r: &InspectionRecord) -> bool {
    r.is_nonconformity() && r.stage == Stage::Incoming
}

fn family_key(r: &InspectionRecord) -> Option<String> {
    Some(r.product_family.clone())
}

/// `[Sum, Customer, Process, Incoming]` for the current and prior year.
fn conq_comparison(current: &StageCosts, prior: &StageCosts) -> Comparison<f64> {
    let row = |c: &StageCosts| vec![c.total, c.customer, c.process, c.incoming];
    Comparison {
        labels: [SUM_LABEL, "Customer", "Process", "Incoming"]
            .iter()
            .map(|l| l.to_string())
            .collect(),
        current: row(current),
        prior: row(prior),
    }
}

/// Supplier defect origins of the current year's top `n` against the prior year.
fn supplier_comparison(data: &YearlyData, n: usize) -> Comparison<u64> {
    let current = tally(&data.current, supplier_defect_origin);
    let prior = tally(&data.last_year, supplier_defect_origin);
    let top = top_labels(&current.entries(), n);

    let pick = |t: &Tally<u64>| -> Vec<u64> {
        std::iter::once(t.total())
            .chain(top.iter().map(|label| t.get(label).unwrap_or(0)))
            .collect()
    };
    let mut labels = vec![SUM_LABEL.to_string()];
    labels.extend(top.iter().cloned());
    Comparison {
        labels,
        current: pick(&current),
        prior: pick(&prior),
    }
}

pub fn compose_dashboard(config: &DashboardConfig, data: &YearlyData) -> DashboardSeries {
    let year = config.current_year;
    let n = config.top_n;
    let families = &config.product_families;
    debug!(year, records = data.total_records(), "composing dashboard");

    let total_inspections = monthly_count(data, year, InspectionRecord::is_inspection);
    let total_nonconformities = monthly_count(data, year, InspectionRecord::is_nonconformity);

    let inspection_customers = collapse_top_n(
        &tally(&data.current, |r| {
            (r.is_inspection() && r.judgment == Judgment::Pass).then(|| customer_label(r))
        })
        .entries(),
        n,
    );
    let nonconformity_origins =
        collapse_top_n(&tally(&data.current, nonconformity_origin).entries(), n);

    let customer_claims = families
        .iter()
        .map(|family| {
            let [all, official, unofficial] = officiality_split(data, year, |r| {
                is_customer_claim(r) && &r.product_family == family
            });
            FamilyClaims {
                family: family.clone(),
                all,
                official,
                unofficial,
            }
        })
        .collect();

    let defects = {
        let rollup = defect_rollup(data.current.iter().filter(|r| is_customer_claim(r)));
        DefectAnalysis {
            rollup,
            current: LabeledSeries::from_entries(rollup.entries()),
            trend: LabeledSeries::from_entries(defect_trend(&rollup)),
            total: rollup.total(),
        }
    };

    let conq_by_family = families
        .iter()
        .map(|family| FamilySeries {
            family: family.clone(),
            series: monthly_cost(data, year, |r| {
                r.is_nonconformity() && &r.product_family == family
            }),
        })
        .collect();

    let conq_current = stage_costs(&data.current, &config.process_stages);
    let conq_prior = stage_costs(&data.last_year, &config.process_stages);

    let supplier_claims = SupplierClaims {
        all: monthly_count(data, year, is_supplier_claim),
        by_family: families
            .iter()
            .zip(categorized_monthly_count(data, year, is_supplier_claim, families, family_key))
            .map(|(family, series)| FamilySeries {
                family: family.clone(),
                series,
            })
            .collect(),
    };

    let urgent_customers = collapse_top_n(
        &tally(&data.current, |r| {
            (r.is_official_pass() && r.urgent).then(|| customer_label(r))
        })
        .entries(),
        n,
    );

    DashboardSeries {
        current_year: year,
        labels: year_month_labels(year),
        total_inspections,
        total_nonconformities,
        inspection_customers,
        nonconformity_origins,
        customer_claims,
        defects,
        conq_by_family,
        conq_current,
        conq_comparison: conq_comparison(&conq_current, &conq_prior),
        supplier_claims,
        supplier_origins: collapse_top_n(
            &tally(&data.current, supplier_defect_origin).entries(),
            n,
        ),
        supplier_comparison: supplier_comparison(data, n),
        urgent_inspections: urgent_split(&data.current, year),
        urgent_customers,
    }
}
