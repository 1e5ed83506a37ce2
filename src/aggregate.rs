//! Reductions from inspection records to chart series.
//!
//! Every function here is a pure fold over already-loaded records. Monthly
//! series are built through `monthly_reduce`, which applies one closure to
//! both the older yearly datasets and the current one, so the prior-year
//! totals and the current months always use the same filter.

use serde::Serialize;

use crate::period::reporting_month;
use crate::series::{MonthlyAccumulator, MonthlySeries, SeriesValue, Tally, UrgentSeries};
use crate::types::{InspectionRecord, Judgment, Officiality, OriginSite, Stage, YearlyData};

pub const MATERIAL_LABEL: &str = "Material";
pub const UNKNOWN_LABEL: &str = "Unknown";
pub const OTHER_OUTSOURCED_LABEL: &str = "Other outsourced";
pub const SUM_LABEL: &str = "Sum";

/// Builds a 15-slot series from a per-record contribution.
///
/// `contribution` returns `None` for records that should not count. The
/// older datasets contribute their whole-year sum; current records only
/// count when their issue date resolves to a month of `current_year`.
pub fn monthly_reduce<T, F>(
    data: &YearlyData,
    current_year: i32,
    contribution: F,
) -> MonthlySeries<T>
where
    T: SeriesValue,
    F: Fn(&InspectionRecord) -> Option<T>,
{
    let year_total = |records: &[InspectionRecord]| -> T {
        records.iter().filter_map(&contribution).sum()
    };
    let mut acc = MonthlyAccumulator::new(
        year_total(&data.two_years_ago),
        year_total(&data.last_year),
    );
    for r in &data.current {
        let Some(value) = contribution(r) else { continue };
        if let Some(month) = reporting_month(r.issue_date, current_year) {
            acc.add(month, value);
        }
    }
    acc.finish()
}

pub fn monthly_count<P>(data: &YearlyData, current_year: i32, pred: P) -> MonthlySeries<u64>
where
    P: Fn(&InspectionRecord) -> bool,
{
    monthly_reduce(data, current_year, |r| pred(r).then_some(1))
}

/// Monthly failure cost of the records matching `pred`.
pub fn monthly_cost<P>(data: &YearlyData, current_year: i32, pred: P) -> MonthlySeries<f64>
where
    P: Fn(&InspectionRecord) -> bool,
{
    monthly_reduce(data, current_year, |r| pred(r).then_some(r.cost_total))
}

/// One count series per category, in the order of `categories`.
///
/// A record is counted in a category when it matches `pred` and `key`
/// yields that category; records keyed to nothing listed are dropped.
pub fn categorized_monthly_count<K, P, F>(
    data: &YearlyData,
    current_year: i32,
    pred: P,
    categories: &[K],
    key: F,
) -> Vec<MonthlySeries<u64>>
where
    K: PartialEq,
    P: Fn(&InspectionRecord) -> bool,
    F: Fn(&InspectionRecord) -> Option<K>,
{
    categories
        .iter()
        .map(|category| {
            monthly_count(data, current_year, |r| {
                pred(r) && key(r).as_ref() == Some(category)
            })
        })
        .collect()
}

/// Cost counterpart of `categorized_monthly_count`.
pub fn categorized_monthly_cost<K, P, F>(
    data: &YearlyData,
    current_year: i32,
    pred: P,
    categories: &[K],
    key: F,
) -> Vec<MonthlySeries<f64>>
where
    K: PartialEq,
    P: Fn(&InspectionRecord) -> bool,
    F: Fn(&InspectionRecord) -> Option<K>,
{
    categories
        .iter()
        .map(|category| {
            monthly_cost(data, current_year, |r| {
                pred(r) && key(r).as_ref() == Some(category)
            })
        })
        .collect()
}

pub fn sum_cost<P>(records: &[InspectionRecord], pred: P) -> f64
where
    P: Fn(&InspectionRecord) -> bool,
{
    records.iter().filter(|r| pred(r)).map(|r| r.cost_total).sum()
}

/// Counts records per bucket name; `classify` returning `None` excludes a record.
pub fn tally<F>(records: &[InspectionRecord], classify: F) -> Tally<u64>
where
    F: Fn(&InspectionRecord) -> Option<String>,
{
    let mut tally = Tally::new();
    for r in records {
        if let Some(label) = classify(r) {
            tally.add(&label, 1);
        }
    }
    tally
}

fn non_empty_or(text: &str, fallback: &str) -> String {
    if text.is_empty() {
        fallback.to_string()
    } else {
        text.to_string()
    }
}

/// Origin bucket of an incoming (supplier) nonconformity.
pub fn supplier_defect_origin(r: &InspectionRecord) -> Option<String> {
    if !r.is_nonconformity() || r.stage != Stage::Incoming {
        return None;
    }
    match r.origin {
        OriginSite::IncomingOverseas => Some(MATERIAL_LABEL.to_string()),
        OriginSite::IncomingOutsourced => {
            Some(non_empty_or(&r.prev_process, OTHER_OUTSOURCED_LABEL))
        }
        OriginSite::Other => None,
    }
}

/// Origin bucket of a failed nonconformity for the customer breakdown.
pub fn nonconformity_origin(r: &InspectionRecord) -> Option<String> {
    if !r.is_nonconformity() || r.judgment != Judgment::Fail {
        return None;
    }
    if r.stage == Stage::Incoming && r.origin == OriginSite::IncomingOutsourced {
        return Some(MATERIAL_LABEL.to_string());
    }
    match r.stage {
        Stage::Process | Stage::Incoming | Stage::Shipment => {
            Some(non_empty_or(&r.prev_process, UNKNOWN_LABEL))
        }
        Stage::Customer | Stage::Other => None,
    }
}

pub fn customer_label(r: &InspectionRecord) -> String {
    non_empty_or(&r.customer, UNKNOWN_LABEL)
}

/// Defect totals in the five reporting buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DefectRollup {
    pub dimension: f64,
    pub missing: f64,
    pub visual: f64,
    pub label: f64,
    pub qty: f64,
}

impl DefectRollup {
    pub const LABELS: [&'static str; 5] = ["Dim's", "Missing", "Visual", "Label", "Qty"];

    pub fn values(&self) -> [f64; 5] {
        [self.dimension, self.missing, self.visual, self.label, self.qty]
    }

    pub fn entries(&self) -> Vec<(String, f64)> {
        Self::LABELS
            .iter()
            .zip(self.values())
            .map(|(l, v)| (l.to_string(), v))
            .collect()
    }

    pub fn total(&self) -> f64 {
        self.values().iter().sum()
    }
}

pub fn defect_rollup<'a, I>(records: I) -> DefectRollup
where
    I: IntoIterator<Item = &'a InspectionRecord>,
{
    records
        .into_iter()
        .fold(DefectRollup::default(), |mut acc, r| {
            let d = &r.defects;
            acc.dimension += d.dimension + d.assembly;
            acc.missing += d.missing;
            acc.visual += d.shape + d.appearance;
            acc.label += d.feature;
            acc.qty += d.other;
            acc
        })
}

/// Buckets in ascending order of value followed by the overall "Sum".
pub fn defect_trend(rollup: &DefectRollup) -> Vec<(String, f64)> {
    let mut entries = rollup.entries();
    entries.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    entries.push((SUM_LABEL.to_string(), rollup.total()));
    entries
}

/// Failure cost of nonconformities by detection stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StageCosts {
    pub incoming: f64,
    pub customer: f64,
    pub process: f64,
    pub total: f64,
}

/// `process_stages` decides which stages are reported under "process".
pub fn stage_costs(records: &[InspectionRecord], process_stages: &[Stage]) -> StageCosts {
    let nonconforming = |stage: Option<&[Stage]>| {
        sum_cost(records, |r| {
            r.is_nonconformity() && stage.map_or(true, |s| s.contains(&r.stage))
        })
    };
    StageCosts {
        incoming: nonconforming(Some(&[Stage::Incoming][..])),
        customer: nonconforming(Some(&[Stage::Customer][..])),
        process: nonconforming(Some(process_stages)),
        total: nonconforming(None),
    }
}

/// Urgent vs regular passed official inspections per reporting month.
pub fn urgent_split(records: &[InspectionRecord], year: i32) -> UrgentSeries {
    let mut regular = [0u64; 12];
    let mut urgent = [0u64; 12];
    for r in records.iter().filter(|r| r.is_official_pass()) {
        if let Some(month) = reporting_month(r.issue_date, year) {
            if r.urgent {
                urgent[month] += 1;
            } else {
                regular[month] += 1;
            }
        }
    }
    UrgentSeries::from_months(regular, urgent)
}

/// Claim counts split by officiality, as used for customer claims.
pub fn officiality_split(
    data: &YearlyData,
    current_year: i32,
    pred: impl Fn(&InspectionRecord) -> bool,
) -> [MonthlySeries<u64>; 3] {
    let all = monthly_count(data, current_year, &pred);
    let official = monthly_count(data, current_year, |r| {
        pred(r) && r.official == Officiality::Yes
    });
    let unofficial = monthly_count(data, current_year, |r| {
        pred(r) && r.official == Officiality::No
    });
    [all, official, unofficial]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DefectCounts, RecordKind};
    use chrono::NaiveDate;

    fn date(s: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
    }

    fn nc(stage: Stage, issued: &str) -> InspectionRecord {
        InspectionRecord {
            kind: RecordKind::Nonconformity,
            stage,
            issue_date: date(issued),
            ..Default::default()
        }
    }

    fn inspection(issued: &str) -> InspectionRecord {
        InspectionRecord {
            kind: RecordKind::Inspection,
            issue_date: date(issued),
            ..Default::default()
        }
    }

    #[test]
    fn monthly_count_uses_prior_year_lumps_and_current_months() {
        let data = YearlyData::new(
            vec![inspection("2023-03-01"), inspection(""), nc(Stage::Customer, "2023-01-01")],
            vec![inspection("2024-07-30")],
            vec![
                inspection("2025-01-10"),
                inspection("2025-01-26"),
                inspection("2025-12-27"),
                inspection("garbage"),
            ],
        );
        let series = monthly_count(&data, 2025, InspectionRecord::is_inspection);
        assert_eq!(series.two_years_ago(), 2);
        assert_eq!(series.last_year(), 1);
        assert_eq!(series.month(0), 1);
        assert_eq!(series.month(1), 1);
        assert_eq!(series.current_total(), 2);
        assert_eq!(series.current_total(), series.months().iter().sum::<u64>());
    }

    #[test]
    fn cost_rollup_sums_incoming_costs() {
        let mut a = nc(Stage::Incoming, "2025-03-01");
        a.cost_total = 1000.0;
        let mut b = nc(Stage::Incoming, "2025-03-02");
        b.cost_total = 2500.0;
        let mut c = nc(Stage::Customer, "2025-03-03");
        c.cost_total = 99.0;
        let costs = stage_costs(&[a, b, c], &[Stage::Process, Stage::Shipment]);
        assert_eq!(costs.incoming, 3500.0);
        assert_eq!(costs.customer, 99.0);
        assert_eq!(costs.process, 0.0);
        assert_eq!(costs.total, 3599.0);
    }

    #[test]
    fn process_bucket_follows_configured_stages() {
        let mut p = nc(Stage::Process, "2025-03-01");
        p.cost_total = 10.0;
        let mut s = nc(Stage::Shipment, "2025-03-01");
        s.cost_total = 5.0;
        let records = [p, s];
        assert_eq!(stage_costs(&records, &[Stage::Process, Stage::Shipment]).process, 15.0);
        assert_eq!(stage_costs(&records, &[Stage::Process]).process, 10.0);
    }

    #[test]
    fn categorized_series_drop_unlisted_keys() {
        let mk = |family: &str| InspectionRecord {
            product_family: family.to_string(),
            ..nc(Stage::Customer, "2025-04-01")
        };
        let data = YearlyData::new(vec![mk("GS")], vec![], vec![mk("GS"), mk("PTT"), mk("XYZ")]);
        let families = ["GS".to_string(), "PTT".to_string()];
        let series = categorized_monthly_count(
            &data,
            2025,
            InspectionRecord::is_nonconformity,
            &families,
            |r| Some(r.product_family.clone()),
        );
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].two_years_ago(), 1);
        assert_eq!(series[0].month(3), 1);
        assert_eq!(series[1].month(3), 1);
        let summed: u64 = series.iter().map(|s| s.current_total()).sum();
        assert_eq!(summed, 2);
    }

    #[test]
    fn categorized_costs_follow_category_order() {
        let mk = |stage, cost| InspectionRecord {
            cost_total: cost,
            ..nc(stage, "2025-08-01")
        };
        let data = YearlyData::new(
            vec![],
            vec![mk(Stage::Customer, 40.0)],
            vec![mk(Stage::Incoming, 10.0), mk(Stage::Customer, 2.5), mk(Stage::Customer, 1.5)],
        );
        let series = categorized_monthly_cost(
            &data,
            2025,
            InspectionRecord::is_nonconformity,
            &[Stage::Customer, Stage::Incoming],
            |r| Some(r.stage),
        );
        assert_eq!(series[0].last_year(), 40.0);
        assert_eq!(series[0].month(7), 4.0);
        assert_eq!(series[1].current_total(), 10.0);
    }

    #[test]
    fn supplier_origin_prefers_overseas_then_process_name() {
        let mut overseas = nc(Stage::Incoming, "");
        overseas.origin = OriginSite::IncomingOverseas;
        let mut outsourced = nc(Stage::Incoming, "");
        outsourced.origin = OriginSite::IncomingOutsourced;
        outsourced.prev_process = "Plating".into();
        let mut blank = outsourced.clone();
        blank.prev_process.clear();
        let mut elsewhere = nc(Stage::Incoming, "");
        elsewhere.origin = OriginSite::Other;

        assert_eq!(supplier_defect_origin(&overseas).as_deref(), Some("Material"));
        assert_eq!(supplier_defect_origin(&outsourced).as_deref(), Some("Plating"));
        assert_eq!(supplier_defect_origin(&blank).as_deref(), Some(OTHER_OUTSOURCED_LABEL));
        assert_eq!(supplier_defect_origin(&elsewhere), None);
        assert_eq!(supplier_defect_origin(&nc(Stage::Customer, "")), None);
    }

    #[test]
    fn nonconformity_origin_requires_failed_judgment() {
        let failed = |stage| InspectionRecord {
            judgment: Judgment::Fail,
            ..nc(stage, "")
        };
        let mut material = failed(Stage::Incoming);
        material.origin = OriginSite::IncomingOutsourced;
        let mut machining = failed(Stage::Process);
        machining.prev_process = "Machining".into();

        assert_eq!(nonconformity_origin(&material).as_deref(), Some("Material"));
        assert_eq!(nonconformity_origin(&machining).as_deref(), Some("Machining"));
        assert_eq!(nonconformity_origin(&failed(Stage::Shipment)).as_deref(), Some("Unknown"));
        assert_eq!(nonconformity_origin(&failed(Stage::Customer)), None);
        assert_eq!(nonconformity_origin(&nc(Stage::Process, "")), None);
    }

    #[test]
    fn defect_rollup_is_order_independent() {
        let rec = |d: DefectCounts| InspectionRecord {
            defects: d,
            ..Default::default()
        };
        let records = vec![
            rec(DefectCounts {
                dimension: 1.0,
                assembly: 2.0,
                missing: 3.0,
                ..Default::default()
            }),
            rec(DefectCounts {
                shape: 4.0,
                appearance: 5.0,
                feature: 6.0,
                other: 7.0,
                ..Default::default()
            }),
            rec(DefectCounts::default()),
        ];
        let forward = defect_rollup(&records);
        let backward = defect_rollup(records.iter().rev());
        assert_eq!(forward, backward);
        assert_eq!(forward.values(), [3.0, 3.0, 9.0, 6.0, 7.0]);
        assert_eq!(forward.total(), 28.0);
    }

    #[test]
    fn defect_trend_is_ascending_with_sum_last() {
        let rollup = DefectRollup {
            dimension: 5.0,
            missing: 1.0,
            visual: 9.0,
            label: 0.0,
            qty: 1.0,
        };
        let trend = defect_trend(&rollup);
        let labels: Vec<&str> = trend.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ["Label", "Missing", "Qty", "Dim's", "Visual", "Sum"]);
        assert_eq!(trend[5].1, 16.0);
    }

    #[test]
    fn urgent_split_counts_only_official_passes() {
        let pass = |issued: &str, urgent: bool| InspectionRecord {
            official: Officiality::Yes,
            judgment: Judgment::Pass,
            urgent,
            ..inspection(issued)
        };
        let mut unofficial = pass("2025-02-01", true);
        unofficial.official = Officiality::No;
        let records = vec![
            pass("2025-02-01", true),
            pass("2025-02-10", false),
            pass("2025-02-26", false),
            pass("2024-06-01", true),
            unofficial,
        ];
        let split = urgent_split(&records, 2025);
        assert_eq!(split.urgent[2], 1);
        assert_eq!(split.regular[2], 1);
        assert_eq!(split.regular[3], 1);
        assert_eq!(split.urgent[0], 1);
        assert_eq!(split.regular[0], 2);
        assert_eq!(split.urgent_pct[2], 50.0);
        assert_eq!(split.urgent_pct[5], 0.0);
    }

    #[test]
    fn officiality_split_partitions_yes_and_no() {
        let claim = |official| InspectionRecord {
            official,
            ..nc(Stage::Customer, "2025-05-05")
        };
        let data = YearlyData::new(
            vec![],
            vec![claim(Officiality::Yes), claim(Officiality::Unknown)],
            vec![claim(Officiality::Yes), claim(Officiality::No), claim(Officiality::Unknown)],
        );
        let [all, official, unofficial] =
            officiality_split(&data, 2025, |r| r.is_nonconformity() && r.stage == Stage::Customer);
        assert_eq!(all.last_year(), 2);
        assert_eq!(official.last_year(), 1);
        assert_eq!(unofficial.last_year(), 0);
        assert_eq!(all.month(4), 3);
        assert_eq!(official.month(4), 1);
        assert_eq!(unofficial.month(4), 1);
    }

    #[test]
    fn tally_skips_unclassified_records() {
        let mut a = nc(Stage::Incoming, "");
        a.origin = OriginSite::IncomingOverseas;
        let records = vec![a.clone(), a, nc(Stage::Customer, "")];
        let counts = tally(&records, supplier_defect_origin);
        assert_eq!(counts.entries(), [("Material".to_string(), 2)]);
    }
}
