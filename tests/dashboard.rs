use chrono::NaiveDate;
use qms_dashboard::aggregate::MATERIAL_LABEL;
use qms_dashboard::series::OTHERS_LABEL;
use qms_dashboard::types::{Judgment, Officiality, OriginSite, RawRow, RecordKind, Stage};
use qms_dashboard::{
    compose_dashboard, DashboardConfig, InspectionRecord, MonthlySeries, YearlyData,
};

fn raw(category: &str, date: &str) -> RawRow {
    RawRow {
        category: Some(category.to_string()),
        issue_date: Some(date.to_string()),
        ..Default::default()
    }
}

fn claim(family: &str, date: &str, official: &str) -> InspectionRecord {
    InspectionRecord::from_raw(&RawRow {
        product_family: Some(family.to_string()),
        top_classification: Some("customer".to_string()),
        official_count: Some(official.to_string()),
        ..raw("nonconformity", date)
    })
}

fn assert_sealed<T>(series: &MonthlySeries<T>)
where
    T: qms_dashboard::series::SeriesValue + std::fmt::Debug,
{
    let months: T = series.months().iter().copied().sum();
    assert_eq!(series.current_total(), months);
}

#[test]
fn day_26_claim_lands_in_february() {
    let data = YearlyData::new(vec![], vec![], vec![claim("GS", "2025-01-26", "YES")]);
    let dash = compose_dashboard(&DashboardConfig::default(), &data);

    let gs = &dash.customer_claims[0];
    assert_eq!(gs.family, "GS");
    assert_eq!(gs.all.slots()[4], 1);
    assert_eq!(gs.all.slots()[3], 0);
    assert_eq!(gs.all.slots()[2], 1);
    assert_eq!(gs.official.slots()[4], 1);
    assert_eq!(gs.unofficial.current_total(), 0);
    assert_eq!(dash.customer_claims[1].all.current_total(), 0);
    assert_eq!(dash.total_nonconformities.month(1), 1);
}

#[test]
fn day_25_claim_stays_in_january() {
    let data = YearlyData::new(vec![], vec![], vec![claim("PTT", "2025-01-25", "NO")]);
    let dash = compose_dashboard(&DashboardConfig::default(), &data);
    let ptt = &dash.customer_claims[1];
    assert_eq!(ptt.all.slots()[3], 1);
    assert_eq!(ptt.unofficial.slots()[3], 1);
    assert_eq!(ptt.official.current_total(), 0);
}

#[test]
fn prior_years_are_lump_sums_with_the_same_filter() {
    let data = YearlyData::new(
        vec![claim("GS", "", "YES"), claim("PTT", "2023-05-01", "YES")],
        vec![claim("GS", "2024-12-31", "NO"), claim("GS", "bad", "YES")],
        vec![claim("GS", "2024-12-26", "YES"), claim("GS", "2025-12-26", "YES")],
    );
    let dash = compose_dashboard(&DashboardConfig::default(), &data);
    let gs = &dash.customer_claims[0];
    assert_eq!(gs.all.two_years_ago(), 1);
    assert_eq!(gs.all.last_year(), 2);
    assert_eq!(gs.official.last_year(), 1);
    assert_eq!(gs.unofficial.last_year(), 1);
    assert_eq!(gs.all.month(0), 1);
    assert_eq!(gs.all.current_total(), 1);
}

#[test]
fn incoming_costs_roll_up_across_separators() {
    let cost = |value: &str| {
        InspectionRecord::from_raw(&RawRow {
            top_classification: Some("수입".to_string()),
            cost_total: Some(value.to_string()),
            product_family: Some("GS".to_string()),
            ..raw("부적합", "2025-04-02")
        })
    };
    let data = YearlyData::new(vec![], vec![cost("700")], vec![cost("1,000"), cost("2,500")]);
    let dash = compose_dashboard(&DashboardConfig::default(), &data);
    assert_eq!(dash.conq_current.incoming, 3500.0);
    assert_eq!(dash.conq_current.total, 3500.0);
    assert_eq!(dash.conq_comparison.labels, ["Sum", "Customer", "Process", "Incoming"]);
    assert_eq!(dash.conq_comparison.current, [3500.0, 0.0, 0.0, 3500.0]);
    assert_eq!(dash.conq_comparison.prior, [700.0, 0.0, 0.0, 700.0]);
    assert_eq!(dash.conq_by_family[0].series.month(3), 3500.0);
    assert_eq!(dash.conq_by_family[0].series.last_year(), 700.0);
}

#[test]
fn nine_customers_collapse_into_others() {
    let mut current = Vec::new();
    for (i, count) in [10, 9, 8, 7, 6, 5, 4, 3, 2].iter().enumerate() {
        for _ in 0..*count {
            current.push(InspectionRecord {
                kind: RecordKind::Inspection,
                judgment: Judgment::Pass,
                customer: format!("Customer {}", i + 1),
                issue_date: NaiveDate::from_ymd_opt(2025, 3, 3),
                ..Default::default()
            });
        }
    }
    let data = YearlyData::new(vec![], vec![], current);
    let dash = compose_dashboard(&DashboardConfig::default(), &data);
    let customers = &dash.inspection_customers;
    assert_eq!(customers.len(), 6);
    assert_eq!(customers.labels[5], OTHERS_LABEL);
    assert_eq!(customers.values[5], 14);
    assert_eq!(customers.values[..5], [10, 9, 8, 7, 6]);
    assert_eq!(dash.total_inspections.month(2), 54);
}

#[test]
fn supplier_series_compare_current_top_against_prior() {
    let supplier = |origin: OriginSite, process: &str, family: &str| InspectionRecord {
        kind: RecordKind::Nonconformity,
        stage: Stage::Incoming,
        origin,
        prev_process: process.to_string(),
        product_family: family.to_string(),
        issue_date: NaiveDate::from_ymd_opt(2025, 6, 10),
        ..Default::default()
    };
    let data = YearlyData::new(
        vec![],
        vec![
            supplier(OriginSite::IncomingOutsourced, "Plating", "GS"),
            supplier(OriginSite::IncomingOutsourced, "Welding", "GS"),
        ],
        vec![
            supplier(OriginSite::IncomingOverseas, "", "GS"),
            supplier(OriginSite::IncomingOverseas, "", "PTT"),
            supplier(OriginSite::IncomingOutsourced, "Plating", "PTT"),
            supplier(OriginSite::Other, "", "PTT"),
        ],
    );
    let dash = compose_dashboard(&DashboardConfig::default(), &data);

    assert_eq!(dash.supplier_claims.all.month(5), 4);
    assert_eq!(dash.supplier_claims.all.last_year(), 2);
    assert_eq!(dash.supplier_claims.by_family[0].series.month(5), 1);
    assert_eq!(dash.supplier_claims.by_family[1].series.month(5), 3);

    assert_eq!(dash.supplier_origins.labels, [MATERIAL_LABEL, "Plating"]);
    assert_eq!(dash.supplier_comparison.labels, ["Sum", MATERIAL_LABEL, "Plating"]);
    assert_eq!(dash.supplier_comparison.current, [3, 2, 1]);
    assert_eq!(dash.supplier_comparison.prior, [2, 0, 1]);
}

#[test]
fn urgent_inspections_split_by_flag() {
    let inspection = |date: &str, urgent: bool, customer: &str| InspectionRecord {
        kind: RecordKind::Inspection,
        official: Officiality::Yes,
        judgment: Judgment::Pass,
        urgent,
        customer: customer.to_string(),
        issue_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
        ..Default::default()
    };
    let data = YearlyData::new(
        vec![],
        vec![],
        vec![
            inspection("2025-03-01", true, "ACME"),
            inspection("2025-03-02", true, ""),
            inspection("2025-03-03", false, "ACME"),
            inspection("2025-03-04", false, "ACME"),
        ],
    );
    let dash = compose_dashboard(&DashboardConfig::default(), &data);
    let split = &dash.urgent_inspections;
    assert_eq!(split.urgent[3], 2);
    assert_eq!(split.regular[3], 2);
    assert_eq!(split.urgent_pct[3], 50.0);
    assert_eq!(split.urgent_pct[0], 50.0);
    assert_eq!(split.urgent_pct[1], 0.0);
    assert_eq!(dash.urgent_customers.labels, ["ACME", "Unknown"]);
}

#[test]
fn defects_cover_customer_claims_only() {
    let defect = |stage: &str, dimension: &str, appearance: &str| {
        InspectionRecord::from_raw(&RawRow {
            top_classification: Some(stage.to_string()),
            dimension: Some(dimension.to_string()),
            appearance: Some(appearance.to_string()),
            ..raw("부적합", "2025-02-02")
        })
    };
    let data = YearlyData::new(
        vec![],
        vec![],
        vec![defect("고객", "2", "x"), defect("고객", "", "3"), defect("공정", "100", "100")],
    );
    let dash = compose_dashboard(&DashboardConfig::default(), &data);
    assert_eq!(dash.defects.total, 5.0);
    assert_eq!(dash.defects.current.get("Dim's"), Some(2.0));
    assert_eq!(dash.defects.current.get("Visual"), Some(3.0));
    assert_eq!(dash.defects.trend.labels.last().map(String::as_str), Some("Sum"));
    assert_eq!(dash.defects.trend.values.last(), Some(&5.0));
}

#[test]
fn every_monthly_series_keeps_current_total_sealed() {
    let mut current = Vec::new();
    for day in 1..=28 {
        for month in 1..=12 {
            let date = format!("2025-{month:02}-{day:02}");
            current.push(claim(if day % 2 == 0 { "GS" } else { "PTT" }, &date, "YES"));
        }
    }
    let data = YearlyData::new(vec![], vec![], current);
    let dash = compose_dashboard(&DashboardConfig::default(), &data);
    assert_sealed(&dash.total_nonconformities);
    for claims in &dash.customer_claims {
        assert_sealed(&claims.all);
        assert_sealed(&claims.official);
        assert_sealed(&claims.unofficial);
    }
    for conq in &dash.conq_by_family {
        assert_sealed(&conq.series);
    }
    assert_sealed(&dash.supplier_claims.all);
    // 3 days of December (26..=28) report into next year
    assert_eq!(dash.total_nonconformities.current_total(), 12 * 28 - 3);
}

#[test]
fn configured_families_and_year_drive_the_output() {
    let config = DashboardConfig {
        current_year: 2026,
        product_families: vec!["MX".to_string()],
        ..Default::default()
    };
    let data = YearlyData::new(vec![], vec![], vec![claim("MX", "2025-12-26", "YES")]);
    let dash = compose_dashboard(&config, &data);
    assert_eq!(dash.labels[..3], ["2024", "2025", "2026"]);
    assert_eq!(dash.customer_claims.len(), 1);
    assert_eq!(dash.customer_claims[0].all.month(0), 1);
}

#[test]
fn dashboard_serializes_series_as_flat_arrays() {
    let data = YearlyData::new(vec![], vec![], vec![claim("GS", "2025-01-26", "YES")]);
    let dash = compose_dashboard(&DashboardConfig::default(), &data);
    let json = serde_json::to_value(&dash).unwrap();
    let slots = json["customer_claims"][0]["all"].as_array().unwrap();
    assert_eq!(slots.len(), 15);
    assert_eq!(slots[4], 1);
    assert_eq!(json["labels"][3], "Jan");
}
