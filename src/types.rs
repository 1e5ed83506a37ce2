use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::util::{parse_cost, parse_date_safe};

/// One row of a yearly inspection export, exactly as it appears in the CSV.
///
/// Headers are the ones produced by the quality system; English aliases
/// are accepted for hand-made files.
#[derive(Debug, Default, Deserialize)]
pub struct RawRow {
    #[serde(rename = "구분", alias = "category")]
    pub category: Option<String>,
    #[serde(rename = "Issue 일자", alias = "issueDate")]
    pub issue_date: Option<String>,
    #[serde(rename = "제품군", alias = "productFamily")]
    pub product_family: Option<String>,
    #[serde(rename = "집계분류(대)", alias = "topClassification")]
    pub top_classification: Option<String>,
    #[serde(rename = "이전공정(발생처)", alias = "occurrencePrevProcess")]
    pub occurrence_prev_process: Option<String>,
    #[serde(rename = "발생처/검사처", alias = "originOrInspectionSite")]
    pub origin_site: Option<String>,
    #[serde(rename = "고객사", alias = "customer")]
    pub customer: Option<String>,
    #[serde(rename = "집계여부", alias = "isOfficialCount")]
    pub official_count: Option<String>,
    #[serde(rename = "판정", alias = "judgment")]
    pub judgment: Option<String>,
    #[serde(rename = "긴급검사 여부", alias = "isUrgent")]
    pub urgent: Option<String>,
    #[serde(rename = "F-Cost_합계", alias = "costTotal")]
    pub cost_total: Option<String>,
    #[serde(rename = "치수", alias = "dimension")]
    pub dimension: Option<String>,
    #[serde(rename = "조립", alias = "assembly")]
    pub assembly: Option<String>,
    #[serde(rename = "누락", alias = "missing")]
    pub missing: Option<String>,
    #[serde(rename = "형상", alias = "shape")]
    pub shape: Option<String>,
    #[serde(rename = "외관", alias = "appearance")]
    pub appearance: Option<String>,
    #[serde(rename = "특성", alias = "feature")]
    pub feature: Option<String>,
    #[serde(rename = "기타", alias = "other")]
    pub other: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordKind {
    Inspection,
    Nonconformity,
    #[default]
    Other,
}

impl RecordKind {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "검사" => Self::Inspection,
            "부적합" => Self::Nonconformity,
            t if t.eq_ignore_ascii_case("inspection") => Self::Inspection,
            t if t.eq_ignore_ascii_case("nonconformity") => Self::Nonconformity,
            _ => Self::Other,
        }
    }
}

/// Pipeline stage where a nonconformity was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Incoming,
    Customer,
    Process,
    Shipment,
    #[default]
    Other,
}

impl Stage {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "수입" => Self::Incoming,
            "고객" => Self::Customer,
            "공정" => Self::Process,
            "출하" => Self::Shipment,
            t => match t.to_ascii_lowercase().as_str() {
                "incoming" => Self::Incoming,
                "customer" => Self::Customer,
                "process" => Self::Process,
                "shipment" => Self::Shipment,
                _ => Self::Other,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OriginSite {
    IncomingOverseas,
    IncomingOutsourced,
    #[default]
    Other,
}

impl OriginSite {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "수입(해외)" => Self::IncomingOverseas,
            "수입(외주)" => Self::IncomingOutsourced,
            t if t.eq_ignore_ascii_case("incoming-overseas") => Self::IncomingOverseas,
            t if t.eq_ignore_ascii_case("incoming-outsourced") => Self::IncomingOutsourced,
            _ => Self::Other,
        }
    }
}

/// Whether a customer nonconformity counts toward official claim totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Officiality {
    Yes,
    No,
    #[default]
    Unknown,
}

impl Officiality {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "YES" => Self::Yes,
            "NO" => Self::No,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Judgment {
    Pass,
    Fail,
    #[default]
    Other,
}

impl Judgment {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "합격" => Self::Pass,
            "불합격" => Self::Fail,
            t if t.eq_ignore_ascii_case("pass") => Self::Pass,
            t if t.eq_ignore_ascii_case("fail") => Self::Fail,
            _ => Self::Other,
        }
    }
}

/// Raw defect-type quantities of a nonconformity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DefectCounts {
    pub dimension: f64,
    pub assembly: f64,
    pub missing: f64,
    pub shape: f64,
    pub appearance: f64,
    pub feature: f64,
    pub other: f64,
}

/// A cleaned inspection or nonconformity record. Built once at load time.
#[derive(Debug, Clone, Default)]
pub struct InspectionRecord {
    pub kind: RecordKind,
    pub issue_date: Option<NaiveDate>,
    pub product_family: String,
    pub stage: Stage,
    pub prev_process: String,
    pub origin: OriginSite,
    pub customer: String,
    pub official: Officiality,
    pub judgment: Judgment,
    pub urgent: bool,
    pub cost_total: f64,
    pub defects: DefectCounts,
}

impl InspectionRecord {
    pub fn from_raw(row: &RawRow) -> Self {
        let text = |v: &Option<String>| v.as_deref().unwrap_or("").trim().to_string();
        let num = |v: &Option<String>| parse_cost(v.as_deref());
        Self {
            kind: RecordKind::parse(&text(&row.category)),
            issue_date: parse_date_safe(row.issue_date.as_deref()),
            product_family: text(&row.product_family),
            stage: Stage::parse(&text(&row.top_classification)),
            prev_process: text(&row.occurrence_prev_process),
            origin: OriginSite::parse(&text(&row.origin_site)),
            customer: text(&row.customer),
            official: Officiality::parse(&text(&row.official_count)),
            judgment: Judgment::parse(&text(&row.judgment)),
            urgent: text(&row.urgent) == "Y",
            cost_total: num(&row.cost_total),
            defects: DefectCounts {
                dimension: num(&row.dimension),
                assembly: num(&row.assembly),
                missing: num(&row.missing),
                shape: num(&row.shape),
                appearance: num(&row.appearance),
                feature: num(&row.feature),
                other: num(&row.other),
            },
        }
    }

    pub fn is_inspection(&self) -> bool {
        self.kind == RecordKind::Inspection
    }

    pub fn is_nonconformity(&self) -> bool {
        self.kind == RecordKind::Nonconformity
    }

    /// Passed inspection that counts toward official totals.
    pub fn is_official_pass(&self) -> bool {
        self.is_inspection() && self.official == Officiality::Yes && self.judgment == Judgment::Pass
    }
}

/// The three yearly datasets the dashboard is built from, oldest first.
#[derive(Debug, Clone, Default)]
pub struct YearlyData {
    pub two_years_ago: Vec<InspectionRecord>,
    pub last_year: Vec<InspectionRecord>,
    pub current: Vec<InspectionRecord>,
}

impl YearlyData {
    pub fn new(
        two_years_ago: Vec<InspectionRecord>,
        last_year: Vec<InspectionRecord>,
        current: Vec<InspectionRecord>,
    ) -> Self {
        Self {
            two_years_ago,
            last_year,
            current,
        }
    }

    pub fn total_records(&self) -> usize {
        self.two_years_ago.len() + self.last_year.len() + self.current.len()
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct BreakdownRow {
    #[serde(rename = "Chart")]
    #[tabled(rename = "Chart")]
    pub chart: String,
    #[serde(rename = "Label")]
    #[tabled(rename = "Label")]
    pub label: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "Share")]
    #[tabled(rename = "Share")]
    pub share: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ComparisonRow {
    #[serde(rename = "Chart")]
    #[tabled(rename = "Chart")]
    pub chart: String,
    #[serde(rename = "Label")]
    #[tabled(rename = "Label")]
    pub label: String,
    #[serde(rename = "Current")]
    #[tabled(rename = "Current")]
    pub current: String,
    #[serde(rename = "Prior")]
    #[tabled(rename = "Prior")]
    pub prior: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CustomerBacklogRow {
    #[serde(rename = "Customer")]
    #[tabled(rename = "Customer")]
    pub customer: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: String,
    #[serde(rename = "TotalQty")]
    #[tabled(rename = "TotalQty")]
    pub total_qty: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct BacklogRow {
    #[serde(rename = "WorkOrder")]
    #[tabled(rename = "WorkOrder")]
    pub work_order: String,
    #[serde(rename = "TransferDate")]
    #[tabled(rename = "TransferDate")]
    pub transfer_date: String,
    #[serde(rename = "ElapsedDays")]
    #[tabled(rename = "ElapsedDays")]
    pub elapsed_days: i64,
    #[serde(rename = "Warning")]
    #[tabled(rename = "Warning")]
    pub warning: String,
}
