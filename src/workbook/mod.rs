//! Workbook Builder: turns a family's fetched reports into an in-memory
//! multi-sheet workbook, then [`writer`] serialises it as `.xlsx`.
//!
//! Cells carry raw values. Numbers are written as numbers and never
//! pre-formatted, so the spreadsheet can still sum them.

mod rolling;
mod tables;
mod writer;

pub use writer::{save_workbook, write_workbook};

use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::filter::MonthKey;
use crate::report::{Family, ReportKind, ReportPayload, SummaryReport};

/// Maximum worksheet name length accepted by spreadsheet applications.
pub const MAX_SHEET_NAME: usize = 31;

const BRAND: &str = "GoKite";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Blank,
}

impl Cell {
    /// Number, with an absent value written as zero.
    pub fn zero(value: Option<f64>) -> Self {
        Cell::Number(value.unwrap_or(0.0))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<Option<f64>> for Cell {
    fn from(n: Option<f64>) -> Self {
        n.map_or(Cell::Blank, Cell::Number)
    }
}

impl From<Option<u64>> for Cell {
    fn from(n: Option<u64>) -> Self {
        n.map_or(Cell::Blank, |n| Cell::Number(n as f64))
    }
}

impl From<Option<String>> for Cell {
    fn from(s: Option<String>) -> Self {
        s.map_or(Cell::Blank, Cell::Text)
    }
}

impl From<Option<&String>> for Cell {
    fn from(s: Option<&String>) -> Self {
        s.map_or(Cell::Blank, |s| Cell::Text(s.clone()))
    }
}

/// One worksheet: a jagged grid of cells plus column widths in characters.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<Cell>>,
    widths: Vec<f64>,
}

impl Sheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: truncate_sheet_name(name),
            rows: Vec::new(),
            widths: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    pub fn row(&mut self, cells: Vec<Cell>) {
        self.rows.push(cells);
    }

    /// Row of text labels.
    pub fn header<S: AsRef<str>>(&mut self, labels: impl IntoIterator<Item = S>) {
        self.rows
            .push(labels.into_iter().map(|s| Cell::from(s.as_ref())).collect());
    }

    /// Spacer row between groups.
    pub fn blank_row(&mut self) {
        self.rows.push(vec![Cell::Text(String::new())]);
    }

    pub fn set_widths(&mut self, widths: impl IntoIterator<Item = f64>) {
        self.widths = widths.into_iter().collect();
    }

    /// Text of the cell at `(row, col)`, if it is text.
    pub fn text_at(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_text()
    }

    pub fn number_at(&self, row: usize, col: usize) -> Option<f64> {
        self.rows.get(row)?.get(col)?.as_number()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    fn push(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }
}

/// What the summary sheet says about the export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportContext {
    pub family: Family,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    /// Entity names, or the raw id list for families that export ids.
    pub selection: String,
}

/// Sheet names longer than the spreadsheet limit are cut, never rejected.
pub fn truncate_sheet_name(name: &str) -> String {
    name.chars().take(MAX_SHEET_NAME).collect()
}

/// Column heading for the `index`-th month of a rolling report. The first
/// month is always the current one.
pub fn month_label(month: &str, index: usize) -> String {
    if index == 0 {
        return "Current Month".to_string();
    }
    match MonthKey::parse(month) {
        Ok(key) => key.short_label(),
        Err(_) => month.to_string(),
    }
}

pub(crate) fn month_labels(months: &[String]) -> Vec<String> {
    months
        .iter()
        .enumerate()
        .map(|(i, m)| month_label(m, i))
        .collect()
}

/// Build the workbook for `ctx.family`. The summary sheet is always present;
/// every other sheet is emitted only when its report is in `reports`.
pub fn build_workbook(ctx: &ExportContext, reports: &BTreeMap<ReportKind, ReportPayload>) -> Workbook {
    let mut workbook = Workbook::default();

    let summary = match reports.get(&ctx.family.summary()) {
        Some(ReportPayload::Summary(summary)) => Some(summary),
        _ => None,
    };
    workbook.push(summary_sheet(ctx, summary));

    for &kind in ctx.family.panels() {
        let Some(payload) = reports.get(&kind) else {
            tracing::debug!(%kind, "no data, sheet omitted");
            continue;
        };
        if kind.needs_months() && payload.months().is_none() {
            tracing::debug!(%kind, "no months in reply, sheet omitted");
            continue;
        }
        workbook.push(report_sheet(kind, payload));
    }
    workbook
}

fn summary_sheet(ctx: &ExportContext, summary: Option<&SummaryReport>) -> Sheet {
    let mut sheet = Sheet::new("Summary");
    let selection_label = if ctx.family.exports_entity_names() {
        "Companies Selected"
    } else {
        "Branches Selected"
    };

    sheet.header([format!("{BRAND} {}", ctx.family.title())]);
    sheet.header([""]);
    sheet.row(vec![
        "Period".into(),
        format!("{} to {}", ctx.date_from, ctx.date_to).into(),
    ]);
    sheet.row(vec![selection_label.into(), ctx.selection.clone().into()]);
    sheet.header([""]);
    sheet.header(["KPI", "Value"]);
    for kpi in ctx.family.kpis() {
        let value = summary
            .and_then(|s| s.kpis.get(kpi.key))
            .map_or_else(|| "—".into(), kpi_cell);
        sheet.row(vec![kpi.label.into(), value]);
    }
    sheet.set_widths([30.0, 25.0]);
    sheet
}

fn kpi_cell(value: &Value) -> Cell {
    match value {
        Value::Number(n) => n.as_f64().map_or(Cell::Blank, Cell::Number),
        Value::String(s) => Cell::Text(s.clone()),
        Value::Null => "—".into(),
        other => Cell::Text(other.to_string()),
    }
}

/// Sheet for one panel report. The payload variant decides the layout; the
/// kind only picks names and labels where two reports share a shape.
pub fn report_sheet(kind: ReportKind, payload: &ReportPayload) -> Sheet {
    let mut sheet = Sheet::new(kind.sheet_name());
    match payload {
        ReportPayload::Summary(summary) => {
            sheet.header(["Key", "Value"]);
            for (key, value) in &summary.kpis {
                sheet.row(vec![key.as_str().into(), kpi_cell(value)]);
            }
            sheet.set_widths([30.0, 25.0]);
        }
        ReportPayload::DepartmentProfit(r) => tables::department_profit(&mut sheet, kind, r),
        ReportPayload::SalesTeamStaff(r) => tables::sales_team_staff(&mut sheet, r),
        ReportPayload::DepartmentStaff(r) => tables::department_staff(&mut sheet, r),
        ReportPayload::Frontline(r) => tables::frontline(&mut sheet, r),
        ReportPayload::Outstanding(r) => tables::outstanding(&mut sheet, r),
        ReportPayload::OutstandingByCompany(r) => tables::outstanding_by_company(&mut sheet, r),
        ReportPayload::DepartmentProducts(r) => tables::department_products(&mut sheet, r),
        ReportPayload::FundCollection(r) => tables::fund_collection(&mut sheet, r),
        ReportPayload::AgencyConversion(r) => tables::agency_conversion(&mut sheet, r),
        ReportPayload::B2bComparison(r) => tables::b2b_comparison(&mut sheet, r),
        ReportPayload::CorporateClients(r) => tables::corporate_clients(&mut sheet, r),
        ReportPayload::CustomerBalance(r) => tables::customer_balance(&mut sheet, r),
        ReportPayload::MonthComparison(r) => rolling::month_comparison(&mut sheet, kind, r),
        ReportPayload::Conversion(r) => rolling::conversion(&mut sheet, kind, r),
        ReportPayload::Review(r) => rolling::review(&mut sheet, r),
        ReportPayload::BranchReview(r) => rolling::branch_review(&mut sheet, r),
        ReportPayload::IndividualDetails(r) => rolling::individual_details(&mut sheet, r),
        ReportPayload::TeamWise(r) => rolling::team_wise(&mut sheet, r),
        ReportPayload::RollingCount(r) => rolling::rolling_count(&mut sheet, kind, r),
        ReportPayload::RollingAmount(r) => rolling::rolling_amount(&mut sheet, kind, r),
        ReportPayload::AbscondingMonthly(r) => rolling::absconding_monthly(&mut sheet, r),
    }
    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::DepartmentProfitReport;
    use serde_json::json;

    fn ctx(family: Family) -> ExportContext {
        ExportContext {
            family,
            date_from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            selection: "Alpha, Beta".to_string(),
        }
    }

    #[test]
    fn first_month_is_current_month() {
        assert_eq!(month_label("2026-01", 0), "Current Month");
        assert_eq!(month_label("2025-12", 1), "Dec 2025");
        assert_eq!(month_label("2025-11-01", 2), "Nov 2025");
        assert_eq!(month_label("later", 3), "later");
    }

    #[test]
    fn long_sheet_names_are_truncated() {
        let long = "A".repeat(40);
        assert_eq!(Sheet::new(&long).name().chars().count(), MAX_SHEET_NAME);
        assert_eq!(Sheet::new("Summary").name(), "Summary");
    }

    #[test]
    fn summary_sheet_is_always_emitted() {
        let workbook = build_workbook(&ctx(Family::Retail), &BTreeMap::new());
        assert_eq!(workbook.sheet_names(), vec!["Summary"]);

        let summary = workbook.sheet("Summary").unwrap();
        assert_eq!(summary.text_at(0, 0), Some("GoKite Monthly Retail Summary Report"));
        assert_eq!(summary.text_at(2, 1), Some("2026-01-01 to 2026-01-31"));
        assert_eq!(summary.text_at(3, 0), Some("Companies Selected"));
        assert_eq!(summary.text_at(5, 0), Some("KPI"));
        for row in 6..summary.rows().len() {
            assert_eq!(summary.text_at(row, 1), Some("—"));
        }
    }

    #[test]
    fn summary_kpis_keep_raw_numbers() {
        let mut reports = BTreeMap::new();
        reports.insert(
            ReportKind::BranchesSummary,
            ReportPayload::decode(
                ReportKind::BranchesSummary,
                json!({"total_sales_amount": 1234567.5, "total_sale_count": 12}),
            )
            .unwrap(),
        );
        let workbook = build_workbook(&ctx(Family::Branches), &reports);
        let summary = workbook.sheet("Summary").unwrap();
        assert_eq!(summary.text_at(3, 0), Some("Branches Selected"));
        assert_eq!(summary.number_at(6, 1), Some(1234567.5));
        assert_eq!(summary.text_at(7, 1), Some("—"));
        assert_eq!(summary.text_at(9, 0), Some("Total Sale Count"));
        assert_eq!(summary.number_at(9, 1), Some(12.0));
        assert_eq!(summary.widths(), &[30.0, 25.0]);
    }

    #[test]
    fn sheets_follow_family_order_and_skip_missing_reports() {
        let mut reports = BTreeMap::new();
        for kind in [ReportKind::RetailOutstanding, ReportKind::RetailDepartmentWise] {
            reports.insert(
                kind,
                ReportPayload::decode(kind, json!({"data": []})).unwrap(),
            );
        }
        let workbook = build_workbook(&ctx(Family::Retail), &reports);
        assert_eq!(
            workbook.sheet_names(),
            vec!["Summary", "Department Wise", "Outstanding List"]
        );
    }

    #[test]
    fn later_sheet_keeps_its_place_when_a_middle_report_is_absent() {
        let mut reports = BTreeMap::new();
        reports.insert(
            ReportKind::RetailTotalReview,
            ReportPayload::decode(ReportKind::RetailTotalReview, json!({"months": ["2026-01"]}))
                .unwrap(),
        );
        reports.insert(
            ReportKind::RetailDepartmentWise,
            ReportPayload::decode(ReportKind::RetailDepartmentWise, json!({"data": []})).unwrap(),
        );
        assert!(!reports.contains_key(&ReportKind::SalesTeamStaff));

        let workbook = build_workbook(&ctx(Family::Retail), &reports);
        assert_eq!(
            workbook.sheet_names(),
            vec!["Summary", "Department Wise", "Total Review"]
        );
    }

    #[test]
    fn branch_rolling_sheets_need_a_month_list() {
        let mut reports = BTreeMap::new();
        for kind in [ReportKind::BranchesTotalReview, ReportKind::FinePrevComparison] {
            reports.insert(kind, ReportPayload::decode(kind, json!({"data": []})).unwrap());
        }
        reports.insert(
            ReportKind::AbscondingMonthly,
            ReportPayload::decode(ReportKind::AbscondingMonthly, json!({"months": null})).unwrap(),
        );
        reports.insert(
            ReportKind::BranchesPrevMonthComparison,
            ReportPayload::decode(ReportKind::BranchesPrevMonthComparison, json!({"months": []}))
                .unwrap(),
        );

        let workbook = build_workbook(&ctx(Family::Branches), &reports);
        assert_eq!(workbook.sheet_names(), vec!["Summary", "Prev Month Comparison"]);
    }

    #[test]
    fn every_sheet_name_fits_the_limit() {
        for family in Family::ALL {
            for kind in family.reports() {
                assert!(kind.sheet_name().chars().count() <= MAX_SHEET_NAME);
            }
        }
        let sheet = report_sheet(
            ReportKind::RetailDepartmentWise,
            &ReportPayload::DepartmentProfit(DepartmentProfitReport::default()),
        );
        assert_eq!(sheet.name(), "Department Wise");
    }
}
