//! Terminal presentation: number formatting and `tabled` tables.
//!
//! Formatting lives only here. Workbook cells stay raw.

use tabled::{builder::Builder, settings::Style, Table, Tabled};

use crate::report::{Entity, Family, KpiUnit, ReportKind, SummaryReport};
use crate::section::SectionState;
use crate::workbook::{Cell, Sheet};

pub const CURRENCY: &str = "AED";

pub fn format_grouped_int(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    let mut grouped: String = out.chars().rev().collect();
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

/// Grouped with two decimals, e.g. `1,234.50`.
pub fn format_decimal(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as i64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}{}.{:02}", format_grouped_int(cents / 100), cents % 100)
}

pub fn format_currency(value: f64) -> String {
    format!("{CURRENCY} {}", format_decimal(value))
}

pub fn format_count(value: f64) -> String {
    format_grouped_int(value.round() as i64)
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Share of the revenue target reached, capped at 100. `None` when either
/// figure is missing or zero.
pub fn target_progress(revenue: Option<f64>, target: Option<f64>) -> Option<u32> {
    let (revenue, target) = (revenue?, target?);
    if revenue == 0.0 || target == 0.0 {
        return None;
    }
    Some((revenue / target * 100.0).round().clamp(0.0, 100.0) as u32)
}

fn format_cell(cell: &Cell) -> String {
    match cell {
        Cell::Text(s) => s.clone(),
        Cell::Number(n) if n.fract() == 0.0 => format_count(*n),
        Cell::Number(n) => format_decimal(*n),
        Cell::Blank => String::new(),
    }
}

const REVENUE_KEY: &str = "total_revenue";
const REVENUE_TARGET_KEY: &str = "total_revenue_target";

#[derive(Tabled)]
struct KpiRow {
    #[tabled(rename = "KPI")]
    label: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

/// Summary cards. Missing KPIs read `—`.
pub fn kpi_table(family: Family, summary: Option<&SummaryReport>) -> String {
    let rows: Vec<KpiRow> = family
        .kpis()
        .iter()
        .map(|kpi| {
            let mut value = summary.and_then(|s| s.number(kpi.key)).map_or_else(
                || "—".to_string(),
                |v| match kpi.unit {
                    KpiUnit::Currency => format_currency(v),
                    KpiUnit::Percent => format_percent(v),
                    KpiUnit::Count => format_count(v),
                },
            );
            if kpi.key == REVENUE_TARGET_KEY {
                let progress = summary.and_then(|s| {
                    target_progress(s.number(REVENUE_KEY), s.number(REVENUE_TARGET_KEY))
                });
                if let Some(pct) = progress {
                    value.push_str(&format!(" ({pct}% achieved)"));
                }
            }
            KpiRow {
                label: kpi.label.to_string(),
                value,
            }
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Render a projected sheet. Short rows are padded so the grid is square.
pub fn sheet_table(sheet: &Sheet) -> String {
    let columns = sheet.rows().iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        return "(no rows)".to_string();
    }
    let mut builder = Builder::default();
    for row in sheet.rows() {
        let mut record: Vec<String> = row.iter().map(format_cell).collect();
        record.resize(columns, String::new());
        builder.push_record(record);
    }
    builder.build().with(Style::rounded()).to_string()
}

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CODE")]
    code: String,
}

pub fn entity_table(entities: &[Entity]) -> String {
    let rows: Vec<EntityRow> = entities
        .iter()
        .map(|e| EntityRow {
            id: e.id,
            name: e.name.clone(),
            code: e.code.clone().unwrap_or_default(),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "SLUG")]
    slug: &'static str,
    #[tabled(rename = "TITLE")]
    title: &'static str,
    #[tabled(rename = "SHEET")]
    sheet: &'static str,
}

pub fn report_table(family: Family) -> String {
    let rows: Vec<ReportRow> = family
        .reports()
        .iter()
        .map(|k| ReportRow {
            slug: k.slug(),
            title: k.title(),
            sheet: k.sheet_name(),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

/// One-word state of a section for panel listings.
pub fn section_status(state: &SectionState) -> String {
    if state.loading {
        return "loading".to_string();
    }
    if let Some(error) = &state.error {
        return format!("error: {error}");
    }
    match (&state.data, state.loaded) {
        (Some(_), _) => "ready".to_string(),
        (None, true) => "empty".to_string(),
        (None, false) => "idle".to_string(),
    }
}

#[derive(Tabled)]
struct PanelRow {
    #[tabled(rename = "SLUG")]
    slug: &'static str,
    #[tabled(rename = "TITLE")]
    title: &'static str,
    #[tabled(rename = "OPEN")]
    open: &'static str,
    #[tabled(rename = "STATE")]
    state: String,
}

pub fn panel_table(panels: impl IntoIterator<Item = (ReportKind, bool, SectionState)>) -> String {
    let rows: Vec<PanelRow> = panels
        .into_iter()
        .map(|(kind, open, state)| PanelRow {
            slug: kind.slug(),
            title: kind.title(),
            open: if open { "yes" } else { "no" },
            state: section_status(&state),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}
