//! Month-rolling layouts: one column (or column triple) per month, with the
//! first month labelled "Current Month".

use std::iter;

use super::{month_labels, Cell, Sheet};
use crate::report::{
    month_keys, month_value, AbscondingMonthlyReport, AmountSectionKey, BranchReviewReport, ConversionCell,
    ConversionReport, IndividualDetailsReport, MonthComparisonReport, MonthValues, ReportKind,
    ReviewReport, RollingAmountReport, RollingCountReport, SourceAmounts, TeamWiseReport,
};

fn month_cells<'a>(months: &'a [String], values: &'a MonthValues) -> impl Iterator<Item = Cell> + 'a {
    months.iter().map(|m| Cell::Number(month_value(values, m)))
}

fn widths(fixed: &[f64], per_month: f64, months: usize) -> Vec<f64> {
    fixed
        .iter()
        .copied()
        .chain(iter::repeat(per_month).take(months))
        .collect()
}

fn text_row<S: Into<String>>(leading: impl IntoIterator<Item = S>) -> Vec<Cell> {
    leading.into_iter().map(|s| Cell::Text(s.into())).collect()
}

pub(super) fn month_comparison(sheet: &mut Sheet, kind: ReportKind, report: &MonthComparisonReport) {
    let months = month_keys(&report.months);
    let branches = kind == ReportKind::BranchesPrevMonthComparison;

    let mut header = vec!["Sales Team".to_string(), "#".to_string(), "Staff Name".to_string()];
    header.extend(month_labels(months));
    sheet.header(header);

    for team in &report.data {
        for staff in &team.staffs {
            let mut row: Vec<Cell> = vec![
                team.sales_team.as_str().into(),
                staff.sl_no.into(),
                staff.staff_name.as_str().into(),
            ];
            row.extend(month_cells(months, &staff.revenues));
            sheet.row(row);
        }
        let mut total = if branches {
            text_row([format!("{} — Total", team.sales_team), String::new(), String::new()])
        } else {
            text_row([String::new(), String::new(), format!("{} — Team Total", team.sales_team)])
        };
        total.extend(month_cells(months, &team.team_total));
        sheet.row(total);
        sheet.blank_row();
    }

    if branches {
        if let Some(grand) = &report.branch_total {
            let mut row = text_row(["Branch Grand Total", "", ""]);
            row.extend(month_cells(months, grand));
            sheet.row(row);
        }
        sheet.set_widths(widths(&[20.0, 5.0, 25.0], 16.0, months.len()));
    } else {
        sheet.set_widths(widths(&[18.0, 5.0, 25.0], 17.0, months.len()));
    }
}

fn conversion_triples<'a>(
    months: &'a [String],
    cells: &'a std::collections::BTreeMap<String, ConversionCell>,
) -> impl Iterator<Item = Cell> + 'a {
    months
        .iter()
        .flat_map(|m| ConversionCell::triple(cells.get(m)))
        .map(Cell::Number)
}

pub(super) fn conversion(sheet: &mut Sheet, kind: ReportKind, report: &ConversionReport) {
    if kind == ReportKind::BranchesConversionDetails {
        return branch_conversion(sheet, report);
    }
    let months = month_keys(&report.months);
    let labels = month_labels(months);

    let mut header = text_row(["Sales Team", "#", "Staff Name", "Target Ratio %"]);
    for label in &labels {
        header.push(format!("{label} Allocated").into());
        header.push(format!("{label} Converted").into());
        header.push(format!("{label} Ratio %").into());
    }
    sheet.row(header);

    for team in &report.data {
        for staff in &team.staffs {
            let mut row: Vec<Cell> = vec![
                team.sales_team.as_str().into(),
                staff.sl_no.into(),
                staff.staff_name.as_str().into(),
                staff.target_conversion_ratio.into(),
            ];
            row.extend(conversion_triples(months, &staff.monthly_data));
            sheet.row(row);
        }
        let totals = team.team_totals.clone().unwrap_or_default();
        let mut row = text_row([
            String::new(),
            String::new(),
            format!("{} — Team Total", team.sales_team),
            String::new(),
        ]);
        row.extend(conversion_triples(months, &totals));
        sheet.row(row);
        sheet.blank_row();
    }

    let mut cols = vec![18.0, 5.0, 25.0, 14.0];
    for _ in months {
        cols.extend([18.0, 18.0, 12.0]);
    }
    sheet.set_widths(cols);
}

fn branch_conversion(sheet: &mut Sheet, report: &ConversionReport) {
    let months = month_keys(&report.months);

    let mut top = text_row(["Sales Team", "#", "Staff Name"]);
    let mut sub = text_row(["", "", ""]);
    for label in month_labels(months) {
        top.extend(text_row([label, String::new(), String::new()]));
        sub.extend(text_row(["Alloc", "Conv", "Ratio %"]));
    }
    sheet.row(top);
    sheet.row(sub);

    for team in &report.data {
        for staff in &team.staffs {
            let mut row: Vec<Cell> = vec![
                team.sales_team.as_str().into(),
                staff.sl_no.into(),
                staff.staff_name.as_str().into(),
            ];
            row.extend(conversion_triples(months, &staff.monthly_data));
            sheet.row(row);
        }
        if let Some(totals) = &team.team_totals {
            let mut row = text_row([format!("{} — Total", team.sales_team), String::new(), String::new()]);
            row.extend(conversion_triples(months, totals));
            sheet.row(row);
        }
        sheet.blank_row();
    }

    if let Some(totals) = &report.branch_totals {
        let mut row = text_row(["Branch Grand Total", "", ""]);
        for m in months {
            row.push(Cell::Number(month_value(&totals.monthly_allocated, m)));
            row.push(Cell::Number(month_value(&totals.monthly_converted, m)));
            row.push(Cell::Number(totals.ratio(m)));
        }
        sheet.row(row);
    }

    sheet.set_widths(widths(&[20.0, 5.0, 25.0], 8.0, months.len() * 3));
}

pub(super) fn review(sheet: &mut Sheet, report: &ReviewReport) {
    let months = month_keys(&report.months);
    let mut header = vec![
        "#".to_string(),
        "Staff Name".to_string(),
        "Department".to_string(),
        "Target".to_string(),
    ];
    header.extend(month_labels(months));
    sheet.header(header);

    for staff in &report.data {
        let mut row: Vec<Cell> = vec![
            staff.sl_no.into(),
            staff.staff_name.as_str().into(),
            staff.department.as_ref().into(),
            staff.target_review.into(),
        ];
        row.extend(month_cells(months, &staff.monthly_reviews));
        sheet.row(row);
    }
    let mut total = text_row(["", "TOTAL", "", ""]);
    total.extend(month_cells(months, &report.totals));
    sheet.row(total);

    sheet.set_widths(widths(&[5.0, 25.0, 18.0, 10.0], 15.0, months.len()));
}

pub(super) fn branch_review(sheet: &mut Sheet, report: &BranchReviewReport) {
    let months = month_keys(&report.months);
    let mut header = vec![
        "#".to_string(),
        "Staff Name".to_string(),
        "Department".to_string(),
        "Reviews".to_string(),
        "Target".to_string(),
        "Prev Month".to_string(),
    ];
    header.extend(month_labels(months));
    sheet.header(header);

    for staff in &report.data {
        let mut row: Vec<Cell> = vec![
            staff.sl_no.into(),
            staff.staff_name.as_str().into(),
            staff.department.as_ref().into(),
            staff.review_count.into(),
            staff.target_review.into(),
            staff.previous_month_review.into(),
        ];
        row.extend(month_cells(months, &staff.monthly_reviews));
        sheet.row(row);
    }
    if let Some(totals) = &report.totals {
        let mut row: Vec<Cell> = vec![
            "".into(),
            "Total".into(),
            "".into(),
            totals.review_count.into(),
            "—".into(),
            totals.previous_month_review.into(),
        ];
        row.extend(month_cells(months, &totals.monthly_reviews));
        sheet.row(row);
    }

    sheet.set_widths(widths(&[5.0, 25.0, 18.0, 10.0, 10.0, 12.0], 14.0, months.len()));
}

pub(super) fn individual_details(sheet: &mut Sheet, report: &IndividualDetailsReport) {
    let months = month_keys(&report.months);
    let mut header = vec!["Staff Name".to_string(), "Source".to_string()];
    header.extend(month_labels(months));
    header.push("Target".to_string());
    sheet.header(header);

    for staff in &report.data {
        for source in &staff.sources {
            let mut row: Vec<Cell> = vec![staff.staff_name.as_str().into(), source.source.as_str().into()];
            row.extend(month_cells(months, &source.monthly_counts));
            row.push(source.target_count.into());
            sheet.row(row);
        }
        sheet.blank_row();
    }

    let mut cols = widths(&[25.0, 20.0], 15.0, months.len());
    cols.push(10.0);
    sheet.set_widths(cols);
}

pub(super) fn team_wise(sheet: &mut Sheet, report: &TeamWiseReport) {
    let months = month_keys(&report.months);
    let mut header = vec!["Sales Team".to_string(), "#".to_string(), "Staff Name".to_string()];
    header.extend(month_labels(months));
    sheet.header(header);

    for team in &report.data {
        for staff in &team.staffs {
            let mut row: Vec<Cell> = vec![
                team.sales_team.as_str().into(),
                staff.sl_no.into(),
                staff.staff_name.as_str().into(),
            ];
            row.extend(month_cells(months, &staff.monthly_counts));
            sheet.row(row);
        }
        let totals = team.team_totals.clone().unwrap_or_default();
        let mut row = text_row([String::new(), String::new(), format!("{} — Team Total", team.sales_team)]);
        row.extend(month_cells(months, &totals.monthly_totals));
        sheet.row(row);
        sheet.blank_row();
    }

    sheet.set_widths(widths(&[18.0, 5.0, 25.0], 15.0, months.len()));
}

/// Heading of the label column for the split-up reports.
fn count_label(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::VisaSplitUp => "Visa Service Type",
        ReportKind::A2aSplitUp => "Carrier",
        ReportKind::ServiceReport => "Service Type",
        ReportKind::AgencyReport => "Metric",
        _ => "Label",
    }
}

pub(super) fn rolling_count(sheet: &mut Sheet, kind: ReportKind, report: &RollingCountReport) {
    let months = month_keys(&report.months);
    let mut header = vec![count_label(kind).to_string()];
    header.extend(month_labels(months));
    sheet.header(header);

    for row in &report.data {
        let mut cells: Vec<Cell> = vec![row.label.as_str().into()];
        cells.extend(month_cells(months, &row.monthly_counts));
        sheet.row(cells);
    }
    let totals = report.totals.clone().unwrap_or_default();
    let mut total: Vec<Cell> = vec!["TOTAL".into()];
    total.extend(month_cells(months, &totals.monthly_totals));
    sheet.row(total);

    sheet.set_widths(widths(&[25.0], 15.0, months.len()));
}

pub(super) fn rolling_amount(sheet: &mut Sheet, kind: ReportKind, report: &RollingAmountReport) {
    if kind == ReportKind::FinePrevComparison {
        return fine_comparison(sheet, report);
    }
    let months = month_keys(&report.months);
    let labels = month_labels(months);
    let sold = match kind {
        ReportKind::RetailFineCollection | ReportKind::B2bFineSource => {
            (AmountSectionKey::FineSold, "FINE SOLD")
        }
        _ => (AmountSectionKey::AbscondingSold, "ABSCONDING SOLD"),
    };
    let sections = [
        sold,
        (AmountSectionKey::CollectionReceived, "COLLECTION RECEIVED"),
        (AmountSectionKey::CollectionPending, "COLLECTION PENDING"),
    ];

    for (key, title) in sections {
        let Some(section) = report.section(key) else {
            continue;
        };
        sheet.header([title]);
        let mut header = vec!["Source".to_string()];
        header.extend(labels.iter().cloned());
        sheet.header(header);

        for source in &section.data {
            let mut row: Vec<Cell> = vec![source.source.as_str().into()];
            row.extend(month_cells(months, &source.amounts));
            sheet.row(row);
        }
        let empty = MonthValues::new();
        let totals = section.total.as_ref().map_or(&empty, |t| t.values());
        let mut total: Vec<Cell> = vec!["TOTAL".into()];
        total.extend(month_cells(months, totals));
        sheet.row(total);
        sheet.blank_row();
    }

    sheet.set_widths(widths(&[22.0], 17.0, months.len()));
}

fn fine_comparison(sheet: &mut Sheet, report: &RollingAmountReport) {
    let months = month_keys(&report.months);
    let mut header = vec!["Section".to_string(), "Source".to_string()];
    header.extend(month_labels(months));
    sheet.header(header);

    let sections = [
        (AmountSectionKey::FineSold, "Fines List"),
        (AmountSectionKey::CollectionReceived, "Collection Received"),
        (AmountSectionKey::CollectionPending, "Collection Pending"),
    ];
    for (key, title) in sections {
        let Some(section) = report.section(key) else {
            continue;
        };
        for source in &section.data {
            sheet.row(section_row(title, source, months));
        }
        if let Some(total) = &section.total {
            let mut row = text_row([format!("{title} — Total"), String::new()]);
            row.extend(month_cells(months, total.values()));
            sheet.row(row);
        }
        sheet.blank_row();
    }

    sheet.set_widths(widths(&[22.0, 20.0], 16.0, months.len()));
}

fn section_row(title: &str, source: &SourceAmounts, months: &[String]) -> Vec<Cell> {
    let mut row = text_row([title, source.source.as_str()]);
    row.extend(month_cells(months, &source.amounts));
    row
}

pub(super) fn absconding_monthly(sheet: &mut Sheet, report: &AbscondingMonthlyReport) {
    let months = month_keys(&report.months);
    let mut header = vec!["Section".to_string(), "Source".to_string()];
    header.extend(month_labels(months));
    sheet.header(header);

    let sections = [
        ("Absconding List", &report.absconding_list),
        ("Collection Received", &report.collection_received),
        ("Collection Pending", &report.collection_pending),
    ];
    for (title, rows) in sections {
        for source in rows {
            sheet.row(section_row(title, source, months));
        }
        sheet.blank_row();
    }

    sheet.set_widths(widths(&[20.0, 20.0], 16.0, months.len()));
}
