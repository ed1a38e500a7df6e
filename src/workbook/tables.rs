//! Flat and grouped (team / department / company) sheet layouts.

use super::{Cell, Sheet};
use crate::report::{
    AgencyConversionReport, B2bComparisonReport, CorporateClientsReport, CustomerBalanceReport,
    DepartmentProductsReport, DepartmentProfitReport, DepartmentStaffReport, FrontlineReport,
    FundCollectionReport, OutstandingByCompanyReport, OutstandingReport, ReportKind,
    SalesTeamStaffReport,
};

pub(super) fn department_profit(sheet: &mut Sheet, kind: ReportKind, report: &DepartmentProfitReport) {
    let (column, total_label) = match kind {
        ReportKind::BranchesDepartmentWise => ("Department", "TOTAL BRANCH PROFIT"),
        _ => ("Department / Team", "TOTAL"),
    };
    sheet.header(["#", column, "Profit (AED)"]);
    for row in &report.data {
        sheet.row(vec![
            row.sl_no.into(),
            row.department.as_str().into(),
            row.profit.into(),
        ]);
    }
    sheet.row(vec!["".into(), total_label.into(), Cell::zero(report.total_profit)]);
    sheet.set_widths([5.0, 30.0, 18.0]);
}

pub(super) fn sales_team_staff(sheet: &mut Sheet, report: &SalesTeamStaffReport) {
    sheet.header([
        "Sales Team",
        "#",
        "Staff Name",
        "Revenue Total (AED)",
        "Total Sales (AED)",
        "Revenue Target (AED)",
    ]);
    for team in &report.data {
        for staff in &team.staffs {
            sheet.row(vec![
                team.sales_team.as_str().into(),
                staff.sl_no.into(),
                staff.staff_name.as_str().into(),
                staff.revenue_total.into(),
                staff.total_sales.into(),
                staff.revenue_target.into(),
            ]);
        }
        sheet.row(vec![
            "".into(),
            "".into(),
            format!("{} — Branch Profit", team.sales_team).into(),
            team.total_branch_profit.into(),
            "".into(),
            "".into(),
        ]);
        sheet.blank_row();
    }
    sheet.set_widths([18.0, 5.0, 25.0, 20.0, 20.0, 20.0]);
}

pub(super) fn department_staff(sheet: &mut Sheet, report: &DepartmentStaffReport) {
    sheet.header([
        "Department",
        "#",
        "Staff Name",
        "Revenue Total (AED)",
        "Total Sales (AED)",
        "Revenue Target (AED)",
    ]);
    for group in &report.data {
        for staff in &group.staffs {
            sheet.row(vec![
                group.department.as_str().into(),
                staff.sl_no.into(),
                staff.staff_name.as_str().into(),
                staff.revenue_total.into(),
                staff.total_sales.into(),
                staff.revenue_target.into(),
            ]);
        }
        if let Some(total) = &group.department_total {
            sheet.row(vec![
                format!("{} — Total", group.department).into(),
                "".into(),
                "".into(),
                total.revenue_total.into(),
                total.total_sales.into(),
                total.revenue_target.into(),
            ]);
        }
        sheet.blank_row();
    }
    sheet.set_widths([20.0, 5.0, 25.0, 20.0, 20.0, 20.0]);
}

pub(super) fn frontline(sheet: &mut Sheet, report: &FrontlineReport) {
    let visa = &report.columns.visa_sources;
    let products = &report.columns.products;

    let mut header = vec!["#".to_string(), "Staff Name".to_string()];
    header.extend(visa.iter().cloned());
    header.extend(products.iter().cloned());
    header.extend(["Total".to_string(), "Target".to_string()]);
    sheet.header(header);

    for row in &report.data {
        let mut cells: Vec<Cell> = vec![row.sl_no.into(), row.staff_name.as_str().into()];
        cells.extend(visa.iter().map(|v| Cell::zero(row.visa_counts.get(v).copied())));
        cells.extend(products.iter().map(|p| Cell::zero(row.product_counts.get(p).copied())));
        cells.push(Cell::zero(row.total_count));
        cells.push(Cell::zero(row.target_count));
        sheet.row(cells);
    }

    let middle = visa.len() + products.len();
    sheet.set_widths(
        [5.0, 25.0]
            .into_iter()
            .chain(std::iter::repeat(16.0).take(middle))
            .chain([10.0, 10.0]),
    );
}

pub(super) fn outstanding(sheet: &mut Sheet, report: &OutstandingReport) {
    sheet.header([
        "Sales Team",
        "#",
        "Staff Name",
        "Current Month Pending (AED)",
        "Previous Month Pending (AED)",
        "Difference (AED)",
    ]);
    for team in &report.data {
        for staff in &team.staffs {
            sheet.row(vec![
                team.sales_team.as_str().into(),
                staff.sl_no.into(),
                staff.staff_name.as_str().into(),
                staff.figures.current_month_pending.into(),
                staff.figures.previous_month_pending.into(),
                staff.figures.difference.into(),
            ]);
        }
        let totals = team.team_totals.clone().unwrap_or_default();
        sheet.row(vec![
            "".into(),
            "".into(),
            format!("{} — Team Total", team.sales_team).into(),
            Cell::zero(totals.current_month_pending),
            Cell::zero(totals.previous_month_pending),
            Cell::zero(totals.difference),
        ]);
        sheet.blank_row();
    }
    sheet.set_widths([18.0, 5.0, 25.0, 28.0, 28.0, 18.0]);
}

pub(super) fn outstanding_by_company(sheet: &mut Sheet, report: &OutstandingByCompanyReport) {
    sheet.header(["Branch", "#", "Department", "Outstanding (AED)"]);
    for company in &report.data {
        for row in &company.rows {
            sheet.row(vec![
                company.company_name.as_str().into(),
                row.sl_no.into(),
                row.department.as_str().into(),
                row.outstanding.into(),
            ]);
        }
        sheet.row(vec![
            format!("{} — Total", company.company_name).into(),
            "".into(),
            "".into(),
            company.total_outstanding.into(),
        ]);
        sheet.blank_row();
    }
    sheet.set_widths([22.0, 5.0, 30.0, 20.0]);
}

pub(super) fn department_products(sheet: &mut Sheet, report: &DepartmentProductsReport) {
    sheet.header(["#", "Product", "Applications"]);
    for row in &report.data {
        sheet.row(vec![
            row.sl_no.into(),
            row.product_name.as_str().into(),
            row.application_count.into(),
        ]);
    }
    let total = report.total.as_ref().and_then(|t| t.application_count);
    sheet.row(vec!["".into(), "TOTAL".into(), Cell::zero(total)]);
    sheet.set_widths([5.0, 30.0, 16.0]);
}

pub(super) fn fund_collection(sheet: &mut Sheet, report: &FundCollectionReport) {
    sheet.header(["#", "Staff Name", "Department", "Outstanding Amount (AED)"]);
    for row in &report.data {
        sheet.row(vec![
            row.sl_no.into(),
            row.staff_name.as_str().into(),
            row.department.as_ref().into(),
            row.outstanding_amount.into(),
        ]);
    }
    sheet.row(vec![
        "".into(),
        "TOTAL".into(),
        "".into(),
        Cell::zero(report.total_outstanding_amount),
    ]);
    sheet.set_widths([5.0, 25.0, 18.0, 25.0]);
}

pub(super) fn agency_conversion(sheet: &mut Sheet, report: &AgencyConversionReport) {
    sheet.header([
        "#",
        "Staff Name",
        "Department",
        "Restarted",
        "New Conversion",
        "Total",
    ]);
    for row in &report.data {
        sheet.row(vec![
            row.sl_no.into(),
            row.staff_name.as_str().into(),
            row.department.as_ref().into(),
            row.counts.restarted_count.into(),
            row.counts.new_conversion_count.into(),
            row.counts.total_count.into(),
        ]);
    }
    let totals = report.totals.clone().unwrap_or_default();
    sheet.row(vec![
        "".into(),
        "TOTAL".into(),
        "".into(),
        Cell::zero(totals.restarted_count),
        Cell::zero(totals.new_conversion_count),
        Cell::zero(totals.total_count),
    ]);
    sheet.set_widths([5.0, 25.0, 18.0, 14.0, 18.0, 10.0]);
}

pub(super) fn b2b_comparison(sheet: &mut Sheet, report: &B2bComparisonReport) {
    sheet.header(["#", "Particular", "Current Month", "Previous Month", "Growth %"]);
    for row in &report.data {
        sheet.row(vec![
            row.sl_no.into(),
            row.particular.as_str().into(),
            row.current_month_count.into(),
            row.previous_month_count.into(),
            row.growth_percentage.into(),
        ]);
    }
    sheet.set_widths([5.0, 30.0, 16.0, 16.0, 12.0]);
}

pub(super) fn corporate_clients(sheet: &mut Sheet, report: &CorporateClientsReport) {
    sheet.header([
        "#",
        "Date",
        "Client Name",
        "Contact Person",
        "Phone",
        "Email",
        "Area",
        "Status",
    ]);
    for client in &report.data {
        sheet.row(vec![
            client.sr_no.into(),
            client.date.as_ref().into(),
            client.client_name.as_ref().into(),
            client.contact_person.as_ref().into(),
            client.contact_number.as_ref().into(),
            client.email_id.as_ref().into(),
            client.area_state.as_ref().into(),
            client.status.as_ref().into(),
        ]);
    }
    sheet.set_widths([5.0, 12.0, 30.0, 25.0, 18.0, 32.0, 18.0, 16.0]);
}

pub(super) fn customer_balance(sheet: &mut Sheet, report: &CustomerBalanceReport) {
    sheet.header([
        "#",
        "Customer Name",
        "Department",
        "Count",
        "Amount (AED)",
        "Received (AED)",
        "Balance (AED)",
    ]);
    for row in &report.data {
        sheet.row(vec![
            row.sl_no.into(),
            row.customer_name.as_str().into(),
            row.department.as_ref().into(),
            row.count.into(),
            row.amount.into(),
            row.received.into(),
            row.balance.into(),
        ]);
    }
    if let Some(totals) = &report.totals {
        sheet.row(vec![
            "".into(),
            "Total".into(),
            "".into(),
            totals.count.into(),
            totals.amount.into(),
            totals.received.into(),
            totals.balance.into(),
        ]);
    }
    sheet.set_widths([5.0, 30.0, 18.0, 8.0, 18.0, 18.0, 18.0]);
}

#[cfg(test)]
mod tests {
    use super::super::report_sheet;
    use super::*;
    use crate::report::ReportPayload;
    use serde_json::json;

    fn sheet(kind: ReportKind, value: serde_json::Value) -> Sheet {
        report_sheet(kind, &ReportPayload::decode(kind, value).unwrap())
    }

    #[test]
    fn department_profit_appends_total_row() {
        let retail = sheet(
            ReportKind::RetailDepartmentWise,
            json!({"data": [{"sl_no": 1, "department": "Visa", "profit": 1500.25}], "total_profit": 1500.25}),
        );
        assert_eq!(retail.text_at(0, 1), Some("Department / Team"));
        assert_eq!(retail.number_at(1, 2), Some(1500.25));
        assert_eq!(retail.text_at(2, 1), Some("TOTAL"));
        assert_eq!(retail.number_at(2, 2), Some(1500.25));

        let branches = sheet(ReportKind::BranchesDepartmentWise, json!({"data": []}));
        assert_eq!(branches.name(), "Dept Wise Profit");
        assert_eq!(branches.text_at(1, 1), Some("TOTAL BRANCH PROFIT"));
        assert_eq!(branches.number_at(1, 2), Some(0.0));
    }

    #[test]
    fn each_sales_team_gets_profit_row_and_spacer() {
        let s = sheet(
            ReportKind::SalesTeamStaff,
            json!({"data": [
                {"sales_team": "Alpha", "staffs": [
                    {"sl_no": 1, "staff_name": "Ann", "revenue_total": 10, "total_sales": 20, "revenue_target": 30},
                    {"sl_no": 2, "staff_name": "Bob", "revenue_total": 1, "total_sales": 2, "revenue_target": 3}
                ], "total_branch_profit": 11},
                {"sales_team": "Beta", "staffs": [], "total_branch_profit": 0}
            ]}),
        );
        let labels: Vec<_> = (0..s.rows().len()).map(|r| s.text_at(r, 2)).collect();
        assert_eq!(
            labels,
            vec![
                Some("Staff Name"),
                Some("Ann"),
                Some("Bob"),
                Some("Alpha — Branch Profit"),
                None,
                Some("Beta — Branch Profit"),
                None,
            ]
        );
        assert_eq!(s.number_at(3, 3), Some(11.0));
        assert_eq!(s.rows()[4], vec![Cell::Text(String::new())]);
        assert_eq!(s.widths().len(), 6);
    }

    #[test]
    fn one_blank_row_separates_consecutive_groups() {
        let s = sheet(
            ReportKind::DepartmentStaff,
            json!({"data": [
                {"department": "Ops", "staffs": [
                    {"sl_no": 1, "staff_name": "Ann"},
                    {"sl_no": 2, "staff_name": "Bob"}
                ], "department_total": {"revenue_total": 5}},
                {"department": "Sales", "staffs": [
                    {"sl_no": 1, "staff_name": "Cy"},
                    {"sl_no": 2, "staff_name": "Di"},
                    {"sl_no": 3, "staff_name": "Ed"}
                ], "department_total": {"revenue_total": 9}}
            ]}),
        );
        let blank = vec![Cell::Text(String::new())];
        let blanks: Vec<usize> = (0..s.rows().len()).filter(|&r| s.rows()[r] == blank).collect();

        assert_eq!(s.text_at(3, 0), Some("Ops — Total"));
        assert_eq!(s.rows()[4], blank);
        assert_eq!(s.text_at(5, 0), Some("Sales"));
        assert_eq!(s.text_at(5, 2), Some("Cy"));
        assert_eq!(s.text_at(8, 0), Some("Sales — Total"));
        assert_eq!(s.number_at(8, 3), Some(9.0));
        // The last group's spacer closes the table; no group gets two.
        assert_eq!(blanks, vec![4, 9]);
        assert_eq!(s.rows().len(), 10);
    }

    #[test]
    fn frontline_columns_follow_declared_sources() {
        let s = sheet(
            ReportKind::FrontlineServiceCount,
            json!({
                "columns": {"visa_sources": ["Maid", "Driver"], "products": ["Medical"]},
                "data": [{"sl_no": 1, "staff_name": "Ann", "visa_counts": {"Driver": 2}, "product_counts": {"Medical": 5}, "total_count": 7}]
            }),
        );
        assert_eq!(s.text_at(0, 2), Some("Maid"));
        assert_eq!(s.text_at(0, 5), Some("Total"));
        assert_eq!(s.number_at(1, 2), Some(0.0));
        assert_eq!(s.number_at(1, 3), Some(2.0));
        assert_eq!(s.number_at(1, 4), Some(5.0));
        assert_eq!(s.number_at(1, 6), Some(0.0));
        assert_eq!(s.widths(), &[5.0, 25.0, 16.0, 16.0, 16.0, 10.0, 10.0]);
    }

    #[test]
    fn customer_balance_totals_only_when_present() {
        let without = sheet(ReportKind::FineDetails, json!({"data": [{"sl_no": 1, "customer_name": "A"}]}));
        assert_eq!(without.rows().len(), 2);

        let with = sheet(
            ReportKind::AbscondingDetails,
            json!({"data": [], "totals": {"total_count": 2, "total_balance": 9.5}}),
        );
        assert_eq!(with.text_at(1, 1), Some("Total"));
        assert_eq!(with.number_at(1, 3), Some(2.0));
        assert_eq!(with.number_at(1, 6), Some(9.5));
        assert_eq!(with.rows()[1][4], Cell::Blank);
    }

    #[test]
    fn outstanding_by_company_groups_per_branch() {
        let s = sheet(
            ReportKind::OutstandingByCompany,
            json!({"data": [{"company_name": "Dubai", "rows": [{"sl_no": 1, "department": "Visa", "outstanding": 40}], "total_outstanding": 40}]}),
        );
        assert_eq!(s.text_at(1, 0), Some("Dubai"));
        assert_eq!(s.text_at(2, 0), Some("Dubai — Total"));
        assert_eq!(s.number_at(2, 3), Some(40.0));
        assert_eq!(s.rows().len(), 4);
    }
}
