//! Typed schemas for every report payload the reporting API returns.
//!
//! Field names follow the API's JSON. Every struct defaults missing fields so
//! a partially populated payload still decodes; missing scalars stay `None`
//! and render as blank cells, missing month entries read as zero.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{lenient, ReportKind};
use crate::error::{DashboardError, Result};

/// Month key (`YYYY-MM`) to value.
pub type MonthValues = BTreeMap<String, f64>;

/// Value for `month`, zero when the month is absent.
pub fn month_value(values: &MonthValues, month: &str) -> f64 {
    values.get(month).copied().unwrap_or(0.0)
}

/// Months of a rolling report, newest first. Empty when the reply had none.
pub fn month_keys(months: &Option<Vec<String>>) -> &[String] {
    months.as_deref().unwrap_or_default()
}

/// Tagged union over every report shape. `ReportPayload::decode` maps each
/// `ReportKind` to exactly one variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportPayload {
    Summary(SummaryReport),
    DepartmentProfit(DepartmentProfitReport),
    SalesTeamStaff(SalesTeamStaffReport),
    DepartmentStaff(DepartmentStaffReport),
    Frontline(FrontlineReport),
    MonthComparison(MonthComparisonReport),
    Conversion(ConversionReport),
    Review(ReviewReport),
    BranchReview(BranchReviewReport),
    Outstanding(OutstandingReport),
    RollingAmount(RollingAmountReport),
    DepartmentProducts(DepartmentProductsReport),
    IndividualDetails(IndividualDetailsReport),
    TeamWise(TeamWiseReport),
    RollingCount(RollingCountReport),
    FundCollection(FundCollectionReport),
    AgencyConversion(AgencyConversionReport),
    B2bComparison(B2bComparisonReport),
    CorporateClients(CorporateClientsReport),
    CustomerBalance(CustomerBalanceReport),
    AbscondingMonthly(AbscondingMonthlyReport),
    OutstandingByCompany(OutstandingByCompanyReport),
}

impl ReportPayload {
    pub fn decode(kind: ReportKind, value: Value) -> Result<Self> {
        use ReportKind::*;
        let payload = match kind {
            RetailSummary | B2bSummary | BranchesSummary => Self::Summary(from_value(value)?),
            RetailDepartmentWise | BranchesDepartmentWise => {
                Self::DepartmentProfit(from_value(value)?)
            }
            SalesTeamStaff => Self::SalesTeamStaff(from_value(value)?),
            DepartmentStaff => Self::DepartmentStaff(from_value(value)?),
            FrontlineServiceCount => Self::Frontline(from_value(value)?),
            RetailPrevMonthComparison | BranchesPrevMonthComparison => {
                Self::MonthComparison(from_value(value)?)
            }
            RetailConversionDetails | BranchesConversionDetails => {
                Self::Conversion(from_value(value)?)
            }
            RetailTotalReview => Self::Review(from_value(value)?),
            BranchesTotalReview => Self::BranchReview(from_value(value)?),
            RetailOutstanding => Self::Outstanding(from_value(value)?),
            RetailAbsconding | RetailFineCollection | B2bAbsconding | B2bFineSource
            | FinePrevComparison => Self::RollingAmount(from_value(value)?),
            DepartmentProducts => Self::DepartmentProducts(from_value(value)?),
            IndividualDetails => Self::IndividualDetails(from_value(value)?),
            TeamWise => Self::TeamWise(from_value(value)?),
            VisaSplitUp | A2aSplitUp | ServiceReport | AgencyReport => {
                Self::RollingCount(from_value(value)?)
            }
            FundCollection => Self::FundCollection(from_value(value)?),
            AgencyConversion => Self::AgencyConversion(from_value(value)?),
            B2bComparison => Self::B2bComparison(from_value(value)?),
            CorporateClients => Self::CorporateClients(from_value(value)?),
            AbscondingDetails | FineDetails => Self::CustomerBalance(from_value(value)?),
            AbscondingMonthly => Self::AbscondingMonthly(from_value(value)?),
            OutstandingByCompany => Self::OutstandingByCompany(from_value(value)?),
        };
        Ok(payload)
    }

    /// Month list of a rolling report. `None` for flat reports and for
    /// rolling replies that carried no `months`.
    pub fn months(&self) -> Option<&[String]> {
        let months = match self {
            Self::MonthComparison(r) => &r.months,
            Self::Conversion(r) => &r.months,
            Self::Review(r) => &r.months,
            Self::BranchReview(r) => &r.months,
            Self::IndividualDetails(r) => &r.months,
            Self::TeamWise(r) => &r.months,
            Self::RollingCount(r) => &r.months,
            Self::RollingAmount(r) => &r.months,
            Self::AbscondingMonthly(r) => &r.months,
            _ => return None,
        };
        months.as_deref()
    }
}

fn from_value<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| DashboardError::Decode(e.to_string()))
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Top-level KPIs. Kept as a key/value bag because each family reports a
/// different KPI set; `Family`-specific label tables pick the keys.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SummaryReport {
    pub kpis: BTreeMap<String, Value>,
}

impl SummaryReport {
    pub fn number(&self, key: &str) -> Option<f64> {
        self.kpis.get(key).and_then(lenient::number_of)
    }
}

// ── Flat tables ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DepartmentProfitReport {
    #[serde(deserialize_with = "lenient::or_default")]
    pub data: Vec<DepartmentProfitRow>,
    #[serde(alias = "total_branch_profit")]
    #[serde(deserialize_with = "lenient::number")]
    pub total_profit: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DepartmentProfitRow {
    #[serde(deserialize_with = "lenient::index")]
    pub sl_no: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub department: String,
    #[serde(deserialize_with = "lenient::number")]
    pub profit: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FrontlineReport {
    #[serde(deserialize_with = "lenient::or_default")]
    pub columns: FrontlineColumns,
    #[serde(deserialize_with = "lenient::or_default")]
    pub data: Vec<FrontlineRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FrontlineColumns {
    #[serde(deserialize_with = "lenient::or_default")]
    pub visa_sources: Vec<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub products: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FrontlineRow {
    #[serde(deserialize_with = "lenient::index")]
    pub sl_no: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub staff_name: String,
    #[serde(deserialize_with = "lenient::number_map")]
    pub visa_counts: BTreeMap<String, f64>,
    #[serde(deserialize_with = "lenient::number_map")]
    pub product_counts: BTreeMap<String, f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub total_count: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub target_count: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DepartmentProductsReport {
    #[serde(deserialize_with = "lenient::or_default")]
    pub data: Vec<ProductRow>,
    pub total: Option<ProductTotal>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProductRow {
    #[serde(deserialize_with = "lenient::index")]
    pub sl_no: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub product_name: String,
    #[serde(deserialize_with = "lenient::number")]
    pub application_count: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProductTotal {
    #[serde(deserialize_with = "lenient::number")]
    pub application_count: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FundCollectionReport {
    #[serde(deserialize_with = "lenient::or_default")]
    pub data: Vec<FundRow>,
    #[serde(deserialize_with = "lenient::number")]
    pub total_outstanding_amount: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FundRow {
    #[serde(deserialize_with = "lenient::index")]
    pub sl_no: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub staff_name: String,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub department: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub outstanding_amount: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AgencyConversionReport {
    #[serde(deserialize_with = "lenient::or_default")]
    pub data: Vec<AgencyConversionRow>,
    pub totals: Option<ConversionCounts>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AgencyConversionRow {
    #[serde(deserialize_with = "lenient::index")]
    pub sl_no: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub staff_name: String,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub department: Option<String>,
    #[serde(flatten)]
    pub counts: ConversionCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConversionCounts {
    #[serde(deserialize_with = "lenient::number")]
    pub restarted_count: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub new_conversion_count: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub total_count: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct B2bComparisonReport {
    #[serde(deserialize_with = "lenient::or_default")]
    pub data: Vec<ParticularRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ParticularRow {
    #[serde(deserialize_with = "lenient::index")]
    pub sl_no: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub particular: String,
    #[serde(deserialize_with = "lenient::number")]
    pub current_month_count: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub previous_month_count: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub growth_percentage: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CorporateClientsReport {
    #[serde(deserialize_with = "lenient::or_default")]
    pub data: Vec<CorporateClient>,
    #[serde(deserialize_with = "lenient::index")]
    pub total: Option<u64>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CorporateClient {
    #[serde(deserialize_with = "lenient::index")]
    pub sr_no: Option<u64>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub client_name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub contact_person: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub contact_number: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub email_id: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub area_state: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub status: Option<String>,
}

/// Absconding and fine customer listings share a layout; the two endpoints
/// differ only in key names.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CustomerBalanceReport {
    #[serde(deserialize_with = "lenient::or_default")]
    pub data: Vec<CustomerBalanceRow>,
    pub totals: Option<BalanceTotals>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CustomerBalanceRow {
    #[serde(alias = "sr_no")]
    #[serde(deserialize_with = "lenient::index")]
    pub sl_no: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub customer_name: String,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub department: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub count: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub amount: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub received: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub balance: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BalanceTotals {
    #[serde(alias = "total_count")]
    #[serde(deserialize_with = "lenient::number")]
    pub count: Option<f64>,
    #[serde(alias = "total_amount")]
    #[serde(deserialize_with = "lenient::number")]
    pub amount: Option<f64>,
    #[serde(alias = "total_received")]
    #[serde(deserialize_with = "lenient::number")]
    pub received: Option<f64>,
    #[serde(alias = "total_balance")]
    #[serde(deserialize_with = "lenient::number")]
    pub balance: Option<f64>,
}

// ── Grouped tables ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StaffFigures {
    #[serde(deserialize_with = "lenient::index")]
    pub sl_no: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub staff_name: String,
    #[serde(deserialize_with = "lenient::number")]
    pub revenue_total: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub total_sales: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub revenue_target: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SalesTeamStaffReport {
    #[serde(deserialize_with = "lenient::or_default")]
    pub data: Vec<SalesTeamGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SalesTeamGroup {
    #[serde(deserialize_with = "lenient::text")]
    pub sales_team: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub staffs: Vec<StaffFigures>,
    #[serde(deserialize_with = "lenient::number")]
    pub total_branch_profit: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DepartmentStaffReport {
    #[serde(deserialize_with = "lenient::or_default")]
    pub data: Vec<DepartmentStaffGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DepartmentStaffGroup {
    #[serde(deserialize_with = "lenient::text")]
    pub department: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub staffs: Vec<StaffFigures>,
    pub department_total: Option<StaffTotals>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StaffTotals {
    #[serde(deserialize_with = "lenient::number")]
    pub revenue_total: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub total_sales: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub revenue_target: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutstandingReport {
    #[serde(deserialize_with = "lenient::or_default")]
    pub data: Vec<OutstandingTeam>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutstandingTeam {
    #[serde(deserialize_with = "lenient::text")]
    pub sales_team: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub staffs: Vec<OutstandingStaff>,
    pub team_totals: Option<PendingFigures>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutstandingStaff {
    #[serde(deserialize_with = "lenient::index")]
    pub sl_no: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub staff_name: String,
    #[serde(flatten)]
    pub figures: PendingFigures,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PendingFigures {
    #[serde(deserialize_with = "lenient::number")]
    pub current_month_pending: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub previous_month_pending: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub difference: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutstandingByCompanyReport {
    #[serde(deserialize_with = "lenient::or_default")]
    pub data: Vec<CompanyOutstanding>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CompanyOutstanding {
    #[serde(deserialize_with = "lenient::text")]
    pub company_name: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub rows: Vec<DepartmentOutstanding>,
    #[serde(deserialize_with = "lenient::number")]
    pub total_outstanding: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DepartmentOutstanding {
    #[serde(deserialize_with = "lenient::index")]
    pub sl_no: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub department: String,
    #[serde(deserialize_with = "lenient::number")]
    pub outstanding: Option<f64>,
}

// ── Month-rolling matrices ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MonthComparisonReport {
    #[serde(deserialize_with = "lenient::months")]
    pub months: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub data: Vec<TeamRevenueGroup>,
    #[serde(deserialize_with = "lenient::opt_number_map")]
    pub branch_total: Option<MonthValues>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TeamRevenueGroup {
    #[serde(deserialize_with = "lenient::text")]
    pub sales_team: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub staffs: Vec<StaffRevenue>,
    #[serde(deserialize_with = "lenient::number_map")]
    pub team_total: MonthValues,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StaffRevenue {
    #[serde(deserialize_with = "lenient::index")]
    pub sl_no: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub staff_name: String,
    #[serde(deserialize_with = "lenient::number_map")]
    pub revenues: MonthValues,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConversionReport {
    #[serde(deserialize_with = "lenient::months")]
    pub months: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub data: Vec<ConversionTeam>,
    pub branch_totals: Option<BranchConversionTotals>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConversionTeam {
    #[serde(deserialize_with = "lenient::text")]
    pub sales_team: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub staffs: Vec<ConversionStaff>,
    #[serde(deserialize_with = "lenient::opt_entries")]
    pub team_totals: Option<BTreeMap<String, ConversionCell>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConversionStaff {
    #[serde(deserialize_with = "lenient::index")]
    pub sl_no: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub staff_name: String,
    #[serde(deserialize_with = "lenient::number")]
    pub target_conversion_ratio: Option<f64>,
    #[serde(deserialize_with = "lenient::entries")]
    pub monthly_data: BTreeMap<String, ConversionCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConversionCell {
    #[serde(deserialize_with = "lenient::number")]
    pub allocated_count: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub converted_count: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub ratio_percentage: Option<f64>,
}

impl ConversionCell {
    /// `(allocated, converted, ratio)` with absent values as zero.
    pub fn triple(cell: Option<&ConversionCell>) -> [f64; 3] {
        let cell = cell.cloned().unwrap_or_default();
        [
            cell.allocated_count.unwrap_or(0.0),
            cell.converted_count.unwrap_or(0.0),
            cell.ratio_percentage.unwrap_or(0.0),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BranchConversionTotals {
    #[serde(deserialize_with = "lenient::number_map")]
    pub monthly_allocated: MonthValues,
    #[serde(deserialize_with = "lenient::number_map")]
    pub monthly_converted: MonthValues,
}

impl BranchConversionTotals {
    /// Converted over allocated as a percentage; zero when nothing was allocated.
    pub fn ratio(&self, month: &str) -> f64 {
        let allocated = month_value(&self.monthly_allocated, month);
        if allocated > 0.0 {
            month_value(&self.monthly_converted, month) / allocated * 100.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReviewRow {
    #[serde(deserialize_with = "lenient::index")]
    pub sl_no: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub staff_name: String,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub department: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub target_review: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub review_count: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub previous_month_review: Option<f64>,
    #[serde(deserialize_with = "lenient::number_map")]
    pub monthly_reviews: MonthValues,
}

/// Retail review report: totals are a plain month map.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReviewReport {
    #[serde(deserialize_with = "lenient::months")]
    pub months: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub data: Vec<ReviewRow>,
    #[serde(deserialize_with = "lenient::number_map")]
    pub totals: MonthValues,
}

/// Branches review report: totals also carry the period counts.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BranchReviewReport {
    #[serde(deserialize_with = "lenient::months")]
    pub months: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub data: Vec<ReviewRow>,
    pub totals: Option<BranchReviewTotals>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BranchReviewTotals {
    #[serde(deserialize_with = "lenient::number")]
    pub review_count: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub previous_month_review: Option<f64>,
    #[serde(deserialize_with = "lenient::number_map")]
    pub monthly_reviews: MonthValues,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IndividualDetailsReport {
    #[serde(deserialize_with = "lenient::months")]
    pub months: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub data: Vec<IndividualStaff>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IndividualStaff {
    #[serde(deserialize_with = "lenient::text")]
    pub staff_name: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub sources: Vec<SourceCounts>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceCounts {
    #[serde(deserialize_with = "lenient::text")]
    pub source: String,
    #[serde(deserialize_with = "lenient::number_map")]
    pub monthly_counts: MonthValues,
    #[serde(deserialize_with = "lenient::number")]
    pub target_count: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TeamWiseReport {
    #[serde(deserialize_with = "lenient::months")]
    pub months: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub data: Vec<TeamCounts>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TeamCounts {
    #[serde(deserialize_with = "lenient::text")]
    pub sales_team: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub staffs: Vec<StaffCounts>,
    pub team_totals: Option<CountTotals>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StaffCounts {
    #[serde(deserialize_with = "lenient::index")]
    pub sl_no: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub staff_name: String,
    #[serde(deserialize_with = "lenient::number_map")]
    pub monthly_counts: MonthValues,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CountTotals {
    #[serde(deserialize_with = "lenient::number_map")]
    pub monthly_totals: MonthValues,
}

/// Visa, A2A, service and agency split-ups: one labelled row per category.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RollingCountReport {
    #[serde(deserialize_with = "lenient::months")]
    pub months: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub data: Vec<CountRow>,
    pub totals: Option<CountTotals>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CountRow {
    #[serde(alias = "service_type", alias = "agency_metric")]
    #[serde(deserialize_with = "lenient::text")]
    pub label: String,
    #[serde(deserialize_with = "lenient::number_map")]
    pub monthly_counts: MonthValues,
}

// ── Multi-section rolling amounts ────────────────────────────────────────────

/// Absconding / fine reports: sold, received and pending sections over the
/// same month list. Only one of `absconding_sold` / `fine_sold` is present.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RollingAmountReport {
    #[serde(deserialize_with = "lenient::months")]
    pub months: Option<Vec<String>>,
    pub absconding_sold: Option<AmountSection>,
    pub fine_sold: Option<AmountSection>,
    pub collection_received: Option<AmountSection>,
    pub collection_pending: Option<AmountSection>,
}

impl RollingAmountReport {
    pub fn section(&self, key: AmountSectionKey) -> Option<&AmountSection> {
        match key {
            AmountSectionKey::AbscondingSold => self.absconding_sold.as_ref(),
            AmountSectionKey::FineSold => self.fine_sold.as_ref(),
            AmountSectionKey::CollectionReceived => self.collection_received.as_ref(),
            AmountSectionKey::CollectionPending => self.collection_pending.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountSectionKey {
    AbscondingSold,
    FineSold,
    CollectionReceived,
    CollectionPending,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AmountSection {
    #[serde(deserialize_with = "lenient::or_default")]
    pub data: Vec<SourceAmounts>,
    pub total: Option<MonthTotals>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceAmounts {
    #[serde(deserialize_with = "lenient::text")]
    pub source: String,
    #[serde(alias = "monthly_amounts", alias = "values")]
    #[serde(deserialize_with = "lenient::number_map")]
    pub amounts: MonthValues,
}

/// Section totals arrive either flat or wrapped in `monthly_totals`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MonthTotals {
    Nested {
        #[serde(deserialize_with = "lenient::number_map")]
        monthly_totals: MonthValues,
    },
    Flat(#[serde(deserialize_with = "lenient::number_map")] MonthValues),
}

impl MonthTotals {
    pub fn values(&self) -> &MonthValues {
        match self {
            MonthTotals::Nested { monthly_totals } => monthly_totals,
            MonthTotals::Flat(values) => values,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AbscondingMonthlyReport {
    #[serde(deserialize_with = "lenient::months")]
    pub months: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub absconding_list: Vec<SourceAmounts>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub collection_received: Vec<SourceAmounts>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub collection_pending: Vec<SourceAmounts>,
}
