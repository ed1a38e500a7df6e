//! Report families and the catalogue of reports each dashboard variant exposes.

mod lenient;
mod payload;

pub use payload::*;

use std::fmt;
use std::str::FromStr;

use crate::error::{DashboardError, Result};
use crate::filter::EntityId;

/// One dashboard variant. Each family has its own API prefix, report set and
/// workbook layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    Retail,
    B2b,
    Branches,
}

impl Family {
    pub const ALL: [Family; 3] = [Family::Retail, Family::B2b, Family::Branches];

    pub fn base_path(&self) -> &'static str {
        match self {
            Family::Retail => "/api/dashboard/monthly-retail",
            Family::B2b => "/api/dashboard/monthly-b2b",
            Family::Branches => "/api/dashboard/branches",
        }
    }

    pub fn companies_path(&self) -> &'static str {
        match self {
            Family::Retail | Family::B2b => "/api/dashboard/companies",
            Family::Branches => "/api/dashboard/branches/companies",
        }
    }

    /// Prefix of the exported file name.
    pub fn export_prefix(&self) -> &'static str {
        match self {
            Family::Retail => "B2C",
            Family::B2b => "B2B",
            Family::Branches => "Branches",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Family::Retail => "Monthly Retail Summary Report",
            Family::B2b => "Monthly B2B Summary Report",
            Family::Branches => "Branches Dashboard Report",
        }
    }

    /// Reports in dashboard order; the first is always the summary.
    pub fn reports(&self) -> &'static [ReportKind] {
        use ReportKind::*;
        match self {
            Family::Retail => &[
                RetailSummary,
                RetailDepartmentWise,
                SalesTeamStaff,
                FrontlineServiceCount,
                RetailPrevMonthComparison,
                RetailConversionDetails,
                RetailTotalReview,
                RetailOutstanding,
                RetailAbsconding,
                RetailFineCollection,
            ],
            Family::B2b => &[
                B2bSummary,
                DepartmentProducts,
                IndividualDetails,
                TeamWise,
                VisaSplitUp,
                A2aSplitUp,
                ServiceReport,
                AgencyReport,
                FundCollection,
                AgencyConversion,
                B2bAbsconding,
                B2bFineSource,
            ],
            Family::Branches => &[
                BranchesSummary,
                BranchesDepartmentWise,
                DepartmentStaff,
                BranchesPrevMonthComparison,
                BranchesConversionDetails,
                BranchesTotalReview,
                B2bComparison,
                CorporateClients,
                AbscondingDetails,
                AbscondingMonthly,
                FineDetails,
                FinePrevComparison,
                OutstandingByCompany,
            ],
        }
    }

    pub fn summary(&self) -> ReportKind {
        self.reports()[0]
    }

    /// Reports shown as collapsible panels (everything but the summary).
    pub fn panels(&self) -> &'static [ReportKind] {
        &self.reports()[1..]
    }

    pub fn find_report(&self, slug: &str) -> Result<ReportKind> {
        self.reports()
            .iter()
            .copied()
            .find(|kind| kind.slug() == slug)
            .ok_or_else(|| DashboardError::UnknownReport {
                family: self.to_string(),
                report: slug.to_string(),
            })
    }

    /// Entity list used when the companies endpoint is unreachable.
    pub fn fallback_entities(&self) -> Vec<Entity> {
        match self {
            Family::B2b => [
                (1, "B2B Dubai LLC"),
                (2, "B2B Abu Dhabi"),
                (3, "B2B Sharjah"),
                (4, "B2B International"),
                (5, "B2B Free Zone"),
            ]
            .into_iter()
            .map(|(id, name)| Entity::new(id, name))
            .collect(),
            Family::Retail | Family::Branches => Vec::new(),
        }
    }

    /// Whether the exported summary prints entity names or the raw id list.
    pub fn exports_entity_names(&self) -> bool {
        !matches!(self, Family::Branches)
    }

    /// Headline KPIs in card order, keyed into the summary payload.
    pub fn kpis(&self) -> &'static [Kpi] {
        match self {
            Family::Retail => RETAIL_KPIS,
            Family::B2b => B2B_KPIS,
            Family::Branches => BRANCHES_KPIS,
        }
    }
}

const RETAIL_KPIS: &[Kpi] = &[
    Kpi::new("Total Sales Amount", "total_sales_amount", KpiUnit::Currency),
    Kpi::new("Conversion %", "conversion_percentage", KpiUnit::Percent),
    Kpi::new("Total Revenue", "total_revenue", KpiUnit::Currency),
    Kpi::new("Total Reviews", "total_review_count", KpiUnit::Count),
    Kpi::new("Revenue Target", "total_revenue_target", KpiUnit::Currency),
];

const B2B_KPIS: &[Kpi] = &[
    Kpi::new("App Visas", "number_of_app_visa", KpiUnit::Count),
    Kpi::new("Absconding Count", "total_absconding_count", KpiUnit::Count),
    Kpi::new("Absconding Collection", "absconding_collection_amount", KpiUnit::Currency),
    Kpi::new("Active Agencies", "active_agency_count", KpiUnit::Count),
    Kpi::new("Total A2A", "total_a2a_count", KpiUnit::Count),
];

const BRANCHES_KPIS: &[Kpi] = &[
    Kpi::new("Total Sales Amount", "total_sales_amount", KpiUnit::Currency),
    Kpi::new("Conversion %", "conversion_percentage", KpiUnit::Percent),
    Kpi::new("Total Revenue", "total_revenue", KpiUnit::Currency),
    Kpi::new("Total Sale Count", "total_sale_count", KpiUnit::Count),
    Kpi::new("Total Review Count", "total_review_count", KpiUnit::Count),
    Kpi::new("Active Agency Count", "active_agency_count", KpiUnit::Count),
    Kpi::new("Visa Application Count", "visa_application_count", KpiUnit::Count),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KpiUnit {
    Currency,
    Percent,
    Count,
}

/// One summary card: display label, summary payload key and display unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kpi {
    pub label: &'static str,
    pub key: &'static str,
    pub unit: KpiUnit,
}

impl Kpi {
    const fn new(label: &'static str, key: &'static str, unit: KpiUnit) -> Self {
        Self { label, key, unit }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Family::Retail => "retail",
            Family::B2b => "b2b",
            Family::Branches => "branches",
        };
        f.write_str(name)
    }
}

impl FromStr for Family {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "retail" | "b2c" => Ok(Family::Retail),
            "b2b" => Ok(Family::B2b),
            "branches" | "branch" => Ok(Family::Branches),
            _ => Err(DashboardError::UnknownFamily(s.to_string())),
        }
    }
}

/// How a report's query string is assembled beyond the date range and ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStyle {
    /// `date_from`, `date_to`, `company_ids[]`
    Standard,
    /// Standard plus `months_back`
    Rolling,
    /// Standard plus `page` and `page_size`
    Paginated { page_size: u32 },
    /// `month`, `company_ids[]`, `months_back` with no date range
    MonthRolling,
}

/// A company, agency or branch that the filter's id set selects over.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Entity {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            code: None,
            location: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportKind {
    RetailSummary,
    RetailDepartmentWise,
    SalesTeamStaff,
    FrontlineServiceCount,
    RetailPrevMonthComparison,
    RetailConversionDetails,
    RetailTotalReview,
    RetailOutstanding,
    RetailAbsconding,
    RetailFineCollection,

    B2bSummary,
    DepartmentProducts,
    IndividualDetails,
    TeamWise,
    VisaSplitUp,
    A2aSplitUp,
    ServiceReport,
    AgencyReport,
    FundCollection,
    AgencyConversion,
    B2bAbsconding,
    B2bFineSource,

    BranchesSummary,
    BranchesDepartmentWise,
    DepartmentStaff,
    BranchesPrevMonthComparison,
    BranchesConversionDetails,
    BranchesTotalReview,
    B2bComparison,
    CorporateClients,
    AbscondingDetails,
    AbscondingMonthly,
    FineDetails,
    FinePrevComparison,
    OutstandingByCompany,
}

impl ReportKind {
    pub fn family(&self) -> Family {
        use ReportKind::*;
        match self {
            RetailSummary
            | RetailDepartmentWise
            | SalesTeamStaff
            | FrontlineServiceCount
            | RetailPrevMonthComparison
            | RetailConversionDetails
            | RetailTotalReview
            | RetailOutstanding
            | RetailAbsconding
            | RetailFineCollection => Family::Retail,
            B2bSummary | DepartmentProducts | IndividualDetails | TeamWise | VisaSplitUp
            | A2aSplitUp | ServiceReport | AgencyReport | FundCollection | AgencyConversion
            | B2bAbsconding | B2bFineSource => Family::B2b,
            BranchesSummary
            | BranchesDepartmentWise
            | DepartmentStaff
            | BranchesPrevMonthComparison
            | BranchesConversionDetails
            | BranchesTotalReview
            | B2bComparison
            | CorporateClients
            | AbscondingDetails
            | AbscondingMonthly
            | FineDetails
            | FinePrevComparison
            | OutstandingByCompany => Family::Branches,
        }
    }

    /// Endpoint name under the family's base path.
    pub fn slug(&self) -> &'static str {
        use ReportKind::*;
        match self {
            RetailSummary | B2bSummary | BranchesSummary => "summary",
            RetailDepartmentWise | BranchesDepartmentWise => "department-wise",
            SalesTeamStaff => "sales-team-staff",
            FrontlineServiceCount => "frontline-service-count",
            RetailPrevMonthComparison => "previous-month-comparison",
            RetailConversionDetails | BranchesConversionDetails => "conversion-details",
            RetailTotalReview | BranchesTotalReview => "total-review",
            RetailOutstanding => "outstanding",
            RetailAbsconding | B2bAbsconding => "absconding-source",
            RetailFineCollection => "fine-collection",
            DepartmentProducts => "department-products",
            IndividualDetails => "individual-details",
            TeamWise => "team-wise",
            VisaSplitUp => "visa-split-up",
            A2aSplitUp => "a2a-split-up",
            ServiceReport => "service-report",
            AgencyReport => "agency-report",
            FundCollection => "fund-collection-outstanding",
            AgencyConversion => "agency-conversion",
            B2bFineSource => "fine-source",
            DepartmentStaff => "department-staff",
            BranchesPrevMonthComparison => "sales-team-previous-month-comparison",
            B2bComparison => "b2b-report",
            CorporateClients => "corporate-clients",
            AbscondingDetails => "absconding-details",
            AbscondingMonthly => "absconding/monthly-comparison",
            FineDetails => "fine-details",
            FinePrevComparison => "fine-previous-comparison",
            OutstandingByCompany => "outstanding-by-company",
        }
    }

    pub fn path(&self) -> String {
        format!("{}/{}", self.family().base_path(), self.slug())
    }

    /// Panel heading.
    pub fn title(&self) -> &'static str {
        use ReportKind::*;
        match self {
            RetailSummary | B2bSummary | BranchesSummary => "Summary",
            RetailDepartmentWise => "Department Wise Report",
            SalesTeamStaff => "Sales Team Staff Report",
            FrontlineServiceCount => "Frontline Service Count",
            RetailPrevMonthComparison | BranchesPrevMonthComparison => "Previous Month Comparison",
            RetailConversionDetails | BranchesConversionDetails => "Conversion Details",
            RetailTotalReview | BranchesTotalReview => "Total Review",
            RetailOutstanding => "Outstanding List",
            RetailAbsconding => "Absconding Report",
            RetailFineCollection => "Fine Collection Report",
            DepartmentProducts => "Department Product Report",
            IndividualDetails => "Individual Details",
            TeamWise => "Team Wise Monthly Applications",
            VisaSplitUp => "Visa Split-Up",
            A2aSplitUp => "A2A Split-Up",
            ServiceReport => "Service Report",
            AgencyReport => "Agency Report",
            FundCollection => "Fund Collection Outstanding",
            AgencyConversion => "Agency Conversion Report",
            B2bAbsconding => "Absconding Source Report",
            B2bFineSource => "Fine Source Report",
            BranchesDepartmentWise => "Department Wise Profit",
            DepartmentStaff => "Staff Performance (Department Wise)",
            B2bComparison => "B2B Report",
            CorporateClients => "Corporate Client List",
            AbscondingDetails => "Absconding Details",
            AbscondingMonthly => "Absconding Monthly Comparison",
            FineDetails => "Fine Details",
            FinePrevComparison => "Fine Previous Comparison",
            OutstandingByCompany => "Outstanding Report - Branch Wise",
        }
    }

    /// Worksheet name in the exported workbook (before length truncation).
    pub fn sheet_name(&self) -> &'static str {
        use ReportKind::*;
        match self {
            RetailSummary | B2bSummary | BranchesSummary => "Summary",
            RetailDepartmentWise => "Department Wise",
            SalesTeamStaff => "Sales Team Staff",
            FrontlineServiceCount => "Frontline Service Count",
            RetailPrevMonthComparison | BranchesPrevMonthComparison => "Prev Month Comparison",
            RetailConversionDetails | BranchesConversionDetails => "Conversion Details",
            RetailTotalReview | BranchesTotalReview => "Total Review",
            RetailOutstanding => "Outstanding List",
            RetailAbsconding | B2bAbsconding => "Absconding Report",
            RetailFineCollection => "Fine Collection Report",
            DepartmentProducts => "Dept Products",
            IndividualDetails => "Individual Details",
            TeamWise => "Team Wise",
            VisaSplitUp => "Visa Split-Up",
            A2aSplitUp => "A2A Split-Up",
            ServiceReport => "Service Report",
            AgencyReport => "Agency Report",
            FundCollection => "Fund Collection",
            AgencyConversion => "Agency Conversion",
            B2bFineSource => "Fine Source Report",
            BranchesDepartmentWise => "Dept Wise Profit",
            DepartmentStaff => "Staff Performance",
            B2bComparison => "B2B Report",
            CorporateClients => "Corporate Clients",
            AbscondingDetails => "Absconding Details",
            AbscondingMonthly => "Absconding Monthly",
            FineDetails => "Fine Details",
            FinePrevComparison => "Fine Prev Comparison",
            OutstandingByCompany => "Outstanding",
        }
    }

    /// Reports whose sheet is left out of the export when the reply carries
    /// no month list.
    pub fn needs_months(&self) -> bool {
        use ReportKind::*;
        matches!(
            self,
            BranchesPrevMonthComparison | BranchesTotalReview | AbscondingMonthly | FinePrevComparison
        )
    }

    pub fn query_style(&self) -> QueryStyle {
        use ReportKind::*;
        match self {
            RetailPrevMonthComparison
            | RetailConversionDetails
            | RetailTotalReview
            | RetailAbsconding
            | RetailFineCollection
            | IndividualDetails
            | TeamWise
            | VisaSplitUp
            | A2aSplitUp
            | ServiceReport
            | AgencyReport
            | B2bAbsconding
            | B2bFineSource
            | BranchesPrevMonthComparison
            | BranchesTotalReview
            | FinePrevComparison => QueryStyle::Rolling,
            CorporateClients => QueryStyle::Paginated { page_size: 9999 },
            AbscondingDetails => QueryStyle::Paginated { page_size: 50 },
            AbscondingMonthly => QueryStyle::MonthRolling,
            _ => QueryStyle::Standard,
        }
    }

    pub fn is_summary(&self) -> bool {
        matches!(
            self,
            ReportKind::RetailSummary | ReportKind::B2bSummary | ReportKind::BranchesSummary
        )
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.family(), self.slug())
    }
}
