use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use dashboard::report::DepartmentProfitReport;
use dashboard::{
    DashboardError, Family, Filter, MonthKey, Orchestrator, ReportClient, ReportKind, ReportPayload,
    ReportQuery, ReportSource, Result, SectionState, SectionStore,
};

/// In-memory API: records every call, answers from canned replies (`{}` by
/// default) and fails the paths it is told to.
#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<(String, String)>>,
    replies: Mutex<HashMap<String, Value>>,
    failing: Mutex<HashSet<String>>,
    watch: Mutex<Option<(String, SectionStore)>>,
    observed: Mutex<Vec<SectionState>>,
}

impl Recorder {
    fn reply(&self, kind: ReportKind, value: Value) {
        self.replies.lock().unwrap().insert(kind.path(), value);
    }

    fn fail(&self, kind: ReportKind) {
        self.failing.lock().unwrap().insert(kind.path());
    }

    /// Snapshot `store` whenever `kind` is requested, before replying.
    fn watch(&self, kind: ReportKind, store: SectionStore) {
        *self.watch.lock().unwrap() = Some((kind.path(), store));
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn calls_to(&self, kind: ReportKind) -> Vec<String> {
        let path = kind.path();
        self.calls()
            .into_iter()
            .filter(|(p, _)| *p == path)
            .map(|(_, q)| q)
            .collect()
    }

    fn reset(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl ReportSource for Recorder {
    fn get_json(&self, path: &str, query: &ReportQuery) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((path.to_string(), query.to_string()));

        if let Some((watched, store)) = self.watch.lock().unwrap().as_ref() {
            if watched == path {
                self.observed.lock().unwrap().push(store.snapshot());
            }
        }
        if self.failing.lock().unwrap().contains(path) {
            return Err(DashboardError::Http {
                status: 500,
                body: "boom".to_string(),
            });
        }
        Ok(self
            .replies
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(|| json!({})))
    }
}

fn month(year: i32, month: u32) -> MonthKey {
    MonthKey::new(year, month).unwrap()
}

fn filter(m: MonthKey, ids: &[i64]) -> Arc<Filter> {
    Arc::new(Filter::for_month(m, ids.iter().copied()))
}

fn setup(family: Family, initial: Arc<Filter>) -> (Arc<Recorder>, Orchestrator) {
    let recorder = Arc::new(Recorder::default());
    let client = ReportClient::new(recorder.clone(), 12);
    (recorder, Orchestrator::new(client, family, initial))
}

fn profit(total: f64) -> Value {
    json!({"data": [{"sl_no": 1, "department": "Visa", "profit": total}], "total_profit": total})
}

fn total_profit(state: &SectionState) -> Option<f64> {
    match &state.data {
        Some(ReportPayload::DepartmentProfit(DepartmentProfitReport { total_profit, .. })) => *total_profit,
        _ => None,
    }
}

#[test]
fn mount_fetches_summary_only() {
    let (api, mut orch) = setup(Family::Retail, filter(month(2026, 1), &[1]));
    orch.mount();
    orch.mount();

    let calls = api.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "/api/dashboard/monthly-retail/summary");
    assert!(orch.summary().loaded);
    assert!(orch.panels().iter().all(|p| p.state() == SectionState::default()));
}

#[test]
fn filter_changes_before_any_open_leave_panels_idle() {
    let (api, mut orch) = setup(Family::B2b, filter(month(2025, 11), &[1]));
    orch.mount();
    assert_eq!(orch.apply(filter(month(2025, 12), &[1, 2])), 0);
    assert_eq!(orch.apply(filter(month(2026, 1), &[3])), 0);

    assert!(api
        .calls()
        .iter()
        .all(|(path, _)| path == "/api/dashboard/monthly-b2b/summary"));
    assert_eq!(api.calls().len(), 3);
    assert!(orch.panels().iter().all(|p| p.state() == SectionState::default()));
}

#[test]
fn filter_change_refetches_exactly_the_loaded_panels() {
    let (api, mut orch) = setup(Family::Branches, filter(month(2025, 12), &[1]));
    orch.mount();
    assert!(orch.open(ReportKind::BranchesDepartmentWise));
    assert!(orch.open(ReportKind::CorporateClients));
    // Closing is presentation only; the panel stays loaded and keeps refreshing.
    orch.close(ReportKind::CorporateClients);
    api.reset();

    let refreshed = orch.apply(filter(month(2026, 1), &[1, 2]));
    assert_eq!(refreshed, 2);

    let mut paths: Vec<String> = api.calls().into_iter().map(|(p, _)| p).collect();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            "/api/dashboard/branches/corporate-clients".to_string(),
            "/api/dashboard/branches/department-wise".to_string(),
            "/api/dashboard/branches/summary".to_string(),
        ]
    );
    assert!(api
        .calls()
        .iter()
        .all(|(_, q)| q.contains("company_ids[]=1&company_ids[]=2")));

    let untouched = orch
        .panels()
        .iter()
        .filter(|p| !matches!(p.kind(), ReportKind::BranchesDepartmentWise | ReportKind::CorporateClients));
    for panel in untouched {
        assert_eq!(panel.state(), SectionState::default(), "{}", panel.kind().slug());
    }
}

#[test]
fn reopening_a_panel_does_not_refetch() {
    let (api, mut orch) = setup(Family::Retail, filter(month(2026, 1), &[1]));
    orch.mount();
    assert!(orch.toggle(ReportKind::SalesTeamStaff));
    assert!(!orch.toggle(ReportKind::SalesTeamStaff));
    assert!(!orch.toggle(ReportKind::SalesTeamStaff));
    assert!(!orch.open(ReportKind::SalesTeamStaff));

    assert_eq!(api.calls_to(ReportKind::SalesTeamStaff).len(), 1);
    assert!(orch.panel(ReportKind::SalesTeamStaff).unwrap().is_open());
}

#[test]
fn loaded_survives_failures_and_closing() {
    let (api, mut orch) = setup(Family::Retail, filter(month(2026, 1), &[1]));
    api.fail(ReportKind::RetailOutstanding);
    orch.mount();
    orch.open(ReportKind::RetailOutstanding);

    let state = orch.panel(ReportKind::RetailOutstanding).unwrap().state();
    assert!(state.loaded);
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("API 500: boom"));

    orch.close(ReportKind::RetailOutstanding);
    orch.apply(filter(month(2026, 2), &[1]));
    let state = orch.panel(ReportKind::RetailOutstanding).unwrap().state();
    assert!(state.loaded);
    assert_eq!(api.calls_to(ReportKind::RetailOutstanding).len(), 2);
}

#[test]
fn one_failing_panel_leaves_the_others_alone() {
    let (api, mut orch) = setup(Family::Retail, filter(month(2026, 1), &[1]));
    api.fail(ReportKind::RetailSummary);
    orch.mount();
    orch.open(ReportKind::RetailDepartmentWise);

    assert_eq!(orch.summary().error.as_deref(), Some("API 500: boom"));
    let panel = orch.panel(ReportKind::RetailDepartmentWise).unwrap().state();
    assert!(panel.error.is_none());
    assert!(panel.data.is_some());
}

#[test]
fn reapplying_the_same_filter_is_not_a_change() {
    let (api, mut orch) = setup(Family::Retail, filter(month(2026, 1), &[1]));
    orch.mount();
    orch.open(ReportKind::RetailDepartmentWise);
    api.reset();

    let same = orch.filter().clone();
    assert_eq!(orch.apply(same), 0);
    assert!(api.calls().is_empty());

    // A fresh value is a change even when it compares equal.
    let equal = Arc::new(orch.filter().as_ref().clone());
    assert_eq!(orch.apply(equal), 1);
    assert_eq!(api.calls().len(), 2);
}

#[test]
fn empty_selection_fetches_nothing() {
    let (api, mut orch) = setup(Family::Branches, filter(month(2026, 1), &[]));
    orch.mount();
    orch.open(ReportKind::BranchesDepartmentWise);
    assert!(orch.panel(ReportKind::BranchesDepartmentWise).unwrap().is_open());
    assert_eq!(orch.apply(filter(month(2026, 2), &[])), 0);

    assert!(api.calls().is_empty());
    assert_eq!(orch.summary(), SectionState::default());
}

#[test]
fn apply_before_mount_mounts() {
    let (api, mut orch) = setup(Family::Retail, filter(month(2025, 12), &[1]));
    assert_eq!(orch.apply(filter(month(2026, 1), &[1])), 0);
    let calls = api.calls_to(ReportKind::RetailSummary);
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with("date_from=2026-01-01&date_to=2026-01-31"));
}

#[test]
fn pre_opened_panel_never_fetches_on_its_own() {
    let (api, mut orch) = setup(Family::Retail, filter(month(2026, 1), &[1]));
    orch.pre_open(ReportKind::RetailTotalReview);
    orch.mount();
    assert!(orch.panel(ReportKind::RetailTotalReview).unwrap().is_open());

    orch.close(ReportKind::RetailTotalReview);
    assert!(!orch.open(ReportKind::RetailTotalReview));
    assert!(api.calls_to(ReportKind::RetailTotalReview).is_empty());
}

#[test]
fn reloading_panel_keeps_previous_data_visible() {
    let (api, mut orch) = setup(Family::Retail, filter(month(2025, 12), &[1]));
    api.reply(ReportKind::RetailDepartmentWise, profit(100.0));
    orch.mount();
    orch.open(ReportKind::RetailDepartmentWise);
    let store = orch
        .panel(ReportKind::RetailDepartmentWise)
        .unwrap()
        .store()
        .clone();
    assert_eq!(total_profit(&store.snapshot()), Some(100.0));

    api.reset();
    api.reply(ReportKind::RetailDepartmentWise, profit(250.0));
    api.watch(ReportKind::RetailDepartmentWise, store.clone());
    orch.apply(filter(month(2026, 1), &[1, 2]));

    assert_eq!(
        api.calls_to(ReportKind::RetailDepartmentWise),
        vec!["date_from=2026-01-01&date_to=2026-01-31&company_ids[]=1&company_ids[]=2".to_string()]
    );

    let observed = api.observed.lock().unwrap().clone();
    assert_eq!(observed.len(), 1);
    assert!(observed[0].loading);
    assert_eq!(total_profit(&observed[0]), Some(100.0));

    let after = store.snapshot();
    assert!(!after.loading);
    assert_eq!(total_profit(&after), Some(250.0));
}

#[test]
fn failed_summary_reload_drops_old_figures() {
    let (api, mut orch) = setup(Family::Retail, filter(month(2025, 12), &[1]));
    api.reply(ReportKind::RetailSummary, json!({"total_sales_amount": 10}));
    orch.mount();
    assert!(orch.summary().data.is_some());

    // A failed reload does not bring back the previous figures.
    api.fail(ReportKind::RetailSummary);
    orch.apply(filter(month(2026, 1), &[1]));
    let state = orch.summary();
    assert!(state.data.is_none());
    assert_eq!(state.error.as_deref(), Some("API 500: boom"));
}
