//! Filter Orchestrator: owns the shared filter, the summary section and one
//! lazily-opened panel per report, and decides what re-fetches when the
//! filter changes.
//!
//! - On mount and on every filter change the summary is fetched, whatever
//!   state the panels are in.
//! - On every change after mount, each panel whose section is `loaded` is
//!   re-fetched with the new filter. Panels never opened are left alone.
//! - An empty entity selection fetches nothing.
//!
//! Fetches for one change run concurrently and `apply` returns once all of
//! them have settled.

use std::sync::Arc;

use crate::client::ReportClient;
use crate::filter::Filter;
use crate::panel::LazyPanel;
use crate::report::{Family, ReportKind};
use crate::section::{RacePolicy, SectionState, SectionStore};

/// One collapsible report block.
#[derive(Debug, Clone)]
pub struct Panel {
    kind: ReportKind,
    controller: LazyPanel,
    store: SectionStore,
}

impl Panel {
    fn new(kind: ReportKind, policy: RacePolicy) -> Self {
        Self {
            kind,
            controller: LazyPanel::new(),
            store: SectionStore::new().with_policy(policy),
        }
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    pub fn is_open(&self) -> bool {
        self.controller.is_open()
    }

    pub fn state(&self) -> SectionState {
        self.store.snapshot()
    }

    pub fn store(&self) -> &SectionStore {
        &self.store
    }
}

pub struct Orchestrator {
    client: ReportClient,
    family: Family,
    filter: Arc<Filter>,
    summary: SectionStore,
    panels: Vec<Panel>,
    mounted: bool,
}

impl Orchestrator {
    pub fn new(client: ReportClient, family: Family, filter: Arc<Filter>) -> Self {
        Self::with_policy(client, family, filter, RacePolicy::default())
    }

    pub fn with_policy(
        client: ReportClient,
        family: Family,
        filter: Arc<Filter>,
        policy: RacePolicy,
    ) -> Self {
        let panels = family
            .panels()
            .iter()
            .map(|&kind| Panel::new(kind, policy))
            .collect();
        Self {
            client,
            family,
            filter,
            summary: SectionStore::summary().with_policy(policy),
            panels,
            mounted: false,
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn filter(&self) -> &Arc<Filter> {
        &self.filter
    }

    pub fn client(&self) -> &ReportClient {
        &self.client
    }

    pub fn summary(&self) -> SectionState {
        self.summary.snapshot()
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panel(&self, kind: ReportKind) -> Option<&Panel> {
        self.panels.iter().find(|p| p.kind == kind)
    }

    /// First render: fetch the summary only.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.run_effects(false);
    }

    /// Replace the filter. Returns how many panels were re-fetched.
    ///
    /// The same `Arc` applied twice is not a change; a new value is, even if
    /// it compares equal.
    pub fn apply(&mut self, filter: Arc<Filter>) -> usize {
        if Arc::ptr_eq(&self.filter, &filter) {
            return 0;
        }
        self.filter = filter;
        if !self.mounted {
            self.mount();
            return 0;
        }
        self.run_effects(true)
    }

    fn run_effects(&self, refetch_panels: bool) -> usize {
        if !self.filter.is_fetchable() {
            tracing::debug!(family = %self.family, "empty entity selection, nothing fetched");
            return 0;
        }

        let stale: Vec<&Panel> = if refetch_panels {
            self.panels.iter().filter(|p| p.store.is_loaded()).collect()
        } else {
            Vec::new()
        };
        tracing::info!(
            family = %self.family,
            from = %self.filter.date_from(),
            to = %self.filter.date_to(),
            panels = stale.len(),
            "filter applied"
        );

        let client = &self.client;
        let filter = self.filter.as_ref();
        let summary_kind = self.family.summary();
        rayon::scope(|s| {
            let summary = &self.summary;
            s.spawn(move |_| {
                summary.dispatch(|| client.fetch(summary_kind, filter));
            });
            for panel in &stale {
                let kind = panel.kind;
                let store = &panel.store;
                s.spawn(move |_| {
                    store.dispatch(|| client.fetch(kind, filter));
                });
            }
        });
        stale.len()
    }

    /// Toggle a panel. The first open fetches it; nothing else does.
    /// Returns true when a fetch ran.
    pub fn toggle(&mut self, kind: ReportKind) -> bool {
        let Some(index) = self.panels.iter().position(|p| p.kind == kind) else {
            return false;
        };
        let fire = self.panels[index].controller.toggle();
        if fire {
            self.fetch_panel(index);
        }
        fire
    }

    /// Open a panel if closed. Returns true when a fetch ran.
    pub fn open(&mut self, kind: ReportKind) -> bool {
        match self.panel(kind) {
            Some(panel) if !panel.is_open() => self.toggle(kind),
            _ => false,
        }
    }

    /// Show a panel open without fetching. It never fires a first-open fetch
    /// afterwards; only filter changes refresh it once it has loaded.
    pub fn pre_open(&mut self, kind: ReportKind) {
        if let Some(panel) = self.panels.iter_mut().find(|p| p.kind == kind) {
            panel.controller = LazyPanel::pre_opened();
        }
    }

    /// Close a panel. Fetch state is untouched.
    pub fn close(&mut self, kind: ReportKind) {
        if let Some(panel) = self.panels.iter_mut().find(|p| p.kind == kind) {
            panel.controller.close();
        }
    }

    fn fetch_panel(&self, index: usize) {
        if !self.filter.is_fetchable() {
            tracing::debug!(family = %self.family, "empty entity selection, panel not fetched");
            return;
        }
        let panel = &self.panels[index];
        panel
            .store
            .dispatch(|| self.client.fetch(panel.kind, &self.filter));
    }
}
