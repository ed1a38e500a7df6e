//! Export: fetch every report of a family at once, build the workbook and
//! write it to disk.
//!
//! The fetch is all-or-nothing. If any report fails the export fails and no
//! file is written.

use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::client::ReportClient;
use crate::error::{DashboardError, Result};
use crate::filter::Filter;
use crate::persist::{join_ids, FilterStore, SessionStorage};
use crate::report::{Family, ReportKind, ReportPayload};
use crate::workbook::{build_workbook, save_workbook, ExportContext, Workbook};

/// How long a failed export's message stays visible.
pub const ERROR_DISPLAY: Duration = Duration::from_secs(4);

/// `<prefix>_Report_<from>_to_<to>.xlsx`
pub fn export_file_name(family: Family, filter: &Filter) -> String {
    format!(
        "{}_Report_{}_to_{}.xlsx",
        family.export_prefix(),
        filter.date_from(),
        filter.date_to()
    )
}

/// Text for the summary sheet's selection row: cached names for Retail and
/// B2B, the raw id list for Branches.
pub fn selection_label<S: SessionStorage>(
    family: Family,
    filter: &Filter,
    store: &FilterStore<S>,
) -> String {
    let ids: Vec<_> = filter.entity_ids().iter().copied().collect();
    if family.exports_entity_names() {
        store.resolve_names(&ids)
    } else {
        join_ids(&ids)
    }
}

/// Fetch every report of `family` concurrently. The first failure wins.
pub fn fetch_all(
    client: &ReportClient,
    family: Family,
    filter: &Filter,
) -> Result<BTreeMap<ReportKind, ReportPayload>> {
    if !filter.is_fetchable() {
        return Err(DashboardError::EmptySelection);
    }
    tracing::info!(%family, reports = family.reports().len(), "export fan-out");
    let reports = family
        .reports()
        .par_iter()
        .map(|&kind| client.fetch(kind, filter).map(|payload| (kind, payload)))
        .collect::<Result<BTreeMap<_, _>>>()?;
    tracing::info!(%family, "export fan-in complete");
    Ok(reports)
}

/// Fetch and build without touching the filesystem.
pub fn build_export(client: &ReportClient, family: Family, filter: &Filter, selection: String) -> Result<Workbook> {
    let reports = fetch_all(client, family, filter)?;
    let ctx = ExportContext {
        family,
        date_from: filter.date_from(),
        date_to: filter.date_to(),
        selection,
    };
    Ok(build_workbook(&ctx, &reports))
}

/// Fetch, build and save into `dir`. Returns the written path.
pub fn run_export(
    client: &ReportClient,
    family: Family,
    filter: &Filter,
    selection: String,
    dir: &Path,
) -> Result<PathBuf> {
    let workbook = build_export(client, family, filter, selection)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(family, filter));
    save_workbook(&workbook, &path)?;
    Ok(path)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Idle,
    Exporting,
    Failed(String),
}

/// Export progress for an interactive session. A failure is shown for
/// [`ERROR_DISPLAY`] and then reads as idle again.
#[derive(Debug, Clone, Default)]
pub struct ExportTracker {
    exporting: bool,
    failure: Option<(String, Instant)>,
}

impl ExportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) {
        self.exporting = true;
        self.failure = None;
    }

    pub fn succeed(&mut self) {
        self.exporting = false;
    }

    pub fn fail(&mut self, message: impl Into<String>, at: Instant) {
        self.exporting = false;
        self.failure = Some((message.into(), at));
    }

    pub fn status_at(&self, now: Instant) -> ExportStatus {
        if self.exporting {
            return ExportStatus::Exporting;
        }
        match &self.failure {
            Some((message, at)) if now.saturating_duration_since(*at) < ERROR_DISPLAY => {
                ExportStatus::Failed(message.clone())
            }
            _ => ExportStatus::Idle,
        }
    }

    pub fn status(&self) -> ExportStatus {
        self.status_at(Instant::now())
    }

    /// Run `export`, recording the outcome. The error is kept as state and
    /// also handed back to the caller.
    pub fn track<T>(&mut self, export: impl FnOnce() -> Result<T>) -> Result<T> {
        self.begin();
        match export() {
            Ok(value) => {
                self.succeed();
                Ok(value)
            }
            Err(e) => {
                if e.is_fetch_error() {
                    tracing::warn!(error = %e, "export aborted by a failed report");
                } else {
                    tracing::error!(error = %e, "export failed");
                }
                self.fail(e.to_string(), Instant::now());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::MonthKey;
    use crate::persist::MemoryStorage;
    use crate::report::Entity;

    fn january(ids: &[i64]) -> Filter {
        Filter::for_month(MonthKey::new(2026, 1).unwrap(), ids.iter().copied())
    }

    #[test]
    fn file_name_uses_family_prefix_and_range() {
        assert_eq!(
            export_file_name(Family::Retail, &january(&[1])),
            "B2C_Report_2026-01-01_to_2026-01-31.xlsx"
        );
        assert_eq!(
            export_file_name(Family::Branches, &january(&[1])),
            "Branches_Report_2026-01-01_to_2026-01-31.xlsx"
        );
    }

    #[test]
    fn branches_export_raw_ids() {
        let store = FilterStore::new(MemoryStorage::new());
        store.save_entities(&[Entity::new(1, "Dubai"), Entity::new(2, "Sharjah")]);
        let filter = january(&[2, 1]);
        assert_eq!(selection_label(Family::B2b, &filter, &store), "Dubai, Sharjah");
        assert_eq!(selection_label(Family::Branches, &filter, &store), "1, 2");
    }

    #[test]
    fn failure_clears_after_display_window() {
        let mut tracker = ExportTracker::new();
        let start = Instant::now();
        tracker.begin();
        assert_eq!(tracker.status_at(start), ExportStatus::Exporting);

        tracker.fail("API 500: boom", start);
        assert_eq!(
            tracker.status_at(start + Duration::from_secs(3)),
            ExportStatus::Failed("API 500: boom".to_string())
        );
        assert_eq!(tracker.status_at(start + ERROR_DISPLAY), ExportStatus::Idle);
    }

    #[test]
    fn track_records_outcome() {
        let mut tracker = ExportTracker::new();
        let err = tracker
            .track(|| -> Result<()> { Err(DashboardError::EmptySelection) })
            .unwrap_err();
        assert!(matches!(err, DashboardError::EmptySelection));
        assert!(matches!(tracker.status(), ExportStatus::Failed(_)));

        tracker.track(|| Ok(())).unwrap();
        assert_eq!(tracker.status(), ExportStatus::Idle);
    }
}
