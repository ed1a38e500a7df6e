pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod orchestrator;
pub mod panel;
pub mod persist;
pub mod render;
pub mod report;
pub mod section;
pub mod workbook;

pub use client::{HttpSource, ReportClient, ReportQuery, ReportSource};
pub use config::{ApiSettings, Config, ExportSettings};
pub use error::{DashboardError, Result};
pub use filter::{EntityId, Filter, MonthKey};
pub use orchestrator::{Orchestrator, Panel};
pub use panel::LazyPanel;
pub use persist::{FileStorage, FilterSnapshot, FilterStore, MemoryStorage, SessionStorage};
pub use report::{Entity, Family, ReportKind, ReportPayload};
pub use section::{RacePolicy, SectionState, SectionStore};
pub use workbook::{build_workbook, ExportContext, Workbook};
