//! Report Client: typed accessor over the reporting API.
//!
//! `ReportSource` is the raw I/O seam (path + query in, JSON out). The HTTP
//! implementation lives in [`http`]; tests substitute an in-memory source.
//! `ReportClient` layers the report catalogue on top: it knows which query
//! parameters each report takes and decodes the reply into a `ReportPayload`.

mod http;

pub use http::HttpSource;

use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ApiSettings;
use crate::error::Result;
use crate::filter::Filter;
use crate::report::{Entity, Family, QueryStyle, ReportKind, ReportPayload};

/// Anything that can answer `GET <path>?<query>` with a JSON document.
pub trait ReportSource: Send + Sync {
    fn get_json(&self, path: &str, query: &ReportQuery) -> Result<Value>;
}

/// Ordered query parameters. Array parameters repeat their key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportQuery {
    pairs: Vec<(String, String)>,
}

impl ReportQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: impl ToString) {
        self.pairs.push((key.to_string(), value.to_string()));
    }

    /// Query for `kind` under `filter`, following the report's query style.
    pub fn for_report(kind: ReportKind, filter: &Filter, months_back: u32) -> Self {
        let mut query = Self::new();
        let style = kind.query_style();

        if style == QueryStyle::MonthRolling {
            query.push("month", filter.month());
        } else {
            query.push("date_from", filter.date_from());
            query.push("date_to", filter.date_to());
        }
        for id in filter.entity_ids() {
            query.push("company_ids[]", id);
        }
        match style {
            QueryStyle::Standard => {}
            QueryStyle::Rolling | QueryStyle::MonthRolling => query.push("months_back", months_back),
            QueryStyle::Paginated { page_size } => {
                query.push("page", 1);
                query.push("page_size", page_size);
            }
        }
        query
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Display for ReportQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EntityList {
    Bare(Vec<Entity>),
    Wrapped { companies: Vec<Entity> },
}

#[derive(Clone)]
pub struct ReportClient {
    source: Arc<dyn ReportSource>,
    months_back: u32,
}

impl ReportClient {
    pub fn new(source: Arc<dyn ReportSource>, months_back: u32) -> Self {
        Self {
            source,
            months_back,
        }
    }

    /// HTTP client configured from `[api]`.
    pub fn from_settings(settings: &ApiSettings) -> Self {
        let timeout = (settings.timeout_secs > 0).then(|| Duration::from_secs(settings.timeout_secs));
        let source = HttpSource::new(&settings.base_url, timeout);
        Self::new(Arc::new(source), settings.months_back)
    }

    pub fn months_back(&self) -> u32 {
        self.months_back
    }

    /// Fetch and decode one report.
    pub fn fetch(&self, kind: ReportKind, filter: &Filter) -> Result<ReportPayload> {
        let query = ReportQuery::for_report(kind, filter, self.months_back);
        let value = self.source.get_json(&kind.path(), &query)?;
        ReportPayload::decode(kind, value)
    }

    pub fn entities(&self, family: Family) -> Result<Vec<Entity>> {
        let value = self.source.get_json(family.companies_path(), &ReportQuery::new())?;
        let list: EntityList = serde_json::from_value(value)
            .map_err(|e| crate::error::DashboardError::Decode(e.to_string()))?;
        Ok(match list {
            EntityList::Bare(list) | EntityList::Wrapped { companies: list } => list,
        })
    }

    /// Entity list, degrading to the family's built-in fallback on failure.
    pub fn entities_or_fallback(&self, family: Family) -> Vec<Entity> {
        match self.entities(family) {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(%family, error = %e, "entity list unavailable, using fallback");
                family.fallback_entities()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::MonthKey;
    use serde_json::json;
    use std::sync::Mutex;

    struct Canned {
        reply: Value,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl ReportSource for Canned {
        fn get_json(&self, path: &str, query: &ReportQuery) -> Result<Value> {
            self.seen
                .lock()
                .unwrap()
                .push((path.to_string(), query.to_string()));
            Ok(self.reply.clone())
        }
    }

    fn january(ids: &[i64]) -> Filter {
        Filter::for_month(MonthKey::new(2026, 1).unwrap(), ids.iter().copied())
    }

    #[test]
    fn standard_query_repeats_company_ids() {
        let query = ReportQuery::for_report(ReportKind::RetailDepartmentWise, &january(&[2, 1]), 12);
        assert_eq!(
            query.to_string(),
            "date_from=2026-01-01&date_to=2026-01-31&company_ids[]=1&company_ids[]=2"
        );
    }

    #[test]
    fn rolling_and_paginated_queries_add_their_parameters() {
        let rolling = ReportQuery::for_report(ReportKind::TeamWise, &january(&[1]), 6);
        assert!(rolling.to_string().ends_with("company_ids[]=1&months_back=6"));

        let paged = ReportQuery::for_report(ReportKind::CorporateClients, &january(&[1]), 12);
        assert!(paged.to_string().ends_with("page=1&page_size=9999"));

        let monthly = ReportQuery::for_report(ReportKind::AbscondingMonthly, &january(&[1]), 12);
        assert_eq!(monthly.to_string(), "month=2026-01&company_ids[]=1&months_back=12");
    }

    #[test]
    fn entities_accept_bare_and_wrapped_lists() {
        for reply in [
            json!([{"id": 1, "name": "Alpha", "short_name": "A", "active": true}]),
            json!({"companies": [{"id": 1, "name": "Alpha", "code": "ALP"}], "total_companies": 1}),
        ] {
            let source = Arc::new(Canned {
                reply,
                seen: Mutex::new(Vec::new()),
            });
            let client = ReportClient::new(source.clone(), 12);
            let list = client.entities(Family::Branches).unwrap();
            assert_eq!(list[0].name, "Alpha");
            assert_eq!(
                source.seen.lock().unwrap()[0].0,
                "/api/dashboard/branches/companies"
            );
        }
    }

    #[test]
    fn fetch_hits_report_path_and_decodes() {
        let source = Arc::new(Canned {
            reply: json!({"data": [], "total_profit": 0}),
            seen: Mutex::new(Vec::new()),
        });
        let client = ReportClient::new(source.clone(), 12);
        let payload = client.fetch(ReportKind::RetailDepartmentWise, &january(&[1])).unwrap();
        assert!(matches!(payload, ReportPayload::DepartmentProfit(_)));
        assert_eq!(
            source.seen.lock().unwrap()[0].0,
            "/api/dashboard/monthly-retail/department-wise"
        );
    }
}
