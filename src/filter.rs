//! The shared dashboard filter: one calendar month's date range plus the set of
//! selected entities.
//!
//! A `Filter` is immutable once built. Consumers hold it behind an `Arc` and a
//! change is always a wholesale replacement with a new value.

use chrono::{Datelike, Months, NaiveDate};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{DashboardError, Result};

/// Integer id of a company, agency or branch.
pub type EntityId = i64;

/// A calendar month, written `YYYY-MM` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    /// Month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The calendar month before the one containing `today`.
    pub fn previous(today: NaiveDate) -> Self {
        let first = today.with_day(1).unwrap_or(today);
        Self::of(first.checked_sub_months(Months::new(1)).unwrap_or(first))
    }

    /// Accepts `YYYY-MM` as well as a full ISO date (`YYYY-MM-DD`), which some
    /// report payloads use for their month keys.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || DashboardError::InvalidMonth(input.to_string());
        let trimmed = input.trim();
        let head = trimmed.get(..7).ok_or_else(invalid)?;
        let (year, month) = head.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        if trimmed.len() > 7 && !trimmed[7..].starts_with('-') {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn last_day(&self) -> NaiveDate {
        let first = self.first_day();
        first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(first)
    }

    /// Short month + year, e.g. `Jan 2026`.
    pub fn short_label(&self) -> String {
        self.first_day().format("%b %Y").to_string()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    date_from: NaiveDate,
    date_to: NaiveDate,
    entity_ids: BTreeSet<EntityId>,
}

impl Filter {
    pub fn new(
        date_from: NaiveDate,
        date_to: NaiveDate,
        entity_ids: impl IntoIterator<Item = EntityId>,
    ) -> Result<Self> {
        if date_from > date_to {
            return Err(DashboardError::InvalidDateRange {
                from: date_from.to_string(),
                to: date_to.to_string(),
            });
        }
        Ok(Self {
            date_from,
            date_to,
            entity_ids: entity_ids.into_iter().collect(),
        })
    }

    /// First to last day of `month`.
    pub fn for_month(month: MonthKey, entity_ids: impl IntoIterator<Item = EntityId>) -> Self {
        Self {
            date_from: month.first_day(),
            date_to: month.last_day(),
            entity_ids: entity_ids.into_iter().collect(),
        }
    }

    /// Previous calendar month over every known entity.
    pub fn default_for(today: NaiveDate, entity_ids: impl IntoIterator<Item = EntityId>) -> Self {
        Self::for_month(MonthKey::previous(today), entity_ids)
    }

    pub fn date_from(&self) -> NaiveDate {
        self.date_from
    }

    pub fn date_to(&self) -> NaiveDate {
        self.date_to
    }

    pub fn entity_ids(&self) -> &BTreeSet<EntityId> {
        &self.entity_ids
    }

    /// Month the range starts in; the month-keyed endpoints take this.
    pub fn month(&self) -> MonthKey {
        MonthKey::of(self.date_from)
    }

    /// An empty selection must never reach the API.
    pub fn is_fetchable(&self) -> bool {
        !self.entity_ids.is_empty()
    }
}
