//! Pillar read-model service.
//!
//! # Responsibility
//! - Build pillar cards (current score, trend, monthly average).
//! - Build the per-pillar month grid, chart series and the cross-pillar day
//!   overview.
//! - Seed pillars; the core never edits them afterwards.
//!
//! # Invariants
//! - Every read resolves local today once and ignores rows dated after it.
//! - Entries inside a card are ordered by date ascending.

use crate::calendar::day::{LocalClock, YearMonth};
use crate::calendar::grid::{build_month_grid, MonthGrid};
use crate::calendar::trend::{
    current_score, monthly_average, recent_window, trend, MonthlyAverage, Timeframe, Trend,
};
use crate::model::entry::{DailyEntry, Score};
use crate::model::pillar::{Pillar, PillarId};
use crate::repo::entry_repo::{EntryListQuery, EntryRepository};
use crate::repo::pillar_repo::PillarRepository;
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use log::info;
use std::collections::{BTreeSet, HashMap};

/// One pillar card.
#[derive(Debug, Clone, PartialEq)]
pub struct PillarOverview {
    pub pillar: Pillar,
    pub color: &'static str,
    pub description: &'static str,
    /// Date ascending, never after today.
    pub entries: Vec<DailyEntry>,
    pub current_score: Option<Score>,
    pub trend: Trend,
    /// Average over the month containing today.
    pub monthly_average: MonthlyAverage,
}

impl PillarOverview {
    fn build(pillar: Pillar, entries: Vec<DailyEntry>, month: YearMonth) -> Self {
        Self {
            color: pillar.color_token(),
            description: pillar.description(),
            current_score: current_score(&entries),
            trend: trend(&entries),
            monthly_average: monthly_average(&entries, month),
            pillar,
            entries,
        }
    }
}

/// One pillar row in the day overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayPillarItem {
    pub pillar: Pillar,
    pub entry: Option<DailyEntry>,
}

/// Every pillar's state for a single day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayOverview {
    pub date: NaiveDate,
    /// One item per pillar, in pillar order.
    pub items: Vec<DayPillarItem>,
    pub has_any_entry: bool,
    /// `(pillar name, note)` for entries with a non-blank note.
    pub notes: Vec<(String, String)>,
}

/// Pillar service facade over pillar and entry repositories.
pub struct PillarService<P: PillarRepository, E: EntryRepository> {
    pillars: P,
    entries: E,
    clock: LocalClock,
}

impl<P: PillarRepository, E: EntryRepository> PillarService<P, E> {
    pub fn new(pillars: P, entries: E, clock: LocalClock) -> Self {
        Self {
            pillars,
            entries,
            clock,
        }
    }

    pub fn clock(&self) -> &LocalClock {
        &self.clock
    }

    /// Stores a new pillar and returns it as persisted.
    pub fn seed_pillar(&self, name: &str, icon: &str, category: &str) -> RepoResult<Pillar> {
        let pillar = Pillar::new(name.trim(), icon, category);
        let id = self.pillars.create_pillar(&pillar)?;
        info!("event=pillar_seed module=service status=ok");
        self.require_pillar(id)
    }

    pub fn list_pillars(&self) -> RepoResult<Vec<Pillar>> {
        self.pillars.list_pillars()
    }

    /// All pillar cards, loaded with one entry query.
    pub fn overview(&self) -> RepoResult<Vec<PillarOverview>> {
        let today = self.clock.today();
        let pillars = self.pillars.list_pillars()?;
        let entries = self.entries.list_entries(&EntryListQuery {
            up_to: Some(today),
            ..EntryListQuery::default()
        })?;

        let mut by_pillar: HashMap<PillarId, Vec<DailyEntry>> = HashMap::new();
        for entry in entries {
            by_pillar.entry(entry.pillar_id).or_default().push(entry);
        }

        let month = YearMonth::of(today);
        let cards: Vec<PillarOverview> = pillars
            .into_iter()
            .map(|pillar| {
                let entries = by_pillar.remove(&pillar.id).unwrap_or_default();
                PillarOverview::build(pillar, entries, month)
            })
            .collect();

        info!(
            "event=pillar_overview module=service status=ok pillars={}",
            cards.len()
        );
        Ok(cards)
    }

    /// Card for a single pillar.
    pub fn pillar_detail(&self, pillar_id: PillarId) -> RepoResult<PillarOverview> {
        let today = self.clock.today();
        let pillar = self.require_pillar(pillar_id)?;
        let entries = self.history(pillar_id, today)?;
        Ok(PillarOverview::build(pillar, entries, YearMonth::of(today)))
    }

    /// Heat-map grid for one pillar; `month` defaults to the current month.
    pub fn month_grid(
        &self,
        pillar_id: PillarId,
        month: Option<YearMonth>,
        selected: Option<NaiveDate>,
    ) -> RepoResult<MonthGrid> {
        let today = self.clock.today();
        let month = month.unwrap_or_else(|| YearMonth::of(today));
        let entries = self.history(pillar_id, today)?;
        Ok(build_month_grid(month, &entries, today, selected))
    }

    /// Chart series: the most recent entries for the timeframe, date ascending.
    pub fn chart_series(
        &self,
        pillar_id: PillarId,
        timeframe: Timeframe,
    ) -> RepoResult<Vec<DailyEntry>> {
        let entries = self.history(pillar_id, self.clock.today())?;
        Ok(recent_window(&entries, timeframe).to_vec())
    }

    /// Cross-pillar view of one day.
    pub fn day_overview(&self, date: NaiveDate) -> RepoResult<DayOverview> {
        let pillars = self.pillars.list_pillars()?;
        let mut by_pillar: HashMap<PillarId, DailyEntry> = if date > self.clock.today() {
            HashMap::new()
        } else {
            self.entries
                .list_entries(&EntryListQuery {
                    date: Some(date),
                    ..EntryListQuery::default()
                })?
                .into_iter()
                .map(|entry| (entry.pillar_id, entry))
                .collect()
        };

        let items: Vec<DayPillarItem> = pillars
            .into_iter()
            .map(|pillar| DayPillarItem {
                entry: by_pillar.remove(&pillar.id),
                pillar,
            })
            .collect();

        let notes = items
            .iter()
            .filter_map(|item| {
                let entry = item.entry.as_ref().filter(|entry| entry.has_notes())?;
                Some((item.pillar.name.clone(), entry.notes.trim().to_string()))
            })
            .collect();

        Ok(DayOverview {
            date,
            has_any_entry: items.iter().any(|item| item.entry.is_some()),
            items,
            notes,
        })
    }

    /// Days in `month` on which any pillar has an entry.
    pub fn days_with_entries(&self, month: YearMonth) -> RepoResult<BTreeSet<NaiveDate>> {
        let entries = self.entries.list_entries(&EntryListQuery {
            up_to: Some(self.clock.today()),
            ..EntryListQuery::default()
        })?;
        Ok(entries
            .into_iter()
            .map(|entry| entry.date)
            .filter(|date| month.contains(*date))
            .collect())
    }

    fn history(&self, pillar_id: PillarId, today: NaiveDate) -> RepoResult<Vec<DailyEntry>> {
        self.entries.list_entries(&EntryListQuery {
            pillar_id: Some(pillar_id),
            up_to: Some(today),
            date: None,
        })
    }

    fn require_pillar(&self, pillar_id: PillarId) -> RepoResult<Pillar> {
        self.pillars
            .get_pillar(pillar_id)?
            .ok_or(RepoError::NotFound {
                kind: "pillar",
                id: pillar_id,
            })
    }
}
