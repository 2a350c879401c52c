//! Run orchestration.
//!
//! `Fetching -> Extracting -> (per table: Normalizing -> per record:
//! Reconciling -> Publishing) -> Done`. Only fetch exhaustion and a missing
//! schedule table move the run to `Failed`; row and record problems are
//! turned into an `ItemOutcome` and counted.
use crate::client::fetch::DocumentFetcher;
use crate::client::google::GoogleCalendar;
use crate::config::Config;
use crate::error::Result;
use crate::extract::extract_tables;
use crate::model::{RawRow, RawTable};
use crate::normalize::normalize_row;
use crate::publish::Publisher;
use crate::reconcile::Reconciler;
use crate::store::CalendarStore;
use std::fmt;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RunState {
    Fetching,
    Extracting,
    Normalizing,
    Reconciling,
    Publishing,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Created,
    /// Already on the calendar; intentionally skipped.
    Duplicate,
    /// Row could not be turned into a record.
    Invalid(String),
    LookupFailed(String),
    PublishFailed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSummary {
    /// 1-based position among the matching tables.
    pub index: usize,
    pub year_label: String,
    pub processed: usize,
    pub created: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub invalid: usize,
}

impl TableSummary {
    fn new(index: usize, table: &RawTable) -> Self {
        Self {
            index,
            year_label: table.year_label.clone(),
            invalid: table.malformed_rows,
            ..Default::default()
        }
    }

    fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Created => {
                self.created += 1;
                self.processed += 1;
            }
            ItemOutcome::Duplicate => {
                self.duplicates += 1;
                self.processed += 1;
            }
            ItemOutcome::PublishFailed(_) => {
                self.failed += 1;
                self.processed += 1;
            }
            ItemOutcome::LookupFailed(_) => self.failed += 1,
            ItemOutcome::Invalid(_) => self.invalid += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub tables: Vec<TableSummary>,
}

impl RunSummary {
    fn total(&self, f: impl Fn(&TableSummary) -> usize) -> usize {
        self.tables.iter().map(f).sum()
    }

    pub fn processed(&self) -> usize {
        self.total(|t| t.processed)
    }
    pub fn created(&self) -> usize {
        self.total(|t| t.created)
    }
    pub fn duplicates(&self) -> usize {
        self.total(|t| t.duplicates)
    }
    pub fn failed(&self) -> usize {
        self.total(|t| t.failed)
    }
    pub fn invalid(&self) -> usize {
        self.total(|t| t.invalid)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed {} (created {}, skipped {}, failed {}, invalid {})",
            self.processed(),
            self.created(),
            self.duplicates(),
            self.failed(),
            self.invalid()
        )
    }
}

pub struct Pipeline<'a, S> {
    config: &'a Config,
    store: &'a S,
    state: RunState,
}

impl<'a, S: CalendarStore> Pipeline<'a, S> {
    pub fn new(config: &'a Config, store: &'a S) -> Self {
        Self {
            config,
            store,
            state: RunState::Fetching,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn enter(&mut self, state: RunState) {
        log::debug!("{} -> {}", self.state, state);
        self.state = state;
    }

    /// Fetches the configured page and processes it.
    pub async fn run(&mut self, fetcher: &DocumentFetcher) -> Result<RunSummary> {
        self.enter(RunState::Fetching);
        log::info!("Fetching presale schedule from {}", self.config.settings.source_url);
        let markup = match fetcher.fetch(&self.config.settings.source_url).await {
            Ok(markup) => markup,
            Err(e) => {
                self.enter(RunState::Failed);
                return Err(e);
            }
        };
        self.process_markup(&markup).await
    }

    /// Extraction through publication for markup that is already in hand.
    pub async fn process_markup(&mut self, markup: &str) -> Result<RunSummary> {
        self.enter(RunState::Extracting);
        let tables = match extract_tables(markup, &self.config.settings.table_marker) {
            Ok(tables) => tables,
            Err(e) => {
                self.enter(RunState::Failed);
                return Err(e);
            }
        };
        log::info!("Found {} schedule table(s)", tables.len());

        let reconciler = Reconciler::new(self.store, self.config)?;
        let publisher = Publisher::new(self.store, self.config);
        let mut summary = RunSummary::default();

        for (i, table) in tables.iter().enumerate() {
            let mut table_summary = TableSummary::new(i + 1, table);
            log::info!("Table {} ({})", table_summary.index, table.year_label);
            if table.malformed_rows > 0 {
                log::warn!(
                    "Table {}: skipped {} row(s) without exactly three cells",
                    table_summary.index,
                    table.malformed_rows
                );
            }

            for row in &table.rows {
                let outcome = self
                    .process_row(row, &table.year_label, &reconciler, &publisher)
                    .await;
                table_summary.record(&outcome);
            }

            log::info!(
                "Table {}: processed {} holiday event(s)",
                table_summary.index,
                table_summary.processed
            );
            summary.tables.push(table_summary);
        }

        self.enter(RunState::Done);
        log::info!("Total: {}", summary);
        Ok(summary)
    }

    async fn process_row(
        &mut self,
        row: &RawRow,
        year_label: &str,
        reconciler: &Reconciler<'_, S>,
        publisher: &Publisher<'_, S>,
    ) -> ItemOutcome {
        self.enter(RunState::Normalizing);
        let record = match normalize_row(row, year_label) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Skipping row '{}': {}", row.0, e);
                return ItemOutcome::Invalid(e.to_string());
            }
        };

        self.enter(RunState::Reconciling);
        match reconciler.is_duplicate(&record).await {
            Ok(true) => {
                log::info!("Skipped: {} presale event already exists", record.holiday_name);
                return ItemOutcome::Duplicate;
            }
            Ok(false) => {}
            Err(e) => {
                log::error!("Error while checking {}: {}", record.holiday_name, e);
                return ItemOutcome::LookupFailed(e.to_string());
            }
        }

        self.enter(RunState::Publishing);
        match publisher.publish(&record).await {
            Ok(_) => {
                log::info!(
                    "Created: {} presale event on {}",
                    record.holiday_name,
                    record.sale_date
                );
                ItemOutcome::Created
            }
            Err(e) => {
                log::error!("Failed to add {} event - {}", record.holiday_name, e);
                ItemOutcome::PublishFailed(e.to_string())
            }
        }
    }
}

/// One complete run against Google Calendar. Authentication happens before
/// the page is fetched, so a bad credential fails fast.
pub async fn run(config: &Config) -> Result<RunSummary> {
    let store = GoogleCalendar::connect(config).await?;
    let fetcher = DocumentFetcher::new(&config.settings);
    Pipeline::new(config, &store).run(&fetcher).await
}
