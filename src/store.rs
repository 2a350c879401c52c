// The calendar seam: the remote store that doubles as the idempotence ledger.
use crate::error::{PresaleError, Result};
use crate::model::{CalendarEvent, EventDateTime};
use chrono::{DateTime, FixedOffset, TimeZone};
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// What the pipeline needs from a calendar backend.
#[allow(async_fn_in_trait)]
pub trait CalendarStore {
    /// Events overlapping `[time_min, time_max)` that match `query` as free text.
    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<FixedOffset>,
        time_max: DateTime<FixedOffset>,
        query: &str,
    ) -> Result<Vec<CalendarEvent>>;

    async fn insert_event(&self, calendar_id: &str, event: &CalendarEvent)
    -> Result<CalendarEvent>;
}

/// In-process calendar with the same query semantics as the remote one.
#[derive(Debug, Default)]
pub struct MemoryCalendar {
    events: Mutex<Vec<(String, CalendarEvent)>>,
    failing: Mutex<HashSet<String>>,
    list_calls: AtomicUsize,
    insert_calls: AtomicUsize,
}

fn instant(when: &EventDateTime, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    if let Some(dt) = when.date_time {
        return Some(dt);
    }
    let midnight = when.date?.and_hms_opt(0, 0, 0)?;
    offset.from_local_datetime(&midnight).single()
}

impl MemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts whose summary contains `text` will be rejected.
    pub fn fail_inserts_matching(&self, text: &str) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(text.to_string());
        }
    }

    pub fn events(&self, calendar_id: &str) -> Vec<CalendarEvent> {
        self.events
            .lock()
            .map(|events| {
                events
                    .iter()
                    .filter(|(cal, _)| cal == calendar_id)
                    .map(|(_, e)| e.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }
}

impl CalendarStore for MemoryCalendar {
    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<FixedOffset>,
        time_max: DateTime<FixedOffset>,
        query: &str,
    ) -> Result<Vec<CalendarEvent>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let offset = *time_min.offset();
        let found = self
            .events(calendar_id)
            .into_iter()
            .filter(|e| e.mentions(query))
            .filter(|e| {
                let start = instant(&e.start, offset);
                let end = instant(&e.end, offset).or(start);
                match (start, end) {
                    (Some(start), Some(end)) => start < time_max && end > time_min,
                    _ => false,
                }
            })
            .collect();
        Ok(found)
    }

    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<CalendarEvent> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        let rejected = self
            .failing
            .lock()
            .map(|f| f.iter().any(|t| event.summary.contains(t.as_str())))
            .unwrap_or(false);
        if rejected {
            return Err(PresaleError::Calendar {
                status: 403,
                body: "insert rejected".to_string(),
            });
        }

        let mut events = self
            .events
            .lock()
            .map_err(|_| PresaleError::Http("memory calendar poisoned".to_string()))?;
        let mut created = event.clone();
        created.id = Some(format!("mem-{}", events.len() + 1));
        events.push((calendar_id.to_string(), created.clone()));
        Ok(created)
    }
}
