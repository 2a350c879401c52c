//! Duplicate detection against the calendar.
//!
//! The schedule page carries no stable id for an announcement, so an event
//! counts as already published when the store holds anything on the same
//! local day whose text matches `"{prefix}{holiday}預售票"`. Description,
//! time and reminders are not compared. Two different holidays whose names
//! overlap and whose sales fall on the same day would collide; the source
//! uses distinct holiday labels, so this is accepted.
use crate::config::Config;
use crate::error::{PresaleError, Result};
use crate::model::PresaleRecord;
use crate::store::CalendarStore;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};

/// `[00:00, 23:59]` of one local date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

pub fn day_window(date: NaiveDate, offset: FixedOffset) -> Result<DayWindow> {
    let at = |h, m| {
        let time = NaiveTime::from_hms_opt(h, m, 0)
            .ok_or_else(|| PresaleError::Config(format!("bad time {h}:{m}")))?;
        date.and_time(time)
            .and_local_timezone(offset)
            .single()
            .ok_or_else(|| PresaleError::Config(format!("{date} has no local {h}:{m}")))
    };
    Ok(DayWindow {
        start: at(0, 0)?,
        end: at(23, 59)?,
    })
}

pub fn query_text(prefix: &str, holiday_name: &str) -> String {
    format!("{prefix}{holiday_name}預售票")
}

pub struct Reconciler<'a, S> {
    store: &'a S,
    config: &'a Config,
    offset: FixedOffset,
}

impl<'a, S: CalendarStore> Reconciler<'a, S> {
    pub fn new(store: &'a S, config: &'a Config) -> Result<Self> {
        Ok(Self {
            store,
            config,
            offset: config.settings.offset()?,
        })
    }

    /// True if the calendar already holds this record's event.
    pub async fn is_duplicate(&self, record: &PresaleRecord) -> Result<bool> {
        let window = day_window(record.sale_date, self.offset)?;
        let query = query_text(&self.config.settings.title_prefix, &record.holiday_name);
        log::debug!(
            "Looking up '{}' between {} and {}",
            query,
            window.start.to_rfc3339(),
            window.end.to_rfc3339()
        );
        let matches = self
            .store
            .list_events(&self.config.calendar_id, window.start, window.end, &query)
            .await?;
        Ok(!matches.is_empty())
    }
}
