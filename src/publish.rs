// Builds presale events and inserts them.
use crate::config::Config;
use crate::error::Result;
use crate::model::{CalendarEvent, EventDateTime, PresaleRecord, ReminderOverride, Reminders};
use crate::reconcile::day_window;
use crate::store::CalendarStore;
use chrono::Duration;

pub const EVENT_DURATION_MINUTES: i64 = 30;
/// Popup reminders, in minutes before start.
pub const REMINDER_MINUTES: [i64; 3] = [1440, 60, 15];

pub fn event_title(prefix: &str, holiday_name: &str) -> String {
    format!("{prefix}{holiday_name}預售票開賣")
}

pub fn event_description(travel_period: &str) -> String {
    format!("疏運期間: {travel_period}\n請準時上網訂票")
}

/// Event for `record`: starts at local midnight of the sale date, lasts
/// half an hour.
pub fn build_event(record: &PresaleRecord, config: &Config) -> Result<CalendarEvent> {
    let settings = &config.settings;
    let start = day_window(record.sale_date, settings.offset()?)?.start;
    let end = start + Duration::minutes(EVENT_DURATION_MINUTES);
    Ok(CalendarEvent {
        id: None,
        summary: event_title(&settings.title_prefix, &record.holiday_name),
        description: event_description(&record.travel_period),
        start: EventDateTime::at(start, &settings.time_zone),
        end: EventDateTime::at(end, &settings.time_zone),
        reminders: Reminders {
            use_default: false,
            overrides: REMINDER_MINUTES
                .iter()
                .map(|m| ReminderOverride::popup(*m))
                .collect(),
        },
    })
}

pub struct Publisher<'a, S> {
    store: &'a S,
    config: &'a Config,
}

impl<'a, S: CalendarStore> Publisher<'a, S> {
    pub fn new(store: &'a S, config: &'a Config) -> Self {
        Self { store, config }
    }

    pub async fn publish(&self, record: &PresaleRecord) -> Result<CalendarEvent> {
        let event = build_event(record, self.config)?;
        self.store
            .insert_event(&self.config.calendar_id, &event)
            .await
    }
}
