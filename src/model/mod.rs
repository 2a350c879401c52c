// File: ./src/model/mod.rs
pub mod event;
pub mod record;

pub use event::{CalendarEvent, EventDateTime, ReminderOverride, Reminders};
pub use record::{PresaleRecord, RawRow, RawTable, parse_sale_date};
