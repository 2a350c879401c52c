//! Shared command-line interface logic, like printing help.
use crate::config::{ENV_CALENDAR_ID, ENV_CREDENTIAL, ENV_LOG, ENV_SETTINGS};

pub fn is_help_flag(arg: &str) -> bool {
    matches!(arg, "-h" | "--help" | "help")
}

pub fn print_help(binary_name: &str) {
    println!(
        "THSR presale v{} - Publishes high speed rail ticket pre-sale dates to Google Calendar",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {}            Fetch the schedule and add missing events", binary_name);
    println!("    {} --help     Show this help message", binary_name);
    println!();
    println!("ENVIRONMENT:");
    println!("    {:<24}Base64 of the service account JSON key (required)", ENV_CREDENTIAL);
    println!("    {:<24}Target calendar id (required)", ENV_CALENDAR_ID);
    println!("    {:<24}Path to a TOML settings file (optional)", ENV_SETTINGS);
    println!("    {:<24}Log level: error, warn, info, debug, trace (default info)", ENV_LOG);
    println!();
    println!("SETTINGS FILE KEYS:");
    println!("    source_url, table_marker, title_prefix, time_zone, utc_offset_minutes,");
    println!("    fetch_timeout_secs, fetch_attempts, retry_delay_secs, calendar_api_base");
    println!();
    println!("Running twice is safe: events already on the calendar are skipped.");
}
