use chrono::{Local, NaiveDate};

/// The evaluator's current calendar day. Only the CLI and TUI layers call
/// this; everything below them takes the date as a parameter.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
