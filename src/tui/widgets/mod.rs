pub mod achievements;
pub mod calendar;
pub mod habits;
pub mod header;
pub mod statusbar;
pub mod streak;
