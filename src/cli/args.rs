use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "habitai", version, author, about = "A terminal habit tracker with streaks, a month calendar and AI coaching")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create or select the local profile
    Setup {
        /// Ask for profile details again
        #[arg(long)]
        reset: bool,
    },
    /// Create a new habit
    Add {
        /// Habit name
        name: String,
        /// Category, e.g. Health, Learning, Mindfulness
        #[arg(long, short)]
        category: Option<String>,
        #[arg(long, short)]
        description: Option<String>,
        /// daily, weekly or monthly
        #[arg(long, short)]
        frequency: Option<String>,
        /// Hex colour, e.g. #10B981
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// List habits with streaks and completion rates
    List {
        /// Include archived habits
        #[arg(long)]
        all: bool,
    },
    /// Show one habit with analytics and recent history
    Show {
        /// Habit id or name
        habit: String,
    },
    /// Change a habit's details
    Edit {
        /// Habit id or name
        habit: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        frequency: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
        /// Archive (false) or restore (true)
        #[arg(long)]
        active: Option<bool>,
    },
    /// Archive a habit (its history is kept)
    Remove {
        /// Habit id or name
        habit: String,
    },
    /// Mark a habit as completed
    Done {
        /// Habit id or name
        habit: String,
        /// Date to mark (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Record the day as not completed instead
        #[arg(long)]
        undo: bool,
        /// Attach a note to the record
        #[arg(long)]
        note: Option<String>,
    },
    /// Show a month calendar of completions
    Calendar {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Print the grid as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show dashboard statistics and per-habit analytics
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Show achievement progress
    Achievements,
    /// Ask the AI coach for insights on your habits
    Insights,
    /// Ask the AI coach for new habit ideas
    Suggest {
        /// Your goals, in your own words
        goals: Option<String>,
        /// Create the suggested habits
        #[arg(long)]
        add: bool,
    },
    /// Show or change your profile
    User {
        #[command(subcommand)]
        action: Option<UserCommands>,
    },
    /// Create sample habits with a few days of history
    Seed,
    /// Export a weekly text summary to stdout
    Export,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Change the display name
    Rename {
        name: String,
    },
}
