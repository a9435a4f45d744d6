use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use pointbook_core::{MemberFilter, Permission, Tier};

#[derive(Parser)]
#[command(name = "pointbook")]
#[command(about = "Track member points against category requirements")]
#[command(version)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Base directory (default: ~/.pointbook)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show required and received points for a member
    ///
    /// Without --as the points are shown with officer access and no
    /// permission check is made.
    Points {
        /// Member id
        member: String,

        /// Check access as this member before showing points (default: officer access)
        #[arg(long = "as", value_name = "MEMBER")]
        caller: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Manage point categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Manage events
    Event {
        #[command(subcommand)]
        action: EventAction,
    },

    /// Manage members
    Member {
        #[command(subcommand)]
        action: MemberAction,
    },

    /// Manage per-member requirement exceptions
    Exception {
        #[command(subcommand)]
        action: ExceptionAction,
    },

    /// Manage point records
    Record {
        #[command(subcommand)]
        action: RecordAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// List categories with their sub-categories
    List,

    /// Create a category, or update the one with the same name
    Add {
        /// Category name (case and spaces are ignored when matching)
        name: String,

        /// Parent category (makes this a sub-category)
        #[arg(long)]
        parent: Option<String>,

        /// Points required of standard members
        #[arg(long)]
        standard: Option<i64>,

        /// Points required of reduced-requirement members
        #[arg(long)]
        reduced: Option<i64>,
    },

    /// Update requirement fields
    Set {
        /// Category name
        name: String,

        /// Points required of standard members
        #[arg(long)]
        standard: Option<i64>,

        /// Points required of reduced-requirement members
        #[arg(long)]
        reduced: Option<i64>,
    },

    /// Remove a category
    Remove {
        /// Category name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum EventAction {
    /// List events ordered by date
    List {
        /// Only events of this category and its sub-categories
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Create an event
    Add {
        /// Event name
        name: String,

        /// Event date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        /// Category the event awards points in
        #[arg(short, long)]
        category: String,
    },

    /// Rename, re-date or move an event
    Update {
        /// Current event name
        name: String,

        /// New name
        #[arg(long)]
        rename: Option<String>,

        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// New category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Remove an event and its records
    Remove {
        /// Event name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum MemberAction {
    /// List members
    List {
        /// Filter (active, inactive, both)
        #[arg(short, long, default_value = "both")]
        filter: MemberFilter,
    },

    /// Register a member
    Add {
        /// Member id
        id: String,

        /// First name
        #[arg(long)]
        first: String,

        /// Last name
        #[arg(long)]
        last: String,

        /// Tier (default: members.default_tier)
        #[arg(long)]
        tier: Option<Tier>,
    },

    /// Show a member
    Show {
        /// Member id
        id: String,
    },

    /// Change a member's tier
    Tier {
        /// Member id
        id: String,

        /// New tier (standard, reduced)
        tier: Tier,
    },

    /// Mark a member active
    Activate {
        /// Member id
        id: String,
    },

    /// Mark a member inactive
    Deactivate {
        /// Member id
        id: String,
    },

    /// Grant a permission
    Grant {
        /// Member id
        id: String,

        /// Permission (user, officer)
        permission: Permission,
    },

    /// Revoke a permission
    Revoke {
        /// Member id
        id: String,

        /// Permission (user, officer)
        permission: Permission,
    },
}

#[derive(Subcommand)]
pub enum ExceptionAction {
    /// List a member's exceptions
    List {
        /// Member id
        member: String,
    },

    /// Set the points a member needs in one category
    Set {
        /// Member id
        member: String,

        /// Category name
        category: String,

        /// Points needed
        points: i64,
    },

    /// Remove an exception by index
    Remove {
        /// Member id
        member: String,

        /// Exception index (see `exception list`)
        index: usize,
    },
}

#[derive(Subcommand)]
pub enum RecordAction {
    /// List records
    List {
        /// Only this member's records
        #[arg(short, long)]
        member: Option<String>,

        /// Only this event's records
        #[arg(short, long)]
        event: Option<String>,
    },

    /// Set the points a member earned at an event
    Set {
        /// Member id
        member: String,

        /// Event name
        event: String,

        /// Points earned
        points: f64,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g., members.default_tier)
        key: String,
    },

    /// Set a config value
    Set {
        /// Config key (e.g., log.level)
        key: String,

        /// Value to set (e.g., "debug")
        value: String,
    },

    /// List all config values
    List,

    /// Show config file path
    Path,

    /// Initialize config file with defaults
    Init,
}
