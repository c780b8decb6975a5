use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "vms")]
#[command(about = "Visitor register with spreadsheet sync")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the local store and config (default: platform data dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a visitor in and push the record to the sheet
    #[command(alias = "in")]
    Checkin {
        #[command(flatten)]
        visitor: VisitorArgs,
    },
    /// Edit an existing record and push it again
    Edit {
        /// Visitor ID or unique ID prefix
        id: String,
        #[command(flatten)]
        visitor: VisitorArgs,
    },
    /// Hide a record; it stays hidden even when the sheet still has it
    Hide {
        /// Visitor ID or unique ID prefix
        id: String,
    },
    /// Mark a visitor as checked out (local only)
    #[command(alias = "out")]
    Checkout {
        /// Visitor ID or unique ID prefix
        id: String,
    },
    /// List records, newest check-in first
    List {
        /// Number of records to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Only visitors still in the building
        #[arg(long)]
        in_building: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search by name, phone or national id
    Search {
        /// Search term
        term: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run one sync cycle against the published sheet
    Sync {
        /// Print the diagnostic log afterwards
        #[arg(long)]
        log: bool,
    },
    /// Sync now, then every 15 seconds until interrupted
    Watch {
        /// Print the diagnostic log when stopping
        #[arg(long)]
        log: bool,
    },
    /// Merge a CSV export as if it had been fetched
    Import {
        /// CSV file path, or `-` for stdin
        path: PathBuf,
    },
    /// Manage the label print queue
    Queue {
        #[command(subcommand)]
        command: QueueCommands,
    },
    /// Show register totals
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show insights derived from the register
    Insights {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or change sync configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

/// Check-in form fields. Omitted fields keep the default (check-in) or the
/// current value (edit).
#[derive(Args, Debug, Default, Clone)]
pub struct VisitorArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub gender: Option<String>,
    #[arg(long)]
    pub age: Option<String>,
    #[arg(long)]
    pub place: Option<String>,
    /// National identity number
    #[arg(long)]
    pub national_id: Option<String>,
    #[arg(long)]
    pub group_leader: Option<String>,
    /// Secondary organisation id
    #[arg(long)]
    pub secondary_id: Option<String>,
    /// Stay start date (DD/MM/YYYY or YYYY-MM-DD)
    #[arg(long = "from", value_name = "DATE")]
    pub from_date: Option<String>,
    /// Stay end date
    #[arg(long = "to", value_name = "DATE")]
    pub to_date: Option<String>,
    /// Arrival half of the day
    #[arg(long, value_enum)]
    pub am_pm: Option<Meridiem>,
    #[arg(long)]
    pub phone: Option<String>,
    /// Event code (HP, SP, OTHER, NO EV)
    #[arg(long)]
    pub event: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Meridiem {
    #[value(name = "AM", alias = "am")]
    Am,
    #[value(name = "PM", alias = "pm")]
    Pm,
}

impl Meridiem {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Am => "AM",
            Self::Pm => "PM",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum QueueCommands {
    /// Add a record to the print queue
    Add {
        /// Visitor ID or unique ID prefix
        id: String,
    },
    /// Remove a record from the print queue
    Remove {
        /// Visitor ID or unique ID prefix
        id: String,
    },
    /// Empty the print queue
    Clear,
    /// Show label data for queued records
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Update configuration fields
    Set {
        /// Spreadsheet id or full spreadsheet URL
        #[arg(long, value_name = "ID_OR_URL")]
        sheet: Option<String>,
        /// Published form id for the fallback write channel
        #[arg(long, value_name = "ID")]
        form_id: Option<String>,
        /// Script endpoint for the primary write channel
        #[arg(long, value_name = "URL")]
        apps_script_url: Option<String>,
        /// Base URL for spreadsheet requests
        #[arg(long, value_name = "URL")]
        sheet_base_url: Option<String>,
        /// Base URL for form requests
        #[arg(long, value_name = "URL")]
        form_base_url: Option<String>,
        /// Form field id override, e.g. `name=entry.123` (repeatable)
        #[arg(long = "mapping", value_name = "FIELD=ENTRY")]
        mappings: Vec<String>,
    },
    /// Restore the default configuration
    Reset,
}
