use clap::{Parser, Subcommand, ValueEnum};

/// Command-line interface definition for itlab-sync
/// Offline-first cache of the ITLab management server
#[derive(Parser)]
#[command(
    name = "itlab-sync",
    version = env!("CARGO_PKG_VERSION"),
    about = "Keep a local SQLite copy of ITLab events, reports, users, devices and purchases",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// What `sync` pulls from the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SyncTarget {
    Events,
    PendingEvents,
    UserEvents,
    Invitations,
    EventRoles,
    EventTypes,
    Event,
    Reports,
    UserReports,
    Users,
    User,
    PropertyTypes,
    Devices,
    UserDevices,
    EquipmentTypes,
    Purchases,
}

/// What `list` prints from the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ListTarget {
    Events,
    UserEvents,
    Invitations,
    Reports,
    Users,
    Devices,
    FreeDevices,
    Purchases,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Show or validate the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check the configuration for unusable values")]
        check: bool,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print or manage the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Fetch data from the server into the local cache
    Sync {
        #[arg(value_enum)]
        target: SyncTarget,

        /// User id (defaults to `user_id` from the configuration)
        #[arg(long)]
        user: Option<String>,

        /// Lower bound, YYYY-MM-DD or RFC 3339
        #[arg(long)]
        begin: Option<String>,

        /// Upper bound, YYYY-MM-DD or RFC 3339
        #[arg(long)]
        end: Option<String>,

        /// Entity id for single-item targets (`event`, `user`)
        #[arg(long)]
        id: Option<String>,

        /// Number of purchase pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },

    /// Print cached data without touching the network
    List {
        #[arg(value_enum)]
        target: ListTarget,

        /// Only rows whose text matches
        #[arg(long)]
        search: Option<String>,

        /// User id for per-user targets
        #[arg(long)]
        user: Option<String>,
    },

    /// Remove cached data
    Clear {
        #[arg(long = "reports", help = "Drop every cached report and salary")]
        reports: bool,
    },
}
