//! Clap derive structures for the `pmsgate` CLI.
//!
//! Defines the command tree, global flags, and shared output enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use pmsgate_core::Language;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// pmsgate -- booking integration against a hotel PMS gateway
#[derive(Debug, Parser)]
#[command(
    name = "pmsgate",
    version,
    about = "Search availability and manage reservations through a PMS gateway",
    long_about = "Talks to an OAuth2-protected hotel PMS gateway.\n\n\
        Availability is normalized and enriched from the local room catalog;\n\
        reservations are mapped to the gateway schema and submitted once.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Hotel profile to use
    #[arg(long, short = 'p', env = "PMSGATE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Gateway base URL (overrides profile)
    #[arg(long, short = 'g', env = "PMSGATE_GATEWAY", global = true)]
    pub gateway: Option<String>,

    /// Hotel id (overrides profile)
    #[arg(long, env = "PMSGATE_HOTEL", global = true)]
    pub hotel: Option<String>,

    /// Catalog TOML file (overrides profile)
    #[arg(long, env = "PMSGATE_CATALOG", global = true)]
    pub catalog: Option<PathBuf>,

    /// Label language (en, es)
    #[arg(long, short = 'l', env = "PMSGATE_LANGUAGE", global = true)]
    pub language: Option<Language>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PMSGATE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Connect timeout in seconds (overrides profile)
    #[arg(long, env = "PMSGATE_CONNECT_TIMEOUT", global = true)]
    pub connect_timeout: Option<u64>,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "PMSGATE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search room availability for a stay
    #[command(alias = "avail", alias = "a")]
    Availability(AvailabilityArgs),

    /// Create a reservation
    #[command(alias = "book")]
    Reserve(ReserveArgs),

    /// Fetch an existing reservation
    #[command(alias = "get")]
    Lookup(LookupArgs),

    /// Inspect the room catalog (offline)
    #[command(alias = "cat")]
    Catalog(CatalogArgs),

    /// Obtain a token and show its remaining lifetime
    Token,

    /// Show the hotel's guarantee-code configuration
    #[command(alias = "gc")]
    GuaranteeCodes,

    /// Show configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Availability ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AvailabilityArgs {
    /// Check-in date (YYYY-MM-DD)
    #[arg(long = "check-in", short = 'i')]
    pub check_in: String,

    /// Check-out date (YYYY-MM-DD)
    #[arg(long = "check-out", short = 'u')]
    pub check_out: String,

    /// Number of adults
    #[arg(long, short = 'a', default_value_t = 2)]
    pub adults: u32,

    /// Number of children
    #[arg(long, short = 'c', default_value_t = 0)]
    pub children: u32,

    /// Only rates of this rate plan
    #[arg(long)]
    pub rate_plan: Option<String>,

    /// Promotion code
    #[arg(long)]
    pub promo: Option<String>,

    /// Include rooms with no surviving rate
    #[arg(long)]
    pub all: bool,
}

// ── Reservations ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ReserveArgs {
    /// Reservation intent as JSON (camelCase fields); '-' reads stdin
    #[arg(long, short = 'f', conflicts_with_all = ["check_in", "room_type"])]
    pub from_file: Option<PathBuf>,

    /// Check-in date (YYYY-MM-DD)
    #[arg(long = "check-in", required_unless_present = "from_file")]
    pub check_in: Option<String>,

    /// Check-out date (YYYY-MM-DD)
    #[arg(long = "check-out", required_unless_present = "from_file")]
    pub check_out: Option<String>,

    /// Room type code (e.g. 1BBFG)
    #[arg(long, required_unless_present = "from_file")]
    pub room_type: Option<String>,

    /// Rate plan code (defaults to the profile's default rate plan)
    #[arg(long)]
    pub rate_plan: Option<String>,

    #[arg(long, default_value_t = 2)]
    pub adults: u32,

    #[arg(long, default_value_t = 0)]
    pub children: u32,

    /// Guest first name
    #[arg(long, required_unless_present = "from_file")]
    pub first_name: Option<String>,

    /// Guest last name
    #[arg(long, required_unless_present = "from_file")]
    pub last_name: Option<String>,

    /// Guest email
    #[arg(long, required_unless_present = "from_file")]
    pub email: Option<String>,

    /// Guest phone
    #[arg(long)]
    pub phone: Option<String>,

    /// Pre-tax total for the stay
    #[arg(long, required_unless_present = "from_file")]
    pub amount: Option<f64>,

    /// Promotion code
    #[arg(long)]
    pub promo: Option<String>,

    /// Free-text special requests
    #[arg(long)]
    pub special_requests: Option<String>,

    /// Reuse the idempotency key of an earlier attempt
    #[arg(long)]
    pub idempotency_key: Option<Uuid>,
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Reservation id, or confirmation number with --confirmation
    pub identifier: String,

    /// Treat the identifier as a confirmation number
    #[arg(long, short = 'c')]
    pub confirmation: bool,
}

// ── Catalog ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommand,
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// List room types
    #[command(alias = "r")]
    Rooms,

    /// List rate plans
    #[command(alias = "rp")]
    RatePlans,

    /// Validate the catalog and report its size
    Check,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the resolved configuration (secrets redacted)
    Show,

    /// Print the config file path
    Path,

    /// List configured profiles
    Profiles,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
