use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use campusnav_cli::commands::campus::{handle_campus_command, CampusCommand};
use campusnav_cli::commands::connection::{
    handle_connect, handle_disconnect, handle_recompute_weights, ConnectArgs, DisconnectArgs,
    RecomputeArgs,
};
use campusnav_cli::commands::handle_init;
use campusnav_cli::commands::hop::{handle_hop_command, HopCommand};
use campusnav_cli::commands::route::{
    handle_nearest_command, handle_route_command, NearestArgs, RouteArgs,
};
use campusnav_cli::output::{describe_error, OutputFormat};

const DATABASE_FILE: &str = "campusnav.db";

#[derive(Parser, Debug)]
#[command(author, version, about = "Campus map editing and walking directions")]
struct Cli {
    /// Path to the campus database.
    #[arg(long, env = "CAMPUSNAV_DB", global = true)]
    db: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database and seed the default campuses.
    Init,
    /// List and manage campuses.
    Campus {
        #[command(subcommand)]
        command: CampusCommand,
    },
    /// Place, move, list and delete hops.
    Hop {
        #[command(subcommand)]
        command: HopCommand,
    },
    /// Connect two hops with a walkable path.
    Connect(ConnectArgs),
    /// Remove a connection.
    Disconnect(DisconnectArgs),
    /// Refresh stored connection distances after hops were moved.
    RecomputeWeights(RecomputeArgs),
    /// Find the hop closest to a position.
    Nearest(NearestArgs),
    /// Plan a walking route.
    Route(RouteArgs),
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", describe_error(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let db = cli.db.unwrap_or_else(default_database_path);
    let format = cli.format;

    match &cli.command {
        Command::Init => handle_init(&db),
        Command::Campus { command } => handle_campus_command(&db, format, command),
        Command::Hop { command } => handle_hop_command(&db, format, command),
        Command::Connect(args) => handle_connect(&db, format, args),
        Command::Disconnect(args) => handle_disconnect(&db, format, args),
        Command::RecomputeWeights(args) => handle_recompute_weights(&db, format, args),
        Command::Nearest(args) => handle_nearest_command(&db, format, args),
        Command::Route(args) => handle_route_command(&db, format, args),
    }
}

fn default_database_path() -> PathBuf {
    ProjectDirs::from("org", "campusnav", "campusnav")
        .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
