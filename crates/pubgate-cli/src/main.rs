//! Command line driver for the pubgate resolver.
//!
//! Reads a JSON declaration file, runs the resolution pipeline, and prints
//! either the authorization table (JSON) or an Apache configuration
//! fragment. Logging is controlled through `RUST_LOG` (default `warn`).
//!
//! # Declaration file
//!
//! ```json
//! {
//!   "publish": {
//!     "foo/stable": { "allow_from": ["admin"] },
//!     "foo/testing": { "allow_from": "prefix" }
//!   },
//!   "repos": { "tools": { "allow_from": "authenticated" } },
//!   "default_allow_from": "authenticated",
//!   "prefix_defaults": { "foo": "prefix" },
//!   "strict": false
//! }
//! ```

use clap::{Parser, Subcommand};
use pubgate_auth::ResolveInput;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pubgate",
    version,
    about = "Compile publish-point access declarations into an authorization table"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve declarations and print the authorization table as JSON.
    Resolve {
        /// Declaration file (JSON).
        input: PathBuf,

        /// Print compact JSON instead of pretty-printed.
        #[arg(long)]
        compact: bool,
    },

    /// Resolve declarations and print an Apache configuration fragment.
    Render {
        /// Declaration file (JSON).
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Resolve { input, compact } => run_resolve(&input, compact),
        Command::Render { input } => run_render(&input),
    }
}

fn run_resolve(path: &Path, compact: bool) -> ExitCode {
    let Some(table) = load_and_resolve(path) else {
        return ExitCode::FAILURE;
    };

    let rendered = if compact {
        serde_json::to_string(&table)
    } else {
        serde_json::to_string_pretty(&table)
    };
    match rendered {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to serialize table: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_render(path: &Path) -> ExitCode {
    let Some(table) = load_and_resolve(path) else {
        return ExitCode::FAILURE;
    };

    print!("{}", pubgate_apache::render_table(&table));
    ExitCode::SUCCESS
}

fn load_and_resolve(path: &Path) -> Option<pubgate_auth::AuthTable> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Failed to read {}: {e}", path.display());
            return None;
        }
    };

    let input: ResolveInput = match serde_json::from_str(&content) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Invalid declaration file {}: {e}", path.display());
            return None;
        }
    };

    tracing::debug!(
        publish_points = input.publish.len(),
        strict = input.strict,
        "loaded declarations"
    );

    match pubgate_auth::resolve(&input) {
        Ok(table) => Some(table),
        Err(e) => {
            eprintln!("Resolution failed: {e}");
            None
        }
    }
}
